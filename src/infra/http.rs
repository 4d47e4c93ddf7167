//! HTTP transport for the backend boundary.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde_json::Value;
use tracing::{debug, instrument};

use crate::application::backend::{Backend, BackendError, unwrap_call_reply};
use crate::config::BackendSettings;

use super::error::InfraError;

const QUERY_PREFIX: &str = "api/query/";
const CALL_PREFIX: &str = "api/call/";

/// `reqwest`-based [`Backend`]: both verbs are `POST`s with a JSON body.
#[derive(Clone, Debug)]
pub struct HttpBackend {
    client: Client,
    base: Url,
    credential: Option<String>,
}

impl HttpBackend {
    pub fn new(base: &Url, credential: Option<String>) -> Result<Self, InfraError> {
        let mut base = base.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let client = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self {
            client,
            base,
            credential,
        })
    }

    /// Build from settings, reading the identity credential if one is configured.
    pub async fn from_settings(settings: &BackendSettings) -> Result<Self, InfraError> {
        let base = settings
            .url
            .as_ref()
            .ok_or_else(|| InfraError::configuration("backend.url is required"))?;
        let credential = match settings.identity_file.as_deref() {
            Some(path) => Some(read_credential(path).await?),
            None => None,
        };
        Self::new(base, credential)
    }

    pub fn user_agent() -> &'static str {
        concat!("taggr-client/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    fn url(&self, prefix: &str, endpoint: &str) -> Result<Url, BackendError> {
        self.base
            .join(prefix)
            .and_then(|url| url.join(endpoint))
            .map_err(|err| BackendError::transport(endpoint, err))
    }

    async fn post(&self, prefix: &str, endpoint: &str, args: Value) -> Result<Value, BackendError> {
        let url = self.url(prefix, endpoint)?;
        let mut request = self.client.post(url).json(&args);
        if let Some(credential) = &self.credential {
            request = request.bearer_auth(credential);
        }

        let response = request
            .send()
            .await
            .map_err(|err| BackendError::transport(endpoint, err))?;
        Self::handle(endpoint, response).await
    }

    async fn handle(endpoint: &str, response: Response) -> Result<Value, BackendError> {
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| BackendError::transport(endpoint, err))?;
        if !status.is_success() {
            return Err(BackendError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });
        }
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|err| BackendError::decode(endpoint, err))
    }
}

#[async_trait]
impl Backend for HttpBackend {
    #[instrument(skip(self, args))]
    async fn query(&self, endpoint: &str, args: Value) -> Result<Value, BackendError> {
        let reply = self.post(QUERY_PREFIX, endpoint, args).await?;
        debug!("Query answered");
        Ok(reply)
    }

    #[instrument(skip(self, args))]
    async fn call(&self, endpoint: &str, args: Value) -> Result<Value, BackendError> {
        let reply = self.post(CALL_PREFIX, endpoint, args).await?;
        unwrap_call_reply(endpoint, reply)
    }
}

async fn read_credential(path: &Path) -> Result<String, InfraError> {
    let raw = tokio::fs::read_to_string(path).await?;
    let credential = raw.trim();
    if credential.is_empty() {
        return Err(InfraError::configuration(format!(
            "identity file {} is empty",
            path.display()
        )));
    }
    Ok(credential.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_gains_trailing_slash() {
        let base = Url::parse("http://localhost:8080/taggr").expect("url");
        let backend = HttpBackend::new(&base, None).expect("client");

        assert_eq!(backend.base().as_str(), "http://localhost:8080/taggr/");
        assert_eq!(
            backend.url(QUERY_PREFIX, "users").expect("url").as_str(),
            "http://localhost:8080/taggr/api/query/users"
        );
    }

    #[test]
    fn user_agent_names_the_crate() {
        assert!(HttpBackend::user_agent().starts_with("taggr-client/"));
    }
}
