//! Backend boundary: the query/call surface the client consumes.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    #[error("transport failure on `{endpoint}`: {message}")]
    Transport { endpoint: String, message: String },
    #[error("`{endpoint}` answered with status {status}: {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode `{endpoint}` reply: {message}")]
    Decode { endpoint: String, message: String },
    #[error("`{endpoint}` timed out after {after:?}")]
    Timeout { endpoint: String, after: Duration },
    /// The backend refused a call and explained why.
    #[error("{0}")]
    Rejected(String),
}

impl BackendError {
    pub fn transport(endpoint: &str, err: impl std::fmt::Display) -> Self {
        Self::Transport {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }

    pub fn decode(endpoint: &str, err: impl std::fmt::Display) -> Self {
        Self::Decode {
            endpoint: endpoint.to_string(),
            message: err.to_string(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// RPC-style backend.
///
/// `query` is read-only and idempotent. `call` mutates backend state; an
/// implementation unwraps the `{"Ok": ..}` / `{"Err": ..}` envelope so a
/// refusal surfaces as [`BackendError::Rejected`].
#[async_trait]
pub trait Backend: Send + Sync {
    async fn query(&self, endpoint: &str, args: Value) -> Result<Value, BackendError>;

    async fn call(&self, endpoint: &str, args: Value) -> Result<Value, BackendError>;
}

/// Run a query and decode its reply into `T`.
pub async fn query_as<T: DeserializeOwned>(
    backend: &dyn Backend,
    endpoint: &str,
    args: Value,
) -> Result<T, BackendError> {
    let value = backend.query(endpoint, args).await?;
    serde_json::from_value(value).map_err(|err| BackendError::decode(endpoint, err))
}

/// Unwrap the call reply envelope.
///
/// Replies that are not an `Ok`/`Err` envelope (for example the empty reply
/// of `update_last_activity`) pass through unchanged.
pub fn unwrap_call_reply(endpoint: &str, reply: Value) -> Result<Value, BackendError> {
    match reply {
        Value::Object(mut map) if map.len() == 1 => {
            if let Some(value) = map.remove("Ok") {
                return Ok(value);
            }
            if let Some(reason) = map.remove("Err") {
                let message = match reason {
                    Value::String(message) => message,
                    other => other.to_string(),
                };
                warn!(endpoint, %message, "backend rejected call");
                return Err(BackendError::Rejected(message));
            }
            Ok(Value::Object(map))
        }
        other => Ok(other),
    }
}

/// Bounds every outbound request with a timeout.
///
/// On expiry the in-flight future is dropped and the caller receives
/// [`BackendError::Timeout`].
pub struct TimedBackend<B> {
    inner: B,
    timeout: Duration,
}

impl<B> TimedBackend<B> {
    pub fn new(inner: B, timeout: Duration) -> Self {
        Self { inner, timeout }
    }
}

#[async_trait]
impl<B: Backend> Backend for TimedBackend<B> {
    async fn query(&self, endpoint: &str, args: Value) -> Result<Value, BackendError> {
        tokio::time::timeout(self.timeout, self.inner.query(endpoint, args))
            .await
            .map_err(|_| BackendError::Timeout {
                endpoint: endpoint.to_string(),
                after: self.timeout,
            })?
    }

    async fn call(&self, endpoint: &str, args: Value) -> Result<Value, BackendError> {
        tokio::time::timeout(self.timeout, self.inner.call(endpoint, args))
            .await
            .map_err(|_| BackendError::Timeout {
                endpoint: endpoint.to_string(),
                after: self.timeout,
            })?
    }
}
