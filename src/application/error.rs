use std::error::Error as StdError;

use thiserror::Error;

use crate::{config::LoadError, infra::error::InfraError};

use super::{backend::BackendError, refresh::RefreshError};

/// Error message chain of a failure, outermost first.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, error: &dyn StdError) -> Self {
        let mut messages = Vec::new();
        messages.push(error.to_string());
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self { source, messages }
    }

    /// The whole chain on one line, outermost cause first.
    pub fn chain(&self) -> String {
        self.messages.join(": caused by: ")
    }
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Refresh(#[from] RefreshError),
    #[error(transparent)]
    Backend(BackendError),
    /// A user-initiated call the backend refused; the message is shown verbatim.
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("failed to load configuration: {0}")]
    Config(#[from] LoadError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl ClientError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    /// Text suitable for a blocking alert.
    pub fn presentation_message(&self) -> String {
        match self {
            ClientError::Rejected(message) => message.clone(),
            ClientError::Backend(BackendError::Timeout { .. }) => {
                "The backend did not answer in time".to_string()
            }
            ClientError::Backend(_) | ClientError::Refresh(_) => {
                "The backend could not be reached".to_string()
            }
            ClientError::Config(_) | ClientError::Infra(InfraError::Configuration { .. }) => {
                "Client misconfigured".to_string()
            }
            ClientError::Infra(_) | ClientError::Unexpected(_) => {
                "Unexpected error occurred".to_string()
            }
        }
    }
}

impl From<BackendError> for ClientError {
    fn from(error: BackendError) -> Self {
        match error {
            BackendError::Rejected(message) => Self::Rejected(message),
            other => Self::Backend(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejections_keep_the_backend_message() {
        let error = ClientError::from(BackendError::Rejected("not enough credits".into()));
        assert!(matches!(error, ClientError::Rejected(_)));
        assert_eq!(error.presentation_message(), "not enough credits");
    }

    #[test]
    fn report_walks_the_source_chain() {
        let error = ClientError::from(RefreshError::from(BackendError::transport(
            "users", "offline",
        )));
        let report = ErrorReport::from_error("application::error::tests", &error);

        assert_eq!(report.messages.len(), 2);
        assert!(report.messages[0].starts_with("reference refresh failed"));
        assert!(report.messages[1].contains("offline"));
        assert_eq!(
            report.chain(),
            "reference refresh failed: transport failure on `users`: offline: caused by: \
             transport failure on `users`: offline"
        );
    }
}
