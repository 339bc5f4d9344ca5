//! Error type shared by the library modules.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ImportError>;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("invalid or empty input ---> {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("failed to connect to spotify, check auth data: {0}")]
    Authentication(String),

    #[error("did not find any matching tracks")]
    NoMatches,

    #[error("configuration error: {0}")]
    Config(String),

    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ureq::Error> for ImportError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, response) => {
                let message = response
                    .into_string()
                    .unwrap_or_else(|_| "<unreadable body>".to_string());
                ImportError::Api { status, message }
            }
            ureq::Error::Transport(transport) => ImportError::Http(transport.to_string()),
        }
    }
}

impl From<toml::de::Error> for ImportError {
    fn from(err: toml::de::Error) -> Self {
        ImportError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_message_names_path() {
        let err = ImportError::EmptyInput(PathBuf::from("/music/none"));
        assert_eq!(err.to_string(), "invalid or empty input ---> /music/none");
    }

    #[test]
    fn test_api_error_message() {
        let err = ImportError::Api {
            status: 401,
            message: "The access token expired".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 401 - The access token expired");
    }
}
