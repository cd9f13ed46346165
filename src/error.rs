use reqwest::StatusCode;
use thiserror::Error;

/// Text shown when neither the backend nor the transport supplied a message.
pub const FALLBACK_MESSAGE: &str = "An error occurred";

/// Text shown for transport failures that carry no usable description.
pub const NETWORK_MESSAGE: &str = "Network error";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Bad endpoint address `{0}`")]
    BadAddress(String),

    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Request timed out")]
    Timeout,

    #[error("Backend responded {status}: {}", .message.as_deref().unwrap_or(FALLBACK_MESSAGE))]
    Backend {
        status: StatusCode,
        message: Option<String>,
    },

    #[error("Invalid response body `{0}`")]
    InvalidBody(String),

    #[error("Invalid configuration `{0}`")]
    Config(String),
}

impl ClientError {
    /// The message surfaced verbatim to the user.
    ///
    /// Preference order: the backend supplied message, then the transport
    /// level description, then a generic fallback.
    pub fn display_message(&self) -> String {
        match self {
            ClientError::Backend {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => message.clone(),
            ClientError::Backend { .. } => FALLBACK_MESSAGE.to_owned(),
            ClientError::Transport(e) => {
                let text = e.to_string();
                if text.trim().is_empty() {
                    NETWORK_MESSAGE.to_owned()
                } else {
                    text
                }
            }
            ClientError::Timeout => NETWORK_MESSAGE.to_owned(),
            other => other.to_string(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_message_preferred() {
        let err = ClientError::Backend {
            status: StatusCode::NOT_FOUND,
            message: Some("Queue orders does not exist".to_owned()),
        };
        assert_eq!(err.display_message(), "Queue orders does not exist");
        assert_eq!(
            err.to_string(),
            "Backend responded 404 Not Found: Queue orders does not exist"
        );
    }

    #[test]
    fn test_backend_without_message_falls_back() {
        let err = ClientError::Backend {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: Some("   ".to_owned()),
        };
        assert_eq!(err.display_message(), FALLBACK_MESSAGE);

        let err = ClientError::Backend {
            status: StatusCode::BAD_GATEWAY,
            message: None,
        };
        assert_eq!(err.display_message(), FALLBACK_MESSAGE);
    }

    #[test]
    fn test_timeout_is_transport() {
        let err = ClientError::Timeout;
        assert!(err.is_transport());
        assert_eq!(err.display_message(), NETWORK_MESSAGE);
        assert!(!ClientError::Config("x".to_owned()).is_transport());
    }
}
