use thiserror::Error;

#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Malformed response: {0}")]
    Decode(String),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Crypto error: {0}")]
    Crypto(String),

    #[error("Invalid redirect: {0}")]
    InvalidRedirect(String),
}

impl CallbackError {
    pub fn user_message(&self) -> &'static str {
        match self {
            CallbackError::Network(e) if e.is_timeout() => "Request timed out. Please try again.",
            CallbackError::Network(_) => "Network error. Check your connection.",
            CallbackError::Api(_) => "Server error. Please try again later.",
            CallbackError::Decode(_) => "Unexpected response from server.",
            CallbackError::Storage(_) => "Could not access local storage.",
            CallbackError::Serialization(_) => "Could not read stored data.",
            CallbackError::Crypto(_) => "Could not decrypt local storage.",
            CallbackError::InvalidRedirect(_) => "The redirect URL is not valid.",
        }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, CallbackError::Network(_) | CallbackError::Api(_))
    }
}

pub type CallbackResult<T> = Result<T, CallbackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_are_retryable() {
        let err = CallbackError::Api("502 Bad Gateway".to_string());
        assert!(err.is_retryable());
        assert_eq!(err.user_message(), "Server error. Please try again later.");
    }

    #[test]
    fn local_errors_are_not_retryable() {
        assert!(!CallbackError::Crypto("bad tag".to_string()).is_retryable());
        assert!(!CallbackError::InvalidRedirect("no query".to_string()).is_retryable());
    }
}
