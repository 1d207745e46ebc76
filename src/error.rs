use thiserror::Error;

pub const AUTH_MESSAGE: &str = "API key is invalid or has expired. Check your API key.";
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests. Please try again in a moment.";
pub const QUOTA_MESSAGE: &str = "API credits exhausted. Please top up your OpenRouter account.";
pub const RESPONSE_SHAPE_MESSAGE: &str = "Invalid response format from API";

/// Every failure a summarize or extract invocation can end in. `Display` is
/// the message shown to the user.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("{0}")]
    Validation(String),
    #[error("API key not found. Make sure OPENROUTER_API_KEY is set.")]
    MissingCredential,
    #[error("{AUTH_MESSAGE}")]
    Auth,
    #[error("{RATE_LIMIT_MESSAGE}")]
    RateLimited,
    #[error("{QUOTA_MESSAGE}")]
    QuotaExhausted,
    #[error("{message}")]
    Remote { status: u16, message: String },
    #[error("{RESPONSE_SHAPE_MESSAGE}")]
    ResponseShape,
    #[error("network error: {0}")]
    Network(String),
    #[error("Failed to extract text from URL: {0}")]
    Extraction(String),
    #[error("history storage failed: {0}")]
    Storage(String),
    #[error("another summarize request is already in flight")]
    Busy,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    Validation,
    MissingCredential,
    Auth,
    RateLimited,
    QuotaExhausted,
    Remote,
    ResponseShape,
    Network,
    Extraction,
    Storage,
    Busy,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "E_VALIDATION",
            Self::MissingCredential => "E_MISSING_CREDENTIAL",
            Self::Auth => "E_AUTH",
            Self::RateLimited => "E_RATE_LIMITED",
            Self::QuotaExhausted => "E_QUOTA_EXHAUSTED",
            Self::Remote => "E_REMOTE",
            Self::ResponseShape => "E_RESPONSE_SHAPE",
            Self::Network => "E_NETWORK",
            Self::Extraction => "E_EXTRACTION",
            Self::Storage => "E_STORAGE",
            Self::Busy => "E_BUSY",
        }
    }
}

impl SummarizeError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::Validation,
            Self::MissingCredential => ErrorCode::MissingCredential,
            Self::Auth => ErrorCode::Auth,
            Self::RateLimited => ErrorCode::RateLimited,
            Self::QuotaExhausted => ErrorCode::QuotaExhausted,
            Self::Remote { .. } => ErrorCode::Remote,
            Self::ResponseShape => ErrorCode::ResponseShape,
            Self::Network(_) => ErrorCode::Network,
            Self::Extraction(_) => ErrorCode::Extraction,
            Self::Storage(_) => ErrorCode::Storage,
            Self::Busy => ErrorCode::Busy,
        }
    }

    /// Errors caused by how the command was invoked rather than by a remote.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::MissingCredential)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(format!("{err:#}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_messages_match_status_classes() {
        assert_eq!(SummarizeError::Auth.to_string(), AUTH_MESSAGE);
        assert_eq!(SummarizeError::RateLimited.to_string(), RATE_LIMIT_MESSAGE);
        assert_eq!(SummarizeError::QuotaExhausted.to_string(), QUOTA_MESSAGE);
    }

    #[test]
    fn remote_error_displays_server_message_verbatim() {
        let err = SummarizeError::Remote {
            status: 503,
            message: "upstream overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "upstream overloaded");
        assert_eq!(err.code().as_str(), "E_REMOTE");
    }

    #[test]
    fn usage_errors_are_validation_and_missing_credential() {
        assert!(SummarizeError::MissingCredential.is_usage_error());
        assert!(SummarizeError::validation("empty").is_usage_error());
        assert!(!SummarizeError::Busy.is_usage_error());
    }
}
