use thiserror::Error;

/// Failures reported by the AI text service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error("API Key is not configured. AI features are unavailable. Please ensure your environment variables are set correctly for your deployment.")]
    Unconfigured,

    #[error("The API key is invalid. Please check your configuration.")]
    InvalidKey,

    #[error("Failed to {operation}. The AI service may be busy or unavailable.")]
    Unavailable { operation: &'static str },

    #[error("Input cannot be empty.")]
    EmptyInput,
}

/// Every error a handler can surface. None of them is fatal to the hub.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HubError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Service(#[from] ServiceError),

    #[error("{0}")]
    Resource(String),
}

impl HubError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn resource(message: impl Into<String>) -> Self {
        Self::Resource(message.into())
    }

    /// Short tag used as the content description of the error panel.
    pub fn kind(&self) -> &'static str {
        match self {
            HubError::Validation(_) => "validation_error",
            HubError::Service(_) => "service_error",
            HubError::Resource(_) => "resource_error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_messages_match_user_facing_copy() {
        let err = HubError::from(ServiceError::Unavailable {
            operation: "generate summary",
        });
        assert_eq!(
            err.to_string(),
            "Failed to generate summary. The AI service may be busy or unavailable."
        );
        assert_eq!(err.kind(), "service_error");
    }

    #[test]
    fn validation_error_displays_raw_message() {
        let err = HubError::validation("Please enter some text to summarize.");
        assert_eq!(err.to_string(), "Please enter some text to summarize.");
        assert_eq!(err.kind(), "validation_error");
    }
}
