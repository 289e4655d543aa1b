use canvas_like_model_provider::ProviderError;

/// Result type for workspace orchestration
pub type RemixResult<T> = Result<T, RemixError>;

/// Error type for the remix pipeline and its collaborators
#[derive(Debug, thiserror::Error)]
pub enum RemixError {
    #[error("Connect at least one board before remixing")]
    EmptyContext,

    #[error("Board {0} not found or not a remix board")]
    UnknownBoard(String),

    #[error("Element {0} not found or not usable here")]
    UnknownElement(String),

    #[error("The planner returned no usable plan: {0}. Try a different prompt.")]
    Planner(String),

    #[error("Generation returned no image for task {task_id}")]
    Assembly { task_id: String },

    #[error("The request was blocked by the provider's safety policy: {0}")]
    Safety(String),

    #[error("The provider is rate limiting requests. Wait a moment and retry.")]
    RateLimited,

    #[error("Missing configuration: {0}")]
    Config(String),

    #[error("Board {0} already has a generation in flight")]
    Busy(String),

    #[error("The operation was cancelled")]
    Cancelled,

    #[error("The operation failed: {0}")]
    Operation(String),

    #[error("Provider request failed: {0}")]
    Provider(#[source] ProviderError),
}

impl From<ProviderError> for RemixError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::SafetyBlocked(message) => RemixError::Safety(message),
            ProviderError::RateLimited => RemixError::RateLimited,
            ProviderError::Config(message) => RemixError::Config(message),
            other => RemixError::Provider(other),
        }
    }
}
