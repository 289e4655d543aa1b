use crate::{
    content::{InlineImage, Part},
    error::ProviderError,
};
use canvas_like_types::{
    JsonSchema, Value, async_trait,
    json::{Deserialize, Serialize},
};

/// Result of a multimodal generation call. A response may carry any number
/// of inline images, including zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaResponse {
    pub images: Vec<InlineImage>,
    pub text: Option<String>,
}

/// Server-side name of a long-running generation operation.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct OperationHandle {
    pub name: String,
}

/// One poll of a long-running operation. `error` and `result` are only
/// meaningful once `done` is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OperationStatus {
    pub done: bool,
    pub error: Option<String>,
    pub result: Option<VideoPayload>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct VideoPayload {
    pub uri: String,
    pub mime_type: Option<String>,
}

/// The generative model collaborator. One implementation per upstream
/// provider; tests implement it directly with scripted responses.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Single round-trip returning a JSON value matching `schema`.
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> Result<Value, ProviderError>;

    /// Multimodal request: ordered parts in, inline images and optional text
    /// out.
    async fn generate_media(&self, parts: &[Part]) -> Result<MediaResponse, ProviderError>;

    /// Submit a video generation job. Progress is observed by polling the
    /// returned handle.
    async fn start_video(
        &self,
        prompt: &str,
        seed_image: Option<&InlineImage>,
    ) -> Result<OperationHandle, ProviderError>;

    async fn poll_operation(
        &self,
        handle: &OperationHandle,
    ) -> Result<OperationStatus, ProviderError>;
}
