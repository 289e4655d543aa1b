use super::progress::{ProgressCallback, await_operation};
use crate::error::{RemixError, RemixResult};
use canvas_like_model_provider::{GenerativeModel, InlineImage, VideoPayload};
use canvas_like_types::{sync::CancellationToken, tokio};

/// Generate a video clip, optionally animating a seed image, surfacing
/// progress through the rotating status protocol.
#[tracing::instrument(name = "video::generate", skip_all, level = "debug")]
pub async fn generate_video(
    model: &dyn GenerativeModel,
    prompt: &str,
    seed_image: Option<&InlineImage>,
    on_progress: &ProgressCallback,
    cancel: &CancellationToken,
) -> RemixResult<VideoPayload> {
    let handle = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(RemixError::Cancelled),
        handle = model.start_video(prompt, seed_image) => handle?,
    };
    tracing::debug!(operation = %handle.name, "video operation submitted");

    await_operation(model, &handle, on_progress, cancel).await
}
