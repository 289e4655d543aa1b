use crate::error::{RemixError, RemixResult};
use canvas_like_model_provider::{GenerativeModel, OperationHandle, VideoPayload};
use canvas_like_types::{sync::CancellationToken, tokio};
use std::sync::Arc;
use std::time::Duration;

/// Fixed re-query interval for long-running operations.
pub const POLL_INTERVAL: Duration = Duration::from_secs(10);

/// Rotating reassurance lines shown while an operation has no real progress
/// data. Cycled in order, not random, so the UI reads as continuous motion.
pub const PROGRESS_MESSAGES: [&str; 6] = [
    "Warming up the render pipeline...",
    "Composing frames...",
    "This usually takes a couple of minutes...",
    "Still rendering, hang tight...",
    "Adding the finishing touches...",
    "Almost there...",
];

pub const STARTING_MESSAGE: &str = "Starting generation...";

/// Receives human-readable status lines during a slow operation.
pub type ProgressCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Drive a long-running operation to completion: poll on a fixed interval,
/// emit the next rotating message on every non-terminal poll, and surface
/// the payload or the operation's error once it reports done. Cancellation
/// is checked at every suspension point.
pub async fn await_operation(
    model: &dyn GenerativeModel,
    handle: &OperationHandle,
    on_progress: &ProgressCallback,
    cancel: &CancellationToken,
) -> RemixResult<VideoPayload> {
    let report = on_progress.as_ref();
    report(STARTING_MESSAGE);

    let mut message_index = 0usize;
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RemixError::Cancelled),
            _ = tokio::time::sleep(POLL_INTERVAL) => {}
        }

        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(RemixError::Cancelled),
            status = model.poll_operation(handle) => status?,
        };

        if status.done {
            if let Some(message) = status.error {
                tracing::warn!(operation = %handle.name, error = %message, "operation failed");
                return Err(RemixError::Operation(message));
            }
            return status.result.ok_or_else(|| {
                RemixError::Operation("operation finished without a result".to_string())
            });
        }

        report(PROGRESS_MESSAGES[message_index % PROGRESS_MESSAGES.len()]);
        message_index += 1;
    }
}
