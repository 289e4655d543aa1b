use canvas_like_types::{Value, json};

/// Result type for provider operations
pub type ProviderResult<T> = Result<T, ProviderError>;

/// Error type for the generative model collaborator
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("Missing credentials: {0}")]
    Config(String),

    #[error("Request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Blocked by the provider's safety policy: {0}")]
    SafetyBlocked(String),

    #[error("Rate limited by the provider")]
    RateLimited,

    #[error("Response did not match the expected shape: {0}")]
    Malformed(String),

    #[error("Transport error: {0}")]
    Transport(#[from] canvas_like_types::reqwest::Error),
}

/// Phrases the upstream service is known to use for policy rejections.
/// Matched only when the structured error code does not already classify
/// the failure.
const SAFETY_MARKERS: [&str; 4] = [
    "safety",
    "responsible ai",
    "harm category",
    "prohibited content",
];

pub fn is_safety_message(message: &str) -> bool {
    let lower = message.to_lowercase();
    SAFETY_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// Classify a non-success API response body. Prefers the structured
/// `error.code` / `error.status` fields, falls back to known phrases in the
/// message text.
pub fn classify_api_error(status: u16, body: &str) -> ProviderError {
    let parsed: Option<Value> = json::from_str(body).ok();
    let code = parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/code"))
        .and_then(Value::as_u64);
    let api_status = parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/status"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    let message = parsed
        .as_ref()
        .and_then(|v| v.pointer("/error/message"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string());

    if status == 429 || code == Some(429) || api_status == "RESOURCE_EXHAUSTED" {
        return ProviderError::RateLimited;
    }

    if is_safety_message(&message) {
        return ProviderError::SafetyBlocked(message);
    }

    ProviderError::Http { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structured_rate_limit_code_wins() {
        let body = r#"{"error":{"code":429,"message":"slow down","status":"RESOURCE_EXHAUSTED"}}"#;
        assert!(matches!(
            classify_api_error(429, body),
            ProviderError::RateLimited
        ));
        // Status line alone is enough even when the HTTP status disagrees.
        let body = r#"{"error":{"code":400,"message":"quota","status":"RESOURCE_EXHAUSTED"}}"#;
        assert!(matches!(
            classify_api_error(400, body),
            ProviderError::RateLimited
        ));
    }

    #[test]
    fn safety_phrases_classify_as_blocked() {
        let body = r#"{"error":{"code":400,"message":"Request violates Responsible AI practices","status":"INVALID_ARGUMENT"}}"#;
        match classify_api_error(400, body) {
            ProviderError::SafetyBlocked(message) => {
                assert!(message.contains("Responsible AI"))
            }
            other => panic!("expected SafetyBlocked, got {other:?}"),
        }
    }

    #[test]
    fn unparseable_bodies_fall_back_to_http() {
        match classify_api_error(500, "<html>oops</html>") {
            ProviderError::Http { status, message } => {
                assert_eq!(status, 500);
                assert!(message.contains("oops"));
            }
            other => panic!("expected Http, got {other:?}"),
        }
    }
}
