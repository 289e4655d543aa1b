use crate::{
    content::{InlineImage, Part},
    error::{ProviderError, classify_api_error, is_safety_message},
    generation::{GenerativeModel, MediaResponse, OperationHandle, OperationStatus, VideoPayload},
    provider::ProviderConfig,
};
use canvas_like_types::{
    Value, async_trait,
    json::{self, json},
    reqwest,
};

/// REST client for the Gemini generative API.
pub struct GeminiClient {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: ProviderConfig) -> Self {
        GeminiClient {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, ProviderError> {
        Ok(GeminiClient::new(ProviderConfig::from_env()?))
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, ProviderError> {
        let response = self
            .client
            .post(self.url(path))
            .header("x-goog-api-key", &self.config.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(classify_api_error(status.as_u16(), &text));
        }

        json::from_str(&text).map_err(|e| ProviderError::Malformed(e.to_string()))
    }

    async fn get(&self, path: &str) -> Result<Value, ProviderError> {
        let response = self
            .client
            .get(self.url(path))
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(classify_api_error(status.as_u16(), &text));
        }

        json::from_str(&text).map_err(|e| ProviderError::Malformed(e.to_string()))
    }
}

fn wire_parts(parts: &[Part]) -> Vec<Value> {
    parts
        .iter()
        .map(|part| match part {
            Part::Text { text } => json!({ "text": text }),
            Part::Image { image } => json!({
                "inlineData": { "mimeType": image.mime_type, "data": image.data }
            }),
        })
        .collect()
}

/// The API reports some rejections in-band instead of as HTTP errors.
fn block_reason(response: &Value) -> Option<String> {
    if let Some(reason) = response
        .pointer("/promptFeedback/blockReason")
        .and_then(Value::as_str)
    {
        return Some(reason.to_string());
    }

    let finish = response
        .pointer("/candidates/0/finishReason")
        .and_then(Value::as_str)
        .unwrap_or_default();
    match finish {
        "SAFETY" | "PROHIBITED_CONTENT" | "BLOCKLIST" => Some(finish.to_string()),
        _ => None,
    }
}

fn candidate_parts(response: &Value) -> Vec<&Value> {
    response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| parts.iter().collect())
        .unwrap_or_default()
}

fn collect_text(response: &Value) -> String {
    candidate_parts(response)
        .into_iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect::<Vec<_>>()
        .join("")
}

fn parse_media_response(response: &Value) -> Result<MediaResponse, ProviderError> {
    if let Some(reason) = block_reason(response) {
        return Err(ProviderError::SafetyBlocked(reason));
    }

    let mut images = Vec::new();
    for part in candidate_parts(response) {
        let Some(inline) = part.get("inlineData") else {
            continue;
        };
        let mime_type = inline
            .get("mimeType")
            .and_then(Value::as_str)
            .unwrap_or("image/png");
        let data = inline
            .get("data")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::Malformed("inlineData without data".to_string()))?;
        images.push(InlineImage::new(mime_type, data));
    }

    let text = collect_text(response);
    Ok(MediaResponse {
        images,
        text: (!text.is_empty()).then_some(text),
    })
}

fn parse_operation_status(response: &Value) -> OperationStatus {
    let done = response
        .get("done")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let error = response
        .pointer("/error/message")
        .and_then(Value::as_str)
        .map(str::to_string);
    let result = response
        .pointer("/response/generateVideoResponse/generatedSamples/0/video")
        .and_then(|video| {
            let uri = video.get("uri").and_then(Value::as_str)?;
            Some(VideoPayload {
                uri: uri.to_string(),
                mime_type: video
                    .get("mimeType")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        });

    OperationStatus {
        done,
        error,
        result,
    }
}

#[async_trait]
impl GenerativeModel for GeminiClient {
    #[tracing::instrument(name = "GeminiClient::generate_structured", skip(self, prompt, schema), level = "debug")]
    async fn generate_structured(
        &self,
        prompt: &str,
        schema: &Value,
    ) -> Result<Value, ProviderError> {
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": schema
            }
        });

        let path = format!("models/{}:generateContent", self.config.text_model);
        let response = self.post(&path, &body).await?;

        if let Some(reason) = block_reason(&response) {
            return Err(ProviderError::SafetyBlocked(reason));
        }

        let text = collect_text(&response);
        if text.is_empty() {
            return Err(ProviderError::Malformed(
                "structured generation returned no text".to_string(),
            ));
        }

        json::from_str(&text).map_err(|e| ProviderError::Malformed(e.to_string()))
    }

    #[tracing::instrument(name = "GeminiClient::generate_media", skip(self, parts), fields(parts = parts.len()), level = "debug")]
    async fn generate_media(&self, parts: &[Part]) -> Result<MediaResponse, ProviderError> {
        let body = json!({
            "contents": [{ "role": "user", "parts": wire_parts(parts) }],
            "generationConfig": { "responseModalities": ["TEXT", "IMAGE"] }
        });

        let path = format!("models/{}:generateContent", self.config.image_model);
        let response = self.post(&path, &body).await?;
        parse_media_response(&response)
    }

    #[tracing::instrument(name = "GeminiClient::start_video", skip(self, prompt, seed_image), level = "debug")]
    async fn start_video(
        &self,
        prompt: &str,
        seed_image: Option<&InlineImage>,
    ) -> Result<OperationHandle, ProviderError> {
        let mut instance = json!({ "prompt": prompt });
        if let Some(image) = seed_image {
            instance["image"] = json!({
                "bytesBase64Encoded": image.data,
                "mimeType": image.mime_type
            });
        }

        let path = format!("models/{}:predictLongRunning", self.config.video_model);
        let response = self.post(&path, &json!({ "instances": [instance] })).await?;

        let name = response
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::Malformed("operation without a name".to_string()))?;
        Ok(OperationHandle {
            name: name.to_string(),
        })
    }

    async fn poll_operation(
        &self,
        handle: &OperationHandle,
    ) -> Result<OperationStatus, ProviderError> {
        let response = self.get(&handle.name).await?;

        let mut status = parse_operation_status(&response);
        // Some failures surface as a done operation with a safety-worded
        // error message rather than a structured code.
        if let Some(message) = &status.error
            && is_safety_message(message)
        {
            status.error = Some(format!("Blocked by the provider's safety policy: {message}"));
        }
        Ok(status)
    }
}
