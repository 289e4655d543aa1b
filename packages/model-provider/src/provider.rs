use crate::error::ProviderError;
use canvas_like_types::{
    JsonSchema,
    json::{Deserialize, Serialize},
};

pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_VIDEO_MODEL: &str = "veo-3.0-generate-001";

/// Connection settings for one upstream generative model provider.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone)]
pub struct ProviderConfig {
    pub api_key: String,
    pub endpoint: String,
    pub text_model: String,
    pub image_model: String,
    pub video_model: String,
}

impl ProviderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        ProviderConfig {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
            video_model: DEFAULT_VIDEO_MODEL.to_string(),
        }
    }

    /// Resolve the configuration from the environment. Fails before any
    /// network call when the key is absent.
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ProviderError::Config("GEMINI_API_KEY is not set".to_string()))?;

        let mut config = ProviderConfig::new(api_key);
        if let Ok(endpoint) = std::env::var("GEMINI_ENDPOINT")
            && !endpoint.is_empty()
        {
            config.endpoint = endpoint;
        }

        Ok(config)
    }

    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) -> &mut Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn set_text_model(&mut self, model: impl Into<String>) -> &mut Self {
        self.text_model = model.into();
        self
    }

    pub fn set_image_model(&mut self, model: impl Into<String>) -> &mut Self {
        self.image_model = model.into();
        self
    }

    pub fn set_video_model(&mut self, model: impl Into<String>) -> &mut Self {
        self.video_model = model.into();
        self
    }
}
