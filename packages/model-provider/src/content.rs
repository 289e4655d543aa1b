use canvas_like_types::{
    JsonSchema, Result, anyhow,
    json::{Deserialize, Serialize},
};

/// Base64-encoded media payload plus its mime type.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        InlineImage {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Parse a `data:image/png;base64,....` URL into an inline payload.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| anyhow!("not a data URL: {}", truncated(url)))?;
        let (meta, data) = rest
            .split_once(',')
            .ok_or_else(|| anyhow!("malformed data URL: {}", truncated(url)))?;
        let mime_type = meta.strip_suffix(";base64").unwrap_or(meta);
        let mime_type = if mime_type.is_empty() {
            "image/png"
        } else {
            mime_type
        };
        Ok(InlineImage::new(mime_type, data))
    }

    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// One part of a multimodal generation request, in request order.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Part {
    Text { text: String },
    Image { image: InlineImage },
}

impl Part {
    pub fn text(text: impl Into<String>) -> Self {
        Part::Text { text: text.into() }
    }

    pub fn image(image: InlineImage) -> Self {
        Part::Image { image }
    }
}

fn truncated(value: &str) -> &str {
    match value.char_indices().nth(64) {
        Some((offset, _)) => &value[..offset],
        None => value,
    }
}
