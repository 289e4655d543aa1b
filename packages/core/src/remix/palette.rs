use crate::error::RemixResult;
use crate::workspace::Board;
use canvas_like_model_provider::GenerativeModel;
use canvas_like_types::{
    JsonSchema, json,
    json::{Deserialize, Serialize},
};
use regex::Regex;
use std::sync::LazyLock;

static HEX_COLOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#[0-9a-fA-F]{6}$").expect("hex pattern compiles"));

const MAX_PALETTE_COLORS: usize = 6;

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq)]
struct PaletteSuggestion {
    colors: Vec<String>,
}

/// Suggest a brand palette for a board from its title and analyzed assets.
/// Returns only well-formed hex colors; the suggestion may be empty.
pub async fn generate_palette(
    model: &dyn GenerativeModel,
    board: &Board,
) -> RemixResult<Vec<String>> {
    let schema = schemars::schema_for!(PaletteSuggestion).to_value();
    let summary = super::summary::summarize(std::slice::from_ref(board), None);
    let prompt = format!(
        "Suggest a cohesive brand color palette of up to {MAX_PALETTE_COLORS} \
         colors for the board below. Return JSON with a \"colors\" array of \
         6-digit hex strings like \"#1a2b3c\".\n\n{}",
        summary.boards_text
    );

    let value = model.generate_structured(&prompt, &schema).await?;
    let suggestion: PaletteSuggestion = json::from_value(value).unwrap_or_default();

    let colors: Vec<String> = suggestion
        .colors
        .into_iter()
        .filter(|color| HEX_COLOR.is_match(color))
        .take(MAX_PALETTE_COLORS)
        .collect();
    Ok(colors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workspace::BoardType;
    use canvas_like_model_provider::{
        InlineImage, MediaResponse, OperationHandle, OperationStatus, Part, ProviderError,
    };
    use canvas_like_types::{Value, async_trait, json::json};

    struct PaletteModel {
        value: Value,
    }

    #[async_trait]
    impl GenerativeModel for PaletteModel {
        async fn generate_structured(
            &self,
            _prompt: &str,
            _schema: &Value,
        ) -> Result<Value, ProviderError> {
            Ok(self.value.clone())
        }

        async fn generate_media(&self, _parts: &[Part]) -> Result<MediaResponse, ProviderError> {
            Ok(MediaResponse::default())
        }

        async fn start_video(
            &self,
            _prompt: &str,
            _seed_image: Option<&InlineImage>,
        ) -> Result<OperationHandle, ProviderError> {
            Err(ProviderError::Malformed("not scripted".to_string()))
        }

        async fn poll_operation(
            &self,
            _handle: &OperationHandle,
        ) -> Result<OperationStatus, ProviderError> {
            Err(ProviderError::Malformed("not scripted".to_string()))
        }
    }

    #[tokio::test]
    async fn malformed_colors_are_filtered_out() {
        let model = PaletteModel {
            value: json!({ "colors": ["#1A2B3C", "coral", "#fff", "#00ff00"] }),
        };
        let board = Board::new(BoardType::Brand, "Brand");

        let colors = generate_palette(&model, &board).await.unwrap();
        assert_eq!(colors, vec!["#1A2B3C".to_string(), "#00ff00".to_string()]);
    }

    #[tokio::test]
    async fn unexpected_shapes_yield_an_empty_palette() {
        let model = PaletteModel {
            value: json!({ "palette": "nope" }),
        };
        let board = Board::new(BoardType::Brand, "Brand");

        let colors = generate_palette(&model, &board).await.unwrap();
        assert!(colors.is_empty());
    }
}
