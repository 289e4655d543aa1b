use crate::workspace::{Board, Element, ImageAnalysis, TextAnalysis};
use crate::workspace::element::{find_element_mut, walk_elements};
use canvas_like_model_provider::{GenerativeModel, InlineImage, Part};
use canvas_like_types::json;
use serde::de::DeserializeOwned;

const IMAGE_ANALYSIS_PROMPT: &str = "Describe this image as JSON. If it shows a product, return \
     {\"productName\", \"productType\", \"features\"}. Otherwise return \
     {\"style\", \"mood\", \"colorPalette\", \"typography\"}. Respond with \
     the JSON object only.";

/// Fill in missing element analyses on a board. Enrichment is best-effort:
/// any per-element failure degrades to an empty analysis and never
/// propagates or blocks the pipeline.
pub async fn enrich_board(model: &dyn GenerativeModel, board: &mut Board) {
    let mut pending_images: Vec<(String, String)> = Vec::new();
    let mut pending_texts: Vec<(String, String)> = Vec::new();

    walk_elements(&board.elements, (0.0, 0.0), &|_| true, &mut |element, _| {
        match element {
            Element::Image(image) if image.analysis.is_none() => {
                pending_images.push((image.id.clone(), image.src.clone()));
            }
            Element::Text(text) if text.analysis.is_none() => {
                pending_texts.push((text.id.clone(), text.content.clone()));
            }
            _ => {}
        }
        true
    });

    for (id, src) in pending_images {
        let analysis = analyze_image(model, &src).await;
        if let Some(Element::Image(image)) = find_element_mut(&mut board.elements, &id) {
            image.analysis = Some(analysis);
        }
    }

    for (id, content) in pending_texts {
        let analysis = analyze_text(model, &content).await;
        if let Some(Element::Text(text)) = find_element_mut(&mut board.elements, &id) {
            text.analysis = Some(analysis);
        }
    }
}

async fn analyze_image(model: &dyn GenerativeModel, src: &str) -> ImageAnalysis {
    let inline = match InlineImage::from_data_url(src) {
        Ok(inline) => inline,
        Err(error) => {
            tracing::warn!(error = %error, "image has no readable payload, skipping analysis");
            return ImageAnalysis::default();
        }
    };

    let parts = [Part::image(inline), Part::text(IMAGE_ANALYSIS_PROMPT)];
    match model.generate_media(&parts).await {
        Ok(response) => parse_analysis(response.text.as_deref()),
        Err(error) => {
            tracing::warn!(error = %error, "image analysis failed, using an empty analysis");
            ImageAnalysis::default()
        }
    }
}

async fn analyze_text(model: &dyn GenerativeModel, content: &str) -> TextAnalysis {
    let schema = schemars::schema_for!(TextAnalysis).to_value();
    let prompt = format!(
        "Analyze this marketing copy. Return JSON with \"style\", \
         \"sentiment\" and \"keywords\" (a comma-separated string).\n\
         Copy:\n{content}"
    );

    match model.generate_structured(&prompt, &schema).await {
        Ok(value) => json::from_value(value).unwrap_or_default(),
        Err(error) => {
            tracing::warn!(error = %error, "text analysis failed, using an empty analysis");
            TextAnalysis::default()
        }
    }
}

fn parse_analysis<T: DeserializeOwned + Default>(text: Option<&str>) -> T {
    let Some(text) = text else {
        return T::default();
    };
    json::from_str(strip_code_fence(text)).unwrap_or_default()
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.trim_start().strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}
