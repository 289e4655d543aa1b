use super::context::BrandInfo;
use crate::workspace::{Board, Element, ImageAnalysis, TextAnalysis};
use crate::workspace::element::walk_elements;
use std::fmt::Write;

/// The two plain-text halves of the planning brief. Deliberately strings,
/// not structured data: the consumer is a free-text prompt builder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextSummary {
    pub boards_text: String,
    pub brand_text: String,
}

/// Render the resolved context into the planning brief. Pure and
/// deterministic: the same context always yields byte-identical text.
pub fn summarize(content_boards: &[Board], brand_info: Option<&BrandInfo>) -> ContextSummary {
    let mut boards_text = String::new();
    for board in content_boards {
        let _ = writeln!(boards_text, "{} board \"{}\":", board.board_type, board.title);
        walk_elements(&board.elements, (0.0, 0.0), &|_| true, &mut |element, _| {
            if !matches!(element, Element::Group(_)) {
                let _ = writeln!(
                    boards_text,
                    "  @{}: {}",
                    element.mention_token(),
                    element_summary(element)
                );
            }
            true
        });
    }

    let mut brand_text = String::new();
    if let Some(info) = brand_info {
        if let Some(logo) = &info.logo
            && let Some(label) = &logo.label
        {
            let _ = writeln!(brand_text, "Brand logo available as @{}.", label);
        }
        if !info.colors.is_empty() {
            let _ = writeln!(brand_text, "Brand colors: {}.", info.colors.join(", "));
        }
    }

    ContextSummary {
        boards_text,
        brand_text,
    }
}

const NO_ANALYSIS: &str = "No analysis available.";

fn element_summary(element: &Element) -> String {
    match element {
        Element::Image(image) => match &image.analysis {
            Some(analysis) if analysis.is_product() => product_summary(analysis),
            Some(analysis) => style_summary(analysis),
            None => NO_ANALYSIS.to_string(),
        },
        Element::Text(text) => match &text.analysis {
            Some(analysis) => text_summary(analysis),
            None => NO_ANALYSIS.to_string(),
        },
        Element::Group(_) | Element::Video(_) => NO_ANALYSIS.to_string(),
    }
}

// Missing fields render as explicit placeholders, never blank: the brief
// must not contain values that look like truncation.
fn or_placeholder(value: Option<&String>, placeholder: &str) -> String {
    match value {
        Some(value) if !value.is_empty() => value.clone(),
        _ => placeholder.to_string(),
    }
}

fn product_summary(analysis: &ImageAnalysis) -> String {
    let name = or_placeholder(analysis.product_name.as_ref(), "Product not identified");
    let product_type = or_placeholder(analysis.product_type.as_ref(), "Type not identified");
    let features = if analysis.features.is_empty() {
        "No features identified".to_string()
    } else {
        analysis.features.join(", ")
    };
    format!("Product: {} ({}), Features: {}", name, product_type, features)
}

fn style_summary(analysis: &ImageAnalysis) -> String {
    format!(
        "Style: {}, Mood: {}, Colors: {}, Typography: {}",
        or_placeholder(analysis.style.as_ref(), "Style not identified"),
        or_placeholder(analysis.mood.as_ref(), "Mood not identified"),
        or_placeholder(analysis.color_palette.as_ref(), "Colors not identified"),
        or_placeholder(analysis.typography.as_ref(), "Typography not identified"),
    )
}

fn text_summary(analysis: &TextAnalysis) -> String {
    format!(
        "Style: {}, Sentiment: {}, Keywords: {}",
        or_placeholder(analysis.style.as_ref(), "Style not identified"),
        or_placeholder(analysis.sentiment.as_ref(), "Sentiment not identified"),
        or_placeholder(analysis.keywords.as_ref(), "Keywords not identified"),
    )
}
