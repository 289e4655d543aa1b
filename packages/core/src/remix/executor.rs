use super::context::BrandInfo;
use super::director::OrchestrationTask;
use crate::error::{RemixError, RemixResult};
use crate::workspace::{Element, ImageElement};
use canvas_like_model_provider::{GenerativeModel, InlineImage, Part};
use canvas_like_types::{sync::CancellationToken, tokio};
use regex::Regex;
use std::sync::LazyLock;

static MENTION_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"@(\w+)").expect("mention pattern compiles"));

/// `@token` references in a free-text brief, deduplicated, in order of first
/// appearance.
pub fn extract_mentions(prompt: &str) -> Vec<String> {
    let mut mentions = Vec::new();
    for capture in MENTION_PATTERN.captures_iter(prompt) {
        let token = capture[1].to_string();
        if !mentions.contains(&token) {
            mentions.push(token);
        }
    }
    mentions
}

/// Image scoping: if any mentioned token matches a labeled image, the task
/// gets exactly the mentioned images; otherwise it gets all of them.
/// Mentions that resolve to nothing never shrink the set to zero.
fn select_images<'a>(mentions: &[String], elements: &[&'a Element]) -> Vec<&'a ImageElement> {
    let images: Vec<&ImageElement> = elements
        .iter()
        .filter_map(|element| match element {
            Element::Image(image) => Some(image),
            _ => None,
        })
        .collect();

    let mentioned: Vec<&ImageElement> = images
        .iter()
        .copied()
        .filter(|image| {
            image
                .label
                .as_deref()
                .is_some_and(|label| mentions.iter().any(|mention| mention == label))
        })
        .collect();

    if mentioned.is_empty() { images } else { mentioned }
}

fn inline_from_src(src: &str) -> Option<InlineImage> {
    match InlineImage::from_data_url(src) {
        Ok(image) => Some(image),
        Err(error) => {
            tracing::warn!(error = %error, "skipping image with unreadable source");
            None
        }
    }
}

fn build_parts(
    task: &OrchestrationTask,
    elements: &[&Element],
    brand_info: Option<&BrandInfo>,
) -> Vec<Part> {
    let mentions = extract_mentions(&task.prompt);
    let images = select_images(&mentions, elements);

    let mut parts = Vec::new();
    if let Some(logo) = brand_info.and_then(|info| info.logo.as_ref())
        && let Some(inline) = inline_from_src(&logo.src)
    {
        parts.push(Part::image(inline));
    }
    for image in images {
        if let Some(inline) = inline_from_src(&image.src) {
            parts.push(Part::image(inline));
        }
    }
    parts.push(Part::text(task.prompt.clone()));
    parts
}

async fn run_task(
    model: &dyn GenerativeModel,
    task: &OrchestrationTask,
    elements: &[&Element],
    brand_info: Option<&BrandInfo>,
    cancel: &CancellationToken,
) -> RemixResult<InlineImage> {
    let parts = build_parts(task, elements, brand_info);

    let response = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(RemixError::Cancelled),
        response = model.generate_media(&parts) => response?,
    };

    response
        .images
        .into_iter()
        .next()
        .ok_or_else(|| RemixError::Assembly {
            task_id: task.id.clone(),
        })
}

/// Execution phase: all tasks fan out concurrently; results come back in
/// task order regardless of completion timing. A single failed task aborts
/// the whole batch.
#[tracing::instrument(name = "executor::execute", skip_all, fields(tasks = tasks.len()), level = "debug")]
pub async fn execute(
    model: &dyn GenerativeModel,
    tasks: &[OrchestrationTask],
    elements: &[&Element],
    brand_info: Option<&BrandInfo>,
    cancel: &CancellationToken,
) -> RemixResult<Vec<InlineImage>> {
    let pending = tasks
        .iter()
        .map(|task| run_task(model, task, elements, brand_info, cancel));
    futures::future::try_join_all(pending).await
}
