use super::summary::ContextSummary;
use crate::error::{RemixError, RemixResult};
use canvas_like_model_provider::GenerativeModel;
use canvas_like_types::{
    JsonSchema, Value,
    json::{self, Deserialize, Serialize},
};
use std::fmt::Write;

/// Task type produced for the execution phase. Plans may carry other types;
/// those are ignored, not errored.
pub const SOCIAL_TEMPLATE_TASK: &str = "socialMediaTemplate";

/// Number of template tasks a plan is asked to carry.
pub const TEMPLATE_TASK_COUNT: usize = 4;

/// One enumerated creative direction per requested task, so the four
/// outputs are not near-duplicates.
pub const CREATIVE_DIRECTIONS: [&str; TEMPLATE_TASK_COUNT] = [
    "minimalist and typography-led, generous negative space",
    "bold and color-blocked, high contrast, oversized headline",
    "editorial and photographic, refined layout, subtle typography",
    "playful collage, layered cutouts, energetic composition",
];

/// One independent synthesis task. The prompt is a complete, self-contained
/// natural-language brief; asset references travel inside it as `@label`
/// tokens.
#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct OrchestrationTask {
    pub id: String,
    #[serde(rename = "type")]
    pub task_type: String,
    pub description: String,
    pub prompt: String,
    /// Reserved. Carried on the wire, but execution fans out all tasks
    /// unconditionally and never schedules by this field.
    #[serde(default)]
    pub dependencies: Vec<String>,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, Default, PartialEq)]
pub struct OrchestrationPlan {
    pub tasks: Vec<OrchestrationTask>,
}

pub fn plan_schema() -> Value {
    schemars::schema_for!(OrchestrationPlan).to_value()
}

/// Planning phase: one structured round-trip to the model, returning the
/// template tasks of the plan in order. Zero usable tasks is a hard error.
#[tracing::instrument(name = "director::plan", skip(model, user_goal, summary), level = "debug")]
pub async fn plan(
    model: &dyn GenerativeModel,
    user_goal: &str,
    summary: &ContextSummary,
    image_count: usize,
) -> RemixResult<Vec<OrchestrationTask>> {
    let schema = plan_schema();
    let prompt = build_director_prompt(user_goal, summary, image_count);

    let value = model.generate_structured(&prompt, &schema).await?;
    jsonschema::validate(&schema, &value)
        .map_err(|e| RemixError::Planner(format!("plan failed schema validation: {e}")))?;
    let plan: OrchestrationPlan =
        json::from_value(value).map_err(|e| RemixError::Planner(e.to_string()))?;

    let tasks: Vec<OrchestrationTask> = plan
        .tasks
        .into_iter()
        .filter(|task| task.task_type == SOCIAL_TEMPLATE_TASK)
        .collect();

    if tasks.is_empty() {
        return Err(RemixError::Planner(
            "the plan contained no template tasks".to_string(),
        ));
    }

    tracing::debug!(tasks = tasks.len(), "planning phase produced a task list");
    Ok(tasks)
}

fn build_director_prompt(user_goal: &str, summary: &ContextSummary, image_count: usize) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are the creative director for a social media design studio."
    );
    let _ = writeln!(prompt, "The user's goal: {}", user_goal);
    let _ = writeln!(prompt);
    let _ = writeln!(prompt, "Connected boards and their assets:");
    let _ = writeln!(prompt, "{}", summary.boards_text);
    if !summary.brand_text.is_empty() {
        let _ = writeln!(prompt, "Brand context:");
        let _ = writeln!(prompt, "{}", summary.brand_text);
    }
    let _ = writeln!(
        prompt,
        "{} source images are available and will be attached to each task.",
        image_count
    );
    let _ = writeln!(prompt);
    let _ = writeln!(
        prompt,
        "Produce exactly {} tasks of type \"{}\".",
        TEMPLATE_TASK_COUNT, SOCIAL_TEMPLATE_TASK
    );
    let _ = writeln!(
        prompt,
        "Each task's prompt must be a complete, self-contained brief for one \
         finished social media template: reference the assets to use with \
         their @label tokens, spell out exact hex colors from the brand and \
         analysis above, and describe layout, headline treatment and \
         background in full sentences."
    );
    let _ = writeln!(
        prompt,
        "Give each of the four briefs a distinct creative direction, one per \
         task, in this order:"
    );
    for (index, direction) in CREATIVE_DIRECTIONS.iter().enumerate() {
        let _ = writeln!(prompt, "{}. {}", index + 1, direction);
    }
    prompt
}
