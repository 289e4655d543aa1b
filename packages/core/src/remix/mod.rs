pub mod analyze;
pub mod context;
pub mod director;
pub mod executor;
pub mod palette;
pub mod progress;
pub mod summary;
pub mod video;

pub use context::{BrandInfo, RemixContext, resolve};
pub use director::{OrchestrationPlan, OrchestrationTask, SOCIAL_TEMPLATE_TASK, plan};
pub use executor::{execute, extract_mentions};
pub use progress::{POLL_INTERVAL, PROGRESS_MESSAGES, ProgressCallback, await_operation};
pub use summary::{ContextSummary, summarize};
pub use video::generate_video;
