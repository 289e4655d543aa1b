pub use anyhow::{Error, Result, anyhow, bail};
pub use async_trait::async_trait;
pub use base64;
pub use cuid2::create_id;
pub use reqwest;
pub use schemars::JsonSchema;
pub use serde_json::Value;
pub use tokio;
pub use tracing;

/// JSON plumbing. Brings the serde derives along so call sites can do
/// `use canvas_like_types::json::{Deserialize, Serialize}`.
pub mod json {
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::*;
}

pub mod sync {
    pub use dashmap::DashMap;
    pub use tokio::sync::{Mutex, RwLock, mpsc, oneshot, watch};
    pub use tokio_util::sync::CancellationToken;
}
