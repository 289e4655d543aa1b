pub mod error;
pub mod persistence;
pub mod remix;
pub mod state;
pub mod workspace;

pub use error::{RemixError, RemixResult};
pub use state::CanvasWorkspace;
