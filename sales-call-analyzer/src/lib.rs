pub mod agents;
pub mod config;
pub mod controller;
pub mod error;
pub mod models;
pub mod pdf_extract;
pub mod prompts;
pub mod render;
pub mod runtime;
pub mod service;
pub mod session;

pub use config::Settings;
pub use controller::{Upload, WorkflowController};
pub use error::{AgentError, ExtractionError, SetupError};
pub use models::*;
pub use runtime::AgentRuntime;
pub use service::{AppState, build_router, create_app};
