pub mod config;
pub mod error;
pub mod registry;
pub mod run;
pub mod tool;
pub mod turn;

pub use config::{LlmConfig, RunConfig, TillerConfig};
pub use error::{FailureReason, ParseErrorKind, ParseFailure, RegistryError};
pub use registry::{ToolHandler, ToolRegistry};
pub use run::RunContext;
pub use tool::{ParamField, ParamKind, ParamSchema, ToolSpec};
pub use turn::{Intent, ToolOutcome, Transcript, Turn};
