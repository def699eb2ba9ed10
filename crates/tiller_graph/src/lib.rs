pub mod decision;
pub mod execution;
pub mod graph;
pub mod llm;
pub mod parser;
pub mod prompt;
pub mod providers;
pub mod retry;
pub mod router;
pub mod schema;

pub use graph::{AgentGraph, RunOutcome, RunReport};
pub use llm::{CompletionParams, LlmClient};
