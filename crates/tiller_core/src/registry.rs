//! Name-keyed catalog of invocable tools.
//!
//! Built once at startup by composing independent tool definitions, read-only
//! afterwards. Registration order is preserved so the catalog — and therefore
//! the rendered decision prompt — is deterministic for a given registry.

use crate::error::RegistryError;
use crate::tool::ToolSpec;
use crate::turn::ToolOutcome;
use std::collections::HashMap;
use std::sync::Arc;

/// An invocable capability. Implementations must eventually return or fail;
/// surrounding timeouts are the implementation's own responsibility.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute with arguments already validated against the tool's schema.
    async fn execute(&self, arguments: &serde_json::Map<String, serde_json::Value>) -> ToolOutcome;
}

/// A spec paired with its executor.
pub struct RegisteredTool {
    pub spec: ToolSpec,
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for RegisteredTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Handlers are opaque trait objects; the spec identifies the tool.
        f.debug_struct("RegisteredTool")
            .field("spec", &self.spec)
            .finish_non_exhaustive()
    }
}

#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<RegisteredTool>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Fails if the name is already taken — two tools with
    /// the same name would make dispatch ambiguous.
    pub fn register(
        &mut self,
        spec: ToolSpec,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<(), RegistryError> {
        if self.index.contains_key(&spec.name) {
            return Err(RegistryError::DuplicateName(spec.name.clone()));
        }
        tracing::debug!(tool = %spec.name, "registered tool");
        self.index.insert(spec.name.clone(), self.entries.len());
        self.entries.push(RegisteredTool { spec, handler });
        Ok(())
    }

    /// Look up a tool by exact (case-sensitive) name.
    pub fn lookup(&self, name: &str) -> Result<&RegisteredTool, RegistryError> {
        self.index
            .get(name)
            .map(|&i| &self.entries[i])
            .ok_or_else(|| RegistryError::UnknownTool(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Iterate specs in registration order. Restartable: every call yields
    /// the same sequence for an unmutated registry.
    pub fn catalog(&self) -> impl Iterator<Item = &ToolSpec> + '_ {
        self.entries.iter().map(|e| &e.spec)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
