//! Built-in tools and a ready-made registry for the demo agent.

pub mod calculator;

pub use calculator::{add_spec, multiply_spec, AddHandler, MultiplyHandler};

use std::sync::Arc;
use tiller_core::ToolRegistry;

/// Registry with the built-in calculator tools.
pub fn builtin_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry
        .register(add_spec(), Arc::new(AddHandler))
        .expect("builtin tool names are unique");
    registry
        .register(multiply_spec(), Arc::new(MultiplyHandler))
        .expect("builtin tool names are unique");
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry_contents() {
        let registry = builtin_registry();
        assert!(registry.contains("add"));
        assert!(registry.contains("multiply"));
        assert_eq!(registry.len(), 2);
    }
}
