//! Tool registry for managing available tools.

use super::{Tool, ToolSet};
use crate::llm::FunctionDeclaration;
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of available tools.
///
/// Tools are stored as `Arc<dyn Tool>` so one registry can be shared by
/// every agent in a run.
///
/// ```no_run
/// use assay_core::tool::{ToolRegistry, ToolSet};
///
/// let registry = ToolRegistry::new();
/// for name in registry.list() {
///     println!("Available: {}", name);
/// }
/// let tools = registry.filter(&ToolSet::Specific(vec!["calculator".into()]));
/// ```
#[derive(Debug, Default, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool, replacing any tool with the same name.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> &mut Self {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
        self
    }

    /// Register a tool that's already wrapped in Arc.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> &mut Self {
        self.tools.insert(tool.name().to_string(), tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// List all registered tool names, sorted alphabetically.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Tools matching a [`ToolSet`], sorted by name.
    pub fn filter(&self, tool_set: &ToolSet) -> Vec<Arc<dyn Tool>> {
        let mut tools: Vec<Arc<dyn Tool>> = self
            .tools
            .iter()
            .filter(|(name, _)| tool_set.matches(name))
            .map(|(_, tool)| Arc::clone(tool))
            .collect();
        tools.sort_by(|a, b| a.name().cmp(b.name()));
        tools
    }

    /// Function declarations for the tools matching a filter.
    pub fn to_function_declarations(&self, tool_set: &ToolSet) -> Vec<FunctionDeclaration> {
        self.filter(tool_set)
            .iter()
            .map(|tool| tool.to_function_declaration())
            .collect()
    }
}
