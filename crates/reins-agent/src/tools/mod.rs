pub mod think;
pub mod wikipedia;

pub use think::ThinkTool;
pub use wikipedia::WikipediaTool;

use crate::error::{AgentError, Result};
use crate::types::Tool;
use reins_core::{ActionId, Catalog};

// ---------------------------------------------------------------------------
// ToolSet
// ---------------------------------------------------------------------------

/// Name-indexed registry of the tools available to one run. The registry
/// derives the action catalog the requirements are validated against, and
/// validates tool names as action slugs at registration.
#[derive(Default)]
pub struct ToolSet {
    tools: Vec<(ActionId, Box<dyn Tool>)>,
}

impl ToolSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<()> {
        let name = ActionId::new(tool.name()).map_err(AgentError::Core)?;
        if self.get(&name).is_some() {
            return Err(AgentError::DuplicateTool(name.to_string()));
        }
        self.tools.push((name, tool));
        Ok(())
    }

    pub fn get(&self, name: &ActionId) -> Option<&dyn Tool> {
        self.tools
            .iter()
            .find(|(id, _)| id == name)
            .map(|(_, t)| t.as_ref())
    }

    /// The catalog induced by registration order. Registration already
    /// de-duplicated names, so this cannot fail.
    pub fn catalog(&self) -> Catalog {
        let mut catalog = Catalog::default();
        for (id, _) in &self.tools {
            let _ = catalog.register(id.clone());
        }
        catalog
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// The built-in tool set mirroring the stock agent: a reasoning
    /// scratchpad plus Wikipedia research.
    pub fn builtin() -> Result<Self> {
        let mut set = Self::new();
        set.register(Box::new(ThinkTool::new()))?;
        set.register(Box::new(WikipediaTool::new()))?;
        Ok(set)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_think_and_wikipedia() {
        let set = ToolSet::builtin().unwrap();
        let catalog = set.catalog();
        assert_eq!(catalog.len(), 2);
        assert!(catalog.contains(&"think".parse().unwrap()));
        assert!(catalog.contains(&"wikipedia".parse().unwrap()));
    }

    #[test]
    fn duplicate_registration_rejected() {
        let mut set = ToolSet::new();
        set.register(Box::new(ThinkTool::new())).unwrap();
        assert!(matches!(
            set.register(Box::new(ThinkTool::new())),
            Err(AgentError::DuplicateTool(_))
        ));
    }
}
