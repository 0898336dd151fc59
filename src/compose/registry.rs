//! Symbol tables for user-defined components and layouts

use std::collections::BTreeMap;

use crate::ast::Definition;

/// Which namespace a definition was declared in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefinitionKind {
    Component,
    Layout,
}

impl DefinitionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DefinitionKind::Component => "component",
            DefinitionKind::Layout => "layout",
        }
    }
}

/// Name -> definition tables for both macro namespaces.
///
/// All definitions are registered before any screen is lowered, so a macro
/// may be invoked in a screen that textually precedes its definition.
/// Declaration order is preserved for diagnostics.
#[derive(Debug, Default)]
pub struct DefinitionRegistry {
    components: BTreeMap<String, Definition>,
    layouts: BTreeMap<String, Definition>,
    order: Vec<(DefinitionKind, String)>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a defined component; returns false when the name replaces an
    /// earlier declaration (last one wins).
    pub fn register_component(&mut self, def: Definition) -> bool {
        let fresh = self
            .components
            .insert(def.name.clone(), def.clone())
            .is_none();
        if fresh {
            self.order.push((DefinitionKind::Component, def.name));
        }
        fresh
    }

    /// Register a defined layout; returns false on replacement.
    pub fn register_layout(&mut self, def: Definition) -> bool {
        let fresh = self.layouts.insert(def.name.clone(), def.clone()).is_none();
        if fresh {
            self.order.push((DefinitionKind::Layout, def.name));
        }
        fresh
    }

    pub fn component(&self, name: &str) -> Option<&Definition> {
        self.components.get(name)
    }

    pub fn layout(&self, name: &str) -> Option<&Definition> {
        self.layouts.get(name)
    }

    /// True when the name resolves in either namespace
    pub fn is_defined(&self, name: &str) -> bool {
        self.components.contains_key(name) || self.layouts.contains_key(name)
    }

    /// Declaration order across both namespaces
    pub fn declaration_order(&self) -> &[(DefinitionKind, String)] {
        &self.order
    }

    pub fn clear(&mut self) {
        self.components.clear();
        self.layouts.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::SourceNode;

    fn def(name: &str) -> Definition {
        Definition::new(name, SourceNode::component("Text").with_prop("text", "x"))
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = DefinitionRegistry::new();
        assert!(registry.register_component(def("UserCard")));
        assert!(registry.register_layout(def("Shell")));

        assert!(registry.component("UserCard").is_some());
        assert!(registry.layout("Shell").is_some());
        assert!(registry.component("Shell").is_none());
        assert!(registry.is_defined("UserCard"));
        assert!(registry.is_defined("Shell"));
        assert!(!registry.is_defined("Ghost"));
    }

    #[test]
    fn test_duplicate_replaces_and_reports() {
        let mut registry = DefinitionRegistry::new();
        assert!(registry.register_component(def("UserCard")));
        assert!(!registry.register_component(def("UserCard")));
        assert_eq!(registry.declaration_order().len(), 1);
    }

    #[test]
    fn test_declaration_order_spans_namespaces() {
        let mut registry = DefinitionRegistry::new();
        registry.register_component(def("A"));
        registry.register_layout(def("B"));
        registry.register_component(def("C"));

        let order: Vec<&str> = registry
            .declaration_order()
            .iter()
            .map(|(_, name)| name.as_str())
            .collect();
        assert_eq!(order, vec!["A", "B", "C"]);
    }
}
