//! Component registry
//!
//! Libraries are built once and then read-only. Use [`ComponentLibrary::builder`]
//! to register definitions, then `.build()` to get the immutable library the
//! resolver borrows.

use super::ComponentDef;
use indexmap::IndexMap;
use tracing::warn;

/// Read-only lookup of component definitions by name
pub trait Registry {
    /// Get a definition by name
    fn get(&self, name: &str) -> Option<&ComponentDef>;

    /// Check if a definition exists
    fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// All definitions in registration order
    fn iter(&self) -> impl Iterator<Item = &ComponentDef>;

    /// Number of definitions
    fn len(&self) -> usize;

    /// Check if the registry is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Ordered, immutable set of component definitions
#[derive(Debug, Clone, Default)]
pub struct ComponentLibrary {
    components: IndexMap<String, ComponentDef>,
}

impl ComponentLibrary {
    /// Start building a library
    pub fn builder() -> ComponentLibraryBuilder {
        ComponentLibraryBuilder::default()
    }

    /// Registered names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }
}

impl Registry for ComponentLibrary {
    fn get(&self, name: &str) -> Option<&ComponentDef> {
        self.components.get(name)
    }

    fn iter(&self) -> impl Iterator<Item = &ComponentDef> {
        self.components.values()
    }

    fn len(&self) -> usize {
        self.components.len()
    }
}

/// Accumulates definitions for a [`ComponentLibrary`]
#[derive(Debug, Default)]
pub struct ComponentLibraryBuilder {
    components: IndexMap<String, ComponentDef>,
}

impl ComponentLibraryBuilder {
    /// Register a definition; a later definition with the same name replaces
    /// the earlier one in place
    pub fn register(mut self, def: ComponentDef) -> Self {
        if self.components.contains_key(def.name()) {
            warn!(component = def.name(), "component registered twice, keeping the later definition");
        }
        self.components.insert(def.name().to_string(), def);
        self
    }

    /// Build the immutable library
    pub fn build(self) -> ComponentLibrary {
        ComponentLibrary {
            components: self.components,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_and_order() {
        let library = ComponentLibrary::builder()
            .register(ComponentDef::new("B"))
            .register(ComponentDef::new("A").with_prototype("B"))
            .build();
        assert_eq!(library.len(), 2);
        assert!(library.contains("A"));
        assert!(!library.contains("C"));
        assert_eq!(library.names().collect::<Vec<_>>(), vec!["B", "A"]);
        assert_eq!(library.get("A").and_then(ComponentDef::prototype), Some("B"));
    }

    #[test]
    fn duplicate_registration_replaces() {
        let library = ComponentLibrary::builder()
            .register(ComponentDef::new("A").with_property("v", 1i64))
            .register(ComponentDef::new("B"))
            .register(ComponentDef::new("A").with_property("v", 2i64))
            .build();
        assert_eq!(library.len(), 2);
        assert_eq!(library.names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(
            library.get("A").unwrap().properties()["v"],
            crate::value::Value::from(2i64)
        );
    }

    #[test]
    fn empty_library() {
        let library = ComponentLibrary::default();
        assert!(library.is_empty());
        assert_eq!(library.iter().count(), 0);
    }
}
