// SPDX-License-Identifier: MIT OR Apache-2.0
//! Registry of available node definitions.

use crate::node::{Node, NodeDefinition, NodeId};
use crate::port::CompatibilityMatrix;
use indexmap::IndexMap;

/// Separator between levels of a category path
pub const CATEGORY_SEPARATOR: char = '|';

/// Registry of node definitions plus the pin compatibility rules they share
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    /// Registered definitions by key
    definitions: IndexMap<String, NodeDefinition>,
    /// Category -> keys, kept in step with `definitions`
    categories: IndexMap<String, Vec<String>>,
    /// Pin compatibility
    compatibility: CompatibilityMatrix,
}

impl NodeRegistry {
    /// Create an empty registry with the standard compatibility matrix
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry with custom compatibility rules
    pub fn with_compatibility(compatibility: CompatibilityMatrix) -> Self {
        Self {
            compatibility,
            ..Self::default()
        }
    }

    /// Register a definition, replacing any previous one with the same key
    pub fn register(&mut self, definition: NodeDefinition) {
        let unresolved = definition.unresolved_placeholders();
        if !unresolved.is_empty() {
            tracing::warn!(
                "Definition '{}' template has unresolved placeholders: {:?}",
                definition.key,
                unresolved
            );
        }

        let key = definition.key.clone();
        if self.definitions.contains_key(&key) {
            self.unindex(&key);
        }
        self.categories
            .entry(definition.category.clone())
            .or_default()
            .push(key.clone());
        self.definitions.insert(key, definition);
    }

    /// Register many definitions
    pub fn register_batch(&mut self, definitions: impl IntoIterator<Item = NodeDefinition>) {
        for definition in definitions {
            self.register(definition);
        }
    }

    /// Remove a definition
    pub fn unregister(&mut self, key: &str) -> Option<NodeDefinition> {
        let removed = self.definitions.shift_remove(key)?;
        self.remove_from_category(&removed.category, key);
        Some(removed)
    }

    fn unindex(&mut self, key: &str) {
        if let Some(category) = self.definitions.get(key).map(|d| d.category.clone()) {
            self.remove_from_category(&category, key);
        }
    }

    fn remove_from_category(&mut self, category: &str, key: &str) {
        if let Some(keys) = self.categories.get_mut(category) {
            keys.retain(|k| k != key);
            if keys.is_empty() {
                self.categories.shift_remove(category);
            }
        }
    }

    /// Get a definition by key
    pub fn get(&self, key: &str) -> Option<&NodeDefinition> {
        self.definitions.get(key)
    }

    /// Whether a key is registered
    pub fn contains(&self, key: &str) -> bool {
        self.definitions.contains_key(key)
    }

    /// Get all registered definitions
    pub fn definitions(&self) -> impl Iterator<Item = &NodeDefinition> {
        self.definitions.values()
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether no definitions are registered
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Category names in registration order
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    /// Definitions in a category
    pub fn by_category(&self, category: &str) -> Vec<&NodeDefinition> {
        self.categories
            .get(category)
            .map(|keys| keys.iter().filter_map(|k| self.definitions.get(k)).collect())
            .unwrap_or_default()
    }

    /// Definitions whose title, key or keywords contain `query`, case-insensitively
    pub fn search(&self, query: &str) -> Vec<&NodeDefinition> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return self.definitions.values().collect();
        }
        self.definitions
            .values()
            .filter(|d| {
                d.title.to_lowercase().contains(&query)
                    || d.key.to_lowercase().contains(&query)
                    || d.keywords.to_lowercase().contains(&query)
            })
            .collect()
    }

    /// Definition bound to a palette hotkey
    pub fn by_hotkey(&self, key: char) -> Option<&NodeDefinition> {
        self.definitions
            .values()
            .find(|d| d.hotkey.is_some_and(|h| h.eq_ignore_ascii_case(&key)))
    }

    /// Instantiate a definition; unknown keys are logged and yield `None`
    pub fn create_instance(&self, key: &str, id: NodeId, position: [f32; 2]) -> Option<Node> {
        match self.get(key) {
            Some(definition) => Some(Node::new(definition, id, position)),
            None => {
                tracing::error!("Unknown node definition '{}'", key);
                None
            }
        }
    }

    /// Pin compatibility rules
    pub fn compatibility(&self) -> &CompatibilityMatrix {
        &self.compatibility
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn def(key: &str, category: &str) -> NodeDefinition {
        NodeDefinition::new(key, key, category, NodeKind::Expression)
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = NodeRegistry::new();
        registry.register(def("Add", "Math"));
        assert!(registry.contains("Add"));
        assert_eq!(registry.get("Add").map(|d| d.category.as_str()), Some("Math"));
        assert!(registry.get("Nope").is_none());
    }

    #[test]
    fn test_reregister_keeps_category_index_consistent() {
        let mut registry = NodeRegistry::new();
        registry.register_batch([def("Add", "Math"), def("Sine", "Math")]);
        registry.register(def("Add", "Math|Arithmetic"));
        registry.register(def("Add", "Math|Arithmetic"));

        assert_eq!(registry.len(), 2);
        let math: Vec<_> = registry.by_category("Math").iter().map(|d| d.key.clone()).collect();
        assert_eq!(math, vec!["Sine".to_string()]);
        assert_eq!(registry.by_category("Math|Arithmetic").len(), 1);
    }

    #[test]
    fn test_unregister_drops_empty_category() {
        let mut registry = NodeRegistry::new();
        registry.register(def("Comment", "Utility"));
        assert!(registry.unregister("Comment").is_some());
        assert!(registry.unregister("Comment").is_none());
        assert_eq!(registry.categories().count(), 0);
    }

    #[test]
    fn test_search() {
        let mut registry = NodeRegistry::new();
        registry.register(NodeDefinition::new("Lerp", "Linear Interpolate", "Math", NodeKind::Expression).keywords("mix blend"));
        registry.register(def("Add", "Math"));

        assert_eq!(registry.search("interp").len(), 1);
        assert_eq!(registry.search("LERP").len(), 1);
        assert_eq!(registry.search("mix").len(), 1);
        assert_eq!(registry.search("").len(), 2);
        assert!(registry.search("zzz").is_empty());
    }

    #[test]
    fn test_create_instance_unknown_key() {
        let registry = NodeRegistry::new();
        assert!(registry.create_instance("Missing", NodeId::new(), [0.0, 0.0]).is_none());
    }
}
