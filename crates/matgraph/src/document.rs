// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph documents: the persisted form of a [`Graph`].
//!
//! A node is stored as `{id, definition_key, position, properties}` plus any
//! pin defaults edited on the instance; everything else is rebuilt from the
//! registry on load. Loading is forgiving: records that no longer match the
//! registry are skipped with a warning rather than failing the whole document.

use crate::connection::{LinkId, PinRef};
use crate::graph::Graph;
use crate::node::NodeId;
use crate::registry::NodeRegistry;
use crate::settings::GraphSettings;
use crate::value::Literal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Current document format version
pub const DOCUMENT_FORMAT_VERSION: u32 = 1;

/// Document file extension
pub const DOCUMENT_EXTENSION: &str = "matgraph";

/// Serialized node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    /// Instance id
    pub id: NodeId,
    /// Definition key
    pub definition_key: String,
    /// Position in the graph UI
    pub position: [f32; 2],
    /// Property values
    #[serde(default)]
    pub properties: IndexMap<String, Literal>,
    /// Pin defaults that differ from the definition's
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub pin_defaults: IndexMap<String, Option<Literal>>,
}

/// Serialized link
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkRecord {
    /// Link id
    pub id: LinkId,
    /// Producing output pin
    pub from: PinRef,
    /// Consuming input pin
    pub to: PinRef,
}

/// A saved graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    /// Format version
    pub version: u32,
    /// Graph name
    pub name: String,
    /// Protected root node
    #[serde(default)]
    pub root: Option<NodeId>,
    /// Nodes
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    /// Links
    #[serde(default)]
    pub links: Vec<LinkRecord>,
}

/// Document load/save error
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed RON
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Written by a newer version
    #[error("Document version {found} is newer than supported version {supported}")]
    UnsupportedVersion {
        /// Version in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },
}

impl GraphDocument {
    /// Parse from RON
    pub fn from_ron(s: &str) -> Result<Self, DocumentError> {
        let document: GraphDocument = ron::from_str(s)?;

        if document.version > DOCUMENT_FORMAT_VERSION {
            return Err(DocumentError::UnsupportedVersion {
                found: document.version,
                supported: DOCUMENT_FORMAT_VERSION,
            });
        }

        Ok(document)
    }

    /// Serialize to RON
    pub fn to_ron(&self) -> Result<String, DocumentError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_ron(&content)
    }

    /// Save to a file
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        std::fs::write(path, self.to_ron()?)?;
        Ok(())
    }
}

impl Graph {
    /// Snapshot the graph as a document
    pub fn to_document(&self) -> GraphDocument {
        let nodes = self
            .nodes()
            .map(|node| {
                let definition = self.registry().get(&node.definition_key);
                let pin_defaults = node
                    .pins()
                    .filter(|pin| {
                        let declared = definition
                            .and_then(|d| d.pin_spec(&pin.id))
                            .and_then(|spec| spec.default_value.as_ref());
                        declared != pin.default_value.as_ref()
                    })
                    .map(|pin| (pin.id.clone(), pin.default_value.clone()))
                    .collect();

                NodeRecord {
                    id: node.id,
                    definition_key: node.definition_key.clone(),
                    position: node.position,
                    properties: node.properties.clone(),
                    pin_defaults,
                }
            })
            .collect();

        let links = self
            .links()
            .map(|link| LinkRecord {
                id: link.id,
                from: link.from.clone(),
                to: link.to.clone(),
            })
            .collect();

        GraphDocument {
            version: DOCUMENT_FORMAT_VERSION,
            name: self.name.clone(),
            root: self.root(),
            nodes,
            links,
        }
    }

    /// Rebuild a graph against `registry` with default settings.
    ///
    /// Unknown definitions, properties and pins are skipped, as are links that
    /// no longer connect.
    pub fn from_document(registry: Arc<NodeRegistry>, document: &GraphDocument) -> Self {
        Self::from_document_with_settings(registry, document, &GraphSettings::default())
    }

    /// Rebuild a graph, applying `settings` before any link is restored.
    ///
    /// Under [`CyclePolicy::Reject`](crate::settings::CyclePolicy::Reject)
    /// stored links that would close a cycle are skipped like any other
    /// invalid link.
    pub fn from_document_with_settings(
        registry: Arc<NodeRegistry>,
        document: &GraphDocument,
        settings: &GraphSettings,
    ) -> Self {
        let mut graph = Graph::new(document.name.clone(), registry.clone());
        graph.set_cycle_policy(settings.cycle_policy);

        for record in &document.nodes {
            let singleton = registry
                .get(&record.definition_key)
                .is_some_and(|d| d.singleton);
            if singleton && graph.nodes().any(|n| n.definition_key == record.definition_key) {
                tracing::warn!("Skipping duplicate '{}' node {}", record.definition_key, record.id);
                continue;
            }

            let Some(mut node) =
                registry.create_instance(&record.definition_key, record.id, record.position)
            else {
                tracing::warn!("Skipping node {} with unknown type '{}'", record.id, record.definition_key);
                continue;
            };

            for (name, value) in &record.properties {
                match node.properties.get_mut(name) {
                    Some(slot) => *slot = value.clone(),
                    None => tracing::warn!("Ignoring unknown property '{}' on {}", name, record.id),
                }
            }
            for (pin_id, value) in &record.pin_defaults {
                match node.pin_mut(pin_id) {
                    Some(pin) => pin.default_value = value.clone(),
                    None => tracing::warn!("Ignoring default for unknown pin '{}' on {}", pin_id, record.id),
                }
            }

            graph.insert_node(node);
        }

        if let Some(root) = document.root {
            if graph.set_root(root).is_err() {
                tracing::warn!("Root node {} missing from document '{}'", root, document.name);
            }
        }

        for link in &document.links {
            if let Err(e) = graph.connect_as(&link.from, &link.to, link.id) {
                tracing::warn!("Skipping link {}: {}", link.id, e);
            }
        }

        graph
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::create_material_registry;
    use crate::settings::CyclePolicy;

    fn sample_graph() -> (Graph, NodeId) {
        let registry = Arc::new(create_material_registry());
        let mut graph = Graph::with_root("Brick", registry, "MaterialOutput");
        let root = graph.root().unwrap();
        let c = graph.add_node("Constant", 10.0, 20.0).unwrap();
        graph.set_property(c, "R", Literal::Float(0.8));
        graph.set_pin_default(&PinRef::new(root, "Specular"), Some(Literal::Float(0.2)));
        graph.connect(&PinRef::new(c, "Output"), &PinRef::new(root, "Metallic")).unwrap();
        (graph, c)
    }

    #[test]
    fn test_document_round_trip() {
        let (graph, c) = sample_graph();
        let document = graph.to_document();
        assert_eq!(document.nodes.len(), 2);
        assert_eq!(document.links.len(), 1);

        let ron_str = document.to_ron().unwrap();
        let parsed = GraphDocument::from_ron(&ron_str).unwrap();
        assert_eq!(parsed, document);

        let rebuilt = Graph::from_document(graph.registry().clone(), &parsed);
        assert_eq!(rebuilt.root(), graph.root());
        assert_eq!(rebuilt.node_count(), 2);
        assert_eq!(rebuilt.link_count(), 1);
        assert_eq!(rebuilt.node(c).unwrap().property("R"), Some(&Literal::Float(0.8)));
        assert_eq!(rebuilt.node(c).unwrap().position, [10.0, 20.0]);

        let specular = rebuilt.pin(&PinRef::new(graph.root().unwrap(), "Specular")).unwrap();
        assert_eq!(specular.default_value, Some(Literal::Float(0.2)));
        assert_eq!(rebuilt.links().next().map(|l| l.id), graph.links().next().map(|l| l.id));
    }

    #[test]
    fn test_unchanged_pin_defaults_are_not_stored() {
        let (graph, c) = sample_graph();
        let document = graph.to_document();
        let constant = document.nodes.iter().find(|n| n.id == c).unwrap();
        assert!(constant.pin_defaults.is_empty());
    }

    #[test]
    fn test_load_skips_unknown_records() {
        let (graph, c) = sample_graph();
        let mut document = graph.to_document();
        let ghost = NodeId::new();
        document.nodes.push(NodeRecord {
            id: ghost,
            definition_key: "RetiredNode".into(),
            position: [0.0, 0.0],
            properties: IndexMap::new(),
            pin_defaults: IndexMap::new(),
        });
        document.links.push(LinkRecord {
            id: LinkId::new(),
            from: PinRef::new(ghost, "Output"),
            to: PinRef::new(c, "Output"),
        });
        if let Some(constant) = document.nodes.iter_mut().find(|n| n.id == c) {
            constant.properties.insert("Legacy".into(), Literal::Bool(true));
        }

        let rebuilt = Graph::from_document(graph.registry().clone(), &document);
        assert_eq!(rebuilt.node_count(), 2);
        assert_eq!(rebuilt.link_count(), 1);
        assert!(rebuilt.node(c).unwrap().property("Legacy").is_none());
    }

    #[test]
    fn test_load_keeps_cycle_policy() {
        let registry = Arc::new(create_material_registry());
        let mut graph = Graph::new("Loop", registry.clone());
        let a = graph.add_node("Add", 0.0, 0.0).unwrap();
        let b = graph.add_node("Add", 0.0, 0.0).unwrap();
        graph.connect(&PinRef::new(a, "Result"), &PinRef::new(b, "A")).unwrap();
        graph.connect(&PinRef::new(b, "Result"), &PinRef::new(a, "A")).unwrap();
        let document = graph.to_document();

        let settings = GraphSettings {
            cycle_policy: CyclePolicy::Reject,
            ..GraphSettings::default()
        };
        let strict = Graph::from_document_with_settings(registry.clone(), &document, &settings);
        assert_eq!(strict.cycle_policy(), CyclePolicy::Reject);
        assert_eq!(strict.link_count(), 1);
        assert!(matches!(
            strict.clone().connect(&PinRef::new(b, "Result"), &PinRef::new(a, "B")),
            Err(crate::graph::ConnectionError::WouldCreateCycle)
        ));

        let lenient = Graph::from_document(registry, &document);
        assert_eq!(lenient.cycle_policy(), CyclePolicy::Allow);
        assert_eq!(lenient.link_count(), 2);
    }

    #[test]
    fn test_newer_version_rejected() {
        let (graph, _) = sample_graph();
        let mut document = graph.to_document();
        document.version = DOCUMENT_FORMAT_VERSION + 1;
        let ron_str = document.to_ron().unwrap();
        assert!(matches!(
            GraphDocument::from_ron(&ron_str),
            Err(DocumentError::UnsupportedVersion { .. })
        ));
    }
}
