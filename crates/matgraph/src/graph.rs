// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and links.

use crate::connection::{Link, LinkId, PinRef};
use crate::node::{Node, NodeId, Pin};
use crate::port::{PinDirection, PinType};
use crate::registry::NodeRegistry;
use crate::settings::{CyclePolicy, GraphSettings};
use crate::value::Literal;
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::Arc;

/// A material graph bound to the registry its nodes were created from
#[derive(Debug, Clone)]
pub struct Graph {
    /// Graph name
    pub name: String,
    registry: Arc<NodeRegistry>,
    nodes: IndexMap<NodeId, Node>,
    links: IndexMap<LinkId, Link>,
    /// Protected terminal node
    root: Option<NodeId>,
    cycle_policy: CyclePolicy,
}

impl Graph {
    /// Create an empty graph
    pub fn new(name: impl Into<String>, registry: Arc<NodeRegistry>) -> Self {
        Self {
            name: name.into(),
            registry,
            nodes: IndexMap::new(),
            links: IndexMap::new(),
            root: None,
            cycle_policy: CyclePolicy::default(),
        }
    }

    /// Create a graph holding one protected root node of definition `root_key`
    pub fn with_root(name: impl Into<String>, registry: Arc<NodeRegistry>, root_key: &str) -> Self {
        let mut graph = Self::new(name, registry);
        graph.root = graph.add_node(root_key, 0.0, 0.0);
        if graph.root.is_none() {
            tracing::warn!("Graph '{}' created without a root node", graph.name);
        }
        graph
    }

    /// Create a graph configured from settings
    pub fn from_settings(
        name: impl Into<String>,
        registry: Arc<NodeRegistry>,
        settings: &GraphSettings,
    ) -> Self {
        let mut graph = Self::with_root(name, registry, &settings.root_definition);
        graph.cycle_policy = settings.cycle_policy;
        graph
    }

    /// Registry the graph instantiates nodes from
    pub fn registry(&self) -> &Arc<NodeRegistry> {
        &self.registry
    }

    /// The protected root node
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Designate an existing node as root
    pub fn set_root(&mut self, node_id: NodeId) -> Result<(), GraphError> {
        if !self.nodes.contains_key(&node_id) {
            return Err(GraphError::NodeNotFound(node_id));
        }
        self.root = Some(node_id);
        Ok(())
    }

    /// Cycle handling on connect
    pub fn cycle_policy(&self) -> CyclePolicy {
        self.cycle_policy
    }

    /// Change cycle handling for future connections
    pub fn set_cycle_policy(&mut self, policy: CyclePolicy) {
        self.cycle_policy = policy;
    }

    /// Instantiate a definition at `(x, y)` under a fresh id
    pub fn add_node(&mut self, key: &str, x: f32, y: f32) -> Option<NodeId> {
        if self.registry.get(key).is_some_and(|d| d.singleton)
            && self.nodes.values().any(|n| n.definition_key == key)
        {
            tracing::warn!("'{}' can only be instantiated once per graph", key);
            return None;
        }

        let node = self.registry.create_instance(key, NodeId::new(), [x, y])?;
        let id = node.id;
        self.nodes.insert(id, node);
        tracing::debug!("Added node '{}' ({})", key, id);
        Some(id)
    }

    /// Insert an already-built node, keeping its id
    pub(crate) fn insert_node(&mut self, node: Node) -> NodeId {
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node after severing every link that touches it
    pub fn remove_node(&mut self, node_id: NodeId) -> Result<Node, GraphError> {
        if self.root == Some(node_id) {
            tracing::warn!("Cannot delete the material output node");
            return Err(GraphError::ProtectedNode(node_id));
        }
        if !self.nodes.contains_key(&node_id) {
            return Err(GraphError::NodeNotFound(node_id));
        }

        let attached: Vec<LinkId> = self
            .links
            .values()
            .filter(|l| l.involves_node(node_id))
            .map(|l| l.id)
            .collect();
        for link_id in attached {
            self.disconnect(link_id);
        }

        self.nodes
            .shift_remove(&node_id)
            .ok_or(GraphError::NodeNotFound(node_id))
    }

    /// Get a node by ID
    pub fn node(&self, node_id: NodeId) -> Option<&Node> {
        self.nodes.get(&node_id)
    }

    /// Get all nodes
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get a pin by reference
    pub fn pin(&self, pin: &PinRef) -> Option<&Pin> {
        self.nodes.get(&pin.node)?.pin(&pin.pin)
    }

    /// Move a node
    pub fn set_position(&mut self, node_id: NodeId, position: [f32; 2]) -> bool {
        match self.nodes.get_mut(&node_id) {
            Some(node) => {
                node.position = position;
                true
            }
            None => false,
        }
    }

    /// Replace the value of an existing property, returning the previous one
    pub fn set_property(&mut self, node_id: NodeId, name: &str, value: Literal) -> Option<Literal> {
        let slot = self.nodes.get_mut(&node_id)?.properties.get_mut(name);
        match slot {
            Some(slot) => Some(std::mem::replace(slot, value)),
            None => {
                tracing::debug!("Node {} has no property '{}'", node_id, name);
                None
            }
        }
    }

    /// Set or clear the instance default of a pin
    pub fn set_pin_default(&mut self, pin: &PinRef, value: Option<Literal>) -> bool {
        match self.nodes.get_mut(&pin.node).and_then(|n| n.pin_mut(&pin.pin)) {
            Some(p) => {
                p.default_value = value;
                true
            }
            None => false,
        }
    }

    /// Link two pins given in either order.
    ///
    /// An input that is already linked has its link replaced.
    pub fn connect(&mut self, a: &PinRef, b: &PinRef) -> Result<LinkId, ConnectionError> {
        self.connect_as(a, b, LinkId::new())
    }

    /// [`Self::connect`] with a caller-chosen link id
    pub(crate) fn connect_as(
        &mut self,
        a: &PinRef,
        b: &PinRef,
        id: LinkId,
    ) -> Result<LinkId, ConnectionError> {
        let (direction_a, type_a) = self.pin_signature(a)?;
        let (direction_b, type_b) = self.pin_signature(b)?;

        if direction_a == direction_b {
            tracing::warn!("Cannot connect {} to {}: same direction", a, b);
            return Err(ConnectionError::SameDirection);
        }

        let ((from, output), (to, input)) = if direction_a == PinDirection::Out {
            ((a, type_a), (b, type_b))
        } else {
            ((b, type_b), (a, type_a))
        };

        if !self.registry.compatibility().can_connect(output, input) {
            tracing::warn!("Incompatible types: {} -> {}", output, input);
            return Err(ConnectionError::IncompatibleTypes { output, input });
        }

        if self.cycle_policy == CyclePolicy::Reject && self.depends_on(from.node, to.node) {
            tracing::warn!("Connecting {} to {} would create a cycle", from, to);
            return Err(ConnectionError::WouldCreateCycle);
        }

        let replaced: Vec<LinkId> = self
            .pin(to)
            .map(|p| p.links.clone())
            .unwrap_or_default();
        for link_id in replaced {
            tracing::debug!("Replacing link {} on {}", link_id, to);
            self.disconnect(link_id);
        }

        let link = Link {
            id,
            from: from.clone(),
            to: to.clone(),
            pin_type: output,
        };
        for end in [from, to] {
            if let Some(pin) = self.nodes.get_mut(&end.node).and_then(|n| n.pin_mut(&end.pin)) {
                pin.links.push(id);
            }
        }
        self.links.insert(id, link);
        Ok(id)
    }

    fn pin_signature(&self, pin: &PinRef) -> Result<(PinDirection, PinType), ConnectionError> {
        let node = self
            .nodes
            .get(&pin.node)
            .ok_or(ConnectionError::NodeNotFound(pin.node))?;
        let p = node
            .pin(&pin.pin)
            .ok_or_else(|| ConnectionError::PinNotFound(pin.clone()))?;
        Ok((p.direction, p.pin_type))
    }

    /// Whether `node` transitively consumes the output of `upstream`
    pub fn depends_on(&self, node: NodeId, upstream: NodeId) -> bool {
        let mut stack = vec![node];
        let mut seen = HashSet::new();
        while let Some(current) = stack.pop() {
            if current == upstream {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            stack.extend(self.links_into_node(current).map(|l| l.from.node));
        }
        false
    }

    /// Remove a link; unknown ids are ignored
    pub fn disconnect(&mut self, link_id: LinkId) -> Option<Link> {
        let link = self.links.shift_remove(&link_id)?;
        for end in [&link.from, &link.to] {
            if let Some(pin) = self.nodes.get_mut(&end.node).and_then(|n| n.pin_mut(&end.pin)) {
                pin.links.retain(|l| *l != link_id);
            }
        }
        Some(link)
    }

    /// Remove every link attached to a pin
    pub fn break_pin_links(&mut self, pin: &PinRef) -> usize {
        let attached = self.pin(pin).map(|p| p.links.clone()).unwrap_or_default();
        attached
            .into_iter()
            .filter_map(|id| self.disconnect(id))
            .count()
    }

    /// Get a link by ID
    pub fn link(&self, link_id: LinkId) -> Option<&Link> {
        self.links.get(&link_id)
    }

    /// Get all links
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.values()
    }

    /// Get the number of links
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// The link feeding an input pin
    pub fn link_into(&self, pin: &PinRef) -> Option<&Link> {
        self.links.values().find(|l| l.to == *pin)
    }

    /// Links leaving an output pin
    pub fn links_from<'a>(&'a self, pin: &'a PinRef) -> impl Iterator<Item = &'a Link> {
        self.links.values().filter(move |l| l.from == *pin)
    }

    /// Links feeding any input of a node
    pub fn links_into_node(&self, node_id: NodeId) -> impl Iterator<Item = &Link> {
        self.links.values().filter(move |l| l.to.node == node_id)
    }

    /// Nodes `root` depends on, producers before consumers, ending with `root`.
    ///
    /// Cycles are cut at the first re-entered node.
    pub fn upstream_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        if self.nodes.contains_key(&root) {
            self.visit(root, &mut visited, &mut order);
        }
        order
    }

    fn visit(&self, node_id: NodeId, visited: &mut HashSet<NodeId>, order: &mut Vec<NodeId>) {
        if !visited.insert(node_id) {
            return;
        }
        let Some(node) = self.nodes.get(&node_id) else {
            return;
        };

        // Declared input order keeps the output stable
        for pin in &node.inputs {
            for link_id in &pin.links {
                if let Some(link) = self.links.get(link_id) {
                    self.visit(link.from.node, visited, order);
                }
            }
        }
        order.push(node_id);
    }
}

/// Error when creating a link
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Pin not found
    #[error("Pin not found: {0}")]
    PinNotFound(PinRef),

    /// Both pins are inputs or both are outputs
    #[error("Cannot connect two pins of the same direction")]
    SameDirection,

    /// Types are not compatible
    #[error("Incompatible types: {output} -> {input}")]
    IncompatibleTypes {
        /// Output pin type
        output: PinType,
        /// Input pin type
        input: PinType,
    },

    /// Refused under [`CyclePolicy::Reject`]
    #[error("Connection would create a cycle")]
    WouldCreateCycle,
}

/// Error from a structural graph edit
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// Node not found
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// The root node cannot be removed
    #[error("Node {0} is the material output and cannot be deleted")]
    ProtectedNode(NodeId),
}
