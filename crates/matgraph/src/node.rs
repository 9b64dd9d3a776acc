// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions and node instances.

use crate::connection::LinkId;
use crate::evaluation::math::{BinaryOp, UnaryOp};
use crate::port::{PinDirection, PinType};
use crate::shader;
use crate::value::Literal;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Kind tag of a node definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Terminal material output
    Output,
    /// Pure expression
    Expression,
    /// User-exposed parameter
    Parameter,
    /// Substrate BSDF expression
    SubstrateExpression,
    /// Annotation only
    Comment,
    /// Wire routing point
    Reroute,
}

/// How a node computes the value of its output pins
#[derive(Debug, Clone, PartialEq)]
pub enum EvalRule {
    /// A single scalar property
    ScalarProperty(String),
    /// A vector assembled from scalar properties, in order
    VectorProperties(Vec<String>),
    /// Component-wise binary arithmetic on pins `A` and `B`
    Binary(BinaryOp),
    /// Component-wise unary function of pin `Input`
    Unary(UnaryOp),
    /// `A + (B - A) * Alpha`
    Lerp,
    /// Clamp `Input` between `Min` and `Max`
    Clamp,
    /// Concatenate the components of `A` and `B`
    Append,
    /// Sample the texture named by the `Texture` property
    TextureSample,
    /// Forward the value of the named input pin
    Passthrough(String),
    /// Generic `R`/`G`/`B` or `Value` property lookup
    Generic,
}

/// Declared pin on a node definition
#[derive(Debug, Clone, PartialEq)]
pub struct PinSpec {
    /// Local pin id, unique within the node
    pub id: String,
    /// Display name
    pub name: String,
    /// Direction
    pub direction: PinDirection,
    /// Data type
    pub pin_type: PinType,
    /// Default value when unconnected
    pub default_value: Option<Literal>,
    /// Only shown when this tag is active
    pub visible_when: Option<String>,
}

impl PinSpec {
    /// Declare an input pin
    pub fn input(id: impl Into<String>, name: impl Into<String>, pin_type: PinType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            direction: PinDirection::In,
            pin_type,
            default_value: None,
            visible_when: None,
        }
    }

    /// Declare an output pin
    pub fn output(id: impl Into<String>, name: impl Into<String>, pin_type: PinType) -> Self {
        Self {
            direction: PinDirection::Out,
            ..Self::input(id, name, pin_type)
        }
    }

    /// Set the default value
    pub fn with_default(mut self, value: Literal) -> Self {
        self.default_value = Some(value);
        self
    }

    /// Show the pin only while `tag` is active
    pub fn visible_when(mut self, tag: impl Into<String>) -> Self {
        self.visible_when = Some(tag.into());
        self
    }

    /// Whether the pin is shown given the active tags
    pub fn is_visible_with(&self, active_tags: &[&str]) -> bool {
        match &self.visible_when {
            Some(tag) => active_tags.iter().any(|t| t.eq_ignore_ascii_case(tag)),
            None => true,
        }
    }
}

/// Declarative record describing a node kind
#[derive(Debug, Clone)]
pub struct NodeDefinition {
    /// Unique, stable identifier
    pub key: String,
    /// Display title
    pub title: String,
    /// Category path, `|` separated
    pub category: String,
    /// Kind tag
    pub kind: NodeKind,
    /// Ordered pins
    pub pins: Vec<PinSpec>,
    /// Editable properties with defaults
    pub properties: IndexMap<String, Literal>,
    /// Shader snippet template
    pub template: String,
    /// Evaluation rule
    pub rule: EvalRule,
    /// Extra search terms
    pub keywords: String,
    /// Palette hotkey
    pub hotkey: Option<char>,
    /// At most one instance per graph
    pub singleton: bool,
}

impl NodeDefinition {
    /// Start a definition with no pins or properties
    pub fn new(
        key: impl Into<String>,
        title: impl Into<String>,
        category: impl Into<String>,
        kind: NodeKind,
    ) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            category: category.into(),
            kind,
            pins: Vec::new(),
            properties: IndexMap::new(),
            template: String::new(),
            rule: EvalRule::Generic,
            keywords: String::new(),
            hotkey: None,
            singleton: false,
        }
    }

    /// Add a pin
    pub fn pin(mut self, pin: PinSpec) -> Self {
        self.pins.push(pin);
        self
    }

    /// Add a property with its default
    pub fn property(mut self, name: impl Into<String>, value: Literal) -> Self {
        self.properties.insert(name.into(), value);
        self
    }

    /// Set the shader template
    pub fn template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Set the evaluation rule
    pub fn rule(mut self, rule: EvalRule) -> Self {
        self.rule = rule;
        self
    }

    /// Set search keywords
    pub fn keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = keywords.into();
        self
    }

    /// Set the palette hotkey
    pub fn hotkey(mut self, key: char) -> Self {
        self.hotkey = Some(key);
        self
    }

    /// Mark as singleton
    pub fn singleton(mut self) -> Self {
        self.singleton = true;
        self
    }

    /// Get a pin spec by id
    pub fn pin_spec(&self, id: &str) -> Option<&PinSpec> {
        self.pins.iter().find(|p| p.id == id)
    }

    /// Input pin specs in declared order
    pub fn inputs(&self) -> impl Iterator<Item = &PinSpec> {
        self.pins.iter().filter(|p| p.direction == PinDirection::In)
    }

    /// Output pin specs in declared order
    pub fn outputs(&self) -> impl Iterator<Item = &PinSpec> {
        self.pins.iter().filter(|p| p.direction == PinDirection::Out)
    }

    /// Template placeholders that name neither a pin, a property nor `OUTPUT`
    pub fn unresolved_placeholders(&self) -> Vec<String> {
        shader::placeholders(&self.template)
            .into_iter()
            .filter(|token| {
                *token != shader::OUTPUT_TOKEN
                    && self.pin_spec(token).is_none()
                    && !self.properties.contains_key(*token)
            })
            .map(str::to_string)
            .collect()
    }
}

/// A pin on a node instance
#[derive(Debug, Clone, PartialEq)]
pub struct Pin {
    /// Local id
    pub id: String,
    /// Display name
    pub name: String,
    /// Direction
    pub direction: PinDirection,
    /// Data type
    pub pin_type: PinType,
    /// Instance default, initialized from the definition
    pub default_value: Option<Literal>,
    /// Attached links; at most one for inputs
    pub links: Vec<LinkId>,
}

impl Pin {
    fn from_spec(spec: &PinSpec) -> Self {
        Self {
            id: spec.id.clone(),
            name: spec.name.clone(),
            direction: spec.direction,
            pin_type: spec.pin_type,
            default_value: spec.default_value.clone(),
            links: Vec::new(),
        }
    }

    /// Whether any link is attached
    pub fn is_connected(&self) -> bool {
        !self.links.is_empty()
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique instance ID
    pub id: NodeId,
    /// Definition key
    pub definition_key: String,
    /// Display title
    pub title: String,
    /// Position in the graph UI
    pub position: [f32; 2],
    /// Input pins
    pub inputs: Vec<Pin>,
    /// Output pins
    pub outputs: Vec<Pin>,
    /// Per-instance properties
    pub properties: IndexMap<String, Literal>,
}

impl Node {
    /// Instantiate a definition
    pub fn new(definition: &NodeDefinition, id: NodeId, position: [f32; 2]) -> Self {
        Self {
            id,
            definition_key: definition.key.clone(),
            title: definition.title.clone(),
            position,
            inputs: definition.inputs().map(Pin::from_spec).collect(),
            outputs: definition.outputs().map(Pin::from_spec).collect(),
            properties: definition.properties.clone(),
        }
    }

    /// Get an input pin by id
    pub fn input(&self, id: &str) -> Option<&Pin> {
        self.inputs.iter().find(|p| p.id == id)
    }

    /// Get an output pin by id
    pub fn output(&self, id: &str) -> Option<&Pin> {
        self.outputs.iter().find(|p| p.id == id)
    }

    /// Get a pin by id, inputs first
    pub fn pin(&self, id: &str) -> Option<&Pin> {
        self.input(id).or_else(|| self.output(id))
    }

    pub(crate) fn pin_mut(&mut self, id: &str) -> Option<&mut Pin> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut())
            .find(|p| p.id == id)
    }

    /// Get all pins
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Get a property value
    pub fn property(&self, name: &str) -> Option<&Literal> {
        self.properties.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lerp_definition() -> NodeDefinition {
        NodeDefinition::new("Lerp", "Lerp", "Math", NodeKind::Expression)
            .pin(PinSpec::input("A", "A", PinType::Wildcard).with_default(Literal::Float(0.0)))
            .pin(PinSpec::input("B", "B", PinType::Wildcard).with_default(Literal::Float(1.0)))
            .pin(PinSpec::input("Alpha", "Alpha", PinType::Float).with_default(Literal::Float(0.5)))
            .pin(PinSpec::output("Result", "", PinType::Wildcard))
            .template("auto {OUTPUT} = lerp({A}, {B}, {Alpha});")
            .rule(EvalRule::Lerp)
    }

    #[test]
    fn test_node_instance_from_definition() {
        let definition = lerp_definition();
        let id = NodeId::new();
        let node = Node::new(&definition, id, [10.0, 20.0]);

        assert_eq!(node.id, id);
        assert_eq!(node.definition_key, "Lerp");
        assert_eq!(node.inputs.len(), 3);
        assert_eq!(node.outputs.len(), 1);
        assert_eq!(node.input("Alpha").and_then(|p| p.default_value.clone()), Some(Literal::Float(0.5)));
        assert!(node.pins().all(|p| !p.is_connected()));
    }

    #[test]
    fn test_template_validation() {
        let mut definition = lerp_definition();
        assert!(definition.unresolved_placeholders().is_empty());

        definition.template.push_str(" // {Missing}");
        assert_eq!(definition.unresolved_placeholders(), vec!["Missing".to_string()]);
    }

    #[test]
    fn test_pin_visibility() {
        let pin = PinSpec::input("OpacityMask", "Opacity Mask", PinType::Float).visible_when("masked");
        assert!(!pin.is_visible_with(&[]));
        assert!(pin.is_visible_with(&["Masked"]));
        assert!(PinSpec::input("Metallic", "Metallic", PinType::Float).is_visible_with(&[]));
    }
}
