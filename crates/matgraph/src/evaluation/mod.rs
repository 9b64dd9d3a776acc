// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph evaluation.
//!
//! The [`Translator`] walks a graph backwards from its root node, resolving each
//! root input to a value. Every call to [`Translator::evaluate`] owns a fresh
//! memo scope keyed by `(producer node, output pin)`, so a sub-expression shared
//! by several inputs is computed at most once per call. A per-branch visited set
//! of input pins breaks accidental cycles by resolving the re-entered pin to
//! `None`. Evaluation never fails: anything missing degrades to absence.

pub mod math;
pub mod result;

pub use result::{Channel, MaterialAttributes};

use crate::connection::PinRef;
use crate::graph::Graph;
use crate::node::{EvalRule, Node, NodeId};
use crate::registry::NodeRegistry;
use crate::settings::EvaluatorSettings;
use crate::texture::TextureResolver;
use crate::value::{Evaluated, Literal, PendingKind, PendingOperation, TextureRef, Value};
use math::BinaryOp;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Output pins whose sample result is the texture itself
const TEXTURE_OUTPUT_PINS: [&str; 2] = ["RGB", "RGBA"];

/// Counters collected during one evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationTrace {
    /// How many times each node's rule ran
    pub node_evaluations: HashMap<NodeId, usize>,
    /// Resolutions answered from the memo scope
    pub memo_hits: usize,
    /// Re-entered pins cut by the cycle guard
    pub cycles_broken: usize,
}

impl EvaluationTrace {
    /// Number of rule executions for a node
    pub fn evaluations_of(&self, node: NodeId) -> usize {
        self.node_evaluations.get(&node).copied().unwrap_or(0)
    }
}

/// Evaluates material graphs into [`MaterialAttributes`]
pub struct Translator {
    registry: Arc<NodeRegistry>,
    textures: Arc<dyn TextureResolver + Send + Sync>,
    settings: EvaluatorSettings,
}

impl Translator {
    /// Create a translator
    pub fn new(
        registry: Arc<NodeRegistry>,
        textures: Arc<dyn TextureResolver + Send + Sync>,
        settings: EvaluatorSettings,
    ) -> Self {
        Self {
            registry,
            textures,
            settings,
        }
    }

    /// Evaluation settings in use
    pub fn settings(&self) -> &EvaluatorSettings {
        &self.settings
    }

    /// Evaluate the graph's designated root
    pub fn evaluate_root(&self, graph: &Graph) -> MaterialAttributes {
        match graph.root() {
            Some(root) => self.evaluate(graph, root),
            None => {
                tracing::warn!("Graph '{}' has no root node", graph.name);
                MaterialAttributes::default()
            }
        }
    }

    /// Evaluate `root`'s inputs into an attribute set
    pub fn evaluate(&self, graph: &Graph, root: NodeId) -> MaterialAttributes {
        self.evaluate_traced(graph, root).0
    }

    /// Evaluate and also return the evaluation counters
    pub fn evaluate_traced(&self, graph: &Graph, root: NodeId) -> (MaterialAttributes, EvaluationTrace) {
        let mut scope = Scope {
            translator: self,
            graph,
            memo: HashMap::new(),
            trace: EvaluationTrace::default(),
        };
        let mut attributes = MaterialAttributes::default();

        let Some(root_node) = graph.node(root) else {
            tracing::warn!("Root node {} not found", root);
            return (attributes, scope.trace);
        };

        for pin in &root_node.inputs {
            let Some(channel) = Channel::from_pin_name(&pin.name) else {
                tracing::debug!("Root pin '{}' maps to no channel", pin.name);
                continue;
            };
            if let Some(evaluated) = scope.resolve_input(root_node, &pin.id, &HashSet::new()) {
                attributes.assign(channel, evaluated, self.settings.pending_placeholder_color);
            }
        }

        (attributes, scope.trace)
    }

    /// Evaluate a single output pin of any node
    pub fn evaluate_pin(&self, graph: &Graph, output: &PinRef) -> Option<Evaluated> {
        let mut scope = Scope {
            translator: self,
            graph,
            memo: HashMap::new(),
            trace: EvaluationTrace::default(),
        };
        let node = graph.node(output.node)?;
        scope.evaluate_node(node, &output.pin, &HashSet::new())
    }
}

type Visited = HashSet<PinRef>;

/// State owned by one evaluation call
struct Scope<'a> {
    translator: &'a Translator,
    graph: &'a Graph,
    memo: HashMap<PinRef, Option<Evaluated>>,
    trace: EvaluationTrace,
}

impl<'a> Scope<'a> {
    /// Resolve an input pin of `node` to its value
    fn resolve_input(&mut self, node: &Node, pin_id: &str, visited: &Visited) -> Option<Evaluated> {
        let key = PinRef::new(node.id, pin_id);
        if visited.contains(&key) {
            tracing::debug!("Cycle detected at {}", key);
            self.trace.cycles_broken += 1;
            return None;
        }

        let graph = self.graph;
        let pin = node.input(pin_id)?;
        let Some(link_id) = pin.links.first() else {
            return pin
                .default_value
                .as_ref()
                .and_then(Literal::to_value)
                .map(Evaluated::Resolved);
        };

        let link = graph.link(*link_id)?;
        if let Some(hit) = self.memo.get(&link.from) {
            self.trace.memo_hits += 1;
            return hit.clone();
        }

        let producer = graph.node(link.from.node)?;
        let mut branch = visited.clone();
        branch.insert(key);

        let value = self.evaluate_node(producer, &link.from.pin, &branch);
        self.memo.insert(link.from.clone(), value.clone());
        value
    }

    /// Resolve an arithmetic operand.
    ///
    /// `Ok(None)` is a missing operand the caller may substitute; `Err` is a
    /// pending operand, which makes the whole expression absent.
    fn operand(
        &mut self,
        node: &Node,
        pin_id: &str,
        visited: &Visited,
    ) -> Result<Option<Value>, PendingOperation> {
        match self.resolve_input(node, pin_id, visited) {
            Some(Evaluated::Resolved(value)) => Ok(Some(value)),
            Some(Evaluated::Pending(operation)) => {
                tracing::debug!("Pending operand {}.{} makes the expression absent", node.id, pin_id);
                Err(operation)
            }
            None => Ok(None),
        }
    }

    /// Run the node's rule for the requested output pin
    fn evaluate_node(&mut self, node: &Node, output: &str, visited: &Visited) -> Option<Evaluated> {
        *self.trace.node_evaluations.entry(node.id).or_default() += 1;

        let translator = self.translator;
        let Some(definition) = translator.registry.get(&node.definition_key) else {
            tracing::debug!("No definition for '{}'", node.definition_key);
            return None;
        };

        match &definition.rule {
            EvalRule::ScalarProperty(name) => scalar_property(node, name).map(Value::Scalar).map(Into::into),
            EvalRule::VectorProperties(names) => vector_properties(node, names).map(Into::into),
            EvalRule::Binary(BinaryOp::Multiply) => self.multiply(node, visited),
            EvalRule::Binary(op) => {
                let identity = op.identity().map(Value::Scalar);
                let a = self.operand(node, "A", visited).ok()?.or_else(|| identity.clone())?;
                let b = self.operand(node, "B", visited).ok()?.or(identity)?;
                math::binary(*op, &a, &b).map(Into::into)
            }
            EvalRule::Unary(op) => {
                let x = self.operand(node, "Input", visited).ok()??;
                math::unary(*op, &x).map(Into::into)
            }
            EvalRule::Lerp => {
                let a = self.operand(node, "A", visited).ok()?.unwrap_or(Value::Scalar(0.0));
                let b = self.operand(node, "B", visited).ok()?.unwrap_or(Value::Scalar(1.0));
                let alpha = self
                    .operand(node, "Alpha", visited)
                    .ok()?
                    .filter(Value::is_numeric)
                    .unwrap_or(Value::Scalar(0.5));
                math::lerp(&a, &b, &alpha).map(Into::into)
            }
            EvalRule::Clamp => {
                let x = self.operand(node, "Input", visited).ok()??;
                let min = self.operand(node, "Min", visited).ok()?.unwrap_or(Value::Scalar(0.0));
                let max = self.operand(node, "Max", visited).ok()?.unwrap_or(Value::Scalar(1.0));
                math::clamp(&x, &min, &max).map(Into::into)
            }
            EvalRule::Append => {
                let a = self.operand(node, "A", visited).ok()??;
                let b = self.operand(node, "B", visited).ok()??;
                math::append(&a, &b).map(Into::into)
            }
            EvalRule::TextureSample => Some(self.sample_texture(node, output).into()),
            EvalRule::Passthrough(input) => self.resolve_input(node, input, visited),
            EvalRule::Generic => generic(node).map(Into::into),
        }
    }

    /// Multiply, deferring texture x color to the caller
    fn multiply(&mut self, node: &Node, visited: &Visited) -> Option<Evaluated> {
        let one = || Evaluated::Resolved(Value::Scalar(1.0));
        let a = self.resolve_input(node, "A", visited).unwrap_or_else(one);
        let b = self.resolve_input(node, "B", visited).unwrap_or_else(one);

        match (a, b) {
            (Evaluated::Resolved(Value::Texture(texture)), Evaluated::Resolved(color))
            | (Evaluated::Resolved(color), Evaluated::Resolved(Value::Texture(texture)))
                if color.is_numeric() =>
            {
                Some(Evaluated::Pending(PendingOperation {
                    operation: PendingKind::Multiply,
                    texture,
                    color,
                }))
            }
            (Evaluated::Resolved(a), Evaluated::Resolved(b)) => {
                math::binary(BinaryOp::Multiply, &a, &b).map(Into::into)
            }
            _ => None,
        }
    }

    fn sample_texture(&self, node: &Node, output: &str) -> Value {
        let settings = &self.translator.settings;
        let placeholder = Value::Scalar(settings.texture_scalar_placeholder);

        if !TEXTURE_OUTPUT_PINS.iter().any(|p| p.eq_ignore_ascii_case(output)) {
            return placeholder;
        }

        let id = node
            .property("Texture")
            .and_then(Literal::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(settings.placeholder_texture_id.as_str());

        match self.translator.textures.get(id) {
            Some(asset) => Value::Texture(TextureRef {
                id: id.to_string(),
                url: asset.data_url,
            }),
            None => {
                tracing::debug!("Texture '{}' not found, using placeholder", id);
                placeholder
            }
        }
    }
}

fn scalar_property(node: &Node, name: &str) -> Option<f32> {
    node.property(name).and_then(Literal::as_f32)
}

fn vector_properties(node: &Node, names: &[String]) -> Option<Value> {
    names
        .iter()
        .map(|n| scalar_property(node, n))
        .collect::<Option<Vec<f32>>>()
        .map(Value::Vector)
}

/// `R` (with optional `G`/`B`) as a color, else `Value` as a scalar
fn generic(node: &Node) -> Option<Value> {
    if let Some(r) = scalar_property(node, "R") {
        let g = scalar_property(node, "G").unwrap_or(0.0);
        let b = scalar_property(node, "B").unwrap_or(0.0);
        return Some(Value::Vector(vec![r, g, b]));
    }
    scalar_property(node, "Value").map(Value::Scalar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::create_material_registry;
    use crate::connection::PinRef;
    use crate::texture::TextureLibrary;

    fn setup() -> (Graph, Translator) {
        let registry = Arc::new(create_material_registry());
        let graph = Graph::with_root("Test", registry.clone(), "MaterialOutput");
        let textures = Arc::new(TextureLibrary::with_builtin());
        let translator = Translator::new(registry, textures, EvaluatorSettings::default());
        (graph, translator)
    }

    fn root(graph: &Graph) -> NodeId {
        graph.root().expect("root")
    }

    #[test]
    fn test_unconnected_root_uses_defaults() {
        let (graph, translator) = setup();
        let result = translator.evaluate(&graph, root(&graph));
        assert_eq!(result.metallic, Some(0.0));
        assert_eq!(result.roughness, Some(0.5));
        assert!(!result.has_pending());
    }

    #[test]
    fn test_constant_feeds_metallic() {
        let (mut graph, translator) = setup();
        let out = root(&graph);
        let c = graph.add_node("Constant", 0.0, 0.0).expect("constant");
        graph.set_property(c, "R", Literal::Float(0.8));
        graph
            .connect(&PinRef::new(c, "Output"), &PinRef::new(out, "Metallic"))
            .expect("connect");

        let result = translator.evaluate(&graph, out);
        assert_eq!(result.metallic, Some(0.8));
    }

    #[test]
    fn test_shared_constant_is_evaluated_once() {
        let (mut graph, translator) = setup();
        let out = root(&graph);
        let c = graph.add_node("Constant", 0.0, 0.0).expect("constant");
        graph.set_property(c, "R", Literal::Float(0.25));
        graph.connect(&PinRef::new(c, "Output"), &PinRef::new(out, "Metallic")).expect("connect");
        graph.connect(&PinRef::new(c, "Output"), &PinRef::new(out, "Roughness")).expect("connect");

        let (result, trace) = translator.evaluate_traced(&graph, out);
        assert_eq!(result.metallic, Some(0.25));
        assert_eq!(result.roughness, Some(0.25));
        assert_eq!(trace.evaluations_of(c), 1);
        assert_eq!(trace.memo_hits, 1);

        // A second call gets its own memo scope
        let (_, trace) = translator.evaluate_traced(&graph, out);
        assert_eq!(trace.evaluations_of(c), 1);
    }

    #[test]
    fn test_missing_multiply_operand_uses_identity() {
        let (mut graph, translator) = setup();
        let out = root(&graph);
        let mul = graph.add_node("Multiply", 0.0, 0.0).expect("multiply");
        let c = graph.add_node("Constant", 0.0, 0.0).expect("constant");
        let empty = graph.add_node("Reroute", 0.0, 0.0).expect("reroute");
        graph.set_property(c, "R", Literal::Float(0.5));

        graph.connect(&PinRef::new(c, "Output"), &PinRef::new(mul, "A")).expect("connect");
        // An upstream absence is replaced by the identity, not by zero
        graph.connect(&PinRef::new(empty, "Output"), &PinRef::new(mul, "B")).expect("connect");
        graph.connect(&PinRef::new(mul, "Result"), &PinRef::new(out, "Roughness")).expect("connect");

        let result = translator.evaluate(&graph, out);
        assert_eq!(result.roughness, Some(0.5));
    }

    #[test]
    fn test_texture_sample_outputs() {
        let (mut graph, translator) = setup();
        let sample = graph.add_node("TextureSample", 0.0, 0.0).expect("sample");

        let rgb = translator.evaluate_pin(&graph, &PinRef::new(sample, "RGB"));
        assert!(matches!(rgb, Some(Evaluated::Resolved(Value::Texture(_)))));

        let r = translator.evaluate_pin(&graph, &PinRef::new(sample, "R"));
        assert_eq!(r, Some(Evaluated::Resolved(Value::Scalar(0.5))));

        graph.set_property(sample, "Texture", Literal::Text("missing".into()));
        let rgb = translator.evaluate_pin(&graph, &PinRef::new(sample, "RGB"));
        assert_eq!(rgb, Some(Evaluated::Resolved(Value::Scalar(0.5))));
    }

    #[test]
    fn test_generic_fallback() {
        let (mut graph, translator) = setup();
        let comment = graph.add_node("Comment", 0.0, 0.0).expect("comment");
        assert_eq!(translator.evaluate_pin(&graph, &PinRef::new(comment, "Output")), None);
    }

    #[test]
    fn test_missing_root_degrades_to_defaults() {
        let (graph, translator) = setup();
        let result = translator.evaluate(&graph, NodeId::new());
        assert_eq!(result, MaterialAttributes::default());
    }
}
