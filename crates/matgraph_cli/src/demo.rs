// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in demo graph used when no document is given.

use matgraph::{Graph, GraphSettings, Literal, NodeId, NodeRegistry, PinRef};
use std::sync::Arc;

/// Tinted texture into Base Color, one constant shared by two channels
pub fn build(registry: Arc<NodeRegistry>, settings: &GraphSettings) -> Graph {
    let mut graph = Graph::from_settings("Demo Brick", registry, settings);
    match graph.root() {
        Some(root) => {
            if populate(&mut graph, root).is_none() {
                tracing::warn!("Demo graph is incomplete");
            }
        }
        None => tracing::warn!("Demo graph has no '{}' root", settings.root_definition),
    }
    graph
}

fn populate(graph: &mut Graph, root: NodeId) -> Option<()> {
    let sample = graph.add_node("TextureSample", -600.0, -200.0)?;
    let tint = graph.add_node("VectorParameter", -600.0, 0.0)?;
    let multiply = graph.add_node("Multiply", -300.0, -100.0)?;
    let rough = graph.add_node("Constant", -600.0, 150.0)?;
    let invert = graph.add_node("OneMinus", -300.0, 200.0)?;
    let metal = graph.add_node("ScalarParameter", -600.0, 300.0)?;
    let occlusion = graph.add_node("Lerp", -300.0, 400.0)?;

    graph.set_property(tint, "ParameterName", Literal::Text("Tint".into()));
    graph.set_property(tint, "G", Literal::Float(0.35));
    graph.set_property(tint, "B", Literal::Float(0.2));
    graph.set_property(rough, "R", Literal::Float(0.65));
    graph.set_property(metal, "ParameterName", Literal::Text("Metalness".into()));
    graph.set_pin_default(&PinRef::new(occlusion, "A"), Some(Literal::Float(0.6)));

    let wires = [
        (PinRef::new(sample, "RGB"), PinRef::new(multiply, "A")),
        (PinRef::new(tint, "Output"), PinRef::new(multiply, "B")),
        (PinRef::new(multiply, "Result"), PinRef::new(root, "BaseColor")),
        (PinRef::new(rough, "Output"), PinRef::new(root, "Roughness")),
        (PinRef::new(rough, "Output"), PinRef::new(invert, "Input")),
        (PinRef::new(invert, "Result"), PinRef::new(root, "Specular")),
        (PinRef::new(metal, "Output"), PinRef::new(root, "Metallic")),
        (PinRef::new(sample, "R"), PinRef::new(occlusion, "Alpha")),
        (PinRef::new(occlusion, "Result"), PinRef::new(root, "AmbientOcclusion")),
    ];
    for (from, to) in wires {
        if let Err(e) = graph.connect(&from, &to) {
            tracing::warn!("Demo link {} -> {} rejected: {}", from, to, e);
            return None;
        }
    }
    Some(())
}
