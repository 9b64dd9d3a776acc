// SPDX-License-Identifier: MIT OR Apache-2.0
//! Shader snippet emission.
//!
//! Every definition carries a template in which `{name}` tokens stand for a
//! property value, an input pin or the node's own result (`{OUTPUT}`). An input
//! pin becomes the variable of the link feeding it, or a literal when nothing
//! is connected. No arithmetic happens here; the text is only meant to be read.

use crate::connection::{LinkId, PinRef};
use crate::graph::Graph;
use crate::node::{Node, NodeId};
use crate::port::PinType;
use crate::value::Literal;
use std::collections::HashSet;
use std::fmt::Write;

/// Token replaced by the node's own result variable
pub const OUTPUT_TOKEN: &str = "OUTPUT";

/// Output pin ids that select channels of the node result
const SWIZZLE_PINS: [&str; 7] = ["R", "G", "B", "A", "RG", "RGB", "RGBA"];

/// `{token}` names in a template, in order of appearance.
///
/// Braces around anything but an identifier are left alone.
pub(crate) fn placeholders(template: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) if is_identifier(&after[..end]) => {
                tokens.push(&after[..end]);
                rest = &after[end + 1..];
            }
            _ => rest = after,
        }
    }
    tokens
}

fn is_identifier(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Replace every `{token}` for which `lookup` yields text
fn substitute(template: &str, mut lookup: impl FnMut(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        out.push_str(&rest[..start]);
        let after = &rest[start + 1..];
        let replacement = after
            .find('}')
            .filter(|end| is_identifier(&after[..*end]))
            .and_then(|end| lookup(&after[..end]).map(|text| (end, text)));
        match replacement {
            Some((end, text)) => {
                out.push_str(&text);
                rest = &after[end + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Keep identifier characters, replace everything else with `_`
pub fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Variable through which a link's value is referenced
pub fn link_variable(link: LinkId) -> String {
    format!("var_{}", sanitize(&link.to_string()))
}

/// Variable holding a node's result
pub fn node_variable(node: NodeId) -> String {
    format!("var_{}", sanitize(&node.to_string()))
}

/// Literal used for an unconnected pin without its own default
pub fn default_literal(pin_type: PinType) -> &'static str {
    match pin_type {
        PinType::Float | PinType::Wildcard => "0.0",
        PinType::Float2 => "float2(0,0)",
        PinType::Float3 => "float3(0,0,0)",
        PinType::Float4 => "float4(0,0,0,1)",
        PinType::Bool => "false",
        PinType::Texture => "DefaultTexture",
        PinType::MaterialAttributes => "DefaultMaterialAttributes",
        PinType::Substrate => "GetInitialisedSubstrateData()",
    }
}

/// Expand the template of one node
pub fn emit_snippet(graph: &Graph, node_id: NodeId) -> Option<String> {
    let node = graph.node(node_id)?;
    let definition = graph.registry().get(&node.definition_key)?;
    Some(substitute(&definition.template, |token| resolve_token(node, token)))
}

fn resolve_token(node: &Node, token: &str) -> Option<String> {
    if token == OUTPUT_TOKEN {
        return Some(node_variable(node.id));
    }
    if let Some(value) = node.property(token) {
        return Some(value.to_shader_literal());
    }

    let pin = node.input(token)?;
    let text = match pin.links.first() {
        Some(link) => link_variable(*link),
        None => pin
            .default_value
            .as_ref()
            .map(Literal::to_shader_literal)
            .unwrap_or_else(|| default_literal(pin.pin_type).to_string()),
    };
    Some(text)
}

/// Concatenates snippets into a whole shader document
#[derive(Debug, Clone, Copy, Default)]
pub struct ShaderExporter;

impl ShaderExporter {
    /// Export every node `root` depends on, producers first.
    ///
    /// After each producer the variables of its outgoing links are declared,
    /// so consumers can refer to them.
    pub fn export(graph: &Graph, root: NodeId) -> String {
        let order = graph.upstream_order(root);
        let included: HashSet<NodeId> = order.iter().copied().collect();

        let mut doc = String::new();
        let _ = writeln!(doc, "// Material: {}", graph.name);

        for node_id in order {
            let Some(node) = graph.node(node_id) else {
                continue;
            };
            let Some(snippet) = emit_snippet(graph, node_id) else {
                tracing::debug!("No definition for '{}', skipped in export", node.definition_key);
                continue;
            };

            let _ = writeln!(doc);
            let _ = writeln!(doc, "// {} ({})", node.title, node.id);
            if !snippet.is_empty() {
                let _ = writeln!(doc, "{}", snippet.trim_end());
            }

            for pin in &node.outputs {
                let output = PinRef::new(node.id, pin.id.as_str());
                for link in graph.links_from(&output) {
                    if !included.contains(&link.to.node) {
                        continue;
                    }
                    let _ = writeln!(
                        doc,
                        "auto {} = {}{};",
                        link_variable(link.id),
                        node_variable(node.id),
                        swizzle(&pin.id)
                    );
                }
            }
        }
        doc
    }
}

fn swizzle(pin_id: &str) -> String {
    if SWIZZLE_PINS.contains(&pin_id) {
        format!(".{}", pin_id.to_lowercase())
    } else {
        String::new()
    }
}
