// SPDX-License-Identifier: MIT OR Apache-2.0
//! Evaluation report.

use matgraph::value::format_float;
use matgraph::{MaterialAttributes, Value};
use serde::Serialize;
use std::fmt::Write;

/// Everything printed after one run
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    /// Graph name
    pub material: String,
    /// Node count
    pub nodes: usize,
    /// Link count
    pub links: usize,
    /// Final attributes, after pending resolution
    pub attributes: MaterialAttributes,
    /// Rule executions across all nodes
    pub node_evaluations: usize,
    /// Memo hits
    pub memo_hits: usize,
    /// Cycles broken during evaluation
    pub cycles_broken: usize,
    /// Pending operations produced by the evaluator
    pub pending: usize,
    /// Pending operations resolved by the compositor
    pub resolved: usize,
    /// Exported shader text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shader: Option<String>,
}

impl Report {
    /// Human-readable rendering
    pub fn to_text(&self) -> String {
        let a = &self.attributes;
        let rows: [(&str, String); 10] = [
            ("Base Color", describe(a.base_color.as_ref())),
            ("Metallic", scalar(a.metallic)),
            ("Specular", scalar(a.specular)),
            ("Roughness", scalar(a.roughness)),
            ("Anisotropy", scalar(a.anisotropy)),
            ("Emissive Color", describe(a.emissive_color.as_ref())),
            ("Opacity", scalar(a.opacity)),
            ("Opacity Mask", scalar(a.opacity_mask)),
            ("Normal", describe(a.normal.as_ref())),
            ("Ambient Occlusion", scalar(a.ambient_occlusion)),
        ];

        let mut out = String::new();
        let _ = writeln!(out, "Material: {} ({} nodes, {} links)", self.material, self.nodes, self.links);
        for (name, value) in rows {
            let _ = writeln!(out, "  {name:<18}{value}");
        }
        let _ = writeln!(
            out,
            "Evaluation: {} node evaluations, {} memo hits, {} cycles broken",
            self.node_evaluations, self.memo_hits, self.cycles_broken
        );
        if self.pending > 0 {
            let _ = writeln!(out, "Pending: {} of {} resolved", self.resolved, self.pending);
        }
        if let Some(shader) = &self.shader {
            let _ = writeln!(out);
            let _ = write!(out, "{shader}");
        }
        out
    }
}

fn scalar(value: Option<f32>) -> String {
    value.map_or_else(|| "-".to_string(), format_float)
}

fn describe(value: Option<&Value>) -> String {
    match value {
        None => "-".to_string(),
        Some(Value::Scalar(s)) => format_float(*s),
        Some(Value::Vector(v)) => {
            let parts: Vec<String> = v.iter().map(|c| format_float(*c)).collect();
            format!("[{}]", parts.join(", "))
        }
        Some(Value::Texture(t)) => format!("texture {}", t.id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use matgraph::TextureRef;

    fn report() -> Report {
        let attributes = MaterialAttributes {
            base_color: Some(Value::Texture(TextureRef {
                id: "brick*1.0,0.0,0.0".into(),
                url: "brick.png#multiply=1.0,0.0,0.0".into(),
            })),
            metallic: Some(0.8),
            normal: Some(Value::Vector(vec![0.0, 0.0, 1.0])),
            ..MaterialAttributes::default()
        };
        Report {
            material: "Brick".into(),
            nodes: 3,
            links: 2,
            attributes,
            node_evaluations: 2,
            memo_hits: 0,
            cycles_broken: 0,
            pending: 1,
            resolved: 1,
            shader: None,
        }
    }

    #[test]
    fn test_text_report() {
        let text = report().to_text();
        assert!(text.starts_with("Material: Brick (3 nodes, 2 links)"));
        assert!(text.contains("Base Color        texture brick*1.0,0.0,0.0"));
        assert!(text.contains("Metallic          0.8"));
        assert!(text.contains("Normal            [0.0, 0.0, 1.0]"));
        assert!(text.contains("Roughness         -"));
        assert!(text.contains("Pending: 1 of 1 resolved"));
    }

    #[test]
    fn test_json_report() {
        let json = serde_json::to_value(report()).unwrap();
        assert_eq!(json["material"], "Brick");
        assert_eq!(json["resolved"], 1);
        assert!(json.get("shader").is_none());
        assert!(json["attributes"]["metallic"].as_f64().is_some_and(|m| (m - 0.8).abs() < 1e-6));
    }
}
