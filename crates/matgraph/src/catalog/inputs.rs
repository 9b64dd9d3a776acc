// SPDX-License-Identifier: MIT OR Apache-2.0
//! Constants, parameters and texture nodes.

use crate::node::{EvalRule, NodeDefinition, NodeKind, PinSpec};
use crate::port::PinType;
use crate::texture::DEFAULT_TEXTURE_ID;
use crate::value::Literal;

const TEXTURE_SAMPLE_TEMPLATE: &str =
    "float4 {OUTPUT} = Texture2DSample({Texture}, {Texture}Sampler, {UVs});";

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Pins shared by texture-sampling nodes
fn with_sample_pins(definition: NodeDefinition) -> NodeDefinition {
    definition
        .pin(PinSpec::input("UVs", "UVs", PinType::Float2))
        .pin(PinSpec::output("RGB", "RGB", PinType::Float3))
        .pin(PinSpec::output("R", "R", PinType::Float))
        .pin(PinSpec::output("G", "G", PinType::Float))
        .pin(PinSpec::output("B", "B", PinType::Float))
        .pin(PinSpec::output("A", "A", PinType::Float))
        .pin(PinSpec::output("RGBA", "RGBA", PinType::Float4))
        .property("Texture", Literal::Text(DEFAULT_TEXTURE_ID.to_string()))
        .rule(EvalRule::TextureSample)
}

pub(super) fn definitions() -> Vec<NodeDefinition> {
    vec![
        // ====================================================================
        // Constants
        // ====================================================================
        NodeDefinition::new("Constant", "Constant", "Constants", NodeKind::Expression)
            .property("R", Literal::Float(0.0))
            .pin(PinSpec::output("Output", "", PinType::Float))
            .template("float {OUTPUT} = {R};")
            .rule(EvalRule::ScalarProperty("R".to_string()))
            .keywords("scalar float number value")
            .hotkey('1'),
        NodeDefinition::new("Constant2Vector", "Constant 2 Vector", "Constants", NodeKind::Expression)
            .property("R", Literal::Float(0.0))
            .property("G", Literal::Float(0.0))
            .pin(PinSpec::output("Output", "", PinType::Float2))
            .template("float2 {OUTPUT} = float2({R}, {G});")
            .rule(EvalRule::VectorProperties(names(&["R", "G"])))
            .keywords("vector2 float2")
            .hotkey('2'),
        NodeDefinition::new("Constant3Vector", "Constant 3 Vector", "Constants", NodeKind::Expression)
            .property("R", Literal::Float(0.0))
            .property("G", Literal::Float(0.0))
            .property("B", Literal::Float(0.0))
            .pin(PinSpec::output("Output", "", PinType::Float3))
            .template("float3 {OUTPUT} = float3({R}, {G}, {B});")
            .rule(EvalRule::VectorProperties(names(&["R", "G", "B"])))
            .keywords("color rgb vector3 float3")
            .hotkey('3'),
        NodeDefinition::new("Constant4Vector", "Constant 4 Vector", "Constants", NodeKind::Expression)
            .property("R", Literal::Float(0.0))
            .property("G", Literal::Float(0.0))
            .property("B", Literal::Float(0.0))
            .property("A", Literal::Float(1.0))
            .pin(PinSpec::output("Output", "", PinType::Float4))
            .template("float4 {OUTPUT} = float4({R}, {G}, {B}, {A});")
            .rule(EvalRule::VectorProperties(names(&["R", "G", "B", "A"])))
            .keywords("rgba vector4 float4")
            .hotkey('4'),
        // ====================================================================
        // Parameters
        // ====================================================================
        NodeDefinition::new("ScalarParameter", "Scalar Parameter", "Parameters", NodeKind::Parameter)
            .property("ParameterName", Literal::Text("Scalar".to_string()))
            .property("DefaultValue", Literal::Float(0.0))
            .pin(PinSpec::output("Output", "", PinType::Float))
            .template("float {OUTPUT} = {DefaultValue}; // {ParameterName}")
            .rule(EvalRule::ScalarProperty("DefaultValue".to_string()))
            .keywords("float exposed instance")
            .hotkey('S'),
        NodeDefinition::new("VectorParameter", "Vector Parameter", "Parameters", NodeKind::Parameter)
            .property("ParameterName", Literal::Text("Color".to_string()))
            .property("R", Literal::Float(1.0))
            .property("G", Literal::Float(1.0))
            .property("B", Literal::Float(1.0))
            .pin(PinSpec::output("Output", "", PinType::Float3))
            .template("float3 {OUTPUT} = float3({R}, {G}, {B}); // {ParameterName}")
            .rule(EvalRule::VectorProperties(names(&["R", "G", "B"])))
            .keywords("color exposed instance")
            .hotkey('V'),
        with_sample_pins(NodeDefinition::new(
            "TextureParameter",
            "Texture Parameter",
            "Parameters",
            NodeKind::Parameter,
        ))
        .property("ParameterName", Literal::Text("Texture".to_string()))
        .template(format!("{TEXTURE_SAMPLE_TEMPLATE} // {{ParameterName}}"))
        .keywords("texture exposed instance"),
        // ====================================================================
        // Texture
        // ====================================================================
        with_sample_pins(NodeDefinition::new(
            "TextureSample",
            "Texture Sample",
            "Texture",
            NodeKind::Expression,
        ))
        .template(TEXTURE_SAMPLE_TEMPLATE)
        .keywords("image sampler map")
        .hotkey('T'),
        NodeDefinition::new("TextureCoordinate", "Texture Coordinate", "Texture", NodeKind::Expression)
            .property("UTiling", Literal::Float(1.0))
            .property("VTiling", Literal::Float(1.0))
            .pin(PinSpec::output("Output", "", PinType::Float2))
            .template("float2 {OUTPUT} = Parameters.TexCoords[0] * float2({UTiling}, {VTiling});")
            .rule(EvalRule::VectorProperties(names(&["UTiling", "VTiling"])))
            .keywords("uv texcoord")
            .hotkey('U'),
    ]
}
