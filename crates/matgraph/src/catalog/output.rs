// SPDX-License-Identifier: MIT OR Apache-2.0
//! Output, utility and Substrate nodes.

use super::MATERIAL_OUTPUT;
use crate::node::{EvalRule, NodeDefinition, NodeKind, PinSpec};
use crate::port::PinType;
use crate::value::Literal;

const MATERIAL_OUTPUT_TEMPLATE: &str = "\
FMaterialAttributes {OUTPUT} = DefaultMaterialAttributes;
{OUTPUT}.BaseColor = {BaseColor};
{OUTPUT}.Metallic = {Metallic};
{OUTPUT}.Specular = {Specular};
{OUTPUT}.Roughness = {Roughness};
{OUTPUT}.Anisotropy = {Anisotropy};
{OUTPUT}.EmissiveColor = {EmissiveColor};
{OUTPUT}.Opacity = {Opacity};
{OUTPUT}.OpacityMask = {OpacityMask};
{OUTPUT}.Normal = {Normal};
{OUTPUT}.AmbientOcclusion = {AmbientOcclusion};
{OUTPUT}.FrontMaterial = {FrontMaterial};";

pub(super) fn definitions() -> Vec<NodeDefinition> {
    vec![
        // ====================================================================
        // Output
        // ====================================================================
        NodeDefinition::new(MATERIAL_OUTPUT, "Material Output", "Output", NodeKind::Output)
            .pin(PinSpec::input("BaseColor", "Base Color", PinType::Float3).with_default(Literal::Vector3([0.8, 0.8, 0.8])))
            .pin(PinSpec::input("Metallic", "Metallic", PinType::Float).with_default(Literal::Float(0.0)))
            .pin(PinSpec::input("Specular", "Specular", PinType::Float).with_default(Literal::Float(0.5)))
            .pin(PinSpec::input("Roughness", "Roughness", PinType::Float).with_default(Literal::Float(0.5)))
            .pin(PinSpec::input("Anisotropy", "Anisotropy", PinType::Float).with_default(Literal::Float(0.0)))
            .pin(PinSpec::input("EmissiveColor", "Emissive Color", PinType::Float3).with_default(Literal::Vector3([0.0, 0.0, 0.0])))
            .pin(
                PinSpec::input("Opacity", "Opacity", PinType::Float)
                    .with_default(Literal::Float(1.0))
                    .visible_when("translucent"),
            )
            .pin(
                PinSpec::input("OpacityMask", "Opacity Mask", PinType::Float)
                    .with_default(Literal::Float(1.0))
                    .visible_when("masked"),
            )
            .pin(PinSpec::input("Normal", "Normal", PinType::Float3).with_default(Literal::Vector3([0.0, 0.0, 1.0])))
            .pin(PinSpec::input("AmbientOcclusion", "Ambient Occlusion", PinType::Float).with_default(Literal::Float(1.0)))
            .pin(PinSpec::input("FrontMaterial", "Front Material", PinType::Substrate))
            .template(MATERIAL_OUTPUT_TEMPLATE)
            .rule(EvalRule::Generic)
            .keywords("result final material attributes")
            .singleton(),
        // ====================================================================
        // Utility
        // ====================================================================
        NodeDefinition::new("AppendVector", "Append", "Utility", NodeKind::Expression)
            .pin(PinSpec::input("A", "A", PinType::Wildcard))
            .pin(PinSpec::input("B", "B", PinType::Wildcard))
            .pin(PinSpec::output("Result", "", PinType::Wildcard))
            .template("auto {OUTPUT} = MaterialFloatAppend({A}, {B});")
            .rule(EvalRule::Append)
            .keywords("combine merge concat"),
        NodeDefinition::new("Reroute", "Reroute", "Utility", NodeKind::Reroute)
            .pin(PinSpec::input("Input", "", PinType::Wildcard))
            .pin(PinSpec::output("Output", "", PinType::Wildcard))
            .template("auto {OUTPUT} = {Input};")
            .rule(EvalRule::Passthrough("Input".to_string()))
            .keywords("wire knot route"),
        NodeDefinition::new("Comment", "Comment", "Utility", NodeKind::Comment)
            .property("Text", Literal::Text("Comment".to_string()))
            .template("// {Text}")
            .keywords("note annotation")
            .hotkey('C'),
        // ====================================================================
        // Substrate
        // ====================================================================
        NodeDefinition::new("SubstrateSlabBSDF", "Substrate Slab BSDF", "Substrate", NodeKind::SubstrateExpression)
            .pin(PinSpec::input("DiffuseAlbedo", "Diffuse Albedo", PinType::Float3).with_default(Literal::Vector3([0.18, 0.18, 0.18])))
            .pin(PinSpec::input("F0", "F0", PinType::Float3).with_default(Literal::Vector3([0.04, 0.04, 0.04])))
            .pin(PinSpec::input("Roughness", "Roughness", PinType::Float).with_default(Literal::Float(0.5)))
            .pin(PinSpec::input("Normal", "Normal", PinType::Float3))
            .pin(PinSpec::output("Output", "", PinType::Substrate))
            .template("FSubstrateData {OUTPUT} = GetSubstrateSlabBSDF({DiffuseAlbedo}, {F0}, {Roughness}, {Normal});")
            .keywords("bsdf slab layer"),
    ]
}
