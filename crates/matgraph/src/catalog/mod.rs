// SPDX-License-Identifier: MIT OR Apache-2.0
//! Built-in material node catalog.
//!
//! Every node kind is a plain [`NodeDefinition`] record: pins, properties, a
//! shader template and an [`EvalRule`](crate::node::EvalRule). Adding a node
//! kind is a data change here, never new evaluator code.

mod inputs;
mod math;
mod output;

use crate::registry::NodeRegistry;

/// Definition key of the material output node
pub const MATERIAL_OUTPUT: &str = "MaterialOutput";

/// Create the material graph node registry with all available node types
pub fn create_material_registry() -> NodeRegistry {
    let mut registry = NodeRegistry::new();
    registry.register_batch(output::definitions());
    registry.register_batch(inputs::definitions());
    registry.register_batch(math::definitions());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::{EvalRule, NodeKind};
    use crate::port::PinDirection;

    #[test]
    fn test_catalog_contents() {
        let registry = create_material_registry();
        for key in [
            "Constant",
            "Constant2Vector",
            "Constant3Vector",
            "Constant4Vector",
            "ScalarParameter",
            "VectorParameter",
            "TextureParameter",
            "TextureSample",
            "TextureCoordinate",
            "Add",
            "Subtract",
            "Multiply",
            "Divide",
            "Lerp",
            "Min",
            "Max",
            "Power",
            "Clamp",
            "OneMinus",
            "Abs",
            "Floor",
            "Ceil",
            "Frac",
            "Saturate",
            "Sine",
            "Cosine",
            "SquareRoot",
            "AppendVector",
            "Reroute",
            "Comment",
            "SubstrateSlabBSDF",
            MATERIAL_OUTPUT,
        ] {
            assert!(registry.contains(key), "missing {key}");
        }
        assert_eq!(registry.len(), 32);
    }

    #[test]
    fn test_every_template_resolves() {
        let registry = create_material_registry();
        for definition in registry.definitions() {
            assert!(!definition.template.is_empty(), "{} has no template", definition.key);
            assert!(
                definition.unresolved_placeholders().is_empty(),
                "{}: {:?}",
                definition.key,
                definition.unresolved_placeholders()
            );
        }
    }

    #[test]
    fn test_pin_ids_are_unique_per_node() {
        let registry = create_material_registry();
        for definition in registry.definitions() {
            let mut ids: Vec<&str> = definition.pins.iter().map(|p| p.id.as_str()).collect();
            ids.sort_unstable();
            ids.dedup();
            assert_eq!(ids.len(), definition.pins.len(), "{}", definition.key);
        }
    }

    #[test]
    fn test_material_output() {
        let registry = create_material_registry();
        let output = registry.get(MATERIAL_OUTPUT).unwrap();
        assert_eq!(output.kind, NodeKind::Output);
        assert!(output.singleton);
        assert_eq!(output.outputs().count(), 0);
        assert!(output.pin_spec("OpacityMask").is_some_and(|p| !p.is_visible_with(&[])));
        assert!(output.pin_spec("Metallic").is_some_and(|p| p.direction == PinDirection::In));
    }

    #[test]
    fn test_categories_and_palette() {
        let registry = create_material_registry();
        assert_eq!(registry.by_category("Math|Trigonometry").len(), 2);
        assert!(registry.categories().any(|c| c == "Constants"));
        assert_eq!(registry.by_hotkey('m').map(|d| d.key.as_str()), Some("Multiply"));
        assert!(registry.search("blend").iter().any(|d| d.key == "Lerp"));
    }

    #[test]
    fn test_rules_are_table_driven() {
        let registry = create_material_registry();
        assert_eq!(registry.get("Reroute").unwrap().rule, EvalRule::Passthrough("Input".into()));
        assert_eq!(registry.get("Constant").unwrap().rule, EvalRule::ScalarProperty("R".into()));
        assert_eq!(registry.get("TextureParameter").unwrap().rule, EvalRule::TextureSample);
    }
}
