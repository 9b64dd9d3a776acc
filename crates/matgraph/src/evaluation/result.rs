// SPDX-License-Identifier: MIT OR Apache-2.0
//! Final material attribute set produced by evaluation.

use crate::value::{Evaluated, PendingOperation, TextureRef, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Material attribute channel fed by a root input pin
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    /// Albedo color or texture
    BaseColor,
    /// Metalness
    Metallic,
    /// Specular intensity
    Specular,
    /// Roughness
    Roughness,
    /// Anisotropy
    Anisotropy,
    /// Emissive color or texture
    EmissiveColor,
    /// Masked-mode opacity
    OpacityMask,
    /// Translucent opacity
    Opacity,
    /// Tangent-space normal
    Normal,
    /// Ambient occlusion
    AmbientOcclusion,
}

/// Substring of a lower-cased pin name -> channel, first match wins
const CHANNEL_NAMES: [(&str, Channel); 10] = [
    ("base color", Channel::BaseColor),
    ("metallic", Channel::Metallic),
    ("specular", Channel::Specular),
    ("roughness", Channel::Roughness),
    ("anisotropy", Channel::Anisotropy),
    ("emissive", Channel::EmissiveColor),
    ("opacity mask", Channel::OpacityMask),
    ("opacity", Channel::Opacity),
    ("normal", Channel::Normal),
    ("ambient occlusion", Channel::AmbientOcclusion),
];

impl Channel {
    /// Map a root pin display name to its channel
    pub fn from_pin_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        CHANNEL_NAMES
            .iter()
            .find(|(needle, _)| lower.contains(needle))
            .map(|(_, channel)| *channel)
    }

    /// Whether the channel carries a color/vector rather than a scalar
    pub fn is_color(&self) -> bool {
        matches!(self, Self::BaseColor | Self::EmissiveColor | Self::Normal)
    }
}

/// Fixed-shape PBR attribute record; `None` means "use the renderer default"
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaterialAttributes {
    /// Base color: RGB vector or texture
    pub base_color: Option<Value>,
    /// Metallic
    pub metallic: Option<f32>,
    /// Specular
    pub specular: Option<f32>,
    /// Roughness
    pub roughness: Option<f32>,
    /// Anisotropy
    pub anisotropy: Option<f32>,
    /// Emissive color: RGB vector or texture
    pub emissive_color: Option<Value>,
    /// Opacity mask
    pub opacity_mask: Option<f32>,
    /// Opacity
    pub opacity: Option<f32>,
    /// Normal
    pub normal: Option<Value>,
    /// Ambient occlusion
    pub ambient_occlusion: Option<f32>,
    /// Deferred texture work per channel, awaiting the caller
    pub pending: IndexMap<Channel, PendingOperation>,
}

impl MaterialAttributes {
    /// Pending base color operation, if any
    pub fn pending_base_color(&self) -> Option<&PendingOperation> {
        self.pending.get(&Channel::BaseColor)
    }

    /// Whether any channel still awaits asynchronous resolution
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Store an evaluated pin into its channel.
    ///
    /// Pending results store `placeholder` as the visible value until resolved.
    /// Only color channels can wait on a texture; elsewhere a pending result
    /// leaves the channel absent.
    pub fn assign(&mut self, channel: Channel, evaluated: Evaluated, placeholder: [f32; 3]) {
        match evaluated {
            Evaluated::Pending(_) if !channel.is_color() => {
                tracing::debug!("Channel {:?} cannot hold a texture, pending value dropped", channel);
            }
            Evaluated::Pending(operation) => {
                self.set(channel, Value::Vector(placeholder.to_vec()));
                self.pending.insert(channel, operation);
            }
            Evaluated::Resolved(value) => self.set(channel, value),
        }
    }

    /// Overwrite a pending channel with its composed texture
    pub fn apply_resolved(&mut self, channel: Channel, texture: TextureRef) {
        if self.pending.swap_remove(&channel).is_none() {
            tracing::debug!("Channel {:?} was not pending", channel);
        }
        self.set(channel, Value::Texture(texture));
    }

    fn set(&mut self, channel: Channel, value: Value) {
        if channel.is_color() {
            let slot = match channel {
                Channel::BaseColor => &mut self.base_color,
                Channel::EmissiveColor => &mut self.emissive_color,
                _ => &mut self.normal,
            };
            *slot = to_color(value);
            return;
        }

        let Some(scalar) = value.as_scalar() else {
            tracing::debug!("Channel {:?} expects a scalar, got {:?}", channel, value);
            return;
        };
        let slot = match channel {
            Channel::Metallic => &mut self.metallic,
            Channel::Specular => &mut self.specular,
            Channel::Roughness => &mut self.roughness,
            Channel::Anisotropy => &mut self.anisotropy,
            Channel::OpacityMask => &mut self.opacity_mask,
            Channel::Opacity => &mut self.opacity,
            _ => &mut self.ambient_occlusion,
        };
        *slot = Some(scalar);
    }
}

/// Broadcast scalars to RGB and drop alpha from 4-vectors
fn to_color(value: Value) -> Option<Value> {
    match value {
        Value::Scalar(s) => Some(Value::Vector(vec![s; 3])),
        Value::Vector(mut v) if v.len() >= 3 => {
            v.truncate(3);
            Some(Value::Vector(v))
        }
        Value::Vector(v) => {
            tracing::debug!("Color channel needs at least 3 components, got {}", v.len());
            None
        }
        texture @ Value::Texture(_) => Some(texture),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::PendingKind;

    #[test]
    fn test_channel_name_matching() {
        assert_eq!(Channel::from_pin_name("Base Color"), Some(Channel::BaseColor));
        assert_eq!(Channel::from_pin_name("BASE COLOR (sRGB)"), Some(Channel::BaseColor));
        assert_eq!(Channel::from_pin_name("Opacity Mask"), Some(Channel::OpacityMask));
        assert_eq!(Channel::from_pin_name("Opacity"), Some(Channel::Opacity));
        assert_eq!(Channel::from_pin_name("Emissive Color"), Some(Channel::EmissiveColor));
        assert_eq!(Channel::from_pin_name("World Position Offset"), None);
    }

    #[test]
    fn test_color_broadcast_and_truncate() {
        let mut attributes = MaterialAttributes::default();
        attributes.assign(Channel::BaseColor, Value::Scalar(0.5).into(), [1.0; 3]);
        assert_eq!(attributes.base_color, Some(Value::Vector(vec![0.5; 3])));

        attributes.assign(
            Channel::EmissiveColor,
            Value::Vector(vec![1.0, 0.0, 0.0, 1.0]).into(),
            [1.0; 3],
        );
        assert_eq!(attributes.emissive_color, Some(Value::Vector(vec![1.0, 0.0, 0.0])));
    }

    #[test]
    fn test_scalar_channel_ignores_vectors() {
        let mut attributes = MaterialAttributes::default();
        attributes.assign(Channel::Metallic, Value::Vector(vec![1.0, 1.0, 1.0]).into(), [1.0; 3]);
        assert_eq!(attributes.metallic, None);
    }

    #[test]
    fn test_pending_then_resolved() {
        let texture = TextureRef {
            id: "brick".into(),
            url: "textures/brick.png".into(),
        };
        let operation = PendingOperation {
            operation: PendingKind::Multiply,
            texture: texture.clone(),
            color: Value::Vector(vec![1.0, 0.0, 0.0]),
        };

        let mut attributes = MaterialAttributes::default();
        attributes.assign(Channel::BaseColor, Evaluated::Pending(operation.clone()), [1.0; 3]);
        assert_eq!(attributes.base_color, Some(Value::Vector(vec![1.0; 3])));
        assert_eq!(attributes.pending_base_color(), Some(&operation));

        attributes.apply_resolved(Channel::BaseColor, texture.clone());
        assert!(!attributes.has_pending());
        assert_eq!(attributes.base_color, Some(Value::Texture(texture)));
    }

    #[test]
    fn test_pending_on_scalar_channel_is_absent() {
        let operation = PendingOperation {
            operation: PendingKind::Multiply,
            texture: TextureRef {
                id: "brick".into(),
                url: "textures/brick.png".into(),
            },
            color: Value::Scalar(0.5),
        };

        let mut attributes = MaterialAttributes::default();
        attributes.assign(Channel::Metallic, Evaluated::Pending(operation), [1.0; 3]);
        assert_eq!(attributes.metallic, None);
        assert!(!attributes.has_pending());
    }
}
