// SPDX-License-Identifier: MIT OR Apache-2.0
//! Authored literals and evaluated values.

use crate::port::PinType;
use serde::{Deserialize, Serialize};

/// Value stored in a pin default or a node property
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    /// Boolean
    Bool(bool),
    /// Float
    Float(f32),
    /// 2D vector
    Vector2([f32; 2]),
    /// 3D vector or RGB color
    Vector3([f32; 3]),
    /// 4D vector or RGBA color
    Vector4([f32; 4]),
    /// String (texture ids, parameter names, comments)
    Text(String),
}

impl Literal {
    /// Get the pin type for this literal
    pub fn pin_type(&self) -> Option<PinType> {
        match self {
            Self::Bool(_) => Some(PinType::Bool),
            Self::Float(_) => Some(PinType::Float),
            Self::Vector2(_) => Some(PinType::Float2),
            Self::Vector3(_) => Some(PinType::Float3),
            Self::Vector4(_) => Some(PinType::Float4),
            Self::Text(_) => None,
        }
    }

    /// Scalar view of the literal
    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// String view of the literal
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert to an evaluated value; text has no numeric meaning
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Self::Bool(_) | Self::Float(_) => self.as_f32().map(Value::Scalar),
            Self::Vector2(v) => Some(Value::Vector(v.to_vec())),
            Self::Vector3(v) => Some(Value::Vector(v.to_vec())),
            Self::Vector4(v) => Some(Value::Vector(v.to_vec())),
            Self::Text(_) => None,
        }
    }

    /// Render as shader source text
    pub fn to_shader_literal(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::Float(v) => format_float(*v),
            Self::Vector2(v) => format_vector(v),
            Self::Vector3(v) => format_vector(v),
            Self::Vector4(v) => format_vector(v),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Format a float so that it always reads as a float literal
pub fn format_float(value: f32) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

fn format_vector(components: &[f32]) -> String {
    let parts: Vec<String> = components.iter().map(|c| format_float(*c)).collect();
    format!("float{}({})", components.len(), parts.join(", "))
}

/// Reference to a resolved texture
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextureRef {
    /// Texture identifier in the texture library
    pub id: String,
    /// Location of the image data
    pub url: String,
}

/// Value produced by evaluating a pin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Scalar
    Scalar(f32),
    /// Numeric vector (2 to 4 components)
    Vector(Vec<f32>),
    /// Texture reference
    Texture(TextureRef),
}

impl Value {
    /// Scalar view
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            Self::Scalar(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether this is a scalar or a vector
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Scalar(_) | Self::Vector(_))
    }

    /// Texture view
    pub fn as_texture(&self) -> Option<&TextureRef> {
        match self {
            Self::Texture(t) => Some(t),
            _ => None,
        }
    }
}

/// Kind of deferred operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PendingKind {
    /// Multiply every texel by a color
    Multiply,
}

/// Deferred texture computation the caller must resolve asynchronously
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingOperation {
    /// Operation to perform
    pub operation: PendingKind,
    /// Texture operand
    pub texture: TextureRef,
    /// Numeric operand (scalar or color)
    pub color: Value,
}

/// Result of resolving a pin: a concrete value or a deferred computation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Evaluated {
    /// Concrete value
    Resolved(Value),
    /// Deferred texture operation
    Pending(PendingOperation),
}

impl Evaluated {
    /// Concrete value, if resolved
    pub fn resolved(&self) -> Option<&Value> {
        match self {
            Self::Resolved(v) => Some(v),
            Self::Pending(_) => None,
        }
    }
}

impl From<Value> for Evaluated {
    fn from(value: Value) -> Self {
        Self::Resolved(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shader_literals() {
        assert_eq!(Literal::Float(1.0).to_shader_literal(), "1.0");
        assert_eq!(Literal::Float(0.25).to_shader_literal(), "0.25");
        assert_eq!(
            Literal::Vector3([1.0, 0.5, 0.0]).to_shader_literal(),
            "float3(1.0, 0.5, 0.0)"
        );
        assert_eq!(Literal::Bool(false).to_shader_literal(), "false");
    }

    #[test]
    fn test_literal_to_value() {
        assert_eq!(Literal::Float(0.8).to_value(), Some(Value::Scalar(0.8)));
        assert_eq!(Literal::Bool(true).to_value(), Some(Value::Scalar(1.0)));
        assert_eq!(
            Literal::Vector2([1.0, 2.0]).to_value(),
            Some(Value::Vector(vec![1.0, 2.0]))
        );
        assert_eq!(Literal::Text("T_Brick".into()).to_value(), None);
    }
}
