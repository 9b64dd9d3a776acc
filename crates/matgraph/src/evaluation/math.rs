// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scalar/vector arithmetic with scalar broadcasting.

use crate::value::Value;

/// Component-wise binary operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    /// `A + B`
    Add,
    /// `A - B`
    Subtract,
    /// `A * B`
    Multiply,
    /// `A / B`
    Divide,
    /// `min(A, B)`
    Min,
    /// `max(A, B)`
    Max,
    /// `pow(A, B)`
    Power,
}

impl BinaryOp {
    /// Value substituted for a missing operand, if the operation has one
    pub fn identity(&self) -> Option<f32> {
        match self {
            Self::Add | Self::Subtract => Some(0.0),
            Self::Multiply | Self::Divide | Self::Power => Some(1.0),
            Self::Min | Self::Max => None,
        }
    }

    fn apply(&self, a: f32, b: f32) -> Option<f32> {
        match self {
            Self::Add => Some(a + b),
            Self::Subtract => Some(a - b),
            Self::Multiply => Some(a * b),
            Self::Divide if b == 0.0 => None,
            Self::Divide => Some(a / b),
            Self::Min => Some(a.min(b)),
            Self::Max => Some(a.max(b)),
            Self::Power => Some(a.powf(b)),
        }
    }
}

/// Component-wise unary function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `abs(x)`
    Abs,
    /// `ceil(x)`
    Ceil,
    /// `floor(x)`
    Floor,
    /// `frac(x)`
    Frac,
    /// `1 - x`
    OneMinus,
    /// `clamp(x, 0, 1)`
    Saturate,
    /// `sin(x)`
    Sine,
    /// `cos(x)`
    Cosine,
    /// `sqrt(x)`, negative inputs clamp to zero
    SquareRoot,
}

impl UnaryOp {
    fn apply(&self, x: f32) -> f32 {
        match self {
            Self::Abs => x.abs(),
            Self::Ceil => x.ceil(),
            Self::Floor => x.floor(),
            Self::Frac => x - x.floor(),
            Self::OneMinus => 1.0 - x,
            Self::Saturate => x.clamp(0.0, 1.0),
            Self::Sine => x.sin(),
            Self::Cosine => x.cos(),
            Self::SquareRoot => x.max(0.0).sqrt(),
        }
    }
}

/// Numeric shape of an operand
enum Shape<'a> {
    Scalar(f32),
    Vector(&'a [f32]),
}

fn shape(value: &Value) -> Option<Shape<'_>> {
    match value {
        Value::Scalar(v) => Some(Shape::Scalar(*v)),
        Value::Vector(v) => Some(Shape::Vector(v)),
        Value::Texture(_) => None,
    }
}

/// Common vector width of the operands, `Some(None)` when all are scalars.
fn common_width(operands: &[&Shape<'_>]) -> Option<Option<usize>> {
    let mut width = None;
    for operand in operands {
        if let Shape::Vector(v) = operand {
            match width {
                None => width = Some(v.len()),
                Some(w) if w != v.len() => {
                    tracing::warn!("Vector length mismatch: {} vs {}", w, v.len());
                    return None;
                }
                Some(_) => {}
            }
        }
    }
    Some(width)
}

fn component(shape: &Shape<'_>, index: usize) -> f32 {
    match shape {
        Shape::Scalar(v) => *v,
        Shape::Vector(v) => v[index],
    }
}

/// Apply `f` component-wise, broadcasting scalars across vectors.
///
/// Returns `None` for texture operands, mismatched vector lengths, or when
/// `f` rejects a component.
fn broadcast<const N: usize>(
    operands: [&Value; N],
    f: impl Fn([f32; N]) -> Option<f32>,
) -> Option<Value> {
    let shapes: Vec<Shape<'_>> = operands.iter().map(|v| shape(v)).collect::<Option<_>>()?;
    let refs: Vec<&Shape<'_>> = shapes.iter().collect();

    match common_width(&refs)? {
        None => f(std::array::from_fn(|i| component(&shapes[i], 0))).map(Value::Scalar),
        Some(width) => (0..width)
            .map(|c| f(std::array::from_fn(|i| component(&shapes[i], c))))
            .collect::<Option<Vec<f32>>>()
            .map(Value::Vector),
    }
}

/// Binary arithmetic with broadcasting
pub fn binary(op: BinaryOp, a: &Value, b: &Value) -> Option<Value> {
    broadcast([a, b], |[x, y]| op.apply(x, y))
}

/// Unary function applied to every component
pub fn unary(op: UnaryOp, x: &Value) -> Option<Value> {
    broadcast([x], |[v]| Some(op.apply(v)))
}

/// `a + (b - a) * alpha`
pub fn lerp(a: &Value, b: &Value, alpha: &Value) -> Option<Value> {
    broadcast([a, b, alpha], |[a, b, t]| Some(a + (b - a) * t))
}

/// Clamp `x` into `[min, max]`
pub fn clamp(x: &Value, min: &Value, max: &Value) -> Option<Value> {
    broadcast([x, min, max], |[x, lo, hi]| Some(x.max(lo).min(hi)))
}

/// Concatenate the components of two numeric values, up to four components
pub fn append(a: &Value, b: &Value) -> Option<Value> {
    let components = |v: &Value| match v {
        Value::Scalar(s) => Some(vec![*s]),
        Value::Vector(c) => Some(c.clone()),
        Value::Texture(_) => None,
    };
    let mut out = components(a)?;
    out.extend(components(b)?);
    (out.len() <= 4).then_some(Value::Vector(out))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vec3(x: f32, y: f32, z: f32) -> Value {
        Value::Vector(vec![x, y, z])
    }

    #[test]
    fn test_scalar_arithmetic() {
        let a = Value::Scalar(3.0);
        let b = Value::Scalar(2.0);
        assert_eq!(binary(BinaryOp::Add, &a, &b), Some(Value::Scalar(5.0)));
        assert_eq!(binary(BinaryOp::Subtract, &a, &b), Some(Value::Scalar(1.0)));
        assert_eq!(binary(BinaryOp::Multiply, &a, &b), Some(Value::Scalar(6.0)));
        assert_eq!(binary(BinaryOp::Divide, &a, &b), Some(Value::Scalar(1.5)));
        assert_eq!(binary(BinaryOp::Power, &a, &b), Some(Value::Scalar(9.0)));
        assert_eq!(binary(BinaryOp::Min, &a, &b), Some(Value::Scalar(2.0)));
    }

    #[test]
    fn test_scalar_broadcasts_over_vector() {
        let v = vec3(1.0, 2.0, 3.0);
        let s = Value::Scalar(2.0);
        assert_eq!(binary(BinaryOp::Multiply, &s, &v), Some(vec3(2.0, 4.0, 6.0)));
        assert_eq!(binary(BinaryOp::Add, &v, &s), Some(vec3(3.0, 4.0, 5.0)));
    }

    #[test]
    fn test_vector_elementwise() {
        let a = vec3(1.0, 0.5, 0.25);
        let b = vec3(0.5, 0.5, 4.0);
        assert_eq!(binary(BinaryOp::Multiply, &a, &b), Some(vec3(0.5, 0.25, 1.0)));
    }

    #[test]
    fn test_mismatched_lengths_are_absent() {
        let a = Value::Vector(vec![1.0, 2.0]);
        let b = vec3(1.0, 2.0, 3.0);
        assert_eq!(binary(BinaryOp::Add, &a, &b), None);
    }

    #[test]
    fn test_divide_by_zero_is_absent() {
        let a = vec3(1.0, 2.0, 3.0);
        let b = vec3(1.0, 0.0, 1.0);
        assert_eq!(binary(BinaryOp::Divide, &a, &b), None);
    }

    #[test]
    fn test_lerp() {
        let r = lerp(&Value::Scalar(0.0), &Value::Scalar(10.0), &Value::Scalar(0.5));
        assert_eq!(r, Some(Value::Scalar(5.0)));

        let a = vec3(0.0, 0.5, 1.0);
        let b = vec3(1.0, 0.5, 0.0);
        assert_eq!(lerp(&a, &b, &Value::Scalar(0.0)), Some(a.clone()));
        assert_eq!(lerp(&a, &b, &Value::Scalar(1.0)), Some(b.clone()));
    }

    #[test]
    fn test_unary_and_clamp() {
        let v = vec3(-0.5, 0.25, 1.5);
        assert_eq!(unary(UnaryOp::Saturate, &v), Some(vec3(0.0, 0.25, 1.0)));
        assert_eq!(unary(UnaryOp::OneMinus, &Value::Scalar(0.25)), Some(Value::Scalar(0.75)));
        assert_eq!(
            clamp(&v, &Value::Scalar(0.0), &Value::Scalar(1.0)),
            Some(vec3(0.0, 0.25, 1.0))
        );
    }

    #[test]
    fn test_append() {
        let rg = Value::Vector(vec![1.0, 0.5]);
        assert_eq!(append(&rg, &Value::Scalar(0.25)), Some(vec3(1.0, 0.5, 0.25)));
        assert_eq!(append(&rg, &Value::Vector(vec![0.0, 0.0, 0.0])), None);
    }
}
