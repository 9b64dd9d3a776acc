// SPDX-License-Identifier: MIT OR Apache-2.0
//! Arithmetic nodes.

use crate::evaluation::math::{BinaryOp, UnaryOp};
use crate::node::{EvalRule, NodeDefinition, NodeKind, PinSpec};
use crate::port::PinType;
use crate::value::Literal;

/// Two-operand node on pins `A` and `B`; unconnected operands default to the identity
fn binary(key: &str, title: &str, op: BinaryOp, expression: &str) -> NodeDefinition {
    let operand = |id: &str| {
        let pin = PinSpec::input(id, id, PinType::Wildcard);
        match op.identity() {
            Some(identity) => pin.with_default(Literal::Float(identity)),
            None => pin,
        }
    };

    NodeDefinition::new(key, title, "Math", NodeKind::Expression)
        .pin(operand("A"))
        .pin(operand("B"))
        .pin(PinSpec::output("Result", "", PinType::Wildcard))
        .template(format!("auto {{OUTPUT}} = {expression};"))
        .rule(EvalRule::Binary(op))
}

fn unary(key: &str, title: &str, category: &str, op: UnaryOp, expression: &str) -> NodeDefinition {
    NodeDefinition::new(key, title, category, NodeKind::Expression)
        .pin(PinSpec::input("Input", "", PinType::Wildcard))
        .pin(PinSpec::output("Result", "", PinType::Wildcard))
        .template(format!("auto {{OUTPUT}} = {expression};"))
        .rule(EvalRule::Unary(op))
}

pub(super) fn definitions() -> Vec<NodeDefinition> {
    vec![
        binary("Add", "Add", BinaryOp::Add, "{A} + {B}")
            .keywords("plus sum +")
            .hotkey('A'),
        binary("Subtract", "Subtract", BinaryOp::Subtract, "{A} - {B}").keywords("minus difference -"),
        binary("Multiply", "Multiply", BinaryOp::Multiply, "{A} * {B}")
            .keywords("times product tint *")
            .hotkey('M'),
        binary("Divide", "Divide", BinaryOp::Divide, "{A} / {B}")
            .keywords("quotient /")
            .hotkey('D'),
        binary("Min", "Min", BinaryOp::Min, "min({A}, {B})").keywords("minimum smallest"),
        binary("Max", "Max", BinaryOp::Max, "max({A}, {B})").keywords("maximum largest"),
        binary("Power", "Power", BinaryOp::Power, "pow({A}, {B})")
            .keywords("exponent pow")
            .hotkey('E'),
        NodeDefinition::new("Lerp", "Linear Interpolate", "Math", NodeKind::Expression)
            .pin(PinSpec::input("A", "A", PinType::Wildcard).with_default(Literal::Float(0.0)))
            .pin(PinSpec::input("B", "B", PinType::Wildcard).with_default(Literal::Float(1.0)))
            .pin(PinSpec::input("Alpha", "Alpha", PinType::Float).with_default(Literal::Float(0.5)))
            .pin(PinSpec::output("Result", "", PinType::Wildcard))
            .template("auto {OUTPUT} = lerp({A}, {B}, {Alpha});")
            .rule(EvalRule::Lerp)
            .keywords("lerp mix blend interpolate")
            .hotkey('L'),
        NodeDefinition::new("Clamp", "Clamp", "Math", NodeKind::Expression)
            .pin(PinSpec::input("Input", "", PinType::Wildcard))
            .pin(PinSpec::input("Min", "Min", PinType::Wildcard).with_default(Literal::Float(0.0)))
            .pin(PinSpec::input("Max", "Max", PinType::Wildcard).with_default(Literal::Float(1.0)))
            .pin(PinSpec::output("Result", "", PinType::Wildcard))
            .template("auto {OUTPUT} = clamp({Input}, {Min}, {Max});")
            .rule(EvalRule::Clamp)
            .keywords("limit range"),
        unary("OneMinus", "1-x", "Math", UnaryOp::OneMinus, "1.0 - {Input}")
            .keywords("one minus invert")
            .hotkey('O'),
        unary("Abs", "Abs", "Math", UnaryOp::Abs, "abs({Input})").keywords("absolute"),
        unary("Floor", "Floor", "Math", UnaryOp::Floor, "floor({Input})").keywords("round down"),
        unary("Ceil", "Ceil", "Math", UnaryOp::Ceil, "ceil({Input})").keywords("round up ceiling"),
        unary("Frac", "Frac", "Math", UnaryOp::Frac, "frac({Input})").keywords("fraction fractional"),
        unary("Saturate", "Saturate", "Math", UnaryOp::Saturate, "saturate({Input})").keywords("clamp01"),
        unary("SquareRoot", "Square Root", "Math", UnaryOp::SquareRoot, "sqrt({Input})").keywords("sqrt root"),
        unary("Sine", "Sine", "Math|Trigonometry", UnaryOp::Sine, "sin({Input})").keywords("sin wave"),
        unary("Cosine", "Cosine", "Math|Trigonometry", UnaryOp::Cosine, "cos({Input})").keywords("cos wave"),
    ]
}
