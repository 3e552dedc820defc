//! Binary float arithmetic: `+`, `-`, `*`, `/`, `pow`
//!
//! Left inlet takes the operand and emits the result; right inlet stores the
//! constant for subsequent operations.

use crate::message::{Atom, Message};
use crate::object::{ControlContext, MessageNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Pow,
}

impl ArithOp {
    pub fn label(self) -> &'static str {
        match self {
            ArithOp::Add => "+",
            ArithOp::Subtract => "-",
            ArithOp::Multiply => "*",
            ArithOp::Divide => "/",
            ArithOp::Pow => "pow",
        }
    }

    fn apply(self, left: f32, right: f32) -> f32 {
        match self {
            ArithOp::Add => left + right,
            ArithOp::Subtract => left - right,
            ArithOp::Multiply => left * right,
            // division by zero yields 0 rather than an inf that would
            // propagate through the control graph
            ArithOp::Divide => {
                if right == 0.0 {
                    0.0
                } else {
                    left / right
                }
            }
            ArithOp::Pow => {
                if left <= 0.0 {
                    0.0
                } else {
                    left.powf(right)
                }
            }
        }
    }
}

pub struct MessageArith {
    op: ArithOp,
    constant: f32,
}

impl MessageArith {
    pub fn new(op: ArithOp, init: &[Atom]) -> Self {
        let constant = init.first().and_then(Atom::as_float).unwrap_or(0.0);
        MessageArith { op, constant }
    }

    pub fn with_constant(op: ArithOp, constant: f32) -> Self {
        MessageArith { op, constant }
    }
}

impl MessageNode for MessageArith {
    fn label(&self) -> &str {
        self.op.label()
    }

    fn inlet_count(&self) -> usize {
        2
    }

    fn outlet_count(&self) -> usize {
        1
    }

    fn process_message(&mut self, inlet: usize, message: &Message, ctx: &mut ControlContext<'_>) {
        match inlet {
            0 => {
                if let Some(value) = message.float_at(0) {
                    let result = self.op.apply(value, self.constant);
                    ctx.send(0, Message::float(message.timestamp, result));
                }
            }
            1 => {
                if let Some(value) = message.float_at(0) {
                    self.constant = value;
                }
            }
            _ => {}
        }
    }
}
