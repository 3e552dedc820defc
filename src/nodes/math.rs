//! Unary float functions and `atan2`

use crate::message::{Atom, Message};
use crate::object::{ControlContext, MessageNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Abs,
    Sqrt,
    Log,
    Exp,
    Sin,
    Cos,
    Tan,
    Atan,
    PowToDb,
    DbToPow,
}

impl UnaryOp {
    pub fn label(self) -> &'static str {
        match self {
            UnaryOp::Abs => "abs",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Log => "log",
            UnaryOp::Exp => "exp",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Atan => "atan",
            UnaryOp::PowToDb => "powtodb",
            UnaryOp::DbToPow => "dbtopow",
        }
    }

    fn apply(self, value: f32) -> f32 {
        match self {
            UnaryOp::Abs => value.abs(),
            UnaryOp::Sqrt => {
                if value < 0.0 {
                    0.0
                } else {
                    value.sqrt()
                }
            }
            // out-of-domain logs saturate far below any audible level
            UnaryOp::Log => {
                if value <= 0.0 {
                    -1000.0
                } else {
                    value.ln()
                }
            }
            UnaryOp::Exp => value.exp(),
            UnaryOp::Sin => value.sin(),
            UnaryOp::Cos => value.cos(),
            UnaryOp::Tan => value.tan(),
            UnaryOp::Atan => value.atan(),
            UnaryOp::PowToDb => {
                if value <= 0.0 {
                    0.0
                } else {
                    (100.0 + 10.0 * value.log10()).max(0.0)
                }
            }
            UnaryOp::DbToPow => {
                if value <= 0.0 {
                    0.0
                } else {
                    10.0_f32.powf((value.min(870.0) - 100.0) / 10.0)
                }
            }
        }
    }
}

pub struct MessageUnary {
    op: UnaryOp,
}

impl MessageUnary {
    pub fn new(op: UnaryOp) -> Self {
        MessageUnary { op }
    }
}

impl MessageNode for MessageUnary {
    fn label(&self) -> &str {
        self.op.label()
    }

    fn inlet_count(&self) -> usize {
        1
    }

    fn outlet_count(&self) -> usize {
        1
    }

    fn process_message(&mut self, inlet: usize, message: &Message, ctx: &mut ControlContext<'_>) {
        if inlet == 0 {
            if let Some(value) = message.float_at(0) {
                ctx.send(0, Message::float(message.timestamp, self.op.apply(value)));
            }
        }
    }
}

/// `atan2`: left inlet is the y operand, right inlet stores x.
pub struct MessageAtan2 {
    constant: f32,
}

impl MessageAtan2 {
    pub fn new(init: &[Atom]) -> Self {
        MessageAtan2 {
            constant: init.first().and_then(Atom::as_float).unwrap_or(0.0),
        }
    }
}

impl MessageNode for MessageAtan2 {
    fn label(&self) -> &str {
        "atan2"
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
                if let Some(y) = message.float_at(0) {
                    ctx.send(0, Message::float(message.timestamp, y.atan2(self.constant)));
                }
            }
            1 => {
                if let Some(x) = message.float_at(0) {
                    self.constant = x;
                }
            }
            _ => {}
        }
    }
}
