//! Float comparisons: `>`, `>=`, `<`, `<=`, `==`, `!=`
//!
//! Same inlet convention as the arithmetic family; the result is 1 or 0.

use crate::message::{Atom, Message};
use crate::object::{ControlContext, MessageNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
    Equal,
    NotEqual,
}

impl CompareOp {
    pub fn label(self) -> &'static str {
        match self {
            CompareOp::GreaterThan => ">",
            CompareOp::GreaterOrEqual => ">=",
            CompareOp::LessThan => "<",
            CompareOp::LessOrEqual => "<=",
            CompareOp::Equal => "==",
            CompareOp::NotEqual => "!=",
        }
    }

    fn apply(self, left: f32, right: f32) -> bool {
        match self {
            CompareOp::GreaterThan => left > right,
            CompareOp::GreaterOrEqual => left >= right,
            CompareOp::LessThan => left < right,
            CompareOp::LessOrEqual => left <= right,
            CompareOp::Equal => left == right,
            CompareOp::NotEqual => left != right,
        }
    }
}

pub struct MessageCompare {
    op: CompareOp,
    constant: f32,
}

impl MessageCompare {
    pub fn new(op: CompareOp, init: &[Atom]) -> Self {
        let constant = init.first().and_then(Atom::as_float).unwrap_or(0.0);
        MessageCompare { op, constant }
    }
}

impl MessageNode for MessageCompare {
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
                    let result = if self.op.apply(value, self.constant) {
                        1.0
                    } else {
                        0.0
                    };
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Outbox, PrintHooks};

    fn compare(op: CompareOp, constant: f32, value: f32) -> f32 {
        let mut node = MessageCompare::new(op, &[Atom::Float(constant)]);
        let mut outbox = Outbox::default();
        let print = PrintHooks::default();
        let mut ctx = ControlContext {
            outbox: &mut outbox,
            print: &print,
            block_start: 0.0,
            sample_rate: 44100.0,
            block_size: 64,
        };
        node.process_message(0, &Message::float(0.0, value), &mut ctx);
        outbox.sends[0].1.float_at(0).unwrap()
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(compare(CompareOp::GreaterThan, 5.0, 6.0), 1.0);
        assert_eq!(compare(CompareOp::GreaterThan, 5.0, 5.0), 0.0);
        assert_eq!(compare(CompareOp::GreaterOrEqual, 5.0, 5.0), 1.0);
        assert_eq!(compare(CompareOp::LessThan, 5.0, 5.0), 0.0);
        assert_eq!(compare(CompareOp::LessOrEqual, 5.0, 5.0), 1.0);
        assert_eq!(compare(CompareOp::Equal, 5.0, 5.0), 1.0);
        assert_eq!(compare(CompareOp::NotEqual, 5.0, 5.0), 0.0);
    }
}
