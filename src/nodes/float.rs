//! Value stores: `float`/`f`, `int`/`i`
//!
//! Left inlet sets and emits; a bang re-emits; right inlet sets silently.

use crate::message::{Atom, Message};
use crate::object::{ControlContext, MessageNode};

pub struct MessageFloat {
    value: f32,
}

impl MessageFloat {
    pub fn new(value: f32) -> Self {
        MessageFloat { value }
    }

    pub fn from_init(init: &[Atom]) -> Self {
        MessageFloat::new(init.first().and_then(Atom::as_float).unwrap_or(0.0))
    }
}

impl MessageNode for MessageFloat {
    fn label(&self) -> &str {
        "float"
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
                    self.value = value;
                    ctx.send(0, Message::float(message.timestamp, self.value));
                } else if message.is_bang() {
                    ctx.send(0, Message::float(message.timestamp, self.value));
                }
            }
            1 => {
                if let Some(value) = message.float_at(0) {
                    self.value = value;
                }
            }
            _ => {}
        }
    }
}

pub struct MessageInt {
    value: f32,
}

impl MessageInt {
    pub fn from_init(init: &[Atom]) -> Self {
        MessageInt {
            value: init
                .first()
                .and_then(Atom::as_float)
                .unwrap_or(0.0)
                .trunc(),
        }
    }
}

impl MessageNode for MessageInt {
    fn label(&self) -> &str {
        "int"
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
                    self.value = value.trunc();
                    ctx.send(0, Message::float(message.timestamp, self.value));
                } else if message.is_bang() {
                    ctx.send(0, Message::float(message.timestamp, self.value));
                }
            }
            1 => {
                if let Some(value) = message.float_at(0) {
                    self.value = value.trunc();
                }
            }
            _ => {}
        }
    }
}
