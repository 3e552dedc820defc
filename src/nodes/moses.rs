//! `moses` — split a float stream around a threshold
//!
//! Strictly-less goes left, everything else right. The right inlet moves the
//! threshold.

use crate::message::{Atom, Message};
use crate::object::{ControlContext, MessageNode};

pub struct MessageMoses {
    constant: f32,
}

impl MessageMoses {
    pub fn new(init: &[Atom]) -> Self {
        MessageMoses {
            constant: init.first().and_then(Atom::as_float).unwrap_or(0.0),
        }
    }
}

impl MessageNode for MessageMoses {
    fn label(&self) -> &str {
        "moses"
    }

    fn inlet_count(&self) -> usize {
        2
    }

    fn outlet_count(&self) -> usize {
        2
    }

    fn process_message(&mut self, inlet: usize, message: &Message, ctx: &mut ControlContext<'_>) {
        match inlet {
            0 => {
                if let Some(value) = message.float_at(0) {
                    let outlet = if value < self.constant { 0 } else { 1 };
                    ctx.send(outlet, Message::float(message.timestamp, value));
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

    fn feed(node: &mut MessageMoses, value: f32) -> (usize, f32) {
        let mut outbox = Outbox::default();
        let print = PrintHooks::default();
        {
            let mut ctx = ControlContext {
                outbox: &mut outbox,
                print: &print,
                block_start: 0.0,
                sample_rate: 44100.0,
                block_size: 64,
            };
            node.process_message(0, &Message::float(0.0, value), &mut ctx);
        }
        let (outlet, msg) = &outbox.sends[0];
        (*outlet, msg.float_at(0).unwrap())
    }

    #[test]
    fn test_split_is_strictly_less() {
        let mut node = MessageMoses::new(&[Atom::Float(10.0)]);
        assert_eq!(feed(&mut node, 3.0), (0, 3.0));
        assert_eq!(feed(&mut node, 10.0), (1, 10.0));
        assert_eq!(feed(&mut node, 15.0), (1, 15.0));
    }
}
