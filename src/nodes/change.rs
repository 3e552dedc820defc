//! `change` — pass floats only when they differ from the last one

use crate::message::{Atom, Message};
use crate::object::{ControlContext, MessageNode};

pub struct MessageChange {
    last: Option<f32>,
}

impl MessageChange {
    pub fn new(init: &[Atom]) -> Self {
        MessageChange {
            last: init.first().and_then(Atom::as_float),
        }
    }
}

impl MessageNode for MessageChange {
    fn label(&self) -> &str {
        "change"
    }

    fn inlet_count(&self) -> usize {
        1
    }

    fn outlet_count(&self) -> usize {
        1
    }

    fn process_message(&mut self, inlet: usize, message: &Message, ctx: &mut ControlContext<'_>) {
        if inlet != 0 {
            return;
        }
        if let Some(value) = message.float_at(0) {
            if self.last != Some(value) {
                self.last = Some(value);
                ctx.send(0, Message::float(message.timestamp, value));
            }
        } else if message.is_bang() {
            if let Some(value) = self.last {
                ctx.send(0, Message::float(message.timestamp, value));
            }
        } else if message.symbol_at(0) == Some("set") {
            self.last = message.float_at(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Outbox, PrintHooks};

    fn run(node: &mut MessageChange, msg: Message) -> usize {
        let mut outbox = Outbox::default();
        let print = PrintHooks::default();
        let mut ctx = ControlContext {
            outbox: &mut outbox,
            print: &print,
            block_start: 0.0,
            sample_rate: 44100.0,
            block_size: 64,
        };
        node.process_message(0, &msg, &mut ctx);
        outbox.sends.len()
    }

    #[test]
    fn test_repeated_value_suppressed() {
        let mut node = MessageChange::new(&[]);
        assert_eq!(run(&mut node, Message::float(0.0, 1.0)), 1);
        assert_eq!(run(&mut node, Message::float(0.0, 1.0)), 0);
        assert_eq!(run(&mut node, Message::float(0.0, 2.0)), 1);
    }
}
