//! `unpack` — distribute list elements to separate outlets
//!
//! The initializer is a template: `f`, `s`, `b` fix a slot's type, `a` (or
//! anything unrecognised) accepts any element. Outlets flush right-to-left so
//! that downstream objects see the leftmost element last. A slot whose
//! element does not match its template logs an error and is skipped; the
//! other slots still flush.

use crate::message::{Atom, Message};
use crate::object::{ControlContext, MessageNode};

pub struct MessageUnpack {
    template: Vec<Atom>,
}

fn template_atom(atom: &Atom) -> Atom {
    match atom {
        Atom::Float(_) => Atom::Float(0.0),
        Atom::Symbol(s) => match s.as_str() {
            "f" | "float" => Atom::Float(0.0),
            "s" | "symbol" => Atom::Symbol(String::new()),
            "b" | "bang" => Atom::Bang,
            _ => Atom::Anything,
        },
        other => other.clone(),
    }
}

impl MessageUnpack {
    pub fn new(init: &[Atom]) -> Self {
        let template = if init.len() < 2 {
            // an uninitialised unpack gets two wildcard outlets
            vec![Atom::Anything, Atom::Anything]
        } else {
            init.iter().map(template_atom).collect()
        };
        MessageUnpack { template }
    }
}

impl MessageNode for MessageUnpack {
    fn label(&self) -> &str {
        "unpack"
    }

    fn inlet_count(&self) -> usize {
        1
    }

    fn outlet_count(&self) -> usize {
        self.template.len()
    }

    fn process_message(&mut self, inlet: usize, message: &Message, ctx: &mut ControlContext<'_>) {
        if inlet != 0 {
            return;
        }
        let count = message.len().min(self.template.len());
        for i in (0..count).rev() {
            let Some(element) = message.get(i) else {
                continue;
            };
            let slot = &self.template[i];
            if matches!(slot, Atom::Anything) || slot.same_type(element) {
                ctx.send(i, Message::new(message.timestamp, vec![element.clone()]));
            } else {
                ctx.print_err(&format!(
                    "unpack: type mismatch: {} expected but got {}",
                    slot.type_name(),
                    element.type_name()
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Outbox, PrintHooks};

    fn feed(node: &mut MessageUnpack, atoms: Vec<Atom>) -> Vec<(usize, Message)> {
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
            node.process_message(0, &Message::new(0.0, atoms), &mut ctx);
        }
        outbox.sends
    }

    #[test]
    fn test_flush_right_to_left() {
        let mut node = MessageUnpack::new(&[Atom::Symbol("f".into()), Atom::Symbol("f".into())]);
        let sends = feed(&mut node, vec![Atom::Float(1.0), Atom::Float(2.0)]);
        assert_eq!(sends.len(), 2);
        assert_eq!(sends[0].0, 1);
        assert_eq!(sends[0].1.float_at(0), Some(2.0));
        assert_eq!(sends[1].0, 0);
        assert_eq!(sends[1].1.float_at(0), Some(1.0));
    }

    #[test]
    fn test_mismatch_skips_slot_only() {
        let mut node = MessageUnpack::new(&[Atom::Symbol("f".into()), Atom::Symbol("s".into())]);
        let sends = feed(&mut node, vec![Atom::Float(3.14), Atom::Float(2.0)]);
        // slot 1 expected a symbol: skipped; slot 0 still flushes
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].0, 0);
        assert_eq!(sends[0].1.float_at(0), Some(3.14));
    }

    #[test]
    fn test_default_template_accepts_anything() {
        let mut node = MessageUnpack::new(&[]);
        assert_eq!(node.outlet_count(), 2);
        let sends = feed(
            &mut node,
            vec![Atom::Symbol("x".into()), Atom::Float(1.0)],
        );
        assert_eq!(sends.len(), 2);
    }

    #[test]
    fn test_short_message_flushes_prefix() {
        let mut node = MessageUnpack::new(&[Atom::Symbol("f".into()), Atom::Symbol("f".into())]);
        let sends = feed(&mut node, vec![Atom::Float(5.0)]);
        assert_eq!(sends.len(), 1);
        assert_eq!(sends[0].0, 0);
    }
}
