//! `print` — write messages to the standard print sink

use crate::message::{Atom, Message};
use crate::object::{ControlContext, MessageNode};

pub struct MessagePrint {
    prefix: Option<String>,
}

impl MessagePrint {
    pub fn new(init: &[Atom]) -> Self {
        let prefix = match init.first().and_then(Atom::as_symbol) {
            Some("-n") => None,
            Some(name) => Some(name.to_string()),
            None => Some("print".to_string()),
        };
        MessagePrint { prefix }
    }
}

impl MessageNode for MessagePrint {
    fn label(&self) -> &str {
        "print"
    }

    fn inlet_count(&self) -> usize {
        1
    }

    fn outlet_count(&self) -> usize {
        0
    }

    fn process_message(&mut self, _inlet: usize, message: &Message, ctx: &mut ControlContext<'_>) {
        match &self.prefix {
            Some(prefix) => ctx.print_std(&format!("{}: {}", prefix, message)),
            None => ctx.print_std(&message.to_string()),
        }
    }
}
