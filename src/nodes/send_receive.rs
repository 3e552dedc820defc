//! `send`/`s` and `receive`/`r` — message-rate rendezvous endpoints
//!
//! The wiring between them is installed by the root registry when the
//! objects register; at runtime both ends are plain relays.

use crate::message::Message;
use crate::object::{ControlContext, MessageNode};

pub struct MessageSend {
    name: String,
}

impl MessageSend {
    pub fn new(name: impl Into<String>) -> Self {
        MessageSend { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl MessageNode for MessageSend {
    fn label(&self) -> &str {
        "send"
    }

    fn inlet_count(&self) -> usize {
        1
    }

    fn outlet_count(&self) -> usize {
        1
    }

    fn process_message(&mut self, inlet: usize, message: &Message, ctx: &mut ControlContext<'_>) {
        if inlet == 0 {
            ctx.send(0, message.clone());
        }
    }
}

pub struct MessageReceive {
    name: String,
}

impl MessageReceive {
    pub fn new(name: impl Into<String>) -> Self {
        MessageReceive { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl MessageNode for MessageReceive {
    fn label(&self) -> &str {
        "receive"
    }

    fn inlet_count(&self) -> usize {
        1
    }

    fn outlet_count(&self) -> usize {
        1
    }

    fn process_message(&mut self, inlet: usize, message: &Message, ctx: &mut ControlContext<'_>) {
        if inlet == 0 {
            ctx.send(0, message.clone());
        }
    }
}
