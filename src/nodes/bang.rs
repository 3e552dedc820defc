//! `bang`/`bng` and `loadbang`

use crate::message::Message;
use crate::object::{ControlContext, MessageNode};

/// Collapses any incoming message to a bang.
pub struct MessageBang;

impl MessageNode for MessageBang {
    fn label(&self) -> &str {
        "bang"
    }

    fn inlet_count(&self) -> usize {
        1
    }

    fn outlet_count(&self) -> usize {
        1
    }

    fn process_message(&mut self, inlet: usize, message: &Message, ctx: &mut ControlContext<'_>) {
        if inlet == 0 {
            ctx.send(0, Message::bang(message.timestamp));
        }
    }
}

/// Fires once when the patch finishes loading.
pub struct MessageLoadbang;

impl MessageNode for MessageLoadbang {
    fn label(&self) -> &str {
        "loadbang"
    }

    fn inlet_count(&self) -> usize {
        0
    }

    fn outlet_count(&self) -> usize {
        1
    }

    fn process_message(&mut self, _inlet: usize, _message: &Message, _ctx: &mut ControlContext<'_>) {
    }

    fn load_bang(&mut self, ctx: &mut ControlContext<'_>) {
        ctx.send(0, Message::bang(ctx.block_start));
    }
}
