//! Clock-driven objects: `metro`, `delay`/`del`, `pipe`
//!
//! These are the scheduler's clients. Each pending tick is identified by the
//! heap-message handle returned from `schedule`, so a reconfigured or stopped
//! object can cancel exactly the entry it still owns.

use std::sync::Arc;

use crate::message::{Atom, Message};
use crate::object::{ControlContext, MessageNode};

const MIN_INTERVAL_MS: f64 = 1.0;

/// Periodic bang source. A bang or nonzero float starts it (emitting
/// immediately), zero or `stop` halts it. The right inlet sets the period.
pub struct MessageMetro {
    interval_ms: f64,
    pending: Option<Arc<Message>>,
}

impl MessageMetro {
    pub fn new(init: &[Atom]) -> Self {
        MessageMetro {
            interval_ms: init
                .first()
                .and_then(Atom::as_float)
                .map(|f| f as f64)
                .unwrap_or(1000.0)
                .max(MIN_INTERVAL_MS),
            pending: None,
        }
    }

    fn stop(&mut self, ctx: &mut ControlContext<'_>) {
        if let Some(handle) = self.pending.take() {
            ctx.cancel(0, &handle);
        }
    }

    fn start(&mut self, at: f64, ctx: &mut ControlContext<'_>) {
        self.stop(ctx);
        ctx.send(0, Message::bang(at));
        let tick = Message::bang(at + self.interval_ms);
        self.pending = Some(ctx.schedule(0, tick));
    }
}

impl MessageNode for MessageMetro {
    fn label(&self) -> &str {
        "metro"
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
                if message.is_bang() {
                    self.start(message.timestamp, ctx);
                } else if let Some(value) = message.float_at(0) {
                    if value == 0.0 {
                        self.stop(ctx);
                    } else {
                        self.start(message.timestamp, ctx);
                    }
                } else if message.symbol_at(0) == Some("stop") {
                    self.stop(ctx);
                }
            }
            1 => {
                if let Some(value) = message.float_at(0) {
                    self.interval_ms = (value as f64).max(MIN_INTERVAL_MS);
                }
            }
            _ => {}
        }
    }

    fn scheduled_hook(&mut self, _outlet: usize, message: &Message, ctx: &mut ControlContext<'_>) {
        // the fired bang is fanned out by the engine; queue the next tick
        let tick = Message::bang(message.timestamp + self.interval_ms);
        self.pending = Some(ctx.schedule(0, tick));
    }
}

/// One-shot delayed bang. Retriggering restarts the clock.
pub struct MessageDelay {
    delay_ms: f64,
    pending: Option<Arc<Message>>,
}

impl MessageDelay {
    pub fn new(init: &[Atom]) -> Self {
        MessageDelay {
            delay_ms: init
                .first()
                .and_then(Atom::as_float)
                .map(|f| f as f64)
                .unwrap_or(0.0)
                .max(0.0),
            pending: None,
        }
    }

    fn restart(&mut self, at: f64, ctx: &mut ControlContext<'_>) {
        if let Some(handle) = self.pending.take() {
            ctx.cancel(0, &handle);
        }
        let due = Message::bang(at + self.delay_ms);
        self.pending = Some(ctx.schedule(0, due));
    }
}

impl MessageNode for MessageDelay {
    fn label(&self) -> &str {
        "delay"
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
                if message.is_bang() {
                    self.restart(message.timestamp, ctx);
                } else if let Some(value) = message.float_at(0) {
                    self.delay_ms = (value as f64).max(0.0);
                    self.restart(message.timestamp, ctx);
                } else if message.symbol_at(0) == Some("stop") {
                    if let Some(handle) = self.pending.take() {
                        ctx.cancel(0, &handle);
                    }
                }
            }
            1 => {
                if let Some(value) = message.float_at(0) {
                    self.delay_ms = (value as f64).max(0.0);
                }
            }
            _ => {}
        }
    }

    fn scheduled_hook(&mut self, _outlet: usize, _message: &Message, _ctx: &mut ControlContext<'_>) {
        self.pending = None;
    }
}

/// Delay line for messages; every input is forwarded after the delay, with
/// any number of entries in flight.
pub struct MessagePipe {
    delay_ms: f64,
}

impl MessagePipe {
    pub fn new(init: &[Atom]) -> Self {
        MessagePipe {
            delay_ms: init
                .first()
                .and_then(Atom::as_float)
                .map(|f| f as f64)
                .unwrap_or(0.0)
                .max(0.0),
        }
    }
}

impl MessageNode for MessagePipe {
    fn label(&self) -> &str {
        "pipe"
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
                let delayed =
                    Message::new(message.timestamp + self.delay_ms, message.atoms().to_vec());
                // fire-and-forget: the scheduler keeps the only reservation
                let _ = ctx.schedule(0, delayed);
            }
            1 => {
                if let Some(value) = message.float_at(0) {
                    self.delay_ms = (value as f64).max(0.0);
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

    fn ctx_run(node: &mut dyn MessageNode, inlet: usize, msg: Message) -> Outbox {
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
            node.process_message(inlet, &msg, &mut ctx);
        }
        outbox
    }

    #[test]
    fn test_metro_start_emits_and_schedules() {
        let mut node = MessageMetro::new(&[Atom::Float(250.0)]);
        let outbox = ctx_run(&mut node, 0, Message::bang(10.0));
        assert_eq!(outbox.sends.len(), 1);
        assert_eq!(outbox.schedules.len(), 1);
        assert_eq!(outbox.schedules[0].1.timestamp, 260.0);
    }

    #[test]
    fn test_metro_stop_cancels_pending() {
        let mut node = MessageMetro::new(&[Atom::Float(250.0)]);
        ctx_run(&mut node, 0, Message::bang(0.0));
        let outbox = ctx_run(&mut node, 0, Message::float(5.0, 0.0));
        assert_eq!(outbox.cancels.len(), 1);
        assert!(node.pending.is_none());
    }

    #[test]
    fn test_delay_retrigger_cancels_first() {
        let mut node = MessageDelay::new(&[Atom::Float(100.0)]);
        ctx_run(&mut node, 0, Message::bang(0.0));
        let outbox = ctx_run(&mut node, 0, Message::bang(50.0));
        assert_eq!(outbox.cancels.len(), 1);
        assert_eq!(outbox.schedules[0].1.timestamp, 150.0);
    }

    #[test]
    fn test_pipe_forwards_payload() {
        let mut node = MessagePipe::new(&[Atom::Float(30.0)]);
        let outbox = ctx_run(&mut node, 0, Message::float(5.0, 9.0));
        assert_eq!(outbox.schedules.len(), 1);
        let queued = &outbox.schedules[0].1;
        assert_eq!(queued.timestamp, 35.0);
        assert_eq!(queued.float_at(0), Some(9.0));
    }
}
