//! Node capability traits and the per-call contexts handed to them
//!
//! Objects come in two capability tiers rather than a class hierarchy: a
//! [`MessageNode`] only reacts to control messages; an [`AudioNode`] reacts to
//! control messages *and* fills a block of samples. Both tiers talk back to
//! the engine through a [`ControlContext`], which collects outgoing messages,
//! schedule and cancel requests in order; the engine applies them after the
//! node call returns, which is what makes synchronous depth-first delivery
//! safe without aliasing the object arena.

use std::sync::Arc;

use crate::message::Message;
use crate::registry::SignalRails;

/// What an outlet carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionType {
    Message,
    Signal,
}

/// Which side last supplied each of the two leftmost inlets of a signal
/// object. Fixed when wiring is resolved; drives the per-sample operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalPrecedence {
    DspDsp,
    DspMessage,
    MessageDsp,
    MessageMessage,
}

/// Per-block bookkeeping shared by every signal object.
///
/// `cursor` is the block index of the last message: 0.0 at block start,
/// advanced by each mid-block message, and equal to the block size once the
/// object has finished its pass.
#[derive(Debug, Clone, Copy)]
pub struct SignalState {
    pub precedence: SignalPrecedence,
    pub cursor: f32,
}

impl Default for SignalState {
    fn default() -> Self {
        SignalState {
            precedence: SignalPrecedence::MessageMessage,
            cursor: 0.0,
        }
    }
}

/// Integer sample span `[from, to)` for a partial-block computation.
///
/// The lower bound takes the ceiling of the cursor ("samples already computed
/// up to"), the upper bound the floor of the target index.
pub fn sample_span(cursor: f32, to_index: f32) -> (usize, usize) {
    let from = cursor.ceil().max(0.0) as usize;
    let to = to_index.floor().max(0.0) as usize;
    (from, to.max(from))
}

/// Installable print sinks. Patch-level `print` objects and absorbed runtime
/// errors go through these rather than the logging layer, so a host can
/// capture them.
pub struct PrintHooks {
    std_sink: Box<dyn Fn(&str) + Send>,
    err_sink: Box<dyn Fn(&str) + Send>,
}

impl PrintHooks {
    pub fn print_std(&self, text: &str) {
        (self.std_sink)(text)
    }

    pub fn print_err(&self, text: &str) {
        (self.err_sink)(text)
    }

    pub fn set_std(&mut self, sink: impl Fn(&str) + Send + 'static) {
        self.std_sink = Box::new(sink);
    }

    pub fn set_err(&mut self, sink: impl Fn(&str) + Send + 'static) {
        self.err_sink = Box::new(sink);
    }
}

impl Default for PrintHooks {
    fn default() -> Self {
        PrintHooks {
            std_sink: Box::new(|text| println!("{}", text)),
            err_sink: Box::new(|text| eprintln!("{}", text)),
        }
    }
}

/// Ordered effects emitted by one node call, applied by the engine after the
/// call returns: cancellations first, then schedule requests, then synchronous
/// sends in emission order, then named dispatches.
#[derive(Default)]
pub(crate) struct Outbox {
    pub sends: Vec<(usize, Message)>,
    pub schedules: Vec<(usize, Arc<Message>)>,
    pub cancels: Vec<(usize, Arc<Message>)>,
    pub named: Vec<(String, Message)>,
}

/// The engine services available to a node while it handles one message.
pub struct ControlContext<'a> {
    pub(crate) outbox: &'a mut Outbox,
    pub(crate) print: &'a PrintHooks,
    /// Engine-clock timestamp of the current block start, in milliseconds.
    pub block_start: f64,
    pub sample_rate: f32,
    pub block_size: usize,
}

impl ControlContext<'_> {
    /// Send a message out of the given outlet, delivered depth-first to every
    /// connection in wiring order once this call returns.
    pub fn send(&mut self, outlet: usize, message: Message) {
        self.outbox.sends.push((outlet, message));
    }

    /// Queue a message for later delivery from the given outlet. The returned
    /// handle identifies the entry for [`ControlContext::cancel`].
    pub fn schedule(&mut self, outlet: usize, message: Message) -> Arc<Message> {
        let heap = message.copy_to_heap();
        self.outbox.schedules.push((outlet, heap.clone()));
        heap
    }

    /// Remove a still-pending scheduled message. A handle whose entry already
    /// fired is ignored.
    pub fn cancel(&mut self, outlet: usize, handle: &Arc<Message>) {
        self.outbox.cancels.push((outlet, handle.clone()));
    }

    /// Deliver a message to every receiver bound to `name` in the root
    /// registry, in registration order.
    pub fn dispatch_to_named(&mut self, name: impl Into<String>, message: Message) {
        self.outbox.named.push((name.into(), message));
    }

    pub fn print_std(&self, text: &str) {
        self.print.print_std(text)
    }

    pub fn print_err(&self, text: &str) {
        self.print.print_err(text)
    }
}

/// Audio-side view handed to a signal object: resolved input rails, its own
/// outlet buffers, the global converter rails, and the named signal rails.
pub struct DspFrame<'a> {
    /// One rail per signal inlet; unconnected inlets read the zero rail.
    pub inputs: &'a [&'a [f32]],
    /// One owned buffer per signal outlet.
    pub outputs: &'a mut [Vec<f32>],
    /// Interleaved input rail (all samples of channel 0, then channel 1, ...).
    pub adc: &'a [f32],
    /// Interleaved output rail; converter objects accumulate into it.
    pub dac: &'a mut [f32],
    /// Named rails for the signal rendezvous objects.
    pub rails: &'a mut SignalRails,
    pub block_start: f64,
    pub sample_rate: f32,
    pub block_size: usize,
}

/// A control-only object.
pub trait MessageNode: Send {
    fn label(&self) -> &str;

    fn inlet_count(&self) -> usize;

    fn outlet_count(&self) -> usize;

    /// React to one message arriving at an inlet.
    fn process_message(&mut self, inlet: usize, message: &Message, ctx: &mut ControlContext<'_>);

    /// Called when one of this object's scheduled messages fires, before the
    /// engine fans the message out of the recorded outlet. A metronome uses
    /// this to queue its next tick.
    fn scheduled_hook(&mut self, _outlet: usize, _message: &Message, _ctx: &mut ControlContext<'_>) {
    }

    /// Called once after the patch has been built and planned.
    fn load_bang(&mut self, _ctx: &mut ControlContext<'_>) {}
}

/// An object that also fills a block of samples. Signal inlets and outlets
/// are the leftmost `signal_inlet_count()` / `signal_outlet_count()` of the
/// object's inlets and outlets.
pub trait AudioNode: Send {
    fn label(&self) -> &str;

    fn inlet_count(&self) -> usize;

    fn outlet_count(&self) -> usize;

    fn signal_inlet_count(&self) -> usize;

    fn signal_outlet_count(&self) -> usize;

    fn state(&self) -> &SignalState;

    fn state_mut(&mut self) -> &mut SignalState;

    /// React to a message at a mixed inlet. Implementations that splice the
    /// block call `process_to(message.block_index(..), frame)` first, then
    /// apply the message's effect.
    fn process_message(
        &mut self,
        _inlet: usize,
        _message: &Message,
        _frame: &mut DspFrame<'_>,
        _ctx: &mut ControlContext<'_>,
    ) {
    }

    /// Fill output samples from the cursor up to `to_index` under the current
    /// precedence, then advance the cursor to `to_index`. The engine calls
    /// this once per block with `to_index == block_size` to finish the block.
    fn process_to(&mut self, to_index: f32, frame: &mut DspFrame<'_>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_span_rounding() {
        // message lands between samples 31 and 32
        let (from, to) = sample_span(0.0, 31.2);
        assert_eq!((from, to), (0, 31));
        let (from, to) = sample_span(31.2, 64.0);
        assert_eq!((from, to), (32, 64));
    }

    #[test]
    fn test_sample_span_never_inverts() {
        let (from, to) = sample_span(10.9, 10.2);
        assert!(from <= to);
    }

    #[test]
    fn test_default_signal_state() {
        let state = SignalState::default();
        assert_eq!(state.precedence, SignalPrecedence::MessageMessage);
        assert_eq!(state.cursor, 0.0);
    }
}
