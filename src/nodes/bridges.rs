//! Graph boundary bridges: `inlet`, `outlet`, `inlet~`, `outlet~`
//!
//! A message bridge relays whatever reaches it; the engine routes a message
//! aimed at a subpatch inlet to the matching `inlet` object, and an `outlet`
//! object's wiring points at the parent-side targets. The signal bridges are
//! block copies whose rails are spliced across the boundary when wiring is
//! resolved.

use crate::message::Message;
use crate::object::{
    AudioNode, ControlContext, DspFrame, MessageNode, sample_span, SignalState,
};

pub struct MessageInletBridge;

impl MessageNode for MessageInletBridge {
    fn label(&self) -> &str {
        "inlet"
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

pub struct MessageOutletBridge;

impl MessageNode for MessageOutletBridge {
    fn label(&self) -> &str {
        "outlet"
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

pub struct DspInletBridge {
    state: SignalState,
}

impl DspInletBridge {
    pub fn new() -> Self {
        DspInletBridge {
            state: SignalState::default(),
        }
    }
}

impl Default for DspInletBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioNode for DspInletBridge {
    fn label(&self) -> &str {
        "inlet~"
    }

    fn inlet_count(&self) -> usize {
        1
    }

    fn outlet_count(&self) -> usize {
        1
    }

    fn signal_inlet_count(&self) -> usize {
        1
    }

    fn signal_outlet_count(&self) -> usize {
        1
    }

    fn state(&self) -> &SignalState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SignalState {
        &mut self.state
    }

    fn process_to(&mut self, to_index: f32, frame: &mut DspFrame<'_>) {
        let (from, to) = sample_span(self.state.cursor, to_index.min(frame.block_size as f32));
        let input = frame.inputs[0];
        frame.outputs[0][from..to].copy_from_slice(&input[from..to]);
        self.state.cursor = to_index;
    }
}

pub struct DspOutletBridge {
    state: SignalState,
}

impl DspOutletBridge {
    pub fn new() -> Self {
        DspOutletBridge {
            state: SignalState::default(),
        }
    }
}

impl Default for DspOutletBridge {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioNode for DspOutletBridge {
    fn label(&self) -> &str {
        "outlet~"
    }

    fn inlet_count(&self) -> usize {
        1
    }

    fn outlet_count(&self) -> usize {
        1
    }

    fn signal_inlet_count(&self) -> usize {
        1
    }

    fn signal_outlet_count(&self) -> usize {
        1
    }

    fn state(&self) -> &SignalState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SignalState {
        &mut self.state
    }

    fn process_to(&mut self, to_index: f32, frame: &mut DspFrame<'_>) {
        let (from, to) = sample_span(self.state.cursor, to_index.min(frame.block_size as f32));
        let input = frame.inputs[0];
        frame.outputs[0][from..to].copy_from_slice(&input[from..to]);
        self.state.cursor = to_index;
    }
}
