//! Signal rendezvous: `send~`, `receive~`, `throw~`, `catch~`
//!
//! `send~` overwrites its named rail every block and any number of
//! `receive~` objects copy it. `throw~` accumulates into its rail and the
//! matching `catch~` drains the sum. The planner treats the writers as
//! leaves and the readers as roots, so a reader picks up the rail one block
//! late when it happens to run before the writer.

use crate::message::Atom;
use crate::object::{AudioNode, DspFrame, sample_span, SignalState};

fn init_name(init: &[Atom]) -> String {
    init.first()
        .and_then(Atom::as_symbol)
        .unwrap_or_default()
        .to_string()
}

pub struct DspSend {
    name: String,
    state: SignalState,
}

impl DspSend {
    pub fn new(init: &[Atom]) -> Self {
        DspSend {
            name: init_name(init),
            state: SignalState::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl AudioNode for DspSend {
    fn label(&self) -> &str {
        "send~"
    }

    fn inlet_count(&self) -> usize {
        1
    }

    fn outlet_count(&self) -> usize {
        0
    }

    fn signal_inlet_count(&self) -> usize {
        1
    }

    fn signal_outlet_count(&self) -> usize {
        0
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
        if let Some(rail) = frame.rails.send_rail_mut(&self.name) {
            rail[from..to].copy_from_slice(&input[from..to]);
        }
        self.state.cursor = to_index;
    }
}

pub struct DspReceive {
    name: String,
    state: SignalState,
}

impl DspReceive {
    pub fn new(init: &[Atom]) -> Self {
        DspReceive {
            name: init_name(init),
            state: SignalState::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl AudioNode for DspReceive {
    fn label(&self) -> &str {
        "receive~"
    }

    fn inlet_count(&self) -> usize {
        0
    }

    fn outlet_count(&self) -> usize {
        1
    }

    fn signal_inlet_count(&self) -> usize {
        0
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
        let output = &mut frame.outputs[0];
        match frame.rails.send_rail(&self.name) {
            Some(rail) => output[from..to].copy_from_slice(&rail[from..to]),
            None => output[from..to].fill(0.0),
        }
        self.state.cursor = to_index;
    }
}

pub struct DspThrow {
    name: String,
    state: SignalState,
}

impl DspThrow {
    pub fn new(init: &[Atom]) -> Self {
        DspThrow {
            name: init_name(init),
            state: SignalState::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl AudioNode for DspThrow {
    fn label(&self) -> &str {
        "throw~"
    }

    fn inlet_count(&self) -> usize {
        1
    }

    fn outlet_count(&self) -> usize {
        0
    }

    fn signal_inlet_count(&self) -> usize {
        1
    }

    fn signal_outlet_count(&self) -> usize {
        0
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
        if let Some(rail) = frame.rails.throw_rail_mut(&self.name) {
            for i in from..to {
                rail[i] += input[i];
            }
        }
        self.state.cursor = to_index;
    }
}

pub struct DspCatch {
    name: String,
    state: SignalState,
}

impl DspCatch {
    pub fn new(init: &[Atom]) -> Self {
        DspCatch {
            name: init_name(init),
            state: SignalState::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl AudioNode for DspCatch {
    fn label(&self) -> &str {
        "catch~"
    }

    fn inlet_count(&self) -> usize {
        0
    }

    fn outlet_count(&self) -> usize {
        1
    }

    fn signal_inlet_count(&self) -> usize {
        0
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
        // catch~ is never spliced by messages: drain the whole block once
        if self.state.cursor == 0.0 {
            frame.rails.drain_throw(&self.name, &mut frame.outputs[0]);
        }
        self.state.cursor = to_index;
    }
}
