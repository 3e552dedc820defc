//! `*~` and `+~` — signal arithmetic with mixed inlets
//!
//! Both inlets accept a signal connection or float messages. The per-sample
//! operation follows the precedence fixed at wiring time; a float arriving at
//! the right inlet mid-block first finishes the samples up to the message's
//! block index under the old constant, then swaps it.

use crate::message::{Atom, Message};
use crate::object::{
    AudioNode, ControlContext, DspFrame, sample_span, SignalPrecedence, SignalState,
};

macro_rules! signal_binop {
    ($name:ident, $label:literal, $op:tt) => {
        pub struct $name {
            constant: f32,
            state: SignalState,
        }

        impl $name {
            pub fn new(init: &[Atom]) -> Self {
                $name {
                    constant: init.first().and_then(Atom::as_float).unwrap_or(0.0),
                    state: SignalState::default(),
                }
            }

            pub fn constant(&self) -> f32 {
                self.constant
            }
        }

        impl AudioNode for $name {
            fn label(&self) -> &str {
                $label
            }

            fn inlet_count(&self) -> usize {
                2
            }

            fn outlet_count(&self) -> usize {
                1
            }

            fn signal_inlet_count(&self) -> usize {
                2
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

            fn process_message(
                &mut self,
                inlet: usize,
                message: &Message,
                frame: &mut DspFrame<'_>,
                _ctx: &mut ControlContext<'_>,
            ) {
                if inlet == 1 {
                    if let Some(value) = message.float_at(0) {
                        let index = message.block_index(frame.block_start, frame.sample_rate);
                        self.process_to(index, frame);
                        self.constant = value;
                    }
                }
            }

            fn process_to(&mut self, to_index: f32, frame: &mut DspFrame<'_>) {
                let (from, to) =
                    sample_span(self.state.cursor, to_index.min(frame.block_size as f32));
                let output = &mut frame.outputs[0];
                match self.state.precedence {
                    SignalPrecedence::DspDsp => {
                        let left = frame.inputs[0];
                        let right = frame.inputs[1];
                        for i in from..to {
                            output[i] = left[i] $op right[i];
                        }
                    }
                    SignalPrecedence::DspMessage => {
                        let left = frame.inputs[0];
                        for i in from..to {
                            output[i] = left[i] $op self.constant;
                        }
                    }
                    SignalPrecedence::MessageDsp => {
                        let right = frame.inputs[1];
                        for i in from..to {
                            output[i] = self.constant $op right[i];
                        }
                    }
                    SignalPrecedence::MessageMessage => {
                        // no signal feed at all: the object is inert this block
                    }
                }
                self.state.cursor = to_index;
            }
        }
    };
}

signal_binop!(DspMultiply, "*~", *);
signal_binop!(DspAdd, "+~", +);
