//! `osc~` — sine oscillator
//!
//! The left inlet is mixed: a signal connection drives the frequency per
//! sample (phase modulation of the increment), otherwise a float message sets
//! the frequency constant, spliced sample-accurately into the block. The
//! right inlet resets the phase (0..1 of a cycle).

use std::f64::consts::TAU;

use crate::message::{Atom, Message};
use crate::object::{
    AudioNode, ControlContext, DspFrame, sample_span, SignalPrecedence, SignalState,
};

pub struct DspOsc {
    frequency: f32,
    /// Cycle phase in [0, 1).
    phase: f64,
    state: SignalState,
}

impl DspOsc {
    pub fn new(init: &[Atom]) -> Self {
        DspOsc {
            frequency: init.first().and_then(Atom::as_float).unwrap_or(0.0),
            phase: 0.0,
            state: SignalState::default(),
        }
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }
}

impl AudioNode for DspOsc {
    fn label(&self) -> &str {
        "osc~"
    }

    fn inlet_count(&self) -> usize {
        2
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

    fn process_message(
        &mut self,
        inlet: usize,
        message: &Message,
        frame: &mut DspFrame<'_>,
        _ctx: &mut ControlContext<'_>,
    ) {
        match inlet {
            0 => {
                if let Some(frequency) = message.float_at(0) {
                    let index = message.block_index(frame.block_start, frame.sample_rate);
                    self.process_to(index, frame);
                    self.frequency = frequency;
                }
            }
            1 => {
                if let Some(phase) = message.float_at(0) {
                    let index = message.block_index(frame.block_start, frame.sample_rate);
                    self.process_to(index, frame);
                    self.phase = (phase as f64).rem_euclid(1.0);
                }
            }
            _ => {}
        }
    }

    fn process_to(&mut self, to_index: f32, frame: &mut DspFrame<'_>) {
        let (from, to) = sample_span(self.state.cursor, to_index.min(frame.block_size as f32));
        let sample_rate = frame.sample_rate as f64;
        let output = &mut frame.outputs[0];
        match self.state.precedence {
            SignalPrecedence::DspDsp | SignalPrecedence::DspMessage => {
                let input = frame.inputs[0];
                for i in from..to {
                    output[i] = (self.phase * TAU).sin() as f32;
                    self.phase = (self.phase + input[i] as f64 / sample_rate).rem_euclid(1.0);
                }
            }
            SignalPrecedence::MessageDsp | SignalPrecedence::MessageMessage => {
                let increment = self.frequency as f64 / sample_rate;
                for i in from..to {
                    output[i] = (self.phase * TAU).sin() as f32;
                    self.phase = (self.phase + increment).rem_euclid(1.0);
                }
            }
        }
        self.state.cursor = to_index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Outbox, PrintHooks};
    use crate::registry::SignalRails;

    #[test]
    fn test_constant_frequency_sine() {
        let mut node = DspOsc::new(&[Atom::Float(440.0)]);
        let mut outputs = vec![vec![0.0f32; 64]];
        let zero = vec![0.0f32; 64];
        let inputs: Vec<&[f32]> = vec![&zero];
        let mut dac = vec![0.0f32; 128];
        let mut rails = SignalRails::new(64);
        let mut frame = DspFrame {
            inputs: &inputs,
            outputs: &mut outputs,
            adc: &[],
            dac: &mut dac,
            rails: &mut rails,
            block_start: 0.0,
            sample_rate: 44100.0,
            block_size: 64,
        };
        node.process_to(64.0, &mut frame);

        for (i, sample) in outputs[0].iter().enumerate() {
            let expected = (TAU * 440.0 * i as f64 / 44100.0).sin() as f32;
            assert!(
                (sample - expected).abs() < 1e-4,
                "sample {}: {} vs {}",
                i,
                sample,
                expected
            );
        }
        assert_eq!(node.state.cursor, 64.0);
    }

    #[test]
    fn test_frequency_message_splices_block() {
        let mut node = DspOsc::new(&[Atom::Float(0.0)]);
        let mut outputs = vec![vec![9.9f32; 64]];
        let zero = vec![0.0f32; 64];
        let inputs: Vec<&[f32]> = vec![&zero];
        let mut dac = vec![0.0f32; 128];
        let mut rails = SignalRails::new(64);
        let mut frame = DspFrame {
            inputs: &inputs,
            outputs: &mut outputs,
            adc: &[],
            dac: &mut dac,
            rails: &mut rails,
            block_start: 0.0,
            sample_rate: 44100.0,
            block_size: 64,
        };
        let print = PrintHooks::default();
        let mut outbox = Outbox::default();
        let mut ctx = ControlContext {
            outbox: &mut outbox,
            print: &print,
            block_start: 0.0,
            sample_rate: 44100.0,
            block_size: 64,
        };
        // frequency change lands at sample 32
        let ts = (32.0 / 44100.0) * 1000.0;
        node.process_message(0, &Message::float(ts, 2205.0), &mut frame, &mut ctx);
        assert_eq!(node.frequency(), 2205.0);
        assert!((node.state.cursor - 32.0).abs() < 1e-3);
        // samples before the splice point came from the 0 Hz constant
        assert_eq!(outputs[0][0], 0.0);
        assert_eq!(outputs[0][31], 0.0);
        // the tail has not been written yet
        assert_eq!(outputs[0][63], 9.9);
    }
}
