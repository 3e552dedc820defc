//! `adc~` and `dac~` — the converter endpoints
//!
//! `adc~` reads the root input rail into its outlets, one per channel.
//! `dac~` accumulates its inlets into the root output rail, so multiple
//! converters sum naturally.

use crate::object::{AudioNode, DspFrame, sample_span, SignalState};

pub struct DspAdc {
    channels: usize,
    state: SignalState,
}

impl DspAdc {
    pub fn new(channels: usize) -> Self {
        DspAdc {
            channels: channels.max(1),
            state: SignalState::default(),
        }
    }
}

impl AudioNode for DspAdc {
    fn label(&self) -> &str {
        "adc~"
    }

    fn inlet_count(&self) -> usize {
        0
    }

    fn outlet_count(&self) -> usize {
        self.channels
    }

    fn signal_inlet_count(&self) -> usize {
        0
    }

    fn signal_outlet_count(&self) -> usize {
        self.channels
    }

    fn state(&self) -> &SignalState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SignalState {
        &mut self.state
    }

    fn process_to(&mut self, to_index: f32, frame: &mut DspFrame<'_>) {
        let block = frame.block_size;
        let (from, to) = sample_span(self.state.cursor, to_index.min(block as f32));
        for channel in 0..self.channels {
            let output = &mut frame.outputs[channel];
            let offset = channel * block;
            if offset + block <= frame.adc.len() {
                output[from..to].copy_from_slice(&frame.adc[offset + from..offset + to]);
            } else {
                output[from..to].fill(0.0);
            }
        }
        self.state.cursor = to_index;
    }
}

pub struct DspDac {
    channels: usize,
    state: SignalState,
}

impl DspDac {
    pub fn new(channels: usize) -> Self {
        DspDac {
            channels: channels.max(1),
            state: SignalState::default(),
        }
    }
}

impl AudioNode for DspDac {
    fn label(&self) -> &str {
        "dac~"
    }

    fn inlet_count(&self) -> usize {
        self.channels
    }

    fn outlet_count(&self) -> usize {
        0
    }

    fn signal_inlet_count(&self) -> usize {
        self.channels
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
        let block = frame.block_size;
        let (from, to) = sample_span(self.state.cursor, to_index.min(block as f32));
        for channel in 0..self.channels {
            let input = frame.inputs[channel];
            let offset = channel * block;
            if offset + block > frame.dac.len() {
                break;
            }
            for i in from..to {
                frame.dac[offset + i] += input[i];
            }
        }
        self.state.cursor = to_index;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SignalRails;

    #[test]
    fn test_adc_splits_channels() {
        let mut node = DspAdc::new(2);
        let mut outputs = vec![vec![0.0f32; 4], vec![0.0f32; 4]];
        let adc: Vec<f32> = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let mut dac = vec![0.0f32; 8];
        let mut rails = SignalRails::new(4);
        let mut frame = DspFrame {
            inputs: &[],
            outputs: &mut outputs,
            adc: &adc,
            dac: &mut dac,
            rails: &mut rails,
            block_start: 0.0,
            sample_rate: 44100.0,
            block_size: 4,
        };
        node.process_to(4.0, &mut frame);
        assert_eq!(outputs[0], vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(outputs[1], vec![5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_dac_accumulates() {
        let mut node = DspDac::new(2);
        let left = vec![1.0f32; 4];
        let right = vec![2.0f32; 4];
        let inputs: Vec<&[f32]> = vec![&left, &right];
        let mut outputs = vec![];
        let mut dac = vec![0.5f32; 8];
        let mut rails = SignalRails::new(4);
        let mut frame = DspFrame {
            inputs: &inputs,
            outputs: &mut outputs,
            adc: &[],
            dac: &mut dac,
            rails: &mut rails,
            block_start: 0.0,
            sample_rate: 44100.0,
            block_size: 4,
        };
        node.process_to(4.0, &mut frame);
        assert_eq!(&dac[0..4], &[1.5, 1.5, 1.5, 1.5]);
        assert_eq!(&dac[4..8], &[2.5, 2.5, 2.5, 2.5]);
    }
}
