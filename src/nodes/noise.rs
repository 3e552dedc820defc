//! `noise~` — uniform white noise in [-1, 1)

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::object::{AudioNode, DspFrame, sample_span, SignalState};

pub struct DspNoise {
    rng: SmallRng,
    state: SignalState,
}

impl DspNoise {
    pub fn new() -> Self {
        DspNoise {
            rng: SmallRng::seed_from_u64(0x6e6f697365),
            state: SignalState::default(),
        }
    }
}

impl Default for DspNoise {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioNode for DspNoise {
    fn label(&self) -> &str {
        "noise~"
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
        for sample in &mut output[from..to] {
            *sample = self.rng.gen_range(-1.0..1.0);
        }
        self.state.cursor = to_index;
    }
}
