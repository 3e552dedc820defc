//! Offline rendering to WAV
//!
//! Drives a patch block by block with silent input for a fixed duration and
//! writes the output rail to a WAV file. Mostly used by tests and for
//! auditioning patches without a host.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use crate::graph::Patch;

#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Duration in seconds.
    pub duration: f32,
    /// Gain applied to the written samples.
    pub master_gain: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            duration: 1.0,
            master_gain: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderStats {
    pub blocks: usize,
    pub frames: usize,
    pub peak: f32,
}

pub struct Renderer {
    config: RenderConfig,
}

impl Renderer {
    pub fn new(config: RenderConfig) -> Self {
        Renderer { config }
    }

    /// Render the patch and write the result. Returns basic statistics about
    /// the produced audio.
    pub fn render_to_file(
        &self,
        patch: &mut Patch,
        output_path: &Path,
    ) -> Result<RenderStats, String> {
        let block_size = patch.config().block_size;
        let channels = patch.config().output_channels;
        let sample_rate = patch.config().sample_rate;
        let spec = WavSpec {
            channels: channels as u16,
            sample_rate: sample_rate as u32,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(output_path, spec).map_err(|e| e.to_string())?;

        let total_frames = (self.config.duration * sample_rate) as usize;
        let blocks = (total_frames + block_size - 1) / block_size;
        let input = vec![0.0f32; patch.config().input_channels * block_size];
        let mut output = vec![0.0f32; channels * block_size];
        let mut peak = 0.0f32;
        let mut frames = 0usize;

        for _ in 0..blocks {
            patch.process(&input, &mut output);
            for i in 0..block_size {
                if frames >= total_frames {
                    break;
                }
                for channel in 0..channels {
                    let sample = output[channel * block_size + i] * self.config.master_gain;
                    peak = peak.max(sample.abs());
                    writer.write_sample(sample).map_err(|e| e.to_string())?;
                }
                frames += 1;
            }
        }
        writer.finalize().map_err(|e| e.to_string())?;

        Ok(RenderStats {
            blocks,
            frames,
            peak,
        })
    }
}
