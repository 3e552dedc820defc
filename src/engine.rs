//! Block engine and host-facing API
//!
//! The host owns the audio callback; once per block it hands the engine an
//! interleaved input buffer and takes an interleaved output buffer back.
//! Each [`Patch::process`] call performs, in order: input rail fill, signal
//! cursor reset, scheduler drain for the block window, signal pass in planner
//! order, output rail copy, clock advance.

use std::path::PathBuf;
use std::sync::Arc;

use crate::graph::{GraphId, NodeKind, ObjectId, Patch};
use crate::message::Message;
use crate::process_order;

/// Everything the engine needs to know at construction time.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory of the patch file; abstractions are searched here first.
    pub patch_directory: PathBuf,
    /// Patch file name within `patch_directory`.
    pub patch_file: String,
    /// Fallback search directory for abstractions.
    pub library_directory: PathBuf,
    /// Samples per block.
    pub block_size: usize,
    pub input_channels: usize,
    pub output_channels: usize,
    /// Sample rate in Hz.
    pub sample_rate: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            patch_directory: PathBuf::from("."),
            patch_file: String::new(),
            library_directory: PathBuf::from("."),
            block_size: 64,
            input_channels: 2,
            output_channels: 2,
            sample_rate: 44100.0,
        }
    }
}

impl Patch {
    /// Load, build and plan the configured patch file.
    pub fn from_file(config: EngineConfig) -> Result<Patch, String> {
        let path = config.patch_directory.join(&config.patch_file);
        let text = std::fs::read_to_string(&path)
            .map_err(|e| format!("cannot read patch {}: {}", path.display(), e))?;
        Patch::from_source(&text, config)
    }

    /// Build and plan a patch from in-memory source. The patch directory of
    /// `config` still anchors abstraction lookup.
    pub fn from_source(text: &str, config: EngineConfig) -> Result<Patch, String> {
        let records = crate::patch_parser::parse_records(text);
        let mut iter = records.into_iter();
        match iter.next() {
            Some(crate::patch_parser::Record::Canvas) => {}
            _ => return Err("the first line of the patch does not define a canvas".into()),
        }
        let dir = config.patch_directory.clone();
        let mut patch = Patch::new_shell(config);
        patch.build_graph(&mut iter, None, Vec::new(), &dir)?;
        patch.resolve_rails();
        process_order::plan_all(&mut patch);
        patch.debug_dump_order(0);
        patch.fire_loadbangs();
        Ok(patch)
    }

    /// Milliseconds of engine clock covered by one block.
    pub fn block_duration_ms(&self) -> f64 {
        self.block_duration_ms
    }

    /// Engine-clock timestamp at which the next block starts.
    pub fn block_start_timestamp(&self) -> f64 {
        self.block_start
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Drive the graph for one block. Buffers are channel-major interleaved:
    /// all samples of channel 0, then all of channel 1, and so on.
    pub fn process(&mut self, input: &[f32], output: &mut [f32]) {
        debug_assert_eq!(input.len(), self.input_rail.len());
        debug_assert_eq!(output.len(), self.output_rail.len());

        let n_in = input.len().min(self.input_rail.len());
        self.input_rail[..n_in].copy_from_slice(&input[..n_in]);
        self.output_rail.fill(0.0);

        // every mixed object starts the block with its cursor at zero
        for slot in &mut self.slots {
            if let NodeKind::Audio(node) = &mut slot.node {
                node.state_mut().cursor = 0.0;
            }
        }

        // deliver everything due in this block window; entries scheduled
        // during the drain that still fall in the window fire too
        let next_block_start = self.block_start + self.block_duration_ms;
        while let Some(entry) = self.scheduler.pop_due(next_block_start) {
            self.fire(entry);
        }

        self.run_graph_signal(0);

        let n_out = output.len().min(self.output_rail.len());
        output[..n_out].copy_from_slice(&self.output_rail[..n_out]);

        self.block_start = next_block_start;
    }

    /// Execute a graph's signal list in planner order; nested graphs run as
    /// single units at their position in the parent's list.
    fn run_graph_signal(&mut self, graph: GraphId) {
        if !self.graphs[graph].switched {
            return;
        }
        let block_size = self.config.block_size as f32;
        let mut k = 0;
        loop {
            let Some(&id) = self.graphs[graph].dsp_order.get(k) else {
                break;
            };
            let subgraph = match &self.slots[id].node {
                NodeKind::Graph(child) => Some(*child),
                _ => None,
            };
            match subgraph {
                Some(child) => self.run_graph_signal(child),
                None => self.audio_call(id, |node, frame, _ctx| node.process_to(block_size, frame)),
            }
            k += 1;
        }
    }

    // ---- host control interface ----------------------------------------

    /// Queue a message for delivery from `target`'s outlet at the message's
    /// timestamp. The returned handle cancels the entry.
    pub fn schedule_message(
        &mut self,
        target: ObjectId,
        outlet: usize,
        message: Message,
    ) -> Arc<Message> {
        let heap = message.copy_to_heap();
        self.scheduler.insert(target, outlet, heap.clone());
        heap
    }

    /// Remove a still-queued entry; a handle that already fired is a no-op.
    pub fn cancel_message(&mut self, target: ObjectId, outlet: usize, handle: &Arc<Message>) {
        self.scheduler.cancel(target, outlet, handle);
    }

    /// Deliver a message straight to an object's inlet, outside any wiring.
    pub fn send_to_object(&mut self, target: ObjectId, inlet: usize, message: &Message) {
        self.deliver(target, inlet, message);
    }

    /// Install the standard print sink (the `print` object's output).
    pub fn set_print_std(&mut self, sink: impl Fn(&str) + Send + 'static) {
        self.print.set_std(sink);
    }

    /// Install the error print sink (absorbed runtime errors).
    pub fn set_print_err(&mut self, sink: impl Fn(&str) + Send + 'static) {
        self.print.set_err(sink);
    }

    /// Switch a graph's signal processing on or off; a switched-off graph
    /// skips its execution list. Graph 0 is the root.
    pub fn set_switched(&mut self, graph: GraphId, on: bool) {
        if let Some(frame) = self.graphs.get_mut(graph) {
            frame.switched = on;
        }
    }

    /// Number of entries waiting in the scheduler.
    pub fn pending_messages(&self) -> usize {
        self.scheduler.len()
    }
}
