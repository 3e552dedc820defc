//! # Magnon - a native runtime for the Pure Data patch model
//!
//! Magnon loads a declarative `.pd` patch describing an audio-signal and
//! control-event processing graph, then drives that graph block by block:
//! audio input plus scheduled events in, audio output out. It couples three
//! computational models under one real-time deadline — a dataflow signal
//! graph, a time-ordered message scheduler, and a symbol table for non-local
//! send/receive wiring — with sample-accurate semantics at the seams.
//!
//! ## Quick start
//!
//! ```rust
//! use magnon::{EngineConfig, Patch};
//!
//! let source = r#"
//! #N canvas 0 0 450 300 10;
//! #X obj 40 40 osc~ 440;
//! #X obj 40 70 *~ 0.5;
//! #X obj 40 100 dac~;
//! #X connect 0 0 1 0;
//! #X connect 1 0 2 0;
//! #X connect 1 0 2 1;
//! "#;
//!
//! let config = EngineConfig {
//!     block_size: 64,
//!     sample_rate: 44100.0,
//!     ..EngineConfig::default()
//! };
//! let mut patch = Patch::from_source(source, config).unwrap();
//!
//! let input = vec![0.0; 2 * 64];
//! let mut output = vec![0.0; 2 * 64];
//! patch.process(&input, &mut output); // one block of attenuated sine
//! ```
//!
//! ## Execution model
//!
//! Each [`Patch::process`] call runs one block:
//!
//! 1. the host input buffer is copied to the root input rail and the output
//!    rail is cleared,
//! 2. every scheduler entry due in the block window fires in
//!    `(timestamp, insertion)` order; messages landing on mixed signal
//!    inlets splice the block at the message's sample index,
//! 3. the planner-ordered signal list runs, each object finishing its
//!    remaining samples,
//! 4. the output rail is copied back to the host and the clock advances by
//!    one block duration.
//!
//! Messages between objects are delivered synchronously and depth-first;
//! `send`/`receive` pairs rendezvous by name through the root registry, and
//! their signal-rate cousins share block rails the same way.
//!
//! ## Main modules
//!
//! - [`engine`] - block engine, configuration, host control API
//! - [`graph`] - object arena, graph nesting, wiring, delivery
//! - [`message`] - typed atoms and timestamped messages
//! - [`object`] - the two node capability tiers and their contexts
//! - [`nodes`] - the bundled object library
//! - [`patch_parser`] - the `.pd` record parser
//! - [`render`] - offline rendering to WAV

pub mod engine;
mod factory;
pub mod graph;
pub mod message;
pub mod nodes;
pub mod object;
pub mod patch_parser;
mod process_order;
pub mod registry;
pub mod render;
mod scheduler;

pub use engine::EngineConfig;
pub use graph::{GraphId, ObjectId, Patch};
pub use message::{Atom, Message};
pub use object::{ConnectionType, SignalPrecedence};
pub use render::{RenderConfig, Renderer, RenderStats};
