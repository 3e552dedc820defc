//! The bundled object library
//!
//! One file per object family. Control objects implement
//! [`crate::object::MessageNode`]; signal objects implement
//! [`crate::object::AudioNode`] and keep the shared precedence/cursor state
//! that drives mixed-inlet splicing.

mod arith;
mod bang;
mod bridges;
mod change;
mod compare;
mod dsp_arith;
mod dsp_send_receive;
mod float;
mod io;
mod math;
mod message_box;
mod moses;
mod noise;
mod osc;
mod print;
mod random;
mod send_receive;
mod timing;
mod unpack;

pub use arith::{ArithOp, MessageArith};
pub use bang::{MessageBang, MessageLoadbang};
pub use bridges::{DspInletBridge, DspOutletBridge, MessageInletBridge, MessageOutletBridge};
pub use change::MessageChange;
pub use compare::{CompareOp, MessageCompare};
pub use dsp_arith::{DspAdd, DspMultiply};
pub use dsp_send_receive::{DspCatch, DspReceive, DspSend, DspThrow};
pub use float::{MessageFloat, MessageInt};
pub use io::{DspAdc, DspDac};
pub use math::{MessageAtan2, MessageUnary, UnaryOp};
pub use message_box::MessageBoxNode;
pub use moses::MessageMoses;
pub use noise::DspNoise;
pub use osc::DspOsc;
pub use print::MessagePrint;
pub use random::MessageRandom;
pub use send_receive::{MessageReceive, MessageSend};
pub use timing::{MessageDelay, MessageMetro, MessagePipe};
pub use unpack::MessageUnpack;
