//! Named-channel registries
//!
//! Non-local wiring by symbolic name, resolved through the root graph. The
//! message side maps a name to one sender and any number of receivers and
//! installs implicit connections as objects register. The signal side keeps a
//! block-sized rail per name: `send~` overwrites its rail each block and any
//! `receive~` copies it, while `throw~` accumulates into its rail and the
//! matching `catch~` drains it.

use std::collections::HashMap;

use tracing::warn;

use crate::graph::ObjectId;

/// Message-rate rendezvous table, plus the producer table that keeps
/// `send~` names unique.
#[derive(Default)]
pub(crate) struct NameRegistry {
    sends: HashMap<String, ObjectId>,
    receives: HashMap<String, Vec<ObjectId>>,
    dsp_sends: HashMap<String, ObjectId>,
}

impl NameRegistry {
    /// Register a sender. Returns false (and logs) when the name is taken;
    /// the duplicate object stays in the graph but is never wired.
    pub fn register_send(&mut self, name: &str, id: ObjectId) -> bool {
        if self.sends.contains_key(name) {
            return false;
        }
        self.sends.insert(name.to_string(), id);
        true
    }

    /// Register a receiver. Duplicates are allowed: dispatch fans out in
    /// registration order.
    pub fn register_receive(&mut self, name: &str, id: ObjectId) {
        self.receives.entry(name.to_string()).or_default().push(id);
    }

    pub fn send_for(&self, name: &str) -> Option<ObjectId> {
        self.sends.get(name).copied()
    }

    pub fn receivers_for(&self, name: &str) -> &[ObjectId] {
        self.receives.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indexed access that stays valid while a dispatch is in progress, so
    /// the dispatch loop can re-check length instead of holding an iterator.
    pub fn receiver_at(&self, name: &str, index: usize) -> Option<ObjectId> {
        self.receives.get(name).and_then(|v| v.get(index)).copied()
    }

    /// Register a signal producer. One `send~` per name; duplicates are
    /// rejected like their message-rate counterparts.
    pub fn register_dsp_send(&mut self, name: &str, id: ObjectId) -> bool {
        if self.dsp_sends.contains_key(name) {
            return false;
        }
        self.dsp_sends.insert(name.to_string(), id);
        true
    }
}

/// Block-sized rails for the signal rendezvous objects.
pub struct SignalRails {
    block_size: usize,
    sends: HashMap<String, Vec<f32>>,
    throws: HashMap<String, Vec<f32>>,
}

impl SignalRails {
    pub(crate) fn new(block_size: usize) -> Self {
        SignalRails {
            block_size,
            sends: HashMap::new(),
            throws: HashMap::new(),
        }
    }

    pub(crate) fn ensure_send(&mut self, name: &str) {
        self.sends
            .entry(name.to_string())
            .or_insert_with(|| vec![0.0; self.block_size]);
    }

    pub(crate) fn ensure_throw(&mut self, name: &str) {
        self.throws
            .entry(name.to_string())
            .or_insert_with(|| vec![0.0; self.block_size]);
    }

    /// The rail written by `send~ name`, read by every `receive~ name`.
    pub fn send_rail(&self, name: &str) -> Option<&[f32]> {
        self.sends.get(name).map(Vec::as_slice)
    }

    pub fn send_rail_mut(&mut self, name: &str) -> Option<&mut [f32]> {
        self.sends.get_mut(name).map(Vec::as_mut_slice)
    }

    /// The accumulation rail shared by every `throw~ name`.
    pub fn throw_rail_mut(&mut self, name: &str) -> Option<&mut [f32]> {
        self.throws.get_mut(name).map(Vec::as_mut_slice)
    }

    /// Copy the accumulated throw rail into `out` and clear it for the next
    /// block. Missing rails read as silence.
    pub fn drain_throw(&mut self, name: &str, out: &mut [f32]) {
        match self.throws.get_mut(name) {
            Some(rail) => {
                let n = out.len().min(rail.len());
                out[..n].copy_from_slice(&rail[..n]);
                rail[..n].fill(0.0);
            }
            None => {
                warn!(name, "catch~ has no matching throw~ rail");
                out.fill(0.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_send_rejected() {
        let mut reg = NameRegistry::default();
        assert!(reg.register_send("foo", 1));
        assert!(!reg.register_send("foo", 2));
        assert_eq!(reg.send_for("foo"), Some(1));
    }

    #[test]
    fn test_receivers_keep_registration_order() {
        let mut reg = NameRegistry::default();
        reg.register_receive("foo", 5);
        reg.register_receive("foo", 2);
        reg.register_receive("foo", 9);
        assert_eq!(reg.receivers_for("foo"), &[5, 2, 9]);
        assert_eq!(reg.receiver_at("foo", 1), Some(2));
        assert_eq!(reg.receiver_at("foo", 3), None);
    }

    #[test]
    fn test_throw_rail_accumulates_and_drains() {
        let mut rails = SignalRails::new(4);
        rails.ensure_throw("bus");
        {
            let rail = rails.throw_rail_mut("bus").unwrap();
            for (i, s) in rail.iter_mut().enumerate() {
                *s += i as f32;
            }
            for s in rail.iter_mut() {
                *s += 1.0;
            }
        }
        let mut out = vec![0.0; 4];
        rails.drain_throw("bus", &mut out);
        assert_eq!(out, vec![1.0, 2.0, 3.0, 4.0]);

        rails.drain_throw("bus", &mut out);
        assert_eq!(out, vec![0.0; 4]);
    }
}
