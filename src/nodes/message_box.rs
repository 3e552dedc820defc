//! Message boxes (`#X msg`)
//!
//! Any input flushes the stored content: comma-separated segments leave the
//! outlet as separate messages in order, and each `;`-prefixed segment is
//! dispatched to the named receiver it opens with.

use crate::message::{Atom, Message};
use crate::object::{ControlContext, MessageNode};

pub struct MessageBoxNode {
    local: Vec<Vec<Atom>>,
    remote: Vec<(String, Vec<Atom>)>,
}

/// A lone `bang` token in a box means the bang value, not the symbol.
fn normalize(atoms: Vec<Atom>) -> Vec<Atom> {
    if atoms.len() == 1 && atoms[0].as_symbol() == Some("bang") {
        vec![Atom::Bang]
    } else {
        atoms
    }
}

impl MessageBoxNode {
    pub fn new(content: Vec<Atom>) -> Self {
        let mut local = Vec::new();
        let mut remote = Vec::new();

        let mut segments: Vec<Vec<Atom>> = vec![Vec::new()];
        for atom in content {
            if atom.as_symbol() == Some(";") {
                segments.push(Vec::new());
            } else if let Some(segment) = segments.last_mut() {
                segment.push(atom);
            }
        }

        let mut segments = segments.into_iter();
        if let Some(first) = segments.next() {
            let mut current = Vec::new();
            for atom in first {
                if atom.as_symbol() == Some(",") {
                    if !current.is_empty() {
                        local.push(normalize(std::mem::take(&mut current)));
                    }
                } else {
                    current.push(atom);
                }
            }
            if !current.is_empty() {
                local.push(normalize(current));
            }
        }
        for segment in segments {
            let mut atoms = segment.into_iter();
            match atoms.next() {
                Some(Atom::Symbol(name)) => {
                    remote.push((name, normalize(atoms.collect())));
                }
                _ => {}
            }
        }

        MessageBoxNode { local, remote }
    }
}

impl MessageNode for MessageBoxNode {
    fn label(&self) -> &str {
        "msg"
    }

    fn inlet_count(&self) -> usize {
        1
    }

    fn outlet_count(&self) -> usize {
        1
    }

    fn process_message(&mut self, inlet: usize, message: &Message, ctx: &mut ControlContext<'_>) {
        if inlet != 0 {
            return;
        }
        for atoms in &self.local {
            ctx.send(0, Message::new(message.timestamp, atoms.clone()));
        }
        for (name, atoms) in &self.remote {
            ctx.dispatch_to_named(name.clone(), Message::new(message.timestamp, atoms.clone()));
        }
    }
}
