//! Message values exchanged between objects at control rate
//!
//! A message is a timestamp plus an ordered list of typed atoms. Messages
//! sent synchronously live on the sender's stack frame and are passed by
//! reference; messages destined for the scheduler are copied to the heap
//! (`copy_to_heap`) where the `Arc` strong count doubles as the reservation
//! count that makes cancellation safe.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

/// A single typed element of a message.
///
/// `Dollar` only exists between parsing and object construction: `$N` tokens
/// are resolved against the enclosing graph's arguments before the atom ever
/// reaches a running object. `Anything` is the wildcard slot used by template
/// messages such as an `unpack` declaration.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Float(f32),
    Symbol(String),
    Bang,
    List(Vec<Atom>),
    Anything,
    Dollar(usize),
}

impl Atom {
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Atom::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Atom::Symbol(s) => Some(s),
            _ => None,
        }
    }

    /// Human-readable type name, used in error reports.
    pub fn type_name(&self) -> &'static str {
        match self {
            Atom::Float(_) => "float",
            Atom::Symbol(_) => "symbol",
            Atom::Bang => "bang",
            Atom::List(_) => "list",
            Atom::Anything => "anything",
            Atom::Dollar(_) => "dollar",
        }
    }

    /// True when both atoms carry the same type, ignoring the payload.
    pub fn same_type(&self, other: &Atom) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Float(v) => write!(f, "{}", v),
            Atom::Symbol(s) => write!(f, "{}", s),
            Atom::Bang => write!(f, "bang"),
            Atom::List(items) => {
                for (i, a) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", a)?;
                }
                Ok(())
            }
            Atom::Anything => write!(f, "anything"),
            Atom::Dollar(n) => write!(f, "${}", n),
        }
    }
}

/// Resolve `$N` atoms in place against a graph's argument list.
///
/// Element 0 of `args` is always the unique graph id, so `$0` expands to it.
/// An out-of-range reference expands to 0.0 with a warning.
pub fn resolve_dollars(atoms: &mut [Atom], args: &[Atom]) {
    for atom in atoms.iter_mut() {
        if let Atom::Dollar(n) = atom {
            match args.get(*n) {
                Some(value) => *atom = value.clone(),
                None => {
                    warn!(index = *n, "no graph argument for dollar expansion");
                    *atom = Atom::Float(0.0);
                }
            }
        }
    }
}

/// A timestamped sequence of atoms.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// Delivery time in milliseconds on the engine clock.
    pub timestamp: f64,
    atoms: Vec<Atom>,
}

impl Message {
    pub fn new(timestamp: f64, atoms: Vec<Atom>) -> Self {
        Message { timestamp, atoms }
    }

    pub fn bang(timestamp: f64) -> Self {
        Message::new(timestamp, vec![Atom::Bang])
    }

    pub fn float(timestamp: f64, value: f32) -> Self {
        Message::new(timestamp, vec![Atom::Float(value)])
    }

    pub fn symbol(timestamp: f64, value: impl Into<String>) -> Self {
        Message::new(timestamp, vec![Atom::Symbol(value.into())])
    }

    pub fn atoms(&self) -> &[Atom] {
        &self.atoms
    }

    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Atom> {
        self.atoms.get(index)
    }

    pub fn float_at(&self, index: usize) -> Option<f32> {
        self.atoms.get(index).and_then(Atom::as_float)
    }

    pub fn symbol_at(&self, index: usize) -> Option<&str> {
        self.atoms.get(index).and_then(Atom::as_symbol)
    }

    /// A bang, or an empty message, both read as a bang trigger.
    pub fn is_bang(&self) -> bool {
        matches!(self.atoms.first(), Some(Atom::Bang) | None)
    }

    /// Copy a stack-scoped message to the heap for the scheduler.
    ///
    /// The returned `Arc` is the message's reservation handle: the scheduler
    /// clones it once per queued entry and drops its clone on fire or cancel.
    pub fn copy_to_heap(&self) -> Arc<Message> {
        Arc::new(self.clone())
    }

    /// Fractional sample index of this message within the current block.
    pub fn block_index(&self, block_start: f64, sample_rate: f32) -> f32 {
        (((self.timestamp - block_start) / 1000.0) * sample_rate as f64) as f32
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, a) in self.atoms.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{}", a)?;
        }
        Ok(())
    }
}
