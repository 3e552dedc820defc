//! `random` — uniform integers in `[0, limit)`

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::message::{Atom, Message};
use crate::object::{ControlContext, MessageNode};

pub struct MessageRandom {
    limit: f32,
    rng: SmallRng,
}

impl MessageRandom {
    pub fn new(init: &[Atom]) -> Self {
        MessageRandom {
            limit: init.first().and_then(Atom::as_float).unwrap_or(1.0),
            rng: SmallRng::seed_from_u64(0x6d61676e6f6e),
        }
    }
}

impl MessageNode for MessageRandom {
    fn label(&self) -> &str {
        "random"
    }

    fn inlet_count(&self) -> usize {
        2
    }

    fn outlet_count(&self) -> usize {
        1
    }

    fn process_message(&mut self, inlet: usize, message: &Message, ctx: &mut ControlContext<'_>) {
        match inlet {
            0 => {
                if message.is_bang() {
                    let limit = (self.limit.max(1.0)) as i64;
                    let value = self.rng.gen_range(0..limit) as f32;
                    ctx.send(0, Message::float(message.timestamp, value));
                } else if message.symbol_at(0) == Some("seed") {
                    let seed = message.float_at(1).unwrap_or(0.0) as u64;
                    self.rng = SmallRng::seed_from_u64(seed);
                }
            }
            1 => {
                if let Some(value) = message.float_at(0) {
                    self.limit = value;
                }
            }
            _ => {}
        }
    }
}
