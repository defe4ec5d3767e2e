//! Chooses the visual style of each newly spawned companion.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::{FairyStyle, STYLE_COUNT};

/// Stateful style source for one session.
///
/// `Sequential` and `Shuffled` keep their position across spawns, so a farm
/// of eight companions shows every style exactly once under either mode.
#[derive(Debug, Clone)]
pub struct StylePicker {
    mode: FairyStyle,
    next_sequential: u8,
    bag: Vec<u8>,
}

impl StylePicker {
    /// A picker for the given mode.
    pub fn new(mode: FairyStyle) -> Self {
        Self {
            mode,
            next_sequential: 1,
            bag: Vec::new(),
        }
    }

    /// The active mode.
    pub fn mode(&self) -> FairyStyle {
        self.mode
    }

    /// Switch modes, discarding any sequence or bag state.
    pub fn set_mode(&mut self, mode: FairyStyle) {
        if mode != self.mode {
            *self = Self::new(mode);
        }
    }

    /// Style for the next companion, always in 1-8.
    pub fn next_style(&mut self, rng: &mut impl Rng) -> u8 {
        match self.mode {
            FairyStyle::Fixed(n) => n.clamp(1, STYLE_COUNT),
            FairyStyle::Random => rng.random_range(1..=STYLE_COUNT),
            FairyStyle::Sequential => {
                let style = self.next_sequential;
                self.next_sequential = style % STYLE_COUNT + 1;
                style
            }
            FairyStyle::Shuffled => {
                if self.bag.is_empty() {
                    self.bag = (1..=STYLE_COUNT).collect();
                    self.bag.shuffle(rng);
                }
                self.bag.pop().unwrap_or(1)
            }
        }
    }
}
