//! Interfaces the host game implements for the simulation.
//!
//! The simulation never reaches into host state directly: structures,
//! containers, randomness, rendering, lights and the save file all come in
//! through these traits. Every method is synchronous and must return within
//! the calling tick.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::identity::LightId;
use crate::resource::ResourceUnit;
use crate::tile::Tile;

/// An ordered container of resource units owned by a structure.
pub trait ResourceContainer {
    /// Units in the host's enumeration order.
    fn units(&self) -> &[ResourceUnit];

    /// Mutable units, so the simulation can stamp identities onto them.
    fn units_mut(&mut self) -> &mut [ResourceUnit];

    /// Count units matching `predicate`.
    fn count(&self, predicate: &dyn Fn(&ResourceUnit) -> bool) -> usize {
        self.units().iter().filter(|u| predicate(u)).count()
    }
}

/// The set of companion-owning structures in the world.
pub trait StructureSource {
    /// Tiles of all structures, in the host's enumeration order.
    fn structure_tiles(&self) -> Vec<Tile>;

    /// The container of the structure at `tile`. `None` while the container
    /// is not loaded yet; callers retry on the next signal.
    fn container(&self, tile: Tile) -> Option<&dyn ResourceContainer>;

    /// Mutable access to the container of the structure at `tile`.
    fn container_mut(&mut self, tile: Tile) -> Option<&mut dyn ResourceContainer>;
}

/// A per-day deterministic random stream shared with the host.
pub trait DailyRandom {
    /// Next uniform value in `[0, 1)`.
    fn next_uniform(&mut self) -> f64;

    /// Discard `n` values.
    fn skip(&mut self, n: usize) {
        for _ in 0..n {
            self.next_uniform();
        }
    }
}

/// [`DailyRandom`] seeded from the save's seed and the number of days played,
/// so every roll on a given day of a given save is reproducible.
#[derive(Debug, Clone)]
pub struct SeededDailyRandom {
    rng: StdRng,
}

impl SeededDailyRandom {
    /// Stream for `days_played` of the save identified by `save_seed`.
    pub fn for_day(save_seed: u64, days_played: u32) -> Self {
        let seed = save_seed
            .wrapping_mul(0x9E37_79B9_7F4A_7C15)
            .wrapping_add(u64::from(days_played));
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl DailyRandom for SeededDailyRandom {
    fn next_uniform(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Source rectangle on the companion sprite sheet, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteRect {
    /// Left edge.
    pub x: u32,
    /// Top edge.
    pub y: u32,
    /// Width.
    pub width: u32,
    /// Height.
    pub height: u32,
}

/// Which texture a draw intent refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DrawLayer {
    /// The host's generic ground shadow.
    Shadow,
    /// The companion sprite sheet.
    Companion,
}

/// A request to draw one sprite; the host owns textures and the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawIntent {
    /// Texture to draw from.
    pub layer: DrawLayer,
    /// World position in pixels; the sprite is centred on it.
    pub position: Vec2,
    /// Source rectangle; `None` means the whole texture.
    pub source: Option<SpriteRect>,
    /// Uniform scale factor.
    pub scale: f32,
    /// Mirror horizontally.
    pub flip_horizontal: bool,
    /// Layer depth; larger draws on top.
    pub depth: f32,
}

/// Receives draw intents each frame.
pub trait RenderSink {
    /// Queue one draw.
    fn draw(&mut self, intent: DrawIntent);
}

/// An RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    /// Red.
    pub r: u8,
    /// Green.
    pub g: u8,
    /// Blue.
    pub b: u8,
    /// Alpha.
    pub a: u8,
}

impl Rgba {
    /// Build a colour from components.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// The host's shared light list.
pub trait LightSink {
    /// Create the light `id` or move it if it exists.
    fn upsert(&mut self, id: &LightId, position: Vec2, radius: f32, color: Rgba);

    /// Remove the light `id`; unknown ids are ignored.
    fn remove(&mut self, id: &LightId);
}

/// String key-value storage inside the host's save file.
pub trait SaveStore {
    /// The blob stored under `key`.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `blob` under `key`, replacing any previous value.
    fn set(&mut self, key: &str, blob: String);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_random_is_reproducible() {
        let mut a = SeededDailyRandom::for_day(77, 12);
        let mut b = SeededDailyRandom::for_day(77, 12);
        a.skip(10);
        b.skip(10);
        assert_eq!(a.next_uniform(), b.next_uniform());
    }

    #[test]
    fn daily_random_differs_between_days() {
        let mut a = SeededDailyRandom::for_day(77, 12);
        let mut b = SeededDailyRandom::for_day(77, 13);
        let xs: Vec<f64> = (0..4).map(|_| a.next_uniform()).collect();
        let ys: Vec<f64> = (0..4).map(|_| b.next_uniform()).collect();
        assert_ne!(xs, ys);
    }

    #[test]
    fn uniform_range() {
        let mut r = SeededDailyRandom::for_day(1, 1);
        for _ in 0..1000 {
            let v = r.next_uniform();
            assert!((0.0..1.0).contains(&v));
        }
    }
}
