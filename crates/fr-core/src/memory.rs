//! In-memory host implementations for tests and headless runs.

use std::collections::HashMap;

use glam::Vec2;

use crate::host::{
    DrawIntent, LightSink, RenderSink, ResourceContainer, Rgba, SaveStore, StructureSource,
};
use crate::identity::LightId;
use crate::resource::Chest;
use crate::tile::Tile;

/// A structure in a [`MemoryFarm`]: its tile and, once loaded, its chest.
#[derive(Debug, Clone)]
struct Hut {
    tile: Tile,
    chest: Option<Chest>,
}

/// A farm of huts kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemoryFarm {
    huts: Vec<Hut>,
}

impl MemoryFarm {
    /// An empty farm.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a hut at `tile` whose chest is loaded, replacing any hut there.
    pub fn add_hut(&mut self, tile: Tile, chest: Chest) -> &mut Self {
        self.remove_hut(tile);
        self.huts.push(Hut {
            tile,
            chest: Some(chest),
        });
        self
    }

    /// Add a hut whose chest has not been loaded yet.
    pub fn add_unloaded_hut(&mut self, tile: Tile) -> &mut Self {
        self.remove_hut(tile);
        self.huts.push(Hut { tile, chest: None });
        self
    }

    /// Finish loading the chest of the hut at `tile`.
    pub fn load_chest(&mut self, tile: Tile, chest: Chest) {
        if let Some(hut) = self.huts.iter_mut().find(|h| h.tile == tile) {
            hut.chest = Some(chest);
        }
    }

    /// Demolish the hut at `tile`, returning its chest.
    pub fn remove_hut(&mut self, tile: Tile) -> Option<Chest> {
        let index = self.huts.iter().position(|h| h.tile == tile)?;
        self.huts.remove(index).chest
    }

    /// The loaded chest of the hut at `tile`.
    pub fn chest(&self, tile: Tile) -> Option<&Chest> {
        self.huts
            .iter()
            .find(|h| h.tile == tile)
            .and_then(|h| h.chest.as_ref())
    }

    /// Mutable access to the loaded chest of the hut at `tile`.
    pub fn chest_mut(&mut self, tile: Tile) -> Option<&mut Chest> {
        self.huts
            .iter_mut()
            .find(|h| h.tile == tile)
            .and_then(|h| h.chest.as_mut())
    }

    /// Number of huts, loaded or not.
    pub fn len(&self) -> usize {
        self.huts.len()
    }

    /// Whether the farm has no huts.
    pub fn is_empty(&self) -> bool {
        self.huts.is_empty()
    }
}

impl StructureSource for MemoryFarm {
    fn structure_tiles(&self) -> Vec<Tile> {
        self.huts.iter().map(|h| h.tile).collect()
    }

    fn container(&self, tile: Tile) -> Option<&dyn ResourceContainer> {
        let chest = self.chest(tile)?;
        Some(chest)
    }

    fn container_mut(&mut self, tile: Tile) -> Option<&mut dyn ResourceContainer> {
        let chest = self.chest_mut(tile)?;
        Some(chest)
    }
}

/// A [`SaveStore`] backed by a hash map.
#[derive(Debug, Clone, Default)]
pub struct MemorySaveStore {
    entries: HashMap<String, String>,
}

impl MemorySaveStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored entries.
    pub fn entries(&self) -> &HashMap<String, String> {
        &self.entries
    }
}

impl SaveStore for MemorySaveStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, blob: String) {
        self.entries.insert(key.to_string(), blob);
    }
}

impl FromIterator<(String, String)> for MemorySaveStore {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// A [`RenderSink`] that keeps every intent it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    /// Intents in the order they were drawn.
    pub intents: Vec<DrawIntent>,
}

impl RenderSink for RecordingRenderer {
    fn draw(&mut self, intent: DrawIntent) {
        self.intents.push(intent);
    }
}

/// Last known state of a light in [`RecordingLights`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightState {
    /// World position in pixels.
    pub position: Vec2,
    /// Radius in host light units.
    pub radius: f32,
    /// Colour.
    pub color: Rgba,
}

/// A [`LightSink`] that tracks live lights.
#[derive(Debug, Clone, Default)]
pub struct RecordingLights {
    lights: HashMap<LightId, LightState>,
}

impl RecordingLights {
    /// No lights.
    pub fn new() -> Self {
        Self::default()
    }

    /// State of the light `id`, if it exists.
    pub fn get(&self, id: &LightId) -> Option<&LightState> {
        self.lights.get(id)
    }

    /// Number of live lights.
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Whether no lights are live.
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }
}

impl LightSink for RecordingLights {
    fn upsert(&mut self, id: &LightId, position: Vec2, radius: f32, color: Rgba) {
        self.lights.insert(
            id.clone(),
            LightState {
                position,
                radius,
                color,
            },
        );
    }

    fn remove(&mut self, id: &LightId) {
        self.lights.remove(id);
    }
}
