pub mod chance;
pub mod config;
pub mod season;
pub mod simulate;

use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use fr_core::host::{ResourceContainer, SaveStore, StructureSource};
use fr_core::memory::{MemoryFarm, MemorySaveStore};
use fr_core::{Chest, Tile};
use fr_simulation::RoamerConfig;

/// A hut given on the command line as `X,Y,BOXES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HutSpec {
    pub tile: Tile,
    pub boxes: usize,
}

impl FromStr for HutSpec {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tile, boxes) = s
            .rsplit_once(',')
            .ok_or_else(|| format!("expected X,Y,BOXES, got '{s}'"))?;
        let tile: Tile = tile.parse().map_err(|e| format!("{e}"))?;
        let boxes = boxes
            .trim()
            .parse()
            .map_err(|_| format!("invalid box count in '{s}'"))?;
        Ok(Self { tile, boxes })
    }
}

/// Build a farm with one loaded hut per spec. A later spec for the same tile
/// replaces the earlier one.
fn build_farm(huts: &[HutSpec]) -> MemoryFarm {
    let mut farm = MemoryFarm::new();
    for hut in huts {
        farm.add_hut(hut.tile, Chest::with_fairy_boxes(hut.boxes));
    }
    farm
}

/// Save key holding hut chests, so unit identities survive between runs.
const CHESTS_KEY: &str = "fr.cli.chests";

/// Write every hut's chest into the save.
fn store_chests(farm: &MemoryFarm, store: &mut MemorySaveStore) -> Result<(), String> {
    let chests: Vec<(Tile, &Chest)> = farm
        .structure_tiles()
        .into_iter()
        .filter_map(|tile| farm.chest(tile).map(|chest| (tile, chest)))
        .collect();
    let json = serde_json::to_string(&chests).map_err(|e| format!("cannot encode chests: {e}"))?;
    store.set(CHESTS_KEY, json);
    Ok(())
}

/// Copy saved unit identities onto the farm's chests, unit by unit. Huts and
/// box counts come from the command line; only identities are carried over.
fn load_identities(farm: &mut MemoryFarm, store: &MemorySaveStore) {
    let Some(json) = store.get(CHESTS_KEY) else {
        return;
    };
    let saved: Vec<(Tile, Chest)> = match serde_json::from_str(&json) {
        Ok(saved) => saved,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring unreadable chests in save");
            return;
        }
    };
    for (tile, old) in saved {
        let Some(chest) = farm.chest_mut(tile) else {
            continue;
        };
        for (unit, previous) in chest.units_mut().iter_mut().zip(old.units()) {
            if unit.item_id == previous.item_id {
                unit.identity = previous.identity;
            }
        }
    }
}

/// Read the config file, or use the defaults when none is given.
fn load_config(path: Option<&Path>) -> Result<RoamerConfig, String> {
    let Some(path) = path else {
        return Ok(RoamerConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    RoamerConfig::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))
}

/// Load a save file as key-value pairs. A missing file is an empty save.
fn load_store(path: &Path) -> Result<MemorySaveStore, String> {
    if !path.exists() {
        return Ok(MemorySaveStore::new());
    }
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let entries: BTreeMap<String, String> = serde_json::from_str(&json)
        .map_err(|e| format!("{} is not a save file: {e}", path.display()))?;
    Ok(entries.into_iter().collect())
}

fn write_store(path: &Path, store: &MemorySaveStore) -> Result<(), String> {
    let entries: BTreeMap<_, _> = store.entries().iter().collect();
    let json = serde_json::to_string_pretty(&entries)
        .map_err(|e| format!("cannot encode save: {e}"))?;
    std::fs::write(path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))
}
