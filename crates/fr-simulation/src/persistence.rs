//! Companion identity, position and style carried across sessions.
//!
//! Stored as JSON under [`SAVE_KEY`]: a list of structure records, each with
//! its companions. Saves written before companions had identities are still
//! read; their companions come back unassigned and are replaced on the next
//! reconciliation.

use fr_core::host::{LightSink, SaveStore, StructureSource};
use fr_core::{CompanionId, Tile};
use glam::Vec2;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use crate::config::STYLE_COUNT;
use crate::error::{SimError, SimResult};
use crate::registry::Registry;
use crate::steering::{Companion, SteeringParams};

/// Save-file key holding the companion blob.
pub const SAVE_KEY: &str = "mod.fcr.fairies";

/// One saved companion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SavedCompanion {
    /// Identity; [`CompanionId::UNASSIGNED`] for legacy saves.
    pub id: CompanionId,
    /// Position in tiles.
    pub position: Vec2,
    /// Visual style.
    pub style: u8,
}

/// One saved structure and its companions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedStructure {
    /// Structure tile.
    pub structure: Tile,
    /// Companions in spawn order.
    pub companions: Vec<SavedCompanion>,
}

#[derive(Deserialize)]
struct LegacyCompanion {
    position: Vec2,
    style: u8,
}

#[derive(Deserialize)]
struct LegacyStructure {
    structure: Tile,
    companions: Vec<LegacyCompanion>,
}

/// Decoded save contents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoredState {
    /// Structure records in saved order.
    pub structures: Vec<SavedStructure>,
    /// Whether the blob used the pre-identity layout.
    pub legacy: bool,
}

impl RestoredState {
    /// Companions across all records.
    pub fn companion_count(&self) -> usize {
        self.structures.iter().map(|s| s.companions.len()).sum()
    }
}

/// Result of applying a restore to a registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    /// Structures that got companions back.
    pub structures: usize,
    /// Companions rebuilt.
    pub companions: usize,
    /// Records skipped because their structure is gone.
    pub dropped: usize,
    /// Whether the save predates identities.
    pub legacy: bool,
}

/// Snapshot the registry as save records.
pub fn snapshot(registry: &Registry) -> Vec<SavedStructure> {
    registry
        .groups()
        .map(|group| SavedStructure {
            structure: group.tile(),
            companions: group
                .companions()
                .iter()
                .map(|c| SavedCompanion {
                    id: c.id(),
                    position: c.position(),
                    style: c.style(),
                })
                .collect(),
        })
        .collect()
}

/// Encode the registry as a save blob.
pub fn serialize(registry: &Registry) -> SimResult<String> {
    serde_json::to_string(&snapshot(registry)).map_err(|source| SimError::Persistence {
        schema: "current",
        source,
    })
}

/// Decode a blob in the current layout.
pub fn parse_current(blob: &str) -> SimResult<Vec<SavedStructure>> {
    serde_json::from_str(blob).map_err(|source| SimError::Persistence {
        schema: "current",
        source,
    })
}

/// Decode a blob in the pre-identity layout.
pub fn parse_legacy(blob: &str) -> SimResult<Vec<SavedStructure>> {
    let legacy: Vec<LegacyStructure> =
        serde_json::from_str(blob).map_err(|source| SimError::Persistence {
            schema: "legacy",
            source,
        })?;
    Ok(legacy
        .into_iter()
        .map(|s| SavedStructure {
            structure: s.structure,
            companions: s
                .companions
                .into_iter()
                .map(|c| SavedCompanion {
                    id: CompanionId::UNASSIGNED,
                    position: c.position,
                    style: c.style,
                })
                .collect(),
        })
        .collect())
}

/// Decode a blob, trying the current layout first and then the legacy one.
/// If neither fits, the failure is logged and the state is empty.
pub fn deserialize(blob: &str) -> RestoredState {
    match parse_current(blob) {
        Ok(structures) => RestoredState {
            structures,
            legacy: false,
        },
        Err(current) => match parse_legacy(blob) {
            Ok(structures) => RestoredState {
                structures,
                legacy: true,
            },
            Err(legacy) => {
                tracing::warn!(%current, %legacy, "discarding unreadable companion state");
                RestoredState::default()
            }
        },
    }
}

/// Write the registry into the save under [`SAVE_KEY`].
pub fn save(registry: &Registry, store: &mut dyn SaveStore) -> SimResult<()> {
    let blob = serialize(registry)?;
    store.set(SAVE_KEY, blob);
    tracing::trace!(structures = registry.len(), "saved companion state");
    Ok(())
}

/// Rebuild the registry from the save.
///
/// Does nothing and returns `None` when the save holds no companion state.
/// Otherwise the registry is cleared, and each record whose structure still
/// exists is rebuilt with home at the structure tile and position as saved.
/// Lights are recreated.
pub fn restore(
    registry: &mut Registry,
    store: &dyn SaveStore,
    source: &dyn StructureSource,
    params: &SteeringParams,
    rng: &mut StdRng,
    lights: &mut dyn LightSink,
) -> Option<RestoreSummary> {
    let blob = store.get(SAVE_KEY).filter(|b| !b.trim().is_empty())?;
    let state = deserialize(&blob);
    let existing = source.structure_tiles();

    registry.clear_all(lights);
    let mut summary = RestoreSummary {
        legacy: state.legacy,
        ..RestoreSummary::default()
    };
    for record in state.structures {
        if !existing.contains(&record.structure) {
            summary.dropped += 1;
            continue;
        }
        let companions: Vec<Companion> = record
            .companions
            .iter()
            .map(|saved| {
                let mut companion = Companion::new(
                    saved.id,
                    record.structure,
                    saved.position,
                    saved.style.clamp(1, STYLE_COUNT),
                    params,
                    rng,
                );
                companion.attach_light(lights, rng);
                companion
            })
            .collect();
        if companions.is_empty() {
            continue;
        }
        summary.structures += 1;
        summary.companions += companions.len();
        registry.insert_group(record.structure, companions, lights);
    }
    tracing::info!(
        structures = summary.structures,
        companions = summary.companions,
        dropped = summary.dropped,
        legacy = summary.legacy,
        "restored companion state"
    );
    Some(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoamerConfig;
    use crate::registry::Spawner;
    use crate::style::StylePicker;
    use fr_core::Chest;
    use fr_core::memory::{MemoryFarm, MemorySaveStore, RecordingLights};
    use rand::SeedableRng;

    fn populated() -> (Registry, MemoryFarm, StdRng, RecordingLights) {
        let config = RoamerConfig::default();
        let mut farm = MemoryFarm::new();
        farm.add_hut(Tile::new(3, 4), Chest::with_fairy_boxes(2))
            .add_hut(Tile::new(20, 4), Chest::with_fairy_boxes(1));
        let mut rng = StdRng::seed_from_u64(8);
        let mut lights = RecordingLights::new();
        let mut styles = StylePicker::new(config.fairy_style);
        let mut registry = Registry::new();
        let mut spawner = Spawner {
            styles: &mut styles,
            rng: &mut rng,
            lights: &mut lights,
        };
        registry.rescan(&mut farm, &config, &mut spawner);
        for _ in 0..90 {
            registry.tick(1.0 / 60.0, &config.steering, &mut rng, &mut lights);
        }
        (registry, farm, rng, lights)
    }

    #[test]
    fn round_trip_preserves_tuples() {
        let (registry, ..) = populated();
        let blob = serialize(&registry).unwrap();
        let state = deserialize(&blob);
        assert!(!state.legacy);
        assert_eq!(state.structures, snapshot(&registry));
        assert_eq!(state.companion_count(), 3);
    }

    #[test]
    fn legacy_layout_gets_unassigned_ids() {
        let blob = r#"[{"structure":{"x":1,"y":2},"companions":[{"position":[1.5,2.0],"style":3}]}]"#;
        let state = deserialize(blob);
        assert!(state.legacy);
        let c = state.structures[0].companions[0];
        assert_eq!(c.id, CompanionId::UNASSIGNED);
        assert_eq!(c.position, Vec2::new(1.5, 2.0));
        assert_eq!(c.style, 3);
    }

    #[test]
    fn garbage_yields_empty_state() {
        assert_eq!(deserialize("not json"), RestoredState::default());
        assert_eq!(deserialize(r#"{"x": 1}"#), RestoredState::default());
    }

    #[test]
    fn save_then_restore_rebuilds_companions() {
        let (registry, farm, mut rng, _) = populated();
        let mut store = MemorySaveStore::new();
        save(&registry, &mut store).unwrap();
        assert!(store.get(SAVE_KEY).is_some());

        let mut restored = Registry::new();
        let mut lights = RecordingLights::new();
        let summary = restore(
            &mut restored,
            &store,
            &farm,
            &SteeringParams::default(),
            &mut rng,
            &mut lights,
        )
        .unwrap();
        assert_eq!(summary.companions, 3);
        assert_eq!(summary.structures, 2);
        assert_eq!(lights.len(), 3);
        assert_eq!(snapshot(&restored), snapshot(&registry));
        for group in restored.groups() {
            for c in group.companions() {
                assert_eq!(c.home(), group.tile());
            }
        }
    }

    #[test]
    fn restore_drops_missing_structures() {
        let (registry, mut farm, mut rng, _) = populated();
        let mut store = MemorySaveStore::new();
        save(&registry, &mut store).unwrap();
        farm.remove_hut(Tile::new(20, 4));

        let mut restored = Registry::new();
        let mut lights = RecordingLights::new();
        let summary = restore(
            &mut restored,
            &store,
            &farm,
            &SteeringParams::default(),
            &mut rng,
            &mut lights,
        )
        .unwrap();
        assert_eq!(summary.dropped, 1);
        assert_eq!(restored.companion_count(), 2);
    }

    #[test]
    fn restore_without_blob_is_untouched() {
        let (mut registry, farm, mut rng, mut lights) = populated();
        let store = MemorySaveStore::new();
        let summary = restore(
            &mut registry,
            &store,
            &farm,
            &SteeringParams::default(),
            &mut rng,
            &mut lights,
        );
        assert!(summary.is_none());
        assert_eq!(registry.companion_count(), 3);
    }
}
