//! Companions grouped by their owning structure, reconciled against the
//! resource units in each structure's container.

use std::collections::BTreeMap;

use fr_core::host::{LightSink, ResourceContainer, StructureSource};
use fr_core::{CompanionId, Tile};
use glam::Vec2;
use rand::rngs::StdRng;

use crate::config::{MAX_SPAWN_CAP, RoamerConfig};
use crate::steering::{Companion, SteeringParams};
use crate::style::StylePicker;

/// Everything needed to bring a new companion into the world.
pub struct Spawner<'a> {
    /// Style source for new companions.
    pub styles: &'a mut StylePicker,
    /// Simulation randomness.
    pub rng: &'a mut StdRng,
    /// Where glow lights are registered.
    pub lights: &'a mut dyn LightSink,
}

impl std::fmt::Debug for Spawner<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Spawner")
            .field("styles", &self.styles.mode())
            .finish()
    }
}

/// One structure and its companions, in spawn order.
#[derive(Debug, Clone)]
pub struct StructureGroup {
    tile: Tile,
    companions: Vec<Companion>,
}

impl StructureGroup {
    /// An empty group for the structure at `tile`.
    pub fn new(tile: Tile) -> Self {
        Self {
            tile,
            companions: Vec::new(),
        }
    }

    /// Structure tile.
    pub fn tile(&self) -> Tile {
        self.tile
    }

    /// Companions in spawn order.
    pub fn companions(&self) -> &[Companion] {
        &self.companions
    }

    /// Number of companions.
    pub fn len(&self) -> usize {
        self.companions.len()
    }

    /// Whether the group has no companions.
    pub fn is_empty(&self) -> bool {
        self.companions.is_empty()
    }
}

/// Outcome of reconciling one structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Companions created for new units.
    pub spawned: Vec<CompanionId>,
    /// Companions removed because their unit is gone.
    pub despawned: Vec<CompanionId>,
    /// Matching units in the container, including those over the cap.
    pub live_units: usize,
    /// Set to the cap when `live_units` exceeded it.
    pub capped_at: Option<u32>,
}

impl ReconcileReport {
    /// Whether the companion set changed.
    pub fn changed(&self) -> bool {
        !self.spawned.is_empty() || !self.despawned.is_empty()
    }
}

/// Outcome of a full rescan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Structures the host reported.
    pub structures: usize,
    /// Structures that have companions after the scan.
    pub with_companions: usize,
    /// Per-structure reports, for structures whose container was available.
    pub reports: Vec<(Tile, ReconcileReport)>,
    /// Groups dropped because their structure no longer exists.
    pub removed: Vec<(Tile, usize)>,
}

/// All companions, keyed by structure tile.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    groups: BTreeMap<Tile, StructureGroup>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the companion set of the structure at `tile` match its container.
    ///
    /// The first `spawn_cap` matching units, in container order, each get
    /// exactly one companion. Units without an identity (or sharing one with
    /// an earlier unit) are given a fresh one. Companions of vanished units
    /// are despawned; surviving companions are left untouched. Returns `None`
    /// without touching anything when the container is unavailable.
    pub fn reconcile(
        &mut self,
        tile: Tile,
        container: Option<&mut dyn ResourceContainer>,
        config: &RoamerConfig,
        spawner: &mut Spawner<'_>,
    ) -> Option<ReconcileReport> {
        let container = container?;
        let cap = config.spawn_cap.clamp(1, MAX_SPAWN_CAP);
        let item_id = config.resource_item_id.as_str();

        let mut live: Vec<CompanionId> = Vec::new();
        let mut live_units = 0;
        for unit in container.units_mut().iter_mut().filter(|u| u.is(item_id)) {
            live_units += 1;
            if live.len() >= cap as usize {
                continue;
            }
            let id = match unit.identity {
                Some(id) if id.is_assigned() && !live.contains(&id) => id,
                _ => {
                    let id = CompanionId::new();
                    unit.identity = Some(id);
                    id
                }
            };
            live.push(id);
        }

        let mut report = ReconcileReport {
            live_units,
            capped_at: (live_units > cap as usize).then_some(cap),
            ..ReconcileReport::default()
        };
        if report.capped_at.is_some() {
            tracing::warn!(
                structure = %tile,
                units = live_units,
                cap,
                "structure holds more boxes than its companion limit"
            );
        }

        let group = self
            .groups
            .entry(tile)
            .or_insert_with(|| StructureGroup::new(tile));

        let mut kept = Vec::with_capacity(live.len());
        for mut companion in group.companions.drain(..) {
            if live.contains(&companion.id()) {
                kept.push(companion);
            } else {
                companion.detach_light(spawner.lights);
                tracing::debug!(companion = %companion.id(), structure = %tile, "despawned");
                report.despawned.push(companion.id());
            }
        }
        group.companions = kept;

        for id in live {
            if group.companions.iter().any(|c| c.id() == id) {
                continue;
            }
            let style = spawner.styles.next_style(spawner.rng);
            let mut companion =
                Companion::spawn_at_home(id, tile, style, &config.steering, spawner.rng);
            companion.attach_light(spawner.lights, spawner.rng);
            tracing::debug!(companion = %id, structure = %tile, style, "spawned");
            group.companions.push(companion);
            report.spawned.push(id);
        }

        if group.is_empty() {
            self.groups.remove(&tile);
        }
        Some(report)
    }

    /// Reconcile every structure the host knows, dropping groups whose
    /// structure has disappeared. Safe to call repeatedly.
    pub fn rescan(
        &mut self,
        source: &mut dyn StructureSource,
        config: &RoamerConfig,
        spawner: &mut Spawner<'_>,
    ) -> ScanSummary {
        let tiles = source.structure_tiles();
        let mut summary = ScanSummary {
            structures: tiles.len(),
            removed: self.prune(&tiles, spawner.lights),
            ..ScanSummary::default()
        };

        for tile in tiles {
            if let Some(report) = self.reconcile(tile, source.container_mut(tile), config, spawner)
            {
                summary.reports.push((tile, report));
            }
        }
        summary.with_companions = self.groups.values().filter(|g| !g.is_empty()).count();

        tracing::info!(
            active = summary.with_companions,
            structures = summary.structures,
            companions = self.companion_count(),
            "companion scan complete"
        );
        summary
    }

    /// Drop groups whose tile is not in `tiles`, removing their lights.
    pub fn prune(&mut self, tiles: &[Tile], lights: &mut dyn LightSink) -> Vec<(Tile, usize)> {
        let gone: Vec<Tile> = self
            .groups
            .keys()
            .filter(|t| !tiles.contains(t))
            .copied()
            .collect();
        gone.into_iter()
            .filter_map(|tile| {
                let mut group = self.groups.remove(&tile)?;
                for companion in &mut group.companions {
                    companion.detach_light(lights);
                }
                tracing::info!(structure = %tile, companions = group.len(), "structure removed");
                Some((tile, group.len()))
            })
            .collect()
    }

    /// Replace the group at `tile` with `companions`, removing lights of any
    /// companions it held.
    pub fn insert_group(
        &mut self,
        tile: Tile,
        companions: Vec<Companion>,
        lights: &mut dyn LightSink,
    ) {
        if let Some(mut old) = self.groups.remove(&tile) {
            for companion in &mut old.companions {
                companion.detach_light(lights);
            }
        }
        if !companions.is_empty() {
            self.groups.insert(tile, StructureGroup { tile, companions });
        }
    }

    /// Advance every companion by `dt` seconds.
    ///
    /// Repulsion reads the positions all companions had at the start of the
    /// tick, so the order companions are updated in does not matter.
    pub fn tick(
        &mut self,
        dt: f32,
        params: &SteeringParams,
        rng: &mut StdRng,
        lights: &mut dyn LightSink,
    ) {
        let positions: Vec<Vec2> = self.companions().map(Companion::position).collect();
        let all = self
            .groups
            .values_mut()
            .flat_map(|g| g.companions.iter_mut());
        for (index, companion) in all.enumerate() {
            let neighbours = positions
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != index)
                .map(|(_, p)| *p);
            companion.update(dt, neighbours, params, rng);
            companion.sync_light(lights);
        }
    }

    /// Remove every companion and its light.
    pub fn clear_all(&mut self, lights: &mut dyn LightSink) {
        for group in self.groups.values_mut() {
            for companion in &mut group.companions {
                companion.detach_light(lights);
            }
        }
        self.groups.clear();
    }

    /// Groups ordered by tile.
    pub fn groups(&self) -> impl Iterator<Item = &StructureGroup> {
        self.groups.values()
    }

    /// The group at `tile`.
    pub fn group(&self, tile: Tile) -> Option<&StructureGroup> {
        self.groups.get(&tile)
    }

    /// Every companion, group by group.
    pub fn companions(&self) -> impl Iterator<Item = &Companion> {
        self.groups.values().flat_map(|g| g.companions.iter())
    }

    /// Total companions.
    pub fn companion_count(&self) -> usize {
        self.groups.values().map(StructureGroup::len).sum()
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether there are no companions at all.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
