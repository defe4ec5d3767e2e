use fr_core::host::{DailyRandom, LightSink, RenderSink, SaveStore, StructureSource};
use fr_core::{CompanionId, GameDate, Tile};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::census::{census, total_units};
use crate::chance::{
    DayConditions, RollOutcome, SkipReason, TriggerChance, compute_trigger_chance, nightly_report,
};
use crate::clock::SimClock;
use crate::config::RoamerConfig;
use crate::event::{EventLog, RoamerEvent, RoamerEventKind};
use crate::persistence;
use crate::registry::{Registry, ScanSummary, Spawner};
use crate::selector::{Selection, select_target, weigh_candidates};
use crate::style::StylePicker;

/// Ticks to wait after arriving on the farm before rescanning, so the host
/// has finished loading containers.
pub const WARP_RESCAN_DELAY: u32 = 3;

/// The host collaborators a lifecycle call needs.
pub struct Host<'a> {
    /// Structures and their containers.
    pub structures: &'a mut dyn StructureSource,
    /// Glow light list.
    pub lights: &'a mut dyn LightSink,
    /// Save-file storage.
    pub store: &'a mut dyn SaveStore,
}

impl std::fmt::Debug for Host<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}

/// Result of evaluating one night.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayOutcome {
    /// Day evaluated.
    pub date: GameDate,
    /// Probability breakdown.
    pub chance: TriggerChance,
    /// The roll, if one was made.
    pub roll: Option<RollOutcome>,
    /// Why no roll was made.
    pub skipped: Option<SkipReason>,
}

impl DayOutcome {
    /// Whether the crop fairy event fires.
    pub fn triggered(&self) -> bool {
        self.roll.is_some_and(|r| r.triggered)
    }
}

/// Status of one companion, for display.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompanionStatus {
    /// Identity.
    pub id: CompanionId,
    /// Visual style.
    pub style: u8,
    /// Distance from home in tiles.
    pub distance: f32,
}

/// Status of one structure, for display.
#[derive(Debug, Clone, PartialEq)]
pub struct StructureStatus {
    /// Structure tile.
    pub tile: Tile,
    /// Its companions in spawn order.
    pub companions: Vec<CompanionStatus>,
}

/// The top-level companion simulation.
///
/// Owns the configuration, registry, RNG, style picker, clock and event log.
/// The host forwards its lifecycle signals here; nothing in this type blocks
/// or fails, problems are logged and recorded as events.
pub struct Roamer {
    config: RoamerConfig,
    registry: Registry,
    rng: StdRng,
    styles: StylePicker,
    clock: SimClock,
    events: EventLog,
    pending_rescan: Option<u32>,
    /// `days_played` of the latest evaluated night.
    last_evaluated: Option<u32>,
    save_after_scan: bool,
}

impl std::fmt::Debug for Roamer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Roamer")
            .field("tick", &self.clock.tick())
            .field("structures", &self.registry.len())
            .field("companions", &self.registry.companion_count())
            .field("events", &self.events.len())
            .finish()
    }
}

impl Roamer {
    /// Create a simulation with the given configuration and RNG seed.
    pub fn new(config: RoamerConfig, seed: u64) -> Self {
        let config = config.validated();
        Self {
            styles: StylePicker::new(config.fairy_style),
            events: EventLog::new(config.max_events),
            registry: Registry::new(),
            rng: StdRng::seed_from_u64(seed),
            clock: SimClock::default(),
            pending_rescan: None,
            last_evaluated: None,
            save_after_scan: false,
            config,
        }
    }

    /// Restore saved companions, rescan every structure, then save once so
    /// freshly assigned identities are persisted.
    pub fn on_save_loaded(&mut self, host: &mut Host<'_>) {
        let c = &self.config;
        tracing::info!(
            style = %c.fairy_style,
            enhanced_crop_fairy = c.enhanced_crop_fairy,
            spawn_cap = c.spawn_cap,
            chance_per_box = c.chance_per_box,
            max_boxes = %c.max_boxes,
            weight_per_box = c.weight_per_box,
            max_weight_boxes = c.max_weight_boxes,
            "loaded configuration"
        );

        self.save_after_scan = true;
        let restored = persistence::restore(
            &mut self.registry,
            &*host.store,
            &*host.structures,
            &self.config.steering,
            &mut self.rng,
            &mut *host.lights,
        );
        if let Some(summary) = restored {
            self.record(
                RoamerEventKind::Restored {
                    structures: summary.structures,
                    companions: summary.companions,
                    legacy: summary.legacy,
                },
                format!(
                    "Restored {} companions for {} structures",
                    summary.companions, summary.structures
                ),
            );
        }
        self.rescan(host);
    }

    /// A new day began: rescan.
    pub fn on_day_started(&mut self, host: &mut Host<'_>) -> ScanSummary {
        self.rescan(host)
    }

    /// Rescan every structure now. Calling this redundantly is harmless.
    pub fn request_rescan(&mut self, host: &mut Host<'_>) -> ScanSummary {
        self.rescan(host)
    }

    /// The player arrived on the farm; rescan after a short delay.
    pub fn on_warped_to_farm(&mut self) {
        self.pending_rescan = Some(WARP_RESCAN_DELAY);
    }

    /// The host is writing its save file.
    pub fn on_saving(&mut self, store: &mut dyn SaveStore) {
        match persistence::save(&self.registry, store) {
            Ok(()) => {
                let companions = self.registry.companion_count();
                self.record(
                    RoamerEventKind::Saved { companions },
                    format!("Saved {companions} companions"),
                );
            }
            Err(e) => tracing::warn!(error = %e, "could not save companion state"),
        }
    }

    /// Advance one host tick.
    pub fn tick(&mut self, host: &mut Host<'_>) {
        if let Some(remaining) = self.pending_rescan {
            let remaining = remaining.saturating_sub(1);
            if remaining == 0 {
                self.pending_rescan = None;
                tracing::trace!("delayed rescan after warp");
                self.rescan(host);
            } else {
                self.pending_rescan = Some(remaining);
            }
        }

        self.clock.advance();
        self.registry.tick(
            self.clock.dt(),
            &self.config.steering,
            &mut self.rng,
            &mut *host.lights,
        );
    }

    /// Advance `n` ticks.
    pub fn run(&mut self, host: &mut Host<'_>, n: u64) {
        for _ in 0..n {
            self.tick(host);
        }
    }

    /// Emit draw intents for every companion.
    pub fn draw(&self, sink: &mut dyn RenderSink) {
        for companion in self.registry.companions() {
            companion.draw(sink);
        }
    }

    /// Decide whether the crop fairy visits tonight. Runs at most once per
    /// date; calls for that date or any earlier one are reported as skipped.
    pub fn evaluate_day(
        &mut self,
        structures: &dyn StructureSource,
        date: GameDate,
        fairy_rose: bool,
        daily: &mut dyn DailyRandom,
    ) -> DayOutcome {
        let counts = census(structures, &self.config.resource_item_id);
        let chance = compute_trigger_chance(total_units(&counts), fairy_rose, &self.config);
        let mut outcome = DayOutcome {
            date,
            chance,
            roll: None,
            skipped: None,
        };

        let day = date.days_played();
        if self.last_evaluated.is_some_and(|last| day <= last) {
            outcome.skipped = Some(SkipReason::AlreadyEvaluated);
            return outcome;
        }
        self.last_evaluated = Some(day);

        if self.config.enhanced_crop_fairy {
            nightly_report(&chance);
        }
        let conditions = DayConditions {
            date,
            enabled: self.config.enhanced_crop_fairy,
        };
        if let Some(reason) = conditions.skip_reason(&chance) {
            tracing::debug!(%date, %reason, "crop fairy roll skipped");
            outcome.skipped = Some(reason);
            return outcome;
        }

        let roll = chance.roll(daily);
        tracing::info!(
            %date,
            roll = roll.roll,
            chance = roll.chance,
            triggered = roll.triggered,
            "crop fairy roll"
        );
        self.record(
            RoamerEventKind::ChanceRolled {
                date,
                chance: roll.chance,
                triggered: roll.triggered,
            },
            format!(
                "{date}: {:.2}% chance, {}",
                roll.chance * 100.0,
                if roll.triggered { "triggered" } else { "not triggered" }
            ),
        );
        outcome.roll = Some(roll);
        outcome
    }

    /// Pick the tile the crop fairy visits.
    ///
    /// `None` means the host should fall back to its own choice: the feature
    /// is disabled or there are no candidates.
    pub fn choose_target(
        &mut self,
        structures: &dyn StructureSource,
        candidates: &[Tile],
        rng: &mut impl Rng,
    ) -> Option<Selection> {
        if !self.config.enhanced_crop_fairy {
            return None;
        }
        if candidates.is_empty() {
            tracing::warn!("no valid crop fairy candidates");
            return None;
        }
        let counts = census(structures, &self.config.resource_item_id);
        let weighted = weigh_candidates(candidates, &counts, &self.config);
        let selection = select_target(&weighted, rng)?;
        let chosen = selection.candidate;
        self.record(
            RoamerEventKind::TargetSelected {
                tile: chosen.tile,
                weight: chosen.weight,
                fallback: selection.fallback,
            },
            format!(
                "Crop fairy chose {} (weight {}, boxes {})",
                chosen.tile, chosen.weight, chosen.boxes
            ),
        );
        Some(selection)
    }

    /// Companion counts and distances per structure.
    pub fn status(&self) -> Vec<StructureStatus> {
        self.registry
            .groups()
            .map(|group| StructureStatus {
                tile: group.tile(),
                companions: group
                    .companions()
                    .iter()
                    .map(|c| CompanionStatus {
                        id: c.id(),
                        style: c.style(),
                        distance: c.distance_from_home(),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Remove every companion and its light.
    pub fn clear_all(&mut self, lights: &mut dyn LightSink) {
        self.registry.clear_all(lights);
        tracing::info!("cleared all companions");
    }

    /// Replace the configuration. Existing companions keep their styles.
    pub fn set_config(&mut self, config: RoamerConfig) {
        let config = config.validated();
        self.styles.set_mode(config.fairy_style);
        self.config = config;
    }

    /// Active configuration.
    pub fn config(&self) -> &RoamerConfig {
        &self.config
    }

    /// Companion registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Recorded events.
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Simulation clock.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Whether a delayed rescan is waiting.
    pub fn rescan_pending(&self) -> bool {
        self.pending_rescan.is_some()
    }

    fn rescan(&mut self, host: &mut Host<'_>) -> ScanSummary {
        let mut spawner = Spawner {
            styles: &mut self.styles,
            rng: &mut self.rng,
            lights: &mut *host.lights,
        };
        let summary = self
            .registry
            .rescan(&mut *host.structures, &self.config, &mut spawner);
        self.record_scan(&summary);

        if self.save_after_scan {
            self.save_after_scan = false;
            self.on_saving(&mut *host.store);
        }
        summary
    }

    fn record_scan(&mut self, summary: &ScanSummary) {
        for &(structure, companions) in &summary.removed {
            self.record(
                RoamerEventKind::StructureRemoved {
                    structure,
                    companions,
                },
                format!("Structure at {structure} is gone; {companions} companions removed"),
            );
        }
        for (structure, report) in &summary.reports {
            let structure = *structure;
            for &companion in &report.despawned {
                self.record(
                    RoamerEventKind::Despawned {
                        companion,
                        structure,
                    },
                    format!("Companion {companion} left {structure}"),
                );
            }
            for &companion in &report.spawned {
                self.record(
                    RoamerEventKind::Spawned {
                        companion,
                        structure,
                    },
                    format!("Companion {companion} appeared at {structure}"),
                );
            }
            if let Some(cap) = report.capped_at {
                self.record(
                    RoamerEventKind::CapacityReached {
                        structure,
                        units: report.live_units,
                        cap,
                    },
                    format!("Fairy limit: {cap} max (found {})", report.live_units),
                );
            }
        }
    }

    fn record(&mut self, kind: RoamerEventKind, description: String) {
        self.events
            .push(RoamerEvent::new(self.clock.tick(), kind, description));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::SAVE_KEY;
    use fr_core::host::SeededDailyRandom;
    use fr_core::memory::{MemoryFarm, MemorySaveStore, RecordingLights, RecordingRenderer};
    use fr_core::{Chest, ResourceUnit, Season};

    struct World {
        farm: MemoryFarm,
        lights: RecordingLights,
        store: MemorySaveStore,
    }

    impl World {
        fn new() -> Self {
            let mut farm = MemoryFarm::new();
            farm.add_hut(Tile::new(10, 10), Chest::with_fairy_boxes(3))
                .add_hut(Tile::new(40, 10), Chest::with_fairy_boxes(12));
            Self {
                farm,
                lights: RecordingLights::new(),
                store: MemorySaveStore::new(),
            }
        }

        fn host(&mut self) -> Host<'_> {
            Host {
                structures: &mut self.farm,
                lights: &mut self.lights,
                store: &mut self.store,
            }
        }
    }

    fn summer(day: u32) -> GameDate {
        GameDate::new(1, Season::Summer, day).unwrap()
    }

    #[test]
    fn save_loaded_scans_and_saves_once() {
        let mut world = World::new();
        let mut roamer = Roamer::new(RoamerConfig::default(), 1);
        roamer.on_save_loaded(&mut world.host());

        assert_eq!(roamer.registry().companion_count(), 3 + 8);
        assert!(world.store.get(SAVE_KEY).is_some());
        let capacity: Vec<_> = roamer
            .events()
            .events()
            .iter()
            .filter(|e| matches!(e.kind, RoamerEventKind::CapacityReached { units: 12, cap: 8, .. }))
            .collect();
        assert_eq!(capacity.len(), 1);

        let saves_before = count_saves(&roamer);
        roamer.request_rescan(&mut world.host());
        assert_eq!(count_saves(&roamer), saves_before);
    }

    fn count_saves(roamer: &Roamer) -> usize {
        roamer
            .events()
            .events()
            .iter()
            .filter(|e| matches!(e.kind, RoamerEventKind::Saved { .. }))
            .count()
    }

    #[test]
    fn identities_survive_a_session() {
        let mut world = World::new();
        let mut first = Roamer::new(RoamerConfig::default(), 1);
        first.on_save_loaded(&mut world.host());
        first.run(&mut world.host(), 120);
        first.on_saving(&mut world.store);
        let ids: Vec<CompanionId> = first.registry().companions().map(|c| c.id()).collect();

        let mut world2 = World {
            farm: world.farm.clone(),
            lights: RecordingLights::new(),
            store: world.store.clone(),
        };
        let mut second = Roamer::new(RoamerConfig::default(), 2);
        second.on_save_loaded(&mut world2.host());
        let ids2: Vec<CompanionId> = second.registry().companions().map(|c| c.id()).collect();
        assert_eq!(ids, ids2);
        let positions: Vec<_> = first.registry().companions().map(|c| c.position()).collect();
        let positions2: Vec<_> = second.registry().companions().map(|c| c.position()).collect();
        for (a, b) in positions.iter().zip(&positions2) {
            assert!(a.distance(*b) < 1e-4);
        }
        assert!(second.events().events().iter().any(|e| matches!(
            e.kind,
            RoamerEventKind::Restored { companions: 11, legacy: false, .. }
        )));
    }

    #[test]
    fn warp_rescan_waits_three_ticks() {
        let mut world = World::new();
        let mut roamer = Roamer::new(RoamerConfig::default(), 1);
        roamer.on_warped_to_farm();
        roamer.tick(&mut world.host());
        roamer.tick(&mut world.host());
        assert!(roamer.registry().is_empty());
        assert!(roamer.rescan_pending());
        roamer.tick(&mut world.host());
        assert!(!roamer.rescan_pending());
        assert_eq!(roamer.registry().companion_count(), 11);
    }

    #[test]
    fn chest_changes_are_picked_up_on_rescan() {
        let mut world = World::new();
        let mut roamer = Roamer::new(RoamerConfig::default(), 1);
        roamer.on_day_started(&mut world.host());
        if let Some(chest) = world.farm.chest_mut(Tile::new(10, 10)) {
            chest.push(ResourceUnit::fairy_box());
        }
        let summary = roamer.request_rescan(&mut world.host());
        let spawned: usize = summary.reports.iter().map(|(_, r)| r.spawned.len()).sum();
        assert_eq!(spawned, 1);
        assert_eq!(world.lights.len(), 12);
    }

    #[test]
    fn evaluate_day_once_per_date() {
        let world = World::new();
        let mut roamer = Roamer::new(RoamerConfig::default(), 1);
        let date = summer(9);
        let mut daily = SeededDailyRandom::for_day(5, date.days_played());
        let first = roamer.evaluate_day(&world.farm, date, false, &mut daily);
        assert!(first.roll.is_some());
        assert_eq!(first.chance.raw_units, 15);
        assert_eq!(first.chance.counted_units, 8);

        let again = roamer.evaluate_day(&world.farm, date, false, &mut daily);
        assert_eq!(again.skipped, Some(SkipReason::AlreadyEvaluated));
        assert!(!again.triggered());

        let next = roamer.evaluate_day(&world.farm, date.next_day(), false, &mut daily);
        assert!(next.roll.is_some());
    }

    #[test]
    fn evaluate_day_never_revisits_earlier_date() {
        let world = World::new();
        let mut roamer = Roamer::new(RoamerConfig::default(), 1);
        let mut daily = SeededDailyRandom::for_day(5, 0);
        assert!(roamer.evaluate_day(&world.farm, summer(9), false, &mut daily).roll.is_some());
        assert!(roamer.evaluate_day(&world.farm, summer(10), false, &mut daily).roll.is_some());

        let back = roamer.evaluate_day(&world.farm, summer(9), false, &mut daily);
        assert_eq!(back.skipped, Some(SkipReason::AlreadyEvaluated));
        assert!(back.roll.is_none());
        let rolls = roamer
            .events()
            .events()
            .iter()
            .filter(|e| matches!(e.kind, RoamerEventKind::ChanceRolled { .. }))
            .count();
        assert_eq!(rolls, 2);
    }

    #[test]
    fn evaluate_day_skips_first_of_month() {
        let world = World::new();
        let mut roamer = Roamer::new(RoamerConfig::default(), 1);
        let mut daily = SeededDailyRandom::for_day(5, 1);
        let outcome = roamer.evaluate_day(&world.farm, summer(1), true, &mut daily);
        assert_eq!(outcome.skipped, Some(SkipReason::FirstOfMonth));
        assert!(outcome.roll.is_none());
    }

    #[test]
    fn choose_target_prefers_stocked_structure() {
        let world = World::new();
        let mut roamer = Roamer::new(RoamerConfig::default(), 1);
        let mut rng = StdRng::seed_from_u64(4);
        // Near the 12-box hut: weight 1 + 12; far from all huts: weight 1.
        let candidates = [Tile::new(41, 11), Tile::new(100, 100)];
        let near = (0..1000)
            .filter_map(|_| roamer.choose_target(&world.farm, &candidates, &mut rng))
            .filter(|s| s.candidate.tile == Tile::new(41, 11))
            .count();
        assert!(near > 880, "near chosen {near} times");
        assert!(
            roamer
                .choose_target(&world.farm, &[], &mut rng)
                .is_none()
        );
    }

    #[test]
    fn disabled_feature_defers_to_host() {
        let world = World::new();
        let config = RoamerConfig::default().with_enhanced_crop_fairy(false);
        let mut roamer = Roamer::new(config, 1);
        let mut rng = StdRng::seed_from_u64(4);
        assert!(
            roamer
                .choose_target(&world.farm, &[Tile::new(1, 1)], &mut rng)
                .is_none()
        );
        let mut daily = SeededDailyRandom::for_day(5, 3);
        let outcome = roamer.evaluate_day(&world.farm, summer(3), false, &mut daily);
        assert_eq!(outcome.skipped, Some(SkipReason::Disabled));
    }

    #[test]
    fn draw_and_status() {
        let mut world = World::new();
        let mut roamer = Roamer::new(RoamerConfig::default(), 1);
        roamer.request_rescan(&mut world.host());
        roamer.run(&mut world.host(), 600);

        let mut sink = RecordingRenderer::default();
        roamer.draw(&mut sink);
        assert_eq!(sink.intents.len(), 2 * 11);

        let status = roamer.status();
        assert_eq!(status.len(), 2);
        assert_eq!(status[0].companions.len(), 3);
        assert!(
            status
                .iter()
                .flat_map(|s| &s.companions)
                .all(|c| c.distance <= 10.1)
        );
        assert_eq!(roamer.clock().tick(), 600);
    }

    #[test]
    fn clear_all_then_rescan_respawns_same_identities() {
        let mut world = World::new();
        let mut roamer = Roamer::new(RoamerConfig::default(), 1);
        roamer.request_rescan(&mut world.host());
        let ids: Vec<CompanionId> = roamer.registry().companions().map(|c| c.id()).collect();
        roamer.clear_all(&mut world.lights);
        assert!(world.lights.is_empty());
        roamer.request_rescan(&mut world.host());
        let again: Vec<CompanionId> = roamer.registry().companions().map(|c| c.id()).collect();
        assert_eq!(ids, again);
    }
}
