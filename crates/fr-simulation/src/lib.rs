//! Companion simulation for Fairy Roamer.
//!
//! Small roaming fairies are spawned for each fairy box in a structure's
//! container and steered around their home every tick. The same box counts
//! raise the nightly crop fairy chance and weight which tile it visits.
//! [`Roamer`] owns all state; the host forwards its lifecycle signals to it
//! through the traits in [`fr_core::host`].

/// Per-structure resource counts.
pub mod census;
/// Nightly trigger probability and the roll.
pub mod chance;
/// Fixed-step simulation clock.
pub mod clock;
/// Configuration types.
pub mod config;
/// Error types for the simulation crate.
pub mod error;
/// Roamer event types and the event log.
pub mod event;
/// Save and restore of companion state.
pub mod persistence;
/// Draw intents and glow lights.
pub mod render;
/// Companions grouped by structure, and reconciliation.
pub mod registry;
/// Top-level orchestrator.
pub mod roamer;
/// Weighted target selection.
pub mod selector;
/// Per-companion kinematics.
pub mod steering;
/// Visual style selection.
pub mod style;

/// Re-exports of census types.
pub use census::{StructureCount, census, total_units};
/// Re-exports of chance types.
pub use chance::{DayConditions, RollOutcome, SkipReason, TriggerChance, compute_trigger_chance};
/// Re-export of [`clock::SimClock`].
pub use clock::SimClock;
/// Re-exports of configuration types.
pub use config::{BoxLimit, FairyStyle, RoamerConfig};
/// Re-exports of [`error::SimError`] and [`error::SimResult`].
pub use error::{SimError, SimResult};
/// Re-exports of [`event::EventLog`], [`event::RoamerEvent`], and [`event::RoamerEventKind`].
pub use event::{EventLog, RoamerEvent, RoamerEventKind};
/// Re-exports of registry types.
pub use registry::{ReconcileReport, Registry, ScanSummary, Spawner, StructureGroup};
/// Re-exports of orchestrator types.
pub use roamer::{CompanionStatus, DayOutcome, Host, Roamer, StructureStatus};
/// Re-exports of selection types.
pub use selector::{Selection, WeightedCandidate, select_target, weigh_candidates};
/// Re-exports of steering types.
pub use steering::{Companion, CompanionSnapshot, SteeringParams};
/// Re-export of [`style::StylePicker`].
pub use style::StylePicker;
