//! Core types for Fairy Roamer: tiles, identities, resource units, and the
//! interfaces a host game implements for the simulation.
//!
//! This crate is independent of the simulation engine. A host wires its own
//! buildings, containers, renderer and save file to the traits in [`host`];
//! the in-memory implementations in [`memory`] back tests and the CLI.

/// In-game calendar: seasons and days.
pub mod date;
/// Error types used throughout the crate.
pub mod error;
/// Host collaborator traits and the records passed through them.
pub mod host;
/// Stable identities for companions and their glow lights.
pub mod identity;
/// In-memory host implementations.
pub mod memory;
/// Resource units ("boxes") and the containers holding them.
pub mod resource;
/// Integer tile coordinates.
pub mod tile;

/// Re-export calendar types.
pub use date::{GameDate, Season};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export identity types.
pub use identity::{CompanionId, LightId};
/// Re-export resource types.
pub use resource::{Chest, FAIRY_BOX_ITEM, ResourceUnit};
/// Re-export the tile coordinate.
pub use tile::Tile;
