use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity shared by a resource unit and the companion it spawned.
///
/// Generated once when a unit is first seen and carried on the unit from then
/// on, so a companion survives reconciliation and save/load. The nil UUID is
/// reserved for [`CompanionId::UNASSIGNED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompanionId(pub Uuid);

impl CompanionId {
    /// Placeholder identity for companions restored from saves that predate
    /// identities. It never matches a live unit.
    pub const UNASSIGNED: CompanionId = CompanionId(Uuid::nil());

    /// Generate a new random identity.
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Whether this is a real identity rather than [`Self::UNASSIGNED`].
    pub fn is_assigned(&self) -> bool {
        !self.0.is_nil()
    }
}

impl fmt::Display for CompanionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}

/// Key of a glow light registered with the host's light sink.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LightId(String);

impl LightId {
    /// Build the light key for a companion. `salt` keeps keys distinct when the
    /// same companion is respawned before the host drops the old light.
    pub fn for_companion(id: CompanionId, style: u8, salt: u32) -> Self {
        Self(format!("fairy_{}_{style}_{salt}", id.0))
    }

    /// The key as the host sees it.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LightId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
