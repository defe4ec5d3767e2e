use fr_core::{CompanionId, GameDate, Tile};

/// What kind of roamer event occurred.
#[derive(Debug, Clone, PartialEq)]
pub enum RoamerEventKind {
    // Lifecycle
    /// A companion appeared for a new resource unit.
    Spawned {
        /// The new companion.
        companion: CompanionId,
        /// Its home structure.
        structure: Tile,
    },
    /// A companion vanished because its unit left the container.
    Despawned {
        /// The removed companion.
        companion: CompanionId,
        /// Its former home structure.
        structure: Tile,
    },
    /// A structure holds more units than it can companion.
    CapacityReached {
        /// The crowded structure.
        structure: Tile,
        /// Matching units in its container.
        units: usize,
        /// Companions it is allowed.
        cap: u32,
    },
    /// A structure disappeared and its companions with it.
    StructureRemoved {
        /// Tile of the removed structure.
        structure: Tile,
        /// Companions dropped with it.
        companions: usize,
    },

    // Persistence
    /// Companions were rebuilt from the save.
    Restored {
        /// Structures with at least one restored companion.
        structures: usize,
        /// Companions restored.
        companions: usize,
        /// Whether the save predates companion identities.
        legacy: bool,
    },
    /// Companion state was written to the save.
    Saved {
        /// Companions written.
        companions: usize,
    },

    // Crop fairy
    /// The nightly crop fairy roll happened.
    ChanceRolled {
        /// Day the roll was made for.
        date: GameDate,
        /// Probability the roll was compared against.
        chance: f64,
        /// Whether the event fires.
        triggered: bool,
    },
    /// A target tile was chosen for the crop fairy.
    TargetSelected {
        /// The chosen tile.
        tile: Tile,
        /// Its selection weight.
        weight: u32,
        /// Whether the uniform fallback was used.
        fallback: bool,
    },
}

/// A record of something that happened during the simulation.
#[derive(Debug, Clone)]
pub struct RoamerEvent {
    /// The simulation tick when this event occurred.
    pub tick: u64,
    /// The specific kind of event that occurred.
    pub kind: RoamerEventKind,
    /// A human-readable description of the event.
    pub description: String,
}

impl RoamerEvent {
    /// Create a new event with the given tick, kind, and description.
    pub fn new(tick: u64, kind: RoamerEventKind, description: impl Into<String>) -> Self {
        Self {
            tick,
            kind,
            description: description.into(),
        }
    }
}

/// Bounded history of roamer events, oldest first.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<RoamerEvent>,
    max_events: usize,
}

impl EventLog {
    /// Keep at most `max_events` entries; 0 keeps everything.
    pub fn new(max_events: usize) -> Self {
        Self {
            events: Vec::new(),
            max_events,
        }
    }

    /// Record an event. Past capacity the oldest entries go first.
    pub fn push(&mut self, event: RoamerEvent) {
        self.events.push(event);
        if self.max_events > 0 && self.events.len() > self.max_events {
            let drain_count = self.events.len() - self.max_events;
            self.events.drain(..drain_count);
        }
    }

    /// Everything still held, oldest first.
    pub fn events(&self) -> &[RoamerEvent] {
        &self.events
    }

    /// Events currently held.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
