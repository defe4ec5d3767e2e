use serde::{Deserialize, Serialize};

use crate::host::ResourceContainer;
use crate::identity::CompanionId;

/// Qualified item id of the resource unit that spawns companions.
pub const FAIRY_BOX_ITEM: &str = "(TR)FairyBox";

/// One item stack inside a structure's container.
///
/// Only units whose `item_id` matches the configured resource id drive
/// companions; everything else is carried along untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceUnit {
    /// Qualified item id, e.g. `(TR)FairyBox`.
    pub item_id: String,
    /// Identity of the companion bound to this unit, once assigned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<CompanionId>,
}

impl ResourceUnit {
    /// A unit of the given item with no identity yet.
    pub fn new(item_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            identity: None,
        }
    }

    /// A fairy box with no identity yet.
    pub fn fairy_box() -> Self {
        Self::new(FAIRY_BOX_ITEM)
    }

    /// Attach an identity, as a host would when loading a persisted unit.
    pub fn with_identity(mut self, id: CompanionId) -> Self {
        self.identity = Some(id);
        self
    }

    /// Whether this unit is of the given item.
    pub fn is(&self, item_id: &str) -> bool {
        self.item_id == item_id
    }
}

/// An ordered in-memory container, standing in for a hut's output chest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Chest {
    items: Vec<ResourceUnit>,
}

impl Chest {
    /// An empty chest.
    pub fn new() -> Self {
        Self::default()
    }

    /// A chest holding `n` fresh fairy boxes.
    pub fn with_fairy_boxes(n: usize) -> Self {
        Self {
            items: (0..n).map(|_| ResourceUnit::fairy_box()).collect(),
        }
    }

    /// Append a unit at the end.
    pub fn push(&mut self, unit: ResourceUnit) {
        self.items.push(unit);
    }

    /// Remove and return the unit at `index`, if present.
    pub fn remove(&mut self, index: usize) -> Option<ResourceUnit> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Number of units of any item.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the chest holds nothing.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl ResourceContainer for Chest {
    fn units(&self) -> &[ResourceUnit] {
        &self.items
    }

    fn units_mut(&mut self) -> &mut [ResourceUnit] {
        &mut self.items
    }
}
