//! Per-structure resource counts read from the host.

use fr_core::Tile;
use fr_core::host::StructureSource;

/// Matching resource units in one structure's container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureCount {
    /// Structure tile.
    pub tile: Tile,
    /// Units whose item id matched. Unloaded containers count as 0.
    pub units: u32,
}

/// Count `item_id` units in every structure, in host enumeration order.
pub fn census(source: &dyn StructureSource, item_id: &str) -> Vec<StructureCount> {
    source
        .structure_tiles()
        .into_iter()
        .map(|tile| {
            let units = source
                .container(tile)
                .map_or(0, |c| c.count(&|u| u.is(item_id)));
            StructureCount {
                tile,
                units: u32::try_from(units).unwrap_or(u32::MAX),
            }
        })
        .collect()
}

/// Units summed over all structures.
pub fn total_units(counts: &[StructureCount]) -> u32 {
    counts.iter().fold(0u32, |acc, c| acc.saturating_add(c.units))
}
