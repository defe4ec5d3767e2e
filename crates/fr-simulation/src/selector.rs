//! Weighted choice of the tile the crop fairy visits.
//!
//! Each candidate tile is weighted by the boxes of the best-stocked structure
//! within working range, then one tile is drawn by cumulative sampling.

use fr_core::Tile;
use rand::Rng;

use crate::census::StructureCount;
use crate::config::RoamerConfig;

/// Chebyshev range within which a structure influences a tile.
pub const HUT_RANGE: u32 = 8;

/// A candidate tile with its selection weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeightedCandidate {
    /// Candidate tile.
    pub tile: Tile,
    /// Selection weight; 1 plus the box contribution.
    pub weight: u32,
    /// Boxes counted toward the weight, after the per-structure cap.
    pub boxes: u32,
    /// Structure whose boxes were counted.
    pub structure: Option<Tile>,
}

/// The chosen target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    /// The chosen candidate.
    pub candidate: WeightedCandidate,
    /// True when every weight was zero and the choice was uniform.
    pub fallback: bool,
}

/// Weigh every candidate against the structures around it.
///
/// Among structures within [`HUT_RANGE`] the one with the most boxes wins;
/// ties go to the one enumerated first, and a structure with no boxes never
/// wins.
pub fn weigh_candidates(
    candidates: &[Tile],
    structures: &[StructureCount],
    config: &RoamerConfig,
) -> Vec<WeightedCandidate> {
    candidates
        .iter()
        .map(|&tile| {
            let mut best: Option<&StructureCount> = None;
            for s in structures {
                if s.tile.chebyshev_distance(tile) <= HUT_RANGE
                    && s.units > best.map_or(0, |b| b.units)
                {
                    best = Some(s);
                }
            }
            let boxes = best.map_or(0, |s| s.units.min(config.max_weight_boxes));
            let bonus = (f64::from(boxes) * config.weight_per_box).floor() as u32;
            WeightedCandidate {
                tile,
                weight: bonus.saturating_add(1),
                boxes,
                structure: best.map(|s| s.tile),
            }
        })
        .collect()
}

/// Draw one candidate with probability proportional to its weight.
///
/// Returns `None` for an empty slice. If every weight is zero the choice is
/// uniform and flagged as a fallback.
pub fn select_target(weighted: &[WeightedCandidate], rng: &mut impl Rng) -> Option<Selection> {
    if weighted.is_empty() {
        return None;
    }
    let total: u64 = weighted.iter().map(|c| u64::from(c.weight)).sum();
    if total == 0 {
        let candidate = weighted[rng.random_range(0..weighted.len())];
        tracing::warn!(tile = %candidate.tile, "no weighted candidates, picking uniformly");
        return Some(Selection {
            candidate,
            fallback: true,
        });
    }

    let draw = rng.random_range(0..total);
    let mut accumulated = 0u64;
    let candidate = weighted
        .iter()
        .find(|c| {
            accumulated += u64::from(c.weight);
            draw < accumulated
        })
        .copied()?;
    tracing::debug!(
        tile = %candidate.tile,
        weight = candidate.weight,
        boxes = candidate.boxes,
        "crop fairy target chosen"
    );
    Some(Selection {
        candidate,
        fallback: false,
    })
}
