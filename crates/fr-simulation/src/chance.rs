//! Nightly crop fairy probability and the single roll that decides it.

use std::fmt;

use fr_core::host::DailyRandom;
use fr_core::{GameDate, Season};

use crate::config::RoamerConfig;

/// Probability of the event on any eligible night.
pub const BASE_CHANCE: f64 = 0.01;
/// Added when a mature fairy rose is on the farm.
pub const FAIRY_ROSE_BONUS: f64 = 0.007;
/// Draws the host consumes from the daily stream before this roll.
pub const SKIPPED_DRAWS: usize = 10;
/// Season in which the event never happens.
pub const EXCLUDED_SEASON: Season = Season::Winter;

/// Breakdown of one night's event probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerChance {
    /// Boxes found across all structures.
    pub raw_units: u32,
    /// Boxes that counted after the global cap.
    pub counted_units: u32,
    /// Base probability.
    pub base: f64,
    /// Fairy rose bonus, 0 when there is no rose.
    pub conditional: f64,
    /// Bonus from counted boxes.
    pub bonus: f64,
}

impl TriggerChance {
    /// Total probability, not clamped to 1.
    pub fn total(&self) -> f64 {
        self.base + self.conditional + self.bonus
    }

    /// Skip the host's prior draws, then compare one draw to the total.
    pub fn roll(&self, random: &mut dyn DailyRandom) -> RollOutcome {
        random.skip(SKIPPED_DRAWS);
        let roll = random.next_uniform();
        RollOutcome {
            roll,
            chance: self.total(),
            triggered: roll < self.total(),
        }
    }
}

impl fmt::Display for TriggerChance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Fairy boxes:  {} (counted {})",
            self.raw_units, self.counted_units
        )?;
        writeln!(f, "Base chance:  {:.3}%", self.base * 100.0)?;
        writeln!(f, "Fairy rose:   {:.3}%", self.conditional * 100.0)?;
        writeln!(f, "Box bonus:    {:.3}%", self.bonus * 100.0)?;
        write!(f, "Total chance: {:.3}%", self.total() * 100.0)
    }
}

/// Result of the nightly roll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollOutcome {
    /// The uniform draw.
    pub roll: f64,
    /// The probability it was compared against.
    pub chance: f64,
    /// Whether the event fires.
    pub triggered: bool,
}

/// Probability for a night with `units` boxes across all structures.
///
/// The cap in `config.max_boxes` applies to the global sum, not per
/// structure.
pub fn compute_trigger_chance(units: u32, fairy_rose: bool, config: &RoamerConfig) -> TriggerChance {
    let counted_units = config.max_boxes.apply(units);
    TriggerChance {
        raw_units: units,
        counted_units,
        base: BASE_CHANCE,
        conditional: if fairy_rose { FAIRY_ROSE_BONUS } else { 0.0 },
        bonus: f64::from(counted_units) * config.chance_per_box / 100.0,
    }
}

/// Facts about a night that decide whether the roll happens at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayConditions {
    /// The day being evaluated.
    pub date: GameDate,
    /// Whether the box weighting feature is on.
    pub enabled: bool,
}

impl DayConditions {
    /// Why the roll is skipped, or `None` if it may happen.
    pub fn skip_reason(&self, chance: &TriggerChance) -> Option<SkipReason> {
        if !self.enabled {
            Some(SkipReason::Disabled)
        } else if chance.bonus <= 0.0 {
            Some(SkipReason::NoBonus)
        } else if self.date.season() == EXCLUDED_SEASON {
            Some(SkipReason::ExcludedSeason)
        } else if self.date.is_first_of_month() {
            Some(SkipReason::FirstOfMonth)
        } else {
            None
        }
    }

    /// Whether the roll may happen.
    pub fn allows_roll(&self, chance: &TriggerChance) -> bool {
        self.skip_reason(chance).is_none()
    }
}

/// Why a night was not rolled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The feature is turned off.
    Disabled,
    /// No boxes counted, so the host's own roll is left alone.
    NoBonus,
    /// Winter nights never roll.
    ExcludedSeason,
    /// The first day of a season never rolls.
    FirstOfMonth,
    /// This day was already evaluated.
    AlreadyEvaluated,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Disabled => "feature disabled",
            Self::NoBonus => "no box bonus",
            Self::ExcludedSeason => "excluded season",
            Self::FirstOfMonth => "first day of the month",
            Self::AlreadyEvaluated => "already evaluated today",
        };
        f.write_str(text)
    }
}

/// Log the end-of-day summary of box influence.
pub fn nightly_report(chance: &TriggerChance) {
    tracing::info!(
        bonus_percent = chance.bonus * 100.0,
        counted = chance.counted_units,
        raw = chance.raw_units,
        "nightly crop fairy bonus"
    );
    if chance.raw_units == 0 {
        tracing::warn!("no fairy boxes found in any structure");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BoxLimit;

    struct Fixed {
        values: Vec<f64>,
        next: usize,
    }

    impl DailyRandom for Fixed {
        fn next_uniform(&mut self) -> f64 {
            let v = self.values[self.next];
            self.next += 1;
            v
        }
    }

    fn date(season: Season, day: u32) -> GameDate {
        GameDate::new(1, season, day).unwrap()
    }

    #[test]
    fn flat_global_cap() {
        // Structures holding 5, 0 and 10 boxes with a cap of 8.
        let chance = compute_trigger_chance(5 + 10, false, &RoamerConfig::default());
        assert_eq!(chance.counted_units, 8);
        assert!((chance.bonus - 0.01).abs() < 1e-12);
        assert!((chance.total() - 0.02).abs() < 1e-12);
    }

    #[test]
    fn fairy_rose_adds_bonus() {
        let chance = compute_trigger_chance(0, true, &RoamerConfig::default());
        assert!((chance.total() - 0.017).abs() < 1e-12);
    }

    #[test]
    fn unlimited_counts_everything() {
        let config = RoamerConfig::default().with_max_boxes(BoxLimit::Unlimited);
        let chance = compute_trigger_chance(40, false, &config);
        assert_eq!(chance.counted_units, 40);
        assert!((chance.bonus - 0.05).abs() < 1e-12);
    }

    #[test]
    fn roll_skips_ten_draws() {
        let chance = compute_trigger_chance(8, false, &RoamerConfig::default());
        let mut values = vec![0.0; SKIPPED_DRAWS];
        values.push(0.019);
        let outcome = chance.roll(&mut Fixed { values, next: 0 });
        assert!(outcome.triggered);
        assert_eq!(outcome.roll, 0.019);

        let mut values = vec![0.0; SKIPPED_DRAWS];
        values.push(0.02);
        let outcome = chance.roll(&mut Fixed { values, next: 0 });
        assert!(!outcome.triggered);
    }

    #[test]
    fn gating() {
        let with_boxes = compute_trigger_chance(3, false, &RoamerConfig::default());
        let without = compute_trigger_chance(0, true, &RoamerConfig::default());
        let summer = DayConditions {
            date: date(Season::Summer, 12),
            enabled: true,
        };
        assert!(summer.allows_roll(&with_boxes));
        assert_eq!(summer.skip_reason(&without), Some(SkipReason::NoBonus));

        let winter = DayConditions {
            date: date(Season::Winter, 12),
            ..summer
        };
        assert_eq!(winter.skip_reason(&with_boxes), Some(SkipReason::ExcludedSeason));

        let first = DayConditions {
            date: date(Season::Fall, 1),
            ..summer
        };
        assert_eq!(first.skip_reason(&with_boxes), Some(SkipReason::FirstOfMonth));

        let disabled = DayConditions {
            enabled: false,
            ..summer
        };
        assert_eq!(disabled.skip_reason(&with_boxes), Some(SkipReason::Disabled));
    }

    #[test]
    fn zero_chance_per_box_never_rolls() {
        let config = RoamerConfig::default().with_chance_per_box(0.0);
        let chance = compute_trigger_chance(8, false, &config);
        let cond = DayConditions {
            date: date(Season::Spring, 5),
            enabled: true,
        };
        assert!(!cond.allows_roll(&chance));
    }
}
