use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// Days in every season.
pub const DAYS_PER_SEASON: u32 = 28;

/// The four seasons of the host calendar, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    /// First season of the year.
    Spring,
    /// Second season.
    Summer,
    /// Third season.
    Fall,
    /// Last season; crops do not grow outdoors.
    Winter,
}

impl Season {
    /// All seasons in calendar order.
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    fn index(self) -> u32 {
        match self {
            Self::Spring => 0,
            Self::Summer => 1,
            Self::Fall => 2,
            Self::Winter => 3,
        }
    }

    /// The following season and whether the year rolled over.
    fn next(self) -> (Season, bool) {
        match self {
            Self::Spring => (Self::Summer, false),
            Self::Summer => (Self::Fall, false),
            Self::Fall => (Self::Winter, false),
            Self::Winter => (Self::Spring, true),
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Spring => write!(f, "spring"),
            Self::Summer => write!(f, "summer"),
            Self::Fall => write!(f, "fall"),
            Self::Winter => write!(f, "winter"),
        }
    }
}

impl FromStr for Season {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "spring" => Ok(Self::Spring),
            "summer" => Ok(Self::Summer),
            "fall" | "autumn" => Ok(Self::Fall),
            "winter" => Ok(Self::Winter),
            other => Err(CoreError::UnknownSeason(other.to_string())),
        }
    }
}

/// A day on the host calendar: 28-day seasons, four seasons per year.
///
/// Only valid dates exist: construction and deserialization both go through
/// [`GameDate::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDate")]
pub struct GameDate {
    year: u32,
    season: Season,
    day: u32,
}

#[derive(Deserialize)]
struct RawDate {
    year: u32,
    season: Season,
    day: u32,
}

impl TryFrom<RawDate> for GameDate {
    type Error = CoreError;

    fn try_from(raw: RawDate) -> CoreResult<Self> {
        Self::new(raw.year, raw.season, raw.day)
    }
}

impl GameDate {
    /// Spring 1 of year 1.
    pub const FIRST: GameDate = GameDate {
        year: 1,
        season: Season::Spring,
        day: 1,
    };

    /// Build a date, rejecting days outside 1-28.
    pub fn new(year: u32, season: Season, day: u32) -> CoreResult<Self> {
        if !(1..=DAYS_PER_SEASON).contains(&day) {
            return Err(CoreError::InvalidDate {
                day,
                season,
                max: DAYS_PER_SEASON,
            });
        }
        Ok(Self {
            year: year.max(1),
            season,
            day,
        })
    }

    /// Year, starting at 1.
    pub fn year(self) -> u32 {
        self.year
    }

    /// Season of this day.
    pub fn season(self) -> Season {
        self.season
    }

    /// Day of the season, 1-28.
    pub fn day(self) -> u32 {
        self.day
    }

    /// The day after this one.
    pub fn next_day(self) -> Self {
        if self.day < DAYS_PER_SEASON {
            return Self {
                day: self.day + 1,
                ..self
            };
        }
        let (season, rolled) = self.season.next();
        Self {
            year: if rolled { self.year + 1 } else { self.year },
            season,
            day: 1,
        }
    }

    /// Days elapsed since Spring 1 of year 1, counting that day as 1.
    pub fn days_played(self) -> u32 {
        self.year.saturating_sub(1) * DAYS_PER_SEASON * 4 + self.season.index() * DAYS_PER_SEASON + self.day
    }

    /// Whether this is the first day of its season.
    pub fn is_first_of_month(self) -> bool {
        self.day == 1
    }
}

impl Default for GameDate {
    fn default() -> Self {
        Self::FIRST
    }
}

impl fmt::Display for GameDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}, year {}", self.season, self.day, self.year)
    }
}
