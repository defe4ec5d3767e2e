use std::fmt;

use fr_core::FAIRY_BOX_ITEM;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::steering::SteeringParams;

/// Highest number of companions a single structure can hold.
pub const MAX_SPAWN_CAP: u32 = 36;

/// Number of distinct companion styles on the sprite sheet.
pub const STYLE_COUNT: u8 = 8;

/// How each new companion's visual style is chosen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSetting", into = "RawSetting")]
pub enum FairyStyle {
    /// Cycle through styles 1-8 in order.
    Sequential,
    /// Pick any style uniformly at random.
    Random,
    /// Deal styles from a shuffled deck of all eight, reshuffling when empty.
    #[default]
    Shuffled,
    /// Always use this style (1-8).
    Fixed(u8),
}

impl fmt::Display for FairyStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sequential => write!(f, "sequential"),
            Self::Random => write!(f, "random"),
            Self::Shuffled => write!(f, "shuffled"),
            Self::Fixed(n) => write!(f, "{n}"),
        }
    }
}

/// Cap on how many boxes count toward the event chance bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSetting", into = "RawSetting")]
pub enum BoxLimit {
    /// Every box counts.
    Unlimited,
    /// At most this many boxes count.
    AtMost(u32),
}

impl BoxLimit {
    /// Apply the limit to a raw count.
    pub fn apply(self, count: u32) -> u32 {
        match self {
            Self::Unlimited => count,
            Self::AtMost(max) => count.min(max),
        }
    }
}

impl fmt::Display for BoxLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unlimited => write!(f, "unlimited"),
            Self::AtMost(n) => write!(f, "{n}"),
        }
    }
}

/// Settings that may be written either as a number or as a keyword.
#[doc(hidden)]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSetting {
    /// Written as a JSON number.
    Number(i64),
    /// Written as a JSON string.
    Text(String),
}

impl TryFrom<RawSetting> for FairyStyle {
    type Error = SimError;

    fn try_from(raw: RawSetting) -> SimResult<Self> {
        match raw {
            RawSetting::Number(n) if (1..=i64::from(STYLE_COUNT)).contains(&n) => {
                Ok(Self::Fixed(n as u8))
            }
            RawSetting::Number(n) => Err(SimError::StyleOutOfRange(n)),
            RawSetting::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "sequential" => Ok(Self::Sequential),
                "random" => Ok(Self::Random),
                "shuffled" => Ok(Self::Shuffled),
                other => match other.parse::<i64>() {
                    Ok(n) => Self::try_from(RawSetting::Number(n)),
                    Err(_) => Err(SimError::UnknownSetting(s)),
                },
            },
        }
    }
}

impl From<FairyStyle> for RawSetting {
    fn from(style: FairyStyle) -> Self {
        match style {
            FairyStyle::Fixed(n) => Self::Number(i64::from(n)),
            other => Self::Text(other.to_string()),
        }
    }
}

impl TryFrom<RawSetting> for BoxLimit {
    type Error = SimError;

    fn try_from(raw: RawSetting) -> SimResult<Self> {
        match raw {
            RawSetting::Number(-1) => Ok(Self::Unlimited),
            RawSetting::Number(n) => u32::try_from(n)
                .map(Self::AtMost)
                .map_err(|_| SimError::UnknownSetting(n.to_string())),
            RawSetting::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "unlimited" | "-1" => Ok(Self::Unlimited),
                other => other
                    .parse::<u32>()
                    .map(Self::AtMost)
                    .map_err(|_| SimError::UnknownSetting(s.clone())),
            },
        }
    }
}

impl From<BoxLimit> for RawSetting {
    fn from(limit: BoxLimit) -> Self {
        match limit {
            BoxLimit::Unlimited => Self::Number(-1),
            BoxLimit::AtMost(n) => Self::Number(i64::from(n)),
        }
    }
}

/// Configuration for the companion simulation and the crop fairy weighting.
///
/// Deserializes from the mod's JSON config file. Every field has a default,
/// and the mod's PascalCase key names are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoamerConfig {
    /// How companion styles are chosen.
    #[serde(alias = "FairyStyleID")]
    pub fairy_style: FairyStyle,
    /// Whether boxes influence the crop fairy event at all.
    #[serde(alias = "EnhancedCropFairy")]
    pub enhanced_crop_fairy: bool,
    /// Percentage points of event chance added per counted box.
    #[serde(alias = "CropFairyChancePerBox")]
    pub chance_per_box: f64,
    /// Boxes, summed over all structures, that count toward the chance bonus.
    #[serde(alias = "CropFairyMaxBoxes")]
    pub max_boxes: BoxLimit,
    /// Selection weight added per box near a candidate tile.
    #[serde(alias = "CropFairyWeightPerBox")]
    pub weight_per_box: f64,
    /// Boxes per structure that count toward selection weight.
    #[serde(alias = "CropFairyMaxWeightBoxes")]
    pub max_weight_boxes: u32,
    /// Companions spawned per structure (1-36).
    #[serde(alias = "FairySpawnCap")]
    pub spawn_cap: u32,
    /// Qualified item id counted as a resource unit.
    pub resource_item_id: String,
    /// Maximum event log size (oldest events dropped when exceeded). 0 = unlimited.
    pub max_events: usize,
    /// Motion tuning for every companion.
    pub steering: SteeringParams,
}

impl Default for RoamerConfig {
    fn default() -> Self {
        Self {
            fairy_style: FairyStyle::Shuffled,
            enhanced_crop_fairy: true,
            chance_per_box: 0.125,
            max_boxes: BoxLimit::AtMost(8),
            weight_per_box: 1.0,
            max_weight_boxes: MAX_SPAWN_CAP,
            spawn_cap: 8,
            resource_item_id: FAIRY_BOX_ITEM.to_string(),
            max_events: 500,
            steering: SteeringParams::default(),
        }
    }
}

impl RoamerConfig {
    /// Parse a JSON config, then clamp out-of-range values.
    pub fn from_json(json: &str) -> SimResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(SimError::Config)?;
        Ok(config.validated())
    }

    /// Clamp values the simulation cannot honour, logging each adjustment.
    pub fn validated(mut self) -> Self {
        let cap = self.spawn_cap.clamp(1, MAX_SPAWN_CAP);
        if cap != self.spawn_cap {
            tracing::warn!(
                requested = self.spawn_cap,
                used = cap,
                "spawn cap out of range"
            );
            self.spawn_cap = cap;
        }
        if let FairyStyle::Fixed(n) = self.fairy_style {
            let clamped = n.clamp(1, STYLE_COUNT);
            if clamped != n {
                tracing::warn!(requested = n, used = clamped, "fairy style out of range");
                self.fairy_style = FairyStyle::Fixed(clamped);
            }
        }
        if self.chance_per_box.is_nan() || self.chance_per_box < 0.0 {
            tracing::warn!(value = self.chance_per_box, "negative chance per box, using 0");
            self.chance_per_box = 0.0;
        }
        if self.weight_per_box.is_nan() || self.weight_per_box < 0.0 {
            tracing::warn!(value = self.weight_per_box, "negative weight per box, using 0");
            self.weight_per_box = 0.0;
        }
        self
    }

    /// Set how companion styles are chosen.
    pub fn with_style(mut self, style: FairyStyle) -> Self {
        self.fairy_style = style;
        self
    }

    /// Enable or disable the crop fairy weighting.
    pub fn with_enhanced_crop_fairy(mut self, enabled: bool) -> Self {
        self.enhanced_crop_fairy = enabled;
        self
    }

    /// Set the chance bonus per box, in percentage points.
    pub fn with_chance_per_box(mut self, percent: f64) -> Self {
        self.chance_per_box = percent;
        self
    }

    /// Set the global cap on boxes counted toward the chance bonus.
    pub fn with_max_boxes(mut self, limit: BoxLimit) -> Self {
        self.max_boxes = limit;
        self
    }

    /// Set the selection weight per box.
    pub fn with_weight_per_box(mut self, weight: f64) -> Self {
        self.weight_per_box = weight;
        self
    }

    /// Set the per-structure cap on boxes counted toward selection weight.
    pub fn with_max_weight_boxes(mut self, max: u32) -> Self {
        self.max_weight_boxes = max;
        self
    }

    /// Set companions per structure. Out-of-range values are kept as given
    /// and clamped to 1-36 by [`Self::validated`].
    pub fn with_spawn_cap(mut self, cap: u32) -> Self {
        self.spawn_cap = cap;
        self
    }

    /// Set the maximum event log size (0 = unlimited).
    pub fn with_max_events(mut self, max: usize) -> Self {
        self.max_events = max;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = RoamerConfig::default();
        assert_eq!(config.fairy_style, FairyStyle::Shuffled);
        assert!(config.enhanced_crop_fairy);
        assert!((config.chance_per_box - 0.125).abs() < f64::EPSILON);
        assert_eq!(config.max_boxes, BoxLimit::AtMost(8));
        assert_eq!(config.max_weight_boxes, 36);
        assert_eq!(config.spawn_cap, 8);
        assert_eq!(config.resource_item_id, "(TR)FairyBox");
    }

    #[test]
    fn config_builder_chain() {
        let config = RoamerConfig::default()
            .with_style(FairyStyle::Fixed(3))
            .with_spawn_cap(99)
            .with_max_boxes(BoxLimit::Unlimited)
            .with_weight_per_box(2.5);
        assert_eq!(config.fairy_style, FairyStyle::Fixed(3));
        assert_eq!(config.spawn_cap, 99);
        assert_eq!(config.max_boxes, BoxLimit::Unlimited);
        assert!((config.weight_per_box - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.validated().spawn_cap, 36);
        assert_eq!(RoamerConfig::default().with_spawn_cap(0).validated().spawn_cap, 1);
    }

    #[test]
    fn parses_pascal_case_key_names() {
        let json = r#"{
            "FairyStyleID": 4,
            "EnhancedCropFairy": false,
            "CropFairyChancePerBox": 0.25,
            "CropFairyMaxBoxes": -1,
            "CropFairyWeightPerBox": 2.0,
            "CropFairyMaxWeightBoxes": 12,
            "FairySpawnCap": 20
        }"#;
        let config = RoamerConfig::from_json(json).unwrap();
        assert_eq!(config.fairy_style, FairyStyle::Fixed(4));
        assert!(!config.enhanced_crop_fairy);
        assert_eq!(config.max_boxes, BoxLimit::Unlimited);
        assert_eq!(config.max_weight_boxes, 12);
        assert_eq!(config.spawn_cap, 20);
    }

    #[test]
    fn style_accepts_keywords_case_insensitively() {
        let config = RoamerConfig::from_json(r#"{"fairy_style": "Shuffled"}"#).unwrap();
        assert_eq!(config.fairy_style, FairyStyle::Shuffled);
        let config = RoamerConfig::from_json(r#"{"fairy_style": "sequential"}"#).unwrap();
        assert_eq!(config.fairy_style, FairyStyle::Sequential);
        let config = RoamerConfig::from_json(r#"{"fairy_style": "7"}"#).unwrap();
        assert_eq!(config.fairy_style, FairyStyle::Fixed(7));
    }

    #[test]
    fn style_out_of_range_is_rejected() {
        assert!(RoamerConfig::from_json(r#"{"fairy_style": 9}"#).is_err());
        assert!(RoamerConfig::from_json(r#"{"fairy_style": "sparkly"}"#).is_err());
    }

    #[test]
    fn box_limit_keywords() {
        let config = RoamerConfig::from_json(r#"{"max_boxes": "unlimited"}"#).unwrap();
        assert_eq!(config.max_boxes, BoxLimit::Unlimited);
        let config = RoamerConfig::from_json(r#"{"max_boxes": 3}"#).unwrap();
        assert_eq!(config.max_boxes, BoxLimit::AtMost(3));
        assert!(RoamerConfig::from_json(r#"{"max_boxes": -4}"#).is_err());
    }

    #[test]
    fn validation_clamps_spawn_cap_and_negatives() {
        let json = r#"{"spawn_cap": 0, "chance_per_box": -1.0, "weight_per_box": -3.0}"#;
        let config = RoamerConfig::from_json(json).unwrap();
        assert_eq!(config.spawn_cap, 1);
        assert_eq!(config.chance_per_box, 0.0);
        assert_eq!(config.weight_per_box, 0.0);
    }

    #[test]
    fn serializes_back_to_readable_values() {
        let config = RoamerConfig::default().with_style(FairyStyle::Fixed(2));
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["fairy_style"], 2);
        assert_eq!(value["max_boxes"], 8);
        let config = RoamerConfig::default().with_max_boxes(BoxLimit::Unlimited);
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["fairy_style"], "shuffled");
        assert_eq!(value["max_boxes"], -1);
    }

    #[test]
    fn box_limit_apply() {
        assert_eq!(BoxLimit::AtMost(8).apply(15), 8);
        assert_eq!(BoxLimit::AtMost(8).apply(3), 3);
        assert_eq!(BoxLimit::Unlimited.apply(15), 15);
    }
}
