/// Generation requests: what the caller asks a name to look and sound like.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::block::VibeScale;
use crate::schema::scoring::ScoringConfig;

/// Precondition violations found by `validate()`.
///
/// The engine refuses such requests instead of correcting them; clamping
/// belongs to the caller-facing boundary (`crate::api`).
#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("scoring weights must be non-negative and sum to 1.0 (vibe {vibe}, compatibility {compatibility})")]
    Weights { vibe: f64, compatibility: f64 },
    #[error("top_n_candidates must be at least 1")]
    ZeroTopN,
    #[error("low_score_threshold {0} is outside 0..=100")]
    Threshold(f64),
    #[error("{scale} range {min}..={max} is invalid (expected 1 <= min <= max <= 10)")]
    Range {
        scale: &'static str,
        min: u8,
        max: u8,
    },
    #[error("{field} probability {value} is outside 0..=1")]
    Probability { field: &'static str, value: f64 },
    #[error("{0} must be a finite, non-negative number")]
    NegativePenalty(&'static str),
    #[error("block count {0} is not supported (expected 2 or 3)")]
    BlockCount(u8),
    #[error("requested name count must be at least 1")]
    ZeroCount,
    #[error("theme name is empty")]
    EmptyTheme,
}

/// Inclusive target range on one vibe scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibeRange {
    pub min: u8,
    pub max: u8,
}

impl VibeRange {
    pub const FULL: VibeRange = VibeRange {
        min: VibeScale::MIN,
        max: VibeScale::MAX,
    };

    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, rating: u8) -> bool {
        (self.min..=self.max).contains(&rating)
    }

    /// Distance from `rating` to the nearest bound, zero when inside.
    pub fn distance(&self, rating: u8) -> u8 {
        if rating < self.min {
            self.min - rating
        } else if rating > self.max {
            rating - self.max
        } else {
            0
        }
    }

    fn is_valid(&self) -> bool {
        VibeScale::MIN <= self.min && self.min <= self.max && self.max <= VibeScale::MAX
    }
}

impl Default for VibeRange {
    fn default() -> Self {
        Self::FULL
    }
}

/// Requested ranges on all five vibe scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VibeTarget {
    pub good_evil: VibeRange,
    pub elegant_rough: VibeRange,
    pub common_exotic: VibeRange,
    pub weak_powerful: VibeRange,
    pub fem_masc: VibeRange,
}

impl VibeTarget {
    pub fn get(&self, scale: VibeScale) -> VibeRange {
        match scale {
            VibeScale::GoodEvil => self.good_evil,
            VibeScale::ElegantRough => self.elegant_rough,
            VibeScale::CommonExotic => self.common_exotic,
            VibeScale::WeakPowerful => self.weak_powerful,
            VibeScale::FemMasc => self.fem_masc,
        }
    }

    pub fn set(&mut self, scale: VibeScale, range: VibeRange) {
        let slot = match scale {
            VibeScale::GoodEvil => &mut self.good_evil,
            VibeScale::ElegantRough => &mut self.elegant_rough,
            VibeScale::CommonExotic => &mut self.common_exotic,
            VibeScale::WeakPowerful => &mut self.weak_powerful,
            VibeScale::FemMasc => &mut self.fem_masc,
        };
        *slot = range;
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        for scale in VibeScale::ALL {
            let range = self.get(scale);
            if !range.is_valid() {
                return Err(RequestError::Range {
                    scale: scale.key(),
                    min: range.min,
                    max: range.max,
                });
            }
        }
        Ok(())
    }
}

/// Number of blocks in an assembled name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BlockCount {
    Two,
    Three,
}

impl BlockCount {
    pub fn get(&self) -> usize {
        match self {
            BlockCount::Two => 2,
            BlockCount::Three => 3,
        }
    }

    /// Expand per-count weights into the repetition list the chooser samples.
    ///
    /// `weighted(&[(Two, 2), (Three, 1)])` yields `[Two, Two, Three]`.
    pub fn weighted(weights: &[(BlockCount, u32)]) -> Vec<BlockCount> {
        weights
            .iter()
            .flat_map(|&(count, weight)| std::iter::repeat(count).take(weight as usize))
            .collect()
    }
}

impl TryFrom<u8> for BlockCount {
    type Error = RequestError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(BlockCount::Two),
            3 => Ok(BlockCount::Three),
            other => Err(RequestError::BlockCount(other)),
        }
    }
}

impl From<BlockCount> for u8 {
    fn from(count: BlockCount) -> u8 {
        count.get() as u8
    }
}

/// Whether the prefix pool is restricted to vowel-initial blocks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VowelFirst {
    /// Always (`true`) or never (`false`) restrict.
    Forced(bool),
    /// Restrict with this probability per name.
    Probability(f64),
}

impl Default for VowelFirst {
    fn default() -> Self {
        VowelFirst::Probability(0.2)
    }
}

/// Separator marks inserted by the special-feature pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureKind {
    Apostrophe,
    Hyphen,
    Space,
}

impl FeatureKind {
    pub const ALL: [FeatureKind; 3] = [FeatureKind::Apostrophe, FeatureKind::Hyphen, FeatureKind::Space];

    pub fn mark(&self) -> char {
        match self {
            FeatureKind::Apostrophe => '\'',
            FeatureKind::Hyphen => '-',
            FeatureKind::Space => ' ',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpecialFeatureSettings {
    pub probability: f64,
    pub max_count: u32,
    pub allowed: Vec<FeatureKind>,
}

impl SpecialFeatureSettings {
    pub fn allows(&self, kind: FeatureKind) -> bool {
        self.allowed.contains(&kind)
    }
}

impl Default for SpecialFeatureSettings {
    fn default() -> Self {
        Self {
            probability: 0.2,
            max_count: 1,
            allowed: Vec::new(),
        }
    }
}

/// Character substitutions applied by the modification pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModificationKind {
    Diacritic,
    Ligature,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModificationSettings {
    pub probability: f64,
    pub max_count: u32,
    pub allowed: Vec<ModificationKind>,
}

impl ModificationSettings {
    pub fn allows(&self, kind: ModificationKind) -> bool {
        self.allowed.contains(&kind)
    }
}

impl Default for ModificationSettings {
    fn default() -> Self {
        Self {
            probability: 0.2,
            max_count: 1,
            allowed: vec![ModificationKind::Diacritic, ModificationKind::Ligature],
        }
    }
}

/// Everything one generation call needs besides the block data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationRequest {
    pub theme: String,
    pub vibe: VibeTarget,
    /// Allowed counts; repetition encodes weight. Empty means 2:3 at 5:4.
    pub block_counts: Vec<BlockCount>,
    pub vowel_first: VowelFirst,
    pub special_features: SpecialFeatureSettings,
    pub modifications: ModificationSettings,
    pub scoring: ScoringConfig,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            theme: "default".to_string(),
            vibe: VibeTarget::default(),
            block_counts: vec![BlockCount::Two],
            vowel_first: VowelFirst::default(),
            special_features: SpecialFeatureSettings::default(),
            modifications: ModificationSettings::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl GenerationRequest {
    pub fn for_theme(theme: &str) -> Self {
        Self {
            theme: theme.to_string(),
            ..Self::default()
        }
    }

    pub fn range(mut self, scale: VibeScale, min: u8, max: u8) -> Self {
        self.vibe.set(scale, VibeRange::new(min, max));
        self
    }

    pub fn block_counts(mut self, counts: &[BlockCount]) -> Self {
        self.block_counts = counts.to_vec();
        self
    }

    pub fn vowel_first(mut self, vowel_first: VowelFirst) -> Self {
        self.vowel_first = vowel_first;
        self
    }

    pub fn special_features(mut self, settings: SpecialFeatureSettings) -> Self {
        self.special_features = settings;
        self
    }

    pub fn modifications(mut self, settings: ModificationSettings) -> Self {
        self.modifications = settings;
        self
    }

    pub fn scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    /// Check every precondition the engine relies on.
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.theme.trim().is_empty() {
            return Err(RequestError::EmptyTheme);
        }
        self.vibe.validate()?;
        if let VowelFirst::Probability(p) = self.vowel_first {
            check_probability("vowel_first", p)?;
        }
        check_probability("special_features", self.special_features.probability)?;
        check_probability("modifications", self.modifications.probability)?;
        self.scoring.validate()
    }
}

pub(crate) fn check_probability(field: &'static str, value: f64) -> Result<(), RequestError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(RequestError::Probability { field, value })
    }
}
