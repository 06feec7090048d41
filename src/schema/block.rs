/// Word blocks: the themed text fragments names are assembled from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Position a block fills inside an assembled name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Prefix,
    Middle,
    Suffix,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Prefix, Role::Middle, Role::Suffix];

    pub fn name(&self) -> &'static str {
        match self {
            Role::Prefix => "prefix",
            Role::Middle => "middle",
            Role::Suffix => "suffix",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One of the five 1–10 aesthetic axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VibeScale {
    GoodEvil,
    ElegantRough,
    CommonExotic,
    WeakPowerful,
    FemMasc,
}

impl VibeScale {
    /// Scales in the order ratings are written in data files.
    pub const ALL: [VibeScale; 5] = [
        VibeScale::GoodEvil,
        VibeScale::ElegantRough,
        VibeScale::CommonExotic,
        VibeScale::WeakPowerful,
        VibeScale::FemMasc,
    ];

    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// Snake-case key used in form fields and JSON.
    pub fn key(&self) -> &'static str {
        match self {
            VibeScale::GoodEvil => "good_evil",
            VibeScale::ElegantRough => "elegant_rough",
            VibeScale::CommonExotic => "common_exotic",
            VibeScale::WeakPowerful => "weak_powerful",
            VibeScale::FemMasc => "fem_masc",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            VibeScale::GoodEvil => 0,
            VibeScale::ElegantRough => 1,
            VibeScale::CommonExotic => 2,
            VibeScale::WeakPowerful => 3,
            VibeScale::FemMasc => 4,
        }
    }
}

/// A block's rating on every vibe scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibeProfile([u8; 5]);

impl VibeProfile {
    /// Build a profile, returning `None` if any rating is outside 1–10.
    pub fn new(ratings: [u8; 5]) -> Option<VibeProfile> {
        ratings
            .iter()
            .all(|r| (VibeScale::MIN..=VibeScale::MAX).contains(r))
            .then_some(VibeProfile(ratings))
    }

    pub fn get(&self, scale: VibeScale) -> u8 {
        self.0[scale.index()]
    }

    pub fn ratings(&self) -> [u8; 5] {
        self.0
    }
}

/// An immutable themed fragment with its role and vibe ratings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordBlock {
    pub text: String,
    pub role: Role,
    pub vibe: VibeProfile,
}

impl WordBlock {
    pub fn new(text: impl Into<String>, role: Role, vibe: VibeProfile) -> Self {
        Self {
            text: text.into(),
            role,
            vibe,
        }
    }

    /// Whether the block text begins with one of `a e i o u`.
    pub fn starts_with_vowel(&self) -> bool {
        self.text.chars().next().is_some_and(is_vowel)
    }
}

/// Vowel test used across scoring and post-processing.
///
/// Only `a e i o u` count; `y` is treated as a consonant.
pub fn is_vowel(c: char) -> bool {
    matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_rejects_out_of_range() {
        assert!(VibeProfile::new([1, 2, 3, 4, 10]).is_some());
        assert!(VibeProfile::new([0, 2, 3, 4, 5]).is_none());
        assert!(VibeProfile::new([1, 2, 3, 4, 11]).is_none());
    }

    #[test]
    fn profile_indexes_by_scale() {
        let p = VibeProfile::new([1, 2, 3, 4, 5]).unwrap();
        assert_eq!(p.get(VibeScale::GoodEvil), 1);
        assert_eq!(p.get(VibeScale::FemMasc), 5);
    }

    #[test]
    fn vowel_start_is_case_insensitive() {
        let p = VibeProfile::new([5; 5]).unwrap();
        assert!(WordBlock::new("Ael", Role::Prefix, p).starts_with_vowel());
        assert!(!WordBlock::new("yth", Role::Prefix, p).starts_with_vowel());
    }
}
