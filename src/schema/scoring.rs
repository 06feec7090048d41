/// Scoring parameters: weights, selection knobs and penalty magnitudes.

use serde::{Deserialize, Serialize};

use crate::schema::request::RequestError;

/// Penalties for repeated material across the join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepetitionPenalties {
    pub direct_block: f64,
    pub sequence: f64,
    pub syllable: f64,
    pub vowel_across_boundary: f64,
    pub triple_letter: f64,
    /// Scales `triple_letter` when the tripled letter is in `l r s n m e o`.
    pub triple_letter_common_multiplier: f64,
    /// Scales `syllable` when the echoed letters are all in `l r s n m e o`.
    pub syllable_common_multiplier: f64,
}

impl Default for RepetitionPenalties {
    fn default() -> Self {
        Self {
            direct_block: 75.0,
            sequence: 55.0,
            syllable: 80.0,
            vowel_across_boundary: 20.0,
            triple_letter: 85.0,
            triple_letter_common_multiplier: 0.7,
            syllable_common_multiplier: 0.2,
        }
    }
}

/// Penalties for long consonant or vowel runs spanning the join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundaryPenalties {
    pub consonants_3: f64,
    pub consonants_4plus: f64,
    pub vowels_3plus: f64,
}

impl Default for BoundaryPenalties {
    fn default() -> Self {
        Self {
            consonants_3: 50.0,
            consonants_4plus: 80.0,
            vowels_3plus: 50.0,
        }
    }
}

/// Flow adjustments for the two characters meeting at the join.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JoinPenalties {
    pub hard_stop_join: f64,
    pub awkward_vowel_join: f64,
    pub cluster_hard_stop: f64,
    /// Added, not subtracted.
    pub smooth_transition_bonus: f64,
}

impl Default for JoinPenalties {
    fn default() -> Self {
        Self {
            hard_stop_join: 20.0,
            awkward_vowel_join: 50.0,
            cluster_hard_stop: 50.0,
            smooth_transition_bonus: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weight_vibe: f64,
    pub weight_compatibility: f64,
    pub top_n_candidates: usize,
    /// Below this best score, selection picks the top candidate outright.
    pub low_score_threshold: f64,
    pub repetition: RepetitionPenalties,
    pub boundary: BoundaryPenalties,
    pub joins: JoinPenalties,
    /// Multiplies pair-table difficulty factors (which lie in 0..=1).
    pub pair_penalty_factor: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weight_vibe: 0.4,
            weight_compatibility: 0.6,
            top_n_candidates: 20,
            low_score_threshold: 60.0,
            repetition: RepetitionPenalties::default(),
            boundary: BoundaryPenalties::default(),
            joins: JoinPenalties::default(),
            pair_penalty_factor: 100.0,
        }
    }
}

const WEIGHT_TOLERANCE: f64 = 1e-6;

impl ScoringConfig {
    /// Combine component scores with the configured weights, clamped to `0..=100`.
    pub fn combine(&self, vibe_score: f64, compat_score: f64) -> f64 {
        (self.weight_vibe * vibe_score + self.weight_compatibility * compat_score).clamp(0.0, 100.0)
    }

    pub fn validate(&self) -> Result<(), RequestError> {
        let (vibe, compatibility) = (self.weight_vibe, self.weight_compatibility);
        if !(vibe >= 0.0 && compatibility >= 0.0)
            || (vibe + compatibility - 1.0).abs() > WEIGHT_TOLERANCE
        {
            return Err(RequestError::Weights { vibe, compatibility });
        }
        if self.top_n_candidates == 0 {
            return Err(RequestError::ZeroTopN);
        }
        if !(0.0..=100.0).contains(&self.low_score_threshold) {
            return Err(RequestError::Threshold(self.low_score_threshold));
        }
        for (name, value) in self.magnitudes() {
            if !value.is_finite() || value < 0.0 {
                return Err(RequestError::NegativePenalty(name));
            }
        }
        Ok(())
    }

    /// Every named penalty/bonus magnitude, keyed by its form field name.
    pub fn magnitudes(&self) -> [(&'static str, f64); 15] {
        let r = &self.repetition;
        let b = &self.boundary;
        let j = &self.joins;
        [
            ("penalty_repetition_direct_block", r.direct_block),
            ("penalty_repetition_sequence", r.sequence),
            ("penalty_repetition_syllable", r.syllable),
            ("penalty_repetition_vowel_across_boundary", r.vowel_across_boundary),
            ("penalty_repetition_triple_letter", r.triple_letter),
            (
                "penalty_repetition_triple_letter_common_multiplier",
                r.triple_letter_common_multiplier,
            ),
            ("penalty_repetition_syllable_common_multiplier", r.syllable_common_multiplier),
            ("penalty_boundary_consonants_3", b.consonants_3),
            ("penalty_boundary_consonants_4plus", b.consonants_4plus),
            ("penalty_boundary_vowels_3plus", b.vowels_3plus),
            ("penalty_boundary_hard_stop_join", j.hard_stop_join),
            ("penalty_boundary_awkward_vowel_join", j.awkward_vowel_join),
            ("penalty_boundary_cluster_hard_stop", j.cluster_hard_stop),
            ("bonus_smooth_transition", j.smooth_transition_bonus),
            ("pair_penalty_factor", self.pair_penalty_factor),
        ]
    }

    /// Mutable access to a magnitude by form field name.
    pub fn magnitude_mut(&mut self, name: &str) -> Option<&mut f64> {
        let slot = match name {
            "penalty_repetition_direct_block" => &mut self.repetition.direct_block,
            "penalty_repetition_sequence" => &mut self.repetition.sequence,
            "penalty_repetition_syllable" => &mut self.repetition.syllable,
            "penalty_repetition_vowel_across_boundary" => &mut self.repetition.vowel_across_boundary,
            "penalty_repetition_triple_letter" => &mut self.repetition.triple_letter,
            "penalty_repetition_triple_letter_common_multiplier" => {
                &mut self.repetition.triple_letter_common_multiplier
            }
            "penalty_repetition_syllable_common_multiplier" => {
                &mut self.repetition.syllable_common_multiplier
            }
            "penalty_boundary_consonants_3" => &mut self.boundary.consonants_3,
            "penalty_boundary_consonants_4plus" => &mut self.boundary.consonants_4plus,
            "penalty_boundary_vowels_3plus" => &mut self.boundary.vowels_3plus,
            "penalty_boundary_hard_stop_join" => &mut self.joins.hard_stop_join,
            "penalty_boundary_awkward_vowel_join" => &mut self.joins.awkward_vowel_join,
            "penalty_boundary_cluster_hard_stop" => &mut self.joins.cluster_hard_stop,
            "bonus_smooth_transition" => &mut self.joins.smooth_transition_bonus,
            "pair_penalty_factor" => &mut self.pair_penalty_factor,
            _ => return None,
        };
        Some(slot)
    }
}
