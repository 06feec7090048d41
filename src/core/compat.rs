/// Phonetic compatibility scoring at the newest join.
///
/// Only the boundary between the text built so far and the candidate is
/// examined; earlier joins are never rescored. Penalties accumulate from 100
/// and floor at 0, then bonuses are added and the result is capped at 100.

use serde::Serialize;
use tracing::trace;

use crate::core::assembler::GenerationContext;
use crate::core::pairs::PairPenaltyTable;
use crate::schema::block::is_vowel;
use crate::schema::scoring::ScoringConfig;

const HARD_STOPS: &[char] = &['k', 'p', 't', 'g', 'b', 'd'];
const LIQUIDS_NASALS: &[char] = &['l', 'r', 'm', 'n'];
/// Letters whose echo across a join still reads smoothly.
const FLOWING: &[char] = &['l', 'r', 's', 'n', 'm', 'e', 'o'];
/// Final consonants that soften a following hard stop.
const CLUSTER_SOFTENERS: &[char] = &['l', 'r', 'm', 'n', 's'];
const AWKWARD_VOWEL_PAIRS: &[[char; 2]] = &[
    ['a', 'a'],
    ['i', 'i'],
    ['u', 'u'],
    ['a', 'o'],
    ['i', 'u'],
    ['o', 'e'],
    ['o', 'i'],
    ['u', 'a'],
    ['u', 'e'],
    ['u', 'i'],
    ['u', 'o'],
];
const SYLLABLE_ECHO_MAX: usize = 3;
const CLUSTER_SIDE: usize = 2;

/// A phonetic pattern detected at a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinPattern {
    DirectRepeat,
    AlternatingSequence,
    SyllableEcho,
    VowelEcho,
    TripleLetter,
    ConsonantCluster3,
    ConsonantCluster4Plus,
    VowelCluster3Plus,
    HardStopJoin,
    AwkwardVowelJoin,
    ClusterHardStop,
    SmoothTransition,
    PairPenalty,
}

/// One detected pattern and the signed score adjustment it produced.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JoinFinding {
    pub pattern: JoinPattern,
    pub adjustment: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompatibilityReport {
    pub score: f64,
    pub findings: Vec<JoinFinding>,
}

impl CompatibilityReport {
    pub fn has(&self, pattern: JoinPattern) -> bool {
        self.findings.iter().any(|f| f.pattern == pattern)
    }

    pub fn adjustment(&self, pattern: JoinPattern) -> Option<f64> {
        self.findings
            .iter()
            .find(|f| f.pattern == pattern)
            .map(|f| f.adjustment)
    }
}

/// Scores candidates against a context using a config and pair table.
#[derive(Debug, Clone, Copy)]
pub struct CompatibilityScorer<'a> {
    config: &'a ScoringConfig,
    pairs: &'a PairPenaltyTable,
}

impl<'a> CompatibilityScorer<'a> {
    pub fn new(config: &'a ScoringConfig, pairs: &'a PairPenaltyTable) -> Self {
        Self { config, pairs }
    }

    pub fn score(&self, context: &GenerationContext, candidate: &str) -> f64 {
        self.report(context, candidate).score
    }

    pub fn report(&self, context: &GenerationContext, candidate: &str) -> CompatibilityReport {
        let built: Vec<char> = lower_chars(context.text());
        let last_block: Vec<char> = context.last_block().map(lower_chars).unwrap_or_default();
        let next: Vec<char> = lower_chars(candidate);

        let (Some(&tail), Some(&head)) = (built.last(), next.first()) else {
            let score = if next.is_empty() { 0.0 } else { 100.0 };
            return CompatibilityReport {
                score,
                findings: Vec::new(),
            };
        };

        let rep = &self.config.repetition;
        let bnd = &self.config.boundary;
        let joins = &self.config.joins;
        let mut penalties = Vec::new();

        if next == last_block {
            penalties.push((JoinPattern::DirectRepeat, rep.direct_block));
        } else if is_alternating(&built, &next) {
            penalties.push((JoinPattern::AlternatingSequence, rep.sequence));
        }

        if let Some(overlap) = syllable_echo(&last_block, &next) {
            let penalty = if overlap.iter().all(|c| FLOWING.contains(c)) {
                rep.syllable * rep.syllable_common_multiplier
            } else {
                rep.syllable
            };
            penalties.push((JoinPattern::SyllableEcho, penalty));
        }

        let last_vowel = last_block.iter().rev().copied().find(|&c| is_vowel(c));
        let first_vowel = next.iter().copied().find(|&c| is_vowel(c));
        if last_vowel.is_some() && last_vowel == first_vowel {
            penalties.push((JoinPattern::VowelEcho, rep.vowel_across_boundary));
        }

        if tail == head
            && (built.len() >= 2 && built[built.len() - 2] == tail || next.get(1) == Some(&head))
        {
            let penalty = if FLOWING.contains(&tail) {
                rep.triple_letter * rep.triple_letter_common_multiplier
            } else {
                rep.triple_letter
            };
            penalties.push((JoinPattern::TripleLetter, penalty));
        }

        let (consonant_run, vowel_run) = boundary_runs(&built, &next);
        if consonant_run >= 4 {
            penalties.push((JoinPattern::ConsonantCluster4Plus, bnd.consonants_4plus));
        } else if consonant_run == 3 {
            penalties.push((JoinPattern::ConsonantCluster3, bnd.consonants_3));
        }
        if vowel_run >= 3 {
            penalties.push((JoinPattern::VowelCluster3Plus, bnd.vowels_3plus));
        }

        if HARD_STOPS.contains(&tail) && HARD_STOPS.contains(&head) {
            penalties.push((JoinPattern::HardStopJoin, joins.hard_stop_join));
        }

        if AWKWARD_VOWEL_PAIRS.contains(&[tail, head]) {
            penalties.push((JoinPattern::AwkwardVowelJoin, joins.awkward_vowel_join));
        }

        if built.len() >= 2
            && is_consonant(built[built.len() - 2])
            && is_consonant(tail)
            && !CLUSTER_SOFTENERS.contains(&tail)
            && HARD_STOPS.contains(&head)
        {
            penalties.push((JoinPattern::ClusterHardStop, joins.cluster_hard_stop));
        }

        if let Some(difficulty) = self.pairs.lookup(tail, head) {
            let penalty = difficulty * self.config.pair_penalty_factor;
            if penalty > 0.0 {
                penalties.push((JoinPattern::PairPenalty, penalty));
            }
        }

        let mut findings: Vec<JoinFinding> = penalties
            .into_iter()
            .map(|(pattern, penalty)| JoinFinding {
                pattern,
                adjustment: -penalty,
            })
            .collect();
        let penalised = (100.0 + findings.iter().map(|f| f.adjustment).sum::<f64>()).max(0.0);

        let mut bonus = 0.0;
        if LIQUIDS_NASALS.contains(&tail) && is_vowel(head) {
            bonus += joins.smooth_transition_bonus;
            findings.push(JoinFinding {
                pattern: JoinPattern::SmoothTransition,
                adjustment: joins.smooth_transition_bonus,
            });
        }
        let score = (penalised + bonus).min(100.0);

        for finding in &findings {
            trace!(
                built = %context.text(),
                candidate = candidate,
                pattern = ?finding.pattern,
                adjustment = finding.adjustment,
                "Join pattern"
            );
        }

        CompatibilityReport { score, findings }
    }
}

fn lower_chars(text: &str) -> Vec<char> {
    text.chars().flat_map(char::to_lowercase).collect()
}

fn is_consonant(c: char) -> bool {
    c.is_alphabetic() && !is_vowel(c)
}

/// `..AB` followed by `AB..` with `A != B`.
fn is_alternating(built: &[char], next: &[char]) -> bool {
    match (built, next) {
        ([.., a, b], [c, d, ..]) => a != b && a == c && b == d,
        _ => false,
    }
}

/// Shortest tail of `last` (1..=3 letters) that reappears as the head of `next`.
fn syllable_echo<'n>(last: &[char], next: &'n [char]) -> Option<&'n [char]> {
    let limit = SYLLABLE_ECHO_MAX.min(last.len()).min(next.len());
    (1..=limit)
        .find(|&len| last[last.len() - len..] == next[..len])
        .map(|len| &next[..len])
}

/// Longest consonant and vowel runs in the window of up to two letters
/// either side of the join.
fn boundary_runs(built: &[char], next: &[char]) -> (usize, usize) {
    let start = built.len().saturating_sub(CLUSTER_SIDE);
    let end = next.len().min(CLUSTER_SIDE);
    let window = built[start..].iter().chain(&next[..end]);

    let (mut consonants, mut vowels) = (0, 0);
    let (mut max_consonants, mut max_vowels) = (0, 0);
    for &c in window {
        if is_vowel(c) {
            vowels += 1;
            consonants = 0;
        } else if c.is_alphabetic() {
            consonants += 1;
            vowels = 0;
        } else {
            consonants = 0;
            vowels = 0;
        }
        max_consonants = max_consonants.max(consonants);
        max_vowels = max_vowels.max(vowels);
    }
    (max_consonants, max_vowels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn context(blocks: &[&str]) -> GenerationContext {
        let mut ctx = GenerationContext::new();
        for b in blocks {
            ctx.push(b);
        }
        ctx
    }

    fn report(blocks: &[&str], candidate: &str) -> CompatibilityReport {
        let config = ScoringConfig::default();
        let pairs = PairPenaltyTable::new();
        CompatibilityScorer::new(&config, &pairs).report(&context(blocks), candidate)
    }

    #[test]
    fn empty_context_is_perfect() {
        let r = report(&[], "thor");
        assert_eq!(r.score, 100.0);
        assert!(r.findings.is_empty());
    }

    #[test]
    fn direct_repeat_detected() {
        let r = report(&["an"], "an");
        assert!(r.has(JoinPattern::DirectRepeat));
        assert!(!r.has(JoinPattern::AlternatingSequence));
        assert!(r.score <= 15.0);
    }

    #[test]
    fn alternating_sequence_detected() {
        let r = report(&["dera"], "rath");
        assert!(r.has(JoinPattern::AlternatingSequence));
        assert!(r.has(JoinPattern::SyllableEcho));
    }

    #[test]
    fn syllable_echo_softened_for_flowing_letters() {
        let r = report(&["mel"], "lor");
        assert_eq!(r.adjustment(JoinPattern::SyllableEcho), Some(-16.0));
        let hard = report(&["dak"], "kar");
        assert_eq!(hard.adjustment(JoinPattern::SyllableEcho), Some(-80.0));
    }

    #[test]
    fn triple_letter_outweighs_cluster() {
        let r = report(&["ell"], "la");
        let triple = r.adjustment(JoinPattern::TripleLetter).unwrap();
        let cluster = r.adjustment(JoinPattern::ConsonantCluster3).unwrap();
        assert!((triple + 59.5).abs() < 1e-9, "{triple}");
        assert!(triple.abs() > cluster.abs());
    }

    #[test]
    fn triple_letter_full_penalty_for_hard_letters() {
        let r = report(&["akk"], "ka");
        assert_eq!(r.adjustment(JoinPattern::TripleLetter), Some(-85.0));
        let soft = report(&["ass"], "sa");
        let triple = soft.adjustment(JoinPattern::TripleLetter).unwrap();
        assert!((triple + 59.5).abs() < 1e-9, "{triple}");
    }

    #[test]
    fn four_consonants_replace_three() {
        let r = report(&["arnk"], "stra");
        assert!(r.has(JoinPattern::ConsonantCluster4Plus));
        assert!(!r.has(JoinPattern::ConsonantCluster3));
    }

    #[test]
    fn vowel_cluster_detected() {
        let r = report(&["lia"], "eon");
        assert!(r.has(JoinPattern::VowelCluster3Plus));
    }

    #[test]
    fn hard_stop_join() {
        let r = report(&["dak"], "tor");
        assert!(r.has(JoinPattern::HardStopJoin));
        assert!(!r.has(JoinPattern::ClusterHardStop));
        assert_eq!(r.score, 80.0);
    }

    #[test]
    fn cluster_then_hard_stop() {
        let r = report(&["kelt"], "gar");
        assert!(r.has(JoinPattern::ClusterHardStop));
        let softened = report(&["gorn"], "dak");
        assert!(!softened.has(JoinPattern::ClusterHardStop));
    }

    #[test]
    fn awkward_vowel_pair() {
        let r = report(&["thu"], "ara");
        assert!(r.has(JoinPattern::AwkwardVowelJoin));
        assert_eq!(r.score, 50.0);
    }

    #[test]
    fn vowel_echo_uses_last_and_first_vowels() {
        let r = report(&["bren"], "thel");
        assert!(r.has(JoinPattern::VowelEcho));
        let none = report(&["bran"], "thel");
        assert!(!none.has(JoinPattern::VowelEcho));
    }

    #[test]
    fn smooth_transition_bonus_is_capped() {
        let r = report(&["mar"], "ion");
        assert!(r.has(JoinPattern::SmoothTransition));
        assert_eq!(r.score, 100.0);
    }

    #[test]
    fn bonus_applies_after_floor() {
        let r = report(&["an"], "an");
        // Penalties exceed 100, so only the bonus remains.
        assert_eq!(r.score, 15.0);
    }

    #[test]
    fn pair_table_scaled_by_factor() {
        let config = ScoringConfig::default();
        let mut pairs = PairPenaltyTable::new();
        pairs.insert("rk", 0.5).unwrap();
        let r = CompatibilityScorer::new(&config, &pairs).report(&context(&["mar"]), "kan");
        assert_eq!(r.adjustment(JoinPattern::PairPenalty), Some(-50.0));
        assert!(r.has(JoinPattern::VowelEcho));
        assert_eq!(r.score, 30.0);
    }

    #[test]
    fn join_uses_whole_built_text() {
        let r = report(&["ael", "an"], "dor");
        assert!(!r.has(JoinPattern::DirectRepeat));
        assert!(!r.has(JoinPattern::HardStopJoin));
    }

    #[test]
    fn case_insensitive() {
        let r = report(&["Dak"], "Kar");
        assert!(r.has(JoinPattern::SyllableEcho));
    }

    proptest! {
        #[test]
        fn score_stays_in_bounds(prev in "[a-z]{1,6}", next in "[a-z]{1,6}") {
            let r = report(&[prev.as_str()], &next);
            prop_assert!((0.0..=100.0).contains(&r.score));
        }
    }
}
