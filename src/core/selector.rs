/// Candidate scoring and selection for one block role.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::debug;

use crate::core::assembler::GenerationContext;
use crate::core::compat::CompatibilityScorer;
use crate::core::pairs::PairPenaltyTable;
use crate::core::vibe;
use crate::schema::block::WordBlock;
use crate::schema::request::VibeTarget;
use crate::schema::scoring::ScoringConfig;

/// A scored block, alive only for the duration of one selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate<'a> {
    pub block: &'a WordBlock,
    pub vibe_score: f64,
    pub compat_score: f64,
    pub final_score: f64,
}

/// The winning candidate and which branch picked it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Selection<'a> {
    pub candidate: Candidate<'a>,
    /// True when the best score fell below the threshold and the top
    /// candidate was taken deterministically.
    pub forced: bool,
}

pub struct CandidateSelector<'a> {
    config: &'a ScoringConfig,
    compat: CompatibilityScorer<'a>,
}

impl<'a> CandidateSelector<'a> {
    pub fn new(config: &'a ScoringConfig, pairs: &'a PairPenaltyTable) -> Self {
        Self {
            config,
            compat: CompatibilityScorer::new(config, pairs),
        }
    }

    /// Score every block and sort descending by final score.
    ///
    /// The sort is stable, so catalog order breaks ties.
    pub fn score<'b, I>(
        &self,
        pool: I,
        target: &VibeTarget,
        context: &GenerationContext,
    ) -> Vec<Candidate<'b>>
    where
        I: IntoIterator<Item = &'b WordBlock>,
    {
        let mut candidates: Vec<Candidate<'b>> = pool
            .into_iter()
            .map(|block| {
                let vibe_score = vibe::score(&block.vibe, target);
                let compat_score = self.compat.score(context, &block.text);
                Candidate {
                    block,
                    vibe_score,
                    compat_score,
                    final_score: self.config.combine(vibe_score, compat_score),
                }
            })
            .collect();
        candidates.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));
        candidates
    }

    /// Score `pool` and pick a winner. `None` if the pool is empty.
    pub fn choose<'b, I>(
        &self,
        pool: I,
        target: &VibeTarget,
        context: &GenerationContext,
        rng: &mut StdRng,
    ) -> Option<Selection<'b>>
    where
        I: IntoIterator<Item = &'b WordBlock>,
    {
        let candidates = self.score(pool, target, context);
        select(&candidates, self.config, rng)
    }
}

/// Resolve a winner from candidates already sorted best-first.
///
/// Below `low_score_threshold` the top candidate wins outright; otherwise one
/// of the top `top_n_candidates` is drawn uniformly.
pub fn select<'b>(
    candidates: &[Candidate<'b>],
    config: &ScoringConfig,
    rng: &mut StdRng,
) -> Option<Selection<'b>> {
    let best = *candidates.first()?;
    if best.final_score < config.low_score_threshold {
        debug!(
            block = %best.block.text,
            score = best.final_score,
            threshold = config.low_score_threshold,
            "Best candidate below threshold, taking it deterministically"
        );
        return Some(Selection {
            candidate: best,
            forced: true,
        });
    }
    let pool_size = config.top_n_candidates.min(candidates.len());
    candidates[..pool_size]
        .choose(rng)
        .map(|&candidate| Selection {
            candidate,
            forced: false,
        })
}
