/// Block-count selection: two or three blocks per name.

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::schema::request::BlockCount;

/// Weights used when the request allows no explicit counts.
const DEFAULT_WEIGHTS: [(BlockCount, u32); 2] = [(BlockCount::Two, 5), (BlockCount::Three, 4)];

/// Pick a count uniformly from `allowed`, so repetition encodes weight.
///
/// An empty list falls back to 2:3 weighted 5:4.
pub fn choose(allowed: &[BlockCount], rng: &mut StdRng) -> BlockCount {
    if let Some(&count) = allowed.choose(rng) {
        return count;
    }
    WeightedIndex::new(DEFAULT_WEIGHTS.iter().map(|&(_, w)| w))
        .map(|dist| DEFAULT_WEIGHTS[dist.sample(rng)].0)
        .unwrap_or(BlockCount::Two)
}
