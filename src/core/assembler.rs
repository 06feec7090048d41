/// Per-name assembly: count → prefix → [middle] → suffix → capitalised text.

use rand::rngs::StdRng;
use rand::Rng;
use serde::Serialize;

use crate::core::block_count;
use crate::core::catalog::WordBlockCatalog;
use crate::core::generator::GenerationError;
use crate::core::pairs::PairPenaltyTable;
use crate::core::selector::{CandidateSelector, Selection};
use crate::schema::block::Role;
use crate::schema::request::{BlockCount, GenerationRequest, VowelFirst};

/// Blocks chosen so far for the name being built.
///
/// Created fresh for every name and dropped once it is assembled.
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    blocks: Vec<String>,
    text: String,
}

impl GenerationContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, block: &str) {
        self.text.push_str(block);
        self.blocks.push(block.to_string());
    }

    /// Concatenated text of every chosen block.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn last_block(&self) -> Option<&str> {
        self.blocks.last().map(String::as_str)
    }

    pub fn blocks(&self) -> &[String] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Character offsets where one block ends and the next begins.
    pub fn boundaries(&self) -> Vec<usize> {
        let mut offset = 0;
        let mut boundaries = Vec::with_capacity(self.blocks.len().saturating_sub(1));
        for block in self.blocks.iter().take(self.blocks.len().saturating_sub(1)) {
            offset += block.chars().count();
            boundaries.push(offset);
        }
        boundaries
    }
}

/// Scores of the block chosen for one role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlockScore {
    pub role: Role,
    pub text: String,
    pub vibe_score: f64,
    pub compat_score: f64,
    pub final_score: f64,
    pub forced: bool,
}

impl BlockScore {
    fn from_selection(role: Role, selection: &Selection<'_>) -> Self {
        let c = &selection.candidate;
        Self {
            role,
            text: c.block.text.clone(),
            vibe_score: c.vibe_score,
            compat_score: c.compat_score,
            final_score: c.final_score,
            forced: selection.forced,
        }
    }
}

/// A capitalised name before post-processing.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledName {
    pub text: String,
    pub block_count: BlockCount,
    pub blocks: Vec<String>,
    pub boundaries: Vec<usize>,
    pub scores: Vec<BlockScore>,
}

pub struct NameAssembler<'a> {
    catalog: &'a dyn WordBlockCatalog,
    selector: CandidateSelector<'a>,
    request: &'a GenerationRequest,
    theme: &'a str,
}

impl<'a> NameAssembler<'a> {
    /// `theme` must already be resolved against the catalog.
    pub fn new(
        catalog: &'a dyn WordBlockCatalog,
        pairs: &'a PairPenaltyTable,
        request: &'a GenerationRequest,
        theme: &'a str,
    ) -> Self {
        Self {
            catalog,
            selector: CandidateSelector::new(&request.scoring, pairs),
            request,
            theme,
        }
    }

    pub fn assemble(&self, rng: &mut StdRng) -> Result<AssembledName, GenerationError> {
        let block_count = block_count::choose(&self.request.block_counts, rng);
        let vowel_first = match self.request.vowel_first {
            VowelFirst::Forced(forced) => forced,
            VowelFirst::Probability(p) => rng.gen::<f64>() < p,
        };

        let roles: &[Role] = match block_count {
            BlockCount::Two => &[Role::Prefix, Role::Suffix],
            BlockCount::Three => &[Role::Prefix, Role::Middle, Role::Suffix],
        };

        let mut context = GenerationContext::new();
        let mut scores = Vec::with_capacity(roles.len());
        for &role in roles {
            let pool = self.catalog.blocks_for(self.theme, role);
            let eligible = pool
                .iter()
                .filter(|b| role != Role::Prefix || !vowel_first || b.starts_with_vowel());
            let selection = self
                .selector
                .choose(eligible, &self.request.vibe, &context, rng)
                .ok_or_else(|| GenerationError::EmptyPool {
                    theme: self.theme.to_string(),
                    role,
                })?;
            scores.push(BlockScore::from_selection(role, &selection));
            context.push(&selection.candidate.block.text);
        }

        Ok(AssembledName {
            text: capitalize_first(context.text()),
            block_count,
            boundaries: context.boundaries(),
            blocks: context.blocks().to_vec(),
            scores,
        })
    }
}

pub(crate) fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
