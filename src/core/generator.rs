/// The top-level name generator: request → assembled, decorated names.
///
/// Wires together theme resolution, block assembly and post-processing.
/// The generator itself holds only read-only data, so one instance can serve
/// any number of concurrent requests; every name gets its own context.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use crate::core::assembler::{BlockScore, NameAssembler};
use crate::core::catalog::{BlockCatalog, CatalogError, WordBlockCatalog};
use crate::core::pairs::{PairPenaltyTable, PairTableError};
use crate::core::postprocess::PostProcessor;
use crate::schema::block::Role;
use crate::schema::request::{GenerationRequest, RequestError};

/// Theme used when a request names one the catalog doesn't have.
pub const DEFAULT_THEME: &str = "default";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no eligible {role} blocks for theme '{theme}'")]
    EmptyPool { theme: String, role: Role },
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] RequestError),
    #[error("catalog error: {0}")]
    Catalog(#[from] CatalogError),
    #[error("pair table error: {0}")]
    PairTable(#[from] PairTableError),
}

/// A generated name with the selection details behind it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedName {
    pub name: String,
    pub blocks: Vec<String>,
    pub block_count: usize,
    pub scores: Vec<BlockScore>,
    pub average_score: f64,
    pub lowest_score: f64,
    /// True when the weakest block scored below the low-score threshold.
    pub was_forced: bool,
}

/// Built via `NameGenerator::builder()`.
#[derive(Clone)]
pub struct NameGenerator {
    catalog: Arc<dyn WordBlockCatalog>,
    pairs: Arc<PairPenaltyTable>,
}

/// Builder for constructing a `NameGenerator`.
#[derive(Default)]
pub struct NameGeneratorBuilder {
    themes_dir: Option<PathBuf>,
    pair_penalties_path: Option<PathBuf>,
    /// Directly provided catalog (for testing without files).
    catalog: Option<Arc<dyn WordBlockCatalog>>,
    /// Directly provided pair table (for testing without files).
    pairs: Option<Arc<PairPenaltyTable>>,
}

impl NameGenerator {
    pub fn builder() -> NameGeneratorBuilder {
        NameGeneratorBuilder::default()
    }

    pub fn new(catalog: Arc<dyn WordBlockCatalog>, pairs: Arc<PairPenaltyTable>) -> Self {
        Self { catalog, pairs }
    }

    pub fn catalog(&self) -> &dyn WordBlockCatalog {
        self.catalog.as_ref()
    }

    pub fn pairs(&self) -> &PairPenaltyTable {
        &self.pairs
    }

    /// The requested theme if the catalog has it, else `default`.
    pub fn resolve_theme<'r>(&self, theme: &'r str) -> Result<&'r str, GenerationError> {
        if self.catalog.has_theme(theme) {
            return Ok(theme);
        }
        if self.catalog.has_theme(DEFAULT_THEME) {
            warn!(requested = theme, fallback = DEFAULT_THEME, "Unknown theme, falling back");
            return Ok(DEFAULT_THEME);
        }
        Err(CatalogError::UnknownTheme(theme.to_string()).into())
    }

    /// Generate a single name.
    pub fn generate_one(
        &self,
        request: &GenerationRequest,
        rng: &mut StdRng,
    ) -> Result<String, GenerationError> {
        self.generate_detailed(request, rng).map(|g| g.name)
    }

    /// Generate `count` independent names. Duplicates are not filtered.
    pub fn generate_many(
        &self,
        request: &GenerationRequest,
        count: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<String>, GenerationError> {
        if count == 0 {
            return Err(RequestError::ZeroCount.into());
        }
        request.validate()?;
        let theme = self.resolve_theme(&request.theme)?;
        (0..count)
            .map(|_| self.generate_validated(request, theme, rng).map(|g| g.name))
            .collect()
    }

    /// Generate one name along with its per-block scores.
    pub fn generate_detailed(
        &self,
        request: &GenerationRequest,
        rng: &mut StdRng,
    ) -> Result<GeneratedName, GenerationError> {
        request.validate()?;
        let theme = self.resolve_theme(&request.theme)?;
        self.generate_validated(request, theme, rng)
    }

    /// `generate_one` with a fresh RNG seeded from `seed`.
    pub fn generate_one_seeded(
        &self,
        request: &GenerationRequest,
        seed: u64,
    ) -> Result<String, GenerationError> {
        self.generate_one(request, &mut StdRng::seed_from_u64(seed))
    }

    /// `generate_many` with a fresh RNG seeded from `seed`.
    pub fn generate_many_seeded(
        &self,
        request: &GenerationRequest,
        count: usize,
        seed: u64,
    ) -> Result<Vec<String>, GenerationError> {
        self.generate_many(request, count, &mut StdRng::seed_from_u64(seed))
    }

    fn generate_validated(
        &self,
        request: &GenerationRequest,
        theme: &str,
        rng: &mut StdRng,
    ) -> Result<GeneratedName, GenerationError> {
        let assembled =
            NameAssembler::new(self.catalog.as_ref(), &self.pairs, request, theme).assemble(rng)?;
        let name = PostProcessor::new(&request.special_features, &request.modifications).apply(
            &assembled.text,
            &assembled.boundaries,
            rng,
        );

        let finals: Vec<f64> = assembled.scores.iter().map(|s| s.final_score).collect();
        let lowest_score = finals.iter().copied().fold(f64::INFINITY, f64::min);
        let average_score = finals.iter().sum::<f64>() / finals.len().max(1) as f64;

        Ok(GeneratedName {
            name,
            block_count: assembled.block_count.get(),
            blocks: assembled.blocks,
            scores: assembled.scores,
            average_score,
            lowest_score,
            was_forced: lowest_score < request.scoring.low_score_threshold,
        })
    }
}

impl NameGeneratorBuilder {
    /// Directory holding `<theme>/blocks.ron` files.
    pub fn themes_dir(mut self, path: impl AsRef<Path>) -> Self {
        self.themes_dir = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn pair_penalties(mut self, path: impl AsRef<Path>) -> Self {
        self.pair_penalties_path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Provide a catalog directly (for testing without files).
    pub fn with_catalog(mut self, catalog: impl WordBlockCatalog + 'static) -> Self {
        self.catalog = Some(Arc::new(catalog));
        self
    }

    /// Provide a pair table directly (for testing without files).
    pub fn with_pair_table(mut self, pairs: PairPenaltyTable) -> Self {
        self.pairs = Some(Arc::new(pairs));
        self
    }

    pub fn build(self) -> Result<NameGenerator, GenerationError> {
        let catalog: Arc<dyn WordBlockCatalog> = match (self.catalog, self.themes_dir) {
            (Some(catalog), _) => catalog,
            (None, Some(dir)) => Arc::new(BlockCatalog::load_dir(&dir)?),
            (None, None) => Arc::new(BlockCatalog::new()),
        };
        let pairs = match (self.pairs, self.pair_penalties_path) {
            (Some(pairs), _) => pairs,
            (None, Some(path)) => Arc::new(PairPenaltyTable::load_from_ron(&path)?),
            (None, None) => Arc::new(PairPenaltyTable::new()),
        };
        Ok(NameGenerator { catalog, pairs })
    }
}
