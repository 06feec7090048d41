/// Two-letter join difficulty table.

use rustc_hash::FxHashMap;
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum PairTableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("pair key '{0}' must be exactly two letters")]
    InvalidPair(String),
    #[error("pair '{pair}' has negative difficulty {value}")]
    NegativeValue { pair: String, value: f64 },
}

/// Immutable mapping from a lowercase two-letter join to a difficulty factor.
///
/// Missing pairs carry no penalty.
#[derive(Debug, Clone, Default)]
pub struct PairPenaltyTable {
    entries: FxHashMap<[char; 2], f64>,
}

impl PairPenaltyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table from a RON map file (`{"bk": 0.25, ...}`).
    pub fn load_from_ron(path: &Path) -> Result<PairPenaltyTable, PairTableError> {
        let contents = std::fs::read_to_string(path)?;
        let table = Self::parse_ron(&contents)?;
        info!(pairs = table.len(), path = %path.display(), "Loaded pair penalty table");
        Ok(table)
    }

    pub fn parse_ron(input: &str) -> Result<PairPenaltyTable, PairTableError> {
        let raw: FxHashMap<String, f64> = ron::from_str(input)?;
        let mut table = PairPenaltyTable::new();
        for (pair, value) in raw {
            table.insert(&pair, value)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, pair: &str, value: f64) -> Result<(), PairTableError> {
        let key = pair_key(pair).ok_or_else(|| PairTableError::InvalidPair(pair.to_string()))?;
        if value.is_nan() || value < 0.0 {
            return Err(PairTableError::NegativeValue {
                pair: pair.to_string(),
                value,
            });
        }
        self.entries.insert(key, value);
        Ok(())
    }

    /// Difficulty of the join `first` + `second`, case-insensitive.
    pub fn lookup(&self, first: char, second: char) -> Option<f64> {
        self.entries
            .get(&[first.to_ascii_lowercase(), second.to_ascii_lowercase()])
            .copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn pair_key(pair: &str) -> Option<[char; 2]> {
    let mut chars = pair.chars().map(|c| c.to_ascii_lowercase());
    match (chars.next(), chars.next(), chars.next()) {
        (Some(a), Some(b), None) if a.is_alphabetic() && b.is_alphabetic() => Some([a, b]),
        _ => None,
    }
}
