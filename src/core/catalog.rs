/// Themed word-block catalogs: RON loading, lookup, and linting.

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::schema::block::{Role, VibeProfile, WordBlock};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("theme '{theme}': block '{block}' has rating {rating} outside 1..=10")]
    InvalidRating {
        theme: String,
        block: String,
        rating: u8,
    },
    #[error("theme '{theme}': block '{block}' needs 5 vibe ratings, found {found}")]
    MalformedVibe {
        theme: String,
        block: String,
        found: usize,
    },
    #[error("theme '{theme}' contains a block with empty text")]
    EmptyBlockText { theme: String },
    #[error("unknown theme '{0}' and no default theme to fall back on")]
    UnknownTheme(String),
}

/// Read-only source of word blocks, shared across concurrent generations.
pub trait WordBlockCatalog: Send + Sync {
    /// Blocks for a theme and role, in catalog order. Empty if unknown.
    fn blocks_for(&self, theme: &str, role: Role) -> &[WordBlock];

    /// Advertised theme names, sorted.
    fn themes(&self) -> Vec<&str>;

    fn has_theme(&self, theme: &str) -> bool {
        self.themes().contains(&theme)
    }
}

/// All blocks belonging to one theme.
#[derive(Debug, Clone, Default)]
pub struct ThemeBlocks {
    pub name: String,
    pub prefixes: Vec<WordBlock>,
    pub middles: Vec<WordBlock>,
    pub suffixes: Vec<WordBlock>,
}

/// Data-quality problems that don't stop a theme from loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogIssue {
    EmptyPool { theme: String, role: Role },
    Duplicate { theme: String, role: Role, text: String },
    NoVowelPrefix { theme: String },
}

impl std::fmt::Display for CatalogIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogIssue::EmptyPool { theme, role } => {
                write!(f, "theme '{}' has no {} blocks", theme, role)
            }
            CatalogIssue::Duplicate { theme, role, text } => {
                write!(f, "theme '{}' lists {} '{}' more than once", theme, role, text)
            }
            CatalogIssue::NoVowelPrefix { theme } => {
                write!(f, "theme '{}' has no vowel-initial prefixes", theme)
            }
        }
    }
}

// RON shape: `(theme: "elf", prefixes: [(text: "ael", vibe: [2, 2, 7, 5, 4]), ...], ...)`.

#[derive(Debug, Deserialize)]
struct RonBlock {
    text: String,
    vibe: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct RonTheme {
    theme: String,
    #[serde(default)]
    prefixes: Vec<RonBlock>,
    #[serde(default)]
    middles: Vec<RonBlock>,
    #[serde(default)]
    suffixes: Vec<RonBlock>,
}

impl ThemeBlocks {
    /// Load a theme from a RON file.
    pub fn load_from_ron(path: &Path) -> Result<ThemeBlocks, CatalogError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse_ron(&contents)
    }

    /// Parse a theme from a RON string, validating every rating.
    pub fn parse_ron(input: &str) -> Result<ThemeBlocks, CatalogError> {
        let raw: RonTheme = ron::from_str(input)?;
        let name = raw.theme;
        Ok(ThemeBlocks {
            prefixes: convert_blocks(&name, Role::Prefix, raw.prefixes)?,
            middles: convert_blocks(&name, Role::Middle, raw.middles)?,
            suffixes: convert_blocks(&name, Role::Suffix, raw.suffixes)?,
            name,
        })
    }

    pub fn blocks(&self, role: Role) -> &[WordBlock] {
        match role {
            Role::Prefix => &self.prefixes,
            Role::Middle => &self.middles,
            Role::Suffix => &self.suffixes,
        }
    }

    pub fn len(&self) -> usize {
        self.prefixes.len() + self.middles.len() + self.suffixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Report empty pools, duplicated texts, and a missing vowel-initial prefix.
    pub fn lint(&self) -> Vec<CatalogIssue> {
        let mut issues = Vec::new();
        for role in Role::ALL {
            let blocks = self.blocks(role);
            if blocks.is_empty() {
                issues.push(CatalogIssue::EmptyPool {
                    theme: self.name.clone(),
                    role,
                });
                continue;
            }
            let mut seen = FxHashSet::default();
            for block in blocks {
                if !seen.insert(block.text.to_lowercase()) {
                    issues.push(CatalogIssue::Duplicate {
                        theme: self.name.clone(),
                        role,
                        text: block.text.clone(),
                    });
                }
            }
        }
        if !self.prefixes.is_empty() && !self.prefixes.iter().any(WordBlock::starts_with_vowel) {
            issues.push(CatalogIssue::NoVowelPrefix {
                theme: self.name.clone(),
            });
        }
        issues
    }
}

fn convert_blocks(
    theme: &str,
    role: Role,
    raw: Vec<RonBlock>,
) -> Result<Vec<WordBlock>, CatalogError> {
    let mut blocks = Vec::with_capacity(raw.len());
    for ron_block in raw {
        if ron_block.text.trim().is_empty() {
            return Err(CatalogError::EmptyBlockText {
                theme: theme.to_string(),
            });
        }
        let ratings: [u8; 5] =
            ron_block
                .vibe
                .as_slice()
                .try_into()
                .map_err(|_| CatalogError::MalformedVibe {
                    theme: theme.to_string(),
                    block: ron_block.text.clone(),
                    found: ron_block.vibe.len(),
                })?;
        let vibe = VibeProfile::new(ratings).ok_or_else(|| {
            let rating = ratings
                .iter()
                .copied()
                .find(|r| !(1..=10).contains(r))
                .unwrap_or_default();
            CatalogError::InvalidRating {
                theme: theme.to_string(),
                block: ron_block.text.clone(),
                rating,
            }
        })?;
        blocks.push(WordBlock::new(ron_block.text, role, vibe));
    }
    Ok(blocks)
}

/// In-memory catalog keyed by theme name.
#[derive(Debug, Clone, Default)]
pub struct BlockCatalog {
    themes: FxHashMap<String, ThemeBlocks>,
}

impl BlockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a theme, replacing any theme of the same name.
    pub fn insert(&mut self, theme: ThemeBlocks) {
        self.themes.insert(theme.name.clone(), theme);
    }

    pub fn get(&self, theme: &str) -> Option<&ThemeBlocks> {
        self.themes.get(theme)
    }

    /// Build a catalog from RON documents, one theme each.
    pub fn from_sources<'a, I>(sources: I) -> Result<BlockCatalog, CatalogError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut catalog = BlockCatalog::new();
        for source in sources {
            catalog.insert(ThemeBlocks::parse_ron(source)?);
        }
        Ok(catalog)
    }

    /// Load every `<dir>/<theme>/blocks.ron`.
    pub fn load_dir(dir: &Path) -> Result<BlockCatalog, CatalogError> {
        let mut catalog = BlockCatalog::new();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path().join("blocks.ron");
            if path.is_file() {
                paths.push(path);
            }
        }
        paths.sort();
        for path in paths {
            let theme = ThemeBlocks::load_from_ron(&path)?;
            info!(theme = %theme.name, blocks = theme.len(), path = %path.display(), "Loaded theme blocks");
            catalog.insert(theme);
        }
        Ok(catalog)
    }
}

impl WordBlockCatalog for BlockCatalog {
    fn blocks_for(&self, theme: &str, role: Role) -> &[WordBlock] {
        self.themes.get(theme).map(|t| t.blocks(role)).unwrap_or(&[])
    }

    fn themes(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.themes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn has_theme(&self, theme: &str) -> bool {
        self.themes.contains_key(theme)
    }
}
