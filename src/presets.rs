/// Named request presets ("high_elf", "orc", ...) shipped as RON.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::schema::request::{GenerationRequest, RequestError};

/// The presets bundled with the crate.
const BUILTIN_PRESETS: &str = include_str!("../theme_data/presets.ron");

#[derive(Debug, Error)]
pub enum PresetError {
    #[error("unknown preset '{0}'")]
    Unknown(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("preset '{id}' is invalid: {source}")]
    Invalid { id: String, source: RequestError },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub label: String,
    pub request: GenerationRequest,
}

/// Presets in file order.
#[derive(Debug, Clone, Default)]
pub struct PresetCatalog {
    presets: Vec<Preset>,
}

impl PresetCatalog {
    /// The bundled presets.
    pub fn builtin() -> Result<Self, PresetError> {
        Self::parse_ron(BUILTIN_PRESETS)
    }

    pub fn load_from_ron(path: &Path) -> Result<Self, PresetError> {
        let contents = std::fs::read_to_string(path)?;
        let catalog = Self::parse_ron(&contents)?;
        info!(path = %path.display(), presets = catalog.len(), "Loaded presets");
        Ok(catalog)
    }

    /// Parse a RON list of presets. Every request must validate.
    pub fn parse_ron(input: &str) -> Result<Self, PresetError> {
        let presets: Vec<Preset> = ron::from_str(input)?;
        for preset in &presets {
            preset
                .request
                .validate()
                .map_err(|source| PresetError::Invalid {
                    id: preset.id.clone(),
                    source,
                })?;
        }
        Ok(Self { presets })
    }

    /// Look up a preset by id, ignoring case.
    pub fn get(&self, id: &str) -> Result<&Preset, PresetError> {
        self.presets
            .iter()
            .find(|p| p.id.eq_ignore_ascii_case(id))
            .ok_or_else(|| PresetError::Unknown(id.to_string()))
    }

    pub fn ids(&self) -> Vec<&str> {
        self.presets.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::block::VibeScale;
    use crate::schema::request::{BlockCount, FeatureKind, VibeRange, VowelFirst};

    #[test]
    fn builtin_presets_parse_and_validate() {
        let presets = PresetCatalog::builtin().unwrap();
        assert_eq!(
            presets.ids(),
            vec!["default", "high_elf", "dark_elf", "elf", "fae", "desert", "druid", "orc", "dwarf"]
        );
    }

    #[test]
    fn high_elf_values() {
        let presets = PresetCatalog::builtin().unwrap();
        let p = presets.get("HIGH_ELF").unwrap();
        let req = &p.request;
        assert_eq!(req.theme, "elf");
        assert_eq!(req.vibe.get(VibeScale::GoodEvil), VibeRange::new(1, 3));
        assert_eq!(
            req.block_counts,
            vec![BlockCount::Two, BlockCount::Two, BlockCount::Three]
        );
        assert_eq!(req.vowel_first, VowelFirst::Probability(0.6));
        assert_eq!(req.special_features.allowed, vec![FeatureKind::Apostrophe]);
        assert_eq!(req.scoring.top_n_candidates, 12);
    }

    #[test]
    fn unknown_preset_is_an_error() {
        let presets = PresetCatalog::builtin().unwrap();
        assert!(matches!(presets.get("goblin"), Err(PresetError::Unknown(_))));
    }

    #[test]
    fn invalid_preset_rejected() {
        let err = PresetCatalog::parse_ron(
            r#"[(id: "bad", label: "Bad", request: (scoring: (top_n_candidates: 0)))]"#,
        )
        .unwrap_err();
        assert!(matches!(err, PresetError::Invalid { ref id, .. } if id == "bad"));
    }
}
