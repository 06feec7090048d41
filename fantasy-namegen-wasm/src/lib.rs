//! WASM bindings for fantasy-namegen: powers the browser name generator.

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

use fantasy_namegen::api;
use fantasy_namegen::core::catalog::{BlockCatalog, WordBlockCatalog};
use fantasy_namegen::core::generator::NameGenerator;
use fantasy_namegen::core::pairs::PairPenaltyTable;
use fantasy_namegen::presets::PresetCatalog;

// ---------------------------------------------------------------------------
// Embedded theme data: compiled into the WASM binary
// ---------------------------------------------------------------------------
mod data {
    pub const THEMES: [&str; 7] = [
        include_str!("../../theme_data/default/blocks.ron"),
        include_str!("../../theme_data/elf/blocks.ron"),
        include_str!("../../theme_data/dwarf/blocks.ron"),
        include_str!("../../theme_data/orc/blocks.ron"),
        include_str!("../../theme_data/fae/blocks.ron"),
        include_str!("../../theme_data/desert/blocks.ron"),
        include_str!("../../theme_data/druid/blocks.ron"),
    ];

    pub const PAIR_PENALTIES: &str = include_str!("../../theme_data/pair_penalties.ron");
}

// ---------------------------------------------------------------------------
// JSON helper types for communication across the WASM boundary
// ---------------------------------------------------------------------------
#[derive(serde::Serialize)]
struct ThemeInfo<'a> {
    id: &'a str,
    blocks: usize,
}

#[derive(serde::Serialize)]
struct PresetInfo<'a> {
    id: &'a str,
    label: &'a str,
}

// ---------------------------------------------------------------------------
// NameGenDemo: the main exported struct
// ---------------------------------------------------------------------------
#[wasm_bindgen]
pub struct NameGenDemo {
    generator: NameGenerator,
    catalog: BlockCatalog,
    presets: PresetCatalog,
    rng: StdRng,
}

#[wasm_bindgen]
impl NameGenDemo {
    /// Create a new demo instance seeded with `seed`.
    #[wasm_bindgen(constructor)]
    pub fn new(seed: u64) -> Result<NameGenDemo, JsError> {
        let catalog = BlockCatalog::from_sources(data::THEMES)
            .map_err(|e| JsError::new(&format!("Theme parse error: {e}")))?;
        let pairs = PairPenaltyTable::parse_ron(data::PAIR_PENALTIES)
            .map_err(|e| JsError::new(&format!("Pair table parse error: {e}")))?;
        let presets = PresetCatalog::builtin()
            .map_err(|e| JsError::new(&format!("Preset parse error: {e}")))?;

        let generator = NameGenerator::builder()
            .with_catalog(catalog.clone())
            .with_pair_table(pairs)
            .build()
            .map_err(|e| JsError::new(&format!("Generator build error: {e}")))?;

        Ok(NameGenDemo {
            generator,
            catalog,
            presets,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Generate a batch from a form-encoded body.
    ///
    /// Returns `{"success":true,"names":[...]}` or `{"success":false,"error":"..."}`.
    pub fn generate(&mut self, form_body: &str) -> Result<String, JsError> {
        let response = api::generate_response(&self.generator, form_body, &mut self.rng);
        serde_json::to_string(&response)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Return a preset shaped for the form, as JSON.
    pub fn preset(&self, id: &str) -> Result<String, JsError> {
        let response = api::preset_response(&self.presets, id);
        serde_json::to_string(&response)
            .map_err(|e| JsError::new(&format!("Serialization error: {e}")))
    }

    /// Return JSON array of `{id, label}` for every preset.
    pub fn presets(&self) -> String {
        let infos: Vec<PresetInfo> = self
            .presets
            .iter()
            .map(|p| PresetInfo {
                id: &p.id,
                label: &p.label,
            })
            .collect();
        serde_json::to_string(&infos).unwrap_or_else(|_| "[]".to_string())
    }

    /// Return JSON array of `{id, blocks}` for every theme.
    pub fn themes(&self) -> String {
        let infos: Vec<ThemeInfo> = self
            .catalog
            .themes()
            .into_iter()
            .map(|id| ThemeInfo {
                id,
                blocks: self.catalog.get(id).map_or(0, |t| t.len()),
            })
            .collect();
        serde_json::to_string(&infos).unwrap_or_else(|_| "[]".to_string())
    }

    /// Reseed the generator.
    pub fn reset(&mut self, seed: u64) {
        self.rng = StdRng::seed_from_u64(seed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_data_builds() {
        let demo = NameGenDemo::new(42).unwrap();
        let themes: serde_json::Value = serde_json::from_str(&demo.themes()).unwrap();
        assert_eq!(themes.as_array().unwrap().len(), 7);
    }

    #[test]
    fn same_seed_same_batch() {
        let body = "theme=elf&count=5";
        let mut a = NameGenDemo::new(7).unwrap();
        let mut b = NameGenDemo::new(7).unwrap();
        assert_eq!(a.generate(body).unwrap(), b.generate(body).unwrap());
    }
}
