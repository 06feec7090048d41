/// Caller-facing boundary: form-encoded requests in, JSON-ready envelopes out.
///
/// Everything here is forgiving. Missing, malformed or out-of-range values
/// are clamped or ignored so the request handed to the engine always
/// validates.

use rand::rngs::StdRng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::core::generator::{GenerationError, NameGenerator};
use crate::presets::{PresetCatalog, PresetError};
use crate::schema::block::VibeScale;
use crate::schema::request::{
    BlockCount, FeatureKind, GenerationRequest, ModificationKind, VibeRange, VibeTarget,
    VowelFirst,
};
use crate::schema::scoring::ScoringConfig;

pub const DEFAULT_COUNT: usize = 5;
pub const MAX_COUNT: usize = 20;

/// Largest per-count weight accepted from `block_count_<n>_weight`.
const MAX_BLOCK_WEIGHT: i64 = 10;

/// Tolerance for form-supplied weights before they are renormalised.
const WEIGHT_TOLERANCE: f64 = 0.01;

/// A parsed form: the request plus how many names to make.
#[derive(Debug, Clone, PartialEq)]
pub struct FormRequest {
    pub request: GenerationRequest,
    pub count: usize,
}

/// Response of the batch-generation operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateResponse {
    fn ok(names: Vec<String>) -> Self {
        Self {
            success: true,
            names: Some(names),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            names: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllowedFeatures {
    pub apostrophes: bool,
    pub hyphens: bool,
    pub spaces: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllowedModifications {
    pub diacritics: bool,
    pub ligatures: bool,
}

/// Flat view of a request, shaped for populating the web form.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigView {
    pub theme: String,
    #[serde(flatten)]
    pub vibe: VibeTarget,
    /// Distinct counts, ascending. `None` means the generator default.
    pub block_count: Option<Vec<u8>>,
    pub block_weights: Option<BTreeMap<u8, u32>>,
    pub vowel_first: f64,
    pub special_features: f64,
    pub max_special_features: u32,
    pub allowed_features: AllowedFeatures,
    pub character_modifications: f64,
    pub max_modifications: u32,
    pub allowed_modifications: AllowedModifications,
    pub scoring_config: ScoringConfig,
}

impl From<&GenerationRequest> for ConfigView {
    fn from(req: &GenerationRequest) -> Self {
        let mut weights: BTreeMap<u8, u32> = BTreeMap::new();
        for &count in &req.block_counts {
            *weights.entry(u8::from(count)).or_default() += 1;
        }
        let (block_count, block_weights) = if weights.is_empty() {
            (None, None)
        } else {
            (Some(weights.keys().copied().collect()), Some(weights))
        };
        let vowel_first = match req.vowel_first {
            VowelFirst::Forced(true) => 1.0,
            VowelFirst::Forced(false) => 0.0,
            VowelFirst::Probability(p) => p,
        };
        let f = &req.special_features;
        let m = &req.modifications;
        Self {
            theme: req.theme.clone(),
            vibe: req.vibe,
            block_count,
            block_weights,
            vowel_first,
            special_features: f.probability,
            max_special_features: f.max_count,
            allowed_features: AllowedFeatures {
                apostrophes: f.allows(FeatureKind::Apostrophe),
                hyphens: f.allows(FeatureKind::Hyphen),
                spaces: f.allows(FeatureKind::Space),
            },
            character_modifications: m.probability,
            max_modifications: m.max_count,
            allowed_modifications: AllowedModifications {
                diacritics: m.allows(ModificationKind::Diacritic),
                ligatures: m.allows(ModificationKind::Ligature),
            },
            scoring_config: req.scoring.clone(),
        }
    }
}

/// Response of the preset-fetch operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresetResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<ConfigView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Decoded `key=value` pairs, keeping repeats and order.
struct Form {
    pairs: Vec<(String, String)>,
}

impl Form {
    fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    fn float(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(safe_float)
    }

    fn int(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(safe_int)
    }

    fn checked(&self, key: &str) -> bool {
        self.get(key) == Some("on")
    }
}

fn safe_float(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Integers may be written as floats, but only without a fractional part.
fn safe_int(raw: &str) -> Option<i64> {
    let value = safe_float(raw)?;
    (value.fract() == 0.0 && value.abs() < i64::MAX as f64).then_some(value as i64)
}

/// Parse an `application/x-www-form-urlencoded` body.
pub fn parse_form(body: &str) -> FormRequest {
    let pairs = url::form_urlencoded::parse(body.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    parse_pairs(pairs)
}

/// Build a request from already-decoded form pairs.
pub fn parse_pairs(pairs: Vec<(String, String)>) -> FormRequest {
    let form = Form { pairs };
    let mut request = GenerationRequest::default();

    if let Some(theme) = form.get("theme").map(str::trim).filter(|t| !t.is_empty()) {
        request.theme = theme.to_lowercase();
    }

    for scale in VibeScale::ALL {
        let key = scale.key();
        let min = form.int(&format!("{key}_min"));
        let max = form.int(&format!("{key}_max"));
        match (min, max) {
            (Some(min), Some(max)) => {
                let valid = |v: i64| (i64::from(VibeScale::MIN)..=i64::from(VibeScale::MAX)).contains(&v);
                if valid(min) && valid(max) && min <= max {
                    request.vibe.set(scale, VibeRange::new(min as u8, max as u8));
                } else {
                    warn!(scale = key, min, max, "Ignoring invalid vibe range");
                }
            }
            (None, None) => {}
            _ => warn!(scale = key, "Ignoring incomplete vibe range"),
        }
    }

    request.block_counts = parse_block_counts(&form);

    request.vowel_first = match form.float("vowel_first_prefix") {
        Some(p) => VowelFirst::Probability(p.clamp(0.0, 1.0)),
        None => VowelFirst::Forced(false),
    };

    let features = &mut request.special_features;
    if let Some(p) = form.float("special_features") {
        features.probability = p.clamp(0.0, 1.0);
    }
    if let Some(n) = form.int("max_special_features") {
        features.max_count = clamp_count(n);
    }
    features.allowed = [
        ("allow_apostrophes", FeatureKind::Apostrophe),
        ("allow_hyphens", FeatureKind::Hyphen),
        ("allow_spaces", FeatureKind::Space),
    ]
    .into_iter()
    .filter(|(key, _)| form.checked(key))
    .map(|(_, kind)| kind)
    .collect();

    let mods = &mut request.modifications;
    if let Some(p) = form.float("character_modifications") {
        mods.probability = p.clamp(0.0, 1.0);
    }
    if let Some(n) = form.int("max_modifications") {
        mods.max_count = clamp_count(n);
    }
    mods.allowed = [
        ("allow_diacritics", ModificationKind::Diacritic),
        ("allow_ligatures", ModificationKind::Ligature),
    ]
    .into_iter()
    .filter(|(key, _)| form.checked(key))
    .map(|(_, kind)| kind)
    .collect();

    parse_scoring(&form, &mut request.scoring);

    let count = form
        .int("count")
        .map_or(DEFAULT_COUNT, |n| n.clamp(1, MAX_COUNT as i64) as usize);

    debug!(theme = %request.theme, count, "Parsed form request");
    FormRequest { request, count }
}

fn clamp_count(n: i64) -> u32 {
    n.clamp(0, i64::from(u32::MAX)) as u32
}

/// Repeated `block_counts` values, each repeated by its clamped weight.
fn parse_block_counts(form: &Form) -> Vec<BlockCount> {
    let mut weights: Vec<(BlockCount, u32)> = Vec::new();
    for raw in form.get_all("block_counts") {
        let Some(count) = safe_int(raw)
            .and_then(|n| u8::try_from(n).ok())
            .and_then(|n| BlockCount::try_from(n).ok())
        else {
            warn!(value = raw, "Ignoring invalid block count");
            continue;
        };
        let weight = form
            .int(&format!("block_count_{}_weight", count.get()))
            .map_or(1, |w| w.clamp(1, MAX_BLOCK_WEIGHT) as u32);
        weights.push((count, weight));
    }
    BlockCount::weighted(&weights)
}

fn parse_scoring(form: &Form, scoring: &mut ScoringConfig) {
    match (form.float("weight_vibe"), form.float("weight_compatibility")) {
        (Some(vibe), Some(compat))
            if vibe >= 0.0 && compat >= 0.0 && (vibe + compat - 1.0).abs() < WEIGHT_TOLERANCE =>
        {
            let vibe = vibe / (vibe + compat);
            scoring.weight_vibe = vibe;
            scoring.weight_compatibility = 1.0 - vibe;
        }
        (None, None) => {}
        (vibe, compat) => warn!(?vibe, ?compat, "Ignoring invalid scoring weights"),
    }

    if let Some(n) = form.int("top_n_candidates") {
        scoring.top_n_candidates = n.max(1) as usize;
    }
    if let Some(t) = form.float("low_score_threshold") {
        scoring.low_score_threshold = t.clamp(0.0, 100.0);
    }

    let names: Vec<&'static str> = scoring.magnitudes().iter().map(|(name, _)| *name).collect();
    for name in names {
        let Some(value) = form.float(name) else {
            continue;
        };
        if value < 0.0 {
            warn!(field = name, value, "Ignoring negative penalty");
            continue;
        }
        if let Some(slot) = scoring.magnitude_mut(name) {
            *slot = value;
        }
    }
}

/// Parse a form body and generate the requested batch.
pub fn generate_response(generator: &NameGenerator, body: &str, rng: &mut StdRng) -> GenerateResponse {
    if body.trim().is_empty() {
        warn!("Generate request with empty form data");
        return GenerateResponse::err("No form data received.");
    }
    let FormRequest { request, count } = parse_form(body);
    info!(theme = %request.theme, count, "Generating names");

    match generator.generate_many(&request, count, rng) {
        Ok(names) => GenerateResponse::ok(names),
        Err(err @ GenerationError::EmptyPool { .. }) => {
            warn!(error = %err, "Generation failed");
            GenerateResponse::err(format!("No names could be generated: {err}."))
        }
        Err(GenerationError::InvalidRequest(err)) => {
            warn!(error = %err, "Rejected request");
            GenerateResponse::err("Invalid configuration data submitted. Please check your settings.")
        }
        Err(err) => {
            warn!(error = %err, "Generation failed");
            GenerateResponse::err("An internal error occurred during name generation.")
        }
    }
}

/// Look up a preset and shape it for the web form.
pub fn preset_response(presets: &PresetCatalog, id: &str) -> PresetResponse {
    let id = id.trim();
    if id.is_empty() {
        return PresetResponse {
            success: false,
            config: None,
            error: Some("Invalid preset ID format.".to_string()),
        };
    }
    match presets.get(id) {
        Ok(preset) => PresetResponse {
            success: true,
            config: Some(ConfigView::from(&preset.request)),
            error: None,
        },
        Err(PresetError::Unknown(_)) => {
            warn!(preset = id, "Unknown preset requested");
            PresetResponse {
                success: false,
                config: None,
                error: Some(format!("Unknown preset ID: '{}'", id.to_lowercase())),
            }
        }
        Err(err) => PresetResponse {
            success: false,
            config: None,
            error: Some(format!("An error occurred while loading preset '{id}': {err}")),
        },
    }
}
