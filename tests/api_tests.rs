/// Web-boundary tests: form parsing, generation envelopes, preset JSON.

use fantasy_namegen::api::{self, FormRequest, MAX_COUNT};
use fantasy_namegen::core::generator::NameGenerator;
use fantasy_namegen::presets::PresetCatalog;
use fantasy_namegen::schema::block::VibeScale;
use fantasy_namegen::schema::request::{
    BlockCount, FeatureKind, ModificationKind, VibeRange, VowelFirst,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde_json::Value;

fn fixture_generator() -> NameGenerator {
    NameGenerator::builder()
        .themes_dir("tests/fixtures/themes")
        .pair_penalties("tests/fixtures/test_pairs.ron")
        .build()
        .unwrap()
}

#[test]
fn full_form_is_parsed() {
    let body = "theme=Elf&good_evil_min=1&good_evil_max=3&elegant_rough_min=1&elegant_rough_max=4\
        &block_counts=2&block_counts=3&block_count_2_weight=2\
        &vowel_first_prefix=0.75&special_features=0.5&max_special_features=2\
        &allow_apostrophes=on&allow_spaces=on&character_modifications=0.1&max_modifications=3\
        &allow_ligatures=on&weight_vibe=0.3&weight_compatibility=0.7\
        &top_n_candidates=8&low_score_threshold=45&penalty_repetition_triple_letter=90\
        &bonus_smooth_transition=5&count=12";
    let FormRequest { request, count } = api::parse_form(body);

    assert_eq!(count, 12);
    assert_eq!(request.theme, "elf");
    assert_eq!(request.vibe.get(VibeScale::GoodEvil), VibeRange::new(1, 3));
    assert_eq!(request.vibe.get(VibeScale::ElegantRough), VibeRange::new(1, 4));
    assert_eq!(request.vibe.get(VibeScale::FemMasc), VibeRange::FULL);
    assert_eq!(
        request.block_counts,
        vec![BlockCount::Two, BlockCount::Two, BlockCount::Three]
    );
    assert_eq!(request.vowel_first, VowelFirst::Probability(0.75));
    assert_eq!(request.special_features.probability, 0.5);
    assert_eq!(request.special_features.max_count, 2);
    assert_eq!(
        request.special_features.allowed,
        vec![FeatureKind::Apostrophe, FeatureKind::Space]
    );
    assert_eq!(request.modifications.max_count, 3);
    assert_eq!(request.modifications.allowed, vec![ModificationKind::Ligature]);
    assert!((request.scoring.weight_vibe - 0.3).abs() < 1e-9);
    assert!((request.scoring.weight_vibe + request.scoring.weight_compatibility - 1.0).abs() < 1e-12);
    assert_eq!(request.scoring.top_n_candidates, 8);
    assert_eq!(request.scoring.low_score_threshold, 45.0);
    assert_eq!(request.scoring.repetition.triple_letter, 90.0);
    assert_eq!(request.scoring.joins.smooth_transition_bonus, 5.0);
    assert_eq!(request.validate(), Ok(()));
}

#[test]
fn bad_values_fall_back_to_defaults() {
    let body = "theme=orc&good_evil_min=8&good_evil_max=3&fem_masc_min=0&fem_masc_max=4\
        &weak_powerful_min=5&block_counts=4&block_counts=x&vowel_first_prefix=7\
        &special_features=-1&weight_vibe=0.9&weight_compatibility=0.9\
        &top_n_candidates=0&low_score_threshold=250&penalty_boundary_consonants_3=-5&count=2.5";
    let FormRequest { request, count } = api::parse_form(body);

    assert_eq!(count, api::DEFAULT_COUNT);
    for scale in VibeScale::ALL {
        assert_eq!(request.vibe.get(scale), VibeRange::FULL, "{}", scale.key());
    }
    assert!(request.block_counts.is_empty());
    assert_eq!(request.vowel_first, VowelFirst::Probability(1.0));
    assert_eq!(request.special_features.probability, 0.0);
    assert_eq!(request.scoring.weight_vibe, 0.4);
    assert_eq!(request.scoring.top_n_candidates, 1);
    assert_eq!(request.scoring.low_score_threshold, 100.0);
    assert_eq!(request.scoring.boundary.consonants_3, 50.0);
    assert_eq!(request.validate(), Ok(()));
}

#[test]
fn block_weights_are_clamped() {
    let parsed = api::parse_form("block_counts=3&block_count_3_weight=50&block_counts=2&block_count_2_weight=0");
    let threes = parsed
        .request
        .block_counts
        .iter()
        .filter(|c| **c == BlockCount::Three)
        .count();
    let twos = parsed.request.block_counts.len() - threes;
    assert_eq!((twos, threes), (1, 10));
}

#[test]
fn generate_response_success_envelope() {
    let generator = fixture_generator();
    let mut rng = StdRng::seed_from_u64(42);
    let response = api::generate_response(&generator, "theme=default&count=7", &mut rng);
    assert!(response.success);
    assert_eq!(response.names.as_ref().map(Vec::len), Some(7));

    let json: Value = serde_json::to_value(&response).unwrap();
    assert_eq!(json["success"], Value::Bool(true));
    assert!(json.get("error").is_none());
}

#[test]
fn generate_response_count_is_capped() {
    let generator = fixture_generator();
    let mut rng = StdRng::seed_from_u64(1);
    let response = api::generate_response(&generator, "count=99", &mut rng);
    assert_eq!(response.names.unwrap().len(), MAX_COUNT);
}

#[test]
fn empty_form_is_rejected() {
    let generator = fixture_generator();
    let mut rng = StdRng::seed_from_u64(1);
    let response = api::generate_response(&generator, "", &mut rng);
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("No form data received."));
    let json = serde_json::to_value(&response).unwrap();
    assert!(json.get("names").is_none());
}

#[test]
fn empty_pool_reports_failure() {
    let generator = fixture_generator();
    let mut rng = StdRng::seed_from_u64(1);
    let response = api::generate_response(&generator, "theme=clipped&vowel_first_prefix=1", &mut rng);
    assert!(!response.success);
    assert!(response.error.unwrap().contains("clipped"));
}

#[test]
fn preset_response_shapes_config() {
    let presets = PresetCatalog::builtin().unwrap();
    let response = api::preset_response(&presets, "High_Elf");
    assert!(response.success);

    let json: Value = serde_json::to_value(&response).unwrap();
    let config = &json["config"];
    assert_eq!(config["theme"], "elf");
    assert_eq!(config["good_evil"]["min"], 1);
    assert_eq!(config["good_evil"]["max"], 3);
    assert_eq!(config["block_count"], serde_json::json!([2, 3]));
    assert_eq!(config["block_weights"]["2"], 2);
    assert_eq!(config["allowed_features"]["apostrophes"], true);
    assert_eq!(config["allowed_features"]["spaces"], false);
    assert_eq!(config["scoring_config"]["top_n_candidates"], 12);
}

#[test]
fn unknown_preset_response() {
    let presets = PresetCatalog::builtin().unwrap();
    let response = api::preset_response(&presets, "Goblin");
    assert!(!response.success);
    assert_eq!(response.error.as_deref(), Some("Unknown preset ID: 'goblin'"));
    assert!(api::preset_response(&presets, "  ").error.is_some());
}
