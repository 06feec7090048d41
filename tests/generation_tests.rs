/// Generation integration tests: fixture themes through the full pipeline.

use fantasy_namegen::core::generator::{GenerationError, NameGenerator};
use fantasy_namegen::presets::PresetCatalog;
use fantasy_namegen::schema::block::{is_vowel, Role, VibeScale};
use fantasy_namegen::schema::request::{
    BlockCount, FeatureKind, GenerationRequest, ModificationSettings, SpecialFeatureSettings,
    VowelFirst,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn fixture_generator() -> NameGenerator {
    NameGenerator::builder()
        .themes_dir("tests/fixtures/themes")
        .pair_penalties("tests/fixtures/test_pairs.ron")
        .build()
        .unwrap()
}

fn no_modifications() -> ModificationSettings {
    ModificationSettings {
        probability: 0.0,
        ..ModificationSettings::default()
    }
}

#[test]
fn elf_vowel_first_two_blocks() {
    let generator = fixture_generator();
    let request = GenerationRequest::for_theme("elf")
        .range(VibeScale::GoodEvil, 1, 3)
        .range(VibeScale::ElegantRough, 1, 4)
        .block_counts(&[BlockCount::Two])
        .vowel_first(VowelFirst::Forced(true));

    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..100 {
        let detail = generator.generate_detailed(&request, &mut rng).unwrap();
        assert_eq!(detail.block_count, 2);
        assert_eq!(detail.blocks.len(), 2);
        let first = detail.blocks[0].chars().next().unwrap();
        assert!(is_vowel(first), "prefix {} should start with a vowel", detail.blocks[0]);
        assert_eq!(detail.scores[0].role, Role::Prefix);
        assert_eq!(detail.scores[1].role, Role::Suffix);
    }
}

#[test]
fn vowel_first_probability_one_matches_forced() {
    let generator = fixture_generator();
    let request = GenerationRequest::for_theme("elf").vowel_first(VowelFirst::Probability(1.0));
    let mut rng = StdRng::seed_from_u64(8);
    for _ in 0..50 {
        let detail = generator.generate_detailed(&request, &mut rng).unwrap();
        assert!(detail.blocks[0].starts_with(|c: char| is_vowel(c)));
    }
}

#[test]
fn single_apostrophe_at_consonant_vowel_junction() {
    let generator = fixture_generator();
    let request = GenerationRequest::for_theme("clipped")
        .vowel_first(VowelFirst::Forced(false))
        .special_features(SpecialFeatureSettings {
            probability: 1.0,
            max_count: 1,
            allowed: vec![FeatureKind::Apostrophe],
        })
        .modifications(no_modifications());

    let names = generator.generate_many_seeded(&request, 50, 42).unwrap();
    for name in names {
        let chars: Vec<char> = name.chars().collect();
        let marks: Vec<usize> = chars
            .iter()
            .enumerate()
            .filter(|(_, c)| **c == '\'')
            .map(|(i, _)| i)
            .collect();
        assert_eq!(marks.len(), 1, "{name}");
        let at = marks[0];
        assert!(!is_vowel(chars[at - 1]) && chars[at - 1].is_alphabetic(), "{name}");
        assert!(is_vowel(chars[at + 1]), "{name}");
    }
}

/// The apostrophe never goes before the first or last letter, so names whose
/// only consonant-vowel junction sits at an edge come back unmarked.
#[test]
fn apostrophe_placement_over_shipped_themes() {
    let generator = NameGenerator::builder()
        .themes_dir("theme_data")
        .pair_penalties("theme_data/pair_penalties.ron")
        .build()
        .unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let mut marked = 0;

    for theme in ["default", "elf", "dwarf", "orc", "fae", "desert", "druid"] {
        let request = GenerationRequest::for_theme(theme)
            .block_counts(&[BlockCount::Two, BlockCount::Three])
            .special_features(SpecialFeatureSettings {
                probability: 1.0,
                max_count: 1,
                allowed: vec![FeatureKind::Apostrophe],
            })
            .modifications(no_modifications());

        for _ in 0..20 {
            let detail = generator.generate_detailed(&request, &mut rng).unwrap();
            let base: Vec<char> = detail.blocks.concat().to_lowercase().chars().collect();
            let eligible = (1..base.len().saturating_sub(1)).any(|i| {
                base[i - 1].is_alphabetic() && !is_vowel(base[i - 1]) && is_vowel(base[i])
            });

            let chars: Vec<char> = detail.name.to_lowercase().chars().collect();
            let marks: Vec<usize> = (0..chars.len()).filter(|&i| chars[i] == '\'').collect();
            let stripped: Vec<char> = chars.iter().copied().filter(|&c| c != '\'').collect();
            assert_eq!(stripped, base, "{}", detail.name);

            if eligible {
                assert_eq!(marks.len(), 1, "{}", detail.name);
                let at = marks[0];
                assert!(at >= 1 && at + 1 < chars.len(), "{}", detail.name);
                assert!(!is_vowel(chars[at - 1]) && is_vowel(chars[at + 1]), "{}", detail.name);
                marked += 1;
            } else {
                assert!(marks.is_empty(), "{}", detail.name);
            }
        }
    }
    assert!(marked > 100, "only {marked} of 140 names were marked");
}

#[test]
fn batch_returns_requested_count() {
    let generator = fixture_generator();
    let request = GenerationRequest::default();
    let names = generator.generate_many_seeded(&request, 5, 1).unwrap();
    assert_eq!(names.len(), 5);
    assert!(names.iter().all(|n| !n.is_empty()));
}

#[test]
fn below_threshold_is_seed_independent() {
    let generator = fixture_generator();
    let mut request = GenerationRequest::default()
        .range(VibeScale::GoodEvil, 10, 10)
        .block_counts(&[BlockCount::Two])
        .vowel_first(VowelFirst::Forced(false))
        .modifications(no_modifications());
    request.scoring.low_score_threshold = 100.0;

    let expected = generator.generate_one_seeded(&request, 0).unwrap();
    for seed in 1..20 {
        assert_eq!(generator.generate_one_seeded(&request, seed).unwrap(), expected);
    }
    let detail = generator
        .generate_detailed(&request, &mut StdRng::seed_from_u64(3))
        .unwrap();
    assert!(detail.was_forced);
    assert!(detail.scores.iter().all(|s| s.forced));
}

#[test]
fn names_are_capitalised() {
    let generator = fixture_generator();
    let request = GenerationRequest::for_theme("elf").modifications(no_modifications());
    for name in generator.generate_many_seeded(&request, 20, 11).unwrap() {
        assert!(name.chars().next().unwrap().is_uppercase(), "{name}");
    }
}

#[test]
fn unknown_theme_uses_default_blocks() {
    let generator = fixture_generator();
    let request = GenerationRequest::for_theme("goblin")
        .vowel_first(VowelFirst::Forced(false))
        .block_counts(&[BlockCount::Two]);
    let detail = generator
        .generate_detailed(&request, &mut StdRng::seed_from_u64(5))
        .unwrap();
    assert!(["bel", "dar", "or"].contains(&detail.blocks[0].as_str()));
}

#[test]
fn three_blocks_need_middles() {
    let generator = fixture_generator();
    let request = GenerationRequest::for_theme("clipped")
        .block_counts(&[BlockCount::Three])
        .vowel_first(VowelFirst::Forced(false));
    let detail = generator
        .generate_detailed(&request, &mut StdRng::seed_from_u64(2))
        .unwrap();
    assert_eq!(detail.blocks[1], "ra");
}

#[test]
fn vowel_first_with_no_vowel_prefix_fails() {
    let generator = fixture_generator();
    let request = GenerationRequest::for_theme("clipped").vowel_first(VowelFirst::Forced(true));
    let err = generator.generate_one_seeded(&request, 1).unwrap_err();
    assert!(matches!(
        err,
        GenerationError::EmptyPool {
            role: Role::Prefix,
            ..
        }
    ));
}

#[test]
fn pair_table_is_consulted() {
    let generator = fixture_generator();
    assert_eq!(generator.pairs().lookup('r', 'k'), Some(0.5));
    assert_eq!(generator.pairs().lookup('a', 'b'), None);
}

#[test]
fn every_shipped_preset_generates() {
    let generator = NameGenerator::builder()
        .themes_dir("theme_data")
        .pair_penalties("theme_data/pair_penalties.ron")
        .build()
        .unwrap();
    let presets = PresetCatalog::builtin().unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    for preset in presets.iter() {
        let names = generator
            .generate_many(&preset.request, 20, &mut rng)
            .unwrap_or_else(|e| panic!("preset {} failed: {e}", preset.id));
        assert_eq!(names.len(), 20);
        for name in &names {
            assert!(name.chars().count() >= 2, "{}: {name}", preset.id);
        }
    }
}
