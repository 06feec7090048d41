/// Post-processing: special-feature insertion, character modifications, and
/// segment capitalisation.
///
/// Both passes work on the assembled, capitalised name and never touch block
/// order or scores.

use rand::distributions::WeightedIndex;
use rand::prelude::Distribution;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::schema::block::is_vowel;
use crate::schema::request::{
    FeatureKind, ModificationKind, ModificationSettings, SpecialFeatureSettings,
};

/// Positions scoring at or below this are never used for a mark.
const MIN_PLACEMENT_SCORE: f64 = 3.0;

const DIACRITICS: &[(char, &[char])] = &[
    ('a', &['á', 'à', 'ä', 'â', 'ã']),
    ('e', &['é', 'è', 'ë', 'ê']),
    ('i', &['í', 'ì', 'ï', 'î']),
    ('o', &['ó', 'ò', 'ö', 'ô', 'õ']),
    ('u', &['ú', 'ù', 'ü', 'û']),
    ('y', &['ý', 'ÿ']),
    ('A', &['Á', 'À', 'Ä', 'Â', 'Ã']),
    ('E', &['É', 'È', 'Ë', 'Ê']),
    ('I', &['Í', 'Ì', 'Ï', 'Î']),
    ('O', &['Ó', 'Ò', 'Ö', 'Ô', 'Õ']),
    ('U', &['Ú', 'Ù', 'Ü', 'Û']),
    ('Y', &['Ý', 'Ÿ']),
];

const LIGATURES: &[([char; 2], char)] = &[
    (['a', 'e'], 'æ'),
    (['o', 'e'], 'œ'),
    (['t', 'h'], 'þ'),
    (['d', 'h'], 'ð'),
    (['s', 's'], 'ß'),
    (['A', 'E'], 'Æ'),
    (['A', 'e'], 'Æ'),
    (['O', 'E'], 'Œ'),
    (['O', 'e'], 'Œ'),
    (['T', 'h'], 'Þ'),
    (['D', 'h'], 'Ð'),
];

pub struct PostProcessor<'a> {
    features: &'a SpecialFeatureSettings,
    modifications: &'a ModificationSettings,
}

impl<'a> PostProcessor<'a> {
    pub fn new(features: &'a SpecialFeatureSettings, modifications: &'a ModificationSettings) -> Self {
        Self {
            features,
            modifications,
        }
    }

    /// `boundaries` are the char offsets between blocks in `name`.
    pub fn apply(&self, name: &str, boundaries: &[usize], rng: &mut StdRng) -> String {
        let mut chars: Vec<char> = name.chars().collect();
        let mut boundaries = boundaries.to_vec();

        let f = self.features;
        if triggered(f.probability, f.max_count, f.allowed.is_empty(), rng) {
            for _ in 0..f.max_count {
                let Some((kind, pos)) = place_feature(&chars, &boundaries, f, rng) else {
                    break;
                };
                chars.insert(pos, kind.mark());
                for b in boundaries.iter_mut().filter(|b| **b >= pos) {
                    *b += 1;
                }
            }
        }

        let m = self.modifications;
        if triggered(m.probability, m.max_count, m.allowed.is_empty(), rng) {
            let mut modified = vec![false; chars.len()];
            for _ in 0..m.max_count {
                if !modify_once(&mut chars, &mut modified, m, rng) {
                    break;
                }
            }
        }

        capitalize_segments(&chars)
    }
}

fn triggered(probability: f64, max_count: u32, none_allowed: bool, rng: &mut StdRng) -> bool {
    max_count > 0 && !none_allowed && rng.gen::<f64>() < probability
}

fn is_mark(c: char) -> bool {
    matches!(c, '\'' | '-' | ' ')
}

fn is_consonant(c: char) -> bool {
    c.is_alphabetic() && !is_vowel(c)
}

/// Letters from `pos` back to the previous mark (exclusive of `pos`).
fn segment_before(chars: &[char], pos: usize) -> usize {
    chars[..pos].iter().rev().take_while(|c| !is_mark(**c)).count()
}

fn segment_after(chars: &[char], pos: usize) -> usize {
    chars[pos..].iter().take_while(|c| !is_mark(**c)).count()
}

/// Score inserting `kind` before `chars[i]`. `None` when the rules forbid it.
fn placement_score(kind: FeatureKind, chars: &[char], boundaries: &[usize], i: usize) -> Option<f64> {
    let (before, after) = (chars[i - 1], chars[i]);
    let at_boundary = boundaries.contains(&i);
    let bonus = |cond: bool, v: f64| if cond { v } else { 0.0 };

    let score = match kind {
        FeatureKind::Apostrophe => {
            if !(is_consonant(before) && is_vowel(after)) {
                return None;
            }
            let soft = matches!(before.to_ascii_lowercase(), 'l' | 'r' | 'n' | 't' | 'd' | 's');
            7.0 + bonus(at_boundary, 5.0) + bonus(soft, 2.0)
        }
        FeatureKind::Hyphen => {
            let (left, right) = (segment_before(chars, i), segment_after(chars, i));
            if left < 2 || right < 2 {
                return None;
            }
            let syllable_end = is_vowel(before)
                || (i >= 2 && is_vowel(chars[i - 2]) && is_consonant(before));
            let syllable_start =
                is_consonant(after) && chars.get(i + 1).is_some_and(|&c| is_vowel(c));
            bonus(at_boundary, 7.0)
                + bonus(syllable_end, 3.0)
                + bonus(syllable_start, 3.0)
                + bonus(syllable_end && syllable_start, 2.0)
                + bonus(left.abs_diff(right) <= 3, 3.0)
        }
        FeatureKind::Space => {
            if segment_before(chars, i) < 3 || segment_after(chars, i) < 3 {
                return None;
            }
            5.0 + bonus(at_boundary, 6.0) + bonus(i >= 4 && is_consonant(before), 2.0)
                - bonus(is_vowel(before) && is_consonant(after), 4.0)
        }
    };
    Some(score)
}

/// Pick a kind and an insertion index, weighted by placement score.
fn place_feature(
    chars: &[char],
    boundaries: &[usize],
    settings: &SpecialFeatureSettings,
    rng: &mut StdRng,
) -> Option<(FeatureKind, usize)> {
    let mut options = Vec::new();
    for i in 1..chars.len().saturating_sub(1) {
        if is_mark(chars[i - 1]) || is_mark(chars[i]) {
            continue;
        }
        for &kind in &settings.allowed {
            if let Some(score) = placement_score(kind, chars, boundaries, i) {
                if score > MIN_PLACEMENT_SCORE {
                    options.push((kind, i, score));
                }
            }
        }
    }
    let dist = WeightedIndex::new(options.iter().map(|o| o.2)).ok()?;
    let (kind, pos, _) = options[dist.sample(rng)];
    Some((kind, pos))
}

fn touches_mark(chars: &[char], start: usize, len: usize) -> bool {
    let left = start.checked_sub(1).map(|j| chars[j]);
    let right = chars.get(start + len).copied();
    left.is_some_and(is_mark) || right.is_some_and(is_mark)
}

fn diacritic_options(chars: &[char], modified: &[bool]) -> Vec<(usize, f64)> {
    let last = chars.len().saturating_sub(1);
    (0..chars.len())
        .filter(|&j| !modified[j] && !touches_mark(chars, j, 1))
        .filter(|&j| DIACRITICS.iter().any(|(c, _)| *c == chars[j]))
        .map(|j| {
            let mut weight = 5.0;
            if j == 0 {
                weight -= 1.0;
            }
            if j == last {
                weight -= 0.5;
            }
            if j > 0 && is_consonant(chars[j - 1]) {
                weight += 1.0;
            }
            (j, weight)
        })
        .collect()
}

fn ligature_options(chars: &[char], modified: &[bool]) -> Vec<(usize, f64)> {
    let len = chars.len();
    (0..len.saturating_sub(1))
        .filter(|&j| !modified[j] && !modified[j + 1] && !touches_mark(chars, j, 2))
        .filter(|&j| LIGATURES.iter().any(|(pair, _)| *pair == [chars[j], chars[j + 1]]))
        .map(|j| {
            let mut weight = 7.0;
            if j == 0 {
                weight -= 2.0;
            }
            if j + 2 >= len - 1 {
                weight -= 1.0;
            }
            (j, weight)
        })
        .collect()
}

/// Apply one modification. Returns false when nothing is eligible.
fn modify_once(
    chars: &mut Vec<char>,
    modified: &mut Vec<bool>,
    settings: &ModificationSettings,
    rng: &mut StdRng,
) -> bool {
    let by_kind: Vec<(ModificationKind, Vec<(usize, f64)>)> = settings
        .allowed
        .iter()
        .map(|&kind| {
            let options = match kind {
                ModificationKind::Diacritic => diacritic_options(chars, modified),
                ModificationKind::Ligature => ligature_options(chars, modified),
            };
            (kind, options)
        })
        .filter(|(_, options)| !options.is_empty())
        .collect();

    let Some((kind, options)) = by_kind.choose(rng) else {
        return false;
    };
    let Ok(dist) = WeightedIndex::new(options.iter().map(|o| o.1)) else {
        return false;
    };
    let pos = options[dist.sample(rng)].0;

    match kind {
        ModificationKind::Diacritic => {
            let variant = DIACRITICS
                .iter()
                .find(|(c, _)| *c == chars[pos])
                .and_then(|(_, variants)| variants.choose(rng));
            match variant {
                Some(&v) => chars[pos] = v,
                None => return false,
            }
        }
        ModificationKind::Ligature => {
            let glyph = LIGATURES
                .iter()
                .find(|(pair, _)| *pair == [chars[pos], chars[pos + 1]])
                .map(|(_, g)| *g);
            match glyph {
                Some(g) => {
                    chars[pos] = g;
                    chars.remove(pos + 1);
                    modified.remove(pos + 1);
                }
                None => return false,
            }
        }
    }
    modified[pos] = true;
    true
}

/// Uppercase the first letter and every letter following a hyphen or space.
pub fn capitalize_segments(chars: &[char]) -> String {
    let mut out = String::with_capacity(chars.len());
    let mut start = true;
    for &c in chars {
        if start {
            out.extend(c.to_uppercase());
        } else {
            out.push(c);
        }
        start = matches!(c, '-' | ' ');
    }
    out
}
