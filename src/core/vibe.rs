/// Vibe scoring: how well a block's ratings fit the requested ranges.

use crate::schema::block::{VibeProfile, VibeScale};
use crate::schema::request::VibeTarget;

/// Largest possible distance on one 1–10 scale.
const MAX_SCALE_DISTANCE: f64 = (VibeScale::MAX - VibeScale::MIN) as f64;

/// Score in 0..=100; 100 when every rating lies inside its range (bounds
/// inclusive), falling linearly with the summed distance to the nearest bounds.
pub fn score(profile: &VibeProfile, target: &VibeTarget) -> f64 {
    let total: f64 = VibeScale::ALL
        .iter()
        .map(|&scale| f64::from(target.get(scale).distance(profile.get(scale))))
        .sum();
    let max_total = MAX_SCALE_DISTANCE * VibeScale::ALL.len() as f64;
    100.0 * (1.0 - (total / max_total).min(1.0))
}
