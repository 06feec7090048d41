//! Fantasy Namegen: procedural fantasy character names.
//!
//! Names are assembled from themed prefix, middle and suffix blocks. Every
//! candidate block is scored against a requested aesthetic ("vibe") and
//! against the phonetic flow of the join it would create, then the finished
//! name is optionally decorated with apostrophes, hyphens, diacritics and
//! ligatures.

pub mod api;
pub mod core;
pub mod presets;
pub mod schema;
