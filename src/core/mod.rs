pub mod assembler;
pub mod block_count;
pub mod catalog;
pub mod compat;
pub mod generator;
pub mod pairs;
pub mod postprocess;
pub mod selector;
pub mod vibe;
