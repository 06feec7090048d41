//! Plain data types shared by the engine, the presets and the web boundary.

pub mod block;
pub mod request;
pub mod scoring;
