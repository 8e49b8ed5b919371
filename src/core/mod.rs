// BurstScan - core/mod.rs
//
// Core business logic layer.
// Must NOT depend on: app, platform, or any filesystem access.

pub mod detector;
pub mod filter;
pub mod model;
pub mod normalizer;
pub mod report;
pub mod template;
pub mod tokenizer;
