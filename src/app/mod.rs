// BurstScan - app/mod.rs
//
// Application layer: drives the core over input streams.

pub mod pipeline;
