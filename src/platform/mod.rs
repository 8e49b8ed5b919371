// BurstScan - platform/mod.rs
//
// Platform abstraction layer: config file location and loading.
// Dependencies: standard library, directories crate, core types.

pub mod config;
