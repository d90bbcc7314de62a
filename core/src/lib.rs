//! upigen-core — deterministic synthetic UPI transaction generation.
//!
//! Generates a labeled transactions CSV in three strictly ordered
//! phases: account population, legitimate stream (with per-sender
//! running baselines), then multi-pattern fraud injection against the
//! frozen baselines. Given the same seed and window anchor, the
//! output file is byte-for-byte reproducible.

pub mod baseline;
pub mod config;
pub mod error;
pub mod fraud;
pub mod generator;
pub mod geo;
pub mod handles;
pub mod population;
pub mod record;
pub mod rng;
pub mod stream;
pub mod window;
pub mod writer;
