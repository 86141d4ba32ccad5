//! Synthetic input generation.
//!
//! Deterministic, seeded fake survey data (raw spectra + a photometric
//! catalog) so the pipeline can be exercised end-to-end without touching a
//! remote archive.

pub mod sample;

pub use sample::*;
