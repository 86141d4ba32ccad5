//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw per-object spectra (`Spectrum`)
//! - binning geometry configuration (`BinningConfig`) and output rows
//!   (`BinnedSpectrumRow`)
//! - survey catalog tables before/after reformatting (`RawCatalog`,
//!   `FitterCatalog`)
//! - run configuration (`PrimeConfig`, `FluxUnit`)

pub mod types;

pub use types::*;
