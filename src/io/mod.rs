//! Input/output helpers.
//!
//! - raw spectrum + survey catalog ingest (`ingest`)
//! - fitter input file writers: `.spec`, `.cat`, `.param` (`export`)
//! - run manifest JSON output (`manifest`)

pub mod export;
pub mod ingest;
pub mod manifest;

pub use export::*;
pub use ingest::*;
pub use manifest::*;
