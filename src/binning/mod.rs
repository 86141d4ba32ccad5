//! Spectral binning.
//!
//! Responsibilities:
//!
//! - build the fixed elementary wavelength grid from a `BinningConfig`
//! - aggregate raw samples into per-bin mean flux / quadrature error
//! - broadcast aggregated values across each bin's elementary rows

pub mod binner;
pub mod grid;

pub use binner::*;
pub use grid::*;
