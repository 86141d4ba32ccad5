//! Catalog reformatting.
//!
//! Responsibilities:
//!
//! - select the identifier / redshift / band columns out of a heterogeneous
//!   survey table
//! - convert inverse variances to standard errors and apply the flux unit
//!   conversion
//! - emit rows in the fitter's fixed schema

pub mod reformat;

pub use reformat::*;
