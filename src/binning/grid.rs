//! Elementary wavelength-grid generation.
//!
//! The binner works on a fixed grid that is fully determined by the
//! `BinningConfig`, independent of the observed samples:
//!
//! - `bin_count = ceil((high - low) / (bin_size * lambda_step))` aggregated bins
//! - `row_count = bin_count * bin_size` elementary cells
//! - cell edges are `row_count + 1` linearly spaced points over `[low, high]`
//!
//! Aggregated bin `k` spans the union of its `bin_size` elementary cells.

use crate::domain::BinningConfig;
use crate::error::AppError;

/// The elementary wavelength grid derived from a `BinningConfig`.
#[derive(Debug, Clone)]
pub struct ElementaryGrid {
    pub bin_size: usize,
    pub bin_count: usize,
    pub row_count: usize,
    /// Lower wavelength bound per elementary cell (length `row_count`).
    pub wl_low: Vec<f64>,
    /// Upper wavelength bound per elementary cell (length `row_count`).
    pub wl_high: Vec<f64>,
}

impl ElementaryGrid {
    /// Build the grid, validating the configured geometry.
    ///
    /// A non-positive wavelength span is a fatal configuration error: no
    /// rows are produced for the object.
    pub fn from_config(config: &BinningConfig) -> Result<Self, AppError> {
        let (low, high) = config.lambda_range;
        if !(low.is_finite() && high.is_finite()) || high - low <= 0.0 {
            return Err(AppError::new(
                2,
                format!("Invalid wavelength range: ({low}, {high}) (span must be finite and > 0)."),
            ));
        }
        if config.bin_size == 0 {
            return Err(AppError::new(2, "Bin size must be > 0."));
        }
        if !(config.lambda_step.is_finite() && config.lambda_step > 0.0) {
            return Err(AppError::new(
                2,
                format!("Invalid lambda step: {} (must be finite and > 0).", config.lambda_step),
            ));
        }

        let bin_count =
            ((high - low) / (config.bin_size as f64 * config.lambda_step)).ceil() as usize;
        let row_count = bin_count * config.bin_size;

        // row_count + 1 evenly spaced edges; cell i spans edge i to edge i+1.
        let mut edges = Vec::with_capacity(row_count + 1);
        for i in 0..=row_count {
            let u = i as f64 / row_count as f64;
            edges.push(low + u * (high - low));
        }

        let wl_low = edges[..row_count].to_vec();
        let wl_high = edges[1..].to_vec();

        Ok(Self {
            bin_size: config.bin_size,
            bin_count,
            row_count,
            wl_low,
            wl_high,
        })
    }

    /// Half-open wavelength window `[low, high)` of aggregated bin `k`.
    pub fn window(&self, k: usize) -> (f64, f64) {
        let lo = self.wl_low[k * self.bin_size];
        let hi = self.wl_high[k * self.bin_size + self.bin_size - 1];
        (lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(low: f64, high: f64, bin_size: usize, step: f64) -> BinningConfig {
        BinningConfig {
            bin_size,
            lambda_step: step,
            lambda_range: (low, high),
        }
    }

    #[test]
    fn sdss_default_geometry() {
        // (9000 - 3800) / (10 * 0.5) = 1040 aggregated bins, 10400 rows.
        let grid = ElementaryGrid::from_config(&config(3800.0, 9000.0, 10, 0.5)).unwrap();
        assert_eq!(grid.bin_count, 1040);
        assert_eq!(grid.row_count, 10400);
        assert_eq!(grid.wl_low.len(), 10400);
        assert_eq!(grid.wl_high.len(), 10400);
    }

    #[test]
    fn ragged_span_rounds_bin_count_up() {
        let grid = ElementaryGrid::from_config(&config(0.0, 11.0, 2, 1.0)).unwrap();
        assert_eq!(grid.bin_count, 6);
        assert_eq!(grid.row_count, 12);
    }

    #[test]
    fn cells_are_contiguous_and_increasing() {
        let grid = ElementaryGrid::from_config(&config(3800.0, 9000.0, 10, 0.5)).unwrap();
        for i in 0..grid.row_count {
            assert!(grid.wl_low[i] < grid.wl_high[i]);
            if i + 1 < grid.row_count {
                assert_eq!(grid.wl_high[i], grid.wl_low[i + 1]);
            }
        }
        assert!((grid.wl_low[0] - 3800.0).abs() < 1e-9);
        assert!((grid.wl_high[grid.row_count - 1] - 9000.0).abs() < 1e-9);
    }

    #[test]
    fn windows_cover_bin_size_cells() {
        let grid = ElementaryGrid::from_config(&config(4000.0, 4100.0, 4, 5.0)).unwrap();
        let (lo, hi) = grid.window(0);
        assert!((lo - 4000.0).abs() < 1e-9);
        assert!((hi - grid.wl_high[3]).abs() < 1e-9);
    }

    #[test]
    fn invalid_range_is_rejected() {
        assert!(ElementaryGrid::from_config(&config(9000.0, 3800.0, 10, 0.5)).is_err());
        assert!(ElementaryGrid::from_config(&config(3800.0, 3800.0, 10, 0.5)).is_err());
    }

    #[test]
    fn degenerate_step_and_bin_size_are_rejected() {
        assert!(ElementaryGrid::from_config(&config(0.0, 1.0, 0, 0.5)).is_err());
        assert!(ElementaryGrid::from_config(&config(0.0, 1.0, 1, 0.0)).is_err());
    }
}
