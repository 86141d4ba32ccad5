//! Spectrum binning: raw samples -> fixed-cadence binned table.
//!
//! Given a validated `Spectrum` (sorted wavelengths) and a `BinningConfig`,
//! `bin_spectrum` aggregates samples into each bin's half-open window with a
//! single monotonically advancing cursor over the sample array. Windows are
//! ascending and non-overlapping, so the whole scan is O(n + row_count).
//!
//! Boundary policy: once the cursor reaches the end of the sample array it
//! stops advancing and every remaining window is treated as under-populated
//! (possibly empty). Running off the red end of a spectrum is therefore not
//! an error.

use crate::binning::grid::ElementaryGrid;
use crate::domain::{BinnedSpectrumRow, BinningConfig, Spectrum};
use crate::error::AppError;

/// Bin one spectrum onto the configured elementary grid.
///
/// Returns one row per elementary cell, `bin_count * bin_size` in total, in
/// increasing wavelength order. Bins with no contributing samples carry NaN
/// flux and error.
pub fn bin_spectrum(
    spectrum: &Spectrum,
    config: &BinningConfig,
) -> Result<Vec<BinnedSpectrumRow>, AppError> {
    let grid = ElementaryGrid::from_config(config)?;

    let wl = &spectrum.wavelengths;
    let mut mean_flux = vec![f64::NAN; grid.row_count];
    let mut total_err = vec![f64::NAN; grid.row_count];

    let mut j = 0usize;
    for k in 0..grid.bin_count {
        let (window_low, window_high) = grid.window(k);

        // Skip samples below the window.
        while j < wl.len() && wl[j] < window_low {
            j += 1;
        }

        // Collect samples inside [window_low, window_high).
        let mut flux_sum = 0.0;
        let mut err_sq_sum = 0.0;
        let mut count = 0usize;
        while j < wl.len() && wl[j] < window_high {
            flux_sum += spectrum.flux[j];
            err_sq_sum += spectrum.flux_error[j] * spectrum.flux_error[j];
            count += 1;
            j += 1;
        }

        if count == 0 {
            continue; // stays NaN
        }

        let f_mean = flux_sum / count as f64;
        let e_total = err_sq_sum.sqrt();

        // Broadcast the aggregate to all elementary rows of bin k. With
        // bin_size == 1 this is a single assignment.
        for r in k * grid.bin_size..k * grid.bin_size + grid.bin_size {
            mean_flux[r] = f_mean;
            total_err[r] = e_total;
        }
    }

    // An exact 0.0 marks a never-written (or genuinely zero) value; the
    // fitter must see it as missing, not as a measured zero flux.
    for v in mean_flux.iter_mut().chain(total_err.iter_mut()) {
        if *v == 0.0 {
            *v = f64::NAN;
        }
    }

    let rows = (0..grid.row_count)
        .map(|i| BinnedSpectrumRow {
            bin_index: i,
            wl_low: grid.wl_low[i],
            wl_high: grid.wl_high[i],
            mean_flux: mean_flux[i],
            total_flux_error: total_err[i],
        })
        .collect();

    Ok(rows)
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

    fn spectrum(wl: Vec<f64>, flux: Vec<f64>, err: Vec<f64>) -> Spectrum {
        Spectrum::new("test", wl, flux, err).unwrap()
    }

    #[test]
    fn row_count_matches_geometry() {
        let s = spectrum(vec![4000.0, 4001.0], vec![1.0, 2.0], vec![0.1, 0.1]);
        let rows = bin_spectrum(&s, &config(3800.0, 9000.0, 10, 0.5)).unwrap();
        assert_eq!(rows.len(), 10400);
    }

    #[test]
    fn invalid_range_produces_no_rows() {
        let s = spectrum(vec![4000.0], vec![1.0], vec![0.1]);
        assert!(bin_spectrum(&s, &config(9000.0, 3800.0, 10, 0.5)).is_err());
    }

    #[test]
    fn dense_bin_gets_mean_and_quadrature_error() {
        // One aggregated bin covering [0, 10) with two samples.
        let s = spectrum(vec![1.0, 2.0], vec![2.0, 4.0], vec![3.0, 4.0]);
        let rows = bin_spectrum(&s, &config(0.0, 10.0, 2, 5.0)).unwrap();
        assert_eq!(rows.len(), 2);
        for r in &rows {
            assert!((r.mean_flux - 3.0).abs() < 1e-12);
            assert!((r.total_flux_error - 5.0).abs() < 1e-12);
        }
    }

    #[test]
    fn populated_bin_then_empty_bin() {
        // Samples densely cover bin 0 ([0, 5)) and none fall in bin 1 ([5, 10)).
        let s = spectrum(
            vec![1.0, 2.0, 3.0],
            vec![1.0, 2.0, 3.0],
            vec![0.5, 0.5, 0.5],
        );
        let rows = bin_spectrum(&s, &config(0.0, 10.0, 5, 1.0)).unwrap();
        assert_eq!(rows.len(), 10);
        for r in &rows[..5] {
            assert!((r.mean_flux - 2.0).abs() < 1e-12);
            assert!(r.total_flux_error.is_finite());
        }
        for r in &rows[5..] {
            assert!(r.mean_flux.is_nan());
            assert!(r.total_flux_error.is_nan());
        }
    }

    #[test]
    fn zero_aggregates_become_nan() {
        // Fluxes sum to zero and errors are all zero; both aggregates must be
        // reported as NaN, not 0.0.
        let s = spectrum(vec![1.0, 2.0], vec![-1.0, 1.0], vec![0.0, 0.0]);
        let rows = bin_spectrum(&s, &config(0.0, 5.0, 5, 1.0)).unwrap();
        for r in &rows {
            assert!(r.mean_flux.is_nan());
            assert!(r.total_flux_error.is_nan());
        }
    }

    #[test]
    fn bin_size_one_maps_each_bin_to_one_row() {
        let s = spectrum(vec![0.5, 1.5, 2.5], vec![1.0, 2.0, 3.0], vec![0.1, 0.2, 0.3]);
        let rows = bin_spectrum(&s, &config(0.0, 3.0, 1, 1.0)).unwrap();
        assert_eq!(rows.len(), 3);
        assert!((rows[0].mean_flux - 1.0).abs() < 1e-12);
        assert!((rows[1].mean_flux - 2.0).abs() < 1e-12);
        assert!((rows[2].mean_flux - 3.0).abs() < 1e-12);
        assert!((rows[1].total_flux_error - 0.2).abs() < 1e-12);
    }

    #[test]
    fn samples_past_last_window_are_ignored() {
        // Second sample lies beyond the configured range; the scan must stop
        // cleanly without overrun or double-counting.
        let s = spectrum(vec![1.0, 50.0], vec![4.0, 9.0], vec![1.0, 1.0]);
        let rows = bin_spectrum(&s, &config(0.0, 10.0, 2, 5.0)).unwrap();
        for r in &rows {
            assert!((r.mean_flux - 4.0).abs() < 1e-12);
        }
    }

    #[test]
    fn samples_below_range_are_skipped() {
        let s = spectrum(vec![-5.0, 1.0], vec![100.0, 7.0], vec![1.0, 1.0]);
        let rows = bin_spectrum(&s, &config(0.0, 10.0, 2, 5.0)).unwrap();
        assert!((rows[0].mean_flux - 7.0).abs() < 1e-12);
    }

    #[test]
    fn binning_is_deterministic() {
        let s = spectrum(
            (0..200).map(|i| 3800.0 + i as f64 * 1.1).collect(),
            (0..200).map(|i| (i as f64).sin() + 2.0).collect(),
            (0..200).map(|_| 0.3).collect(),
        );
        let cfg = config(3800.0, 9000.0, 10, 0.5);
        let a = bin_spectrum(&s, &cfg).unwrap();
        let b = bin_spectrum(&s, &cfg).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.mean_flux.to_bits(), y.mean_flux.to_bits());
            assert_eq!(x.total_flux_error.to_bits(), y.total_flux_error.to_bits());
        }
    }

    #[test]
    fn elementary_grid_is_monotone_in_output_rows() {
        let s = spectrum(vec![4000.0], vec![1.0], vec![0.1]);
        let rows = bin_spectrum(&s, &config(3800.0, 9000.0, 10, 0.5)).unwrap();
        for w in rows.windows(2) {
            assert!(w[0].wl_low < w[0].wl_high);
            assert_eq!(w[0].wl_high, w[1].wl_low);
        }
    }
}
