//! Synthetic object generation.
//!
//! Produces archive-shaped inputs: raw spectrum tables with `loglam` /
//! `flux` / `ivar` columns and a survey catalog with `objID`, `specObjID`,
//! `z_spec` and per-band `F_*` / `E_*` columns (fluxes in nanomaggies,
//! errors as inverse variances). Generation is fully determined by the seed.

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::AppError;

/// SDSS-style band codes used for the synthetic catalog.
const BANDS: [&str; 5] = ["u", "g", "r", "i", "z"];

/// Synthetic survey object identifiers start here; real SDSS objIDs live in
/// the same magnitude range.
const OBJ_ID_BASE: u64 = 1_237_648_720_000_000_000;

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub object_count: usize,
    pub seed: u64,
    /// Wavelength span covered by the synthetic spectra, Angstroms.
    pub lambda_range: (f64, f64),
    /// Raw sample spacing in Angstroms (~1 Å matches archive spectra).
    pub sample_spacing: f64,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            object_count: 4,
            seed: 42,
            lambda_range: (3800.0, 9000.0),
            sample_spacing: 1.0,
        }
    }
}

/// One synthetic object: its raw spectrum plus catalog photometry.
#[derive(Debug, Clone)]
pub struct SampleObject {
    pub obj_id: u64,
    /// 0 for objects generated without a spectroscopic match.
    pub spec_obj_id: u64,
    pub z_spec: f64,
    pub loglam: Vec<f64>,
    pub flux: Vec<f64>,
    pub ivar: Vec<f64>,
    /// Per-band `(flux_nanomaggy, inverse_variance)` pairs, in `BANDS` order.
    pub photometry: Vec<(f64, f64)>,
}

impl SampleObject {
    /// Spectrum file stem for this object (`spec-<objID>`).
    pub fn spectrum_stem(&self) -> String {
        format!("spec-{}", self.obj_id)
    }
}

/// Generate a deterministic batch of synthetic objects.
pub fn generate_sample(config: &SampleConfig) -> Result<Vec<SampleObject>, AppError> {
    if config.object_count == 0 {
        return Err(AppError::new(2, "Object count must be > 0."));
    }
    let (low, high) = config.lambda_range;
    if !(low.is_finite() && high.is_finite()) || high - low <= 0.0 {
        return Err(AppError::new(
            2,
            format!("Invalid wavelength range for sample generation: ({low}, {high})."),
        ));
    }
    if !(config.sample_spacing.is_finite() && config.sample_spacing > 0.0) {
        return Err(AppError::new(2, "Sample spacing must be finite and > 0."));
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let noise = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let sample_count = ((high - low) / config.sample_spacing).floor() as usize;
    let mut objects = Vec::with_capacity(config.object_count);

    for i in 0..config.object_count {
        let obj_id = OBJ_ID_BASE + rng.gen_range(1_000_000u64..100_000_000) + i as u64;
        let z_spec = rng.gen_range(0.01..0.35);
        // Roughly one object in five has photometry only.
        let has_spectrum = rng.gen_range(0.0..1.0) > 0.2;
        let spec_obj_id = if has_spectrum { obj_id / 2 } else { 0 };

        // Smooth continuum with a broad bump plus Gaussian noise; amplitudes
        // are arbitrary but stay well away from exact zero.
        let continuum = rng.gen_range(5.0..20.0);
        let bump_center = rng.gen_range(low + 500.0..high - 500.0);
        let bump_width = rng.gen_range(300.0..900.0);
        let sigma = continuum * 0.05;

        let mut loglam = Vec::with_capacity(sample_count);
        let mut flux = Vec::with_capacity(sample_count);
        let mut ivar = Vec::with_capacity(sample_count);
        for s in 0..sample_count {
            let lambda = low + s as f64 * config.sample_spacing;
            let bump = (-((lambda - bump_center) / bump_width).powi(2)).exp();
            let f = continuum * (1.0 + 0.5 * bump) + sigma * noise.sample(&mut rng);
            loglam.push(lambda.log10());
            flux.push(f);
            ivar.push(1.0 / (sigma * sigma));
        }

        let photometry = BANDS
            .iter()
            .map(|_| {
                let f_nmgy = rng.gen_range(0.5..50.0);
                let err = f_nmgy * rng.gen_range(0.02..0.10);
                (f_nmgy, 1.0 / (err * err))
            })
            .collect();

        objects.push(SampleObject {
            obj_id,
            spec_obj_id,
            z_spec,
            loglam,
            flux,
            ivar,
            photometry,
        });
    }

    Ok(objects)
}

/// Render one object's raw spectrum as CSV (archive column layout).
pub fn spectrum_csv(object: &SampleObject) -> String {
    let mut out = String::from("flux,loglam,ivar\n");
    for i in 0..object.loglam.len() {
        out.push_str(&format!(
            "{:.5},{:.8},{:.6}\n",
            object.flux[i], object.loglam[i], object.ivar[i]
        ));
    }
    out
}

/// Render the synthetic survey catalog as CSV.
///
/// `specObjID` is written as the literal `null` for photometry-only objects,
/// matching what query services emit for missing joins.
pub fn catalog_csv(objects: &[SampleObject]) -> String {
    let mut out = String::from("objID,specObjID,z_spec");
    for band in BANDS {
        out.push_str(&format!(",F_{band},E_{band}"));
    }
    out.push('\n');

    for obj in objects {
        out.push_str(&obj.obj_id.to_string());
        if obj.spec_obj_id == 0 {
            out.push_str(",null,null");
        } else {
            out.push_str(&format!(",{},{:.5}", obj.spec_obj_id, obj.z_spec));
        }
        for (f, iv) in &obj.photometry {
            out.push_str(&format!(",{f:.5},{iv:.5}"));
        }
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generation_is_seed_deterministic() {
        let config = SampleConfig::default();
        let a = generate_sample(&config).unwrap();
        let b = generate_sample(&config).unwrap();
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.obj_id, y.obj_id);
            assert_eq!(x.flux.len(), y.flux.len());
            assert_eq!(x.flux[0].to_bits(), y.flux[0].to_bits());
        }
    }

    #[test]
    fn spectra_cover_the_configured_range_in_order() {
        let objects = generate_sample(&SampleConfig::default()).unwrap();
        for obj in &objects {
            assert!(obj.loglam.windows(2).all(|w| w[0] < w[1]));
            let first = 10f64.powf(obj.loglam[0]);
            assert!((first - 3800.0).abs() < 1e-6);
        }
    }

    #[test]
    fn catalog_csv_marks_missing_spectra_as_null() {
        let obj = SampleObject {
            obj_id: 10,
            spec_obj_id: 0,
            z_spec: 0.1,
            loglam: vec![3.58],
            flux: vec![1.0],
            ivar: vec![1.0],
            photometry: vec![(1.0, 1.0); 5],
        };
        let text = catalog_csv(&[obj]);
        assert!(text.lines().nth(1).unwrap().starts_with("10,null,null,"));
    }

    #[test]
    fn zero_object_count_is_rejected() {
        let config = SampleConfig {
            object_count: 0,
            ..SampleConfig::default()
        };
        assert!(generate_sample(&config).is_err());
    }
}
