//! Shared priming pipeline used by the CLI front-end.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! catalog ingest -> reformat -> per-object spectrum bin/export -> manifest
//!
//! Objects are independent, so the per-object stage runs in parallel; a
//! failing object is recorded and skipped while its siblings continue.

use std::fs;
use std::path::Path;

use rayon::prelude::*;

use crate::binning::bin_spectrum;
use crate::catalog::{self, RowError};
use crate::domain::PrimeConfig;
use crate::error::AppError;
use crate::io::{
    self, ManifestObject, RunManifest, obj_id_from_stem, read_spectrum, set_catalog_entry,
    source_stem, write_param_file, write_spec_file,
};

/// A per-object failure recorded during priming.
#[derive(Debug, Clone)]
pub struct ObjectFailure {
    pub source: String,
    pub message: String,
}

/// All computed outputs of a single `sedp prime` run.
#[derive(Debug, Clone)]
pub struct PrimeOutput {
    pub manifest: RunManifest,
    /// Catalog rows that could not be converted.
    pub row_errors: Vec<RowError>,
    /// Spectra that could not be primed.
    pub failures: Vec<ObjectFailure>,
    pub catalog_rows_read: usize,
    pub catalog_rows_written: usize,
}

/// Execute the full priming pipeline and return the computed outputs.
pub fn run_prime(config: &PrimeConfig) -> Result<PrimeOutput, AppError> {
    fs::create_dir_all(&config.out_dir).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create output directory '{}': {e}", config.out_dir.display()),
        )
    })?;

    // 1) Catalog: ingest, reformat, write.
    let raw = io::read_catalog(&config.catalog_path)?;
    let reformatted = catalog::reformat(&raw, config.flux_unit)?;
    if reformatted.catalog.rows.is_empty() {
        return Err(AppError::new(
            3,
            "No valid catalog rows remain after reformatting.",
        ));
    }

    let catalog_file = format!("{}.cat", config.run_name);
    io::write_catalog_file(&config.out_dir.join(&catalog_file), &reformatted.catalog)?;

    // 2) Optional parameter template, loaded once and cloned per object.
    let template = match &config.param_template {
        Some(path) => Some(io::read_param_file(path)?),
        None => None,
    };

    // 3) Spectra: bin and export each object independently.
    let results: Vec<Result<ManifestObject, ObjectFailure>> = config
        .spectra_paths
        .par_iter()
        .map(|path| prime_object(path, config, template.as_deref()))
        .collect();

    let mut manifest = RunManifest::new(&config.run_name, &catalog_file);
    let mut failures = Vec::new();
    for result in results {
        match result {
            Ok(object) => manifest.objects.push(object),
            Err(failure) => failures.push(failure),
        }
    }

    // 4) Persist the object -> artifact mapping.
    let manifest_path = config.out_dir.join(format!("{}-manifest.json", config.run_name));
    io::write_manifest(&manifest_path, &manifest)?;

    Ok(PrimeOutput {
        manifest,
        row_errors: reformatted.row_errors,
        failures,
        catalog_rows_read: reformatted.rows_read,
        catalog_rows_written: reformatted.catalog.rows.len(),
    })
}

fn prime_object(
    path: &Path,
    config: &PrimeConfig,
    template: Option<&[(String, String)]>,
) -> Result<ManifestObject, ObjectFailure> {
    let source = source_stem(path);
    let fail = |message: String| ObjectFailure {
        source: source.clone(),
        message,
    };

    let obj_id = obj_id_from_stem(&source)
        .ok_or_else(|| fail("File stem carries no trailing object identifier.".to_string()))?;

    let spectrum = read_spectrum(path).map_err(|e| fail(e.to_string()))?;
    let rows = bin_spectrum(&spectrum, &config.binning).map_err(|e| fail(e.to_string()))?;

    // Per-object artifacts share the "<run>-<source stem>" name the fitter
    // will be pointed at.
    let stem = format!("{}-{}", config.run_name, source);
    let spec_file = format!("{stem}.spec");
    write_spec_file(&config.out_dir.join(&spec_file), &rows, obj_id)
        .map_err(|e| fail(e.to_string()))?;

    if let Some(template) = template {
        let mut entries = template.to_vec();
        set_catalog_entry(&mut entries, &stem);
        write_param_file(&config.out_dir.join(format!("{stem}.param")), &entries)
            .map_err(|e| fail(e.to_string()))?;
    }

    Ok(ManifestObject {
        obj_id,
        source,
        spec_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{SampleConfig, catalog_csv, generate_sample, spectrum_csv};
    use crate::domain::{BinningConfig, FluxUnit};
    use std::path::PathBuf;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sedp-test-{tag}-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn prime_runs_end_to_end_on_synthetic_inputs() {
        let dir = scratch_dir("prime");
        let objects = generate_sample(&SampleConfig {
            object_count: 2,
            ..SampleConfig::default()
        })
        .unwrap();

        let catalog_path = dir.join("survey.csv");
        fs::write(&catalog_path, catalog_csv(&objects)).unwrap();

        let mut spectra_paths = Vec::new();
        for obj in &objects {
            let path = dir.join(format!("{}.csv", obj.spectrum_stem()));
            fs::write(&path, spectrum_csv(obj)).unwrap();
            spectra_paths.push(path);
        }

        let config = PrimeConfig {
            run_name: "run7".to_string(),
            catalog_path,
            spectra_paths,
            out_dir: dir.clone(),
            flux_unit: FluxUnit::Nanomaggy,
            binning: BinningConfig::default(),
            param_template: None,
        };

        let out = run_prime(&config).unwrap();
        assert!(out.failures.is_empty(), "{:?}", out.failures);
        assert_eq!(out.manifest.objects.len(), 2);
        assert_eq!(out.catalog_rows_written, 2);

        assert!(dir.join("run7.cat").exists());
        assert!(dir.join("run7-manifest.json").exists());
        for obj in &out.manifest.objects {
            assert!(dir.join(&obj.spec_file).exists());
        }

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn bad_spectrum_is_skipped_while_siblings_survive() {
        let dir = scratch_dir("skip");
        let objects = generate_sample(&SampleConfig {
            object_count: 1,
            ..SampleConfig::default()
        })
        .unwrap();

        let catalog_path = dir.join("survey.csv");
        fs::write(&catalog_path, catalog_csv(&objects)).unwrap();

        let good = dir.join(format!("{}.csv", objects[0].spectrum_stem()));
        fs::write(&good, spectrum_csv(&objects[0])).unwrap();
        let bad = dir.join("spec-999.csv");
        fs::write(&bad, "flux,loglam,ivar\noops,3.58,1.0\n").unwrap();

        let config = PrimeConfig {
            run_name: "runx".to_string(),
            catalog_path,
            spectra_paths: vec![good, bad],
            out_dir: dir.clone(),
            flux_unit: FluxUnit::Nanomaggy,
            binning: BinningConfig::default(),
            param_template: None,
        };

        let out = run_prime(&config).unwrap();
        assert_eq!(out.manifest.objects.len(), 1);
        assert_eq!(out.failures.len(), 1);
        assert_eq!(out.failures[0].source, "spec-999");

        fs::remove_dir_all(&dir).ok();
    }
}
