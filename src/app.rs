//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the priming pipeline (catalog reformat + spectrum binning)
//! - prints run summaries
//! - writes synthetic sample inputs on request

use std::fs;
use std::path::PathBuf;

use clap::Parser;

use crate::binning::bin_spectrum;
use crate::cli::{BinArgs, CatArgs, Command, PrimeArgs, SampleArgs, SpecArgs};
use crate::domain::{BinningConfig, PrimeConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `sedp` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Prime(args) => handle_prime(args),
        Command::Spec(args) => handle_spec(args),
        Command::Cat(args) => handle_cat(args),
        Command::Sample(args) => handle_sample(args),
    }
}

fn handle_prime(args: PrimeArgs) -> Result<(), AppError> {
    let config = prime_config_from_args(&args);
    let output = pipeline::run_prime(&config)?;

    print!("{}", crate::report::format_prime_summary(&output, &config));

    // A run where every spectrum failed is a failed run, even though the
    // catalog went through.
    if output.manifest.objects.is_empty() && !config.spectra_paths.is_empty() {
        return Err(AppError::new(3, "All spectra failed to prime."));
    }
    Ok(())
}

fn handle_spec(args: SpecArgs) -> Result<(), AppError> {
    let spectrum = crate::io::read_spectrum(&args.spectrum)?;
    let obj_id = match args.obj_id {
        Some(id) => id,
        None => crate::io::obj_id_from_stem(&spectrum.source).ok_or_else(|| {
            AppError::new(
                2,
                format!(
                    "Cannot infer an object identifier from '{}'; pass --obj-id.",
                    spectrum.source
                ),
            )
        })?,
    };

    let rows = bin_spectrum(&spectrum, &binning_from_args(&args.bins))?;

    let out = args
        .out
        .unwrap_or_else(|| args.spectrum.with_extension("spec"));
    crate::io::write_spec_file(&out, &rows, obj_id)?;
    println!("Wrote {} rows to '{}'.", rows.len(), out.display());
    Ok(())
}

fn handle_cat(args: CatArgs) -> Result<(), AppError> {
    let raw = crate::io::read_catalog(&args.catalog)?;
    let output = crate::catalog::reformat(&raw, args.flux_unit)?;

    let out = args
        .out
        .unwrap_or_else(|| args.catalog.with_extension("cat"));
    crate::io::write_catalog_file(&out, &output.catalog)?;

    println!(
        "Wrote {} of {} catalog rows to '{}'.",
        output.catalog.rows.len(),
        output.rows_read,
        out.display()
    );
    if !output.row_errors.is_empty() {
        print!("{}", crate::report::format_row_errors(&output.row_errors));
    }
    Ok(())
}

fn handle_sample(args: SampleArgs) -> Result<(), AppError> {
    let config = crate::data::SampleConfig {
        object_count: args.objects,
        seed: args.seed,
        ..crate::data::SampleConfig::default()
    };
    let objects = crate::data::generate_sample(&config)?;

    fs::create_dir_all(&args.out_dir).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to create output directory '{}': {e}", args.out_dir.display()),
        )
    })?;

    let catalog_path = args.out_dir.join("survey.csv");
    fs::write(&catalog_path, crate::data::catalog_csv(&objects)).map_err(|e| {
        AppError::new(2, format!("Failed to write '{}': {e}", catalog_path.display()))
    })?;

    let mut spectrum_paths: Vec<PathBuf> = Vec::with_capacity(objects.len());
    for obj in &objects {
        let path = args.out_dir.join(format!("{}.csv", obj.spectrum_stem()));
        fs::write(&path, crate::data::spectrum_csv(obj)).map_err(|e| {
            AppError::new(2, format!("Failed to write '{}': {e}", path.display()))
        })?;
        spectrum_paths.push(path);
    }

    println!(
        "Wrote catalog '{}' and {} spectra to '{}'.",
        catalog_path.display(),
        spectrum_paths.len(),
        args.out_dir.display()
    );
    Ok(())
}

pub fn prime_config_from_args(args: &PrimeArgs) -> PrimeConfig {
    PrimeConfig {
        run_name: args.run.clone(),
        catalog_path: args.catalog.clone(),
        spectra_paths: args.spectra.clone(),
        out_dir: args.out_dir.clone(),
        flux_unit: args.flux_unit,
        binning: binning_from_args(&args.bins),
        param_template: args.param.clone(),
    }
}

fn binning_from_args(args: &BinArgs) -> BinningConfig {
    BinningConfig {
        bin_size: args.bin_size,
        lambda_step: args.lambda_step,
        lambda_range: (args.lambda_min, args.lambda_max),
    }
}
