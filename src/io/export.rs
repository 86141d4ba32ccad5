//! Writers for the fitter's input files.
//!
//! Three formats, all plain text so they are easy to eyeball:
//!
//! - `.spec` — binned spectrum table, double-tab delimited, header
//!   `# bin  wl_low  wl_up  F<objid>  E<objid>`
//! - `.cat`  — tab-delimited catalog in the fitter schema
//! - `.param` — `KEY = VALUE` lines, derived from a user template with the
//!   `CATALOG` entry rewritten per object

use std::fs;
use std::path::Path;

use crate::domain::{BinnedSpectrumRow, FitterCatalog};
use crate::error::AppError;

/// Render a binned spectrum as `.spec` file contents.
///
/// Column formats follow the fitter's expectations: integer bin index, then
/// four fixed 2-decimal floats. Empty bins render as `nan`.
pub fn spec_contents(rows: &[BinnedSpectrumRow], obj_id: u64) -> String {
    let mut out = String::with_capacity(rows.len() * 48 + 64);
    out.push_str(&format!(
        "# bin\t\twl_low\t\twl_up\t\tF{obj_id}\t\tE{obj_id}\n"
    ));
    for r in rows {
        out.push_str(&format!(
            "{}\t\t{:.2}\t\t{:.2}\t\t{}\t\t{}\n",
            r.bin_index,
            r.wl_low,
            r.wl_high,
            fmt_value(r.mean_flux, 2),
            fmt_value(r.total_flux_error, 2),
        ));
    }
    out
}

/// Write a binned spectrum to `path`.
pub fn write_spec_file(path: &Path, rows: &[BinnedSpectrumRow], obj_id: u64) -> Result<(), AppError> {
    fs::write(path, spec_contents(rows, obj_id)).map_err(|e| {
        AppError::new(2, format!("Failed to write spec file '{}': {e}", path.display()))
    })
}

/// Render a fitter catalog as tab-delimited `.cat` file contents.
///
/// Column order: `#ID`, band columns in original relative order, `z_spec`,
/// `specObjID`.
pub fn catalog_contents(catalog: &FitterCatalog) -> String {
    let mut out = String::new();
    out.push_str("#ID");
    for name in &catalog.band_columns {
        out.push('\t');
        out.push_str(name);
    }
    out.push_str("\tz_spec\tspecObjID\n");

    for row in &catalog.rows {
        out.push_str(&row.id);
        for v in &row.bands {
            out.push('\t');
            out.push_str(&fmt_value(*v, 3));
        }
        out.push('\t');
        out.push_str(&fmt_value(row.z_spec, 4));
        out.push_str(&format!("\t{}\n", row.spec_obj_id));
    }
    out
}

/// Write a fitter catalog to `path`.
pub fn write_catalog_file(path: &Path, catalog: &FitterCatalog) -> Result<(), AppError> {
    fs::write(path, catalog_contents(catalog)).map_err(|e| {
        AppError::new(2, format!("Failed to write catalog '{}': {e}", path.display()))
    })
}

/// Parse fitter parameter text into ordered `KEY = VALUE` entries.
///
/// Blank lines and `#` comments are dropped; the fitter ignores them anyway
/// and per-object files are machine-written.
pub fn parse_param_entries(contents: &str) -> Result<Vec<(String, String)>, AppError> {
    let mut entries = Vec::new();
    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(AppError::new(
                2,
                format!("Parameter line {} is not `KEY = VALUE`: '{line}'", idx + 1),
            ));
        };
        entries.push((key.trim().to_string(), value.trim().to_string()));
    }
    Ok(entries)
}

/// Read a `.param` template from disk.
pub fn read_param_file(path: &Path) -> Result<Vec<(String, String)>, AppError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        AppError::new(2, format!("Failed to read param template '{}': {e}", path.display()))
    })?;
    parse_param_entries(&contents)
}

/// Point a parameter set at a per-object catalog/spectrum file stem.
///
/// The fitter locates every input file through the `CATALOG` entry, so that
/// is the only key rewritten; a template without one gets it appended.
pub fn set_catalog_entry(entries: &mut Vec<(String, String)>, stem: &str) {
    for (key, value) in entries.iter_mut() {
        if key == "CATALOG" {
            *value = stem.to_string();
            return;
        }
    }
    entries.push(("CATALOG".to_string(), stem.to_string()));
}

/// Render parameter entries as `.param` file contents.
pub fn param_contents(entries: &[(String, String)]) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        out.push_str(&format!("{key} = {value}\n"));
    }
    out
}

/// Write a per-object parameter file to `path`.
pub fn write_param_file(path: &Path, entries: &[(String, String)]) -> Result<(), AppError> {
    fs::write(path, param_contents(entries)).map_err(|e| {
        AppError::new(2, format!("Failed to write param file '{}': {e}", path.display()))
    })
}

fn fmt_value(v: f64, decimals: usize) -> String {
    if v.is_nan() {
        "nan".to_string()
    } else {
        format!("{v:.decimals$}")
    }
}
