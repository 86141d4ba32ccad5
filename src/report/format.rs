use crate::app::pipeline::PrimeOutput;
use crate::catalog::RowError;
use crate::domain::PrimeConfig;

/// Format the full priming-run summary (catalog stats + per-object results).
pub fn format_prime_summary(output: &PrimeOutput, config: &PrimeConfig) -> String {
    let mut out = String::new();

    out.push_str("=== sedp - SED fitter preparation ===\n");
    out.push_str(&format!("Run: {}\n", config.run_name));
    out.push_str(&format!(
        "Flux unit: {:?} (factor {})\n",
        config.flux_unit,
        config.flux_unit.conversion_factor()
    ));
    out.push_str(&format!(
        "Bins: size={} | step={} A | range=[{}, {}] A\n",
        config.binning.bin_size,
        config.binning.lambda_step,
        config.binning.lambda_range.0,
        config.binning.lambda_range.1,
    ));

    out.push_str(&format!(
        "Catalog: {} rows read, {} written -> {}\n",
        output.catalog_rows_read,
        output.catalog_rows_written,
        output.manifest.catalog_file,
    ));
    out.push_str(&format!(
        "Spectra: {} primed, {} skipped\n",
        output.manifest.objects.len(),
        output.failures.len(),
    ));

    if !output.row_errors.is_empty() {
        out.push_str("\nCatalog rows skipped:\n");
        out.push_str(&format_row_errors(&output.row_errors));
    }

    if !output.failures.is_empty() {
        out.push_str("\nSpectra skipped:\n");
        for f in &output.failures {
            out.push_str(&format!("- {}: {}\n", f.source, f.message));
        }
    }

    out
}

/// Format catalog row-level errors, one line each.
pub fn format_row_errors(errors: &[RowError]) -> String {
    let mut out = String::new();
    for e in errors {
        match &e.id {
            Some(id) => out.push_str(&format!("- row {} (objID {}): {}\n", e.row, id, e.message)),
            None => out.push_str(&format!("- row {}: {}\n", e.row, e.message)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_errors_render_with_and_without_id() {
        let errors = vec![
            RowError {
                row: 3,
                id: None,
                message: "Missing `objID` value.".to_string(),
            },
            RowError {
                row: 4,
                id: Some("42".to_string()),
                message: "Invalid `specObjID` value 'x'.".to_string(),
            },
        ];
        let text = format_row_errors(&errors);
        assert!(text.contains("- row 3: Missing"));
        assert!(text.contains("- row 4 (objID 42): Invalid"));
    }
}
