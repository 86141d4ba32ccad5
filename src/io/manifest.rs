//! Run manifest JSON output.
//!
//! The manifest is the durable record of which object produced which
//! artifacts in a priming run. Downstream stages (fitter invocation, result
//! regrouping) resolve per-object file names through it instead of through
//! scattered key-value dump files.
//!
//! The schema is defined by `RunManifest`.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// One primed object's artifact record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestObject {
    /// Catalog object identifier.
    pub obj_id: u64,
    /// Source spectrum file stem.
    pub source: String,
    /// Emitted `.spec` file name (without directory).
    pub spec_file: String,
}

/// A saved priming-run manifest (JSON).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    pub tool: String,
    pub run: String,
    pub generated_at: DateTime<Utc>,
    /// Emitted `.cat` file name (without directory).
    pub catalog_file: String,
    pub objects: Vec<ManifestObject>,
}

impl RunManifest {
    pub fn new(run: impl Into<String>, catalog_file: impl Into<String>) -> Self {
        Self {
            tool: "sedp".to_string(),
            run: run.into(),
            generated_at: Utc::now(),
            catalog_file: catalog_file.into(),
            objects: Vec::new(),
        }
    }
}

/// Write a manifest JSON file.
pub fn write_manifest(path: &Path, manifest: &RunManifest) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| {
        AppError::new(2, format!("Failed to create manifest '{}': {e}", path.display()))
    })?;
    serde_json::to_writer_pretty(file, manifest)
        .map_err(|e| AppError::new(2, format!("Failed to write manifest JSON: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manifest_serializes_round_trip() {
        let mut manifest = RunManifest::new("run7", "run7.cat");
        manifest.objects.push(ManifestObject {
            obj_id: 1237648720693755918,
            source: "spec-1237648720693755918".to_string(),
            spec_file: "run7-spec-1237648720693755918.spec".to_string(),
        });

        let json = serde_json::to_string(&manifest).unwrap();
        let back: RunManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(back.run, "run7");
        assert_eq!(back.catalog_file, "run7.cat");
        assert_eq!(back.objects.len(), 1);
        assert_eq!(back.objects[0].obj_id, 1237648720693755918);
    }
}
