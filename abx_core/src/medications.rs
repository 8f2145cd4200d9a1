//! Co-medication list loader.
//!
//! Loads the patient's currently co-administered drugs exported by an external
//! formulary/prescription service. The service is optional: a missing or
//! unreadable export means "co-medications unknown" and the interaction check
//! is skipped.

use crate::Result;
use serde::Deserialize;
use std::path::Path;

/// Accepted export shapes
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MedicationFile {
    List(Vec<String>),
    Wrapped { medications: Vec<String> },
}

/// Load the co-medication list from a JSON file
///
/// Accepts either a bare array of names or `{ "medications": [...] }`.
/// Returns None if the file doesn't exist or cannot be read or parsed.
pub fn load_current_medications(path: &Path) -> Result<Option<Vec<String>>> {
    if !path.exists() {
        tracing::debug!("No medication list found at {:?}", path);
        return Ok(None);
    }

    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            tracing::warn!(
                "Failed to read medication list at {:?}: {}. Skipping interaction check.",
                path,
                e
            );
            return Ok(None);
        }
    };

    let file: MedicationFile = match serde_json::from_str(&contents) {
        Ok(file) => file,
        Err(e) => {
            tracing::warn!(
                "Failed to parse medication list at {:?}: {}. Skipping interaction check.",
                path,
                e
            );
            return Ok(None);
        }
    };

    let medications: Vec<String> = match file {
        MedicationFile::List(list) | MedicationFile::Wrapped { medications: list } => list,
    }
    .into_iter()
    .map(|name| name.trim().to_string())
    .filter(|name| !name.is_empty())
    .collect();

    tracing::info!("Loaded {} co-medication(s) from {:?}", medications.len(), path);
    Ok(Some(medications))
}
