//! Satellite catalogs stored as JSON.
//!
//! ```text
//! {
//!   "satellites": [
//!     {
//!       "catalog_number": "25544", "name": "ISS", "owner": "NASA", "mission": "station",
//!       "elements": {
//!         "epoch": "2024-01-01T00:00:00Z", "inclination_deg": 51.64, "raan_deg": 120.0,
//!         "eccentricity": 0.0005, "arg_perigee_deg": 90.0, "mean_anomaly_deg": 0.0,
//!         "mean_motion": 15.5
//!       }
//!     }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use super::satellite::{OrbitalElements, Satellite};

/// Errors loading a satellite catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read satellite catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse satellite catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    satellites: Vec<SatelliteRecord>,
}

#[derive(Debug, Deserialize)]
struct SatelliteRecord {
    catalog_number: String,
    name: String,
    #[serde(default)]
    owner: String,
    #[serde(default)]
    mission: String,
    elements: OrbitalElements,
}

fn elements_are_valid(elements: &OrbitalElements) -> bool {
    (0.0..1.0).contains(&elements.eccentricity)
        && elements.mean_motion > 0.0
        && elements.mean_motion.is_finite()
}

/// Parses a catalog, skipping records whose elements cannot be propagated.
pub fn parse_catalog(json: &str, origin: &Path) -> Result<Vec<Satellite>, CatalogError> {
    let file: CatalogFile = serde_json::from_str(json).map_err(|source| CatalogError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;

    let total = file.satellites.len();
    let satellites: Vec<Satellite> = file
        .satellites
        .into_iter()
        .filter(|record| {
            let valid = elements_are_valid(&record.elements);
            if !valid {
                warn!(
                    catalog_number = %record.catalog_number,
                    "Skipping satellite with unusable orbital elements"
                );
            }
            valid
        })
        .map(|record| {
            Satellite::new(
                record.catalog_number,
                record.name,
                record.owner,
                record.mission,
                record.elements,
            )
        })
        .collect();

    info!(
        catalog = %origin.display(),
        loaded = satellites.len(),
        total,
        "Loaded satellite catalog"
    );
    Ok(satellites)
}

/// Loads a catalog file.
pub fn load_catalog(path: &Path) -> Result<Vec<Satellite>, CatalogError> {
    let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&json, path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CATALOG: &str = r#"{
        "satellites": [
            { "catalog_number": "25544", "name": "ISS", "owner": "NASA", "mission": "station",
              "elements": { "epoch": "2024-01-01T00:00:00Z", "inclination_deg": 51.64,
                            "raan_deg": 120.0, "eccentricity": 0.0005, "arg_perigee_deg": 90.0,
                            "mean_anomaly_deg": 0.0, "mean_motion": 15.5 } },
            { "catalog_number": "99999", "name": "Broken",
              "elements": { "epoch": "2024-01-01T00:00:00Z", "inclination_deg": 0.0,
                            "raan_deg": 0.0, "eccentricity": 1.5, "arg_perigee_deg": 0.0,
                            "mean_anomaly_deg": 0.0, "mean_motion": 1.0 } }
        ]
    }"#;

    #[test]
    fn test_load_skips_invalid_elements() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CATALOG.as_bytes()).unwrap();

        let satellites = load_catalog(file.path()).unwrap();
        assert_eq!(satellites.len(), 1);
        assert_eq!(satellites[0].catalog_number(), "25544");
        assert_eq!(satellites[0].map_name(), "NASA:ISS");
    }

    #[test]
    fn test_parse_error() {
        let result = parse_catalog("[]", Path::new("sats.json"));
        assert!(matches!(result, Err(CatalogError::Parse { .. })));
    }

    #[test]
    fn test_missing_file() {
        let result = load_catalog(Path::new("/nonexistent/sats.json"));
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
