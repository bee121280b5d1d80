//! Patient fixture boundary for the HITH explainability dashboard.
//!
//! This crate owns the on-disk JSON fixture (`{ "patients": [ ... ] }`) and its translation
//! into typed, immutable patient records:
//! - strict wire models for deserialisation
//! - translation helpers from wire structs to domain types
//! - fail-fast validation of required fields, reported with the JSON path of the culprit
//!
//! Nothing here renders or ranks anything; that belongs to `hith-core`.

pub mod concept;
pub mod note;
pub mod patient;

pub use concept::{ConceptGraphData, ConceptNode};
pub use note::{Note, NoteType, TargetPhrase};
pub use patient::{
    ClinicalInfo, Demographics, Eligibility, FeatureScore, PatientRecord, SimilarPatient,
};

use serde::Deserialize;
use std::path::Path;

/// Errors returned by the `hith-fixture` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("failed to read fixture {path}: {source}")]
    Read {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("fixture schema mismatch at {path}: {message}")]
    Schema { path: String, message: String },

    #[error("translation error at {path}: {message}")]
    Translation { path: String, message: String },
}

impl FixtureError {
    pub(crate) fn translation(path: impl Into<String>, message: impl Into<String>) -> Self {
        FixtureError::Translation {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Type alias for Results that can fail with a [`FixtureError`].
pub type FixtureResult<T> = Result<T, FixtureError>;

/// Fixture file operations.
///
/// Zero-sized type used for namespacing; all methods are associated functions.
pub struct Fixture;

impl Fixture {
    /// Parse a fixture from JSON text.
    ///
    /// Uses `serde_path_to_error` so that a schema mismatch names the failing field
    /// (for example `patients[2].clinical_info.diagnosis`).
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Schema`] when the JSON does not match the wire schema and
    /// [`FixtureError::Translation`] when a value is present but unusable (unknown note
    /// type, malformed date, dangling concept edge, non-finite score, ...).
    pub fn parse(json_text: &str) -> FixtureResult<Vec<PatientRecord>> {
        let mut deserializer = serde_json::Deserializer::from_str(json_text);

        let wire = match serde_path_to_error::deserialize::<_, FixtureWire>(&mut deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>".to_string()
                } else {
                    path
                };
                return Err(FixtureError::Schema {
                    path,
                    message: source.to_string(),
                });
            }
        };

        wire.patients
            .into_iter()
            .enumerate()
            .map(|(i, p)| patient::wire_to_domain(p, &format!("patients[{i}]")))
            .collect()
    }

    /// Read and parse a fixture file.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Read`] if the file cannot be read, otherwise the errors of
    /// [`Fixture::parse`].
    pub fn load(path: &Path) -> FixtureResult<Vec<PatientRecord>> {
        let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text)
    }
}

#[derive(Debug, Deserialize)]
struct FixtureWire {
    patients: Vec<patient::PatientWire>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MINIMAL: &str = r#"{
  "patients": [
    {
      "name": "John Doe",
      "demographics": {"age": 72, "gender": "Male", "ward": "4 West", "bed": 12},
      "eligible": true,
      "similarity_score": 0.87,
      "clinical_info": {
        "diagnosis": "Community acquired pneumonia",
        "medical_specialty": "General Medicine"
      }
    }
  ]
}"#;

    #[test]
    fn parses_minimal_fixture() {
        let patients = Fixture::parse(MINIMAL).expect("parse fixture");
        assert_eq!(patients.len(), 1);
        let p = &patients[0];
        assert_eq!(p.id.as_str(), "John Doe");
        assert_eq!(p.demographics.bed, "12");
        assert_eq!(p.eligibility, Eligibility::Eligible);
        assert!(p.notes.is_empty());
        assert!(p.similar_patients.is_empty());
        assert!(p.feature_importance.is_empty());
        assert!(p.concept_graph.is_none());
    }

    #[test]
    fn reports_path_of_missing_required_field() {
        let input = r#"{"patients": [{
            "name": "Jane",
            "demographics": {"age": 60, "gender": "F", "ward": "2", "bed": "3"},
            "eligible": false,
            "similarity_score": 0.5,
            "clinical_info": {"medical_specialty": "Cardiology"}
        }]}"#;

        let err = Fixture::parse(input).expect_err("diagnosis is required");
        match err {
            FixtureError::Schema { path, message } => {
                assert!(path.starts_with("patients[0].clinical_info"), "{path}");
                assert!(message.contains("diagnosis"), "{message}");
            }
            other => panic!("expected Schema error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_missing_patients_key() {
        let err = Fixture::parse("{}").expect_err("patients key is required");
        assert!(matches!(err, FixtureError::Schema { .. }));
    }

    #[test]
    fn rejects_malformed_json() {
        let err = Fixture::parse("{\"patients\": [").expect_err("truncated json");
        assert!(matches!(err, FixtureError::Schema { .. }));
    }

    #[test]
    fn loads_fixture_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(MINIMAL.as_bytes()).expect("write fixture");

        let patients = Fixture::load(file.path()).expect("load fixture");
        assert_eq!(patients[0].name.as_str(), "John Doe");
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = Fixture::load(&dir.path().join("absent.json")).expect_err("no such file");
        assert!(matches!(err, FixtureError::Read { .. }));
    }
}
