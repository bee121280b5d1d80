//! The loaded patient collection.
//!
//! A `Dataset` is built once at startup and then only read. It is passed explicitly (usually
//! behind an `Arc`) to whatever renders dashboards; there is no process-wide copy.

use crate::{CoreConfig, ExplainError, ExplainResult};
use hith_fixture::{Eligibility, Fixture, PatientRecord};
use serde::Serialize;
use std::collections::HashSet;

/// One entry of the patient picker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PickerEntry {
    pub id: String,
    pub name: String,
    pub eligibility: Eligibility,
}

#[derive(Clone, Debug)]
pub struct Dataset {
    patients: Vec<PatientRecord>,
}

impl Dataset {
    /// Wrap already-parsed records, keeping fixture order.
    ///
    /// # Errors
    ///
    /// Returns `ExplainError::DuplicatePatient` if two records share an id.
    pub fn from_records(patients: Vec<PatientRecord>) -> ExplainResult<Self> {
        let mut seen = HashSet::new();
        for p in &patients {
            if !seen.insert(p.id.as_str()) {
                return Err(ExplainError::DuplicatePatient(p.id.to_string()));
            }
        }
        Ok(Self { patients })
    }

    /// Load the fixture named by `cfg`.
    ///
    /// # Errors
    ///
    /// Any fixture read or schema error is fatal and returned as `ExplainError::Fixture`.
    pub fn load(cfg: &CoreConfig) -> ExplainResult<Self> {
        let path = cfg.fixture_path();
        let patients = Fixture::load(path)?;
        let dataset = Self::from_records(patients)?;
        tracing::info!(
            "loaded {} patients from {}",
            dataset.patients.len(),
            path.display()
        );
        Ok(dataset)
    }

    pub fn patients(&self) -> &[PatientRecord] {
        &self.patients
    }

    pub fn len(&self) -> usize {
        self.patients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patients.is_empty()
    }

    /// Find a patient by id, falling back to an exact name match.
    pub fn get(&self, key: &str) -> Option<&PatientRecord> {
        self.patients
            .iter()
            .find(|p| p.id.as_str() == key)
            .or_else(|| self.patients.iter().find(|p| p.name.as_str() == key))
    }

    /// Like [`Dataset::get`] but reports a missing patient as an error.
    pub fn require(&self, key: &str) -> ExplainResult<&PatientRecord> {
        self.get(key)
            .ok_or_else(|| ExplainError::PatientNotFound(key.to_string()))
    }

    /// Picker entries in fixture order.
    pub fn picker(&self) -> Vec<PickerEntry> {
        self.patients
            .iter()
            .map(|p| PickerEntry {
                id: p.id.to_string(),
                name: p.name.to_string(),
                eligibility: p.eligibility,
            })
            .collect()
    }
}
