//! Patient record wire models and translation helpers.
//!
//! Responsibilities:
//! - Define the public, immutable `PatientRecord` and its parts
//! - Define a lenient wire model matching the prototype fixture
//! - Translate wire to domain, failing fast on required fields and unusable values
//!
//! Notes:
//! - The eligibility label and similarity score are precomputed upstream and carried as-is
//! - Feature-importance scores are not normalised here

use crate::concept::{self, ConceptGraphData, ConceptGraphWire};
use crate::note::{self, Note, NoteWire};
use crate::{FixtureError, FixtureResult};
use hith_types::{NonEmptyText, Polarity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Precomputed eligibility label for Hospital in the Home.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Eligibility {
    #[serde(rename = "Eligible")]
    Eligible,
    #[serde(rename = "Not Eligible")]
    NotEligible,
}

impl Eligibility {
    pub fn label(self) -> &'static str {
        match self {
            Eligibility::Eligible => "Eligible",
            Eligibility::NotEligible => "Not Eligible",
        }
    }

    pub fn is_eligible(self) -> bool {
        matches!(self, Eligibility::Eligible)
    }

    fn from_wire(s: &str) -> Option<Self> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match key.as_str() {
            "eligible" | "yes" | "true" => Some(Eligibility::Eligible),
            "noteligible" | "ineligible" | "no" | "false" => Some(Eligibility::NotEligible),
            _ => None,
        }
    }
}

impl std::fmt::Display for Eligibility {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Demographics {
    pub age: u32,
    pub gender: String,
    pub ward: String,
    pub bed: String,
}

/// Clinical summary used by the rationale.
///
/// Vitals and blood results keep the fixture's key order (alphabetical) and are rendered
/// as display strings; numbers are not interpreted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ClinicalInfo {
    pub diagnosis: NonEmptyText,
    pub vitals: Vec<(String, String)>,
    pub medical_specialty: NonEmptyText,
    pub blood_results: Vec<(String, String)>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SimilarPatient {
    pub id: String,
    pub name: NonEmptyText,
    pub key_factors: String,
}

/// One precomputed feature-importance score.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FeatureScore {
    pub label: NonEmptyText,
    pub score: f64,
    pub impact: Polarity,
}

/// A single patient's explanation artifacts. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PatientRecord {
    pub id: NonEmptyText,
    pub name: NonEmptyText,
    pub demographics: Demographics,
    pub eligibility: Eligibility,
    pub similarity_score: f64,
    pub clinical: ClinicalInfo,
    pub notes: Vec<Note>,
    pub similar_patients: Vec<SimilarPatient>,
    pub feature_importance: Vec<FeatureScore>,
    pub concept_graph: Option<ConceptGraphData>,
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct PatientWire {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub demographics: DemographicsWire,
    pub eligible: EligibleWire,
    pub similarity_score: f64,
    pub clinical_info: ClinicalInfoWire,
    #[serde(default)]
    pub similar_patients: Vec<SimilarPatientWire>,
    #[serde(default)]
    pub feature_importance: BTreeMap<String, FeatureWire>,
    #[serde(default)]
    pub concept_graph: Option<ConceptGraphWire>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct DemographicsWire {
    pub age: u32,
    pub gender: String,
    pub ward: ScalarWire,
    pub bed: ScalarWire,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum EligibleWire {
    Flag(bool),
    Label(String),
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct ClinicalInfoWire {
    pub diagnosis: String,
    #[serde(default)]
    pub vitals: BTreeMap<String, ScalarWire>,
    pub medical_specialty: String,
    #[serde(default)]
    pub blood_results: BTreeMap<String, ScalarWire>,
    #[serde(default)]
    pub notes: Vec<NoteWire>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct SimilarPatientWire {
    pub id: ScalarWire,
    pub name: String,
    #[serde(default)]
    pub key_factors: String,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum FeatureWire {
    Score(f64),
    Detailed {
        score: f64,
        #[serde(default)]
        impact: Option<String>,
    },
}

/// Loosely-typed leaf value: `"12"`, `12`, `12.5` and `true` are all accepted.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ScalarWire {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl ScalarWire {
    fn into_display(self) -> String {
        match self {
            ScalarWire::Text(s) => s,
            ScalarWire::Integer(i) => i.to_string(),
            ScalarWire::Float(f) => f.to_string(),
            ScalarWire::Bool(b) => b.to_string(),
        }
    }
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn non_empty(value: &str, path: String) -> FixtureResult<NonEmptyText> {
    NonEmptyText::new(value).map_err(|e| FixtureError::translation(path, e.to_string()))
}

fn finite(value: f64, path: String) -> FixtureResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(FixtureError::translation(path, "score must be a finite number"))
    }
}

fn scalars_to_pairs(map: BTreeMap<String, ScalarWire>) -> Vec<(String, String)> {
    map.into_iter().map(|(k, v)| (k, v.into_display())).collect()
}

/// Convert a wire patient into a domain record. `path` locates it for error messages.
pub(crate) fn wire_to_domain(wire: PatientWire, path: &str) -> FixtureResult<PatientRecord> {
    let name = non_empty(&wire.name, format!("{path}.name"))?;
    let id = match wire.id.as_deref() {
        Some(raw) => non_empty(raw, format!("{path}.id"))?,
        None => name.clone(),
    };

    let eligibility = match wire.eligible {
        EligibleWire::Flag(true) => Eligibility::Eligible,
        EligibleWire::Flag(false) => Eligibility::NotEligible,
        EligibleWire::Label(label) => Eligibility::from_wire(&label).ok_or_else(|| {
            FixtureError::translation(
                format!("{path}.eligible"),
                format!("unknown eligibility label '{label}'"),
            )
        })?,
    };

    let similarity_score = finite(wire.similarity_score, format!("{path}.similarity_score"))?;

    let clinical_path = format!("{path}.clinical_info");
    let ClinicalInfoWire {
        diagnosis,
        vitals,
        medical_specialty,
        blood_results,
        notes,
    } = wire.clinical_info;

    let clinical = ClinicalInfo {
        diagnosis: non_empty(&diagnosis, format!("{clinical_path}.diagnosis"))?,
        vitals: scalars_to_pairs(vitals),
        medical_specialty: non_empty(
            &medical_specialty,
            format!("{clinical_path}.medical_specialty"),
        )?,
        blood_results: scalars_to_pairs(blood_results),
    };

    let notes = notes
        .into_iter()
        .enumerate()
        .map(|(i, n)| note::wire_to_domain(n, &format!("{clinical_path}.notes[{i}]")))
        .collect::<FixtureResult<Vec<_>>>()?;

    let similar_patients = wire
        .similar_patients
        .into_iter()
        .enumerate()
        .map(|(i, sp)| -> FixtureResult<_> {
            Ok(SimilarPatient {
                id: sp.id.into_display(),
                name: non_empty(&sp.name, format!("{path}.similar_patients[{i}].name"))?,
                key_factors: sp.key_factors,
            })
        })
        .collect::<FixtureResult<Vec<_>>>()?;

    let feature_importance = wire
        .feature_importance
        .into_iter()
        .map(|(label, feature)| -> FixtureResult<_> {
            let feature_path = format!("{path}.feature_importance.{label}");
            let (score, impact) = match feature {
                FeatureWire::Score(score) => (score, None),
                FeatureWire::Detailed { score, impact } => (score, impact),
            };
            let impact = match impact.as_deref() {
                None => Polarity::Neutral,
                Some(raw) => Polarity::from_wire(raw).ok_or_else(|| {
                    FixtureError::translation(
                        format!("{feature_path}.impact"),
                        format!("unknown impact '{raw}'"),
                    )
                })?,
            };
            Ok(FeatureScore {
                label: non_empty(&label, feature_path.clone())?,
                score: finite(score, feature_path)?,
                impact,
            })
        })
        .collect::<FixtureResult<Vec<_>>>()?;

    let concept_graph = wire
        .concept_graph
        .map(|g| concept::wire_to_domain(g, &format!("{path}.concept_graph")))
        .transpose()?;

    Ok(PatientRecord {
        id,
        name,
        demographics: Demographics {
            age: wire.demographics.age,
            gender: wire.demographics.gender,
            ward: wire.demographics.ward.into_display(),
            bed: wire.demographics.bed.into_display(),
        },
        eligibility,
        similarity_score,
        clinical,
        notes,
        similar_patients,
        feature_importance,
        concept_graph,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Fixture;

    const FULL: &str = r#"{
  "patients": [
    {
      "id": "P001",
      "name": "John Doe",
      "demographics": {"age": 72, "gender": "Male", "ward": "4 West", "bed": "12"},
      "eligible": "Not Eligible",
      "similarity_score": 0.42,
      "clinical_info": {
        "diagnosis": "Urosepsis",
        "vitals": {"HR": 110, "BP": "95/60"},
        "medical_specialty": "General Medicine",
        "blood_results": {"WCC": 18.5, "CRP": 210},
        "notes": [
          {"note_id": "N1", "type": "Triage Note", "title": "ED triage",
           "date": "2024-03-01", "content": "Febrile, ?sepsis."}
        ]
      },
      "similar_patients": [
        {"id": 7, "name": "Mary Major", "key_factors": "Sepsis, age > 70"}
      ],
      "feature_importance": {
        "Age": 0.2,
        "CRP": {"score": 0.5, "impact": "negative"},
        "Lives alone": {"score": 0.3}
      },
      "concept_graph": {
        "nodes": [{"id": "C1", "name": "Sepsis"}, {"id": "C2", "name": "Fever"}],
        "edges": [["C1", "C2"]]
      }
    }
  ]
}"#;

    fn parse_one(json: &str) -> FixtureResult<PatientRecord> {
        Fixture::parse(json).map(|mut v| v.remove(0))
    }

    #[test]
    fn translates_full_record() {
        let p = parse_one(FULL).expect("parse full record");

        assert_eq!(p.id.as_str(), "P001");
        assert_eq!(p.eligibility, Eligibility::NotEligible);
        assert_eq!(
            p.clinical.vitals,
            vec![
                ("BP".to_string(), "95/60".to_string()),
                ("HR".to_string(), "110".to_string())
            ]
        );
        assert_eq!(p.clinical.blood_results[1], ("WCC".to_string(), "18.5".to_string()));
        assert_eq!(p.notes.len(), 1);
        assert_eq!(p.notes[0].id.as_str(), "N1");
        assert_eq!(p.notes[0].title, "ED triage");
        assert_eq!(p.similar_patients[0].id, "7");

        let crp = p
            .feature_importance
            .iter()
            .find(|f| f.label.as_str() == "CRP")
            .expect("CRP feature");
        assert_eq!(crp.impact, Polarity::Negative);
        assert_eq!(crp.score, 0.5);

        let lives_alone = p
            .feature_importance
            .iter()
            .find(|f| f.label.as_str() == "Lives alone")
            .expect("Lives alone feature");
        assert_eq!(lives_alone.impact, Polarity::Neutral);

        assert_eq!(p.concept_graph.as_ref().map(|g| g.edges.len()), Some(1));
    }

    #[test]
    fn eligibility_labels_are_lenient() {
        assert_eq!(Eligibility::from_wire("Eligible"), Some(Eligibility::Eligible));
        assert_eq!(Eligibility::from_wire("not_eligible"), Some(Eligibility::NotEligible));
        assert_eq!(Eligibility::from_wire("Not-Eligible"), Some(Eligibility::NotEligible));
        assert_eq!(Eligibility::from_wire("pending"), None);
    }

    #[test]
    fn rejects_unknown_eligibility_label() {
        let input = FULL.replace("\"Not Eligible\"", "\"Pending\"");
        let err = parse_one(&input).expect_err("unknown label");
        assert!(matches!(err, FixtureError::Translation { path, .. } if path == "patients[0].eligible"));
    }

    #[test]
    fn rejects_blank_diagnosis() {
        let input = FULL.replace("\"Urosepsis\"", "\"  \"");
        let err = parse_one(&input).expect_err("blank diagnosis");
        match err {
            FixtureError::Translation { path, .. } => {
                assert_eq!(path, "patients[0].clinical_info.diagnosis");
            }
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_feature_impact() {
        let input = FULL.replace("\"impact\": \"negative\"", "\"impact\": \"sideways\"");
        let err = parse_one(&input).expect_err("unknown impact");
        assert!(
            matches!(err, FixtureError::Translation { path, .. } if path == "patients[0].feature_importance.CRP.impact")
        );
    }

    #[test]
    fn reports_wrong_type_with_path() {
        let input = FULL.replace("\"age\": 72", "\"age\": \"old\"");
        let err = parse_one(&input).expect_err("age must be a number");
        match err {
            FixtureError::Schema { path, .. } => assert_eq!(path, "patients[0].demographics.age"),
            other => panic!("expected Schema error, got {other:?}"),
        }
    }
}
