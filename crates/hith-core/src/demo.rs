//! Inline demo dataset.
//!
//! Two fictional patients with notes, similar cases and a concept graph. Their feature
//! importances are drawn from a seeded RNG and normalised here, standing in for the upstream
//! attribution step, so the demo is reproducible for a given seed.

use crate::dataset::Dataset;
use crate::ExplainResult;
use hith_fixture::Fixture;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Map, Value};

const DEMO_FEATURES: &[&str] = &[
    "Age",
    "CRP trend",
    "Oxygen requirement",
    "IV antibiotics",
    "Lives alone",
    "Mobility score",
    "Heart rate",
    "Previous HITH admission",
];

/// Random importances for `labels`, normalised to sum to 1.
fn generated_importance(rng: &mut StdRng, labels: &[&str]) -> Value {
    let raw: Vec<f64> = labels.iter().map(|_| rng.gen_range(0.05..1.0)).collect();
    let total: f64 = raw.iter().sum();

    let map: Map<String, Value> = labels
        .iter()
        .zip(raw)
        .map(|(label, weight)| {
            let impact = if rng.gen_bool(0.7) { "positive" } else { "negative" };
            (
                (*label).to_string(),
                json!({ "score": weight / total, "impact": impact }),
            )
        })
        .collect();
    Value::Object(map)
}

fn john_smith(rng: &mut StdRng) -> Value {
    json!({
        "id": "P001",
        "name": "John Smith",
        "demographics": {"age": 67, "gender": "Male", "ward": "7 East", "bed": 14},
        "eligible": true,
        "similarity_score": 0.87,
        "clinical_info": {
            "diagnosis": "Community acquired pneumonia",
            "vitals": {"BP": "128/76", "HR": 84},
            "medical_specialty": "General Medicine",
            "blood_results": {"CRP": 48, "WCC": 11.4},
            "notes": [
                {
                    "note_id": "N001",
                    "type": "Triage Note",
                    "title": "ED triage",
                    "date": "2024-03-01",
                    "content": "67M presenting with productive cough and fever for 3 days. \
                                CXR shows right lower lobe consolidation consistent with \
                                pneumonia. Sats 94% on room air. No signs of sepsis."
                },
                {
                    "note_id": "N002",
                    "type": "Progress Note",
                    "title": "Medical ward round",
                    "date": "2024-03-03",
                    "content": "Afebrile for 24 hours, observations stable. Community acquired \
                                pneumonia responding to IV antibiotics, CRP trending down from \
                                112 to 48. Tolerating oral intake and mobilising independently. \
                                Lives with wife who is able to assist. Patient keen for early \
                                discharge. Plan: consider Hospital in the Home referral for \
                                completion of IV antibiotics; PICC line insertion booked for \
                                tomorrow morning pending radiology availability."
                },
                {
                    "note_id": "N003",
                    "type": "Allied Health",
                    "title": "Physiotherapy review",
                    "date": "2024-03-03",
                    "content": "Mobility stable, independent with stairs. Safe for home."
                }
            ]
        },
        "similar_patients": [
            {"id": "S101", "name": "Robert Brown", "key_factors": "Pneumonia, stable vitals, good home support"},
            {"id": "S102", "name": "Linda Green", "key_factors": "IV antibiotics via PICC, age 60-70"}
        ],
        "feature_importance": generated_importance(rng, DEMO_FEATURES),
        "concept_graph": {
            "nodes": [
                {"id": "C1", "name": "pneumonia"},
                {"id": "C2", "name": "IV antibiotics"},
                {"id": "C3", "name": "CRP"},
                {"id": "C4", "name": "PICC"},
                {"id": "C5", "name": "sepsis"}
            ],
            "edges": [["C1", "C2"], ["C1", "C3"], ["C2", "C4"], ["C1", "C5"]]
        }
    })
}

fn mary_jones(rng: &mut StdRng) -> Value {
    json!({
        "id": "P002",
        "name": "Mary Jones",
        "demographics": {"age": 82, "gender": "Female", "ward": "4 West", "bed": "3A"},
        "eligible": "Not Eligible",
        "similarity_score": 0.34,
        "clinical_info": {
            "diagnosis": "Urosepsis",
            "vitals": {"BP": "92/58", "HR": 118},
            "medical_specialty": "Geriatric Medicine",
            "notes": [
                {
                    "note_id": "N201",
                    "type": "Nursing",
                    "title": "Overnight nursing",
                    "date": "2024-02-11",
                    "content": "Hypotensive overnight, fluid bolus given. Remains unstable, \
                                query sepsis source urinary. Two recent falls at home.",
                    "highlights": [
                        {"span": "unstable", "impact": "negative"},
                        {"span": "recent falls", "impact": "negative"}
                    ]
                },
                {
                    "note_id": "N202",
                    "type": "Lab",
                    "title": "Blood cultures",
                    "date": "2024-02-12",
                    "content": "E. coli isolated, sensitive to ceftriaxone."
                }
            ]
        },
        "feature_importance": generated_importance(rng, DEMO_FEATURES),
        "concept_graph": {
            "nodes": [
                {"id": "C5", "name": "sepsis"},
                {"id": "C6", "name": "falls"},
                {"id": "C7", "name": "ceftriaxone"}
            ],
            "edges": [["C5", "C7"]]
        }
    })
}

/// Build the demo dataset.
///
/// # Errors
///
/// Only fails if the inline data stops matching the fixture schema.
pub fn demo_dataset(seed: u64) -> ExplainResult<Dataset> {
    let mut rng = StdRng::seed_from_u64(seed);
    let fixture = json!({
        "patients": [john_smith(&mut rng), mary_jones(&mut rng)]
    });

    let patients = Fixture::parse(&fixture.to_string())?;
    Dataset::from_records(patients)
}
