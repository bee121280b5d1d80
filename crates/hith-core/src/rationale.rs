//! Prediction rationale: which record attributes the eligibility label rests on.

use hith_fixture::PatientRecord;
use serde::Serialize;

/// Where a rationale line can link to in the snippets panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "note_id", rename_all = "lowercase")]
pub enum NoteAnchor {
    /// A specific note whose text mentions the value.
    Note(String),
    /// The snippets panel as a whole.
    Snippets,
}

impl NoteAnchor {
    /// Fragment identifier used by the markdown renderer.
    pub fn fragment(&self) -> String {
        match self {
            NoteAnchor::Note(id) => format!("note-{}", slug(id)),
            NoteAnchor::Snippets => "emr-snippets".to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RationaleLine {
    pub label: String,
    pub value: String,
    pub anchor: Option<NoteAnchor>,
}

/// Compose the rationale lines for a record.
///
/// Order is fixed: Condition, Vitals, Blood Results, Medical Specialty, then Similar past
/// cases. Vitals and blood results are omitted when the record has none, as is the similar
/// cases line. Condition is always present.
pub fn compose_rationale(record: &PatientRecord) -> Vec<RationaleLine> {
    let clinical = &record.clinical;
    let mut lines = Vec::with_capacity(5);

    lines.push(line(record, "Condition", clinical.diagnosis.to_string()));

    if !clinical.vitals.is_empty() {
        let vitals = clinical
            .vitals
            .iter()
            .map(|(k, v)| format!("{k} {v}"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(line(record, "Vitals", vitals));
    }

    if !clinical.blood_results.is_empty() {
        let bloods = clinical
            .blood_results
            .iter()
            .map(|(k, v)| format!("{k}: {v}"))
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(line(record, "Blood Results", bloods));
    }

    lines.push(line(
        record,
        "Medical Specialty",
        clinical.medical_specialty.to_string(),
    ));

    if !record.similar_patients.is_empty() {
        let names = record
            .similar_patients
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(RationaleLine {
            label: "Similar past cases".into(),
            value: names,
            anchor: None,
        });
    }

    lines
}

fn line(record: &PatientRecord, label: &str, value: String) -> RationaleLine {
    RationaleLine {
        label: label.to_string(),
        anchor: anchor_for(record, &value),
        value,
    }
}

fn anchor_for(record: &PatientRecord, value: &str) -> Option<NoteAnchor> {
    if record.notes.is_empty() {
        return None;
    }
    let anchor = record
        .notes
        .iter()
        .find(|n| n.text.contains(value))
        .map(|n| NoteAnchor::Note(n.id.to_string()))
        .unwrap_or(NoteAnchor::Snippets);
    Some(anchor)
}

/// Lowercase alphanumerics with runs of anything else collapsed to `-`.
pub(crate) fn slug(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    out.trim_matches('-').to_string()
}
