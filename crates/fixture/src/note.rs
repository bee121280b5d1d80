//! Clinical notes attached to a patient record.

use crate::{FixtureError, FixtureResult};
use chrono::NaiveDate;
use hith_types::{NonEmptyText, Polarity};
use serde::{Deserialize, Serialize};

// ============================================================================
// Public domain-level types
// ============================================================================

/// Kind of clinical note.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoteType {
    Triage,
    Progress,
    AlliedHealth,
    Lab,
    Radiology,
    Nursing,
}

impl NoteType {
    /// Human-readable label used as a snippet heading.
    pub fn label(self) -> &'static str {
        match self {
            NoteType::Triage => "Triage Note",
            NoteType::Progress => "Progress Note",
            NoteType::AlliedHealth => "Allied Health Note",
            NoteType::Lab => "Lab Report",
            NoteType::Radiology => "Radiology Report",
            NoteType::Nursing => "Nursing Note",
        }
    }

    /// Parse from the fixture's spelling.
    ///
    /// Case, spaces and underscores are ignored, as is a trailing "note"/"report", so
    /// `"Progress Note"`, `"progress"` and `"PROGRESS_NOTE"` are all accepted.
    pub fn from_wire(s: &str) -> Option<Self> {
        let normalised = s.trim().to_ascii_lowercase().replace([' ', '_'], "-");
        let key = ["-notes", "-note", "-reports", "-report"]
            .iter()
            .find_map(|suffix| normalised.strip_suffix(suffix))
            .unwrap_or(&normalised);

        match key {
            "triage" | "ed-triage" => Some(NoteType::Triage),
            "progress" => Some(NoteType::Progress),
            "allied-health" | "allied" | "ahp" => Some(NoteType::AlliedHealth),
            "lab" | "labs" | "laboratory" | "pathology" => Some(NoteType::Lab),
            "radiology" | "imaging" => Some(NoteType::Radiology),
            "nursing" | "nurse" => Some(NoteType::Nursing),
            _ => None,
        }
    }
}

impl std::fmt::Display for NoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A phrase the fixture flags for impact highlighting within one note.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TargetPhrase {
    /// Literal, case-sensitive phrase. Never empty; surrounding whitespace is kept.
    pub phrase: String,
    pub polarity: Polarity,
}

/// A clinical note. Belongs to exactly one patient record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Note {
    pub id: NonEmptyText,
    pub note_type: NoteType,
    pub title: String,
    pub date: NaiveDate,
    pub text: String,
    /// Note-specific highlight phrases; empty means "use the configured key terms".
    pub highlights: Vec<TargetPhrase>,
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct NoteWire {
    pub note_id: String,
    #[serde(rename = "type")]
    pub note_type: String,
    pub title: String,
    pub date: String,
    pub content: String,
    #[serde(default)]
    pub highlights: Vec<TargetPhraseWire>,
}

#[derive(Clone, Debug, Deserialize)]
pub(crate) struct TargetPhraseWire {
    pub span: String,
    #[serde(default)]
    pub impact: Option<String>,
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

pub(crate) fn wire_to_domain(wire: NoteWire, path: &str) -> FixtureResult<Note> {
    let id = NonEmptyText::new(&wire.note_id)
        .map_err(|e| FixtureError::translation(format!("{path}.note_id"), e.to_string()))?;

    let note_type = NoteType::from_wire(&wire.note_type).ok_or_else(|| {
        FixtureError::translation(
            format!("{path}.type"),
            format!("unknown note type '{}'", wire.note_type),
        )
    })?;

    let date = NaiveDate::parse_from_str(wire.date.trim(), "%Y-%m-%d").map_err(|e| {
        FixtureError::translation(
            format!("{path}.date"),
            format!("expected YYYY-MM-DD, got '{}': {e}", wire.date),
        )
    })?;

    let highlights = wire
        .highlights
        .into_iter()
        .enumerate()
        .map(|(i, h)| phrase_to_domain(h, &format!("{path}.highlights[{i}]")))
        .collect::<FixtureResult<Vec<_>>>()?;

    Ok(Note {
        id,
        note_type,
        title: wire.title,
        date,
        text: wire.content,
        highlights,
    })
}

fn phrase_to_domain(wire: TargetPhraseWire, path: &str) -> FixtureResult<TargetPhrase> {
    if wire.span.is_empty() {
        return Err(FixtureError::translation(
            format!("{path}.span"),
            "highlight span cannot be empty",
        ));
    }

    let polarity = match wire.impact.as_deref() {
        None => Polarity::Neutral,
        Some(raw) => Polarity::from_wire(raw).ok_or_else(|| {
            FixtureError::translation(format!("{path}.impact"), format!("unknown impact '{raw}'"))
        })?,
    };

    Ok(TargetPhrase {
        phrase: wire.span,
        polarity,
    })
}
