//! EMR snippet extraction: one highlighted, truncated excerpt per note.
//!
//! Highlighting runs on the full note text first; truncation then cuts the unstyled text to
//! the configured limit, so a style marker can never be split in half.

use crate::highlight::{truncate_segments, HighlightStrategy, Segment, Target};
use crate::{CoreConfig, ExplainError};
use chrono::NaiveDate;
use hith_fixture::{Note, NoteType, PatientRecord};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Which phrases the snippet panel highlights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HighlightMode {
    /// Positive/negative evidence for the prediction.
    #[default]
    Impact,
    /// Mentions of the patient's concept-graph nodes.
    Concept,
}

impl FromStr for HighlightMode {
    type Err = ExplainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "impact" | "prediction" | "prediction-impact" => Ok(HighlightMode::Impact),
            "concept" | "concepts" => Ok(HighlightMode::Concept),
            _ => Err(ExplainError::UnknownHighlightMode(s.to_string())),
        }
    }
}

impl std::fmt::Display for HighlightMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HighlightMode::Impact => f.write_str("impact"),
            HighlightMode::Concept => f.write_str("concept"),
        }
    }
}

/// A truncated, highlighted excerpt of one note.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Snippet {
    pub note_id: String,
    pub note_type: NoteType,
    pub title: String,
    pub date: NaiveDate,
    pub segments: Vec<Segment>,
    /// The note reached the limit; an ellipsis follows the segments.
    pub truncated: bool,
}

/// Targets for one note.
///
/// Impact mode uses the note's own phrases when it has any, otherwise the configured key
/// terms. Concept mode uses the concept names of the patient's graph (none without a graph).
pub fn targets_for(
    note: &Note,
    record: &PatientRecord,
    mode: HighlightMode,
    cfg: &CoreConfig,
) -> Vec<Target> {
    match mode {
        HighlightMode::Impact => {
            let phrases = if note.highlights.is_empty() {
                cfg.key_terms()
            } else {
                note.highlights.as_slice()
            };
            phrases
                .iter()
                .map(|p| Target::impact(p.phrase.clone(), p.polarity))
                .collect()
        }
        HighlightMode::Concept => record
            .concept_graph
            .as_ref()
            .map(|g| {
                g.nodes
                    .iter()
                    .map(|n| Target::concept(n.name.as_str(), n.id.as_str()))
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Build one snippet per note, in note order.
pub fn extract_snippets(
    record: &PatientRecord,
    mode: HighlightMode,
    cfg: &CoreConfig,
    strategy: &dyn HighlightStrategy,
) -> Vec<Snippet> {
    record
        .notes
        .iter()
        .map(|note| {
            let targets = targets_for(note, record, mode, cfg);
            let segments = strategy.segment(&note.text, &targets);
            let (segments, truncated) = truncate_segments(segments, cfg.snippet_limit());
            tracing::debug!(
                note_id = note.id.as_str(),
                targets = targets.len(),
                truncated,
                "extracted snippet"
            );

            Snippet {
                note_id: note.id.to_string(),
                note_type: note.note_type,
                title: note.title.clone(),
                date: note.date,
                segments,
                truncated,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::highlight::{plain_text, NaiveSubstring, Tag};
    use hith_fixture::Fixture;
    use hith_types::Polarity;
    use std::path::PathBuf;

    fn record(note_content: &str, note_highlights: &str) -> PatientRecord {
        let json = format!(
            r#"{{"patients": [{{
                "id": "P1", "name": "Alice",
                "demographics": {{"age": 70, "gender": "F", "ward": "A", "bed": 1}},
                "eligible": true, "similarity_score": 0.9,
                "clinical_info": {{
                    "diagnosis": "Pneumonia", "medical_specialty": "General Medicine",
                    "notes": [{{"note_id": "N1", "type": "Progress", "title": "Ward round",
                                "date": "2024-03-02", "content": {content},
                                "highlights": {note_highlights}}}]
                }},
                "concept_graph": {{
                    "nodes": [{{"id": "C1", "name": "pneumonia"}}, {{"id": "C2", "name": "oxygen"}}],
                    "edges": [["C1", "C2"]]
                }}
            }}]}}"#,
            content = serde_json::to_string(note_content).expect("json string"),
        );
        Fixture::parse(&json).expect("parse").remove(0)
    }

    fn cfg(limit: usize) -> CoreConfig {
        CoreConfig::new(PathBuf::from("data.json"), limit, 50, 42).expect("cfg")
    }

    #[test]
    fn impact_mode_falls_back_to_key_terms() {
        let r = record("Likely pneumonia, otherwise stable. No sepsis.", "[]");
        let snippets = extract_snippets(&r, HighlightMode::Impact, &cfg(300), &NaiveSubstring);

        assert_eq!(snippets.len(), 1);
        let tags: Vec<_> = snippets[0]
            .segments
            .iter()
            .filter_map(|s| s.tag.clone().map(|t| (s.text.clone(), t)))
            .collect();
        assert_eq!(
            tags,
            vec![
                ("pneumonia".to_string(), Tag::Impact { polarity: Polarity::Positive }),
                ("stable".to_string(), Tag::Impact { polarity: Polarity::Positive }),
                ("sepsis".to_string(), Tag::Impact { polarity: Polarity::Negative }),
            ]
        );
        assert!(!snippets[0].truncated);
    }

    #[test]
    fn note_highlights_replace_key_terms() {
        let r = record(
            "Patient shows stable vitals but recent falls.",
            r#"[{"span": "recent falls", "impact": "negative"}]"#,
        );
        let snippets = extract_snippets(&r, HighlightMode::Impact, &cfg(300), &NaiveSubstring);

        let tagged: Vec<_> = snippets[0].segments.iter().filter(|s| s.tag.is_some()).collect();
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].text, "recent falls");
    }

    #[test]
    fn concept_mode_tags_concept_names() {
        let r = record("CXR consistent with pneumonia; weaning oxygen.", "[]");
        let snippets = extract_snippets(&r, HighlightMode::Concept, &cfg(300), &NaiveSubstring);

        let concept_ids: Vec<_> = snippets[0]
            .segments
            .iter()
            .filter_map(|s| match &s.tag {
                Some(Tag::Concept { id, .. }) => Some(id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(concept_ids, vec!["C1", "C2"]);
    }

    #[test]
    fn long_notes_are_truncated_after_highlighting() {
        let content = format!("{} sepsis", "a".repeat(320));
        let r = record(&content, "[]");
        let snippets = extract_snippets(&r, HighlightMode::Impact, &cfg(300), &NaiveSubstring);

        assert!(snippets[0].truncated);
        assert_eq!(plain_text(&snippets[0].segments).chars().count(), 300);
        assert!(snippets[0].segments.iter().all(|s| s.tag.is_none()));
    }

    #[test]
    fn parses_modes() {
        assert_eq!("Impact".parse::<HighlightMode>().ok(), Some(HighlightMode::Impact));
        assert_eq!("concepts".parse::<HighlightMode>().ok(), Some(HighlightMode::Concept));
        assert!(matches!(
            "colour".parse::<HighlightMode>(),
            Err(ExplainError::UnknownHighlightMode(_))
        ));
    }
}
