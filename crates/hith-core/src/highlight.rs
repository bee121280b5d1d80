//! Phrase highlighting over note text.
//!
//! Highlighting never edits markup. A strategy turns plain text plus a set of
//! `(phrase, tag)` targets into [`Segment`]s that cover the whole input in order; styling
//! is applied later by the renderer. Because tagged segments are never searched again,
//! re-running a strategy over its own output cannot double-style anything.
//!
//! [`NaiveSubstring`] is the only strategy today: exact, case-sensitive substring search
//! with no word-boundary check, so `"stable"` also matches inside `"unstable"`.

use hith_types::Polarity;
use serde::Serialize;

/// What a highlighted span means.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Tag {
    /// Evidence that pushed the prediction one way or the other.
    Impact { polarity: Polarity },
    /// Mention of a concept from the patient's concept graph.
    Concept { id: String, name: String },
}

/// A phrase to look for and the tag its occurrences receive.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub phrase: String,
    pub tag: Tag,
}

impl Target {
    pub fn impact(phrase: impl Into<String>, polarity: Polarity) -> Self {
        Self {
            phrase: phrase.into(),
            tag: Tag::Impact { polarity },
        }
    }

    pub fn concept(phrase: impl Into<String>, id: impl Into<String>) -> Self {
        let phrase = phrase.into();
        Self {
            tag: Tag::Concept {
                id: id.into(),
                name: phrase.clone(),
            },
            phrase,
        }
    }
}

/// A run of text, styled when `tag` is set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub tag: Option<Tag>,
}

impl Segment {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: None,
        }
    }

    pub fn tagged(text: impl Into<String>, tag: Tag) -> Self {
        Self {
            text: text.into(),
            tag: Some(tag),
        }
    }
}

/// A highlighting algorithm.
pub trait HighlightStrategy {
    /// Split `text` into segments covering all of it, tagging target occurrences.
    fn segment(&self, text: &str, targets: &[Target]) -> Vec<Segment>;

    /// Highlight only the untagged parts of an existing segmentation.
    fn refine(&self, segments: Vec<Segment>, targets: &[Target]) -> Vec<Segment> {
        let mut out = Vec::with_capacity(segments.len());
        for seg in segments {
            if seg.tag.is_some() {
                out.push(seg);
            } else {
                for piece in self.segment(&seg.text, targets) {
                    push_segment(&mut out, piece);
                }
            }
        }
        out
    }
}

/// Exact substring matching, applied phrase by phrase in the order given.
///
/// Every occurrence of a phrase is tagged unless it overlaps a span already claimed by an
/// earlier phrase (or an earlier occurrence of the same phrase). Empty phrases are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct NaiveSubstring;

impl HighlightStrategy for NaiveSubstring {
    fn segment(&self, text: &str, targets: &[Target]) -> Vec<Segment> {
        // (start, end, target index), byte offsets
        let mut claims: Vec<(usize, usize, usize)> = Vec::new();

        for (idx, target) in targets.iter().enumerate() {
            let phrase = target.phrase.as_str();
            if phrase.is_empty() {
                continue;
            }

            let mut pos = 0;
            while let Some(found) = text[pos..].find(phrase) {
                let start = pos + found;
                let end = start + phrase.len();
                let overlaps = claims.iter().any(|&(s, e, _)| start < e && s < end);

                if overlaps {
                    // Step a single character so an occurrence starting inside this one is
                    // still considered.
                    pos = start + text[start..].chars().next().map_or(1, char::len_utf8);
                } else {
                    claims.push((start, end, idx));
                    pos = end;
                }
            }
        }

        claims.sort_unstable_by_key(|&(start, _, _)| start);

        let mut out = Vec::with_capacity(claims.len() * 2 + 1);
        let mut cursor = 0;
        for (start, end, idx) in claims {
            if cursor < start {
                push_segment(&mut out, Segment::plain(&text[cursor..start]));
            }
            out.push(Segment::tagged(&text[start..end], targets[idx].tag.clone()));
            cursor = end;
        }
        if cursor < text.len() {
            push_segment(&mut out, Segment::plain(&text[cursor..]));
        }

        out
    }
}

/// Append a segment, merging adjacent untagged text and dropping empty runs.
fn push_segment(out: &mut Vec<Segment>, seg: Segment) {
    if seg.text.is_empty() {
        return;
    }
    if seg.tag.is_none() {
        if let Some(last) = out.last_mut() {
            if last.tag.is_none() {
                last.text.push_str(&seg.text);
                return;
            }
        }
    }
    out.push(seg);
}

/// The unstyled text of a segmentation.
pub fn plain_text(segments: &[Segment]) -> String {
    segments.iter().map(|s| s.text.as_str()).collect()
}

/// Cut a segmentation down to `limit` characters of unstyled text.
///
/// Returns the kept segments and whether the ellipsis marker is due. A tagged span that
/// straddles the limit keeps only its leading part, unstyled. Text shorter than `limit` is
/// returned unchanged; text of exactly `limit` characters keeps every segment but is still
/// marked.
pub fn truncate_segments(segments: Vec<Segment>, limit: usize) -> (Vec<Segment>, bool) {
    let total: usize = segments.iter().map(|s| s.text.chars().count()).sum();
    if total < limit {
        return (segments, false);
    }

    let mut out = Vec::new();
    let mut remaining = limit;
    for seg in segments {
        if remaining == 0 {
            break;
        }
        let len = seg.text.chars().count();
        if len <= remaining {
            remaining -= len;
            push_segment(&mut out, seg);
        } else {
            let head: String = seg.text.chars().take(remaining).collect();
            push_segment(&mut out, Segment::plain(head));
            remaining = 0;
        }
    }

    (out, true)
}
