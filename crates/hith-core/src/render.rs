//! Markdown and inline-HTML rendering of dashboard views.
//!
//! The output targets renderers that accept raw HTML inside markdown. Fixture text is
//! HTML-escaped before any styling is added, so every tag in the output was put there by
//! this module.

use crate::concept_graph::GraphLayout;
use crate::constants::ELLIPSIS;
use crate::dashboard::{DashboardView, PredictionSummary, SimilarPatientsPanel};
use crate::highlight::{Segment, Tag};
use crate::importance::RankedFeature;
use crate::rationale::{slug, RationaleLine};
use crate::snippets::Snippet;
use hith_fixture::Eligibility;
use hith_types::Polarity;

/// Width, in cells, of the longest importance bar.
const BAR_WIDTH: usize = 30;

/// Escape `&`, `<`, `>`, `"` and `'` for inclusion in HTML text or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn style_for(tag: &Tag) -> &'static str {
    match tag {
        Tag::Impact {
            polarity: Polarity::Positive,
        } => "color: green; font-weight: bold;",
        Tag::Impact {
            polarity: Polarity::Negative,
        } => "color: red; font-style: italic; font-weight: bold;",
        Tag::Impact {
            polarity: Polarity::Neutral,
        } => "font-weight: bold;",
        Tag::Concept { .. } => "background-color: #fff3b0; font-weight: bold;",
    }
}

/// Render segments as escaped text with styled `<span>`s, plus the ellipsis when truncated.
pub fn render_segments(segments: &[Segment], truncated: bool) -> String {
    let mut out = String::new();
    for seg in segments {
        let text = escape_html(&seg.text);
        match &seg.tag {
            None => out.push_str(&text),
            Some(tag @ Tag::Concept { id, name }) => {
                let title = escape_html(&format!("{id}: {name}"));
                out.push_str(&format!(
                    r#"<span style="{}" title="{title}">{text}</span>"#,
                    style_for(tag)
                ));
            }
            Some(tag) => {
                out.push_str(&format!(r#"<span style="{}">{text}</span>"#, style_for(tag)));
            }
        }
    }
    if truncated {
        out.push_str(ELLIPSIS);
    }
    out
}

/// Coloured prediction label: green for eligible, red otherwise.
pub fn render_prediction(eligibility: Eligibility) -> String {
    let colour = if eligibility.is_eligible() { "green" } else { "red" };
    format!(
        r#"<span style="color: {colour}; font-size:24px;">{}</span>"#,
        eligibility.label()
    )
}

pub fn render_rationale(lines: &[RationaleLine]) -> String {
    let mut out = String::from("#### Prediction based on:\n");
    for line in lines {
        out.push_str(&format!(
            "- **{}**: {}",
            escape_html(&line.label),
            escape_html(&line.value)
        ));
        if let Some(anchor) = &line.anchor {
            out.push_str(&format!(" ([view note](#{}))", anchor.fragment()));
        }
        out.push('\n');
    }
    out
}

/// Prediction label, patient header and the clinical details the prediction was made on.
pub fn render_summary(summary: &PredictionSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "**Prediction:** {}\n\n",
        render_prediction(summary.eligibility)
    ));
    out.push_str(&format!(
        "**Similarity Score:** {}\n\n",
        summary.similarity_score
    ));

    let d = &summary.demographics;
    out.push_str(&format!(
        "**Patient:** {} ({}) | **Age:** {} | **Gender:** {} | **Ward:** {} (Bed {})\n\n",
        escape_html(&summary.name),
        escape_html(&summary.patient_id),
        d.age,
        escape_html(&d.gender),
        escape_html(&d.ward),
        escape_html(&d.bed)
    ));

    out.push_str("#### Additional Patient Information\n");
    out.push_str(&format!("- **Diagnosis**: {}\n", escape_html(&summary.diagnosis)));
    if !summary.vitals.is_empty() {
        let vitals = summary
            .vitals
            .iter()
            .map(|(k, v)| format!("{} {}", escape_html(k), escape_html(v)))
            .collect::<Vec<_>>()
            .join(", ");
        out.push_str(&format!("- **Vitals**: {vitals}\n"));
    }
    out.push_str(&format!(
        "- **Medical Specialty**: {}\n\n",
        escape_html(&summary.medical_specialty)
    ));
    out
}

/// One heading plus body per snippet, each preceded by an HTML anchor the rationale links to.
pub fn render_snippets(snippets: &[Snippet]) -> String {
    let mut out = String::new();
    for snippet in snippets {
        out.push_str(&format!(r#"<a id="note-{}"></a>"#, slug(&snippet.note_id)));
        out.push('\n');
        out.push_str(&format!(
            "**{}** - {} ({})\n\n",
            snippet.note_type.label(),
            escape_html(&snippet.title),
            snippet.date.format("%Y-%m-%d")
        ));
        out.push_str(&render_segments(&snippet.segments, snippet.truncated));
        out.push_str("\n\n---\n");
    }
    out
}

/// Markdown table with a text bar per feature.
pub fn render_importance(features: &[RankedFeature]) -> String {
    if features.is_empty() {
        return "_No feature importance scores available._\n".to_string();
    }

    let max = features.first().map(|f| f.score).unwrap_or(0.0);
    let mut out = String::from("| # | Feature | Score | Impact | |\n|---|---|---|---|---|\n");
    for f in features {
        out.push_str(&format!(
            "| {} | {} | {:.3} | {} | `{}` |\n",
            f.rank,
            escape_html(&f.label),
            f.score,
            f.impact,
            f.bar(max, BAR_WIDTH)
        ));
    }
    out
}

pub fn render_similar(panel: &SimilarPatientsPanel) -> String {
    match panel {
        SimilarPatientsPanel::Empty { message } => format!("> {message}\n"),
        SimilarPatientsPanel::Listed { patients } => {
            let mut out = String::new();
            for p in patients {
                out.push_str(&format!(
                    "- **{}** - {}\n  - Patient ID: {}\n",
                    escape_html(p.name.as_str()),
                    escape_html(&p.key_factors),
                    escape_html(&p.id)
                ));
            }
            out
        }
    }
}

/// Node and edge listing of a laid-out concept graph.
pub fn render_graph(layout: &GraphLayout) -> String {
    let mut out = String::from("| Concept | x | y |\n|---|---|---|\n");
    for n in &layout.nodes {
        out.push_str(&format!(
            "| {} | {:.3} | {:.3} |\n",
            escape_html(&n.hover),
            n.x,
            n.y
        ));
    }
    if !layout.edges.is_empty() {
        out.push('\n');
        for e in &layout.edges {
            out.push_str(&format!(
                "- {} -- {}\n",
                escape_html(&e.source),
                escape_html(&e.target)
            ));
        }
    }
    out
}

/// The whole dashboard as one markdown document, panels in display order.
pub fn render_dashboard(view: &DashboardView) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", escape_html(&view.summary.name)));

    out.push_str("## Prediction Summary\n\n");
    out.push_str(&render_summary(&view.summary));
    out.push_str(&render_rationale(&view.rationale));

    out.push_str(&format!(
        "\n<a id=\"emr-snippets\"></a>\n\n## EMR Snippets ({} highlighting)\n\n",
        view.mode
    ));
    out.push_str(&render_snippets(&view.snippets));

    out.push_str("\n## Feature Importance\n\n");
    out.push_str(&render_importance(&view.importance));

    out.push_str("\n## Similar Patients\n\n");
    out.push_str(&render_similar(&view.similar));

    if let Some(graph) = &view.concept_graph {
        out.push_str("\n## Concept Graph\n\n");
        out.push_str(&render_graph(graph));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demo::demo_dataset;
    use crate::highlight::{HighlightStrategy, NaiveSubstring, Target};
    use crate::rationale::NoteAnchor;
    use crate::snippets::HighlightMode;
    use crate::{compose_dashboard, CoreConfig};

    #[test]
    fn styles_polarity_spans() {
        let targets = [
            Target::impact("stable vitals", Polarity::Positive),
            Target::impact("recent falls", Polarity::Negative),
        ];
        let segments =
            NaiveSubstring.segment("Patient shows stable vitals but recent falls.", &targets);

        assert_eq!(
            render_segments(&segments, false),
            "Patient shows <span style=\"color: green; font-weight: bold;\">stable vitals</span> but \
             <span style=\"color: red; font-style: italic; font-weight: bold;\">recent falls</span>."
        );
    }

    #[test]
    fn unmatched_text_renders_verbatim() {
        let text = "Afebrile, tolerating diet.";
        let segments = NaiveSubstring.segment(text, &[Target::impact("sepsis", Polarity::Negative)]);
        assert_eq!(render_segments(&segments, false), text);
    }

    #[test]
    fn escapes_note_text_before_styling() {
        let segments = NaiveSubstring.segment(
            "<b>stable</b> & improving",
            &[Target::impact("stable", Polarity::Positive)],
        );
        let html = render_segments(&segments, false);
        assert!(html.starts_with("&lt;b&gt;<span"));
        assert!(html.ends_with("&lt;/b&gt; &amp; improving"));
    }

    #[test]
    fn rerendering_does_not_double_style() {
        let targets = [Target::impact("stable", Polarity::Positive)];
        let once = NaiveSubstring.segment("stable and stable", &targets);
        let twice = NaiveSubstring.refine(once.clone(), &targets);

        let html = render_segments(&twice, false);
        assert_eq!(html, render_segments(&once, false));
        assert_eq!(html.matches("<span").count(), 2);
    }

    #[test]
    fn concept_spans_carry_title() {
        let segments = NaiveSubstring.segment("Known COPD", &[Target::concept("COPD", "C4")]);
        assert!(render_segments(&segments, false).contains(r#"title="C4: COPD""#));
    }

    #[test]
    fn appends_ellipsis_when_truncated() {
        assert_eq!(render_segments(&[Segment::plain("abc")], true), "abc...");
    }

    #[test]
    fn prediction_is_coloured() {
        assert!(render_prediction(Eligibility::Eligible).contains("color: green"));
        assert!(render_prediction(Eligibility::NotEligible).contains(">Not Eligible<"));
    }

    #[test]
    fn rationale_links_to_notes() {
        let lines = vec![
            RationaleLine {
                label: "Condition".into(),
                value: "Pneumonia".into(),
                anchor: Some(NoteAnchor::Note("N1".into())),
            },
            RationaleLine {
                label: "Similar past cases".into(),
                value: "Mary".into(),
                anchor: None,
            },
        ];

        assert_eq!(
            render_rationale(&lines),
            "#### Prediction based on:\n\
             - **Condition**: Pneumonia ([view note](#note-n1))\n\
             - **Similar past cases**: Mary\n"
        );
    }

    #[test]
    fn summary_lists_clinical_details() {
        let cfg = CoreConfig::default();
        let ds = demo_dataset(cfg.layout_seed()).expect("demo");
        let summary = crate::dashboard::summarise(&ds.patients()[0]);
        let md = render_summary(&summary);

        assert!(md.contains("#### Additional Patient Information"));
        assert!(md.contains("- **Diagnosis**: Community acquired pneumonia\n"));
        assert!(md.contains("- **Vitals**: BP 128/76, HR 84\n"));
        assert!(md.contains("- **Medical Specialty**: General Medicine\n"));
    }

    #[test]
    fn empty_importance_has_placeholder() {
        assert!(render_importance(&[]).contains("No feature importance"));
    }

    #[test]
    fn dashboard_contains_every_panel() {
        let cfg = CoreConfig::default();
        let ds = demo_dataset(cfg.layout_seed()).expect("demo");
        let view = compose_dashboard(&ds.patients()[0], HighlightMode::Impact, &cfg, &NaiveSubstring);
        let md = render_dashboard(&view);

        for heading in [
            "## Prediction Summary",
            "## EMR Snippets (impact highlighting)",
            "## Feature Importance",
            "## Similar Patients",
            "## Concept Graph",
        ] {
            assert!(md.contains(heading), "missing {heading}");
        }
        assert!(md.contains(r#"<a id="note-n001"></a>"#));
    }
}
