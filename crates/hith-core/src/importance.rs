//! Feature-importance ranking for the bar chart panel.

use crate::constants::IMPORTANCE_SUM_TOLERANCE;
use hith_fixture::FeatureScore;
use hith_types::Polarity;
use serde::Serialize;

/// One bar of the importance chart, highest score first.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankedFeature {
    /// 1-based position after sorting.
    pub rank: usize,
    pub label: String,
    pub score: f64,
    pub impact: Polarity,
}

impl RankedFeature {
    /// Horizontal text bar scaled so that `max_score` spans `width` cells.
    pub fn bar(&self, max_score: f64, width: usize) -> String {
        if max_score <= 0.0 || self.score <= 0.0 {
            return String::new();
        }
        let cells = ((self.score / max_score) * width as f64).round() as usize;
        "█".repeat(cells.min(width))
    }
}

/// Sort by descending score (ties by label) and keep at most `top_n` entries.
///
/// Scores are used as given; a full set whose scores do not sum to about 1 is logged but
/// never rescaled.
pub fn rank_features(features: &[FeatureScore], top_n: Option<usize>) -> Vec<RankedFeature> {
    if features.is_empty() {
        return Vec::new();
    }

    let sum: f64 = features.iter().map(|f| f.score).sum();
    if (sum - 1.0).abs() > IMPORTANCE_SUM_TOLERANCE {
        tracing::warn!("feature importances sum to {sum:.3}, expected about 1.0");
    }

    let mut sorted: Vec<&FeatureScore> = features.iter().collect();
    sorted.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.label.as_str().cmp(b.label.as_str()))
    });

    sorted
        .into_iter()
        .take(top_n.unwrap_or(usize::MAX))
        .enumerate()
        .map(|(i, f)| RankedFeature {
            rank: i + 1,
            label: f.label.to_string(),
            score: f.score,
            impact: f.impact,
        })
        .collect()
}
