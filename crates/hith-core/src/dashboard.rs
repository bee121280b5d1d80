//! Dashboard composition for one selected patient.
//!
//! Every panel is recomputed from the record on each call; nothing is cached between
//! selections.

use crate::concept_graph::{layout, GraphLayout};
use crate::constants::NO_SIMILAR_PATIENTS_MESSAGE;
use crate::dataset::{Dataset, PickerEntry};
use crate::highlight::{HighlightStrategy, NaiveSubstring};
use crate::importance::{rank_features, RankedFeature};
use crate::rationale::{compose_rationale, RationaleLine};
use crate::snippets::{extract_snippets, HighlightMode, Snippet};
use crate::{CoreConfig, ExplainResult};
use hith_fixture::{Demographics, Eligibility, PatientRecord, SimilarPatient};
use serde::Serialize;
use std::sync::Arc;

/// Header panel: the precomputed prediction and who it is about.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PredictionSummary {
    pub patient_id: String,
    pub name: String,
    pub demographics: Demographics,
    pub eligibility: Eligibility,
    pub similarity_score: f64,
    pub diagnosis: String,
    pub vitals: Vec<(String, String)>,
    pub medical_specialty: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SimilarPatientsPanel {
    Listed { patients: Vec<SimilarPatient> },
    Empty { message: String },
}

/// Everything the presentation layer shows for one patient.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardView {
    pub summary: PredictionSummary,
    pub rationale: Vec<RationaleLine>,
    pub mode: HighlightMode,
    pub snippets: Vec<Snippet>,
    pub importance: Vec<RankedFeature>,
    pub similar: SimilarPatientsPanel,
    pub concept_graph: Option<GraphLayout>,
}

pub fn summarise(record: &PatientRecord) -> PredictionSummary {
    PredictionSummary {
        patient_id: record.id.to_string(),
        name: record.name.to_string(),
        demographics: record.demographics.clone(),
        eligibility: record.eligibility,
        similarity_score: record.similarity_score,
        diagnosis: record.clinical.diagnosis.to_string(),
        vitals: record.clinical.vitals.clone(),
        medical_specialty: record.clinical.medical_specialty.to_string(),
    }
}

pub fn similar_panel(record: &PatientRecord) -> SimilarPatientsPanel {
    if record.similar_patients.is_empty() {
        SimilarPatientsPanel::Empty {
            message: NO_SIMILAR_PATIENTS_MESSAGE.to_string(),
        }
    } else {
        SimilarPatientsPanel::Listed {
            patients: record.similar_patients.clone(),
        }
    }
}

/// Compose the full dashboard for a record. Pure function of its inputs.
pub fn compose_dashboard(
    record: &PatientRecord,
    mode: HighlightMode,
    cfg: &CoreConfig,
    strategy: &dyn HighlightStrategy,
) -> DashboardView {
    DashboardView {
        summary: summarise(record),
        rationale: compose_rationale(record),
        mode,
        snippets: extract_snippets(record, mode, cfg, strategy),
        importance: rank_features(&record.feature_importance, Some(cfg.top_features())),
        similar: similar_panel(record),
        concept_graph: record
            .concept_graph
            .as_ref()
            .map(|g| layout(g, cfg.layout_seed())),
    }
}

/// Dashboard operations over a loaded dataset - no presentation concerns.
#[derive(Clone)]
pub struct DashboardService {
    cfg: Arc<CoreConfig>,
    dataset: Arc<Dataset>,
    strategy: Arc<dyn HighlightStrategy + Send + Sync>,
}

impl DashboardService {
    /// Creates a service using naive substring highlighting.
    pub fn new(cfg: Arc<CoreConfig>, dataset: Arc<Dataset>) -> Self {
        Self::with_strategy(cfg, dataset, Arc::new(NaiveSubstring))
    }

    pub fn with_strategy(
        cfg: Arc<CoreConfig>,
        dataset: Arc<Dataset>,
        strategy: Arc<dyn HighlightStrategy + Send + Sync>,
    ) -> Self {
        Self {
            cfg,
            dataset,
            strategy,
        }
    }

    pub fn config(&self) -> &CoreConfig {
        &self.cfg
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn picker(&self) -> Vec<PickerEntry> {
        self.dataset.picker()
    }

    /// # Errors
    ///
    /// Returns `ExplainError::PatientNotFound` for an unknown id or name.
    pub fn dashboard(&self, key: &str, mode: HighlightMode) -> ExplainResult<DashboardView> {
        let record = self.dataset.require(key)?;
        tracing::debug!("rendering dashboard for {} in {} mode", record.id, mode);
        Ok(compose_dashboard(
            record,
            mode,
            &self.cfg,
            self.strategy.as_ref(),
        ))
    }

    pub fn rationale(&self, key: &str) -> ExplainResult<Vec<RationaleLine>> {
        Ok(compose_rationale(self.dataset.require(key)?))
    }

    pub fn snippets(&self, key: &str, mode: HighlightMode) -> ExplainResult<Vec<Snippet>> {
        let record = self.dataset.require(key)?;
        Ok(extract_snippets(
            record,
            mode,
            &self.cfg,
            self.strategy.as_ref(),
        ))
    }

    /// Ranked importances, capped to `top` or the configured default.
    pub fn importance(&self, key: &str, top: Option<usize>) -> ExplainResult<Vec<RankedFeature>> {
        let record = self.dataset.require(key)?;
        let top = top.unwrap_or(self.cfg.top_features());
        Ok(rank_features(&record.feature_importance, Some(top)))
    }

    pub fn similar(&self, key: &str) -> ExplainResult<SimilarPatientsPanel> {
        Ok(similar_panel(self.dataset.require(key)?))
    }

    /// `None` when the record carries no concept graph.
    pub fn graph(&self, key: &str) -> ExplainResult<Option<GraphLayout>> {
        let record = self.dataset.require(key)?;
        Ok(record
            .concept_graph
            .as_ref()
            .map(|g| layout(g, self.cfg.layout_seed())))
    }
}
