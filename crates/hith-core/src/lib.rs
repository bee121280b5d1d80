//! # HITH Core
//!
//! Explainability logic for the Hospital-in-the-Home eligibility dashboard.
//!
//! This crate turns precomputed patient records into the panels a clinician reviews:
//! - Prediction summary and rationale lines linked back to notes
//! - EMR snippets with impact or concept highlighting, truncated for display
//! - Ranked feature importances
//! - Similar past patients
//! - A laid-out concept graph
//!
//! **No API concerns**: argument parsing, HTTP servers and terminal output belong in
//! `hith-cli`, `api-rest` and the `hith-run` binary.

pub mod concept_graph;
pub mod config;
pub mod constants;
pub mod dashboard;
pub mod dataset;
pub mod demo;
pub mod error;
pub mod highlight;
pub mod importance;
pub mod rationale;
pub mod render;
pub mod snippets;

pub use config::{config_from_env_values, CoreConfig};
pub use dashboard::{compose_dashboard, DashboardService, DashboardView, SimilarPatientsPanel};
pub use dataset::{Dataset, PickerEntry};
pub use error::{ExplainError, ExplainResult};
pub use highlight::{HighlightStrategy, NaiveSubstring, Segment, Tag};
pub use snippets::{HighlightMode, Snippet};

pub use hith_fixture::{Eligibility, PatientRecord};
