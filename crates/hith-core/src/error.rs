#[derive(Debug, thiserror::Error)]
pub enum ExplainError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to load fixture: {0}")]
    Fixture(#[from] hith_fixture::FixtureError),
    #[error("duplicate patient id '{0}' in fixture")]
    DuplicatePatient(String),
    #[error("patient not found: {0}")]
    PatientNotFound(String),
    #[error("unknown highlight mode '{0}' (expected 'impact' or 'concept')")]
    UnknownHighlightMode(String),
}

pub type ExplainResult<T> = std::result::Result<T, ExplainError>;
