//! Constants used throughout the HITH core crate.
//!
//! Defaults here are only used when the operator does not override them at startup.

use hith_types::Polarity;

/// Default fixture file, relative to the working directory.
pub const DEFAULT_FIXTURE_PATH: &str = "data.json";

/// Maximum snippet length, in characters of unstyled note text.
pub const DEFAULT_SNIPPET_LIMIT: usize = 300;

/// Marker appended to a snippet that was cut short.
pub const ELLIPSIS: &str = "...";

/// Number of features kept by the importance ranker.
pub const DEFAULT_TOP_FEATURES: usize = 50;

/// Seed for the concept-graph layout.
pub const DEFAULT_LAYOUT_SEED: u64 = 42;

/// Force-directed layout iterations.
pub const LAYOUT_ITERATIONS: usize = 50;

/// Importance sums further than this from 1.0 are logged.
pub const IMPORTANCE_SUM_TOLERANCE: f64 = 0.05;

/// Shown in the similar-patients panel when the record lists none.
pub const NO_SIMILAR_PATIENTS_MESSAGE: &str = "No similar past patients found.";

/// Key terms highlighted in impact mode when a note carries no phrases of its own.
pub const DEFAULT_KEY_TERMS: &[(&str, Polarity)] = &[
    ("pneumonia", Polarity::Positive),
    ("stable", Polarity::Positive),
    ("sepsis", Polarity::Negative),
];
