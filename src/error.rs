use std::path::PathBuf;
use thiserror::Error;

/// Everything that can stop a load or a report run.
///
/// Degenerate groups (too few rows, zero means) never surface here; they are
/// dropped from their table or resolved to a neutral value by the passes.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("no valid areas for scoring")]
    NoScorableAreas,
}

impl AnalysisError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }

    /// Only a run with nothing to score stops the program; every other
    /// failure is reported and the menu carries on.
    pub fn aborts_run(&self) -> bool {
        matches!(self, AnalysisError::NoScorableAreas)
    }
}
