use std::path::PathBuf;

use stroop_core::Phase;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// No stimulus can be drawn from an empty vocabulary.
    #[error("{phase} has an empty {vocabulary} vocabulary")]
    EmptyVocabulary {
        phase: Phase,
        vocabulary: &'static str,
    },

    /// Both phases share an activity id, so their completion could not be told apart.
    #[error("word and color phases share activity id {activity_id}")]
    DuplicateActivityId { activity_id: u32 },
}

/// Failures reported by the persistence collaborator.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("result store unavailable: {0}")]
    Unavailable(String),

    #[error("result for activity {activity_id} rejected: {message}")]
    Rejected { activity_id: u32, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SessionError {
    /// Persisting a finalized phase failed; the result is still pending.
    #[error("failed to submit {phase} result")]
    Submission {
        phase: Phase,
        #[source]
        source: StoreError,
    },

    #[error("failed to check completed phases")]
    CompletionCheck(#[source] StoreError),
}

impl SessionError {
    pub fn failed_phase(&self) -> Option<Phase> {
        match self {
            SessionError::Submission { phase, .. } => Some(*phase),
            SessionError::CompletionCheck(_) => None,
        }
    }
}
