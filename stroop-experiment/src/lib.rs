pub mod aggregator;
pub mod config;
pub mod error;
pub mod generator;
pub mod state;
pub mod submit;

pub use aggregator::ScoreAggregator;
pub use config::{ActivityConfig, ScoringTable, StroopConfig};
pub use error::{ConfigError, SessionError, StoreError};
pub use generator::{MAX_INCONGRUENT_RESAMPLES, StimulusGenerator};
pub use state::{
    PhaseController, SessionEvent, SessionSnapshot, Transition, resolve_initial_stage,
};
pub use submit::{CompletionCheck, MemoryStore, ResultSubmitter};
