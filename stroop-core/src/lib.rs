pub mod phase;
pub mod result;
pub mod stimulus;
pub mod trial;

pub use phase::{Phase, PhaseState, SessionStage};
pub use result::{ActivityResult, OutcomeCounts, ResultDetails};
pub use stimulus::{Stimulus, StimulusType, same_name};
pub use trial::{AnswerEvent, PhaseStats};
