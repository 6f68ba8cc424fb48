use serde::{Deserialize, Serialize};
use std::fmt;

/// One timed segment of the interference test.
///
/// `Word` always precedes `Color`; a session visits each at most once.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Name the printed word, ignoring the ink.
    #[default]
    Word,
    /// Name the ink, ignoring the printed word.
    Color,
}

impl Phase {
    pub const ALL: [Phase; 2] = [Phase::Word, Phase::Color];

    pub fn next(&self) -> Option<Self> {
        match self {
            Phase::Word => Some(Phase::Color),
            Phase::Color => None,
        }
    }

    /// Picks the expected answer for a word/attribute pair.
    pub fn correct_answer<'a>(&self, word: &'a str, display_attribute: &'a str) -> &'a str {
        match self {
            Phase::Word => word,
            Phase::Color => display_attribute,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Phase::Word => "Word Phase",
            Phase::Color => "Color Phase",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Lifecycle of the active phase.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseState {
    #[default]
    Idle,
    Running,
    Finished,
}

impl PhaseState {
    pub fn allows_input(&self) -> bool {
        matches!(self, PhaseState::Running)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, PhaseState::Finished)
    }
}

/// Where the whole session stands.
#[derive(Copy, Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStage {
    #[default]
    WordPhase,
    ColorPhase,
    Complete,
}

impl SessionStage {
    pub fn entering(phase: Phase) -> Self {
        match phase {
            Phase::Word => SessionStage::WordPhase,
            Phase::Color => SessionStage::ColorPhase,
        }
    }

    /// The phase being run, `None` once the session is complete.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            SessionStage::WordPhase => Some(Phase::Word),
            SessionStage::ColorPhase => Some(Phase::Color),
            SessionStage::Complete => None,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, SessionStage::Complete)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_precedes_color() {
        assert_eq!(Phase::default(), Phase::Word);
        assert_eq!(Phase::Word.next(), Some(Phase::Color));
        assert_eq!(Phase::Color.next(), None);
    }

    #[test]
    fn correct_answer_follows_phase() {
        assert_eq!(Phase::Word.correct_answer("Red", "blue"), "Red");
        assert_eq!(Phase::Color.correct_answer("Red", "blue"), "blue");
    }

    #[test]
    fn stage_maps_to_phase() {
        assert_eq!(SessionStage::entering(Phase::Color), SessionStage::ColorPhase);
        assert_eq!(SessionStage::WordPhase.phase(), Some(Phase::Word));
        assert_eq!(SessionStage::Complete.phase(), None);
        assert!(SessionStage::Complete.is_complete());
    }

    #[test]
    fn only_running_allows_input() {
        assert!(!PhaseState::Idle.allows_input());
        assert!(PhaseState::Running.allows_input());
        assert!(!PhaseState::Finished.allows_input());
    }
}
