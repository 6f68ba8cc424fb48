use std::path::Path;

use serde::{Deserialize, Serialize};
use stroop_core::{Phase, StimulusType};
use tracing::warn;

use crate::error::ConfigError;

/// Score deltas per outcome. Absent entries score zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringTable {
    pub congruent_correct: Option<i64>,
    pub incongruent_correct: Option<i64>,
    pub neutral_correct: Option<i64>,
    /// Shared penalty for a wrong answer of any type.
    pub incorrect: Option<i64>,
}

impl ScoringTable {
    pub fn empty() -> Self {
        Self {
            congruent_correct: None,
            incongruent_correct: None,
            neutral_correct: None,
            incorrect: None,
        }
    }

    pub fn lookup(&self, stimulus_type: StimulusType, correct: bool) -> Option<i64> {
        if !correct {
            return self.incorrect;
        }
        match stimulus_type {
            StimulusType::Congruent => self.congruent_correct,
            StimulusType::Incongruent => self.incongruent_correct,
            StimulusType::Neutral => self.neutral_correct,
        }
    }

    pub fn entry_name(stimulus_type: StimulusType, correct: bool) -> &'static str {
        match (stimulus_type, correct) {
            (_, false) => "incorrect",
            (StimulusType::Congruent, true) => "congruent_correct",
            (StimulusType::Incongruent, true) => "incongruent_correct",
            (StimulusType::Neutral, true) => "neutral_correct",
        }
    }
}

impl Default for ScoringTable {
    fn default() -> Self {
        Self {
            congruent_correct: Some(1),
            incongruent_correct: Some(2),
            neutral_correct: Some(1),
            incorrect: Some(-1),
        }
    }
}

/// Configuration of one phase, as stored with its activity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityConfig {
    pub activity_id: u32,
    pub name: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default = "default_duration_seconds")]
    pub duration_seconds: u32,
    #[serde(default = "default_words")]
    pub word_vocabulary: Vec<String>,
    #[serde(alias = "color_options")]
    pub attribute_vocabulary: Vec<String>,
    /// Target types are drawn uniformly from this list; repeat an entry to weight it.
    #[serde(default = "default_stimulus_types")]
    pub stimulus_types: Vec<StimulusType>,
    #[serde(default = "ScoringTable::empty")]
    pub scoring: ScoringTable,
}

fn default_duration_seconds() -> u32 {
    60
}

fn default_words() -> Vec<String> {
    ["Red", "Blue", "Green", "Yellow"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_colors() -> Vec<String> {
    ["red", "blue", "green", "yellow"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_stimulus_types() -> Vec<StimulusType> {
    StimulusType::ALL.to_vec()
}

impl ActivityConfig {
    pub fn word_phase() -> Self {
        Self {
            activity_id: 5,
            name: "Stroop - Word Phase".into(),
            instructions: "Select the word that is written, ignoring the color it is shown in."
                .into(),
            duration_seconds: default_duration_seconds(),
            word_vocabulary: default_words(),
            attribute_vocabulary: default_colors(),
            stimulus_types: default_stimulus_types(),
            scoring: ScoringTable::default(),
        }
    }

    pub fn color_phase() -> Self {
        Self {
            activity_id: 6,
            name: "Stroop - Color Phase".into(),
            instructions: "Select the color the word is shown in, ignoring what it says.".into(),
            ..Self::word_phase()
        }
    }

    pub fn validate(&self, phase: Phase) -> Result<(), ConfigError> {
        if self.word_vocabulary.is_empty() {
            return Err(ConfigError::EmptyVocabulary {
                phase,
                vocabulary: "word",
            });
        }
        if self.attribute_vocabulary.is_empty() {
            return Err(ConfigError::EmptyVocabulary {
                phase,
                vocabulary: "attribute",
            });
        }
        if self.stimulus_types.is_empty() {
            warn!(%phase, "no stimulus types configured, every stimulus is drawn as neutral");
        }
        for (stimulus_type, correct) in StimulusType::ALL
            .into_iter()
            .map(|t| (t, true))
            .chain([(StimulusType::Neutral, false)])
        {
            if self.scoring.lookup(stimulus_type, correct).is_none() {
                warn!(
                    %phase,
                    entry = ScoringTable::entry_name(stimulus_type, correct),
                    "scoring entry missing, it will score zero"
                );
            }
        }
        Ok(())
    }

    /// Answer choices offered to the participant for this phase.
    pub fn answer_options(&self, phase: Phase) -> Vec<String> {
        match phase {
            Phase::Word => self.word_vocabulary.clone(),
            Phase::Color => self
                .attribute_vocabulary
                .iter()
                .map(|attribute| capitalize(attribute))
                .collect(),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Both phases of one interference test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StroopConfig {
    pub word_phase: ActivityConfig,
    pub color_phase: ActivityConfig,
}

impl Default for StroopConfig {
    fn default() -> Self {
        Self {
            word_phase: ActivityConfig::word_phase(),
            color_phase: ActivityConfig::color_phase(),
        }
    }
}

impl StroopConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn for_phase(&self, phase: Phase) -> &ActivityConfig {
        match phase {
            Phase::Word => &self.word_phase,
            Phase::Color => &self.color_phase,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for phase in Phase::ALL {
            self.for_phase(phase).validate(phase)?;
        }
        if self.word_phase.activity_id == self.color_phase.activity_id {
            return Err(ConfigError::DuplicateActivityId {
                activity_id: self.word_phase.activity_id,
            });
        }
        Ok(())
    }

    /// Overrides the duration of both phases.
    pub fn with_duration(mut self, duration_seconds: u32) -> Self {
        self.word_phase.duration_seconds = duration_seconds;
        self.color_phase.duration_seconds = duration_seconds;
        self
    }
}
