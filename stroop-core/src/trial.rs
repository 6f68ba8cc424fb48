use serde::{Deserialize, Serialize};

use crate::result::OutcomeCounts;
use crate::stimulus::StimulusType;

/// A user's answer to the live stimulus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerEvent {
    pub selected: String,
    pub is_correct: bool,
    pub reaction_time_ms: f64,
}

/// Running statistics for one phase.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseStats {
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub congruent: OutcomeCounts,
    pub incongruent: OutcomeCounts,
    pub neutral: OutcomeCounts,
    /// Append-only, in answer order.
    pub reaction_times_ms: Vec<f64>,
}

impl PhaseStats {
    pub fn tally(&mut self, stimulus_type: StimulusType, answer: &AnswerEvent) {
        self.reaction_times_ms.push(answer.reaction_time_ms);
        let counts = self.counts_mut(stimulus_type);
        if answer.is_correct {
            counts.correct += 1;
            self.correct_answers += 1;
        } else {
            counts.incorrect += 1;
            self.incorrect_answers += 1;
        }
    }

    pub fn counts(&self, stimulus_type: StimulusType) -> &OutcomeCounts {
        match stimulus_type {
            StimulusType::Congruent => &self.congruent,
            StimulusType::Incongruent => &self.incongruent,
            StimulusType::Neutral => &self.neutral,
        }
    }

    fn counts_mut(&mut self, stimulus_type: StimulusType) -> &mut OutcomeCounts {
        match stimulus_type {
            StimulusType::Congruent => &mut self.congruent,
            StimulusType::Incongruent => &mut self.incongruent,
            StimulusType::Neutral => &mut self.neutral,
        }
    }

    pub fn total_answers(&self) -> u32 {
        self.correct_answers + self.incorrect_answers
    }

    /// Arithmetic mean of the reaction times, 0 when nothing was answered.
    pub fn average_reaction_ms(&self) -> f64 {
        if self.reaction_times_ms.is_empty() {
            return 0.0;
        }
        self.reaction_times_ms.iter().sum::<f64>() / self.reaction_times_ms.len() as f64
    }
}
