use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::phase::Phase;
use crate::trial::PhaseStats;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub correct: u32,
    pub incorrect: u32,
}

/// Per-type breakdown stored alongside the totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultDetails {
    pub congruent: OutcomeCounts,
    pub incongruent: OutcomeCounts,
    pub neutral: OutcomeCounts,
    pub avg_reaction_ms: f64,
}

/// Finalized summary of one completed phase, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityResult {
    pub activity_id: u32,
    pub phase: Phase,
    pub correct_answers: u32,
    pub incorrect_answers: u32,
    pub duration_seconds: u32,
    pub details: ResultDetails,
    pub completed_at: DateTime<Utc>,
}

impl ActivityResult {
    pub fn from_stats(
        activity_id: u32,
        phase: Phase,
        duration_seconds: u32,
        stats: &PhaseStats,
        completed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            activity_id,
            phase,
            correct_answers: stats.correct_answers,
            incorrect_answers: stats.incorrect_answers,
            duration_seconds,
            details: ResultDetails {
                congruent: stats.congruent,
                incongruent: stats.incongruent,
                neutral: stats.neutral,
                avg_reaction_ms: stats.average_reaction_ms(),
            },
            completed_at,
        }
    }

    pub fn total_attempts(&self) -> u32 {
        self.correct_answers + self.incorrect_answers
    }

    /// Percentage of correct answers, 0 when nothing was answered.
    pub fn accuracy(&self) -> f64 {
        match self.total_attempts() {
            0 => 0.0,
            total => self.correct_answers as f64 / total as f64 * 100.0,
        }
    }
}
