use chrono::Utc;
use stroop_core::{ActivityResult, AnswerEvent, Phase, PhaseStats, Stimulus};
use tracing::{debug, warn};

use crate::config::ScoringTable;

/// Accumulates answers of the running phase into statistics and a score.
///
/// Opened by [`begin`](Self::begin), closed by [`finalize`](Self::finalize);
/// answers recorded while closed are dropped.
#[derive(Debug, Clone)]
pub struct ScoreAggregator {
    stats: PhaseStats,
    scoring: ScoringTable,
    score: i64,
    unscored: u32,
    open: bool,
}

impl ScoreAggregator {
    pub fn new() -> Self {
        Self {
            stats: PhaseStats::default(),
            scoring: ScoringTable::empty(),
            score: 0,
            unscored: 0,
            open: false,
        }
    }

    pub fn begin(&mut self, scoring: ScoringTable) {
        self.stats = PhaseStats::default();
        self.scoring = scoring;
        self.score = 0;
        self.unscored = 0;
        self.open = true;
    }

    /// Returns whether the answer was counted.
    pub fn record(&mut self, stimulus: &Stimulus, answer: &AnswerEvent) -> bool {
        if !self.open {
            debug!(selected = %answer.selected, "answer outside a running phase ignored");
            return false;
        }

        self.stats.tally(stimulus.stimulus_type, answer);
        match self.scoring.lookup(stimulus.stimulus_type, answer.is_correct) {
            Some(delta) => self.score += delta,
            None => {
                self.unscored += 1;
                warn!(
                    entry = ScoringTable::entry_name(stimulus.stimulus_type, answer.is_correct),
                    "no scoring entry, answer scored as zero"
                );
            }
        }
        true
    }

    pub fn finalize(&mut self, activity_id: u32, phase: Phase, duration_seconds: u32) -> ActivityResult {
        self.open = false;
        ActivityResult::from_stats(activity_id, phase, duration_seconds, &self.stats, Utc::now())
    }

    pub fn stats(&self) -> &PhaseStats {
        &self.stats
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    /// Answers that hit a missing scoring entry in the current phase.
    pub fn unscored(&self) -> u32 {
        self.unscored
    }

    pub fn is_open(&self) -> bool {
        self.open
    }
}

impl Default for ScoreAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stroop_core::StimulusType;

    fn stimulus(stimulus_type: StimulusType) -> Stimulus {
        Stimulus {
            word: "Red".into(),
            display_attribute: "blue".into(),
            stimulus_type,
            correct_answer: "Red".into(),
            presented_at_ns: 0,
        }
    }

    fn answer(is_correct: bool, reaction_time_ms: f64) -> AnswerEvent {
        AnswerEvent {
            selected: if is_correct { "Red" } else { "Blue" }.into(),
            is_correct,
            reaction_time_ms,
        }
    }

    #[test]
    fn closed_aggregator_ignores_answers() {
        let mut aggregator = ScoreAggregator::new();
        assert!(!aggregator.record(&stimulus(StimulusType::Neutral), &answer(true, 100.0)));
        assert_eq!(aggregator.stats().total_answers(), 0);
    }

    #[test]
    fn scores_by_type_with_shared_penalty() {
        let mut aggregator = ScoreAggregator::new();
        aggregator.begin(ScoringTable::default());
        aggregator.record(&stimulus(StimulusType::Congruent), &answer(true, 300.0));
        aggregator.record(&stimulus(StimulusType::Incongruent), &answer(true, 500.0));
        aggregator.record(&stimulus(StimulusType::Incongruent), &answer(false, 700.0));
        aggregator.record(&stimulus(StimulusType::Congruent), &answer(false, 400.0));
        assert_eq!(aggregator.score(), 1 + 2 - 1 - 1);
        assert_eq!(aggregator.unscored(), 0);
    }

    #[test]
    fn missing_scoring_entry_scores_zero() {
        let mut aggregator = ScoreAggregator::new();
        aggregator.begin(ScoringTable {
            congruent_correct: Some(3),
            ..ScoringTable::empty()
        });
        aggregator.record(&stimulus(StimulusType::Congruent), &answer(true, 300.0));
        aggregator.record(&stimulus(StimulusType::Neutral), &answer(true, 300.0));
        aggregator.record(&stimulus(StimulusType::Neutral), &answer(false, 300.0));
        assert_eq!(aggregator.score(), 3);
        assert_eq!(aggregator.unscored(), 2);
        assert_eq!(aggregator.stats().total_answers(), 3);
    }

    #[test]
    fn finalize_closes_and_averages() {
        let mut aggregator = ScoreAggregator::new();
        aggregator.begin(ScoringTable::default());
        for rt in [200.0, 400.0, 600.0] {
            aggregator.record(&stimulus(StimulusType::Incongruent), &answer(true, rt));
        }
        let result = aggregator.finalize(5, Phase::Word, 60);
        assert_eq!(result.details.avg_reaction_ms, 400.0);
        assert_eq!(result.details.incongruent.correct, 3);
        assert_eq!(result.duration_seconds, 60);
        assert!(!aggregator.is_open());
        assert!(!aggregator.record(&stimulus(StimulusType::Neutral), &answer(true, 1.0)));
    }

    #[test]
    fn finalize_without_answers_reports_zero_mean() {
        let mut aggregator = ScoreAggregator::new();
        aggregator.begin(ScoringTable::default());
        let result = aggregator.finalize(6, Phase::Color, 30);
        assert_eq!(result.details.avg_reaction_ms, 0.0);
        assert_eq!(result.total_attempts(), 0);
    }

    #[test]
    fn begin_resets_previous_phase() {
        let mut aggregator = ScoreAggregator::new();
        aggregator.begin(ScoringTable::default());
        aggregator.record(&stimulus(StimulusType::Congruent), &answer(true, 250.0));
        aggregator.finalize(5, Phase::Word, 60);

        aggregator.begin(ScoringTable::default());
        assert_eq!(aggregator.score(), 0);
        assert_eq!(aggregator.stats(), &PhaseStats::default());
    }
}
