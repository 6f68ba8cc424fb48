use rand::Rng;
use rand::seq::IndexedRandom;
use stroop_core::{Phase, Stimulus, StimulusType, same_name};
use stroop_timing::Timer;
use tracing::{debug, warn};

use crate::config::ActivityConfig;

/// Upper bound on redraws when an incongruent pair keeps coming up congruent.
pub const MAX_INCONGRUENT_RESAMPLES: usize = 10;

pub struct StimulusGenerator<R, T>
where
    R: Rng,
    T: Timer,
{
    rng: R,
    timer: T,
    generated: u64,
    unresolved: u64,
}

impl<R, T> StimulusGenerator<R, T>
where
    R: Rng,
    T: Timer,
{
    pub fn new(rng: R, timer: T) -> Self {
        Self {
            rng,
            timer,
            generated: 0,
            unresolved: 0,
        }
    }

    /// Draws the next stimulus for `phase`.
    ///
    /// The returned type is classified from the pair actually produced, which
    /// may differ from the drawn target when an incongruent redraw runs out of
    /// attempts.
    pub fn next(&mut self, phase: Phase, config: &ActivityConfig) -> Stimulus {
        let word = draw(&mut self.rng, &config.word_vocabulary).to_owned();
        let mut display_attribute = draw(&mut self.rng, &config.attribute_vocabulary).to_owned();
        let target = config
            .stimulus_types
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(StimulusType::Neutral);

        match target {
            StimulusType::Incongruent => {
                let mut attempts = 0;
                while same_name(&display_attribute, &word) && attempts < MAX_INCONGRUENT_RESAMPLES
                {
                    display_attribute =
                        draw(&mut self.rng, &config.attribute_vocabulary).to_owned();
                    attempts += 1;
                }
                if same_name(&display_attribute, &word) {
                    self.unresolved += 1;
                    warn!(
                        %word,
                        attempts,
                        unresolved = self.unresolved,
                        "incongruent stimulus left congruent after resampling"
                    );
                }
            }
            StimulusType::Congruent => {
                display_attribute = config
                    .attribute_vocabulary
                    .iter()
                    .find(|attribute| same_name(attribute, &word))
                    .cloned()
                    .unwrap_or_else(|| word.trim().to_lowercase());
            }
            StimulusType::Neutral => {}
        }

        let stimulus_type =
            StimulusType::classify(&word, &display_attribute, &config.attribute_vocabulary);
        let correct_answer = phase.correct_answer(&word, &display_attribute).to_owned();
        self.generated += 1;
        debug!(
            %phase,
            %word,
            %display_attribute,
            %target,
            realized = %stimulus_type,
            "stimulus generated"
        );

        Stimulus {
            word,
            display_attribute,
            stimulus_type,
            correct_answer,
            presented_at_ns: self.timer.now(),
        }
    }

    pub fn generated(&self) -> u64 {
        self.generated
    }

    /// Incongruent targets that could not be made incongruent.
    pub fn unresolved(&self) -> u64 {
        self.unresolved
    }
}

fn draw<'a, R: Rng>(rng: &mut R, vocabulary: &'a [String]) -> &'a str {
    vocabulary.choose(rng).map(String::as_str).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use stroop_timing::ManualTimer;

    fn generator(seed: u64) -> StimulusGenerator<StdRng, ManualTimer> {
        StimulusGenerator::new(StdRng::seed_from_u64(seed), ManualTimer::new())
    }

    fn config_with(types: &[StimulusType]) -> ActivityConfig {
        ActivityConfig {
            stimulus_types: types.to_vec(),
            ..ActivityConfig::word_phase()
        }
    }

    #[test]
    fn incongruent_targets_differ_from_word_meaning() {
        let mut generator = generator(7);
        let config = config_with(&[StimulusType::Incongruent]);
        let mut congruent_left = 0;
        for _ in 0..500 {
            let stimulus = generator.next(Phase::Word, &config);
            if same_name(&stimulus.word, &stimulus.display_attribute) {
                congruent_left += 1;
            } else {
                assert_eq!(stimulus.stimulus_type, StimulusType::Incongruent);
            }
        }
        assert_eq!(generator.unresolved(), congruent_left);
    }

    #[test]
    fn exhausted_resampling_is_counted_and_classified_from_result() {
        let mut generator = generator(1);
        let config = ActivityConfig {
            word_vocabulary: vec!["Red".into()],
            attribute_vocabulary: vec!["red".into()],
            ..config_with(&[StimulusType::Incongruent])
        };
        for _ in 0..5 {
            let stimulus = generator.next(Phase::Word, &config);
            assert_eq!(stimulus.stimulus_type, StimulusType::Congruent);
        }
        assert_eq!(generator.unresolved(), 5);
    }

    #[test]
    fn congruent_targets_match_word_meaning() {
        let mut generator = generator(3);
        let config = config_with(&[StimulusType::Congruent]);
        for _ in 0..200 {
            let stimulus = generator.next(Phase::Color, &config);
            assert!(same_name(&stimulus.word, &stimulus.display_attribute));
            assert_eq!(stimulus.stimulus_type, StimulusType::Congruent);
            assert_eq!(stimulus.correct_answer, stimulus.display_attribute);
        }
    }

    #[test]
    fn congruent_word_outside_vocabulary_uses_its_meaning() {
        let mut generator = generator(3);
        let config = ActivityConfig {
            word_vocabulary: vec!["Purple".into()],
            ..config_with(&[StimulusType::Congruent])
        };
        let stimulus = generator.next(Phase::Color, &config);
        assert_eq!(stimulus.display_attribute, "purple");
        assert_eq!(stimulus.stimulus_type, StimulusType::Congruent);
    }

    #[test]
    fn non_color_words_classify_as_neutral() {
        let mut generator = generator(11);
        let config = ActivityConfig {
            word_vocabulary: vec!["Chair".into(), "Table".into()],
            ..config_with(&[StimulusType::Neutral])
        };
        for _ in 0..50 {
            let stimulus = generator.next(Phase::Word, &config);
            assert_eq!(stimulus.stimulus_type, StimulusType::Neutral);
        }
    }

    #[test]
    fn correct_answer_follows_phase() {
        let mut generator = generator(5);
        let config = ActivityConfig::word_phase();
        for _ in 0..100 {
            let word = generator.next(Phase::Word, &config);
            assert_eq!(word.correct_answer, word.word);
            let color = generator.next(Phase::Color, &config);
            assert_eq!(color.correct_answer, color.display_attribute);
        }
        assert_eq!(generator.generated(), 200);
    }

    #[test]
    fn stamps_presentation_time() {
        let timer = ManualTimer::new();
        timer.set(42_000_000);
        let mut generator = StimulusGenerator::new(StdRng::seed_from_u64(9), timer.clone());
        let stimulus = generator.next(Phase::Word, &ActivityConfig::word_phase());
        assert_eq!(stimulus.presented_at_ns, 42_000_000);
    }

    #[test]
    fn empty_type_list_draws_without_adjustment() {
        let mut generator = generator(21);
        let config = ActivityConfig {
            word_vocabulary: vec!["Red".into()],
            attribute_vocabulary: vec!["red".into(), "blue".into()],
            ..config_with(&[])
        };
        let realized: Vec<_> = (0..100)
            .map(|_| generator.next(Phase::Word, &config).stimulus_type)
            .collect();
        assert!(realized.contains(&StimulusType::Congruent));
        assert!(realized.contains(&StimulusType::Incongruent));
        assert_eq!(generator.unresolved(), 0);
    }
}
