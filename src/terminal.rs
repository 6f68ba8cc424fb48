//! Line-oriented presentation of a session on a color terminal.

use owo_colors::{AnsiColors, DynColors, OwoColorize};
use stroop_core::{ActivityResult, AnswerEvent, PhaseState, SessionStage, Stimulus};
use stroop_experiment::{SessionEvent, SessionSnapshot, StroopConfig};

/// Terminal color used to draw a stimulus in the given ink.
pub fn attribute_color(name: &str) -> Option<DynColors> {
    let color = match name.trim().to_ascii_lowercase().as_str() {
        "red" => DynColors::Ansi(AnsiColors::BrightRed),
        "green" => DynColors::Ansi(AnsiColors::BrightGreen),
        "blue" => DynColors::Ansi(AnsiColors::BrightBlue),
        "yellow" => DynColors::Ansi(AnsiColors::BrightYellow),
        "magenta" => DynColors::Ansi(AnsiColors::BrightMagenta),
        "cyan" => DynColors::Ansi(AnsiColors::BrightCyan),
        "white" => DynColors::Ansi(AnsiColors::BrightWhite),
        "black" => DynColors::Ansi(AnsiColors::Black),
        "gray" | "grey" => DynColors::Ansi(AnsiColors::BrightBlack),
        "orange" => DynColors::Rgb(255, 165, 0),
        "purple" => DynColors::Rgb(160, 32, 240),
        "pink" => DynColors::Rgb(255, 105, 180),
        "brown" => DynColors::Rgb(150, 75, 0),
        _ => return None,
    };
    Some(color)
}

/// The word drawn in its display attribute. Attributes without a terminal
/// color are named next to the word instead.
pub fn stimulus_line(stimulus: &Stimulus) -> String {
    let word = stimulus.word.to_uppercase();
    match attribute_color(&stimulus.display_attribute) {
        Some(color) => format!("    {}", word.color(color).bold()),
        None => format!(
            "    {} {}",
            word.bold(),
            format!("[{}]", stimulus.display_attribute).dimmed()
        ),
    }
}

pub fn options_line(options: &[String]) -> String {
    let listed: Vec<String> = options
        .iter()
        .enumerate()
        .map(|(i, option)| format!("{}) {}", i + 1, option))
        .collect();
    format!("    {}", listed.join("  ").dimmed())
}

pub fn feedback_line(answer: &AnswerEvent) -> String {
    let timing = format!("({:.0} ms)", answer.reaction_time_ms);
    if answer.is_correct {
        format!("  {} {}", "Correct!".bright_green().bold(), timing.dimmed())
    } else {
        format!("  {} {}", "Incorrect".bright_red().bold(), timing.dimmed())
    }
}

pub fn status_line(remaining_seconds: u32, score: i64) -> String {
    format!(
        "  {} {}",
        format!("{remaining_seconds}s left").bright_yellow(),
        format!("score {score}").dimmed()
    )
}

pub fn result_summary(result: &ActivityResult) -> String {
    format!(
        "  {}: {} correct, {} incorrect, {:.0}% accuracy, avg {:.0} ms",
        result.phase.label().bright_cyan().bold(),
        result.correct_answers,
        result.incorrect_answers,
        result.accuracy(),
        result.details.avg_reaction_ms
    )
}

pub fn phase_score_line(result: &ActivityResult, score: i64) -> String {
    format!(
        "{} {}",
        format!("{} complete!", result.phase.label()).bright_green().bold(),
        format!("Your score: {score}").bold()
    )
}

pub fn error_line(message: &str) -> String {
    format!("{} {}", "✗".bright_red(), message)
}

/// A line typed by the participant.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Session(SessionEvent),
    Quit,
}

/// Maps typed input to a command. Numbers select from `options`; any other
/// text is taken as an answer name.
pub fn parse_input(line: &str, options: &[String]) -> Option<Command> {
    let input = line.trim();
    match input.to_ascii_lowercase().as_str() {
        "" | "start" => return Some(Command::Session(SessionEvent::Start)),
        "retry" => return Some(Command::Session(SessionEvent::RetrySubmission)),
        "quit" | "exit" => return Some(Command::Quit),
        _ => {}
    }

    if let Ok(index) = input.parse::<usize>() {
        return index
            .checked_sub(1)
            .and_then(|i| options.get(i))
            .map(|option| Command::Session(SessionEvent::Answer(option.clone())));
    }
    Some(Command::Session(SessionEvent::Answer(input.to_string())))
}

/// Turns successive snapshots into the lines to print.
pub struct Presenter {
    config: StroopConfig,
    stage: Option<SessionStage>,
    phase_state: PhaseState,
    shown: Option<Stimulus>,
    remaining_seconds: u32,
}

impl Presenter {
    pub fn new(config: StroopConfig) -> Self {
        Self {
            config,
            stage: None,
            phase_state: PhaseState::Idle,
            shown: None,
            remaining_seconds: 0,
        }
    }

    pub fn update(&mut self, snapshot: &SessionSnapshot) -> Vec<String> {
        let mut lines = Vec::new();
        let stage_changed = self.stage != Some(snapshot.stage);

        if stage_changed {
            if self.stage == Some(SessionStage::WordPhase) {
                if let Some(word) = &snapshot.pending_word_result {
                    lines.push(phase_score_line(word, snapshot.current_score));
                    lines.push(result_summary(word));
                }
            }
            self.shown = None;
        }

        if stage_changed || self.phase_state != snapshot.phase_state {
            match (snapshot.stage.phase(), snapshot.phase_state) {
                (Some(phase), PhaseState::Idle) => {
                    let activity = self.config.for_phase(phase);
                    lines.push(String::new());
                    lines.push(format!("{}", activity.name.bright_cyan().bold()));
                    if !activity.instructions.is_empty() {
                        lines.push(format!("  {}", activity.instructions));
                    }
                    lines.push(format!(
                        "  {} Press Enter to start.",
                        format!("{}s.", activity.duration_seconds).dimmed()
                    ));
                }
                (Some(_), PhaseState::Finished) => {
                    lines.push(format!("  {}", "Time is up.".bright_yellow()));
                }
                (None, _) => {
                    lines.push(format!("{}", "Session complete.".bright_green().bold()));
                }
                (Some(_), PhaseState::Running) => {}
            }
        }

        if snapshot.running() {
            if let (Some(phase), Some(stimulus)) =
                (snapshot.stage.phase(), &snapshot.live_stimulus)
            {
                if self.shown.as_ref() != Some(stimulus) {
                    if self.shown.is_some() {
                        if let Some(answer) = &snapshot.last_answer {
                            lines.push(feedback_line(answer));
                        }
                    }
                    lines.push(stimulus_line(stimulus));
                    lines.push(options_line(
                        &self.config.for_phase(phase).answer_options(phase),
                    ));
                    self.shown = Some(stimulus.clone());
                }
            }

            let remaining = snapshot.remaining_seconds;
            if remaining != self.remaining_seconds && (remaining % 10 == 0 || remaining <= 5) {
                lines.push(status_line(remaining, snapshot.current_score));
            }
        }

        self.stage = Some(snapshot.stage);
        self.phase_state = snapshot.phase_state;
        self.remaining_seconds = snapshot.remaining_seconds;
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stroop_core::{Phase, PhaseStats, StimulusType};

    fn options() -> Vec<String> {
        vec!["Red".into(), "Blue".into(), "Green".into()]
    }

    fn stimulus(word: &str, attribute: &str, presented_at_ns: u64) -> Stimulus {
        Stimulus {
            word: word.into(),
            display_attribute: attribute.into(),
            stimulus_type: StimulusType::Incongruent,
            correct_answer: word.into(),
            presented_at_ns,
        }
    }

    fn running(stimulus: Stimulus) -> SessionSnapshot {
        SessionSnapshot {
            stage: SessionStage::WordPhase,
            phase_state: PhaseState::Running,
            remaining_seconds: 58,
            live_stimulus: Some(stimulus),
            ..SessionSnapshot::default()
        }
    }

    #[test]
    fn known_attributes_have_colors() {
        assert!(attribute_color("Red").is_some());
        assert!(attribute_color(" orange ").is_some());
        assert!(attribute_color("chartreuse").is_none());
    }

    #[test]
    fn uncolored_attribute_is_named() {
        let line = stimulus_line(&stimulus("red", "chartreuse", 0));
        assert!(line.contains("RED"));
        assert!(line.contains("chartreuse"));
    }

    #[test]
    fn numbers_select_options() {
        assert_eq!(
            parse_input("2", &options()),
            Some(Command::Session(SessionEvent::Answer("Blue".into())))
        );
        assert_eq!(parse_input("0", &options()), None);
        assert_eq!(parse_input("4", &options()), None);
    }

    #[test]
    fn keywords_and_free_text() {
        assert_eq!(
            parse_input("", &options()),
            Some(Command::Session(SessionEvent::Start))
        );
        assert_eq!(
            parse_input(" RETRY ", &options()),
            Some(Command::Session(SessionEvent::RetrySubmission))
        );
        assert_eq!(parse_input("quit", &options()), Some(Command::Quit));
        assert_eq!(
            parse_input("green", &options()),
            Some(Command::Session(SessionEvent::Answer("green".into())))
        );
    }

    #[test]
    fn summary_reports_accuracy_as_percentage() {
        let mut stats = PhaseStats::default();
        for (is_correct, reaction_time_ms) in [(true, 80.0), (false, 120.0)] {
            stats.tally(
                StimulusType::Congruent,
                &AnswerEvent {
                    selected: "Red".into(),
                    is_correct,
                    reaction_time_ms,
                },
            );
        }
        let result = ActivityResult::from_stats(5, Phase::Word, 60, &stats, chrono::Utc::now());

        let line = result_summary(&result);
        assert!(line.contains("1 correct, 1 incorrect, 50% accuracy, avg 100 ms"));
    }

    #[test]
    fn idle_phase_prints_instructions() {
        let mut presenter = Presenter::new(StroopConfig::default());
        let lines = presenter.update(&SessionSnapshot::default());
        assert!(lines.iter().any(|l| l.contains("Press Enter")));
        assert!(presenter.update(&SessionSnapshot::default()).is_empty());
    }

    #[test]
    fn new_stimulus_follows_feedback() {
        let mut presenter = Presenter::new(StroopConfig::default());
        presenter.update(&SessionSnapshot::default());

        let first = presenter.update(&running(stimulus("blue", "red", 1)));
        assert!(first.iter().any(|l| l.contains("BLUE")));
        assert!(!first.iter().any(|l| l.contains("Correct")));

        let mut answered = running(stimulus("green", "blue", 2));
        answered.last_answer = Some(AnswerEvent {
            selected: "Blue".into(),
            is_correct: true,
            reaction_time_ms: 420.0,
        });
        let second = presenter.update(&answered);
        assert!(second[0].contains("Correct!"));
        assert!(second[1].contains("GREEN"));

        assert!(presenter.update(&answered).is_empty());
    }

    #[test]
    fn countdown_reported_at_milestones() {
        let mut presenter = Presenter::new(StroopConfig::default());
        let mut snapshot = running(stimulus("blue", "red", 1));
        presenter.update(&snapshot);

        snapshot.remaining_seconds = 50;
        assert!(presenter.update(&snapshot)[0].contains("50s left"));
        snapshot.remaining_seconds = 49;
        assert!(presenter.update(&snapshot).is_empty());
    }

    #[test]
    fn word_summary_shown_on_color_phase() {
        let mut presenter = Presenter::new(StroopConfig::default());
        presenter.update(&running(stimulus("blue", "red", 1)));

        let result = ActivityResult::from_stats(
            5,
            Phase::Word,
            60,
            &Default::default(),
            chrono::Utc::now(),
        );
        let color_idle = SessionSnapshot {
            stage: SessionStage::ColorPhase,
            remaining_seconds: 60,
            current_score: 7,
            pending_word_result: Some(result),
            ..SessionSnapshot::default()
        };
        let lines = presenter.update(&color_idle);
        assert!(lines[0].contains("Word Phase complete!"));
        assert!(lines[0].contains("Your score: 7"));
        assert!(lines[1].contains("Word Phase"));
        assert!(lines.iter().any(|l| l.contains("Press Enter")));
    }
}
