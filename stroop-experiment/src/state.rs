use std::sync::Arc;

use rand::Rng;
use stroop_core::{
    ActivityResult, AnswerEvent, Phase, PhaseState, PhaseStats, SessionStage, Stimulus,
};
use stroop_timing::{ClockEvent, ClockToken, CountdownClock, Timer};
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use super::aggregator::ScoreAggregator;
use super::config::StroopConfig;
use super::error::{ConfigError, SessionError};
use super::generator::StimulusGenerator;
use super::submit::{CompletionCheck, ResultSubmitter};

/// Everything the session reacts to, from the UI or the clock.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Start,
    Answer(String),
    Clock(ClockEvent),
    RetrySubmission,
}

/// What handling one event did.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The event does not apply in the current state.
    Ignored,
    Started { phase: Phase, stimulus: Stimulus },
    Answered { answer: AnswerEvent, next: Stimulus },
    Ticked { remaining: u32 },
    /// The word phase ended; its result waits for the color phase.
    PhaseAdvanced { result: ActivityResult, next: Phase },
    SessionComplete { submitted: Vec<ActivityResult> },
}

/// Read-only view published to presenters after every change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub stage: SessionStage,
    pub phase_state: PhaseState,
    pub remaining_seconds: u32,
    pub current_score: i64,
    pub live_stimulus: Option<Stimulus>,
    pub last_answer: Option<AnswerEvent>,
    pub pending_word_result: Option<ActivityResult>,
    pub unresolved_stimuli: u64,
}

impl SessionSnapshot {
    pub fn running(&self) -> bool {
        self.phase_state == PhaseState::Running
    }
}

/// Decides where a session begins from what the store already holds.
///
/// A completed color phase means there is nothing left to run.
pub async fn resolve_initial_stage(
    config: &StroopConfig,
    completion: &dyn CompletionCheck,
) -> Result<SessionStage, SessionError> {
    let word_done = completion
        .has_completed(config.word_phase.activity_id)
        .await
        .map_err(SessionError::CompletionCheck)?;
    let color_done = completion
        .has_completed(config.color_phase.activity_id)
        .await
        .map_err(SessionError::CompletionCheck)?;

    let stage = match (word_done, color_done) {
        (_, true) => SessionStage::Complete,
        (true, false) => SessionStage::ColorPhase,
        (false, false) => SessionStage::WordPhase,
    };
    info!(word_done, color_done, ?stage, "resolved initial stage");
    Ok(stage)
}

/// Drives one two-phase session.
///
/// Every change of state goes through [`dispatch`](Self::dispatch) or one of
/// the methods it routes to; [`run`](Self::run) feeds it clock and UI events
/// one at a time.
pub struct PhaseController<R, T>
where
    R: Rng,
    T: Timer,
{
    config: StroopConfig,
    stage: SessionStage,
    phase_state: PhaseState,
    remaining_seconds: u32,
    clock: CountdownClock,
    clock_token: Option<ClockToken>,
    generator: StimulusGenerator<R, T>,
    aggregator: ScoreAggregator,
    timer: T,
    live: Option<Stimulus>,
    last_answer: Option<AnswerEvent>,
    pending_word_result: Option<ActivityResult>,
    pending_color_result: Option<ActivityResult>,
    submitter: Arc<dyn ResultSubmitter>,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl<R, T> PhaseController<R, T>
where
    R: Rng,
    T: Timer,
{
    pub fn new(
        config: StroopConfig,
        initial_stage: SessionStage,
        rng: R,
        timer: T,
        submitter: Arc<dyn ResultSubmitter>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let remaining_seconds = initial_stage
            .phase()
            .map_or(0, |phase| config.for_phase(phase).duration_seconds);
        let (snapshot, _) = watch::channel(SessionSnapshot::default());

        let controller = Self {
            generator: StimulusGenerator::new(rng, timer.clone()),
            config,
            stage: initial_stage,
            phase_state: PhaseState::Idle,
            remaining_seconds,
            clock: CountdownClock::new(),
            clock_token: None,
            aggregator: ScoreAggregator::new(),
            timer,
            live: None,
            last_answer: None,
            pending_word_result: None,
            pending_color_result: None,
            submitter,
            snapshot,
        };
        controller.publish();
        Ok(controller)
    }

    /// Replaces the countdown clock, e.g. one with a shorter tick.
    pub fn with_clock(mut self, clock: CountdownClock) -> Self {
        self.clock = clock;
        self
    }

    pub async fn dispatch(&mut self, event: SessionEvent) -> Result<Transition, SessionError> {
        match event {
            SessionEvent::Start => Ok(self.start()),
            SessionEvent::Answer(selected) => Ok(self.submit_answer(&selected)),
            SessionEvent::Clock(clock_event) => self.on_clock_event(clock_event).await,
            SessionEvent::RetrySubmission => self.retry_submission().await,
        }
    }

    /// Processes clock and UI events until the session completes or the
    /// command channel closes.
    ///
    /// A failed submission is returned to the caller; the pending results are
    /// kept and the loop can be resumed to accept a retry.
    pub async fn run(
        &mut self,
        commands: &mut mpsc::Receiver<SessionEvent>,
    ) -> Result<SessionStage, SessionError> {
        while !self.stage.is_complete() {
            let event = tokio::select! {
                biased;
                clock_event = self.clock.next_event() => SessionEvent::Clock(clock_event),
                command = commands.recv() => match command {
                    Some(command) => command,
                    None => {
                        debug!("command channel closed");
                        break;
                    }
                },
            };
            self.dispatch(event).await?;
        }
        Ok(self.stage)
    }

    /// Waits for the next clock event and handles it.
    pub async fn await_clock(&mut self) -> Result<Transition, SessionError> {
        let event = self.clock.next_event().await;
        self.on_clock_event(event).await
    }

    /// Starts the current phase. A no-op unless the phase is idle.
    pub fn start(&mut self) -> Transition {
        let Some(phase) = self.stage.phase() else {
            debug!("start ignored, session complete");
            return Transition::Ignored;
        };
        if self.phase_state != PhaseState::Idle {
            debug!(%phase, state = ?self.phase_state, "start ignored");
            return Transition::Ignored;
        }

        let activity = self.config.for_phase(phase);
        let duration_seconds = activity.duration_seconds;
        let activity_id = activity.activity_id;
        self.aggregator.begin(activity.scoring.clone());
        let stimulus = self.generator.next(phase, activity);

        self.live = Some(stimulus.clone());
        self.last_answer = None;
        self.remaining_seconds = duration_seconds;
        self.phase_state = PhaseState::Running;
        self.clock_token = Some(self.clock.start(duration_seconds));

        info!(%phase, activity_id, duration_seconds, "phase started");
        self.publish();
        Transition::Started { phase, stimulus }
    }

    /// Records an answer to the live stimulus and presents the next one.
    pub fn submit_answer(&mut self, selected: &str) -> Transition {
        if !self.phase_state.allows_input() {
            debug!(selected, state = ?self.phase_state, "answer ignored");
            return Transition::Ignored;
        }
        let (Some(phase), Some(stimulus)) = (self.stage.phase(), self.live.take()) else {
            return Transition::Ignored;
        };

        let answer = AnswerEvent {
            selected: selected.to_owned(),
            is_correct: stimulus.is_correct(selected),
            reaction_time_ms: self.timer.elapsed_ms(stimulus.presented_at_ns),
        };
        self.aggregator.record(&stimulus, &answer);
        debug!(
            %phase,
            selected,
            expected = %stimulus.correct_answer,
            correct = answer.is_correct,
            reaction_ms = answer.reaction_time_ms,
            score = self.aggregator.score(),
            "answer recorded"
        );

        let next = self.generator.next(phase, self.config.for_phase(phase));
        self.live = Some(next.clone());
        self.last_answer = Some(answer.clone());
        self.publish();
        Transition::Answered { answer, next }
    }

    pub async fn on_clock_event(&mut self, event: ClockEvent) -> Result<Transition, SessionError> {
        if self.phase_state != PhaseState::Running || self.clock_token != Some(event.token()) {
            debug!(?event, "stale clock event ignored");
            return Ok(Transition::Ignored);
        }
        match event {
            ClockEvent::Tick { remaining, .. } => {
                self.remaining_seconds = remaining;
                self.publish();
                Ok(Transition::Ticked { remaining })
            }
            ClockEvent::Expired { .. } => self.finish_phase().await,
        }
    }

    /// Resends whatever results a failed submission left pending.
    pub async fn retry_submission(&mut self) -> Result<Transition, SessionError> {
        if self.stage != SessionStage::ColorPhase || !self.phase_state.is_finished() {
            debug!(stage = ?self.stage, "nothing to retry");
            return Ok(Transition::Ignored);
        }
        info!("retrying result submission");
        self.submit_pending().await
    }

    async fn finish_phase(&mut self) -> Result<Transition, SessionError> {
        self.clock.stop();
        self.clock_token = None;
        let Some(phase) = self.stage.phase() else {
            return Ok(Transition::Ignored);
        };

        let activity = self.config.for_phase(phase);
        let result =
            self.aggregator
                .finalize(activity.activity_id, phase, activity.duration_seconds);
        self.live = None;
        self.phase_state = PhaseState::Finished;
        self.remaining_seconds = 0;
        info!(
            %phase,
            correct = result.correct_answers,
            incorrect = result.incorrect_answers,
            avg_reaction_ms = result.details.avg_reaction_ms,
            score = self.aggregator.score(),
            unresolved = self.generator.unresolved(),
            "phase finished"
        );

        match phase.next() {
            Some(next) => {
                self.pending_word_result = Some(result.clone());
                self.stage = SessionStage::entering(next);
                self.phase_state = PhaseState::Idle;
                self.remaining_seconds = self.config.for_phase(next).duration_seconds;
                self.publish();
                Ok(Transition::PhaseAdvanced { result, next })
            }
            None => {
                self.pending_color_result = Some(result);
                self.publish();
                self.submit_pending().await
            }
        }
    }

    /// Submits the pending word result, then the pending color result.
    /// Stops at the first failure, leaving that result and any later one pending.
    async fn submit_pending(&mut self) -> Result<Transition, SessionError> {
        let submitter = Arc::clone(&self.submitter);
        let mut submitted = Vec::new();

        for phase in Phase::ALL {
            let slot = match phase {
                Phase::Word => &mut self.pending_word_result,
                Phase::Color => &mut self.pending_color_result,
            };
            let Some(result) = slot.as_ref() else {
                continue;
            };
            if let Err(source) = submitter.submit(result).await {
                warn!(%phase, activity_id = result.activity_id, error = %source, "result submission failed");
                self.publish();
                return Err(SessionError::Submission { phase, source });
            }
            info!(%phase, activity_id = result.activity_id, "result submitted");
            submitted.extend(slot.take());
        }

        self.stage = SessionStage::Complete;
        info!(results = submitted.len(), "session complete");
        self.publish();
        Ok(Transition::SessionComplete { submitted })
    }

    fn publish(&self) {
        self.snapshot.send_replace(SessionSnapshot {
            stage: self.stage,
            phase_state: self.phase_state,
            remaining_seconds: self.remaining_seconds,
            current_score: self.aggregator.score(),
            live_stimulus: self.live.clone(),
            last_answer: self.last_answer.clone(),
            pending_word_result: self.pending_word_result.clone(),
            unresolved_stimuli: self.generator.unresolved(),
        });
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn stage(&self) -> SessionStage {
        self.stage
    }

    pub fn current_phase(&self) -> Option<Phase> {
        self.stage.phase()
    }

    pub fn phase_state(&self) -> PhaseState {
        self.phase_state
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn current_score(&self) -> i64 {
        self.aggregator.score()
    }

    pub fn live_stimulus(&self) -> Option<&Stimulus> {
        self.live.as_ref()
    }

    pub fn stats(&self) -> &PhaseStats {
        self.aggregator.stats()
    }

    pub fn pending_word_result(&self) -> Option<&ActivityResult> {
        self.pending_word_result.as_ref()
    }

    pub fn pending_color_result(&self) -> Option<&ActivityResult> {
        self.pending_color_result.as_ref()
    }

    pub fn unresolved_stimuli(&self) -> u64 {
        self.generator.unresolved()
    }

    pub fn config(&self) -> &StroopConfig {
        &self.config
    }

    /// Choices the UI should offer for the current phase.
    pub fn answer_options(&self) -> Vec<String> {
        self.stage
            .phase()
            .map(|phase| self.config.for_phase(phase).answer_options(phase))
            .unwrap_or_default()
    }
}
