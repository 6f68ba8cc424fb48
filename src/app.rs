use std::io::BufRead;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use stroop_core::SessionStage;
use stroop_experiment::{
    resolve_initial_stage, PhaseController, SessionEvent, SessionSnapshot, StroopConfig,
};
use stroop_timing::{CountdownClock, HighPrecisionTimer};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use crate::cli::Cli;
use crate::store::JsonlStore;
use crate::terminal::{self, Command, Presenter};

pub struct App {
    config: StroopConfig,
    store: Arc<JsonlStore>,
    stage: SessionStage,
    controller: PhaseController<StdRng, HighPrecisionTimer>,
}

impl App {
    pub async fn new(cli: Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => StroopConfig::load(path)
                .with_context(|| format!("loading configuration from {}", path.display()))?,
            None => StroopConfig::default(),
        };
        if let Some(duration) = cli.duration {
            config = config.with_duration(duration);
        }

        let store = Arc::new(JsonlStore::new(&cli.store, cli.user.clone()));
        let stage = resolve_initial_stage(&config, &*store)
            .await
            .with_context(|| format!("reading completions from {}", store.path().display()))?;

        let rng = match cli.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let controller = PhaseController::new(
            config.clone(),
            stage,
            rng,
            HighPrecisionTimer::new(),
            store.clone(),
        )
        .context("invalid configuration")?
        .with_clock(CountdownClock::with_interval(Duration::from_millis(
            cli.tick_ms,
        )));

        info!(user = %cli.user, ?stage, seed = ?cli.seed, "session prepared");
        Ok(Self {
            config,
            store,
            stage,
            controller,
        })
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            config,
            store,
            stage,
            mut controller,
        } = self;

        println!("=== STROOP INTERFERENCE TEST ===");
        if stage.is_complete() {
            println!("Both phases are already completed for this participant.");
            return Ok(());
        }
        println!("Answer by typing a name or its number, then Enter. Type 'quit' to leave.");

        let (events_tx, mut events) = mpsc::channel(32);
        spawn_input_reader(events_tx, controller.subscribe(), config.clone());

        let mut snapshots = controller.subscribe();
        let presenter_config = config.clone();
        let presenter = tokio::spawn(async move {
            let mut presenter = Presenter::new(presenter_config);
            loop {
                let lines = presenter.update(&snapshots.borrow_and_update());
                for line in lines {
                    println!("{line}");
                }
                if snapshots.changed().await.is_err() {
                    break;
                }
            }
        });

        let final_stage = loop {
            match controller.run(&mut events).await {
                Ok(stage) => break stage,
                Err(err) => {
                    error!(error = %err, "result submission failed");
                    println!("{}", terminal::error_line(&err.to_string()));
                    println!("Type 'retry' to send the results again.");
                }
            }
        };

        drop(controller);
        presenter.await.context("presenter task failed")?;

        if !final_stage.is_complete() {
            println!("Session left before completion; unfinished phases were not saved.");
            return Ok(());
        }

        let stored = store
            .results_for_user()
            .await
            .context("reading stored results")?;
        for activity in [&config.word_phase, &config.color_phase] {
            if let Some(result) = stored
                .iter()
                .rev()
                .find(|result| result.activity_id == activity.activity_id)
            {
                println!("{}", terminal::result_summary(result));
            }
        }
        println!("Results saved to {}", store.path().display());
        Ok(())
    }
}

/// Reads participant input on a dedicated thread so a pending read never
/// holds up runtime shutdown.
fn spawn_input_reader(
    events: mpsc::Sender<SessionEvent>,
    snapshot: watch::Receiver<SessionSnapshot>,
    config: StroopConfig,
) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            let options = snapshot
                .borrow()
                .stage
                .phase()
                .map(|phase| config.for_phase(phase).answer_options(phase))
                .unwrap_or_default();

            match terminal::parse_input(&line, &options) {
                Some(Command::Session(event)) => {
                    if events.blocking_send(event).is_err() {
                        break;
                    }
                }
                Some(Command::Quit) => break,
                None => println!(
                    "{}",
                    terminal::error_line(&format!("no option numbered {}", line.trim()))
                ),
            }
        }
        debug!("input closed");
    });
}
