//! Cancelable countdown clock.
//!
//! Ticks are produced by a Tokio task and delivered as messages through a
//! channel the clock owns. Each `start` mints a new [`ClockToken`]; events
//! carrying any other token are dropped by [`CountdownClock::next_event`],
//! which is what keeps a stopped or restarted countdown from leaking a tick
//! or a second expiry.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Duration, Instant};
use tracing::{debug, trace};

pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Identifies one `start` of a clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    Tick { token: ClockToken, remaining: u32 },
    Expired { token: ClockToken },
}

impl ClockEvent {
    pub fn token(&self) -> ClockToken {
        match self {
            ClockEvent::Tick { token, .. } | ClockEvent::Expired { token } => *token,
        }
    }
}

pub struct CountdownClock {
    interval: Duration,
    tx: mpsc::UnboundedSender<ClockEvent>,
    rx: mpsc::UnboundedReceiver<ClockEvent>,
    generation: u64,
    active: Option<ClockToken>,
    task: Option<JoinHandle<()>>,
}

impl CountdownClock {
    pub fn new() -> Self {
        Self::with_interval(DEFAULT_TICK)
    }

    /// A clock whose "second" lasts `interval`.
    pub fn with_interval(interval: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            interval,
            tx,
            rx,
            generation: 0,
            active: None,
            task: None,
        }
    }

    /// Begins a countdown of `duration_seconds` ticks, cancelling any
    /// countdown already in flight. Must be called inside a Tokio runtime.
    pub fn start(&mut self, duration_seconds: u32) -> ClockToken {
        self.stop();
        self.generation += 1;
        let token = ClockToken(self.generation);
        self.active = Some(token);

        if duration_seconds == 0 {
            let _ = self.tx.send(ClockEvent::Expired { token });
            debug!(?token, "countdown started with nothing to count");
            return token;
        }

        let tx = self.tx.clone();
        let period = self.interval;
        self.task = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            for remaining in (0..duration_seconds).rev() {
                ticker.tick().await;
                if tx.send(ClockEvent::Tick { token, remaining }).is_err() {
                    return;
                }
            }
            let _ = tx.send(ClockEvent::Expired { token });
        }));

        debug!(?token, duration_seconds, "countdown started");
        token
    }

    /// Cancels the running countdown. Safe to call at any time.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(token) = self.active.take() {
            debug!(?token, "countdown stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_current(&self, token: ClockToken) -> bool {
        self.active == Some(token)
    }

    /// Waits for the next event of the active countdown.
    ///
    /// Pends forever while the clock is idle. Cancel safe.
    pub async fn next_event(&mut self) -> ClockEvent {
        loop {
            let Some(event) = self.rx.recv().await else {
                // The clock holds a sender, so the channel never closes.
                return std::future::pending().await;
            };
            if !self.is_current(event.token()) {
                trace!(?event, "dropping event from a cancelled countdown");
                continue;
            }
            if let ClockEvent::Expired { .. } = event {
                self.active = None;
                self.task = None;
            }
            return event;
        }
    }
}

impl Default for CountdownClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CountdownClock {
    fn drop(&mut self) {
        self.stop();
    }
}
