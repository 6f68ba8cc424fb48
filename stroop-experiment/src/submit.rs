//! Persistence seams. The session never stores anything itself; it hands
//! finalized results to a [`ResultSubmitter`] and asks a
//! [`CompletionCheck`] which phases are already done.

use std::collections::HashSet;

use async_trait::async_trait;
use stroop_core::ActivityResult;
use tokio::sync::Mutex;

use crate::error::StoreError;

#[async_trait]
pub trait ResultSubmitter: Send + Sync {
    /// Persists one finalized phase result.
    async fn submit(&self, result: &ActivityResult) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CompletionCheck: Send + Sync {
    async fn has_completed(&self, activity_id: u32) -> Result<bool, StoreError>;
}

#[derive(Debug, Default)]
struct MemoryState {
    results: Vec<ActivityResult>,
    attempts: Vec<u32>,
    completed: HashSet<u32>,
    failing: HashSet<u32>,
}

/// Result store held in memory, with switchable failures per activity.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds completions for `activity_ids`.
    pub fn with_completed(activity_ids: impl IntoIterator<Item = u32>) -> Self {
        Self {
            state: Mutex::new(MemoryState {
                completed: activity_ids.into_iter().collect(),
                ..MemoryState::default()
            }),
        }
    }

    /// Makes every submission for `activity_id` fail until healed.
    pub async fn fail_activity(&self, activity_id: u32) {
        self.state.lock().await.failing.insert(activity_id);
    }

    pub async fn heal_activity(&self, activity_id: u32) {
        self.state.lock().await.failing.remove(&activity_id);
    }

    pub async fn results(&self) -> Vec<ActivityResult> {
        self.state.lock().await.results.clone()
    }

    /// Activity ids of every submission attempt, in call order.
    pub async fn attempts(&self) -> Vec<u32> {
        self.state.lock().await.attempts.clone()
    }
}

#[async_trait]
impl ResultSubmitter for MemoryStore {
    async fn submit(&self, result: &ActivityResult) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.attempts.push(result.activity_id);
        if state.failing.contains(&result.activity_id) {
            return Err(StoreError::Rejected {
                activity_id: result.activity_id,
                message: "simulated failure".into(),
            });
        }
        state.completed.insert(result.activity_id);
        state.results.push(result.clone());
        Ok(())
    }
}

#[async_trait]
impl CompletionCheck for MemoryStore {
    async fn has_completed(&self, activity_id: u32) -> Result<bool, StoreError> {
        Ok(self.state.lock().await.completed.contains(&activity_id))
    }
}
