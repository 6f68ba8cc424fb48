//! Results persisted as JSON lines, one `{user_id, result}` object per line.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use stroop_core::ActivityResult;
use stroop_experiment::{CompletionCheck, ResultSubmitter, StoreError};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, info};

#[derive(Debug, Serialize, Deserialize)]
struct StoredResult {
    user_id: String,
    result: ActivityResult,
}

/// Append-only result file shared by every participant using it.
#[derive(Debug)]
pub struct JsonlStore {
    path: PathBuf,
    user_id: String,
    write_lock: Mutex<()>,
}

impl JsonlStore {
    pub fn new(path: impl Into<PathBuf>, user_id: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            user_id: user_id.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All results stored for this store's participant, oldest first.
    ///
    /// A missing file holds no results.
    pub async fn results_for_user(&self) -> Result<Vec<ActivityResult>, StoreError> {
        let contents = match fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut results = Vec::new();
        for line in contents.lines().filter(|line| !line.trim().is_empty()) {
            let stored: StoredResult = serde_json::from_str(line)?;
            if stored.user_id == self.user_id {
                results.push(stored.result);
            }
        }
        Ok(results)
    }
}

#[async_trait]
impl ResultSubmitter for JsonlStore {
    async fn submit(&self, result: &ActivityResult) -> Result<(), StoreError> {
        let record = StoredResult {
            user_id: self.user_id.clone(),
            result: result.clone(),
        };
        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let _guard = self.write_lock.lock().await;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;

        info!(
            activity_id = result.activity_id,
            user = %self.user_id,
            path = %self.path.display(),
            "result stored"
        );
        Ok(())
    }
}

#[async_trait]
impl CompletionCheck for JsonlStore {
    async fn has_completed(&self, activity_id: u32) -> Result<bool, StoreError> {
        let done = self
            .results_for_user()
            .await?
            .iter()
            .any(|result| result.activity_id == activity_id);
        debug!(activity_id, done, "completion checked");
        Ok(done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use stroop_core::{Phase, PhaseStats};

    fn result(activity_id: u32, phase: Phase) -> ActivityResult {
        ActivityResult::from_stats(activity_id, phase, 60, &PhaseStats::default(), Utc::now())
    }

    #[tokio::test]
    async fn missing_file_has_no_completions() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path().join("results.jsonl"), "ada");
        assert!(!store.has_completed(5).await.unwrap());
        assert!(store.results_for_user().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn submitted_results_count_as_completed() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path().join("nested/results.jsonl"), "ada");
        store.submit(&result(5, Phase::Word)).await.unwrap();
        store.submit(&result(6, Phase::Color)).await.unwrap();

        assert!(store.has_completed(5).await.unwrap());
        assert!(store.has_completed(6).await.unwrap());
        let stored = store.results_for_user().await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].phase, Phase::Color);
    }

    #[tokio::test]
    async fn completions_are_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        JsonlStore::new(&path, "ada")
            .submit(&result(5, Phase::Word))
            .await
            .unwrap();

        let other = JsonlStore::new(&path, "grace");
        assert!(!other.has_completed(5).await.unwrap());
    }

    #[tokio::test]
    async fn corrupt_line_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.jsonl");
        std::fs::write(&path, "{not json}\n").unwrap();

        let store = JsonlStore::new(&path, "ada");
        assert!(matches!(
            store.has_completed(5).await,
            Err(StoreError::Serde(_))
        ));
    }
}
