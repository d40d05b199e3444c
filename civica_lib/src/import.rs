//! Bulk postal import: a sequential, rate-limited walk of a postal list
//! with job-state tracking in memory.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::provider::Provider;
use crate::store::Db;
use crate::warm::{self, WarmOutcome};

/// Default pause between postals.
pub const DEFAULT_DELAY_MS: u64 = 3000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Running,
    Completed,
    CompletedWithErrors,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportFailure {
    pub postal: String,
    pub error: String,
}

/// Snapshot-able state of one bulk import.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportJob {
    pub id: Uuid,
    pub status: JobStatus,
    pub total: usize,
    pub completed: usize,
    pub failed: usize,
    pub current_postal: Option<String>,
    pub failures: Vec<ImportFailure>,
    pub delay_between_ms: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

/// In-memory job table. Reads return cloned snapshots, so callers never
/// observe a job mid-mutation.
#[derive(Default)]
pub struct JobRegistry {
    jobs: DashMap<Uuid, ImportJob>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self, total: usize, delay_between_ms: u64) -> ImportJob {
        let job = ImportJob {
            id: Uuid::new_v4(),
            status: JobStatus::Running,
            total,
            completed: 0,
            failed: 0,
            current_postal: None,
            failures: Vec::new(),
            delay_between_ms,
            started_at: Utc::now(),
            finished_at: None,
        };
        self.jobs.insert(job.id, job.clone());
        job
    }

    pub fn get(&self, id: Uuid) -> Option<ImportJob> {
        self.jobs.get(&id).map(|j| j.clone())
    }

    pub fn all(&self) -> Vec<ImportJob> {
        let mut jobs: Vec<ImportJob> = self.jobs.iter().map(|j| j.clone()).collect();
        jobs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        jobs
    }

    fn update(&self, id: Uuid, mutate: impl FnOnce(&mut ImportJob)) {
        if let Some(mut job) = self.jobs.get_mut(&id) {
            mutate(&mut job);
        }
    }
}

/// Starts a bulk import on a detached task and returns the initial job
/// snapshot.
pub fn spawn_import(
    db: Db,
    provider: Arc<dyn Provider>,
    registry: Arc<JobRegistry>,
    postals: Vec<String>,
    delay_between_ms: Option<u64>,
) -> ImportJob {
    let delay_ms = delay_between_ms.unwrap_or(DEFAULT_DELAY_MS);
    let job = registry.create(postals.len(), delay_ms);
    let job_id = job.id;
    tokio::spawn(async move {
        run_import(db, provider, registry, job_id, postals, delay_ms).await;
    });
    job
}

/// Walks the postal list sequentially. The delay applies between postals,
/// not after the last one.
async fn run_import(
    db: Db,
    provider: Arc<dyn Provider>,
    registry: Arc<JobRegistry>,
    job_id: Uuid,
    postals: Vec<String>,
    delay_ms: u64,
) {
    let delay = Duration::from_millis(delay_ms);
    let total = postals.len();

    for (i, postal) in postals.iter().enumerate() {
        registry.update(job_id, |job| {
            job.current_postal = Some(postal.clone());
        });
        tracing::info!("bulk import {}: warming {} ({}/{})", job_id, postal, i + 1, total);

        match warm::warm_local(&db, provider.as_ref(), postal).await {
            Ok(WarmOutcome::Completed) => {
                registry.update(job_id, |job| job.completed += 1);
            }
            Ok(WarmOutcome::Skipped) => {
                registry.update(job_id, |job| {
                    job.failed += 1;
                    job.failures.push(ImportFailure {
                        postal: postal.clone(),
                        error: "warm already in progress".to_string(),
                    });
                });
            }
            Err(e) => {
                registry.update(job_id, |job| {
                    job.failed += 1;
                    job.failures.push(ImportFailure {
                        postal: postal.clone(),
                        error: e.to_string(),
                    });
                });
            }
        }

        if i + 1 < total {
            tokio::time::sleep(delay).await;
        }
    }

    registry.update(job_id, |job| {
        job.current_postal = None;
        job.finished_at = Some(Utc::now());
        job.status = if job.failed == 0 {
            JobStatus::Completed
        } else {
            JobStatus::CompletedWithErrors
        };
    });
    tracing::info!("bulk import {} finished", job_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_snapshots_are_isolated() {
        let registry = JobRegistry::new();
        let job = registry.create(3, 100);

        let snapshot = registry.get(job.id).unwrap();
        assert_eq!(snapshot.status, JobStatus::Running);
        assert_eq!(snapshot.total, 3);

        registry.update(job.id, |j| {
            j.completed = 2;
            j.current_postal = Some("10001".into());
        });

        // The earlier snapshot is unaffected by later mutations.
        assert_eq!(snapshot.completed, 0);
        let fresh = registry.get(job.id).unwrap();
        assert_eq!(fresh.completed, 2);
        assert_eq!(fresh.current_postal.as_deref(), Some("10001"));
    }

    #[test]
    fn all_returns_newest_first() {
        let registry = JobRegistry::new();
        let a = registry.create(1, 0);
        std::thread::sleep(std::time::Duration::from_millis(5));
        let b = registry.create(2, 0);
        let all = registry.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, b.id);
        assert_eq!(all[1].id, a.id);
    }

    #[test]
    fn missing_job_is_none() {
        let registry = JobRegistry::new();
        assert!(registry.get(Uuid::new_v4()).is_none());
    }
}
