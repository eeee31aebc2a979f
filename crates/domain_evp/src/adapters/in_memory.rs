//! In-memory implementation of `SubmissionPort`

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use core_kernel::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError, SubmissionId,
};

use crate::events::TrackEvent;
use crate::ports::SubmissionPort;
use crate::submission::Submission;
use crate::track::{ClaimTrack, TrackType};

#[derive(Debug, Default)]
struct Store {
    // v7 ids sort by creation time
    submissions: BTreeMap<SubmissionId, Submission>,
    events: Vec<TrackEvent>,
}

/// In-memory submission store
///
/// Cloning shares the underlying store.
#[derive(Debug, Default, Clone)]
pub struct InMemorySubmissionPort {
    store: Arc<RwLock<Store>>,
}

impl InMemorySubmissionPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates the store
    pub async fn with_submissions(submissions: Vec<Submission>) -> Self {
        let port = Self::new();
        {
            let mut store = port.store.write().await;
            for submission in submissions {
                store.submissions.insert(submission.id, submission);
            }
        }
        port
    }

    /// Number of audit events recorded across all tracks
    pub async fn event_count(&self) -> usize {
        self.store.read().await.events.len()
    }
}

impl DomainPort for InMemorySubmissionPort {}

#[async_trait]
impl HealthCheckable for InMemorySubmissionPort {
    async fn health_check(&self) -> HealthCheckResult {
        HealthCheckResult {
            adapter_id: "in-memory-submissions".to_string(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: None,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl SubmissionPort for InMemorySubmissionPort {
    async fn create_submission(&self, submission: &Submission) -> Result<(), PortError> {
        let mut store = self.store.write().await;
        if store.submissions.contains_key(&submission.id) {
            return Err(PortError::conflict(format!(
                "submission {} already exists",
                submission.id
            )));
        }
        store.submissions.insert(submission.id, submission.clone());
        Ok(())
    }

    async fn get_submission(&self, id: SubmissionId) -> Result<Submission, PortError> {
        self.store
            .read()
            .await
            .submissions
            .get(&id)
            .cloned()
            .ok_or_else(|| PortError::not_found("Submission", id))
    }

    async fn list_submissions(&self) -> Result<Vec<Submission>, PortError> {
        Ok(self.store.read().await.submissions.values().cloned().collect())
    }

    async fn insert_track(&self, id: SubmissionId, track: &ClaimTrack) -> Result<(), PortError> {
        let mut store = self.store.write().await;
        let submission = store
            .submissions
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Submission", id))?;

        if submission.track(track.track_type).is_some() {
            return Err(PortError::conflict(format!(
                "{} track already exists on {}",
                track.track_type, id
            )));
        }

        let mut tracks: Vec<ClaimTrack> = submission.tracks().cloned().collect();
        tracks.push(track.clone());
        *submission = Submission::from_parts(
            submission.id,
            submission.employee_ref,
            submission.submitted_by_ref,
            submission.created_at,
            tracks,
        )
        .map_err(|e| PortError::validation(e.to_string()))?;
        Ok(())
    }

    async fn commit_transition(
        &self,
        id: SubmissionId,
        expected_version: u64,
        track: &ClaimTrack,
        event: &TrackEvent,
    ) -> Result<(), PortError> {
        let mut store = self.store.write().await;
        let submission = store
            .submissions
            .get_mut(&id)
            .ok_or_else(|| PortError::not_found("Submission", id))?;

        let current = submission
            .track(track.track_type)
            .ok_or_else(|| PortError::not_found("ClaimTrack", format!("{}/{}", id, track.track_type)))?;

        if current.version != expected_version {
            return Err(PortError::conflict(format!(
                "{} track of {} is at version {}, expected {}",
                track.track_type, id, current.version, expected_version
            )));
        }

        submission
            .replace_track(track.clone())
            .map_err(|e| PortError::internal(e.to_string()))?;
        store.events.push(event.clone());
        Ok(())
    }

    async fn track_history(
        &self,
        id: SubmissionId,
        track_type: TrackType,
    ) -> Result<Vec<TrackEvent>, PortError> {
        let store = self.store.read().await;
        if !store.submissions.contains_key(&id) {
            return Err(PortError::not_found("Submission", id));
        }
        Ok(store
            .events
            .iter()
            .filter(|event| event.submission_id == id && event.track_type == track_type)
            .cloned()
            .collect())
    }
}
