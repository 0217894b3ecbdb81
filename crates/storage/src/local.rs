//! The local persistence adapter.
//!
//! Every structure is written whole under its own key, overwriting the
//! previous value. Reads fall back to a documented default when the key is
//! absent or holds something that no longer parses; only backend failures
//! are returned as errors.

use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use visa_core::Timeline;
use visa_core::model::{InterviewAnswers, ProgressState, UserProfile};

use crate::keys;
use crate::records::{
    InterviewRecord, MilestoneRecord, ProgressRecord, UserRecord, interview_answers,
    interview_record,
};
use crate::repository::{KeyValueStore, StorageError};

#[derive(Clone)]
pub struct LocalStore {
    kv: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    #[must_use]
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self { kv }
    }

    /// Load progress counters, or all zeros.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn load_progress(&self) -> Result<ProgressState, StorageError> {
        let Some(record) = self.read::<ProgressRecord>(keys::PROGRESS).await? else {
            return Ok(ProgressState::default());
        };
        Ok(record.into_state().unwrap_or_else(|err| {
            warn!("event=load_fallback key={} reason={err}", keys::PROGRESS);
            ProgressState::default()
        }))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    pub async fn save_progress(&self, state: &ProgressState) -> Result<(), StorageError> {
        self.write(keys::PROGRESS, &ProgressRecord::from_state(state))
            .await
    }

    /// Load the timeline, or an empty one.
    ///
    /// Individual milestones that fail validation or repeat an earlier id are
    /// skipped; the rest are re-sorted by date.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn load_timeline(&self) -> Result<Timeline, StorageError> {
        let Some(records) = self.read::<Vec<MilestoneRecord>>(keys::TIMELINE).await? else {
            return Ok(Timeline::new());
        };
        let total = records.len();
        let milestones: Vec<_> = records
            .into_iter()
            .filter_map(|record| record.into_milestone().ok())
            .collect();
        let invalid = total - milestones.len();
        let (timeline, duplicates) = Timeline::from_milestones(milestones);
        if invalid + duplicates > 0 {
            warn!(
                "event=load_skipped key={} invalid={invalid} duplicates={duplicates}",
                keys::TIMELINE
            );
        }
        Ok(timeline)
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    pub async fn save_timeline(&self, timeline: &Timeline) -> Result<(), StorageError> {
        let records: Vec<MilestoneRecord> =
            timeline.iter().map(MilestoneRecord::from_milestone).collect();
        self.write(keys::TIMELINE, &records).await
    }

    /// Load interview answers, or none.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn load_interview(&self) -> Result<InterviewAnswers, StorageError> {
        let record = self
            .read::<InterviewRecord>(keys::INTERVIEW)
            .await?
            .unwrap_or_default();
        Ok(interview_answers(record))
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    pub async fn save_interview(&self, answers: &InterviewAnswers) -> Result<(), StorageError> {
        self.write(keys::INTERVIEW, &interview_record(answers)).await
    }

    /// Load the signed-in user, if one was saved.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read.
    pub async fn load_profile(&self) -> Result<Option<UserProfile>, StorageError> {
        let Some(record) = self.read::<UserRecord>(keys::USER).await? else {
            return Ok(None);
        };
        match record.into_profile() {
            Ok(profile) => Ok(Some(profile)),
            Err(err) => {
                warn!("event=load_fallback key={} reason={err}", keys::USER);
                Ok(None)
            }
        }
    }

    /// # Errors
    ///
    /// Returns `StorageError` if the value cannot be written.
    pub async fn save_profile(&self, profile: &UserProfile) -> Result<(), StorageError> {
        self.write(keys::USER, &UserRecord::from_profile(profile))
            .await
    }

    /// Remove every application key.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be written.
    pub async fn clear(&self) -> Result<(), StorageError> {
        for key in keys::ALL {
            self.kv.remove(key).await?;
        }
        debug!("event=store_cleared keys={}", keys::ALL.len());
        Ok(())
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        let Some(raw) = self.kv.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                warn!("event=load_fallback key={key} reason=malformed_json error={err}");
                Ok(None)
            }
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let raw = serde_json::to_string(value)
            .map_err(|err| StorageError::Serialization(err.to_string()))?;
        self.kv.put(key, &raw).await?;
        debug!("event=store_write key={key} bytes={}", raw.len());
        Ok(())
    }
}
