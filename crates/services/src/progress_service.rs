use log::info;
use storage::LocalStore;
use visa_core::ProgressSummary;
use visa_core::model::{Category, CategoryCounts, DocumentCounts, ProgressState};

use crate::error::ProgressServiceError;

/// Owns the progress counters for a session and persists every change.
pub struct ProgressService {
    store: LocalStore,
    state: ProgressState,
}

impl ProgressService {
    /// Load counters from the store (zeros if none were saved).
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the store cannot be read.
    pub async fn load(store: LocalStore) -> Result<Self, ProgressServiceError> {
        let state = store.load_progress().await?;
        Ok(Self { store, state })
    }

    #[must_use]
    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    #[must_use]
    pub fn summary(&self) -> ProgressSummary {
        ProgressSummary::from_state(&self.state)
    }

    /// Replace one category's counters.
    ///
    /// Documents set this way carry no optional counters; use
    /// [`Self::update_documents`] to keep the split.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Progress` if `completed > total` (state
    /// unchanged) or `ProgressServiceError::Storage` if the save fails.
    pub async fn update(
        &mut self,
        category: Category,
        completed: u32,
        total: u32,
    ) -> Result<ProgressSummary, ProgressServiceError> {
        let counts = CategoryCounts::new(completed, total)?;
        let mut next = self.state;
        next.set_counts(category, counts);
        self.commit(next).await?;
        info!("event=progress_update category={category} completed={completed} total={total}");
        Ok(self.summary())
    }

    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the save fails.
    pub async fn update_documents(
        &mut self,
        counts: DocumentCounts,
    ) -> Result<ProgressSummary, ProgressServiceError> {
        let mut next = self.state;
        next.documents = counts;
        self.commit(next).await?;
        Ok(self.summary())
    }

    /// Zero every counter.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError::Storage` if the save fails.
    pub async fn reset(&mut self) -> Result<(), ProgressServiceError> {
        self.commit(ProgressState::default()).await
    }

    /// Persist first so a failed save leaves the in-memory state untouched.
    async fn commit(&mut self, next: ProgressState) -> Result<(), ProgressServiceError> {
        if next == self.state {
            return Ok(());
        }
        self.store.save_progress(&next).await?;
        self.state = next;
        Ok(())
    }
}
