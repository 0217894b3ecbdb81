use log::info;
use storage::LocalStore;
use visa_core::Timeline;
use visa_core::model::{CategoryCounts, Milestone, MilestoneDraft, MilestoneId};

use crate::error::TimelineServiceError;

/// Key milestone kinds a complete relationship timeline is expected to show.
pub const KEY_MILESTONE_TARGET: u32 = 6;

/// Owns the relationship timeline; local storage is its only copy.
pub struct TimelineService {
    store: LocalStore,
    timeline: Timeline,
}

impl TimelineService {
    /// # Errors
    ///
    /// Returns `TimelineServiceError::Storage` if the store cannot be read.
    pub async fn load(store: LocalStore) -> Result<Self, TimelineServiceError> {
        let timeline = store.load_timeline().await?;
        Ok(Self { store, timeline })
    }

    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Validate and insert a new milestone.
    ///
    /// # Errors
    ///
    /// Returns `TimelineServiceError::Timeline` if the draft is invalid or
    /// `TimelineServiceError::Storage` if the save fails. The timeline is
    /// unchanged on error.
    pub async fn add(&mut self, draft: MilestoneDraft) -> Result<MilestoneId, TimelineServiceError> {
        let milestone = draft
            .validate(MilestoneId::generate())
            .map_err(visa_core::TimelineError::from)?;
        let id = milestone.id();
        let mut next = self.timeline.clone();
        next.insert(milestone)?;
        self.commit(next).await?;
        info!("event=milestone_added id={id} total={}", self.timeline.len());
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns `TimelineServiceError::Timeline` for an unknown id or invalid
    /// draft, or `TimelineServiceError::Storage` if the save fails.
    pub async fn edit(
        &mut self,
        id: MilestoneId,
        draft: MilestoneDraft,
    ) -> Result<&Milestone, TimelineServiceError> {
        let mut next = self.timeline.clone();
        next.edit(id, draft)?;
        self.commit(next).await?;
        self.timeline
            .get(id)
            .ok_or(TimelineServiceError::Timeline(visa_core::TimelineError::NotFound(id)))
    }

    /// # Errors
    ///
    /// Returns `TimelineServiceError::Timeline` for an unknown id, or
    /// `TimelineServiceError::Storage` if the save fails.
    pub async fn remove(&mut self, id: MilestoneId) -> Result<Milestone, TimelineServiceError> {
        let mut next = self.timeline.clone();
        let removed = next.remove(id)?;
        self.commit(next).await?;
        info!("event=milestone_removed id={id} total={}", self.timeline.len());
        Ok(removed)
    }

    /// Distinct key milestone kinds recorded against [`KEY_MILESTONE_TARGET`].
    #[must_use]
    pub fn counts(&self) -> CategoryCounts {
        let recorded = u32::try_from(self.timeline.key_kinds_recorded())
            .unwrap_or(u32::MAX)
            .min(KEY_MILESTONE_TARGET);
        CategoryCounts::new(recorded, KEY_MILESTONE_TARGET).unwrap_or_default()
    }

    async fn commit(&mut self, next: Timeline) -> Result<(), TimelineServiceError> {
        self.store.save_timeline(&next).await?;
        self.timeline = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;
    use storage::repository::InMemoryStore;
    use visa_core::TimelineError;
    use visa_core::model::MilestoneKind;
    use visa_core::time::fixed_now;

    fn store() -> LocalStore {
        LocalStore::new(Arc::new(InMemoryStore::new()))
    }

    #[tokio::test]
    async fn mutations_are_persisted_in_order() {
        let store = store();
        let mut service = TimelineService::load(store.clone()).await.unwrap();
        let wedding = service
            .add(MilestoneDraft::new(
                fixed_now(),
                MilestoneKind::Married,
                "Wedding",
            ))
            .await
            .unwrap();
        service
            .add(MilestoneDraft::new(
                fixed_now() - Duration::days(800),
                MilestoneKind::FirstMet,
                "Met",
            ))
            .await
            .unwrap();

        let reloaded = TimelineService::load(store.clone()).await.unwrap();
        let titles: Vec<_> = reloaded.timeline().iter().map(Milestone::title).collect();
        assert_eq!(titles, vec!["Met", "Wedding"]);

        service
            .edit(
                wedding,
                MilestoneDraft::new(
                    fixed_now() - Duration::days(900),
                    MilestoneKind::Married,
                    "Wedding",
                ),
            )
            .await
            .unwrap();
        let reloaded = TimelineService::load(store).await.unwrap();
        let titles: Vec<_> = reloaded.timeline().iter().map(Milestone::title).collect();
        assert_eq!(titles, vec!["Wedding", "Met"]);
        assert_eq!(service.counts().completed(), 2);
        assert_eq!(service.counts().total(), KEY_MILESTONE_TARGET);
    }

    #[tokio::test]
    async fn invalid_add_and_unknown_remove_are_rejected() {
        let mut service = TimelineService::load(store()).await.unwrap();
        let err = service
            .add(MilestoneDraft::new(fixed_now(), MilestoneKind::Other, " "))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TimelineServiceError::Timeline(TimelineError::Milestone(_))
        ));

        let ghost = MilestoneId::generate();
        assert!(matches!(
            service.remove(ghost).await,
            Err(TimelineServiceError::Timeline(TimelineError::NotFound(_)))
        ));
        assert!(service.timeline().is_empty());
    }
}
