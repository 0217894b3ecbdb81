use std::sync::Arc;

use log::{info, warn};
use storage::repository::Storage;
use storage::{DocumentRemote, LocalStore};
use visa_core::model::{Category, NotificationDraft, NotificationKind, Priority};
use visa_core::{Clock, ProgressSummary};

use crate::document_service::DocumentService;
use crate::error::AppSessionError;
use crate::interview_service::InterviewService;
use crate::notification_service::NotificationService;
use crate::profile_service::ProfileService;
use crate::progress_service::ProgressService;
use crate::timeline_service::TimelineService;

/// Every state container for one signed-in user, built once at start.
pub struct AppSession {
    clock: Clock,
    store: LocalStore,
    documents_synced: bool,
    announced: ProgressSummary,
    progress: ProgressService,
    notifications: NotificationService,
    timeline: TimelineService,
    interview: InterviewService,
    documents: DocumentService,
    profile: ProfileService,
}

impl AppSession {
    /// Build a session backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppSessionError` if storage initialization or loading fails.
    pub async fn new_sqlite(
        db_url: &str,
        remote: Arc<dyn DocumentRemote>,
        owner_id: &str,
        clock: Clock,
    ) -> Result<Self, AppSessionError> {
        let storage = Storage::sqlite(db_url).await?;
        Self::start(storage, remote, owner_id, clock).await
    }

    /// Load every container from storage and take a first document listing.
    ///
    /// An unreachable document backend does not fail the start; documents
    /// progress then keeps its persisted value until a listing succeeds.
    ///
    /// # Errors
    ///
    /// Returns `AppSessionError` if local storage cannot be read.
    pub async fn start(
        storage: Storage,
        remote: Arc<dyn DocumentRemote>,
        owner_id: &str,
        clock: Clock,
    ) -> Result<Self, AppSessionError> {
        let store = LocalStore::new(Arc::clone(&storage.kv));
        let progress = ProgressService::load(store.clone()).await?;
        let timeline = TimelineService::load(store.clone()).await?;
        let interview = InterviewService::load(store.clone(), clock).await?;
        let profile = ProfileService::new(store.clone());
        let mut documents = DocumentService::new(remote, owner_id);
        let documents_synced = match documents.refresh().await {
            Ok(records) => {
                info!("event=session_start owner={owner_id} documents={}", records.len());
                true
            }
            Err(err) => {
                warn!("event=session_start owner={owner_id} documents=unavailable error={err}");
                false
            }
        };

        Ok(Self {
            clock,
            store,
            documents_synced,
            announced: progress.summary(),
            progress,
            notifications: NotificationService::new(clock),
            timeline,
            interview,
            documents,
            profile,
        })
    }

    #[must_use]
    pub fn clock(&self) -> Clock {
        self.clock
    }

    #[must_use]
    pub fn progress(&self) -> &ProgressService {
        &self.progress
    }

    pub fn progress_mut(&mut self) -> &mut ProgressService {
        &mut self.progress
    }

    #[must_use]
    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationService {
        &mut self.notifications
    }

    #[must_use]
    pub fn timeline(&self) -> &TimelineService {
        &self.timeline
    }

    pub fn timeline_mut(&mut self) -> &mut TimelineService {
        &mut self.timeline
    }

    #[must_use]
    pub fn interview(&self) -> &InterviewService {
        &self.interview
    }

    pub fn interview_mut(&mut self) -> &mut InterviewService {
        &mut self.interview
    }

    #[must_use]
    pub fn documents(&self) -> &DocumentService {
        &self.documents
    }

    pub fn documents_mut(&mut self) -> &mut DocumentService {
        &mut self.documents
    }

    #[must_use]
    pub fn profile(&self) -> &ProfileService {
        &self.profile
    }

    /// Re-list documents from the backend and mark the cache as current.
    ///
    /// # Errors
    ///
    /// Returns `AppSessionError::Documents` if the backend listing fails.
    pub async fn sync_documents(&mut self) -> Result<(), AppSessionError> {
        self.documents.refresh().await?;
        self.documents_synced = true;
        Ok(())
    }

    /// Recompute the derived counters and notify about categories that
    /// reached 100% since the previous refresh (or since start), including
    /// forms updated by hand in between.
    ///
    /// Forms are entered by hand and left alone. Documents are only
    /// recomputed once a listing has succeeded in this session.
    ///
    /// # Errors
    ///
    /// Returns `AppSessionError` if the counters cannot be saved.
    pub async fn refresh_progress(&mut self) -> Result<ProgressSummary, AppSessionError> {
        let timeline = self.timeline.counts();
        self.progress
            .update(Category::Timeline, timeline.completed(), timeline.total())
            .await?;
        let interview = self.interview.counts();
        self.progress
            .update(Category::Interview, interview.completed(), interview.total())
            .await?;
        if self.documents_synced || !self.documents.records().is_empty() {
            self.progress.update_documents(self.documents.counts()).await?;
        }

        let after = self.progress.summary();
        for category in Category::ALL {
            if self.announced.get(category) < 100 && after.get(category) == 100 {
                self.notifications.notify(
                    NotificationDraft::new(
                        NotificationKind::Success,
                        format!("{} complete", category.presentation().label),
                    )
                    .with_category(category.into())
                    .with_priority(Priority::Low),
                )?;
            }
        }
        self.announced = after;
        Ok(after)
    }

    /// Wipe local storage and drop every in-memory container.
    ///
    /// # Errors
    ///
    /// Returns `AppSessionError::Storage` if storage cannot be cleared; the
    /// session is consumed either way.
    pub async fn end(mut self) -> Result<(), AppSessionError> {
        self.notifications.purge();
        self.documents.forget();
        self.store.clear().await?;
        info!("event=session_end owner={}", self.documents.owner_id());
        Ok(())
    }
}
