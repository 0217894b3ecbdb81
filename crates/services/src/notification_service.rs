use chrono::Duration;
use log::debug;
use visa_core::Clock;
use visa_core::model::{Notification, NotificationDraft, NotificationError, NotificationId};
use visa_core::{NotificationAction, NotificationState};

/// Session-scoped notification center. Nothing here is persisted.
pub struct NotificationService {
    clock: Clock,
    state: NotificationState,
}

impl NotificationService {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            state: NotificationState::new(),
        }
    }

    /// Validate a draft, stamp it with a fresh id and the current time, and
    /// put it at the top of the list.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError` if the draft fails validation.
    pub fn notify(&mut self, draft: NotificationDraft) -> Result<NotificationId, NotificationError> {
        let notification = draft.validate(NotificationId::generate(), self.clock.now())?;
        let id = notification.id();
        self.state.apply(NotificationAction::Add(notification));
        debug!("event=notification_added id={id} unread={}", self.state.unread_count());
        Ok(id)
    }

    /// Returns true if the notification was unread.
    pub fn mark_read(&mut self, id: NotificationId) -> bool {
        self.state.apply(NotificationAction::MarkRead(id))
    }

    /// Returns true if the notification was visible.
    pub fn dismiss(&mut self, id: NotificationId) -> bool {
        self.state.apply(NotificationAction::Dismiss(id))
    }

    /// Returns true if the notification existed.
    pub fn remove(&mut self, id: NotificationId) -> bool {
        self.state.apply(NotificationAction::Remove(id))
    }

    pub fn clear_all(&mut self) {
        self.state.apply(NotificationAction::ClearAll);
    }

    pub fn purge(&mut self) {
        self.state.apply(NotificationAction::Purge);
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.state.unread_count()
    }

    #[must_use]
    pub fn state(&self) -> &NotificationState {
        &self.state
    }

    /// Visible notifications due within `window` from now, soonest first.
    #[must_use]
    pub fn due_soon(&self, window: Duration) -> Vec<&Notification> {
        self.state.due_within(self.clock.now(), window)
    }
}
