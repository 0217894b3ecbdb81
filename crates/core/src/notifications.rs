//! In-memory notification state and its transitions.
//!
//! # Invariants
//! - `unread_count()` equals the number of records with `is_read() == false`
//!   after every call to [`NotificationState::apply`].
//! - Ids are unique; adding a duplicate id is a no-op.
//! - Actions on a missing id are no-ops and never touch the counter.

use chrono::{DateTime, Duration, Utc};

use crate::model::{Notification, NotificationCategory, NotificationId};

#[derive(Debug, Clone)]
pub enum NotificationAction {
    /// Prepend a record.
    Add(Notification),
    Remove(NotificationId),
    MarkRead(NotificationId),
    /// Hide a record without changing its read state.
    Dismiss(NotificationId),
    /// Mark every record read.
    ClearAll,
    /// Drop every record.
    Purge,
}

/// Notifications, newest first, plus a running unread counter.
#[derive(Debug, Clone, Default)]
pub struct NotificationState {
    items: Vec<Notification>,
    unread: usize,
}

impl NotificationState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one transition. Returns true if the state changed.
    pub fn apply(&mut self, action: NotificationAction) -> bool {
        let changed = match action {
            NotificationAction::Add(notification) => self.add(notification),
            NotificationAction::Remove(id) => self.remove(id),
            NotificationAction::MarkRead(id) => self.mark_read(id),
            NotificationAction::Dismiss(id) => self.dismiss(id),
            NotificationAction::ClearAll => self.clear_all(),
            NotificationAction::Purge => self.purge(),
        };
        debug_assert_eq!(
            self.unread,
            self.items.iter().filter(|n| !n.is_read()).count(),
            "unread counter drifted"
        );
        changed
    }

    fn add(&mut self, notification: Notification) -> bool {
        if self.position(notification.id()).is_some() {
            return false;
        }
        if !notification.is_read() {
            self.unread += 1;
        }
        self.items.insert(0, notification);
        true
    }

    fn remove(&mut self, id: NotificationId) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        let removed = self.items.remove(idx);
        if !removed.is_read() {
            self.unread = self.unread.saturating_sub(1);
        }
        true
    }

    fn mark_read(&mut self, id: NotificationId) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        let flipped = self.items[idx].set_read();
        if flipped {
            self.unread = self.unread.saturating_sub(1);
        }
        flipped
    }

    fn dismiss(&mut self, id: NotificationId) -> bool {
        let Some(idx) = self.position(id) else {
            return false;
        };
        let was_dismissed = self.items[idx].is_dismissed();
        self.items[idx].set_dismissed();
        !was_dismissed
    }

    fn clear_all(&mut self) -> bool {
        let mut changed = false;
        for item in &mut self.items {
            changed |= item.set_read();
        }
        self.unread = 0;
        changed
    }

    fn purge(&mut self) -> bool {
        let changed = !self.items.is_empty();
        self.items.clear();
        self.unread = 0;
        changed
    }

    fn position(&self, id: NotificationId) -> Option<usize> {
        self.items.iter().position(|n| n.id() == id)
    }

    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.unread
    }

    /// All records, newest first, including dismissed ones.
    #[must_use]
    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: NotificationId) -> Option<&Notification> {
        self.items.iter().find(|n| n.id() == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Records that have not been dismissed, newest first.
    pub fn visible(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter().filter(|n| !n.is_dismissed())
    }

    #[must_use]
    pub fn unread_in(&self, category: NotificationCategory) -> usize {
        self.items
            .iter()
            .filter(|n| !n.is_read() && n.category() == category)
            .count()
    }

    /// Visible records whose due date falls within `[now, now + window]`,
    /// soonest first.
    #[must_use]
    pub fn due_within(&self, now: DateTime<Utc>, window: Duration) -> Vec<&Notification> {
        let horizon = now + window;
        let mut due: Vec<&Notification> = self
            .visible()
            .filter(|n| n.due_date().is_some_and(|d| d >= now && d <= horizon))
            .collect();
        due.sort_by_key(|n| n.due_date());
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NotificationDraft, NotificationKind};
    use crate::time::fixed_now;

    fn note(message: &str) -> Notification {
        NotificationDraft::new(NotificationKind::Info, message)
            .validate(NotificationId::generate(), fixed_now())
            .unwrap()
    }

    fn actual_unread(state: &NotificationState) -> usize {
        state.items().iter().filter(|n| !n.is_read()).count()
    }

    #[test]
    fn add_prepends_and_counts() {
        let mut state = NotificationState::new();
        let first = note("first");
        let second = note("second");
        state.apply(NotificationAction::Add(first.clone()));
        state.apply(NotificationAction::Add(second.clone()));
        assert_eq!(state.unread_count(), 2);
        assert_eq!(state.items()[0].id(), second.id());
        assert_eq!(state.items()[1].id(), first.id());
    }

    #[test]
    fn add_then_mark_read_restores_count() {
        let mut state = NotificationState::new();
        state.apply(NotificationAction::Add(note("existing")));
        let before = state.unread_count();

        let n = note("new");
        let id = n.id();
        state.apply(NotificationAction::Add(n));
        assert_eq!(state.unread_count(), before + 1);
        state.apply(NotificationAction::MarkRead(id));
        assert_eq!(state.unread_count(), before);

        assert!(!state.apply(NotificationAction::MarkRead(id)));
        assert_eq!(state.unread_count(), before);
    }

    #[test]
    fn duplicate_id_is_ignored() {
        let mut state = NotificationState::new();
        let n = note("once");
        assert!(state.apply(NotificationAction::Add(n.clone())));
        assert!(!state.apply(NotificationAction::Add(n)));
        assert_eq!(state.len(), 1);
        assert_eq!(state.unread_count(), 1);
    }

    #[test]
    fn missing_id_never_underflows() {
        let mut state = NotificationState::new();
        let ghost = NotificationId::generate();
        assert!(!state.apply(NotificationAction::Remove(ghost)));
        assert!(!state.apply(NotificationAction::MarkRead(ghost)));
        assert!(!state.apply(NotificationAction::Dismiss(ghost)));
        assert_eq!(state.unread_count(), 0);

        let n = note("only");
        let id = n.id();
        state.apply(NotificationAction::Add(n));
        state.apply(NotificationAction::Remove(id));
        state.apply(NotificationAction::Remove(id));
        assert_eq!(state.unread_count(), 0);
        assert!(state.is_empty());
    }

    #[test]
    fn removing_read_record_keeps_count() {
        let mut state = NotificationState::new();
        let read = note("read");
        let read_id = read.id();
        state.apply(NotificationAction::Add(read));
        state.apply(NotificationAction::Add(note("unread")));
        state.apply(NotificationAction::MarkRead(read_id));
        assert_eq!(state.unread_count(), 1);
        state.apply(NotificationAction::Remove(read_id));
        assert_eq!(state.unread_count(), 1);
    }

    #[test]
    fn dismiss_hides_without_reading() {
        let mut state = NotificationState::new();
        let n = note("hide me");
        let id = n.id();
        state.apply(NotificationAction::Add(n));
        assert!(state.apply(NotificationAction::Dismiss(id)));
        assert!(!state.apply(NotificationAction::Dismiss(id)));
        assert_eq!(state.unread_count(), 1);
        assert_eq!(state.visible().count(), 0);
        assert!(state.get(id).unwrap().is_dismissed());
    }

    #[test]
    fn clear_all_reads_everything() {
        let mut state = NotificationState::new();
        for i in 0..5 {
            state.apply(NotificationAction::Add(note(&format!("n{i}"))));
        }
        assert!(state.apply(NotificationAction::ClearAll));
        assert_eq!(state.unread_count(), 0);
        assert_eq!(state.len(), 5);
        assert!(!state.apply(NotificationAction::ClearAll));

        assert!(state.apply(NotificationAction::Purge));
        assert!(state.is_empty());
    }

    #[test]
    fn rapid_mixed_sequence_keeps_invariant() {
        let mut state = NotificationState::new();
        let mut ids = Vec::new();
        for step in 0..60_usize {
            let action = match step % 6 {
                0 | 1 => {
                    let n = note(&format!("step {step}"));
                    ids.push(n.id());
                    NotificationAction::Add(n)
                }
                2 => NotificationAction::MarkRead(ids[step % ids.len()]),
                3 => NotificationAction::Remove(ids[(step * 7) % ids.len()]),
                4 => NotificationAction::Dismiss(ids[(step * 3) % ids.len()]),
                _ if step % 30 == 5 => NotificationAction::ClearAll,
                _ => NotificationAction::MarkRead(NotificationId::generate()),
            };
            state.apply(action);
            assert_eq!(state.unread_count(), actual_unread(&state), "step {step}");
        }
    }

    #[test]
    fn due_within_filters_and_sorts() {
        let now = fixed_now();
        let mut state = NotificationState::new();
        let make = |days: i64| {
            NotificationDraft::new(NotificationKind::Warning, format!("due in {days}"))
                .with_category(NotificationCategory::Deadline)
                .with_due_date(now + Duration::days(days))
                .validate(NotificationId::generate(), now)
                .unwrap()
        };
        state.apply(NotificationAction::Add(make(3)));
        state.apply(NotificationAction::Add(make(1)));
        state.apply(NotificationAction::Add(make(30)));
        state.apply(NotificationAction::Add(make(-2)));
        state.apply(NotificationAction::Add(note("no due date")));

        let due = state.due_within(now, Duration::days(7));
        let messages: Vec<&str> = due.iter().map(|n| n.message()).collect();
        assert_eq!(messages, vec!["due in 1", "due in 3"]);
        assert_eq!(state.unread_in(NotificationCategory::Deadline), 4);
    }
}
