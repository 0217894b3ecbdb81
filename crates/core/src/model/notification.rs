use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::{Category, NotificationId};

/// Severity of a notification, drives its styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

/// Area of the application a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationCategory {
    Documents,
    Forms,
    Timeline,
    Interview,
    Deadline,
    #[default]
    General,
}

impl From<Category> for NotificationCategory {
    fn from(category: Category) -> Self {
        match category {
            Category::Documents => NotificationCategory::Documents,
            Category::Forms => NotificationCategory::Forms,
            Category::Timeline => NotificationCategory::Timeline,
            Category::Interview => NotificationCategory::Interview,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotificationError {
    #[error("notification message cannot be empty")]
    EmptyMessage,

    #[error("invalid notification link: {0}")]
    InvalidLink(String),
}

/// A user-visible notification record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    id: NotificationId,
    kind: NotificationKind,
    title: Option<String>,
    message: String,
    timestamp: DateTime<Utc>,
    is_read: bool,
    is_dismissed: bool,
    due_date: Option<DateTime<Utc>>,
    category: NotificationCategory,
    priority: Priority,
    link: Option<String>,
}

/// Caller-supplied fields; everything else is defaulted on validation.
#[derive(Debug, Clone)]
pub struct NotificationDraft {
    pub kind: NotificationKind,
    pub message: String,
    pub title: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub category: NotificationCategory,
    pub priority: Priority,
    pub link: Option<String>,
}

impl NotificationDraft {
    #[must_use]
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            title: None,
            due_date: None,
            category: NotificationCategory::default(),
            priority: Priority::default(),
            link: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn with_due_date(mut self, due: DateTime<Utc>) -> Self {
        self.due_date = Some(due);
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: NotificationCategory) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    #[must_use]
    pub fn with_link(mut self, link: impl Into<String>) -> Self {
        self.link = Some(link.into());
        self
    }

    /// Build an unread, undismissed notification stamped at `now`.
    ///
    /// Links may be absolute URLs or in-app paths starting with `/`.
    ///
    /// # Errors
    ///
    /// Returns `NotificationError::EmptyMessage` for a blank message and
    /// `NotificationError::InvalidLink` for a link that is neither form.
    pub fn validate(
        self,
        id: NotificationId,
        now: DateTime<Utc>,
    ) -> Result<Notification, NotificationError> {
        let message = self.message.trim().to_string();
        if message.is_empty() {
            return Err(NotificationError::EmptyMessage);
        }

        let link = normalize_optional(self.link);
        if let Some(link) = link.as_deref() {
            if !link.starts_with('/') && Url::parse(link).is_err() {
                return Err(NotificationError::InvalidLink(link.to_string()));
            }
        }

        Ok(Notification {
            id,
            kind: self.kind,
            title: normalize_optional(self.title),
            message,
            timestamp: now,
            is_read: false,
            is_dismissed: false,
            due_date: self.due_date,
            category: self.category,
            priority: self.priority,
            link,
        })
    }
}

impl Notification {
    #[must_use]
    pub fn id(&self) -> NotificationId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> NotificationKind {
        self.kind
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn is_read(&self) -> bool {
        self.is_read
    }

    #[must_use]
    pub fn is_dismissed(&self) -> bool {
        self.is_dismissed
    }

    #[must_use]
    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    #[must_use]
    pub fn category(&self) -> NotificationCategory {
        self.category
    }

    #[must_use]
    pub fn priority(&self) -> Priority {
        self.priority
    }

    #[must_use]
    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }

    /// Returns true if the flag flipped.
    pub(crate) fn set_read(&mut self) -> bool {
        let changed = !self.is_read;
        self.is_read = true;
        changed
    }

    pub(crate) fn set_dismissed(&mut self) {
        self.is_dismissed = true;
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|val| val.trim().to_string())
        .filter(|val| !val.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn validate_fills_defaults() {
        let n = NotificationDraft::new(NotificationKind::Info, "  Upload your passport ")
            .validate(NotificationId::generate(), fixed_now())
            .unwrap();
        assert_eq!(n.message(), "Upload your passport");
        assert_eq!(n.timestamp(), fixed_now());
        assert!(!n.is_read());
        assert!(!n.is_dismissed());
        assert_eq!(n.priority(), Priority::Medium);
        assert_eq!(n.category(), NotificationCategory::General);
        assert_eq!(n.title(), None);
    }

    #[test]
    fn blank_message_is_rejected() {
        let err = NotificationDraft::new(NotificationKind::Warning, "   ")
            .validate(NotificationId::generate(), fixed_now())
            .unwrap_err();
        assert_eq!(err, NotificationError::EmptyMessage);
    }

    #[test]
    fn links_accept_urls_and_app_paths() {
        let id = NotificationId::generate();
        assert!(NotificationDraft::new(NotificationKind::Info, "m")
            .with_link("/documents")
            .validate(id, fixed_now())
            .is_ok());
        assert!(NotificationDraft::new(NotificationKind::Info, "m")
            .with_link("https://immi.homeaffairs.gov.au")
            .validate(id, fixed_now())
            .is_ok());
        assert!(matches!(
            NotificationDraft::new(NotificationKind::Info, "m")
                .with_link("documents page")
                .validate(id, fixed_now()),
            Err(NotificationError::InvalidLink(_))
        ));
    }
}
