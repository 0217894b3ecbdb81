//! Fixed display metadata keyed by the enumerated tags.

use crate::model::{Category, MilestoneKind, NotificationCategory, NotificationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presentation {
    pub label: &'static str,
    pub icon: &'static str,
    pub color: &'static str,
}

const fn entry(label: &'static str, icon: &'static str, color: &'static str) -> Presentation {
    Presentation { label, icon, color }
}

const CATEGORY_TABLE: [(Category, Presentation); 4] = [
    (Category::Documents, entry("Documents", "file-text", "blue")),
    (Category::Forms, entry("Forms", "clipboard", "violet")),
    (Category::Timeline, entry("Timeline", "calendar", "amber")),
    (Category::Interview, entry("Interview", "message-circle", "green")),
];

const KIND_TABLE: [(NotificationKind, Presentation); 4] = [
    (NotificationKind::Info, entry("Info", "info", "blue")),
    (NotificationKind::Success, entry("Success", "check-circle", "green")),
    (NotificationKind::Warning, entry("Warning", "alert-triangle", "amber")),
    (NotificationKind::Error, entry("Error", "x-circle", "red")),
];

const NOTIFICATION_CATEGORY_TABLE: [(NotificationCategory, Presentation); 6] = [
    (NotificationCategory::Documents, entry("Documents", "file-text", "blue")),
    (NotificationCategory::Forms, entry("Forms", "clipboard", "violet")),
    (NotificationCategory::Timeline, entry("Timeline", "calendar", "amber")),
    (NotificationCategory::Interview, entry("Interview", "message-circle", "green")),
    (NotificationCategory::Deadline, entry("Deadline", "clock", "red")),
    (NotificationCategory::General, entry("General", "bell", "gray")),
];

const MILESTONE_TABLE: [(MilestoneKind, Presentation); 9] = [
    (MilestoneKind::FirstMet, entry("First met", "users", "pink")),
    (MilestoneKind::StartedDating, entry("Started dating", "heart", "pink")),
    (MilestoneKind::MovedIn, entry("Moved in together", "home", "amber")),
    (MilestoneKind::Engaged, entry("Engaged", "gem", "violet")),
    (MilestoneKind::Married, entry("Married", "rings", "violet")),
    (MilestoneKind::Travel, entry("Travel", "plane", "blue")),
    (MilestoneKind::FamilyEvent, entry("Family event", "gift", "green")),
    (MilestoneKind::Financial, entry("Financial", "wallet", "teal")),
    (MilestoneKind::Other, entry("Other", "star", "gray")),
];

fn lookup<K: PartialEq + Copy>(table: &[(K, Presentation)], key: K) -> Presentation {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map_or(FALLBACK, |(_, p)| *p)
}

const FALLBACK: Presentation = entry("Other", "circle", "gray");

impl Category {
    #[must_use]
    pub fn presentation(self) -> Presentation {
        lookup(&CATEGORY_TABLE, self)
    }
}

impl NotificationKind {
    #[must_use]
    pub fn presentation(self) -> Presentation {
        lookup(&KIND_TABLE, self)
    }
}

impl NotificationCategory {
    #[must_use]
    pub fn presentation(self) -> Presentation {
        lookup(&NOTIFICATION_CATEGORY_TABLE, self)
    }
}

impl MilestoneKind {
    #[must_use]
    pub fn presentation(self) -> Presentation {
        lookup(&MILESTONE_TABLE, self)
    }
}
