//! Completion percentages derived from the category counters.
//!
//! Everything here is pure: identical inputs always give identical output.
//! Rounding is half-up on integers, so `2.5%` reports as `3`.

use crate::model::{Category, CategoryCounts, ProgressState};

/// `round(100 * completed / total)`, or 0 when `total` is 0.
///
/// `completed` is clamped to `total`.
#[must_use]
pub fn percentage_of(completed: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let completed = u64::from(completed.min(total));
    let total = u64::from(total);
    let rounded = (200 * completed + total) / (2 * total);
    u8::try_from(rounded).unwrap_or(100)
}

#[must_use]
pub fn percentage(counts: CategoryCounts) -> u8 {
    percentage_of(counts.completed(), counts.total())
}

/// Rounded mean of the four category percentages.
#[must_use]
pub fn overall(percentages: [u8; 4]) -> u8 {
    let sum: u32 = percentages.iter().map(|p| u32::from(*p)).sum();
    u8::try_from((sum + 2) / 4).unwrap_or(100)
}

/// Per-category and overall percentages for one snapshot of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSummary {
    pub documents: u8,
    pub forms: u8,
    pub timeline: u8,
    pub interview: u8,
    pub overall: u8,
}

impl ProgressSummary {
    #[must_use]
    pub fn from_state(state: &ProgressState) -> Self {
        let documents = percentage(state.counts(Category::Documents));
        let forms = percentage(state.counts(Category::Forms));
        let timeline = percentage(state.counts(Category::Timeline));
        let interview = percentage(state.counts(Category::Interview));
        Self {
            documents,
            forms,
            timeline,
            interview,
            overall: overall([documents, forms, timeline, interview]),
        }
    }

    #[must_use]
    pub fn get(&self, category: Category) -> u8 {
        match category {
            Category::Documents => self.documents,
            Category::Forms => self.forms,
            Category::Timeline => self.timeline,
            Category::Interview => self.interview,
        }
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.overall == 100
    }
}
