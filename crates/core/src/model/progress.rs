use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The four progress-tracking buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Documents,
    Forms,
    Timeline,
    Interview,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 4] = [
        Category::Documents,
        Category::Forms,
        Category::Timeline,
        Category::Interview,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Documents => "documents",
            Category::Forms => "forms",
            Category::Timeline => "timeline",
            Category::Interview => "interview",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("completed ({completed}) exceeds total ({total})")]
    CompletedExceedsTotal { completed: u32, total: u32 },

    #[error("unknown progress category: {0}")]
    UnknownCategory(String),
}

impl FromStr for Category {
    type Err = ProgressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "documents" => Ok(Category::Documents),
            "forms" => Ok(Category::Forms),
            "timeline" => Ok(Category::Timeline),
            "interview" => Ok(Category::Interview),
            other => Err(ProgressError::UnknownCategory(other.to_string())),
        }
    }
}

/// A `{completed, total}` counter with `completed <= total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CategoryCounts {
    completed: u32,
    total: u32,
}

impl CategoryCounts {
    /// # Errors
    ///
    /// Returns `ProgressError::CompletedExceedsTotal` if `completed > total`.
    pub fn new(completed: u32, total: u32) -> Result<Self, ProgressError> {
        if completed > total {
            return Err(ProgressError::CompletedExceedsTotal { completed, total });
        }
        Ok(Self { completed, total })
    }

    #[must_use]
    pub fn completed(&self) -> u32 {
        self.completed
    }

    #[must_use]
    pub fn total(&self) -> u32 {
        self.total
    }
}

/// Document counters split by checklist requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DocumentCounts {
    required: CategoryCounts,
    optional: CategoryCounts,
}

impl DocumentCounts {
    #[must_use]
    pub fn new(required: CategoryCounts, optional: CategoryCounts) -> Self {
        Self { required, optional }
    }

    /// Counts with no optional documents tracked.
    #[must_use]
    pub fn required_only(required: CategoryCounts) -> Self {
        Self {
            required,
            optional: CategoryCounts::default(),
        }
    }

    #[must_use]
    pub fn required(&self) -> CategoryCounts {
        self.required
    }

    #[must_use]
    pub fn optional(&self) -> CategoryCounts {
        self.optional
    }

    /// Sum of required and optional counters.
    #[must_use]
    pub fn folded(&self) -> CategoryCounts {
        CategoryCounts {
            completed: self.required.completed.saturating_add(self.optional.completed),
            total: self.required.total.saturating_add(self.optional.total),
        }
    }
}

/// Counters for every category. Starts at all zeros.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub documents: DocumentCounts,
    pub forms: CategoryCounts,
    pub timeline: CategoryCounts,
    pub interview: CategoryCounts,
}

impl ProgressState {
    /// Folded `{completed, total}` for a category.
    #[must_use]
    pub fn counts(&self, category: Category) -> CategoryCounts {
        match category {
            Category::Documents => self.documents.folded(),
            Category::Forms => self.forms,
            Category::Timeline => self.timeline,
            Category::Interview => self.interview,
        }
    }

    /// Replace a category's counters. Documents are stored as required-only.
    pub fn set_counts(&mut self, category: Category, counts: CategoryCounts) {
        match category {
            Category::Documents => self.documents = DocumentCounts::required_only(counts),
            Category::Forms => self.forms = counts,
            Category::Timeline => self.timeline = counts,
            Category::Interview => self.interview = counts,
        }
    }
}
