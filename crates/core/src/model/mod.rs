mod document;
mod ids;
pub mod interview;
mod milestone;
mod notification;
pub mod presentation;
mod profile;
mod progress;

pub use document::{
    DocumentError, DocumentLabel, DocumentRecord, DocumentStatus, DocumentUpload,
    MAX_UPLOAD_BYTES, document_counts,
};
pub use ids::{DocumentId, MilestoneId, NotificationId, ParseIdError};
pub use interview::{InterviewAnswer, InterviewAnswers, InterviewError, QUESTION_BANK};
pub use milestone::{Milestone, MilestoneDraft, MilestoneError, MilestoneKind};
pub use notification::{
    Notification, NotificationCategory, NotificationDraft, NotificationError, NotificationKind,
    Priority,
};
pub use presentation::Presentation;
pub use profile::{ProfileError, UserProfile, UserProfileDraft, VisaSubclass};
pub use progress::{Category, CategoryCounts, DocumentCounts, ProgressError, ProgressState};
