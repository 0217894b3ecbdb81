#![forbid(unsafe_code)]

pub mod app_session;
pub mod document_service;
pub mod error;
pub mod http_documents;
pub mod interview_service;
pub mod notification_service;
pub mod profile_service;
pub mod progress_service;
pub mod timeline_service;

pub use visa_core::Clock;

pub use app_session::AppSession;
pub use document_service::DocumentService;
pub use error::{
    AppSessionError, DocumentServiceError, HttpConfigError, InterviewServiceError,
    ProfileServiceError, ProgressServiceError, TimelineServiceError,
};
pub use http_documents::{HttpDocumentConfig, HttpDocumentRemote};
pub use interview_service::InterviewService;
pub use notification_service::NotificationService;
pub use profile_service::ProfileService;
pub use progress_service::ProgressService;
pub use timeline_service::{KEY_MILESTONE_TARGET, TimelineService};
