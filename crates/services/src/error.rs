//! Shared error types for the services crate.

use thiserror::Error;

use storage::remote::RemoteError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;
use visa_core::TimelineError;
use visa_core::model::{
    DocumentError, DocumentId, InterviewError, NotificationError, ProfileError, ProgressError,
};

/// Errors emitted by `ProgressService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressServiceError {
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `TimelineService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TimelineServiceError {
    #[error(transparent)]
    Timeline(#[from] TimelineError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `InterviewService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum InterviewServiceError {
    #[error(transparent)]
    Interview(#[from] InterviewError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ProfileService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProfileServiceError {
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DocumentService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DocumentServiceError {
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error("document not found: {0}")]
    NotFound(DocumentId),
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Errors emitted by `HttpDocumentConfig`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HttpConfigError {
    #[error("invalid backend URL: {0}")]
    InvalidBaseUrl(String),
    #[error("backend API key cannot be empty")]
    EmptyApiKey,
}

/// Errors emitted while starting, refreshing or ending an `AppSession`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppSessionError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Progress(#[from] ProgressServiceError),
    #[error(transparent)]
    Timeline(#[from] TimelineServiceError),
    #[error(transparent)]
    Interview(#[from] InterviewServiceError),
    #[error(transparent)]
    Profile(#[from] ProfileServiceError),
    #[error(transparent)]
    Documents(#[from] DocumentServiceError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}
