//! Contract for the hosted document backend.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use thiserror::Error;
use visa_core::Clock;
use visa_core::model::{DocumentId, DocumentRecord, DocumentStatus, DocumentUpload};

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RemoteError {
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    #[error("document backend returned status {status}")]
    Status { status: u16 },

    #[error("document backend unreachable: {0}")]
    Transport(String),

    #[error("unexpected response from document backend: {0}")]
    Decode(String),
}

/// Upload, list and delete documents owned by a user.
#[async_trait]
pub trait DocumentRemote: Send + Sync {
    /// Store a file and return the backend's record for it.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the backend rejects or cannot be reached.
    async fn upload(
        &self,
        upload: &DocumentUpload,
        owner_id: &str,
    ) -> Result<DocumentRecord, RemoteError>;

    /// List the owner's documents, oldest upload first.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` if the backend rejects or cannot be reached.
    async fn list(&self, owner_id: &str) -> Result<Vec<DocumentRecord>, RemoteError>;

    /// Delete a stored document.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::NotFound` if the backend has no such document.
    async fn delete(&self, record: &DocumentRecord) -> Result<(), RemoteError>;
}

#[derive(Default)]
struct RemoteState {
    next_id: u64,
    offline: bool,
    documents: Vec<(String, DocumentRecord)>,
}

/// Backend stand-in that keeps documents in memory.
#[derive(Clone, Default)]
pub struct InMemoryDocumentRemote {
    clock: Clock,
    state: Arc<Mutex<RemoteState>>,
}

impl InMemoryDocumentRemote {
    #[must_use]
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            state: Arc::default(),
        }
    }

    /// Make every call fail with a transport error until switched back.
    pub fn set_offline(&self, offline: bool) {
        if let Ok(mut guard) = self.state.lock() {
            guard.offline = offline;
        }
    }

    /// Change the review status of a stored document, as a case officer would.
    ///
    /// Returns false if no such document exists.
    pub fn set_status(&self, id: &DocumentId, status: DocumentStatus) -> bool {
        let Ok(mut guard) = self.state.lock() else {
            return false;
        };
        match guard.documents.iter_mut().find(|(_, r)| &r.id == id) {
            Some((_, record)) => {
                record.status = status;
                true
            }
            None => false,
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, RemoteState>, RemoteError> {
        let guard = self
            .state
            .lock()
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        if guard.offline {
            return Err(RemoteError::Transport("offline".into()));
        }
        Ok(guard)
    }
}

#[async_trait]
impl DocumentRemote for InMemoryDocumentRemote {
    async fn upload(
        &self,
        upload: &DocumentUpload,
        owner_id: &str,
    ) -> Result<DocumentRecord, RemoteError> {
        let mut guard = self.lock()?;
        guard.next_id += 1;
        let id = DocumentId::new(format!("doc-{}", guard.next_id));
        let record = DocumentRecord {
            url: format!("memory://{owner_id}/{id}/{}", upload.file_name()),
            id,
            name: upload.file_name().to_string(),
            label: upload.label(),
            status: DocumentStatus::Uploaded,
            uploaded_at: self.clock.now(),
        };
        guard.documents.push((owner_id.to_string(), record.clone()));
        Ok(record)
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<DocumentRecord>, RemoteError> {
        let guard = self.lock()?;
        let mut records: Vec<DocumentRecord> = guard
            .documents
            .iter()
            .filter(|(owner, _)| owner == owner_id)
            .map(|(_, record)| record.clone())
            .collect();
        records.sort_by_key(|r| r.uploaded_at);
        Ok(records)
    }

    async fn delete(&self, record: &DocumentRecord) -> Result<(), RemoteError> {
        let mut guard = self.lock()?;
        let before = guard.documents.len();
        guard.documents.retain(|(_, r)| r.id != record.id);
        if guard.documents.len() == before {
            return Err(RemoteError::NotFound(record.id.clone()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visa_core::model::DocumentLabel;
    use visa_core::time::fixed_clock;

    fn upload(name: &str) -> DocumentUpload {
        DocumentUpload::new(name, DocumentLabel::Passport, vec![1, 2, 3]).unwrap()
    }

    #[tokio::test]
    async fn list_is_scoped_to_owner() {
        let remote = InMemoryDocumentRemote::new(fixed_clock());
        remote.upload(&upload("a.pdf"), "alex").await.unwrap();
        remote.upload(&upload("b.pdf"), "sam").await.unwrap();
        let alex = remote.list("alex").await.unwrap();
        assert_eq!(alex.len(), 1);
        assert_eq!(alex[0].name, "a.pdf");
        assert_eq!(alex[0].status, DocumentStatus::Uploaded);
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let remote = InMemoryDocumentRemote::new(fixed_clock());
        let record = remote.upload(&upload("a.pdf"), "alex").await.unwrap();
        remote.delete(&record).await.unwrap();
        assert!(matches!(
            remote.delete(&record).await,
            Err(RemoteError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn offline_remote_fails_every_call() {
        let remote = InMemoryDocumentRemote::new(fixed_clock());
        remote.set_offline(true);
        assert!(matches!(
            remote.list("alex").await,
            Err(RemoteError::Transport(_))
        ));
        remote.set_offline(false);
        assert!(remote.list("alex").await.unwrap().is_empty());
    }
}
