use std::sync::Arc;

use log::{info, warn};
use storage::DocumentRemote;
use visa_core::model::{
    DocumentCounts, DocumentId, DocumentLabel, DocumentRecord, DocumentUpload, document_counts,
};

use crate::error::DocumentServiceError;

/// Caches the owner's documents as last listed by the backend.
///
/// Uploads are validated locally before the backend sees them. Backend
/// failures are returned once and never retried.
pub struct DocumentService {
    remote: Arc<dyn DocumentRemote>,
    owner_id: String,
    records: Vec<DocumentRecord>,
}

impl DocumentService {
    #[must_use]
    pub fn new(remote: Arc<dyn DocumentRemote>, owner_id: impl Into<String>) -> Self {
        Self {
            remote,
            owner_id: owner_id.into(),
            records: Vec::new(),
        }
    }

    #[must_use]
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Replace the cache with the backend's listing.
    ///
    /// # Errors
    ///
    /// Returns `DocumentServiceError::Remote` if listing fails; the cache is kept.
    pub async fn refresh(&mut self) -> Result<&[DocumentRecord], DocumentServiceError> {
        let records = self.remote.list(&self.owner_id).await.inspect_err(|err| {
            warn!("event=documents_refresh_failed owner={} error={err}", self.owner_id);
        })?;
        self.records = records;
        Ok(&self.records)
    }

    /// Validate and upload a file under a checklist label.
    ///
    /// # Errors
    ///
    /// Returns `DocumentServiceError::Document` for a rejected file (the
    /// backend is not contacted) or `DocumentServiceError::Remote` if the
    /// upload fails.
    pub async fn upload(
        &mut self,
        file_name: &str,
        label: DocumentLabel,
        bytes: Vec<u8>,
    ) -> Result<DocumentRecord, DocumentServiceError> {
        let upload = DocumentUpload::new(file_name, label, bytes)?;
        let record = self.remote.upload(&upload, &self.owner_id).await?;
        info!(
            "event=document_uploaded id={} label={} bytes={}",
            record.id,
            record.label.as_str(),
            upload.bytes().len()
        );
        match self.records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => *existing = record.clone(),
            None => self.records.push(record.clone()),
        }
        Ok(record)
    }

    /// Delete a cached document from the backend.
    ///
    /// # Errors
    ///
    /// Returns `DocumentServiceError::NotFound` if the id is not cached or
    /// `DocumentServiceError::Remote` if the backend delete fails.
    pub async fn delete(&mut self, id: &DocumentId) -> Result<DocumentRecord, DocumentServiceError> {
        let index = self
            .records
            .iter()
            .position(|r| &r.id == id)
            .ok_or_else(|| DocumentServiceError::NotFound(id.clone()))?;
        self.remote.delete(&self.records[index]).await?;
        info!("event=document_deleted id={id}");
        Ok(self.records.remove(index))
    }

    #[must_use]
    pub fn records(&self) -> &[DocumentRecord] {
        &self.records
    }

    #[must_use]
    pub fn counts(&self) -> DocumentCounts {
        document_counts(&self.records)
    }

    pub(crate) fn forget(&mut self) {
        self.records.clear();
    }
}
