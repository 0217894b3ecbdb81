use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::{CategoryCounts, DocumentCounts, DocumentId};

/// Largest file the backend accepts.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const ALLOWED_EXTENSIONS: &[&str] = &["pdf", "jpg", "jpeg", "png", "docx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    Pending,
    Uploaded,
    Verified,
    Rejected,
}

/// Checklist slot a document fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentLabel {
    Passport,
    BirthCertificate,
    PoliceCheck,
    RelationshipStatement,
    JointFinances,
    SharedResidence,
    HealthExamination,
    SocialEvidence,
    Photos,
    StatutoryDeclarations,
}

impl DocumentLabel {
    /// The full checklist, required items first.
    pub const CHECKLIST: [DocumentLabel; 10] = [
        DocumentLabel::Passport,
        DocumentLabel::BirthCertificate,
        DocumentLabel::PoliceCheck,
        DocumentLabel::RelationshipStatement,
        DocumentLabel::JointFinances,
        DocumentLabel::SharedResidence,
        DocumentLabel::HealthExamination,
        DocumentLabel::SocialEvidence,
        DocumentLabel::Photos,
        DocumentLabel::StatutoryDeclarations,
    ];

    #[must_use]
    pub fn is_required(self) -> bool {
        !matches!(
            self,
            DocumentLabel::SocialEvidence
                | DocumentLabel::Photos
                | DocumentLabel::StatutoryDeclarations
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DocumentLabel::Passport => "passport",
            DocumentLabel::BirthCertificate => "birth_certificate",
            DocumentLabel::PoliceCheck => "police_check",
            DocumentLabel::RelationshipStatement => "relationship_statement",
            DocumentLabel::JointFinances => "joint_finances",
            DocumentLabel::SharedResidence => "shared_residence",
            DocumentLabel::HealthExamination => "health_examination",
            DocumentLabel::SocialEvidence => "social_evidence",
            DocumentLabel::Photos => "photos",
            DocumentLabel::StatutoryDeclarations => "statutory_declarations",
        }
    }
}

impl fmt::Display for DocumentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentLabel {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase().replace('-', "_");
        DocumentLabel::CHECKLIST
            .into_iter()
            .find(|label| label.as_str() == needle)
            .ok_or_else(|| DocumentError::UnknownLabel(s.to_string()))
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DocumentError {
    #[error("file name cannot be empty")]
    EmptyName,

    #[error("file is empty")]
    EmptyFile,

    #[error("file too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("unknown document label: {0}")]
    UnknownLabel(String),
}

/// A document as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub name: String,
    pub url: String,
    pub label: DocumentLabel,
    pub status: DocumentStatus,
    pub uploaded_at: DateTime<Utc>,
}

/// A validated file ready to hand to the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentUpload {
    file_name: String,
    label: DocumentLabel,
    bytes: Vec<u8>,
}

impl DocumentUpload {
    /// # Errors
    ///
    /// Returns `DocumentError` if the name is blank, the payload is empty or
    /// over [`MAX_UPLOAD_BYTES`], or the extension is not accepted.
    pub fn new(
        file_name: impl Into<String>,
        label: DocumentLabel,
        bytes: Vec<u8>,
    ) -> Result<Self, DocumentError> {
        let file_name = file_name.into().trim().to_string();
        if file_name.is_empty() {
            return Err(DocumentError::EmptyName);
        }
        if bytes.is_empty() {
            return Err(DocumentError::EmptyFile);
        }
        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(DocumentError::TooLarge {
                size: bytes.len(),
                max: MAX_UPLOAD_BYTES,
            });
        }
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(DocumentError::UnsupportedType(file_name));
        }

        Ok(Self {
            file_name,
            label,
            bytes,
        })
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn label(&self) -> DocumentLabel {
        self.label
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// MIME type derived from the extension.
    #[must_use]
    pub fn content_type(&self) -> &'static str {
        let ext = self
            .file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "pdf" => "application/pdf",
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            _ => "application/octet-stream",
        }
    }
}

/// Checklist coverage of the given records.
///
/// A slot is complete once any non-rejected record carries its label.
#[must_use]
pub fn document_counts(records: &[DocumentRecord]) -> DocumentCounts {
    let mut required = (0_u32, 0_u32);
    let mut optional = (0_u32, 0_u32);

    for label in DocumentLabel::CHECKLIST {
        let covered = records
            .iter()
            .any(|r| r.label == label && r.status != DocumentStatus::Rejected);
        let slot = if label.is_required() {
            &mut required
        } else {
            &mut optional
        };
        slot.1 += 1;
        if covered {
            slot.0 += 1;
        }
    }

    DocumentCounts::new(
        CategoryCounts::new(required.0, required.1).unwrap_or_default(),
        CategoryCounts::new(optional.0, optional.1).unwrap_or_default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn record(label: DocumentLabel, status: DocumentStatus) -> DocumentRecord {
        DocumentRecord {
            id: DocumentId::new(format!("{label}-1")),
            name: format!("{label}.pdf"),
            url: format!("https://files.example/{label}.pdf"),
            label,
            status,
            uploaded_at: fixed_now(),
        }
    }

    #[test]
    fn upload_validates_before_accepting() {
        assert_eq!(
            DocumentUpload::new(" ", DocumentLabel::Passport, vec![1]),
            Err(DocumentError::EmptyName)
        );
        assert_eq!(
            DocumentUpload::new("passport.pdf", DocumentLabel::Passport, vec![]),
            Err(DocumentError::EmptyFile)
        );
        assert!(matches!(
            DocumentUpload::new("passport.exe", DocumentLabel::Passport, vec![1]),
            Err(DocumentError::UnsupportedType(_))
        ));
        assert!(matches!(
            DocumentUpload::new(
                "passport.pdf",
                DocumentLabel::Passport,
                vec![0; MAX_UPLOAD_BYTES + 1]
            ),
            Err(DocumentError::TooLarge { .. })
        ));

        let ok = DocumentUpload::new("Scan.JPG", DocumentLabel::Photos, vec![1, 2]).unwrap();
        assert_eq!(ok.content_type(), "image/jpeg");
    }

    #[test]
    fn counts_follow_checklist() {
        let records = vec![
            record(DocumentLabel::Passport, DocumentStatus::Verified),
            record(DocumentLabel::Passport, DocumentStatus::Uploaded),
            record(DocumentLabel::PoliceCheck, DocumentStatus::Rejected),
            record(DocumentLabel::Photos, DocumentStatus::Pending),
        ];
        let counts = document_counts(&records);
        assert_eq!(counts.required().completed(), 1);
        assert_eq!(counts.required().total(), 7);
        assert_eq!(counts.optional().completed(), 1);
        assert_eq!(counts.optional().total(), 3);
    }

    #[test]
    fn label_parses_from_cli_form() {
        assert_eq!(
            "birth-certificate".parse::<DocumentLabel>().unwrap(),
            DocumentLabel::BirthCertificate
        );
    }
}
