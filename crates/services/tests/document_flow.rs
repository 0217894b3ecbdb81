use std::sync::Arc;

use services::{AppSession, Clock, DocumentServiceError};
use storage::repository::Storage;
use storage::{InMemoryDocumentRemote, RemoteError};
use visa_core::model::{DocumentError, DocumentLabel, DocumentStatus, MAX_UPLOAD_BYTES};
use visa_core::time::fixed_now;

async fn session(remote: &InMemoryDocumentRemote) -> AppSession {
    AppSession::start(
        Storage::in_memory(),
        Arc::new(remote.clone()),
        "owner-1",
        Clock::fixed(fixed_now()),
    )
    .await
    .expect("start session")
}

#[tokio::test]
async fn uploads_feed_documents_progress() {
    let remote = InMemoryDocumentRemote::new(Clock::fixed(fixed_now()));
    let mut session = session(&remote).await;

    for (name, label) in [
        ("passport.pdf", DocumentLabel::Passport),
        ("birth.png", DocumentLabel::BirthCertificate),
        ("statement.docx", DocumentLabel::RelationshipStatement),
        ("holiday.JPG", DocumentLabel::Photos),
    ] {
        session
            .documents_mut()
            .upload(name, label, vec![0_u8; 16])
            .await
            .expect("upload");
    }

    // 4 of 10 checklist slots.
    let summary = session.refresh_progress().await.expect("refresh");
    assert_eq!(summary.documents, 40);

    let passport = session.documents().records()[0].clone();
    assert!(remote.set_status(&passport.id, DocumentStatus::Rejected));
    session.sync_documents().await.expect("sync");
    assert_eq!(session.refresh_progress().await.expect("refresh").documents, 30);

    session
        .documents_mut()
        .delete(&passport.id)
        .await
        .expect("delete");
    assert_eq!(session.documents().records().len(), 3);
}

#[tokio::test]
async fn oversize_upload_is_rejected_locally() {
    let remote = InMemoryDocumentRemote::new(Clock::fixed(fixed_now()));
    let mut session = session(&remote).await;

    let err = session
        .documents_mut()
        .upload(
            "scan.pdf",
            DocumentLabel::Passport,
            vec![0_u8; MAX_UPLOAD_BYTES + 1],
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DocumentServiceError::Document(DocumentError::TooLarge { .. })
    ));
    assert!(session.documents().records().is_empty());
}

#[tokio::test]
async fn offline_backend_errors_are_surfaced_once() {
    let remote = InMemoryDocumentRemote::new(Clock::fixed(fixed_now()));
    let mut session = session(&remote).await;
    remote.set_offline(true);

    let err = session
        .documents_mut()
        .upload("passport.pdf", DocumentLabel::Passport, vec![1])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DocumentServiceError::Remote(RemoteError::Transport(_))
    ));
    assert!(session.sync_documents().await.is_err());
}
