use std::env;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use storage::{DocumentRemote, RemoteError};
use visa_core::model::{DocumentLabel, DocumentRecord, DocumentStatus, DocumentUpload};

use crate::error::HttpConfigError;

const DEFAULT_BUCKET: &str = "documents";
const DOCUMENTS_TABLE: &str = "documents";

#[derive(Clone, Debug)]
pub struct HttpDocumentConfig {
    base_url: Url,
    api_key: String,
    bucket: String,
}

impl HttpDocumentConfig {
    /// # Errors
    ///
    /// Returns `HttpConfigError` if the URL is not an absolute http(s) URL or
    /// the key is blank.
    pub fn new(
        base_url: &str,
        api_key: &str,
        bucket: Option<&str>,
    ) -> Result<Self, HttpConfigError> {
        let base_url = Url::parse(base_url.trim())
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base())
            .ok_or_else(|| HttpConfigError::InvalidBaseUrl(base_url.to_string()))?;
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(HttpConfigError::EmptyApiKey);
        }
        let bucket = bucket
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(DEFAULT_BUCKET);
        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            bucket: bucket.to_string(),
        })
    }

    /// Read `VISA_BACKEND_URL`, `VISA_BACKEND_KEY` and `VISA_BACKEND_BUCKET`.
    ///
    /// Returns `Ok(None)` when the URL or key is unset.
    ///
    /// # Errors
    ///
    /// Returns `HttpConfigError` if the variables are set but invalid.
    pub fn from_env() -> Result<Option<Self>, HttpConfigError> {
        let (Ok(base_url), Ok(api_key)) = (env::var("VISA_BACKEND_URL"), env::var("VISA_BACKEND_KEY"))
        else {
            return Ok(None);
        };
        let bucket = env::var("VISA_BACKEND_BUCKET").ok();
        Self::new(&base_url, &api_key, bucket.as_deref()).map(Some)
    }

    #[must_use]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    fn endpoint<'a>(&self, segments: impl IntoIterator<Item = &'a str>) -> Result<Url, RemoteError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RemoteError::Decode(format!("cannot extend {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn object_url(&self, path: &str) -> Result<Url, RemoteError> {
        let segments = ["storage", "v1", "object", self.bucket.as_str()]
            .into_iter()
            .chain(path.split('/'));
        self.endpoint(segments)
    }

    fn table_url(&self) -> Result<Url, RemoteError> {
        self.endpoint(["rest", "v1", DOCUMENTS_TABLE])
    }

    /// Object URL of a record, provided it points into this bucket.
    fn stored_object_url(&self, record: &DocumentRecord) -> Result<Url, RemoteError> {
        let prefix = self.object_url("")?;
        Url::parse(&record.url)
            .ok()
            .filter(|url| url.as_str().len() > prefix.as_str().len())
            .filter(|url| url.as_str().starts_with(prefix.as_str()))
            .ok_or_else(|| RemoteError::Decode(format!("unrecognised object url {}", record.url)))
    }
}

/// Document backend speaking the hosted storage and REST endpoints.
#[derive(Clone)]
pub struct HttpDocumentRemote {
    client: Client,
    config: HttpDocumentConfig,
}

impl HttpDocumentRemote {
    #[must_use]
    pub fn new(config: HttpDocumentConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, RemoteError> {
        let response = self
            .authorized(request)
            .send()
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            warn!("event=backend_status status={}", status.as_u16());
            return Err(RemoteError::Status {
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[derive(Debug, Serialize)]
struct NewDocumentRow<'a> {
    owner_id: &'a str,
    name: &'a str,
    url: &'a str,
    label: DocumentLabel,
    status: DocumentStatus,
}

#[async_trait]
impl DocumentRemote for HttpDocumentRemote {
    async fn upload(
        &self,
        upload: &DocumentUpload,
        owner_id: &str,
    ) -> Result<DocumentRecord, RemoteError> {
        let path = format!("{owner_id}/{}", upload.file_name());
        let object_url = self.config.object_url(&path)?;
        self.send(
            self.client
                .post(object_url.clone())
                .header("content-type", upload.content_type())
                .header("x-upsert", "true")
                .body(upload.bytes().to_vec()),
        )
        .await?;
        debug!("event=object_stored bucket={} bytes={}", self.config.bucket, upload.bytes().len());

        let row = NewDocumentRow {
            owner_id,
            name: upload.file_name(),
            url: object_url.as_str(),
            label: upload.label(),
            status: DocumentStatus::Uploaded,
        };
        let response = self
            .send(
                self.client
                    .post(self.config.table_url()?)
                    .header("prefer", "return=representation")
                    .json(&row),
            )
            .await?;
        let rows: Vec<DocumentRecord> = response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| RemoteError::Decode("insert returned no rows".into()))
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<DocumentRecord>, RemoteError> {
        let mut url = self.config.table_url()?;
        url.query_pairs_mut()
            .append_pair("owner_id", &format!("eq.{owner_id}"))
            .append_pair("order", "uploaded_at.asc");
        let response = self.send(self.client.get(url)).await?;
        response
            .json()
            .await
            .map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn delete(&self, record: &DocumentRecord) -> Result<(), RemoteError> {
        let object_url = self.config.stored_object_url(record)?;
        self.send(self.client.delete(object_url))
            .await
            .map_err(|err| match err {
                RemoteError::Status { status } if status == StatusCode::NOT_FOUND.as_u16() => {
                    RemoteError::NotFound(record.id.clone())
                }
                other => other,
            })?;

        let mut row_url = self.config.table_url()?;
        row_url
            .query_pairs_mut()
            .append_pair("id", &format!("eq.{}", record.id));
        self.send(self.client.delete(row_url)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use visa_core::model::DocumentId;
    use visa_core::time::fixed_now;

    fn config() -> HttpDocumentConfig {
        HttpDocumentConfig::new("https://example.supabase.co/", "anon-key", None).unwrap()
    }

    #[test]
    fn config_rejects_bad_values() {
        assert!(matches!(
            HttpDocumentConfig::new("not a url", "key", None),
            Err(HttpConfigError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            HttpDocumentConfig::new("mailto:someone@example.com", "key", None),
            Err(HttpConfigError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            HttpDocumentConfig::new("https://example.supabase.co", "  ", None),
            Err(HttpConfigError::EmptyApiKey)
        ));
        assert_eq!(config().bucket(), "documents");
        let custom = HttpDocumentConfig::new("https://x.io", "k", Some("evidence")).unwrap();
        assert_eq!(custom.bucket(), "evidence");
    }

    #[test]
    fn endpoints_are_built_from_segments() {
        let config = config();
        assert_eq!(
            config.table_url().unwrap().as_str(),
            "https://example.supabase.co/rest/v1/documents"
        );
        assert_eq!(
            config.object_url("owner-1/my passport.pdf").unwrap().as_str(),
            "https://example.supabase.co/storage/v1/object/documents/owner-1/my%20passport.pdf"
        );
    }

    #[test]
    fn stored_object_url_must_point_into_the_bucket() {
        let config = config();
        let url = config.object_url("owner-1/my passport.pdf").unwrap();
        let record = DocumentRecord {
            id: DocumentId::new("42"),
            name: "passport.pdf".into(),
            url: url.to_string(),
            label: DocumentLabel::Passport,
            status: DocumentStatus::Uploaded,
            uploaded_at: fixed_now(),
        };
        assert_eq!(config.stored_object_url(&record).unwrap(), url);

        let foreign = DocumentRecord {
            url: "https://elsewhere.example/file.pdf".into(),
            ..record
        };
        assert!(matches!(
            config.stored_object_url(&foreign),
            Err(RemoteError::Decode(_))
        ));
    }
}
