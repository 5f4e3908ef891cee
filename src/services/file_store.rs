//! External file store adapter
//!
//! Uploaded spreadsheets and profile images are forwarded to Google Drive
//! through a service account. The rest of the application only sees the
//! [`FileStore`] trait; ingestion treats a failed upload as a degraded
//! response, never as a fatal error.

use std::path::Path;

use async_trait::async_trait;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::config::FileStoreConfig;
use crate::utils::errors::{AppError, AppResult};

const DRIVE_UPLOAD_URL: &str =
    "https://www.googleapis.com/upload/drive/v3/files?uploadType=multipart&fields=id,webViewLink";
const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";

/// Reference to a file held by the external store
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub id: String,
    pub link: String,
}

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Upload a local file under its original name; returns the remote
    /// reference.
    async fn upload(
        &self,
        local_path: &Path,
        original_name: &str,
        mime_type: &str,
    ) -> AppResult<StoredFile>;

    /// Make a stored file world-readable and return its public link.
    async fn make_public(&self, file_id: &str) -> AppResult<String>;

    async fn delete(&self, file_id: &str) -> AppResult<()>;
}

/// Builds the `multipart/related` body Drive's multipart upload expects:
/// the JSON metadata part first, the media part second, closed by the
/// final boundary. Form-style multipart is rejected by the endpoint.
fn related_body(metadata: &str, mime_type: &str, data: &[u8], boundary: &str) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + data.len() + 256);
    body.extend_from_slice(
        format!(
            "--{boundary}\r\n\
             Content-Type: application/json; charset=UTF-8\r\n\r\n\
             {metadata}\r\n\
             --{boundary}\r\n\
             Content-Type: {mime_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    body
}

/// Extract the file id from a public link of the form `...uc?id=<id>`
pub fn file_id_from_link(link: &str) -> Option<&str> {
    let start = link.find("id=")? + 3;
    let rest = &link[start..];
    let end = rest.find('&').unwrap_or(rest.len());
    let id = &rest[..end];
    (!id.is_empty()).then_some(id)
}

/// Google Drive implementation backed by a service account
pub struct GoogleDriveStore {
    config: FileStoreConfig,
    http: reqwest::Client,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    exp: usize,
    iat: usize,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct DriveFileResponse {
    id: String,
    #[serde(rename = "webViewLink")]
    web_view_link: Option<String>,
}

impl GoogleDriveStore {
    pub fn new(config: FileStoreConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// OAuth2 service-account flow: a signed assertion exchanged for a
    /// short-lived access token. Tokens are not cached; uploads are rare.
    async fn access_token(&self) -> AppResult<String> {
        let now = chrono::Utc::now().timestamp() as usize;
        let claims = AssertionClaims {
            iss: &self.config.client_email,
            scope: &self.config.scope,
            aud: &self.config.token_uri,
            exp: now + 3600,
            iat: now,
        };

        let key = EncodingKey::from_rsa_pem(self.config.private_key_pem.as_bytes())
            .map_err(|e| AppError::ExternalApi(format!("Invalid service account key: {}", e)))?;

        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| AppError::ExternalApi(format!("Error signing assertion: {}", e)))?;

        let response = self
            .http
            .post(&self.config.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Token exchange failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Token exchange failed with status {}",
                response.status()
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Invalid token response: {}", e)))?;

        Ok(token.access_token)
    }
}

#[async_trait]
impl FileStore for GoogleDriveStore {
    async fn upload(
        &self,
        local_path: &Path,
        original_name: &str,
        mime_type: &str,
    ) -> AppResult<StoredFile> {
        let bytes = tokio::fs::read(local_path)
            .await
            .map_err(|e| AppError::Internal(format!("Cannot read upload file: {}", e)))?;

        let token = self.access_token().await?;

        let metadata = serde_json::json!({ "name": original_name }).to_string();
        let boundary = format!("drive-{}", uuid::Uuid::new_v4().simple());
        let body = related_body(&metadata, mime_type, &bytes, &boundary);

        let response = self
            .http
            .post(DRIVE_UPLOAD_URL)
            .bearer_auth(token)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={boundary}"),
            )
            .body(body)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Drive upload failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Drive upload failed with status {}",
                response.status()
            )));
        }

        let file: DriveFileResponse = response
            .json()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Invalid Drive response: {}", e)))?;

        let link = file
            .web_view_link
            .unwrap_or_else(|| format!("https://drive.google.com/uc?id={}", file.id));

        Ok(StoredFile { id: file.id, link })
    }

    async fn make_public(&self, file_id: &str) -> AppResult<String> {
        let token = self.access_token().await?;

        let response = self
            .http
            .post(format!("{}/{}/permissions", DRIVE_FILES_URL, file_id))
            .bearer_auth(token)
            .json(&serde_json::json!({ "role": "reader", "type": "anyone" }))
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Drive permission failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AppError::ExternalApi(format!(
                "Drive permission failed with status {}",
                response.status()
            )));
        }

        Ok(format!("https://drive.google.com/uc?id={}", file_id))
    }

    async fn delete(&self, file_id: &str) -> AppResult<()> {
        let token = self.access_token().await?;

        let response = self
            .http
            .delete(format!("{}/{}", DRIVE_FILES_URL, file_id))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AppError::ExternalApi(format!("Drive delete failed: {}", e)))?;

        // already gone is fine
        if !response.status().is_success() && response.status() != reqwest::StatusCode::NOT_FOUND {
            return Err(AppError::ExternalApi(format!(
                "Drive delete failed with status {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_file_ids_from_public_links() {
        assert_eq!(
            file_id_from_link("https://drive.google.com/uc?id=abc123"),
            Some("abc123")
        );
        assert_eq!(
            file_id_from_link("https://drive.google.com/uc?id=abc123&export=view"),
            Some("abc123")
        );
        assert_eq!(file_id_from_link("https://example.com/no-id-here"), None);
        assert_eq!(file_id_from_link("https://drive.google.com/uc?id="), None);
    }

    #[test]
    fn related_body_orders_metadata_before_media() {
        let metadata = r#"{"name":"cases.xlsx"}"#;
        let body = related_body(metadata, "text/csv", b"a,b,c", "xyz");
        let text = String::from_utf8(body).unwrap();

        let metadata_at = text.find("Content-Type: application/json").unwrap();
        let media_at = text.find("Content-Type: text/csv").unwrap();
        assert!(metadata_at < media_at);

        assert!(text.starts_with("--xyz\r\n"));
        assert!(text.contains(metadata));
        assert!(text.contains("\r\n\r\na,b,c\r\n"));
        assert!(text.ends_with("--xyz--\r\n"));
    }
}
