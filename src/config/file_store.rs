//! File-store configuration
//!
//! Service-account credentials for the external file store, validated at
//! startup through a fallible constructor. Callers decide what to do when
//! construction fails (the server runs with the file store disabled).

use std::env;

use thiserror::Error;

/// Errors raised while reading file-store credentials
#[derive(Error, Debug)]
pub enum FileStoreConfigError {
    #[error("missing environment variable: {0}")]
    MissingVar(&'static str),

    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),
}

/// Google Drive service-account configuration
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    pub client_email: String,
    pub private_key_pem: String,
    pub token_uri: String,
    pub scope: String,
}

impl FileStoreConfig {
    pub fn from_env() -> Result<Self, FileStoreConfigError> {
        let client_email = env::var("GOOGLE_CLOUD_CLIENT_EMAIL")
            .map_err(|_| FileStoreConfigError::MissingVar("GOOGLE_CLOUD_CLIENT_EMAIL"))?;

        // Keys injected through .env files carry literal "\n" sequences
        let private_key_pem = env::var("GOOGLE_CLOUD_PRIVATE_KEY")
            .map_err(|_| FileStoreConfigError::MissingVar("GOOGLE_CLOUD_PRIVATE_KEY"))?
            .replace("\\n", "\n");

        if !private_key_pem.contains("PRIVATE KEY") {
            return Err(FileStoreConfigError::InvalidPrivateKey(
                "value does not look like a PEM-encoded key".to_string(),
            ));
        }

        let token_uri = env::var("GOOGLE_CLOUD_TOKEN_URI")
            .unwrap_or_else(|_| "https://oauth2.googleapis.com/token".to_string());

        Ok(Self {
            client_email,
            private_key_pem,
            token_uri,
            scope: "https://www.googleapis.com/auth/drive.file".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_email_is_a_typed_error() {
        // Serialize env access within the test binary
        std::env::remove_var("GOOGLE_CLOUD_CLIENT_EMAIL");
        let err = FileStoreConfig::from_env().unwrap_err();
        assert!(matches!(err, FileStoreConfigError::MissingVar(_)));
    }
}
