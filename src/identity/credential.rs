use std::path::PathBuf;

use super::IdentityError;

/// Assertion type for federated (JWT bearer) client credentials
pub const CLIENT_ASSERTION_TYPE: &str = "urn:ietf:params:oauth:client-assertion-type:jwt-bearer";

/// How the confidential client authenticates at the token endpoint
#[derive(Debug, Clone)]
pub enum ClientCredential {
    /// Shared secret from the app registration
    Secret(String),
    /// File holding a federated token, e.g. one projected by workload identity.
    /// Re-read on every exchange because the platform rotates it.
    AssertionFile(PathBuf),
}

impl ClientCredential {
    /// Form parameters carrying the credential
    ///
    /// # Errors
    ///
    /// Returns an error if the assertion file cannot be read or is empty
    pub async fn form_params(&self) -> Result<Vec<(&'static str, String)>, IdentityError> {
        match self {
            Self::Secret(secret) => Ok(vec![("client_secret", secret.clone())]),
            Self::AssertionFile(path) => {
                let assertion = tokio::fs::read_to_string(path).await.map_err(|e| {
                    IdentityError::Credential(format!(
                        "failed to read assertion file {}: {e}",
                        path.display()
                    ))
                })?;
                let assertion = assertion.trim();
                if assertion.is_empty() {
                    return Err(IdentityError::Credential(format!(
                        "assertion file {} is empty",
                        path.display()
                    )));
                }
                Ok(vec![
                    ("client_assertion_type", CLIENT_ASSERTION_TYPE.to_string()),
                    ("client_assertion", assertion.to_string()),
                ])
            }
        }
    }

    /// Short label for logs, never the credential itself
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Secret(_) => "client secret",
            Self::AssertionFile(_) => "federated assertion",
        }
    }
}
