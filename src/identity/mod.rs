//! Identity provider integration
//!
//! This module owns everything that talks to the Azure AD (Entra ID)
//! authority: building authorization request URLs and redeeming
//! authorization codes for tokens.
//!
//! - [`client`] - `reqwest`-backed [`EntraIdentityClient`]
//! - [`credential`] - how the confidential client proves its identity
//!
//! Handlers depend on the [`IdentityClient`] trait rather than the concrete
//! client so the sign-in flow can be exercised against a mock.

pub mod client;
pub mod credential;

pub use client::EntraIdentityClient;
pub use credential::ClientCredential;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

/// Claims decoded from an ID token, kept opaque
pub type IdentityClaims = serde_json::Map<String, serde_json::Value>;

/// Shared handle registered as application data
pub type SharedIdentityClient = Arc<dyn IdentityClient + Send + Sync>;

/// Scopes the authority always grants for OIDC sign-in
pub const RESERVED_SCOPES: [&str; 3] = ["openid", "profile", "offline_access"];

/// Identity client errors
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid authority URL '{authority}': {reason}")]
    InvalidAuthority { authority: String, reason: String },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Token endpoint returned {status}: {error} {description}")]
    TokenEndpoint {
        status: u16,
        error: String,
        description: String,
    },
    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
    #[error("ID token processing failed: {0}")]
    IdToken(String),
    #[error("Client credential unavailable: {0}")]
    Credential(String),
}

/// Result of redeeming an authorization code
#[derive(Debug, Clone)]
pub struct TokenResult {
    pub access_token: Option<String>,
    pub id_token: Option<String>,
    pub token_type: Option<String>,
    pub scope: Option<String>,
    pub expires_at: DateTime<Utc>,
    /// Claims of `id_token`, present only when the response carried one
    pub id_token_claims: Option<IdentityClaims>,
}

/// Query parameters the authority appends when redirecting back
#[derive(Deserialize, Debug, Default)]
pub struct AuthorizationCallback {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Authorization-code flow operations against the identity provider
#[async_trait]
pub trait IdentityClient {
    /// Build the URL the browser is sent to for sign-in
    ///
    /// # Errors
    ///
    /// Returns an error if the authority URL is malformed
    fn authorization_request_url(
        &self,
        scopes: &[String],
        redirect_uri: &str,
    ) -> Result<Url, IdentityError>;

    /// Redeem an authorization code for tokens
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The client credential cannot be produced
    /// - The token endpoint is unreachable or rejects the code
    /// - The response or its ID token cannot be parsed
    async fn acquire_token_by_authorization_code(
        &self,
        code: &str,
        scopes: &[String],
        redirect_uri: &str,
    ) -> Result<TokenResult, IdentityError>;
}

/// Join requested scopes with the reserved OIDC scopes, dropping duplicates
#[must_use]
pub fn scope_parameter(scopes: &[String]) -> String {
    let mut all: Vec<&str> = Vec::with_capacity(scopes.len() + RESERVED_SCOPES.len());
    for scope in scopes.iter().map(String::as_str).chain(RESERVED_SCOPES) {
        if !all.contains(&scope) {
            all.push(scope);
        }
    }
    all.join(" ")
}
