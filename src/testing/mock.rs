//! Mock identity client for exercising the sign-in flow without an authority

use async_trait::async_trait;
use chrono::Utc;
use std::sync::Mutex;
use url::Url;

use crate::identity::{IdentityClaims, IdentityClient, IdentityError, TokenResult};

/// What the mock answers to a code redemption
#[derive(Debug, Clone)]
pub enum MockOutcome {
    /// Token response carrying an ID token with these claims
    Claims(IdentityClaims),
    /// Token response without an ID token
    NoIdToken,
    /// Token endpoint rejects the code
    Rejected(String),
}

/// Scriptable [`IdentityClient`] that records the codes it was asked to redeem
pub struct MockIdentityClient {
    outcome: MockOutcome,
    authority: String,
    redeemed: Mutex<Vec<String>>,
}

impl MockIdentityClient {
    #[must_use]
    pub fn new(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            authority: "https://login.example.test/tenant".to_string(),
            redeemed: Mutex::new(Vec::new()),
        }
    }

    #[must_use]
    pub fn succeeding(claims: IdentityClaims) -> Self {
        Self::new(MockOutcome::Claims(claims))
    }

    #[must_use]
    pub fn rejecting(error: &str) -> Self {
        Self::new(MockOutcome::Rejected(error.to_string()))
    }

    /// Use an authority string verbatim, e.g. a malformed one
    #[must_use]
    pub fn with_authority(mut self, authority: &str) -> Self {
        self.authority = authority.to_string();
        self
    }

    /// Codes passed to `acquire_token_by_authorization_code`, in order
    ///
    /// # Panics
    ///
    /// Panics if the internal lock was poisoned by a panicking test
    #[must_use]
    pub fn redeemed_codes(&self) -> Vec<String> {
        self.redeemed.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityClient for MockIdentityClient {
    fn authorization_request_url(
        &self,
        scopes: &[String],
        redirect_uri: &str,
    ) -> Result<Url, IdentityError> {
        let mut url = Url::parse(&format!("{}/oauth2/v2.0/authorize", self.authority)).map_err(
            |e| IdentityError::InvalidAuthority {
                authority: self.authority.clone(),
                reason: e.to_string(),
            },
        )?;
        url.query_pairs_mut()
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", &scopes.join(" "));
        Ok(url)
    }

    async fn acquire_token_by_authorization_code(
        &self,
        code: &str,
        _scopes: &[String],
        _redirect_uri: &str,
    ) -> Result<TokenResult, IdentityError> {
        if let Ok(mut redeemed) = self.redeemed.lock() {
            redeemed.push(code.to_string());
        }

        let id_token_claims = match &self.outcome {
            MockOutcome::Claims(claims) => Some(claims.clone()),
            MockOutcome::NoIdToken => None,
            MockOutcome::Rejected(error) => {
                return Err(IdentityError::TokenEndpoint {
                    status: 400,
                    error: error.clone(),
                    description: "rejected by mock".to_string(),
                })
            }
        };

        Ok(TokenResult {
            access_token: Some("mock-access-token".to_string()),
            id_token: id_token_claims.as_ref().map(|_| "mock.id.token".to_string()),
            token_type: Some("Bearer".to_string()),
            scope: Some("User.Read".to_string()),
            expires_at: Utc::now() + chrono::Duration::hours(1),
            id_token_claims,
        })
    }
}
