// Azure AD (Entra ID) confidential client over the v2.0 endpoints

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use super::{
    scope_parameter, ClientCredential, IdentityClaims, IdentityClient, IdentityError, TokenResult,
};
use crate::settings::AppSettings;
use crate::utils::crypto::decode_jwt_payload;
use crate::utils::logging::LoggingHelper;

/// HTTP request timeout.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);
/// HTTP connection timeout.
const HTTP_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    id_token: Option<String>,
    token_type: Option<String>,
    expires_in: Option<i64>,
    scope: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct TokenErrorResponse {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: String,
}

/// Confidential client bound to one tenant-scoped authority
#[derive(Clone)]
pub struct EntraIdentityClient {
    client_id: String,
    authorize_endpoint: Url,
    token_endpoint: Url,
    credential: ClientCredential,
    http_client: reqwest::Client,
}

impl std::fmt::Debug for EntraIdentityClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntraIdentityClient")
            .field("client_id", &self.client_id)
            .field("authorize_endpoint", &self.authorize_endpoint.as_str())
            .field("token_endpoint", &self.token_endpoint.as_str())
            .field("credential", &self.credential.kind())
            .finish_non_exhaustive()
    }
}

impl EntraIdentityClient {
    /// Create a client for `authority` (e.g. `https://login.microsoftonline.com/<tenant>`)
    ///
    /// # Errors
    ///
    /// Returns an error if the authority is not an absolute http(s) URL or the
    /// HTTP client cannot be built
    pub fn new(
        client_id: impl Into<String>,
        authority: &str,
        credential: ClientCredential,
    ) -> Result<Self, IdentityError> {
        let authority = authority.trim_end_matches('/');
        let authorize_endpoint = Self::endpoint(authority, "authorize")?;
        let token_endpoint = Self::endpoint(authority, "token")?;

        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| {
                IdentityError::Configuration(format!("Failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client_id: client_id.into(),
            authorize_endpoint,
            token_endpoint,
            credential,
            http_client,
        })
    }

    /// Create the client from validated application settings
    ///
    /// # Errors
    ///
    /// Returns an error if no client credential is configured or the
    /// authority is malformed
    pub fn from_settings(settings: &AppSettings) -> Result<Self, IdentityError> {
        let identity = &settings.identity;
        let credential = identity.client_credential().ok_or_else(|| {
            IdentityError::Configuration("No client credential configured".to_string())
        })?;
        let client = Self::new(
            identity.client_id.clone(),
            &identity.authority_url(),
            credential,
        )?;
        LoggingHelper::log_identity_client_configured(
            &identity.client_id,
            client.authorize_endpoint.as_str(),
            client.credential.kind(),
        );
        Ok(client)
    }

    fn endpoint(authority: &str, name: &str) -> Result<Url, IdentityError> {
        let invalid = |reason: String| IdentityError::InvalidAuthority {
            authority: authority.to_string(),
            reason,
        };
        let url = Url::parse(&format!("{authority}/oauth2/v2.0/{name}"))
            .map_err(|e| invalid(e.to_string()))?;
        if !matches!(url.scheme(), "https" | "http") {
            return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
        }
        Ok(url)
    }

    #[must_use]
    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }

    fn claims_from_id_token(id_token: &str) -> Result<IdentityClaims, IdentityError> {
        match decode_jwt_payload(id_token).map_err(IdentityError::IdToken)? {
            serde_json::Value::Object(claims) => Ok(claims),
            _ => Err(IdentityError::IdToken(
                "ID token payload is not a JSON object".to_string(),
            )),
        }
    }
}

#[async_trait]
impl IdentityClient for EntraIdentityClient {
    fn authorization_request_url(
        &self,
        scopes: &[String],
        redirect_uri: &str,
    ) -> Result<Url, IdentityError> {
        let mut url = self.authorize_endpoint.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("scope", &scope_parameter(scopes))
            .append_pair("response_mode", "query");
        Ok(url)
    }

    async fn acquire_token_by_authorization_code(
        &self,
        code: &str,
        scopes: &[String],
        redirect_uri: &str,
    ) -> Result<TokenResult, IdentityError> {
        let mut params: Vec<(&str, String)> = vec![
            ("client_id", self.client_id.clone()),
            ("grant_type", "authorization_code".to_string()),
            ("code", code.to_string()),
            ("redirect_uri", redirect_uri.to_string()),
            ("scope", scope_parameter(scopes)),
        ];
        params.extend(self.credential.form_params().await?);

        LoggingHelper::log_token_exchange_start(self.token_endpoint.as_str());
        let response = self
            .http_client
            .post(self.token_endpoint.clone())
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                IdentityError::Network(format!("Failed to exchange code for token: {e}"))
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| IdentityError::Network(format!("Failed to read token response: {e}")))?;

        if !status.is_success() {
            let parsed: TokenErrorResponse = serde_json::from_str(&body).unwrap_or_default();
            return Err(IdentityError::TokenEndpoint {
                status: status.as_u16(),
                error: if parsed.error.is_empty() {
                    "unknown_error".to_string()
                } else {
                    parsed.error
                },
                description: parsed.error_description,
            });
        }

        let token_response: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            IdentityError::InvalidResponse(format!("Failed to parse token response: {e}"))
        })?;

        let id_token_claims = token_response
            .id_token
            .as_deref()
            .map(Self::claims_from_id_token)
            .transpose()?;

        let expires_at = Utc::now()
            + chrono::Duration::seconds(token_response.expires_in.unwrap_or(3600));

        LoggingHelper::log_token_exchange_summary(
            token_response.access_token.is_some(),
            token_response.id_token.is_some(),
            token_response.token_type.as_deref(),
            token_response.scope.as_deref(),
        );

        Ok(TokenResult {
            access_token: token_response.access_token,
            id_token: token_response.id_token,
            token_type: token_response.token_type,
            scope: token_response.scope,
            expires_at,
            id_token_claims,
        })
    }
}
