// Centralized logging for the sign-in flow
use log::{debug, error, info, warn};

pub struct LoggingHelper;

impl LoggingHelper {
    /// Log identity client configuration at startup
    pub fn log_identity_client_configured(
        client_id: &str,
        authorize_endpoint: &str,
        credential: &str,
    ) {
        info!(
            "✅ Azure AD client {client_id} configured ({credential}) against {authorize_endpoint}"
        );
    }

    /// Log a redirect to the authority's sign-in page
    pub fn log_login_redirect(scopes: &str, redirect_uri: &str) {
        info!(
            "🔐 Redirecting to Azure AD sign-in with scopes [{scopes}], callback {redirect_uri}"
        );
    }

    /// Log token exchange start
    pub fn log_token_exchange_start(token_endpoint: &str) {
        info!("🔄 Exchanging authorization code for tokens at {token_endpoint}");
    }

    /// Log token exchange summary
    pub fn log_token_exchange_summary(
        access_token: bool,
        id_token: bool,
        token_type: Option<&str>,
        scope: Option<&str>,
    ) {
        info!(
            "🔍 Token exchange summary: access_token={}, id_token={}, \
             token_type={:?}, scope={:?}",
            if access_token { "present" } else { "missing" },
            if id_token { "present" } else { "missing" },
            token_type,
            scope
        );
    }

    /// Log session creation success
    pub fn log_session_created(display_name: &str) {
        info!("Signed in {display_name}; session established");
    }

    /// Log a callback that arrived without a code
    pub fn log_callback_without_code(error: Option<&str>, description: Option<&str>) {
        match error {
            Some(error) => warn!(
                "Authorization failed at the provider: {error} {}",
                description.unwrap_or_default()
            ),
            None => debug!("Callback received without an authorization code"),
        }
    }

    /// Log a failed code redemption
    pub fn log_token_exchange_failed(err: &dyn std::fmt::Display) {
        error!("Failed to exchange authorization code: {err}");
    }

    /// Log sign-out
    pub fn log_signed_out() {
        info!("User signed out and session cleared");
    }
}
