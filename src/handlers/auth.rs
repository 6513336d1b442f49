// Authentication handlers: login and logout
use crate::identity::{scope_parameter, IdentityClient};
use crate::session::SessionStore;
use crate::settings::AppSettings;
use crate::utils::logging::LoggingHelper;
use crate::utils::response_builder::ResponseBuilder;
use actix_web::{error::ErrorInternalServerError, web, HttpResponse, Result};

use super::INDEX_PATH;

/// Redirect the browser to the authority's authorization endpoint
///
/// # Errors
/// Returns a 500 if the authorization URL cannot be built
pub async fn login(
    settings: web::Data<AppSettings>,
    identity_client: web::Data<dyn IdentityClient + Send + Sync>,
) -> Result<HttpResponse> {
    let scopes = &settings.identity.scopes;
    let redirect_uri = settings.redirect_uri();

    let auth_url = identity_client
        .authorization_request_url(scopes, &redirect_uri)
        .map_err(|e| {
            log::error!("Failed to build authorization URL: {e}");
            ErrorInternalServerError(e)
        })?;

    LoggingHelper::log_login_redirect(&scope_parameter(scopes), &redirect_uri);
    Ok(ResponseBuilder::redirect(auth_url.as_str(), None))
}

/// Clear the whole session and go back to the index
///
/// # Errors
/// Never fails; the signature matches the other handlers
pub async fn logout(session_store: web::Data<SessionStore>) -> Result<HttpResponse> {
    LoggingHelper::log_signed_out();
    Ok(ResponseBuilder::redirect_with_cookie(
        INDEX_PATH,
        Some(session_store.create_expired_cookie()),
    ))
}
