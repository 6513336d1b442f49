// OAuth2 callback handler
use crate::identity::{AuthorizationCallback, IdentityClient};
use crate::session::SessionStore;
use crate::settings::AppSettings;
use crate::utils::logging::LoggingHelper;
use crate::utils::response_builder::ResponseBuilder;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::{debug, error};

use super::INDEX_PATH;

/// Redeem the authorization code and sign the user in.
///
/// Every outcome redirects to the index. Only a successful exchange that
/// yields ID token claims writes `user` into the session; a missing code or a
/// failed exchange leaves the session untouched, so the gate will send the
/// browser back to login.
///
/// # Errors
/// Never fails; failures are logged and degrade to "still signed out"
pub async fn authorized(
    query: web::Query<AuthorizationCallback>,
    req: HttpRequest,
    settings: web::Data<AppSettings>,
    session_store: web::Data<SessionStore>,
    identity_client: web::Data<dyn IdentityClient + Send + Sync>,
) -> Result<HttpResponse> {
    let callback = query.into_inner();
    let Some(code) = callback.code.as_deref().filter(|code| !code.is_empty()) else {
        LoggingHelper::log_callback_without_code(
            callback.error.as_deref(),
            callback.error_description.as_deref(),
        );
        return Ok(ResponseBuilder::redirect(INDEX_PATH, None));
    };

    let result = identity_client
        .acquire_token_by_authorization_code(
            code,
            &settings.identity.scopes,
            &settings.redirect_uri(),
        )
        .await;

    let claims = match result {
        Ok(token_result) => token_result.id_token_claims,
        Err(e) => {
            LoggingHelper::log_token_exchange_failed(&e);
            return Ok(ResponseBuilder::redirect(INDEX_PATH, None));
        }
    };

    let Some(claims) = claims else {
        debug!("Token response carried no ID token; session left unchanged");
        return Ok(ResponseBuilder::redirect(INDEX_PATH, None));
    };

    let mut session = session_store.load(&req);
    session.set_user(claims);

    match session_store.create_session_cookie(&session) {
        Ok(cookie) => {
            let name = session
                .user()
                .and_then(|user| user.get("name"))
                .and_then(serde_json::Value::as_str)
                .unwrap_or("user");
            LoggingHelper::log_session_created(name);
            Ok(ResponseBuilder::redirect_with_cookie(INDEX_PATH, Some(cookie)))
        }
        Err(e) => {
            error!("Failed to create session cookie: {e}");
            Ok(ResponseBuilder::redirect(INDEX_PATH, None))
        }
    }
}
