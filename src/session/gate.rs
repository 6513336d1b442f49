//! Authentication gate for protected handlers
//!
//! Protected handlers take an [`AuthenticatedUser`] argument. Extraction
//! fails for anonymous sessions and the rejection renders as a redirect to
//! the login route, so the handler body only runs for signed-in users.
//!
//! ```ignore
//! async fn index(user: AuthenticatedUser) -> HttpResponse {
//!     HttpResponse::Ok().body(format!("Hello, {}", user.display_name()))
//! }
//! ```

use actix_web::{
    dev::Payload, http::header, web, FromRequest, HttpRequest, HttpResponse, ResponseError,
};
use serde_json::Value;
use std::future::{ready, Ready};

use super::SessionStore;
use crate::handlers::LOGIN_PATH;

/// Why a request was not let through the gate
#[derive(Debug, thiserror::Error)]
pub enum GateRejection {
    #[error("Not signed in")]
    Unauthenticated,
    #[error("Session store is not registered as application data")]
    MissingSessionStore,
}

impl ResponseError for GateRejection {
    fn status_code(&self) -> actix_web::http::StatusCode {
        match self {
            Self::Unauthenticated => actix_web::http::StatusCode::FOUND,
            Self::MissingSessionStore => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Unauthenticated => HttpResponse::Found()
                .insert_header((header::LOCATION, LOGIN_PATH))
                .finish(),
            Self::MissingSessionStore => HttpResponse::InternalServerError().finish(),
        }
    }
}

/// Claims of the signed-in user, extracted from the session
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    claims: Value,
}

impl AuthenticatedUser {
    #[must_use]
    pub fn claims(&self) -> &Value {
        &self.claims
    }

    /// Best human-readable name found in the claims
    #[must_use]
    pub fn display_name(&self) -> &str {
        ["name", "preferred_username", "email", "sub"]
            .into_iter()
            .find_map(|claim| self.claims.get(claim).and_then(Value::as_str))
            .unwrap_or("signed-in user")
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = GateRejection;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(store) = req.app_data::<web::Data<SessionStore>>() else {
            log::error!("SessionStore missing from app data; rejecting {}", req.path());
            return ready(Err(GateRejection::MissingSessionStore));
        };

        let result = store
            .load(req)
            .user()
            .cloned()
            .map(|claims| Self { claims })
            .ok_or_else(|| {
                log::debug!("Anonymous request to {} redirected to login", req.path());
                GateRejection::Unauthenticated
            });
        ready(result)
    }
}
