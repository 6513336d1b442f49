//! Cookie-backed session store
//!
//! Sessions are stateless: the whole [`Session`] map is serialized, encrypted
//! with AES-256-GCM and stored in a single cookie. Nothing is kept on the
//! server, so a session only survives restarts when the session secret is
//! configured rather than generated.

use actix_web::{
    cookie::{time::Duration, Cookie, SameSite},
    HttpRequest,
};

use super::Session;
use crate::settings::AppSettings;
use crate::utils::crypto::{decrypt_data, derive_encryption_key, encrypt_data};

/// Name of the encrypted session cookie
pub const SESSION_COOKIE_NAME: &str = "entragate_session";

/// Session store errors
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Failed to encrypt session: {0}")]
    Encryption(#[source] anyhow::Error),
}

/// Options for cookie creation
pub struct CookieOptions {
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
    pub path: String,
    pub max_age: Duration,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: true,
            secure: true,
            // Lax so the cookie rides along on the top-level redirect back from the authority
            same_site: SameSite::Lax,
            path: "/".to_string(),
            max_age: Duration::hours(24),
        }
    }
}

/// Reads and writes the encrypted session cookie
#[derive(Clone)]
pub struct SessionStore {
    encryption_key: [u8; 32],
    cookie_secure: bool,
    session_duration_hours: u64,
}

impl SessionStore {
    #[must_use]
    pub fn new(key: &[u8], cookie_secure: bool, session_duration_hours: u64) -> Self {
        Self {
            encryption_key: derive_encryption_key(key),
            cookie_secure,
            session_duration_hours,
        }
    }

    #[must_use]
    pub fn from_settings(settings: &AppSettings) -> Self {
        Self::new(
            settings.session.session_secret.as_bytes(),
            settings.cookies.secure,
            settings.session.session_duration_hours,
        )
    }

    /// Load the session for this request.
    ///
    /// A missing, tampered or undecryptable cookie (for instance one issued
    /// under a previous secret) yields an empty session.
    #[must_use]
    pub fn load(&self, req: &HttpRequest) -> Session {
        let Some(cookie) = req.cookie(SESSION_COOKIE_NAME) else {
            return Session::new();
        };
        if cookie.value().is_empty() {
            return Session::new();
        }

        decrypt_data::<Session>(cookie.value(), &self.encryption_key).unwrap_or_else(|e| {
            log::debug!("Ignoring unreadable session cookie: {e}");
            Session::new()
        })
    }

    /// Create the cookie that persists `session`
    ///
    /// # Errors
    ///
    /// Returns an error if encryption fails
    pub fn create_session_cookie(
        &self,
        session: &Session,
    ) -> Result<Cookie<'static>, SessionStoreError> {
        let value =
            encrypt_data(session, &self.encryption_key).map_err(SessionStoreError::Encryption)?;
        let options = CookieOptions {
            max_age: session_max_age(self.session_duration_hours),
            ..Default::default()
        };

        Ok(Cookie::build(SESSION_COOKIE_NAME, value)
            .http_only(options.http_only)
            .secure(self.cookie_secure && options.secure)
            .same_site(options.same_site)
            .path(options.path)
            .max_age(options.max_age)
            .finish())
    }

    /// Create an expired cookie that clears the whole session
    #[must_use]
    pub fn create_expired_cookie(&self) -> Cookie<'static> {
        create_expired_cookie(SESSION_COOKIE_NAME, self.cookie_secure)
    }

    #[must_use]
    pub fn encryption_key(&self) -> &[u8] {
        &self.encryption_key
    }

    #[must_use]
    pub const fn cookie_secure(&self) -> bool {
        self.cookie_secure
    }
}

/// Cookie lifetime for `hours`, falling back to the default when it overflows
fn session_max_age(hours: u64) -> Duration {
    i64::try_from(hours)
        .ok()
        .and_then(|hours| hours.checked_mul(3600))
        .map_or_else(|| CookieOptions::default().max_age, Duration::seconds)
}

/// Create an expired cookie to clear a specific cookie
#[must_use]
pub fn create_expired_cookie(name: &str, secure: bool) -> Cookie<'static> {
    Cookie::build(name.to_owned(), "")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(-1))
        .finish()
}
