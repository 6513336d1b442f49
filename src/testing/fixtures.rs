//! Pre-built test data

use serde_json::json;

use super::constants::{
    TEST_CLIENT_ID, TEST_SESSION_KEY, TEST_TENANT_ID, TEST_USER_EMAIL, TEST_USER_NAME,
};
use crate::identity::IdentityClaims;
use crate::session::{Session, SessionStore};
use crate::settings::AppSettings;

pub struct TestFixtures;

impl TestFixtures {
    /// Settings that pass validation, with insecure cookies for plain-HTTP tests
    #[must_use]
    pub fn settings() -> AppSettings {
        let mut settings = AppSettings::default();
        settings.identity.client_id = TEST_CLIENT_ID.to_string();
        settings.identity.tenant_id = TEST_TENANT_ID.to_string();
        settings.identity.client_secret = Some("test-client-secret".to_string());
        settings.session.session_secret =
            String::from_utf8_lossy(TEST_SESSION_KEY).into_owned();
        settings.cookies.secure = false;
        settings
    }

    /// Store keyed with [`TEST_SESSION_KEY`]
    #[must_use]
    pub fn session_store() -> SessionStore {
        SessionStore::new(TEST_SESSION_KEY, false, 24)
    }

    /// Typical Azure AD ID token claims
    ///
    /// # Panics
    ///
    /// Never; the literal is always a JSON object.
    #[must_use]
    pub fn claims() -> IdentityClaims {
        match json!({
            "aud": TEST_CLIENT_ID,
            "iss": format!("https://login.microsoftonline.com/{TEST_TENANT_ID}/v2.0"),
            "name": TEST_USER_NAME,
            "preferred_username": TEST_USER_EMAIL,
            "oid": "00000000-0000-0000-0000-000000000001",
            "tid": TEST_TENANT_ID,
            "sub": "AAAAAAAAAAAAAAAAAAAAAIkzqFVrSaSaFHy782bbtaQ",
        }) {
            serde_json::Value::Object(claims) => claims,
            _ => unreachable!("claims literal is an object"),
        }
    }

    /// Session holding [`TestFixtures::claims`] under `user`
    #[must_use]
    pub fn authenticated_session() -> Session {
        let mut session = Session::new();
        session.set_user(Self::claims());
        session
    }
}
