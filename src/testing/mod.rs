//! Testing utilities shared by unit and integration tests
//!
//! - [`fixtures`] - pre-built settings, claims, sessions and stores
//! - [`mock`] - a scriptable [`MockIdentityClient`]
//! - [`requests`] - a fluent [`RequestBuilder`] over `actix_web::test::TestRequest`
//!
//! ```ignore
//! use entragate::testing::{MockIdentityClient, TestFixtures};
//!
//! let client = MockIdentityClient::succeeding(TestFixtures::claims());
//! let store = TestFixtures::session_store();
//! ```

pub mod fixtures;
pub mod mock;
pub mod requests;

pub use fixtures::TestFixtures;
pub use mock::{MockIdentityClient, MockOutcome};
pub use requests::{session_cookie_from, RequestBuilder};

/// Common test constants
pub mod constants {
    /// Session secret used by test stores (32 bytes)
    pub const TEST_SESSION_KEY: &[u8] = b"test_key_32_bytes_long_for_test_";

    /// Authorization code the mock accepts by default
    pub const TEST_AUTH_CODE: &str = "0.AAAA-test-authorization-code";

    pub const TEST_CLIENT_ID: &str = "11111111-2222-3333-4444-555555555555";

    pub const TEST_TENANT_ID: &str = "contoso.onmicrosoft.com";

    pub const TEST_USER_NAME: &str = "Ada Lovelace";

    pub const TEST_USER_EMAIL: &str = "ada@contoso.com";
}
