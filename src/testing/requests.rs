//! HTTP request builders for testing handlers and extractors

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::{test, HttpRequest};

use crate::session::SESSION_COOKIE_NAME;

/// Fluent wrapper over [`test::TestRequest`]
pub struct RequestBuilder {
    inner: test::TestRequest,
}

impl Default for RequestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestBuilder {
    /// Create a GET request for `/`
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: test::TestRequest::default(),
        }
    }

    #[must_use]
    pub fn cookie(mut self, cookie: Cookie<'_>) -> Self {
        self.inner = self.inner.cookie(cookie);
        self
    }

    #[must_use]
    pub fn app_data<T: 'static>(mut self, data: T) -> Self {
        self.inner = self.inner.app_data(data);
        self
    }

    /// Build a bare `HttpRequest` for extractor tests
    #[must_use]
    pub fn build(self) -> HttpRequest {
        self.inner.to_http_request()
    }
}

/// The session cookie set by a response, if any
#[must_use]
pub fn session_cookie_from<B>(response: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(Cookie::into_owned)
}
