use actix_web::{cookie::Cookie, http::header, HttpResponse};

pub struct ResponseBuilder;

impl ResponseBuilder {
    /// Create a redirect response with optional cookies
    #[must_use]
    pub fn redirect(location: &str, cookies: Option<Vec<Cookie<'_>>>) -> HttpResponse {
        let mut builder = HttpResponse::Found();

        for cookie in cookies.into_iter().flatten() {
            builder.cookie(cookie);
        }

        builder
            .insert_header((header::LOCATION, location))
            .finish()
    }

    /// Create a redirect response with a single cookie
    #[must_use]
    pub fn redirect_with_cookie(location: &str, cookie: Option<Cookie<'_>>) -> HttpResponse {
        Self::redirect(location, cookie.map(|c| vec![c]))
    }

    /// Create an HTML page response
    #[must_use]
    pub fn html(body: String) -> HttpResponse {
        HttpResponse::Ok()
            .content_type("text/html; charset=utf-8")
            .body(body)
    }
}
