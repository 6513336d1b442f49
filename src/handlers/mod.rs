// HTTP request handlers and route table
pub mod auth;
pub mod callback;
pub mod content;
pub mod static_files;
pub mod templates;

use actix_web::web;

pub use auth::{login, logout};
pub use callback::authorized;
pub use content::{hello, index};
pub use static_files::favicon;

/// Index route, where every auth lifecycle endpoint lands
pub const INDEX_PATH: &str = "/";
/// Login entry point the auth gate redirects to
pub const LOGIN_PATH: &str = "/login";
pub const LOGOUT_PATH: &str = "/logout";
pub const HELLO_PATH: &str = "/hello";
pub const FAVICON_PATH: &str = "/favicon.ico";

/// Register every route; the callback lives at the configured `redirect_path`
pub fn configure_services(cfg: &mut web::ServiceConfig, redirect_path: &str) {
    cfg.route(INDEX_PATH, web::get().to(index))
        .route(FAVICON_PATH, web::get().to(favicon))
        .route(HELLO_PATH, web::post().to(hello))
        .route(LOGIN_PATH, web::get().to(login))
        .route(redirect_path, web::get().to(authorized))
        .route(LOGOUT_PATH, web::get().to(logout));
}
