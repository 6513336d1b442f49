#![warn(clippy::pedantic)]
#![warn(clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

use actix_web::{middleware::Logger, web, App, HttpServer};
use entragate::{
    configure_services,
    handlers::{HELLO_PATH, INDEX_PATH, LOGIN_PATH, LOGOUT_PATH},
    AppSettings, EntraIdentityClient, SessionStore, SharedIdentityClient,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Loads .env, initializes the logger and validates the identity configuration
    let settings = AppSettings::load()
        .map_err(|e| std::io::Error::other(format!("Failed to load settings: {e}")))?;

    let identity_client: SharedIdentityClient = Arc::new(
        EntraIdentityClient::from_settings(&settings).map_err(|e| {
            std::io::Error::other(format!("Failed to initialize identity client: {e}"))
        })?,
    );

    start_server(identity_client, settings).await
}

/// Start the server
///
/// # Errors
///
/// Returns an error if:
/// - Server binding fails
/// - Server fails to start
async fn start_server(
    identity_client: SharedIdentityClient,
    settings: AppSettings,
) -> std::io::Result<()> {
    let bind_address = settings.get_bind_address();
    print_startup_info(&bind_address, &settings);

    let session_store = SessionStore::from_settings(&settings);
    let redirect_path = settings.identity.redirect_path.clone();

    HttpServer::new(move || {
        let redirect_path = redirect_path.clone();
        App::new()
            .app_data(web::Data::new(settings.clone()))
            .app_data(web::Data::new(session_store.clone()))
            .app_data(web::Data::from(identity_client.clone()))
            .wrap(Logger::default())
            .configure(move |cfg| configure_services(cfg, &redirect_path))
    })
    .bind(&bind_address)?
    .run()
    .await
}

fn print_startup_info(bind_address: &str, settings: &AppSettings) {
    println!(
        "Starting entragate {} on http://{bind_address}",
        entragate::VERSION
    );
    println!();
    println!("Endpoints:");
    println!("  GET  {INDEX_PATH}              - Signed-in landing page (requires login)");
    println!("  POST {HELLO_PATH}         - Greeting form target (requires login)");
    println!("  GET  {LOGIN_PATH}         - Redirect to Azure AD sign-in");
    println!(
        "  GET  {}    - OAuth2 callback",
        settings.identity.redirect_path
    );
    println!("  GET  {LOGOUT_PATH}        - Clear session");
    println!("  GET  /favicon.ico   - Site icon");
    println!();
    println!("Register this redirect URI with the app registration:");
    println!("  {}", settings.redirect_uri());
    println!("Authority: {}", settings.identity.authority_url());
    println!(
        "  Static files folder: {}",
        settings.static_files.assets_folder
    );
}
