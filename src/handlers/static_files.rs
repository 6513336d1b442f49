use crate::settings::AppSettings;
use actix_web::{web, HttpResponse, Result};
use log::debug;
use std::path::Path;

/// Content type browsers expect for `.ico`
pub const FAVICON_CONTENT_TYPE: &str = "image/vnd.microsoft.icon";

/// Serve `favicon.ico` from the configured static folder
///
/// # Errors
/// Never fails; a missing file is a 404
pub async fn favicon(settings: web::Data<AppSettings>) -> Result<HttpResponse> {
    let file_path = Path::new(&settings.static_files.assets_folder).join("favicon.ico");

    match tokio::fs::read(&file_path).await {
        Ok(contents) => Ok(HttpResponse::Ok()
            .content_type(FAVICON_CONTENT_TYPE)
            .body(contents)),
        Err(e) => {
            debug!("Static file not found: {} ({e})", file_path.display());
            Ok(HttpResponse::NotFound().finish())
        }
    }
}
