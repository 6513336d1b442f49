// Protected demo pages
use crate::session::AuthenticatedUser;
use crate::utils::response_builder::ResponseBuilder;
use actix_web::{web, HttpRequest, HttpResponse, Result};
use log::info;
use serde::Deserialize;

use super::templates::{render_hello_page, render_index_page};
use super::INDEX_PATH;

#[derive(Deserialize, Debug)]
pub struct HelloForm {
    pub name: Option<String>,
}

/// Index page listing the request headers
///
/// # Errors
/// Never fails once past the auth gate
pub async fn index(req: HttpRequest, user: AuthenticatedUser) -> Result<HttpResponse> {
    info!("Request for index page received");

    let mut headers: Vec<(String, String)> = req
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.to_string(),
                value.to_str().unwrap_or("<non-ascii value>").to_string(),
            )
        })
        .collect();
    headers.sort();

    Ok(ResponseBuilder::html(render_index_page(
        user.display_name(),
        &headers,
    )))
}

/// Greet the posted `name`, or go back to the index when it is missing or blank
///
/// # Errors
/// Never fails once past the auth gate
pub async fn hello(
    _user: AuthenticatedUser,
    form: Option<web::Form<HelloForm>>,
) -> Result<HttpResponse> {
    let name = form
        .and_then(|form| form.into_inner().name)
        .filter(|name| !name.is_empty());

    if let Some(name) = name {
        info!("Request for hello page received with name={name}");
        Ok(ResponseBuilder::html(render_hello_page(&name)))
    } else {
        info!("Request for hello page received with no name or blank name -- redirecting");
        Ok(ResponseBuilder::redirect(INDEX_PATH, None))
    }
}
