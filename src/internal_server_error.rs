//! The 500 page, and how HTMX requests are sent to it.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use axum_htmx::HxRedirect;

use crate::{endpoints, html::error_view};

/// A 500 response explaining what went wrong and what the user can do about it.
pub struct InternalServerError<'a> {
    pub description: &'a str,
    pub fix: &'a str,
}

impl Default for InternalServerError<'_> {
    fn default() -> Self {
        Self {
            description: "Sorry, something went wrong.",
            fix: "Try again later or check the server logs",
        }
    }
}

impl IntoResponse for InternalServerError<'_> {
    fn into_response(self) -> Response {
        let page = error_view("Internal Server Error", "500", self.description, self.fix);

        (StatusCode::INTERNAL_SERVER_ERROR, Html(page.into_string())).into_response()
    }
}

pub async fn get_internal_server_error_page() -> Response {
    InternalServerError::default().into_response()
}

/// Send an HTMX request to the 500 page with `HX-Redirect`.
///
/// Full page requests should be answered with the page itself instead.
pub fn get_internal_server_error_redirect() -> Response {
    let redirect = HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned());

    (redirect, StatusCode::INTERNAL_SERVER_ERROR).into_response()
}
