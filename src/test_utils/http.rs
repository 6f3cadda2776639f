use axum::{body::Body, http::StatusCode, response::Response};

#[track_caller]
pub(crate) fn assert_status_ok(response: &Response<Body>) {
    assert_eq!(response.status(), StatusCode::OK, "want 200 OK");
}

/// The value of the header `name`, panicking if it is missing.
#[track_caller]
pub(crate) fn get_header(response: &Response<Body>, name: &str) -> String {
    let Some(value) = response.headers().get(name) else {
        panic!("want header {name:?} in the response, got none");
    };

    value
        .to_str()
        .unwrap_or_else(|error| panic!("header {name:?} is not valid text: {error}"))
        .to_owned()
}

#[track_caller]
pub(crate) fn assert_hx_redirect(response: &Response<Body>, endpoint: &str) {
    assert_eq!(get_header(response, "hx-redirect"), endpoint);
}
