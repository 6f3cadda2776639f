//! Where to send a user after they log in.
//!
//! Only paths on this site are accepted as redirect targets, so a crafted log-in
//! link cannot send the user to another site after they log in.

use axum::{
    extract::Request,
    http::{HeaderMap, Uri},
};

use crate::endpoints;

/// The path and query of `uri` if it points at a page on this site other than
/// the log-in page.
fn same_site_target(uri: &Uri) -> Option<String> {
    let target = uri.path_and_query()?;

    if !target.path().starts_with('/') || target.path().starts_with("//") {
        return None;
    }

    if target.path() == endpoints::LOG_IN_VIEW {
        return None;
    }

    Some(target.as_str().to_owned())
}

/// Parse a `redirect_url` query parameter, accepting only relative URLs for
/// pages on this site.
pub fn normalize_redirect_url(raw_url: &str) -> Option<String> {
    let uri: Uri = raw_url.parse().ok()?;

    match (uri.scheme(), uri.authority()) {
        (None, None) => same_site_target(&uri),
        _ => None,
    }
}

/// The page an HTMX request was made from, taken from its `HX-Current-URL`
/// header. The header holds an absolute URL, so only its path and query are kept.
fn hx_current_page(headers: &HeaderMap) -> Option<String> {
    let is_htmx = headers
        .get("hx-request")
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.eq_ignore_ascii_case("true"));

    if !is_htmx {
        tracing::warn!("Expected an HX-Request header on an /api request.");
        return None;
    }

    let Some(current_url) = headers
        .get("hx-current-url")
        .and_then(|value| value.to_str().ok())
    else {
        tracing::warn!("Expected an HX-Current-URL header on an /api request.");
        return None;
    };

    let page = current_url
        .parse::<Uri>()
        .ok()
        .and_then(|uri| same_site_target(&uri));

    if page.is_none() {
        tracing::warn!("Ignoring HX-Current-URL {current_url}");
    }

    page
}

/// The log-in page URL that sends the user back to what they requested.
///
/// Requests to `/api` come from forms and buttons, so the user is sent back to
/// the page named in `HX-Current-URL` rather than to the endpoint itself.
pub fn build_log_in_redirect_url(request: &Request) -> Option<String> {
    let target = if request.uri().path().starts_with("/api") {
        hx_current_page(request.headers())?
    } else {
        same_site_target(request.uri())?
    };

    build_log_in_redirect_url_from_target(&target)
}

/// The log-in page URL with `target` as its `redirect_url` parameter.
pub(super) fn build_log_in_redirect_url_from_target(target: &str) -> Option<String> {
    serde_urlencoded::to_string([("redirect_url", target)])
        .inspect_err(|error| tracing::error!("Could not encode redirect URL {target}: {error}"))
        .ok()
        .map(|query| format!("{}?{query}", endpoints::LOG_IN_VIEW))
}
