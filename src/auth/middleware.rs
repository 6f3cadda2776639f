//! Middleware that only lets requests with a valid session cookie through.
//!
//! The user's ID is added to the request extensions, so handlers behind the
//! guard can take `Extension(user_id): Extension<UserID>`. Each successful
//! request also slides the session expiry forward.

use axum::{
    extract::{FromRef, FromRequestParts, Request, State},
    http::{StatusCode, header::SET_COOKIE},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use axum_htmx::HxRedirect;
use time::{Duration, UtcOffset};

use crate::{
    AppState,
    auth::{
        DEFAULT_COOKIE_DURATION, UserID,
        cookie::{extend_auth_cookie_duration_if_needed, get_token_from_cookies},
        redirect::{build_log_in_redirect_url, build_log_in_redirect_url_from_target},
    },
    endpoints,
    timezone::get_local_offset,
};

/// The state needed for the auth middleware
#[derive(Clone)]
pub struct AuthState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl FromRef<AuthState> for Key {
    fn from_ref(state: &AuthState) -> Self {
        state.cookie_key.clone()
    }
}

/// How a client without a valid session is sent to the log-in page.
#[derive(Debug, Clone, Copy)]
enum LogInRedirect {
    /// A `303 See Other` for full page loads.
    Page,
    /// An `HX-Redirect` header for requests made by HTMX.
    Htmx,
}

impl LogInRedirect {
    fn to(self, log_in_url: &str) -> Response {
        match self {
            LogInRedirect::Page => Redirect::to(log_in_url).into_response(),
            LogInRedirect::Htmx => {
                (HxRedirect(log_in_url.to_owned()), StatusCode::OK).into_response()
            }
        }
    }
}

/// Guard for pages. Requests without a valid session are redirected to the
/// log-in page, which returns the user to the requested page afterwards.
pub async fn auth_guard(State(state): State<AuthState>, request: Request, next: Next) -> Response {
    guard(state, request, next, LogInRedirect::Page).await
}

/// Guard for the HTMX endpoints under `/api`. Requests without a valid session
/// get an `HX-Redirect` to the log-in page, which returns the user to the page
/// named in the `HX-Current-URL` header afterwards.
pub async fn auth_guard_hx(
    State(state): State<AuthState>,
    request: Request,
    next: Next,
) -> Response {
    guard(state, request, next, LogInRedirect::Htmx).await
}

async fn guard(
    state: AuthState,
    request: Request,
    next: Next,
    redirect: LogInRedirect,
) -> Response {
    let log_in_url = log_in_url_for(&request);

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        tracing::error!(
            "Invalid timezone {}. Redirecting to the log-in page.",
            state.local_timezone
        );
        return redirect.to(&log_in_url);
    };

    let (mut parts, body) = request.into_parts();
    let jar = match PrivateCookieJar::from_request_parts(&mut parts, &state).await {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not read the cookie jar: {error:?}");
            return redirect.to(&log_in_url);
        }
    };

    let user_id: UserID = match get_token_from_cookies(&jar) {
        Ok(token) => token.user_id,
        Err(error) => {
            tracing::debug!("Rejected session cookie: {error}");
            return redirect.to(&log_in_url);
        }
    };

    parts.extensions.insert(user_id);
    let response = next.run(Request::from_parts(parts, body)).await;

    with_extended_session(response, jar, local_offset)
}

/// The log-in page URL that brings the user back to where they were.
fn log_in_url_for(request: &Request) -> String {
    build_log_in_redirect_url(request).unwrap_or_else(|| {
        tracing::warn!(
            "Could not work out where to return {} to after log-in. Using the dashboard.",
            request.uri().path()
        );

        build_log_in_redirect_url_from_target(endpoints::DASHBOARD_VIEW)
            .unwrap_or_else(|| endpoints::LOG_IN_VIEW.to_owned())
    })
}

/// Add the `Set-Cookie` headers for the extended session to `response`.
///
/// If the session cannot be extended the response is returned unchanged and the
/// client keeps its current cookie.
fn with_extended_session(
    response: Response,
    jar: PrivateCookieJar,
    local_offset: UtcOffset,
) -> Response {
    let extended =
        extend_auth_cookie_duration_if_needed(jar, DEFAULT_COOKIE_DURATION, local_offset);
    let jar = match extended {
        Ok(jar) => jar,
        Err(error) => {
            tracing::error!("Could not extend the session cookie: {error}");
            return response;
        }
    };

    let (mut parts, body) = response.into_parts();
    let cookie_response = jar.into_response();

    for cookie in cookie_response.headers().get_all(SET_COOKIE) {
        parts.headers.append(SET_COOKIE, cookie.clone());
    }

    Response::from_parts(parts, body)
}
