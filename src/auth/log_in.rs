//! The log-in page and the endpoint that checks a user's email and password.

use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    Error,
    auth::{
        User, invalidate_auth_cookie, redirect::normalize_redirect_url, set_auth_cookie,
        state::AccountState, user::get_user_by_email,
    },
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, LINK_STYLE, base, email_input, loading_spinner, log_in_register,
        password_input,
    },
    timezone::get_local_offset,
};

/// Session length when "Keep me logged in" is ticked.
const REMEMBER_ME_COOKIE_DURATION: Duration = Duration::days(7);

/// Shown for both an unknown email and a wrong password, so the form does not
/// reveal who has an account.
pub const INVALID_CREDENTIALS_ERROR_MSG: &str = "Incorrect email or password.";

const INTERNAL_ERROR_MSG: &str = "An internal error occurred. Please try again later.";

/// The query string of the log-in page.
#[derive(Debug, Default, Deserialize)]
pub struct LogInQuery {
    /// The page to return to after logging in.
    pub redirect_url: Option<String>,
}

/// The fields of the log-in form.
#[derive(Clone, Serialize, Deserialize)]
pub struct LogInForm {
    pub email: String,
    pub password: String,
    /// Set to any value when the "Keep me logged in" checkbox is ticked and
    /// missing otherwise.
    pub remember_me: Option<String>,
    /// Copied from the log-in page's query string into a hidden input.
    pub redirect_url: Option<String>,
}

fn log_in_form(email: &str, error_message: Option<&str>, redirect_url: Option<&str>) -> Markup {
    html! {
        form
            hx-post=(endpoints::LOG_IN_API)
            hx-indicator="#indicator"
            hx-disabled-elt="#email, #password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            @if let Some(redirect_url) = redirect_url {
                input type="hidden" name="redirect_url" value=(redirect_url);
            }

            (email_input(email, None))
            (password_input("Password", "password", None, error_message))

            div class="flex items-center gap-x-3" {
                input type="checkbox" name="remember_me" id="remember_me" class="rounded-xs";
                label for="remember_me" class="text-sm font-medium text-gray-900 dark:text-white" {
                    "Keep me logged in for one week"
                }
            }

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE) {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Log in"
            }

            p class="text-sm text-gray-500 dark:text-gray-400" {
                "Forgot your password? "
                a href=(endpoints::FORGOT_PASSWORD_VIEW) class=(LINK_STYLE) { "Reset it here" }
            }

            p class="text-sm text-gray-500 dark:text-gray-400" {
                "Don't have an account? "
                a href=(endpoints::REGISTER_VIEW) class=(LINK_STYLE) { "Register here" }
            }
        }
    }
}

/// Keep `raw_url` only if it is a page on this site, logging anything else.
fn safe_redirect_url(raw_url: Option<&str>) -> Option<String> {
    let raw_url = raw_url?;
    let redirect_url = normalize_redirect_url(raw_url);

    if redirect_url.is_none() {
        tracing::warn!("Ignoring redirect URL {raw_url:?}");
    }

    redirect_url
}

/// Display the log-in page.
pub async fn get_log_in_page(Query(query): Query<LogInQuery>) -> Response {
    let redirect_url = safe_redirect_url(query.redirect_url.as_deref());
    let form = log_in_form("", None, redirect_url.as_deref());

    base("Log In", &[], &log_in_register("Log in to your account", &form)).into_response()
}

/// The user with `email` if `password` is theirs.
///
/// Returns `Ok(None)` for an unknown email or a wrong password.
fn authenticate(
    email: &str,
    password: &str,
    connection: &Connection,
) -> Result<Option<User>, Error> {
    let user = match get_user_by_email(email, connection) {
        Ok(user) => user,
        Err(Error::NotFound) => return Ok(None),
        Err(error) => return Err(error),
    };

    let is_match = user
        .password_hash
        .verify(password)
        .map_err(|error| Error::HashingError(error.to_string()))?;

    Ok(is_match.then_some(user))
}

/// Log a user in with the email and password from the log-in form.
///
/// On success the auth cookie is set and the client is sent to the page it
/// asked for, or the dashboard. Otherwise the form is returned with an error
/// message.
pub async fn post_log_in(
    State(state): State<AccountState>,
    jar: PrivateCookieJar,
    Form(form): Form<LogInForm>,
) -> Response {
    let redirect_url = safe_redirect_url(form.redirect_url.as_deref());
    let form_with_error = |message: &str| {
        log_in_form(&form.email, Some(message), redirect_url.as_deref()).into_response()
    };

    let authenticated = match state.db_connection.lock() {
        Ok(connection) => authenticate(&form.email, &form.password, &connection),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return form_with_error(INTERNAL_ERROR_MSG);
        }
    };

    let user = match authenticated {
        Ok(Some(user)) => user,
        Ok(None) => return form_with_error(INVALID_CREDENTIALS_ERROR_MSG),
        Err(error) => {
            tracing::error!("Could not check the credentials for {}: {error}", form.email);
            return form_with_error(INTERNAL_ERROR_MSG);
        }
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let cookie_duration = match form.remember_me {
        Some(_) => REMEMBER_ME_COOKIE_DURATION,
        None => state.cookie_duration,
    };

    match set_auth_cookie(jar.clone(), user.id, cookie_duration, local_offset) {
        Ok(jar) => {
            tracing::info!("User {} logged in", user.id);
            let destination = redirect_url.unwrap_or_else(|| endpoints::DASHBOARD_VIEW.to_owned());

            (StatusCode::SEE_OTHER, HxRedirect(destination), jar).into_response()
        }
        Err(error) => {
            tracing::error!("Could not set the auth cookie for user {}: {error}", user.id);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                HxRedirect(endpoints::INTERNAL_ERROR_VIEW.to_owned()),
                invalidate_auth_cookie(jar),
            )
                .into_response()
        }
    }
}
