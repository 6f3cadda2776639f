//! The registration page and the endpoint for creating a new user account.

use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_extra::extract::PrivateCookieJar;
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{
        PasswordHash, ValidatedPassword, set_auth_cookie,
        state::AccountState,
        user::{create_user, validate_email, validate_full_name},
    },
    endpoints,
    html::{
        AuthField, BUTTON_PRIMARY_STYLE, LINK_STYLE, auth_field, base, email_input,
        loading_spinner, log_in_register, password_input,
    },
    internal_server_error::get_internal_server_error_redirect,
    timezone::get_local_offset,
};

/// Checked by the browser before the form is sent. The server still checks
/// the password's strength.
const PASSWORD_INPUT_MIN_LENGTH: u8 = 14;

/// The fields of the registration form.
#[derive(Default, Serialize, Deserialize)]
pub struct RegisterForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// The registration form field that a validation error belongs to.
#[derive(PartialEq)]
enum Field {
    FullName,
    Email,
    Password,
    ConfirmPassword,
}

fn registration_form(form: &RegisterForm, error: Option<(Field, &str)>) -> Markup {
    let error_for = |field: Field| {
        error
            .as_ref()
            .filter(|(error_field, _)| *error_field == field)
            .map(|(_, message)| *message)
    };

    let full_name_error = error_for(Field::FullName);
    let email_error = error_for(Field::Email);
    let password_error = error_for(Field::Password);
    let confirm_password_error = error_for(Field::ConfirmPassword);

    html! {
        form
            hx-post=(endpoints::USERS)
            hx-indicator="#indicator"
            hx-disabled-elt="#full_name, #email, #password, #confirm_password, #submit-button"
            class="space-y-4 md:space-y-6"
        {
            (auth_field(AuthField {
                label: "Full Name",
                name: "full_name",
                input_type: "text",
                placeholder: "Jane Doe",
                value: &form.full_name,
                min_length: Some(2),
                max_length: Some(30),
                error_message: full_name_error,
                ..Default::default()
            }))
            (email_input(&form.email, email_error))
            (password_input("Password", "password", Some(PASSWORD_INPUT_MIN_LENGTH), password_error))
            (password_input(
                "Confirm Password",
                "confirm_password",
                Some(PASSWORD_INPUT_MIN_LENGTH),
                confirm_password_error,
            ))

            button type="submit" id="submit-button" class=(BUTTON_PRIMARY_STYLE) {
                span class="inline htmx-indicator" id="indicator" { (loading_spinner()) }
                "Create Account"
            }

            p class="text-sm text-gray-500 dark:text-gray-400" {
                "Already have an account? "
                a href=(endpoints::LOG_IN_VIEW) class=(LINK_STYLE) { "Log in here" }
            }
        }
    }
}

/// Display the registration page.
pub async fn get_register_page() -> Response {
    let form = registration_form(&RegisterForm::default(), None);

    base("Register", &[], &log_in_register("Create an account", &form)).into_response()
}

/// A registration form that passed validation.
struct NewAccount {
    full_name: String,
    email: String,
    password: ValidatedPassword,
}

fn validate_registration(form: &RegisterForm) -> Result<NewAccount, (Field, String)> {
    let full_name =
        validate_full_name(&form.full_name).map_err(|error| (Field::FullName, error.to_string()))?;
    let email = validate_email(&form.email)
        .map_err(|_| (Field::Email, "Enter a valid email address".to_owned()))?;
    let password = ValidatedPassword::new(&form.password)
        .map_err(|error| (Field::Password, error.to_string()))?;

    if form.password != form.confirm_password {
        return Err((Field::ConfirmPassword, "Passwords do not match".to_owned()));
    }

    Ok(NewAccount {
        full_name,
        email,
        password,
    })
}

/// Create a new user, log them in and send them to the dashboard.
///
/// An invalid field re-renders the form with a message under that field.
pub async fn register_user(
    State(state): State<AccountState>,
    jar: PrivateCookieJar,
    Form(form): Form<RegisterForm>,
) -> Response {
    let account = match validate_registration(&form) {
        Ok(account) => account,
        Err((field, message)) => {
            return registration_form(&form, Some((field, &message))).into_response();
        }
    };

    let password_hash = match PasswordHash::new(account.password, PasswordHash::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(error) => {
            tracing::error!("Could not hash a new user's password: {error}");
            return get_internal_server_error_redirect();
        }
    };

    let Some(local_offset) = get_local_offset(&state.local_timezone) else {
        return Error::InvalidTimezoneError(state.local_timezone).into_alert_response();
    };

    let created = match state.db_connection.lock() {
        Ok(connection) => create_user(
            &account.full_name,
            &account.email,
            password_hash,
            &connection,
        ),
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let user = match created {
        Ok(user) => user,
        Err(Error::DuplicateEmail) => {
            let message = "An account with this email address already exists";
            return registration_form(&form, Some((Field::Email, message))).into_response();
        }
        Err(error) => {
            tracing::error!("Could not save a new user: {error}");
            return get_internal_server_error_redirect();
        }
    };

    tracing::info!("Registered new user {}", user.id);

    match set_auth_cookie(jar, user.id, state.cookie_duration, local_offset) {
        Ok(jar) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::DASHBOARD_VIEW.to_owned()),
            jar,
        )
            .into_response(),
        Err(error) => {
            tracing::error!("Could not set the auth cookie for user {}: {error}", user.id);
            get_internal_server_error_redirect()
        }
    }
}
