//! Endpoint for changing the user's full name and email.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use rusqlite::Connection;
use serde::Deserialize;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::{UserID, update_user_profile, validate_email, validate_full_name},
    endpoints,
    settings::page::profile_form_view,
};

/// The state needed for updating a user's profile.
#[derive(Debug, Clone)]
pub struct UpdateProfileEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateProfileEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The raw profile form fields.
#[derive(Debug, Deserialize)]
pub struct ProfileFormData {
    pub full_name: String,
    pub email: String,
}

/// Validate and save the user's full name and email the same way registration does.
///
/// Invalid input and emails used by another account are shown on the form.
pub async fn update_profile_endpoint(
    State(state): State<UpdateProfileEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<ProfileFormData>,
) -> Response {
    let validated =
        validate_full_name(&form_data.full_name).and_then(|full_name| {
            validate_email(&form_data.email).map(|email| (full_name, email))
        });
    let (full_name, email) = match validated {
        Ok(fields) => fields,
        Err(error) => return invalid_profile_response(&form_data, &error),
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_user_profile(user_id, &full_name, &email, &connection) {
        Ok(()) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::SETTINGS_VIEW.to_owned()),
            Alert::SuccessSimple {
                message: "Profile updated successfully!".to_owned(),
            }
            .into_html(),
        )
            .into_response(),
        Err(error @ Error::DuplicateEmail) => invalid_profile_response(&form_data, &error),
        Err(error) => {
            tracing::error!("An unexpected error occurred while updating user {user_id}: {error}");
            error.into_alert_response()
        }
    }
}

fn invalid_profile_response(form_data: &ProfileFormData, error: &Error) -> Response {
    profile_form_view(
        &form_data.full_name,
        &form_data.email,
        &format!("Error: {error}"),
    )
    .into_response()
}
