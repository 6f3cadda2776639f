//! Endpoint for changing the currency amounts are displayed in.

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
    auth::UserID,
    currency::Currency,
    endpoints,
    settings::{page::currency_form_view, set_currency_code},
};

/// The state needed for updating a user's currency.
#[derive(Debug, Clone)]
pub struct UpdateCurrencyEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateCurrencyEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CurrencyFormData {
    #[serde(default)]
    pub currency_code: String,
}

/// Save the user's currency preference and reload the settings page.
pub async fn update_currency_endpoint(
    State(state): State<UpdateCurrencyEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<CurrencyFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match set_currency_code(user_id, &form_data.currency_code, &connection) {
        Ok(()) => {
            let currency = Currency::from_code_or_default(&form_data.currency_code);

            (
                StatusCode::SEE_OTHER,
                HxRedirect(endpoints::SETTINGS_VIEW.to_owned()),
                Alert::SuccessSimple {
                    message: format!("Amounts will now be shown in {}", currency.name),
                }
                .into_html(),
            )
                .into_response()
        }
        Err(error @ Error::InvalidCurrency(_)) => {
            currency_form_view(&form_data.currency_code, &format!("Error: {error}"))
                .into_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while setting the currency for user {user_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}
