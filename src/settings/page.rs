//! The settings page and the forms it is made of.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{UserID, get_user_by_id},
    currency::CURRENCIES,
    endpoints,
    html::{
        BUTTON_PRIMARY_STYLE, FORM_CONTAINER_STYLE, FORM_LABEL_STYLE, FORM_RADIO_GROUP_STYLE,
        FORM_RADIO_INPUT_STYLE, FORM_RADIO_LABEL_STYLE, FORM_TEXT_INPUT_STYLE, base,
        loading_spinner,
    },
    navigation::NavBar,
    settings::get_user_currency,
};

/// The state needed for the settings page.
#[derive(Debug, Clone)]
pub struct SettingsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for SettingsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the profile and currency forms filled in with the user's current values.
pub async fn get_settings_page(
    State(state): State<SettingsPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let user = get_user_by_id(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get user {user_id}: {error}"))?;
    let currency = get_user_currency(user_id, &connection)
        .inspect_err(|error| {
            tracing::error!("Could not get currency for user {user_id}: {error}")
        })?;

    let nav_bar = NavBar::new(endpoints::SETTINGS_VIEW).into_html();
    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold text-gray-900 dark:text-white" { "Settings" }

            section id="profile-settings" class="w-full mb-8"
            {
                h2 class="mb-4 text-lg font-semibold" { "Profile" }
                (profile_form_view(&user.full_name, &user.email, ""))
            }

            section id="currency-settings" class="w-full mb-8"
            {
                h2 class="mb-4 text-lg font-semibold" { "Currency" }
                (currency_form_view(currency.code, ""))
            }
        }
    };

    Ok(base("Settings", &[], &content).into_response())
}

pub(super) fn profile_form_view(full_name: &str, email: &str, error_message: &str) -> Markup {
    html! {
        form
            hx-put=(endpoints::PUT_PROFILE)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-disabled-elt="find button[type=submit]"
            class="w-full space-y-4 md:space-y-6"
        {
            div
            {
                label for="full_name" class=(FORM_LABEL_STYLE) { "Full Name" }

                input
                    id="full_name"
                    type="text"
                    name="full_name"
                    value=(full_name)
                    minlength="2"
                    maxlength="30"
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            div
            {
                label for="email" class=(FORM_LABEL_STYLE) { "Email" }

                input
                    id="email"
                    type="email"
                    name="email"
                    value=(email)
                    required
                    class=(FORM_TEXT_INPUT_STYLE);
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="htmx-indicator" { (loading_spinner()) }
                "Save Profile"
            }
        }
    }
}

pub(super) fn currency_form_view(selected_code: &str, error_message: &str) -> Markup {
    html! {
        form
            hx-put=(endpoints::PUT_CURRENCY)
            hx-swap="outerHTML"
            hx-target-error="#alert-container"
            hx-disabled-elt="find button[type=submit]"
            class="w-full space-y-4 md:space-y-6"
        {
            fieldset class="space-y-2"
            {
                legend class=(FORM_LABEL_STYLE) { "Display amounts in" }

                div class=(FORM_RADIO_GROUP_STYLE)
                {
                    @for currency in CURRENCIES {
                        @let id = format!("currency-{}", currency.code.to_lowercase());

                        div class="flex items-center gap-3"
                        {
                            input
                                name="currency_code"
                                id=(id)
                                type="radio"
                                value=(currency.code)
                                checked[currency.code == selected_code]
                                required
                                class=(FORM_RADIO_INPUT_STYLE);

                            label for=(id) class=(FORM_RADIO_LABEL_STYLE)
                            {
                                (currency.symbol.trim()) " " (currency.name) " (" (currency.code) ")"
                            }
                        }
                    }
                }
            }

            @if !error_message.is_empty() {
                p class="text-red-600 dark:text-red-400"
                {
                    (error_message)
                }
            }

            button type="submit" class=(BUTTON_PRIMARY_STYLE)
            {
                span class="htmx-indicator" { (loading_spinner()) }
                "Save Currency"
            }
        }
    }
}
