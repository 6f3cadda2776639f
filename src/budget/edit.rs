//! Budget editing page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    budget::{
        Budget, BudgetFormData, BudgetId, NewBudget,
        form::{BudgetFormAction, BudgetFormDefaults, budget_form_view},
        get_budget, update_budget,
    },
    currency::Currency,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, currency_input_styles},
    navigation::NavBar,
    settings::get_user_currency,
};

/// The state needed for the edit budget page.
#[derive(Debug, Clone)]
pub struct EditBudgetPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditBudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for updating a budget.
#[derive(Debug, Clone)]
pub struct UpdateBudgetEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateBudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budget editing page.
///
/// Responds with the 404 page if the budget does not exist or belongs to
/// another user.
pub async fn get_edit_budget_page(
    Path(budget_id): Path<BudgetId>,
    State(state): State<EditBudgetPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budget = get_budget(budget_id, user_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve budget {budget_id}: {error}");
        }
    })?;
    let currency = get_user_currency(user_id, &connection)
        .inspect_err(|error| {
            tracing::error!("Could not get currency for user {user_id}: {error}")
        })?;

    Ok(edit_budget_view(&budget, &currency).into_response())
}

/// Handle budget update form submission.
///
/// On success the client is redirected to the budget's detail page.
pub async fn update_budget_endpoint(
    Path(budget_id): Path<BudgetId>,
    State(state): State<UpdateBudgetEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<BudgetFormData>,
) -> Response {
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_BUDGET, budget_id);

    let new_budget = match NewBudget::new(&form_data.name, form_data.amount, &form_data.category) {
        Ok(new_budget) => new_budget,
        Err(error) => {
            let defaults = BudgetFormDefaults {
                name: Some(&form_data.name),
                amount: Some(form_data.amount),
                category: form_data.category.parse().ok(),
            };

            return budget_form_view(
                BudgetFormAction::Update(&update_endpoint),
                &defaults,
                &format!("Error: {error}"),
            )
            .into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match update_budget(budget_id, user_id, &new_budget, &connection) {
        Ok(()) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::format_endpoint(endpoints::BUDGET_VIEW, budget_id)),
            Alert::SuccessSimple {
                message: format!("Budget: {} has been updated successfully!", new_budget.name),
            }
            .into_html(),
        )
            .into_response(),
        Err(error @ (Error::UpdateMissingBudget | Error::NotOwned(_))) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating budget {budget_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_budget_view(budget: &Budget, currency: &Currency) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_BUDGET, budget.id);
    let nav_bar = NavBar::new(&edit_endpoint).into_html();
    let defaults = BudgetFormDefaults {
        name: Some(&budget.name),
        amount: Some(budget.amount),
        category: Some(budget.category),
    };
    let form = budget_form_view(BudgetFormAction::Update(&update_endpoint), &defaults, "");

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold text-gray-900 dark:text-white" { "Edit Budget" }
            (form)
        }
    };

    base(
        "Edit Budget",
        &[currency_input_styles(currency.symbol)],
        &content,
    )
}

#[cfg(test)]
mod edit_budget_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
        response::IntoResponse,
    };
    use time::macros::datetime;

    use crate::{
        Error,
        budget::{NewBudget, create_budget, edit::EditBudgetPageState, get_edit_budget_page},
        endpoints,
        test_utils::{
            assert_form_input_with_value, assert_form_submit_button_with_text, assert_hx_endpoint,
            assert_valid_html, create_test_user, get_test_connection, must_get_form,
            parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page_with_budget_values() {
        let connection = get_test_connection();
        let user = create_test_user("ada@example.com", &connection);
        let budget = create_budget(
            user.id,
            &NewBudget::new("Groceries", 500.0, "Food").unwrap(),
            datetime!(2024-01-01 09:00 UTC),
            &connection,
        )
        .unwrap();
        let state = EditBudgetPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_edit_budget_page(Path(budget.id), State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::PUT_BUDGET, budget.id),
            "hx-put",
        );
        assert_form_input_with_value(&form, "name", "text", "Groceries");
        assert_form_input_with_value(&form, "amount", "number", "500.00");
        assert_form_submit_button_with_text(&form, "Update Budget");

        let checked = scraper::Selector::parse("input[name=category][checked]").unwrap();
        let checked: Vec<_> = form.select(&checked).collect();
        assert_eq!(checked.len(), 1);
        assert_eq!(checked[0].value().attr("value"), Some("Food"));
    }

    #[tokio::test]
    async fn other_users_budget_is_not_found() {
        let connection = get_test_connection();
        let owner = create_test_user("ada@example.com", &connection);
        let other = create_test_user("charles@example.com", &connection);
        let budget = create_budget(
            owner.id,
            &NewBudget::new("Groceries", 500.0, "Food").unwrap(),
            datetime!(2024-01-01 09:00 UTC),
            &connection,
        )
        .unwrap();
        let state = EditBudgetPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let result =
            get_edit_budget_page(Path(budget.id), State(state), Extension(other.id)).await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
        assert_eq!(
            Error::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}

#[cfg(test)]
mod update_budget_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use time::macros::datetime;

    use crate::{
        auth::UserID,
        budget::{
            Budget, BudgetFormData, Category, NewBudget, create_budget,
            edit::UpdateBudgetEndpointState, get_budget, update_budget_endpoint,
        },
        endpoints,
        test_utils::{
            assert_form_error_message, assert_hx_endpoint, assert_hx_redirect, create_test_user,
            get_test_connection, must_get_form, parse_html_fragment,
        },
    };

    fn get_state() -> (UpdateBudgetEndpointState, UserID, UserID, Budget) {
        let connection = get_test_connection();
        let owner = create_test_user("ada@example.com", &connection);
        let other = create_test_user("charles@example.com", &connection);
        let budget = create_budget(
            owner.id,
            &NewBudget::new("Groceries", 500.0, "Food").unwrap(),
            datetime!(2024-01-01 09:00 UTC),
            &connection,
        )
        .unwrap();

        (
            UpdateBudgetEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            owner.id,
            other.id,
            budget,
        )
    }

    #[tokio::test]
    async fn can_update_budget() {
        let (state, owner_id, _, budget) = get_state();
        let form = BudgetFormData {
            name: "Eating Out".to_owned(),
            amount: 250.0,
            category: "Entertainment".to_owned(),
        };

        let response = update_budget_endpoint(
            Path(budget.id),
            State(state.clone()),
            Extension(owner_id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(
            &response,
            &endpoints::format_endpoint(endpoints::BUDGET_VIEW, budget.id),
        );
        let html = parse_html_fragment(response).await;
        let text: String = html.root_element().text().collect();
        assert!(text.contains("Budget: Eating Out has been updated successfully!"));

        let got = get_budget(budget.id, owner_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(got.name, "Eating Out");
        assert_eq!(got.amount, 250.0);
        assert_eq!(got.category, Category::Entertainment);
        assert_eq!(got.created_at, budget.created_at);
    }

    #[tokio::test]
    async fn invalid_amount_renders_form_with_error() {
        let (state, owner_id, _, budget) = get_state();
        let form = BudgetFormData {
            name: "Groceries".to_owned(),
            amount: -1.0,
            category: "Food".to_owned(),
        };

        let response =
            update_budget_endpoint(Path(budget.id), State(state), Extension(owner_id), Form(form))
                .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::PUT_BUDGET, budget.id),
            "hx-put",
        );
        assert_form_error_message(&form, "Error: Amount must be greater than zero");
    }

    #[tokio::test]
    async fn cannot_update_other_users_budget() {
        let (state, owner_id, other_id, budget) = get_state();
        let form = BudgetFormData {
            name: "Mine now".to_owned(),
            amount: 1.0,
            category: "Other".to_owned(),
        };

        let response = update_budget_endpoint(
            Path(budget.id),
            State(state.clone()),
            Extension(other_id),
            Form(form),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let html = parse_html_fragment(response).await;
        let text: String = html.root_element().text().collect();
        assert!(text.contains("You are not allowed to update this budget"));

        let got = get_budget(budget.id, owner_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(got, budget);
    }

    #[tokio::test]
    async fn updating_missing_budget_returns_not_found() {
        let (state, owner_id, _, _) = get_state();
        let form = BudgetFormData {
            name: "Groceries".to_owned(),
            amount: 1.0,
            category: "Food".to_owned(),
        };

        let response =
            update_budget_endpoint(Path(999), State(state), Extension(owner_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
