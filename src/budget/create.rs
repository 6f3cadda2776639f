//! Budget creation page and endpoint.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Form,
    extract::{FromRef, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_htmx::HxRedirect;
use maud::{Markup, html};
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    budget::{
        BudgetFormData, NewBudget, create_budget,
        form::{BudgetFormAction, BudgetFormDefaults, budget_form_view},
    },
    currency::Currency,
    endpoints,
    html::{FORM_CONTAINER_STYLE, base, currency_input_styles},
    navigation::NavBar,
    settings::get_user_currency,
};

/// The state needed for the new budget page.
#[derive(Debug, Clone)]
pub struct NewBudgetPageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for NewBudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for creating a budget.
#[derive(Debug, Clone)]
pub struct CreateBudgetEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateBudgetEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the budget creation page.
pub async fn get_new_budget_page(
    State(state): State<NewBudgetPageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let currency = get_user_currency(user_id, &connection)
        .inspect_err(|error| {
            tracing::error!("Could not get currency for user {user_id}: {error}")
        })?;

    Ok(new_budget_view(&currency).into_response())
}

/// Handle budget creation form submission.
///
/// On success the client is redirected to the budgets page.
pub async fn create_budget_endpoint(
    State(state): State<CreateBudgetEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<BudgetFormData>,
) -> Response {
    let new_budget = match NewBudget::new(&form_data.name, form_data.amount, &form_data.category) {
        Ok(new_budget) => new_budget,
        Err(error) => {
            return new_budget_form_view(&form_data, &format!("Error: {error}")).into_response();
        }
    };

    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    match create_budget(user_id, &new_budget, OffsetDateTime::now_utc(), &connection) {
        Ok(budget) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::BUDGETS_VIEW.to_owned()),
            Alert::SuccessSimple {
                message: format!("Budget: {} successfully created!", budget.name),
            }
            .into_html(),
        )
            .into_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating a budget: {error}");

            error.into_alert_response()
        }
    }
}

fn new_budget_view(currency: &Currency) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_BUDGET_VIEW).into_html();
    let form = budget_form_view(
        BudgetFormAction::Create(endpoints::POST_BUDGET),
        &BudgetFormDefaults::default(),
        "",
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold text-gray-900 dark:text-white" { "Create Budget" }
            (form)
        }
    };

    base(
        "Create Budget",
        &[currency_input_styles(currency.symbol)],
        &content,
    )
}

fn new_budget_form_view(form_data: &BudgetFormData, error_message: &str) -> Markup {
    let defaults = BudgetFormDefaults {
        name: Some(&form_data.name),
        amount: Some(form_data.amount),
        category: form_data.category.parse().ok(),
    };

    budget_form_view(
        BudgetFormAction::Create(endpoints::POST_BUDGET),
        &defaults,
        error_message,
    )
}

#[cfg(test)]
mod new_budget_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::State,
        http::{StatusCode, header::CONTENT_TYPE},
    };

    use crate::{
        budget::{Category, create::NewBudgetPageState, get_new_budget_page},
        endpoints,
        settings::set_currency_code,
        test_utils::{
            assert_form_input, assert_form_submit_button_with_text, assert_hx_endpoint,
            assert_valid_html, create_test_user, get_header, get_test_connection, must_get_form,
            parse_html_document,
        },
    };

    #[tokio::test]
    async fn render_page() {
        let connection = get_test_connection();
        let user = create_test_user("ada@example.com", &connection);
        let state = NewBudgetPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_new_budget_page(State(state), Extension(user.id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            get_header(&response, CONTENT_TYPE.as_str()),
            "text/html; charset=utf-8"
        );

        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_BUDGET, "hx-post");
        assert_form_input(&form, "name", "text");
        assert_form_input(&form, "amount", "number");
        assert_form_submit_button_with_text(&form, "Create Budget");

        let radio_selector = scraper::Selector::parse("input[type=radio][name=category]").unwrap();
        let radios: Vec<_> = form.select(&radio_selector).collect();
        assert_eq!(radios.len(), Category::ALL.len());
        assert!(
            radios
                .iter()
                .all(|radio| radio.value().attr("checked").is_none())
        );
    }

    #[tokio::test]
    async fn amount_is_prefixed_with_user_currency() {
        let connection = get_test_connection();
        let user = create_test_user("ada@example.com", &connection);
        set_currency_code(user.id, "EUR", &connection).unwrap();
        let state = NewBudgetPageState {
            db_connection: Arc::new(Mutex::new(connection)),
        };

        let response = get_new_budget_page(State(state), Extension(user.id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let style_selector = scraper::Selector::parse("style").unwrap();
        let styles: String = html
            .select(&style_selector)
            .flat_map(|style| style.text())
            .collect();
        assert!(styles.contains("content: '€'"), "got styles: {styles}");
    }
}

#[cfg(test)]
mod create_budget_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::State,
        http::{StatusCode, header::CONTENT_TYPE},
    };

    use crate::{
        auth::UserID,
        budget::{
            BudgetFormData, Category, create::CreateBudgetEndpointState, create_budget_endpoint,
            get_budgets,
        },
        endpoints,
        test_utils::{
            assert_form_error_message, assert_hx_redirect, assert_valid_html, create_test_user,
            get_header, get_test_connection, must_get_form, parse_html_fragment,
        },
    };

    fn get_state() -> (CreateBudgetEndpointState, UserID) {
        let connection = get_test_connection();
        let user = create_test_user("ada@example.com", &connection);

        (
            CreateBudgetEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user.id,
        )
    }

    #[tokio::test]
    async fn can_create_budget() {
        let (state, user_id) = get_state();
        let form = BudgetFormData {
            name: " Groceries ".to_owned(),
            amount: 500.0,
            category: "Food".to_owned(),
        };

        let response =
            create_budget_endpoint(State(state.clone()), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::BUDGETS_VIEW);

        let html = parse_html_fragment(response).await;
        let text: String = html.root_element().text().collect();
        assert!(
            text.contains("Budget: Groceries successfully created!"),
            "got {text}"
        );

        let budgets = get_budgets(user_id, &state.db_connection.lock().unwrap()).unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].name, "Groceries");
        assert_eq!(budgets[0].amount, 500.0);
        assert_eq!(budgets[0].category, Category::Food);
        assert_eq!(budgets[0].user_id, user_id);
    }

    #[tokio::test]
    async fn create_budget_fails_on_empty_name() {
        let (state, user_id) = get_state();
        let form = BudgetFormData {
            name: "   ".to_owned(),
            amount: 500.0,
            category: "Food".to_owned(),
        };

        let response =
            create_budget_endpoint(State(state.clone()), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            get_header(&response, CONTENT_TYPE.as_str()),
            "text/html; charset=utf-8"
        );
        let html = parse_html_fragment(response).await;
        assert_valid_html(&html);
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Name cannot be empty");
        assert!(
            get_budgets(user_id, &state.db_connection.lock().unwrap())
                .unwrap()
                .is_empty()
        );
    }

    #[tokio::test]
    async fn create_budget_fails_on_zero_amount() {
        let (state, user_id) = get_state();
        let form = BudgetFormData {
            name: "Groceries".to_owned(),
            amount: 0.0,
            category: "Food".to_owned(),
        };

        let response = create_budget_endpoint(State(state), Extension(user_id), Form(form)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Amount must be greater than zero");
    }

    #[tokio::test]
    async fn create_budget_fails_on_long_name() {
        let (state, user_id) = get_state();
        let form = BudgetFormData {
            name: "a".repeat(26),
            amount: 10.0,
            category: "Food".to_owned(),
        };

        let response = create_budget_endpoint(State(state), Extension(user_id), Form(form)).await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: Name must be at most 25 characters");
    }

    #[tokio::test]
    async fn create_budget_fails_on_unknown_category() {
        let (state, user_id) = get_state();
        let form = BudgetFormData {
            name: "Groceries".to_owned(),
            amount: 10.0,
            category: "Gambling".to_owned(),
        };

        let response = create_budget_endpoint(State(state), Extension(user_id), Form(form)).await;

        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_form_error_message(&form, "Error: \"Gambling\" is not a valid category");
    }
}
