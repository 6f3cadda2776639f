//! Expense editing page and endpoint.

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
    budget::{Budget, get_budgets},
    currency::Currency,
    endpoints,
    expense::{
        Expense, ExpenseFormData, ExpenseId, NewExpense,
        form::{
            BudgetChoice, ExpenseFormAction, ExpenseFormDefaults, expense_form_view,
            invalid_expense_form_response,
        },
        get_expense, update_expense,
    },
    html::{FORM_CONTAINER_STYLE, base, currency_input_styles},
    navigation::NavBar,
    settings::get_user_currency,
};

/// The state needed for the edit expense page.
#[derive(Debug, Clone)]
pub struct EditExpensePageState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for EditExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed for updating an expense.
#[derive(Debug, Clone)]
pub struct UpdateExpenseEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for UpdateExpenseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the expense editing page.
///
/// Responds with the 404 page if the expense does not exist or belongs to
/// another user.
pub async fn get_edit_expense_page(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<EditExpensePageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let expense = get_expense(expense_id, user_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve expense {expense_id}: {error}");
        }
    })?;
    let budgets = get_budgets(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budgets: {error}"))?;
    let currency = get_user_currency(user_id, &connection)
        .inspect_err(|error| {
            tracing::error!("Could not get currency for user {user_id}: {error}")
        })?;

    Ok(edit_expense_view(&expense, &budgets, &currency).into_response())
}

/// Handle expense update form submission.
///
/// Moving the expense to another of the user's budgets is allowed. On success
/// the client is redirected to the expenses page.
pub async fn update_expense_endpoint(
    Path(expense_id): Path<ExpenseId>,
    State(state): State<UpdateExpenseEndpointState>,
    Extension(user_id): Extension<UserID>,
    Form(form_data): Form<ExpenseFormData>,
) -> Response {
    let connection = match state.db_connection.lock() {
        Ok(connection) => connection,
        Err(error) => {
            tracing::error!("could not acquire database lock: {error}");
            return Error::DatabaseLockError.into_alert_response();
        }
    };

    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_EXPENSE, expense_id);

    let result = NewExpense::new(
        &form_data.name,
        form_data.amount,
        form_data.date,
        form_data.budget_id,
    )
    .and_then(|new_expense| {
        update_expense(expense_id, user_id, &new_expense, &connection).map(|()| new_expense)
    });

    match result {
        Ok(new_expense) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::EXPENSES_VIEW.to_owned()),
            Alert::SuccessSimple {
                message: format!(
                    "Expense: {} has been updated successfully!",
                    new_expense.name
                ),
            }
            .into_html(),
        )
            .into_response(),
        Err(error) if error.is_validation_error() => invalid_expense_form_response(
            ExpenseFormAction::Update(&update_endpoint),
            &form_data,
            user_id,
            &connection,
            &error,
        ),
        Err(error @ (Error::UpdateMissingExpense | Error::NotFound | Error::NotOwned(_))) => {
            error.into_alert_response()
        }
        Err(error) => {
            tracing::error!(
                "An unexpected error occurred while updating expense {expense_id}: {error}"
            );
            error.into_alert_response()
        }
    }
}

fn edit_expense_view(expense: &Expense, budgets: &[Budget], currency: &Currency) -> Markup {
    let edit_endpoint = endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id);
    let update_endpoint = endpoints::format_endpoint(endpoints::PUT_EXPENSE, expense.id);
    let nav_bar = NavBar::new(&edit_endpoint).into_html();
    let defaults = ExpenseFormDefaults {
        name: Some(&expense.name),
        amount: Some(expense.amount),
        date: Some(expense.date),
        budget_id: Some(expense.budget_id),
    };
    let form = expense_form_view(
        ExpenseFormAction::Update(&update_endpoint),
        BudgetChoice::Select(budgets),
        &defaults,
        expense.date,
        "",
    );

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold text-gray-900 dark:text-white" { "Edit Expense" }
            (form)
        }
    };

    base(
        "Edit Expense",
        &[currency_input_styles(currency.symbol)],
        &content,
    )
}


#[cfg(test)]
mod update_expense_endpoint_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension, Form,
        extract::{Path, State},
        http::StatusCode,
    };
    use rusqlite::Connection;
    use time::macros::{date, datetime};

    use crate::{
        auth::UserID,
        budget::{Budget, NewBudget, create_budget},
        endpoints,
        expense::{
            Expense, ExpenseFormData, NewExpense, create_expense, edit::UpdateExpenseEndpointState,
            get_expense, update_expense_endpoint,
        },
        test_utils::{
            assert_form_error_message, assert_hx_endpoint, assert_hx_redirect, create_test_user,
            get_test_connection, must_get_form, parse_html_fragment,
        },
    };

    struct Fixture {
        state: UpdateExpenseEndpointState,
        user_id: UserID,
        other_user_id: UserID,
        groceries: Budget,
        travel: Budget,
        expense: Expense,
    }

    fn budget(user_id: UserID, name: &str, amount: f64, connection: &Connection) -> Budget {
        create_budget(
            user_id,
            &NewBudget::new(name, amount, "Other").unwrap(),
            datetime!(2024-01-01 09:00 UTC),
            connection,
        )
        .unwrap()
    }

    fn fixture() -> Fixture {
        let connection = get_test_connection();
        let user = create_test_user("ada@example.com", &connection);
        let other = create_test_user("charles@example.com", &connection);
        let groceries = budget(user.id, "Groceries", 100.0, &connection);
        let travel = budget(user.id, "Travel", 50.0, &connection);
        let expense = create_expense(
            user.id,
            &NewExpense::new("Weekly shop", 80.0, date!(2024 - 01 - 02), groceries.id).unwrap(),
            datetime!(2024-01-02 09:00 UTC),
            &connection,
        )
        .unwrap();

        Fixture {
            state: UpdateExpenseEndpointState {
                db_connection: Arc::new(Mutex::new(connection)),
            },
            user_id: user.id,
            other_user_id: other.id,
            groceries,
            travel,
            expense,
        }
    }

    fn form(name: &str, amount: f64, budget_id: i64) -> ExpenseFormData {
        ExpenseFormData {
            name: name.to_owned(),
            amount,
            date: date!(2024 - 01 - 03),
            budget_id,
            budget_fixed: false,
        }
    }

    #[tokio::test]
    async fn own_previous_amount_is_credited_back() {
        let fixture = fixture();

        let response = update_expense_endpoint(
            Path(fixture.expense.id),
            State(fixture.state.clone()),
            Extension(fixture.user_id),
            Form(form("Big shop", 100.0, fixture.groceries.id)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_hx_redirect(&response, endpoints::EXPENSES_VIEW);
        let html = parse_html_fragment(response).await;
        let text: String = html.root_element().text().collect();
        assert!(text.contains("Expense: Big shop has been updated successfully!"));

        let got = get_expense(
            fixture.expense.id,
            fixture.user_id,
            &fixture.state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(got.name, "Big shop");
        assert_eq!(got.amount, 100.0);
        assert_eq!(got.date, date!(2024 - 01 - 03));
    }

    #[tokio::test]
    async fn can_move_expense_to_another_budget() {
        let fixture = fixture();

        let response = update_expense_endpoint(
            Path(fixture.expense.id),
            State(fixture.state.clone()),
            Extension(fixture.user_id),
            Form(form("Train", 40.0, fixture.travel.id)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let got = get_expense(
            fixture.expense.id,
            fixture.user_id,
            &fixture.state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(got.budget_id, fixture.travel.id);
    }

    #[tokio::test]
    async fn moving_expense_checks_new_budgets_remaining_amount() {
        let fixture = fixture();

        let response = update_expense_endpoint(
            Path(fixture.expense.id),
            State(fixture.state.clone()),
            Extension(fixture.user_id),
            Form(form("Weekly shop", 80.0, fixture.travel.id)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_fragment(response).await;
        let form = must_get_form(&html);
        assert_hx_endpoint(
            &form,
            &endpoints::format_endpoint(endpoints::PUT_EXPENSE, fixture.expense.id),
            "hx-put",
        );
        assert_form_error_message(&form, "Error: Amount cannot exceed remaining budget");

        let got = get_expense(
            fixture.expense.id,
            fixture.user_id,
            &fixture.state.db_connection.lock().unwrap(),
        )
        .unwrap();
        assert_eq!(got, fixture.expense);
    }

    #[tokio::test]
    async fn cannot_update_other_users_expense() {
        let fixture = fixture();

        let response = update_expense_endpoint(
            Path(fixture.expense.id),
            State(fixture.state.clone()),
            Extension(fixture.other_user_id),
            Form(form("Mine now", 1.0, fixture.groceries.id)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let html = parse_html_fragment(response).await;
        let text: String = html.root_element().text().collect();
        assert!(text.contains("You are not allowed to update this expense"));
    }

    #[tokio::test]
    async fn updating_missing_expense_returns_not_found() {
        let fixture = fixture();

        let response = update_expense_endpoint(
            Path(999),
            State(fixture.state),
            Extension(fixture.user_id),
            Form(form("Ghost", 1.0, fixture.groceries.id)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
