//! Expense creation page and endpoint.

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
use time::{Date, OffsetDateTime};

use crate::{
    AppState, Error,
    alert::Alert,
    auth::UserID,
    budget::{Budget, get_budgets},
    currency::Currency,
    endpoints,
    expense::{
        ExpenseFormData, NewExpense, create_expense,
        form::{
            BudgetChoice, ExpenseFormAction, ExpenseFormDefaults, expense_form_view,
            invalid_expense_form_response,
        },
    },
    html::{FORM_CONTAINER_STYLE, LINK_STYLE, base, currency_input_styles},
    navigation::NavBar,
    settings::get_user_currency,
    timezone::{get_local_offset, local_today},
};

/// The state needed for the new expense page.
#[derive(Debug, Clone)]
pub struct NewExpensePageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for NewExpensePageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// The state needed for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseEndpointState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CreateExpenseEndpointState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Render the expense creation page.
pub async fn get_new_expense_page(
    State(state): State<NewExpensePageState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let local_timezone = get_local_offset(&state.local_timezone).ok_or_else(|| {
        tracing::error!("Invalid timezone {}", state.local_timezone);
        Error::InvalidTimezoneError(state.local_timezone.clone())
    })?;

    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budgets: {error}"))?;
    let currency = get_user_currency(user_id, &connection)
        .inspect_err(|error| {
            tracing::error!("Could not get currency for user {user_id}: {error}")
        })?;

    Ok(new_expense_view(&budgets, &currency, local_today(local_timezone)).into_response())
}

/// Handle expense creation form submission.
///
/// On success the client is redirected to the page of the expense's budget.
pub async fn create_expense_endpoint(
    State(state): State<CreateExpenseEndpointState>,
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

    let result = NewExpense::new(
        &form_data.name,
        form_data.amount,
        form_data.date,
        form_data.budget_id,
    )
    .and_then(|new_expense| {
        create_expense(user_id, &new_expense, OffsetDateTime::now_utc(), &connection)
    });

    match result {
        Ok(expense) => (
            StatusCode::SEE_OTHER,
            HxRedirect(endpoints::format_endpoint(
                endpoints::BUDGET_VIEW,
                expense.budget_id,
            )),
            Alert::SuccessSimple {
                message: format!("Expense: {} successfully created!", expense.name),
            }
            .into_html(),
        )
            .into_response(),
        Err(error) if error.is_validation_error() => invalid_expense_form_response(
            ExpenseFormAction::Create(endpoints::POST_EXPENSE),
            &form_data,
            user_id,
            &connection,
            &error,
        ),
        Err(error @ (Error::NotFound | Error::NotOwned(_))) => error.into_alert_response(),
        Err(error) => {
            tracing::error!("An unexpected error occurred while creating an expense: {error}");

            error.into_alert_response()
        }
    }
}

fn new_expense_view(budgets: &[Budget], currency: &Currency, today: Date) -> Markup {
    let nav_bar = NavBar::new(endpoints::NEW_EXPENSE_VIEW).into_html();

    let content = html! {
        (nav_bar)

        div class=(FORM_CONTAINER_STYLE)
        {
            h1 class="mb-4 text-xl font-bold text-gray-900 dark:text-white" { "Create Expense" }

            @if budgets.is_empty() {
                p class="text-gray-500 dark:text-gray-400"
                {
                    "You need a budget before you can add expenses. "
                    a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE)
                    {
                        "Create a budget"
                    }
                }
            } @else {
                (expense_form_view(
                    ExpenseFormAction::Create(endpoints::POST_EXPENSE),
                    BudgetChoice::Select(budgets),
                    &ExpenseFormDefaults::default(),
                    today,
                    "",
                ))
            }
        }
    };

    base(
        "Create Expense",
        &[currency_input_styles(currency.symbol)],
        &content,
    )
}
