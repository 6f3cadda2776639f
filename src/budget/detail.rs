//! The page for a single budget and its expenses.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, Path, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use time::Date;

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{Budget, BudgetId, get_budget, list::progress_bar_view},
    currency::{Currency, format_currency},
    endpoints,
    expense::{
        Expense, get_budget_expenses,
        form::{BudgetChoice, ExpenseFormAction, ExpenseFormDefaults, expense_form_view},
    },
    html::{
        BUTTON_DELETE_STYLE, CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE,
        TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE, base, currency_input_styles,
        edit_delete_action_links,
    },
    navigation::NavBar,
    report::{BudgetSummary, summarize_budget},
    settings::get_user_currency,
    timezone::{get_local_offset, local_today},
};

/// The state needed for the budget detail page.
#[derive(Debug, Clone)]
pub struct BudgetPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for BudgetPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

/// Render a budget's summary, its expenses (newest first) and a form for
/// adding an expense to it.
///
/// Responds with the 404 page if the budget does not exist or belongs to
/// another user.
pub async fn get_budget_page(
    Path(budget_id): Path<BudgetId>,
    State(state): State<BudgetPageState>,
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

    let budget = get_budget(budget_id, user_id, &connection).inspect_err(|error| {
        if *error != Error::NotFound {
            tracing::error!("Failed to retrieve budget {budget_id}: {error}");
        }
    })?;
    let expenses = get_budget_expenses(budget_id, user_id, &connection).inspect_err(|error| {
        tracing::error!("Failed to retrieve expenses for budget {budget_id}: {error}")
    })?;
    let currency = get_user_currency(user_id, &connection)
        .inspect_err(|error| {
            tracing::error!("Could not get currency for user {user_id}: {error}")
        })?;

    let summary = summarize_budget(&budget, &expenses);

    Ok(budget_view(
        &budget,
        &summary,
        &expenses,
        &currency,
        local_today(local_timezone),
    )
    .into_response())
}

fn budget_view(
    budget: &Budget,
    summary: &BudgetSummary,
    expenses: &[Expense],
    currency: &Currency,
    today: Date,
) -> Markup {
    let detail_url = endpoints::format_endpoint(endpoints::BUDGET_VIEW, budget.id);
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.id);
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_BUDGET, budget.id);
    let nav_bar = NavBar::new(&detail_url).into_html();
    let remaining_style = if summary.remaining < 0.0 {
        "text-lg font-semibold text-red-600 dark:text-red-400"
    } else {
        "text-lg font-semibold text-green-600 dark:text-green-400"
    };

    let add_expense_form = expense_form_view(
        ExpenseFormAction::Create(endpoints::POST_EXPENSE),
        BudgetChoice::Fixed(budget.id),
        &ExpenseFormDefaults::default(),
        today,
        "",
    );

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            div class="w-full max-w-5xl space-y-6"
            {
                a href=(endpoints::BUDGETS_VIEW) class=(LINK_STYLE) { "← Back to budgets" }

                section
                    id="budget-detail"
                    class="space-y-6"
                {
                    div
                        class="space-y-4 p-6 rounded-lg border border-gray-200
                            bg-white dark:bg-gray-800 dark:border-gray-700"
                    {
                        header class="flex justify-between flex-wrap items-start gap-2"
                        {
                            div
                            {
                                h1 class="text-2xl font-semibold" { (budget.name) }
                                span class="text-sm text-gray-500 dark:text-gray-400"
                                {
                                    "Created " (budget.created_at.date())
                                }
                            }

                            span class=(CATEGORY_BADGE_STYLE) { (budget.category) }
                        }

                        dl class="grid grid-cols-3 gap-4"
                        {
                            div
                            {
                                dt class="text-sm text-gray-500 dark:text-gray-400" { "Amount" }
                                dd class="text-lg font-semibold"
                                {
                                    (format_currency(summary.amount, currency))
                                }
                            }
                            div
                            {
                                dt class="text-sm text-gray-500 dark:text-gray-400" { "Spent" }
                                dd class="text-lg font-semibold"
                                {
                                    (format_currency(summary.total_spent, currency))
                                }
                            }
                            div
                            {
                                dt class="text-sm text-gray-500 dark:text-gray-400" { "Remaining" }
                                dd class=(remaining_style)
                                {
                                    (format_currency(summary.remaining, currency))
                                }
                            }
                        }

                        (progress_bar_view(summary))

                        div class="flex gap-4"
                        {
                            a href=(edit_url) class=(LINK_STYLE) { "Edit" }

                            button
                                type="button"
                                hx-delete=(delete_url)
                                hx-confirm=(format!(
                                    "Are you sure you want to delete '{}'? This will also delete its expenses.",
                                    budget.name
                                ))
                                hx-target="#budget-detail"
                                hx-target-error="#alert-container"
                                hx-swap="delete"
                                class=(BUTTON_DELETE_STYLE)
                            {
                                "Delete"
                            }
                        }
                    }

                    div class="grid gap-6 lg:grid-cols-3"
                    {
                        section class="lg:col-span-2 space-y-2"
                        {
                            h2 class="text-lg font-semibold" { "Expenses" }
                            (expenses_table_view(expenses, currency))
                        }

                        section class="space-y-2"
                        {
                            h2 class="text-lg font-semibold" { "Add Expense" }
                            (add_expense_form)
                        }
                    }
                }
            }
        }
    );

    base(
        &budget.name,
        &[currency_input_styles(currency.symbol)],
        &content,
    )
}

fn expenses_table_view(expenses: &[Expense], currency: &Currency) -> Markup {
    html!(
        div class="overflow-x-auto"
        {
            table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
            {
                thead class=(TABLE_HEADER_STYLE)
                {
                    tr
                    {
                        th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Amount" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                        th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                    }
                }

                tbody
                {
                    @for expense in expenses {
                        tr class=(TABLE_ROW_STYLE)
                        {
                            td class=(TABLE_CELL_STYLE) { (expense.name) }
                            td class=(TABLE_CELL_STYLE) { (format_currency(expense.amount, currency)) }
                            td class=(TABLE_CELL_STYLE) { time datetime=(expense.date) { (expense.date) } }
                            td class=(TABLE_CELL_STYLE)
                            {
                                div class="flex gap-4"
                                {
                                    (edit_delete_action_links(
                                        &endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id),
                                        &endpoints::format_endpoint(endpoints::DELETE_EXPENSE, expense.id),
                                        &format!("Are you sure you want to delete '{}'?", expense.name),
                                        "closest tr",
                                        "delete",
                                    ))
                                }
                            }
                        }
                    }

                    @if expenses.is_empty() {
                        tr
                        {
                            td
                                colspan="4"
                                class="px-6 py-4 text-center text-gray-500 dark:text-gray-400"
                            {
                                "No expenses recorded for this budget yet."
                            }
                        }
                    }
                }
            }
        }
    )
}

#[cfg(test)]
mod budget_page_tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        Extension,
        extract::{Path, State},
        http::StatusCode,
    };
    use scraper::{Html, Selector};
    use time::macros::{date, datetime};

    use crate::{
        Error,
        auth::UserID,
        budget::{Budget, NewBudget, create_budget, detail::BudgetPageState, get_budget_page},
        endpoints,
        expense::{NewExpense, create_expense},
        settings::set_currency_code,
        test_utils::{
            assert_hx_endpoint, assert_valid_html, create_test_user, get_test_connection,
            must_get_form, parse_html_document,
        },
    };

    fn setup() -> (BudgetPageState, UserID, UserID, Budget) {
        let connection = get_test_connection();
        let owner = create_test_user("ada@example.com", &connection);
        let other = create_test_user("charles@example.com", &connection);
        set_currency_code(owner.id, "GBP", &connection).unwrap();
        let budget = create_budget(
            owner.id,
            &NewBudget::new("Groceries", 200.0, "Food").unwrap(),
            datetime!(2024-01-01 09:00 UTC),
            &connection,
        )
        .unwrap();
        for (name, amount, date) in [
            ("Milk", 4.5, date!(2024 - 01 - 02)),
            ("Weekly shop", 75.5, date!(2024 - 01 - 06)),
            ("Bread", 3.0, date!(2024 - 01 - 04)),
        ] {
            create_expense(
                owner.id,
                &NewExpense::new(name, amount, date, budget.id).unwrap(),
                datetime!(2024-01-06 09:00 UTC),
                &connection,
            )
            .unwrap();
        }

        (
            BudgetPageState {
                db_connection: Arc::new(Mutex::new(connection)),
                local_timezone: "Etc/UTC".to_owned(),
            },
            owner.id,
            other.id,
            budget,
        )
    }

    fn dd_texts(html: &Html) -> Vec<String> {
        let selector = Selector::parse("dl dd").unwrap();

        html.select(&selector)
            .map(|dd| dd.text().collect::<String>().trim().to_owned())
            .collect()
    }

    #[tokio::test]
    async fn shows_summary_and_expenses_newest_first() {
        let (state, owner_id, _, budget) = setup();

        let response = get_budget_page(Path(budget.id), State(state), Extension(owner_id))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = parse_html_document(response).await;
        assert_valid_html(&html);

        assert_eq!(dd_texts(&html), vec!["£200.00", "£83.00", "£117.00"]);

        let names = Selector::parse("tbody tr td:first-child").unwrap();
        let names: Vec<String> = html
            .select(&names)
            .map(|cell| cell.text().collect())
            .collect();
        assert_eq!(names, vec!["Weekly shop", "Bread", "Milk"]);
    }

    #[tokio::test]
    async fn add_expense_form_is_bound_to_budget() {
        let (state, owner_id, _, budget) = setup();

        let response = get_budget_page(Path(budget.id), State(state), Extension(owner_id))
            .await
            .unwrap();

        let html = parse_html_document(response).await;
        let form = must_get_form(&html);
        assert_hx_endpoint(&form, endpoints::POST_EXPENSE, "hx-post");

        let budget_id = Selector::parse("input[type=hidden][name=budget_id]").unwrap();
        assert_eq!(
            form.select(&budget_id).next().unwrap().value().attr("value"),
            Some(budget.id.to_string().as_str())
        );
        assert!(
            form.select(&Selector::parse("select").unwrap())
                .next()
                .is_none()
        );
    }

    #[tokio::test]
    async fn other_users_budget_is_not_found() {
        let (state, _, other_id, budget) = setup();

        let result = get_budget_page(Path(budget.id), State(state), Extension(other_id)).await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
    }

    #[tokio::test]
    async fn missing_budget_is_not_found() {
        let (state, owner_id, _, _) = setup();

        let result = get_budget_page(Path(404), State(state), Extension(owner_id)).await;

        assert_eq!(result.unwrap_err(), Error::NotFound);
    }
}
