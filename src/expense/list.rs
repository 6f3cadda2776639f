//! Expenses listing page.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use axum::{
    Extension,
    extract::{FromRef, Query, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::UserID,
    budget::{Budget, BudgetId, get_budgets},
    currency::format_currency,
    endpoints,
    expense::{Expense, get_expenses},
    html::{
        LINK_STYLE, PAGE_CONTAINER_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE,
        base, edit_delete_action_links,
    },
    list_query::{
        ListItem, ListPage, ListQuery, SortDirection, SortState, SortValue, apply_list_query,
        search_form_view, sort_indicator,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, pagination_view},
    settings::get_user_currency,
};

/// The state needed for the expenses listing page.
#[derive(Debug, Clone)]
pub struct ExpensesPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for ExpensesPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The columns the expenses table can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpenseSortKey {
    Name,
    Amount,
    Date,
    Budget,
}

const DEFAULT_SORT: SortState<ExpenseSortKey> = SortState {
    key: ExpenseSortKey::Date,
    direction: SortDirection::Descending,
};

/// An expense with the name of its budget and its formatted amount.
#[derive(Debug, Clone)]
struct ExpenseRow {
    expense: Expense,
    budget_name: String,
    amount: String,
}

impl ListItem for ExpenseRow {
    type SortKey = ExpenseSortKey;

    fn search_fields(&self) -> Vec<String> {
        vec![
            self.expense.name.clone(),
            self.expense.amount.to_string(),
            self.amount.clone(),
            self.budget_name.clone(),
        ]
    }

    fn sort_value(&self, key: ExpenseSortKey) -> SortValue<'_> {
        match key {
            ExpenseSortKey::Name => SortValue::Text(&self.expense.name),
            ExpenseSortKey::Amount => SortValue::Number(self.expense.amount),
            ExpenseSortKey::Date => SortValue::Date(self.expense.date),
            ExpenseSortKey::Budget => SortValue::Text(&self.budget_name),
        }
    }
}

/// Render the expenses page: a searchable, sortable and paginated table of
/// every expense the user has recorded.
pub async fn get_expenses_page(
    State(state): State<ExpensesPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ListQuery<ExpenseSortKey>>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let budgets = get_budgets(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve budgets: {error}"))?;
    let expenses = get_expenses(user_id, &connection)
        .inspect_err(|error| tracing::error!("Failed to retrieve expenses: {error}"))?;
    let currency = get_user_currency(user_id, &connection)
        .inspect_err(|error| {
            tracing::error!("Could not get currency for user {user_id}: {error}")
        })?;

    let budget_names = budget_names(&budgets);
    let rows: Vec<ExpenseRow> = expenses
        .into_iter()
        .filter_map(|expense| {
            let Some(budget_name) = budget_names.get(&expense.budget_id) else {
                tracing::warn!(
                    "Expense {} points at missing budget {}",
                    expense.id,
                    expense.budget_id
                );
                return None;
            };

            Some(ExpenseRow {
                budget_name: (*budget_name).to_owned(),
                amount: format_currency(expense.amount, &currency),
                expense,
            })
        })
        .collect();
    let has_expenses = !rows.is_empty();

    let config = &state.pagination_config;
    let page = apply_list_query(
        rows,
        &query,
        DEFAULT_SORT,
        config.default_page,
        config.default_page_size,
    );

    Ok(expenses_view(&page, &query, has_expenses, config.max_pages).into_response())
}

fn budget_names(budgets: &[Budget]) -> HashMap<BudgetId, &str> {
    budgets
        .iter()
        .map(|budget| (budget.id, budget.name.as_str()))
        .collect()
}

fn expenses_view(
    page: &ListPage<ExpenseRow>,
    query: &ListQuery<ExpenseSortKey>,
    has_expenses: bool,
    max_pages: u64,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::EXPENSES_VIEW).into_html();
    let sort = query.sort_state(DEFAULT_SORT);

    let sortable_header = |key: ExpenseSortKey, label: &str| {
        html!(
            th scope="col" class=(TABLE_CELL_STYLE)
            {
                a
                    href=(query.sort_url(endpoints::EXPENSES_VIEW, sort, key))
                    class="hover:underline"
                {
                    (label) (sort_indicator(&sort, key))
                }
            }
        )
    };

    let table_row = |row: &ExpenseRow| {
        let expense = &row.expense;
        let edit_url = endpoints::format_endpoint(endpoints::EDIT_EXPENSE_VIEW, expense.id);
        let delete_url = endpoints::format_endpoint(endpoints::DELETE_EXPENSE, expense.id);
        let budget_url = endpoints::format_endpoint(endpoints::BUDGET_VIEW, expense.budget_id);
        let confirm_message = format!("Are you sure you want to delete '{}'?", expense.name);

        html!(
            tr class=(TABLE_ROW_STYLE)
            {
                td class=(TABLE_CELL_STYLE) { (expense.name) }
                td class=(TABLE_CELL_STYLE) { (row.amount) }
                td class=(TABLE_CELL_STYLE) { time datetime=(expense.date) { (expense.date) } }
                td class=(TABLE_CELL_STYLE)
                {
                    a href=(budget_url) class=(LINK_STYLE) { (row.budget_name) }
                }
                td class=(TABLE_CELL_STYLE)
                {
                    div class="flex gap-4"
                    {
                        (edit_delete_action_links(
                            &edit_url,
                            &delete_url,
                            &confirm_message,
                            "closest tr",
                            "delete",
                        ))
                    }
                }
            }
        )
    };

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Expenses" }

                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE)
                    {
                        "Create Expense"
                    }
                }

                (search_form_view(endpoints::EXPENSES_VIEW, query, "Search expenses"))

                div class="overflow-x-auto dark:bg-gray-800"
                {
                    table class="w-full text-sm text-left rtl:text-right
                        text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                (sortable_header(ExpenseSortKey::Name, "Name"))
                                (sortable_header(ExpenseSortKey::Amount, "Amount"))
                                (sortable_header(ExpenseSortKey::Date, "Date"))
                                (sortable_header(ExpenseSortKey::Budget, "Budget"))
                                th scope="col" class=(TABLE_CELL_STYLE) { "Actions" }
                            }
                        }

                        tbody
                        {
                            @for row in &page.items {
                                (table_row(row))
                            }

                            @if page.items.is_empty() {
                                tr
                                {
                                    td
                                        colspan="5"
                                        class="px-6 py-4 text-center
                                            text-gray-500 dark:text-gray-400"
                                    {
                                        @if has_expenses {
                                            "No expenses match your search."
                                        } @else {
                                            "No expenses recorded yet. "
                                            a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE)
                                            {
                                                "Add your first expense"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                    }
                }

                @if page.total > 0 {
                    p class="text-sm text-gray-500 dark:text-gray-400"
                    {
                        "Showing " (page.first_position) "-" (page.last_position)
                        " of " (page.total) " results"
                    }
                }

                (pagination_view(page.page, page.page_count, max_pages, |page_number| {
                    query.page_url(endpoints::EXPENSES_VIEW, page_number)
                }))
            }
        }
    );

    base("Expenses", &[], &content)
}
