//! Budgets listing page.

use std::sync::{Arc, Mutex};

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
    budget::{Budget, get_budgets},
    currency::{Currency, format_currency},
    endpoints,
    expense::get_expenses,
    html::{CATEGORY_BADGE_STYLE, LINK_STYLE, PAGE_CONTAINER_STYLE, base, edit_delete_action_links},
    list_query::{
        ListItem, ListPage, ListQuery, SortDirection, SortState, SortValue, apply_list_query,
        search_form_view, sort_indicator,
    },
    navigation::NavBar,
    pagination::{PaginationConfig, pagination_view},
    report::{BudgetSummary, progress_colour, summarize_budgets},
    settings::get_user_currency,
};

/// The state needed for the budgets listing page.
#[derive(Debug, Clone)]
pub struct BudgetsPageState {
    pub db_connection: Arc<Mutex<Connection>>,
    pub pagination_config: PaginationConfig,
}

impl FromRef<AppState> for BudgetsPageState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            pagination_config: state.pagination_config.clone(),
        }
    }
}

/// The columns the budgets list can be sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetSortKey {
    Name,
    Amount,
    Category,
    Spent,
    Remaining,
    Created,
}

impl BudgetSortKey {
    const ALL: [BudgetSortKey; 6] = [
        BudgetSortKey::Name,
        BudgetSortKey::Amount,
        BudgetSortKey::Category,
        BudgetSortKey::Spent,
        BudgetSortKey::Remaining,
        BudgetSortKey::Created,
    ];

    fn label(self) -> &'static str {
        match self {
            BudgetSortKey::Name => "Name",
            BudgetSortKey::Amount => "Amount",
            BudgetSortKey::Category => "Category",
            BudgetSortKey::Spent => "Spent",
            BudgetSortKey::Remaining => "Remaining",
            BudgetSortKey::Created => "Created",
        }
    }
}

const DEFAULT_SORT: SortState<BudgetSortKey> = SortState {
    key: BudgetSortKey::Created,
    direction: SortDirection::Ascending,
};

/// A budget card with the figures shown on it.
#[derive(Debug, Clone)]
struct BudgetCard {
    budget: Budget,
    summary: BudgetSummary,
    amount: String,
    spent: String,
    remaining: String,
}

impl BudgetCard {
    fn new(budget: Budget, summary: BudgetSummary, currency: &Currency) -> Self {
        Self {
            amount: format_currency(summary.amount, currency),
            spent: format_currency(summary.total_spent, currency),
            remaining: format_currency(summary.remaining, currency),
            budget,
            summary,
        }
    }
}

impl ListItem for BudgetCard {
    type SortKey = BudgetSortKey;

    /// Money is searchable both as a plain number, e.g. "1200", and as shown
    /// on the card, e.g. "$1,200.00".
    fn search_fields(&self) -> Vec<String> {
        vec![
            self.budget.name.clone(),
            self.budget.amount.to_string(),
            self.amount.clone(),
            self.budget.category.label().to_owned(),
            self.summary.total_spent.to_string(),
            self.spent.clone(),
            self.summary.remaining.to_string(),
            self.remaining.clone(),
        ]
    }

    fn sort_value(&self, key: BudgetSortKey) -> SortValue<'_> {
        match key {
            BudgetSortKey::Name => SortValue::Text(&self.budget.name),
            BudgetSortKey::Amount => SortValue::Number(self.budget.amount),
            BudgetSortKey::Category => SortValue::Text(self.budget.category.label()),
            BudgetSortKey::Spent => SortValue::Number(self.summary.total_spent),
            BudgetSortKey::Remaining => SortValue::Number(self.summary.remaining),
            BudgetSortKey::Created => SortValue::DateTime(self.budget.created_at),
        }
    }
}

/// Render the budgets page: a searchable, sortable and paginated grid of
/// budget cards with their progress.
pub async fn get_budgets_page(
    State(state): State<BudgetsPageState>,
    Extension(user_id): Extension<UserID>,
    Query(query): Query<ListQuery<BudgetSortKey>>,
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

    let summaries = summarize_budgets(&budgets, &expenses);
    let cards: Vec<BudgetCard> = budgets
        .into_iter()
        .zip(summaries)
        .map(|(budget, summary)| BudgetCard::new(budget, summary, &currency))
        .collect();
    let has_budgets = !cards.is_empty();

    let config = &state.pagination_config;
    let page = apply_list_query(
        cards,
        &query,
        DEFAULT_SORT,
        config.default_page,
        config.default_page_size,
    );

    Ok(budgets_view(&page, &query, has_budgets, config.max_pages).into_response())
}

fn budgets_view(
    page: &ListPage<BudgetCard>,
    query: &ListQuery<BudgetSortKey>,
    has_budgets: bool,
    max_pages: u64,
) -> Markup {
    let nav_bar = NavBar::new(endpoints::BUDGETS_VIEW).into_html();
    let sort = query.sort_state(DEFAULT_SORT);

    let content = html!(
        (nav_bar)

        main class=(PAGE_CONTAINER_STYLE)
        {
            section class="w-full max-w-5xl space-y-4"
            {
                header class="flex justify-between flex-wrap items-end"
                {
                    h1 class="text-xl font-bold" { "Budgets" }

                    a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE)
                    {
                        "Create Budget"
                    }
                }

                @if has_budgets {
                    (search_form_view(endpoints::BUDGETS_VIEW, query, "Search budgets"))

                    nav aria-label="Sort budgets" class="flex flex-wrap gap-x-4 gap-y-1 text-sm"
                    {
                        span class="text-gray-500 dark:text-gray-400" { "Sort by:" }

                        @for key in BudgetSortKey::ALL {
                            a
                                href=(query.sort_url(endpoints::BUDGETS_VIEW, sort, key))
                                class=(LINK_STYLE)
                            {
                                (key.label()) (sort_indicator(&sort, key))
                            }
                        }
                    }
                }

                @if page.items.is_empty() {
                    div class="py-8 text-center text-gray-500 dark:text-gray-400"
                    {
                        @if has_budgets {
                            "No budgets match your search."
                        } @else {
                            "No budgets created yet. "
                            a href=(endpoints::NEW_BUDGET_VIEW) class=(LINK_STYLE)
                            {
                                "Create your first budget"
                            }
                        }
                    }
                } @else {
                    div class="grid gap-4 sm:grid-cols-2 lg:grid-cols-3"
                    {
                        @for card in &page.items {
                            (budget_card_view(card))
                        }
                    }
                }

                (pagination_view(page.page, page.page_count, max_pages, |page_number| {
                    query.page_url(endpoints::BUDGETS_VIEW, page_number)
                }))
            }
        }
    );

    base("Budgets", &[], &content)
}

fn budget_card_view(card: &BudgetCard) -> Markup {
    let budget = &card.budget;
    let detail_url = endpoints::format_endpoint(endpoints::BUDGET_VIEW, budget.id);
    let edit_url = endpoints::format_endpoint(endpoints::EDIT_BUDGET_VIEW, budget.id);
    let delete_url = endpoints::format_endpoint(endpoints::DELETE_BUDGET, budget.id);
    let confirm_message = format!(
        "Are you sure you want to delete '{}'? This will also delete its expenses.",
        budget.name
    );
    let remaining_style = if card.summary.remaining < 0.0 {
        "font-medium text-red-600 dark:text-red-400"
    } else {
        "font-medium"
    };

    html!(
        article
            class="flex flex-col gap-3 p-4 rounded-lg border border-gray-200
                bg-white dark:bg-gray-800 dark:border-gray-700"
        {
            div class="flex justify-between items-start gap-2"
            {
                a href=(detail_url) class="text-lg font-semibold hover:underline"
                {
                    (budget.name)
                }

                span class=(CATEGORY_BADGE_STYLE) { (budget.category) }
            }

            (progress_bar_view(&card.summary))

            dl class="grid grid-cols-3 gap-2 text-sm"
            {
                div
                {
                    dt class="text-gray-500 dark:text-gray-400" { "Budget" }
                    dd class="font-medium" { (card.amount) }
                }
                div
                {
                    dt class="text-gray-500 dark:text-gray-400" { "Spent" }
                    dd class="font-medium" { (card.spent) }
                }
                div
                {
                    dt class="text-gray-500 dark:text-gray-400" { "Remaining" }
                    dd class=(remaining_style)
                    {
                        (card.remaining)
                    }
                }
            }

            div class="flex gap-4"
            {
                (edit_delete_action_links(
                    &edit_url,
                    &delete_url,
                    &confirm_message,
                    "closest article",
                    "delete",
                ))
            }
        }
    )
}

/// A bar filled to the percentage of the budget that has been spent.
pub(super) fn progress_bar_view(summary: &BudgetSummary) -> Markup {
    let width = summary.percentage.clamp(0.0, 100.0);

    html!(
        div
            class="w-full h-2.5 rounded-full bg-gray-200 dark:bg-gray-700"
            role="progressbar"
            aria-valuemin="0"
            aria-valuemax="100"
            aria-valuenow=(format!("{:.0}", summary.percentage))
        {
            div
                class={ "h-2.5 rounded-full " (progress_colour(summary.percentage)) }
                style=(format!("width: {width:.1}%"))
            {}
        }
    )
}
