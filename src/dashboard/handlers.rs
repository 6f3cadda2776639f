//! Dashboard HTTP handler and view rendering.

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
    auth::UserID,
    budget::{Budget, get_budgets},
    currency::Currency,
    dashboard::{
        cards::stats_cards_view,
        charts::{
            DashboardChart, budgets_vs_spending_chart, charts_script, charts_view,
            spending_over_time_chart,
        },
        recent::recent_expenses_view,
    },
    endpoints,
    expense::{Expense, get_expenses},
    html::{HeadElement, base, link},
    navigation::NavBar,
    report::{
        BudgetSummary, dashboard_stats, recent_expenses, spending_series, summarize_budgets,
    },
    settings::get_user_currency,
};

/// How many expenses the recent expenses feed shows.
const RECENT_EXPENSE_COUNT: usize = 10;

/// The state needed for displaying the dashboard page.
#[derive(Debug, Clone)]
pub struct DashboardState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// Display a page with an overview of the user's budgets and spending.
pub async fn get_dashboard_page(
    State(state): State<DashboardState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Response, Error> {
    let connection = state
        .db_connection
        .lock()
        .inspect_err(|error| tracing::error!("could not acquire database lock: {error}"))
        .map_err(|_| Error::DatabaseLockError)?;

    let nav_bar = NavBar::new(endpoints::DASHBOARD_VIEW);

    let budgets = get_budgets(user_id, &connection)
        .inspect_err(|error| tracing::error!("Could not get budgets for user {user_id}: {error}"))?;

    if budgets.is_empty() {
        return Ok(dashboard_no_data_view(nav_bar).into_response());
    }

    let expenses = get_expenses(user_id, &connection).inspect_err(|error| {
        tracing::error!("Could not get expenses for user {user_id}: {error}")
    })?;
    let currency = get_user_currency(user_id, &connection)
        .inspect_err(|error| {
            tracing::error!("Could not get currency for user {user_id}: {error}")
        })?;

    let summaries = summarize_budgets(&budgets, &expenses);
    let charts = build_dashboard_charts(&budgets, &expenses, &summaries, &currency);

    Ok(dashboard_view(nav_bar, &budgets, &expenses, &summaries, &charts, &currency).into_response())
}

/// Creates the dashboard charts from the user's budgets and expenses.
fn build_dashboard_charts(
    budgets: &[Budget],
    expenses: &[Expense],
    summaries: &[BudgetSummary],
    currency: &Currency,
) -> [DashboardChart; 2] {
    let points = spending_series(budgets, expenses);

    [
        DashboardChart {
            id: "spending-chart",
            options: spending_over_time_chart(budgets, &points, currency).to_string(),
        },
        DashboardChart {
            id: "budgets-chart",
            options: budgets_vs_spending_chart(budgets, summaries, currency).to_string(),
        },
    ]
}

/// Renders the dashboard page when the user has no budgets.
fn dashboard_no_data_view(nav_bar: NavBar) -> Markup {
    let nav_bar = nav_bar.into_html();
    let new_budget_link = link(endpoints::NEW_BUDGET_VIEW, "create a budget");

    let content = html!(
        (nav_bar)

        div class="flex flex-col items-center px-6 py-8 mx-auto text-gray-900 dark:text-white"
        {
            h2 class="text-xl font-bold"
            {
                "Nothing here yet..."
            }

            p
            {
                "Your spending summary will show up here once you "
                (new_budget_link) " and add some expenses to it."
            }
        }
    );

    base("Dashboard", &[], &content)
}

fn dashboard_view(
    nav_bar: NavBar,
    budgets: &[Budget],
    expenses: &[Expense],
    summaries: &[BudgetSummary],
    charts: &[DashboardChart],
    currency: &Currency,
) -> Markup {
    let nav_bar = nav_bar.into_html();
    let stats = dashboard_stats(summaries);
    let recent = recent_expenses(expenses, RECENT_EXPENSE_COUNT);

    let content = html!(
        (nav_bar)

        div
            id="dashboard-content"
            class="flex flex-col items-center px-2 lg:px-6 lg:py-8 mx-auto
                max-w-screen-xl text-gray-900 dark:text-white"
        {
            (stats_cards_view(&stats, currency))
            (charts_view(charts))
            (recent_expenses_view(&recent, budgets, currency))
        }
    );

    let scripts = [
        HeadElement::ScriptLink("/static/echarts.6.0.0.min.js".to_owned()),
        charts_script(charts),
    ];

    base("Dashboard", &scripts, &content)
}
