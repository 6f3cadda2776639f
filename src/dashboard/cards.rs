//! Summary cards for the totals across all of a user's budgets.

use maud::{Markup, html};

use crate::{
    currency::{Currency, currency_rounded_with_tooltip},
    report::DashboardStats,
};

const CARD_STYLE: &str = "bg-white dark:bg-gray-800 border border-gray-200 \
    dark:border-gray-700 rounded-lg p-4 shadow-md";
const CARD_LABEL_STYLE: &str = "text-sm text-gray-600 dark:text-gray-400";
const VALUE_STYLE: &str = "text-3xl font-bold";

/// Renders the Total Budget, Total Expenses, Remaining and Active Budgets cards.
pub(super) fn stats_cards_view(stats: &DashboardStats, currency: &Currency) -> Markup {
    let remaining_style = if stats.remaining < 0.0 {
        "text-3xl font-bold text-red-600 dark:text-red-400"
    } else {
        VALUE_STYLE
    };

    html! {
        section
            id="stats"
            class="w-full mx-auto mb-4 grid grid-cols-2 lg:grid-cols-4 gap-4"
        {
            (stat_card(
                "total-budget",
                "Total Budget",
                currency_rounded_with_tooltip(stats.total_budget, currency),
                VALUE_STYLE,
            ))
            (stat_card(
                "total-expenses",
                "Total Expenses",
                currency_rounded_with_tooltip(stats.total_spent, currency),
                VALUE_STYLE,
            ))
            (stat_card(
                "remaining",
                "Remaining",
                currency_rounded_with_tooltip(stats.remaining, currency),
                remaining_style,
            ))
            (stat_card(
                "active-budgets",
                "Active Budgets",
                html! { (stats.active_budgets) },
                VALUE_STYLE,
            ))
        }
    }
}

fn stat_card(id: &str, label: &str, value: Markup, value_style: &str) -> Markup {
    html! {
        div id=(id) class=(CARD_STYLE)
        {
            h3 class=(CARD_LABEL_STYLE) { (label) }
            p class=(value_style) { (value) }
        }
    }
}
