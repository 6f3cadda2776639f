//! The recent expenses feed on the dashboard.

use std::collections::HashMap;

use maud::{Markup, html};

use crate::{
    budget::{Budget, BudgetId},
    currency::{Currency, format_currency},
    endpoints,
    expense::Expense,
    html::{LINK_STYLE, TABLE_CELL_STYLE, TABLE_HEADER_STYLE, TABLE_ROW_STYLE},
};

/// Renders `expenses` as a table with the name of the budget each belongs to.
///
/// Expenses whose budget is not in `budgets` are skipped.
pub(super) fn recent_expenses_view(
    expenses: &[&Expense],
    budgets: &[Budget],
    currency: &Currency,
) -> Markup {
    let budget_names: HashMap<BudgetId, &str> = budgets
        .iter()
        .map(|budget| (budget.id, budget.name.as_str()))
        .collect();

    html! {
        section id="recent-expenses" class="w-full mx-auto mb-8"
        {
            div class="flex justify-between items-baseline mb-4"
            {
                h3 class="text-xl font-semibold" { "Recent Expenses" }
                a href=(endpoints::EXPENSES_VIEW) class=(LINK_STYLE) { "View all" }
            }

            @if expenses.is_empty() {
                p class="text-gray-600 dark:text-gray-400"
                {
                    "No expenses yet. "
                    a href=(endpoints::NEW_EXPENSE_VIEW) class=(LINK_STYLE) { "Add an expense" }
                    " to see it here."
                }
            } @else {
                div class="overflow-x-auto rounded-lg"
                {
                    table class="w-full text-sm text-left rtl:text-right text-gray-500 dark:text-gray-400"
                    {
                        thead class=(TABLE_HEADER_STYLE)
                        {
                            tr
                            {
                                th scope="col" class=(TABLE_CELL_STYLE) { "Name" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Budget" }
                                th scope="col" class=(TABLE_CELL_STYLE) { "Date" }
                                th scope="col" class="px-6 py-4 text-right" { "Amount" }
                            }
                        }

                        tbody
                        {
                            @for expense in expenses {
                                @if let Some(budget_name) = budget_name(expense, &budget_names) {
                                    tr class=(TABLE_ROW_STYLE)
                                    {
                                        td class=(TABLE_CELL_STYLE) { (expense.name) }
                                        td class=(TABLE_CELL_STYLE)
                                        {
                                            a
                                                href=(endpoints::format_endpoint(endpoints::BUDGET_VIEW, expense.budget_id))
                                                class=(LINK_STYLE)
                                            {
                                                (budget_name)
                                            }
                                        }
                                        td class=(TABLE_CELL_STYLE) { (expense.date) }
                                        td class="px-6 py-4 text-right"
                                        {
                                            (format_currency(expense.amount, currency))
                                        }
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn budget_name<'a>(
    expense: &Expense,
    budget_names: &HashMap<BudgetId, &'a str>,
) -> Option<&'a str> {
    let name = budget_names.get(&expense.budget_id).copied();

    if name.is_none() {
        tracing::warn!(
            "Expense {} points at missing budget {}",
            expense.id,
            expense.budget_id
        );
    }

    name
}
