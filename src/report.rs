//! Aggregation of budgets and expenses into the figures shown to users.
//!
//! Everything here is derived on every read from the flat lists of a user's
//! budgets and expenses. Nothing is stored.
//!
//! Expenses that point at a budget that is not in the given list are left out
//! of every figure. The database cascade means this should not happen, so
//! these expenses are only logged.

use std::collections::HashMap;

use time::Date;

use crate::{
    budget::{Budget, BudgetId},
    expense::Expense,
};

/// What has been spent against a budget and what is left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BudgetSummary {
    pub budget_id: BudgetId,
    /// The budget's limit.
    pub amount: f64,
    /// The sum of the budget's expenses.
    pub total_spent: f64,
    /// `amount - total_spent`, negative when the budget is overspent.
    pub remaining: f64,
    /// `total_spent` as a percentage of `amount`, e.g. 40.0 for 40%.
    pub percentage: f64,
}

impl BudgetSummary {
    fn new(budget: &Budget, total_spent: f64) -> Self {
        Self {
            budget_id: budget.id,
            amount: budget.amount,
            total_spent,
            remaining: budget.amount - total_spent,
            percentage: total_spent / budget.amount * 100.0,
        }
    }
}

/// Summarize a single budget from `expenses`.
///
/// Expenses that belong to other budgets are ignored.
pub fn summarize_budget(budget: &Budget, expenses: &[Expense]) -> BudgetSummary {
    let total_spent = expenses
        .iter()
        .filter(|expense| expense.budget_id == budget.id)
        .map(|expense| expense.amount)
        .sum();

    BudgetSummary::new(budget, total_spent)
}

/// Summarize every budget in `budgets`, in the same order.
pub fn summarize_budgets(budgets: &[Budget], expenses: &[Expense]) -> Vec<BudgetSummary> {
    let totals = total_spent_by_budget(budgets, expenses);

    budgets
        .iter()
        .map(|budget| BudgetSummary::new(budget, totals.get(&budget.id).copied().unwrap_or(0.0)))
        .collect()
}

fn total_spent_by_budget(budgets: &[Budget], expenses: &[Expense]) -> HashMap<BudgetId, f64> {
    let mut totals: HashMap<BudgetId, f64> =
        budgets.iter().map(|budget| (budget.id, 0.0)).collect();
    let mut orphan_count = 0;

    for expense in expenses {
        match totals.get_mut(&expense.budget_id) {
            Some(total) => *total += expense.amount,
            None => orphan_count += 1,
        }
    }

    if orphan_count > 0 {
        tracing::warn!("Excluded {orphan_count} expense(s) with no matching budget");
    }

    totals
}

/// Totals across all of a user's budgets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardStats {
    pub total_budget: f64,
    pub total_spent: f64,
    pub remaining: f64,
    pub active_budgets: usize,
}

/// Add up the budget summaries into the dashboard totals.
pub fn dashboard_stats(summaries: &[BudgetSummary]) -> DashboardStats {
    let total_budget: f64 = summaries.iter().map(|summary| summary.amount).sum();
    let total_spent: f64 = summaries.iter().map(|summary| summary.total_spent).sum();

    DashboardStats {
        total_budget,
        total_spent,
        remaining: total_budget - total_spent,
        active_budgets: summaries.len(),
    }
}

/// The running spend of one budget at the end of a date.
#[derive(Debug, Clone, PartialEq)]
pub struct SpendingPoint {
    pub date: Date,
    pub budget_id: BudgetId,
    /// Spent against the budget up to and including `date`.
    pub cumulative_spent: f64,
    /// The budget's amount minus `cumulative_spent`.
    pub remaining: f64,
}

/// Bucket expenses by date and budget into running totals for charting.
///
/// There is one point per (date, budget) pair with at least one expense on that
/// date. Points are in ascending date order. Within a date, budgets appear in
/// the order their first expense on that date was supplied.
pub fn spending_series(budgets: &[Budget], expenses: &[Expense]) -> Vec<SpendingPoint> {
    let amounts: HashMap<BudgetId, f64> = budgets
        .iter()
        .map(|budget| (budget.id, budget.amount))
        .collect();

    let mut sorted_expenses: Vec<&Expense> = expenses
        .iter()
        .filter(|expense| amounts.contains_key(&expense.budget_id))
        .collect();
    // Stable, so expenses on the same date keep the order they were supplied in.
    sorted_expenses.sort_by_key(|expense| expense.date);

    let mut running_totals: HashMap<BudgetId, f64> = HashMap::new();
    let mut points: Vec<SpendingPoint> = Vec::new();
    // Index into `points` of each budget's point for the current date.
    let mut current_date_points: HashMap<BudgetId, usize> = HashMap::new();
    let mut current_date: Option<Date> = None;

    for expense in sorted_expenses {
        if current_date != Some(expense.date) {
            current_date = Some(expense.date);
            current_date_points.clear();
        }

        let running_total = running_totals.entry(expense.budget_id).or_insert(0.0);
        *running_total += expense.amount;
        let cumulative_spent = *running_total;
        let amount = amounts.get(&expense.budget_id).copied().unwrap_or_default();

        match current_date_points.get(&expense.budget_id) {
            Some(&index) => {
                points[index].cumulative_spent = cumulative_spent;
                points[index].remaining = amount - cumulative_spent;
            }
            None => {
                current_date_points.insert(expense.budget_id, points.len());
                points.push(SpendingPoint {
                    date: expense.date,
                    budget_id: expense.budget_id,
                    cumulative_spent,
                    remaining: amount - cumulative_spent,
                });
            }
        }
    }

    points
}

/// The `count` most recent expenses, newest first.
///
/// Expenses on the same date are ordered by newest ID first.
pub fn recent_expenses(expenses: &[Expense], count: usize) -> Vec<&Expense> {
    let mut recent: Vec<&Expense> = expenses.iter().collect();
    recent.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    recent.truncate(count);

    recent
}

/// Tailwind colour class for a budget's progress bar.
pub fn progress_colour(percentage: f64) -> &'static str {
    if percentage > 80.0 {
        "bg-red-600"
    } else if percentage > 60.0 {
        "bg-orange-500"
    } else if percentage > 30.0 {
        "bg-yellow-400"
    } else {
        "bg-lime-500"
    }
}
