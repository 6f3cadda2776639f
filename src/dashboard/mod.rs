//! Dashboard module
//!
//! Provides an overview page with totals across all budgets, charts of
//! spending and the most recent expenses.

mod cards;
mod charts;
mod handlers;
mod recent;

pub use handlers::get_dashboard_page;
