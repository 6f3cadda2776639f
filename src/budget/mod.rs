//! Budgets: named spending limits that expenses are recorded against.

mod create;
mod db;
mod delete;
mod detail;
mod domain;
mod edit;
mod form;
mod list;

pub use create::{create_budget_endpoint, get_new_budget_page};
pub(crate) use db::check_budget_owner;
pub use db::{
    create_budget, create_budget_table, delete_budget, get_budget, get_budgets, update_budget,
};
pub use delete::delete_budget_endpoint;
pub use detail::get_budget_page;
pub use domain::{Budget, BudgetFormData, BudgetId, Category, NewBudget};
pub use edit::{get_edit_budget_page, update_budget_endpoint};
pub use list::{BudgetSortKey, get_budgets_page};
