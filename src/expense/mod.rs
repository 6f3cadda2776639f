//! Expenses: dated spending records that each count against one budget.

mod create;
mod db;
mod delete;
mod domain;
mod edit;
pub(crate) mod form;
mod list;

pub use create::{create_expense_endpoint, get_new_expense_page};
pub use db::{
    create_expense, create_expense_table, delete_expense, get_budget_expenses, get_expense,
    get_expenses, update_expense,
};
pub use delete::delete_expense_endpoint;
pub use domain::{Expense, ExpenseFormData, ExpenseId, NewExpense};
pub use edit::{get_edit_expense_page, update_expense_endpoint};
pub use list::{ExpenseSortKey, get_expenses_page};
