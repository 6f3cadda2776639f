//! Core expense domain types.

use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::UserID,
    budget::BudgetId,
    name::{validate_finite, validate_name},
};

/// Database identifier for an expense.
pub type ExpenseId = i64;

/// A single dated spending record attached to exactly one budget.
#[derive(Debug, Clone, PartialEq)]
pub struct Expense {
    pub id: ExpenseId,
    pub user_id: UserID,
    pub budget_id: BudgetId,
    pub name: String,
    /// The amount spent, never negative.
    pub amount: f64,
    pub date: Date,
    pub created_at: OffsetDateTime,
}

/// The validated fields of an expense that users can set.
#[derive(Debug, Clone, PartialEq)]
pub struct NewExpense {
    /// The trimmed name, 1 to 25 characters.
    pub name: String,
    /// The amount spent, zero or more.
    pub amount: f64,
    /// When the money was spent.
    pub date: Date,
    /// The budget the expense counts against.
    pub budget_id: BudgetId,
}

impl NewExpense {
    /// Validate the raw values of an expense form.
    ///
    /// # Errors
    ///
    /// Returns [Error::EmptyName], [Error::NameTooLong], [Error::InvalidAmount]
    /// or [Error::NegativeExpenseAmount].
    pub fn new(name: &str, amount: f64, date: Date, budget_id: BudgetId) -> Result<Self, Error> {
        let name = validate_name(name)?;
        let amount = validate_finite(amount)?;

        if amount < 0.0 {
            return Err(Error::NegativeExpenseAmount);
        }

        Ok(Self {
            name,
            amount,
            date,
            budget_id,
        })
    }
}

/// Form data for expense creation and editing.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExpenseFormData {
    pub name: String,
    pub amount: f64,
    pub date: Date,
    pub budget_id: BudgetId,
    /// Whether the form was shown for a single budget rather than with a
    /// budget select.
    #[serde(default)]
    pub budget_fixed: bool,
}
