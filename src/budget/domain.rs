//! Core budget domain types.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    name::{validate_finite, validate_name},
};

/// Database identifier for a budget.
pub type BudgetId = i64;

/// The fixed set of categories a budget can belong to.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Utilities,
    Shopping,
    PersonalCare,
    Entertainment,
    Transportation,
    Travel,
    Investments,
    Other,
}

impl Category {
    /// Every category in the order they are shown in forms.
    pub const ALL: [Category; 9] = [
        Category::Food,
        Category::Utilities,
        Category::Shopping,
        Category::PersonalCare,
        Category::Entertainment,
        Category::Transportation,
        Category::Travel,
        Category::Investments,
        Category::Other,
    ];

    /// The label stored in the database and shown to users.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Utilities => "Utilities",
            Category::Shopping => "Shopping",
            Category::PersonalCare => "Personal Care",
            Category::Entertainment => "Entertainment",
            Category::Transportation => "Transportation",
            Category::Travel => "Travel",
            Category::Investments => "Investments",
            Category::Other => "Other",
        }
    }

    /// Examples of what belongs in the category.
    pub fn description(&self) -> &'static str {
        match self {
            Category::Food => "Groceries, Restaurants, etc.",
            Category::Utilities => "Electricity, Water, Internet, etc.",
            Category::Shopping => "Clothing, Electronics, etc.",
            Category::PersonalCare => "Health, Beauty, Fitness, etc.",
            Category::Entertainment => "Movies, Events, Subscriptions, etc.",
            Category::Transportation => "Fuel, Public Transport, etc.",
            Category::Travel => "Flights, Hotels, etc.",
            Category::Investments => "Stocks, Savings, etc.",
            Category::Other => "Miscellaneous expenses",
        }
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();

        Category::ALL
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(label))
            .ok_or_else(|| Error::InvalidCategory(label.to_owned()))
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A named spending limit owned by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserID,
    pub name: String,
    /// The spending limit, always greater than zero.
    pub amount: f64,
    pub category: Category,
    pub created_at: OffsetDateTime,
}

/// The validated fields of a budget that users can set.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBudget {
    /// The trimmed name, 1 to 25 characters.
    pub name: String,
    /// The spending limit, greater than zero.
    pub amount: f64,
    /// What the budget is for.
    pub category: Category,
}

impl NewBudget {
    /// Validate the raw values of a budget form.
    ///
    /// # Errors
    ///
    /// Returns the first validation error in the order name, amount, category.
    pub fn new(name: &str, amount: f64, category: &str) -> Result<Self, Error> {
        let name = validate_name(name)?;
        let amount = validate_finite(amount)?;

        if amount <= 0.0 {
            return Err(Error::NonPositiveBudgetAmount);
        }

        let category = category.parse()?;

        Ok(Self {
            name,
            amount,
            category,
        })
    }
}

/// Form data for budget creation and editing.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct BudgetFormData {
    pub name: String,
    pub amount: f64,
    pub category: String,
}
