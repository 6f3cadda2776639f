//! Route paths for pages (`*_VIEW`) and the HTMX endpoints under `/api`.
//!
//! Paths with an ID parameter, e.g. `/budgets/{budget_id}`, are filled in with
//! [format_endpoint].

/// Redirects to the dashboard, via the log-in page if needed.
pub const ROOT: &str = "/";
/// Charts and totals across all of a user's budgets.
pub const DASHBOARD_VIEW: &str = "/dashboard";
/// The page listing a user's budgets.
pub const BUDGETS_VIEW: &str = "/budgets";
/// The page for creating a new budget.
pub const NEW_BUDGET_VIEW: &str = "/budgets/new";
/// The page showing a single budget and its expenses.
pub const BUDGET_VIEW: &str = "/budgets/{budget_id}";
/// The page for editing an existing budget.
pub const EDIT_BUDGET_VIEW: &str = "/budgets/{budget_id}/edit";
/// The page listing a user's expenses.
pub const EXPENSES_VIEW: &str = "/expenses";
/// The page for creating a new expense.
pub const NEW_EXPENSE_VIEW: &str = "/expenses/new";
/// The page for editing an existing expense.
pub const EDIT_EXPENSE_VIEW: &str = "/expenses/{expense_id}/edit";
/// The page for changing the user's profile and preferences.
pub const SETTINGS_VIEW: &str = "/settings";
pub const REGISTER_VIEW: &str = "/register";
pub const LOG_IN_VIEW: &str = "/log_in";
/// Explains how an admin can reset a forgotten password.
pub const FORGOT_PASSWORD_VIEW: &str = "/forgot_password";
/// The 500 page.
pub const INTERNAL_ERROR_VIEW: &str = "/error";
/// Stylesheets, scripts and images.
pub const STATIC: &str = "/static";

pub const LOG_IN_API: &str = "/api/log_in";
pub const LOG_OUT: &str = "/api/log_out";
/// Creates a user from the registration form.
pub const USERS: &str = "/api/users";
/// Create a budget.
pub const POST_BUDGET: &str = "/api/budgets";
/// Update a budget.
pub const PUT_BUDGET: &str = "/api/budgets/{budget_id}";
/// Delete a budget.
pub const DELETE_BUDGET: &str = "/api/budgets/{budget_id}";
/// Create an expense.
pub const POST_EXPENSE: &str = "/api/expenses";
/// Update an expense.
pub const PUT_EXPENSE: &str = "/api/expenses/{expense_id}";
/// Delete an expense.
pub const DELETE_EXPENSE: &str = "/api/expenses/{expense_id}";
/// Update the user's full name and email.
pub const PUT_PROFILE: &str = "/api/settings/profile";
/// Update the user's preferred currency.
pub const PUT_CURRENCY: &str = "/api/settings/currency";

/// Fill in the `{...}` parameter of `endpoint_path` with `id`, e.g.
/// `/budgets/{budget_id}/edit` becomes `/budgets/3/edit`.
///
/// Paths have at most one parameter. A path without one is returned unchanged.
pub fn format_endpoint(endpoint_path: &str, id: i64) -> String {
    let Some((prefix, rest)) = endpoint_path.split_once('{') else {
        return endpoint_path.to_owned();
    };
    let suffix = rest.split_once('}').map_or("", |(_, suffix)| suffix);

    format!("{prefix}{id}{suffix}")
}
