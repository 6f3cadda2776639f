//! The crate's error type, and how each error is shown to the user as a page or an alert.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{alert::Alert, internal_server_error::InternalServerError, not_found::NotFoundError};

/// Everything that can go wrong in Budget Buddy.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user provided an invalid combination of email and password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request has no auth cookie.
    #[error("the request has no auth cookie")]
    CookieMissing,

    /// zxcvbn rated the password as too easy to guess. Holds its suggestions.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// bcrypt failed. The message is for the server logs only.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The string is not a valid email address.
    #[error("\"{0}\" is not a valid email address")]
    InvalidEmail(String),

    /// The email address is already used by another user.
    #[error("an account with this email address already exists")]
    DuplicateEmail,

    /// A user's full name was too short or too long after trimming whitespace.
    #[error("Full name must be between 2 and 30 characters")]
    InvalidFullName,

    /// An empty string was used to create a budget or expense name.
    #[error("Name cannot be empty")]
    EmptyName,

    /// A budget or expense name was longer than the maximum number of characters.
    #[error("Name must be at most {0} characters")]
    NameTooLong(usize),

    /// A budget was given a limit of zero or less.
    #[error("Amount must be greater than zero")]
    NonPositiveBudgetAmount,

    /// An expense was given a negative amount.
    #[error("Amount cannot be negative")]
    NegativeExpenseAmount,

    /// An amount was NaN or infinite.
    #[error("Amount must be a valid number")]
    InvalidAmount,

    /// The category label does not match any of the budget categories.
    #[error("\"{0}\" is not a valid category")]
    InvalidCategory(String),

    /// The currency code does not match any of the supported currencies.
    #[error("\"{0}\" is not a supported currency")]
    InvalidCurrency(String),

    /// Creating or updating an expense would take its budget below zero.
    #[error("Amount cannot exceed remaining budget")]
    ExceedsRemainingBudget,

    /// The user tried to modify a budget or expense that belongs to another user.
    ///
    /// The string describes the attempted action, e.g. "delete this budget".
    #[error("You are not allowed to {0}")]
    NotOwned(&'static str),

    /// No row matched the query, e.g. a budget ID that does not exist.
    #[error("the requested item could not be found")]
    NotFound,

    /// Any other SQLite error.
    #[error("unexpected SQLite error: {0}")]
    SqlError(rusqlite::Error),

    /// The server's timezone name is not a canonical timezone.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// The auth token could not be written as JSON.
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// The database mutex was poisoned by a panicking request.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    #[error("tried to update a budget that is not in the database")]
    UpdateMissingBudget,

    #[error("tried to delete a budget that is not in the database")]
    DeleteMissingBudget,

    #[error("tried to update an expense that is not in the database")]
    UpdateMissingExpense,

    #[error("tried to delete an expense that is not in the database")]
    DeleteMissingExpense,

    #[error("tried to update a user that is not in the database")]
    UpdateMissingUser,
}

impl Error {
    /// Whether the error was caused by invalid user input, and should be shown
    /// next to the form field rather than as an alert.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Error::TooWeak(_)
                | Error::InvalidEmail(_)
                | Error::DuplicateEmail
                | Error::InvalidFullName
                | Error::EmptyName
                | Error::NameTooLong(_)
                | Error::NonPositiveBudgetAmount
                | Error::NegativeExpenseAmount
                | Error::InvalidAmount
                | Error::InvalidCategory(_)
                | Error::InvalidCurrency(_)
                | Error::ExceedsRemainingBudget
        )
    }
}

/// SQLite's extended result code for a failed UNIQUE constraint.
const SQLITE_CONSTRAINT_UNIQUE: i32 = 2067;

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            rusqlite::Error::SqliteFailure(ref failure, Some(ref message))
                if failure.extended_code == SQLITE_CONSTRAINT_UNIQUE
                    && message.ends_with("user.email") =>
            {
                Error::DuplicateEmail
            }
            error => {
                tracing::error!("Unhandled SQLite error: {error}");
                Error::SqlError(error)
            }
        }
    }
}

fn invalid_timezone_fix(timezone: &str) -> String {
    format!(
        "\"{timezone}\" is not a timezone the server understands. Restart the server with a \
        canonical timezone name such as \"Pacific/Auckland\"."
    )
}

/// Full page responses, for handlers that render pages.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => NotFoundError.into_response(),
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &invalid_timezone_fix(&timezone),
            }
            .into_response(),
            Error::DatabaseLockError => InternalServerError::default().into_response(),
            error => {
                tracing::error!("Unexpected error while rendering a page: {error}");
                InternalServerError::default().into_response()
            }
        }
    }
}

fn error_alert(message: &str, details: impl Into<String>) -> Alert {
    Alert::Error {
        message: message.to_owned(),
        details: details.into(),
    }
}

impl Error {
    /// The status code and alert for an HTMX request that failed with this error.
    fn alert(self) -> (StatusCode, Alert) {
        match self {
            Error::InvalidTimezoneError(timezone) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_alert("Invalid Timezone Settings", invalid_timezone_fix(&timezone)),
            ),
            error @ Error::NotOwned(_) => (
                StatusCode::FORBIDDEN,
                Alert::ErrorSimple {
                    message: error.to_string(),
                },
            ),
            Error::UpdateMissingBudget => (
                StatusCode::NOT_FOUND,
                error_alert("Could not update budget", "The budget could not be found."),
            ),
            Error::DeleteMissingBudget => (
                StatusCode::NOT_FOUND,
                error_alert(
                    "Budget could not be deleted",
                    "The budget could not be found. Refresh the page, it may already be gone.",
                ),
            ),
            Error::UpdateMissingExpense => (
                StatusCode::NOT_FOUND,
                error_alert("Could not update expense", "The expense could not be found."),
            ),
            Error::DeleteMissingExpense => (
                StatusCode::NOT_FOUND,
                error_alert(
                    "Expense could not be deleted",
                    "The expense could not be found. Refresh the page, it may already be gone.",
                ),
            ),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                error_alert("Not found", "The requested item could not be found."),
            ),
            error if error.is_validation_error() => (
                StatusCode::BAD_REQUEST,
                error_alert("Invalid input", error.to_string()),
            ),
            error => {
                tracing::error!("Unexpected error while handling a request: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_alert(
                        "Something went wrong",
                        "An unexpected error occurred, check the server logs for more details.",
                    ),
                )
            }
        }
    }

    /// An alert fragment for HTMX to swap into the page's alert container.
    pub fn into_alert_response(self) -> Response {
        let (status_code, alert) = self.alert();

        (status_code, alert.into_html()).into_response()
    }
}
