//! Budget Buddy is a web app for setting budgets and tracking what you spend against them.
//!
//! The server renders HTML on the server with maud and uses HTMX for forms,
//! so every route returns either a full page or a fragment of one.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod alert;
mod app_state;
mod auth;
mod budget;
mod currency;
mod dashboard;
mod db;
mod endpoints;
mod error;
mod expense;
mod html;
mod internal_server_error;
mod list_query;
mod logging;
mod name;
mod navigation;
mod not_found;
mod pagination;
mod report;
mod routing;
mod settings;
#[cfg(test)]
mod test_utils;
mod timezone;

pub use app_state::AppState;
pub use auth::{
    PasswordHash, User, UserID, ValidatedPassword, create_user, get_user_by_email,
    get_user_by_id, update_password,
};
pub use budget::{Category, NewBudget, create_budget};
pub use db::initialize as initialize_db;
pub use error::Error;
pub use expense::{NewExpense, create_expense};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use routing::build_router;
pub use timezone::get_local_offset;

/// Wait for ctrl+c or, on Unix, SIGTERM, then give in-flight requests one
/// second to finish before the server behind `handle` shuts down.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::debug!("Received ctrl+c."),
            Err(error) => {
                tracing::error!("Could not listen for ctrl+c: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(sigterm) => sigterm,
            Err(error) => {
                tracing::error!("Could not listen for SIGTERM: {error}");
                return std::future::pending::<()>().await;
            }
        };

        sigterm.recv().await;
        tracing::debug!("Received SIGTERM.");
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutting down.");
    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}
