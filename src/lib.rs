//! A savings tracker for personal finances.
//!
//! Users open savings goals with a target value and make contributions towards them. Every
//! contribution, edit or deletion updates the goal's accumulated value and re-checks it against
//! the target. Crossing the target awards the user exp and falling back below it takes the exp
//! away again.
//!
//! This library provides the ledger and goal operations along with a JSON REST API that exposes
//! them to clients authenticating with a bearer API token.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

mod app_state;
pub mod contribution;
mod current_user;
mod db;
pub mod endpoints;
pub mod extract;
pub mod goal;
pub mod identity;
mod logging;
pub mod reward;
mod routing;
pub mod user;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use db::initialize as initialize_db;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl+c: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install the terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The credential was missing, malformed or did not belong to any user.
    #[error("missing or invalid API token")]
    Unauthorized,

    /// The requested resource was not found.
    ///
    /// Resources that were deleted or that belong to another user are reported the same way, so
    /// clients cannot discover other users' data.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    StorageFailure(rusqlite::Error),

    /// Could not acquire the database lock
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An empty string was used to create a goal name.
    #[error("goal name cannot be empty")]
    EmptyGoalName,

    /// An empty string was used to create a user name.
    #[error("user name cannot be empty")]
    EmptyUserName,

    /// A contribution amount was zero or negative.
    #[error("{0} is not a valid amount, amounts must be greater than zero")]
    InvalidAmount(i64),

    /// A goal's target value was zero or negative.
    #[error("{0} is not a valid target, targets must be greater than zero")]
    InvalidTarget(i64),

    /// A goal was opened with a negative amount already saved.
    #[error("{0} is not a valid initial value, it cannot be negative")]
    InvalidInitialValue(i64),

    /// Applying a change would overflow the goal's accumulated value.
    #[error("the accumulated value would be too large")]
    AmountOverflow,

    /// The request body or path could not be parsed.
    #[error("{0}")]
    InvalidRequest(String),
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::InvalidRequest(rejection.body_text())
    }
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::StorageFailure(error)
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::EmptyGoalName
            | Error::EmptyUserName
            | Error::InvalidAmount(_)
            | Error::InvalidTarget(_)
            | Error::InvalidInitialValue(_)
            | Error::AmountOverflow
            | Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Error::StorageFailure(_) | Error::DatabaseLockError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            // Any internal errors are not intended to be shown to the client.
            tracing::error!("An unexpected error occurred: {}", self);
            "an unexpected error occurred, check the server logs for more details".to_owned()
        } else {
            self.to_string()
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
