//! Creating the application's tables and opening write transactions.

use std::sync::{Mutex, MutexGuard};

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    Error, contribution::create_contribution_table, goal::create_goal_table,
    user::create_user_table,
};

/// Create the tables for the domain models if they do not exist yet.
///
/// # Errors
/// Returns an [Error::StorageFailure] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.pragma_update(None, "foreign_keys", "ON")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_goal_table(&transaction)?;
    create_contribution_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Start a transaction that takes the database write lock immediately.
///
/// Reads made inside the transaction therefore see the latest committed state and no other
/// writer can change it before the transaction ends. The transaction rolls back when dropped
/// without calling `commit`.
///
/// We only have a `&Connection` from the mutex guard, hence the unchecked constructor. Callers
/// must not nest these transactions.
pub(crate) fn begin_write_transaction(
    connection: &Connection,
) -> Result<Transaction<'_>, rusqlite::Error> {
    Transaction::new_unchecked(connection, TransactionBehavior::Immediate)
}

/// Lock the shared connection, logging the failure if the mutex is poisoned.
pub(crate) fn lock_connection(
    connection: &Mutex<Connection>,
) -> Result<MutexGuard<'_, Connection>, Error> {
    connection.lock().map_err(|error| {
        tracing::error!("could not acquire database lock: {error}");
        Error::DatabaseLockError
    })
}
