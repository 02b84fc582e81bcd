//! Code for creating the user table and fetching users from the database.

use std::fmt::Display;

use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, identity::TokenHash};

/// A newtype wrapper for integer user IDs.
///
/// This helps disambiguate user IDs from other types of IDs, leading to better compile time
/// errors, and more flexible generics that can have distinct implementations for multiple ID types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    /// Create a new user ID.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Cast the user ID to a 64 bit integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A validated, non-empty display name for a user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    /// Create a user name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyUserName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyUserName)
        } else {
            Ok(Self(name.to_owned()))
        }
    }

    /// Create a user name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for UserName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user of the application.
///
/// The credential hash is deliberately left out so that it never ends up in a response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    /// The user's ID in the application database.
    pub id: UserID,
    /// The name shown for the user.
    pub name: String,
    /// The gamification score earned by reaching savings goals.
    pub exp: i64,
}

/// Create the user table.
///
/// # Errors
///
/// This function will return an error if the SQL query failed.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                token_hash TEXT NOT NULL UNIQUE,
                exp INTEGER NOT NULL DEFAULT 0
                )",
        (),
    )?;

    Ok(())
}

/// Create and insert a new user into the database.
///
/// New users start with zero exp.
///
/// # Errors
///
/// Returns a [Error::StorageFailure] if an SQL related error occurred, e.g. the token hash is
/// already taken.
pub fn create_user(
    name: UserName,
    token_hash: &TokenHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (name, token_hash, exp) VALUES (?1, ?2, 0)",
        (name.as_ref(), token_hash.as_ref()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        name: name.to_string(),
        exp: 0,
    })
}

/// Get the user from the database with an ID equal to `user_id`.
///
/// # Errors
///
/// This function will return an error if:
/// - `user_id` does not belong to a registered user.
/// - there was an error trying to access the store.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, exp FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_row_to_user)
        .map_err(|error| error.into())
}

/// Get the user whose stored credential hash equals `token_hash`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user holds the hash.
pub fn get_user_by_token_hash(
    token_hash: &TokenHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .prepare("SELECT id, name, exp FROM user WHERE token_hash = :token_hash")?
        .query_row(&[(":token_hash", &token_hash.as_ref())], map_row_to_user)
        .map_err(|error| error.into())
}

/// Replace the credential hash for a user, invalidating their previous token.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not refer to a user.
pub fn set_user_token_hash(
    user_id: UserID,
    token_hash: &TokenHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET token_hash = ?1 WHERE id = ?2",
        (token_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Get the number of users in the database.
///
/// # Errors
///
/// Returns a [Error::StorageFailure] if an SQL related error occurred.
pub fn count_users(connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM user;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

/// Map a row of `id, name, exp` starting at column `offset` to a [User].
pub(crate) fn map_user_columns(row: &Row, offset: usize) -> Result<User, rusqlite::Error> {
    let raw_id = row.get(offset)?;
    let name = row.get(offset + 1)?;
    let exp = row.get(offset + 2)?;

    Ok(User {
        id: UserID::new(raw_id),
        name,
        exp,
    })
}

fn map_row_to_user(row: &Row) -> Result<User, rusqlite::Error> {
    map_user_columns(row, 0)
}
