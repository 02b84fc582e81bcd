//! Database operations for contributions.
//!
//! Contributions are always loaded together with their goal and owner. Queries are scoped to
//! the owner and skip soft-deleted contributions as well as contributions to deleted goals.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    contribution::{Amount, Contribution, ContributionId},
    goal::{GoalId, GoalStatus, map_goal_columns},
    user::UserID,
};

const SELECT_CONTRIBUTION: &str = "SELECT c.id, c.value, c.status, c.created_at, c.updated_at, \
    g.id, g.name, g.accumulated_value, g.target_value, g.status, g.created_at, g.updated_at, \
    u.id, u.name, u.exp \
    FROM contribution c \
    INNER JOIN goal g ON g.id = c.goal_id \
    INNER JOIN user u ON u.id = g.user_id";

/// Initialize the contribution table and indexes.
pub fn create_contribution_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS contribution (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            goal_id INTEGER NOT NULL,
            value INTEGER NOT NULL CHECK (value > 0),
            status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'reached')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(goal_id) REFERENCES goal(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_contribution_user_id ON contribution(user_id);
        CREATE INDEX IF NOT EXISTS idx_contribution_goal_id ON contribution(goal_id);",
    )?;

    Ok(())
}

/// Insert a contribution row and return its ID.
///
/// The caller is responsible for applying `amount` to the goal.
pub fn insert_contribution(
    owner: UserID,
    goal_id: GoalId,
    amount: Amount,
    status: GoalStatus,
    connection: &Connection,
) -> Result<ContributionId, Error> {
    let now = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO contribution (user_id, goal_id, value, status, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
        (owner.as_i64(), goal_id, amount.as_i64(), status, now),
    )?;

    Ok(connection.last_insert_rowid())
}

/// Retrieve a contribution made by `owner`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the contribution does not exist, was deleted, belongs to a deleted
/// goal, or was made by another user.
pub fn get_contribution(
    contribution_id: ContributionId,
    owner: UserID,
    connection: &Connection,
) -> Result<Contribution, Error> {
    connection
        .prepare(&format!(
            "{SELECT_CONTRIBUTION} WHERE c.id = ?1 AND c.user_id = ?2 \
            AND c.deleted_at IS NULL AND g.deleted_at IS NULL"
        ))?
        .query_row((contribution_id, owner.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve all contributions made by `owner`, oldest first.
pub fn get_contributions(
    owner: UserID,
    connection: &Connection,
) -> Result<Vec<Contribution>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_CONTRIBUTION} WHERE c.user_id = ?1 \
            AND c.deleted_at IS NULL AND g.deleted_at IS NULL ORDER BY c.id ASC"
        ))?
        .query_map([owner.as_i64()], map_row)?
        .map(|maybe_contribution| maybe_contribution.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the contributions `owner` made to a single goal, oldest first.
pub fn get_goal_contributions(
    goal_id: GoalId,
    owner: UserID,
    connection: &Connection,
) -> Result<Vec<Contribution>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_CONTRIBUTION} WHERE c.goal_id = ?1 AND c.user_id = ?2 \
            AND c.deleted_at IS NULL AND g.deleted_at IS NULL ORDER BY c.id ASC"
        ))?
        .query_map((goal_id, owner.as_i64()), map_row)?
        .map(|maybe_contribution| maybe_contribution.map_err(|error| error.into()))
        .collect()
}

/// Sum the values of a goal's live contributions.
pub fn sum_goal_contributions(goal_id: GoalId, connection: &Connection) -> Result<i64, Error> {
    connection
        .query_row(
            "SELECT COALESCE(SUM(value), 0) FROM contribution \
            WHERE goal_id = ?1 AND deleted_at IS NULL",
            [goal_id],
            |row| row.get(0),
        )
        .map_err(|error| error.into())
}

/// Change the amount and status snapshot of a contribution.
///
/// # Errors
///
/// Returns [Error::NotFound] if no live contribution with this ID belongs to `owner`.
pub fn update_contribution(
    contribution_id: ContributionId,
    owner: UserID,
    amount: Amount,
    status: GoalStatus,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE contribution SET value = ?1, status = ?2, updated_at = ?3
        WHERE id = ?4 AND user_id = ?5 AND deleted_at IS NULL",
        (
            amount.as_i64(),
            status,
            OffsetDateTime::now_utc(),
            contribution_id,
            owner.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Mark a contribution as deleted. The row is kept but no longer returned by any query.
///
/// # Errors
///
/// Returns [Error::NotFound] if no live contribution with this ID belongs to `owner`.
pub fn soft_delete_contribution(
    contribution_id: ContributionId,
    owner: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE contribution SET deleted_at = ?1
        WHERE id = ?2 AND user_id = ?3 AND deleted_at IS NULL",
        (OffsetDateTime::now_utc(), contribution_id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

fn map_row(row: &Row) -> Result<Contribution, rusqlite::Error> {
    let id = row.get(0)?;
    let value = row.get(1)?;
    let status = row.get(2)?;
    let created_at = row.get(3)?;
    let updated_at = row.get(4)?;
    let goal = map_goal_columns(row, 5)?;

    Ok(Contribution {
        id,
        value,
        status,
        owner: goal.owner.clone(),
        goal,
        created_at,
        updated_at,
    })
}
