//! Database operations for savings goals.
//!
//! Every query is scoped to the goal's owner and skips soft-deleted rows.

use rusqlite::{Connection, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    goal::{GoalId, GoalName, GoalStatus, SavingsGoal, TargetValue},
    user::{UserID, map_user_columns},
};

const SELECT_GOAL: &str = "SELECT g.id, g.name, g.accumulated_value, g.target_value, g.status, \
    g.created_at, g.updated_at, u.id, u.name, u.exp \
    FROM goal g INNER JOIN user u ON u.id = g.user_id";

/// Initialize the goal table and indexes.
pub fn create_goal_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS goal (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            accumulated_value INTEGER NOT NULL DEFAULT 0,
            target_value INTEGER NOT NULL CHECK (target_value > 0),
            status TEXT NOT NULL DEFAULT 'pending' CHECK (status IN ('pending', 'reached')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            deleted_at TEXT,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_goal_user_id ON goal(user_id);",
    )?;

    Ok(())
}

/// Insert a pending goal with nothing saved yet and return its ID.
pub fn insert_goal(
    owner: UserID,
    name: &GoalName,
    target: TargetValue,
    connection: &Connection,
) -> Result<GoalId, Error> {
    let now = OffsetDateTime::now_utc();

    connection.execute(
        "INSERT INTO goal
            (user_id, name, accumulated_value, target_value, status, created_at, updated_at)
        VALUES (?1, ?2, 0, ?3, ?4, ?5, ?5)",
        (
            owner.as_i64(),
            name.as_ref(),
            target.as_i64(),
            GoalStatus::Pending,
            now,
        ),
    )?;

    Ok(connection.last_insert_rowid())
}

/// Retrieve a goal owned by `owner`.
///
/// # Errors
///
/// Returns [Error::NotFound] if the goal does not exist, was deleted, or belongs to another user.
pub fn get_goal(
    goal_id: GoalId,
    owner: UserID,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    connection
        .prepare(&format!(
            "{SELECT_GOAL} WHERE g.id = ?1 AND g.user_id = ?2 AND g.deleted_at IS NULL"
        ))?
        .query_row((goal_id, owner.as_i64()), map_row)
        .map_err(|error| error.into())
}

/// Retrieve all of `owner`'s goals, oldest first.
pub fn get_goals(owner: UserID, connection: &Connection) -> Result<Vec<SavingsGoal>, Error> {
    connection
        .prepare(&format!(
            "{SELECT_GOAL} WHERE g.user_id = ?1 AND g.deleted_at IS NULL ORDER BY g.id ASC"
        ))?
        .query_map([owner.as_i64()], map_row)?
        .map(|maybe_goal| maybe_goal.map_err(|error| error.into()))
        .collect()
}

/// Change a goal's name and target.
///
/// # Errors
///
/// Returns [Error::NotFound] if no live goal with this ID belongs to `owner`.
pub fn update_goal_details(
    goal_id: GoalId,
    owner: UserID,
    name: &GoalName,
    target: TargetValue,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE goal SET name = ?1, target_value = ?2, updated_at = ?3
        WHERE id = ?4 AND user_id = ?5 AND deleted_at IS NULL",
        (
            name.as_ref(),
            target.as_i64(),
            OffsetDateTime::now_utc(),
            goal_id,
            owner.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Set the status of a goal.
pub fn set_goal_status(
    goal_id: GoalId,
    status: GoalStatus,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE goal SET status = ?1, updated_at = ?2 WHERE id = ?3 AND deleted_at IS NULL",
        (status, OffsetDateTime::now_utc(), goal_id),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Add `delta` to a goal's accumulated value and return the new total.
///
/// The addition happens in a single statement, so it cannot lose a concurrent update.
///
/// # Errors
///
/// Returns [Error::NotFound] if the goal does not exist or was deleted.
pub fn adjust_accumulated_value(
    goal_id: GoalId,
    delta: i64,
    connection: &Connection,
) -> Result<i64, Error> {
    connection
        .prepare(
            "UPDATE goal SET accumulated_value = accumulated_value + ?1, updated_at = ?2
            WHERE id = ?3 AND deleted_at IS NULL
            RETURNING accumulated_value",
        )?
        .query_row((delta, OffsetDateTime::now_utc(), goal_id), |row| row.get(0))
        .map_err(|error| error.into())
}

/// Soft delete a goal and every contribution made to it.
///
/// # Errors
///
/// Returns [Error::NotFound] if no live goal with this ID belongs to `owner`.
pub fn soft_delete_goal(
    goal_id: GoalId,
    owner: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let now = OffsetDateTime::now_utc();

    let rows_affected = connection.execute(
        "UPDATE goal SET deleted_at = ?1 WHERE id = ?2 AND user_id = ?3 AND deleted_at IS NULL",
        (now, goal_id, owner.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    connection.execute(
        "UPDATE contribution SET deleted_at = ?1 WHERE goal_id = ?2 AND deleted_at IS NULL",
        (now, goal_id),
    )?;

    Ok(())
}

/// Map a row of goal columns followed by owner columns, starting at column `offset`.
pub(crate) fn map_goal_columns(row: &Row, offset: usize) -> Result<SavingsGoal, rusqlite::Error> {
    let id = row.get(offset)?;
    let raw_name: String = row.get(offset + 1)?;
    let accumulated_value = row.get(offset + 2)?;
    let raw_target: i64 = row.get(offset + 3)?;
    let status = row.get(offset + 4)?;
    let created_at = row.get(offset + 5)?;
    let updated_at = row.get(offset + 6)?;
    let owner = map_user_columns(row, offset + 7)?;

    let target_value = TargetValue::new(raw_target).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            offset + 3,
            rusqlite::types::Type::Integer,
            Box::new(error),
        )
    })?;

    Ok(SavingsGoal {
        id,
        owner,
        name: GoalName::new_unchecked(&raw_name),
        accumulated_value,
        target_value,
        status,
        created_at,
        updated_at,
    })
}

fn map_row(row: &Row) -> Result<SavingsGoal, rusqlite::Error> {
    map_goal_columns(row, 0)
}
