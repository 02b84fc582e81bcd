//! The exp bonus granted to a user when one of their savings goals is reached.

use rusqlite::Connection;

use crate::{Error, goal::Transition, user::UserID};

/// The exp granted when a goal is reached, and taken back when it falls below its target again.
pub const EXP_BONUS: i64 = 10;

/// The signed exp change for a goal status transition.
pub fn exp_delta(transition: Transition) -> i64 {
    match transition {
        Transition::Reached => EXP_BONUS,
        Transition::Unreached => -EXP_BONUS,
    }
}

/// Apply the exp change for `transition` to the user `user_id` and return their new exp.
///
/// The update is a single statement so concurrent callers cannot lose each other's changes.
/// Exp never drops below zero.
///
/// # Errors
///
/// Returns [Error::NotFound] if `user_id` does not refer to a user, or [Error::StorageFailure]
/// for any other SQL error.
pub fn apply_transition_reward(
    user_id: UserID,
    transition: Transition,
    connection: &Connection,
) -> Result<i64, Error> {
    let delta = exp_delta(transition);

    let exp = connection
        .prepare("UPDATE user SET exp = MAX(exp + ?1, 0) WHERE id = ?2 RETURNING exp")?
        .query_row((delta, user_id.as_i64()), |row| row.get(0))?;

    tracing::debug!("user {user_id} exp changed by {delta} to {exp}");

    Ok(exp)
}
