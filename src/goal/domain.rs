//! Core savings goal domain types.

use std::fmt::Display;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{Error, user::User};

/// Database identifier for a savings goal.
pub type GoalId = i64;

/// A validated, non-empty goal name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct GoalName(String);

impl GoalName {
    /// Create a goal name.
    ///
    /// # Errors
    ///
    /// This function will return an [Error::EmptyGoalName] if `name` is an empty string.
    pub fn new(name: &str) -> Result<Self, Error> {
        let name = name.trim();

        if name.is_empty() {
            Err(Error::EmptyGoalName)
        } else {
            Ok(Self(name.to_string()))
        }
    }

    /// Create a goal name without validation.
    ///
    /// The caller should ensure that the string is not empty.
    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl AsRef<str> for GoalName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for GoalName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The amount a goal is saving towards. Always positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetValue(i64);

impl TargetValue {
    /// Create a target value.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidTarget] if `value` is zero or negative.
    pub fn new(value: i64) -> Result<Self, Error> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidTarget(value))
        }
    }

    /// The target as a plain integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// Whether a goal's target has been met as of the last evaluated mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    /// The accumulated value is below the target.
    Pending,
    /// The target was met and the owner holds the bonus for it.
    Reached,
}

impl GoalStatus {
    fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Pending => "pending",
            GoalStatus::Reached => "reached",
        }
    }
}

impl ToSql for GoalStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for GoalStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value.as_str()? {
            "pending" => Ok(GoalStatus::Pending),
            "reached" => Ok(GoalStatus::Reached),
            other => Err(FromSqlError::Other(
                format!("invalid goal status \"{other}\"").into(),
            )),
        }
    }
}

/// A change of [GoalStatus] caused by a mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    /// `Pending` to `Reached`.
    Reached,
    /// `Reached` to `Pending`.
    Unreached,
}

impl Transition {
    /// The status the goal ends up in.
    pub fn status(&self) -> GoalStatus {
        match self {
            Transition::Reached => GoalStatus::Reached,
            Transition::Unreached => GoalStatus::Pending,
        }
    }
}

/// Decide whether a goal in `status` changes status once its accumulated value is `accumulated`.
///
/// A pending goal is reached as soon as the accumulated value meets the target. A reached goal
/// only falls back once the accumulated value drops strictly below the target (`<`, not `<=`).
/// With `<=`, a reached goal sitting exactly on its target would fall back on a no-op edit and
/// be reached again on the next one, paying and revoking the bonus each time.
pub fn evaluate_threshold(
    status: GoalStatus,
    accumulated: i64,
    target: TargetValue,
) -> Option<Transition> {
    match status {
        GoalStatus::Pending if accumulated >= target.as_i64() => Some(Transition::Reached),
        GoalStatus::Reached if accumulated < target.as_i64() => Some(Transition::Unreached),
        _ => None,
    }
}

/// A savings target with its current progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SavingsGoal {
    /// The ID of the goal.
    pub id: GoalId,
    /// The user the goal belongs to.
    pub owner: User,
    /// What the user is saving for.
    pub name: GoalName,
    /// The sum of all contributions made to the goal.
    pub accumulated_value: i64,
    /// The amount the user is saving towards.
    pub target_value: TargetValue,
    /// Whether the target has been met.
    pub status: GoalStatus,
    /// When the goal was opened.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the goal was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Request body for opening a goal.
///
/// `goal` is the target value and `value` is the amount already saved.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGoalForm {
    /// What the user is saving for.
    pub name: String,
    /// The target value.
    pub goal: i64,
    /// The amount already saved, zero if omitted.
    #[serde(default)]
    pub value: i64,
}

/// Request body for renaming or retargeting a goal.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateGoalForm {
    /// The new name.
    pub name: String,
    /// The new target value.
    pub goal: i64,
}


#[cfg(test)]
mod target_value_tests {
    use crate::{Error, goal::TargetValue};

    #[test]
    fn rejects_zero_and_negative() {
        assert_eq!(TargetValue::new(0), Err(Error::InvalidTarget(0)));
        assert_eq!(TargetValue::new(-5), Err(Error::InvalidTarget(-5)));
    }

    #[test]
    fn accepts_positive() {
        assert_eq!(TargetValue::new(10_000).map(|target| target.as_i64()), Ok(10_000));
    }
}
