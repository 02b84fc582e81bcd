//! Core contribution domain types.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    goal::{GoalId, GoalStatus, SavingsGoal},
    user::User,
};

/// Database identifier for a contribution.
pub type ContributionId = i64;

/// A positive amount of money added to a goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amount(i64);

impl Amount {
    /// Create an amount.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidAmount] if `value` is zero or negative.
    pub fn new(value: i64) -> Result<Self, Error> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidAmount(value))
        }
    }

    /// The amount as a plain integer.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

/// An amount added to a savings goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Contribution {
    /// The ID of the contribution.
    pub id: ContributionId,
    /// The amount added to the goal.
    pub value: i64,
    /// The goal's status right after this contribution was last applied.
    ///
    /// This is a snapshot, the goal's own status is authoritative.
    pub status: GoalStatus,
    /// The goal the contribution was made to.
    pub goal: SavingsGoal,
    /// The user who made the contribution.
    pub owner: User,
    /// When the contribution was made.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the contribution was last changed.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Request body for contributing to a goal.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateContributionForm {
    /// The goal to contribute to.
    pub saving_id: GoalId,
    /// The amount to add.
    pub value: i64,
}

/// Request body for changing the amount of a contribution.
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateContributionForm {
    /// The new amount.
    pub value: i64,
}
