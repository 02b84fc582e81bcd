//! The contribution ledger.
//!
//! Every change to a contribution is applied to its goal's accumulated value, after which the
//! goal's status is re-evaluated against its target. A status change moves the owner's exp by
//! [EXP_BONUS](crate::reward::EXP_BONUS) in the same transaction, so the bonus is granted once
//! per crossing and taken back once per fall below the target.
//!
//! Each operation resolves the caller's identity before touching the store and then runs inside
//! a single write transaction.

use rusqlite::Connection;

use crate::{
    Error,
    contribution::{
        Amount, Contribution, ContributionId, get_contribution, insert_contribution,
        soft_delete_contribution, update_contribution,
    },
    db::begin_write_transaction,
    goal::{
        GoalId, GoalStatus, SavingsGoal, TargetValue, adjust_accumulated_value,
        evaluate_threshold, get_goal, set_goal_status,
    },
    identity::IdentityResolver,
    reward::apply_transition_reward,
    user::UserID,
};

/// Add `value` to the goal `goal_id` on behalf of the holder of `credential`.
///
/// Returns the new contribution with its goal and owner as they are after the change.
///
/// # Errors
/// This function will return a:
/// - [Error::Unauthorized] if `credential` does not resolve to a user, nothing is written,
/// - [Error::InvalidAmount] if `value` is zero or negative,
/// - [Error::NotFound] if the goal does not exist or belongs to someone else,
/// - [Error::AmountOverflow] if the goal's total would overflow,
/// - [Error::StorageFailure] if there is some other SQL error.
pub fn create_contribution(
    goal_id: GoalId,
    value: i64,
    credential: &str,
    resolver: &impl IdentityResolver,
    connection: &Connection,
) -> Result<Contribution, Error> {
    let identity = resolver.resolve(credential, connection)?;
    let amount = Amount::new(value)?;

    let transaction = begin_write_transaction(connection)?;
    let contribution_id = record_contribution(goal_id, amount, identity.user_id, &transaction)?;
    let contribution = get_contribution(contribution_id, identity.user_id, &transaction)?;
    transaction.commit()?;

    tracing::info!(
        "user {} contributed {} to goal {goal_id}, total is now {}",
        identity.user_id,
        amount.as_i64(),
        contribution.goal.accumulated_value
    );

    Ok(contribution)
}

/// Change the amount of the contribution `contribution_id` to `new_value`.
///
/// The goal's total moves by the difference between the new and old amount and its status is
/// re-evaluated in both directions.
///
/// # Errors
/// This function will return a:
/// - [Error::Unauthorized] if `credential` does not resolve to a user, nothing is written,
/// - [Error::InvalidAmount] if `new_value` is zero or negative,
/// - [Error::NotFound] if the contribution does not exist or belongs to someone else,
/// - [Error::AmountOverflow] if the goal's total would overflow,
/// - [Error::StorageFailure] if there is some other SQL error.
pub fn edit_contribution(
    contribution_id: ContributionId,
    new_value: i64,
    credential: &str,
    resolver: &impl IdentityResolver,
    connection: &Connection,
) -> Result<Contribution, Error> {
    let identity = resolver.resolve(credential, connection)?;
    let new_amount = Amount::new(new_value)?;

    let transaction = begin_write_transaction(connection)?;
    let contribution = get_contribution(contribution_id, identity.user_id, &transaction)?;
    let delta = new_amount.as_i64() - contribution.value;
    let status = apply_delta(&contribution.goal, delta, &transaction)?;
    update_contribution(
        contribution_id,
        identity.user_id,
        new_amount,
        status,
        &transaction,
    )?;
    let updated_contribution = get_contribution(contribution_id, identity.user_id, &transaction)?;
    transaction.commit()?;

    tracing::info!(
        "user {} changed contribution {contribution_id} from {} to {}",
        identity.user_id,
        contribution.value,
        new_amount.as_i64()
    );

    Ok(updated_contribution)
}

/// Remove the contribution `contribution_id` from its goal and soft delete it.
///
/// # Errors
/// This function will return a:
/// - [Error::Unauthorized] if `credential` does not resolve to a user, nothing is written,
/// - [Error::NotFound] if the contribution does not exist or belongs to someone else,
/// - [Error::StorageFailure] if there is some other SQL error.
pub fn delete_contribution(
    contribution_id: ContributionId,
    credential: &str,
    resolver: &impl IdentityResolver,
    connection: &Connection,
) -> Result<(), Error> {
    let identity = resolver.resolve(credential, connection)?;

    let transaction = begin_write_transaction(connection)?;
    let contribution = get_contribution(contribution_id, identity.user_id, &transaction)?;
    apply_delta(&contribution.goal, -contribution.value, &transaction)?;
    soft_delete_contribution(contribution_id, identity.user_id, &transaction)?;
    transaction.commit()?;

    tracing::info!(
        "user {} deleted contribution {contribution_id} of {} from goal {}",
        identity.user_id,
        contribution.value,
        contribution.goal.id
    );

    Ok(())
}

/// Apply `amount` to a goal owned by `owner` and insert the contribution row.
///
/// Must run inside a write transaction.
pub(crate) fn record_contribution(
    goal_id: GoalId,
    amount: Amount,
    owner: UserID,
    connection: &Connection,
) -> Result<ContributionId, Error> {
    let goal = get_goal(goal_id, owner, connection)?;
    let status = apply_delta(&goal, amount.as_i64(), connection)?;

    insert_contribution(owner, goal.id, amount, status, connection)
}

/// Move a goal's accumulated value by `delta` and settle its status.
fn apply_delta(
    goal: &SavingsGoal,
    delta: i64,
    connection: &Connection,
) -> Result<GoalStatus, Error> {
    if goal.accumulated_value.checked_add(delta).is_none() {
        return Err(Error::AmountOverflow);
    }

    let accumulated = adjust_accumulated_value(goal.id, delta, connection)?;

    settle_goal_status(goal, accumulated, goal.target_value, connection)
}

/// Compare a goal's `accumulated` value with `target` and, if the goal crossed the threshold,
/// store its new status and adjust the owner's exp.
///
/// `goal` is the state before the mutation. Returns the status the goal ends up in.
pub(crate) fn settle_goal_status(
    goal: &SavingsGoal,
    accumulated: i64,
    target: TargetValue,
    connection: &Connection,
) -> Result<GoalStatus, Error> {
    let Some(transition) = evaluate_threshold(goal.status, accumulated, target) else {
        return Ok(goal.status);
    };

    set_goal_status(goal.id, transition.status(), connection)?;
    let exp = apply_transition_reward(goal.owner.id, transition, connection)?;

    tracing::info!(
        "goal {} is now {:?} at {accumulated}/{}, user {} has {exp} exp",
        goal.id,
        transition.status(),
        target.as_i64(),
        goal.owner.id
    );

    Ok(transition.status())
}
