//! Opening, changing and closing savings goals.

use rusqlite::Connection;

use crate::{
    Error,
    contribution::{Amount, record_contribution, settle_goal_status},
    db::begin_write_transaction,
    goal::{
        GoalId, GoalName, SavingsGoal, TargetValue, get_goal, get_goals, insert_goal,
        soft_delete_goal, update_goal_details,
    },
    identity::IdentityResolver,
};

/// Open a savings goal for the holder of `credential`.
///
/// The goal starts out pending with nothing saved. A positive `initial_value` is then recorded as
/// the goal's first contribution, so a goal opened at or above its target is reached straight away
/// and earns the bonus.
///
/// # Errors
/// This function will return a:
/// - [Error::Unauthorized] if `credential` does not resolve to a user,
/// - [Error::EmptyGoalName] if `name` is empty,
/// - [Error::InvalidTarget] if `target` is zero or negative,
/// - [Error::InvalidInitialValue] if `initial_value` is negative,
/// - [Error::StorageFailure] if there is some SQL error.
pub fn create_savings_goal(
    name: &str,
    target: i64,
    initial_value: i64,
    credential: &str,
    resolver: &impl IdentityResolver,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    let identity = resolver.resolve(credential, connection)?;

    let name = GoalName::new(name)?;
    let target = TargetValue::new(target)?;
    if initial_value < 0 {
        return Err(Error::InvalidInitialValue(initial_value));
    }

    let transaction = begin_write_transaction(connection)?;
    let goal_id = insert_goal(identity.user_id, &name, target, &transaction)?;

    if initial_value > 0 {
        record_contribution(
            goal_id,
            Amount::new(initial_value)?,
            identity.user_id,
            &transaction,
        )?;
    }

    let goal = get_goal(goal_id, identity.user_id, &transaction)?;
    transaction.commit()?;

    tracing::info!(
        "user {} opened goal {goal_id} \"{name}\" at {}/{}",
        identity.user_id,
        goal.accumulated_value,
        target.as_i64()
    );

    Ok(goal)
}

/// Rename a goal and change its target.
///
/// The goal is re-evaluated against the new target, so raising the target above what has been
/// saved takes the bonus back and lowering it to or below the saved amount awards it.
///
/// # Errors
/// This function will return a:
/// - [Error::Unauthorized] if `credential` does not resolve to a user,
/// - [Error::EmptyGoalName] if `name` is empty,
/// - [Error::InvalidTarget] if `target` is zero or negative,
/// - [Error::NotFound] if the goal does not exist or belongs to someone else,
/// - [Error::StorageFailure] if there is some other SQL error.
pub fn update_savings_goal(
    goal_id: GoalId,
    name: &str,
    target: i64,
    credential: &str,
    resolver: &impl IdentityResolver,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    let identity = resolver.resolve(credential, connection)?;

    let name = GoalName::new(name)?;
    let target = TargetValue::new(target)?;

    let transaction = begin_write_transaction(connection)?;
    let goal = get_goal(goal_id, identity.user_id, &transaction)?;
    update_goal_details(goal_id, identity.user_id, &name, target, &transaction)?;
    settle_goal_status(&goal, goal.accumulated_value, target, &transaction)?;
    let updated_goal = get_goal(goal_id, identity.user_id, &transaction)?;
    transaction.commit()?;

    tracing::info!(
        "user {} updated goal {goal_id} to \"{name}\" at {}/{}",
        identity.user_id,
        updated_goal.accumulated_value,
        target.as_i64()
    );

    Ok(updated_goal)
}

/// Soft delete a goal together with its contributions.
///
/// Exp the owner earned from the goal is kept.
///
/// # Errors
/// This function will return a:
/// - [Error::Unauthorized] if `credential` does not resolve to a user,
/// - [Error::NotFound] if the goal does not exist or belongs to someone else,
/// - [Error::StorageFailure] if there is some other SQL error.
pub fn delete_savings_goal(
    goal_id: GoalId,
    credential: &str,
    resolver: &impl IdentityResolver,
    connection: &Connection,
) -> Result<(), Error> {
    let identity = resolver.resolve(credential, connection)?;

    let transaction = begin_write_transaction(connection)?;
    soft_delete_goal(goal_id, identity.user_id, &transaction)?;
    transaction.commit()?;

    tracing::info!("user {} deleted goal {goal_id}", identity.user_id);

    Ok(())
}

/// Retrieve one of the caller's goals.
///
/// # Errors
/// This function will return a:
/// - [Error::Unauthorized] if `credential` does not resolve to a user,
/// - [Error::NotFound] if the goal does not exist or belongs to someone else,
/// - [Error::StorageFailure] if there is some other SQL error.
pub fn view_goal(
    goal_id: GoalId,
    credential: &str,
    resolver: &impl IdentityResolver,
    connection: &Connection,
) -> Result<SavingsGoal, Error> {
    let identity = resolver.resolve(credential, connection)?;

    get_goal(goal_id, identity.user_id, connection)
}

/// Retrieve all of the caller's goals, oldest first.
///
/// # Errors
/// This function will return a:
/// - [Error::Unauthorized] if `credential` does not resolve to a user,
/// - [Error::StorageFailure] if there is some SQL error.
pub fn list_goals(
    credential: &str,
    resolver: &impl IdentityResolver,
    connection: &Connection,
) -> Result<Vec<SavingsGoal>, Error> {
    let identity = resolver.resolve(credential, connection)?;

    get_goals(identity.user_id, connection)
}

#[cfg(test)]
mod goal_core_tests {
    use rusqlite::Connection;

    use crate::{
        Error,
        contribution::{create_contribution, get_contribution, get_goal_contributions},
        goal::{
            GoalName, GoalStatus, TargetValue, create_savings_goal, delete_savings_goal,
            list_goals, update_savings_goal, view_goal,
        },
        identity::ApiTokenResolver,
        test_utils::{OTHER_TOKEN, OWNER_TOKEN, get_test_connection_with_users},
        user::{User, get_user_by_id},
    };

    fn name(name: &str) -> GoalName {
        GoalName::new_unchecked(name)
    }

    fn target(value: i64) -> TargetValue {
        TargetValue::new(value).unwrap()
    }

    #[track_caller]
    fn exp(user: &User, connection: &Connection) -> i64 {
        get_user_by_id(user.id, connection).unwrap().exp
    }

    #[test]
    fn create_without_initial_value_is_pending_and_empty() {
        let (connection, owner, _) = get_test_connection_with_users();

        let goal = create_savings_goal(
            "Car",
            5_000,
            0,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();

        assert_eq!(goal.name, name("Car"));
        assert_eq!(goal.accumulated_value, 0);
        assert_eq!(goal.target_value, target(5_000));
        assert_eq!(goal.status, GoalStatus::Pending);
        assert_eq!(goal.owner, owner);
        assert_eq!(
            get_goal_contributions(goal.id, owner.id, &connection),
            Ok(vec![])
        );
    }

    #[test]
    fn initial_value_is_recorded_as_first_contribution() {
        let (connection, owner, _) = get_test_connection_with_users();

        let goal = create_savings_goal(
            "Car",
            5_000,
            1_000,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();

        assert_eq!(goal.accumulated_value, 1_000);
        assert_eq!(goal.status, GoalStatus::Pending);
        let contributions = get_goal_contributions(goal.id, owner.id, &connection).unwrap();
        assert_eq!(contributions.len(), 1);
        assert_eq!(contributions[0].value, 1_000);
        assert_eq!(exp(&owner, &connection), 0);
    }

    #[test]
    fn opening_at_target_reaches_goal_immediately() {
        let (connection, owner, _) = get_test_connection_with_users();

        let goal = create_savings_goal(
            "Car",
            5_000,
            5_000,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();

        assert_eq!(goal.status, GoalStatus::Reached);
        assert_eq!(exp(&owner, &connection), 10);
    }

    #[test]
    fn negative_initial_value_is_rejected() {
        let (connection, owner, _) = get_test_connection_with_users();

        let result = create_savings_goal(
            "Car",
            5_000,
            -1,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        );

        assert_eq!(result, Err(Error::InvalidInitialValue(-1)));
        assert_eq!(
            list_goals(OWNER_TOKEN, &ApiTokenResolver, &connection),
            Ok(vec![])
        );
        assert_eq!(exp(&owner, &connection), 0);
    }

    #[test]
    fn create_with_bad_credential_writes_nothing() {
        let (connection, _, _) = get_test_connection_with_users();

        let result = create_savings_goal(
            "Car",
            5_000,
            5_000,
            "bogus",
            &ApiTokenResolver,
            &connection,
        );

        assert_eq!(result, Err(Error::Unauthorized));
        let goal_count: i64 = connection
            .query_row("SELECT COUNT(*) FROM goal", [], |row| row.get(0))
            .unwrap();
        assert_eq!(goal_count, 0);
    }

    #[test]
    fn invalid_fields_from_bad_credential_are_unauthorized() {
        let (connection, owner, _) = get_test_connection_with_users();
        let goal = create_savings_goal("Car", 5_000, 0, OWNER_TOKEN, &ApiTokenResolver, &connection)
            .unwrap();

        for (name, target, initial_value) in [("", 5_000, 0), ("Car", 0, 0), ("Car", 5_000, -1)] {
            assert_eq!(
                create_savings_goal(
                    name,
                    target,
                    initial_value,
                    "bogus",
                    &ApiTokenResolver,
                    &connection
                ),
                Err(Error::Unauthorized)
            );
        }
        assert_eq!(
            update_savings_goal(goal.id, "", -3, "bogus", &ApiTokenResolver, &connection),
            Err(Error::Unauthorized)
        );
        assert_eq!(
            view_goal(goal.id, OWNER_TOKEN, &ApiTokenResolver, &connection),
            Ok(goal)
        );
        assert_eq!(exp(&owner, &connection), 0);
    }

    #[test]
    fn invalid_name_or_target_is_rejected() {
        let (connection, _, _) = get_test_connection_with_users();
        let goal = create_savings_goal("Car", 5_000, 0, OWNER_TOKEN, &ApiTokenResolver, &connection)
            .unwrap();

        assert_eq!(
            create_savings_goal("", 5_000, 0, OWNER_TOKEN, &ApiTokenResolver, &connection),
            Err(Error::EmptyGoalName)
        );
        assert_eq!(
            update_savings_goal(goal.id, "Car", 0, OWNER_TOKEN, &ApiTokenResolver, &connection),
            Err(Error::InvalidTarget(0))
        );
        assert_eq!(
            view_goal(goal.id, OWNER_TOKEN, &ApiTokenResolver, &connection),
            Ok(goal)
        );
    }

    #[test]
    fn raising_target_above_total_revokes_bonus() {
        let (connection, owner, _) = get_test_connection_with_users();
        let goal = create_savings_goal(
            "Car",
            5_000,
            6_000,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();
        assert_eq!(exp(&owner, &connection), 10);

        let goal = update_savings_goal(
            goal.id,
            "Better car",
            8_000,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();

        assert_eq!(goal.name, name("Better car"));
        assert_eq!(goal.target_value, target(8_000));
        assert_eq!(goal.accumulated_value, 6_000);
        assert_eq!(goal.status, GoalStatus::Pending);
        assert_eq!(exp(&owner, &connection), 0);
    }

    #[test]
    fn lowering_target_to_total_awards_bonus() {
        let (connection, owner, _) = get_test_connection_with_users();
        let goal = create_savings_goal(
            "Car",
            5_000,
            3_000,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();

        let goal = update_savings_goal(
            goal.id,
            "Car",
            3_000,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();

        assert_eq!(goal.status, GoalStatus::Reached);
        assert_eq!(exp(&owner, &connection), 10);
    }

    #[test]
    fn rename_only_leaves_status_and_exp_alone() {
        let (connection, owner, _) = get_test_connection_with_users();
        let goal = create_savings_goal(
            "Car",
            5_000,
            5_000,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();

        let goal = update_savings_goal(
            goal.id,
            "Van",
            5_000,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();

        assert_eq!(goal.status, GoalStatus::Reached);
        assert_eq!(exp(&owner, &connection), 10);
    }

    #[test]
    fn update_of_other_owners_goal_is_not_found() {
        let (connection, owner, _) = get_test_connection_with_users();
        let goal = create_savings_goal(
            "Car",
            5_000,
            0,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();

        let result = update_savings_goal(
            goal.id,
            "Mine now",
            1,
            OTHER_TOKEN,
            &ApiTokenResolver,
            &connection,
        );

        assert_eq!(result, Err(Error::NotFound));
        assert_eq!(
            view_goal(goal.id, OWNER_TOKEN, &ApiTokenResolver, &connection),
            Ok(goal)
        );
        assert_eq!(exp(&owner, &connection), 0);
    }

    #[test]
    fn delete_hides_goal_and_contributions_but_keeps_exp() {
        let (connection, owner, _) = get_test_connection_with_users();
        let goal = create_savings_goal(
            "Car",
            5_000,
            0,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();
        let contribution = create_contribution(
            goal.id,
            5_000,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();

        delete_savings_goal(goal.id, OWNER_TOKEN, &ApiTokenResolver, &connection).unwrap();

        assert_eq!(
            view_goal(goal.id, OWNER_TOKEN, &ApiTokenResolver, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            get_contribution(contribution.id, owner.id, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(exp(&owner, &connection), 10);
        assert_eq!(
            delete_savings_goal(goal.id, OWNER_TOKEN, &ApiTokenResolver, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn list_goals_only_returns_callers_goals() {
        let (connection, _, _) = get_test_connection_with_users();
        let mine = create_savings_goal(
            "Car",
            5_000,
            0,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();
        let theirs = create_savings_goal(
            "Boat",
            50_000,
            0,
            OTHER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();

        assert_eq!(
            list_goals(OWNER_TOKEN, &ApiTokenResolver, &connection),
            Ok(vec![mine])
        );
        assert_eq!(
            list_goals(OTHER_TOKEN, &ApiTokenResolver, &connection),
            Ok(vec![theirs])
        );
        assert_eq!(
            list_goals("", &ApiTokenResolver, &connection),
            Err(Error::Unauthorized)
        );
    }
}
