//! Read-only access to contributions.

use rusqlite::Connection;

use crate::{
    Error,
    contribution::{Contribution, ContributionId, get_contribution, get_contributions},
    identity::IdentityResolver,
};

/// Retrieve a single contribution made by the holder of `credential`.
///
/// # Errors
/// This function will return a:
/// - [Error::Unauthorized] if `credential` does not resolve to a user,
/// - [Error::NotFound] if the contribution does not exist or was made by someone else,
/// - [Error::StorageFailure] if there is some other SQL error.
pub fn view_contribution(
    contribution_id: ContributionId,
    credential: &str,
    resolver: &impl IdentityResolver,
    connection: &Connection,
) -> Result<Contribution, Error> {
    let identity = resolver.resolve(credential, connection)?;

    get_contribution(contribution_id, identity.user_id, connection)
}

/// Retrieve every live contribution made by the holder of `credential`, oldest first.
///
/// # Errors
/// This function will return a:
/// - [Error::Unauthorized] if `credential` does not resolve to a user,
/// - [Error::StorageFailure] if there is some SQL error.
pub fn list_contributions(
    credential: &str,
    resolver: &impl IdentityResolver,
    connection: &Connection,
) -> Result<Vec<Contribution>, Error> {
    let identity = resolver.resolve(credential, connection)?;

    get_contributions(identity.user_id, connection)
}

#[cfg(test)]
mod query_tests {
    use crate::{
        Error,
        contribution::{create_contribution, list_contributions, view_contribution},
        goal::{GoalName, TargetValue, get_goal, insert_goal},
        identity::ApiTokenResolver,
        test_utils::{OTHER_TOKEN, OWNER_TOKEN, get_test_connection_with_users},
        user::get_user_by_id,
    };

    #[test]
    fn lists_only_own_contributions() {
        let (connection, owner, other) = get_test_connection_with_users();
        let goal_id = insert_goal(
            owner.id,
            &GoalName::new_unchecked("Bike"),
            TargetValue::new(800).unwrap(),
            &connection,
        )
        .unwrap();
        let want = [100, 250]
            .into_iter()
            .map(|value| {
                create_contribution(
                    goal_id,
                    value,
                    OWNER_TOKEN,
                    &ApiTokenResolver,
                    &connection,
                )
                .unwrap()
                .id
            })
            .collect::<Vec<_>>();

        let got = list_contributions(OWNER_TOKEN, &ApiTokenResolver, &connection).unwrap();

        assert_eq!(
            got.iter().map(|contribution| contribution.id).collect::<Vec<_>>(),
            want
        );
        assert!(got.iter().all(|contribution| contribution.owner.id == owner.id));
        assert_eq!(
            list_contributions(OTHER_TOKEN, &ApiTokenResolver, &connection),
            Ok(vec![])
        );
        assert_eq!(get_user_by_id(other.id, &connection).unwrap().exp, 0);
    }

    #[test]
    fn reads_do_not_change_anything() {
        let (connection, owner, _) = get_test_connection_with_users();
        let goal_id = insert_goal(
            owner.id,
            &GoalName::new_unchecked("Bike"),
            TargetValue::new(800).unwrap(),
            &connection,
        )
        .unwrap();
        let contribution = create_contribution(
            goal_id,
            900,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();
        let goal_before = get_goal(goal_id, owner.id, &connection).unwrap();

        for _ in 0..3 {
            view_contribution(contribution.id, OWNER_TOKEN, &ApiTokenResolver, &connection)
                .unwrap();
            list_contributions(OWNER_TOKEN, &ApiTokenResolver, &connection).unwrap();
        }

        assert_eq!(get_goal(goal_id, owner.id, &connection).unwrap(), goal_before);
        assert_eq!(get_user_by_id(owner.id, &connection).unwrap().exp, 10);
    }

    #[test]
    fn view_requires_credential_and_ownership() {
        let (connection, owner, _) = get_test_connection_with_users();
        let goal_id = insert_goal(
            owner.id,
            &GoalName::new_unchecked("Bike"),
            TargetValue::new(800).unwrap(),
            &connection,
        )
        .unwrap();
        let contribution = create_contribution(
            goal_id,
            10,
            OWNER_TOKEN,
            &ApiTokenResolver,
            &connection,
        )
        .unwrap();

        assert_eq!(
            view_contribution(contribution.id, "nope", &ApiTokenResolver, &connection),
            Err(Error::Unauthorized)
        );
        assert_eq!(
            view_contribution(contribution.id, OTHER_TOKEN, &ApiTokenResolver, &connection),
            Err(Error::NotFound)
        );
        assert_eq!(
            view_contribution(contribution.id, OWNER_TOKEN, &ApiTokenResolver, &connection),
            Ok(contribution)
        );
    }
}
