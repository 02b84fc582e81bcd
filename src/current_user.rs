//! Endpoint for the caller's own profile, including the exp they have earned.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    db::lock_connection,
    identity::{ApiTokenResolver, Credential, IdentityResolver},
    user::{User, get_user_by_id},
};

/// The state needed for fetching the current user.
#[derive(Debug, Clone)]
pub struct CurrentUserState {
    /// The database connection.
    pub db_connection: Arc<Mutex<Connection>>,
    /// Resolves bearer credentials to users.
    pub identity_resolver: ApiTokenResolver,
}

impl FromRef<AppState> for CurrentUserState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            identity_resolver: state.identity_resolver,
        }
    }
}

/// Get the user the bearer token belongs to.
pub async fn get_current_user(
    State(state): State<CurrentUserState>,
    credential: Credential,
) -> Result<Json<User>, Error> {
    let connection = lock_connection(&state.db_connection)?;
    let identity = state
        .identity_resolver
        .resolve(credential.as_ref(), &connection)?;

    get_user_by_id(identity.user_id, &connection).map(Json)
}

#[cfg(test)]
mod current_user_tests {
    use axum::{Router, routing::get};
    use axum_test::TestServer;

    use crate::{
        endpoints,
        test_utils::{OTHER_TOKEN, OWNER_TOKEN, get_test_app_state},
        user::User,
    };

    use super::get_current_user;

    #[tokio::test]
    async fn returns_user_for_token() {
        let (state, owner, other) = get_test_app_state();
        let app = Router::new()
            .route(endpoints::CURRENT_USER, get(get_current_user))
            .with_state(state);
        let server = TestServer::new(app);

        let got = server
            .get(endpoints::CURRENT_USER)
            .authorization_bearer(OWNER_TOKEN)
            .await
            .json::<User>();
        assert_eq!(got, owner);

        let got = server
            .get(endpoints::CURRENT_USER)
            .authorization_bearer(OTHER_TOKEN)
            .await
            .json::<User>();
        assert_eq!(got, other);
    }

    #[tokio::test]
    async fn unknown_token_is_unauthorized() {
        let (state, _, _) = get_test_app_state();
        let app = Router::new()
            .route(endpoints::CURRENT_USER, get(get_current_user))
            .with_state(state);
        let server = TestServer::new(app);

        server
            .get(endpoints::CURRENT_USER)
            .authorization_bearer("who-am-i")
            .await
            .assert_status_unauthorized();
    }
}
