#![allow(missing_docs)]

use rusqlite::Connection;

use crate::{
    AppState,
    identity::TokenHash,
    initialize_db,
    user::{User, UserName, create_user},
};

pub(crate) const OWNER_TOKEN: &str = "owner-token";
pub(crate) const OTHER_TOKEN: &str = "other-token";

/// An in-memory database with all tables created.
pub(crate) fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize_db(&connection).expect("Could not initialize database");
    connection
}

/// Insert a user that authenticates with `token`.
#[track_caller]
pub(crate) fn create_test_user(name: &str, token: &str, connection: &Connection) -> User {
    create_user(
        UserName::new_unchecked(name),
        &TokenHash::from_credential(token),
        connection,
    )
    .expect("Could not create test user")
}

/// An in-memory database holding an owner and a second, unrelated user.
pub(crate) fn get_test_connection_with_users() -> (Connection, User, User) {
    let connection = get_test_connection();
    let owner = create_test_user("owner", OWNER_TOKEN, &connection);
    let other = create_test_user("other", OTHER_TOKEN, &connection);

    (connection, owner, other)
}

/// App state over an in-memory database holding an owner and a second, unrelated user.
pub(crate) fn get_test_app_state() -> (AppState, User, User) {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    let state = AppState::new(connection).expect("Could not create app state");

    let (owner, other) = {
        let connection = state.db_connection.lock().unwrap();
        (
            create_test_user("owner", OWNER_TOKEN, &connection),
            create_test_user("other", OTHER_TOKEN, &connection),
        )
    };

    (state, owner, other)
}
