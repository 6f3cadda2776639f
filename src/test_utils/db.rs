use rusqlite::Connection;

use crate::{
    auth::{PasswordHash, User, create_user},
    db::initialize,
};

/// An in-memory database with every table created.
pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open an in-memory database");
    initialize(&connection).expect("Could not create the tables");

    connection
}

/// Add a user named "Test User" with a placeholder password hash.
#[track_caller]
pub(crate) fn create_test_user(email: &str, connection: &Connection) -> User {
    let password_hash = PasswordHash::new_unchecked("$2b$04$not.a.real.hash");

    create_user("Test User", email, password_hash, connection)
        .unwrap_or_else(|error| panic!("Could not create test user {email}: {error}"))
}
