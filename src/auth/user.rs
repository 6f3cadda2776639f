//! User accounts and the `user` table.

use std::fmt::Display;

use email_address::EmailAddress;
use rusqlite::{Connection, Row};
use serde::{Deserialize, Serialize};

use crate::{Error, auth::PasswordHash};

/// The database ID of a user, kept distinct from budget and expense IDs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Hash)]
pub struct UserID(i64);

impl UserID {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A registered user of the application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserID,
    /// The name shown in the settings page.
    pub full_name: String,
    /// The email address the user logs in with, stored in lowercase.
    pub email: String,
    /// The bcrypt hash of the user's password.
    pub password_hash: PasswordHash,
}

const MIN_FULL_NAME_LENGTH: usize = 2;
const MAX_FULL_NAME_LENGTH: usize = 30;

/// Trim `full_name` and check it is between 2 and 30 characters long.
///
/// # Errors
///
/// Returns [Error::InvalidFullName] if the trimmed name is too short or too long.
pub fn validate_full_name(full_name: &str) -> Result<String, Error> {
    let full_name = full_name.trim();
    let length = full_name.chars().count();

    if (MIN_FULL_NAME_LENGTH..=MAX_FULL_NAME_LENGTH).contains(&length) {
        Ok(full_name.to_owned())
    } else {
        Err(Error::InvalidFullName)
    }
}

/// Trim `email` and check it is a valid email address.
///
/// The address is lowercased so that log-in is case-insensitive.
///
/// # Errors
///
/// Returns [Error::InvalidEmail] if `email` is not a valid address.
pub fn validate_email(email: &str) -> Result<String, Error> {
    let email = email.trim().to_lowercase();

    if EmailAddress::is_valid(&email) {
        Ok(email)
    } else {
        Err(Error::InvalidEmail(email))
    }
}

/// Create the `user` table if it does not exist. Emails are unique and stored in lowercase.
///
/// # Errors
///
/// Returns an error if the SQL query fails.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user (
                id INTEGER PRIMARY KEY,
                full_name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password TEXT NOT NULL
                )",
        (),
    )?;

    Ok(())
}

/// Save a new user.
///
/// The caller should validate `full_name` and `email` with [validate_full_name]
/// and [validate_email].
///
/// # Errors
///
/// Returns:
/// - [Error::DuplicateEmail] if another user has registered with `email`.
/// - [Error::SqlError] if an SQL related error occurred.
pub fn create_user(
    full_name: &str,
    email: &str,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    connection.execute(
        "INSERT INTO user (full_name, email, password) VALUES (?1, ?2, ?3)",
        (full_name, email, password_hash.as_ref()),
    )?;

    let id = UserID::new(connection.last_insert_rowid());

    Ok(User {
        id,
        full_name: full_name.to_owned(),
        email: email.to_owned(),
        password_hash,
    })
}

fn map_user_row(row: &Row) -> Result<User, rusqlite::Error> {
    let raw_password_hash: String = row.get(3)?;

    Ok(User {
        id: UserID::new(row.get(0)?),
        full_name: row.get(1)?,
        email: row.get(2)?,
        password_hash: PasswordHash::new_unchecked(&raw_password_hash),
    })
}

/// The user with `user_id`.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has `user_id`.
pub fn get_user_by_id(user_id: UserID, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare("SELECT id, full_name, email, password FROM user WHERE id = :id")?
        .query_row(&[(":id", &user_id.as_i64())], map_user_row)
        .map_err(|error| error.into())
}

/// Get the user that registered with `email`.
///
/// The lookup is case-insensitive since emails are stored in lowercase.
///
/// # Errors
///
/// Returns [Error::NotFound] if no user has registered with `email`.
pub fn get_user_by_email(email: &str, db_connection: &Connection) -> Result<User, Error> {
    db_connection
        .prepare("SELECT id, full_name, email, password FROM user WHERE email = :email")?
        .query_row(
            &[(":email", &email.trim().to_lowercase())],
            map_user_row,
        )
        .map_err(|error| error.into())
}

/// Change the full name and email of the user with `user_id`.
///
/// # Errors
///
/// Returns:
/// - [Error::DuplicateEmail] if `email` belongs to another user.
/// - [Error::UpdateMissingUser] if the user does not exist.
pub fn update_user_profile(
    user_id: UserID,
    full_name: &str,
    email: &str,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET full_name = ?1, email = ?2 WHERE id = ?3",
        (full_name, email, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingUser);
    }

    Ok(())
}

/// Replace the password hash of the user with `user_id`.
///
/// # Errors
///
/// Returns [Error::UpdateMissingUser] if the user does not exist.
pub fn update_password(
    user_id: UserID,
    password_hash: &PasswordHash,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "UPDATE user SET password = ?1 WHERE id = ?2",
        (password_hash.as_ref(), user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingUser);
    }

    Ok(())
}
