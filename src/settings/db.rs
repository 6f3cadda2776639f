//! Database operations for per-user settings.

use rusqlite::{Connection, OptionalExtension};

use crate::{
    Error,
    auth::UserID,
    currency::{Currency, DEFAULT_CURRENCY_CODE},
};

/// Initialize the user settings table.
///
/// Users without a row use the default settings.
pub fn create_user_settings_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS user_settings (
            user_id INTEGER PRIMARY KEY,
            currency_code TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    Ok(())
}

/// Get the code of the currency the user has chosen, e.g. "USD".
pub fn get_currency_code(user_id: UserID, connection: &Connection) -> Result<String, Error> {
    let code: Option<String> = connection
        .query_row(
            "SELECT currency_code FROM user_settings WHERE user_id = ?1",
            [user_id.as_i64()],
            |row| row.get(0),
        )
        .optional()?;

    Ok(code.unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_owned()))
}

/// Get the currency that amounts should be shown in for the user.
///
/// Unknown codes fall back to the default currency.
pub fn get_user_currency(user_id: UserID, connection: &Connection) -> Result<Currency, Error> {
    get_currency_code(user_id, connection).map(|code| Currency::from_code_or_default(&code))
}

/// Save the user's currency preference.
///
/// # Errors
///
/// Returns [Error::InvalidCurrency] if `code` is not a supported currency.
pub fn set_currency_code(
    user_id: UserID,
    code: &str,
    connection: &Connection,
) -> Result<(), Error> {
    let currency =
        Currency::from_code(code).ok_or_else(|| Error::InvalidCurrency(code.to_owned()))?;

    connection.execute(
        "INSERT INTO user_settings (user_id, currency_code) VALUES (?1, ?2)
        ON CONFLICT(user_id) DO UPDATE SET currency_code = excluded.currency_code",
        (user_id.as_i64(), currency.code),
    )?;

    Ok(())
}
