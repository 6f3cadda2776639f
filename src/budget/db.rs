//! Database operations for budgets.
//!
//! Every query is scoped to the user that owns the budget. Mutations look up
//! the owner first so that a missing budget and someone else's budget are
//! reported differently, and nothing is changed in either case.

use rusqlite::{
    Connection, OptionalExtension, Row, ToSql,
    types::{FromSql, FromSqlError, FromSqlResult, ToSqlOutput, ValueRef},
};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetId, Category, NewBudget},
};

impl ToSql for Category {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.label()))
    }
}

impl FromSql for Category {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// Create a budget for `user_id` and return it with its generated ID.
pub fn create_budget(
    user_id: UserID,
    budget: &NewBudget,
    created_at: OffsetDateTime,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection.execute(
        "INSERT INTO budget (user_id, name, amount, category, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5)",
        (
            user_id.as_i64(),
            &budget.name,
            budget.amount,
            budget.category,
            created_at,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Budget {
        id,
        user_id,
        name: budget.name.clone(),
        amount: budget.amount,
        category: budget.category,
        created_at,
    })
}

/// Retrieve a single budget owned by `user_id`.
///
/// Returns [Error::NotFound] if the budget does not exist or belongs to
/// another user.
pub fn get_budget(
    budget_id: BudgetId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, amount, category, created_at FROM budget
            WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &budget_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of a user's budgets, oldest first.
pub fn get_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, name, amount, category, created_at FROM budget
            WHERE user_id = :user_id
            ORDER BY created_at ASC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Change the name, amount and category of a budget.
///
/// # Errors
///
/// Returns:
/// - [Error::UpdateMissingBudget] if the budget does not exist.
/// - [Error::NotOwned] if the budget belongs to another user.
pub fn update_budget(
    budget_id: BudgetId,
    user_id: UserID,
    budget: &NewBudget,
    connection: &Connection,
) -> Result<(), Error> {
    check_budget_owner(
        budget_id,
        user_id,
        Error::UpdateMissingBudget,
        "update this budget",
        connection,
    )?;

    let rows_affected = connection.execute(
        "UPDATE budget SET name = ?1, amount = ?2, category = ?3
        WHERE id = ?4 AND user_id = ?5",
        (
            &budget.name,
            budget.amount,
            budget.category,
            budget_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingBudget);
    }

    Ok(())
}

/// Delete a budget and, through the foreign key cascade, its expenses.
///
/// # Errors
///
/// Returns:
/// - [Error::DeleteMissingBudget] if the budget does not exist.
/// - [Error::NotOwned] if the budget belongs to another user.
pub fn delete_budget(
    budget_id: BudgetId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    check_budget_owner(
        budget_id,
        user_id,
        Error::DeleteMissingBudget,
        "delete this budget",
        connection,
    )?;

    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (budget_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingBudget);
    }

    Ok(())
}

/// Check that `budget_id` exists and belongs to `user_id`.
///
/// Returns `missing_error` if there is no such budget, otherwise
/// [Error::NotOwned] with `action` if someone else owns it.
pub(crate) fn check_budget_owner(
    budget_id: BudgetId,
    user_id: UserID,
    missing_error: Error,
    action: &'static str,
    connection: &Connection,
) -> Result<(), Error> {
    let owner: Option<i64> = connection
        .query_row(
            "SELECT user_id FROM budget WHERE id = ?1",
            [budget_id],
            |row| row.get(0),
        )
        .optional()?;

    match owner {
        None => Err(missing_error),
        Some(owner) if owner != user_id.as_i64() => {
            tracing::warn!("User {user_id} tried to {action} (budget {budget_id})");
            Err(Error::NotOwned(action))
        }
        Some(_) => Ok(()),
    }
}

/// Initialize the budget table and indexes.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount > 0),
            category TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_budget_user_id ON budget(user_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        name: row.get(2)?,
        amount: row.get(3)?,
        category: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod budget_query_tests {
    use rusqlite::Connection;
    use time::{OffsetDateTime, macros::datetime};

    use crate::{
        Error,
        auth::{PasswordHash, User, UserID, create_user},
        budget::{
            Category, NewBudget, create_budget, delete_budget, get_budget, get_budgets,
            update_budget,
        },
        db::initialize,
    };

    fn get_test_connection() -> (Connection, User, User) {
        let connection = Connection::open_in_memory().unwrap();
        initialize(&connection).expect("Could not initialize database");
        let owner = create_user(
            "Ada Lovelace",
            "ada@example.com",
            PasswordHash::new_unchecked("hunter2"),
            &connection,
        )
        .unwrap();
        let other = create_user(
            "Charles Babbage",
            "charles@example.com",
            PasswordHash::new_unchecked("hunter3"),
            &connection,
        )
        .unwrap();

        (connection, owner, other)
    }

    fn groceries() -> NewBudget {
        NewBudget {
            name: "Groceries".to_owned(),
            amount: 500.0,
            category: Category::Food,
        }
    }

    const CREATED_AT: OffsetDateTime = datetime!(2024-01-01 09:00 UTC);

    #[test]
    fn create_budget_succeeds() {
        let (connection, owner, _) = get_test_connection();

        let budget = create_budget(owner.id, &groceries(), CREATED_AT, &connection)
            .expect("Could not create budget");

        assert!(budget.id > 0);
        assert_eq!(budget.name, "Groceries");
        assert_eq!(budget.category, Category::Food);
        assert_eq!(get_budget(budget.id, owner.id, &connection), Ok(budget));
    }

    #[test]
    fn get_budget_of_other_user_returns_not_found() {
        let (connection, owner, other) = get_test_connection();
        let budget = create_budget(owner.id, &groceries(), CREATED_AT, &connection).unwrap();

        let got = get_budget(budget.id, other.id, &connection);

        assert_eq!(got, Err(Error::NotFound));
    }

    #[test]
    fn get_budgets_only_returns_own_budgets_oldest_first() {
        let (connection, owner, other) = get_test_connection();
        let later = create_budget(
            owner.id,
            &groceries(),
            datetime!(2024-02-01 09:00 UTC),
            &connection,
        )
        .unwrap();
        let earlier = create_budget(owner.id, &groceries(), CREATED_AT, &connection).unwrap();
        create_budget(other.id, &groceries(), CREATED_AT, &connection).unwrap();

        let got = get_budgets(owner.id, &connection).unwrap();

        assert_eq!(got, vec![earlier, later]);
    }

    #[test]
    fn update_budget_changes_editable_fields() {
        let (connection, owner, _) = get_test_connection();
        let budget = create_budget(owner.id, &groceries(), CREATED_AT, &connection).unwrap();
        let changes = NewBudget {
            name: "Take-away".to_owned(),
            amount: 120.0,
            category: Category::Entertainment,
        };

        update_budget(budget.id, owner.id, &changes, &connection).unwrap();

        let got = get_budget(budget.id, owner.id, &connection).unwrap();
        assert_eq!(got.name, "Take-away");
        assert_eq!(got.amount, 120.0);
        assert_eq!(got.category, Category::Entertainment);
        assert_eq!(got.created_at, budget.created_at);
    }

    #[test]
    fn update_missing_budget_fails() {
        let (connection, owner, _) = get_test_connection();

        let result = update_budget(999, owner.id, &groceries(), &connection);

        assert_eq!(result, Err(Error::UpdateMissingBudget));
    }

    #[test]
    fn update_budget_of_other_user_is_rejected() {
        let (connection, owner, other) = get_test_connection();
        let budget = create_budget(owner.id, &groceries(), CREATED_AT, &connection).unwrap();
        let changes = NewBudget {
            name: "Mine now".to_owned(),
            ..groceries()
        };

        let result = update_budget(budget.id, other.id, &changes, &connection);

        assert_eq!(result, Err(Error::NotOwned("update this budget")));
        assert_eq!(get_budget(budget.id, owner.id, &connection), Ok(budget));
    }

    #[test]
    fn delete_budget_succeeds() {
        let (connection, owner, _) = get_test_connection();
        let budget = create_budget(owner.id, &groceries(), CREATED_AT, &connection).unwrap();

        delete_budget(budget.id, owner.id, &connection).unwrap();

        assert_eq!(
            get_budget(budget.id, owner.id, &connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_budget_of_other_user_is_rejected_and_nothing_changes() {
        let (connection, owner, other) = get_test_connection();
        let budget = create_budget(owner.id, &groceries(), CREATED_AT, &connection).unwrap();

        let result = delete_budget(budget.id, other.id, &connection);

        assert_eq!(result, Err(Error::NotOwned("delete this budget")));
        assert_eq!(get_budgets(owner.id, &connection), Ok(vec![budget]));
    }

    #[test]
    fn delete_missing_budget_fails() {
        let (connection, _, _) = get_test_connection();

        let result = delete_budget(999, UserID::new(1), &connection);

        assert_eq!(result, Err(Error::DeleteMissingBudget));
    }
}
