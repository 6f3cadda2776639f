//! Database operations for expenses.

use rusqlite::{Connection, OptionalExtension, Row};
use time::OffsetDateTime;

use crate::{
    Error,
    auth::UserID,
    budget::{BudgetId, check_budget_owner, get_budget},
    expense::{Expense, ExpenseId, NewExpense},
};

/// Amounts within this distance of the remaining budget are allowed.
const REMAINING_BUDGET_TOLERANCE: f64 = 1e-9;

/// Create an expense for `user_id` and return it with its generated ID.
///
/// # Errors
///
/// Returns:
/// - [Error::NotFound] if the budget does not exist.
/// - [Error::NotOwned] if the budget belongs to another user.
/// - [Error::ExceedsRemainingBudget] if the amount is more than the budget has left.
pub fn create_expense(
    user_id: UserID,
    expense: &NewExpense,
    created_at: OffsetDateTime,
    connection: &Connection,
) -> Result<Expense, Error> {
    check_budget_owner(
        expense.budget_id,
        user_id,
        Error::NotFound,
        "add expenses to this budget",
        connection,
    )?;
    check_remaining_budget(expense.budget_id, user_id, expense.amount, None, connection)?;

    connection.execute(
        "INSERT INTO expense (user_id, budget_id, name, amount, date, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        (
            user_id.as_i64(),
            expense.budget_id,
            &expense.name,
            expense.amount,
            expense.date,
            created_at,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(Expense {
        id,
        user_id,
        budget_id: expense.budget_id,
        name: expense.name.clone(),
        amount: expense.amount,
        date: expense.date,
        created_at,
    })
}

/// Retrieve a single expense owned by `user_id`.
///
/// Returns [Error::NotFound] if the expense does not exist or belongs to
/// another user.
pub fn get_expense(
    expense_id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    connection
        .prepare(
            "SELECT id, user_id, budget_id, name, amount, date, created_at FROM expense
            WHERE id = :id AND user_id = :user_id",
        )?
        .query_row(
            &[(":id", &expense_id), (":user_id", &user_id.as_i64())],
            map_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of a user's expenses in the order they happened.
///
/// Expenses on the same date are ordered by when they were added.
pub fn get_expenses(user_id: UserID, connection: &Connection) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, budget_id, name, amount, date, created_at FROM expense
            WHERE user_id = :user_id
            ORDER BY date ASC, id ASC",
        )?
        .query_map(&[(":user_id", &user_id.as_i64())], map_row)?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Retrieve the expenses of one budget, newest first.
pub fn get_budget_expenses(
    budget_id: BudgetId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    connection
        .prepare(
            "SELECT id, user_id, budget_id, name, amount, date, created_at FROM expense
            WHERE budget_id = :budget_id AND user_id = :user_id
            ORDER BY date DESC, id DESC",
        )?
        .query_map(
            &[(":budget_id", &budget_id), (":user_id", &user_id.as_i64())],
            map_row,
        )?
        .map(|maybe_expense| maybe_expense.map_err(|error| error.into()))
        .collect()
}

/// Change every editable field of an expense, including which budget it belongs to.
///
/// # Errors
///
/// Returns:
/// - [Error::UpdateMissingExpense] if the expense does not exist.
/// - [Error::NotOwned] if the expense or the new budget belongs to another user.
/// - [Error::NotFound] if the new budget does not exist.
/// - [Error::ExceedsRemainingBudget] if the new amount is more than the budget has left.
pub fn update_expense(
    expense_id: ExpenseId,
    user_id: UserID,
    expense: &NewExpense,
    connection: &Connection,
) -> Result<(), Error> {
    check_expense_owner(
        expense_id,
        user_id,
        Error::UpdateMissingExpense,
        "update this expense",
        connection,
    )?;
    check_budget_owner(
        expense.budget_id,
        user_id,
        Error::NotFound,
        "move expenses to this budget",
        connection,
    )?;
    check_remaining_budget(
        expense.budget_id,
        user_id,
        expense.amount,
        Some(expense_id),
        connection,
    )?;

    let rows_affected = connection.execute(
        "UPDATE expense SET name = ?1, amount = ?2, date = ?3, budget_id = ?4
        WHERE id = ?5 AND user_id = ?6",
        (
            &expense.name,
            expense.amount,
            expense.date,
            expense.budget_id,
            expense_id,
            user_id.as_i64(),
        ),
    )?;

    if rows_affected == 0 {
        return Err(Error::UpdateMissingExpense);
    }

    Ok(())
}

/// Delete an expense.
///
/// # Errors
///
/// Returns:
/// - [Error::DeleteMissingExpense] if the expense does not exist.
/// - [Error::NotOwned] if the expense belongs to another user.
pub fn delete_expense(
    expense_id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    check_expense_owner(
        expense_id,
        user_id,
        Error::DeleteMissingExpense,
        "delete this expense",
        connection,
    )?;

    let rows_affected = connection.execute(
        "DELETE FROM expense WHERE id = ?1 AND user_id = ?2",
        (expense_id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::DeleteMissingExpense);
    }

    Ok(())
}

fn check_expense_owner(
    expense_id: ExpenseId,
    user_id: UserID,
    missing_error: Error,
    action: &'static str,
    connection: &Connection,
) -> Result<(), Error> {
    let owner: Option<i64> = connection
        .query_row(
            "SELECT user_id FROM expense WHERE id = ?1",
            [expense_id],
            |row| row.get(0),
        )
        .optional()?;

    match owner {
        None => Err(missing_error),
        Some(owner) if owner != user_id.as_i64() => {
            tracing::warn!("User {user_id} tried to {action} (expense {expense_id})");
            Err(Error::NotOwned(action))
        }
        Some(_) => Ok(()),
    }
}

/// Check `amount` fits in what is left of the budget.
///
/// The amount of `replacing` is not counted as spent, so that editing an
/// expense credits back its previous amount when it stays in the same budget.
fn check_remaining_budget(
    budget_id: BudgetId,
    user_id: UserID,
    amount: f64,
    replacing: Option<ExpenseId>,
    connection: &Connection,
) -> Result<(), Error> {
    let budget = get_budget(budget_id, user_id, connection)?;
    let spent: f64 = connection.query_row(
        "SELECT COALESCE(SUM(amount), 0.0) FROM expense
        WHERE budget_id = ?1 AND id IS NOT ?2",
        (budget_id, replacing),
        |row| row.get(0),
    )?;

    if amount > budget.amount - spent + REMAINING_BUDGET_TOLERANCE {
        return Err(Error::ExceedsRemainingBudget);
    }

    Ok(())
}

/// Initialize the expense table and indexes.
///
/// Must be called after the budget table has been created.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS expense (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            budget_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            amount REAL NOT NULL CHECK (amount >= 0),
            date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE,
            FOREIGN KEY(budget_id) REFERENCES budget(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE INDEX IF NOT EXISTS idx_expense_user_id_date ON expense(user_id, date);
        CREATE INDEX IF NOT EXISTS idx_expense_budget_id ON expense(budget_id);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    Ok(Expense {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        budget_id: row.get(2)?,
        name: row.get(3)?,
        amount: row.get(4)?,
        date: row.get(5)?,
        created_at: row.get(6)?,
    })
}

#[cfg(test)]
mod expense_query_tests {
    use rusqlite::Connection;
    use time::{
        OffsetDateTime,
        macros::{date, datetime},
    };

    use crate::{
        Error,
        auth::{PasswordHash, User, create_user},
        budget::{Budget, Category, NewBudget, create_budget, delete_budget},
        db::initialize,
        expense::{
            NewExpense, create_expense, delete_expense, get_budget_expenses, get_expense,
            get_expenses, update_expense,
        },
    };

    const CREATED_AT: OffsetDateTime = datetime!(2024-01-01 09:00 UTC);

    struct Fixture {
        connection: Connection,
        owner: User,
        other: User,
        budget: Budget,
    }

    fn get_fixture() -> Fixture {
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
        let budget = new_budget(&owner, "Groceries", 500.0, &connection);

        Fixture {
            connection,
            owner,
            other,
            budget,
        }
    }

    fn new_budget(user: &User, name: &str, amount: f64, connection: &Connection) -> Budget {
        create_budget(
            user.id,
            &NewBudget {
                name: name.to_owned(),
                amount,
                category: Category::Food,
            },
            CREATED_AT,
            connection,
        )
        .expect("Could not create test budget")
    }

    fn new_expense(name: &str, amount: f64, budget: &Budget) -> NewExpense {
        NewExpense {
            name: name.to_owned(),
            amount,
            date: date!(2024 - 01 - 02),
            budget_id: budget.id,
        }
    }

    #[test]
    fn create_expense_succeeds() {
        let fixture = get_fixture();

        let expense = create_expense(
            fixture.owner.id,
            &new_expense("Milk", 4.5, &fixture.budget),
            CREATED_AT,
            &fixture.connection,
        )
        .expect("Could not create expense");

        assert!(expense.id > 0);
        assert_eq!(
            get_expense(expense.id, fixture.owner.id, &fixture.connection),
            Ok(expense)
        );
    }

    #[test]
    fn create_expense_in_other_users_budget_is_rejected() {
        let fixture = get_fixture();

        let result = create_expense(
            fixture.other.id,
            &new_expense("Milk", 4.5, &fixture.budget),
            CREATED_AT,
            &fixture.connection,
        );

        assert_eq!(result, Err(Error::NotOwned("add expenses to this budget")));
        assert_eq!(get_expenses(fixture.other.id, &fixture.connection), Ok(vec![]));
    }

    #[test]
    fn create_expense_cannot_exceed_remaining_budget() {
        let fixture = get_fixture();
        create_expense(
            fixture.owner.id,
            &new_expense("Big shop", 450.0, &fixture.budget),
            CREATED_AT,
            &fixture.connection,
        )
        .unwrap();

        let result = create_expense(
            fixture.owner.id,
            &new_expense("Another shop", 50.01, &fixture.budget),
            CREATED_AT,
            &fixture.connection,
        );

        assert_eq!(result, Err(Error::ExceedsRemainingBudget));
    }

    #[test]
    fn create_expense_may_use_exactly_the_remaining_budget() {
        let fixture = get_fixture();

        let result = create_expense(
            fixture.owner.id,
            &new_expense("Everything", 500.0, &fixture.budget),
            CREATED_AT,
            &fixture.connection,
        );

        assert!(result.is_ok());
    }

    #[test]
    fn update_expense_credits_back_its_previous_amount() {
        let fixture = get_fixture();
        let expense = create_expense(
            fixture.owner.id,
            &new_expense("Big shop", 400.0, &fixture.budget),
            CREATED_AT,
            &fixture.connection,
        )
        .unwrap();

        let result = update_expense(
            expense.id,
            fixture.owner.id,
            &new_expense("Bigger shop", 500.0, &fixture.budget),
            &fixture.connection,
        );

        assert_eq!(result, Ok(()));
        let got = get_expense(expense.id, fixture.owner.id, &fixture.connection).unwrap();
        assert_eq!(got.name, "Bigger shop");
        assert_eq!(got.amount, 500.0);
    }

    #[test]
    fn update_expense_can_move_to_another_budget() {
        let fixture = get_fixture();
        let travel = new_budget(&fixture.owner, "Travel", 1000.0, &fixture.connection);
        let expense = create_expense(
            fixture.owner.id,
            &new_expense("Train", 40.0, &fixture.budget),
            CREATED_AT,
            &fixture.connection,
        )
        .unwrap();

        update_expense(
            expense.id,
            fixture.owner.id,
            &new_expense("Train", 40.0, &travel),
            &fixture.connection,
        )
        .unwrap();

        let got = get_expense(expense.id, fixture.owner.id, &fixture.connection).unwrap();
        assert_eq!(got.budget_id, travel.id);
        assert_eq!(
            get_budget_expenses(fixture.budget.id, fixture.owner.id, &fixture.connection),
            Ok(vec![])
        );
    }

    #[test]
    fn update_expense_cannot_move_to_other_users_budget() {
        let fixture = get_fixture();
        let others_budget = new_budget(&fixture.other, "Theirs", 1000.0, &fixture.connection);
        let expense = create_expense(
            fixture.owner.id,
            &new_expense("Train", 40.0, &fixture.budget),
            CREATED_AT,
            &fixture.connection,
        )
        .unwrap();

        let result = update_expense(
            expense.id,
            fixture.owner.id,
            &new_expense("Train", 40.0, &others_budget),
            &fixture.connection,
        );

        assert_eq!(result, Err(Error::NotOwned("move expenses to this budget")));
    }

    #[test]
    fn update_other_users_expense_is_rejected() {
        let fixture = get_fixture();
        let expense = create_expense(
            fixture.owner.id,
            &new_expense("Milk", 4.5, &fixture.budget),
            CREATED_AT,
            &fixture.connection,
        )
        .unwrap();

        let result = update_expense(
            expense.id,
            fixture.other.id,
            &new_expense("Cheese", 9.0, &fixture.budget),
            &fixture.connection,
        );

        assert_eq!(result, Err(Error::NotOwned("update this expense")));
        assert_eq!(
            get_expense(expense.id, fixture.owner.id, &fixture.connection),
            Ok(expense)
        );
    }

    #[test]
    fn update_missing_expense_fails() {
        let fixture = get_fixture();

        let result = update_expense(
            999,
            fixture.owner.id,
            &new_expense("Milk", 4.5, &fixture.budget),
            &fixture.connection,
        );

        assert_eq!(result, Err(Error::UpdateMissingExpense));
    }

    #[test]
    fn delete_expense_succeeds() {
        let fixture = get_fixture();
        let expense = create_expense(
            fixture.owner.id,
            &new_expense("Milk", 4.5, &fixture.budget),
            CREATED_AT,
            &fixture.connection,
        )
        .unwrap();

        delete_expense(expense.id, fixture.owner.id, &fixture.connection).unwrap();

        assert_eq!(
            get_expense(expense.id, fixture.owner.id, &fixture.connection),
            Err(Error::NotFound)
        );
    }

    #[test]
    fn delete_other_users_expense_is_rejected() {
        let fixture = get_fixture();
        let expense = create_expense(
            fixture.owner.id,
            &new_expense("Milk", 4.5, &fixture.budget),
            CREATED_AT,
            &fixture.connection,
        )
        .unwrap();

        let result = delete_expense(expense.id, fixture.other.id, &fixture.connection);

        assert_eq!(result, Err(Error::NotOwned("delete this expense")));
        assert_eq!(
            get_expenses(fixture.owner.id, &fixture.connection),
            Ok(vec![expense])
        );
    }

    #[test]
    fn delete_missing_expense_fails() {
        let fixture = get_fixture();

        let result = delete_expense(999, fixture.owner.id, &fixture.connection);

        assert_eq!(result, Err(Error::DeleteMissingExpense));
    }

    #[test]
    fn deleting_budget_deletes_its_expenses() {
        let fixture = get_fixture();
        create_expense(
            fixture.owner.id,
            &new_expense("Milk", 4.5, &fixture.budget),
            CREATED_AT,
            &fixture.connection,
        )
        .unwrap();

        delete_budget(fixture.budget.id, fixture.owner.id, &fixture.connection).unwrap();

        assert_eq!(get_expenses(fixture.owner.id, &fixture.connection), Ok(vec![]));
    }

    #[test]
    fn get_expenses_orders_by_date_then_insertion() {
        let fixture = get_fixture();
        let mut later = new_expense("Later", 1.0, &fixture.budget);
        later.date = date!(2024 - 01 - 05);
        let later = create_expense(fixture.owner.id, &later, CREATED_AT, &fixture.connection)
            .unwrap();
        let first = create_expense(
            fixture.owner.id,
            &new_expense("First", 1.0, &fixture.budget),
            CREATED_AT,
            &fixture.connection,
        )
        .unwrap();
        let second = create_expense(
            fixture.owner.id,
            &new_expense("Second", 1.0, &fixture.budget),
            CREATED_AT,
            &fixture.connection,
        )
        .unwrap();

        let got = get_expenses(fixture.owner.id, &fixture.connection).unwrap();

        assert_eq!(got, vec![first, second, later]);
    }
}
