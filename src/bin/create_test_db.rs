use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use budget_buddy::{
    NewBudget, NewExpense, PasswordHash, ValidatedPassword, create_budget, create_expense,
    create_user, initialize_db,
};

/// A utility for creating a test database for the Budget Buddy server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// (name, amount, category)
const BUDGETS: [(&str, f64, &str); 4] = [
    ("Groceries", 600.0, "Food"),
    ("Power & Internet", 250.0, "Utilities"),
    ("Going Out", 150.0, "Entertainment"),
    ("Bus Pass", 120.0, "Transportation"),
];

/// (name, amount, days ago, index into `BUDGETS`)
const EXPENSES: [(&str, f64, i64, usize); 12] = [
    ("Supermarket", 84.2, 27, 0),
    ("Bakery", 12.5, 24, 0),
    ("Power bill", 142.75, 21, 1),
    ("Cinema", 32.0, 19, 2),
    ("Supermarket", 96.1, 17, 0),
    ("Top up", 40.0, 15, 3),
    ("Internet", 79.99, 12, 1),
    ("Concert", 65.0, 10, 2),
    ("Supermarket", 71.45, 8, 0),
    ("Top up", 40.0, 5, 3),
    ("Farmers market", 23.8, 3, 0),
    ("Coffee", 5.5, 1, 2),
];

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating test user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked("test"),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user("Test User", "test@example.com", password_hash, &conn)?;

    println!("Creating budgets and expenses...");

    let now = OffsetDateTime::now_utc();
    let mut budgets = Vec::with_capacity(BUDGETS.len());

    for (name, amount, category) in BUDGETS {
        let budget = create_budget(
            user.id,
            &NewBudget::new(name, amount, category)?,
            now - Duration::days(30),
            &conn,
        )?;
        budgets.push(budget);
    }

    for (name, amount, days_ago, budget_index) in EXPENSES {
        let created_at = now - Duration::days(days_ago);
        let expense = NewExpense::new(name, amount, created_at.date(), budgets[budget_index].id)?;
        create_expense(user.id, &expense, created_at, &conn)?;
    }

    println!("Success! Log in with test@example.com and the password 'test'.");

    Ok(())
}
