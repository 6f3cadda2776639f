use std::{error::Error, io, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use budget_buddy::{PasswordHash, ValidatedPassword, get_user_by_email, update_password};

/// Set a new password for a Budget Buddy user, e.g. when they have forgotten theirs.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The email address the user logs in with.
    #[arg(long, short)]
    email: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let db_path = Path::new(&args.db_path);
    if !db_path.is_file() {
        fail(format!("No database found at {db_path:?}"));
    }

    let connection = Connection::open(db_path)?;
    let user = get_user_by_email(&args.email, &connection).unwrap_or_else(|error| {
        fail(format!("Could not find a user with the email {}: {error}", args.email))
    });

    println!("Resetting the password for {} ({})", user.full_name, user.email);

    let Some(password_hash) = prompt_for_password_hash() else {
        println!("Password unchanged.");
        return Ok(());
    };

    update_password(user.id, &password_hash, &connection)?;
    println!("Password updated.");

    Ok(())
}

/// Ask for a new password until a strong one is typed twice.
///
/// Returns `None` if stdin is closed or cannot be read.
fn prompt_for_password_hash() -> Option<PasswordHash> {
    loop {
        let password = read_password("New password: ")?;

        let validated = match ValidatedPassword::new(&password) {
            Ok(validated) => validated,
            Err(error) => {
                print_error(error);
                continue;
            }
        };

        if read_password("Confirm new password: ")? != password {
            print_error("the passwords do not match, try again");
            continue;
        }

        match PasswordHash::new(validated, PasswordHash::DEFAULT_COST) {
            Ok(hash) => return Some(hash),
            Err(error) => print_error(format!("could not hash the password, try again: {error}")),
        }
    }
}

fn read_password(prompt: &str) -> Option<String> {
    match rpassword::prompt_password(prompt) {
        Ok(password) => Some(password),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => None,
        Err(error) => {
            print_error(format!("could not read the password: {error}"));
            None
        }
    }
}

/// Print `message` in bold red on stderr.
fn print_error(message: impl ToString) {
    let message = message.to_string();
    let mut chars = message.chars();
    let message: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => message,
    };

    eprintln!("\x1b[31;1m{message}\x1b[0m");
}

fn fail(message: String) -> ! {
    print_error(message);
    exit(1);
}
