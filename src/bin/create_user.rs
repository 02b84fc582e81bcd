use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;

use savings_tracker::{
    identity::ApiToken,
    initialize_db,
    user::{
        UserID, UserName, count_users, create_user, get_user_by_id, set_user_token_hash,
    },
};

/// A utility for registering a user and issuing their API token.
///
/// The token is printed once and only its hash is stored, so it cannot be recovered later. Use
/// `--reset` to issue a new token for an existing user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database. It is created if it does not exist.
    #[arg(long)]
    db_path: String,

    /// The display name of the new user.
    #[arg(long, required_unless_present = "reset")]
    name: Option<String>,

    /// Issue a new token for the user with this ID instead of creating a user.
    #[arg(long, conflicts_with = "name")]
    reset: Option<i64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let db_path = Path::new(&args.db_path);
    validate_db_path(db_path);

    let connection = Connection::open(db_path)?;
    initialize_db(&connection)?;

    let token = ApiToken::generate();

    match (args.reset, args.name) {
        (Some(user_id), _) => {
            let user = get_user_by_id(UserID::new(user_id), &connection)?;
            set_user_token_hash(user.id, &token.hash(), &connection)?;
            println!("Issued a new token for {} (ID {}).", user.name, user.id);
        }
        (None, Some(name)) => {
            let user = create_user(UserName::new(&name)?, &token.hash(), &connection)?;
            println!("Created user {} with ID {}.", user.name, user.id);
            println!("The database now has {} user(s).", count_users(&connection)?);
        }
        (None, None) => {
            eprintln!("Either --name or --reset must be given.");
            exit(1);
        }
    }

    println!("API token: {}", token.as_ref());
    println!("Store it somewhere safe, it will not be shown again.");

    Ok(())
}

fn validate_db_path(db_path: &Path) {
    match db_path.extension() {
        None => {
            eprintln!("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Database path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }
}
