use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use music_catalog_api::{SqliteCatalogStore, UserRole, UserStore};

fn parse_path(s: &str) -> Result<PathBuf> {
    let original_path = PathBuf::from(s);
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

/// Manages user roles directly on the catalog database.
#[derive(Parser, Debug)]
struct CliArgs {
    /// Path to catalog.db.
    #[clap(long, value_parser = parse_path)]
    pub db: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grants the admin role to the user with the given email.
    Promote { email: String },

    /// Turns the user with the given email back into a regular user.
    Demote { email: String },

    /// Prints the user registered with the given email.
    Show { email: String },
}

fn set_role(store: &SqliteCatalogStore, email: &str, role: UserRole) -> Result<()> {
    let Some(user) = store.get_user_by_email(&email.to_lowercase())? else {
        bail!("No user registered with email {}", email);
    };
    if user.role == role {
        println!("{} is already {}", user.email, role);
        return Ok(());
    }
    store.set_user_role(&user.id, role)?;
    println!("{} is now {}", user.email, role);
    Ok(())
}

fn main() -> Result<()> {
    let args = CliArgs::parse();
    if !args.db.exists() {
        bail!("Database file {:?} does not exist", args.db);
    }
    let store = SqliteCatalogStore::new(&args.db)?;

    match args.command {
        Command::Promote { email } => set_role(&store, &email, UserRole::Admin),
        Command::Demote { email } => set_role(&store, &email, UserRole::User),
        Command::Show { email } => {
            let Some(user) = store.get_user_by_email(&email.to_lowercase())? else {
                bail!("No user registered with email {}", email);
            };
            println!("{}", serde_json::to_string_pretty(&user)?);
            Ok(())
        }
    }
}
