//! Dragonfruit CLI - database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending database migrations
//! df-cli migrate
//!
//! # Seed the catalog with demo products
//! df-cli seed
//!
//! # Create a user (password hash produced by your hashing tool of choice)
//! df-cli user create -e ada@example.com -n "Ada" -p '$argon2id$...' --admin
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the catalog with demo products
//! - `user create` - Create user accounts

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "df-cli")]
#[command(author, version, about = "Dragonfruit Market CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog with demo products
    Seed,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Pre-computed password hash
        #[arg(short, long)]
        password_hash: String,

        /// Grant the admin role
        #[arg(long)]
        admin: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed => commands::seed::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                email,
                name,
                password_hash,
                admin,
            } => {
                commands::user::create(&email, &name, &password_hash, admin).await?;
            }
        },
    }
    Ok(())
}
