//! Ecommerce CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! ecommerce-cli migrate
//!
//! # Load users and orders from a YAML file
//! ecommerce-cli seed --file seed.yaml
//!
//! # Create a user
//! ecommerce-cli user create -n "Anna" -e anna@example.com
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Seed the database from YAML
//! - `user create` - Create a user

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ecommerce-cli")]
#[command(author, version, about = "Ecommerce API CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with users and orders from a YAML file
    Seed {
        /// Path to the YAML file
        #[arg(short, long)]
        file: String,
    },
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Email address (must be unique)
        #[arg(short, long)]
        email: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
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
        Commands::Seed { file } => {
            commands::seed::from_file(&file).await?;
        }
        Commands::User { action } => match action {
            UserAction::Create { name, email } => {
                commands::user::create(&name, &email).await?;
            }
        },
    }
    Ok(())
}
