//! Configurator CLI - database migrations, catalog seeding and admin accounts.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! cfg-cli migrate
//!
//! # Insert the starter catalog
//! cfg-cli seed options
//!
//! # Insert options from a YAML file into a JSON catalog file
//! cfg-cli seed options --file options.yaml --catalog-file data/options.json
//!
//! # Create an admin account (password read from CONFIGURATOR_ADMIN_PASSWORD)
//! cfg-cli admin create -e admin@example.com
//!
//! # Print an Argon2 hash for CONFIGURATOR_ADMIN_PASSWORD_HASH
//! cfg-cli admin hash
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "cfg-cli")]
#[command(author, version, about = "Add-on configurator CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the catalog
    Seed {
        #[command(subcommand)]
        target: SeedTarget,
    },
    /// Manage admin accounts
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum SeedTarget {
    /// Insert options as new catalog records
    Options {
        /// YAML file with an `options` list (defaults to the starter catalog)
        #[arg(short, long)]
        file: Option<String>,

        /// Write to this JSON catalog file instead of `PostgreSQL`
        #[arg(long)]
        catalog_file: Option<String>,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin account
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Environment variable holding the password
        #[arg(long, default_value = "CONFIGURATOR_ADMIN_PASSWORD")]
        password_env: String,
    },
    /// Print an Argon2 hash of a password
    Hash {
        /// Environment variable holding the password
        #[arg(long, default_value = "CONFIGURATOR_ADMIN_PASSWORD")]
        password_env: String,
    },
    /// Block an admin from signing in
    Disable {
        /// Admin email address
        #[arg(short, long)]
        email: String,
    },
    /// Allow a disabled admin to sign in again
    Enable {
        /// Admin email address
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
        Commands::Seed { target } => match target {
            SeedTarget::Options { file, catalog_file } => {
                commands::seed::options(file.as_deref(), catalog_file.as_deref()).await?;
            }
        },
        Commands::Admin { action } => match action {
            AdminAction::Create {
                email,
                password_env,
            } => {
                commands::admin::create(&email, &password_env).await?;
            }
            AdminAction::Hash { password_env } => commands::admin::hash(&password_env)?,
            AdminAction::Disable { email } => commands::admin::set_disabled(&email, true).await?,
            AdminAction::Enable { email } => commands::admin::set_disabled(&email, false).await?,
        },
    }
    Ok(())
}
