use anyhow::{Context, Result};
use bcrypt_sql::{Config, ENTROPY_ENV};
use clap::{Parser, Subcommand};

mod auth;
mod logging;

#[derive(Debug, Parser)]
#[command(name = "bcrypt-sql")]
#[command(
    version,
    about = "bcrypt password hashing and verification, as exposed to SQL."
)]
struct Cli {
    /// Entropy source: `os`, or a device path such as /dev/urandom
    #[arg(long, global = true, value_name = "SOURCE", env = ENTROPY_ENV)]
    entropy: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Hashes a password with a fresh random salt
    Hash {
        /// Work factor, clamped to 4..=16 [default: 12]
        #[arg(long, allow_negative_numbers = true)]
        cost: Option<i64>,
    },

    /// Checks a password against a stored hash; prints 1 or 0
    #[command(arg_required_else_help = true)]
    Check { hash: String },
}

fn main() -> Result<()> {
    // a missing .env file is fine
    let _ = dotenvy::dotenv();
    let _logger = logging::init()?;

    let args = Cli::parse();
    let config = match args.entropy.as_deref() {
        Some(source) => Config::from_entropy_str(source)?,
        None => Config::default(),
    };
    log::debug!("entropy source: {}", config.entropy());
    let hasher = config.hasher();

    match args.command {
        Commands::Hash { cost } => {
            let password = auth::read_new_password_with_confirmation()?;
            let hash = hasher
                .hash(Some(password.as_bytes()), cost)
                .context("failed to hash password")?;
            println!("{hash}");
        }
        Commands::Check { hash } => {
            let password = auth::read_password()?;
            let matched = hasher
                .verify(Some(password.as_bytes()), Some(hash.as_bytes()))
                .context("unable to verify password")?;
            println!("{}", u8::from(matched));
        }
    }

    Ok(())
}
