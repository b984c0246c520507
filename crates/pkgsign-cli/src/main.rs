use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use pkgsign_cli::config;

#[derive(Parser)]
#[command(name = "pkgsign", about = "signing key and artifact verification tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a keypair and an unsigned key manifest template
    Keygen {
        /// Base name for the .priv/.pub/.json files
        name: String,
        /// Human-readable key description
        #[arg(long, default_value = "signing key")]
        desc: String,
        /// Capability the key may sign for (repeatable)
        #[arg(long = "can-sign")]
        can_sign: Vec<String>,
        /// Validity window in days
        #[arg(long, default_value_t = 365)]
        valid_days: i64,
        /// Output directory (defaults to the configured key directory)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Countersign a key manifest with a parent key
    SignKey {
        /// Manifest JSON file to sign in place
        manifest: PathBuf,
        /// Parent secret key (.priv file)
        parent_key: PathBuf,
    },
    /// Add a key to a revocation list and re-sign it
    Revoke {
        /// Revocation list JSON file (created if absent)
        list: PathBuf,
        /// Key-id (hex) to revoke
        key: String,
        /// End of the key's validity; omitted means revoked for all times
        #[arg(long)]
        valid_until: Option<DateTime<Utc>>,
        /// Secret key (.priv file) holding the revoke capability
        signing_key: PathBuf,
    },
    /// Write a detached .sig file for an arbitrary file
    SignFile {
        /// File to sign
        file: PathBuf,
        /// Secret key (.priv file)
        signing_key: PathBuf,
    },
    /// Download an artifact and verify its signature
    Verify {
        /// Artifact URL
        url: String,
        /// Download type capability
        #[arg(long, default_value = "plugins")]
        kind: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&config::default_config_path())?;

    match cli.command {
        Commands::Keygen {
            name,
            desc,
            can_sign,
            valid_days,
            dir,
        } => {
            let dir = dir.unwrap_or_else(|| cfg.key_dir.clone());
            pkgsign_cli::commands::keygen::run_keygen(&dir, &name, &desc, &can_sign, valid_days)?;
        }
        Commands::SignKey {
            manifest,
            parent_key,
        } => {
            pkgsign_cli::commands::sign_key::run_sign_key(&manifest, &parent_key)?;
        }
        Commands::Revoke {
            list,
            key,
            valid_until,
            signing_key,
        } => {
            pkgsign_cli::commands::revoke::run_revoke(&list, &key, valid_until, &signing_key)?;
        }
        Commands::SignFile { file, signing_key } => {
            pkgsign_cli::commands::sign_file::run_sign_file(&file, &signing_key)?;
        }
        Commands::Verify { url, kind } => {
            pkgsign_cli::commands::verify::run_verify(&url, &kind, &cfg).await?;
        }
    }
    Ok(())
}
