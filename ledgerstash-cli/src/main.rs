mod commands;
mod ledger;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ledgerstash", about = "Persist any payload onto a ledger as chained chunks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Persist a file (or literal text) and print its entry hash
    Save {
        /// Path to the file to persist, or the literal text with --text
        input: String,

        /// Treat the input argument as literal text instead of a file path
        #[arg(long)]
        text: bool,

        /// Encrypt the payload with a secret (prompted, or LEDGERSTASH_SECRET)
        #[arg(long)]
        encrypt: bool,

        /// Ledger records directory
        #[arg(long, default_value = ".ledgerstash/records")]
        ledger_dir: String,

        /// Ledger seed; a fresh one is generated when omitted
        #[arg(long)]
        seed: Option<String>,
    },

    /// Load a payload by entry hash
    Load {
        /// Entry hash returned by save
        entry_hash: String,

        /// Output file path; stdout when omitted
        #[arg(long)]
        output: Option<String>,

        /// Decode the payload as UTF-8 text
        #[arg(long)]
        text: bool,

        /// Decrypt the payload with a secret (prompted, or LEDGERSTASH_SECRET)
        #[arg(long)]
        decrypt: bool,

        /// Ledger records directory
        #[arg(long, default_value = ".ledgerstash/records")]
        ledger_dir: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing (controlled by RUST_LOG env var).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Save {
            input,
            text,
            encrypt,
            ledger_dir,
            seed,
        } => commands::save::run_save(&input, text, encrypt, &ledger_dir, seed).await,
        Commands::Load {
            entry_hash,
            output,
            text,
            decrypt,
            ledger_dir,
        } => commands::load::run_load(&entry_hash, output.as_deref(), text, decrypt, &ledger_dir).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
