use std::path::Path;
use std::sync::Arc;

use tracing::info;

use ledgerstash_core::{generate_seed, Payload, Stash};

use crate::commands::resolve_secret;
use crate::ledger::FileLedger;

/// Persist a file or literal text onto the ledger and print the entry hash.
pub async fn run_save(
    input: &str,
    text: bool,
    encrypt: bool,
    ledger_dir: &str,
    seed: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let payload = if text {
        Payload::Text(input.to_string())
    } else {
        let path = Path::new(input);
        if !path.exists() {
            return Err(format!("file not found: {input}").into());
        }
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| format!("failed to read file: {e}"))?;
        Payload::Bytes(data)
    };
    info!(bytes = payload.as_bytes().len(), "saving payload");

    let secret = if encrypt {
        Some(resolve_secret("Enter secret: ")?)
    } else {
        None
    };

    let seed = seed.unwrap_or_else(|| {
        let seed = generate_seed();
        info!("generated a fresh ledger seed");
        seed
    });

    let gateway = Arc::new(FileLedger::new(Path::new(ledger_dir)));
    let stash = Stash::new(gateway, seed);
    let entry_hash = stash.save(&payload, secret.as_deref()).await?;

    println!("{entry_hash}");
    Ok(())
}
