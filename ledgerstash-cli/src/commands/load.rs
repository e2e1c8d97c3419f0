use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use ledgerstash_core::{generate_seed, DataKind, Payload, Stash};

use crate::commands::resolve_secret;
use crate::ledger::FileLedger;

/// Load a payload by entry hash and write it to a file or stdout.
pub async fn run_load(
    entry_hash: &str,
    output: Option<&str>,
    text: bool,
    decrypt: bool,
    ledger_dir: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let secret = if decrypt {
        Some(resolve_secret("Enter secret: ")?)
    } else {
        None
    };

    let kind = if text { DataKind::Text } else { DataKind::Bytes };

    let gateway = Arc::new(FileLedger::new(Path::new(ledger_dir)));
    // Loading never signs anything; any seed satisfies the gateway.
    let stash = Stash::new(gateway, generate_seed());
    let payload = stash.load(entry_hash, kind, secret.as_deref()).await?;

    match (output, payload) {
        (Some(path), payload) => {
            let bytes = payload.into_bytes();
            tokio::fs::write(path, &bytes)
                .await
                .map_err(|e| format!("failed to write output: {e}"))?;
            info!(bytes = bytes.len(), path, "payload written");
        }
        (None, Payload::Text(text)) => println!("{text}"),
        (None, Payload::Bytes(bytes)) => {
            std::io::stdout().write_all(&bytes)?;
        }
    }
    Ok(())
}
