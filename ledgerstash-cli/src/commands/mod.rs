pub mod save;
pub mod load;

use std::env;

/// Resolve the sealing secret: the LEDGERSTASH_SECRET env var wins, otherwise
/// prompt on the terminal.
pub fn resolve_secret(prompt: &str) -> Result<String, Box<dyn std::error::Error>> {
    match env::var("LEDGERSTASH_SECRET") {
        Ok(secret) => Ok(secret),
        Err(_) => Ok(rpassword::prompt_password(prompt)?),
    }
}
