use std::time::Duration;

/// Maximum message length of a single ledger record.
pub const RECORD_MESSAGE_CAPACITY: usize = 2187;

/// Fixed scaffold overhead reserved inside each record message.
pub const CHUNK_PADDING_LEN: usize = 19;

/// Maximum content length carried by one chunk record.
pub const CHUNK_CONTENT_LENGTH: usize = RECORD_MESSAGE_CAPACITY - CHUNK_PADDING_LEN;

/// Width reserved for a predecessor hash when measuring fragment capacity.
pub const PREVIOUS_HASH_RESERVED_LEN: usize = 81;

/// Wire key for a chunk's content inside a record message.
pub const CHUNK_CONTENT_KEY: &str = "CC";

/// Wire key for a fragment's predecessor hash.
pub const PREVIOUS_HASH_KEY: &str = "PCTFH";

/// Wire key for the total chunk count carried by every fragment.
pub const TOTAL_CHUNK_COUNT_KEY: &str = "TC";

/// Sentinel marking the head of the fragment chain (no predecessor).
pub const FIRST_FRAGMENT_SENTINEL: &str = "1st";

/// Tag attached to every record written by this crate.
pub const RECORD_TAG: &str = "LEDGERSTASH";

/// Ledger seed length in characters.
pub const SEED_LEN: usize = 81;

/// Alphabet a ledger seed is drawn from.
pub const SEED_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ9";

/// Default number of re-sweeps after the initial one before giving up.
pub const DEFAULT_MAX_RETRIES: u32 = 8;

/// Default backoff before the first re-sweep; doubles each sweep.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// Ceiling for the doubling retry backoff.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(8);

/// Default bound on concurrent in-flight gateway operations.
pub const DEFAULT_MAX_IN_FLIGHT: usize = 16;

/// PBKDF2 iterations for deriving the sealing key from a secret.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

/// Salt length for the sealing key derivation.
pub const SECRET_SALT_LEN: usize = 16;

/// AES-GCM nonce length.
pub const SECRET_NONCE_LEN: usize = 12;

/// Sealing key length (AES-256).
pub const SECRET_KEY_LEN: usize = 32;
