use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use hmac::Hmac;
use rand::RngCore;
use sha2::Sha256;

use super::{CryptoError, Result};
use crate::constants::{
    PBKDF2_ITERATIONS, SECRET_KEY_LEN, SECRET_NONCE_LEN, SECRET_SALT_LEN,
};

/// Derive the sealing key from a secret and salt using PBKDF2-HMAC-SHA256.
fn derive_key(secret: &[u8], salt: &[u8], iterations: u32) -> Result<[u8; SECRET_KEY_LEN]> {
    let mut output = [0u8; SECRET_KEY_LEN];
    pbkdf2::pbkdf2::<Hmac<Sha256>>(secret, salt, iterations, &mut output)
        .map_err(|e| CryptoError::KeyDerive(e.to_string()))?;
    Ok(output)
}

/// Seal a datastring with a secret.
///
/// Envelope layout: `base64(salt || nonce || ciphertext)` with a random 16-byte
/// salt and 12-byte nonce. The AES-256-GCM auth tag makes a wrong secret fail
/// cleanly instead of yielding garbage.
pub fn seal(plaintext: &str, secret: &str) -> Result<String> {
    let mut salt = [0u8; SECRET_SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt);
    let mut nonce = [0u8; SECRET_NONCE_LEN];
    rand::thread_rng().fill_bytes(&mut nonce);

    let key = derive_key(secret.as_bytes(), &salt, PBKDF2_ITERATIONS)?;
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| CryptoError::Seal(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext.as_bytes())
        .map_err(|e| CryptoError::Seal(e.to_string()))?;

    let mut envelope = Vec::with_capacity(SECRET_SALT_LEN + SECRET_NONCE_LEN + ciphertext.len());
    envelope.extend_from_slice(&salt);
    envelope.extend_from_slice(&nonce);
    envelope.extend_from_slice(&ciphertext);
    Ok(STANDARD.encode(envelope))
}

/// Open a sealed envelope with a secret, verifying the auth tag.
pub fn open(envelope: &str, secret: &str) -> Result<String> {
    let raw = STANDARD
        .decode(envelope)
        .map_err(|_| CryptoError::InvalidEnvelope)?;
    if raw.len() < SECRET_SALT_LEN + SECRET_NONCE_LEN {
        return Err(CryptoError::InvalidEnvelope);
    }

    let (salt, rest) = raw.split_at(SECRET_SALT_LEN);
    let (nonce, ciphertext) = rest.split_at(SECRET_NONCE_LEN);

    let key = derive_key(secret.as_bytes(), salt, PBKDF2_ITERATIONS)?;
    let cipher = Aes256Gcm::new_from_slice(&key)
        .map_err(|e| CryptoError::Open(e.to_string()))?;

    let plaintext = cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| CryptoError::Open(e.to_string()))?;

    String::from_utf8(plaintext).map_err(|e| CryptoError::Open(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seal_open_roundtrip() {
        let sealed = seal("aGVsbG8gd29ybGQ=", "hunter2").unwrap();
        let opened = open(&sealed, "hunter2").unwrap();
        assert_eq!(opened, "aGVsbG8gd29ybGQ=");
    }

    #[test]
    fn test_sealed_differs_from_plaintext() {
        let sealed = seal("aGVsbG8=", "secret").unwrap();
        assert_ne!(sealed, "aGVsbG8=");
    }

    #[test]
    fn test_open_wrong_secret_fails() {
        let sealed = seal("payload", "right").unwrap();
        assert!(open(&sealed, "wrong").is_err());
    }

    #[test]
    fn test_open_garbage_fails() {
        assert!(open("not base64 at all!!", "secret").is_err());
        assert!(open("AAAA", "secret").is_err());
    }

    #[test]
    fn test_fresh_salt_per_seal() {
        let a = seal("same input", "same secret").unwrap();
        let b = seal("same input", "same secret").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_derive_key_deterministic() {
        let k1 = derive_key(b"secret", &[0x11; SECRET_SALT_LEN], 1000).unwrap();
        let k2 = derive_key(b"secret", &[0x11; SECRET_SALT_LEN], 1000).unwrap();
        assert_eq!(k1, k2);
        let k3 = derive_key(b"other", &[0x11; SECRET_SALT_LEN], 1000).unwrap();
        assert_ne!(k1, k3);
    }
}
