/// OAuth anti-forgery state values
///
/// The connect flow sends a random `state` to the provider and expects it
/// back on the callback. Only the SHA-256 hash is persisted (see
/// `models::oauth_state`), the same way API secrets are stored hashed.
///
/// # Example
///
/// ```
/// use pagepilot_shared::auth::oauth_state::{generate_state, hash_state};
///
/// let state = generate_state();
/// assert_eq!(state.len(), 43);
/// assert_eq!(hash_state(&state).len(), 64);
/// ```

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Duration;
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Random bytes per state value (256 bits)
const STATE_BYTES: usize = 32;

/// How long an issued state stays redeemable
pub fn state_ttl() -> Duration {
    Duration::minutes(10)
}

/// Generates a URL-safe state value from the OS CSPRNG
pub fn generate_state() -> String {
    let mut bytes = [0u8; STATE_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Hex-encoded SHA-256 of a state value
pub fn hash_state(state: &str) -> String {
    hex::encode(Sha256::digest(state.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_state_is_url_safe() {
        let state = generate_state();
        assert_eq!(state.len(), 43);
        assert!(state
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_states_do_not_repeat() {
        let states: HashSet<String> = (0..256).map(|_| generate_state()).collect();
        assert_eq!(states.len(), 256);
    }

    #[test]
    fn test_hash_is_deterministic_hex() {
        let hash = hash_state("abc");
        assert_eq!(
            hash,
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_eq!(hash, hash_state("abc"));
        assert_ne!(hash, hash_state("abd"));
    }

    #[test]
    fn test_ttl_is_ten_minutes() {
        assert_eq!(state_ttl().num_seconds(), 600);
    }
}
