//! Password hashing and bearer-token material.
//!
//! Passwords are stored as Argon2id PHC strings with a per-record random salt.
//! Bearer and reset tokens are random 256-bit values handed to the client once;
//! only their SHA-256 digest is persisted.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use crate::errors::ApplicationError;

const TOKEN_BYTES: usize = 32;
const SALT_BYTES: usize = 16;

pub fn hash_password(password: &SecretString) -> Result<String, ApplicationError> {
    let mut salt_bytes = [0_u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|error| ApplicationError::Integration(format!("salt encoding failed: {error}")))?;

    Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| ApplicationError::Integration(format!("password hashing failed: {error}")))
}

/// False for a wrong password and for an unparseable stored hash.
pub fn verify_password(password: &SecretString, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default().verify_password(password.expose_secret().as_bytes(), &parsed).is_ok()
}

/// A freshly minted token. `token` goes to the client, `digest` to storage.
#[derive(Debug)]
pub struct IssuedToken {
    pub token: SecretString,
    pub digest: String,
}

pub fn issue_token() -> IssuedToken {
    let mut bytes = [0_u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    let token = to_hex(&bytes);
    let digest = token_digest(&token);
    IssuedToken { token: SecretString::from(token), digest }
}

pub fn token_digest(token: &str) -> String {
    to_hex(&Sha256::digest(token.as_bytes()))
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

/// Lifetimes for sessions and password-reset tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionPolicy {
    pub session_ttl: Duration,
    pub remember_me_ttl: Duration,
    pub reset_token_ttl: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            session_ttl: Duration::hours(24),
            remember_me_ttl: Duration::days(30),
            reset_token_ttl: Duration::minutes(60),
        }
    }
}

impl SessionPolicy {
    pub fn session_ttl(&self, remember_me: bool) -> Duration {
        if remember_me {
            self.remember_me_ttl
        } else {
            self.session_ttl
        }
    }

    pub fn session_expiry(&self, issued_at: DateTime<Utc>, remember_me: bool) -> DateTime<Utc> {
        issued_at + self.session_ttl(remember_me)
    }

    pub fn reset_expiry(&self, issued_at: DateTime<Utc>) -> DateTime<Utc> {
        issued_at + self.reset_token_ttl
    }
}
