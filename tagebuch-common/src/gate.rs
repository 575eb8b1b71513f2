//! Passphrase gate for destructive actions.
//!
//! A [`GateKey`] is an argon2 verifier derived from a passphrase. It is not
//! real authentication: it only keeps edit/delete behind a shared phrase.

use argon2::{Argon2, Params};
use base64::{DecodeError, Engine, display::Base64Display, prelude::BASE64_STANDARD};
use std::{
    fmt::{Debug, Formatter},
    str::FromStr,
};
use thiserror::Error;

pub const GATE_SALT_LEN: usize = 18;
pub const GATE_HASH_LEN: usize = Params::DEFAULT_OUTPUT_LEN;

#[derive(Clone, Eq, PartialEq, Debug, Error)]
#[error("Hashing gate passphrase failed: {0}")]
pub struct GateHashError(argon2::Error);

#[derive(Clone, Eq, PartialEq, Debug, Error)]
pub enum GateKeyDecodeError {
    #[error("Not enough parts separated by ':'")]
    NotEnoughParts,
    #[error("Decoding base64 failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("The length of the salt part is incorrect")]
    InvalidSaltLength,
    #[error("The length of the hash part is incorrect")]
    InvalidHashLength,
}

#[derive(Clone, Eq, PartialEq, Hash)]
pub struct GateKey {
    salt: [u8; GATE_SALT_LEN],
    hash: Box<[u8; GATE_HASH_LEN]>,
}

impl GateKey {
    pub fn derive(passphrase: &str) -> Result<Self, GateHashError> {
        let salt = rand::random();

        Self::derive_with_salt(passphrase, salt)
    }

    fn derive_with_salt(
        passphrase: &str,
        salt: [u8; GATE_SALT_LEN],
    ) -> Result<Self, GateHashError> {
        let argon2 = Argon2::default();

        let mut hash = Box::new([0; GATE_HASH_LEN]);
        argon2
            .hash_password_into(passphrase.as_bytes(), &salt, &mut *hash)
            .map_err(GateHashError)?;

        Ok(Self { salt, hash })
    }

    pub fn verify(&self, passphrase: &str) -> Result<bool, GateHashError> {
        let candidate = Self::derive_with_salt(passphrase, self.salt)?;

        Ok(candidate.hash == self.hash)
    }

    /// String form for storage in the environment: `<salt>:<hash>`, both
    /// base64.
    #[must_use]
    pub fn as_key_str(&self) -> String {
        let encoded_salt = Base64Display::new(&self.salt, &BASE64_STANDARD);
        let encoded_hash = Base64Display::new(&*self.hash, &BASE64_STANDARD);

        format!("{encoded_salt}:{encoded_hash}")
    }
}

impl FromStr for GateKey {
    type Err = GateKeyDecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, ':');

        let salt_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;
        let hash_part = parts.next().ok_or(Self::Err::NotEnoughParts)?;

        let salt = BASE64_STANDARD
            .decode(salt_part)?
            .try_into()
            .map_err(|_| Self::Err::InvalidSaltLength)?;
        let hash = BASE64_STANDARD
            .decode(hash_part)?
            .into_boxed_slice()
            .try_into()
            .map_err(|_| Self::Err::InvalidHashLength)?;

        Ok(Self { salt, hash })
    }
}

impl Debug for GateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GateKey")
            .field("salt", &"[redacted]")
            .field("hash", &"[redacted]")
            .finish()
    }
}
