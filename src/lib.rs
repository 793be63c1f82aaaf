//! bcrypt password hashing and verification for SQL engines.
//!
//! The two operations behind `BCRYPT_HASH()` and `BCRYPT_CHECK()`:
//! [`PasswordHasher::hash`] and [`PasswordHasher::verify`]. The [`udf`]
//! module adapts them to host argument and result conventions.

mod config;
pub mod crypto;
mod error;
mod hasher;
pub mod udf;

pub use crate::config::{Config, ConfigError, ENTROPY_ENV};
pub use crate::error::{Error, Result};
pub use crate::hasher::{
    HASH_VARIANT, PasswordHasher, Verdict, WORK_FACTOR_DEFAULT, WORK_FACTOR_MAX, WORK_FACTOR_MIN,
    WorkFactor,
};

/// Hashes `password` with the default hasher (OS entropy, bcrypt `$2b$`).
pub fn hash_password(password: Option<&[u8]>, cost: Option<i64>) -> Result<String> {
    PasswordHasher::new().hash(password, cost)
}

/// Verifies `password` against `stored_hash` with the default hasher.
pub fn verify_password(password: Option<&[u8]>, stored_hash: Option<&[u8]>) -> Verdict {
    PasswordHasher::new().check(password, stored_hash)
}
