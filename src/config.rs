//! Runtime configuration.
//!
//! Only the entropy source is configurable. Work-factor bounds and the
//! default cost are fixed so that stored hashes stay compatible.

use thiserror::Error;

use crate::crypto::Entropy;
use crate::hasher::PasswordHasher;

/// Environment variable selecting the entropy source (`os` or a path).
pub const ENTROPY_ENV: &str = "BCRYPT_SQL_ENTROPY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid BCRYPT_SQL_ENTROPY: {0}")]
    InvalidEntropy(String),
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    entropy: Entropy,
}

impl Config {
    pub fn new(entropy: Entropy) -> Self {
        Self { entropy }
    }

    /// Parses an `--entropy` / `BCRYPT_SQL_ENTROPY` value.
    pub fn from_entropy_str(value: &str) -> Result<Self, ConfigError> {
        let entropy = value.parse().map_err(ConfigError::InvalidEntropy)?;
        Ok(Self::new(entropy))
    }

    pub fn entropy(&self) -> &Entropy {
        &self.entropy
    }

    pub fn hasher(&self) -> PasswordHasher {
        PasswordHasher::with_entropy_source(self.entropy.clone())
    }
}
