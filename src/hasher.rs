//! Password hashing and verification.

use log::{debug, warn};

use crate::crypto::{
    BcryptPrimitive, Blowfish, CBuffer, Entropy, EntropySource, HASH_SIZE, PASS_MAX_LEN,
    RANDOM_BYTES, Variant, ct_eq, read_random,
};
use crate::error::{Error, Result};

/// Lowest work factor a new hash is created with.
pub const WORK_FACTOR_MIN: u32 = 4;
/// Highest work factor a new hash is created with.
pub const WORK_FACTOR_MAX: u32 = 16;
/// Work factor used when the caller gives none.
pub const WORK_FACTOR_DEFAULT: u32 = 12;

/// Prefix stamped on every new hash.
pub const HASH_VARIANT: Variant = Variant::TwoB;

type PasswordBuf = CBuffer<{ PASS_MAX_LEN + 1 }>;
type HashBuf = CBuffer<HASH_SIZE>;

/// bcrypt cost for a new hash.
///
/// Out-of-range requests are pulled to the nearest bound rather than
/// rejected, so hashes of any historical cost keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkFactor(u32);

impl Default for WorkFactor {
    fn default() -> Self {
        Self(WORK_FACTOR_DEFAULT)
    }
}

impl WorkFactor {
    pub fn clamped(requested: i64) -> Self {
        let clamped = requested.clamp(i64::from(WORK_FACTOR_MIN), i64::from(WORK_FACTOR_MAX));
        // within [4, 16] after the clamp
        Self(clamped as u32)
    }

    pub fn resolve(requested: Option<i64>) -> Self {
        requested.map(Self::clamped).unwrap_or_default()
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

/// Outcome of a verification, as the host sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Match,
    NoMatch,
    /// Verification could not run.
    Error,
}

impl Verdict {
    /// SQL encoding: 1, 0 or NULL.
    pub fn to_sql(self) -> Option<i64> {
        match self {
            Verdict::Match => Some(1),
            Verdict::NoMatch => Some(0),
            Verdict::Error => None,
        }
    }
}

impl From<Result<bool>> for Verdict {
    fn from(result: Result<bool>) -> Self {
        match result {
            Ok(true) => Verdict::Match,
            Ok(false) => Verdict::NoMatch,
            Err(_) => Verdict::Error,
        }
    }
}

/// Hashes and verifies passwords.
///
/// Holds no per-call state: every call copies its inputs into its own
/// buffers and draws its own randomness, so one instance can serve any
/// number of threads.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher<E = Entropy, P = Blowfish> {
    entropy: E,
    primitive: P,
}

impl PasswordHasher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entropy_source(entropy: Entropy) -> Self {
        Self::with_parts(entropy, Blowfish)
    }
}

impl<E: EntropySource, P: BcryptPrimitive> PasswordHasher<E, P> {
    pub fn with_parts(entropy: E, primitive: P) -> Self {
        Self { entropy, primitive }
    }

    /// Hashes `password` with a fresh random salt.
    ///
    /// `cost` of `None` means the default work factor; other values are
    /// clamped into range.
    pub fn hash(&self, password: Option<&[u8]>, cost: Option<i64>) -> Result<String> {
        let password = PasswordBuf::from_bytes(password)
            .map_err(|e| Error::from_copy(e, "password"))
            .inspect_err(|e| debug!("hash: rejected input: {e}"))?;

        let cost = WorkFactor::resolve(cost);

        let seed = zeroize::Zeroizing::new(
            read_random::<RANDOM_BYTES, _>(&self.entropy)
                .inspect_err(|e| warn!("hash: {e}"))?,
        );

        let salt = self
            .primitive
            .generate_salt(HASH_VARIANT.prefix(), cost.get(), &seed[..], HASH_SIZE)
            .inspect_err(|e| warn!("hash: salt generation: {e}"))?;

        self.primitive
            .compute_hash(password.as_bytes(), &salt, HASH_SIZE)
            .inspect_err(|e| warn!("hash: {e}"))
    }

    /// Checks `password` against `stored_hash`.
    ///
    /// `Ok(false)` means the check ran and the password is wrong; `Err`
    /// means the check could not run.
    pub fn verify(&self, password: Option<&[u8]>, stored_hash: Option<&[u8]>) -> Result<bool> {
        let password = PasswordBuf::from_bytes(password)
            .map_err(|e| Error::from_copy(e, "password"))
            .inspect_err(|e| debug!("verify: rejected input: {e}"))?;

        let stored = HashBuf::from_bytes(stored_hash)
            .map_err(|e| Error::from_copy(e, "stored hash"))
            .inspect_err(|e| debug!("verify: rejected input: {e}"))?;

        let setting = std::str::from_utf8(stored.as_bytes())
            .map_err(|_| Error::PrimitiveFailure("stored hash is not ASCII".to_string()))
            .inspect_err(|e| debug!("verify: {e}"))?;

        let computed = self
            .primitive
            .compute_hash(password.as_bytes(), setting, HASH_SIZE)
            .inspect_err(|e| debug!("verify: {e}"))?;

        Ok(ct_eq(stored.as_bytes_with_nul(), computed.as_bytes()))
    }

    /// [`verify`](Self::verify) folded into the three-way outcome.
    pub fn check(&self, password: Option<&[u8]>, stored_hash: Option<&[u8]>) -> Verdict {
        self.verify(password, stored_hash).into()
    }
}
