//! Building blocks for the SQL-callable operations.
//!
//! Provides entropy, NUL-terminated buffer handling, constant-time
//! comparison, and the seam to the bcrypt cipher itself.

pub mod consttime;
pub mod cstr;
pub mod primitive;
pub mod random;

pub use consttime::{ct_diff, ct_eq};
pub use cstr::{CBuffer, CopyError, copy_c_str};
pub use primitive::{BcryptPrimitive, Blowfish, Setting, Variant};
pub use random::{DeviceEntropy, Entropy, EntropySource, OsEntropy, read_random};

/// Size of a bcrypt hash buffer, terminator included (64 bytes).
pub const HASH_SIZE: usize = 64;
/// Number of random bytes fed into salt generation (16 bytes).
pub const RANDOM_BYTES: usize = 16;
/// Longest accepted plaintext password (128 bytes).
pub const PASS_MAX_LEN: usize = 128;
/// Length of an encoded bcrypt salt (22 characters).
pub const ENCODED_SALT_LEN: usize = 22;
/// Length of a `$2b$NN$` setting header (7 characters).
pub const SETTING_HEADER_LEN: usize = 7;
