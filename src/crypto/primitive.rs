//! The bcrypt cipher seam.
//!
//! Everything above this module treats bcrypt as two opaque operations:
//! turn random bytes into a salt string, and turn a password plus a salt
//! (or a whole existing hash) into a hash string. [`Blowfish`] is the
//! default backend; any type implementing [`BcryptPrimitive`] can stand in.

use std::fmt;

use base64::Engine;
use base64::alphabet::BCRYPT;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use bcrypt::Version;

use super::{ENCODED_SALT_LEN, RANDOM_BYTES, SETTING_HEADER_LEN};
use crate::error::{Error, Result};

/// Smallest cost the cipher accepts.
pub const MIN_COST: u32 = 4;
/// Largest cost the cipher accepts.
pub const MAX_COST: u32 = 31;
/// Cost substituted when salt generation is asked for cost 0.
pub const DEFAULT_COST: u32 = 5;

// The last salt character carries 4 unused bits; they are ignored on input
// and always emitted as zero.
const BCRYPT_B64: GeneralPurpose = GeneralPurpose::new(
    &BCRYPT,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::RequireNone)
        .with_decode_allow_trailing_bits(true),
);

pub trait BcryptPrimitive {
    /// Builds a `$2?$NN$` + 22-character salt string from `entropy`.
    ///
    /// `capacity` is the size of the caller's output buffer, terminator
    /// included; a result that would not fit is an error.
    fn generate_salt(
        &self,
        prefix: &str,
        cost: u32,
        entropy: &[u8],
        capacity: usize,
    ) -> Result<String>;

    /// Hashes `password` with the variant, cost and salt found in `setting`.
    ///
    /// `setting` may be a bare salt string or a complete hash; anything
    /// after the salt is ignored. `password` must not contain NUL.
    fn compute_hash(&self, password: &[u8], setting: &str, capacity: usize) -> Result<String>;
}

/// bcrypt hash-format identifiers.
///
/// `$2a$`, `$2b$` and `$2y$` can be generated and verified. `$2x$` marks
/// hashes from the sign-extension bug in old crypt_blowfish; it is only
/// verified, and only for passwords without bytes >= 0x80, where the bug
/// had no effect.
///
/// `$2a$` hashes of passwords with bytes >= 0x80 are computed with the
/// correct algorithm. crypt_blowfish applies an extra countermeasure to
/// some of those, so such a stored hash can verify as a mismatch here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    TwoA,
    TwoB,
    TwoX,
    TwoY,
}

impl Variant {
    pub fn prefix(self) -> &'static str {
        match self {
            Variant::TwoA => "$2a$",
            Variant::TwoB => "$2b$",
            Variant::TwoX => "$2x$",
            Variant::TwoY => "$2y$",
        }
    }

    pub fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "$2a$" => Some(Variant::TwoA),
            "$2b$" => Some(Variant::TwoB),
            "$2x$" => Some(Variant::TwoX),
            "$2y$" => Some(Variant::TwoY),
            _ => None,
        }
    }

    fn version(self) -> Version {
        match self {
            Variant::TwoA => Version::TwoA,
            Variant::TwoB => Version::TwoB,
            Variant::TwoX => Version::TwoX,
            Variant::TwoY => Version::TwoY,
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// The parameters embedded at the front of a salt string or hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Setting {
    variant: Variant,
    cost: u32,
    salt: [u8; RANDOM_BYTES],
}

impl Setting {
    pub fn parse(setting: &str) -> Result<Self> {
        let bytes = setting.as_bytes();
        if bytes.len() < SETTING_HEADER_LEN + ENCODED_SALT_LEN {
            return Err(invalid("setting too short"));
        }

        let variant = setting
            .get(..4)
            .and_then(Variant::from_prefix)
            .ok_or_else(|| invalid("unsupported prefix"))?;

        if !bytes[4].is_ascii_digit() || !bytes[5].is_ascii_digit() || bytes[6] != b'$' {
            return Err(invalid("malformed cost"));
        }
        let cost = u32::from(bytes[4] - b'0') * 10 + u32::from(bytes[5] - b'0');
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(invalid("cost out of range"));
        }

        let encoded = setting
            .get(SETTING_HEADER_LEN..SETTING_HEADER_LEN + ENCODED_SALT_LEN)
            .ok_or_else(|| invalid("malformed salt"))?;
        let salt: [u8; RANDOM_BYTES] = BCRYPT_B64
            .decode(encoded)
            .map_err(|e| Error::PrimitiveFailure(format!("malformed salt: {e}")))?
            .try_into()
            .map_err(|_| invalid("salt has wrong length"))?;

        Ok(Self { variant, cost, salt })
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    pub fn salt(&self) -> &[u8; RANDOM_BYTES] {
        &self.salt
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{:02}${}",
            self.variant,
            self.cost,
            BCRYPT_B64.encode(self.salt)
        )
    }
}

fn invalid(msg: &str) -> Error {
    Error::PrimitiveFailure(format!("invalid bcrypt setting: {msg}"))
}

/// bcrypt backed by the `bcrypt` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blowfish;

impl BcryptPrimitive for Blowfish {
    fn generate_salt(
        &self,
        prefix: &str,
        cost: u32,
        entropy: &[u8],
        capacity: usize,
    ) -> Result<String> {
        let variant = Variant::from_prefix(prefix)
            .filter(|v| *v != Variant::TwoX)
            .ok_or_else(|| Error::PrimitiveFailure(format!("unsupported prefix {prefix:?}")))?;

        let cost = if cost == 0 { DEFAULT_COST } else { cost };
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(Error::PrimitiveFailure(format!(
                "cost {cost} outside {MIN_COST}..={MAX_COST}"
            )));
        }

        let salt: [u8; RANDOM_BYTES] = entropy
            .get(..RANDOM_BYTES)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| {
                Error::PrimitiveFailure(format!(
                    "need {RANDOM_BYTES} random bytes, got {}",
                    entropy.len()
                ))
            })?;

        if capacity < SETTING_HEADER_LEN + ENCODED_SALT_LEN + 1 {
            return Err(Error::PrimitiveFailure(format!(
                "salt buffer of {capacity} bytes is too small"
            )));
        }

        Ok(Setting {
            variant,
            cost,
            salt,
        }
        .to_string())
    }

    fn compute_hash(&self, password: &[u8], setting: &str, capacity: usize) -> Result<String> {
        let setting = Setting::parse(setting)?;

        if setting.variant == Variant::TwoX && !password.is_ascii() {
            return Err(Error::PrimitiveFailure(
                "$2x$ hashes of 8-bit passwords cannot be reproduced".to_string(),
            ));
        }

        let hash = bcrypt::hash_with_salt(password, setting.cost, setting.salt)
            .map_err(|e| Error::PrimitiveFailure(format!("bcrypt failed: {e}")))?
            .format_for_version(setting.variant.version());

        if hash.len() + 1 > capacity {
            return Err(Error::PrimitiveFailure(format!(
                "hash buffer of {capacity} bytes is too small"
            )));
        }

        Ok(hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::HASH_SIZE;

    const U_STAR_U: &str = "$2a$05$CCCCCCCCCCCCCCCCCCCCC.E5YPO9kmyuRGyh0XouQYb4YMJKvyOeW";
    const PASSWORD_2Y: &str = "$2y$05$bvIG6Nmid91Mu9RcmmWZfO5HJIMCT8riNW0hEp8f6/FuA2/mHZFpe";

    #[test]
    fn known_answers() {
        assert_eq!(
            Blowfish.compute_hash(b"U*U", U_STAR_U, HASH_SIZE).unwrap(),
            U_STAR_U
        );
        assert_eq!(
            Blowfish
                .compute_hash(b"password", PASSWORD_2Y, HASH_SIZE)
                .unwrap(),
            PASSWORD_2Y
        );
    }

    #[test]
    fn legacy_2x_verifies_ascii_passwords() {
        let legacy = U_STAR_U.replacen("$2a$", "$2x$", 1);
        assert_eq!(
            Blowfish.compute_hash(b"U*U", &legacy, HASH_SIZE).unwrap(),
            legacy
        );
        assert!(matches!(
            Blowfish.compute_hash(b"\xff\xff\xa3", &legacy, HASH_SIZE),
            Err(Error::PrimitiveFailure(_))
        ));
    }

    #[test]
    fn bare_salt_and_full_hash_agree() {
        let from_salt = Blowfish
            .compute_hash(b"U*U", &U_STAR_U[..29], HASH_SIZE)
            .unwrap();
        assert_eq!(from_salt, U_STAR_U);
    }

    #[test]
    fn bytes_past_seventy_two_are_ignored() {
        let hash = "$2a$05$abcdefghijklmnopqrstuu5s2v8.iXieOjg/.AySBTTZIIVFJeBui";
        let long = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789chars after 72 are ignored";
        assert_eq!(Blowfish.compute_hash(long, hash, HASH_SIZE).unwrap(), hash);
    }

    #[test]
    fn unused_salt_bits_are_canonicalised() {
        // same salt bytes, low bits of the last salt character set
        let noisy = U_STAR_U.replacen("CC.E5", "CC/E5", 1);
        assert_eq!(
            Blowfish.compute_hash(b"U*U", &noisy, HASH_SIZE).unwrap(),
            U_STAR_U
        );
    }

    #[test]
    fn generate_salt_formats_setting() {
        let salt = Blowfish
            .generate_salt("$2b$", 12, &[0u8; RANDOM_BYTES], HASH_SIZE)
            .unwrap();
        assert_eq!(salt, "$2b$12$......................");

        let setting = Setting::parse(&salt).unwrap();
        assert_eq!(setting.variant(), Variant::TwoB);
        assert_eq!(setting.cost(), 12);
        assert_eq!(setting.salt(), &[0u8; RANDOM_BYTES]);
    }

    #[test]
    fn generate_salt_zero_cost_uses_default() {
        let salt = Blowfish
            .generate_salt("$2b$", 0, &[9u8; RANDOM_BYTES], HASH_SIZE)
            .unwrap();
        assert!(salt.starts_with("$2b$05$"));
    }

    #[test]
    fn generate_salt_rejects_bad_input() {
        let entropy = [1u8; RANDOM_BYTES];
        assert!(Blowfish.generate_salt("$2x$", 10, &entropy, HASH_SIZE).is_err());
        assert!(Blowfish.generate_salt("$2b$", 3, &entropy, HASH_SIZE).is_err());
        assert!(Blowfish.generate_salt("$2b$", 32, &entropy, HASH_SIZE).is_err());
        assert!(Blowfish.generate_salt("$2b$", 10, &entropy[..15], HASH_SIZE).is_err());
        assert!(Blowfish.generate_salt("$2b$", 10, &entropy, 29).is_err());
        assert!(Blowfish.generate_salt("$2b$", 10, &entropy, 30).is_ok());
    }

    #[test]
    fn compute_hash_rejects_bad_settings() {
        for setting in [
            "",
            "$2b$05$short",
            "$3b$05$CCCCCCCCCCCCCCCCCCCCC.",
            "$2b$5$CCCCCCCCCCCCCCCCCCCCCC.",
            "$2b$03$CCCCCCCCCCCCCCCCCCCCC.",
            "$2b$32$CCCCCCCCCCCCCCCCCCCCC.",
            "$2b$05xCCCCCCCCCCCCCCCCCCCCC.",
            "$2b$05$CCCCCCCCCC*CCCCCCCCCC.",
        ] {
            assert!(
                matches!(
                    Blowfish.compute_hash(b"pw", setting, HASH_SIZE),
                    Err(Error::PrimitiveFailure(_))
                ),
                "accepted {setting:?}"
            );
        }
    }

    #[test]
    fn compute_hash_respects_capacity() {
        assert!(Blowfish.compute_hash(b"U*U", U_STAR_U, 60).is_err());
        assert!(Blowfish.compute_hash(b"U*U", U_STAR_U, 61).is_ok());
    }
}
