//! Host adapter for the `BCRYPT_HASH()` / `BCRYPT_CHECK()` SQL functions.
//!
//! Translates untyped host arguments into [`PasswordHasher`] calls and
//! every failure into SQL `NULL`. The loading ABI itself lives in the host.

use std::borrow::Cow;
use std::fmt;

use crate::crypto::{BcryptPrimitive, EntropySource, HASH_SIZE};
use crate::hasher::PasswordHasher;

/// One argument as handed over by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Null,
    Str(Vec<u8>),
    Int(i64),
}

impl Value {
    /// Bytes of a string-typed argument.
    pub fn as_str_arg(&self) -> Option<Cow<'_, [u8]>> {
        match self {
            Value::Null => None,
            Value::Str(bytes) => Some(Cow::Borrowed(bytes)),
            Value::Int(i) => Some(Cow::Owned(i.to_string().into_bytes())),
        }
    }

    /// Value of an integer-typed argument.
    ///
    /// Strings convert by their leading decimal integer, or 0 if there is
    /// none, saturating at the `i64` bounds.
    pub fn as_int_arg(&self) -> Option<i64> {
        match self {
            Value::Null => None,
            Value::Int(i) => Some(*i),
            Value::Str(bytes) => Some(leading_int(bytes)),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.as_bytes().to_vec())
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

fn leading_int(bytes: &[u8]) -> i64 {
    let mut rest = bytes.trim_ascii_start();
    let negative = match rest.first() {
        Some(b'-') => {
            rest = &rest[1..];
            true
        }
        Some(b'+') => {
            rest = &rest[1..];
            false
        }
        _ => false,
    };

    let mut n: i64 = 0;
    for &b in rest.iter().take_while(|b| b.is_ascii_digit()) {
        let digit = i64::from(b - b'0');
        n = if negative {
            n.saturating_mul(10).saturating_sub(digit)
        } else {
            n.saturating_mul(10).saturating_add(digit)
        };
    }
    n
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    String,
    Int,
}

/// What a function tells the host when it is prepared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: &'static str,
    pub arg_types: [ArgType; 2],
    pub max_length: usize,
    pub maybe_null: bool,
    pub const_item: bool,
}

/// Preparation failure, reported to the SQL client verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitError(&'static str);

impl fmt::Display for InitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for InitError {}

pub fn bcrypt_hash_init(arg_count: usize) -> Result<FunctionDecl, InitError> {
    if arg_count != 2 {
        return Err(InitError(
            "BCRYPT_HASH() requires a string and an integer parameter",
        ));
    }
    Ok(FunctionDecl {
        name: "bcrypt_hash",
        arg_types: [ArgType::String, ArgType::Int],
        max_length: HASH_SIZE,
        maybe_null: true,
        const_item: false,
    })
}

pub fn bcrypt_check_init(arg_count: usize) -> Result<FunctionDecl, InitError> {
    if arg_count != 2 {
        return Err(InitError("BCRYPT_CHECK() requires two string parameters"));
    }
    Ok(FunctionDecl {
        name: "bcrypt_check",
        arg_types: [ArgType::String, ArgType::String],
        max_length: HASH_SIZE,
        maybe_null: true,
        const_item: false,
    })
}

/// `BCRYPT_HASH(password, cost)`: the new hash, or `NULL`.
pub fn bcrypt_hash<E, P>(hasher: &PasswordHasher<E, P>, args: &[Value]) -> Option<String>
where
    E: EntropySource,
    P: BcryptPrimitive,
{
    let [password, cost] = args else {
        return None;
    };
    let password = password.as_str_arg();
    hasher
        .hash(password.as_deref(), cost.as_int_arg())
        .ok()
}

/// `BCRYPT_CHECK(password, hash)`: 1, 0, or `NULL` if the check cannot run.
pub fn bcrypt_check<E, P>(hasher: &PasswordHasher<E, P>, args: &[Value]) -> Option<i64>
where
    E: EntropySource,
    P: BcryptPrimitive,
{
    let [password, hash] = args else {
        return None;
    };
    let password = password.as_str_arg();
    let hash = hash.as_str_arg();
    hasher
        .check(password.as_deref(), hash.as_deref())
        .to_sql()
}
