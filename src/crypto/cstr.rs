use thiserror::Error;
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CopyError {
    #[error("source does not fit the destination with its terminator")]
    TooLarge,
    #[error("source contains a NUL byte")]
    NullByte,
    #[error("source or destination is missing")]
    InvalidArgs,
}

/// Copies `src` into `dst` and appends a NUL terminator.
///
/// Fails if `src` is absent, if `src.len() + 1` exceeds `dst.len()`, or if
/// `src` holds a zero byte anywhere. On failure `dst` may contain a prefix of
/// `src` but is never reported as valid.
pub fn copy_c_str(dst: &mut [u8], src: Option<&[u8]>) -> Result<usize, CopyError> {
    let src = src.ok_or(CopyError::InvalidArgs)?;

    if src.len() + 1 > dst.len() {
        return Err(CopyError::TooLarge);
    }

    for (i, &b) in src.iter().enumerate() {
        if b == 0 {
            return Err(CopyError::NullByte);
        }
        dst[i] = b;
    }
    dst[src.len()] = 0;

    Ok(src.len())
}

/// Fixed-capacity, NUL-terminated byte string that is wiped when dropped.
///
/// `N` counts the terminator, so a `CBuffer<129>` holds up to 128 bytes.
pub struct CBuffer<const N: usize> {
    bytes: Zeroizing<[u8; N]>,
    len: usize,
}

impl<const N: usize> CBuffer<N> {
    pub fn from_bytes(src: Option<&[u8]>) -> Result<Self, CopyError> {
        let mut bytes = Zeroizing::new([0u8; N]);
        let len = copy_c_str(&mut bytes[..], src)?;
        Ok(Self { bytes, len })
    }

    /// Contents without the terminator.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Contents followed by the terminator.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.bytes[..=self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn capacity() -> usize {
        N
    }
}
