use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use getrandom::fill;

use crate::error::{Error, Result};

/// A supplier of cryptographically strong random bytes.
///
/// Implementations must either fill the whole buffer or fail; a partially
/// filled buffer is never handed back as success.
pub trait EntropySource {
    fn fill(&self, buf: &mut [u8]) -> Result<()>;
}

/// The operating system generator, reached through `getrandom`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        fill(buf).map_err(|e| Error::EntropyUnavailable(format!("OS random generator: {e}")))
    }
}

/// A character device such as `/dev/urandom`.
///
/// The device is opened on every call and closed before the call returns,
/// whatever the outcome. Nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct DeviceEntropy {
    path: PathBuf,
}

impl DeviceEntropy {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn urandom() -> Self {
        Self::new("/dev/urandom")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl EntropySource for DeviceEntropy {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        let mut device = File::open(&self.path).map_err(|e| {
            Error::EntropyUnavailable(format!("cannot open {}: {e}", self.path.display()))
        })?;

        // `device` is dropped (closed) on both arms
        read_full(&mut device, buf).map_err(|e| {
            Error::EntropyUnavailable(format!("cannot read {}: {e}", self.path.display()))
        })
    }
}

/// Reads until `buf` is full.
///
/// Interrupted reads are retried, short reads are accumulated. End of file
/// before the buffer is full is an error.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<()> {
    let mut total = 0;
    while total < buf.len() {
        match reader.read(&mut buf[total..]) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("short read: {total} of {} bytes", buf.len()),
                ));
            }
            Ok(n) => total += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

/// Entropy source chosen at runtime from configuration.
#[derive(Debug, Clone)]
pub enum Entropy {
    Os(OsEntropy),
    Device(DeviceEntropy),
}

impl Default for Entropy {
    fn default() -> Self {
        Entropy::Os(OsEntropy)
    }
}

impl EntropySource for Entropy {
    fn fill(&self, buf: &mut [u8]) -> Result<()> {
        match self {
            Entropy::Os(os) => os.fill(buf),
            Entropy::Device(device) => device.fill(buf),
        }
    }
}

impl FromStr for Entropy {
    type Err = String;

    /// `os` selects getrandom, anything else is taken as a device path.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "" => Err("entropy source must not be empty".to_string()),
            "os" => Ok(Entropy::Os(OsEntropy)),
            path => Ok(Entropy::Device(DeviceEntropy::new(path))),
        }
    }
}

impl fmt::Display for Entropy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entropy::Os(_) => write!(f, "os"),
            Entropy::Device(device) => write!(f, "{}", device.path().display()),
        }
    }
}

/// Draws exactly `N` fresh bytes from `source`.
pub fn read_random<const N: usize, E: EntropySource + ?Sized>(source: &E) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    source.fill(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Hands out data in small pieces, interrupting before every piece.
    struct Stuttering {
        data: Vec<u8>,
        pos: usize,
        interrupt_next: bool,
    }

    impl Read for Stuttering {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            if self.interrupt_next {
                self.interrupt_next = false;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            self.interrupt_next = true;

            let n = buf.len().min(3).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[test]
    fn os_entropy_fills_buffer() {
        let a: [u8; 16] = read_random(&OsEntropy).unwrap();
        let b: [u8; 16] = read_random(&OsEntropy).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn read_full_retries_interrupts_and_accumulates() {
        let data: Vec<u8> = (1..=16).collect();
        let mut reader = Stuttering {
            data: data.clone(),
            pos: 0,
            interrupt_next: true,
        };

        let mut buf = [0u8; 16];
        read_full(&mut reader, &mut buf).unwrap();
        assert_eq!(buf.to_vec(), data);
    }

    #[test]
    fn read_full_fails_on_early_eof() {
        let mut reader = Stuttering {
            data: vec![7u8; 5],
            pos: 0,
            interrupt_next: false,
        };

        let mut buf = [0u8; 16];
        let err = read_full(&mut reader, &mut buf).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn device_entropy_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xAB; 32]).unwrap();

        let source = DeviceEntropy::new(file.path());
        let bytes: [u8; 16] = read_random(&source).unwrap();
        assert_eq!(bytes, [0xAB; 16]);
    }

    #[test]
    fn device_entropy_short_file_is_unavailable() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[1, 2, 3]).unwrap();

        let source = DeviceEntropy::new(file.path());
        let err = read_random::<16, _>(&source).unwrap_err();
        assert!(matches!(err, Error::EntropyUnavailable(_)));
    }

    #[test]
    fn device_entropy_missing_device_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let source = DeviceEntropy::new(dir.path().join("no-such-device"));
        assert!(matches!(
            read_random::<16, _>(&source),
            Err(Error::EntropyUnavailable(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn urandom_device_works() {
        let bytes: [u8; 16] = read_random(&DeviceEntropy::urandom()).unwrap();
        assert_eq!(bytes.len(), 16);
    }

    #[test]
    fn entropy_parses_from_config_strings() {
        assert!(matches!("os".parse::<Entropy>(), Ok(Entropy::Os(_))));
        match "/dev/urandom".parse::<Entropy>() {
            Ok(Entropy::Device(d)) => assert_eq!(d.path(), Path::new("/dev/urandom")),
            other => panic!("unexpected {other:?}"),
        }
        assert!("  ".parse::<Entropy>().is_err());
        assert_eq!(Entropy::default().to_string(), "os");
    }
}
