use crate::credentials::Key;
use crate::crypto;
use crate::error::Result;
use std::fmt;
use std::io::Write;

/// The canonical base string for a request: timestamp, nonce, method,
/// request-target, host, port, and ext, in that order, every segment
/// terminated by a newline.  An absent ext still terminates, leaving a
/// blank final segment.
pub(crate) fn base_string(
    ts: i64,
    nonce: &str,
    method: &str,
    path: &str,
    host: &str,
    port: u16,
    ext: Option<&str>,
) -> Result<Vec<u8>> {
    let mut buffer: Vec<u8> = vec![];

    write!(buffer, "{}\n", ts)?;
    write!(buffer, "{}\n", nonce)?;
    write!(buffer, "{}\n", method)?;
    write!(buffer, "{}\n", path)?;
    write!(buffer, "{}\n", host)?;
    write!(buffer, "{}\n", port)?;

    match ext {
        Some(e) => write!(buffer, "{}\n", e)?,
        None => write!(buffer, "\n")?,
    };

    Ok(buffer)
}

/// A computed request signature.
///
/// Equality comparisons between `Mac`s are constant-time; `Display` produces
/// the standard-base64 text that travels in the `mac` header attribute.
#[derive(Debug, Clone)]
pub struct Mac(Vec<u8>);

impl Mac {
    pub fn new(
        key: &Key,
        ts: i64,
        nonce: &str,
        method: &str,
        host: &str,
        port: u16,
        path: &str,
        ext: Option<&str>,
    ) -> Result<Mac> {
        let basestr = base_string(ts, nonce, method, path, host, port, ext)?;
        Ok(Mac(key.sign(&basestr)?))
    }

    /// Decode a signature from its wire encoding.
    pub fn from_base64(value: &str) -> Result<Mac> {
        Ok(Mac(base64::decode(value)?))
    }
}

impl From<Vec<u8>> for Mac {
    fn from(bytes: Vec<u8>) -> Self {
        Mac(bytes)
    }
}

impl AsRef<[u8]> for Mac {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for Mac {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", base64::encode(&self.0))
    }
}

impl PartialEq for Mac {
    fn eq(&self, other: &Mac) -> bool {
        crypto::cryptographer().constant_time_compare(&self.0, &other.0)
    }
}

impl Eq for Mac {}
