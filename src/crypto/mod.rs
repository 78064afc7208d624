//! Pluggable cryptographic backends.
//!
//! All keyed hashing and signature comparison goes through a process-wide
//! [`Cryptographer`].  With the default `use_ring` feature (or with
//! `use_openssl`) a backend is registered automatically on first use; an
//! embedding application can install its own with [`set_cryptographer`].

use crate::DigestAlgorithm;
use failure::Fail;

mod holder;
pub use holder::{set_boxed_cryptographer, set_cryptographer, SetCryptographerError};
pub(crate) use holder::cryptographer;

#[cfg(feature = "use_openssl")]
mod openssl;
#[cfg(feature = "use_ring")]
mod ring;

#[derive(Debug, Fail)]
pub enum CryptoError {
    #[fail(display = "Unsupported digest algorithm: {}", _0)]
    UnsupportedDigest(DigestAlgorithm),

    #[fail(display = "{}", _0)]
    Other(failure::Error),
}

/// An HMAC key bound to a digest algorithm, held by a [`Credentials`](crate::Credentials).
pub trait HmacKey: Send + Sync {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError>;
}

/// The cryptographic operations this crate needs from its backend.
pub trait Cryptographer: Sync {
    fn new_key(
        &self,
        algorithm: DigestAlgorithm,
        key: &[u8],
    ) -> Result<Box<dyn HmacKey>, CryptoError>;

    /// Compare two byte sequences without leaking, via timing, the position
    /// of the first difference.
    fn constant_time_compare(&self, a: &[u8], b: &[u8]) -> bool;
}
