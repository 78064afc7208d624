use super::Cryptographer;
use failure::Fail;
use once_cell::sync::OnceCell;

static CRYPTOGRAPHER: OnceCell<&'static dyn Cryptographer> = OnceCell::new();

#[derive(Debug, Fail)]
#[fail(display = "Cryptographer already initialized")]
pub struct SetCryptographerError(());

/// Set the global object used for cryptographic operations.
///
/// A convenience wrapper over [`set_cryptographer`] taking a
/// `Box<dyn Cryptographer>`.
pub fn set_boxed_cryptographer(c: Box<dyn Cryptographer>) -> Result<(), SetCryptographerError> {
    set_cryptographer(Box::leak(c))
}

/// Set the global object used for cryptographic operations.
///
/// May only be called once in the lifetime of a program, and only before
/// the first signature is computed or verified.
pub fn set_cryptographer(c: &'static dyn Cryptographer) -> Result<(), SetCryptographerError> {
    CRYPTOGRAPHER.set(c).map_err(|_| SetCryptographerError(()))
}

pub(crate) fn cryptographer() -> &'static dyn Cryptographer {
    autoinit();
    CRYPTOGRAPHER
        .get()
        .copied()
        .expect("no `mac-token` cryptographer registered")
}

#[cfg(feature = "use_ring")]
#[inline]
fn autoinit() {
    let _ = set_cryptographer(&super::ring::RingCryptographer);
}

#[cfg(all(feature = "use_openssl", not(feature = "use_ring")))]
#[inline]
fn autoinit() {
    let _ = set_cryptographer(&super::openssl::OpensslCryptographer);
}

#[cfg(not(any(feature = "use_ring", feature = "use_openssl")))]
#[inline]
fn autoinit() {}
