use super::{CryptoError, Cryptographer, HmacKey};
use crate::DigestAlgorithm;
use openssl::hash::MessageDigest;
use openssl::memcmp;
use openssl::pkey::{PKey, Private};
use openssl::sign::Signer;
use std::convert::TryInto;

impl From<openssl::error::ErrorStack> for CryptoError {
    fn from(e: openssl::error::ErrorStack) -> Self {
        CryptoError::Other(e.into())
    }
}

pub struct OpensslCryptographer;

struct OpensslHmacKey {
    key: PKey<Private>,
    algorithm: DigestAlgorithm,
}

impl HmacKey for OpensslHmacKey {
    fn sign(&self, data: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let digest: MessageDigest = self.algorithm.try_into()?;
        let mut signer = Signer::new(digest, &self.key)?;
        signer.update(data)?;
        Ok(signer.sign_to_vec()?)
    }
}

impl Cryptographer for OpensslCryptographer {
    fn new_key(
        &self,
        algorithm: DigestAlgorithm,
        key: &[u8],
    ) -> Result<Box<dyn HmacKey>, CryptoError> {
        let key = PKey::hmac(key)?;
        Ok(Box::new(OpensslHmacKey { key, algorithm }))
    }

    fn constant_time_compare(&self, a: &[u8], b: &[u8]) -> bool {
        // memcmp::eq panics on length mismatch
        a.len() == b.len() && memcmp::eq(a, b)
    }
}

impl std::convert::TryFrom<DigestAlgorithm> for MessageDigest {
    type Error = CryptoError;
    fn try_from(algorithm: DigestAlgorithm) -> Result<Self, CryptoError> {
        match algorithm {
            DigestAlgorithm::Sha1 => Ok(MessageDigest::sha1()),
            DigestAlgorithm::Sha256 => Ok(MessageDigest::sha256()),
        }
    }
}
