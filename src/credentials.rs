use crate::crypto::{self, HmacKey};
use crate::error::{Error, Result};
use crate::DigestAlgorithm;

/// A MAC key.
///
/// The shared secret and the digest algorithm must both be agreed between the
/// requester and the resource server; the key identifier alone travels on the
/// wire.  An empty secret is a configuration fault and is rejected here, not
/// converted into a client-facing authentication failure.
pub struct Key {
    key: Box<dyn HmacKey>,
    algorithm: DigestAlgorithm,
}

impl Key {
    pub fn new<B>(key: B, algorithm: DigestAlgorithm) -> Result<Key>
    where
        B: Into<Vec<u8>>,
    {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::MissingCredentials("secret"));
        }
        Ok(Key {
            key: crypto::cryptographer().new_key(algorithm, &key)?,
            algorithm,
        })
    }

    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>> {
        Ok(self.key.sign(data)?)
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Key({})", self.algorithm)
    }
}

/// MAC credentials: a key identifier and the key associated with it.
pub struct Credentials {
    pub id: String,
    pub key: Key,
}
