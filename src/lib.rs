//! This crate provides support for HTTP MAC access authentication: requests
//! are signed with a shared secret by computing a keyed hash over a canonical
//! base string (timestamp, nonce, method, request-target, host, port, and
//! optional extension data), and the resource server recomputes that hash to
//! decide whether to serve the request.
//!
//! The requester side builds `Authorization` header values; the resource
//! server side parses them, verifies the signature, checks timestamp
//! freshness, and produces the HTTP status and `WWW-Authenticate` challenge
//! for failed requests.  Reading headers off a live request and emitting the
//! response stay with the embedding HTTP layer, as does the lookup of the
//! secret for a given key identifier.
//!
//! # Examples
//!
//! ## Signing a request
//!
//! ```
//! use mac_token::{Credentials, Key, RequestBuilder, SHA256};
//!
//! let credentials = Credentials {
//!     id: "h480djs93hd8".to_string(),
//!     key: Key::new("489dks293j39", SHA256).unwrap(),
//! };
//! let url = "http://example.com/resource/1?b=1&a=2".parse().unwrap();
//! let request = RequestBuilder::from_url("GET", &url).unwrap().request();
//!
//! let header = request.make_authorization_header(&credentials).unwrap();
//! assert!(header.starts_with("MAC id=\"h480djs93hd8\""));
//! ```
//!
//! ## Validating a request
//!
//! ```
//! use mac_token::{Key, ResourceServer, SHA1};
//!
//! let authorization = "MAC id=\"h480djs93hd8\",nonce=\"264095:dj83hs9s\",\
//!                      ts=\"1336363200\",mac=\"sU6UUE7YC4RNIIpjBj2ECQzHX9g=\"";
//! let mut server = ResourceServer::new(
//!     Some(authorization),
//!     "GET",
//!     "http://example.com/resource/1?b=1&a=2",
//!     "example.com",
//! );
//!
//! // the secret for server.id() comes from the embedding service
//! let key = Key::new("489dks293j39", SHA1).unwrap();
//! server.validate_signature(&key).unwrap();
//! assert!(server.ok());
//!
//! // a stale timestamp downgrades the outcome
//! server.validate_timestamp(300);
//! assert!(!server.ok());
//! assert_eq!(
//!     server.www_authenticate(),
//!     "MAC realm=\"example.com\",error=\"invalid_timestamp\"",
//! );
//! ```

use std::fmt;
use std::str::FromStr;

mod credentials;
mod crypto;
mod error;
mod header;
mod mac;
mod request;
mod server;
mod util;

pub use crate::credentials::{Credentials, Key};
pub use crate::crypto::{
    set_boxed_cryptographer, set_cryptographer, CryptoError, Cryptographer, HmacKey,
    SetCryptographerError,
};
pub use crate::error::{Error, Result};
pub use crate::header::Header;
pub use crate::mac::Mac;
pub use crate::request::{Request, RequestBuilder};
pub use crate::server::{AuthError, AuthorizationParameters, ResourceServer, ValidationOutcome};

/// The digest algorithms this scheme supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
}

pub const SHA1: DigestAlgorithm = DigestAlgorithm::Sha1;
pub const SHA256: DigestAlgorithm = DigestAlgorithm::Sha256;

impl fmt::Display for DigestAlgorithm {
    /// The algorithm tokens used in operator credential configuration.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            DigestAlgorithm::Sha1 => "hmac-sha-1",
            DigestAlgorithm::Sha256 => "hmac-sha-256",
        })
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;
    fn from_str(s: &str) -> Result<DigestAlgorithm> {
        match s {
            "hmac-sha-1" => Ok(DigestAlgorithm::Sha1),
            "hmac-sha-256" => Ok(DigestAlgorithm::Sha256),
            _ => Err(Error::UnknownAlgorithm(s.to_string())),
        }
    }
}

#[cfg(test)]
mod test {
    use super::DigestAlgorithm;

    #[test]
    fn algorithm_tokens_round_trip() {
        for algorithm in &[DigestAlgorithm::Sha1, DigestAlgorithm::Sha256] {
            let token = algorithm.to_string();
            assert_eq!(token.parse::<DigestAlgorithm>().unwrap(), *algorithm);
        }
        assert!("hmac-md5".parse::<DigestAlgorithm>().is_err());
    }
}
