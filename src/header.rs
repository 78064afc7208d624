use crate::error::{Error, Result};
use crate::mac::Mac;
use std::fmt;
use std::str::FromStr;

/// Representation of a MAC `Authorization` header value.
///
/// Note that this does not include the "`MAC `" scheme prefix.  When
/// formatted, attributes appear in the fixed order `id`, `nonce`, `ts`,
/// `ext` (when present), `mac`; parsing accepts them in any order.
#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub id: String,
    pub ts: i64,
    pub nonce: String,
    pub mac: Mac,
    pub ext: Option<String>,
}

impl Header {
    /// Create a new Header.
    ///
    /// None of the string components may contain the character `"`, as it
    /// cannot be escaped on the wire.
    pub fn new<S>(id: S, ts: i64, nonce: S, mac: Mac, ext: Option<S>) -> Result<Header>
    where
        S: Into<String>,
    {
        Ok(Header {
            id: Header::check_component(id)?,
            ts,
            nonce: Header::check_component(nonce)?,
            mac,
            ext: match ext {
                Some(ext) => Some(Header::check_component(ext)?),
                None => None,
            },
        })
    }

    fn check_component<S>(value: S) -> Result<String>
    where
        S: Into<String>,
    {
        let value = value.into();
        if value.contains('"') {
            return Err(Error::InvalidHeaderComponent(value));
        }
        Ok(value)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "id=\"{}\",nonce=\"{}\",ts=\"{}\"",
            self.id, self.nonce, self.ts
        )?;
        if let Some(ref ext) = self.ext {
            write!(f, ",ext=\"{}\"", ext)?;
        }
        write!(f, ",mac=\"{}\"", self.mac)
    }
}

impl FromStr for Header {
    type Err = Error;

    /// Parse a header value, strictly: all of `id`, `ts`, `nonce` and `mac`
    /// must be present, `ts` must be an integer, and `mac` must decode.
    /// Unknown attributes and malformed pairs are rejected.
    fn from_str(s: &str) -> Result<Header> {
        let mut id: Option<&str> = None;
        let mut ts: Option<i64> = None;
        let mut nonce: Option<&str> = None;
        let mut mac: Option<Mac> = None;
        let mut ext: Option<&str> = None;

        for field in s.split(',') {
            let field = field.trim();
            if field.is_empty() {
                continue;
            }
            let eq = field
                .find('=')
                .ok_or_else(|| Error::HeaderParseError(s.to_string()))?;
            let attr = field[..eq].trim();
            let value = field[eq + 1..].trim().trim_matches('"');
            match attr {
                "id" => id = Some(value),
                "ts" => {
                    ts = Some(
                        i64::from_str(value)
                            .map_err(|_| Error::HeaderParseError(s.to_string()))?,
                    )
                }
                "nonce" => nonce = Some(value),
                "mac" => mac = Some(Mac::from_base64(value)?),
                "ext" => ext = Some(value),
                _ => return Err(Error::HeaderParseError(s.to_string())),
            }
        }

        match (id, ts, nonce, mac) {
            (Some(id), Some(ts), Some(nonce), Some(mac)) => Ok(Header {
                id: id.to_string(),
                ts,
                nonce: nonce.to_string(),
                mac,
                ext: ext.map(str::to_string),
            }),
            (None, _, _, _) => Err(Error::MissingAttributes("id")),
            (_, None, _, _) => Err(Error::MissingAttributes("ts")),
            (_, _, None, _) => Err(Error::MissingAttributes("nonce")),
            (_, _, _, None) => Err(Error::MissingAttributes("mac")),
        }
    }
}
