use crate::credentials::{Credentials, Key};
use crate::error::{Error, Result};
use crate::header::Header;
use crate::mac::Mac;
use crate::util;
use url::{Position, Url};

/// Resolve a URL into the (host, port, request-target) triple that enters the
/// base string.  The port is the URL's explicit port when given, otherwise
/// the scheme default; schemes other than `http` and `https` are rejected.
/// The request-target is the URL text from the start of the path, exactly
/// what the requester sends in its request line.
pub(crate) fn resolve_url(url: &Url) -> Result<(&str, u16, &str)> {
    let host = url
        .host_str()
        .ok_or_else(|| Error::InvalidUrl(format!("url {} has no host", url)))?;
    let port = match url.scheme() {
        "https" => url.port().unwrap_or(443),
        "http" => url.port().unwrap_or(80),
        scheme => return Err(Error::InvalidScheme(scheme.to_string())),
    };
    let path = &url[Position::BeforePath..];
    Ok((host, port, path))
}

/// A single HTTP request to be signed.
///
/// Requests are built with [`RequestBuilder`].  Most uses of this library
/// hold several of the fields fixed across requests; cloning a builder with
/// those fields applied avoids repeating them.
#[derive(Debug, Clone)]
pub struct Request<'a> {
    method: &'a str,
    host: &'a str,
    port: u16,
    path: &'a str,
    ext: Option<&'a str>,
}

impl<'a> Request<'a> {
    pub(crate) fn make_mac(&self, key: &Key, ts: i64, nonce: &str) -> Result<Mac> {
        Mac::new(
            key, ts, nonce, self.method, self.host, self.port, self.path, self.ext,
        )
    }

    /// Create a new Header for this request, inventing a fresh nonce and
    /// using the current time.
    pub fn make_header(&self, credentials: &Credentials) -> Result<Header> {
        let ts = util::now_unix();
        let nonce = util::synthesize_nonce(0)?;
        self.make_header_full(credentials, ts, nonce)
    }

    /// Like `make_header`, with explicit timestamp and nonce.  An empty nonce
    /// is replaced with a synthesized one derived from the timestamp's age.
    pub fn make_header_full<S>(&self, credentials: &Credentials, ts: i64, nonce: S) -> Result<Header>
    where
        S: Into<String>,
    {
        if credentials.id.is_empty() {
            return Err(Error::MissingCredentials("id"));
        }
        if self.method.is_empty() {
            return Err(Error::MissingParams("method"));
        }
        if self.host.is_empty() {
            return Err(Error::MissingParams("host"));
        }
        let nonce = nonce.into();
        let nonce = if nonce.is_empty() {
            util::synthesize_nonce(util::now_unix() - ts)?
        } else {
            nonce
        };
        let mac = self.make_mac(&credentials.key, ts, &nonce)?;
        Header::new(
            credentials.id.clone(),
            ts,
            nonce,
            mac,
            self.ext.map(str::to_string),
        )
    }

    /// The complete `Authorization` header value, scheme prefix included.
    pub fn make_authorization_header(&self, credentials: &Credentials) -> Result<String> {
        Ok(format!("MAC {}", self.make_header(credentials)?))
    }
}

/// Builder for [`Request`]s.
///
/// # Examples
///
/// ```
/// use mac_token::RequestBuilder;
/// let url = "https://example.com/resource/1?b=1&a=2".parse().unwrap();
/// let request = RequestBuilder::from_url("GET", &url).unwrap().request();
/// ```
#[derive(Debug, Clone)]
pub struct RequestBuilder<'a>(Request<'a>);

impl<'a> RequestBuilder<'a> {
    /// Create a new request with the given method, host, port, and
    /// request-target.
    pub fn new(method: &'a str, host: &'a str, port: u16, path: &'a str) -> Self {
        RequestBuilder(Request {
            method,
            host,
            port,
            path,
            ext: None,
        })
    }

    /// Create a new request with host, port, and request-target derived
    /// from the URL.
    pub fn from_url(method: &'a str, url: &'a Url) -> Result<Self> {
        let (host, port, path) = resolve_url(url)?;
        Ok(RequestBuilder(Request {
            method,
            host,
            port,
            path,
            ext: None,
        }))
    }

    /// Set the `ext` attribute for the request.
    pub fn ext<S: Into<Option<&'a str>>>(mut self, ext: S) -> Self {
        self.0.ext = ext.into();
        self
    }

    /// Get the request from this builder.
    pub fn request(self) -> Request<'a> {
        self.0
    }
}


#[cfg(all(test, any(feature = "use_ring", feature = "use_openssl")))]
mod crypto_test {
    use super::RequestBuilder;
    use crate::credentials::{Credentials, Key};
    use crate::{SHA1, SHA256};
    use pretty_assertions::assert_eq;
    use url::Url;

    fn credentials(algorithm: crate::DigestAlgorithm) -> Credentials {
        Credentials {
            id: "h480djs93hd8".to_string(),
            key: Key::new("489dks293j39", algorithm).unwrap(),
        }
    }

    #[test]
    fn test_make_header_full() {
        let url = Url::parse("http://example.com/resource/1?b=1&a=2").unwrap();
        let request = RequestBuilder::from_url("GET", &url).unwrap().request();
        let header = request
            .make_header_full(&credentials(SHA1), 1336363200, "264095:dj83hs9s")
            .unwrap();
        assert_eq!(
            format!("MAC {}", header),
            "MAC id=\"h480djs93hd8\",nonce=\"264095:dj83hs9s\",ts=\"1336363200\",\
             mac=\"sU6UUE7YC4RNIIpjBj2ECQzHX9g=\""
        );
    }

    #[test]
    fn test_default_port_canonicalization() {
        // an explicit default port signs identically to no port at all
        let implicit = Url::parse("https://example.com/request").unwrap();
        let explicit = Url::parse("https://example.com:443/request").unwrap();
        let creds = credentials(SHA256);
        let make = |url: &Url| {
            RequestBuilder::from_url("POST", url)
                .unwrap()
                .request()
                .make_header_full(&creds, 1336363200, "264095:dj83hs9s")
                .unwrap()
        };
        assert_eq!(
            format!("{}", make(&implicit).mac),
            format!("{}", make(&explicit).mac)
        );
        assert_eq!(
            format!("{}", make(&implicit).mac),
            "wQ4JJcODWVACRnMr2jwMEStON2PzkYsDgHCSx2kMAXk="
        );
    }

    #[test]
    fn test_synthesized_nonce() {
        let url = Url::parse("http://example.com/resource/1").unwrap();
        let request = RequestBuilder::from_url("GET", &url).unwrap().request();
        let creds = credentials(SHA1);
        let first = request.make_header(&creds).unwrap();
        let second = request.make_header(&creds).unwrap();
        assert_ne!(first.nonce, second.nonce);
        assert!(first.nonce.contains(':'));
    }

    #[test]
    fn test_empty_id_rejected() {
        let url = Url::parse("http://example.com/resource/1").unwrap();
        let request = RequestBuilder::from_url("GET", &url).unwrap().request();
        let creds = Credentials {
            id: String::new(),
            key: Key::new("489dks293j39", SHA1).unwrap(),
        };
        assert!(request.make_header(&creds).is_err());
    }
}
