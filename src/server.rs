use crate::credentials::Key;
use crate::crypto;
use crate::error::{Error, Result};
use crate::mac::Mac;
use crate::request::RequestBuilder;
use crate::util;
use log::{debug, warn};
use std::fmt;
use url::Url;

const SCHEME_PREFIX: &str = "MAC ";

/// The error tokens this scheme surfaces to clients, as embedded in the
/// `WWW-Authenticate` challenge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    InvalidAuthorizationHeader,
    MissingId,
    MissingTimestamp,
    MissingNonce,
    MissingSignature,
    InvalidSignature,
    InvalidTimestamp,
}

impl AuthError {
    /// The wire token for this error.
    pub fn as_str(self) -> &'static str {
        match self {
            AuthError::InvalidAuthorizationHeader => "invalid_authorizationheader",
            AuthError::MissingId => "missing_id",
            AuthError::MissingTimestamp => "missing_timestamp",
            AuthError::MissingNonce => "missing_nonce",
            AuthError::MissingSignature => "missing_signature",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::InvalidTimestamp => "invalid_timestamp",
        }
    }

    /// The HTTP status code for a response reporting this error: 401 for a
    /// signature mismatch, 400 for everything else.
    pub fn status(self) -> u16 {
        match self {
            AuthError::InvalidSignature => 401,
            _ => 400,
        }
    }
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The protocol parameters carried by a request's `Authorization` header,
/// as found: fields the requester did not supply stay `None` and are
/// reported by the guard's presence checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthorizationParameters {
    pub id: Option<String>,
    pub ts: Option<i64>,
    pub nonce: Option<String>,
    pub mac: Option<String>,
    pub ext: Option<String>,
}

impl AuthorizationParameters {
    /// Relaxed parse of the attribute list following the scheme prefix.
    /// Pairs without `=` are skipped, unknown keys are ignored, values may
    /// be quoted or bare, and an unparsable `ts` counts as absent.
    fn parse(s: &str) -> AuthorizationParameters {
        let mut params = AuthorizationParameters::default();
        for field in s.split(',') {
            let eq = match field.find('=') {
                Some(i) => i,
                None => continue,
            };
            let attr = field[..eq].trim();
            let value = field[eq + 1..].trim().trim_matches('"');
            match attr {
                "id" => params.id = Some(value.to_string()),
                "ts" => params.ts = value.parse().ok(),
                "nonce" => params.nonce = Some(value.to_string()),
                "mac" => params.mac = Some(value.to_string()),
                "ext" => params.ext = Some(value.to_string()),
                _ => (),
            }
        }
        params
    }
}

fn present(value: &Option<String>) -> bool {
    match value {
        Some(v) => !v.is_empty(),
        None => false,
    }
}

/// The terminal result of validating one request, for the HTTP layer to
/// render: `status` and `error` are set whenever `ok` is false.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub ok: bool,
    pub status: Option<u16>,
    pub error: Option<AuthError>,
    pub realm: String,
}

/// Server-side guard for MAC-authenticated requests.
///
/// One guard is created per request from data the HTTP layer has already
/// collected; nothing here reads ambient process state.  Construction parses
/// the `Authorization` header and runs the field-presence checks; the caller
/// then resolves the key for [`id`](ResourceServer::id) out of band and runs
/// [`validate_signature`](ResourceServer::validate_signature) and
/// [`validate_timestamp`](ResourceServer::validate_timestamp).  Once any
/// check fails the guard is disabled and later checks are no-ops; a failure
/// is never upgraded back to success.
#[derive(Debug)]
pub struct ResourceServer {
    realm: String,
    method: String,
    url: String,
    params: AuthorizationParameters,
    entity_body: Option<String>,
    enabled: bool,
    error: Option<AuthError>,
}

impl ResourceServer {
    /// Create a guard from the raw `Authorization` header value (if any),
    /// the request method, the absolute request URL, and the requesting
    /// host.  The host doubles as the default challenge realm.
    ///
    /// The URL must be the canonical one the requester signed; host and port
    /// for signature purposes are taken from it, not from whatever port the
    /// transport reports, so proxies rewriting ports do not break signatures.
    pub fn new(authorization: Option<&str>, method: &str, url: &str, host: &str) -> ResourceServer {
        let mut server = ResourceServer {
            realm: host.to_string(),
            method: method.to_string(),
            url: url.to_string(),
            params: AuthorizationParameters::default(),
            entity_body: None,
            enabled: true,
            error: None,
        };
        server.parse_authorization(authorization);
        if server.enabled {
            server.check_fields();
        }
        server
    }

    /// Create a guard from an iterator of header name/value pairs; the
    /// `Authorization` header is located case-insensitively.
    pub fn from_headers<'a, I>(headers: I, method: &str, url: &str, host: &str) -> ResourceServer
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let authorization = headers
            .into_iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
            .map(|(_, value)| value);
        ResourceServer::new(authorization, method, url, host)
    }

    fn parse_authorization(&mut self, authorization: Option<&str>) {
        let value = match authorization {
            Some(v) if v.starts_with(SCHEME_PREFIX) => &v[SCHEME_PREFIX.len()..],
            _ => {
                debug!("authorization header missing or not MAC scheme");
                self.fail(AuthError::InvalidAuthorizationHeader);
                return;
            }
        };
        self.params = AuthorizationParameters::parse(value);
    }

    /// Field-presence checks, in fixed order, none short-circuiting: when
    /// several fields are missing the last check to fail names the error.
    fn check_fields(&mut self) {
        if !present(&self.params.id) {
            self.fail(AuthError::MissingId);
        }
        if self.params.ts.is_none() {
            self.fail(AuthError::MissingTimestamp);
        }
        if !present(&self.params.nonce) {
            self.fail(AuthError::MissingNonce);
        }
        if !present(&self.params.mac) {
            self.fail(AuthError::MissingSignature);
        }
    }

    fn fail(&mut self, error: AuthError) {
        self.enabled = false;
        self.error = Some(error);
    }

    /// Recompute the MAC over the stored request data and compare it, in
    /// constant time, with the supplied signature.  A mismatch disables the
    /// guard with `invalid_signature`, as does a request URL that cannot be
    /// canonicalized.
    ///
    /// An unusable key (empty secret) is a server configuration fault and
    /// surfaces as a hard error from [`Key::new`], never as a 4xx here;
    /// backend signing failures likewise propagate as errors.
    pub fn validate_signature(&mut self, key: &Key) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        // field presence was established by check_fields
        let ts = match self.params.ts {
            Some(ts) => ts,
            None => return Ok(()),
        };
        let nonce = match self.params.nonce.clone() {
            Some(nonce) => nonce,
            None => return Ok(()),
        };
        let supplied = match self.params.mac.clone() {
            Some(mac) => mac,
            None => return Ok(()),
        };

        let expected = match self.compute_expected(key, ts, &nonce) {
            Ok(mac) => mac.to_string(),
            // a request-supplied URL the server cannot canonicalize can
            // never have been signed correctly
            Err(err @ Error::InvalidUrl(_)) | Err(err @ Error::InvalidScheme(_)) => {
                warn!("request url {:?} cannot be canonicalized: {}", self.url, err);
                self.fail(AuthError::InvalidSignature);
                return Ok(());
            }
            Err(err) => return Err(err),
        };
        if !crypto::cryptographer().constant_time_compare(expected.as_bytes(), supplied.as_bytes())
        {
            warn!("MAC signature mismatch for id {:?}", self.params.id);
            self.fail(AuthError::InvalidSignature);
        }
        Ok(())
    }

    fn compute_expected(&self, key: &Key, ts: i64, nonce: &str) -> Result<Mac> {
        let url = Url::parse(&self.url)
            .map_err(|err| Error::InvalidUrl(format!("{}: {}", self.url, err)))?;
        // the entity body, when supplied, occupies the ext position of the
        // base string; it is empty otherwise
        let request = RequestBuilder::from_url(&self.method, &url)?
            .ext(self.entity_body.as_deref())
            .request();
        request.make_mac(key, ts, nonce)
    }

    /// Check the supplied timestamp against the server clock, allowing
    /// `allowed_skew` seconds of drift in either direction.  This window is
    /// the only staleness defense: replay prevention within it requires a
    /// nonce cache, which is the surrounding service's concern.
    pub fn validate_timestamp(&mut self, allowed_skew: i64) {
        self.validate_timestamp_at(allowed_skew, util::now_unix())
    }

    fn validate_timestamp_at(&mut self, allowed_skew: i64, now: i64) {
        if !self.enabled {
            return;
        }
        let ts = match self.params.ts {
            Some(ts) => ts,
            None => return,
        };
        if ts > now + allowed_skew || ts < now - allowed_skew {
            debug!("timestamp {} outside ±{}s of {}", ts, allowed_skew, now);
            self.fail(AuthError::InvalidTimestamp);
        }
    }

    /// Whether every check run so far has passed.
    pub fn ok(&self) -> bool {
        self.enabled
    }

    /// The key identifier from the header, for the credential lookup.
    pub fn id(&self) -> Option<&str> {
        self.params.id.as_deref()
    }

    pub fn ts(&self) -> Option<i64> {
        self.params.ts
    }

    pub fn nonce(&self) -> Option<&str> {
        self.params.nonce.as_deref()
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// All parameters parsed from the header.
    pub fn params(&self) -> &AuthorizationParameters {
        &self.params
    }

    pub fn error(&self) -> Option<AuthError> {
        self.error
    }

    /// The HTTP status code to respond with, when a check has failed.
    pub fn http_status(&self) -> Option<u16> {
        self.error.map(AuthError::status)
    }

    /// Override the challenge realm (it defaults to the requesting host).
    pub fn set_realm<S: Into<String>>(&mut self, realm: S) {
        self.realm = realm.into();
    }

    /// Supply the request entity body for inclusion in signature
    /// verification.  Left unset, the body is treated as empty.
    pub fn set_entity_body<S: Into<String>>(&mut self, body: S) {
        self.entity_body = Some(body.into());
    }

    /// The value for the `WWW-Authenticate` header of the response.
    pub fn www_authenticate(&self) -> String {
        match self.error {
            Some(error) => format!("MAC realm=\"{}\",error=\"{}\"", self.realm, error),
            None => format!("MAC realm=\"{}\"", self.realm),
        }
    }

    /// A snapshot of the final validation state.
    pub fn outcome(&self) -> ValidationOutcome {
        ValidationOutcome {
            ok: self.enabled,
            status: self.http_status(),
            error: self.error,
            realm: self.realm.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{AuthError, ResourceServer};

    const URL: &str = "http://example.com/resource/1?b=1&a=2";

    fn guard(authorization: Option<&str>) -> ResourceServer {
        ResourceServer::new(authorization, "GET", URL, "example.com")
    }

    #[test]
    fn missing_header() {
        let server = guard(None);
        assert!(!server.ok());
        assert_eq!(server.error(), Some(AuthError::InvalidAuthorizationHeader));
        assert_eq!(server.http_status(), Some(400));
        assert_eq!(server.id(), None);
    }

    #[test]
    fn wrong_scheme() {
        let server = guard(Some("Bearer abcdef"));
        assert_eq!(server.error(), Some(AuthError::InvalidAuthorizationHeader));
    }

    #[test]
    fn prefix_is_case_sensitive() {
        let server = guard(Some("mac id=\"a\",ts=\"1\",nonce=\"n\",mac=\"m\""));
        assert_eq!(server.error(), Some(AuthError::InvalidAuthorizationHeader));
    }

    #[test]
    fn prefix_requires_space() {
        let server = guard(Some("MAC"));
        assert_eq!(server.error(), Some(AuthError::InvalidAuthorizationHeader));
    }

    #[test]
    fn parses_all_fields() {
        let server = guard(Some(
            "MAC id=\"h480djs93hd8\",nonce=\"264095:dj83hs9s\",ts=\"1336363200\",\
             ext=\"app-data\",mac=\"bhCQXTVyfj5cmA9uKkPFx1zeOXM=\"",
        ));
        assert!(server.ok());
        assert_eq!(server.id(), Some("h480djs93hd8"));
        assert_eq!(server.ts(), Some(1336363200));
        assert_eq!(server.nonce(), Some("264095:dj83hs9s"));
        assert_eq!(server.params().ext.as_deref(), Some("app-data"));
        assert_eq!(server.method(), "GET");
    }

    #[test]
    fn tolerates_spaces_and_bare_values() {
        let server = guard(Some(
            "MAC id = h480djs93hd8 , nonce = \"264095:dj83hs9s\", ts= 1336363200, mac=\"m\"",
        ));
        assert!(server.ok());
        assert_eq!(server.id(), Some("h480djs93hd8"));
        assert_eq!(server.ts(), Some(1336363200));
    }

    #[test]
    fn skips_malformed_pairs() {
        let server = guard(Some(
            "MAC id=\"a\",garbage,nonce=\"n\",ts=\"1336363200\",mac=\"m\"",
        ));
        assert!(server.ok());
        assert_eq!(server.id(), Some("a"));
    }

    #[test]
    fn missing_id() {
        let server = guard(Some("MAC nonce=\"n\",ts=\"1336363200\",mac=\"m\""));
        assert!(!server.ok());
        assert_eq!(server.error(), Some(AuthError::MissingId));
        assert_eq!(server.http_status(), Some(400));
    }

    #[test]
    fn empty_id_counts_as_missing() {
        let server = guard(Some("MAC id=\"\",nonce=\"n\",ts=\"1336363200\",mac=\"m\""));
        assert_eq!(server.error(), Some(AuthError::MissingId));
    }

    #[test]
    fn unparsable_ts_counts_as_missing() {
        let server = guard(Some("MAC id=\"a\",nonce=\"n\",ts=\"soon\",mac=\"m\""));
        assert_eq!(server.error(), Some(AuthError::MissingTimestamp));
    }

    #[test]
    fn last_missing_field_wins() {
        // both nonce and mac missing: the mac check runs later
        let server = guard(Some("MAC id=\"a\",ts=\"1336363200\""));
        assert!(!server.ok());
        assert_eq!(server.error(), Some(AuthError::MissingSignature));
    }

    #[test]
    fn from_headers_finds_authorization() {
        let headers = vec![
            ("Content-Type", "application/json"),
            ("AUTHORIZATION", "MAC id=\"a\",nonce=\"n\",ts=\"1\",mac=\"m\""),
        ];
        let server = ResourceServer::from_headers(headers, "GET", URL, "example.com");
        assert!(server.ok());
        assert_eq!(server.id(), Some("a"));
    }

    #[test]
    fn timestamp_window_boundaries() {
        let make = || {
            guard(Some(
                "MAC id=\"a\",nonce=\"n\",ts=\"1005\",mac=\"m\"",
            ))
        };

        let mut server = make();
        server.validate_timestamp_at(5, 1000);
        assert!(server.ok());

        let mut server = make();
        server.validate_timestamp_at(4, 1000);
        assert!(!server.ok());
        assert_eq!(server.error(), Some(AuthError::InvalidTimestamp));
        assert_eq!(server.http_status(), Some(400));

        // lower edge
        let mut server = guard(Some("MAC id=\"a\",nonce=\"n\",ts=\"995\",mac=\"m\""));
        server.validate_timestamp_at(5, 1000);
        assert!(server.ok());

        let mut server = guard(Some("MAC id=\"a\",nonce=\"n\",ts=\"994\",mac=\"m\""));
        server.validate_timestamp_at(5, 1000);
        assert_eq!(server.error(), Some(AuthError::InvalidTimestamp));
    }

    #[test]
    fn timestamp_check_skipped_once_disabled() {
        let mut server = guard(Some("MAC id=\"a\",ts=\"1336363200\""));
        assert_eq!(server.error(), Some(AuthError::MissingSignature));
        server.validate_timestamp_at(5, 1336363200);
        assert_eq!(server.error(), Some(AuthError::MissingSignature));
    }

    #[test]
    fn challenge_without_error() {
        let server = guard(Some("MAC id=\"a\",nonce=\"n\",ts=\"1\",mac=\"m\""));
        assert_eq!(server.www_authenticate(), "MAC realm=\"example.com\"");
    }

    #[test]
    fn challenge_with_error_and_realm_override() {
        let mut server = guard(None);
        server.set_realm("api.example.com");
        assert_eq!(
            server.www_authenticate(),
            "MAC realm=\"api.example.com\",error=\"invalid_authorizationheader\""
        );
    }

    #[test]
    fn outcome_snapshot() {
        let server = guard(Some("MAC id=\"a\",ts=\"1\",nonce=\"n\""));
        let outcome = server.outcome();
        assert!(!outcome.ok);
        assert_eq!(outcome.status, Some(400));
        assert_eq!(outcome.error, Some(AuthError::MissingSignature));
        assert_eq!(outcome.realm, "example.com");
    }
}
