use crate::crypto::CryptoError;
use failure::Fail;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Fail, Debug)]
pub enum Error {
    #[fail(display = "Unparseable MAC header: {}", _0)]
    HeaderParseError(String),

    #[fail(display = "Missing `{}` attribute in MAC header", _0)]
    MissingAttributes(&'static str),

    #[fail(display = "Invalid MAC header component: {}", _0)]
    InvalidHeaderComponent(String),

    #[fail(display = "Invalid url: {}", _0)]
    InvalidUrl(String),

    #[fail(display = "Invalid url scheme: {}", _0)]
    InvalidScheme(String),

    #[fail(display = "Unknown MAC algorithm: {}", _0)]
    UnknownAlgorithm(String),

    #[fail(display = "Missing MAC credential: {}", _0)]
    MissingCredentials(&'static str),

    #[fail(display = "Missing request parameter: {}", _0)]
    MissingParams(&'static str),

    #[fail(display = "{}", _0)]
    Io(#[fail(cause)] std::io::Error),

    #[fail(display = "Base64 decode error: {}", _0)]
    Decode(#[fail(cause)] base64::DecodeError),

    #[fail(display = "RNG error: {}", _0)]
    Rng(#[fail(cause)] rand::Error),

    #[fail(display = "{}", _0)]
    Crypto(#[fail(cause)] CryptoError),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::Decode(e)
    }
}

impl From<rand::Error> for Error {
    fn from(e: rand::Error) -> Self {
        Error::Rng(e)
    }
}

impl From<CryptoError> for Error {
    fn from(e: CryptoError) -> Self {
        Error::Crypto(e)
    }
}
