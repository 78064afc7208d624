use crate::error::Result;
use rand::Rng;
use std::time::{SystemTime, UNIX_EPOCH};

/// Seconds since the Unix epoch, as the signed integer the wire format uses.
/// A clock set before the epoch reads as zero.
pub(crate) fn now_unix() -> i64 {
    match SystemTime::now().duration_since(UNIX_EPOCH) {
        Ok(elapsed) => elapsed.as_secs() as i64,
        Err(_) => 0,
    }
}

/// Synthesize a nonce for a request issued `age` seconds ago: the age and 16
/// random bytes, hex-encoded, joined with a colon.  Requesters that do not
/// carry their own nonce state use this; verification never does.
pub(crate) fn synthesize_nonce(age: i64) -> Result<String> {
    let mut bytes = [0u8; 16];
    rand::thread_rng().try_fill(&mut bytes[..])?;
    let hex: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    Ok(format!("{}:{}", age, hex))
}
