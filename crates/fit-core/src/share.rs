//! Stateless share tokens.
//!
//! A token is `base64url(deflate(json(assessment)))` without padding, so it
//! only contains `[A-Za-z0-9_-]` and can be placed in a query parameter
//! without escaping. Decoding never fails loudly: any malformed input yields
//! `None`.

use std::io::{Read, Write};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use crate::entities::AssessmentData;
use crate::errors::CoreError;

/// Upper bound on the inflated payload, to reject decompression bombs.
const MAX_DECODED_BYTES: u64 = 1024 * 1024;

/// Encode an assessment into a URL-safe token.
///
/// # Errors
///
/// Returns `CoreError::Other` if serialization or compression fails, which
/// does not happen for well-formed `AssessmentData`.
pub fn encode(data: &AssessmentData) -> Result<String, CoreError> {
    let json = serde_json::to_vec(data).map_err(|e| CoreError::Other(e.into()))?;
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
    encoder
        .write_all(&json)
        .map_err(|e| CoreError::Other(e.into()))?;
    let compressed = encoder.finish().map_err(|e| CoreError::Other(e.into()))?;
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// Decode a token produced by [`encode`]. Returns `None` for anything malformed.
#[must_use]
pub fn decode(token: &str) -> Option<AssessmentData> {
    let compressed = URL_SAFE_NO_PAD
        .decode(token.trim())
        .map_err(|e| tracing::debug!(%e, "share token is not base64url"))
        .ok()?;

    let mut json = Vec::new();
    DeflateDecoder::new(compressed.as_slice())
        .take(MAX_DECODED_BYTES + 1)
        .read_to_end(&mut json)
        .map_err(|e| tracing::debug!(%e, "share token failed to inflate"))
        .ok()?;
    if json.len() as u64 > MAX_DECODED_BYTES {
        tracing::debug!("share token payload too large");
        return None;
    }

    serde_json::from_slice(&json)
        .map_err(|e| tracing::debug!(%e, "share token payload is not an assessment"))
        .ok()
}

/// Build the public share URL for a token.
#[must_use]
pub fn share_url(base_url: &str, token: &str) -> String {
    format!("{}/share?data={token}", base_url.trim_end_matches('/'))
}
