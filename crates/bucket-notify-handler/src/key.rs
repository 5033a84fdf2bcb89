//! Object key decoding
//!
//! Notifications carry keys in form encoding (`+` for space, `%XX` escapes)
//! while the object APIs expect the literal key.

use crate::error::HandlerError;

/// Decode a form-encoded object key.
///
/// Pluses become spaces first, so an encoded plus (`%2B`) survives as `+`.
pub fn decode_key(key: &str) -> Result<String, HandlerError> {
    let spaced = key.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|source| HandlerError::KeyDecode {
            key: key.to_string(),
            source,
        })
}
