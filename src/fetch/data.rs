//! `data:` URL sources.
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;
use url::Url;

use super::FetchError;

/// Decode the payload of a `data:` URL.
///
/// The payload is percent-decoded, then base64-decoded when the media type
/// ends in `;base64`.  ASCII whitespace inside base64 payloads is ignored.
///
/// # Errors
///
/// Returns [`FetchError::DataUrl`] if the URL has no `,` separator or the
/// base64 payload is invalid.
pub fn decode(url: &Url) -> Result<Vec<u8>, FetchError> {
    let raw = url
        .as_str()
        .strip_prefix("data:")
        .ok_or_else(|| FetchError::DataUrl(format!("'{url}' is not a data url")))?;
    let raw = raw.split_once('#').map_or(raw, |(before, _)| before);
    let (meta, payload) = raw
        .split_once(',')
        .ok_or_else(|| FetchError::DataUrl("missing ',' separator".to_string()))?;

    let bytes: Vec<u8> = percent_decode_str(payload).collect();
    let is_base64 = meta
        .rsplit(';')
        .next()
        .is_some_and(|param| param.trim().eq_ignore_ascii_case("base64"));
    if !is_base64 {
        return Ok(bytes);
    }

    let compact: Vec<u8> = bytes
        .into_iter()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    STANDARD
        .decode(compact)
        .map_err(|e| FetchError::DataUrl(e.to_string()))
}
