//! Header value transfer encoding.
//!
//! Outgoing values are re-encoded by reading their UTF-8 bytes as Latin-1,
//! one char per byte. The wire then carries the original UTF-8 bytes
//! unchanged, and a UTF-8 aware receiver reads the text back bit-exact.

use http::header::{HeaderValue, InvalidHeaderValue};

/// Map each UTF-8 byte of `value` to the Latin-1 char with the same code.
pub fn to_latin1_transfer(value: &str) -> String {
    value.bytes().map(char::from).collect()
}

/// Inverse of [`to_latin1_transfer`]. `None` if a char is outside Latin-1.
pub fn from_latin1_transfer(text: &str) -> Option<String> {
    let bytes = text
        .chars()
        .map(|c| u8::try_from(c).ok())
        .collect::<Option<Vec<u8>>>()?;
    String::from_utf8(bytes).ok()
}

/// Build a header value from text using the Latin-1 transfer.
pub fn header_value(value: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let transfer = to_latin1_transfer(value);
    let bytes: Vec<u8> = transfer
        .chars()
        .filter_map(|c| u8::try_from(c).ok())
        .collect();
    HeaderValue::from_bytes(&bytes)
}

/// Read a received header value as UTF-8, replacing invalid sequences.
pub fn decode_header_value(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}
