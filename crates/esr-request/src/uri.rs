//! The text carrier: `esr:<base64u>` (or `esr://<base64u>`), with
//! `web+esr:`/`web+esr://` accepted as a legacy alias on decode (§4.4, §6).

use esr_core::error::{EsrError, Result};
use esr_crypto::base64u;

pub const DEFAULT_SCHEME: &str = "esr";

const DECODE_PREFIXES: &[&str] = &["esr://", "esr:", "web+esr://", "web+esr:"];

/// Render `frame_bytes` as `<scheme>:<//><base64u>`.
pub fn encode_uri(frame_bytes: &[u8], slashes: bool, scheme: Option<&str>) -> String {
    let scheme = scheme.unwrap_or(DEFAULT_SCHEME);
    let sep = if slashes { "//" } else { "" };
    format!("{scheme}:{sep}{}", base64u::encode(frame_bytes))
}

/// Strip a recognised scheme prefix and base64u-decode the remainder.
/// Accepts `esr:`, `esr://`, `web+esr:`, `web+esr://`; anything else fails
/// with `InvalidScheme`.
pub fn decode_uri(uri: &str) -> Result<Vec<u8>> {
    let body = DECODE_PREFIXES
        .iter()
        .find_map(|prefix| uri.strip_prefix(prefix))
        .ok_or_else(|| EsrError::InvalidScheme(uri.to_string()))?;
    base64u::decode(body)
}
