//! The binary frame: one header byte (version + compressed flag), the
//! request payload, and an optional originator signature trailer (§4.4).
//!
//! Per the protocol, the signature trailer is appended to the payload
//! *before* the optional DEFLATE pass — both are compressed (or not)
//! together. The signing digest itself (§4.7) is always computed over the
//! uncompressed payload alone, with no trailer folded in.

use esr_core::bytes::{Reader, Writer};
use esr_core::constants::{COMPRESSED_FLAG, VERSION_2, VERSION_3, VERSION_MASK};
use esr_core::error::{EsrError, Result};
use esr_core::name::Name;
use esr_core::request_payload::RequestPayload;
use esr_crypto::compress::{compress_if_smaller, Compressor};
use esr_crypto::signature::Signature;

/// The signer of a request, attesting that the originating application
/// itself produced it (distinct from the eventual transaction signer).
#[derive(Clone, PartialEq, Debug)]
pub struct OriginatorSignature {
    pub signer: Name,
    pub signature: Signature,
}

impl OriginatorSignature {
    pub fn write(&self, w: &mut Writer) {
        w.put_u64(self.signer.value());
        w.put_fixed_bytes(&self.signature.to_bytes());
    }

    pub fn read(r: &mut Reader) -> Result<Self> {
        let signer = Name::new(r.get_u64()?);
        let bytes = r.get_fixed_bytes(65)?;
        Ok(Self {
            signer,
            signature: Signature::from_bytes(&bytes)?,
        })
    }
}

/// A fully decoded frame: version, payload, and optional signature.
pub struct Frame {
    pub version: u8,
    pub payload: RequestPayload,
    pub signature: Option<OriginatorSignature>,
}

/// Serialize `payload` (and `signature`, if present) into frame bytes,
/// compressing the concatenation only when `compressor` is given and
/// doing so makes it strictly smaller (§4.4's "smaller-of-two" rule).
pub fn encode_frame(
    version: u8,
    payload: &RequestPayload,
    signature: Option<&OriginatorSignature>,
    compressor: Option<&dyn Compressor>,
) -> Result<Vec<u8>> {
    let mut body = Writer::new();
    payload.write(&mut body);
    if let Some(sig) = signature {
        sig.write(&mut body);
    }
    let body = body.into_bytes();

    let (compressed, body) = match compressor {
        Some(c) => compress_if_smaller(c, &body)?,
        None => (false, body),
    };

    let mut header = version & VERSION_MASK;
    if compressed {
        header |= COMPRESSED_FLAG;
    }

    let mut out = Vec::with_capacity(1 + body.len());
    out.push(header);
    out.extend(body);
    Ok(out)
}

/// Parse frame bytes back into version, payload, and optional signature.
pub fn decode_frame(bytes: &[u8], compressor: Option<&dyn Compressor>) -> Result<Frame> {
    if bytes.is_empty() {
        return Err(EsrError::DecodeError("empty frame".into()));
    }
    let header = bytes[0];
    let version = header & VERSION_MASK;
    if version != VERSION_2 && version != VERSION_3 {
        return Err(EsrError::UnsupportedVersion(version));
    }
    let compressed = header & COMPRESSED_FLAG != 0;
    let rest = &bytes[1..];

    let body = if compressed {
        let c = compressor.ok_or(EsrError::MissingCompressor)?;
        c.inflate(rest)?
    } else {
        rest.to_vec()
    };

    let mut r = Reader::new(&body);
    let payload = RequestPayload::read(&mut r, version)?;
    let signature = if r.has_remaining() {
        Some(OriginatorSignature::read(&mut r)?)
    } else {
        None
    };

    Ok(Frame {
        version,
        payload,
        signature,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use esr_core::action::Action;
    use esr_core::chain_id::ChainIdVariant;
    use esr_core::info::Flags;
    use esr_core::name::Name as N;
    use esr_core::request_payload::RequestVariant;
    use esr_crypto::compress::DeflateCompressor;

    fn sample_payload() -> RequestPayload {
        RequestPayload {
            chain_id: ChainIdVariant::Alias(1),
            req: RequestVariant::Action(Action {
                account: N::from_base32("eosio.token").unwrap(),
                name: N::from_base32("transfer").unwrap(),
                authorization: vec![],
                data: b"hello hello hello hello hello hello".to_vec(),
            }),
            flags: Flags::new(true, false),
            callback: String::new(),
            info: vec![],
        }
    }

    #[test]
    fn round_trips_without_compression() {
        let payload = sample_payload();
        let bytes = encode_frame(VERSION_2, &payload, None, None).unwrap();
        assert_eq!(bytes[0] & COMPRESSED_FLAG, 0);
        let frame = decode_frame(&bytes, None).unwrap();
        assert_eq!(frame.version, VERSION_2);
        assert_eq!(frame.payload, payload);
        assert!(frame.signature.is_none());
    }

    #[test]
    fn round_trips_with_compression() {
        let payload = sample_payload();
        let c = DeflateCompressor;
        let bytes = encode_frame(VERSION_2, &payload, None, Some(&c)).unwrap();
        assert_ne!(bytes[0] & COMPRESSED_FLAG, 0);
        let frame = decode_frame(&bytes, Some(&c)).unwrap();
        assert_eq!(frame.payload, payload);
    }

    #[test]
    fn compressed_frame_without_compressor_fails_to_decode() {
        let payload = sample_payload();
        let c = DeflateCompressor;
        let bytes = encode_frame(VERSION_2, &payload, None, Some(&c)).unwrap();
        assert!(matches!(
            decode_frame(&bytes, None),
            Err(EsrError::MissingCompressor)
        ));
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let payload = sample_payload();
        let bytes = encode_frame(9, &payload, None, None).unwrap();
        assert!(matches!(
            decode_frame(&bytes, None),
            Err(EsrError::UnsupportedVersion(9))
        ));
    }
}
