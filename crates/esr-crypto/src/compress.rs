//! Raw-DEFLATE compression for the binary frame body: no zlib wrapper, no
//! gzip header, no checksum — just the deflate stream itself.

use std::io::{Read, Write};

use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;

use esr_core::error::{EsrError, Result};

/// External collaborator for raw DEFLATE/INFLATE, matching the protocol's
/// `Compressor` role. The default impl below is the only one most callers
/// need; the trait exists so a wallet can swap in its own (e.g. to share a
/// WASM deflate implementation with other parts of its stack).
pub trait Compressor {
    fn deflate(&self, data: &[u8]) -> Result<Vec<u8>>;
    fn inflate(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// `flate2`-backed raw DEFLATE compressor.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeflateCompressor;

impl Compressor for DeflateCompressor {
    fn deflate(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::best());
        encoder
            .write_all(data)
            .map_err(|e| EsrError::Other(e.to_string()))?;
        encoder.finish().map_err(|e| EsrError::Other(e.to_string()))
    }

    fn inflate(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = DeflateDecoder::new(data);
        let mut out = Vec::new();
        decoder
            .read_to_end(&mut out)
            .map_err(|e| EsrError::DecodeError(format!("inflate failed: {e}")))?;
        Ok(out)
    }
}

/// Compress `data` only if doing so produces strictly fewer bytes;
/// otherwise return the input unchanged. Returns whether compression was
/// used, since that decides the frame header's top bit.
pub fn compress_if_smaller(compressor: &dyn Compressor, data: &[u8]) -> Result<(bool, Vec<u8>)> {
    let compressed = compressor.deflate(data)?;
    if compressed.len() < data.len() {
        Ok((true, compressed))
    } else {
        Ok((false, data.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_deflate() {
        let c = DeflateCompressor;
        let data = b"hello hello hello hello hello hello hello hello";
        let compressed = c.deflate(data).unwrap();
        assert!(compressed.len() < data.len());
        assert_eq!(c.inflate(&compressed).unwrap(), data.to_vec());
    }

    #[test]
    fn incompressible_input_is_kept_uncompressed() {
        let c = DeflateCompressor;
        // A handful of high-entropy bytes: deflate framing overhead makes
        // the "compressed" output larger than the input.
        let data: Vec<u8> = vec![7, 200, 3, 250, 1, 99];
        let (used, out) = compress_if_smaller(&c, &data).unwrap();
        assert!(!used);
        assert_eq!(out, data);
    }
}
