//! SHA-256 digests used throughout the protocol: the originator/signing
//! digest over a framed request, and the plain transaction-id digest.

use sha2::{Digest, Sha256};

const REQUEST_DOMAIN: &[u8] = b"request";

/// `SHA256(version_byte || "request" || payload_bytes)`, where
/// `payload_bytes` are the uncompressed request payload — no signature
/// trailer, no compression flag bit folded in.
pub fn signing_digest(version: u8, payload_bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update([version]);
    hasher.update(REQUEST_DOMAIN);
    hasher.update(payload_bytes);
    hasher.finalize().into()
}

/// `SHA256(serialized transaction)`, the plain on-chain transaction id.
pub fn transaction_id(serialized_transaction: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(serialized_transaction);
    hasher.finalize().into()
}

/// The standard EOSIO transaction signing digest:
/// `SHA256(chain_id || serialized_transaction || 32 zero bytes)`. The
/// trailing zero bytes stand in for a context-free-data digest; signing
/// requests never carry context-free data, so it's always the zero hash.
pub fn eosio_signing_digest(chain_id: &[u8; 32], serialized_transaction: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(chain_id);
    hasher.update(serialized_transaction);
    hasher.update([0u8; 32]);
    hasher.finalize().into()
}
