//! `esr-crypto`: the cryptographic and binary-to-text primitives the
//! signing request protocol delegates to external collaborators — base64u,
//! SHA-256 digests, raw DEFLATE compression, and a signature/key-recovery
//! reference implementation.

pub mod base64u;
pub mod compress;
pub mod digest;
pub mod signature;

pub use compress::{compress_if_smaller, Compressor, DeflateCompressor};
pub use digest::{eosio_signing_digest, signing_digest, transaction_id};
pub use signature::{Authority, K1Recovery, K1Signer, KeyRecovery, PublicKey, Signature, SignatureProvider};
