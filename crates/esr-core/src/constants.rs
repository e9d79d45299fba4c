//! ─── Signing Request protocol constants ─────────────────────────────────────
//!
//! Mirrors the EOSIO signing-request (ESR) specification: a versioned,
//! compact container carrying a proposed transaction or identity attestation
//! from a requesting application to a signing wallet.

/// Protocol version 2: identity body carries only an optional permission.
pub const VERSION_2: u8 = 2;

/// Protocol version 3: identity body additionally carries a `scope` name.
pub const VERSION_3: u8 = 3;

/// Low 7 bits of the frame header hold the version; the top bit flags
/// raw-DEFLATE compression.
pub const VERSION_MASK: u8 = 0b0111_1111;
pub const COMPRESSED_FLAG: u8 = 0b1000_0000;

/// Placeholder account name: "............1". Resolved to the signer's actor.
pub const PLACEHOLDER_NAME: u64 = 1;

/// Placeholder permission name: "............2". Resolved to the signer's
/// permission.
pub const PLACEHOLDER_PERMISSION_NAME: u64 = 2;

/// Recursion bound for placeholder substitution over decoded action data
/// (§3: "a sensible recursion bound (≥100) is required").
pub const PLACEHOLDER_RECURSION_LIMIT: usize = 128;

/// Flag byte bit 0: broadcast the transaction once signed.
pub const FLAG_BROADCAST: u8 = 0b0000_0001;
/// Flag byte bit 1: the callback should fire in the background (no user
/// navigation), delivering the callback payload as JSON.
pub const FLAG_BACKGROUND: u8 = 0b0000_0010;

/// Default TAPoS expiration window when the caller supplies
/// `block_num`/`ref_block_prefix`/`timestamp` instead of an already-computed
/// `expiration`.
pub const DEFAULT_EXPIRE_SECONDS: u32 = 60;

/// The synthetic action name used for identity requests/proofs: "identity".
pub const IDENTITY_ACTION_NAME: &str = "identity";

/// The zero-valued account the identity action is addressed to: "............"
/// (all zero bits — no real contract answers to it).
pub const IDENTITY_ACCOUNT: u64 = 0;

/// MIME type for the text carrier.
pub const MIME_TYPE: &str = "application/eosio-signing-request";
/// File extension for the text carrier.
pub const FILE_EXTENSION: &str = "esr";
