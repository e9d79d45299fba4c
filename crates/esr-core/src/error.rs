use thiserror::Error;

/// All failure modes defined by the signing request protocol.
///
/// One flat enum per the whole workspace, the same way `ChronxError`
/// covers every crate built on top of `chronx-core`.
#[derive(Debug, Error)]
pub enum EsrError {
    // ── Textual carrier ──────────────────────────────────────────────────
    #[error("invalid scheme: {0}")]
    InvalidScheme(String),

    #[error("invalid request uri: {0}")]
    InvalidUri(String),

    #[error("unsupported protocol version: {0}")]
    UnsupportedVersion(u8),

    #[error("compressed frame but no compressor was provided")]
    MissingCompressor,

    #[error("failed to decode payload: {0}")]
    DecodeError(String),

    // ── Builder ──────────────────────────────────────────────────────────
    #[error("descriptor must contain exactly one of action, actions, transaction, identity")]
    InvalidDescriptor,

    #[error("action data is not raw bytes and no ABI provider was supplied")]
    MissingAbiProvider,

    #[error("no ABI supplied for account {0}")]
    MissingAbi(String),

    #[error("action {action} is not defined in the ABI for {account}")]
    UnknownAction { account: String, action: String },

    #[error("unknown chain alias: {0}")]
    UnknownAlias(u8),

    // ── Resolution ─────────────────────────────────────────────────────
    #[error("resolution context does not provide enough information to fill TAPoS")]
    MissingTaPoS,

    #[error("multi-chain request resolved without a valid chain id")]
    BadChain,

    #[error("identity requests may not set the broadcast flag")]
    IdentityBroadcast,

    #[error("recursion limit ({0}) exceeded while substituting placeholders")]
    RecursionLimitExceeded(usize),

    // ── Callback ───────────────────────────────────────────────────────
    #[error("callback requires at least one signature")]
    NeedSignature,

    // ── Identity proof ───────────────────────────────────────────────────
    #[error("malformed identity proof: {0}")]
    BadProof(String),

    // ── Generic ────────────────────────────────────────────────────────
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, EsrError>;
