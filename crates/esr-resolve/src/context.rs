//! Resolution context: whatever a wallet knows about the chain it's about
//! to sign against, handed to the resolver so it can fill in a null
//! transaction header (§4.5 step 2/3).

use chrono::{DateTime, Utc};
use esr_core::chain_id::ChainId;
use esr_core::constants::DEFAULT_EXPIRE_SECONDS;
use esr_core::error::{EsrError, Result};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Everything the resolver might need from the chain the request is being
/// signed against. None of the fields are required up front — which ones
/// matter depends on whether the request already carries concrete TAPoS
/// fields, a `block_num`/`timestamp` pair, or neither.
#[derive(Clone, Debug, Default)]
pub struct TransactionContext {
    /// Already-computed expiration, as EOSIO epoch seconds. Takes priority
    /// over `timestamp` + `expire_seconds` when both are present.
    pub expiration: Option<u32>,
    pub ref_block_num: Option<u16>,
    pub ref_block_prefix: Option<u32>,
    /// The reference block's own number, used to derive `ref_block_num`
    /// when the caller only has a head/irreversible block number to hand
    /// (§4.5 step 2: `ref_block_num = block_num mod 2^16`).
    pub block_num: Option<u32>,
    /// Wall-clock time the reference block was produced, used with
    /// `expire_seconds` to derive `expiration` when it isn't given
    /// directly.
    pub timestamp: Option<DateTime<Utc>>,
    pub expire_seconds: Option<u32>,
    /// The concrete chain a multi-chain request should be resolved
    /// against.
    pub chain_id: Option<ChainId>,
}

impl TransactionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain_id(mut self, chain_id: ChainId) -> Self {
        self.chain_id = Some(chain_id);
        self
    }

    /// TAPoS fields taken directly, with no timestamp/block-number
    /// derivation needed.
    pub fn with_tapos(mut self, expiration: u32, ref_block_num: u16, ref_block_prefix: u32) -> Self {
        self.expiration = Some(expiration);
        self.ref_block_num = Some(ref_block_num);
        self.ref_block_prefix = Some(ref_block_prefix);
        self
    }

    /// TAPoS derived from a reference block: `ref_block_num` is truncated
    /// from `block_num`, and `expiration` is `timestamp + expire_seconds`.
    pub fn with_reference_block(
        mut self,
        block_num: u32,
        ref_block_prefix: u32,
        timestamp: DateTime<Utc>,
    ) -> Self {
        self.block_num = Some(block_num);
        self.ref_block_prefix = Some(ref_block_prefix);
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_expire_seconds(mut self, seconds: u32) -> Self {
        self.expire_seconds = Some(seconds);
        self
    }

    pub fn expire_seconds(&self) -> u32 {
        self.expire_seconds.unwrap_or(DEFAULT_EXPIRE_SECONDS)
    }
}

/// Render an EOSIO epoch-seconds expiration as the ISO8601-without-zone
/// string the protocol's reference implementations use in callback
/// payloads and human-facing diagnostics.
pub fn format_timestamp(epoch_seconds: u32) -> Result<String> {
    DateTime::from_timestamp(epoch_seconds as i64, 0)
        .map(|dt| dt.format(TIMESTAMP_FORMAT).to_string())
        .ok_or_else(|| EsrError::DecodeError(format!("invalid epoch seconds: {epoch_seconds}")))
}

/// Parse an ISO8601-without-zone timestamp (as produced by
/// [`format_timestamp`]) back into a UTC instant.
pub fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    chrono::NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| EsrError::DecodeError(format!("invalid timestamp {s:?}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_round_trips() {
        let dt = parse_timestamp("2021-03-15T12:00:00").unwrap();
        let rendered = format_timestamp(dt.timestamp() as u32).unwrap();
        assert_eq!(rendered, "2021-03-15T12:00:00");
    }

    #[test]
    fn rejects_malformed_timestamp() {
        assert!(parse_timestamp("not a date").is_err());
    }
}
