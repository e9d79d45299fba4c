//! The output of resolution: a concrete, signable transaction alongside
//! its decoded form, plus the lazily-derived signing digest (§4.5, §4.7).

use std::collections::HashMap;

use esr_abi::abi::AbiProvider;
use esr_core::action::PermissionLevel;
use esr_core::chain_id::ChainId;
use esr_core::error::{EsrError, Result};
use esr_core::name::Name;
use esr_core::transaction::{Transaction, TransactionExtension, TransactionHeader};
use esr_core::value::Value;
use esr_crypto::compress::Compressor;
use esr_crypto::digest::{eosio_signing_digest, transaction_id};
use esr_request::Request;

use crate::context::{parse_timestamp, TransactionContext};
use crate::resolve::resolve;

/// One action with its `data` decoded into a [`Value`] tree and its
/// authorizations resolved, rather than still carrying raw bytes and
/// placeholders.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedAction {
    pub account: esr_core::name::Name,
    pub name: esr_core::name::Name,
    pub authorization: Vec<PermissionLevel>,
    pub data: Value,
}

/// A transaction viewed with every action's data decoded, for display or
/// confirmation UIs that want to show the user what they're signing
/// rather than opaque bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedTransaction {
    pub header: TransactionHeader,
    pub context_free_actions: Vec<ResolvedAction>,
    pub actions: Vec<ResolvedAction>,
    pub transaction_extensions: Vec<TransactionExtension>,
}

/// The result of resolving a [`Request`] against a signer and a
/// [`crate::context::TransactionContext`]: a concrete transaction ready to
/// be signed, and the same transaction with its actions decoded for
/// display.
#[derive(Clone, Debug)]
pub struct ResolvedRequest {
    pub request: Request,
    pub signer: PermissionLevel,
    pub chain_id: ChainId,
    pub transaction: Transaction,
    pub resolved_transaction: ResolvedTransaction,
}

impl ResolvedRequest {
    pub fn serialized_transaction(&self) -> Vec<u8> {
        self.transaction.to_bytes()
    }

    /// The exact bytes the transaction signature is computed over:
    /// `chain_id || serialized_transaction || 32 zero bytes` (the standard
    /// EOSIO signing digest's context-free-data padding, always zero here
    /// since signing requests never carry context-free data to hash).
    pub fn signing_data(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(32 + self.transaction.to_bytes().len() + 32);
        data.extend_from_slice(self.chain_id.as_bytes());
        data.extend_from_slice(&self.serialized_transaction());
        data.extend_from_slice(&[0u8; 32]);
        data
    }

    pub fn signing_digest(&self) -> [u8; 32] {
        eosio_signing_digest(self.chain_id.as_bytes(), &self.serialized_transaction())
    }

    /// The on-chain transaction id: `SHA256(serialized_transaction)`, with
    /// no chain id or padding folded in (distinct from `signing_digest`).
    pub fn transaction_id(&self) -> [u8; 32] {
        transaction_id(&self.serialized_transaction())
    }

    /// Reconstruct a resolved state from a received callback payload
    /// (§4.6, §6: `ResolvedRequest.fromPayload`). The payload's `req` key
    /// carries the original request back verbatim; `sa`/`sp` and `cid`
    /// pin down the signer and chain, and `rbn`/`rid`/`ex` are exactly the
    /// TAPoS fields resolution would otherwise have filled in — so the
    /// request can simply be re-resolved against them rather than
    /// recovering the signable transaction's bytes from the callback
    /// fields piecemeal.
    pub fn from_payload(
        pairs: &HashMap<String, String>,
        abis: &dyn AbiProvider,
        compressor: Option<&dyn Compressor>,
    ) -> Result<Self> {
        let field = |key: &str| -> Result<&String> {
            pairs
                .get(key)
                .ok_or_else(|| EsrError::DecodeError(format!("callback payload missing {key:?}")))
        };

        let request = Request::from_uri(field("req")?, compressor)?;

        let signer = PermissionLevel::new(
            field("sa")?.parse::<Name>()?,
            field("sp")?.parse::<Name>()?,
        );
        let chain_id = ChainId::from_hex(field("cid")?)?;

        let ref_block_num: u16 = field("rbn")?
            .parse()
            .map_err(|_| EsrError::DecodeError("malformed rbn in callback payload".into()))?;
        let ref_block_prefix: u32 = field("rid")?
            .parse()
            .map_err(|_| EsrError::DecodeError("malformed rid in callback payload".into()))?;
        let expiration = parse_timestamp(field("ex")?)?.timestamp() as u32;

        let ctx = TransactionContext::new()
            .with_chain_id(chain_id)
            .with_tapos(expiration, ref_block_num, ref_block_prefix);

        resolve(&request, abis, signer, &ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use esr_abi::abi::AbiMap;
    use esr_request::{ActionInput, RequestDescriptor, RequestOptions};

    fn signer() -> PermissionLevel {
        PermissionLevel::new(
            Name::from_base32("alice").unwrap(),
            Name::from_base32("active").unwrap(),
        )
    }

    #[test]
    fn from_payload_reconstructs_the_resolved_request() {
        let descriptor = RequestDescriptor::Action(ActionInput::raw(
            Name::from_base32("eosio.token").unwrap(),
            Name::from_base32("transfer").unwrap(),
            vec![],
            b"hello".to_vec(),
        ));
        let options = RequestOptions::new().with_chain_id(ChainId::from_alias(1).unwrap());
        let request = Request::build(descriptor, &options, None).unwrap();

        let timestamp = chrono::Utc.with_ymd_and_hms(2021, 3, 15, 12, 0, 0).unwrap();
        let ctx = TransactionContext::new().with_reference_block(1000, 0xdeadbeef, timestamp);
        let original = resolve(&request, &AbiMap::new(), signer(), &ctx).unwrap();

        let mut pairs = HashMap::new();
        pairs.insert("req".to_string(), original.request.encode(false, None, None).unwrap());
        pairs.insert("sa".to_string(), original.signer.actor.to_string());
        pairs.insert("sp".to_string(), original.signer.permission.to_string());
        pairs.insert("cid".to_string(), original.chain_id.to_hex());
        pairs.insert("rbn".to_string(), original.transaction.header.ref_block_num.to_string());
        pairs.insert("rid".to_string(), original.transaction.header.ref_block_prefix.to_string());
        pairs.insert(
            "ex".to_string(),
            crate::context::format_timestamp(original.transaction.header.expiration).unwrap(),
        );

        let reconstructed = ResolvedRequest::from_payload(&pairs, &AbiMap::new(), None).unwrap();
        assert_eq!(reconstructed.transaction, original.transaction);
        assert_eq!(reconstructed.signer, original.signer);
        assert_eq!(reconstructed.chain_id, original.chain_id);
    }

    #[test]
    fn from_payload_rejects_missing_field() {
        let pairs = HashMap::new();
        assert!(matches!(
            ResolvedRequest::from_payload(&pairs, &AbiMap::new(), None),
            Err(EsrError::DecodeError(_))
        ));
    }
}
