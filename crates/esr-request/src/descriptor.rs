//! Builder inputs: the request descriptor (exactly one of action / actions /
//! transaction / identity, modelled as a Rust enum so the "exactly one"
//! invariant is structural rather than checked at runtime), the options
//! record, and the typed info-value helper used by `set_info_key`.

use esr_core::action::PermissionLevel;
use esr_core::bytes::{Reader, Writer};
use esr_core::chain_id::{ChainId, ChainIdVariant};
use esr_core::error::{EsrError, Result};
use esr_core::name::Name;
use esr_core::transaction::{Transaction, TransactionExtension, TransactionHeader};
use esr_core::value::Value;
use esr_crypto::signature::Signature;

/// Action data as supplied to the builder: either already-encoded bytes, or
/// a value tree that still needs `AbiProvider`-driven encoding (§4.3).
#[derive(Clone, Debug)]
pub enum ActionDataInput {
    Raw(Vec<u8>),
    Unencoded(Value),
}

/// A single action as the builder receives it, before `data` is resolved
/// to raw bytes.
#[derive(Clone, Debug)]
pub struct ActionInput {
    pub account: Name,
    pub name: Name,
    pub authorization: Vec<PermissionLevel>,
    pub data: ActionDataInput,
}

impl ActionInput {
    pub fn raw(
        account: Name,
        name: Name,
        authorization: Vec<PermissionLevel>,
        data: Vec<u8>,
    ) -> Self {
        Self {
            account,
            name,
            authorization,
            data: ActionDataInput::Raw(data),
        }
    }

    pub fn unencoded(
        account: Name,
        name: Name,
        authorization: Vec<PermissionLevel>,
        data: Value,
    ) -> Self {
        Self {
            account,
            name,
            authorization,
            data: ActionDataInput::Unencoded(data),
        }
    }
}

/// A transaction as the builder receives it: header fields default to the
/// null header, action vectors default to empty (§4.3).
#[derive(Clone, Debug, Default)]
pub struct TransactionInput {
    pub header: Option<TransactionHeader>,
    pub context_free_actions: Vec<ActionInput>,
    pub actions: Vec<ActionInput>,
    pub transaction_extensions: Vec<TransactionExtension>,
}

/// The identity body's builder-facing fields: an optional `scope` (forces
/// v3) and an optional permission naming which account is being attested.
#[derive(Clone, Debug, Default)]
pub struct IdentityArgs {
    pub scope: Option<Name>,
    pub permission: Option<PermissionLevel>,
}

/// Exactly one of these four shapes, never zero, never more than one —
/// the tagged union recommended by the protocol's own design notes (§9)
/// in place of the source's "optional fields, check exactly one is set"
/// validation.
#[derive(Clone, Debug)]
pub enum RequestDescriptor {
    Action(ActionInput),
    Actions(Vec<ActionInput>),
    Transaction(TransactionInput),
    Identity(IdentityArgs),
}

/// Accepts the same shapes as `ChainId::from` (§4.2): a built-in alias
/// number, a 64-character hex string, or a raw 32-byte id.
#[derive(Clone, Debug)]
pub enum ChainIdSpec {
    Alias(u8),
    Hex(String),
    Raw([u8; 32]),
    Id(ChainId),
}

impl ChainIdSpec {
    pub fn to_chain_id(&self) -> Result<ChainId> {
        match self {
            ChainIdSpec::Alias(a) => ChainId::from_alias(*a),
            ChainIdSpec::Hex(s) => ChainId::from_hex(s),
            ChainIdSpec::Raw(bytes) => Ok(ChainId::from_bytes(*bytes)),
            ChainIdSpec::Id(id) => Ok(*id),
        }
    }
}

impl From<ChainId> for ChainIdSpec {
    fn from(id: ChainId) -> Self {
        ChainIdSpec::Id(id)
    }
}

/// The callback URL plus whether it should fire in the background
/// (delivered as JSON) rather than by navigating the user's browser.
#[derive(Clone, Debug, Default)]
pub struct CallbackSpec {
    pub url: String,
    pub background: bool,
}

impl From<String> for CallbackSpec {
    fn from(url: String) -> Self {
        Self {
            url,
            background: false,
        }
    }
}

impl From<&str> for CallbackSpec {
    fn from(url: &str) -> Self {
        url.to_string().into()
    }
}

impl From<(String, bool)> for CallbackSpec {
    fn from((url, background): (String, bool)) -> Self {
        Self { url, background }
    }
}

/// A typed info value. String values are written as raw UTF-8 with no
/// length prefix; every other recognised type goes through its own fixed
/// encoding. This asymmetry (called out in the protocol's design notes,
/// §9) must be preserved for wire compatibility with existing clients.
#[derive(Clone, Debug, PartialEq)]
pub enum InfoValue {
    Raw(Vec<u8>),
    Str(String),
    Bool(bool),
    Signature(Signature),
    ChainIds(Vec<ChainIdVariant>),
}

impl InfoValue {
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            InfoValue::Raw(b) => b.clone(),
            InfoValue::Str(s) => s.as_bytes().to_vec(),
            InfoValue::Bool(b) => vec![if *b { 1 } else { 0 }],
            InfoValue::Signature(sig) => sig.to_bytes(),
            InfoValue::ChainIds(ids) => {
                let mut w = Writer::new();
                w.put_vec(ids, |w, id| id.write(w));
                w.into_bytes()
            }
        }
    }

    pub fn as_bool(bytes: &[u8]) -> Result<bool> {
        match bytes {
            [0] => Ok(false),
            [1] => Ok(true),
            other => Err(EsrError::DecodeError(format!(
                "expected a single 0/1 byte for a bool info value, got {other:?}"
            ))),
        }
    }

    pub fn as_string(bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec()).map_err(|e| EsrError::DecodeError(e.to_string()))
    }

    pub fn as_chain_ids(bytes: &[u8]) -> Result<Vec<ChainIdVariant>> {
        let mut r = Reader::new(bytes);
        r.get_vec(ChainIdVariant::read)
    }
}

/// Builder options: chain selection, broadcast/background behaviour, the
/// callback, and any extra info pairs the caller wants to attach.
#[derive(Clone, Debug, Default)]
pub struct RequestOptions {
    /// `None` means "any chain" — a multi-chain request (chain alias 0).
    pub chain_id: Option<ChainIdSpec>,
    /// Only consulted when `chain_id` is `None`; written to `info` under
    /// `chain_ids` (§4.3).
    pub chain_ids: Option<Vec<ChainIdSpec>>,
    /// Defaults to `true` for non-identity requests, `false` (and forced)
    /// for identity requests.
    pub broadcast: Option<bool>,
    pub callback: Option<CallbackSpec>,
    pub info: Vec<(String, InfoValue)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chain_id(mut self, chain_id: impl Into<ChainIdSpec>) -> Self {
        self.chain_id = Some(chain_id.into());
        self
    }

    pub fn with_broadcast(mut self, broadcast: bool) -> Self {
        self.broadcast = Some(broadcast);
        self
    }

    pub fn with_callback(mut self, callback: impl Into<CallbackSpec>) -> Self {
        self.callback = Some(callback.into());
        self
    }

    pub fn with_info(mut self, key: impl Into<String>, value: InfoValue) -> Self {
        self.info.push((key.into(), value));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_ids_info_value_round_trips() {
        let ids = vec![ChainIdVariant::Alias(1), ChainIdVariant::Alias(10)];
        let value = InfoValue::ChainIds(ids.clone());
        let decoded = InfoValue::as_chain_ids(&value.to_bytes()).unwrap();
        assert_eq!(decoded, ids);
    }

    #[test]
    fn string_info_value_has_no_length_prefix() {
        let value = InfoValue::Str("hello".to_string());
        assert_eq!(value.to_bytes(), b"hello".to_vec());
    }
}
