//! The `Request` type: descriptor-driven construction, the mutable surface
//! (info pairs, callback, flags, originator signature), and the binary/text
//! carrier. Resolution lives in the `esr-resolve` crate, one layer up.

use esr_core::action::{Action, PermissionLevel};
use esr_core::chain_id::{ChainId, ChainIdVariant};
use esr_core::constants::{IDENTITY_ACCOUNT, IDENTITY_ACTION_NAME, VERSION_2, VERSION_3};
use esr_core::error::{EsrError, Result};
use esr_core::info::{Flags, InfoPair};
use esr_core::name::Name;
use esr_core::request_payload::{RequestPayload, RequestVariant};
use esr_core::transaction::{Transaction, TransactionHeader};
use esr_core::value::Value;
use esr_crypto::compress::Compressor;
use esr_crypto::digest::signing_digest;
use esr_crypto::signature::{Signature, SignatureProvider};

use esr_abi::abi::AbiProvider;
use esr_abi::identity::{built_in_identity_abi_v2, built_in_identity_abi_v3};

use crate::descriptor::{
    ActionDataInput, ActionInput, CallbackSpec, ChainIdSpec, IdentityArgs, InfoValue,
    RequestDescriptor, RequestOptions, TransactionInput,
};
use crate::frame::{decode_frame, encode_frame, OriginatorSignature};
use crate::uri::{decode_uri, encode_uri};

/// The "backwards-compatible" placeholder authorization used for an
/// identity action whose permission wasn't pinned to a specific account
/// (§4.5 step 1: "authorization = [signer or PlaceholderAuth]").
fn placeholder_auth() -> PermissionLevel {
    PermissionLevel::new(Name::placeholder_actor(), Name::placeholder_actor())
}

fn identity_account() -> Name {
    Name::new(IDENTITY_ACCOUNT)
}

fn identity_action_name() -> Name {
    Name::from_base32(IDENTITY_ACTION_NAME).expect("identity action name is valid")
}

/// A signing request: chain selection, request body, flags, callback, info
/// pairs, and an optional originator signature.
///
/// Structurally immutable except for the mutators in §3 of the protocol
/// (info pairs, callback, flags, signature) — everything else is set once
/// at construction and only changes by building (or decoding) a new value.
#[derive(Clone, PartialEq, Debug)]
pub struct Request {
    pub version: u8,
    pub payload: RequestPayload,
    pub signature: Option<OriginatorSignature>,
}

impl Request {
    // ── Construction ────────────────────────────────────────────────────

    /// The general-purpose constructor: covers the source's `create` and
    /// `createSync` (there is no async suspension point here since
    /// `AbiProvider` is a plain blocking call in this workspace).
    pub fn build(
        descriptor: RequestDescriptor,
        options: &RequestOptions,
        abi_provider: Option<&dyn AbiProvider>,
    ) -> Result<Self> {
        let is_identity = matches!(descriptor, RequestDescriptor::Identity(_));
        let forces_v3 = options.chain_id.is_none()
            || matches!(&descriptor, RequestDescriptor::Identity(args) if args.scope.is_some());
        let version = if forces_v3 { VERSION_3 } else { VERSION_2 };

        let chain_variant = match &options.chain_id {
            None => ChainIdVariant::Alias(0),
            Some(spec) => spec.to_chain_id()?.chain_variant(),
        };

        let req = match descriptor {
            RequestDescriptor::Action(a) => {
                RequestVariant::Action(encode_action(a, abi_provider)?)
            }
            RequestDescriptor::Actions(actions) => RequestVariant::Actions(
                actions
                    .into_iter()
                    .map(|a| encode_action(a, abi_provider))
                    .collect::<Result<Vec<_>>>()?,
            ),
            RequestDescriptor::Transaction(tx) => {
                RequestVariant::Transaction(encode_transaction(tx, abi_provider)?)
            }
            RequestDescriptor::Identity(args) => {
                RequestVariant::Identity(build_identity_body(args, version))
            }
        };

        let broadcast = if is_identity {
            false
        } else {
            options.broadcast.unwrap_or(true)
        };
        let background = options.callback.as_ref().map(|c| c.background).unwrap_or(false);
        let callback = options
            .callback
            .as_ref()
            .map(|c| c.url.clone())
            .unwrap_or_default();

        let mut info: Vec<InfoPair> = options
            .info
            .iter()
            .map(|(k, v)| InfoPair::new(k.clone(), v.to_bytes()))
            .collect();

        if chain_variant.is_unknown() {
            if let Some(ids) = &options.chain_ids {
                let variants = ids
                    .iter()
                    .map(|spec| spec.to_chain_id().map(|id| id.chain_variant()))
                    .collect::<Result<Vec<_>>>()?;
                info.push(InfoPair::new(
                    "chain_ids",
                    InfoValue::ChainIds(variants).to_bytes(),
                ));
            }
        }

        Ok(Request {
            version,
            payload: RequestPayload {
                chain_id: chain_variant,
                req,
                flags: Flags::new(broadcast, background),
                callback,
                info,
            },
            signature: None,
        })
    }

    /// Convenience wrapper over `build` for identity requests.
    pub fn identity(args: IdentityArgs, options: &RequestOptions) -> Result<Self> {
        Self::build(RequestDescriptor::Identity(args), options, None)
    }

    /// Wraps an already-serialized transaction verbatim (its actions are
    /// assumed already ABI-encoded) under an explicit, concrete chain id.
    pub fn from_transaction(
        chain_id: ChainIdSpec,
        transaction: Transaction,
        options: &RequestOptions,
    ) -> Result<Self> {
        let broadcast = options.broadcast.unwrap_or(true);
        let background = options.callback.as_ref().map(|c| c.background).unwrap_or(false);
        let callback = options
            .callback
            .as_ref()
            .map(|c| c.url.clone())
            .unwrap_or_default();
        let info = options
            .info
            .iter()
            .map(|(k, v)| InfoPair::new(k.clone(), v.to_bytes()))
            .collect();

        Ok(Request {
            version: VERSION_2,
            payload: RequestPayload {
                chain_id: chain_id.to_chain_id()?.chain_variant(),
                req: RequestVariant::Transaction(transaction),
                flags: Flags::new(broadcast, background),
                callback,
                info,
            },
            signature: None,
        })
    }

    /// Decode a textual request (`esr:...`, `web+esr:...`).
    pub fn from_uri(uri: &str, compressor: Option<&dyn Compressor>) -> Result<Self> {
        let bytes = decode_uri(uri)?;
        Self::from_data(&bytes, compressor)
    }

    /// Decode raw frame bytes directly, bypassing the text carrier.
    pub fn from_data(bytes: &[u8], compressor: Option<&dyn Compressor>) -> Result<Self> {
        let frame = decode_frame(bytes, compressor)?;
        let request = Request {
            version: frame.version,
            payload: frame.payload,
            signature: frame.signature,
        };
        if request.is_identity() && request.should_broadcast() {
            return Err(EsrError::IdentityBroadcast);
        }
        Ok(request)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn is_identity(&self) -> bool {
        self.payload.is_identity()
    }

    pub fn is_multi_chain(&self) -> bool {
        self.payload.chain_id.is_unknown()
    }

    pub fn should_broadcast(&self) -> bool {
        self.payload.flags.broadcast()
    }

    pub fn chain_id(&self) -> Result<ChainId> {
        self.payload.chain_id.to_chain_id()
    }

    /// Declared `chain_ids` (empty if the request doesn't restrict itself).
    pub fn chain_ids(&self) -> Result<Vec<ChainIdVariant>> {
        match self.raw_info_key("chain_ids") {
            Some(bytes) => InfoValue::as_chain_ids(bytes),
            None => Ok(Vec::new()),
        }
    }

    fn identity_body(&self) -> Option<&esr_core::identity::IdentityBody> {
        match &self.payload.req {
            RequestVariant::Identity(body) => Some(body),
            _ => None,
        }
    }

    /// The account whose control is being attested, if the identity
    /// permission is set and isn't itself a placeholder.
    pub fn get_identity(&self) -> Option<Name> {
        let pl = self.identity_body()?.permission()?;
        (!pl.actor.is_placeholder_actor() && !pl.actor.is_placeholder_permission())
            .then_some(pl.actor)
    }

    pub fn get_identity_permission(&self) -> Option<Name> {
        let pl = self.identity_body()?.permission()?;
        (!pl.permission.is_placeholder_actor() && !pl.permission.is_placeholder_permission())
            .then_some(pl.permission)
    }

    pub fn get_identity_scope(&self) -> Option<Name> {
        self.identity_body()?.scope()
    }

    /// The actions as declared on the request, synthesizing the identity
    /// action for identity requests.
    pub fn get_raw_actions(&self) -> Vec<Action> {
        match &self.payload.req {
            RequestVariant::Action(a) => vec![a.clone()],
            RequestVariant::Actions(actions) => actions.clone(),
            RequestVariant::Transaction(tx) => tx.actions.clone(),
            RequestVariant::Identity(body) => vec![self.synthesize_identity_action(body)],
        }
    }

    fn synthesize_identity_action(&self, body: &esr_core::identity::IdentityBody) -> Action {
        let abi = if self.version >= VERSION_3 {
            built_in_identity_abi_v3()
        } else {
            built_in_identity_abi_v2()
        };
        let authorization = match body.permission() {
            Some(pl) => vec![*pl],
            None => vec![placeholder_auth()],
        };
        let data = abi
            .encode_action_data(identity_action_name(), &identity_body_value(body))
            .expect("built-in identity ABI always encodes its own body");
        Action {
            account: identity_account(),
            name: identity_action_name(),
            authorization,
            data,
        }
    }

    /// The whole request viewed as a transaction (null header unless the
    /// caller supplied a concrete `transaction` descriptor).
    pub fn get_raw_transaction(&self) -> Transaction {
        match &self.payload.req {
            RequestVariant::Transaction(tx) => tx.clone(),
            RequestVariant::Identity(body) => Transaction {
                header: TransactionHeader::NULL,
                context_free_actions: vec![],
                actions: vec![self.synthesize_identity_action(body)],
                transaction_extensions: vec![],
            },
            _ => Transaction {
                header: TransactionHeader::NULL,
                context_free_actions: vec![],
                actions: self.get_raw_actions(),
                transaction_extensions: vec![],
            },
        }
    }

    /// Unique external accounts whose ABI must be fetched to resolve this
    /// request. The built-in identity action never appears here.
    pub fn get_required_abis(&self) -> Vec<Name> {
        let mut accounts: Vec<Name> = self
            .get_raw_actions()
            .into_iter()
            .map(|a| a.account)
            .filter(|a| a.value() != IDENTITY_ACCOUNT)
            .collect();
        accounts.sort_by_key(|n| n.value());
        accounts.dedup();
        accounts
    }

    /// Whether resolution needs to fill in a null transaction header.
    pub fn requires_tapos(&self) -> bool {
        if self.is_identity() && self.version < VERSION_3 {
            return false;
        }
        self.get_raw_transaction().header.is_null()
    }

    pub fn get_raw_info(&self) -> &[InfoPair] {
        &self.payload.info
    }

    pub fn get_raw_info_key(&self, key: &str) -> Option<&[u8]> {
        esr_core::info::get_info_key(&self.payload.info, key)
    }

    pub fn raw_info_key(&self, key: &str) -> Option<&[u8]> {
        self.get_raw_info_key(key)
    }

    pub fn get_info_key_string(&self, key: &str) -> Result<Option<String>> {
        self.get_raw_info_key(key).map(InfoValue::as_string).transpose()
    }

    pub fn get_info_key_bool(&self, key: &str) -> Result<Option<bool>> {
        self.get_raw_info_key(key).map(InfoValue::as_bool).transpose()
    }

    // ── Mutators ────────────────────────────────────────────────────────

    pub fn set_callback(&mut self, url: impl Into<String>, background: bool) {
        self.payload.callback = url.into();
        self.payload.flags.set_background(background);
    }

    pub fn set_broadcast(&mut self, broadcast: bool) -> Result<()> {
        if self.is_identity() && broadcast {
            return Err(EsrError::IdentityBroadcast);
        }
        self.payload.flags.set_broadcast(broadcast);
        Ok(())
    }

    pub fn set_raw_info_key(&mut self, key: impl AsRef<str>, value: Vec<u8>) {
        esr_core::info::set_info_key(&mut self.payload.info, key.as_ref(), value);
    }

    pub fn set_info_key(&mut self, key: impl AsRef<str>, value: InfoValue) {
        self.set_raw_info_key(key, value.to_bytes());
    }

    pub fn set_signature(&mut self, signer: Name, signature: Signature) {
        self.signature = Some(OriginatorSignature { signer, signature });
    }

    pub fn set_chain_ids(&mut self, ids: &[ChainIdVariant]) {
        self.set_raw_info_key("chain_ids", InfoValue::ChainIds(ids.to_vec()).to_bytes());
    }

    // ── Signing ─────────────────────────────────────────────────────────

    /// `SHA256(version || "request" || payload_bytes)` — the digest the
    /// originator signs, computed over the uncompressed payload with no
    /// signature trailer folded in (§4.7).
    pub fn get_signature_digest(&self) -> [u8; 32] {
        signing_digest(self.version, &self.get_data())
    }

    /// The exact bytes the originator signature digest is computed over.
    pub fn get_data(&self) -> Vec<u8> {
        self.payload.to_bytes()
    }

    pub fn sign(&mut self, provider: &dyn SignatureProvider) -> Result<()> {
        let digest = self.get_signature_digest();
        let (signer, signature) = provider.sign(&digest)?;
        self.set_signature(signer, signature);
        Ok(())
    }

    // ── Serialization ───────────────────────────────────────────────────

    pub fn encode(
        &self,
        slashes: bool,
        scheme: Option<&str>,
        compressor: Option<&dyn Compressor>,
    ) -> Result<String> {
        let bytes = encode_frame(
            self.version,
            &self.payload,
            self.signature.as_ref(),
            compressor,
        )?;
        Ok(encode_uri(&bytes, slashes, scheme))
    }
}

impl std::fmt::Display for Request {
    /// Uncompressed, `esr:` encoding — use [`Request::encode`] directly for
    /// compression or an alternate scheme.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.encode(false, None, None) {
            Ok(s) => write!(f, "{s}"),
            Err(_) => write!(f, "<invalid signing request>"),
        }
    }
}

fn encode_action(input: ActionInput, abi_provider: Option<&dyn AbiProvider>) -> Result<Action> {
    let data = match input.data {
        ActionDataInput::Raw(bytes) => bytes,
        ActionDataInput::Unencoded(value) => {
            let provider = abi_provider.ok_or(EsrError::MissingAbiProvider)?;
            let abi = provider.get_abi(input.account)?;
            abi.encode_action_data(input.name, &value)?
        }
    };
    Ok(Action {
        account: input.account,
        name: input.name,
        authorization: input.authorization,
        data,
    })
}

fn encode_transaction(
    input: TransactionInput,
    abi_provider: Option<&dyn AbiProvider>,
) -> Result<Transaction> {
    let encode_all = |actions: Vec<ActionInput>, provider: Option<&dyn AbiProvider>| {
        actions
            .into_iter()
            .map(|a| encode_action(a, provider))
            .collect::<Result<Vec<_>>>()
    };
    Ok(Transaction {
        header: input.header.unwrap_or(TransactionHeader::NULL),
        context_free_actions: encode_all(input.context_free_actions, abi_provider)?,
        actions: encode_all(input.actions, abi_provider)?,
        transaction_extensions: input.transaction_extensions,
    })
}

fn build_identity_body(args: IdentityArgs, version: u8) -> esr_core::identity::IdentityBody {
    if version >= VERSION_3 {
        esr_core::identity::IdentityBody::V3 {
            scope: args.scope.unwrap_or(Name::new(0)),
            permission: args.permission,
        }
    } else {
        esr_core::identity::IdentityBody::V2 {
            permission: args.permission,
        }
    }
}

/// The identity body rendered as the `Value` tree the built-in identity
/// ABI expects (§4.5: the synthetic action's `data`).
pub fn identity_body_value(body: &esr_core::identity::IdentityBody) -> Value {
    let permission = match body.permission() {
        Some(pl) => Value::PermissionLevel(*pl),
        None => Value::Bool(false),
    };
    match body {
        esr_core::identity::IdentityBody::V2 { .. } => {
            Value::Record(vec![("permission".into(), permission)])
        }
        esr_core::identity::IdentityBody::V3 { scope, .. } => Value::Record(vec![
            ("scope".into(), Value::Name(*scope)),
            ("permission".into(), permission),
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esr_abi::abi::{Abi, ActionDef, AbiMap};
    use esr_abi::types::FieldType;
    use esr_core::chain_id::ChainId;

    fn token_abi_map() -> AbiMap {
        let mut map = AbiMap::new();
        map.insert(Abi::new(
            Name::from_base32("eosio.token").unwrap(),
            vec![ActionDef {
                name: Name::from_base32("transfer").unwrap(),
                fields: vec![
                    ("from".into(), FieldType::Name),
                    ("to".into(), FieldType::Name),
                    ("quantity".into(), FieldType::Asset),
                    ("memo".into(), FieldType::String),
                ],
            }],
        ));
        map
    }

    fn transfer_action() -> ActionInput {
        ActionInput::unencoded(
            Name::from_base32("eosio.token").unwrap(),
            Name::from_base32("transfer").unwrap(),
            vec![PermissionLevel::new(
                Name::from_base32("foo").unwrap(),
                Name::from_base32("active").unwrap(),
            )],
            Value::Record(vec![
                ("from".into(), Value::Name(Name::from_base32("foo").unwrap())),
                ("to".into(), Value::Name(Name::from_base32("bar").unwrap())),
                ("quantity".into(), Value::String("1.000 EOS".into())),
                ("memo".into(), Value::String("hello there".into())),
            ]),
        )
    }

    #[test]
    fn builds_single_action_request_matching_reference_bytes() {
        let abis = token_abi_map();
        let options = RequestOptions::new().with_chain_id(ChainId::from_alias(1).unwrap());
        let req = Request::build(
            RequestDescriptor::Action(transfer_action()),
            &options,
            Some(&abis),
        )
        .unwrap();
        assert!(req.should_broadcast());
        assert!(!req.is_identity());
        let actions = req.get_raw_actions();
        assert_eq!(
            hex::encode(&actions[0].data),
            "000000000000285d000000000000ae39e80300000000000003454f53000000000b68656c6c6f207468657265"
        );
    }

    #[test]
    fn identity_request_is_never_broadcast() {
        let req = Request::identity(
            IdentityArgs {
                scope: Some(Name::from_base32("myapp").unwrap()),
                permission: None,
            },
            &RequestOptions::new().with_callback("myapp://cb"),
        )
        .unwrap();
        assert!(req.is_identity());
        assert!(!req.should_broadcast());
        assert!(req.set_broadcast(true).is_err());
    }

    #[test]
    fn multi_chain_request_declares_chain_ids() {
        let options = RequestOptions::new().with_info(
            "note",
            InfoValue::Str("hi".into()),
        );
        let mut options = options;
        options.chain_ids = Some(vec![
            ChainIdSpec::Alias(1),
            ChainIdSpec::Alias(10),
        ]);
        let req = Request::build(
            RequestDescriptor::Identity(IdentityArgs::default()),
            &options,
            None,
        )
        .unwrap();
        assert!(req.is_multi_chain());
        assert_eq!(
            req.chain_ids().unwrap(),
            vec![ChainIdVariant::Alias(1), ChainIdVariant::Alias(10)]
        );
    }

    #[test]
    fn round_trips_through_uri() {
        let abis = token_abi_map();
        let options = RequestOptions::new().with_chain_id(ChainId::from_alias(1).unwrap());
        let req = Request::build(
            RequestDescriptor::Action(transfer_action()),
            &options,
            Some(&abis),
        )
        .unwrap();
        let uri = req.encode(true, None, None).unwrap();
        let decoded = Request::from_uri(&uri, None).unwrap();
        assert_eq!(decoded, req);
    }

    #[test]
    fn clone_is_independent() {
        let req = Request::identity(IdentityArgs::default(), &RequestOptions::new()).unwrap();
        let mut copy = req.clone();
        copy.set_info_key("foo", InfoValue::Bool(true));
        assert_ne!(req.get_raw_info().len(), copy.get_raw_info().len());
    }
}
