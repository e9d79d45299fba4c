//! The resolution algorithm (§4.5): fill in TAPoS, substitute placeholders
//! with the concrete signer, pick a chain for multi-chain requests, and
//! re-encode every action under its ABI to produce a transaction that's
//! actually ready to sign.

use esr_abi::abi::AbiProvider;
use esr_abi::identity::{built_in_identity_abi_v2, built_in_identity_abi_v3};
use esr_core::action::{Action, PermissionLevel};
use esr_core::constants::{IDENTITY_ACCOUNT, VERSION_3};
use esr_core::error::{EsrError, Result};
use esr_core::transaction::{Transaction, TransactionHeader};
use esr_core::value::Value;
use esr_request::Request;

use crate::context::TransactionContext;
use crate::resolved_request::{ResolvedAction, ResolvedRequest, ResolvedTransaction};

fn fill_tapos(header: &mut TransactionHeader, ctx: &TransactionContext) -> Result<()> {
    if !header.is_null() {
        return Ok(());
    }
    if let (Some(ref_block_num), Some(ref_block_prefix), Some(expiration)) =
        (ctx.ref_block_num, ctx.ref_block_prefix, ctx.expiration)
    {
        header.ref_block_num = ref_block_num;
        header.ref_block_prefix = ref_block_prefix;
        header.expiration = expiration;
        return Ok(());
    }
    if let (Some(block_num), Some(ref_block_prefix), Some(timestamp)) =
        (ctx.block_num, ctx.ref_block_prefix, ctx.timestamp)
    {
        header.ref_block_num = (block_num % 65536) as u16;
        header.ref_block_prefix = ref_block_prefix;
        header.expiration = (timestamp.timestamp() as u32).wrapping_add(ctx.expire_seconds());
        return Ok(());
    }
    Err(EsrError::MissingTaPoS)
}

/// v3 identity requests carry a real expiration even though they have no
/// reference block to pin against (§4.5 step 3) — fall back through
/// `ctx.expiration`, then `ctx.timestamp + expire_seconds`, then wall
/// clock, since an identity proof still needs *some* bound to be useful.
fn fill_identity_expiration(header: &mut TransactionHeader, ctx: &TransactionContext) {
    if !header.is_null() {
        return;
    }
    header.expiration = match (ctx.expiration, ctx.timestamp) {
        (Some(expiration), _) => expiration,
        (None, Some(timestamp)) => {
            (timestamp.timestamp() as u32).wrapping_add(ctx.expire_seconds())
        }
        (None, None) => (chrono::Utc::now().timestamp() as u32).wrapping_add(ctx.expire_seconds()),
    };
}

fn lookup_abi(account: esr_core::name::Name, abis: &dyn AbiProvider, version: u8) -> Result<esr_abi::abi::Abi> {
    if account.value() == IDENTITY_ACCOUNT {
        Ok(if version >= VERSION_3 {
            built_in_identity_abi_v3()
        } else {
            built_in_identity_abi_v2()
        })
    } else {
        abis.get_abi(account)
    }
}

/// The identity action's `permission` field always ends up as the
/// signer's own permission level once resolved (§4.8: the signing object
/// uses `data = encode({scope, permission: signer})`), whether the
/// original request left it absent or named something else. The identity
/// proof's reconstructed signing transaction makes the same
/// substitution, and the two must agree byte-for-byte.
fn force_identity_permission(value: Value, signer: &PermissionLevel) -> Value {
    match value {
        Value::Record(fields) => Value::Record(
            fields
                .into_iter()
                .map(|(k, v)| {
                    if k == "permission" {
                        (k, Value::PermissionLevel(*signer))
                    } else {
                        (k, v)
                    }
                })
                .collect(),
        ),
        other => other,
    }
}

fn resolve_action(
    raw: &Action,
    abis: &dyn AbiProvider,
    signer: &PermissionLevel,
    version: u8,
) -> Result<(Action, ResolvedAction)> {
    let abi = lookup_abi(raw.account, abis, version)?;
    let decoded = abi.decode_action_data(raw.name, &raw.data)?;
    let substituted_value = decoded.substitute_placeholders(signer)?;
    let substituted_value = if raw.account.value() == IDENTITY_ACCOUNT {
        force_identity_permission(substituted_value, signer)
    } else {
        substituted_value
    };
    let authorization: Vec<PermissionLevel> = raw
        .authorization
        .iter()
        .map(|pl| pl.substitute_in_authorization(signer))
        .collect();
    let data = abi.encode_action_data(raw.name, &substituted_value)?;

    Ok((
        Action {
            account: raw.account,
            name: raw.name,
            authorization: authorization.clone(),
            data,
        },
        ResolvedAction {
            account: raw.account,
            name: raw.name,
            authorization,
            data: substituted_value,
        },
    ))
}

/// Resolve every action on the request (including the synthetic identity
/// action), without touching the transaction header or choosing a chain.
/// Exposed on its own since callers reviewing "what am I about to sign"
/// rarely need the rest of resolution too.
pub fn resolve_actions(
    request: &Request,
    abis: &dyn AbiProvider,
    signer: PermissionLevel,
) -> Result<Vec<ResolvedAction>> {
    request
        .get_raw_actions()
        .iter()
        .map(|a| resolve_action(a, abis, &signer, request.version).map(|(_, resolved)| resolved))
        .collect()
}

/// Resolve the whole transaction: header fill-in plus every action,
/// returning both the signable (re-encoded) form and the decoded form
/// side by side.
pub fn resolve_transaction(
    request: &Request,
    abis: &dyn AbiProvider,
    signer: PermissionLevel,
    ctx: &TransactionContext,
) -> Result<(Transaction, ResolvedTransaction)> {
    let mut raw = request.get_raw_transaction();

    if request.is_identity() {
        if request.version >= VERSION_3 {
            fill_identity_expiration(&mut raw.header, ctx);
        }
    } else {
        fill_tapos(&mut raw.header, ctx)?;
    }

    let context_free = raw
        .context_free_actions
        .iter()
        .map(|a| resolve_action(a, abis, &signer, request.version))
        .collect::<Result<Vec<_>>>()?;
    let actions = raw
        .actions
        .iter()
        .map(|a| resolve_action(a, abis, &signer, request.version))
        .collect::<Result<Vec<_>>>()?;

    let transaction = Transaction {
        header: raw.header,
        context_free_actions: context_free.iter().map(|(a, _)| a.clone()).collect(),
        actions: actions.iter().map(|(a, _)| a.clone()).collect(),
        transaction_extensions: raw.transaction_extensions.clone(),
    };
    let resolved_transaction = ResolvedTransaction {
        header: raw.header,
        context_free_actions: context_free.into_iter().map(|(_, r)| r).collect(),
        actions: actions.into_iter().map(|(_, r)| r).collect(),
        transaction_extensions: raw.transaction_extensions,
    };

    Ok((transaction, resolved_transaction))
}

/// The chosen chain for a (possibly multi-chain) request: the context's
/// chain if the request declares no restriction, otherwise validated
/// against the request's declared `chain_ids` (§4.5 step 6).
fn resolve_chain_id(request: &Request, ctx: &TransactionContext) -> Result<esr_core::chain_id::ChainId> {
    if !request.is_multi_chain() {
        return request.chain_id();
    }
    let chosen = ctx.chain_id.ok_or(EsrError::BadChain)?;
    let declared = request.chain_ids()?;
    if !declared.is_empty() {
        let accepted = declared
            .iter()
            .any(|variant| variant.to_chain_id().map(|id| id == chosen).unwrap_or(false));
        if !accepted {
            return Err(EsrError::BadChain);
        }
    }
    Ok(chosen)
}

/// Resolve a request into a signable [`ResolvedRequest`]: pick the chain,
/// fill in TAPoS (or the identity expiration), and substitute every
/// placeholder with `signer`.
pub fn resolve(
    request: &Request,
    abis: &dyn AbiProvider,
    signer: PermissionLevel,
    ctx: &TransactionContext,
) -> Result<ResolvedRequest> {
    let chain_id = resolve_chain_id(request, ctx)?;
    let (transaction, resolved_transaction) = resolve_transaction(request, abis, signer, ctx)?;

    tracing::debug!(
        chain_id = %chain_id,
        actions = resolved_transaction.actions.len(),
        "resolved signing request"
    );

    Ok(ResolvedRequest {
        request: request.clone(),
        signer,
        chain_id,
        transaction,
        resolved_transaction,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use esr_abi::abi::{Abi, AbiMap, ActionDef};
    use esr_abi::types::FieldType;
    use esr_core::chain_id::{ChainId, ChainIdVariant};
    use esr_core::name::Name;
    use esr_core::value::Value;
    use esr_request::{
        ActionInput, ChainIdSpec, IdentityArgs, RequestDescriptor, RequestOptions,
    };

    fn signer() -> PermissionLevel {
        PermissionLevel::new(
            Name::from_base32("alice").unwrap(),
            Name::from_base32("active").unwrap(),
        )
    }

    fn token_abis() -> AbiMap {
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

    fn transfer_with_placeholder() -> ActionInput {
        ActionInput::unencoded(
            Name::from_base32("eosio.token").unwrap(),
            Name::from_base32("transfer").unwrap(),
            vec![PermissionLevel::new(
                Name::placeholder_actor(),
                Name::placeholder_actor(),
            )],
            Value::Record(vec![
                ("from".into(), Value::Name(Name::placeholder_actor())),
                ("to".into(), Value::Name(Name::from_base32("bar").unwrap())),
                ("quantity".into(), Value::String("1.000 EOS".into())),
                ("memo".into(), Value::String("hi".into())),
            ]),
        )
    }

    #[test]
    fn fills_tapos_from_reference_block_and_substitutes_signer() {
        let abis = token_abis();
        let options = RequestOptions::new().with_chain_id(ChainId::from_alias(1).unwrap());
        let req = Request::build(
            RequestDescriptor::Action(transfer_with_placeholder()),
            &options,
            Some(&abis),
        )
        .unwrap();

        let timestamp = chrono::Utc.with_ymd_and_hms(2021, 3, 15, 12, 0, 0).unwrap();
        let ctx = TransactionContext::new().with_reference_block(1000, 0xdeadbeef, timestamp);

        let resolved = resolve(&req, &abis, signer(), &ctx).unwrap();
        assert_eq!(resolved.transaction.header.ref_block_num, 1000 % 65536);
        assert_eq!(resolved.transaction.header.ref_block_prefix, 0xdeadbeef);
        assert_eq!(
            resolved.transaction.header.expiration,
            timestamp.timestamp() as u32 + ctx.expire_seconds()
        );

        let resolved_auth = resolved.resolved_transaction.actions[0].authorization[0];
        assert_eq!(resolved_auth.actor, signer().actor);
        // backwards-compat rule: placeholder-1 in the permission slot resolves
        // to signer.permission, not signer.actor.
        assert_eq!(resolved_auth.permission, signer().permission);

        match &resolved.resolved_transaction.actions[0].data {
            Value::Record(fields) => {
                assert_eq!(fields[0].1, Value::Name(signer().actor));
            }
            other => panic!("expected record, got {other:?}"),
        }
    }

    #[test]
    fn missing_tapos_context_fails() {
        let abis = token_abis();
        let options = RequestOptions::new().with_chain_id(ChainId::from_alias(1).unwrap());
        let req = Request::build(
            RequestDescriptor::Action(transfer_with_placeholder()),
            &options,
            Some(&abis),
        )
        .unwrap();
        let ctx = TransactionContext::new();
        assert!(matches!(
            resolve(&req, &abis, signer(), &ctx),
            Err(EsrError::MissingTaPoS)
        ));
    }

    #[test]
    fn v3_identity_request_gets_expiration_without_reference_block() {
        let req = Request::identity(
            IdentityArgs {
                scope: Some(Name::from_base32("myapp").unwrap()),
                permission: None,
            },
            &RequestOptions::new().with_chain_id(ChainId::from_alias(1).unwrap()),
        )
        .unwrap();
        let ctx = TransactionContext::new().with_expire_seconds(120);
        let resolved = resolve(&req, &AbiMap::new(), signer(), &ctx).unwrap();
        assert!(resolved.transaction.header.expiration > 0);
        assert_eq!(resolved.transaction.header.ref_block_num, 0);
    }

    #[test]
    fn multi_chain_request_rejects_undeclared_chain() {
        let mut options = RequestOptions::new();
        options.chain_ids = Some(vec![ChainIdSpec::Alias(1)]);
        let req = Request::build(
            RequestDescriptor::Identity(IdentityArgs::default()),
            &options,
            None,
        )
        .unwrap();
        assert!(req.is_multi_chain());

        let ctx = TransactionContext::new()
            .with_chain_id(ChainId::from_alias(10).unwrap())
            .with_expire_seconds(60);
        assert!(matches!(
            resolve(&req, &AbiMap::new(), signer(), &ctx),
            Err(EsrError::BadChain)
        ));

        let ctx_ok = TransactionContext::new().with_chain_id(ChainId::from_alias(1).unwrap());
        assert!(resolve(&req, &AbiMap::new(), signer(), &ctx_ok).is_ok());
    }

    #[test]
    fn missing_abi_for_external_account_fails() {
        let req = Request::build(
            RequestDescriptor::Action(transfer_with_placeholder()),
            &RequestOptions::new().with_chain_id(ChainId::from_alias(1).unwrap()),
            Some(&token_abis()),
        )
        .unwrap();
        let ctx = TransactionContext::new().with_tapos(100, 1, 2);
        assert!(matches!(
            resolve(&req, &AbiMap::new(), signer(), &ctx),
            Err(EsrError::MissingAbi(_))
        ));
    }

    #[test]
    fn declares_unknown_chain_variant_is_not_accidentally_accepted() {
        let variant = ChainIdVariant::Alias(1).to_chain_id().unwrap();
        assert_eq!(variant, ChainId::from_alias(1).unwrap());
    }
}
