//! Callback templating (§4.6): after a resolved request is signed, the
//! wallet substitutes `{{key}}` placeholders in the callback URL (and,
//! for background callbacks, in a parallel JSON payload) with the
//! concrete signature, transaction id, and reference-block fields.

use esr_core::error::{EsrError, Result};
use esr_crypto::signature::Signature;

use crate::context::format_timestamp;
use crate::resolved_request::ResolvedRequest;

/// The flattened key/value set a callback template draws from. `sig` is
/// always the first signature; `sig0`, `sig1`, ... address the rest when
/// more than one signer is involved (multi-signature authorities).
#[derive(Clone, Debug, PartialEq)]
pub struct CallbackPayload {
    pub sig: String,
    pub additional_sigs: Vec<String>,
    pub tx: String,
    pub rbn: String,
    pub rid: String,
    pub ex: String,
    pub req: String,
    pub sa: String,
    pub sp: String,
    pub cid: String,
    pub bn: Option<String>,
}

impl CallbackPayload {
    /// Look up one `{{key}}` placeholder's value, including the dynamic
    /// `sig0`, `sig1`, ... keys.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "sig" => Some(self.sig.clone()),
            "tx" => Some(self.tx.clone()),
            "rbn" => Some(self.rbn.clone()),
            "rid" => Some(self.rid.clone()),
            "ex" => Some(self.ex.clone()),
            "req" => Some(self.req.clone()),
            "sa" => Some(self.sa.clone()),
            "sp" => Some(self.sp.clone()),
            "cid" => Some(self.cid.clone()),
            "bn" => self.bn.clone(),
            other => other
                .strip_prefix("sig")
                .and_then(|rest| rest.parse::<usize>().ok())
                .and_then(|idx| self.additional_sigs.get(idx).cloned()),
        }
    }

    /// The full key/value set, for callers (e.g. background/JSON
    /// callbacks) that want every field rather than just the substituted
    /// URL.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("sig".to_string(), self.sig.clone()),
            ("tx".to_string(), self.tx.clone()),
            ("rbn".to_string(), self.rbn.clone()),
            ("rid".to_string(), self.rid.clone()),
            ("ex".to_string(), self.ex.clone()),
            ("req".to_string(), self.req.clone()),
            ("sa".to_string(), self.sa.clone()),
            ("sp".to_string(), self.sp.clone()),
            ("cid".to_string(), self.cid.clone()),
        ];
        if let Some(bn) = &self.bn {
            pairs.push(("bn".to_string(), bn.clone()));
        }
        for (i, sig) in self.additional_sigs.iter().enumerate() {
            pairs.push((format!("sig{i}"), sig.clone()));
        }
        pairs
    }

    /// The JSON record a background callback (§6: "background callbacks
    /// deliver this as JSON") POSTs back to the requester.
    pub fn to_json(&self) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        for (key, value) in self.to_pairs() {
            object.insert(key, serde_json::Value::String(value));
        }
        serde_json::Value::Object(object)
    }
}

/// A callback ready to be delivered: the substituted URL, whether it
/// should fire silently in the background, and the payload it was built
/// from (useful for background callbacks, which deliver the payload as
/// JSON rather than via navigation).
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedCallback {
    pub url: String,
    pub background: bool,
    pub payload: CallbackPayload,
}

fn build_payload(
    resolved: &ResolvedRequest,
    signatures: &[Signature],
    block_num: Option<u32>,
) -> Result<CallbackPayload> {
    let (sig, rest) = signatures
        .split_first()
        .ok_or(EsrError::NeedSignature)?;
    let header = resolved.transaction.header;
    Ok(CallbackPayload {
        sig: sig.to_wire_string(),
        additional_sigs: rest.iter().map(Signature::to_wire_string).collect(),
        tx: hex::encode(resolved.transaction_id()),
        rbn: header.ref_block_num.to_string(),
        rid: header.ref_block_prefix.to_string(),
        ex: format_timestamp(header.expiration)?,
        req: resolved.request.encode(false, None, None)?,
        sa: resolved.signer.actor.to_string(),
        sp: resolved.signer.permission.to_string(),
        cid: resolved.chain_id.to_hex(),
        bn: block_num.map(|n| n.to_string()),
    })
}

fn substitute(template: &str, payload: &CallbackPayload) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        match after_open.find("}}") {
            Some(end) => {
                let key = after_open[..end].trim();
                if let Some(value) = payload.get(key) {
                    out.push_str(&value);
                }
                rest = &after_open[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Build the resolved callback for a signed request, or `None` if the
/// request declared no callback at all. `block_num` fills the `{{bn}}`
/// placeholder when the wallet knows which block included the broadcast
/// transaction.
pub fn get_callback(
    resolved: &ResolvedRequest,
    signatures: &[Signature],
    block_num: Option<u32>,
) -> Result<Option<ResolvedCallback>> {
    if resolved.request.payload.callback.is_empty() {
        return Ok(None);
    }
    let payload = build_payload(resolved, signatures, block_num)?;
    let url = substitute(&resolved.request.payload.callback, &payload);
    Ok(Some(ResolvedCallback {
        url,
        background: resolved.request.payload.flags.background(),
        payload,
    }))
}
