//! A contract ABI: the ordered field layout for each action a contract
//! defines, and the [`AbiProvider`] collaborator that fetches one given an
//! account name (the protocol's one suspending/fallible external call).

use esr_core::error::{EsrError, Result};
use esr_core::name::Name;
use esr_core::value::Value;

use crate::codec::{decode_value, encode_value};
use crate::types::FieldType;

/// The ordered parameter list for one action.
#[derive(Clone, Debug)]
pub struct ActionDef {
    pub name: Name,
    pub fields: Vec<(String, FieldType)>,
}

/// A contract's schema: which actions it defines and their field layouts.
/// Opaque beyond that to the rest of the workspace, same as the protocol
/// describes it ("an opaque ABI object usable by the serializer").
#[derive(Clone, Debug, Default)]
pub struct Abi {
    pub account: Name,
    actions: Vec<ActionDef>,
}

impl Abi {
    pub fn new(account: Name, actions: Vec<ActionDef>) -> Self {
        Self { account, actions }
    }

    fn find_action(&self, action: Name) -> Result<&ActionDef> {
        self.actions.iter().find(|a| a.name == action).ok_or_else(|| {
            EsrError::UnknownAction {
                account: self.account.to_string(),
                action: action.to_string(),
            }
        })
    }

    /// Encode a [`Value::Record`] into the action's raw `data` bytes,
    /// writing fields in ABI-declared order (not the record's own order).
    pub fn encode_action_data(&self, action: Name, value: &Value) -> Result<Vec<u8>> {
        let def = self.find_action(action)?;
        let fields = match value {
            Value::Record(fields) => fields,
            other => {
                return Err(EsrError::DecodeError(format!(
                    "action data for {action} must be a record, got {other:?}"
                )))
            }
        };
        let mut w = esr_core::bytes::Writer::new();
        for (field_name, field_ty) in &def.fields {
            let field_value = fields
                .iter()
                .find(|(k, _)| k == field_name)
                .map(|(_, v)| v)
                .ok_or_else(|| {
                    EsrError::DecodeError(format!(
                        "missing field {field_name:?} for action {action}"
                    ))
                })?;
            encode_value(&mut w, field_ty, field_value)?;
        }
        Ok(w.into_bytes())
    }

    /// Decode raw `data` bytes into a [`Value::Record`] in ABI-declared
    /// field order.
    pub fn decode_action_data(&self, action: Name, data: &[u8]) -> Result<Value> {
        let def = self.find_action(action)?;
        let mut r = esr_core::bytes::Reader::new(data);
        let mut fields = Vec::with_capacity(def.fields.len());
        for (field_name, field_ty) in &def.fields {
            fields.push((field_name.clone(), decode_value(&mut r, field_ty)?));
        }
        Ok(Value::Record(fields))
    }
}

/// Fetches the ABI for an account. The core's one suspending operation —
/// everything else in the protocol is synchronous computation over
/// already-fetched ABIs.
pub trait AbiProvider {
    fn get_abi(&self, account: Name) -> Result<Abi>;
}

/// An in-memory `AbiProvider` over a fixed account → ABI map, the common
/// case once `fetchAbis`-equivalent resolution has already run.
#[derive(Clone, Debug, Default)]
pub struct AbiMap(std::collections::HashMap<Name, Abi>);

impl AbiMap {
    pub fn new() -> Self {
        Self(std::collections::HashMap::new())
    }

    pub fn insert(&mut self, abi: Abi) {
        self.0.insert(abi.account, abi);
    }

    pub fn get(&self, account: Name) -> Option<&Abi> {
        self.0.get(&account)
    }
}

impl AbiProvider for AbiMap {
    fn get_abi(&self, account: Name) -> Result<Abi> {
        self.0
            .get(&account)
            .cloned()
            .ok_or_else(|| EsrError::MissingAbi(account.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token_abi() -> Abi {
        Abi::new(
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
        )
    }

    #[test]
    fn encodes_transfer_action_matching_reference_bytes() {
        let abi = token_abi();
        let value = Value::Record(vec![
            ("from".into(), Value::Name(Name::from_base32("foo").unwrap())),
            ("to".into(), Value::Name(Name::from_base32("bar").unwrap())),
            ("quantity".into(), Value::String("1.000 EOS".into())),
            ("memo".into(), Value::String("hello there".into())),
        ]);
        let data = abi
            .encode_action_data(Name::from_base32("transfer").unwrap(), &value)
            .unwrap();
        assert_eq!(
            hex::encode(&data),
            "000000000000285d000000000000ae39e80300000000000003454f53000000000b68656c6c6f207468657265"
        );
    }

    #[test]
    fn decode_is_inverse_of_encode() {
        let abi = token_abi();
        let action = Name::from_base32("transfer").unwrap();
        let value = Value::Record(vec![
            ("from".into(), Value::Name(Name::from_base32("foo").unwrap())),
            ("to".into(), Value::Name(Name::from_base32("bar").unwrap())),
            ("quantity".into(), Value::String("1.000 EOS".into())),
            ("memo".into(), Value::String("hello there".into())),
        ]);
        let data = abi.encode_action_data(action, &value).unwrap();
        let decoded = abi.decode_action_data(action, &data).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn unknown_action_fails() {
        let abi = token_abi();
        let err = abi
            .decode_action_data(Name::from_base32("burn").unwrap(), &[])
            .unwrap_err();
        assert!(matches!(err, EsrError::UnknownAction { .. }));
    }
}
