//! Field types a contract ABI can declare for an action's parameters.
//!
//! This is deliberately a small, closed set rather than a general ABI
//! type system (structs, variants, arrays of arbitrary depth): it covers
//! the primitives the protocol itself needs (names, strings, bytes,
//! integers, assets, permission levels) and lets a fuller ABI library be
//! substituted behind the same [`crate::abi::Abi`] trait.

use esr_core::value::Value;

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum FieldType {
    Name,
    String,
    Bytes,
    Bool,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    /// `<amount> <symbol>`, e.g. `"1.000 EOS"` — EOSIO's packed asset form.
    Asset,
    PermissionLevel,
    Optional(Box<FieldType>),
}

/// True if `value`'s shape matches what `encode_field` expects for `ty`,
/// used by callers that want to validate before committing to a provider
/// round-trip.
pub fn value_matches(ty: &FieldType, value: &Value) -> bool {
    match (ty, value) {
        (FieldType::Name, Value::Name(_)) => true,
        (FieldType::String, Value::String(_)) => true,
        (FieldType::Bytes, Value::Bytes(_)) => true,
        (FieldType::Bool, Value::Bool(_)) => true,
        (
            FieldType::Uint8
            | FieldType::Uint16
            | FieldType::Uint32
            | FieldType::Uint64
            | FieldType::Int8
            | FieldType::Int16
            | FieldType::Int32
            | FieldType::Int64,
            Value::Int(_),
        ) => true,
        (FieldType::Asset, Value::String(_)) => true,
        (FieldType::PermissionLevel, Value::PermissionLevel(_)) => true,
        (FieldType::Optional(_), Value::Bool(false)) => true,
        (FieldType::Optional(inner), other) => value_matches(inner, other),
        _ => false,
    }
}
