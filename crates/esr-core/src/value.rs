//! Generic value tree used to represent ABI-decoded action data.
//!
//! The ABI codec itself lives outside this crate (it's externally supplied,
//! per the protocol's scope); this module only defines the shape decoded
//! data takes so that placeholder substitution can walk it generically
//! instead of via reflection.

use crate::action::PermissionLevel;
use crate::constants::PLACEHOLDER_RECURSION_LIMIT;
use crate::error::{EsrError, Result};
use crate::name::Name;

/// `Name | Bytes | Int | String | Array | Record`, per the protocol's own
/// design notes on modelling decoded action data without reflection.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Name(Name),
    Bytes(Vec<u8>),
    Int(i128),
    String(String),
    Bool(bool),
    PermissionLevel(PermissionLevel),
    Array(Vec<Value>),
    Record(Vec<(String, Value)>),
}

impl Value {
    /// Recursively replace placeholder `Name`s and `PermissionLevel`s with
    /// the concrete signer, visiting arrays and records. Fails if the
    /// recursion bound is exceeded rather than looping forever on a
    /// pathological (or cyclic-by-construction) value tree.
    pub fn substitute_placeholders(&self, signer: &PermissionLevel) -> Result<Value> {
        self.substitute_at_depth(signer, 0)
    }

    fn substitute_at_depth(&self, signer: &PermissionLevel, depth: usize) -> Result<Value> {
        if depth > PLACEHOLDER_RECURSION_LIMIT {
            return Err(EsrError::RecursionLimitExceeded(
                PLACEHOLDER_RECURSION_LIMIT,
            ));
        }
        Ok(match self {
            Value::Name(n) => {
                if n.is_placeholder_actor() {
                    Value::Name(signer.actor)
                } else if n.is_placeholder_permission() {
                    Value::Name(signer.permission)
                } else {
                    Value::Name(*n)
                }
            }
            Value::PermissionLevel(pl) => Value::PermissionLevel(pl.substitute_in_data(signer)),
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(item.substitute_at_depth(signer, depth + 1)?);
                }
                Value::Array(out)
            }
            Value::Record(fields) => {
                let mut out = Vec::with_capacity(fields.len());
                for (k, v) in fields {
                    out.push((k.clone(), v.substitute_at_depth(signer, depth + 1)?));
                }
                Value::Record(out)
            }
            other => other.clone(),
        })
    }

    /// True if no placeholder Name remains anywhere in the tree (used by
    /// the fixed-point test property after resolution).
    pub fn has_placeholder(&self) -> bool {
        match self {
            Value::Name(n) => n.is_placeholder_actor() || n.is_placeholder_permission(),
            Value::PermissionLevel(pl) => {
                pl.actor.is_placeholder_actor()
                    || pl.actor.is_placeholder_permission()
                    || pl.permission.is_placeholder_actor()
                    || pl.permission.is_placeholder_permission()
            }
            Value::Array(items) => items.iter().any(Value::has_placeholder),
            Value::Record(fields) => fields.iter().any(|(_, v)| v.has_placeholder()),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> PermissionLevel {
        PermissionLevel {
            actor: Name::from_base32("foo").unwrap(),
            permission: Name::from_base32("bar").unwrap(),
        }
    }

    #[test]
    fn substitutes_name_placeholders_recursively() {
        let tree = Value::Record(vec![
            ("from".into(), Value::Name(Name::placeholder_actor())),
            (
                "memos".into(),
                Value::Array(vec![
                    Value::Name(Name::placeholder_permission()),
                    Value::String("hi".into()),
                ]),
            ),
        ]);
        let resolved = tree.substitute_placeholders(&signer()).unwrap();
        assert!(!resolved.has_placeholder());
        match resolved {
            Value::Record(fields) => {
                assert_eq!(fields[0].1, Value::Name(signer().actor));
            }
            _ => panic!("expected record"),
        }
    }
}
