//! The built-in identity ABI: the schema for the synthetic `identity`
//! action used by identity requests and identity-proof verification
//! transactions. Every wallet supports this action without needing to
//! fetch it from an `AbiProvider`.

use esr_core::constants::{IDENTITY_ACCOUNT, IDENTITY_ACTION_NAME};
use esr_core::name::Name;

use crate::abi::{Abi, ActionDef};
use crate::types::FieldType;

fn identity_account() -> Name {
    Name::new(IDENTITY_ACCOUNT)
}

fn identity_action() -> Name {
    Name::from_base32(IDENTITY_ACTION_NAME).expect("identity action name is valid")
}

/// v2: `(permission: optional PermissionLevel)`.
pub fn built_in_identity_abi_v2() -> Abi {
    Abi::new(
        identity_account(),
        vec![ActionDef {
            name: identity_action(),
            fields: vec![(
                "permission".into(),
                FieldType::Optional(Box::new(FieldType::PermissionLevel)),
            )],
        }],
    )
}

/// v3: `(scope: Name, permission: optional PermissionLevel)`.
pub fn built_in_identity_abi_v3() -> Abi {
    Abi::new(
        identity_account(),
        vec![ActionDef {
            name: identity_action(),
            fields: vec![
                ("scope".into(), FieldType::Name),
                (
                    "permission".into(),
                    FieldType::Optional(Box::new(FieldType::PermissionLevel)),
                ),
            ],
        }],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use esr_core::action::PermissionLevel;
    use esr_core::value::Value;

    #[test]
    fn v3_action_data_round_trips() {
        let abi = built_in_identity_abi_v3();
        let value = Value::Record(vec![
            ("scope".into(), Value::Name(Name::from_base32("myapp").unwrap())),
            (
                "permission".into(),
                Value::PermissionLevel(PermissionLevel::new(
                    Name::from_base32("foo").unwrap(),
                    Name::from_base32("active").unwrap(),
                )),
            ),
        ]);
        let data = abi.encode_action_data(identity_action(), &value).unwrap();
        let decoded = abi.decode_action_data(identity_action(), &data).unwrap();
        assert_eq!(decoded, value);
    }
}
