//! Actions and permission levels: the contract-invocation building blocks
//! shared by transactions and identity requests.

use crate::bytes::{Reader, Writer};
use crate::error::Result;
use crate::name::Name;

/// A pair of (actor, permission) authorizing an action. Either field may be
/// a placeholder until resolution.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PermissionLevel {
    pub actor: Name,
    pub permission: Name,
}

impl PermissionLevel {
    pub fn new(actor: Name, permission: Name) -> Self {
        Self { actor, permission }
    }

    /// The standard, non-authorization-context substitution: either field
    /// independently resolves placeholder-1 to the signer's actor and
    /// placeholder-2 to the signer's permission.
    pub fn substitute_in_data(&self, signer: &PermissionLevel) -> Self {
        Self {
            actor: resolve_name(self.actor, signer),
            permission: resolve_name(self.permission, signer),
        }
    }

    /// Substitution as it applies to an action's `authorization` list. Here
    /// placeholder-1 in the *permission* slot also resolves to the signer's
    /// permission — a backwards-compatibility rule carried over from
    /// earlier revisions of the protocol (see the design notes).
    pub fn substitute_in_authorization(&self, signer: &PermissionLevel) -> Self {
        let actor = resolve_name(self.actor, signer);
        let permission = if self.permission.is_placeholder_actor() {
            signer.permission
        } else {
            resolve_name(self.permission, signer)
        };
        Self { actor, permission }
    }

    pub fn write(&self, w: &mut Writer) {
        w.put_u64(self.actor.value());
        w.put_u64(self.permission.value());
    }

    pub fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            actor: Name::new(r.get_u64()?),
            permission: Name::new(r.get_u64()?),
        })
    }
}

fn resolve_name(n: Name, signer: &PermissionLevel) -> Name {
    if n.is_placeholder_actor() {
        signer.actor
    } else if n.is_placeholder_permission() {
        signer.permission
    } else {
        n
    }
}

/// A contract invocation descriptor: account, action name, authorizations,
/// and opaque data. Once resolved, `data` may additionally be viewed as a
/// decoded [`crate::value::Value`] record via the ABI codec.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Action {
    pub account: Name,
    pub name: Name,
    pub authorization: Vec<PermissionLevel>,
    pub data: Vec<u8>,
}

impl Action {
    pub fn write(&self, w: &mut Writer) {
        w.put_u64(self.account.value());
        w.put_u64(self.name.value());
        w.put_vec(&self.authorization, |w, pl| pl.write(w));
        w.put_bytes(&self.data);
    }

    pub fn read(r: &mut Reader) -> Result<Self> {
        let account = Name::new(r.get_u64()?);
        let name = Name::new(r.get_u64()?);
        let authorization = r.get_vec(PermissionLevel::read)?;
        let data = r.get_bytes()?;
        Ok(Self {
            account,
            name,
            authorization,
            data,
        })
    }

    /// Replace placeholders in both the authorization list (using the
    /// backwards-compat permission-slot rule) and leaves `data` untouched —
    /// decoded-data substitution is the caller's job once it has a `Value`.
    pub fn substitute_authorization_placeholders(&self, signer: &PermissionLevel) -> Self {
        Self {
            account: self.account,
            name: self.name,
            authorization: self
                .authorization
                .iter()
                .map(|pl| pl.substitute_in_authorization(signer))
                .collect(),
            data: self.data.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_round_trips_through_binary() {
        let action = Action {
            account: Name::from_base32("eosio.token").unwrap(),
            name: Name::from_base32("transfer").unwrap(),
            authorization: vec![PermissionLevel::new(
                Name::from_base32("foo").unwrap(),
                Name::from_base32("active").unwrap(),
            )],
            data: b"hello".to_vec(),
        };
        let mut w = Writer::new();
        action.write(&mut w);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let decoded = Action::read(&mut r).unwrap();
        assert_eq!(decoded, action);
    }

    #[test]
    fn authorization_placeholder_backcompat_rule() {
        let signer = PermissionLevel::new(
            Name::from_base32("foo").unwrap(),
            Name::from_base32("bar").unwrap(),
        );
        let pl = PermissionLevel::new(Name::placeholder_actor(), Name::placeholder_actor());
        let resolved = pl.substitute_in_authorization(&signer);
        assert_eq!(resolved.actor, signer.actor);
        // placeholder-1 in the permission slot resolves to signer.permission, not signer.actor.
        assert_eq!(resolved.permission, signer.permission);
    }
}
