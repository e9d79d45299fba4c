//! The identity request body: an attestation of account control rather
//! than a transaction. Its shape differs between protocol v2 and v3.

use crate::action::PermissionLevel;
use crate::bytes::{Reader, Writer};
use crate::error::Result;
use crate::name::Name;

/// v2: optional permission only. v3: adds a `scope` name disambiguating
/// which relying-party context the attestation is for.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IdentityBody {
    V2 {
        permission: Option<PermissionLevel>,
    },
    V3 {
        scope: Name,
        permission: Option<PermissionLevel>,
    },
}

impl IdentityBody {
    pub fn permission(&self) -> Option<&PermissionLevel> {
        match self {
            IdentityBody::V2 { permission } => permission.as_ref(),
            IdentityBody::V3 { permission, .. } => permission.as_ref(),
        }
    }

    pub fn scope(&self) -> Option<Name> {
        match self {
            IdentityBody::V2 { .. } => None,
            IdentityBody::V3 { scope, .. } => Some(*scope),
        }
    }

    pub fn write(&self, w: &mut Writer) {
        match self {
            IdentityBody::V2 { permission } => write_optional_permission(w, permission),
            IdentityBody::V3 { scope, permission } => {
                w.put_u64(scope.value());
                write_optional_permission(w, permission);
            }
        }
    }

    pub fn read_v2(r: &mut Reader) -> Result<Self> {
        Ok(IdentityBody::V2 {
            permission: read_optional_permission(r)?,
        })
    }

    pub fn read_v3(r: &mut Reader) -> Result<Self> {
        let scope = Name::new(r.get_u64()?);
        let permission = read_optional_permission(r)?;
        Ok(IdentityBody::V3 { scope, permission })
    }
}

fn write_optional_permission(w: &mut Writer, permission: &Option<PermissionLevel>) {
    match permission {
        Some(pl) => {
            w.put_bool(true);
            pl.write(w);
        }
        None => w.put_bool(false),
    }
}

fn read_optional_permission(r: &mut Reader) -> Result<Option<PermissionLevel>> {
    if r.get_bool()? {
        Ok(Some(PermissionLevel::read(r)?))
    } else {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v3_round_trips_with_scope_and_permission() {
        let body = IdentityBody::V3 {
            scope: Name::from_base32("foo").unwrap(),
            permission: Some(PermissionLevel::new(
                Name::from_base32("foo").unwrap(),
                Name::from_base32("active").unwrap(),
            )),
        };
        let mut w = Writer::new();
        body.write(&mut w);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let decoded = IdentityBody::read_v3(&mut r).unwrap();
        assert_eq!(decoded, body);
    }

    #[test]
    fn v2_round_trips_without_permission() {
        let body = IdentityBody::V2 { permission: None };
        let mut w = Writer::new();
        body.write(&mut w);
        let bytes = w.into_bytes();
        let mut r = Reader::new(&bytes);
        let decoded = IdentityBody::read_v2(&mut r).unwrap();
        assert_eq!(decoded, body);
    }
}
