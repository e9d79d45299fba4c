//! The request payload: chain id, a tagged request-body variant, flags,
//! callback URL, and the free-form info list. Everything above the frame
//! byte (version + compression) and below the originator signature.

use crate::action::Action;
use crate::bytes::{Reader, Writer};
use crate::chain_id::ChainIdVariant;
use crate::constants::{VERSION_2, VERSION_3};
use crate::error::{EsrError, Result};
use crate::identity::IdentityBody;
use crate::info::{Flags, InfoPair};
use crate::transaction::Transaction;

/// Tagged union of the four shapes a request body can take.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RequestVariant {
    Action(Action),
    Actions(Vec<Action>),
    Transaction(Transaction),
    Identity(IdentityBody),
}

impl RequestVariant {
    fn tag(&self) -> u8 {
        match self {
            RequestVariant::Action(_) => 0,
            RequestVariant::Actions(_) => 1,
            RequestVariant::Transaction(_) => 2,
            RequestVariant::Identity(_) => 3,
        }
    }

    fn write(&self, w: &mut Writer) {
        w.put_u8(self.tag());
        match self {
            RequestVariant::Action(a) => a.write(w),
            RequestVariant::Actions(actions) => w.put_vec(actions, |w, a| a.write(w)),
            RequestVariant::Transaction(tx) => tx.write(w),
            RequestVariant::Identity(body) => body.write(w),
        }
    }

    /// Decoding an identity body requires knowing which protocol version
    /// framed the request, since v2 and v3 lay it out differently.
    fn read(r: &mut Reader, version: u8) -> Result<Self> {
        match r.get_u8()? {
            0 => Ok(RequestVariant::Action(Action::read(r)?)),
            1 => Ok(RequestVariant::Actions(r.get_vec(Action::read)?)),
            2 => Ok(RequestVariant::Transaction(Transaction::read(r)?)),
            3 => {
                let body = if version >= VERSION_3 {
                    IdentityBody::read_v3(r)?
                } else {
                    IdentityBody::read_v2(r)?
                };
                Ok(RequestVariant::Identity(body))
            }
            tag => Err(EsrError::DecodeError(format!(
                "unknown request variant tag {tag}"
            ))),
        }
    }
}

/// The full signing request payload, version-agnostic at the type level —
/// the version only governs how the `Identity` variant is laid out on
/// the wire (see [`RequestVariant::read`]).
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RequestPayload {
    pub chain_id: ChainIdVariant,
    pub req: RequestVariant,
    pub flags: Flags,
    pub callback: String,
    pub info: Vec<InfoPair>,
}

impl RequestPayload {
    pub fn write(&self, w: &mut Writer) {
        self.chain_id.write(w);
        self.req.write(w);
        w.put_u8(self.flags.0);
        w.put_string(&self.callback);
        w.put_vec(&self.info, |w, p| p.write(w));
    }

    pub fn read(r: &mut Reader, version: u8) -> Result<Self> {
        if version != VERSION_2 && version != VERSION_3 {
            return Err(EsrError::UnsupportedVersion(version));
        }
        let chain_id = ChainIdVariant::read(r)?;
        let req = RequestVariant::read(r, version)?;
        let flags = Flags(r.get_u8()?);
        let callback = r.get_string()?;
        let info = r.get_vec(InfoPair::read)?;
        Ok(Self {
            chain_id,
            req,
            flags,
            callback,
            info,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.write(&mut w);
        w.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8], version: u8) -> Result<Self> {
        let mut r = Reader::new(bytes);
        Self::read(&mut r, version)
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.req, RequestVariant::Identity(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::name::Name;

    fn sample_action() -> Action {
        Action {
            account: Name::from_base32("eosio.token").unwrap(),
            name: Name::from_base32("transfer").unwrap(),
            authorization: vec![],
            data: vec![1, 2, 3],
        }
    }

    #[test]
    fn action_variant_round_trips_at_v2() {
        let payload = RequestPayload {
            chain_id: ChainIdVariant::Alias(1),
            req: RequestVariant::Action(sample_action()),
            flags: Flags::new(true, false),
            callback: "https://example.com/cb".to_string(),
            info: vec![InfoPair::new("note", b"hi".to_vec())],
        };
        let bytes = payload.to_bytes();
        let decoded = RequestPayload::from_bytes(&bytes, VERSION_2).unwrap();
        assert_eq!(decoded, payload);
    }

    #[test]
    fn identity_variant_dispatches_on_version() {
        let payload = RequestPayload {
            chain_id: ChainIdVariant::Alias(0),
            req: RequestVariant::Identity(IdentityBody::V3 {
                scope: Name::from_base32("myapp").unwrap(),
                permission: None,
            }),
            flags: Flags::new(false, false),
            callback: String::new(),
            info: vec![],
        };
        let bytes = payload.to_bytes();
        let decoded = RequestPayload::from_bytes(&bytes, VERSION_3).unwrap();
        assert_eq!(decoded, payload);
        assert!(decoded.is_identity());
    }

    #[test]
    fn unsupported_version_is_rejected() {
        let bytes = vec![0u8; 4];
        assert!(matches!(
            RequestPayload::from_bytes(&bytes, 9),
            Err(EsrError::UnsupportedVersion(9))
        ));
    }
}
