//! Identity proofs (§4.8): the signed attestation a relying party receives
//! back after an identity request, and its verification against a known
//! [`Authority`].

use esr_abi::identity::built_in_identity_abi_v3;
use esr_core::action::{Action, PermissionLevel};
use esr_core::bytes::{Reader, Writer};
use esr_core::chain_id::ChainId;
use esr_core::constants::IDENTITY_ACTION_NAME;
use esr_core::error::{EsrError, Result};
use esr_core::name::Name;
use esr_core::transaction::{Transaction, TransactionHeader};
use esr_core::value::Value;
use esr_crypto::base64u;
use esr_crypto::digest::eosio_signing_digest;
use esr_crypto::signature::{Authority, KeyRecovery, Signature};

use crate::resolved_request::ResolvedRequest;

const WIRE_PREFIX: &str = "EOSIO ";

fn identity_account() -> Name {
    Name::new(esr_core::constants::IDENTITY_ACCOUNT)
}

fn identity_action_name() -> Name {
    Name::from_base32(IDENTITY_ACTION_NAME).expect("identity action name is valid")
}

/// A signed attestation that `signer` controls the named scope, on a
/// given chain, until `expiration`.
#[derive(Clone, PartialEq, Debug)]
pub struct IdentityProof {
    pub chain_id: ChainId,
    pub scope: Name,
    pub expiration: u32,
    pub signer: PermissionLevel,
    pub signature: Signature,
}

impl IdentityProof {
    /// Build the (unsigned) proof fields from a resolved identity request
    /// plus the signature the signer produced over its signing digest.
    pub fn from_resolved(resolved: &ResolvedRequest, signature: Signature) -> Result<Self> {
        if !resolved.request.is_identity() {
            return Err(EsrError::Other(
                "identity proofs can only be built from identity requests".into(),
            ));
        }
        Ok(Self {
            chain_id: resolved.chain_id,
            scope: resolved.request.get_identity_scope().unwrap_or(Name::new(0)),
            expiration: resolved.transaction.header.expiration,
            signer: resolved.signer,
            signature,
        })
    }

    /// The single-action transaction a verifier reconstructs to check the
    /// proof's signature: the same shape `synthesize_identity_action`
    /// built for the original request.
    pub fn signing_transaction(&self) -> Transaction {
        let abi = built_in_identity_abi_v3();
        let value = Value::Record(vec![
            ("scope".into(), Value::Name(self.scope)),
            (
                "permission".into(),
                Value::PermissionLevel(self.signer),
            ),
        ]);
        let data = abi
            .encode_action_data(identity_action_name(), &value)
            .expect("built-in identity ABI always encodes its own body");
        Transaction {
            header: TransactionHeader {
                expiration: self.expiration,
                ..TransactionHeader::NULL
            },
            context_free_actions: vec![],
            actions: vec![Action {
                account: identity_account(),
                name: identity_action_name(),
                authorization: vec![self.signer],
                data,
            }],
            transaction_extensions: vec![],
        }
    }

    pub fn signing_digest(&self) -> [u8; 32] {
        eosio_signing_digest(self.chain_id.as_bytes(), &self.signing_transaction().to_bytes())
    }

    /// Verify the proof hasn't expired and that its signature recovers to
    /// a key `authority` accepts.
    pub fn verify(
        &self,
        authority: &Authority,
        now: u32,
        recovery: &dyn KeyRecovery,
    ) -> Result<bool> {
        if now >= self.expiration {
            return Ok(false);
        }
        let digest = self.signing_digest();
        let key = recovery.recover(&self.signature, &digest)?;
        Ok(authority.accepts(&key))
    }

    fn write(&self, w: &mut Writer) {
        w.put_fixed_bytes(self.chain_id.as_bytes());
        w.put_u64(self.scope.value());
        w.put_u32(self.expiration);
        self.signer.write(w);
        w.put_fixed_bytes(&self.signature.to_bytes());
    }

    fn read(r: &mut Reader) -> Result<Self> {
        let chain_bytes = r.get_fixed_bytes(32)?;
        let mut chain_id = [0u8; 32];
        chain_id.copy_from_slice(&chain_bytes);
        let scope = Name::new(r.get_u64()?);
        let expiration = r.get_u32()?;
        let signer = PermissionLevel::read(r)?;
        let signature = Signature::from_bytes(&r.get_fixed_bytes(65)?)?;
        Ok(Self {
            chain_id: ChainId::from_bytes(chain_id),
            scope,
            expiration,
            signer,
            signature,
        })
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.write(&mut w);
        w.into_bytes()
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        Self::read(&mut r)
    }

    /// The `"EOSIO " + base64u(...)` textual form relying parties exchange
    /// identity proofs in.
    pub fn to_wire_string(&self) -> String {
        format!("{WIRE_PREFIX}{}", base64u::encode(&self.to_bytes()))
    }

    pub fn from_wire_string(s: &str) -> Result<Self> {
        let body = s
            .strip_prefix(WIRE_PREFIX)
            .ok_or_else(|| EsrError::BadProof(format!("missing {WIRE_PREFIX:?} prefix")))?;
        let bytes = base64u::decode(body).map_err(|e| EsrError::BadProof(e.to_string()))?;
        Self::from_bytes(&bytes).map_err(|e| EsrError::BadProof(e.to_string()))
    }
}
