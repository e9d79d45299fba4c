//! Signature types and the two external collaborators the protocol leaves
//! to "the chain's signature scheme": a `SignatureProvider` that signs a
//! digest, and `KeyRecovery`, which recovers a public key from a signature
//! plus its digest so an [`Authority`] can decide whether to accept it.
//!
//! Neither the wire format nor the resolution algorithm cares which curve
//! is behind these traits. The `k256`-backed implementation here is a
//! concrete, usable default (secp256k1, the curve EOSIO-family chains use),
//! not a protocol requirement.

use esr_core::error::{EsrError, Result};
use esr_core::name::Name;
use k256::ecdsa::{RecoveryId, Signature as K1Signature, SigningKey, VerifyingKey};
use ripemd::{Digest as _, Ripemd160};

/// A recoverable signature: a one-byte recovery id followed by the 64-byte
/// compact (r, s) encoding. Opaque to everything except `KeyRecovery`.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Signature {
    pub recovery_id: u8,
    pub bytes: [u8; 64],
}

impl Signature {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(65);
        out.push(self.recovery_id);
        out.extend_from_slice(&self.bytes);
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != 65 {
            return Err(EsrError::DecodeError(format!(
                "signature must be 65 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&bytes[1..]);
        Ok(Self {
            recovery_id: bytes[0],
            bytes: arr,
        })
    }

    /// The `SIG_K1_<base58check>` textual form used in callback payloads
    /// (§4.6's `sig`/`sigN` keys) and anywhere else a signature is shown
    /// to a human or embedded in a URL.
    pub fn to_wire_string(&self) -> String {
        let payload = self.to_bytes();
        let mut check_input = payload.clone();
        check_input.extend_from_slice(b"K1");
        let checksum = Ripemd160::digest(&check_input);
        let mut full = payload;
        full.extend_from_slice(&checksum[0..4]);
        format!("SIG_K1_{}", bs58::encode(full).into_string())
    }

    pub fn from_wire_string(s: &str) -> Result<Self> {
        let encoded = s
            .strip_prefix("SIG_K1_")
            .ok_or_else(|| EsrError::DecodeError(format!("unsupported signature curve: {s:?}")))?;
        let full = bs58::decode(encoded)
            .into_vec()
            .map_err(|e| EsrError::DecodeError(format!("invalid base58 signature: {e}")))?;
        if full.len() != 69 {
            return Err(EsrError::DecodeError(format!(
                "signature must decode to 69 bytes, got {}",
                full.len()
            )));
        }
        let (payload, checksum) = full.split_at(65);
        let mut check_input = payload.to_vec();
        check_input.extend_from_slice(b"K1");
        let expected = Ripemd160::digest(&check_input);
        if &expected[0..4] != checksum {
            return Err(EsrError::DecodeError("signature checksum mismatch".into()));
        }
        Self::from_bytes(payload)
    }
}

/// A compressed secp256k1 public key (33 bytes, SEC1 form).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct PublicKey(pub [u8; 33]);

impl PublicKey {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

/// Given a 32-byte digest, produce the signer's name and a signature over
/// it. Implemented by whatever holds the requesting or signing key.
pub trait SignatureProvider {
    fn sign(&self, digest: &[u8; 32]) -> Result<(Name, Signature)>;
}

/// Recover the public key that produced a signature over a digest, so an
/// [`Authority`] can check whether it's one of its weighted keys.
pub trait KeyRecovery {
    fn recover(&self, signature: &Signature, digest: &[u8; 32]) -> Result<PublicKey>;
}

/// secp256k1 reference implementation of both traits, suitable for tests
/// and for wallets that don't need a different curve.
#[derive(Clone)]
pub struct K1Signer {
    signing_key: SigningKey,
    name: Name,
}

impl K1Signer {
    pub fn new(signing_key: SigningKey, name: Name) -> Self {
        Self { signing_key, name }
    }

    pub fn public_key(&self) -> PublicKey {
        let point = VerifyingKey::from(&self.signing_key)
            .to_encoded_point(true);
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(point.as_bytes());
        PublicKey(bytes)
    }
}

impl SignatureProvider for K1Signer {
    fn sign(&self, digest: &[u8; 32]) -> Result<(Name, Signature)> {
        let (sig, recovery_id): (K1Signature, RecoveryId) = self
            .signing_key
            .sign_prehash_recoverable(digest)
            .map_err(|e| EsrError::Other(format!("signing failed: {e}")))?;
        let mut bytes = [0u8; 64];
        bytes.copy_from_slice(&sig.to_bytes());
        Ok((
            self.name,
            Signature {
                recovery_id: recovery_id.to_byte(),
                bytes,
            },
        ))
    }
}

/// secp256k1 recovery, stateless — recovery only needs the digest and the
/// signature itself.
#[derive(Clone, Copy, Debug, Default)]
pub struct K1Recovery;

impl KeyRecovery for K1Recovery {
    fn recover(&self, signature: &Signature, digest: &[u8; 32]) -> Result<PublicKey> {
        let recovery_id = RecoveryId::from_byte(signature.recovery_id)
            .ok_or_else(|| EsrError::BadProof("invalid recovery id".into()))?;
        let sig = K1Signature::from_slice(&signature.bytes)
            .map_err(|e| EsrError::BadProof(format!("malformed signature: {e}")))?;
        let verifying_key = VerifyingKey::recover_from_prehash(digest, &sig, recovery_id)
            .map_err(|e| EsrError::BadProof(format!("key recovery failed: {e}")))?;
        let point = verifying_key.to_encoded_point(true);
        let mut bytes = [0u8; 33];
        bytes.copy_from_slice(point.as_bytes());
        Ok(PublicKey(bytes))
    }
}

/// A weighted set of keys and a threshold: a signature is accepted if the
/// recovered key's own weight alone meets the threshold (matching the
/// protocol's identity-proof verification rule — no weight summing across
/// multiple keys is required or modeled here).
#[derive(Clone, Debug)]
pub struct Authority {
    pub threshold: u32,
    pub keys: Vec<(PublicKey, u32)>,
}

impl Authority {
    pub fn new(threshold: u32, keys: Vec<(PublicKey, u32)>) -> Self {
        Self { threshold, keys }
    }

    pub fn accepts(&self, key: &PublicKey) -> bool {
        self.keys
            .iter()
            .any(|(k, weight)| k == key && *weight >= self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use k256::elliptic_curve::rand_core::OsRng;

    #[test]
    fn sign_and_recover_round_trip() {
        let signing_key = SigningKey::random(&mut OsRng);
        let signer = K1Signer::new(signing_key, Name::from_base32("foo").unwrap());
        let digest = [7u8; 32];
        let (_name, sig) = signer.sign(&digest).unwrap();
        let recovered = K1Recovery.recover(&sig, &digest).unwrap();
        assert_eq!(recovered, signer.public_key());
    }

    #[test]
    fn authority_accepts_only_sufficiently_weighted_known_key() {
        let signing_key = SigningKey::random(&mut OsRng);
        let signer = K1Signer::new(signing_key, Name::from_base32("foo").unwrap());
        let authority = Authority::new(10, vec![(signer.public_key(), 10)]);
        assert!(authority.accepts(&signer.public_key()));

        let low_weight = Authority::new(10, vec![(signer.public_key(), 5)]);
        assert!(!low_weight.accepts(&signer.public_key()));
    }

    #[test]
    fn wire_string_round_trips_and_rejects_bad_checksum() {
        let signing_key = SigningKey::random(&mut OsRng);
        let signer = K1Signer::new(signing_key, Name::from_base32("foo").unwrap());
        let (_name, sig) = signer.sign(&[9u8; 32]).unwrap();
        let s = sig.to_wire_string();
        assert!(s.starts_with("SIG_K1_"));
        assert_eq!(Signature::from_wire_string(&s).unwrap(), sig);

        let mut corrupted = s.clone();
        corrupted.push('x');
        assert!(Signature::from_wire_string(&corrupted).is_err());
    }
}
