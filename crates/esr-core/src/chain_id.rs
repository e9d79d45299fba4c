//! Chain identifiers: a 32-byte raw chain id, with a compact numeric alias
//! for the chains in the built-in table.

use std::fmt;

use crate::bytes::{Reader, Writer};
use crate::error::{EsrError, Result};

/// (alias, name, raw id hex) — bit-exact with the protocol's static table.
const ALIAS_TABLE: &[(u8, &str, &str)] = &[
    (1, "EOS", "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906"),
    (2, "TELOS", "4667b205c6838ef70ff7988f6e8257e8be0e1284a2f59699054a018f743b1d11"),
    (3, "JUNGLE", "e70aaab8997e1dfce58fbfac80cbbb8fecec7b99cf982a9444273cbc64c41473"),
    (4, "KYLIN", "5fff1dae8dc8e2fc4d5b23b2c7665c97f9e9d8edf2b6485a86ba311c25639191"),
    (5, "WORBLI", "73647cde120091e0a4b85bced2f3cfdb3041e266cbbe95cee59b73235a1b3b6f"),
    (6, "BOS", "d5a3d18fbb3c084e3b1f3fa98c21014b5f3db536cc15d08f9f6479517c6a3d86"),
    (7, "MEETONE", "cfe6486a83bad4962f232d48003b1824ab5665c36778141034d75e57b956e422"),
    (8, "INSIGHTS", "b042025541e25a472bffde2d62edd457b7e70cee943412b1ea0f044f88591664"),
    (9, "BEOS", "b912d19a6abd2b1b05611ae5be473355d64d95aeff0c09bedc8c166cd6468fe4"),
    (10, "WAX", "1064487b3cd1a897ce03ae5b6a865651747e2e152090f99c1d19d44e01aea5a4"),
    (11, "PROTON", "384da888112027f0321850a169f737c33e53b388aad48b5adace4bab97f437e0"),
    (12, "FIO", "21dcae42c0182200e93f954a074011f9048a7624c6fe81d3c9541a614a88bd1c"),
];

/// A chain's 32-byte identifier, with a short name if it matches a row of
/// the built-in alias table.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainId([u8; 32]);

impl ChainId {
    pub const UNKNOWN: ChainId = ChainId([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn from_alias(alias: u8) -> Result<Self> {
        if alias == 0 {
            return Ok(Self::UNKNOWN);
        }
        for &(a, _, hex) in ALIAS_TABLE {
            if a == alias {
                return Ok(Self::from_hex(hex).expect("alias table hex is well-formed"));
            }
        }
        Err(EsrError::UnknownAlias(alias))
    }

    pub fn from_hex(s: &str) -> Result<Self> {
        let bytes = hex::decode(s).map_err(|e| EsrError::DecodeError(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(EsrError::DecodeError(format!(
                "chain id must be 32 bytes, got {}",
                bytes.len()
            )));
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The alias name for this chain id if it's in the built-in table,
    /// otherwise `None` (the caller renders "UNKNOWN").
    pub fn chain_name(&self) -> Option<&'static str> {
        if *self == Self::UNKNOWN {
            return Some("UNKNOWN");
        }
        let hex = self.to_hex();
        ALIAS_TABLE
            .iter()
            .find(|(_, _, h)| *h == hex)
            .map(|(_, name, _)| *name)
    }

    fn alias_number(&self) -> Option<u8> {
        if *self == Self::UNKNOWN {
            return Some(0);
        }
        let hex = self.to_hex();
        ALIAS_TABLE
            .iter()
            .find(|(_, _, h)| *h == hex)
            .map(|(a, _, _)| *a)
    }

    /// The compact wire representation: an alias tag when one exists,
    /// otherwise the raw 32-byte id.
    pub fn chain_variant(&self) -> ChainIdVariant {
        match self.alias_number() {
            Some(alias) => ChainIdVariant::Alias(alias),
            None => ChainIdVariant::Raw(self.0),
        }
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({})", self.to_hex())
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Tagged-union wire form of a chain id: a compact alias byte, or the raw
/// 32-byte id when no alias applies.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ChainIdVariant {
    Alias(u8),
    Raw([u8; 32]),
}

impl ChainIdVariant {
    pub fn to_chain_id(&self) -> Result<ChainId> {
        match self {
            ChainIdVariant::Alias(a) => ChainId::from_alias(*a),
            ChainIdVariant::Raw(bytes) => Ok(ChainId::from_bytes(*bytes)),
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, ChainIdVariant::Alias(0))
    }

    pub fn write(&self, w: &mut Writer) {
        match self {
            ChainIdVariant::Alias(a) => {
                w.put_u8(0);
                w.put_u8(*a);
            }
            ChainIdVariant::Raw(bytes) => {
                w.put_u8(1);
                w.put_fixed_bytes(bytes);
            }
        }
    }

    pub fn read(r: &mut Reader) -> Result<Self> {
        match r.get_u8()? {
            0 => Ok(ChainIdVariant::Alias(r.get_u8()?)),
            1 => {
                let bytes = r.get_fixed_bytes(32)?;
                let mut arr = [0u8; 32];
                arr.copy_from_slice(&bytes);
                Ok(ChainIdVariant::Raw(arr))
            }
            tag => Err(EsrError::DecodeError(format!(
                "unknown chain id variant tag {tag}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_alias_round_trips() {
        let eos = ChainId::from_alias(1).unwrap();
        assert_eq!(eos.chain_name(), Some("EOS"));
        assert_eq!(
            eos.to_hex(),
            "aca376f206b8fc25a6ed44dbdc66547c36c6c33e3a119ffbeaef943642f0e906"
        );
        assert_eq!(eos.chain_variant(), ChainIdVariant::Alias(1));
    }

    #[test]
    fn unknown_raw_id_has_no_alias() {
        let raw = ChainId::from_hex(
            "0000000000000000000000000000000000000000000000000000000000000f",
        );
        // Odd-length hex above is invalid on purpose; use a valid 32-byte value instead.
        assert!(raw.is_err());
        let raw = ChainId::from_bytes([0x42; 32]);
        assert_eq!(raw.chain_name(), None);
        assert!(matches!(raw.chain_variant(), ChainIdVariant::Raw(_)));
    }

    #[test]
    fn alias_zero_is_unknown_multichain_marker() {
        assert_eq!(ChainId::from_alias(0).unwrap(), ChainId::UNKNOWN);
        assert!(ChainIdVariant::Alias(0).is_unknown());
    }

    #[test]
    fn unknown_alias_number_fails() {
        assert!(ChainId::from_alias(200).is_err());
    }

    #[test]
    fn wax_alias_matches_table() {
        let wax = ChainId::from_alias(10).unwrap();
        assert_eq!(
            wax.to_hex(),
            "1064487b3cd1a897ce03ae5b6a865651747e2e152090f99c1d19d44e01aea5a4"
        );
    }
}
