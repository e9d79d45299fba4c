//! The transaction header and body: the shape every signable transaction
//! shares, whether it started life as a bare action, an action list, a
//! full transaction, or a synthetic identity attestation.

use crate::action::Action;
use crate::bytes::{Reader, Writer};
use crate::error::Result;

/// TAPoS + resource-limit fields. A header whose `expiration`,
/// `ref_block_num`, and `ref_block_prefix` are all zero is a "null
/// header" — a signal to the resolver to fill them in from chain context.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransactionHeader {
    pub expiration: u32,
    pub ref_block_num: u16,
    pub ref_block_prefix: u32,
    pub max_net_usage_words: u32,
    pub max_cpu_usage_ms: u8,
    pub delay_sec: u32,
}

impl TransactionHeader {
    pub const NULL: TransactionHeader = TransactionHeader {
        expiration: 0,
        ref_block_num: 0,
        ref_block_prefix: 0,
        max_net_usage_words: 0,
        max_cpu_usage_ms: 0,
        delay_sec: 0,
    };

    pub fn is_null(&self) -> bool {
        self.expiration == 0 && self.ref_block_num == 0 && self.ref_block_prefix == 0
    }

    pub fn write(&self, w: &mut Writer) {
        w.put_u32(self.expiration);
        w.put_u16(self.ref_block_num);
        w.put_u32(self.ref_block_prefix);
        w.put_varuint32(self.max_net_usage_words);
        w.put_u8(self.max_cpu_usage_ms);
        w.put_varuint32(self.delay_sec);
    }

    pub fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            expiration: r.get_u32()?,
            ref_block_num: r.get_u16()?,
            ref_block_prefix: r.get_u32()?,
            max_net_usage_words: r.get_varuint32()?,
            max_cpu_usage_ms: r.get_u8()?,
            delay_sec: r.get_varuint32()?,
        })
    }
}

impl Default for TransactionHeader {
    fn default() -> Self {
        Self::NULL
    }
}

/// A transaction extension: a protocol-reserved type tag plus opaque bytes.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransactionExtension {
    pub extension_type: u16,
    pub data: Vec<u8>,
}

impl TransactionExtension {
    pub fn write(&self, w: &mut Writer) {
        w.put_u16(self.extension_type);
        w.put_bytes(&self.data);
    }

    pub fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            extension_type: r.get_u16()?,
            data: r.get_bytes()?,
        })
    }
}

/// A complete transaction body: header plus the three action vectors.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transaction {
    pub header: TransactionHeader,
    pub context_free_actions: Vec<Action>,
    pub actions: Vec<Action>,
    pub transaction_extensions: Vec<TransactionExtension>,
}

impl Transaction {
    /// A transaction with the null header and no actions, ready to have
    /// `actions` populated by the builder.
    pub fn empty() -> Self {
        Self {
            header: TransactionHeader::NULL,
            context_free_actions: Vec::new(),
            actions: Vec::new(),
            transaction_extensions: Vec::new(),
        }
    }

    pub fn write(&self, w: &mut Writer) {
        self.header.write(w);
        w.put_vec(&self.context_free_actions, |w, a| a.write(w));
        w.put_vec(&self.actions, |w, a| a.write(w));
        w.put_vec(&self.transaction_extensions, |w, e| e.write(w));
    }

    pub fn read(r: &mut Reader) -> Result<Self> {
        let header = TransactionHeader::read(r)?;
        let context_free_actions = r.get_vec(Action::read)?;
        let actions = r.get_vec(Action::read)?;
        let transaction_extensions = r.get_vec(TransactionExtension::read)?;
        Ok(Self {
            header,
            context_free_actions,
            actions,
            transaction_extensions,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::new();
        self.write(&mut w);
        w.into_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut r = Reader::new(bytes);
        Self::read(&mut r)
    }
}
