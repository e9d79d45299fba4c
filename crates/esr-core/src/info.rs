//! Info pairs and the flag byte.

use crate::bytes::{Reader, Writer};
use crate::constants::{FLAG_BACKGROUND, FLAG_BROADCAST};
use crate::error::Result;

/// A single `(key, raw value)` entry. Keys are not required to be unique on
/// the wire, but the typed setters enforce last-wins semantics.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InfoPair {
    pub key: String,
    pub value: Vec<u8>,
}

impl InfoPair {
    pub fn new(key: impl Into<String>, value: Vec<u8>) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }

    pub fn write(&self, w: &mut Writer) {
        w.put_string(&self.key);
        w.put_bytes(&self.value);
    }

    pub fn read(r: &mut Reader) -> Result<Self> {
        Ok(Self {
            key: r.get_string()?,
            value: r.get_bytes()?,
        })
    }
}

/// Look up the value for `key`, last entry wins if the key appears more
/// than once.
pub fn get_info_key<'a>(info: &'a [InfoPair], key: &str) -> Option<&'a [u8]> {
    info.iter()
        .rev()
        .find(|p| p.key == key)
        .map(|p| p.value.as_slice())
}

/// Replace (or append) the single entry for `key` so the list never grows
/// an unbounded number of stale duplicates from repeated sets.
pub fn set_info_key(info: &mut Vec<InfoPair>, key: &str, value: Vec<u8>) {
    if let Some(existing) = info.iter_mut().find(|p| p.key == key) {
        existing.value = value;
    } else {
        info.push(InfoPair::new(key, value));
    }
}

/// Bit 0 = broadcast, bit 1 = background, higher bits reserved but
/// preserved round-trip.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Flags(pub u8);

impl Flags {
    pub fn new(broadcast: bool, background: bool) -> Self {
        let mut f = Flags(0);
        f.set_broadcast(broadcast);
        f.set_background(background);
        f
    }

    pub fn broadcast(&self) -> bool {
        self.0 & FLAG_BROADCAST != 0
    }

    pub fn set_broadcast(&mut self, v: bool) {
        if v {
            self.0 |= FLAG_BROADCAST;
        } else {
            self.0 &= !FLAG_BROADCAST;
        }
    }

    pub fn background(&self) -> bool {
        self.0 & FLAG_BACKGROUND != 0
    }

    pub fn set_background(&mut self, v: bool) {
        if v {
            self.0 |= FLAG_BACKGROUND;
        } else {
            self.0 &= !FLAG_BACKGROUND;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_set_and_clear_independently() {
        let mut f = Flags::new(true, false);
        assert!(f.broadcast());
        assert!(!f.background());
        f.set_background(true);
        assert!(f.broadcast());
        assert!(f.background());
        f.set_broadcast(false);
        assert!(!f.broadcast());
        assert!(f.background());
        assert_eq!(f.0, FLAG_BACKGROUND);
    }

    #[test]
    fn set_info_key_is_last_wins_in_place() {
        let mut info = vec![InfoPair::new("chain_ids", vec![1])];
        set_info_key(&mut info, "chain_ids", vec![2]);
        assert_eq!(info.len(), 1);
        assert_eq!(get_info_key(&info, "chain_ids"), Some(&[2u8][..]));
    }
}
