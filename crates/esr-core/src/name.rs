//! Canonical blockchain account-name value: a 64-bit integer with a
//! base-32 textual form (13 characters, alphabet `.12345a-z`).

use std::fmt;
use std::str::FromStr;

use crate::constants::{PLACEHOLDER_NAME, PLACEHOLDER_PERMISSION_NAME};
use crate::error::{EsrError, Result};

const CHARMAP: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

fn char_to_symbol(c: u8) -> u64 {
    match c {
        b'.' => 0,
        b'1'..=b'5' => (c - b'1' + 1) as u64,
        b'a'..=b'z' => (c - b'a' + 6) as u64,
        _ => 0,
    }
}

/// A 64-bit account/action/permission name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Name(pub u64);

impl Name {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    /// The placeholder standing in for the signer's actor until resolution.
    pub const fn placeholder_actor() -> Self {
        Self(PLACEHOLDER_NAME)
    }

    /// The placeholder standing in for the signer's permission until
    /// resolution.
    pub const fn placeholder_permission() -> Self {
        Self(PLACEHOLDER_PERMISSION_NAME)
    }

    pub const fn is_placeholder_actor(&self) -> bool {
        self.0 == PLACEHOLDER_NAME
    }

    pub const fn is_placeholder_permission(&self) -> bool {
        self.0 == PLACEHOLDER_PERMISSION_NAME
    }

    /// Base-32 rendering, always 13 characters wide before trailing-dot
    /// trimming (the placeholder values are never trimmed since their
    /// sole non-dot character sits in the last position).
    pub fn to_base32(&self) -> String {
        let mut chars = [b'.'; 13];
        let mut tmp = self.0;
        for i in 0..13 {
            let mask: u64 = if i == 0 { 0x0f } else { 0x1f };
            let idx = (tmp & mask) as usize;
            chars[12 - i] = CHARMAP[idx];
            tmp >>= if i == 0 { 4 } else { 5 };
        }
        let s = String::from_utf8(chars.to_vec()).expect("charmap is ascii");
        let trimmed = s.trim_end_matches('.');
        if trimmed.is_empty() {
            ".".to_string()
        } else {
            trimmed.to_string()
        }
    }

    pub fn from_base32(s: &str) -> Result<Self> {
        if s.len() > 13 {
            return Err(EsrError::DecodeError(format!(
                "name string too long: {s:?}"
            )));
        }
        let bytes = s.as_bytes();
        let mut value: u64 = 0;
        for i in 0..13 {
            let mut c = if i < bytes.len() {
                char_to_symbol(bytes[i])
            } else {
                0
            };
            if i < 12 {
                c &= 0x1f;
                c <<= 64 - 5 * (i as u32 + 1);
            } else {
                c &= 0x0f;
            }
            value |= c;
        }
        Ok(Self(value))
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_base32())
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.to_base32())
    }
}

impl FromStr for Name {
    type Err = EsrError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_base32(s)
    }
}

impl From<u64> for Name {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
