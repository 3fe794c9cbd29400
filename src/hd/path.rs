//! Child numbers and derivation paths (`m/44'/0'/0'/0/1`).

use std::fmt;
use std::str::FromStr;

use crate::error::{KeyError, KeyResult};

pub const HARDENED_BIT: u32 = 0x8000_0000;

/// One step in the tree. The hardened flag travels beside the index and is
/// only folded into the high bit on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChildNumber {
    Normal(u32),
    Hardened(u32),
}

impl ChildNumber {
    /// Fails with `InvalidKey` when `index >= 2^31`.
    pub fn new(index: u32, hardened: bool) -> KeyResult<Self> {
        if index & HARDENED_BIT != 0 {
            return Err(KeyError::invalid_key(format!("child index {index} is not below 2^31")));
        }
        Ok(if hardened { ChildNumber::Hardened(index) } else { ChildNumber::Normal(index) })
    }

    pub fn index(&self) -> u32 {
        match *self {
            ChildNumber::Normal(i) | ChildNumber::Hardened(i) => i,
        }
    }

    pub fn is_hardened(&self) -> bool {
        matches!(self, ChildNumber::Hardened(_))
    }

    /// Wire form, hardened bit set for hardened children.
    pub fn to_u32(&self) -> u32 {
        match *self {
            ChildNumber::Normal(i) => i,
            ChildNumber::Hardened(i) => i | HARDENED_BIT,
        }
    }

    pub fn from_u32(raw: u32) -> Self {
        if raw & HARDENED_BIT != 0 {
            ChildNumber::Hardened(raw & !HARDENED_BIT)
        } else {
            ChildNumber::Normal(raw)
        }
    }
}

impl fmt::Display for ChildNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChildNumber::Normal(i) => write!(f, "{i}"),
            ChildNumber::Hardened(i) => write!(f, "{i}'"),
        }
    }
}

impl FromStr for ChildNumber {
    type Err = KeyError;

    fn from_str(s: &str) -> KeyResult<Self> {
        let (digits, hardened) = match s.strip_suffix(&['\'', 'h', 'H'][..]) {
            Some(rest) => (rest, true),
            None => (s, false),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(KeyError::malformed(format!("invalid path component {s:?}")));
        }
        let index: u32 = digits
            .parse()
            .map_err(|_| KeyError::malformed(format!("path component {s:?} out of range")))?;
        Self::new(index, hardened)
    }
}

/// Ordered child numbers from the root. Empty for the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DerivationPath(Vec<ChildNumber>);

impl DerivationPath {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// This path extended by one step.
    pub fn child(&self, number: ChildNumber) -> Self {
        let mut steps = self.0.clone();
        steps.push(number);
        Self(steps)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChildNumber> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[ChildNumber] {
        &self.0
    }
}

impl From<Vec<ChildNumber>> for DerivationPath {
    fn from(steps: Vec<ChildNumber>) -> Self {
        Self(steps)
    }
}

impl<'a> IntoIterator for &'a DerivationPath {
    type Item = &'a ChildNumber;
    type IntoIter = std::slice::Iter<'a, ChildNumber>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for DerivationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("m")?;
        for step in &self.0 {
            write!(f, "/{step}")?;
        }
        Ok(())
    }
}

impl FromStr for DerivationPath {
    type Err = KeyError;

    /// Accepts `m`, `m/0'/1`, `m/0h/1H`. A trailing slash is tolerated.
    fn from_str(s: &str) -> KeyResult<Self> {
        let mut parts = s.trim().split('/');
        if parts.next() != Some("m") {
            return Err(KeyError::malformed(format!("derivation path {s:?} must start with 'm'")));
        }
        let steps = parts
            .filter(|part| !part.is_empty())
            .map(ChildNumber::from_str)
            .collect::<KeyResult<Vec<_>>>()?;
        Ok(Self(steps))
    }
}
