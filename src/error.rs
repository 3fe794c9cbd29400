//! Error kinds for the key engine.
//!
//! Every fallible operation returns [`KeyResult`]. Only
//! [`KeyError::DerivationInvalid`] for a child index has a recovery protocol:
//! BIP32 says the caller moves on to the next index. Everything else is a
//! bad input.

use thiserror::Error;

pub type KeyResult<T> = std::result::Result<T, KeyError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    /// Scalar outside `[1, n)`, bad public key bytes, short seed, point off the curve.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// `IL >= n` or a degenerate child key. Retry with `index + 1`.
    /// `index` is `None` for the master key, which only another seed can fix.
    #[error("{}", derivation_message(.index, .hardened))]
    DerivationInvalid { index: Option<u32>, hardened: bool },

    #[error("No private key available")]
    NoPrivateKey,

    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),

    #[error("Checksum mismatch")]
    ChecksumMismatch,
}

fn derivation_message(index: &Option<u32>, hardened: &bool) -> String {
    match index {
        Some(index) => {
            let mark = if *hardened { "'" } else { "" };
            format!("Derivation invalid at index {index}{mark}; retry with the next index")
        }
        None => "Derivation invalid at the master key; supply another seed".to_string(),
    }
}

impl KeyError {
    /// True only for per-index BIP32 failures, which the caller may retry
    /// with the next index. A failed master key is not retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(self, KeyError::DerivationInvalid { index: Some(_), .. })
    }

    pub(crate) fn invalid_key(msg: impl Into<String>) -> Self {
        KeyError::InvalidKey(msg.into())
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        KeyError::MalformedEncoding(msg.into())
    }
}
