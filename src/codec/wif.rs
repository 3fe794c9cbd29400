//! Wallet Import Format.
//!
//! `version(1) ‖ scalar(32) [‖ 0x01 when compressed] ‖ checksum(4)`, Base58.

use zeroize::Zeroizing;

use crate::base58::{self, CHECKSUM_LEN};
use crate::error::{KeyError, KeyResult};
use crate::key::KeyPair;
use crate::params::NetParams;

/// Bytes after the version byte, checksum included.
const UNCOMPRESSED_BODY_LEN: usize = 32 + CHECKSUM_LEN;
const COMPRESSED_BODY_LEN: usize = UNCOMPRESSED_BODY_LEN + 1;
const COMPRESSED_FLAG: u8 = 0x01;

/// Export the private scalar. Fails with `NoPrivateKey` for public-only pairs.
pub fn encode(key: &KeyPair, params: &NetParams) -> KeyResult<String> {
    let secret = key.private_key_bytes()?;
    let mut payload = Zeroizing::new(Vec::with_capacity(34));
    payload.push(params.private_key_version);
    payload.extend_from_slice(&secret[..]);
    if key.is_compressed() {
        payload.push(COMPRESSED_FLAG);
    }
    Ok(base58::encode_checked(&payload))
}

pub fn decode(s: &str, params: &NetParams) -> KeyResult<KeyPair> {
    let raw = Zeroizing::new(base58::decode(s)?);
    let compressed = match raw.len().checked_sub(1) {
        Some(COMPRESSED_BODY_LEN) => true,
        Some(UNCOMPRESSED_BODY_LEN) => false,
        _ => {
            return Err(KeyError::malformed(format!(
                "WIF body is {} bytes, expected {UNCOMPRESSED_BODY_LEN} or {COMPRESSED_BODY_LEN}",
                raw.len().saturating_sub(1)
            )))
        }
    };
    let payload = Zeroizing::new(base58::verify_checksum(raw.to_vec())?);

    if payload[0] != params.private_key_version {
        return Err(KeyError::malformed(format!(
            "WIF version 0x{:02x} does not match {} (0x{:02x})",
            payload[0],
            params.network.as_str(),
            params.private_key_version
        )));
    }
    if compressed && payload[33] != COMPRESSED_FLAG {
        return Err(KeyError::malformed("WIF compression flag must be 0x01"));
    }

    let mut scalar = Zeroizing::new([0u8; 32]);
    scalar.copy_from_slice(&payload[1..33]);
    KeyPair::from_private_scalar(&scalar, compressed)
}

impl KeyPair {
    pub fn to_wif(&self, params: &NetParams) -> KeyResult<String> {
        encode(self, params)
    }

    pub fn from_wif(s: &str, params: &NetParams) -> KeyResult<KeyPair> {
        decode(s, params)
    }
}
