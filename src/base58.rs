//! Base58 and Base58Check.
//!
//! Bitcoin alphabet, which leaves out `0`, `O`, `I` and `l`. Every leading
//! zero byte maps to one leading `'1'`. Base58Check appends the first four
//! bytes of double-SHA256(payload).

use crate::digest::double_sha256;
use crate::error::{KeyError, KeyResult};

pub const CHECKSUM_LEN: usize = 4;

pub fn encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

pub fn decode(s: &str) -> KeyResult<Vec<u8>> {
    bs58::decode(s).into_vec().map_err(|e| match e {
        bs58::decode::Error::InvalidCharacter { character, index } => {
            KeyError::malformed(format!("invalid base58 character {character:?} at position {index}"))
        }
        other => KeyError::malformed(other.to_string()),
    })
}

pub fn checksum(payload: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = double_sha256(payload);
    [hash[0], hash[1], hash[2], hash[3]]
}

pub fn encode_checked(payload: &[u8]) -> String {
    let mut data = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    data.extend_from_slice(payload);
    data.extend_from_slice(&checksum(payload));
    encode(&data)
}

pub fn decode_checked(s: &str) -> KeyResult<Vec<u8>> {
    let data = decode(s)?;
    verify_checksum(data)
}

/// Split off and verify the trailing checksum of already decoded bytes.
pub(crate) fn verify_checksum(mut data: Vec<u8>) -> KeyResult<Vec<u8>> {
    if data.len() < CHECKSUM_LEN {
        return Err(KeyError::malformed(format!(
            "decoded length {} is shorter than the checksum",
            data.len()
        )));
    }
    let split = data.len() - CHECKSUM_LEN;
    if checksum(&data[..split]) != data[split..] {
        return Err(KeyError::ChecksumMismatch);
    }
    data.truncate(split);
    Ok(data)
}
