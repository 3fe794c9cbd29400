//! Serialized extended keys.
//!
//! ```text
//! version(4) ‖ depth(1) ‖ parent fingerprint(4) ‖ child number(4)
//!            ‖ chain code(32) ‖ key(33)                          = 78 bytes
//! key: 0x00 ‖ private scalar, or the compressed public key
//! ```
//!
//! The string form is Base58 of the 78 bytes plus a 4-byte checksum.

use std::fmt;

use zeroize::Zeroizing;

use crate::base58::{self, CHECKSUM_LEN};
use crate::error::{KeyError, KeyResult};
use crate::hd::{ChildNumber, ExtendedKey};
use crate::key::KeyPair;
use crate::params::NetParams;

pub const EXTENDED_KEY_LEN: usize = 78;
pub const EXTENDED_KEY_STRING_LEN: usize = EXTENDED_KEY_LEN + CHECKSUM_LEN;

impl ExtendedKey {
    pub fn serialize(&self) -> Zeroizing<[u8; EXTENDED_KEY_LEN]> {
        let mut out = Zeroizing::new([0u8; EXTENDED_KEY_LEN]);
        out[0..4].copy_from_slice(&self.version());
        out[4] = self.depth();
        out[5..9].copy_from_slice(&self.parent_fingerprint());
        out[9..13].copy_from_slice(&self.child_number().to_u32().to_be_bytes());
        out[13..45].copy_from_slice(self.chain_code());
        match self.key().private_key_bytes() {
            Ok(secret) => {
                out[45] = 0x00;
                out[46..78].copy_from_slice(&secret[..]);
            }
            Err(_) => out[45..78].copy_from_slice(&self.key().compressed_public_key()),
        }
        out
    }

    pub fn to_base58(&self) -> String {
        base58::encode_checked(&self.serialize()[..])
    }

    /// Parse an xprv/xpub string for `params`. The version word decides
    /// whether the key slot holds a private scalar or a public point.
    pub fn from_base58(s: &str, params: &NetParams) -> KeyResult<Self> {
        let raw = Zeroizing::new(base58::decode(s)?);
        if raw.len() != EXTENDED_KEY_STRING_LEN {
            return Err(KeyError::malformed(format!(
                "extended key decodes to {} bytes, expected {EXTENDED_KEY_STRING_LEN}",
                raw.len()
            )));
        }
        let data = Zeroizing::new(base58::verify_checksum(raw.to_vec())?);
        Self::deserialize(&data, params)
    }

    /// Parse the raw 78-byte layout.
    pub fn deserialize(data: &[u8], params: &NetParams) -> KeyResult<Self> {
        if data.len() != EXTENDED_KEY_LEN {
            return Err(KeyError::malformed(format!(
                "extended key is {} bytes, expected {EXTENDED_KEY_LEN}",
                data.len()
            )));
        }

        let version = [data[0], data[1], data[2], data[3]];
        let private = if version == params.xprv_version {
            true
        } else if version == params.xpub_version {
            false
        } else {
            return Err(KeyError::malformed(format!(
                "extended key version {} is not used by {}",
                hex::encode(version),
                params.network.as_str()
            )));
        };

        let depth = data[4];
        let parent_fingerprint = [data[5], data[6], data[7], data[8]];
        let child_number = ChildNumber::from_u32(u32::from_be_bytes([data[9], data[10], data[11], data[12]]));
        if depth == 0 && (parent_fingerprint != [0u8; 4] || child_number.to_u32() != 0) {
            return Err(KeyError::malformed("root key with parent fingerprint or child number"));
        }

        let mut chain_code = [0u8; 32];
        chain_code.copy_from_slice(&data[13..45]);

        let slot = &data[45..78];
        let key = if private {
            if slot[0] != 0x00 {
                return Err(KeyError::malformed("private key slot must start with 0x00"));
            }
            let mut scalar = Zeroizing::new([0u8; 32]);
            scalar.copy_from_slice(&slot[1..]);
            KeyPair::from_private_scalar(&scalar, true)?
        } else {
            KeyPair::from_public_bytes(slot)?
        };

        Ok(ExtendedKey::from_parts(*params, depth, parent_fingerprint, child_number, chain_code, key))
    }
}

impl fmt::Display for ExtendedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}
