//! Legacy Base58Check addresses: `version ‖ hash160`.

use std::fmt;

use crate::base58;
use crate::error::{KeyError, KeyResult};
use crate::params::NetParams;

const PAYLOAD_LEN: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressKind {
    /// P2PKH, hash of a public key.
    PubKeyHash,
    /// P2SH, hash of a redeem script.
    ScriptHash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Address {
    version: u8,
    hash: [u8; 20],
    kind: AddressKind,
}

impl Address {
    pub fn p2pkh(hash: [u8; 20], params: &NetParams) -> Self {
        Self { version: params.address_version, hash, kind: AddressKind::PubKeyHash }
    }

    pub fn p2sh(hash: [u8; 20], params: &NetParams) -> Self {
        Self { version: params.script_address_version, hash, kind: AddressKind::ScriptHash }
    }

    pub fn kind(&self) -> AddressKind { self.kind }

    pub fn version(&self) -> u8 { self.version }

    pub fn hash(&self) -> &[u8; 20] { &self.hash }

    pub fn is_script_hash(&self) -> bool {
        self.kind == AddressKind::ScriptHash
    }

    /// Parse an address and check its version byte against `params`.
    pub fn from_base58(s: &str, params: &NetParams) -> KeyResult<Self> {
        let payload = base58::decode_checked(s)?;
        if payload.len() != PAYLOAD_LEN {
            return Err(KeyError::malformed(format!(
                "address payload is {} bytes, expected {PAYLOAD_LEN}",
                payload.len()
            )));
        }
        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[1..]);
        match payload[0] {
            v if v == params.address_version => Ok(Self::p2pkh(hash, params)),
            v if v == params.script_address_version => Ok(Self::p2sh(hash, params)),
            v => Err(KeyError::malformed(format!(
                "address version 0x{v:02x} does not belong to {}",
                params.network.as_str()
            ))),
        }
    }

    pub fn to_base58(&self) -> String {
        let mut payload = [0u8; PAYLOAD_LEN];
        payload[0] = self.version;
        payload[1..].copy_from_slice(&self.hash);
        base58::encode_checked(&payload)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_base58())
    }
}

/// `OP_0 PUSH20 <pubkey hash>`, the witness v0 program nested in P2SH.
pub fn p2sh_p2wpkh_redeem_script(pubkey_hash: &[u8; 20]) -> [u8; 22] {
    let mut script = [0u8; 22];
    script[0] = 0x00;
    script[1] = 0x14;
    script[2..].copy_from_slice(pubkey_hash);
    script
}
