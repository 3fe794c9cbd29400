//! Network parameters - passed explicitly by the caller, never global.
//!
//! Version bytes decide what a Base58Check string means: a WIF private key,
//! a P2PKH/P2SH address, or an xprv/xpub. Main and test parameters can live
//! side by side in one process.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Bitcoin,
    Testnet,
    Regtest,
}

impl Network {
    pub fn as_str(&self) -> &'static str {
        match self {
            Network::Bitcoin => "bitcoin",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "bitcoin" | "mainnet" | "main" => Some(Network::Bitcoin),
            "testnet" | "test" => Some(Network::Testnet),
            "regtest" => Some(Network::Regtest),
            _ => None,
        }
    }
}

/// Version bytes for one network. Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetParams {
    pub network: Network,
    /// P2PKH address version
    pub address_version: u8,
    /// P2SH address version
    pub script_address_version: u8,
    /// WIF private key version
    pub private_key_version: u8,
    /// Serialized extended private key prefix (xprv / tprv)
    pub xprv_version: [u8; 4],
    /// Serialized extended public key prefix (xpub / tpub)
    pub xpub_version: [u8; 4],
}

impl NetParams {
    pub const fn mainnet() -> Self {
        Self {
            network: Network::Bitcoin,
            address_version: 0x00,
            script_address_version: 0x05,
            private_key_version: 0x80,
            xprv_version: [0x04, 0x88, 0xAD, 0xE4],
            xpub_version: [0x04, 0x88, 0xB2, 0x1E],
        }
    }

    pub const fn testnet() -> Self {
        Self {
            network: Network::Testnet,
            address_version: 0x6F,
            script_address_version: 0xC4,
            private_key_version: 0xEF,
            xprv_version: [0x04, 0x35, 0x83, 0x94],
            xpub_version: [0x04, 0x35, 0x87, 0xCF],
        }
    }

    /// Regtest shares testnet's version bytes.
    pub const fn regtest() -> Self {
        let mut params = Self::testnet();
        params.network = Network::Regtest;
        params
    }

    pub fn for_network(network: Network) -> Self {
        match network {
            Network::Bitcoin => Self::mainnet(),
            Network::Testnet => Self::testnet(),
            Network::Regtest => Self::regtest(),
        }
    }

    pub fn with_address_version(mut self, version: u8) -> Self { self.address_version = version; self }
    pub fn with_script_address_version(mut self, version: u8) -> Self { self.script_address_version = version; self }
    pub fn with_private_key_version(mut self, version: u8) -> Self { self.private_key_version = version; self }
    pub fn with_xprv_version(mut self, version: [u8; 4]) -> Self { self.xprv_version = version; self }
    pub fn with_xpub_version(mut self, version: [u8; 4]) -> Self { self.xpub_version = version; self }

    /// Extended key prefix for a private or public node.
    pub fn extended_version(&self, private: bool) -> [u8; 4] {
        if private {
            self.xprv_version
        } else {
            self.xpub_version
        }
    }
}

impl Default for NetParams {
    fn default() -> Self { Self::mainnet() }
}
