//! btc-hdkeys: the key engine of a Bitcoin wallet.
//!
//! Seed in, tree of secp256k1 key pairs out, with the encodings wallets and
//! the network expect.
//!
//! # Architecture
//!
//! ```text
//! seed / mnemonic
//!   │
//!   └── hd::derive_root ──→ ExtendedKey (m)
//!         │
//!         └── hd::KeyHierarchy (memoizing, thread-safe)
//!               └── KeyNode ── derive_child_key(i, hardened) ──→ KeyNode ...
//!                     │
//!                     └── key::KeyPair ── sign / verify / hash160 / address
//!                           │
//!                           └── codec::{wif, xkey}, base58 ──→ strings
//!
//! curve (libsecp256k1)      digest (SHA-256, RIPEMD-160, HMAC)
//! ```
//!
//! Network version bytes travel as an explicit [`NetParams`] value; mainnet
//! and testnet keys can coexist in one process.
//!
//! # Errors
//!
//! Every fallible call returns [`KeyResult`]. Only
//! [`KeyError::DerivationInvalid`] for a child index is retryable (with the
//! next index).
//!
//! # Features
//!
//! - `logging` - `logging::init_logging()` (tracing-subscriber)
//! - `mnemonic` - `KeyHierarchy::from_mnemonic` (BIP39)
//! - `rand` - `KeyPair::generate`
//!
//! # Usage
//!
//! ```ignore
//! use btc_hdkeys::{KeyHierarchy, NetParams};
//!
//! let params = NetParams::mainnet();
//! let tree = KeyHierarchy::from_seed(&seed, &params)?;
//! let node = tree.derive_path(&"m/44'/0'/0'/0/0".parse()?)?;
//!
//! println!("{} {}", node.path(), node.key().to_address());
//! let sig = node.key().sign(b"hello")?;
//! ```

pub mod base58;
pub mod codec;
pub mod curve;
pub mod digest;
pub mod error;
pub mod hd;
pub mod key;
pub mod params;

#[cfg(feature = "logging")]
pub mod logging;

pub use error::{KeyError, KeyResult};
pub use hd::{derive_child, derive_root, ChildNumber, DerivationPath, ExtendedKey, KeyHierarchy, KeyNode};
pub use key::{is_public_key_canonical, is_signature_canonical, Address, AddressKind, KeyPair, Signature};
pub use params::{NetParams, Network};
