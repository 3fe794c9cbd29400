//! Hierarchical deterministic keys (BIP32).
//!
//! An [`ExtendedKey`] is a [`KeyPair`] plus the metadata that places it in
//! the tree. Both derivation functions are pure: same inputs, same key.
//!
//! ```text
//! seed ──HMAC-SHA512("Bitcoin seed")──→ IL ‖ IR
//!                                        │    └── chain code
//!                                        └────── private scalar (root, depth 0)
//!
//! parent ──HMAC-SHA512(chain code, data ‖ index)──→ IL ‖ IR
//!   hardened: data = 0x00 ‖ k_par          child k = IL + k_par  (mod n)
//!   normal:   data = compressed K_par      child K = IL·G + K_par
//! ```
//!
//! `IL >= n` or a degenerate child yields [`KeyError::DerivationInvalid`];
//! the caller moves on to the next index.

pub mod hierarchy;
pub mod path;

pub use hierarchy::{KeyHierarchy, KeyNode};
pub use path::{ChildNumber, DerivationPath, HARDENED_BIT};

use tracing::{debug, trace};
use zeroize::Zeroizing;

use crate::curve;
use crate::digest::{hmac_sha512, hmac_sha512_parts};
use crate::error::{KeyError, KeyResult};
use crate::key::{Address, KeyPair, Signature};
use crate::params::NetParams;

pub const MIN_SEED_LEN: usize = 16;

const ROOT_HMAC_KEY: &[u8] = b"Bitcoin seed";

/// Immutable node of the key tree.
#[derive(Debug, Clone)]
pub struct ExtendedKey {
    params: NetParams,
    depth: u8,
    parent_fingerprint: [u8; 4],
    child_number: ChildNumber,
    chain_code: [u8; 32],
    key: KeyPair,
}

impl ExtendedKey {
    /// Assemble a key from decoded fields. Extended keys are always compressed.
    pub(crate) fn from_parts(
        params: NetParams,
        depth: u8,
        parent_fingerprint: [u8; 4],
        child_number: ChildNumber,
        chain_code: [u8; 32],
        key: KeyPair,
    ) -> Self {
        Self { params, depth, parent_fingerprint, child_number, chain_code, key }
    }

    pub fn params(&self) -> &NetParams { &self.params }

    pub fn depth(&self) -> u8 { self.depth }

    pub fn parent_fingerprint(&self) -> [u8; 4] { self.parent_fingerprint }

    pub fn child_number(&self) -> ChildNumber { self.child_number }

    /// Index without the hardened bit.
    pub fn child_index(&self) -> u32 { self.child_number.index() }

    pub fn is_hardened(&self) -> bool { self.child_number.is_hardened() }

    pub fn chain_code(&self) -> &[u8; 32] { &self.chain_code }

    pub fn key(&self) -> &KeyPair { &self.key }

    pub fn has_private_key(&self) -> bool { self.key.has_private_key() }

    /// The 4-byte serialization prefix: xprv for private nodes, xpub otherwise.
    pub fn version(&self) -> [u8; 4] {
        self.params.extended_version(self.has_private_key())
    }

    /// First four bytes of HASH160(compressed public key).
    pub fn fingerprint(&self) -> [u8; 4] { self.key.fingerprint() }

    pub fn public_key_hash(&self) -> [u8; 20] { self.key.public_key_hash() }

    pub fn to_address(&self) -> Address { self.key.to_address(&self.params) }

    pub fn sign(&self, message: &[u8]) -> KeyResult<Signature> { self.key.sign(message) }

    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.key.verify(message, signature)
    }

    /// Same node with the private scalar dropped (xprv → xpub).
    pub fn to_public(&self) -> Self {
        Self { key: self.key.to_public(), ..self.clone() }
    }

    pub fn derive_child(&self, index: u32, hardened: bool) -> KeyResult<Self> {
        derive_child(self, index, hardened)
    }
}

impl PartialEq for ExtendedKey {
    fn eq(&self, other: &Self) -> bool {
        self.params == other.params
            && self.depth == other.depth
            && self.parent_fingerprint == other.parent_fingerprint
            && self.child_number == other.child_number
            && self.chain_code == other.chain_code
            && self.key == other.key
            && self.key.secret_key().ok() == other.key.secret_key().ok()
    }
}

impl Eq for ExtendedKey {}

/// Master key from a seed of at least 16 bytes.
///
/// A seed whose IL is not a valid scalar fails with `DerivationInvalid`
/// carrying no index. There is no next index at the root, so the caller
/// needs another seed; the error reports `is_retryable() == false`.
pub fn derive_root(seed: &[u8], params: &NetParams) -> KeyResult<ExtendedKey> {
    if seed.len() < MIN_SEED_LEN {
        return Err(KeyError::invalid_key(format!(
            "seed is {} bytes, need at least {MIN_SEED_LEN}",
            seed.len()
        )));
    }

    let i = Zeroizing::new(hmac_sha512(ROOT_HMAC_KEY, seed));
    let (il, ir) = split(&i);
    let root = master_key(&il, ir, params)?;
    debug!(fingerprint = %hex::encode(root.fingerprint()), "derived root key");
    Ok(root)
}

fn master_key(il: &[u8; 32], chain_code: [u8; 32], params: &NetParams) -> KeyResult<ExtendedKey> {
    let secret = curve::secret_key(il)
        .map_err(|_| KeyError::DerivationInvalid { index: None, hardened: false })?;
    Ok(ExtendedKey {
        params: *params,
        depth: 0,
        parent_fingerprint: [0u8; 4],
        child_number: ChildNumber::Normal(0),
        chain_code,
        key: KeyPair::from_secret_key(secret, true),
    })
}

/// Child `index` of `parent`. `index` must be below 2^31; the hardened
/// flag is passed separately.
///
/// A public-only parent can derive normal children only; hardened
/// derivation needs the parent scalar and fails with `NoPrivateKey`.
pub fn derive_child(parent: &ExtendedKey, index: u32, hardened: bool) -> KeyResult<ExtendedKey> {
    let number = ChildNumber::new(index, hardened)?;
    if parent.depth == u8::MAX {
        return Err(KeyError::invalid_key("maximum derivation depth reached"));
    }

    let index_bytes = number.to_u32().to_be_bytes();
    let i = Zeroizing::new(if hardened {
        let secret = parent.key.private_key_bytes()?;
        let data: [&[u8]; 3] = [&[0x00], &secret[..], &index_bytes];
        hmac_sha512_parts(&parent.chain_code, &data)
    } else {
        let public = parent.key.compressed_public_key();
        let data: [&[u8]; 2] = [&public, &index_bytes];
        hmac_sha512_parts(&parent.chain_code, &data)
    });
    let (il, ir) = split(&i);
    let key = tweak_key(&parent.key, &il, index, hardened)?;

    let child = ExtendedKey {
        params: parent.params,
        depth: parent.depth + 1,
        parent_fingerprint: parent.fingerprint(),
        child_number: number,
        chain_code: ir,
        key,
    };
    trace!(depth = child.depth, child = %number, private = child.has_private_key(), "derived child key");
    Ok(child)
}

/// Child key from the parent key and IL: `IL + k_par` for a private parent,
/// `IL·G + K_par` for a public one. `IL >= n`, a zero scalar and the point at
/// infinity all become `DerivationInvalid` for this index.
fn tweak_key(parent: &KeyPair, il: &[u8; 32], index: u32, hardened: bool) -> KeyResult<KeyPair> {
    let invalid = || {
        debug!(index, hardened, "child derivation invalid, caller should retry with the next index");
        KeyError::DerivationInvalid { index: Some(index), hardened }
    };
    let tweak = curve::tweak(il).ok_or_else(invalid)?;

    match parent.secret_key() {
        Ok(secret) => {
            let child = curve::add_scalars(secret, &tweak).ok_or_else(invalid)?;
            Ok(KeyPair::from_secret_key(child, true))
        }
        Err(_) => {
            let child = curve::add_generator_mul(parent.public_key(), &tweak).ok_or_else(invalid)?;
            Ok(KeyPair::from_public_key(child, true))
        }
    }
}

fn split(i: &[u8; 64]) -> (Zeroizing<[u8; 32]>, [u8; 32]) {
    let mut il = Zeroizing::new([0u8; 32]);
    let mut ir = [0u8; 32];
    il.copy_from_slice(&i[..32]);
    ir.copy_from_slice(&i[32..]);
    (il, ir)
}
