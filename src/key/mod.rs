//! Key pairs - an optional private scalar plus a public point.
//!
//! A pair built from a private scalar can sign. A pair built from public key
//! bytes can only hash, address, and verify. The public point and its
//! canonical encoding (compressed or not) are fixed at construction; the
//! key hashes are computed on first use and cached.
//!
//! ```text
//! PrivateScalar ──k·G──→ PublicPoint ──HASH160──→ pubkey hash ──Base58Check──→ address
//!       │                                              │
//!       └── sign(double-SHA256(msg)) → low-S (r, s)    └── OP_0 <hash> ──HASH160──→ script hash
//! ```

mod address;
mod signature;

pub use address::{p2sh_p2wpkh_redeem_script, Address, AddressKind};
pub use signature::{has_sighash_byte, is_der_canonical, is_signature_canonical, Signature, SIGHASH_ALL};

use bitcoin::secp256k1::{Message, PublicKey, SecretKey};
use once_cell::sync::OnceCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use zeroize::Zeroizing;

use crate::curve::{self, COMPRESSED_LEN, SECP, UNCOMPRESSED_LEN};
use crate::digest::{double_sha256, hash160};
use crate::error::{KeyError, KeyResult};
use crate::params::NetParams;

#[derive(Clone)]
pub struct KeyPair {
    secret: Option<SecretKey>,
    public: PublicKey,
    compressed: bool,
    pubkey_hash: OnceCell<[u8; 20]>,
    script_hash: OnceCell<[u8; 20]>,
}

impl KeyPair {
    /// Build from a 32-byte big-endian private scalar. Fails unless `1 <= k < n`.
    pub fn from_private_scalar(k: &[u8; 32], compressed: bool) -> KeyResult<Self> {
        Ok(Self::from_secret_key(curve::secret_key(k)?, compressed))
    }

    pub(crate) fn from_secret_key(secret: SecretKey, compressed: bool) -> Self {
        let public = curve::generator_mul(&secret);
        Self { secret: Some(secret), ..Self::from_public_key(public, compressed) }
    }

    /// Build a public-only pair from a 33-byte compressed or 65-byte
    /// uncompressed encoding. The encoding length fixes the canonical form.
    pub fn from_public_bytes(bytes: &[u8]) -> KeyResult<Self> {
        let public = curve::decode_point(bytes)?;
        Ok(Self::from_public_key(public, bytes.len() == COMPRESSED_LEN))
    }

    pub(crate) fn from_public_key(public: PublicKey, compressed: bool) -> Self {
        Self {
            secret: None,
            public,
            compressed,
            pubkey_hash: OnceCell::new(),
            script_hash: OnceCell::new(),
        }
    }

    /// Fresh compressed key from OS randomness.
    #[cfg(feature = "rand")]
    pub fn generate() -> Self {
        use rand::RngCore;

        let mut rng = rand::thread_rng();
        let mut k = Zeroizing::new([0u8; 32]);
        loop {
            rng.fill_bytes(&mut *k);
            if let Ok(secret) = curve::secret_key(&k) {
                return Self::from_secret_key(secret, true);
            }
        }
    }

    pub fn has_private_key(&self) -> bool { self.secret.is_some() }

    pub fn is_compressed(&self) -> bool { self.compressed }

    /// Public key in its canonical encoding (33 or 65 bytes).
    pub fn public_key_bytes(&self) -> Vec<u8> {
        curve::encode_point(&self.public, self.compressed)
    }

    /// Public key in compressed form regardless of the canonical encoding.
    pub fn compressed_public_key(&self) -> [u8; COMPRESSED_LEN] {
        self.public.serialize()
    }

    pub fn uncompressed_public_key(&self) -> [u8; UNCOMPRESSED_LEN] {
        self.public.serialize_uncompressed()
    }

    /// Private scalar, big-endian, zero-padded to 32 bytes.
    pub fn private_key_bytes(&self) -> KeyResult<Zeroizing<[u8; 32]>> {
        Ok(Zeroizing::new(self.secret_key()?.secret_bytes()))
    }

    pub(crate) fn secret_key(&self) -> KeyResult<&SecretKey> {
        self.secret.as_ref().ok_or(KeyError::NoPrivateKey)
    }

    pub(crate) fn public_key(&self) -> &PublicKey { &self.public }

    /// Same point, no private scalar.
    pub fn to_public(&self) -> Self {
        Self {
            secret: None,
            public: self.public,
            compressed: self.compressed,
            pubkey_hash: self.pubkey_hash.clone(),
            script_hash: self.script_hash.clone(),
        }
    }

    /// Sign `message`: double-SHA256, deterministic ECDSA (RFC 6979), low-S.
    pub fn sign(&self, message: &[u8]) -> KeyResult<Signature> {
        self.sign_digest(&double_sha256(message))
    }

    /// Sign a precomputed 32-byte digest.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> KeyResult<Signature> {
        let secret = self.secret_key()?;
        let mut sig = SECP.sign_ecdsa(&Message::from_digest(*digest), secret);
        sig.normalize_s();
        Ok(Signature::from_secp(&sig))
    }

    /// Check a signature over `message` (double-SHA256). High-S signatures
    /// do not verify.
    pub fn verify(&self, message: &[u8], signature: &Signature) -> bool {
        self.verify_digest(&double_sha256(message), signature)
    }

    pub fn verify_digest(&self, digest: &[u8; 32], signature: &Signature) -> bool {
        match signature.to_secp() {
            Some(sig) => SECP
                .verify_ecdsa(&Message::from_digest(*digest), &sig, &self.public)
                .is_ok(),
            None => false,
        }
    }

    /// HASH160 of the canonical public key encoding.
    pub fn public_key_hash(&self) -> [u8; 20] {
        *self.pubkey_hash.get_or_init(|| hash160(&self.public_key_bytes()))
    }

    /// HASH160 of the P2SH-P2WPKH redeem script for this key.
    pub fn script_hash(&self) -> [u8; 20] {
        *self
            .script_hash
            .get_or_init(|| hash160(&p2sh_p2wpkh_redeem_script(&self.public_key_hash())))
    }

    /// First four bytes of the public key hash.
    pub fn fingerprint(&self) -> [u8; 4] {
        let hash = self.public_key_hash();
        [hash[0], hash[1], hash[2], hash[3]]
    }

    /// Pay-to-pubkey-hash address.
    pub fn to_address(&self, params: &NetParams) -> Address {
        Address::p2pkh(self.public_key_hash(), params)
    }

    /// Pay-to-script-hash address wrapping a P2WPKH program.
    pub fn to_script_address(&self, params: &NetParams) -> Address {
        Address::p2sh(self.script_hash(), params)
    }
}

/// True only for 33-byte keys prefixed 0x02/0x03 or 65-byte keys prefixed 0x04.
/// Framing only; the point is not checked against the curve.
pub fn is_public_key_canonical(bytes: &[u8]) -> bool {
    matches!(
        (bytes.len(), bytes.first()),
        (COMPRESSED_LEN, Some(0x02 | 0x03)) | (UNCOMPRESSED_LEN, Some(0x04))
    )
}

impl PartialEq for KeyPair {
    fn eq(&self, other: &Self) -> bool {
        self.public_key_bytes() == other.public_key_bytes()
    }
}

impl Eq for KeyPair {}

impl Hash for KeyPair {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.public_key_bytes().hash(state);
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public", &hex::encode(self.public_key_bytes()))
            .field("compressed", &self.compressed)
            .field("private", &if self.secret.is_some() { "<redacted>" } else { "none" })
            .finish()
    }
}
