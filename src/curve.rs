//! secp256k1 point and scalar operations.
//!
//! Field and group arithmetic is delegated to libsecp256k1 (through the
//! `bitcoin` crate). This module owns the range checks and the mapping of
//! library failures onto [`KeyError`].

use bitcoin::secp256k1::{self, constants, All, PublicKey, Scalar, Secp256k1, SecretKey};
use once_cell::sync::Lazy;

use crate::error::{KeyError, KeyResult};

/// Shared read-only context; signing and verification both need `All`.
pub(crate) static SECP: Lazy<Secp256k1<All>> = Lazy::new(Secp256k1::new);

/// Group order n, big-endian.
pub const CURVE_ORDER: [u8; 32] = constants::CURVE_ORDER;

/// floor(n / 2). Canonical signatures have `s <= HALF_CURVE_ORDER`.
pub const HALF_CURVE_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

pub const COMPRESSED_LEN: usize = 33;
pub const UNCOMPRESSED_LEN: usize = 65;

/// True when `1 <= k < n`. Big-endian fixed width, so byte order compares numerically.
pub fn is_valid_scalar(k: &[u8; 32]) -> bool {
    k.iter().any(|&b| b != 0) && k < &CURVE_ORDER
}

/// Parse a private scalar, rejecting zero and anything `>= n`.
pub fn secret_key(k: &[u8; 32]) -> KeyResult<SecretKey> {
    if !is_valid_scalar(k) {
        return Err(KeyError::invalid_key("private scalar out of range [1, n)"));
    }
    SecretKey::from_slice(k).map_err(|e| KeyError::invalid_key(e.to_string()))
}

/// Interpret 32 bytes as a scalar tweak; `None` when `>= n`.
pub(crate) fn tweak(k: &[u8; 32]) -> Option<Scalar> {
    Scalar::from_be_bytes(*k).ok()
}

/// k·G
pub fn generator_mul(k: &SecretKey) -> PublicKey {
    PublicKey::from_secret_key(&*SECP, k)
}

/// k·G + P. `None` when the sum is the point at infinity.
pub(crate) fn add_generator_mul(point: &PublicKey, k: &Scalar) -> Option<PublicKey> {
    point.add_exp_tweak(&*SECP, k).ok()
}

/// (a + b) mod n. `None` when the sum is zero.
pub(crate) fn add_scalars(a: &SecretKey, b: &Scalar) -> Option<SecretKey> {
    a.add_tweak(b).ok()
}

/// Parse a 33- or 65-byte SEC1 encoding, checking that the point is on the curve.
pub fn decode_point(bytes: &[u8]) -> KeyResult<PublicKey> {
    match (bytes.len(), bytes.first()) {
        (COMPRESSED_LEN, Some(0x02 | 0x03)) | (UNCOMPRESSED_LEN, Some(0x04)) => {}
        (COMPRESSED_LEN | UNCOMPRESSED_LEN, _) => {
            return Err(KeyError::invalid_key("invalid public key prefix"))
        }
        (len, _) => return Err(KeyError::invalid_key(format!("invalid public key length {len}"))),
    }
    PublicKey::from_slice(bytes).map_err(|e| match e {
        secp256k1::Error::InvalidPublicKey => KeyError::invalid_key("point is not on the curve"),
        other => KeyError::invalid_key(other.to_string()),
    })
}

/// Recover the full point from x and the parity of y.
///
/// Solves y² = x³ + 7 over the field; p ≡ 3 (mod 4) so the square root is
/// a single exponentiation by (p+1)/4 inside libsecp256k1.
pub fn decompress(x: &[u8; 32], y_is_odd: bool) -> KeyResult<PublicKey> {
    let mut encoded = [0u8; COMPRESSED_LEN];
    encoded[0] = if y_is_odd { 0x03 } else { 0x02 };
    encoded[1..].copy_from_slice(x);
    decode_point(&encoded)
}

pub fn encode_point(point: &PublicKey, compressed: bool) -> Vec<u8> {
    if compressed {
        point.serialize().to_vec()
    } else {
        point.serialize_uncompressed().to_vec()
    }
}
