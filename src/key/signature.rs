//! ECDSA signatures and their strict DER form.
//!
//! DER layout: `0x30 len 0x02 rlen R 0x02 slen S`. Each integer is minimal
//! length and non-negative; a 0x00 pad appears only when the first
//! magnitude byte has its high bit set. Bitcoin scripts append one
//! hash-type byte after the sequence.

use bitcoin::secp256k1::ecdsa;

use crate::curve::{self, HALF_CURVE_ORDER};
use crate::error::{KeyError, KeyResult};

pub const SIGHASH_ALL: u8 = 0x01;

const SEQUENCE_TAG: u8 = 0x30;
const INTEGER_TAG: u8 = 0x02;

/// `(r, s)` as 32-byte big-endian scalars, both in `[1, n)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    r: [u8; 32],
    s: [u8; 32],
}

impl Signature {
    pub fn from_scalars(r: [u8; 32], s: [u8; 32]) -> KeyResult<Self> {
        if !curve::is_valid_scalar(&r) || !curve::is_valid_scalar(&s) {
            return Err(KeyError::malformed("signature component out of range [1, n)"));
        }
        Ok(Self { r, s })
    }

    pub(crate) fn from_secp(sig: &ecdsa::Signature) -> Self {
        let compact = sig.serialize_compact();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&compact[..32]);
        s.copy_from_slice(&compact[32..]);
        Self { r, s }
    }

    pub(crate) fn to_secp(&self) -> Option<ecdsa::Signature> {
        ecdsa::Signature::from_compact(&self.to_compact()).ok()
    }

    pub fn r(&self) -> &[u8; 32] { &self.r }

    pub fn s(&self) -> &[u8; 32] { &self.s }

    /// `s <= n/2`
    pub fn is_low_s(&self) -> bool {
        self.s <= HALF_CURVE_ORDER
    }

    /// The low-S twin: `s` replaced by `n - s` when `s > n/2`.
    pub fn normalized(&self) -> Self {
        match self.to_secp() {
            Some(mut sig) => {
                sig.normalize_s();
                Self::from_secp(&sig)
            }
            None => *self,
        }
    }

    /// `r ‖ s`, 64 bytes.
    pub fn to_compact(&self) -> [u8; 64] {
        let mut out = [0u8; 64];
        out[..32].copy_from_slice(&self.r);
        out[32..].copy_from_slice(&self.s);
        out
    }

    pub fn to_der(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(70);
        push_der_integer(&mut body, &self.r);
        push_der_integer(&mut body, &self.s);

        let mut out = Vec::with_capacity(body.len() + 3);
        out.push(SEQUENCE_TAG);
        out.push(body.len() as u8);
        out.extend_from_slice(&body);
        out
    }

    /// DER followed by the hash-type byte, as carried in a script.
    pub fn to_der_with_sighash(&self, hash_type: u8) -> Vec<u8> {
        let mut out = self.to_der();
        out.push(hash_type);
        out
    }

    /// Parse strict DER (no trailing hash-type byte).
    pub fn from_der(der: &[u8]) -> KeyResult<Self> {
        let (r, s) = parse_der(der)?;
        Self::from_scalars(to_scalar(r)?, to_scalar(s)?)
    }
}

fn push_der_integer(out: &mut Vec<u8>, value: &[u8; 32]) {
    let start = value.iter().position(|&b| b != 0).unwrap_or(value.len() - 1);
    let magnitude = &value[start..];
    let pad = magnitude[0] & 0x80 != 0;
    out.push(INTEGER_TAG);
    out.push((magnitude.len() + usize::from(pad)) as u8);
    if pad {
        out.push(0x00);
    }
    out.extend_from_slice(magnitude);
}

/// Read one INTEGER at `offset`; returns its content and the offset after it.
fn parse_der_integer(der: &[u8], offset: usize) -> KeyResult<(&[u8], usize)> {
    if offset + 2 > der.len() || der[offset] != INTEGER_TAG {
        return Err(KeyError::malformed("expected DER integer"));
    }
    let len = der[offset + 1] as usize;
    if len & 0x80 != 0 {
        return Err(KeyError::malformed("multi-byte DER integer length"));
    }
    let start = offset + 2;
    let end = start + len;
    if len == 0 || end > der.len() {
        return Err(KeyError::malformed("DER integer length out of bounds"));
    }
    let value = &der[start..end];
    if value[0] & 0x80 != 0 {
        return Err(KeyError::malformed("negative DER integer"));
    }
    if len > 1 && value[0] == 0x00 && value[1] & 0x80 == 0 {
        return Err(KeyError::malformed("unnecessary DER integer padding"));
    }
    Ok((value, end))
}

fn parse_der(der: &[u8]) -> KeyResult<(&[u8], &[u8])> {
    if der.len() < 8 || der[0] != SEQUENCE_TAG {
        return Err(KeyError::malformed("expected DER sequence"));
    }
    if der[1] & 0x80 != 0 {
        return Err(KeyError::malformed("multi-byte DER sequence length"));
    }
    if der[1] as usize + 2 != der.len() {
        return Err(KeyError::malformed("DER sequence length does not match"));
    }
    let (r, offset) = parse_der_integer(der, 2)?;
    let (s, offset) = parse_der_integer(der, offset)?;
    if offset != der.len() {
        return Err(KeyError::malformed("trailing bytes inside DER sequence"));
    }
    Ok((r, s))
}

fn to_scalar(value: &[u8]) -> KeyResult<[u8; 32]> {
    let value = match value {
        [0x00, rest @ ..] if !rest.is_empty() => rest,
        _ => value,
    };
    if value.len() > 32 {
        return Err(KeyError::malformed("DER integer wider than 32 bytes"));
    }
    let mut out = [0u8; 32];
    out[32 - value.len()..].copy_from_slice(value);
    Ok(out)
}

/// Pure DER canonicality: one sequence of exactly two minimal, non-negative
/// INTEGERs with single-byte lengths and nothing after it.
pub fn is_der_canonical(der: &[u8]) -> bool {
    parse_der(der).is_ok()
}

/// Script framing: exactly one byte follows the DER sequence.
pub fn has_sighash_byte(encoded: &[u8]) -> bool {
    encoded.len() >= 2 && encoded[1] & 0x80 == 0 && encoded.len() == encoded[1] as usize + 3
}

/// Canonical script signature: strict DER plus one trailing hash-type byte.
/// Classifies, never fails.
pub fn is_signature_canonical(encoded: &[u8]) -> bool {
    has_sighash_byte(encoded) && is_der_canonical(&encoded[..encoded.len() - 1])
}
