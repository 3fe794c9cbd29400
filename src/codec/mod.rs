//! Textual import/export formats.
//!
//! - [`wif`]: Wallet Import Format private keys
//! - [`xkey`]: serialized extended keys (xprv / xpub)

pub mod wif;
pub mod xkey;

pub use xkey::{EXTENDED_KEY_LEN, EXTENDED_KEY_STRING_LEN};
