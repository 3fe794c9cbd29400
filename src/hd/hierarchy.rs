//! Memoizing key tree.
//!
//! Every [`KeyNode`] owns the children derived from it. Asking for the same
//! `(index, hardened)` twice returns the same `Arc`; the per-node lock is
//! held across lookup, derivation and insert, so concurrent callers never
//! derive a child twice. Nodes hold no parent pointer, only their path.
//!
//! ```text
//! KeyHierarchy
//!   └── root: Arc<KeyNode>  (m)
//!         ├── 0'  → Arc<KeyNode>  (m/0')
//!         │     └── 1 → Arc<KeyNode>  (m/0'/1)
//!         └── 0   → Arc<KeyNode>  (m/0)
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, trace};

use super::path::{ChildNumber, DerivationPath};
use super::{derive_child, derive_root, ExtendedKey};
use crate::error::KeyResult;
use crate::params::NetParams;

pub struct KeyNode {
    key: ExtendedKey,
    path: DerivationPath,
    children: Mutex<HashMap<ChildNumber, Arc<KeyNode>>>,
}

impl KeyNode {
    fn new(key: ExtendedKey, path: DerivationPath) -> Self {
        Self { key, path, children: Mutex::new(HashMap::new()) }
    }

    pub fn key(&self) -> &ExtendedKey { &self.key }

    /// Path from the hierarchy root; empty for the root.
    ///
    /// Relative to the key the hierarchy was built on, which need not be a
    /// master key: a tree over an account key at depth 3 reports that key as
    /// `m` and its first child as `m/0`. Use `key().depth()` for the
    /// absolute depth.
    pub fn path(&self) -> &DerivationPath { &self.path }

    /// Child `(index, hardened)`, derived on first request and cached for
    /// the life of the hierarchy.
    pub fn derive_child_key(&self, index: u32, hardened: bool) -> KeyResult<Arc<KeyNode>> {
        let number = ChildNumber::new(index, hardened)?;
        let mut children = self.children.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(node) = children.get(&number) {
            trace!(path = %node.path, "key cache hit");
            return Ok(Arc::clone(node));
        }

        let key = derive_child(&self.key, index, hardened)?;
        let node = Arc::new(KeyNode::new(key, self.path.child(number)));
        children.insert(number, Arc::clone(&node));
        debug!(path = %node.path, "key cache insert");
        Ok(node)
    }

    /// Previously derived child, without deriving.
    pub fn cached_child(&self, number: ChildNumber) -> Option<Arc<KeyNode>> {
        let children = self.children.lock().unwrap_or_else(PoisonError::into_inner);
        children.get(&number).cloned()
    }

    pub fn cached_children(&self) -> usize {
        self.children.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

impl std::fmt::Debug for KeyNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyNode")
            .field("path", &self.path.to_string())
            .field("fingerprint", &hex::encode(self.key.fingerprint()))
            .field("children", &self.cached_children())
            .finish()
    }
}

/// Owns the whole tree through its root.
#[derive(Debug, Clone)]
pub struct KeyHierarchy {
    root: Arc<KeyNode>,
}

impl KeyHierarchy {
    /// Tree rooted at `root`, at any depth. Node paths are reported relative
    /// to it (see [`KeyNode::path`]).
    pub fn new(root: ExtendedKey) -> Self {
        Self { root: Arc::new(KeyNode::new(root, DerivationPath::root())) }
    }

    pub fn from_seed(seed: &[u8], params: &NetParams) -> KeyResult<Self> {
        Ok(Self::new(derive_root(seed, params)?))
    }

    /// Root from a BIP39 phrase and optional passphrase.
    #[cfg(feature = "mnemonic")]
    pub fn from_mnemonic(phrase: &str, passphrase: &str, params: &NetParams) -> KeyResult<Self> {
        let mnemonic = bip39::Mnemonic::parse_normalized(phrase)
            .map_err(|e| crate::error::KeyError::invalid_key(format!("mnemonic: {e}")))?;
        let seed = zeroize::Zeroizing::new(mnemonic.to_seed(passphrase));
        Self::from_seed(&seed[..], params)
    }

    pub fn root(&self) -> &Arc<KeyNode> { &self.root }

    /// Walk `path` from the root, deriving and caching every step.
    pub fn derive_path(&self, path: &DerivationPath) -> KeyResult<Arc<KeyNode>> {
        path.iter().try_fold(Arc::clone(&self.root), |node, step| {
            node.derive_child_key(step.index(), step.is_hardened())
        })
    }
}
