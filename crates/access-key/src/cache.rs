//! In-memory cache of derived key material, keyed by secret.
//!
//! Derivation is pure, so caching is purely a performance structure:
//! correctness never depends on it. The cache uses `arc-swap` for lock-free
//! reads on the hot path; secrets rotate rarely, so the copy-on-insert
//! write path is cold.

use std::{collections::HashMap, sync::Arc};

use arc_swap::ArcSwap;

use crate::keymat::{self, KeyMaterial};

/// Shared, lock-free cache mapping each seen secret to its [`KeyMaterial`].
#[derive(Clone, Debug)]
pub struct KeyCache {
    inner: Arc<ArcSwap<HashMap<String, KeyMaterial>>>,
}

impl KeyCache {
    /// Create a new, empty [`KeyCache`].
    pub fn new() -> Self {
        Self {
            inner: Arc::new(ArcSwap::new(Arc::new(HashMap::new()))),
        }
    }

    /// Return the number of secrets with cached material.
    pub fn len(&self) -> usize {
        self.inner.load().len()
    }

    /// Return `true` if nothing has been derived yet.
    pub fn is_empty(&self) -> bool {
        self.inner.load().is_empty()
    }

    /// Return the key material for `secret`, deriving and caching it on
    /// first sight.
    ///
    /// The read is lock-free; only a cache miss pays for the copy-on-insert
    /// swap, and a racing duplicate insert is harmless since derivation is
    /// deterministic.
    pub fn derive(&self, secret: &str) -> KeyMaterial {
        if let Some(keys) = self.inner.load().get(secret) {
            return keys.clone();
        }
        let keys = keymat::derive(secret);
        self.inner.rcu(|map| {
            let mut next = (**map).clone();
            next.insert(secret.to_owned(), keys.clone());
            next
        });
        keys
    }
}

impl Default for KeyCache {
    fn default() -> Self {
        Self::new()
    }
}
