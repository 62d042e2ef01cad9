// Copyright (c) Sienna Satterwhite, CesiumDB Contributors
// SPDX-License-Identifier: GPL-3.0-only WITH Classpath-exception-2.0

use std::sync::Arc;

use parking_lot::{
    Mutex,
    MutexGuard,
};

use crate::{
    errs::SkipListError,
    skiplist::{
        comparator::{
            Comparator,
            Natural,
        },
        map::SkipList,
    },
};

/// A cloneable handle to a [`SkipList`] that can cross threads.
///
/// The list itself has no synchronization at all. Every call here takes one
/// exclusive lock around the whole list, so operations from different threads
/// run one after another and never interleave.
pub struct SharedSkipList<K, V, C = Natural> {
    inner: Arc<Mutex<SkipList<K, V, C>>>,
}

impl<K, V, C> Clone for SharedSkipList<K, V, C> {
    fn clone(&self) -> Self {
        SharedSkipList {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V, C: Comparator<K>> SharedSkipList<K, V, C> {
    pub fn new(list: SkipList<K, V, C>) -> Self {
        SharedSkipList {
            inner: Arc::new(Mutex::new(list)),
        }
    }

    pub fn insert(&self, key: K, value: V) -> Result<Option<V>, SkipListError> {
        self.inner.lock().insert(key, value)
    }

    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.lock().get(key).cloned()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.lock().contains_key(key)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.lock().remove(key)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn height(&self) -> usize {
        self.inner.lock().height()
    }

    /// Holds the lock for as long as the guard lives, for callers that need
    /// several operations to happen as one.
    pub fn lock(&self) -> MutexGuard<'_, SkipList<K, V, C>> {
        self.inner.lock()
    }
}

impl<K: Ord, V> Default for SharedSkipList<K, V> {
    fn default() -> Self {
        Self::new(SkipList::new())
    }
}
