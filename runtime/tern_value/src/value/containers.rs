//! Storage behind the container variants of `Value`.
//!
//! Containers are reference types: every clone of a `Value::Sequence` points
//! at the same elements, and writes through one are visible through all.

use std::borrow::Borrow;
use std::collections::TryReserveError;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use rustc_hash::FxHashMap;

use super::Value;

/// Shared, interior-mutable container handle.
///
/// Uses `Arc<RwLock<T>>` so values stay `Send + Sync`. Guards must not be
/// held across calls back into the dispatcher.
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    pub fn new(inner: T) -> Self {
        Shared(Arc::new(RwLock::new(inner)))
    }

    /// Get read access to the container.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read()
    }

    /// Get write access to the container.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        self.0.write()
    }

    /// Whether both handles point at the same storage.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Shared(Arc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0.read(), f)
    }
}

/// Growable sequence.
pub type SequenceRef = Shared<Vec<Value>>;
/// Fixed-size array.
pub type ArrayRef = Shared<Box<[Value]>>;
/// Raw ordered map keyed by case-preserving text.
pub type MapRef = Shared<OrderedMap<String>>;

impl Shared<Vec<Value>> {
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Element at a 0-based position.
    pub fn get(&self, position: usize) -> Option<Value> {
        self.read().get(position).cloned()
    }

    pub fn push(&self, value: Value) {
        self.write().push(value);
    }

    /// Store at a 0-based position, padding any gap with `Value::Absent`.
    ///
    /// Fails without touching the sequence when the padded length cannot be
    /// allocated.
    pub fn set_padded(&self, position: usize, value: Value) -> Result<(), TryReserveError> {
        let mut items = self.write();
        if position >= items.len() {
            let additional = (position - items.len()).saturating_add(1);
            items.try_reserve(additional)?;
            items.resize(position, Value::Absent);
            items.push(value);
        } else {
            items[position] = value;
        }
        Ok(())
    }

    /// Copy of the current elements.
    pub fn snapshot(&self) -> Vec<Value> {
        self.read().clone()
    }
}

impl Shared<Box<[Value]>> {
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Element at a 0-based position.
    pub fn get(&self, position: usize) -> Option<Value> {
        self.read().get(position).cloned()
    }

    /// Store at a 0-based position. Returns `false` when out of bounds;
    /// the array never grows.
    pub fn set(&self, position: usize, value: Value) -> bool {
        match self.write().get_mut(position) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Copy of the current elements.
    pub fn snapshot(&self) -> Vec<Value> {
        self.read().to_vec()
    }
}

impl Shared<OrderedMap<String>> {
    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.read().get(key).cloned()
    }

    pub fn insert(&self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.write().insert(key.into(), value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.read().contains_key(key)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }
}

/// Insertion-ordered map with O(1) lookup.
///
/// Entries live in a `Vec` in insertion order; `index` maps each key to its
/// position. Replacing a value keeps the key's original position.
#[derive(Clone)]
pub struct OrderedMap<K> {
    entries: Vec<(K, Value)>,
    index: FxHashMap<K, usize>,
}

impl<K: Hash + Eq + Clone> OrderedMap<K> {
    pub fn new() -> Self {
        OrderedMap {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&Value>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let position = *self.index.get(key)?;
        self.entries.get(position).map(|(_, value)| value)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.contains_key(key)
    }

    /// Insert or replace, returning the previous value.
    pub fn insert(&mut self, key: K, value: Value) -> Option<Value> {
        if let Some(&position) = self.index.get(&key) {
            return Some(std::mem::replace(&mut self.entries[position].1, value));
        }
        self.index.insert(key.clone(), self.entries.len());
        self.entries.push((key, value));
        None
    }

    /// Remove a key, shifting later entries down one position.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<Value>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let position = self.index.remove(key)?;
        let (_, value) = self.entries.remove(position);
        for slot in self.index.values_mut() {
            if *slot > position {
                *slot -= 1;
            }
        }
        Some(value)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries.iter().map(|(key, _)| key)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&K, &Value)> + '_ {
        self.entries.iter().map(|(key, value)| (key, value))
    }
}

impl<K: Hash + Eq + Clone> Default for OrderedMap<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Hash + Eq + Clone> FromIterator<(K, Value)> for OrderedMap<K> {
    fn from_iter<I: IntoIterator<Item = (K, Value)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (key, value) in iter {
            map.insert(key, value);
        }
        map
    }
}

impl<K: fmt::Debug> fmt::Debug for OrderedMap<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, value)| (key, value)))
            .finish()
    }
}

impl<K: PartialEq> PartialEq for OrderedMap<K> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}
