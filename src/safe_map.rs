//! SafeMap: a hash map behind a reader/writer lock.
//!
//! Reads (`get`, `len`, the snapshot accessors) share the lock; every
//! mutation takes it exclusively. Nothing hands out a reference into the
//! guarded storage: lookups clone the value and snapshots are owned
//! copies, so callers never hold the lock past the call that took it.

use crate::error::BuildError;
use core::any::{type_name, Any};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::collections::hash_map::RandomState;

/// Thread-safe key/value map. Keys are unique; iteration order of every
/// snapshot is unspecified.
pub struct SafeMap<K, V, S = RandomState> {
    map: RwLock<HashMap<K, V, S>>,
}

fn rejected(err: BuildError) -> BuildError {
    tracing::debug!(error = %err, "rejected SafeMap construction input");
    err
}

impl<K, V> SafeMap<K, V>
where
    K: Eq + Hash,
{
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V> Default for SafeMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> SafeMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Clone + Default,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            map: RwLock::new(HashMap::with_hasher(hasher)),
        }
    }

    /// Build a map holding a copy of every entry of `source`.
    pub fn from_map<S2>(source: &std::collections::HashMap<K, V, S2>) -> Self
    where
        K: Clone,
        V: Clone,
    {
        let mut map = HashMap::with_capacity_and_hasher(source.len(), S::default());
        map.extend(source.iter().map(|(k, v)| (k.clone(), v.clone())));
        Self {
            map: RwLock::new(map),
        }
    }

    /// Pair `keys[i]` with `values[i]`. Later duplicates of a key overwrite
    /// earlier ones.
    pub fn from_keys_values(keys: Vec<K>, values: Vec<V>) -> Result<Self, BuildError> {
        if keys.len() != values.len() {
            return Err(rejected(BuildError::LengthMismatch {
                keys: keys.len(),
                values: values.len(),
            }));
        }
        let mut map = HashMap::with_capacity_and_hasher(keys.len(), S::default());
        map.extend(keys.into_iter().zip(values));
        Ok(Self {
            map: RwLock::new(map),
        })
    }

    /// Decode an untyped `key, value, key, value, ...` sequence, the shape
    /// produced by [`SafeMap::key_value_pairs`]. Every even element must
    /// downcast to `K` and every odd element to `V`.
    pub fn from_key_value_pairs<I>(items: I) -> Result<Self, BuildError>
    where
        I: IntoIterator<Item = Box<dyn Any + Send>>,
        K: 'static,
        V: 'static,
    {
        let items: Vec<Box<dyn Any + Send>> = items.into_iter().collect();
        if items.len() % 2 != 0 {
            return Err(rejected(BuildError::OddLength { len: items.len() }));
        }

        let mut map = HashMap::with_capacity_and_hasher(items.len() / 2, S::default());
        let mut it = items.into_iter().enumerate();
        while let (Some((ki, key)), Some((vi, value))) = (it.next(), it.next()) {
            let key = key.downcast::<K>().map_err(|_| {
                rejected(BuildError::KeyType {
                    index: ki,
                    expected: type_name::<K>(),
                })
            })?;
            let value = value.downcast::<V>().map_err(|_| {
                rejected(BuildError::ValueType {
                    index: vi,
                    expected: type_name::<V>(),
                })
            })?;
            map.insert(*key, *value);
        }
        Ok(Self {
            map: RwLock::new(map),
        })
    }

    /// Copy of the value stored under `k`, or `None` when absent.
    pub fn get<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.map.read().get(k).cloned()
    }

    pub fn contains_key<Q>(&self, k: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.read().contains_key(k)
    }

    /// Insert or overwrite.
    pub fn set(&self, k: K, v: V) {
        self.map.write().insert(k, v);
    }

    /// Insert only when `k` is absent; returns whether the insert happened.
    /// An existing value is never replaced.
    pub fn set_nx(&self, k: K, v: V) -> bool {
        let mut map = self.map.write();
        if map.contains_key(&k) {
            return false;
        }
        map.insert(k, v);
        true
    }

    pub fn delete<Q>(&self, k: &Q)
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.write().remove(k);
    }

    /// Remove `k` and return the value it held.
    pub fn pop<Q>(&self, k: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.write().remove(k)
    }

    pub fn len(&self) -> usize {
        self.map.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.read().is_empty()
    }

    /// Swap the storage for a fresh empty table, releasing its capacity.
    pub fn clear(&self) {
        let mut map = self.map.write();
        let hasher = map.hasher().clone();
        *map = HashMap::with_hasher(hasher);
    }

    pub fn keys(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.map.read().keys().cloned().collect()
    }

    pub fn values(&self) -> Vec<V>
    where
        V: Clone,
    {
        self.map.read().values().cloned().collect()
    }

    /// Flat `key, value, key, value, ...` snapshot. Feed it back to
    /// [`SafeMap::from_key_value_pairs`] to rebuild an equal map.
    pub fn key_value_pairs(&self) -> Vec<Box<dyn Any + Send>>
    where
        K: Clone + Send + 'static,
        V: Clone + Send + 'static,
    {
        let map = self.map.read();
        let mut out: Vec<Box<dyn Any + Send>> = Vec::with_capacity(map.len() * 2);
        for (k, v) in map.iter() {
            out.push(Box::new(k.clone()));
            out.push(Box::new(v.clone()));
        }
        out
    }

    /// Keys and values as two sequences; `values[i]` belongs to `keys[i]`.
    pub fn keys_values(&self) -> (Vec<K>, Vec<V>)
    where
        K: Clone,
        V: Clone,
    {
        let map = self.map.read();
        map.iter().map(|(k, v)| (k.clone(), v.clone())).unzip()
    }

    /// Unguarded snapshot, decoupled from this map.
    pub fn export(&self) -> std::collections::HashMap<K, V, S>
    where
        K: Clone,
        V: Clone,
    {
        let map = self.map.read();
        let mut out =
            std::collections::HashMap::with_capacity_and_hasher(map.len(), map.hasher().clone());
        out.extend(map.iter().map(|(k, v)| (k.clone(), v.clone())));
        out
    }
}

impl<K, V, S> Clone for SafeMap<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    /// Independent copy taken under the read lock.
    fn clone(&self) -> Self {
        Self {
            map: RwLock::new(self.map.read().clone()),
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for SafeMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = HashMap::with_hasher(S::default());
        map.extend(iter);
        Self {
            map: RwLock::new(map),
        }
    }
}

impl<K, V, S> fmt::Debug for SafeMap<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.map.read().iter()).finish()
    }
}

/// `{k1: v1, k2: v2}` in unspecified order.
impl<K, V, S> fmt::Display for SafeMap<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let map = self.map.read();
        f.write_str("{")?;
        for (i, (k, v)) in map.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", k, v)?;
        }
        f.write_str("}")
    }
}
