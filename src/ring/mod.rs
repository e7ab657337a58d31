//! [`RingHash`] is a weighted consistent-hashing ring.
//!
//! The goal of consistent hashing is to decide which node should own a specific key in a way that is
//! stable under membership changes. Both nodes and keys are hashed onto the same fixed hash space - in
//! this case [0, 2^32) - and the node that owns a key is the first node whose hash is greater than or
//! equal to the hash of the key. The hash space is viewed as a circular buffer (the hash ring):
//!
//! In this example the hash function returns a number between 0 and 100.
//! Points:      ['A', 'B']
//! Points_hash: [ 10,  50]
//!
//! key 'foo', hash('foo') = 30 -> owned by B (hash 50)
//! key 'bar', hash('bar') = 95 -> owned by A (hash 10)
//!   - the last one wraps around the end of the ring back to its first point
//!
//! A single point per node distributes keys poorly, so each node is projected onto the ring `weight`
//! times. Those projections are called virtual points and are computed as `hash(i + ring_id)` for
//! `i in 0..weight`. The higher the weight of a node, the larger the share of the key space it owns.
//!
//! [`RingHash`] does not synchronize access internally. If it has to be shared between threads, wrap it
//! with [`shared::SharedRingHash`] or keep it owned by a single task.
use std::{collections::HashMap, fmt::Debug, sync::Arc};

use tracing::{event, instrument, Level};

use crate::{
    config::RingConfig,
    error::{Error, Result},
    hash::{crc32_ieee, HashFn, HashFunctionReturnType},
};

pub mod accept;
pub mod shared;

pub use accept::{accept_any, accept_unique};

/// Weight used by [`RingHash::default`]
pub const DEFAULT_WEIGHT: usize = 1;

/// Signature of the filter used by [`RingHash::get_n`].
/// The first argument contains the node ids already chosen, the second one is the candidate.
pub type Accept<'a> = &'a dyn Fn(&[String], &str) -> bool;

/// Anything that can be placed on the ring.
///
/// The ring id must be stable and unique for as long as the value is registered: it is used both to
/// compute the virtual points of the node and to remove it later on.
pub trait RingEntry {
    fn ring_id(&self) -> String;
}

/// A node that is identified by a plain string and carries no other payload
#[derive(Debug, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct StringNode(String);

impl StringNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RingEntry for StringNode {
    fn ring_id(&self) -> String {
        self.0.clone()
    }
}

impl RingEntry for String {
    fn ring_id(&self) -> String {
        self.clone()
    }
}

impl<T: RingEntry + ?Sized> RingEntry for Box<T> {
    fn ring_id(&self) -> String {
        (**self).ring_id()
    }
}

impl<T: RingEntry + ?Sized> RingEntry for Arc<T> {
    fn ring_id(&self) -> String {
        (**self).ring_id()
    }
}

impl From<StringNode> for String {
    fn from(node: StringNode) -> Self {
        node.0
    }
}

impl From<StringNode> for Box<dyn RingEntry> {
    fn from(node: StringNode) -> Self {
        Box::new(node)
    }
}

impl From<StringNode> for Box<dyn RingEntry + Send + Sync> {
    fn from(node: StringNode) -> Self {
        Box::new(node)
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    weight: usize,
    value: V,
}

/// A single projection of a node onto the ring.
///
/// Points are ordered by hash first and owner second. Two different nodes can end up on the same
/// hash: both points are kept and lookups deterministically resolve to the smallest owner id.
#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
struct VirtualPoint {
    hash: HashFunctionReturnType,
    owner: Arc<str>,
}

#[derive(Clone)]
pub struct RingHash<V = StringNode> {
    hash_fn: HashFn,
    default_weight: usize,
    // Sorted. Contains exactly sum(entry.weight) points
    points: Vec<VirtualPoint>,
    entries: HashMap<String, Entry<V>>,
}

impl<V> Debug for RingHash<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RingHash")
            .field("default_weight", &self.default_weight)
            .field("nodes", &self.entries.len())
            .field("virtual_points", &self.points.len())
            .finish()
    }
}

impl<V> Default for RingHash<V> {
    fn default() -> Self {
        Self::new(DEFAULT_WEIGHT, None)
    }
}

/// Computes the virtual points of a node, in replica order
fn replica_hashes(
    hash_fn: HashFn,
    id: &str,
    weight: usize,
) -> impl Iterator<Item = HashFunctionReturnType> + '_ {
    (0..weight).map(move |i| hash_fn(format!("{}{}", i, id).as_bytes()))
}

impl<V> RingHash<V> {
    /// Creates an empty ring. If `hash_fn` is None, [`crc32_ieee`] is used.
    pub fn new(default_weight: usize, hash_fn: Option<HashFn>) -> Self {
        Self {
            hash_fn: hash_fn.unwrap_or(crc32_ieee),
            default_weight,
            points: Vec::new(),
            entries: HashMap::new(),
        }
    }

    /// Returns true if there are no virtual points on the ring
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of registered nodes
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Number of virtual points on the ring
    pub fn virtual_len(&self) -> usize {
        self.points.len()
    }

    pub fn default_weight(&self) -> usize {
        self.default_weight
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn weight(&self, id: &str) -> Option<usize> {
        self.entries.get(id).map(|entry| entry.weight)
    }

    /// Returns the value registered under `id`
    pub fn entry(&self, id: &str) -> Option<&V> {
        self.entries.get(id).map(|entry| &entry.value)
    }

    /// Ids of all registered nodes, in no particular order
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Removes the node identified by `id` together with all its virtual points.
    #[instrument(level = "debug", skip(self))]
    pub fn del(&mut self, id: &str) -> Result<()> {
        let Some(entry) = self.entries.remove(id) else {
            event!(Level::WARN, "Node {} is not registered", id);
            return Err(Error::NodeNotFound { id: id.to_string() });
        };

        let before = self.points.len();
        self.points.retain(|point| point.owner.as_ref() != id);
        debug_assert_eq!(before - self.points.len(), entry.weight);

        event!(
            Level::DEBUG,
            "Removed node {} and its {} virtual points",
            id,
            entry.weight
        );
        Ok(())
    }

    /// Returns the id of the node that owns `key`, or None if the ring is empty
    pub fn get(&self, key: &str) -> Option<&str> {
        let index = self.key_owner_index(key)?;
        Some(self.points[index].owner.as_ref())
    }

    /// Returns the value of the node that owns `key`, or None if the ring is empty
    pub fn get_value(&self, key: &str) -> Option<&V> {
        self.get(key).and_then(|id| self.entry(id))
    }

    /// Returns up to `n` node ids, walking the ring clockwise starting at the owner of `key`.
    ///
    /// Every candidate is passed to `accept` together with the ids already chosen. This is how
    /// placement strategies are implemented - e.g. [`accept_unique`] for replica sets or a predicate
    /// that keeps replicas on different availability zones. If `accept` is None, every candidate is
    /// accepted ([`accept_any`]).
    ///
    /// Each virtual point is visited at most once, so fewer than `n` ids are returned if the predicate
    /// rejects too many candidates.
    pub fn get_n(&self, key: &str, n: usize, accept: Option<Accept<'_>>) -> Vec<String> {
        let mut res = Vec::new();
        if n < 1 {
            return res;
        }
        let Some(start) = self.key_owner_index(key) else {
            return res;
        };
        let accept: Accept<'_> = match accept {
            Some(accept) => accept,
            None => &accept_any,
        };

        let ring_length = self.points.len();
        res.reserve(n.min(ring_length));
        for i in 0..ring_length {
            if res.len() == n {
                break;
            }

            let candidate = self.points[(start + i) % ring_length].owner.as_ref();
            if accept(res.as_slice(), candidate) {
                res.push(candidate.to_string());
            }
        }

        res
    }

    /// Binary search for the first point whose hash is >= hash(key), wrapping around to
    /// the first point of the ring.
    fn key_owner_index(&self, key: &str) -> Option<usize> {
        if self.points.is_empty() {
            return None;
        }

        let key_hash = (self.hash_fn)(key.as_bytes());
        Some(self.points.partition_point(|point| point.hash < key_hash) % self.points.len())
    }
}

impl<V: RingEntry> RingHash<V> {
    /// Adds a node with `weight` virtual points.
    ///
    /// Fails with [`Error::DuplicateNode`] if a node with the same ring id is already registered and
    /// with [`Error::InvalidWeight`] if weight is 0. The ring is left untouched on failure.
    #[instrument(level = "debug", skip(self, value))]
    pub fn add_with_weight(&mut self, value: V, weight: usize) -> Result<()> {
        let id = value.ring_id();
        if self.entries.contains_key(&id) {
            event!(Level::WARN, "Node {} is already registered", id);
            return Err(Error::DuplicateNode { id });
        }
        if weight == 0 {
            event!(Level::WARN, "Node {} has weight 0", id);
            return Err(Error::InvalidWeight { id, weight });
        }

        let owner: Arc<str> = Arc::from(id.as_str());
        self.points.extend(
            replica_hashes(self.hash_fn, &id, weight).map(|hash| VirtualPoint {
                hash,
                owner: owner.clone(),
            }),
        );
        self.points.sort_unstable();

        event!(
            Level::DEBUG,
            "Added node {} with {} virtual points",
            id,
            weight
        );
        self.entries.insert(id, Entry { weight, value });
        Ok(())
    }

    /// Adds a node with the default weight
    pub fn add(&mut self, value: V) -> Result<()> {
        self.add_with_weight(value, self.default_weight)
    }
}

impl<V: RingEntry + From<StringNode>> RingHash<V> {
    /// Adds plain string nodes with the default weight.
    ///
    /// Stops at the first failure and returns it. Ids that were added before the failing one remain
    /// on the ring.
    pub fn add_string<I, S>(&mut self, ids: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for id in ids {
            self.add_string_with_weight(id, self.default_weight)?;
        }

        Ok(())
    }

    /// Adds a plain string node with a custom weight
    pub fn add_string_with_weight(&mut self, id: impl Into<String>, weight: usize) -> Result<()> {
        self.add_with_weight(V::from(StringNode::new(id)), weight)
    }

    /// Builds a ring out of a [`RingConfig`], registering every configured node.
    #[instrument(level = "debug", skip(config))]
    pub fn from_config(config: &RingConfig) -> Result<Self> {
        config.validate()?;

        let mut ring = Self::new(config.default_weight, Some(config.hash.hash_fn()));
        for node in config.nodes.iter() {
            let weight = node.weight.unwrap_or(config.default_weight);
            ring.add_string_with_weight(node.id.clone(), weight)?;
        }

        event!(
            Level::INFO,
            "Ring built with {} nodes and {} virtual points",
            ring.len(),
            ring.virtual_len()
        );
        Ok(ring)
    }
}
