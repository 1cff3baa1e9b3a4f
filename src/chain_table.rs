//! ChainTable: structural layer. A prime-sized array of bucket chains whose
//! nodes live in a generational arena.
//!
//! Each bucket holds the arena key of its head node and each node holds the
//! key of its successor, so a chain is a singly linked list threaded through
//! the arena. Dropping the arena drops every node; unlinking a node and
//! removing it from the arena destroys exactly that node.
//!
//! Not synchronized. `Table` wraps this in a lock.

use crate::fnv::{self, FnvBuildHasher};
use crate::prime;
use crate::record::Record;
use crate::stats::TableStats;
use core::hash::BuildHasher;
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Arena key of one chain node.
    pub struct NodeKey;
}

pub const DEFAULT_BUCKETS: usize = 17;
pub const MAX_LOAD_FACTOR: f64 = 0.75;

#[derive(Debug)]
struct Node<R> {
    record: R,
    next: Option<NodeKey>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertError {
    DuplicateKey,
    /// The next bucket array could not be sized or allocated; nothing was linked.
    CapacityOverflow { requested: usize },
}

/// Growth performed while completing an insert.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rehash {
    /// Load factor right after the triggering record was linked.
    pub load_factor: f64,
    pub from: usize,
    pub to: usize,
}

pub struct ChainTable<R, S = FnvBuildHasher> {
    hasher: S,
    heads: Vec<Option<NodeKey>>,
    nodes: SlotMap<NodeKey, Node<R>>,
    max_load_factor: f64,
}

impl<R: Record> ChainTable<R> {
    pub fn new() -> Self {
        Self::with_buckets(DEFAULT_BUCKETS)
    }

    /// `buckets` is rounded up to the next prime.
    pub fn with_buckets(buckets: usize) -> Self {
        Self::with_hasher(buckets, MAX_LOAD_FACTOR, FnvBuildHasher::default())
    }
}

impl<R: Record> Default for ChainTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over stored records, bucket by bucket, each chain head first.
pub struct Iter<'a, R, S> {
    table: &'a ChainTable<R, S>,
    bucket: usize,
    cur: Option<NodeKey>,
}

impl<'a, R, S> Iterator for Iter<'a, R, S> {
    type Item = &'a R;

    fn next(&mut self) -> Option<Self::Item> {
        let table = self.table;
        loop {
            if let Some(k) = self.cur {
                let node = &table.nodes[k];
                self.cur = node.next;
                return Some(&node.record);
            }
            let head = table.heads.get(self.bucket)?;
            self.cur = *head;
            self.bucket += 1;
        }
    }
}

impl<R, S> ChainTable<R, S>
where
    R: Record,
    S: BuildHasher,
{
    pub fn with_hasher(buckets: usize, max_load_factor: f64, hasher: S) -> Self {
        let n = prime::next_prime(buckets);
        Self {
            hasher,
            heads: vec![None; n],
            nodes: SlotMap::with_key(),
            max_load_factor,
        }
    }

    /// A fresh empty table sharing this one's hasher and load limit.
    pub fn empty_like(&self, buckets: usize) -> Self
    where
        S: Clone,
    {
        Self::with_hasher(buckets, self.max_load_factor, self.hasher.clone())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
    pub fn bucket_count(&self) -> usize {
        self.heads.len()
    }
    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }
    pub fn load_factor(&self) -> f64 {
        self.len() as f64 / self.bucket_count() as f64
    }

    pub fn bucket(&self, key: &str) -> usize {
        fnv::bucket_of(&self.hasher, key, self.heads.len())
    }

    fn locate(&self, idx: usize, key: &str) -> Option<NodeKey> {
        let mut cur = self.heads[idx];
        while let Some(k) = cur {
            let node = &self.nodes[k];
            if node.record.key() == key {
                return Some(k);
            }
            cur = node.next;
        }
        None
    }

    pub fn find(&self, key: &str) -> Option<&R> {
        let k = self.locate(self.bucket(key), key)?;
        Some(&self.nodes[k].record)
    }

    /// Mutable access to a stored record. Callers must not change its key.
    pub fn find_mut(&mut self, key: &str) -> Option<&mut R> {
        let k = self.locate(self.bucket(key), key)?;
        Some(&mut self.nodes[k].record)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.locate(self.bucket(key), key).is_some()
    }

    /// Link `record` at the head of its bucket's chain, growing the bucket
    /// array first if the new element would push the load factor past the
    /// limit. Growth is staged before linking, so an error leaves the table
    /// untouched.
    pub fn insert(&mut self, record: R) -> Result<Option<Rehash>, InsertError> {
        let idx = self.bucket(record.key());
        if self.locate(idx, record.key()).is_some() {
            return Err(InsertError::DuplicateKey);
        }

        let after = self.len() + 1;
        let staged = if after as f64 / self.bucket_count() as f64 > self.max_load_factor {
            Some(self.stage_growth(after)?)
        } else {
            None
        };

        let next = self.heads[idx];
        let k = self.nodes.insert(Node { record, next });
        self.heads[idx] = Some(k);

        Ok(staged.map(|heads| {
            let load_factor = self.load_factor();
            let from = self.bucket_count();
            self.relink(heads);
            Rehash {
                load_factor,
                from,
                to: self.bucket_count(),
            }
        }))
    }

    /// Allocate the empty head array for `after` elements: apply
    /// `n = next_prime(2 * n)` until `after / n` is within the limit.
    /// One step suffices unless the limit is below `1 / bucket_count`.
    fn stage_growth(&self, after: usize) -> Result<Vec<Option<NodeKey>>, InsertError> {
        let mut target = self.bucket_count();
        loop {
            let doubled = target.checked_mul(2).ok_or(InsertError::CapacityOverflow {
                requested: usize::MAX,
            })?;
            target = prime::checked_next_prime(doubled).ok_or(InsertError::CapacityOverflow {
                requested: doubled,
            })?;
            if after as f64 / target as f64 <= self.max_load_factor {
                break;
            }
        }
        let mut heads = Vec::new();
        heads
            .try_reserve_exact(target)
            .map_err(|_| InsertError::CapacityOverflow { requested: target })?;
        heads.resize(target, None);
        Ok(heads)
    }

    /// Move every node from the current chains onto `heads`, each exactly
    /// once, by consuming the old chains head to tail.
    fn relink(&mut self, heads: Vec<Option<NodeKey>>) {
        let old = std::mem::replace(&mut self.heads, heads);
        let n = self.heads.len();
        for head in old {
            let mut cur = head;
            while let Some(k) = cur {
                let node = &mut self.nodes[k];
                cur = node.next;
                let idx = fnv::bucket_of(&self.hasher, node.record.key(), n);
                node.next = self.heads[idx];
                self.heads[idx] = Some(k);
            }
        }
    }

    /// Replace the record stored under `key` in place. Gives `record` back if
    /// the key is absent.
    pub fn replace(&mut self, key: &str, record: R) -> Result<R, R> {
        debug_assert_eq!(key, record.key());
        match self.find_mut(key) {
            Some(slot) => Ok(std::mem::replace(slot, record)),
            None => Err(record),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<R> {
        let idx = self.bucket(key);
        let mut prev: Option<NodeKey> = None;
        let mut cur = self.heads[idx];
        while let Some(k) = cur {
            let node = &self.nodes[k];
            if node.record.key() == key {
                let next = node.next;
                match prev {
                    Some(p) => self.nodes[p].next = next,
                    None => self.heads[idx] = next,
                }
                return self.nodes.remove(k).map(|n| n.record);
            }
            prev = cur;
            cur = node.next;
        }
        None
    }

    pub fn iter(&self) -> Iter<'_, R, S> {
        Iter {
            table: self,
            bucket: 0,
            cur: None,
        }
    }

    /// Length of each bucket's chain, in bucket order.
    pub fn chain_lengths(&self) -> impl Iterator<Item = usize> + '_ {
        self.heads.iter().map(move |&head| {
            let mut len = 0;
            let mut cur = head;
            while let Some(k) = cur {
                len += 1;
                cur = self.nodes[k].next;
            }
            len
        })
    }

    pub fn stats(&self) -> TableStats {
        let mut empty_buckets = 0;
        let mut max_chain_len = 0;
        let mut total = 0;
        for len in self.chain_lengths() {
            if len == 0 {
                empty_buckets += 1;
            } else {
                max_chain_len = max_chain_len.max(len);
                total += len;
            }
        }
        let used = self.bucket_count() - empty_buckets;
        TableStats {
            bucket_count: self.bucket_count(),
            element_count: self.len(),
            load_factor: self.load_factor(),
            empty_buckets,
            max_chain_len,
            avg_chain_len: if used > 0 {
                total as f64 / used as f64
            } else {
                0.0
            },
        }
    }
}
