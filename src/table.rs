//! Table: the synchronized public surface over [`ChainTable`].
//!
//! Every operation holds one exclusive lock for its whole duration,
//! including a rehash triggered by an insert, so no caller can observe a
//! partially migrated bucket array. Validation happens before the lock is
//! taken and observers are notified after it is released; neither runs
//! while the table is locked. Search predicates do run under the lock and
//! must not call back into the same table.

use crate::chain_table::{ChainTable, InsertError, DEFAULT_BUCKETS, MAX_LOAD_FACTOR};
use crate::error::{TableError, ValidationError};
use crate::fnv::FnvBuildHasher;
use crate::observer::{LogObserver, Observer, TableEvent};
use crate::prime;
use crate::record::Record;
use crate::search::{Criteria, MatchAll};
use crate::stats::TableStats;
use crate::validate::{AcceptAll, Validator};
use core::hash::BuildHasher;
use core::ops::Deref;
use parking_lot::{MappedMutexGuard, Mutex, MutexGuard};
use std::fmt;
use std::sync::Arc;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TableConfig {
    /// Rounded up to a prime.
    pub initial_buckets: usize,
    pub max_load_factor: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_buckets: DEFAULT_BUCKETS,
            max_load_factor: MAX_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    pub fn with_initial_buckets(mut self, n: usize) -> Self {
        self.initial_buckets = n;
        self
    }

    pub fn with_max_load_factor(mut self, lf: f64) -> Self {
        self.max_load_factor = lf;
        self
    }

    fn check(&self) -> Result<(), TableError> {
        if !self.max_load_factor.is_finite() || self.max_load_factor <= 0.0 {
            return Err(TableError::InvalidConfig {
                reason: format!("max_load_factor must be positive, got {}", self.max_load_factor),
            });
        }
        if prime::checked_next_prime(self.initial_buckets).is_none() {
            return Err(TableError::InvalidConfig {
                reason: format!("no prime bucket count >= {}", self.initial_buckets),
            });
        }
        Ok(())
    }
}

pub struct Table<R, V = AcceptAll, S = FnvBuildHasher> {
    inner: Mutex<ChainTable<R, S>>,
    validator: V,
    observer: Arc<dyn Observer>,
    config: TableConfig,
}

/// Borrowed view of a stored record, returned by [`Table::find`].
///
/// The view holds the table lock until it is dropped: other threads block
/// on the table meanwhile, and calling into the same table from the thread
/// holding the view deadlocks. Use [`Table::get`] for an owned copy.
pub struct RecordRef<'a, R> {
    guard: MappedMutexGuard<'a, R>,
}

impl<R> Deref for RecordRef<'_, R> {
    type Target = R;

    fn deref(&self) -> &R {
        &self.guard
    }
}

impl<R: fmt::Debug> fmt::Debug for RecordRef<'_, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<R: Record> Table<R> {
    pub fn new() -> Self {
        Self::with_validator(AcceptAll)
    }
}

impl<R: Record> Default for Table<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R, V> Table<R, V>
where
    R: Record,
    V: Validator<R>,
{
    pub fn with_validator(validator: V) -> Self {
        let config = TableConfig::default();
        Self::assemble(
            ChainTable::with_buckets(config.initial_buckets),
            validator,
            config,
        )
    }

    pub fn with_config(config: TableConfig, validator: V) -> Result<Self, TableError> {
        Self::with_hasher(config, validator, FnvBuildHasher::default())
    }
}

impl<R, V, S> Table<R, V, S>
where
    R: Record,
    V: Validator<R>,
    S: BuildHasher + Clone,
{
    pub fn with_hasher(config: TableConfig, validator: V, hasher: S) -> Result<Self, TableError> {
        config.check()?;
        let chains = ChainTable::with_hasher(config.initial_buckets, config.max_load_factor, hasher);
        Ok(Self::assemble(chains, validator, config))
    }

    fn assemble(chains: ChainTable<R, S>, validator: V, config: TableConfig) -> Self {
        Self {
            inner: Mutex::new(chains),
            validator,
            observer: Arc::new(LogObserver),
            config,
        }
    }

    /// Replace the observer (the default forwards to the `log` facade).
    pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
        self.observer = observer;
        self
    }

    /// An empty table with the same configuration, validator and observer.
    pub fn empty_like(&self) -> Self
    where
        V: Clone,
    {
        let chains = self.inner.lock().empty_like(self.config.initial_buckets);
        Self {
            inner: Mutex::new(chains),
            validator: self.validator.clone(),
            observer: Arc::clone(&self.observer),
            config: self.config,
        }
    }

    pub fn config(&self) -> TableConfig {
        self.config
    }

    pub fn validator(&self) -> &V {
        &self.validator
    }

    fn emit(&self, event: TableEvent<'_>) {
        self.observer.notify(&event);
    }

    /// Validate and insert `record`.
    ///
    /// `Ok(false)` when the key is already present (nothing changes).
    /// If the insert pushes the load factor past the limit, the bucket array
    /// grows to `next_prime(2 * bucket_count)` before this returns.
    pub fn insert(&self, record: R) -> Result<bool, TableError> {
        if let Err(error) = self.validator.validate(&record) {
            self.emit(TableEvent::InsertRejected {
                key: record.key(),
                error: &error,
            });
            return Err(error.into());
        }

        let key = record.key().to_owned();
        let res = self.inner.lock().insert(record);
        match res {
            Ok(rehash) => {
                self.emit(TableEvent::Inserted { key: &key });
                if let Some(r) = rehash {
                    self.emit(TableEvent::RehashStarted {
                        load_factor: r.load_factor,
                        bucket_count: r.from,
                    });
                    self.emit(TableEvent::RehashCompleted { bucket_count: r.to });
                }
                Ok(true)
            }
            Err(InsertError::DuplicateKey) => {
                self.emit(TableEvent::DuplicateRejected { key: &key });
                Ok(false)
            }
            Err(InsertError::CapacityOverflow { requested }) => {
                Err(TableError::CapacityOverflow { requested })
            }
        }
    }

    pub fn remove(&self, key: &str) -> bool {
        let removed = self.inner.lock().remove(key);
        match removed {
            Some(_) => {
                self.emit(TableEvent::Removed { key });
                true
            }
            None => {
                self.emit(TableEvent::RemoveMissed { key });
                false
            }
        }
    }

    /// Borrow the record stored under `key`; see [`RecordRef`] for the
    /// locking contract.
    pub fn find(&self, key: &str) -> Option<RecordRef<'_, R>> {
        let guard = self.inner.lock();
        MutexGuard::try_map(guard, |t| t.find_mut(key))
            .ok()
            .map(|guard| RecordRef { guard })
    }

    /// Owned copy of the record stored under `key`.
    pub fn get(&self, key: &str) -> Option<R> {
        self.inner.lock().find(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.inner.lock().contains_key(key)
    }

    /// Validate `record` and overwrite the record stored under `key` in place.
    ///
    /// `Ok(false)` when `key` is absent. On error the stored record is left
    /// untouched. `record.key()` must equal `key`.
    pub fn update(&self, key: &str, record: R) -> Result<bool, ValidationError> {
        let checked = self.validator.validate(&record).and_then(|()| {
            if record.key() == key {
                Ok(())
            } else {
                Err(ValidationError::KeyMismatch {
                    expected: key.to_owned(),
                    found: record.key().to_owned(),
                })
            }
        });
        if let Err(error) = checked {
            self.emit(TableEvent::UpdateRejected { key, error: &error });
            return Err(error);
        }

        let res = self.inner.lock().replace(key, record);
        match res {
            Ok(_old) => {
                self.emit(TableEvent::Updated { key });
                Ok(true)
            }
            Err(_record) => {
                self.emit(TableEvent::UpdateMissed { key });
                Ok(false)
            }
        }
    }

    /// Copies of every record matching `criteria`.
    pub fn search<C>(&self, criteria: &C) -> Vec<R>
    where
        C: Criteria<R> + ?Sized,
    {
        let found: Vec<R> = {
            let t = self.inner.lock();
            t.iter().filter(|r| criteria.matches(r)).cloned().collect()
        };
        self.emit(TableEvent::SearchCompleted {
            matches: found.len(),
        });
        found
    }

    pub fn search_by<F>(&self, predicate: F) -> Vec<R>
    where
        F: Fn(&R) -> bool,
    {
        let found: Vec<R> = {
            let t = self.inner.lock();
            t.iter().filter(|r| predicate(r)).cloned().collect()
        };
        self.emit(TableEvent::SearchCompleted {
            matches: found.len(),
        });
        found
    }

    /// Snapshot of every record, in unspecified order.
    pub fn get_all(&self) -> Vec<R> {
        self.search(&MatchAll)
    }

    pub fn size(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn load_factor(&self) -> f64 {
        self.inner.lock().load_factor()
    }

    pub fn bucket_count(&self) -> usize {
        self.inner.lock().bucket_count()
    }

    pub fn statistics(&self) -> TableStats {
        self.inner.lock().stats()
    }

    /// Lock both tables in address order so that two transfers running in
    /// opposite directions cannot deadlock.
    fn lock_pair<'a>(
        &'a self,
        other: &'a Self,
    ) -> (
        MutexGuard<'a, ChainTable<R, S>>,
        MutexGuard<'a, ChainTable<R, S>>,
    ) {
        let mine = &self.inner as *const Mutex<ChainTable<R, S>> as usize;
        let theirs = &other.inner as *const Mutex<ChainTable<R, S>> as usize;
        if mine < theirs {
            let a = self.inner.lock();
            let b = other.inner.lock();
            (a, b)
        } else {
            let b = other.inner.lock();
            let a = self.inner.lock();
            (a, b)
        }
    }

    /// Exchange contents with `other` as one step: no caller sees either
    /// table between the two halves of the swap.
    pub fn swap(&self, other: &Self) {
        if std::ptr::eq(self, other) {
            return;
        }
        let (mine, theirs) = {
            let (mut a, mut b) = self.lock_pair(other);
            std::mem::swap(&mut *a, &mut *b);
            (a.len(), b.len())
        };
        self.emit(TableEvent::Replaced {
            element_count: mine,
        });
        other.emit(TableEvent::Replaced {
            element_count: theirs,
        });
    }

    /// Take over `donor`'s contents, discarding this table's. The donor is
    /// left empty at its configured initial size. Returns the new size.
    pub fn replace_from(&self, donor: &Self) -> usize {
        if std::ptr::eq(self, donor) {
            return self.size();
        }
        let (count, _discarded) = {
            let (mut a, mut b) = self.lock_pair(donor);
            let fresh = b.empty_like(donor.config.initial_buckets);
            let taken = std::mem::replace(&mut *b, fresh);
            let old = std::mem::replace(&mut *a, taken);
            (a.len(), old)
        };
        self.emit(TableEvent::Replaced {
            element_count: count,
        });
        donor.emit(TableEvent::Replaced { element_count: 0 });
        count
    }

    /// Drop every record and return to the configured initial size.
    pub fn clear(&self) {
        let _discarded = {
            let mut t = self.inner.lock();
            let fresh = t.empty_like(self.config.initial_buckets);
            std::mem::replace(&mut *t, fresh)
        };
        self.emit(TableEvent::Replaced { element_count: 0 });
    }
}

impl<R, V, S> fmt::Debug for Table<R, V, S>
where
    R: Record,
    V: Validator<R>,
    S: BuildHasher + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = self.statistics();
        f.debug_struct("Table")
            .field("size", &stats.element_count)
            .field("bucket_count", &stats.bucket_count)
            .field("load_factor", &stats.load_factor)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Rec(String, u32);
    impl Record for Rec {
        fn key(&self) -> &str {
            &self.0
        }
    }

    struct EvenOnly;
    impl Validator<Rec> for EvenOnly {
        fn validate(&self, r: &Rec) -> Result<(), ValidationError> {
            if r.1 % 2 == 0 {
                Ok(())
            } else {
                Err(ValidationError::InvalidFormat { field: "value" })
            }
        }
    }

    #[test]
    fn config_rejects_bad_load_factor() {
        for lf in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let cfg = TableConfig::default().with_max_load_factor(lf);
            assert!(matches!(
                Table::<Rec>::with_config(cfg, AcceptAll),
                Err(TableError::InvalidConfig { .. })
            ));
        }
    }

    #[test]
    fn config_rounds_initial_buckets() {
        let cfg = TableConfig::default().with_initial_buckets(100);
        let t = Table::<Rec>::with_config(cfg, AcceptAll).unwrap();
        assert_eq!(t.bucket_count(), 101);
    }

    /// Invariant: a rejected record never reaches the chains.
    #[test]
    fn validation_precedes_mutation() {
        let t = Table::with_validator(EvenOnly);
        assert_eq!(t.insert(Rec("a".into(), 2)), Ok(true));
        let err = t.insert(Rec("b".into(), 3)).unwrap_err();
        assert_eq!(
            err.validation(),
            Some(&ValidationError::InvalidFormat { field: "value" })
        );
        assert_eq!(t.size(), 1);
        assert!(!t.contains("b"));
    }

    /// Invariant: `update` refuses a record whose key differs from the target.
    #[test]
    fn update_rejects_key_change() {
        let t = Table::new();
        t.insert(Rec("a".into(), 1)).unwrap();
        assert_eq!(
            t.update("a", Rec("b".into(), 2)),
            Err(ValidationError::KeyMismatch {
                expected: "a".into(),
                found: "b".into()
            })
        );
        assert_eq!(t.get("a"), Some(Rec("a".into(), 1)));
        assert!(!t.contains("b"));
    }

    /// Invariant: `find` yields a view that reads through to stored data and
    /// releases the lock when dropped.
    #[test]
    fn find_view_releases_lock() {
        let t = Table::new();
        t.insert(Rec("a".into(), 7)).unwrap();
        {
            let r = t.find("a").expect("present");
            assert_eq!(r.1, 7);
            assert!(t.inner.try_lock().is_none(), "view holds the lock");
        }
        assert!(t.inner.try_lock().is_some());
        assert!(t.find("zz").is_none());
        assert!(t.inner.try_lock().is_some(), "a miss does not hold the lock");
    }

    #[test]
    fn clear_resets_to_initial_size() {
        let t = Table::new();
        for i in 0..40 {
            t.insert(Rec(format!("k{}", i), i)).unwrap();
        }
        assert!(t.bucket_count() > 17);
        t.clear();
        assert_eq!(t.size(), 0);
        assert_eq!(t.bucket_count(), 17);
    }

    #[test]
    fn self_swap_and_self_replace_are_noops() {
        let t = Table::new();
        t.insert(Rec("a".into(), 1)).unwrap();
        t.swap(&t);
        assert_eq!(t.replace_from(&t), 1);
        assert_eq!(t.size(), 1);
    }

    #[test]
    fn debug_shows_shape() {
        let t: Table<Rec> = Table::new();
        let s = format!("{:?}", t);
        assert!(s.contains("size: 0"));
        assert!(s.contains("bucket_count: 17"));
    }
}
