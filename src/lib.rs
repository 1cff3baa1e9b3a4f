//! record-table: a thread-safe, separately chained hash table for uniquely
//! keyed records, with validation, persistence and reporting on top.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: keep the structural table free of locking and policy so its
//!   invariants can be checked in isolation, and put synchronization,
//!   validation and notification in one thin layer above it.
//! - Layers:
//!   - ChainTable<R, S>: structural layer. Prime-sized array of bucket
//!     heads; each chain is a singly linked list of nodes stored in a
//!     `slotmap` arena. Owns rehashing.
//!   - Table<R, V, S>: public API. One `parking_lot::Mutex` around a
//!     ChainTable, a `Validator` consulted before every mutation and an
//!     `Observer` notified after every operation.
//!   - DataStore and `report`: consumers of Table's public API only.
//!
//! Constraints
//! - Keys are the record's own `key()`; duplicates are rejected, never
//!   overwritten.
//! - Bucket selection is FNV-1a (64-bit) of the key bytes modulo the
//!   bucket count. Bucket counts are always prime.
//! - Linearizable: every public operation runs under one exclusive lock,
//!   including a rehash triggered by the insert that crossed the limit.
//!
//! Rehash invariants
//! - After any insert returns, `len / bucket_count <= max_load_factor`.
//! - Growth applies `next_prime(2 * bucket_count)` until the limit holds
//!   for the new length (once, at the default limit). The new head array is
//!   reserved before the inserted node is linked, so a failed growth leaves
//!   the table as it was.
//! - Every node is relinked exactly once; nodes never move in the arena.
//!
//! Reentrancy
//! - Validators and observers never run while the lock is held.
//! - Search predicates and `find` views do. Calling back into the same
//!   table from either deadlocks.
//!
//! Two-table operations
//! - `swap` and `replace_from` lock both tables in address order, so
//!   transfers running in opposite directions cannot deadlock.

#[cfg(any(test, feature = "bench_internal"))]
pub mod chain_table;
// Without the feature, part of the structural API is only used by benches.
#[cfg(not(any(test, feature = "bench_internal")))]
#[allow(dead_code)]
mod chain_table;
#[cfg(test)]
mod chain_table_proptest;
pub mod employee;
pub mod error;
pub mod fnv;
pub mod logging;
pub mod observer;
pub mod persist;
pub mod prime;
pub mod record;
pub mod report;
pub mod search;
pub mod stats;
mod table;
pub mod validate;

// Public surface
pub use employee::{AccessLevel, Department, Employee, EmployeeStatus};
pub use error::{LoadIssue, ParseError, PersistError, TableError, ValidationError};
pub use observer::{LogObserver, NoopObserver, Observer, TableEvent};
pub use persist::{DataStore, LoadReport};
pub use record::{CsvRow, LineCodec, Record};
pub use search::{Criteria, MatchAll, SearchCriteria};
pub use stats::TableStats;
pub use table::{RecordRef, Table, TableConfig};
pub use validate::{AcceptAll, EmployeeValidator, Validator};

/// A table of employees checked by [`EmployeeValidator`].
pub type EmployeeTable = Table<Employee, EmployeeValidator>;
