//! Chain-length diagnostics.

use std::fmt;

/// Snapshot of table shape. With a well-distributed hash `max_chain_len`
/// stays close to `avg_chain_len` as the table grows.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TableStats {
    pub bucket_count: usize,
    pub element_count: usize,
    pub load_factor: f64,
    pub empty_buckets: usize,
    pub max_chain_len: usize,
    /// Mean length over non-empty buckets; 0 when the table is empty.
    pub avg_chain_len: f64,
}

impl TableStats {
    pub fn empty_bucket_ratio(&self) -> f64 {
        if self.bucket_count == 0 {
            return 0.0;
        }
        self.empty_buckets as f64 / self.bucket_count as f64
    }
}

impl fmt::Display for TableStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hash Table Statistics:")?;
        writeln!(f, "  Bucket Count: {}", self.bucket_count)?;
        writeln!(f, "  Element Count: {}", self.element_count)?;
        writeln!(f, "  Load Factor: {:.3}", self.load_factor)?;
        writeln!(
            f,
            "  Empty Buckets: {} ({:.1}%)",
            self.empty_buckets,
            100.0 * self.empty_bucket_ratio()
        )?;
        writeln!(f, "  Max Chain Length: {}", self.max_chain_len)?;
        writeln!(f, "  Avg Chain Length: {:.2}", self.avg_chain_len)
    }
}
