//! FNV-1a hashing and bucket placement.
//!
//! The table only ever hashes string keys, and it feeds them as a single
//! `write(key.as_bytes())` so the bucket of a key depends on its bytes alone
//! (no length suffix as `str: Hash` would add).

use core::hash::{BuildHasher, BuildHasherDefault, Hasher};

pub const FNV_OFFSET_BASIS: u64 = 14_695_981_039_346_656_037;
pub const FNV_PRIME: u64 = 1_099_511_628_211;

/// 64-bit FNV-1a state.
#[derive(Copy, Clone, Debug)]
pub struct FnvHasher(u64);

impl Default for FnvHasher {
    #[inline]
    fn default() -> Self {
        FnvHasher(FNV_OFFSET_BASIS)
    }
}

impl Hasher for FnvHasher {
    #[inline]
    fn write(&mut self, bytes: &[u8]) {
        let mut h = self.0;
        for &b in bytes {
            h ^= u64::from(b);
            h = h.wrapping_mul(FNV_PRIME);
        }
        self.0 = h;
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.0
    }
}

/// Default `BuildHasher` for tables: stateless, so placement is stable
/// across processes and runs.
pub type FnvBuildHasher = BuildHasherDefault<FnvHasher>;

/// FNV-1a of `bytes`.
pub fn fnv1a(bytes: &[u8]) -> u64 {
    let mut h = FnvHasher::default();
    h.write(bytes);
    h.finish()
}

/// Hash `key` with `hasher` and reduce it to a bucket in `0..bucket_count`.
#[inline]
pub(crate) fn bucket_of<S: BuildHasher>(hasher: &S, key: &str, bucket_count: usize) -> usize {
    debug_assert!(bucket_count > 0);
    let mut h = hasher.build_hasher();
    h.write(key.as_bytes());
    (h.finish() % bucket_count as u64) as usize
}

/// FNV-1a bucket index of `key` for a table of `bucket_count` buckets.
pub fn bucket_index(key: &str, bucket_count: usize) -> usize {
    bucket_of(&FnvBuildHasher::default(), key, bucket_count)
}
