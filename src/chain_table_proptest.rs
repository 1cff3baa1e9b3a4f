#![cfg(test)]

// Property tests for ChainTable kept inside the crate so they exercise the
// structural layer directly, without the lock.

use crate::chain_table::{ChainTable, InsertError, DEFAULT_BUCKETS, MAX_LOAD_FACTOR};
use crate::prime;
use crate::record::Record;
use core::hash::{BuildHasher, Hasher};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};

#[derive(Clone, Debug, PartialEq)]
struct Rec {
    id: String,
    v: i32,
}
impl Record for Rec {
    fn key(&self) -> &str {
        &self.id
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Find(usize),
    Contains(String),
    Replace(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[A-Z]{2}[0-9]{0,4}", 1..=48).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::Find),
            1 => prop_oneof![contains_pool, "[A-Z]{2}[0-9]{0,4}"].prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Replace(i, v)),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Drives `sut` and a std HashMap model through the same operations.
// Checked after every op:
// - bucket count is prime and the load factor is within the limit;
// - a rehash reports growth to next_prime(2 * previous count);
// - chain lengths add up to the element count;
// - `len`/`is_empty` parity with the model.
fn run_state_machine<S: BuildHasher>(
    mut sut: ChainTable<Rec, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i].clone();
                let already = model.contains_key(&k);
                let before = sut.bucket_count();
                match sut.insert(Rec { id: k.clone(), v }) {
                    Ok(rehash) => {
                        prop_assert!(!already, "insert must fail on duplicate");
                        model.insert(k, v);
                        if let Some(r) = rehash {
                            prop_assert_eq!(r.from, before);
                            prop_assert_eq!(r.to, prime::next_prime(2 * before));
                            prop_assert!(r.load_factor > MAX_LOAD_FACTOR);
                        } else {
                            prop_assert_eq!(sut.bucket_count(), before);
                        }
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(already, "duplicate error only when key exists");
                        prop_assert_eq!(sut.find(&k).map(|r| r.v), model.get(&k).copied());
                    }
                    Err(e) => prop_assert!(false, "unexpected error {:?}", e),
                }
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let got = sut.remove(k).map(|r| r.v);
                prop_assert_eq!(got, model.remove(k));
                prop_assert!(sut.find(k).is_none());
            }
            OpI::Find(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.find(k).map(|r| r.v), model.get(k).copied());
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model.contains_key(&s));
            }
            OpI::Replace(i, v) => {
                let k = pool[i].clone();
                match sut.replace(&k, Rec { id: k.clone(), v }) {
                    Ok(old) => {
                        let mv = model.insert(k, v);
                        prop_assert_eq!(Some(old.v), mv);
                    }
                    Err(back) => {
                        prop_assert!(!model.contains_key(&k));
                        prop_assert_eq!(back.v, v);
                    }
                }
            }
            OpI::Iterate => {
                let seen: Vec<String> = sut.iter().map(|r| r.id.clone()).collect();
                let s_keys: BTreeSet<_> = seen.iter().cloned().collect();
                prop_assert_eq!(s_keys.len(), seen.len(), "iter yields each record once");
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        prop_assert!(prime::is_prime(sut.bucket_count()));
        prop_assert!(sut.load_factor() <= sut.max_load_factor());
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.chain_lengths().sum::<usize>(), model.len());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(ChainTable::new(), &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_small_start((pool, ops) in arb_scenario()) {
        run_state_machine(ChainTable::with_buckets(2), &pool, ops)?;
    }
}

// Collision variant using a constant hasher: every key shares one chain.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: same invariants under worst-case collisions. This stresses
// unlinking from the middle and tail of a long chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = ChainTable::with_hasher(DEFAULT_BUCKETS, MAX_LOAD_FACTOR, ConstBuildHasher);
        run_state_machine(sut, &pool, ops)?;
    }
}
