use alloc::vec::Vec;
use core::hash::BuildHasher;
use core::hash::Hasher;
use std::collections::BTreeMap;

use proptest::prelude::*;
use siphasher::sip::SipHasher;

use crate::HashMap;
use crate::HashTable;
use crate::probe::DoubleHashing;
use crate::probe::Linear;
use crate::probe::LinearTombstones;
use crate::probe::Probing;
use crate::probe::Quadratic;

/// Hashes through SipHash and keeps only six bits of the result, mirrored
/// into the upper half, so distinct keys regularly share a full hash.
#[derive(Clone, Default)]
struct CollidingBuilder;

struct CollidingHasher(SipHasher);

impl Hasher for CollidingHasher {
    fn finish(&self) -> u64 {
        let bits = self.0.finish() & 0x3f;
        bits | (bits << 32)
    }

    fn write(&mut self, bytes: &[u8]) {
        self.0.write(bytes);
    }
}

impl BuildHasher for CollidingBuilder {
    type Hasher = CollidingHasher;

    fn build_hasher(&self) -> Self::Hasher {
        CollidingHasher(SipHasher::new_with_keys(7, 11))
    }
}

#[derive(Clone, Debug)]
enum Op {
    Insert(u16, u32),
    Remove(u16),
    Get(u16),
    Entry(u16),
    Retain(u16),
    Reserve(u8),
    ShrinkToFit,
    Clear,
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = 0u16..400;
    let op = prop_oneof![
        40 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        25 => key.clone().prop_map(Op::Remove),
        15 => key.clone().prop_map(Op::Get),
        10 => key.prop_map(Op::Entry),
        2 => (2u16..7).prop_map(Op::Retain),
        3 => any::<u8>().prop_map(Op::Reserve),
        3 => Just(Op::ShrinkToFit),
        2 => Just(Op::Clear),
    ];
    prop::collection::vec(op, 0..=1500)
}

/// Checks the structural properties every map must satisfy between
/// operations.
fn validate_map<P: Probing>(map: &HashMap<u16, u32, CollidingBuilder, P>) {
    let table = map.table();
    let buckets = table.bucket_count();

    assert!(
        buckets == 0 || (buckets >= 16 && buckets.is_power_of_two()),
        "bad bucket count {buckets}"
    );
    assert!(
        map.load() <= map.capacity(),
        "load {} exceeds capacity {}",
        map.load(),
        map.capacity()
    );
    if !P::TOMBSTONES {
        assert_eq!(map.tombstones(), 0, "{} left a tombstone", P::NAME);
    }

    let occupied = table.buckets().iter().filter(|b| b.is_occupied()).count();
    let tombstones = table.buckets().iter().filter(|b| b.is_tombstone()).count();
    assert_eq!(occupied, map.len(), "len out of sync with buckets");
    assert_eq!(tombstones, map.tombstones(), "tombstone count out of sync");

    for (index, bucket) in table.buckets().iter().enumerate() {
        if let (Some(hash), Some((key, _))) = (bucket.hash(), bucket.value()) {
            let found = table.find_index(hash, |(other, _)| other == key);
            assert_eq!(found, Some(index), "{} cannot reach key {key}", P::NAME);
        }
    }
}

fn run_against_model<P: Probing + Default>(ops: &[Op]) {
    let mut map: HashMap<u16, u32, CollidingBuilder, P> = HashMap::default();
    let mut model: BTreeMap<u16, u32> = BTreeMap::new();

    for op in ops {
        match *op {
            Op::Insert(k, v) => {
                assert_eq!(map.insert(k, v), model.insert(k, v), "insert {k}");
            }
            Op::Remove(k) => {
                assert_eq!(map.remove(&k), model.remove(&k), "remove {k}");
            }
            Op::Get(k) => {
                assert_eq!(map.get(&k), model.get(&k), "get {k}");
                assert_eq!(map.contains_key(&k), model.contains_key(&k));
            }
            Op::Entry(k) => {
                *map.entry(k).or_insert(0) += 1;
                *model.entry(k).or_insert(0) += 1;
            }
            Op::Retain(modulus) => {
                map.retain(|k, _| k % modulus != 0);
                model.retain(|k, _| k % modulus != 0);
            }
            Op::Reserve(n) => {
                let before = map.capacity();
                map.reserve(n as usize);
                assert!(map.capacity() >= before);
                assert!(map.capacity() - map.load() >= n as usize);
            }
            Op::ShrinkToFit => {
                map.shrink_to_fit();
                assert_eq!(map.tombstones(), 0);
            }
            Op::Clear => {
                map.clear();
                model.clear();
            }
        }

        assert_eq!(map.len(), model.len());
        validate_map(&map);
    }

    let mut contents: Vec<(u16, u32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
    contents.sort_unstable();
    assert_eq!(contents, model.into_iter().collect::<Vec<_>>());
}

/// Drives a fixed-size table directly, never filling it past 3/4 so that
/// insertion always finds a free bucket.
fn run_table_against_model<P: Probing>(ops: &[Op]) {
    const BUCKETS: usize = 128;

    let builder = CollidingBuilder;
    let mut table: HashTable<(u16, u32), P> = HashTable::with_capacity(BUCKETS);
    let mut model: BTreeMap<u16, u32> = BTreeMap::new();

    for op in ops {
        match *op {
            Op::Insert(k, v) if table.load() < BUCKETS * 3 / 4 || model.contains_key(&k) => {
                let old = table.insert(builder.hash_one(k), (k, v), |e| e.0 == k);
                assert_eq!(old.map(|e| e.1), model.insert(k, v));
            }
            Op::Entry(k) if table.load() < BUCKETS * 3 / 4 || model.contains_key(&k) => {
                let count = table.entry(builder.hash_one(k), |e| e.0 == k).or_insert((k, 0));
                count.1 += 1;
                *model.entry(k).or_insert(0) += 1;
            }
            Op::Insert(..) | Op::Entry(_) => {}
            Op::Remove(k) => {
                let removed = table.take(builder.hash_one(k), |e| e.0 == k);
                assert_eq!(removed.map(|e| e.1), model.remove(&k));
            }
            Op::Get(k) => {
                let found = table.find(builder.hash_one(k), |e| e.0 == k);
                assert_eq!(found.map(|e| &e.1), model.get(&k));
            }
            Op::Retain(modulus) => {
                table.retain(|e| e.0 % modulus != 0);
                model.retain(|k, _| k % modulus != 0);
            }
            Op::Clear => {
                table.clear();
                model.clear();
                assert_eq!(table.tombstones(), 0);
            }
            Op::Reserve(_) | Op::ShrinkToFit => {}
        }

        assert_eq!(table.len(), model.len());
        assert_eq!(table.bucket_count(), BUCKETS);
        if !P::TOMBSTONES {
            assert_eq!(table.tombstones(), 0);
        }
        for (k, v) in &model {
            let found = table.find(builder.hash_one(*k), |e| e.0 == *k);
            assert_eq!(found.map(|e| e.1), Some(*v), "{} lost key {k}", P::NAME);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 48, .. ProptestConfig::default() })]

    #[test]
    #[cfg_attr(miri, ignore)]
    fn map_matches_model_linear(ops in ops_strategy()) {
        run_against_model::<Linear>(&ops);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn map_matches_model_linear_tombstones(ops in ops_strategy()) {
        run_against_model::<LinearTombstones>(&ops);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn map_matches_model_quadratic(ops in ops_strategy()) {
        run_against_model::<Quadratic>(&ops);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn map_matches_model_double_hashing(ops in ops_strategy()) {
        run_against_model::<DoubleHashing>(&ops);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn table_matches_model(ops in ops_strategy()) {
        run_table_against_model::<Linear>(&ops);
        run_table_against_model::<LinearTombstones>(&ops);
        run_table_against_model::<Quadratic>(&ops);
        run_table_against_model::<DoubleHashing>(&ops);
    }

    #[test]
    #[cfg_attr(miri, ignore)]
    fn growth_preserves_contents(keys in prop::collection::btree_set(any::<u16>(), 0..600)) {
        let mut map: HashMap<u16, u16, CollidingBuilder, Quadratic> = HashMap::default();
        let mut grew = 0;
        let mut buckets = map.bucket_count();
        for &k in &keys {
            map.insert(k, k.wrapping_mul(3));
            if map.bucket_count() != buckets {
                grew += 1;
                buckets = map.bucket_count();
                for &seen in keys.range(..=k) {
                    prop_assert_eq!(map.get(&seen), Some(&seen.wrapping_mul(3)));
                }
            }
        }
        prop_assert_eq!(map.len(), keys.len());
        prop_assert!(keys.is_empty() || grew > 0);
    }
}
