// ==============================================
// ORDERED HASH MAP INVARIANT TESTS (integration)
// ==============================================
//
// Behavior that spans the map, its builder, its eviction policies and its
// order list, exercised only through the public API.

use std::collections::HashMap;

use ordkit::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn keys<K: Copy, V, P, S>(map: &OrderedHashMap<K, V, P, S>) -> Vec<K> {
    map.keys().copied().collect()
}

// ==============================================
// Bounded LRU built from access order + MaxEntries
// ==============================================

mod lru_cache {
    use super::*;

    #[test]
    fn get_rescues_an_entry_from_eviction() {
        let mut cache = OrderedHashMap::builder()
            .access_order(true)
            .eviction(MaxEntries::new(3))
            .build();
        for k in ["a", "b", "c"] {
            cache.insert(k, k.len()).unwrap();
        }
        assert!(cache.get(&"a").is_some());
        cache.insert("d", 1).unwrap();

        assert_eq!(keys(&cache), vec!["c", "a", "d"]);
        assert!(!cache.contains_key(&"b"));
    }

    #[test]
    fn peek_does_not_rescue() {
        let mut cache = OrderedHashMap::builder()
            .access_order(true)
            .eviction(MaxEntries::new(2))
            .build();
        cache.insert(1, "one").unwrap();
        cache.insert(2, "two").unwrap();
        assert_eq!(cache.peek(&1), Some(&"one"));
        cache.insert(3, "three").unwrap();

        assert_eq!(keys(&cache), vec![2, 3]);
    }

    #[test]
    fn replacing_a_value_never_evicts() {
        let mut calls = 0;
        let mut cache = OrderedHashMap::builder()
            .eviction(EvictWith(|_: &u32, _: &u32, len: usize| {
                calls += 1;
                len > 2
            }))
            .build();
        cache.insert(1, 1).unwrap();
        cache.insert(2, 2).unwrap();
        cache.insert(1, 10).unwrap();
        cache.insert(3, 3).unwrap();

        assert_eq!(keys(&cache), vec![2, 3]);
        drop(cache);
        // One consultation per new key, none for the replacement.
        assert_eq!(calls, 3);
    }

    #[test]
    fn limit_can_shrink_at_runtime() {
        let mut cache = OrderedHashMap::builder()
            .eviction(MaxEntries::new(10))
            .build();
        for k in 0..10 {
            cache.insert(k, ()).unwrap();
        }
        cache.policy_mut().set_limit(4);
        // Only one eldest entry leaves per insertion.
        cache.insert(10, ()).unwrap();
        assert_eq!(cache.len(), 10);
        assert_eq!(cache.first().map(|(k, _)| *k), Some(1));
    }
}

// ==============================================
// Eviction hook sees the map after linking
// ==============================================

mod eviction_hook {
    use super::*;

    struct Recorder(Vec<(u32, usize)>);

    impl EvictionPolicy<u32, &'static str> for Recorder {
        fn should_evict(&mut self, eldest: &u32, _value: &&'static str, len: usize) -> bool {
            self.0.push((*eldest, len));
            false
        }
    }

    #[test]
    fn hook_receives_eldest_and_post_insert_len() {
        let mut map = OrderedHashMap::builder().eviction(Recorder(Vec::new())).build();
        map.insert(7, "seven").unwrap();
        map.insert(8, "eight").unwrap();
        map.insert(7, "SEVEN").unwrap();

        assert_eq!(map.policy().0, vec![(7, 1), (7, 2)]);
    }

    #[test]
    fn evicting_the_only_entry_leaves_the_map_empty() {
        let mut map = OrderedHashMap::builder()
            .eviction(EvictWith(|_: &u32, _: &u32, _| true))
            .build();
        map.insert(1, 1).unwrap();
        assert!(map.is_empty());
        map.check_invariants().unwrap();
    }
}

// ==============================================
// Null policy
// ==============================================

mod null_policy {
    use super::*;

    #[test]
    fn rejected_pairs_leave_no_trace() {
        let mut map = OrderedHashMap::builder()
            .null_keys(|k: &Option<u8>| k.is_none())
            .null_values(|v: &Option<u8>| v.is_none())
            .build();
        map.insert(Some(1), Some(1)).unwrap();
        let count = map.mod_count();

        assert_eq!(map.insert(None, Some(2)), Err(MapError::InvalidArgument));
        assert_eq!(map.insert(Some(2), None), Err(MapError::InvalidArgument));
        assert_eq!(map.replace(&Some(1), None), Err(MapError::InvalidArgument));
        assert_eq!(
            map.try_extend([(Some(3), Some(3)), (None, Some(4)), (Some(5), Some(5))]),
            Err(MapError::InvalidArgument)
        );

        assert_eq!(keys_of(&map), vec![Some(1), Some(3)]);
        assert_eq!(map.mod_count(), count + 1);
    }

    fn keys_of<P, S>(map: &OrderedHashMap<Option<u8>, Option<u8>, P, S>) -> Vec<Option<u8>> {
        map.keys().copied().collect()
    }
}

// ==============================================
// Randomized agreement with a reference model
// ==============================================

#[test]
fn random_operations_match_a_vec_model() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut map = OrderedHashMap::with_access_order(0, true);
    let mut model: Vec<(u16, u32)> = Vec::new();
    let mut values: HashMap<u16, u32> = HashMap::new();

    for step in 0..4_000u32 {
        let key = rng.random_range(0..64u16);
        match rng.random_range(0..4) {
            0 | 1 => {
                map.insert(key, step).unwrap();
                if let Some(pos) = model.iter().position(|(k, _)| *k == key) {
                    model.remove(pos);
                }
                model.push((key, step));
                values.insert(key, step);
            },
            2 => {
                let got = map.get(&key).copied();
                assert_eq!(got, values.get(&key).copied());
                if let Some(pos) = model.iter().position(|(k, _)| *k == key) {
                    let entry = model.remove(pos);
                    model.push(entry);
                }
            },
            _ => {
                assert_eq!(map.remove(&key), values.remove(&key));
                model.retain(|(k, _)| *k != key);
            },
        }
    }

    let ours: Vec<_> = map.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(ours, model);
    map.check_invariants().unwrap();
}
