// ==============================================
// FAIL-FAST CURSOR TESTS (integration)
// ==============================================
//
// A cursor captures the modification count when created and refuses to
// continue once a structural change it did not make has happened.

use ordkit::prelude::*;

mod ordered_hash_map {
    use super::*;

    #[test]
    fn foreign_insert_invalidates_cursor() {
        let mut map: OrderedHashMap<u8, u8> = (0..4).map(|k| (k, k)).collect();
        let mut cursor = map.cursor();
        cursor.next(&map).unwrap();
        map.insert(9, 9).unwrap();
        assert_eq!(cursor.next(&map), Err(MapError::ConcurrentModification));
        assert_eq!(cursor.remove(&mut map), Err(MapError::ConcurrentModification));
    }

    #[test]
    fn value_replacement_is_not_structural() {
        let mut map: OrderedHashMap<u8, u8> = (0..4).map(|k| (k, k)).collect();
        let mut cursor = map.cursor();
        cursor.next(&map).unwrap();
        map.insert(2, 20).unwrap();
        *map.get_mut(&3).unwrap() = 30;
        let rest: Vec<_> = std::iter::from_fn(|| cursor.next(&map).unwrap())
            .map(|(k, v)| (*k, *v))
            .collect();
        assert_eq!(rest, vec![(1, 1), (2, 20), (3, 30)]);
    }

    #[test]
    fn access_order_get_is_structural() {
        let mut map = OrderedHashMap::with_access_order(4, true);
        map.insert('a', 1).unwrap();
        map.insert('b', 2).unwrap();
        let mut cursor = map.cursor();
        // Touching the youngest entry moves nothing.
        map.get(&'b');
        assert!(cursor.next(&map).is_ok());
        map.get(&'a');
        assert_eq!(cursor.next(&map), Err(MapError::ConcurrentModification));
    }

    #[test]
    fn remove_without_current_is_not_found() {
        let mut map: OrderedHashMap<u8, u8> = (0..2).map(|k| (k, k)).collect();
        let mut cursor = map.cursor();
        assert_eq!(cursor.remove(&mut map), Err(MapError::NotFound));
        cursor.next(&map).unwrap();
        cursor.remove(&mut map).unwrap();
        assert_eq!(cursor.remove(&mut map), Err(MapError::NotFound));
        assert_eq!(cursor.next(&map).unwrap(), Some((&1, &1)));
    }

    #[test]
    fn key_set_projection_refuses_insert() {
        let mut map: OrderedHashMap<u8, u8> = (0..3).map(|k| (k, k)).collect();
        let mut keys = map.key_set();
        assert_eq!(keys.insert(7), Err(MapError::UnsupportedMutation));
        assert!(keys.remove(&1));
        assert_eq!(keys.len(), 2);
        assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![0, 2]);
    }
}

mod navigable_map {
    use super::*;

    #[test]
    fn foreign_remove_invalidates_cursor() {
        let mut map: NavigableMap<u8, ()> = (0..4).map(|k| (k, ())).collect();
        let mut cursor = map.cursor();
        cursor.next(&map).unwrap();
        map.remove(&3).unwrap();
        assert_eq!(cursor.next(&map), Err(MapError::ConcurrentModification));
    }

    #[test]
    fn writes_through_a_view_are_structural() {
        let mut map: NavigableMap<u8, ()> = (0..4).map(|k| (k, ())).collect();
        let mut cursor = map.cursor();
        map.tail_map(2, true).unwrap().pop_first().unwrap();
        assert_eq!(cursor.next(&map), Err(MapError::ConcurrentModification));
    }

    #[test]
    fn cursor_removal_drains_the_map() {
        let mut map: NavigableMap<u32, u32> = (0..100).map(|k| (k, k)).collect();
        let mut cursor = map.cursor();
        let mut seen = 0;
        while cursor.next(&map).unwrap().is_some() {
            cursor.remove(&mut map).unwrap();
            seen += 1;
        }
        assert_eq!(seen, 100);
        assert!(map.is_empty());
    }
}
