#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct OrderedMapMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub insert_rejected: u64, // refused by the null policy

    pub remove_calls: u64,
    pub remove_found: u64,

    pub evict_calls: u64, // times the eviction policy was consulted
    pub evicted_entries: u64,
    pub reorders: u64, // access-order moves to tail

    pub pop_calls: u64,
    pub pop_found: u64,
    pub clear_calls: u64,

    pub peek_calls: u64,
    pub peek_found: u64,

    // gauges captured at snapshot time
    pub map_len: usize,
    pub order_len: usize,
    pub capacity: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NavigableMapMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub insert_rejected: u64,

    pub remove_calls: u64,
    pub remove_found: u64,

    pub pop_calls: u64,
    pub pop_found: u64,
    pub incomparable: u64,
    pub clear_calls: u64,

    pub nearest_calls: u64,
    pub nearest_found: u64,
    pub range_calls: u64,
    pub view_calls: u64,

    pub map_len: usize,
    pub tree_height: u32,
}
