use crate::metrics::cell::MetricsCell;
use crate::metrics::traits::{
    CoreMetricsRecorder, NavigableMetricsReadRecorder, NavigableMetricsRecorder,
    OrderedMapMetricsReadRecorder, OrderedMapMetricsRecorder,
};

#[derive(Debug, Default)]
pub struct OrderedMapMetrics {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,
    pub insert_rejected: u64,
    pub remove_calls: u64,
    pub remove_found: u64,
    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub reorders: u64,
    pub pop_calls: u64,
    pub pop_found: u64,
    pub clear_calls: u64,
    pub peek_calls: MetricsCell,
    pub peek_found: MetricsCell,
}

#[derive(Debug, Default)]
pub struct NavigableMapMetrics {
    pub get_calls: MetricsCell,
    pub get_hits: MetricsCell,
    pub get_misses: MetricsCell,
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
    pub nearest_calls: MetricsCell,
    pub nearest_found: MetricsCell,
    pub range_calls: MetricsCell,
    pub view_calls: MetricsCell,
}

impl OrderedMapMetrics {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NavigableMapMetrics {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CoreMetricsRecorder for OrderedMapMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls += 1;
        self.get_hits += 1;
    }

    fn record_get_miss(&mut self) {
        self.get_calls += 1;
        self.get_misses += 1;
    }

    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    fn record_insert_rejected(&mut self) {
        self.insert_rejected += 1;
    }

    fn record_remove_call(&mut self) {
        self.remove_calls += 1;
    }

    fn record_remove_found(&mut self) {
        self.remove_found += 1;
    }

    fn record_clear(&mut self) {
        self.clear_calls += 1;
    }
}

impl OrderedMapMetricsRecorder for OrderedMapMetrics {
    fn record_evict_call(&mut self) {
        self.evict_calls += 1;
    }

    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    fn record_reorder(&mut self) {
        self.reorders += 1;
    }

    fn record_pop_call(&mut self) {
        self.pop_calls += 1;
    }

    fn record_pop_found(&mut self) {
        self.pop_found += 1;
    }
}

impl OrderedMapMetricsReadRecorder for &OrderedMapMetrics {
    fn record_peek_call(&self) {
        self.peek_calls.incr();
    }

    fn record_peek_found(&self) {
        self.peek_found.incr();
    }
}

impl CoreMetricsRecorder for NavigableMapMetrics {
    fn record_get_hit(&mut self) {
        self.get_calls.incr();
        self.get_hits.incr();
    }

    fn record_get_miss(&mut self) {
        self.get_calls.incr();
        self.get_misses.incr();
    }

    fn record_insert_call(&mut self) {
        self.insert_calls += 1;
    }

    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    fn record_insert_rejected(&mut self) {
        self.insert_rejected += 1;
    }

    fn record_remove_call(&mut self) {
        self.remove_calls += 1;
    }

    fn record_remove_found(&mut self) {
        self.remove_found += 1;
    }

    fn record_clear(&mut self) {
        self.clear_calls += 1;
    }
}

impl NavigableMetricsRecorder for NavigableMapMetrics {
    fn record_pop_call(&mut self) {
        self.pop_calls += 1;
    }

    fn record_pop_found(&mut self) {
        self.pop_found += 1;
    }

    fn record_incomparable(&mut self) {
        self.incomparable += 1;
    }
}

impl NavigableMetricsReadRecorder for &NavigableMapMetrics {
    fn record_lookup_hit(&self) {
        self.get_calls.incr();
        self.get_hits.incr();
    }

    fn record_lookup_miss(&self) {
        self.get_calls.incr();
        self.get_misses.incr();
    }

    fn record_nearest_call(&self) {
        self.nearest_calls.incr();
    }

    fn record_nearest_found(&self) {
        self.nearest_found.incr();
    }

    fn record_range_call(&self) {
        self.range_calls.incr();
    }

    fn record_view_call(&self) {
        self.view_calls.incr();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_map_metrics_split_hits_and_misses() {
        let mut m = OrderedMapMetrics::new();
        m.record_get_hit();
        m.record_get_miss();
        m.record_get_miss();
        assert_eq!((m.get_calls, m.get_hits, m.get_misses), (3, 1, 2));
        (&m).record_peek_call();
        assert_eq!(m.peek_calls.get(), 1);
    }

    #[test]
    fn navigable_metrics_count_reads_through_shared_refs() {
        let m = NavigableMapMetrics::new();
        let r = &m;
        r.record_lookup_hit();
        r.record_lookup_miss();
        r.record_nearest_call();
        assert_eq!(m.get_calls.get(), 2);
        assert_eq!(m.get_hits.get(), 1);
        assert_eq!(m.nearest_calls.get(), 1);
    }
}
