//! # Metrics Trait Hierarchy
//!
//! Recording, snapshotting and export are split into small traits so map
//! logic only ever writes counters.
//!
//! ```text
//!                         ┌─────────────────────────────┐
//!                         │     CoreMetricsRecorder     │
//!                         │  get hit/miss, insert,      │
//!                         │  remove, clear              │
//!                         └──────────────┬──────────────┘
//!                                        │
//!                  ┌─────────────────────┴─────────────────────┐
//!                  ▼                                           ▼
//!   ┌──────────────────────────────┐            ┌──────────────────────────────┐
//!   │ OrderedMapMetricsRecorder    │            │ NavigableMetricsRecorder     │
//!   │ evict, reorder, pop          │            │ pop, incomparable            │
//!   └──────────────────────────────┘            └──────────────────────────────┘
//!   ┌──────────────────────────────┐            ┌──────────────────────────────┐
//!   │ OrderedMapMetricsReadRecorder│            │ NavigableMetricsReadRecorder │
//!   │ (&self) peek                 │            │ (&self) lookups, nearest,    │
//!   └──────────────────────────────┘            │ range, views                 │
//!                                               └──────────────────────────────┘
//!
//!   Consumption (decoupled from recording):
//!   ┌──────────────────────────────┐    ┌──────────────────────────────┐
//!   │ MetricsSnapshotProvider<S>   │    │ MetricsExporter<S>           │
//!   │ (bench/test)                 │    │ (production monitoring)      │
//!   └──────────────────────────────┘    └──────────────────────────────┘
//! ```

/// Counters shared by both map families.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_insert_rejected(&mut self);
    fn record_remove_call(&mut self);
    fn record_remove_found(&mut self);
    fn record_clear(&mut self);
}

/// Ordered hash map specifics: eviction, access reordering, polls.
pub trait OrderedMapMetricsRecorder: CoreMetricsRecorder {
    fn record_evict_call(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_reorder(&mut self);
    fn record_pop_call(&mut self);
    fn record_pop_found(&mut self);
}

/// Read-only ordered hash map metrics for `&self` methods.
pub trait OrderedMapMetricsReadRecorder {
    fn record_peek_call(&self);
    fn record_peek_found(&self);
}

/// Navigable map specifics.
pub trait NavigableMetricsRecorder: CoreMetricsRecorder {
    fn record_pop_call(&mut self);
    fn record_pop_found(&mut self);
    fn record_incomparable(&mut self);
}

/// Read-only navigable map metrics for `&self` methods.
pub trait NavigableMetricsReadRecorder {
    fn record_lookup_hit(&self);
    fn record_lookup_miss(&self);
    fn record_nearest_call(&self);
    fn record_nearest_found(&self);
    fn record_range_call(&self);
    fn record_view_call(&self);
}

/// Snapshot provider for bench/testing.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}

/// Export/publish metrics to monitoring backends.
pub trait MetricsExporter<S> {
    fn export(&self, snapshot: &S);
}
