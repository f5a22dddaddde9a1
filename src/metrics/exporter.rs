use std::io::Write;
use std::sync::Mutex;

use crate::metrics::snapshot::{NavigableMapMetricsSnapshot, OrderedMapMetricsSnapshot};
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for map metrics snapshots.
///
/// Writes the Prometheus text exposition format so the output can be scraped
/// directly or forwarded to a collector.
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Returns the writer, e.g. to read back a `Vec<u8>` buffer.
    pub fn into_inner(self) -> W {
        match self.writer.into_inner() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write_sample(&self, kind: &str, name: &str, value: u64) {
        let mut writer = match self.writer.lock() {
            Ok(writer) => writer,
            Err(poisoned) => poisoned.into_inner(),
        };
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn write_counter(&self, suffix: &str, value: u64) {
        self.write_sample("counter", &self.metric_name(suffix), value);
    }

    fn write_gauge(&self, suffix: &str, value: u64) {
        self.write_sample("gauge", &self.metric_name(suffix), value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write> MetricsExporter<OrderedMapMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &OrderedMapMetricsSnapshot) {
        self.write_counter("get_calls_total", snapshot.get_calls);
        self.write_counter("get_hits_total", snapshot.get_hits);
        self.write_counter("get_misses_total", snapshot.get_misses);
        self.write_counter("insert_calls_total", snapshot.insert_calls);
        self.write_counter("insert_updates_total", snapshot.insert_updates);
        self.write_counter("insert_new_total", snapshot.insert_new);
        self.write_counter("insert_rejected_total", snapshot.insert_rejected);
        self.write_counter("remove_calls_total", snapshot.remove_calls);
        self.write_counter("remove_found_total", snapshot.remove_found);
        self.write_counter("evict_calls_total", snapshot.evict_calls);
        self.write_counter("evicted_entries_total", snapshot.evicted_entries);
        self.write_counter("reorders_total", snapshot.reorders);
        self.write_counter("pop_calls_total", snapshot.pop_calls);
        self.write_counter("pop_found_total", snapshot.pop_found);
        self.write_counter("clear_calls_total", snapshot.clear_calls);
        self.write_counter("peek_calls_total", snapshot.peek_calls);
        self.write_counter("peek_found_total", snapshot.peek_found);
        self.write_gauge("map_len", snapshot.map_len as u64);
        self.write_gauge("order_len", snapshot.order_len as u64);
        self.write_gauge("capacity", snapshot.capacity as u64);
    }
}

impl<W: Write> MetricsExporter<NavigableMapMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &NavigableMapMetricsSnapshot) {
        self.write_counter("get_calls_total", snapshot.get_calls);
        self.write_counter("get_hits_total", snapshot.get_hits);
        self.write_counter("get_misses_total", snapshot.get_misses);
        self.write_counter("insert_calls_total", snapshot.insert_calls);
        self.write_counter("insert_updates_total", snapshot.insert_updates);
        self.write_counter("insert_new_total", snapshot.insert_new);
        self.write_counter("insert_rejected_total", snapshot.insert_rejected);
        self.write_counter("remove_calls_total", snapshot.remove_calls);
        self.write_counter("remove_found_total", snapshot.remove_found);
        self.write_counter("pop_calls_total", snapshot.pop_calls);
        self.write_counter("pop_found_total", snapshot.pop_found);
        self.write_counter("incomparable_total", snapshot.incomparable);
        self.write_counter("clear_calls_total", snapshot.clear_calls);
        self.write_counter("nearest_calls_total", snapshot.nearest_calls);
        self.write_counter("nearest_found_total", snapshot.nearest_found);
        self.write_counter("range_calls_total", snapshot.range_calls);
        self.write_counter("view_calls_total", snapshot.view_calls);
        self.write_gauge("map_len", snapshot.map_len as u64);
        self.write_gauge("tree_height", u64::from(snapshot.tree_height));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exporter_prefixes_names_and_types_samples() {
        let exporter = PrometheusTextExporter::new("ordkit", Vec::new());
        let snapshot = OrderedMapMetricsSnapshot {
            get_hits: 3,
            map_len: 2,
            ..OrderedMapMetricsSnapshot::default()
        };
        exporter.export(&snapshot);
        let text = String::from_utf8(exporter.into_inner()).unwrap();
        assert!(text.contains("# TYPE ordkit_get_hits_total counter\nordkit_get_hits_total 3\n"));
        assert!(text.contains("# TYPE ordkit_map_len gauge\nordkit_map_len 2\n"));
    }

    #[test]
    fn exporter_without_prefix_uses_bare_names() {
        let exporter = PrometheusTextExporter::new("", Vec::new());
        exporter.export(&NavigableMapMetricsSnapshot {
            tree_height: 4,
            ..NavigableMapMetricsSnapshot::default()
        });
        let text = String::from_utf8(exporter.into_inner()).unwrap();
        assert!(text.contains("\ntree_height 4\n"));
        assert!(text.starts_with("# TYPE get_calls_total counter"));
    }
}
