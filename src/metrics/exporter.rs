use std::io::Write;
use std::sync::Mutex;

use crate::metrics::snapshot::{
    BufferMetricsSnapshot, CacheMetricsSnapshot, FilterMetricsSnapshot,
};
use crate::metrics::traits::MetricsExporter;

/// Prometheus text exporter for component snapshots.
///
/// Writes the Prometheus text exposition format so output can be scraped
/// directly or forwarded to a collector. Write errors are dropped: metrics
/// are observational.
///
/// ```
/// use hotpath::buffer::CircularBuffer;
/// use hotpath::metrics::{MetricsExporter, MetricsSnapshotProvider, PrometheusTextExporter};
///
/// let mut ticks = CircularBuffer::new(8).unwrap();
/// ticks.push(1.5_f64);
///
/// let exporter = PrometheusTextExporter::new("ticks", Vec::new());
/// exporter.export(&ticks.snapshot());
/// let text = String::from_utf8(exporter.into_inner()).unwrap();
/// assert!(text.contains("ticks_writes_total 1"));
/// ```
#[derive(Debug)]
pub struct PrometheusTextExporter<W: Write + Send> {
    prefix: String,
    writer: Mutex<W>,
}

impl<W: Write + Send> PrometheusTextExporter<W> {
    pub fn new(prefix: impl Into<String>, writer: W) -> Self {
        Self {
            prefix: prefix.into(),
            writer: Mutex::new(writer),
        }
    }

    /// Returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_sample(&self, kind: &str, suffix: &str, value: impl std::fmt::Display) {
        let name = self.metric_name(suffix);
        let mut writer = self
            .writer
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let _ = writeln!(writer, "# TYPE {} {}", name, kind);
        let _ = writeln!(writer, "{} {}", name, value);
    }

    fn write_counter(&self, suffix: &str, value: u64) {
        self.write_sample("counter", suffix, value);
    }

    fn write_gauge(&self, suffix: &str, value: impl std::fmt::Display) {
        self.write_sample("gauge", suffix, value);
    }

    fn metric_name(&self, suffix: &str) -> String {
        if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}_{}", self.prefix, suffix)
        }
    }
}

impl<W: Write + Send> MetricsExporter<CacheMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &CacheMetricsSnapshot) {
        self.write_counter("hits_total", snapshot.hits);
        self.write_counter("misses_total", snapshot.misses);
        self.write_counter("inserts_total", snapshot.inserts);
        self.write_counter("updates_total", snapshot.updates);
        self.write_counter("deletes_total", snapshot.deletes);
        self.write_counter("evictions_total", snapshot.evictions);
        self.write_counter("expirations_total", snapshot.expirations);
        self.write_gauge("len", snapshot.len);
        self.write_gauge("capacity", snapshot.capacity);
        self.write_gauge("memory_used_bytes", snapshot.memory_used);
        self.write_gauge("hit_rate", snapshot.hit_rate());
    }
}

impl<W: Write + Send> MetricsExporter<FilterMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &FilterMetricsSnapshot) {
        self.write_counter("elements_added_total", snapshot.elements_added);
        self.write_counter("lookups_total", snapshot.lookups);
        self.write_counter("positive_lookups_total", snapshot.positive_lookups);
        self.write_gauge("bits_set", snapshot.bits_set);
        self.write_gauge("bit_count", snapshot.bit_count);
        self.write_gauge("hash_count", snapshot.hash_count);
        self.write_gauge("fill_ratio", snapshot.fill_ratio);
        self.write_gauge(
            "estimated_false_positive_rate",
            snapshot.estimated_false_positive_rate,
        );
    }
}

impl<W: Write + Send> MetricsExporter<BufferMetricsSnapshot> for PrometheusTextExporter<W> {
    fn export(&self, snapshot: &BufferMetricsSnapshot) {
        self.write_counter("writes_total", snapshot.writes);
        self.write_counter("reads_total", snapshot.reads);
        self.write_counter("overflows_total", snapshot.overflows);
        self.write_counter("rejected_total", snapshot.rejected);
        self.write_gauge("len", snapshot.len);
        self.write_gauge("capacity", snapshot.capacity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render<S>(prefix: &str, snapshot: &S) -> String
    where
        PrometheusTextExporter<Vec<u8>>: MetricsExporter<S>,
    {
        let exporter = PrometheusTextExporter::new(prefix, Vec::new());
        exporter.export(snapshot);
        String::from_utf8(exporter.into_inner()).unwrap()
    }

    #[test]
    fn cache_snapshot_lines() {
        let text = render(
            "tokens",
            &CacheMetricsSnapshot {
                hits: 4,
                misses: 1,
                capacity: 10,
                ..Default::default()
            },
        );
        assert!(text.contains("# TYPE tokens_hits_total counter\ntokens_hits_total 4\n"));
        assert!(text.contains("tokens_capacity 10"));
        assert!(text.contains("tokens_hit_rate 0.8"));
    }

    #[test]
    fn empty_prefix_uses_bare_names() {
        let text = render("", &BufferMetricsSnapshot::default());
        assert!(text.contains("\nwrites_total 0\n"));
    }

    #[test]
    fn filter_snapshot_lines() {
        let text = render(
            "dedup",
            &FilterMetricsSnapshot {
                hash_count: 7,
                ..Default::default()
            },
        );
        assert!(text.contains("# TYPE dedup_hash_count gauge"));
        assert!(text.contains("dedup_hash_count 7"));
    }
}
