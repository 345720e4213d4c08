pub mod cell;
pub mod exporter;
pub mod snapshot;
pub mod traits;

pub use exporter::PrometheusTextExporter;
pub use snapshot::{BufferMetricsSnapshot, CacheMetricsSnapshot, FilterMetricsSnapshot};
pub use traits::{MetricsExporter, MetricsReset, MetricsSnapshotProvider};
