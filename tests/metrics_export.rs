// ==============================================
// METRICS EXPORT (integration)
// ==============================================

use hotpath::metrics::PrometheusTextExporter;
use hotpath::prelude::*;

#[test]
fn all_components_export_prometheus_text() {
    let mut cache = BoundedCache::new(2).unwrap();
    cache.set(1u8, 1u8);
    cache.set(2, 2);
    cache.set(3, 3);
    cache.get(&3);

    let mut filter = MembershipFilter::new(10, 0.1).unwrap();
    filter.add("a");

    let mut buf = CircularBuffer::new(1).unwrap();
    buf.push('x');
    buf.push('y');

    let exporter = PrometheusTextExporter::new("svc", Vec::new());
    exporter.export(&cache.snapshot());
    exporter.export(&filter.snapshot());
    exporter.export(&buf.snapshot());
    let text = String::from_utf8(exporter.into_inner()).unwrap();

    assert!(text.contains("svc_evictions_total 1"));
    assert!(text.contains("svc_hits_total 1"));
    assert!(text.contains("svc_elements_added_total 1"));
    assert!(text.contains("svc_overflows_total 1"));
}

#[test]
fn reset_zeroes_counters_but_not_gauges() {
    let mut cache = BoundedCache::new(4).unwrap();
    cache.set("k", 1);
    cache.get("k");
    cache.reset_metrics();
    let snap = cache.snapshot();
    assert_eq!(snap.hits, 0);
    assert_eq!(snap.inserts, 0);
    assert_eq!(snap.len, 1);
}
