use tracing::trace;

// Trace-based counters; the Prometheus recorder in main picks up nothing from
// these, they exist so operators can follow traffic with RUST_LOG alone.

pub fn inc_requests(route: &'static str) {
    trace!(
        target = "lotline.metrics",
        route = route,
        "requests_total_inc"
    );
}

pub fn ingest_outcome(outcome: &'static str, vehicles: usize) {
    trace!(
        target = "lotline.metrics",
        outcome = outcome,
        vehicles = vehicles,
        "ingest_pass"
    );
}

pub fn lead_relayed(kind: &'static str, ok: bool) {
    trace!(
        target = "lotline.metrics",
        kind = kind,
        ok = ok,
        "lead_relayed"
    );
}
