use crate::config::{CACHE_TTL_SECS, INVENTORY_SOURCE, SHEET_ID};
use crate::inventory::{Vehicle, catalog, normalize};
use crate::sheets::{IngestError, SheetClient, decode_table, map_rows};
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// The two inventory sources behind one consumption contract. Dispatch is an
/// enum rather than a boxed async trait: there are exactly two variants and
/// nothing downstream needs to add more.
pub enum VehicleProvider {
    Sheet(SpreadsheetProvider),
    Static(StaticProvider),
}

impl VehicleProvider {
    pub fn from_env() -> Self {
        if INVENTORY_SOURCE.as_str() == "static" {
            info!(target = "lotline.inventory", "serving the static catalog");
            VehicleProvider::Static(StaticProvider::new())
        } else {
            VehicleProvider::Sheet(SpreadsheetProvider::from_env())
        }
    }

    /// The sole operation presentation code consumes. Always resolves; every
    /// ingestion failure degrades to an empty snapshot and a log line.
    pub async fn vehicles(&self) -> Arc<Vec<Vehicle>> {
        match self {
            VehicleProvider::Sheet(provider) => provider.vehicles().await,
            VehicleProvider::Static(provider) => provider.vehicles(),
        }
    }
}

pub struct StaticProvider {
    vehicles: Arc<Vec<Vehicle>>,
}

impl Default for StaticProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl StaticProvider {
    pub fn new() -> Self {
        Self {
            vehicles: Arc::new(catalog::fallback_catalog()),
        }
    }

    pub fn vehicles(&self) -> Arc<Vec<Vehicle>> {
        self.vehicles.clone()
    }
}

pub struct SpreadsheetProvider {
    sheet_id: Option<String>,
    client: SheetClient,
    cache: SnapshotCache,
}

impl SpreadsheetProvider {
    pub fn new(sheet_id: Option<String>, ttl: Duration) -> Self {
        Self {
            sheet_id,
            client: SheetClient::new(),
            cache: SnapshotCache::new(ttl),
        }
    }

    pub fn from_env() -> Self {
        Self::new(SHEET_ID.clone(), Duration::from_secs(*CACHE_TTL_SECS))
    }

    pub async fn vehicles(&self) -> Arc<Vec<Vehicle>> {
        self.cache.get_or_refresh(|| self.ingest()).await
    }

    /// One fetch -> decode -> map -> normalize pass. A missing sheet id short
    /// circuits before any network call.
    async fn ingest(&self) -> Vec<Vehicle> {
        let Some(sheet_id) = self.sheet_id.as_deref() else {
            let err = IngestError::MissingConfig;
            warn!(target = "lotline.sheets", error = %err, "serving empty inventory");
            crate::metrics::ingest_outcome(err.label(), 0);
            return Vec::new();
        };

        match self.client.fetch_body(sheet_id).await {
            Ok(body) => Self::snapshot_from_body(&body),
            Err(err) => {
                warn!(target = "lotline.sheets", error = %err, "serving empty inventory");
                crate::metrics::ingest_outcome(err.label(), 0);
                Vec::new()
            }
        }
    }

    /// Decode -> map -> normalize for one fetched body. Every failure in the
    /// chain degrades to an empty snapshot and a log line; a row is never
    /// dropped by a neighbouring bad row.
    fn snapshot_from_body(body: &str) -> Vec<Vehicle> {
        match decode_table(body) {
            Ok(table) => {
                let rows = map_rows(&table);
                let vehicles = normalize::normalize_rows(&rows);
                info!(
                    target = "lotline.sheets",
                    rows = rows.len(),
                    vehicles = vehicles.len(),
                    "inventory ingested"
                );
                crate::metrics::ingest_outcome("ok", vehicles.len());
                vehicles
            }
            Err(err) => {
                warn!(target = "lotline.sheets", error = %err, "serving empty inventory");
                crate::metrics::ingest_outcome(err.label(), 0);
                Vec::new()
            }
        }
    }
}

/// Process-wide snapshot with a staleness window. The slot lock is held
/// across a refresh, so overlapping callers inside the window wait for the
/// one in-flight fetch instead of each hitting the upstream. A failed pass
/// caches its empty snapshot for the same window, which keeps a broken
/// upstream from being re-fetched on every request.
pub struct SnapshotCache {
    ttl: Duration,
    slot: Mutex<Option<Snapshot>>,
}

struct Snapshot {
    taken_at: Instant,
    vehicles: Arc<Vec<Vehicle>>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            slot: Mutex::new(None),
        }
    }

    pub async fn get_or_refresh<F, Fut>(&self, refresh: F) -> Arc<Vec<Vehicle>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Vec<Vehicle>>,
    {
        let mut guard = self.slot.lock().await;
        if let Some(snapshot) = guard.as_ref()
            && snapshot.taken_at.elapsed() < self.ttl
        {
            return snapshot.vehicles.clone();
        }

        let vehicles = Arc::new(refresh().await);
        *guard = Some(Snapshot {
            taken_at: Instant::now(),
            vehicles: vehicles.clone(),
        });
        vehicles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn one_vehicle(id: &str) -> Vec<Vehicle> {
        vec![Vehicle {
            id: id.to_string(),
            title: id.to_string(),
            ..Vehicle::default()
        }]
    }

    #[tokio::test]
    async fn fresh_snapshot_skips_refresh() {
        let cache = SnapshotCache::new(Duration::from_secs(60));
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_refresh(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { one_vehicle("lot-1") }
            })
            .await;
        let second = cache
            .get_or_refresh(|| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { one_vehicle("lot-2") }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(first[0].id, "lot-1");
        assert_eq!(second[0].id, "lot-1");
    }

    #[tokio::test]
    async fn expired_snapshot_triggers_refresh() {
        let cache = SnapshotCache::new(Duration::from_secs(0));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            cache
                .get_or_refresh(|| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Vec::new() }
                })
                .await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn missing_sheet_id_yields_empty_without_network() {
        let provider = SpreadsheetProvider::new(None, Duration::from_secs(60));
        let vehicles = provider.vehicles().await;
        assert!(vehicles.is_empty());
    }

    #[test]
    fn markup_body_degrades_to_an_empty_snapshot() {
        // An unpublished sheet answers the export URL with a sign-in page.
        let vehicles =
            SpreadsheetProvider::snapshot_from_body("<html><body>sign in</body></html>");
        assert!(vehicles.is_empty());
    }

    #[test]
    fn callback_body_flows_through_to_vehicles() {
        let body = concat!(
            "google.visualization.Query.setResponse({\"table\":{",
            "\"cols\":[{\"label\":\"ID\"},{\"label\":\"Make\"}],",
            "\"rows\":[{\"c\":[{\"v\":\"lot-1\"},{\"v\":\"Toyota\"}]}]}});"
        );
        let vehicles = SpreadsheetProvider::snapshot_from_body(body);
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].id, "lot-1");
        assert_eq!(vehicles[0].make, "Toyota");
    }

    #[tokio::test]
    async fn static_provider_serves_the_catalog() {
        let provider = VehicleProvider::Static(StaticProvider::new());
        let vehicles = provider.vehicles().await;
        assert_eq!(*vehicles, catalog::fallback_catalog());
    }
}
