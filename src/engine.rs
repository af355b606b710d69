//! Thread-safe query façade over the parking-safety core.
//!
//! `ParkWatch` wraps the single-threaded core in `Arc<RwLock<..>>`: clones
//! share state, reads run concurrently, mutations take the write lock. Cache
//! invalidation happens inside the same write-lock scope as the mutation, so
//! no reader can observe a reloaded store paired with pre-reload clusters.

use std::path::Path;
use std::sync::Arc;

use log::info;
use parking_lot::RwLock;

use crate::bbox::BoundingBoxIndex;
use crate::cluster::{ClusterBucket, GeohashClusterer};
use crate::config::Config;
use crate::error::{ParkError, Result};
use crate::nearest::NearestNeighborSelector;
use crate::proximity::ProximityCache;
use crate::record::{validate_coordinates, AreaKind, GeoRecord, ParkedLocation};
use crate::seed;
use crate::store::{LoadReport, PointStore, RawRecord};
use crate::zoom::ZoomPolicy;

/// Everything the map draws for one camera position.
///
/// Exactly one representation per kind is populated: raw points below the
/// cluster altitude, cluster buckets above it. A kind whose filter is off
/// contributes nothing in either mode.
#[derive(Debug, Clone, Default)]
pub struct MapView {
    pub safe_points: Vec<GeoRecord>,
    pub danger_points: Vec<GeoRecord>,
    pub safe_clusters: Vec<ClusterBucket>,
    pub danger_clusters: Vec<ClusterBucket>,
}

struct Core {
    config: Config,
    store: PointStore,
    clusterer: GeohashClusterer,
    proximity: ProximityCache,
    zoom: ZoomPolicy,
    nearest: NearestNeighborSelector,
}

impl Core {
    fn new(config: Config) -> Self {
        Self {
            store: PointStore::with_config(&config),
            clusterer: GeohashClusterer::new(config.geohash_precision),
            proximity: ProximityCache::with_config(&config),
            zoom: ZoomPolicy::new(config.cluster_altitude_threshold),
            nearest: NearestNeighborSelector::with_config(&config),
            config,
        }
    }

    fn count(&self, kind: AreaKind) -> usize {
        self.store.count(kind)
    }
}

/// Shared handle to the parking-safety engine. Cheap to clone.
#[derive(Clone)]
pub struct ParkWatch {
    inner: Arc<RwLock<Core>>,
}

impl Default for ParkWatch {
    fn default() -> Self {
        Self::new()
    }
}

impl ParkWatch {
    /// Engine with the default configuration.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Core::new(Config::default()))),
        }
    }

    /// Engine with a validated custom configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().map_err(ParkError::InvalidInput)?;
        Ok(Self {
            inner: Arc::new(RwLock::new(Core::new(config))),
        })
    }

    pub fn config(&self) -> Config {
        self.inner.read().config.clone()
    }

    /// Replaces all records of `kind` and drops that kind's cluster cache in
    /// the same write-lock scope.
    pub fn load(&self, kind: AreaKind, raw: Vec<RawRecord>) -> LoadReport {
        let mut core = self.inner.write();
        let report = core.store.load(kind, raw);
        core.clusterer.invalidate(kind);
        report
    }

    /// Reads a seed file for `kind` and loads it. Undecodable rows are
    /// counted into the report's skip total.
    pub fn load_seed_file(&self, kind: AreaKind, path: &Path) -> Result<LoadReport> {
        let batch = match kind {
            AreaKind::Safe => seed::read_safe_seed(path)?,
            AreaKind::Danger => seed::read_danger_seed(path)?,
        };
        let mut report = self.load(kind, batch.records);
        report.skipped += batch.undecodable;
        Ok(report)
    }

    pub fn count(&self, kind: AreaKind) -> usize {
        self.inner.read().count(kind)
    }

    /// Map content for a camera at (`center_lat`, `center_lng`) and the
    /// given altitude, honoring the per-kind display filters.
    pub fn map_view(
        &self,
        center_lat: f64,
        center_lng: f64,
        altitude_meters: f64,
        show_safe: bool,
        show_danger: bool,
    ) -> Result<MapView> {
        validate_coordinates(center_lat, center_lng)?;

        let mut view = MapView::default();
        if !show_safe && !show_danger {
            return Ok(view);
        }

        // Cluster mode may fill the cache, so it needs the write lock. Raw
        // mode is read-only.
        let cluster_mode = {
            let core = self.inner.read();
            core.zoom.is_cluster_mode(altitude_meters)
        };

        if cluster_mode {
            let mut core = self.inner.write();
            let Core {
                store, clusterer, ..
            } = &mut *core;
            if show_safe {
                view.safe_clusters = clusterer.cluster_all(store, AreaKind::Safe).to_vec();
            }
            if show_danger {
                view.danger_clusters = clusterer.cluster_all(store, AreaKind::Danger).to_vec();
            }
        } else {
            let core = self.inner.read();
            let delta = core.zoom.delta(altitude_meters);
            let index = BoundingBoxIndex::new(&core.store);
            if show_safe {
                view.safe_points = index
                    .query_box(AreaKind::Safe, center_lat, center_lng, delta)
                    .into_iter()
                    .cloned()
                    .collect();
            }
            if show_danger {
                view.danger_points = index
                    .query_box(AreaKind::Danger, center_lat, center_lng, delta)
                    .into_iter()
                    .cloned()
                    .collect();
            }
        }
        Ok(view)
    }

    /// Up to `nearest_k` safe parking records around the point, nearest
    /// first.
    pub fn closest_parking(&self, lat: f64, lng: f64) -> Result<Vec<GeoRecord>> {
        validate_coordinates(lat, lng)?;
        let core = self.inner.read();
        Ok(core
            .nearest
            .closest_k(&core.store, lat, lng)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Whether any enforcement camera lies within the hit radius of the
    /// point. Takes the write lock: the answer is memoized.
    pub fn is_dangerous(&self, lat: f64, lng: f64) -> Result<bool> {
        let mut core = self.inner.write();
        let Core {
            store, proximity, ..
        } = &mut *core;
        proximity.is_dangerous(store, lat, lng)
    }

    /// Remembers where the car is parked, replacing any previous spot.
    pub fn save_parked(&self, location: ParkedLocation) {
        self.inner.write().store.save_parked(location);
    }

    pub fn clear_parked(&self) {
        self.inner.write().store.clear_parked();
    }

    pub fn parked(&self) -> Option<ParkedLocation> {
        self.inner.read().store.parked().cloned()
    }

    /// Rebuilds every record's indexes under a new coordinate scale.
    /// All-or-nothing: on error the store is unchanged. On success both
    /// cluster caches and the proximity cache are dropped, since cached
    /// geometry from the old scale is meaningless.
    pub fn reindex(&self, new_scale: i64) -> Result<()> {
        let mut core = self.inner.write();
        core.store.reindex(new_scale)?;
        core.config.coordinate_scale = new_scale;
        core.clusterer.invalidate_all();
        core.proximity.reset();
        info!("reindexed store to coordinate scale {new_scale}");
        Ok(())
    }
}
