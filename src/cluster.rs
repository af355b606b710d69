//! Geohash-prefix clustering with centroid aggregation.
//!
//! Zoomed-out views summarize the *entire* record set of a kind, never a
//! viewport slice, so the result depends only on store content and is cached
//! until a mutation of that kind invalidates it.

use crate::record::{AreaKind, GeoRecord};
use crate::store::PointStore;
use rustc_hash::FxHashMap;

/// One zoomed-out marker: a geohash prefix, the arithmetic-mean centroid of
/// its members, and the member count. Derived, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterBucket {
    pub prefix: String,
    pub centroid_lat: f64,
    pub centroid_lng: f64,
    pub count: usize,
}

/// Groups a kind's full record set by geohash prefix, caching the result.
///
/// Determinism: members are accumulated in store order with a plain
/// left-to-right sum, and buckets are sorted by prefix, so identical record
/// sets always yield identical keys and centroids.
#[derive(Debug, Default)]
pub struct GeohashClusterer {
    precision: usize,
    safe: Option<Vec<ClusterBucket>>,
    danger: Option<Vec<ClusterBucket>>,
}

impl GeohashClusterer {
    pub fn new(precision: usize) -> Self {
        Self {
            precision,
            safe: None,
            danger: None,
        }
    }

    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Cluster every record of `kind`, computing lazily on first call and
    /// serving the cache afterwards.
    pub fn cluster_all(&mut self, store: &PointStore, kind: AreaKind) -> &[ClusterBucket] {
        let precision = self.precision;
        let slot = self.slot_mut(kind);
        if slot.is_none() {
            *slot = Some(compute_buckets(store.all(kind), precision));
        }
        self.slot_mut(kind).as_deref().unwrap_or(&[])
    }

    /// Cached buckets for a kind, if any. Never triggers a computation.
    pub fn cached(&self, kind: AreaKind) -> Option<&[ClusterBucket]> {
        match kind {
            AreaKind::Safe => self.safe.as_deref(),
            AreaKind::Danger => self.danger.as_deref(),
        }
    }

    /// Drop the cached buckets for one kind. Must be called synchronously by
    /// whoever mutates the store's records of that kind, before any reader
    /// can observe the post-mutation store.
    pub fn invalidate(&mut self, kind: AreaKind) {
        log::debug!("invalidating {} cluster cache", kind);
        *self.slot_mut(kind) = None;
    }

    pub fn invalidate_all(&mut self) {
        self.safe = None;
        self.danger = None;
    }

    fn slot_mut(&mut self, kind: AreaKind) -> &mut Option<Vec<ClusterBucket>> {
        match kind {
            AreaKind::Safe => &mut self.safe,
            AreaKind::Danger => &mut self.danger,
        }
    }
}

fn compute_buckets(records: &[GeoRecord], precision: usize) -> Vec<ClusterBucket> {
    struct Accumulator {
        lat_sum: f64,
        lng_sum: f64,
        count: usize,
    }

    // Geohashes are ASCII base-32, so byte slicing cannot split a character.
    let mut groups: FxHashMap<&str, Accumulator> = FxHashMap::default();
    for record in records {
        let prefix = &record.geohash[..precision.min(record.geohash.len())];
        let acc = groups.entry(prefix).or_insert(Accumulator {
            lat_sum: 0.0,
            lng_sum: 0.0,
            count: 0,
        });
        acc.lat_sum += record.lat;
        acc.lng_sum += record.lng;
        acc.count += 1;
    }

    let mut buckets: Vec<ClusterBucket> = groups
        .into_iter()
        .map(|(prefix, acc)| ClusterBucket {
            prefix: prefix.to_string(),
            centroid_lat: acc.lat_sum / acc.count as f64,
            centroid_lng: acc.lng_sum / acc.count as f64,
            count: acc.count,
        })
        .collect();
    buckets.sort_by(|a, b| a.prefix.cmp(&b.prefix));
    buckets
}
