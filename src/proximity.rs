//! Single-entry danger proximity cache.
//!
//! "Am I near an enforcement camera?" is asked far more often than the
//! answer changes, so the last verdict is memoized together with the scaled
//! box it was computed for. While the query point stays inside that box the
//! cached verdict is returned as-is, even if danger records were reloaded in
//! the meantime. Staleness is bounded by the box width and is accepted.

use geo::{Distance, Haversine, Point};
use log::debug;

use crate::bbox::{BoundingBoxIndex, ScaledBox};
use crate::config::Config;
use crate::error::{ParkError, Result};
use crate::record::{validate_coordinates, AreaKind};
use crate::store::PointStore;

/// Meters per degree of latitude, also used as the equatorial meters per
/// degree of longitude before the cosine correction.
const METERS_PER_DEGREE: f64 = 111_000.0;

#[derive(Debug, Clone, Copy)]
enum CacheState {
    Empty,
    Populated { bbox: ScaledBox, result: bool },
}

/// Memoized danger-membership check with exact great-circle refinement.
#[derive(Debug)]
pub struct ProximityCache {
    search_radius_meters: f64,
    hit_radius_meters: f64,
    state: CacheState,
}

impl ProximityCache {
    pub fn new(search_radius_meters: f64, hit_radius_meters: f64) -> Self {
        Self {
            search_radius_meters,
            hit_radius_meters,
            state: CacheState::Empty,
        }
    }

    pub fn with_config(config: &Config) -> Self {
        Self::new(
            config.danger_search_radius_meters,
            config.danger_hit_radius_meters,
        )
    }

    /// Whether any danger record lies within the hit radius of the point.
    ///
    /// A cache hit (point inside the previously computed box) returns the
    /// stored verdict without touching the store. A miss recomputes: box
    /// filter over the danger kind, then haversine refinement, then the
    /// single cache entry is replaced in one assignment.
    ///
    /// Accepts the same coordinate domain as the rest of the crate, minus
    /// the poles: at latitude ±90 the cosine term is zero and the longitude
    /// half-width of the candidate box diverges.
    pub fn is_dangerous(&mut self, store: &PointStore, lat: f64, lng: f64) -> Result<bool> {
        validate_coordinates(lat, lng)?;
        if lat.abs() >= 90.0 {
            return Err(ParkError::InvalidInput(format!(
                "proximity query undefined at the poles: latitude {lat}"
            )));
        }

        let scale = store.scale();
        let lat_delta = self.search_radius_meters / METERS_PER_DEGREE;
        let lng_delta =
            self.search_radius_meters / (METERS_PER_DEGREE * lat.to_radians().cos());
        let bbox = ScaledBox::from_center(lat, lng, lat_delta, lng_delta, scale);

        if let CacheState::Populated {
            bbox: cached_bbox,
            result,
        } = self.state
        {
            if cached_bbox.contains(&bbox) {
                return Ok(result);
            }
        }

        let candidates = BoundingBoxIndex::new(store).query_scaled(AreaKind::Danger, &bbox);
        let here = Point::new(lng, lat);
        let result = candidates.iter().any(|record| {
            Haversine.distance(here, Point::new(record.lng, record.lat)) <= self.hit_radius_meters
        });
        debug!(
            "proximity recompute at ({lat:.5}, {lng:.5}): {} candidates, dangerous={result}",
            candidates.len()
        );

        self.state = CacheState::Populated { bbox, result };
        Ok(result)
    }

    /// Drops the cached verdict; the next query recomputes.
    pub fn reset(&mut self) {
        self.state = CacheState::Empty;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DangerDetail, RecordDetail};
    use crate::store::RawRecord;

    fn danger(lat: f64, lng: f64) -> RawRecord {
        RawRecord {
            lat: Some(lat),
            lng: Some(lng),
            detail: RecordDetail::Danger(DangerDetail {
                address: "camera".to_string(),
                district: String::new(),
                description: String::new(),
            }),
        }
    }

    fn store_with(records: Vec<RawRecord>) -> PointStore {
        let mut store = PointStore::new(1000, 5);
        store.load(AreaKind::Danger, records);
        store
    }

    // ~0.0002 degrees of latitude is roughly 22 meters.
    #[test]
    fn test_camera_within_hit_radius_is_dangerous() {
        let store = store_with(vec![danger(37.5002, 127.0)]);
        let mut cache = ProximityCache::new(60.0, 50.0);
        assert!(cache.is_dangerous(&store, 37.5, 127.0).unwrap());
    }

    #[test]
    fn test_camera_beyond_hit_radius_is_not_dangerous() {
        // ~0.0009 degrees of latitude is roughly 100 meters: inside the
        // candidate box but outside the 50 m hit radius.
        let store = store_with(vec![danger(37.5009, 127.0)]);
        let mut cache = ProximityCache::new(60.0, 50.0);
        assert!(!cache.is_dangerous(&store, 37.5, 127.0).unwrap());
    }

    #[test]
    fn test_no_danger_records_is_not_dangerous() {
        let store = store_with(vec![]);
        let mut cache = ProximityCache::new(60.0, 50.0);
        assert!(!cache.is_dangerous(&store, 37.5, 127.0).unwrap());
    }

    #[test]
    fn test_cache_hit_serves_stale_verdict_after_reload() {
        let mut store = store_with(vec![]);
        let mut cache = ProximityCache::new(60.0, 50.0);
        assert!(!cache.is_dangerous(&store, 37.5, 127.0).unwrap());

        // A camera appears at the query point, but the identical query is
        // still inside the cached box and keeps the old answer.
        store.load(AreaKind::Danger, vec![danger(37.5, 127.0)]);
        assert!(!cache.is_dangerous(&store, 37.5, 127.0).unwrap());

        // After a reset the fresh data is visible.
        cache.reset();
        assert!(cache.is_dangerous(&store, 37.5, 127.0).unwrap());
    }

    #[test]
    fn test_leaving_the_cached_box_recomputes() {
        let store = store_with(vec![danger(37.52, 127.0)]);
        let mut cache = ProximityCache::new(60.0, 50.0);

        assert!(!cache.is_dangerous(&store, 37.5, 127.0).unwrap());
        // Far outside the first box, right next to the camera.
        assert!(cache.is_dangerous(&store, 37.52, 127.0).unwrap());
    }

    #[test]
    fn test_rejects_polar_and_non_finite_input() {
        let store = store_with(vec![]);
        let mut cache = ProximityCache::new(60.0, 50.0);
        assert!(cache.is_dangerous(&store, 90.0, 0.0).is_err());
        assert!(cache.is_dangerous(&store, -90.0, 0.0).is_err());
        assert!(cache.is_dangerous(&store, f64::NAN, 0.0).is_err());
        assert!(cache.is_dangerous(&store, 0.0, 181.0).is_err());
    }

    // High latitudes short of the poles stay inside the accepted domain,
    // even though the candidate box gets very wide there.
    #[test]
    fn test_accepts_high_latitude_short_of_the_pole() {
        let store = store_with(vec![]);
        let mut cache = ProximityCache::new(60.0, 50.0);
        assert!(!cache.is_dangerous(&store, 89.99, 0.0).unwrap());
        assert!(!cache.is_dangerous(&store, -89.99, 10.0).unwrap());
    }
}
