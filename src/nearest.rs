//! Nearest-parking selection over a fixed-width candidate box.
//!
//! Distance here is `(Δlat_index)² + (Δlng_index)²` in scaled-index units: a
//! deliberately cheap ranking proxy, not meters. The candidate box is always
//! the same width regardless of zoom, so the bottom-panel list is stable
//! while the map zooms.

use crate::bbox::BoundingBoxIndex;
use crate::config::Config;
use crate::record::{scale_coordinate, AreaKind, GeoRecord};
use crate::store::PointStore;

/// Ranks safe-parking candidates around a center by squared index distance.
#[derive(Debug, Clone, Copy)]
pub struct NearestNeighborSelector {
    delta_degrees: f64,
    k: usize,
}

impl NearestNeighborSelector {
    pub fn new(delta_degrees: f64, k: usize) -> Self {
        Self { delta_degrees, k }
    }

    pub fn with_config(config: &Config) -> Self {
        Self::new(config.nearest_delta_degrees, config.nearest_k)
    }

    /// Up to `k` safe records nearest to the center, ascending by squared
    /// index distance. Ties keep their source order (stable sort), and fewer
    /// than `k` results simply means the box held fewer candidates.
    pub fn closest_k<'a>(
        &self,
        store: &'a PointStore,
        center_lat: f64,
        center_lng: f64,
    ) -> Vec<&'a GeoRecord> {
        let scale = store.scale();
        let center_lat_index = scale_coordinate(center_lat, scale);
        let center_lng_index = scale_coordinate(center_lng, scale);

        let mut candidates = BoundingBoxIndex::new(store).query_box(
            AreaKind::Safe,
            center_lat,
            center_lng,
            self.delta_degrees,
        );

        candidates.sort_by_key(|record| {
            squared_index_distance(record, center_lat_index, center_lng_index)
        });
        candidates.truncate(self.k);
        candidates
    }
}

#[inline]
fn squared_index_distance(record: &GeoRecord, center_lat_index: i64, center_lng_index: i64) -> i64 {
    let d_lat = record.lat_index - center_lat_index;
    let d_lng = record.lng_index - center_lng_index;
    d_lat * d_lat + d_lng * d_lng
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{RecordDetail, SafeDetail};
    use crate::store::RawRecord;

    fn safe(lat: f64, lng: f64, name: &str) -> RawRecord {
        RawRecord {
            lat: Some(lat),
            lng: Some(lng),
            detail: RecordDetail::Safe(SafeDetail {
                name: name.to_string(),
                address: String::new(),
                is_paid: false,
                is_night_free: false,
                is_holiday_free: false,
                weekday_open: None,
                weekday_close: None,
                weekend_open: None,
                weekend_close: None,
                holiday_open: None,
                holiday_close: None,
                base_charge: None,
                base_time_minutes: None,
                extra_charge: None,
                extra_unit_minutes: None,
                daily_max_charge: None,
            }),
        }
    }

    fn seeded_store(records: Vec<RawRecord>) -> PointStore {
        let mut store = PointStore::new(1000, 5);
        store.load(AreaKind::Safe, records);
        store
    }

    #[test]
    fn test_results_ascend_by_squared_index_distance() {
        let store = seeded_store(vec![
            safe(37.510, 127.010, "far"),
            safe(37.500, 127.001, "near"),
            safe(37.505, 127.005, "mid"),
        ]);

        let selector = NearestNeighborSelector::new(0.02, 20);
        let results = selector.closest_k(&store, 37.5, 127.0);

        let names: Vec<&str> = results.iter().map(|r| r.title()).collect();
        assert_eq!(names, vec!["near", "mid", "far"]);
    }

    #[test]
    fn test_at_most_k_results() {
        let records = (0..30)
            .map(|i| safe(37.5 + i as f64 * 0.0003, 127.0, "lot"))
            .collect();
        let store = seeded_store(records);

        let selector = NearestNeighborSelector::new(0.02, 20);
        assert_eq!(selector.closest_k(&store, 37.5, 127.0).len(), 20);
    }

    #[test]
    fn test_fewer_candidates_than_k_is_fine() {
        let store = seeded_store(vec![safe(37.5, 127.0, "only")]);
        let selector = NearestNeighborSelector::new(0.02, 20);
        assert_eq!(selector.closest_k(&store, 37.5, 127.0).len(), 1);
    }

    #[test]
    fn test_every_result_lies_in_the_fixed_box() {
        let store = seeded_store(vec![
            safe(37.500, 127.000, "in"),
            safe(37.530, 127.000, "out"), // outside the 0.02-degree box
        ]);

        let selector = NearestNeighborSelector::new(0.02, 20);
        let results = selector.closest_k(&store, 37.5, 127.0);
        let in_box = BoundingBoxIndex::new(&store).query_box(AreaKind::Safe, 37.5, 127.0, 0.02);

        for record in &results {
            assert!(in_box.iter().any(|r| r.id == record.id));
        }
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_ties_keep_source_order() {
        // Symmetric offsets produce equal squared distances.
        let store = seeded_store(vec![
            safe(37.501, 127.000, "first"),
            safe(37.499, 127.000, "second"),
        ]);

        let selector = NearestNeighborSelector::new(0.02, 20);
        let names: Vec<&str> = selector
            .closest_k(&store, 37.5, 127.0)
            .iter()
            .map(|r| r.title())
            .collect();
        assert_eq!(names, vec!["first", "second"]);
    }
}
