//! Scaled-integer bounding boxes and the rectangular range filter.
//!
//! A box query is a deliberate approximation of a circular radius search:
//! two inclusive integer interval tests per candidate instead of a
//! trigonometric distance. Exact great-circle refinement happens only in the
//! danger-membership check ([`crate::proximity`]).

use crate::record::{scale_coordinate, GeoRecord};
use crate::store::PointStore;
use crate::AreaKind;

/// An inclusive range of scaled-index values along one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledRange {
    pub min: i64,
    pub max: i64,
}

impl ScaledRange {
    /// Range covering `center ± delta` degrees: both bounds are rounded
    /// after the offset is applied, matching how record indexes are built.
    pub fn from_center(center: f64, delta: f64, scale: i64) -> Self {
        Self {
            min: scale_coordinate(center - delta, scale),
            max: scale_coordinate(center + delta, scale),
        }
    }

    #[inline]
    pub fn contains_value(&self, value: i64) -> bool {
        self.min <= value && value <= self.max
    }

    /// Whether `other` lies entirely inside this range.
    #[inline]
    pub fn contains(&self, other: &ScaledRange) -> bool {
        self.min <= other.min && other.max <= self.max
    }
}

/// A rectangle in scaled-index space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaledBox {
    pub lat: ScaledRange,
    pub lng: ScaledRange,
}

impl ScaledBox {
    pub fn from_center(
        center_lat: f64,
        center_lng: f64,
        lat_delta: f64,
        lng_delta: f64,
        scale: i64,
    ) -> Self {
        Self {
            lat: ScaledRange::from_center(center_lat, lat_delta, scale),
            lng: ScaledRange::from_center(center_lng, lng_delta, scale),
        }
    }

    /// Square box with the same delta on both axes.
    pub fn from_center_square(center_lat: f64, center_lng: f64, delta: f64, scale: i64) -> Self {
        Self::from_center(center_lat, center_lng, delta, delta, scale)
    }

    #[inline]
    pub fn contains_record(&self, record: &GeoRecord) -> bool {
        self.lat.contains_value(record.lat_index) && self.lng.contains_value(record.lng_index)
    }

    /// Whether `other` lies entirely inside this box on both axes.
    #[inline]
    pub fn contains(&self, other: &ScaledBox) -> bool {
        self.lat.contains(&other.lat) && self.lng.contains(&other.lng)
    }
}

/// Rectangular range filter over a kind's records.
///
/// Borrows the store for the duration of a query; knows nothing about zoom
/// levels or clustering. Results keep source order so repeat queries over an
/// unchanged store are deterministic.
pub struct BoundingBoxIndex<'a> {
    store: &'a PointStore,
}

impl<'a> BoundingBoxIndex<'a> {
    pub fn new(store: &'a PointStore) -> Self {
        Self { store }
    }

    /// All records of `kind` whose indexes fall inside `center ± delta`,
    /// bounds inclusive. An empty result is a valid answer, not an error.
    pub fn query_box(
        &self,
        kind: AreaKind,
        center_lat: f64,
        center_lng: f64,
        delta: f64,
    ) -> Vec<&'a GeoRecord> {
        let bbox =
            ScaledBox::from_center_square(center_lat, center_lng, delta, self.store.scale());
        self.query_scaled(kind, &bbox)
    }

    /// Range filter against an already-scaled box.
    pub fn query_scaled(&self, kind: AreaKind, bbox: &ScaledBox) -> Vec<&'a GeoRecord> {
        self.store
            .all(kind)
            .iter()
            .filter(|record| bbox.contains_record(record))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DangerDetail, RecordDetail};
    use crate::store::{PointStore, RawRecord};

    fn danger(lat: f64, lng: f64) -> RawRecord {
        RawRecord {
            lat: Some(lat),
            lng: Some(lng),
            detail: RecordDetail::Danger(DangerDetail {
                address: String::new(),
                district: String::new(),
                description: String::new(),
            }),
        }
    }

    fn seeded_store(records: Vec<RawRecord>) -> PointStore {
        let mut store = PointStore::new(1000, 5);
        let report = store.load(AreaKind::Danger, records);
        assert_eq!(report.skipped, 0);
        store
    }

    #[test]
    fn test_query_box_inclusive_bounds() {
        // Center 37.500 with delta 0.002 at scale 1000 covers indexes
        // 37498..=37502 inclusive.
        let store = seeded_store(vec![
            danger(37.498, 127.0), // exactly on the lower edge
            danger(37.502, 127.0), // exactly on the upper edge
            danger(37.503, 127.0), // one index unit outside
            danger(37.497, 127.0), // one index unit outside
        ]);

        let index = BoundingBoxIndex::new(&store);
        let hits = index.query_box(AreaKind::Danger, 37.5, 127.0, 0.002);

        let lat_indexes: Vec<i64> = hits.iter().map(|r| r.lat_index).collect();
        assert_eq!(lat_indexes, vec![37498, 37502]);
    }

    #[test]
    fn test_query_box_preserves_source_order() {
        let store = seeded_store(vec![
            danger(37.501, 127.001),
            danger(37.499, 126.999),
            danger(37.500, 127.000),
        ]);

        let index = BoundingBoxIndex::new(&store);
        let hits = index.query_box(AreaKind::Danger, 37.5, 127.0, 0.002);

        let lats: Vec<f64> = hits.iter().map(|r| r.lat).collect();
        assert_eq!(lats, vec![37.501, 37.499, 37.500]);
    }

    #[test]
    fn test_query_box_empty_result_is_ok() {
        let store = seeded_store(vec![danger(37.5, 127.0)]);
        let index = BoundingBoxIndex::new(&store);
        let hits = index.query_box(AreaKind::Danger, 35.0, 129.0, 0.002);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_scaled_range_containment() {
        let outer = ScaledRange { min: 10, max: 20 };
        let inner = ScaledRange { min: 12, max: 18 };
        let straddling = ScaledRange { min: 8, max: 15 };

        assert!(outer.contains(&inner));
        assert!(outer.contains(&outer));
        assert!(!outer.contains(&straddling));
        assert!(!inner.contains(&outer));
    }

    #[test]
    fn test_scaled_box_containment_requires_both_axes() {
        let outer = ScaledBox {
            lat: ScaledRange { min: 0, max: 10 },
            lng: ScaledRange { min: 0, max: 10 },
        };
        let inside = ScaledBox {
            lat: ScaledRange { min: 2, max: 8 },
            lng: ScaledRange { min: 2, max: 8 },
        };
        let lng_outside = ScaledBox {
            lat: ScaledRange { min: 2, max: 8 },
            lng: ScaledRange { min: 2, max: 12 },
        };

        assert!(outer.contains(&inside));
        assert!(!outer.contains(&lng_outside));
    }
}
