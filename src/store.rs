//! In-process store owning the two record collections and the parked row.

use crate::config::Config;
use crate::error::{ParkError, Result};
use crate::record::{
    scale_coordinate, validate_coordinates, AreaKind, GeoRecord, ParkedLocation, RecordDetail,
};

/// A record as it arrives from the ingest boundary: coordinates already
/// coerced to numbers (or absent, if coercion failed) plus the kind-specific
/// display payload.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub detail: RecordDetail,
}

/// Aggregate outcome of a seed load. Malformed records never abort the load;
/// they are skipped and counted here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub skipped: usize,
}

/// Owner of all [`GeoRecord`]s and the single [`ParkedLocation`] row.
///
/// Plain single-threaded struct; the query façade wraps it in a read-write
/// lock for the single-writer / multi-reader discipline. Derived caches
/// (cluster buckets, the proximity memo) live outside the store and must be
/// invalidated by whoever mutates it.
#[derive(Debug)]
pub struct PointStore {
    scale: i64,
    geohash_precision: usize,
    safe: Vec<GeoRecord>,
    danger: Vec<GeoRecord>,
    parked: Option<ParkedLocation>,
}

impl PointStore {
    pub fn new(scale: i64, geohash_precision: usize) -> Self {
        Self {
            scale,
            geohash_precision,
            safe: Vec::new(),
            danger: Vec::new(),
            parked: None,
        }
    }

    pub fn with_config(config: &Config) -> Self {
        Self::new(config.coordinate_scale, config.geohash_precision)
    }

    /// The canonical coordinate scale of every record in this store.
    pub fn scale(&self) -> i64 {
        self.scale
    }

    /// Ingest raw records of one kind, computing indexes and geohashes.
    ///
    /// Replaces the kind's previous records wholesale; a load is a full seed
    /// refresh, never an incremental append. Individual malformed records
    /// (missing or invalid coordinates, payload of the wrong kind) are
    /// skipped, counted, and logged; the rest of the batch still loads.
    pub fn load(&mut self, kind: AreaKind, raw: Vec<RawRecord>) -> LoadReport {
        let mut report = LoadReport::default();
        self.records_mut(kind).clear();

        for entry in raw {
            if entry.detail.kind() != kind {
                log::warn!(
                    "skipping seed record: {} payload in a {} load",
                    entry.detail.kind(),
                    kind
                );
                report.skipped += 1;
                continue;
            }

            let (lat, lng) = match (entry.lat, entry.lng) {
                (Some(lat), Some(lng)) => (lat, lng),
                _ => {
                    log::warn!("skipping {} seed record without coordinates", kind);
                    report.skipped += 1;
                    continue;
                }
            };

            match GeoRecord::new(lat, lng, entry.detail, self.scale, self.geohash_precision) {
                Ok(record) => {
                    self.records_mut(kind).push(record);
                    report.loaded += 1;
                }
                Err(e) => {
                    log::warn!("skipping malformed {} seed record: {e}", kind);
                    report.skipped += 1;
                }
            }
        }

        log::info!(
            "loaded {} {} records ({} skipped)",
            report.loaded,
            kind,
            report.skipped
        );
        report
    }

    /// Every record of a kind, in insertion order.
    pub fn all(&self, kind: AreaKind) -> &[GeoRecord] {
        match kind {
            AreaKind::Safe => &self.safe,
            AreaKind::Danger => &self.danger,
        }
    }

    pub fn count(&self, kind: AreaKind) -> usize {
        self.all(kind).len()
    }

    /// Upsert the parked-location row. Replaces any existing row; the store
    /// never accumulates more than one.
    pub fn save_parked(&mut self, location: ParkedLocation) {
        log::debug!("parked location saved at ({}, {})", location.lat, location.lng);
        self.parked = Some(location);
    }

    /// Clear the parked-location row.
    pub fn clear_parked(&mut self) {
        self.parked = None;
    }

    /// The most recently saved parked location, if any.
    pub fn parked(&self) -> Option<&ParkedLocation> {
        self.parked.as_ref()
    }

    /// Recompute every record's scaled indexes under a new scale.
    ///
    /// All-or-nothing: both collections are rebuilt in full before either is
    /// swapped in, so a failure leaves the store exactly as it was.
    pub fn reindex(&mut self, new_scale: i64) -> Result<()> {
        let safe = migrate_records(self.scale, new_scale, &self.safe)?;
        let danger = migrate_records(self.scale, new_scale, &self.danger)?;

        log::info!(
            "reindexed {} safe and {} danger records from scale {} to {}",
            safe.len(),
            danger.len(),
            self.scale,
            new_scale
        );

        self.safe = safe;
        self.danger = danger;
        self.scale = new_scale;
        Ok(())
    }

    fn records_mut(&mut self, kind: AreaKind) -> &mut Vec<GeoRecord> {
        match kind {
            AreaKind::Safe => &mut self.safe,
            AreaKind::Danger => &mut self.danger,
        }
    }
}

/// Pure scale migration: recompute `lat_index`/`lng_index` for every record
/// under `new_scale`, validating everything before producing output.
///
/// Testable independent of any store. Returns the full migrated set or an
/// error with nothing partially rewritten.
pub fn migrate_records(
    old_scale: i64,
    new_scale: i64,
    records: &[GeoRecord],
) -> Result<Vec<GeoRecord>> {
    if new_scale <= 0 {
        return Err(ParkError::Migration(format!(
            "target scale must be positive, got {new_scale}"
        )));
    }

    let mut migrated = Vec::with_capacity(records.len());
    for record in records {
        validate_coordinates(record.lat, record.lng).map_err(|e| {
            ParkError::Migration(format!("record {} has invalid coordinates: {e}", record.id))
        })?;

        let expected_lat = scale_coordinate(record.lat, old_scale);
        let expected_lng = scale_coordinate(record.lng, old_scale);
        if record.lat_index != expected_lat || record.lng_index != expected_lng {
            return Err(ParkError::Migration(format!(
                "record {} indexes do not match scale {old_scale}",
                record.id
            )));
        }

        let mut updated = record.clone();
        updated.lat_index = scale_coordinate(record.lat, new_scale);
        updated.lng_index = scale_coordinate(record.lng, new_scale);
        migrated.push(updated);
    }

    Ok(migrated)
}
