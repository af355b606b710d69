//! Record types for the two geotagged collections and the parked-location row.

use crate::error::{ParkError, Result};
use std::fmt;
use std::time::SystemTime;
use uuid::Uuid;

/// The two independent record collections the core indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AreaKind {
    /// Public parking areas safe to park in.
    Safe,
    /// Camera-enforced no-parking zones.
    Danger,
}

impl AreaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AreaKind::Safe => "safe",
            AreaKind::Danger => "danger",
        }
    }
}

impl fmt::Display for AreaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Display fields for a safe parking area.
///
/// Operating-hour fields hold raw "HHMM" strings as delivered upstream;
/// pricing fields are integers in the upstream currency unit. All are
/// optional because the source feed omits them freely.
#[derive(Debug, Clone, PartialEq)]
pub struct SafeDetail {
    pub name: String,
    pub address: String,
    pub is_paid: bool,
    pub is_night_free: bool,
    pub is_holiday_free: bool,
    pub weekday_open: Option<String>,
    pub weekday_close: Option<String>,
    pub weekend_open: Option<String>,
    pub weekend_close: Option<String>,
    pub holiday_open: Option<String>,
    pub holiday_close: Option<String>,
    pub base_charge: Option<i64>,
    pub base_time_minutes: Option<i64>,
    pub extra_charge: Option<i64>,
    pub extra_unit_minutes: Option<i64>,
    pub daily_max_charge: Option<i64>,
}

/// Display fields for an enforcement-camera zone.
#[derive(Debug, Clone, PartialEq)]
pub struct DangerDetail {
    pub address: String,
    pub district: String,
    pub description: String,
}

/// Kind-specific payload of a [`GeoRecord`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordDetail {
    Safe(SafeDetail),
    Danger(DangerDetail),
}

impl RecordDetail {
    pub fn kind(&self) -> AreaKind {
        match self {
            RecordDetail::Safe(_) => AreaKind::Safe,
            RecordDetail::Danger(_) => AreaKind::Danger,
        }
    }
}

/// A geotagged record with precomputed scaled-integer indexes and a geohash.
///
/// Immutable after creation; the only sanctioned rewrite of the index fields
/// is the explicit scale migration in
/// [`PointStore::reindex`](crate::store::PointStore::reindex).
#[derive(Debug, Clone, PartialEq)]
pub struct GeoRecord {
    pub id: Uuid,
    pub kind: AreaKind,
    pub lat: f64,
    pub lng: f64,
    /// `round(lat * scale)` for integer range comparisons.
    pub lat_index: i64,
    /// `round(lng * scale)` for integer range comparisons.
    pub lng_index: i64,
    /// Base-32 geohash used only for prefix bucketing.
    pub geohash: String,
    pub detail: RecordDetail,
}

impl GeoRecord {
    /// Build a record, computing its scaled indexes and geohash.
    ///
    /// Rejects non-finite or out-of-range coordinates; ingest treats that
    /// rejection as a skippable malformed record.
    pub fn new(
        lat: f64,
        lng: f64,
        detail: RecordDetail,
        scale: i64,
        geohash_precision: usize,
    ) -> Result<Self> {
        validate_coordinates(lat, lng)?;

        let geohash = encode_geohash(lat, lng, geohash_precision)?;

        Ok(Self {
            id: Uuid::new_v4(),
            kind: detail.kind(),
            lat,
            lng,
            lat_index: scale_coordinate(lat, scale),
            lng_index: scale_coordinate(lng, scale),
            geohash,
            detail,
        })
    }

    /// Short human-readable label for list display.
    pub fn title(&self) -> &str {
        match &self.detail {
            RecordDetail::Safe(d) => &d.name,
            RecordDetail::Danger(d) => &d.description,
        }
    }
}

/// The single "where I parked" row.
///
/// The store physically holds at most one; saving replaces any existing row
/// and deleting clears it, so the most-recently-saved location always wins.
#[derive(Debug, Clone, PartialEq)]
pub struct ParkedLocation {
    pub lat: f64,
    pub lng: f64,
    pub title: String,
    pub image_ref: Option<String>,
    pub saved_at: SystemTime,
}

impl ParkedLocation {
    pub fn new(lat: f64, lng: f64, title: impl Into<String>, image_ref: Option<String>) -> Self {
        Self {
            lat,
            lng,
            title: title.into(),
            image_ref,
            saved_at: SystemTime::now(),
        }
    }
}

/// Scale a coordinate into its integer index: `round(value * scale)`.
#[inline]
pub fn scale_coordinate(value: f64, scale: i64) -> i64 {
    (value * scale as f64).round() as i64
}

/// Validate that a coordinate pair is finite and within geographic range.
pub fn validate_coordinates(lat: f64, lng: f64) -> Result<()> {
    if !lat.is_finite() || !lng.is_finite() {
        return Err(ParkError::InvalidInput(format!(
            "coordinates must be finite, got ({lat}, {lng})"
        )));
    }
    if !(-90.0..=90.0).contains(&lat) {
        return Err(ParkError::InvalidInput(format!(
            "latitude {lat} outside [-90, 90]"
        )));
    }
    if !(-180.0..=180.0).contains(&lng) {
        return Err(ParkError::InvalidInput(format!(
            "longitude {lng} outside [-180, 180]"
        )));
    }
    Ok(())
}

fn encode_geohash(lat: f64, lng: f64, precision: usize) -> Result<String> {
    geohash::encode(geohash::Coord { x: lng, y: lat }, precision)
        .map_err(|e| ParkError::Geohash(e.to_string()))
}
