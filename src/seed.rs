//! Seed-file ingestion for the two open-data feeds.
//!
//! Both feeds are municipal JSON exports. The safe-parking feed has a fixed
//! envelope key; the no-parking feed renames its top-level key per export,
//! so the envelope is located dynamically. Rows are decoded one at a time so
//! a single malformed row is skipped and counted instead of failing the
//! whole file.

use std::fs;
use std::path::Path;

use log::warn;
use serde::Deserialize;

use crate::error::{ParkError, Result};
use crate::record::{DangerDetail, RecordDetail, SafeDetail};
use crate::store::RawRecord;

/// Rows decoded from one seed file, plus how many rows failed to decode.
#[derive(Debug, Default)]
pub struct SeedBatch {
    pub records: Vec<RawRecord>,
    pub undecodable: usize,
}

/// Coordinate field that arrives as either a JSON number or a numeric
/// string, depending on the feed export.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CoordValue {
    Number(f64),
    Text(String),
}

impl CoordValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CoordValue::Number(n) => Some(*n),
            CoordValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SafeSeedRow {
    #[serde(rename = "PKLT_NM")]
    name: String,
    #[serde(rename = "ADDR")]
    address: String,
    #[serde(rename = "CHGD_FREE_SE", default)]
    is_paid: Option<String>,
    #[serde(rename = "NGHT_FREE_OPN_YN", default)]
    is_night_free: Option<String>,
    #[serde(rename = "LHLDY_YN", default)]
    is_holiday_free: Option<String>,
    #[serde(rename = "WD_OPER_BGNG_TM", default)]
    weekday_open: Option<String>,
    #[serde(rename = "WD_OPER_END_TM", default)]
    weekday_close: Option<String>,
    #[serde(rename = "WE_OPER_BGNG_TM", default)]
    weekend_open: Option<String>,
    #[serde(rename = "WE_OPER_END_TM", default)]
    weekend_close: Option<String>,
    #[serde(rename = "LHLDY_BGNG", default)]
    holiday_open: Option<String>,
    #[serde(rename = "LHLDY", default)]
    holiday_close: Option<String>,
    #[serde(rename = "PRK_CRG", default)]
    base_charge: Option<i64>,
    #[serde(rename = "PRK_HM", default)]
    base_time_minutes: Option<i64>,
    #[serde(rename = "ADD_CRG", default)]
    extra_charge: Option<i64>,
    #[serde(rename = "ADD_UNIT_TM_MNT", default)]
    extra_unit_minutes: Option<i64>,
    #[serde(rename = "DLY_MAX_CRG", default)]
    daily_max_charge: Option<i64>,
    #[serde(rename = "LAT", default)]
    lat: Option<CoordValue>,
    #[serde(rename = "LOT", default)]
    lng: Option<CoordValue>,
}

#[derive(Debug, Deserialize)]
struct DangerSeedRow {
    #[serde(rename = "FIX_CCTV_ADDR")]
    address: String,
    #[serde(rename = "LAT")]
    lat: CoordValue,
    #[serde(rename = "LOT")]
    lng: CoordValue,
    #[serde(rename = "CGG_CD", default)]
    district: String,
    #[serde(rename = "CRDN_BRNCH_NM", default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct SafeEnvelope {
    #[serde(rename = "GetParkInfo")]
    get_park_info: SafeSection,
}

#[derive(Debug, Deserialize)]
struct SafeSection {
    row: Vec<serde_json::Value>,
}

/// Flag fields use "Y" for yes; anything else (including absence) is no.
fn yn(flag: &Option<String>) -> bool {
    flag.as_deref() == Some("Y")
}

/// Reads a safe-parking seed file (fixed `GetParkInfo` envelope).
pub fn read_safe_seed(path: &Path) -> Result<SeedBatch> {
    let text = fs::read_to_string(path)?;
    let envelope: SafeEnvelope =
        serde_json::from_str(&text).map_err(|e| ParkError::Serialization(e.to_string()))?;

    let mut batch = SeedBatch::default();
    for value in envelope.get_park_info.row {
        match serde_json::from_value::<SafeSeedRow>(value) {
            Ok(row) => batch.records.push(safe_row_to_raw(row)),
            Err(e) => {
                warn!("skipping undecodable safe seed row: {e}");
                batch.undecodable += 1;
            }
        }
    }
    Ok(batch)
}

/// Reads a no-parking seed file. The envelope key varies per export, so the
/// first top-level object value holding a `row` array is used.
pub fn read_danger_seed(path: &Path) -> Result<SeedBatch> {
    let text = fs::read_to_string(path)?;
    let root: serde_json::Value =
        serde_json::from_str(&text).map_err(|e| ParkError::Serialization(e.to_string()))?;

    let rows = root
        .as_object()
        .and_then(|map| map.values().next())
        .and_then(|section| section.get("row"))
        .and_then(|row| row.as_array())
        .cloned()
        .ok_or_else(|| {
            ParkError::Serialization(format!(
                "no row array under a top-level key in {}",
                path.display()
            ))
        })?;

    let mut batch = SeedBatch::default();
    for value in rows {
        match serde_json::from_value::<DangerSeedRow>(value) {
            Ok(row) => batch.records.push(danger_row_to_raw(row)),
            Err(e) => {
                warn!("skipping undecodable no-parking seed row: {e}");
                batch.undecodable += 1;
            }
        }
    }
    Ok(batch)
}

fn safe_row_to_raw(row: SafeSeedRow) -> RawRecord {
    RawRecord {
        lat: row.lat.as_ref().and_then(CoordValue::as_f64),
        lng: row.lng.as_ref().and_then(CoordValue::as_f64),
        detail: RecordDetail::Safe(SafeDetail {
            name: row.name,
            address: row.address,
            is_paid: yn(&row.is_paid),
            is_night_free: yn(&row.is_night_free),
            is_holiday_free: yn(&row.is_holiday_free),
            weekday_open: row.weekday_open,
            weekday_close: row.weekday_close,
            weekend_open: row.weekend_open,
            weekend_close: row.weekend_close,
            holiday_open: row.holiday_open,
            holiday_close: row.holiday_close,
            base_charge: row.base_charge,
            base_time_minutes: row.base_time_minutes,
            extra_charge: row.extra_charge,
            extra_unit_minutes: row.extra_unit_minutes,
            daily_max_charge: row.daily_max_charge,
        }),
    }
}

fn danger_row_to_raw(row: DangerSeedRow) -> RawRecord {
    RawRecord {
        lat: row.lat.as_f64(),
        lng: row.lng.as_f64(),
        detail: RecordDetail::Danger(DangerDetail {
            address: row.address,
            district: row.district,
            description: row.description,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_value_accepts_both_shapes() {
        let n: CoordValue = serde_json::from_str("37.478").unwrap();
        let s: CoordValue = serde_json::from_str("\"127.047\"").unwrap();
        let bad: CoordValue = serde_json::from_str("\"n/a\"").unwrap();
        assert_eq!(n.as_f64(), Some(37.478));
        assert_eq!(s.as_f64(), Some(127.047));
        assert_eq!(bad.as_f64(), None);
    }

    #[test]
    fn test_yes_flag_requires_literal_y() {
        assert!(yn(&Some("Y".to_string())));
        assert!(!yn(&Some("N".to_string())));
        assert!(!yn(&Some("yes".to_string())));
        assert!(!yn(&None));
    }

    #[test]
    fn test_safe_row_maps_fee_and_schedule_fields() {
        let row: SafeSeedRow = serde_json::from_value(serde_json::json!({
            "PKLT_NM": "lot",
            "ADDR": "addr",
            "CHGD_FREE_SE": "Y",
            "WD_OPER_BGNG_TM": "0900",
            "WD_OPER_END_TM": "1900",
            "PRK_CRG": 0,
            "ADD_CRG": 300,
            "ADD_UNIT_TM_MNT": 10,
            "LAT": 37.5,
            "LOT": 127.0
        }))
        .unwrap();

        let raw = safe_row_to_raw(row);
        assert_eq!(raw.lat, Some(37.5));
        match raw.detail {
            RecordDetail::Safe(detail) => {
                assert!(detail.is_paid);
                assert!(!detail.is_night_free);
                assert_eq!(detail.weekday_open.as_deref(), Some("0900"));
                assert_eq!(detail.extra_charge, Some(300));
                assert_eq!(detail.extra_unit_minutes, Some(10));
            }
            other => panic!("expected safe detail, got {other:?}"),
        }
    }

    #[test]
    fn test_danger_row_parses_string_coordinates() {
        let row: DangerSeedRow = serde_json::from_value(serde_json::json!({
            "FIX_CCTV_ADDR": "개포동 1231",
            "LAT": "37.47867",
            "LOT": "127.04732",
            "CGG_CD": "강남구",
            "CRDN_BRNCH_NM": "KB(개포남지점) 주변"
        }))
        .unwrap();

        let raw = danger_row_to_raw(row);
        assert_eq!(raw.lat, Some(37.47867));
        assert_eq!(raw.lng, Some(127.04732));
        match raw.detail {
            RecordDetail::Danger(detail) => {
                assert_eq!(detail.district, "강남구");
            }
            other => panic!("expected danger detail, got {other:?}"),
        }
    }
}
