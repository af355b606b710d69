//! Embedded parking-safety query core: scaled-integer spatial indexing,
//! altitude-driven map queries, geohash clustering, and danger proximity
//! checks over municipal parking feeds.
//!
//! ```rust
//! use parkwatch::{AreaKind, ParkWatch, ParkedLocation, RawRecord, RecordDetail, DangerDetail};
//!
//! let engine = ParkWatch::new();
//!
//! let camera = RawRecord {
//!     lat: Some(37.47867),
//!     lng: Some(127.04732),
//!     detail: RecordDetail::Danger(DangerDetail {
//!         address: "Gaepo-dong 1231".to_string(),
//!         district: "Gangnam-gu".to_string(),
//!         description: "CCTV enforcement zone".to_string(),
//!     }),
//! };
//! engine.load(AreaKind::Danger, vec![camera]);
//!
//! assert!(engine.is_dangerous(37.47867, 127.04732)?);
//!
//! engine.save_parked(ParkedLocation::new(37.478, 127.047, "B2 pillar 14", None));
//! assert!(engine.parked().is_some());
//! # Ok::<(), parkwatch::ParkError>(())
//! ```

pub mod bbox;
pub mod cluster;
pub mod config;
pub mod engine;
pub mod error;
pub mod nearest;
pub mod proximity;
pub mod record;
pub mod seed;
pub mod store;
pub mod zoom;

pub use config::Config;
pub use engine::{MapView, ParkWatch};
pub use error::{ParkError, Result};

pub use bbox::{BoundingBoxIndex, ScaledBox, ScaledRange};
pub use cluster::{ClusterBucket, GeohashClusterer};
pub use nearest::NearestNeighborSelector;
pub use proximity::ProximityCache;
pub use record::{
    scale_coordinate, AreaKind, DangerDetail, GeoRecord, ParkedLocation, RecordDetail, SafeDetail,
};
pub use seed::{read_danger_seed, read_safe_seed, CoordValue, SeedBatch};
pub use store::{migrate_records, LoadReport, PointStore, RawRecord};
pub use zoom::ZoomPolicy;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {
    pub use crate::{
        AreaKind, Config, GeoRecord, MapView, ParkError, ParkWatch, ParkedLocation, RawRecord,
        RecordDetail, Result,
    };
}
