//! Configuration for the query core.
//!
//! The defaults reproduce the tuned constants of the shipped application
//! exactly; they are a compatibility contract, not derived values. Keep them
//! unless you also migrate persisted indexes (see
//! [`PointStore::reindex`](crate::store::PointStore::reindex)).

use serde::{Deserialize, Serialize};

/// Query-core configuration.
///
/// Serializable so deployments can load it from JSON while keeping complexity
/// minimal.
///
/// # Example
///
/// ```rust
/// use parkwatch::Config;
///
/// let config = Config::default();
/// assert_eq!(config.coordinate_scale, 1000);
///
/// let json = r#"{ "geohash_precision": 6 }"#;
/// let config = Config::from_json(json).unwrap();
/// assert_eq!(config.geohash_precision, 6);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Multiplier applied to coordinates before rounding into integer
    /// indexes. One canonical value for the whole store.
    #[serde(default = "Config::default_coordinate_scale")]
    pub coordinate_scale: i64,

    /// Geohash precision used for cluster prefixes (1-12).
    #[serde(default = "Config::default_geohash_precision")]
    pub geohash_precision: usize,

    /// Camera altitude in meters strictly above which cluster summaries
    /// replace raw points.
    #[serde(default = "Config::default_cluster_altitude_threshold")]
    pub cluster_altitude_threshold: f64,

    /// Maximum number of entries in the ranked nearest-parking list.
    #[serde(default = "Config::default_nearest_k")]
    pub nearest_k: usize,

    /// Fixed half-width in degrees of the box the nearest-parking search
    /// scans, independent of zoom.
    #[serde(default = "Config::default_nearest_delta_degrees")]
    pub nearest_delta_degrees: f64,

    /// Radius in meters converted into the candidate box for danger-zone
    /// membership checks.
    #[serde(default = "Config::default_danger_search_radius_meters")]
    pub danger_search_radius_meters: f64,

    /// Great-circle distance in meters at or under which a danger record
    /// counts as a membership hit.
    #[serde(default = "Config::default_danger_hit_radius_meters")]
    pub danger_hit_radius_meters: f64,
}

impl Config {
    const fn default_coordinate_scale() -> i64 {
        1000
    }

    const fn default_geohash_precision() -> usize {
        5
    }

    const fn default_cluster_altitude_threshold() -> f64 {
        10_000.0
    }

    const fn default_nearest_k() -> usize {
        20
    }

    const fn default_nearest_delta_degrees() -> f64 {
        0.02
    }

    const fn default_danger_search_radius_meters() -> f64 {
        60.0
    }

    const fn default_danger_hit_radius_meters() -> f64 {
        50.0
    }

    pub fn with_coordinate_scale(mut self, scale: i64) -> Self {
        assert!(scale > 0, "Coordinate scale must be positive");
        self.coordinate_scale = scale;
        self
    }

    pub fn with_geohash_precision(mut self, precision: usize) -> Self {
        assert!(
            (1..=12).contains(&precision),
            "Geohash precision must be between 1 and 12"
        );
        self.geohash_precision = precision;
        self
    }

    pub fn with_cluster_altitude_threshold(mut self, meters: f64) -> Self {
        self.cluster_altitude_threshold = meters;
        self
    }

    pub fn with_nearest_k(mut self, k: usize) -> Self {
        self.nearest_k = k;
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.coordinate_scale <= 0 {
            return Err("Coordinate scale must be positive".to_string());
        }

        if self.geohash_precision < 1 || self.geohash_precision > 12 {
            return Err("Geohash precision must be between 1 and 12".to_string());
        }

        if !self.cluster_altitude_threshold.is_finite() || self.cluster_altitude_threshold < 0.0 {
            return Err("Cluster altitude threshold must be a non-negative number".to_string());
        }

        if !self.nearest_delta_degrees.is_finite() || self.nearest_delta_degrees <= 0.0 {
            return Err("Nearest-search delta must be a positive number".to_string());
        }

        if !self.danger_search_radius_meters.is_finite() || self.danger_search_radius_meters <= 0.0
        {
            return Err("Danger search radius must be a positive number".to_string());
        }

        if !self.danger_hit_radius_meters.is_finite() || self.danger_hit_radius_meters <= 0.0 {
            return Err("Danger hit radius must be a positive number".to_string());
        }

        if self.danger_hit_radius_meters > self.danger_search_radius_meters {
            return Err(
                "Danger hit radius cannot exceed the candidate search radius".to_string(),
            );
        }

        Ok(())
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        use serde::de::Error;

        let config: Config = serde_json::from_str(json)?;
        if let Err(e) = config.validate() {
            return Err(serde_json::Error::custom(e));
        }
        Ok(config)
    }

    /// Save configuration as a JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            coordinate_scale: Self::default_coordinate_scale(),
            geohash_precision: Self::default_geohash_precision(),
            cluster_altitude_threshold: Self::default_cluster_altitude_threshold(),
            nearest_k: Self::default_nearest_k(),
            nearest_delta_degrees: Self::default_nearest_delta_degrees(),
            danger_search_radius_meters: Self::default_danger_search_radius_meters(),
            danger_hit_radius_meters: Self::default_danger_hit_radius_meters(),
        }
    }
}
