//! Camera-altitude policy: query width and raw-vs-cluster mode.
//!
//! The step table and the cluster threshold are tuned application constants.
//! Compatibility with prior behavior is the contract here; do not re-derive
//! "better" values.

/// Maps camera altitude to a query delta and a presentation mode.
#[derive(Debug, Clone, Copy)]
pub struct ZoomPolicy {
    cluster_altitude_threshold: f64,
}

impl ZoomPolicy {
    pub fn new(cluster_altitude_threshold: f64) -> Self {
        Self {
            cluster_altitude_threshold,
        }
    }

    /// Half-width in degrees of the viewport box for a given altitude.
    ///
    /// Piecewise over meters: [0, 1000) → 0.002, [1000, 3000) → 0.005,
    /// [3000, 7000) → 0.01, [7000, 15000) → 0.02, ≥ 15000 → 0.04.
    pub fn delta(&self, altitude_meters: f64) -> f64 {
        if altitude_meters < 1_000.0 {
            0.002
        } else if altitude_meters < 3_000.0 {
            0.005
        } else if altitude_meters < 7_000.0 {
            0.01
        } else if altitude_meters < 15_000.0 {
            0.02
        } else {
            0.04
        }
    }

    /// True iff the view is zoomed out far enough that cluster summaries
    /// replace raw points. Flips strictly above the threshold.
    pub fn is_cluster_mode(&self, altitude_meters: f64) -> bool {
        altitude_meters > self.cluster_altitude_threshold
    }
}

impl Default for ZoomPolicy {
    fn default() -> Self {
        Self::new(crate::Config::default().cluster_altitude_threshold)
    }
}
