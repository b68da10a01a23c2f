use super::*;

// Azimuth multiplier policy table. Values are tunable but must stay
// monotonic in angular distance from due south (180°).
const MULT_EXCELLENT: f64 = 1.00; // [150°, 210°]
const MULT_GOOD: f64 = 0.95; // [120°, 150°) ∪ (210°, 240°]
const MULT_FAIR: f64 = 0.85; // [90°, 120°) ∪ (240°, 270°]
const MULT_POOR: f64 = 0.75; // [60°, 90°) ∪ (270°, 300°]
const MULT_MARGINAL: f64 = 0.60; // everything else

/// Yield loss at the far corner of a segment relative to its centroid,
/// modeling edge shading.
const EDGE_LOSS_FRACTION: f64 = 0.10;

/// Step-function yield multiplier for a roof face's compass direction.
pub(super) fn azimuth_multiplier(azimuth_degrees: f64) -> f64 {
    let az = azimuth_degrees.rem_euclid(360.0);
    let off_south = (az - 180.0).abs();

    if off_south <= 30.0 {
        MULT_EXCELLENT
    } else if off_south <= 60.0 {
        MULT_GOOD
    } else if off_south <= 90.0 {
        MULT_FAIR
    } else if off_south <= 120.0 {
        MULT_POOR
    } else {
        MULT_MARGINAL
    }
}

/// Buckets a segment's azimuth into the observability tier counts.
pub(super) fn record_tier(tiers: &mut ScoreTierCounts, azimuth_degrees: f64) {
    let mult = azimuth_multiplier(azimuth_degrees);
    if mult >= MULT_EXCELLENT {
        tiers.excellent += 1;
    } else if mult >= MULT_GOOD {
        tiers.good += 1;
    } else if mult >= MULT_FAIR {
        tiers.fair += 1;
    } else if mult >= MULT_POOR {
        tiers.poor += 1;
    } else {
        tiers.marginal += 1;
    }
}

/// Multiplier in [1 − EDGE_LOSS_FRACTION, 1.0] favoring the segment
/// centroid over its edges.
fn position_multiplier(bounds: &BoundingBox, point: &GeoPoint) -> f64 {
    let center = bounds.center();
    let half_lat = (bounds.northeast.latitude - bounds.southwest.latitude) / 2.0;
    let half_lon = (bounds.northeast.longitude - bounds.southwest.longitude) / 2.0;

    if half_lat <= 0.0 || half_lon <= 0.0 {
        return 1.0;
    }

    let dy = (point.latitude - center.latitude) / half_lat;
    let dx = (point.longitude - center.longitude) / half_lon;
    let radial = (dx * dx + dy * dy).sqrt() / std::f64::consts::SQRT_2;

    1.0 - EDGE_LOSS_FRACTION * radial.clamp(0.0, 1.0)
}

impl LayoutEngine {
    /// Estimated yearly DC energy for one panel centered at `position`.
    ///
    /// Prefers a flux-raster sample when coverage exists, since measured
    /// irradiance beats the heuristic model. A missing or no-data sample
    /// is treated as "unknown" and falls back to the azimuth + position
    /// heuristic rather than scoring the slot as zero.
    pub(super) fn score_slot(&self, segment: &RoofSegment, position: &GeoPoint) -> f64 {
        let cfg = &self.request.config;

        if let Some(raster) = &self.request.flux_raster {
            if let Some(flux) = raster.sample(position) {
                return flux
                    * cfg.panel_area_m2()
                    * cfg.panel_efficiency
                    * cfg.system_derating_factor;
            }

            tracing::debug!(
                segment = segment.index,
                "no raster coverage at slot, using azimuth heuristic"
            );
        }

        cfg.base_panel_energy_kwh
            * azimuth_multiplier(segment.azimuth_degrees)
            * position_multiplier(&segment.bounds, position)
    }
}
