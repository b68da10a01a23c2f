use super::*;

/// Meters per degree of latitude, constant across the globe to within
/// a fraction of a percent.
pub(super) const METERS_PER_DEGREE_LAT: f64 = 111_000.0;

/// Slack when testing whether a slot's far edge crosses the margin
/// boundary, absorbing float rounding in the meter/degree conversions.
const EDGE_EPSILON_M: f64 = 1e-6;

#[derive(Debug, Clone, Copy)]
pub(super) struct GridSlot {
    pub center: GeoPoint,
    pub row: u32,
    pub col: u32,
}

/// Meters per degree of longitude at the given latitude.
pub(super) fn meters_per_degree_lon(latitude: f64) -> f64 {
    METERS_PER_DEGREE_LAT * latitude.to_radians().cos()
}

impl LayoutEngine {
    /// Lays a regular slot grid over one segment's bounding box.
    ///
    /// Rows run south to north, columns west to east, each slot sized to
    /// hold one landscape panel plus spacing. A segment too small for a
    /// single panel yields an empty list, which is a valid zero-capacity
    /// outcome rather than an error.
    pub(super) fn segment_slots(&self, segment: &RoofSegment) -> Vec<GridSlot> {
        let cfg = &self.request.config;
        let bounds = &segment.bounds;
        let sw = &bounds.southwest;
        let ne = &bounds.northeast;

        let m_per_deg_lon = meters_per_degree_lon(bounds.center().latitude);
        let width_m = (ne.longitude - sw.longitude) * m_per_deg_lon;
        let height_m = (ne.latitude - sw.latitude) * METERS_PER_DEGREE_LAT;

        let margin_w = width_m * cfg.margin_fraction;
        let margin_h = height_m * cfg.margin_fraction;
        let usable_w = width_m - 2.0 * margin_w;
        let usable_h = height_m - 2.0 * margin_h;

        let col_step = cfg.panel_width_m + cfg.panel_spacing_m;
        let row_step = cfg.panel_height_m + cfg.panel_spacing_m;

        let cols = (usable_w / col_step).floor() as i64;
        let rows = (usable_h / row_step).floor() as i64;
        if cols <= 0 || rows <= 0 {
            return Vec::new();
        }

        let mut slots = Vec::with_capacity((rows * cols) as usize);

        for row in 0..rows as u32 {
            let y_m = margin_h + row as f64 * row_step;
            if y_m + cfg.panel_height_m > height_m - margin_h + EDGE_EPSILON_M {
                continue;
            }

            for col in 0..cols as u32 {
                let x_m = margin_w + col as f64 * col_step;
                if x_m + cfg.panel_width_m > width_m - margin_w + EDGE_EPSILON_M {
                    continue;
                }

                let center = GeoPoint {
                    latitude: sw.latitude
                        + (y_m + cfg.panel_height_m / 2.0) / METERS_PER_DEGREE_LAT,
                    longitude: sw.longitude + (x_m + cfg.panel_width_m / 2.0) / m_per_deg_lon,
                };

                slots.push(GridSlot { center, row, col });
            }
        }

        slots
    }
}
