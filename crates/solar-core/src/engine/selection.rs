use super::grid::{meters_per_degree_lon, METERS_PER_DEGREE_LAT};
use super::*;
use std::cmp::Ordering;

/// Panels separated by at least their minimum distance minus this
/// tolerance are accepted; it absorbs meter/degree rounding so slots
/// generated at exactly the minimum pitch are not rejected.
const COLLISION_TOLERANCE_M: f64 = 0.01;

/// Sorts candidates by estimated yield descending, breaking ties by
/// (segment, row, col) so repeated runs produce identical orderings.
pub(crate) fn rank_candidates(mut pool: Vec<PanelCandidate>) -> Vec<PanelCandidate> {
    pool.sort_by(|a, b| {
        b.estimated_yearly_energy_kwh
            .partial_cmp(&a.estimated_yearly_energy_kwh)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.segment_index.cmp(&b.segment_index))
            .then_with(|| a.row.cmp(&b.row))
            .then_with(|| a.col.cmp(&b.col))
    });
    pool
}

impl LayoutEngine {
    /// Walks the ranked pool and admits candidates that clear the
    /// collision check against everything admitted so far, stopping at
    /// `requested` panels or pool exhaustion. A shortfall means the roof
    /// physically cannot hold more; the smaller returned count is the
    /// only signal.
    pub(super) fn select_panels(
        &self,
        ranked: &[PanelCandidate],
        requested: u32,
    ) -> Vec<PlacedPanel> {
        let mut placed: Vec<PlacedPanel> = Vec::new();

        for candidate in ranked {
            if placed.len() as u32 >= requested {
                break;
            }

            let collides = placed
                .iter()
                .any(|panel| self.overlaps(&panel.position, &candidate.position));

            if !collides {
                placed.push(PlacedPanel {
                    position: candidate.position,
                    segment_index: candidate.segment_index,
                    orientation: PanelOrientation::Landscape,
                    yearly_energy_dc_kwh: candidate.estimated_yearly_energy_kwh,
                });
            }
        }

        placed
    }

    /// Dual overlap test: per-axis thresholds catch grid-aligned
    /// collisions, the Euclidean threshold catches diagonal near-misses
    /// that pass both axis checks individually. Either firing rejects
    /// the candidate.
    fn overlaps(&self, a: &GeoPoint, b: &GeoPoint) -> bool {
        let cfg = &self.request.config;
        let mid_lat = (a.latitude + b.latitude) / 2.0;

        let dlat_m = (a.latitude - b.latitude).abs() * METERS_PER_DEGREE_LAT;
        let dlon_m = (a.longitude - b.longitude).abs() * meters_per_degree_lon(mid_lat);

        let min_sep_lon = cfg.panel_width_m + cfg.panel_spacing_m;
        let min_sep_lat = cfg.panel_height_m + cfg.panel_spacing_m;

        let axis_overlap = dlon_m < min_sep_lon - COLLISION_TOLERANCE_M
            && dlat_m < min_sep_lat - COLLISION_TOLERANCE_M;

        // Tighter of the two axis thresholds; anything closer than this
        // in straight-line distance overlaps regardless of direction.
        let min_sep_euclid = min_sep_lat.min(min_sep_lon);
        let euclid_overlap =
            (dlat_m * dlat_m + dlon_m * dlon_m).sqrt() < min_sep_euclid - COLLISION_TOLERANCE_M;

        axis_overlap || euclid_overlap
    }
}
