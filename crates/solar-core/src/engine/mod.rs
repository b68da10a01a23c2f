use crate::types::*;

mod grid;
mod metrics;
mod scoring;
mod selection;
#[cfg(test)]
mod tests;

/// Places photovoltaic panels on a roof by ranking every geometrically
/// valid slot by expected yield and greedily admitting the best
/// non-overlapping ones.
#[derive(Debug)]
pub struct LayoutEngine {
    request: LayoutRequest,
}

impl LayoutEngine {
    /// Validates the request and builds a new engine instance.
    ///
    /// Structural invariant violations (inverted bounds, non-finite
    /// coordinates, a malformed raster) fail here; empty roofs and
    /// zero-capacity segments are valid inputs and flow through as
    /// empty results.
    pub fn new(request: LayoutRequest) -> Result<Self> {
        for segment in &request.roof_segments {
            validate_bounds(&segment.bounds, &format!("segment {}", segment.index))?;

            if !segment.area_m2.is_finite() || segment.area_m2 < 0.0 {
                return Err(LayoutError::InvalidGeometry(format!(
                    "segment {} has invalid area {}",
                    segment.index, segment.area_m2
                )));
            }

            if !segment.azimuth_degrees.is_finite() || !segment.pitch_degrees.is_finite() {
                return Err(LayoutError::InvalidGeometry(format!(
                    "segment {} has non-finite orientation",
                    segment.index
                )));
            }
        }

        if let Some(raster) = &request.flux_raster {
            validate_bounds(&raster.bounds, "flux raster")?;

            if raster.values.len() != raster.width * raster.height {
                return Err(LayoutError::InvalidGeometry(format!(
                    "flux raster has {} values for {}x{} grid",
                    raster.values.len(),
                    raster.width,
                    raster.height
                )));
            }
        }

        if !request.total_roof_area_m2.is_finite() || request.total_roof_area_m2 < 0.0 {
            return Err(LayoutError::InvalidInput(format!(
                "total roof area must be a non-negative number, got {}",
                request.total_roof_area_m2
            )));
        }

        let cfg = &request.config;
        if cfg.panel_width_m <= 0.0 || cfg.panel_height_m <= 0.0 {
            return Err(LayoutError::InvalidInput(
                "panel dimensions must be positive".to_string(),
            ));
        }
        if cfg.panel_spacing_m < 0.0 {
            return Err(LayoutError::InvalidInput(
                "panel spacing must not be negative".to_string(),
            ));
        }
        if !(0.0..0.5).contains(&cfg.margin_fraction) {
            return Err(LayoutError::InvalidInput(format!(
                "margin fraction must be in [0, 0.5), got {}",
                cfg.margin_fraction
            )));
        }

        Ok(Self { request })
    }

    /// Executes the full pipeline: candidate generation, ranking,
    /// greedy non-overlapping selection, and metrics aggregation.
    pub fn layout(&self) -> LayoutResult {
        let (pool, tier_counts) = self.generate_candidates();
        let candidate_count = pool.len();
        let ranked = rank_candidates(pool);
        let panels = self.select_panels(&ranked, self.request.requested_panel_count);
        let metrics = self.aggregate_metrics(&panels);

        LayoutResult {
            panels,
            metrics,
            candidate_count,
            tier_counts,
        }
    }

    /// Returns the ranked candidate pool so callers can cache it and
    /// re-run only selection + metrics when the requested panel count
    /// changes.
    pub fn ranked_candidates(&self) -> Vec<PanelCandidate> {
        let (pool, _) = self.generate_candidates();
        rank_candidates(pool)
    }

    /// Selects panels from a previously ranked pool and recomputes
    /// metrics, without regenerating candidates. Tier counts are part
    /// of generation and come back zeroed here.
    pub fn layout_from_pool(&self, ranked: &[PanelCandidate], requested: u32) -> LayoutResult {
        let panels = self.select_panels(ranked, requested);
        let metrics = self.aggregate_metrics(&panels);

        LayoutResult {
            panels,
            metrics,
            candidate_count: ranked.len(),
            tier_counts: ScoreTierCounts::default(),
        }
    }

    /// Enumerates and scores every valid slot across all roof segments.
    /// The pool is deliberately uncapped so selection can pick the best
    /// slots building-wide rather than filling segments in discovery
    /// order.
    fn generate_candidates(&self) -> (Vec<PanelCandidate>, ScoreTierCounts) {
        let mut pool = Vec::new();
        let mut tiers = ScoreTierCounts::default();

        for segment in &self.request.roof_segments {
            let slots = self.segment_slots(segment);
            if slots.is_empty() {
                tracing::debug!(segment = segment.index, "segment too small for any panel");
                continue;
            }

            for slot in slots {
                let energy = self.score_slot(segment, &slot.center);
                scoring::record_tier(&mut tiers, segment.azimuth_degrees);

                pool.push(PanelCandidate {
                    position: slot.center,
                    segment_index: segment.index,
                    row: slot.row,
                    col: slot.col,
                    estimated_yearly_energy_kwh: energy,
                });
            }
        }

        (pool, tiers)
    }
}

pub(crate) use selection::rank_candidates;

fn validate_bounds(bounds: &BoundingBox, what: &str) -> Result<()> {
    let sw = &bounds.southwest;
    let ne = &bounds.northeast;

    let finite = sw.latitude.is_finite()
        && sw.longitude.is_finite()
        && ne.latitude.is_finite()
        && ne.longitude.is_finite();

    if !finite {
        return Err(LayoutError::InvalidGeometry(format!(
            "{what} has non-finite coordinates"
        )));
    }

    if sw.latitude >= ne.latitude || sw.longitude >= ne.longitude {
        return Err(LayoutError::InvalidGeometry(format!(
            "{what} bounds are inverted or empty: SW ({}, {}) NE ({}, {})",
            sw.latitude, sw.longitude, ne.latitude, ne.longitude
        )));
    }

    Ok(())
}
