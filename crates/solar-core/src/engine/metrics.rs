use super::*;

impl LayoutEngine {
    /// Derives system-level figures from a finished placement.
    ///
    /// Pure function of its inputs: the per-panel energies already carry
    /// the raster integral when a flux raster scored them, so summing
    /// them is the raster-preferred path. Roof coverage is reported raw,
    /// never clamped; presenting an over-100% value is the caller's
    /// decision.
    pub(super) fn aggregate_metrics(&self, panels: &[PlacedPanel]) -> SystemMetrics {
        let cfg = &self.request.config;
        let panel_count = panels.len() as u32;

        let annual_energy_kwh: f64 = panels.iter().map(|p| p.yearly_energy_dc_kwh).sum();

        let system_size_kw = panel_count as f64 * cfg.panel_capacity_watts / 1000.0;

        let roof_coverage_percent = if self.request.total_roof_area_m2 > 0.0 {
            panel_count as f64 * cfg.panel_area_m2() / self.request.total_roof_area_m2 * 100.0
        } else {
            0.0
        };

        SystemMetrics {
            panel_count,
            annual_energy_kwh,
            monthly_savings: annual_energy_kwh / 12.0 * cfg.tariff_per_kwh,
            system_size_kw,
            roof_coverage_percent,
            co2_offset_kg_per_year: annual_energy_kwh * cfg.grid_carbon_kg_per_kwh,
        }
    }
}
