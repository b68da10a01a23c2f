use serde::{Deserialize, Serialize};

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// Axis-aligned geographic bounding box.
/// Invariant: `southwest` is strictly south and west of `northeast`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BoundingBox {
    pub southwest: GeoPoint,
    pub northeast: GeoPoint,
}

impl BoundingBox {
    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            latitude: (self.southwest.latitude + self.northeast.latitude) / 2.0,
            longitude: (self.southwest.longitude + self.northeast.longitude) / 2.0,
        }
    }

    pub fn contains(&self, point: &GeoPoint) -> bool {
        point.latitude >= self.southwest.latitude
            && point.latitude <= self.northeast.latitude
            && point.longitude >= self.southwest.longitude
            && point.longitude <= self.northeast.longitude
    }
}

/// One planar face of a roof, as returned by the building-insights provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoofSegment {
    /// Stable per-building identifier.
    pub index: u32,
    pub area_m2: f64,
    pub pitch_degrees: f64,
    /// Compass direction the face points at, degrees clockwise from north.
    pub azimuth_degrees: f64,
    pub bounds: BoundingBox,
    /// Percentile buckets of annual sunshine hours for the segment.
    #[serde(default)]
    pub sunshine_hours: Vec<f64>,
}

/// Gridded annual irradiance (kWh/m²/year) covering a roof area.
/// Values ≤ 0 mean "no data" at that cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FluxRaster {
    pub width: usize,
    pub height: usize,
    pub bounds: BoundingBox,
    pub pixel_size_meters: f64,
    /// Row-major, north-to-south. Length must equal `width * height`.
    pub values: Vec<f64>,
}

impl FluxRaster {
    /// Bilinear sample at a geographic point. Returns `None` outside the
    /// raster bounds or where the interpolated value carries no data, so
    /// callers fall back to heuristic scoring instead of treating missing
    /// coverage as zero energy.
    pub fn sample(&self, point: &GeoPoint) -> Option<f64> {
        if !self.bounds.contains(point) || self.width == 0 || self.height == 0 {
            return None;
        }

        let west = self.bounds.southwest.longitude;
        let east = self.bounds.northeast.longitude;
        let south = self.bounds.southwest.latitude;
        let north = self.bounds.northeast.latitude;

        let fx = (point.longitude - west) / (east - west) * self.width as f64 - 0.5;
        let fy = (north - point.latitude) / (north - south) * self.height as f64 - 0.5;

        let x0 = fx.floor().clamp(0.0, (self.width - 1) as f64) as usize;
        let y0 = fy.floor().clamp(0.0, (self.height - 1) as f64) as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let tx = (fx - x0 as f64).clamp(0.0, 1.0);
        let ty = (fy - y0 as f64).clamp(0.0, 1.0);

        let corners = [
            (self.values[y0 * self.width + x0], (1.0 - tx) * (1.0 - ty)),
            (self.values[y0 * self.width + x1], tx * (1.0 - ty)),
            (self.values[y1 * self.width + x0], (1.0 - tx) * ty),
            (self.values[y1 * self.width + x1], tx * ty),
        ];

        // No-data corners are excluded from the blend and their weight
        // redistributed over the valid ones, so a point inside a valid
        // pixel near a coverage edge is not dragged toward zero.
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;
        for (value, weight) in corners {
            if value > 0.0 {
                weighted_sum += value * weight;
                weight_total += weight;
            }
        }

        if weight_total > 0.0 {
            Some(weighted_sum / weight_total)
        } else {
            None
        }
    }
}

/// A geometrically valid, scored but not-yet-selected panel slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelCandidate {
    pub position: GeoPoint,
    pub segment_index: u32,
    pub row: u32,
    pub col: u32,
    pub estimated_yearly_energy_kwh: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PanelOrientation {
    Landscape,
    Portrait,
}

/// A selected panel in the final placement, ranked by yield descending.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacedPanel {
    pub position: GeoPoint,
    pub segment_index: u32,
    pub orientation: PanelOrientation,
    pub yearly_energy_dc_kwh: f64,
}

/// Aggregate figures derived from a finished placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub panel_count: u32,
    pub annual_energy_kwh: f64,
    pub monthly_savings: f64,
    pub system_size_kw: f64,
    /// Raw value, deliberately not clamped to 100.
    pub roof_coverage_percent: f64,
    pub co2_offset_kg_per_year: f64,
}

/// Tunable policy values for panel geometry and the energy model.
/// All fields have region-neutral defaults and can be overridden per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_panel_width")]
    pub panel_width_m: f64,
    #[serde(default = "default_panel_height")]
    pub panel_height_m: f64,
    #[serde(default = "default_panel_spacing")]
    pub panel_spacing_m: f64,
    /// Fraction of each bounding-box dimension kept clear on every side.
    #[serde(default = "default_margin_fraction")]
    pub margin_fraction: f64,
    #[serde(default = "default_panel_capacity")]
    pub panel_capacity_watts: f64,
    #[serde(default = "default_panel_efficiency")]
    pub panel_efficiency: f64,
    #[serde(default = "default_derating_factor")]
    pub system_derating_factor: f64,
    /// Per-kWh retail tariff used for the savings estimate.
    #[serde(default = "default_tariff")]
    pub tariff_per_kwh: f64,
    /// Grid carbon intensity, kg CO₂ per kWh displaced.
    #[serde(default = "default_carbon_intensity")]
    pub grid_carbon_kg_per_kwh: f64,
    /// Heuristic yearly output of one panel on an ideal south-facing slot,
    /// used when no flux raster is available.
    #[serde(default = "default_base_energy")]
    pub base_panel_energy_kwh: f64,
}

fn default_panel_width() -> f64 {
    1.6
}
fn default_panel_height() -> f64 {
    0.8
}
fn default_panel_spacing() -> f64 {
    0.3
}
fn default_margin_fraction() -> f64 {
    0.05
}
fn default_panel_capacity() -> f64 {
    400.0
}
fn default_panel_efficiency() -> f64 {
    0.20
}
fn default_derating_factor() -> f64 {
    0.85
}
fn default_tariff() -> f64 {
    0.25
}
fn default_carbon_intensity() -> f64 {
    0.4
}
fn default_base_energy() -> f64 {
    420.0
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            panel_width_m: default_panel_width(),
            panel_height_m: default_panel_height(),
            panel_spacing_m: default_panel_spacing(),
            margin_fraction: default_margin_fraction(),
            panel_capacity_watts: default_panel_capacity(),
            panel_efficiency: default_panel_efficiency(),
            system_derating_factor: default_derating_factor(),
            tariff_per_kwh: default_tariff(),
            grid_carbon_kg_per_kwh: default_carbon_intensity(),
            base_panel_energy_kwh: default_base_energy(),
        }
    }
}

impl LayoutConfig {
    pub fn panel_area_m2(&self) -> f64 {
        self.panel_width_m * self.panel_height_m
    }
}

/// Input: roof geometry plus the requested system size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutRequest {
    pub roof_segments: Vec<RoofSegment>,
    pub total_roof_area_m2: f64,
    #[serde(default)]
    pub flux_raster: Option<FluxRaster>,
    pub requested_panel_count: u32,
    #[serde(default)]
    pub config: LayoutConfig,
}

/// Candidate counts per azimuth quality tier, best to worst.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreTierCounts {
    pub excellent: u32,
    pub good: u32,
    pub fair: u32,
    pub poor: u32,
    pub marginal: u32,
}

impl ScoreTierCounts {
    pub fn total(&self) -> u32 {
        self.excellent + self.good + self.fair + self.poor + self.marginal
    }
}

/// Output: the placement plus derived metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutResult {
    pub panels: Vec<PlacedPanel>,
    pub metrics: SystemMetrics,
    /// Size of the full candidate pool before selection.
    pub candidate_count: usize,
    pub tier_counts: ScoreTierCounts,
}

/// Error type for layout computation
#[derive(Debug, thiserror::Error)]
pub enum LayoutError {
    #[error("Invalid roof geometry: {0}")]
    InvalidGeometry(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, LayoutError>;
