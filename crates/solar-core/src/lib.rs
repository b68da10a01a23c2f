pub mod engine;
pub mod types;

pub use engine::LayoutEngine;
pub use types::{
    BoundingBox, FluxRaster, GeoPoint, LayoutConfig, LayoutError, LayoutRequest, LayoutResult,
    PanelCandidate, PanelOrientation, PlacedPanel, RoofSegment, ScoreTierCounts, SystemMetrics,
};
