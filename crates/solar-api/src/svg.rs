use anyhow::Result;
use solar_core::{GeoPoint, LayoutRequest, LayoutResult};
use std::fmt::Write;

const METERS_PER_DEGREE_LAT: f64 = 111_000.0;
const PIXELS_PER_METER: f64 = 12.0;
const MARGIN_PX: f64 = 20.0;

/// Top-down rendering of the roof segments and the placed panels.
/// Latitude/longitude are projected to a local meter frame anchored at
/// the southwest-most corner of the building, with north up.
pub fn render(request: &LayoutRequest, result: &LayoutResult) -> Result<String> {
    let mut svg = String::new();

    let Some(frame) = Frame::from_request(request) else {
        writeln!(&mut svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            &mut svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="200" height="40"><text x="10" y="25" font-family="Arial" font-size="14">No roof segments</text></svg>"#
        )?;
        return Ok(svg);
    };

    let svg_width = frame.width_m * PIXELS_PER_METER + 2.0 * MARGIN_PX;
    let svg_height = frame.height_m * PIXELS_PER_METER + 2.0 * MARGIN_PX;

    writeln!(&mut svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(
        &mut svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}">"#,
        svg_width, svg_height, svg_width, svg_height
    )?;
    writeln!(
        &mut svg,
        r##"  <rect width="100%" height="100%" fill="#f5f5f5"/>"##
    )?;

    for segment in &request.roof_segments {
        let (x, y) = frame.to_px(&GeoPoint {
            latitude: segment.bounds.northeast.latitude,
            longitude: segment.bounds.southwest.longitude,
        });
        let w = (segment.bounds.northeast.longitude - segment.bounds.southwest.longitude)
            * frame.m_per_deg_lon
            * PIXELS_PER_METER;
        let h = (segment.bounds.northeast.latitude - segment.bounds.southwest.latitude)
            * METERS_PER_DEGREE_LAT
            * PIXELS_PER_METER;

        writeln!(
            &mut svg,
            r##"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="#fff" stroke="#333" stroke-width="2"/>"##,
            x, y, w, h
        )?;
        writeln!(
            &mut svg,
            r##"  <text x="{:.1}" y="{:.1}" font-family="Arial" font-size="12" fill="#333">segment {} ({:.0}°)</text>"##,
            x,
            y - 5.0,
            segment.index,
            segment.azimuth_degrees
        )?;
    }

    let panel_w = request.config.panel_width_m * PIXELS_PER_METER;
    let panel_h = request.config.panel_height_m * PIXELS_PER_METER;

    for panel in &result.panels {
        let (cx, cy) = frame.to_px(&panel.position);

        writeln!(
            &mut svg,
            r##"  <rect x="{:.1}" y="{:.1}" width="{:.1}" height="{:.1}" fill="#1565C0" stroke="#0D47A1" stroke-width="1" opacity="0.8"/>"##,
            cx - panel_w / 2.0,
            cy - panel_h / 2.0,
            panel_w,
            panel_h
        )?;
    }

    writeln!(
        &mut svg,
        r##"  <text x="{:.1}" y="{:.1}" font-family="Arial" font-size="12" fill="#666">Panels: {} | Annual: {:.0} kWh | Coverage: {:.1}%</text>"##,
        MARGIN_PX,
        svg_height - 5.0,
        result.metrics.panel_count,
        result.metrics.annual_energy_kwh,
        result.metrics.roof_coverage_percent
    )?;

    writeln!(&mut svg, "</svg>")?;

    Ok(svg)
}

struct Frame {
    north: f64,
    west: f64,
    m_per_deg_lon: f64,
    width_m: f64,
    height_m: f64,
}

impl Frame {
    fn from_request(request: &LayoutRequest) -> Option<Self> {
        let first = request.roof_segments.first()?;
        let mut south = first.bounds.southwest.latitude;
        let mut west = first.bounds.southwest.longitude;
        let mut north = first.bounds.northeast.latitude;
        let mut east = first.bounds.northeast.longitude;

        for segment in &request.roof_segments[1..] {
            south = south.min(segment.bounds.southwest.latitude);
            west = west.min(segment.bounds.southwest.longitude);
            north = north.max(segment.bounds.northeast.latitude);
            east = east.max(segment.bounds.northeast.longitude);
        }

        let mid_lat = (south + north) / 2.0;
        let m_per_deg_lon = METERS_PER_DEGREE_LAT * mid_lat.to_radians().cos();

        Some(Self {
            north,
            west,
            m_per_deg_lon,
            width_m: (east - west) * m_per_deg_lon,
            height_m: (north - south) * METERS_PER_DEGREE_LAT,
        })
    }

    /// Pixel position of a point, y growing southward from the north edge.
    fn to_px(&self, point: &GeoPoint) -> (f64, f64) {
        let x = (point.longitude - self.west) * self.m_per_deg_lon * PIXELS_PER_METER + MARGIN_PX;
        let y = (self.north - point.latitude) * METERS_PER_DEGREE_LAT * PIXELS_PER_METER + MARGIN_PX;
        (x, y)
    }
}
