use super::*;

fn dublin_bounds() -> BoundingBox {
    BoundingBox {
        southwest: GeoPoint {
            latitude: 53.3490,
            longitude: -6.2660,
        },
        northeast: GeoPoint {
            latitude: 53.3496,
            longitude: -6.2650,
        },
    }
}

fn segment(index: u32, azimuth: f64, bounds: BoundingBox) -> RoofSegment {
    RoofSegment {
        index,
        area_m2: 80.0,
        pitch_degrees: 30.0,
        azimuth_degrees: azimuth,
        bounds,
        sunshine_hours: vec![],
    }
}

fn dublin_request(requested: u32) -> LayoutRequest {
    LayoutRequest {
        roof_segments: vec![segment(0, 180.0, dublin_bounds())],
        total_roof_area_m2: 64.0,
        flux_raster: None,
        requested_panel_count: requested,
        config: LayoutConfig::default(),
    }
}

/// A segment roughly 4 m × 4 m, only big enough for a handful of panels.
fn tiny_bounds() -> BoundingBox {
    let lat_span = 4.0 / 111_000.0;
    let lon_span = 4.0 / (111_000.0 * 53.349_f64.to_radians().cos());
    BoundingBox {
        southwest: GeoPoint {
            latitude: 53.3490,
            longitude: -6.2660,
        },
        northeast: GeoPoint {
            latitude: 53.3490 + lat_span,
            longitude: -6.2660 + lon_span,
        },
    }
}

fn assert_no_overlap(panels: &[PlacedPanel], config: &LayoutConfig) {
    let min_sep_lon = config.panel_width_m + config.panel_spacing_m;
    let min_sep_lat = config.panel_height_m + config.panel_spacing_m;
    let min_sep_euclid = min_sep_lat.min(min_sep_lon);
    let tolerance = 0.011;

    for (i, a) in panels.iter().enumerate() {
        for b in panels.iter().skip(i + 1) {
            let mid_lat = (a.position.latitude + b.position.latitude) / 2.0;
            let dlat_m = (a.position.latitude - b.position.latitude).abs() * 111_000.0;
            let dlon_m = (a.position.longitude - b.position.longitude).abs()
                * 111_000.0
                * mid_lat.to_radians().cos();

            let axis_clear =
                dlon_m >= min_sep_lon - tolerance || dlat_m >= min_sep_lat - tolerance;
            let dist = (dlat_m * dlat_m + dlon_m * dlon_m).sqrt();

            assert!(
                axis_clear,
                "panels at ({}, {}) and ({}, {}) overlap on both axes",
                a.position.latitude, a.position.longitude, b.position.latitude,
                b.position.longitude
            );
            assert!(
                dist >= min_sep_euclid - tolerance,
                "panels only {dist:.3} m apart, minimum is {min_sep_euclid:.3} m"
            );
        }
    }
}

#[test]
fn test_dublin_scenario_places_five_panels() {
    let request = dublin_request(5);
    let engine = LayoutEngine::new(request.clone()).unwrap();
    let result = engine.layout();

    assert_eq!(result.panels.len(), 5);
    assert_no_overlap(&result.panels, &request.config);

    let bounds = dublin_bounds();
    for panel in &result.panels {
        assert!(
            bounds.contains(&panel.position),
            "panel at ({}, {}) escaped the segment bounds",
            panel.position.latitude,
            panel.position.longitude
        );
        assert!(panel.yearly_energy_dc_kwh > 0.0);
        assert_eq!(panel.orientation, PanelOrientation::Landscape);
    }

    assert_eq!(result.metrics.panel_count, 5);
    assert!(result.metrics.annual_energy_kwh > 0.0);

    let expected_coverage = 5.0 * 1.6 * 0.8 / 64.0 * 100.0;
    assert!((result.metrics.roof_coverage_percent - expected_coverage).abs() < 1e-9);
}

#[test]
fn test_zero_requested_panels_gives_zero_metrics() {
    let engine = LayoutEngine::new(dublin_request(0)).unwrap();
    let result = engine.layout();

    assert!(result.panels.is_empty());
    assert_eq!(result.metrics.panel_count, 0);
    assert_eq!(result.metrics.annual_energy_kwh, 0.0);
    assert_eq!(result.metrics.monthly_savings, 0.0);
    assert_eq!(result.metrics.system_size_kw, 0.0);
    assert_eq!(result.metrics.roof_coverage_percent, 0.0);
    assert_eq!(result.metrics.co2_offset_kg_per_year, 0.0);
}

#[test]
fn test_capacity_shortfall_is_not_an_error() {
    let mut request = dublin_request(10_000);
    request.roof_segments = vec![segment(0, 180.0, tiny_bounds())];
    let engine = LayoutEngine::new(request).unwrap();
    let result = engine.layout();

    assert!(result.panels.len() < 10_000);
    assert!(!result.panels.is_empty(), "a 4x4 m segment holds at least one panel");
    // Every candidate on a tiny grid is collision-free with its
    // neighbors, so the shortfall count equals full capacity.
    assert_eq!(result.panels.len(), result.candidate_count);
}

#[test]
fn test_empty_roof_is_a_valid_zero_capacity_input() {
    let request = LayoutRequest {
        roof_segments: vec![],
        total_roof_area_m2: 0.0,
        flux_raster: None,
        requested_panel_count: 10,
        config: LayoutConfig::default(),
    };

    let engine = LayoutEngine::new(request).unwrap();
    let result = engine.layout();

    assert!(result.panels.is_empty());
    assert_eq!(result.candidate_count, 0);
    assert_eq!(result.metrics.panel_count, 0);
}

#[test]
fn test_south_facing_segment_outscores_north_facing() {
    let north_bounds = BoundingBox {
        southwest: GeoPoint {
            latitude: 53.3500,
            longitude: -6.2660,
        },
        northeast: GeoPoint {
            latitude: 53.3506,
            longitude: -6.2650,
        },
    };

    let request = LayoutRequest {
        roof_segments: vec![
            segment(0, 180.0, dublin_bounds()),
            segment(1, 0.0, north_bounds),
        ],
        total_roof_area_m2: 160.0,
        flux_raster: None,
        requested_panel_count: 0,
        config: LayoutConfig::default(),
    };

    let engine = LayoutEngine::new(request).unwrap();
    let ranked = engine.ranked_candidates();

    let south_min = ranked
        .iter()
        .filter(|c| c.segment_index == 0)
        .map(|c| c.estimated_yearly_energy_kwh)
        .fold(f64::INFINITY, f64::min);
    let north_max = ranked
        .iter()
        .filter(|c| c.segment_index == 1)
        .map(|c| c.estimated_yearly_energy_kwh)
        .fold(0.0, f64::max);

    assert!(
        south_min > north_max,
        "worst south slot ({south_min}) must beat best north slot ({north_max})"
    );
}

#[test]
fn test_selection_prefers_high_yield_segment() {
    let north_bounds = BoundingBox {
        southwest: GeoPoint {
            latitude: 53.3500,
            longitude: -6.2660,
        },
        northeast: GeoPoint {
            latitude: 53.3506,
            longitude: -6.2650,
        },
    };

    let request = LayoutRequest {
        roof_segments: vec![
            segment(0, 0.0, north_bounds),
            segment(1, 180.0, dublin_bounds()),
        ],
        total_roof_area_m2: 160.0,
        requested_panel_count: 8,
        flux_raster: None,
        config: LayoutConfig::default(),
    };

    let engine = LayoutEngine::new(request).unwrap();
    let result = engine.layout();

    assert_eq!(result.panels.len(), 8);
    // The south segment has ample capacity, so discovery order must not
    // leak north-facing panels into the selection.
    assert!(result.panels.iter().all(|p| p.segment_index == 1));
}

#[test]
fn test_placement_is_monotonic_in_requested_count() {
    let engine = LayoutEngine::new(dublin_request(0)).unwrap();
    let ranked = engine.ranked_candidates();

    let mut previous = engine.layout_from_pool(&ranked, 0);
    for k in 1..=12 {
        let current = engine.layout_from_pool(&ranked, k);
        assert_eq!(current.panels.len() as u32, k);

        for (a, b) in previous.panels.iter().zip(current.panels.iter()) {
            assert_eq!(a.position, b.position, "growing the count reordered panels");
        }
        assert!(current.metrics.annual_energy_kwh >= previous.metrics.annual_energy_kwh);

        previous = current;
    }
}

#[test]
fn test_placement_is_ranked_by_yield_descending() {
    let engine = LayoutEngine::new(dublin_request(20)).unwrap();
    let result = engine.layout();

    for pair in result.panels.windows(2) {
        assert!(pair[0].yearly_energy_dc_kwh >= pair[1].yearly_energy_dc_kwh);
    }
}

#[test]
fn test_layout_is_deterministic() {
    let request = dublin_request(15);
    let first = LayoutEngine::new(request.clone()).unwrap().layout();
    let second = LayoutEngine::new(request).unwrap().layout();

    let a = serde_json::to_string(&first.panels).unwrap();
    let b = serde_json::to_string(&second.panels).unwrap();
    assert_eq!(a, b);
    assert_eq!(first.metrics, second.metrics);
}

#[test]
fn test_metrics_are_idempotent_and_coverage_is_linear() {
    let engine = LayoutEngine::new(dublin_request(0)).unwrap();
    let ranked = engine.ranked_candidates();

    let four = engine.layout_from_pool(&ranked, 4);
    let four_again = engine.layout_from_pool(&ranked, 4);
    assert_eq!(four.metrics, four_again.metrics);

    let eight = engine.layout_from_pool(&ranked, 8);
    let per_panel_4 = four.metrics.roof_coverage_percent / 4.0;
    let per_panel_8 = eight.metrics.roof_coverage_percent / 8.0;
    assert!((per_panel_4 - per_panel_8).abs() < 1e-9);

    assert!((four.metrics.system_size_kw - 4.0 * 400.0 / 1000.0).abs() < 1e-9);
}

#[test]
fn test_savings_and_co2_follow_configured_rates() {
    let mut request = dublin_request(5);
    request.config.tariff_per_kwh = 0.30;
    request.config.grid_carbon_kg_per_kwh = 0.5;

    let engine = LayoutEngine::new(request).unwrap();
    let result = engine.layout();
    let annual = result.metrics.annual_energy_kwh;

    assert!((result.metrics.monthly_savings - annual / 12.0 * 0.30).abs() < 1e-9);
    assert!((result.metrics.co2_offset_kg_per_year - annual * 0.5).abs() < 1e-9);
}

#[test]
fn test_flux_raster_scoring_preferred_over_heuristic() {
    let mut request = dublin_request(5);
    request.flux_raster = Some(FluxRaster {
        width: 10,
        height: 10,
        bounds: dublin_bounds(),
        pixel_size_meters: 7.0,
        values: vec![1000.0; 100],
    });

    let engine = LayoutEngine::new(request).unwrap();
    let result = engine.layout();

    // 1000 kWh/m²/yr × 1.28 m² × 0.20 efficiency × 0.85 derating
    let expected = 1000.0 * 1.28 * 0.20 * 0.85;
    for panel in &result.panels {
        assert!((panel.yearly_energy_dc_kwh - expected).abs() < 1e-6);
    }
    assert!((result.metrics.annual_energy_kwh - 5.0 * expected).abs() < 1e-6);
}

#[test]
fn test_no_data_raster_falls_back_to_heuristic() {
    let mut request = dublin_request(5);
    request.flux_raster = Some(FluxRaster {
        width: 4,
        height: 4,
        bounds: dublin_bounds(),
        pixel_size_meters: 17.0,
        values: vec![-1.0; 16],
    });

    let engine = LayoutEngine::new(request).unwrap();
    let result = engine.layout();

    assert_eq!(result.panels.len(), 5);
    let base = LayoutConfig::default().base_panel_energy_kwh;
    for panel in &result.panels {
        // Heuristic range: base energy scaled by the edge-loss band.
        assert!(panel.yearly_energy_dc_kwh > base * 0.89);
        assert!(panel.yearly_energy_dc_kwh <= base);
    }
}

#[test]
fn test_raster_outside_roof_falls_back_to_heuristic() {
    let mut request = dublin_request(3);
    request.flux_raster = Some(FluxRaster {
        width: 4,
        height: 4,
        bounds: BoundingBox {
            southwest: GeoPoint {
                latitude: 40.0,
                longitude: 10.0,
            },
            northeast: GeoPoint {
                latitude: 40.001,
                longitude: 10.001,
            },
        },
        pixel_size_meters: 25.0,
        values: vec![1500.0; 16],
    });

    let engine = LayoutEngine::new(request).unwrap();
    let result = engine.layout();

    assert_eq!(result.panels.len(), 3);
    for panel in &result.panels {
        assert!(panel.yearly_energy_dc_kwh > 0.0);
    }
}

#[test]
fn test_uniform_raster_sample_is_exact() {
    let raster = FluxRaster {
        width: 8,
        height: 8,
        bounds: dublin_bounds(),
        pixel_size_meters: 8.0,
        values: vec![900.0; 64],
    };

    let value = raster.sample(&dublin_bounds().center()).unwrap();
    assert!((value - 900.0).abs() < 1e-9);

    let outside = GeoPoint {
        latitude: 53.40,
        longitude: -6.2655,
    };
    assert!(raster.sample(&outside).is_none());
}

#[test]
fn test_partial_coverage_raster_does_not_dilute_valid_pixels() {
    // West pixel has data, east pixel does not. A point inside the
    // valid pixel must score at full flux, not a blend toward zero.
    let bounds = dublin_bounds();
    let raster = FluxRaster {
        width: 2,
        height: 1,
        bounds,
        pixel_size_meters: 33.0,
        values: vec![1000.0, 0.0],
    };

    let lon_span = bounds.northeast.longitude - bounds.southwest.longitude;
    let mid_lat = bounds.center().latitude;

    let in_valid_pixel = GeoPoint {
        latitude: mid_lat,
        longitude: bounds.southwest.longitude + 0.4 * lon_span,
    };
    let value = raster.sample(&in_valid_pixel).unwrap();
    assert!(
        (value - 1000.0).abs() < 1e-9,
        "no-data neighbor diluted the sample to {value}"
    );

    // Deep inside the no-data pixel there is nothing to interpolate
    // from, so the sample reports "unknown" for the heuristic fallback.
    let in_no_data_pixel = GeoPoint {
        latitude: mid_lat,
        longitude: bounds.southwest.longitude + 0.9 * lon_span,
    };
    assert!(raster.sample(&in_no_data_pixel).is_none());
}

#[test]
fn test_inverted_bounds_fail_fast() {
    let mut request = dublin_request(5);
    let bounds = &mut request.roof_segments[0].bounds;
    std::mem::swap(&mut bounds.southwest, &mut bounds.northeast);

    let err = LayoutEngine::new(request).unwrap_err();
    assert!(matches!(err, LayoutError::InvalidGeometry(_)));
}

#[test]
fn test_non_finite_coordinates_fail_fast() {
    let mut request = dublin_request(5);
    request.roof_segments[0].bounds.southwest.latitude = f64::NAN;

    let err = LayoutEngine::new(request).unwrap_err();
    assert!(matches!(err, LayoutError::InvalidGeometry(_)));
}

#[test]
fn test_raster_length_mismatch_fails_fast() {
    let mut request = dublin_request(5);
    request.flux_raster = Some(FluxRaster {
        width: 10,
        height: 10,
        bounds: dublin_bounds(),
        pixel_size_meters: 7.0,
        values: vec![1000.0; 99],
    });

    let err = LayoutEngine::new(request).unwrap_err();
    assert!(matches!(err, LayoutError::InvalidGeometry(_)));
}

#[test]
fn test_negative_margin_rejected() {
    let mut request = dublin_request(5);
    request.config.margin_fraction = -0.1;

    let err = LayoutEngine::new(request).unwrap_err();
    assert!(matches!(err, LayoutError::InvalidInput(_)));
}

#[test]
fn test_segment_too_small_for_any_panel_yields_no_candidates() {
    // Half a meter square: no room for a 1.6 m panel.
    let lat_span = 0.5 / 111_000.0;
    let lon_span = 0.5 / (111_000.0 * 53.349_f64.to_radians().cos());
    let bounds = BoundingBox {
        southwest: GeoPoint {
            latitude: 53.3490,
            longitude: -6.2660,
        },
        northeast: GeoPoint {
            latitude: 53.3490 + lat_span,
            longitude: -6.2660 + lon_span,
        },
    };

    let request = LayoutRequest {
        roof_segments: vec![segment(0, 180.0, bounds)],
        total_roof_area_m2: 0.25,
        flux_raster: None,
        requested_panel_count: 3,
        config: LayoutConfig::default(),
    };

    let engine = LayoutEngine::new(request).unwrap();
    let result = engine.layout();

    assert_eq!(result.candidate_count, 0);
    assert!(result.panels.is_empty());
}

#[test]
fn test_tier_counts_track_segment_azimuth() {
    let north_bounds = BoundingBox {
        southwest: GeoPoint {
            latitude: 53.3500,
            longitude: -6.2660,
        },
        northeast: GeoPoint {
            latitude: 53.3506,
            longitude: -6.2650,
        },
    };

    let request = LayoutRequest {
        roof_segments: vec![
            segment(0, 180.0, dublin_bounds()),
            segment(1, 0.0, north_bounds),
        ],
        total_roof_area_m2: 160.0,
        flux_raster: None,
        requested_panel_count: 0,
        config: LayoutConfig::default(),
    };

    let engine = LayoutEngine::new(request).unwrap();
    let result = engine.layout();

    assert!(result.tier_counts.excellent > 0);
    assert!(result.tier_counts.marginal > 0);
    assert_eq!(result.tier_counts.total() as usize, result.candidate_count);
}

#[test]
fn test_azimuth_multiplier_monotonic_from_south() {
    let south = scoring::azimuth_multiplier(180.0);
    let southwest = scoring::azimuth_multiplier(225.0);
    let west = scoring::azimuth_multiplier(270.0);
    let northwest = scoring::azimuth_multiplier(315.0);
    let north = scoring::azimuth_multiplier(0.0);

    assert!(south >= southwest);
    assert!(southwest >= west);
    assert!(west >= northwest);
    assert!(northwest >= north);
    assert!(south > north, "south must strictly beat north");

    // Symmetric about due south.
    assert_eq!(
        scoring::azimuth_multiplier(150.0),
        scoring::azimuth_multiplier(210.0)
    );
    assert_eq!(
        scoring::azimuth_multiplier(90.0),
        scoring::azimuth_multiplier(270.0)
    );
}

#[test]
fn test_no_overlap_invariant_at_full_capacity() {
    let request = dublin_request(10_000);
    let config = request.config.clone();
    let engine = LayoutEngine::new(request).unwrap();
    let result = engine.layout();

    assert!(result.panels.len() > 10);
    assert_no_overlap(&result.panels, &config);
}
