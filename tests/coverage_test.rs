mod test_layouts;

use approx::assert_relative_eq;
use signalfield::CoverageError;
use signalfield::config::{QualityThresholds, ValidationRules};
use signalfield::coverage::{CoverageArea, CoverageShape, band_radii, derive_coverage_radius};
use signalfield::field::{compute_field, signal_at};
use signalfield::geometry::Point;
use signalfield::quality::{Band, classify};
use test_layouts::{emitter, itu_params, log_distance_params, office_bounds, office_emitters, thresholds};

#[test]
fn test_log_distance_radius_closed_form() {
    let model = log_distance_params().model;
    let e = emitter("a", 20.0, 20.0, -30.0);
    assert_relative_eq!(
        derive_coverage_radius(&e, &thresholds(), &model),
        100.0,
        max_relative = 1e-12
    );
}

#[test]
fn test_derived_area_matches_field_classification() {
    let params = itu_params();
    let e = emitter("a", 30.0, 20.0, -20.0);
    let area = CoverageArea::derived("a-coverage", &e, &thresholds(), &params.model).unwrap();
    let CoverageShape::Circle { radius, .. } = area.shape else {
        panic!("derived areas are circles");
    };

    let floor = thresholds().usability_floor();
    let grid = compute_field(&[e.clone()], &office_bounds(), 1.0, &params).unwrap();
    for (col, row, value) in grid.iter() {
        let center = grid.cell_center(col, row);
        let inside = area.shape.contains(&center);
        let usable = value.unwrap() >= floor;
        if center.distance_to(&e.position) < radius - 1e-6 {
            assert!(inside && usable);
        } else if center.distance_to(&e.position) > radius + 1e-6 {
            assert!(!inside && !usable);
        }
    }
}

#[test]
fn test_band_boundaries_hold_at_radii() {
    let params = itu_params();
    let e = emitter("a", 0.0, 0.0, 0.0);
    let radii = band_radii(&e, &thresholds(), &params.model);
    let expected = [Band::Excellent, Band::Good, Band::Fair, Band::Poor];
    for (radius, band) in radii.iter().zip(expected) {
        let just_inside = signal_at(&[e.clone()], &Point::new(radius * 0.999, 0.0), &params)
            .unwrap();
        assert_eq!(classify(just_inside, &thresholds()), band);
    }
}

#[test]
fn test_weak_emitter_has_no_derived_area() {
    let params = itu_params();
    let e = emitter("weak", 5.0, 5.0, -60.0);
    let err = CoverageArea::derived("weak-coverage", &e, &thresholds(), &params.model).unwrap_err();
    assert!(matches!(err, CoverageError::DegenerateShape(_)));
}

#[test]
fn test_authored_shapes_are_validated() {
    let rules = ValidationRules::default();

    let rect = CoverageShape::Rectangle {
        x: 40.0,
        y: 30.0,
        width: -20.0,
        height: -10.0,
    };
    let area = CoverageArea::authored("r", "ap-open", rect, Some(&rules)).unwrap();
    assert_eq!(
        area.shape,
        CoverageShape::Rectangle {
            x: 20.0,
            y: 20.0,
            width: 20.0,
            height: 10.0
        }
    );

    let bowtie = CoverageShape::Polygon {
        points: vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(10.0, 0.0),
            Point::new(0.0, 10.0),
        ],
    };
    assert!(CoverageArea::authored("p", "ap-open", bowtie, Some(&rules)).is_err());

    let huge = CoverageShape::Circle {
        center: Point::new(0.0, 0.0),
        radius: 100.0,
    };
    assert!(CoverageArea::authored("c", "ap-open", huge.clone(), Some(&rules)).is_err());
    assert!(CoverageArea::authored("c", "ap-open", huge, None).is_ok());
}

#[test]
fn test_area_threshold_override() {
    let params = itu_params();
    let emitters = office_emitters();
    let strict = QualityThresholds::new(-40.0, -45.0, -50.0, -55.0).unwrap();
    let area = CoverageArea::authored(
        "meeting",
        "ap-meeting",
        CoverageShape::Circle {
            center: Point::new(52.0, 34.0),
            radius: 5.0,
        },
        None,
    )
    .unwrap()
    .with_thresholds(strict);

    let point = Point::new(50.0, 34.0);
    let signal = signal_at(&emitters, &point, &params).unwrap();
    let global = thresholds();
    assert!(area.quality_at(&point, signal, &global).rank() <= classify(signal, &global).rank());
    assert_eq!(
        area.quality_at(&Point::new(0.0, 0.0), signal, &global),
        Band::NoSignal
    );
}

#[test]
fn test_area_json_uses_registry_shape() {
    let json = r##"{
        "id": "zone-1",
        "emitterId": "ap-lobby",
        "shape": {"kind": "polygon", "points": [{"x": 0, "y": 0}, {"x": 10, "y": 0}, {"x": 5, "y": 8}]},
        "style": {"fillColor": "#ff0000", "fillOpacity": 0.5}
    }"##;
    let area: CoverageArea = serde_json::from_str(json).unwrap();
    assert_eq!(area.emitter_id, "ap-lobby");
    assert!(area.thresholds.is_none());
    assert_eq!(area.style.fill_opacity, 0.5);
    assert_eq!(area.style.stroke_width, 2.0);
    assert!(area.shape.validate(None).is_ok());
}
