mod test_layouts;

use signalfield::config::HeatmapSettings;
use signalfield::field::compute_field;
use signalfield::geometry::Bounds;
use signalfield::render::{
    BlendMode, CompositeInput, CompositorKind, PixelBuffer, Primitive, Rgba, create_compositor,
    paint,
};
use test_layouts::{emitter, itu_params, office_bounds, office_emitters, thresholds};

const KINDS: [CompositorKind; 3] = [
    CompositorKind::Bands,
    CompositorKind::Gradient,
    CompositorKind::Ramp,
];

fn alphas(primitives: &[Primitive]) -> Vec<f64> {
    primitives
        .iter()
        .flat_map(|p| match p {
            Primitive::Cell(c) => vec![c.color.a],
            Primitive::Radial(g) => g.stops.iter().map(|s| s.color.a).collect(),
        })
        .collect()
}

#[test]
fn test_alpha_is_linear_in_intensity() {
    let emitters = office_emitters();
    let params = itu_params();
    let grid = compute_field(&emitters, &office_bounds(), 2.0, &params).unwrap();
    let input = CompositeInput {
        grid: Some(&grid),
        emitters: &emitters,
        model: &params.model,
    };

    for kind in KINDS {
        let compositor = create_compositor(kind, BlendMode::Screen);
        let full = HeatmapSettings {
            intensity: 1.0,
            ..Default::default()
        };
        let quarter = HeatmapSettings {
            intensity: 0.25,
            ..Default::default()
        };
        let a = alphas(&compositor.composite(&input, &thresholds(), &full));
        let b = alphas(&compositor.composite(&input, &thresholds(), &quarter));
        assert!(!a.is_empty(), "{:?} drew nothing", kind);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(&b) {
            assert!((y - x * 0.25).abs() < 1e-12, "{:?}: {} vs {}", kind, x, y);
        }
    }
}

#[test]
fn test_disabled_heatmap_draws_nothing() {
    let emitters = office_emitters();
    let params = itu_params();
    let grid = compute_field(&emitters, &office_bounds(), 2.0, &params).unwrap();
    let input = CompositeInput {
        grid: Some(&grid),
        emitters: &emitters,
        model: &params.model,
    };
    let settings = HeatmapSettings {
        enabled: false,
        ..Default::default()
    };
    for kind in KINDS {
        let compositor = create_compositor(kind, BlendMode::Lighter);
        assert!(compositor.composite(&input, &thresholds(), &settings).is_empty());
    }
}

#[test]
fn test_overlapping_emitters_never_darken() {
    let bounds = Bounds::from_size(30.0, 10.0).unwrap();
    let params = itu_params();
    let left = vec![emitter("left", 10.0, 5.0, -20.0)];
    let both = vec![emitter("left", 10.0, 5.0, -20.0), emitter("right", 20.0, 5.0, -20.0)];

    for blend in [BlendMode::Screen, BlendMode::Lighter] {
        let compositor = create_compositor(CompositorKind::Gradient, blend);
        let render = |emitters: &[signalfield::emitter::Emitter]| {
            let input = CompositeInput {
                grid: None,
                emitters,
                model: &params.model,
            };
            let primitives = compositor.composite(&input, &thresholds(), &HeatmapSettings::default());
            let mut buffer = PixelBuffer::new(bounds, 0.5).unwrap();
            paint(&mut buffer, &primitives, compositor.blend_mode());
            buffer
        };

        let single = render(&left);
        let double = render(&both);
        for y in 0..single.height() {
            for x in 0..single.width() {
                let a = single.pixel(x, y).unwrap();
                let b = double.pixel(x, y).unwrap();
                for i in 0..4 {
                    assert!(b[i] >= a[i] - 1e-12, "{:?} darkened ({}, {})", blend, x, y);
                }
            }
        }
    }
}

#[test]
fn test_band_grid_renders_to_ppm() {
    let emitters = office_emitters();
    let params = itu_params();
    let grid = compute_field(&emitters, &office_bounds(), 1.0, &params).unwrap();
    let input = CompositeInput {
        grid: Some(&grid),
        emitters: &emitters,
        model: &params.model,
    };
    let compositor = create_compositor(CompositorKind::Bands, BlendMode::Screen);
    let primitives = compositor.composite(&input, &thresholds(), &HeatmapSettings::default());

    let mut buffer = PixelBuffer::new(office_bounds(), 1.0).unwrap();
    paint(&mut buffer, &primitives, compositor.blend_mode());
    let mut ppm = Vec::new();
    buffer.write_ppm(&mut ppm).unwrap();
    assert!(ppm.starts_with(b"P6\n60 40\n255\n"));

    // -69.7 dBm next to the lobby access point is fair (yellow), drawn once.
    let px = buffer.pixel(8, 8).unwrap();
    let yellow = Rgba::rgb(255, 235, 59).to_unit();
    let alpha = 0.6 * 0.8;
    for i in 0..3 {
        assert!((px[i] - yellow[i] * alpha).abs() < 1e-9);
    }
    assert!((px[3] - alpha).abs() < 1e-9);
}
