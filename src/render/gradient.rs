use super::{
    BlendMode, CompositeInput, Compositor, GradientStop, Primitive, RadialGradient, Rgba,
    band_color, effective_intensity,
};
use crate::config::{HeatmapSettings, QualityThresholds};
use crate::coverage::{band_radii, derive_coverage_radius};
use crate::quality::{Band, classify};

/// One radial gradient per emitter, banded by distance
///
/// Stops sit where the emitter's signal crosses each threshold, so the
/// gradient reproduces the band layout of an isolated emitter without
/// sampling a grid. Overlaps between emitters are left to the surface's
/// blend mode.
pub struct GradientCompositor {
    blend: BlendMode,
}

impl GradientCompositor {
    pub fn new(blend: BlendMode) -> Self {
        Self { blend }
    }
}

impl Compositor for GradientCompositor {
    fn composite(
        &self,
        input: &CompositeInput<'_>,
        thresholds: &QualityThresholds,
        settings: &HeatmapSettings,
    ) -> Vec<Primitive> {
        if !settings.enabled {
            return Vec::new();
        }
        let intensity = effective_intensity(settings);

        input
            .emitters
            .iter()
            .filter(|e| e.contributes())
            .filter_map(|e| {
                let coverage = derive_coverage_radius(e, thresholds, input.model);
                if coverage <= 0.0 {
                    return None;
                }
                let radius = coverage.max(settings.radius);
                let center_signal = e.tx_power_dbm
                    - input.model.attenuation_unchecked(0.0, e.frequency_mhz);
                let stops = band_stops(
                    center_signal,
                    &band_radii(e, thresholds, input.model),
                    coverage,
                    radius,
                    thresholds,
                    intensity,
                );
                Some(Primitive::Radial(RadialGradient {
                    emitter_id: e.id.clone(),
                    center: e.position,
                    radius,
                    stops,
                }))
            })
            .collect()
    }

    fn blend_mode(&self) -> BlendMode {
        self.blend
    }
}

fn scaled(band: Band, intensity: f64) -> Rgba {
    band_color(band)
        .map(|c| c.with_alpha(c.a * intensity))
        .unwrap_or(Rgba::TRANSPARENT)
}

fn band_stops(
    center_signal: f64,
    radii: &[f64; 4],
    coverage: f64,
    radius: f64,
    thresholds: &QualityThresholds,
    intensity: f64,
) -> Vec<GradientStop> {
    const OUTER: [Band; 4] = [Band::Good, Band::Fair, Band::Poor, Band::Weak];

    let mut stops = vec![GradientStop::new(
        0.0,
        scaled(classify(Some(center_signal), thresholds), intensity),
    )];
    for (distance, band) in radii.iter().zip(OUTER) {
        if *distance > 0.0 && *distance < coverage {
            stops.push(GradientStop::new(distance / radius, scaled(band, intensity)));
        }
    }
    let edge = scaled(Band::Weak, intensity);
    stops.push(GradientStop::new(coverage / radius, edge));
    if coverage < radius {
        stops.push(GradientStop::new(1.0, edge.with_alpha(0.0)));
    } else if let Some(last) = stops.last_mut() {
        last.color = last.color.with_alpha(0.0);
    }
    stops
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelKind;
    use crate::emitter::Emitter;
    use crate::geometry::Point;
    use crate::propagation::PathLossModel;

    fn composite(emitters: &[Emitter], intensity: f64) -> Vec<Primitive> {
        let model = PathLossModel::new(ModelKind::LogDistance, 3.0).unwrap();
        let input = CompositeInput {
            grid: None,
            emitters,
            model: &model,
        };
        let settings = HeatmapSettings {
            intensity,
            ..Default::default()
        };
        GradientCompositor::new(BlendMode::Screen).composite(
            &input,
            &QualityThresholds::default(),
            &settings,
        )
    }

    #[test]
    fn test_one_gradient_per_reaching_emitter() {
        let emitters = vec![
            Emitter::new("a", Point::new(10.0, 10.0), -30.0, 2437.0),
            Emitter::new("weak", Point::new(50.0, 50.0), -95.0, 2437.0),
        ];
        let prims = composite(&emitters, 1.0);
        assert_eq!(prims.len(), 1);
        let Primitive::Radial(g) = &prims[0] else {
            panic!("expected gradient");
        };
        assert_eq!(g.emitter_id, "a");
        assert!((g.radius - 100.0).abs() < 1e-9);
        assert!(g.stops.windows(2).all(|w| w[0].offset <= w[1].offset));
        assert_eq!(g.stops.last().map(|s| s.color.a), Some(0.0));
    }

    #[test]
    fn test_alpha_scales_linearly_with_intensity() {
        let emitters = vec![Emitter::new("a", Point::new(10.0, 10.0), -30.0, 2437.0)];
        let full = composite(&emitters, 1.0);
        let half = composite(&emitters, 0.5);
        let (Primitive::Radial(f), Primitive::Radial(h)) = (&full[0], &half[0]) else {
            panic!("expected gradients");
        };
        for (a, b) in f.stops.iter().zip(&h.stops) {
            assert!((b.color.a - a.color.a * 0.5).abs() < 1e-12);
        }
    }

    #[test]
    fn test_small_coverage_uses_minimum_radius() {
        // tx -85 dBm reaches the -90 dBm floor at 10^(5/30) ≈ 1.47 units.
        let emitters = vec![Emitter::new("a", Point::new(10.0, 10.0), -85.0, 2437.0)];
        let prims = composite(&emitters, 1.0);
        let Primitive::Radial(g) = &prims[0] else {
            panic!("expected gradient");
        };
        assert_eq!(g.radius, HeatmapSettings::default().radius);
        assert_eq!(g.stops.last().map(|s| s.offset), Some(1.0));
    }
}
