use super::{BlendMode, CellFill, CompositeInput, Compositor, Primitive, effective_intensity};
use crate::config::{HeatmapSettings, QualityThresholds};
use crate::quality::classify;

/// Paints grid cells along the configured colour ramp
///
/// The ramp runs from the usability floor (t = 0) to the excellent
/// threshold (t = 1). Cells under the floor are not drawn.
pub struct RampCompositor {
    blend: BlendMode,
}

impl RampCompositor {
    pub fn new(blend: BlendMode) -> Self {
        Self { blend }
    }
}

impl Compositor for RampCompositor {
    fn composite(
        &self,
        input: &CompositeInput<'_>,
        thresholds: &QualityThresholds,
        settings: &HeatmapSettings,
    ) -> Vec<Primitive> {
        let Some(grid) = input.grid else {
            return Vec::new();
        };
        if !settings.enabled {
            return Vec::new();
        }

        let intensity = effective_intensity(settings);
        let floor = thresholds.usability_floor();
        let span = thresholds.excellent() - floor;
        let size = grid.cell_size();
        let bounds = grid.bounds();

        grid.iter()
            .filter_map(|(col, row, value)| {
                let signal = value?;
                if signal < floor {
                    return None;
                }
                let t = ((signal - floor) / span).clamp(0.0, 1.0);
                let color = settings.gradient.sample(t);
                Some(Primitive::Cell(CellFill {
                    x: bounds.origin_x + col as f64 * size,
                    y: bounds.origin_y + row as f64 * size,
                    width: size,
                    height: size,
                    color: color.with_alpha(color.a * intensity),
                    band: classify(Some(signal), thresholds),
                    feather: settings.blur,
                }))
            })
            .collect()
    }

    fn blend_mode(&self) -> BlendMode {
        self.blend
    }
}
