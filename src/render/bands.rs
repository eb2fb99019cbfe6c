use super::{
    BlendMode, CellFill, CompositeInput, Compositor, Primitive, Rgba, effective_intensity,
};
use crate::config::{HeatmapSettings, QualityThresholds};
use crate::quality::{Band, classify};

/// Display colour of a band at full intensity
///
/// `NoSignal` has no colour and is never drawn.
pub fn band_color(band: Band) -> Option<Rgba> {
    match band {
        Band::Excellent => Some(Rgba::rgb(76, 175, 80).with_alpha(0.8)),
        Band::Good => Some(Rgba::rgb(139, 195, 74).with_alpha(0.7)),
        Band::Fair => Some(Rgba::rgb(255, 235, 59).with_alpha(0.6)),
        Band::Poor => Some(Rgba::rgb(255, 152, 0).with_alpha(0.5)),
        Band::Weak => Some(Rgba::rgb(244, 67, 54).with_alpha(0.4)),
        Band::NoSignal => None,
    }
}

/// Paints every grid cell in its band colour
pub struct BandCompositor {
    blend: BlendMode,
}

impl BandCompositor {
    pub fn new(blend: BlendMode) -> Self {
        Self { blend }
    }
}

impl Compositor for BandCompositor {
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
        let size = grid.cell_size();
        let bounds = grid.bounds();

        grid.iter()
            .filter_map(|(col, row, value)| {
                let signal = value?;
                // Weak but unusable signal is left transparent.
                if signal < floor {
                    return None;
                }
                let band = classify(Some(signal), thresholds);
                let color = band_color(band)?;
                Some(Primitive::Cell(CellFill {
                    x: bounds.origin_x + col as f64 * size,
                    y: bounds.origin_y + row as f64 * size,
                    width: size,
                    height: size,
                    color: color.with_alpha(color.a * intensity),
                    band,
                    feather: settings.blur,
                }))
            })
            .collect()
    }

    fn blend_mode(&self) -> BlendMode {
        self.blend
    }
}
