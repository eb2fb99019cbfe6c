//! Turning field values into drawable primitives.
//!
//! Compositors know about colour but not about pixels. A [`Surface`]
//! implementation owns the step from primitive to pixels, so the numeric
//! engine never depends on a drawing API.

mod bands;
pub mod color;
mod gradient;
mod ramp;
pub mod surface;

use serde::Serialize;

use crate::config::{HeatmapSettings, QualityThresholds};
use crate::emitter::Emitter;
use crate::field::Grid;
use crate::geometry::Point;
use crate::propagation::PathLossModel;
use crate::quality::Band;

pub use self::bands::{BandCompositor, band_color};
pub use self::color::{BlendMode, ColorRamp, GradientStop, Rgba};
pub use self::gradient::GradientCompositor;
pub use self::ramp::RampCompositor;
pub use self::surface::{MAX_PIXELS, PixelBuffer, Surface, paint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CompositorKind {
    /// One filled cell per classified grid cell
    #[default]
    Bands,
    /// One radial gradient per emitter
    Gradient,
    /// Continuous colour ramp per grid cell
    Ramp,
}

/// A filled rectangle in plan units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellFill {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Colour with the final alpha applied
    pub color: Rgba,
    pub band: Band,
    /// Edge softening in plan units, left to the surface
    pub feather: f64,
}

/// A radial gradient centred on an emitter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadialGradient {
    pub emitter_id: String,
    pub center: Point,
    pub radius: f64,
    /// Offsets relative to `radius`, increasing
    pub stops: Vec<GradientStop>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Primitive {
    Cell(CellFill),
    Radial(RadialGradient),
}

/// What a compositor may draw from
#[derive(Debug, Clone, Copy)]
pub struct CompositeInput<'a> {
    pub grid: Option<&'a Grid>,
    pub emitters: &'a [Emitter],
    pub model: &'a PathLossModel,
}

pub trait Compositor: Send {
    fn composite(
        &self,
        input: &CompositeInput<'_>,
        thresholds: &QualityThresholds,
        settings: &HeatmapSettings,
    ) -> Vec<Primitive>;

    /// How overlapping primitives combine
    fn blend_mode(&self) -> BlendMode {
        BlendMode::Screen
    }
}

pub fn create_compositor(kind: CompositorKind, blend: BlendMode) -> Box<dyn Compositor> {
    match kind {
        CompositorKind::Bands => Box::new(BandCompositor::new(blend)),
        CompositorKind::Gradient => Box::new(GradientCompositor::new(blend)),
        CompositorKind::Ramp => Box::new(RampCompositor::new(blend)),
    }
}

pub(crate) fn effective_intensity(settings: &HeatmapSettings) -> f64 {
    settings.intensity.clamp(0.0, 1.0)
}
