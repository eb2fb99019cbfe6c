use serde::{Deserialize, Serialize};

use crate::config::{QualityThresholds, ValidationRules};
use crate::coverage::{CoverageShape, derive_coverage_radius};
use crate::emitter::Emitter;
use crate::error::{CoverageError, Result};
use crate::geometry::Point;
use crate::propagation::PathLossModel;
use crate::quality::{Band, classify};
use crate::render::color::Rgba;

/// Drawing style stored with a coverage area
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoverageStyle {
    pub fill_color: Rgba,
    pub fill_opacity: f64,
    pub stroke_color: Rgba,
    pub stroke_width: f64,
}

impl Default for CoverageStyle {
    fn default() -> Self {
        Self {
            fill_color: Rgba::rgb(0x4C, 0xAF, 0x50),
            fill_opacity: 0.3,
            stroke_color: Rgba::rgb(0x21, 0x96, 0xF3),
            stroke_width: 2.0,
        }
    }
}

/// A region of acceptable signal attached to one emitter
///
/// Deserialised areas go through the same validation and normalisation as
/// [`CoverageArea::authored`], without size rules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "AreaRecord")]
pub struct CoverageArea {
    pub id: String,
    pub emitter_id: String,
    pub shape: CoverageShape,
    /// Per-area override of the global thresholds
    #[serde(default)]
    pub thresholds: Option<QualityThresholds>,
    #[serde(default)]
    pub style: CoverageStyle,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AreaRecord {
    id: String,
    emitter_id: String,
    shape: CoverageShape,
    #[serde(default)]
    thresholds: Option<QualityThresholds>,
    #[serde(default)]
    style: CoverageStyle,
}

impl TryFrom<AreaRecord> for CoverageArea {
    type Error = CoverageError;

    fn try_from(r: AreaRecord) -> Result<Self> {
        let mut area = Self::authored(r.id, r.emitter_id, r.shape, None)?.with_style(r.style);
        area.thresholds = r.thresholds;
        Ok(area)
    }
}

impl CoverageArea {
    /// Area drawn by a user; geometry is normalised and validated, never recomputed
    pub fn authored(
        id: impl Into<String>,
        emitter_id: impl Into<String>,
        shape: CoverageShape,
        rules: Option<&ValidationRules>,
    ) -> Result<Self> {
        shape.validate(rules)?;
        Ok(Self {
            id: id.into(),
            emitter_id: emitter_id.into(),
            shape: shape.normalized(),
            thresholds: None,
            style: CoverageStyle::default(),
        })
    }

    /// Circle around an emitter out to its usability floor
    pub fn derived(
        id: impl Into<String>,
        emitter: &Emitter,
        thresholds: &QualityThresholds,
        model: &PathLossModel,
    ) -> Result<Self> {
        let radius = derive_coverage_radius(emitter, thresholds, model);
        if radius <= 0.0 {
            return Err(CoverageError::DegenerateShape(format!(
                "emitter {} does not reach the usability floor of {:.1} dBm",
                emitter.id,
                thresholds.usability_floor()
            )));
        }
        let shape = CoverageShape::Circle {
            center: emitter.position,
            radius,
        };
        shape.validate(None)?;
        log::debug!("Derived coverage radius {:.1} for emitter {}", radius, emitter.id);
        Ok(Self {
            id: id.into(),
            emitter_id: emitter.id.clone(),
            shape,
            thresholds: None,
            style: CoverageStyle::default(),
        })
    }

    pub fn with_thresholds(mut self, thresholds: QualityThresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    pub fn with_style(mut self, style: CoverageStyle) -> Self {
        self.style = style;
        self
    }

    pub fn effective_thresholds<'a>(&'a self, global: &'a QualityThresholds) -> &'a QualityThresholds {
        self.thresholds.as_ref().unwrap_or(global)
    }

    /// Quality of `signal_dbm` at `point` as seen by this area
    ///
    /// Points outside the shape have no signal from this area's point of view.
    pub fn quality_at(&self, point: &Point, signal_dbm: Option<f64>, global: &QualityThresholds) -> Band {
        if !self.shape.contains(point) {
            return Band::NoSignal;
        }
        classify(signal_dbm, self.effective_thresholds(global))
    }
}
