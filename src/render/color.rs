use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 8-bit RGB colour with a fractional alpha
///
/// Parses from `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Opacity (0-1)
    pub a: f64,
}

impl Rgba {
    pub const TRANSPARENT: Rgba = Rgba {
        r: 0,
        g: 0,
        b: 0,
        a: 0.0,
    };

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn with_alpha(self, a: f64) -> Self {
        Self {
            a: a.clamp(0.0, 1.0),
            ..self
        }
    }

    /// Channels as fractions in 0-1, alpha last
    pub fn to_unit(&self) -> [f64; 4] {
        [
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
            self.a,
        ]
    }

    /// Linear interpolation between two colours, `t` in 0-1
    pub fn lerp(&self, other: &Rgba, t: f64) -> Rgba {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgba {
            r: mix(self.r, other.r),
            g: mix(self.g, other.g),
            b: mix(self.b, other.b),
            a: self.a + (other.a - self.a) * t,
        }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.a >= 1.0 {
            write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            let a = (self.a.clamp(0.0, 1.0) * 255.0).round() as u8;
            write!(f, "#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, a)
        }
    }
}

impl FromStr for Rgba {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s
            .trim()
            .strip_prefix('#')
            .ok_or_else(|| format!("colour must start with '#': {}", s))?;
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(format!("expected #rrggbb or #rrggbbaa: {}", s));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| format!("invalid colour: {}", s))
        };
        let a = if hex.len() == 8 {
            channel(6)? as f64 / 255.0
        } else {
            1.0
        };
        Ok(Rgba {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a,
        })
    }
}

impl TryFrom<String> for Rgba {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgba> for String {
    fn from(c: Rgba) -> Self {
        c.to_string()
    }
}

/// A colour at a fractional position along a gradient
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Rgba,
}

impl GradientStop {
    pub fn new(offset: f64, color: Rgba) -> Self {
        Self { offset, color }
    }
}

/// Piecewise-linear colour map over 0-1
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<GradientStop>", into = "Vec<GradientStop>")]
pub struct ColorRamp {
    stops: Vec<GradientStop>,
}

impl ColorRamp {
    /// Stops must be in 0-1, in non-decreasing order, at least two of them
    pub fn new(stops: Vec<GradientStop>) -> Result<Self, String> {
        if stops.len() < 2 {
            return Err("colour ramp needs at least two stops".to_string());
        }
        if stops
            .iter()
            .any(|s| !(0.0..=1.0).contains(&s.offset))
        {
            return Err("colour ramp offsets must lie within 0..=1".to_string());
        }
        if stops.windows(2).any(|w| w[1].offset < w[0].offset) {
            return Err("colour ramp offsets must be increasing".to_string());
        }
        Ok(Self { stops })
    }

    pub fn stops(&self) -> &[GradientStop] {
        &self.stops
    }

    /// Colour at `t`, clamped to the ramp ends
    pub fn sample(&self, t: f64) -> Rgba {
        sample_stops(&self.stops, t)
    }
}

impl Default for ColorRamp {
    fn default() -> Self {
        let stops = [
            (0.0, Rgba::rgb(0x31, 0x36, 0x95)),
            (0.1, Rgba::rgb(0x45, 0x75, 0xb4)),
            (0.3, Rgba::rgb(0x74, 0xad, 0xd1)),
            (0.5, Rgba::rgb(0xab, 0xd9, 0xe9)),
            (0.7, Rgba::rgb(0xfe, 0xe0, 0x90)),
            (0.9, Rgba::rgb(0xf4, 0x6d, 0x43)),
            (1.0, Rgba::rgb(0xa5, 0x00, 0x26)),
        ];
        Self {
            stops: stops
                .iter()
                .map(|&(offset, color)| GradientStop::new(offset, color))
                .collect(),
        }
    }
}

impl TryFrom<Vec<GradientStop>> for ColorRamp {
    type Error = String;

    fn try_from(stops: Vec<GradientStop>) -> Result<Self, Self::Error> {
        Self::new(stops)
    }
}

impl From<ColorRamp> for Vec<GradientStop> {
    fn from(ramp: ColorRamp) -> Self {
        ramp.stops
    }
}

/// Interpolate along sorted stops
pub fn sample_stops(stops: &[GradientStop], t: f64) -> Rgba {
    let (Some(first), Some(last)) = (stops.first(), stops.last()) else {
        return Rgba::TRANSPARENT;
    };
    if t <= first.offset {
        return first.color;
    }
    if t >= last.offset {
        return last.color;
    }
    for pair in stops.windows(2) {
        let (lo, hi) = (&pair[0], &pair[1]);
        if t <= hi.offset {
            let span = hi.offset - lo.offset;
            if span <= 0.0 {
                return hi.color;
            }
            return lo.color.lerp(&hi.color, (t - lo.offset) / span);
        }
    }
    last.color
}

/// Compositing operator used where primitives overlap
///
/// Both modes only ever lighten the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// `1 − (1 − dst)(1 − src·α)`
    #[default]
    Screen,
    /// `min(1, dst + src·α)`
    Lighter,
}

impl BlendMode {
    /// Blend `src` over `dst`, both as unit RGBA
    pub fn blend(&self, dst: [f64; 4], src: [f64; 4]) -> [f64; 4] {
        let alpha = src[3].clamp(0.0, 1.0);
        let mut out = [0.0; 4];
        for i in 0..3 {
            let s = src[i] * alpha;
            out[i] = match self {
                BlendMode::Screen => 1.0 - (1.0 - dst[i]) * (1.0 - s),
                BlendMode::Lighter => (dst[i] + s).min(1.0),
            };
        }
        out[3] = match self {
            BlendMode::Screen => 1.0 - (1.0 - dst[3]) * (1.0 - alpha),
            BlendMode::Lighter => (dst[3] + alpha).min(1.0),
        };
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        let c: Rgba = "#4CAF50".parse().unwrap();
        assert_eq!(c, Rgba::rgb(76, 175, 80));
        let c: Rgba = "#ff000080".parse().unwrap();
        assert_eq!((c.r, c.g, c.b), (255, 0, 0));
        assert!((c.a - 128.0 / 255.0).abs() < 1e-12);
        assert!("4CAF50".parse::<Rgba>().is_err());
        assert!("#4CAF5".parse::<Rgba>().is_err());
        assert!("#GGGGGG".parse::<Rgba>().is_err());
    }

    #[test]
    fn test_display_round_trip() {
        let c = Rgba::rgb(0x31, 0x36, 0x95);
        assert_eq!(c.to_string(), "#313695");
        assert_eq!(c.to_string().parse::<Rgba>().unwrap(), c);
    }

    #[test]
    fn test_ramp_sampling() {
        let ramp = ColorRamp::default();
        assert_eq!(ramp.sample(-1.0), Rgba::rgb(0x31, 0x36, 0x95));
        assert_eq!(ramp.sample(2.0), Rgba::rgb(0xa5, 0x00, 0x26));
        assert_eq!(ramp.sample(0.5), Rgba::rgb(0xab, 0xd9, 0xe9));
        let mid = ramp.sample(0.05);
        assert!(mid.r > 0x31 && mid.r < 0x45);
    }

    #[test]
    fn test_ramp_rejects_bad_stops() {
        assert!(ColorRamp::new(vec![GradientStop::new(0.0, Rgba::rgb(0, 0, 0))]).is_err());
        assert!(
            ColorRamp::new(vec![
                GradientStop::new(0.5, Rgba::rgb(0, 0, 0)),
                GradientStop::new(0.2, Rgba::rgb(0, 0, 0)),
            ])
            .is_err()
        );
    }

    #[test]
    fn test_blend_never_darkens() {
        let dsts = [[0.0, 0.0, 0.0, 0.0], [0.3, 0.6, 0.9, 0.5], [1.0, 1.0, 1.0, 1.0]];
        let srcs = [[0.0, 0.0, 0.0, 1.0], [0.2, 0.8, 0.4, 0.5], [1.0, 0.0, 0.5, 0.0]];
        for mode in [BlendMode::Screen, BlendMode::Lighter] {
            for dst in dsts {
                for src in srcs {
                    let out = mode.blend(dst, src);
                    for i in 0..4 {
                        assert!(out[i] >= dst[i] - 1e-12, "{:?} darkened", mode);
                        assert!(out[i] <= 1.0 + 1e-12);
                    }
                }
            }
        }
    }
}
