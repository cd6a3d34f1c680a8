use egui::Color32;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CanvasError, CanvasResult};

/// Width of the pen used to draw in-progress previews
pub const PREVIEW_PEN_WIDTH: u32 = 2;
/// Color of the pen used to draw in-progress previews
pub const PREVIEW_PEN_COLOR: Color32 = Color32::BLACK;

/// An enumerated brush attribute whose legal values have symbolic names.
pub trait NamedConstant: Sized + Copy + 'static {
    /// Human readable name of the attribute, used in error messages
    const FIELD: &'static str;
    /// Every legal value of the attribute
    const ALL: &'static [Self];

    /// The symbolic name of this value
    fn name(&self) -> &'static str;

    /// Resolve a symbolic name (case-insensitive) against the legal set
    fn from_name(name: &str) -> CanvasResult<Self> {
        let wanted = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|value| value.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CanvasError::invalid_parameter(Self::FIELD, name))
    }
}

macro_rules! named_constant_impls {
    ($ty:ty) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = CanvasError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                <$ty as NamedConstant>::from_name(s)
            }
        }
    };
}

/// How pointer gestures are interpreted by the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum BrushMode {
    /// Every pointer move commits a segment immediately
    #[default]
    Freehand,
    /// A single line from the press point, previewed until release
    StraightLine,
}

impl NamedConstant for BrushMode {
    const FIELD: &'static str = "brush type";
    const ALL: &'static [Self] = &[Self::Freehand, Self::StraightLine];

    fn name(&self) -> &'static str {
        match self {
            Self::Freehand => "BRUSH",
            Self::StraightLine => "LINE",
        }
    }
}

named_constant_impls!(BrushMode);

/// Dash pattern applied along a stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LinePattern {
    #[default]
    Solid,
    Dash,
    Dot,
    DashDot,
    DashDotDot,
    /// Uses the brush's custom dash list
    Custom,
}

impl LinePattern {
    /// On/off lengths in units of pen width, or `None` for an unbroken line.
    /// `custom` is only consulted for [`LinePattern::Custom`].
    pub fn dash_units(&self, custom: &[f32]) -> Option<Vec<f32>> {
        match self {
            Self::Solid => None,
            Self::Dash => Some(vec![4.0, 2.0]),
            Self::Dot => Some(vec![1.0, 2.0]),
            Self::DashDot => Some(vec![4.0, 2.0, 1.0, 2.0]),
            Self::DashDotDot => Some(vec![4.0, 2.0, 1.0, 2.0, 1.0, 2.0]),
            Self::Custom => Some(custom.to_vec()),
        }
    }
}

impl NamedConstant for LinePattern {
    const FIELD: &'static str = "line type";
    const ALL: &'static [Self] = &[
        Self::Solid,
        Self::Dash,
        Self::Dot,
        Self::DashDot,
        Self::DashDotDot,
        Self::Custom,
    ];

    fn name(&self) -> &'static str {
        match self {
            Self::Solid => "SOLID",
            Self::Dash => "DASH",
            Self::Dot => "DOT",
            Self::DashDot => "DASH_DOT",
            Self::DashDotDot => "DASH_DOT_DOT",
            Self::Custom => "CUSTOM",
        }
    }
}

named_constant_impls!(LinePattern);

/// Shape drawn at the ends of a stroke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CapStyle {
    #[default]
    Round,
    Square,
    Flat,
}

impl NamedConstant for CapStyle {
    const FIELD: &'static str = "cap type";
    const ALL: &'static [Self] = &[Self::Round, Self::Square, Self::Flat];

    fn name(&self) -> &'static str {
        match self {
            Self::Round => "ROUND",
            Self::Square => "SQUARE",
            Self::Flat => "FLAT",
        }
    }
}

named_constant_impls!(CapStyle);

/// Shape used where two connected segments meet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JoinStyle {
    Miter,
    Bevel,
    #[default]
    Round,
}

impl NamedConstant for JoinStyle {
    const FIELD: &'static str = "join type";
    const ALL: &'static [Self] = &[Self::Miter, Self::Bevel, Self::Round];

    fn name(&self) -> &'static str {
        match self {
            Self::Miter => "MITER",
            Self::Bevel => "BEVEL",
            Self::Round => "ROUND",
        }
    }
}

named_constant_impls!(JoinStyle);

/// Resolved stroke configuration handed to the pixel buffer
#[derive(Debug, Clone, PartialEq)]
pub struct PenStyle {
    pub width: u32,
    pub color: Color32,
    pub pattern: LinePattern,
    pub cap: CapStyle,
    pub join: JoinStyle,
    /// Custom on/off lengths in pen-width units, used by [`LinePattern::Custom`]
    pub custom_dashes: Vec<f32>,
}

impl PenStyle {
    pub fn new(width: u32, color: Color32) -> Self {
        Self {
            width,
            color,
            pattern: LinePattern::Solid,
            cap: CapStyle::Round,
            join: JoinStyle::Round,
            custom_dashes: Vec::new(),
        }
    }

    pub fn with_pattern(mut self, pattern: LinePattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_cap(mut self, cap: CapStyle) -> Self {
        self.cap = cap;
        self
    }

    pub fn with_join(mut self, join: JoinStyle) -> Self {
        self.join = join;
        self
    }

    pub fn with_custom_dashes(mut self, dashes: Vec<f32>) -> Self {
        self.custom_dashes = dashes;
        self
    }

    /// Half of the stroke width in pixels; a zero width pen still covers one pixel
    pub fn half_width(&self) -> f32 {
        self.width.max(1) as f32 / 2.0
    }

    /// On/off dash lengths in pixels, or `None` when the stroke is unbroken
    pub fn dash_lengths(&self) -> Option<Vec<f32>> {
        let unit = self.width.max(1) as f32;
        self.pattern
            .dash_units(&self.custom_dashes)
            .filter(|units| !units.is_empty())
            .map(|units| units.into_iter().map(|u| u * unit).collect())
    }
}

/// The user's current brush: the parameters of one pen plus the active tool mode.
///
/// Changes take effect on the next stroke; strokes already on the canvas are never touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrushModel {
    size: u32,
    color: Color32,
    line: LinePattern,
    cap: CapStyle,
    join: JoinStyle,
    mode: BrushMode,
    custom_dashes: Vec<f32>,
}

impl Default for BrushModel {
    fn default() -> Self {
        Self {
            size: 10,
            color: Color32::RED,
            line: LinePattern::Solid,
            cap: CapStyle::Round,
            join: JoinStyle::Round,
            mode: BrushMode::Freehand,
            custom_dashes: vec![3.0, 3.0],
        }
    }
}

impl BrushModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore every attribute to its default
    pub fn reset_defaults(&mut self) {
        *self = Self::default();
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn color(&self) -> Color32 {
        self.color
    }

    pub fn line_pattern(&self) -> LinePattern {
        self.line
    }

    pub fn cap(&self) -> CapStyle {
        self.cap
    }

    pub fn join(&self) -> JoinStyle {
        self.join
    }

    pub fn mode(&self) -> BrushMode {
        self.mode
    }

    pub fn custom_dash_pattern(&self) -> &[f32] {
        &self.custom_dashes
    }

    /// Set the stroke width in pixels. Zero is rejected.
    pub fn set_size(&mut self, size: u32) -> CanvasResult<()> {
        if size == 0 {
            log::warn!("Rejected brush size {}", size);
            return Err(CanvasError::invalid_parameter("brush size", size));
        }
        self.size = size;
        Ok(())
    }

    pub fn set_color(&mut self, color: Color32) {
        self.color = color;
    }

    /// Set the color from a palette name (`"red"`, `"dark_blue"`, ...) or a `#rrggbb[aa]` hex code
    pub fn set_color_by_name(&mut self, name: &str) -> CanvasResult<()> {
        self.color = parse_color(name).inspect_err(|err| log::warn!("{}", err))?;
        Ok(())
    }

    pub fn set_line_pattern(&mut self, line: LinePattern) {
        self.line = line;
    }

    pub fn set_line_pattern_by_name(&mut self, name: &str) -> CanvasResult<()> {
        self.line = resolve(name)?;
        Ok(())
    }

    pub fn set_cap(&mut self, cap: CapStyle) {
        self.cap = cap;
    }

    pub fn set_cap_by_name(&mut self, name: &str) -> CanvasResult<()> {
        self.cap = resolve(name)?;
        Ok(())
    }

    pub fn set_join(&mut self, join: JoinStyle) {
        self.join = join;
    }

    pub fn set_join_by_name(&mut self, name: &str) -> CanvasResult<()> {
        self.join = resolve(name)?;
        Ok(())
    }

    pub fn set_mode(&mut self, mode: BrushMode) {
        self.mode = mode;
    }

    pub fn set_mode_by_name(&mut self, name: &str) -> CanvasResult<()> {
        self.mode = resolve(name)?;
        Ok(())
    }

    /// Set the on/off lengths used by [`LinePattern::Custom`], in units of pen width.
    ///
    /// The list must be non-empty, have an even number of entries and contain only
    /// positive, finite lengths.
    pub fn set_custom_dash_pattern(&mut self, dashes: Vec<f32>) -> CanvasResult<()> {
        validate_dashes(&dashes)?;
        self.custom_dashes = dashes;
        Ok(())
    }

    /// Set one attribute from its textual form, as option pickers report them.
    ///
    /// `field` is one of `size`, `color`, `line`, `cap`, `join` or `mode`.
    pub fn set_attribute(&mut self, field: &str, value: &str) -> CanvasResult<()> {
        match field.trim().to_ascii_lowercase().as_str() {
            "size" => {
                let size = value
                    .trim()
                    .parse()
                    .map_err(|_| CanvasError::invalid_parameter("brush size", value))?;
                self.set_size(size)
            }
            "color" | "colour" => self.set_color_by_name(value),
            "line" => self.set_line_pattern_by_name(value),
            "cap" => self.set_cap_by_name(value),
            "join" => self.set_join_by_name(value),
            "mode" | "type" => self.set_mode_by_name(value),
            _ => Err(CanvasError::invalid_parameter("brush attribute", field)),
        }
    }

    /// Check every attribute against its legal range, used after deserializing
    pub fn validate(&self) -> CanvasResult<()> {
        if self.size == 0 {
            return Err(CanvasError::invalid_parameter("brush size", self.size));
        }
        validate_dashes(&self.custom_dashes)
    }

    /// The pen committed strokes are drawn with
    pub fn main_pen(&self) -> PenStyle {
        self.pen_with(self.size, self.color)
    }

    /// A thin neutral pen with the same shape parameters, for in-progress previews
    pub fn preview_pen(&self) -> PenStyle {
        self.pen_with(PREVIEW_PEN_WIDTH, PREVIEW_PEN_COLOR)
    }

    fn pen_with(&self, width: u32, color: Color32) -> PenStyle {
        PenStyle::new(width, color)
            .with_pattern(self.line)
            .with_cap(self.cap)
            .with_join(self.join)
            .with_custom_dashes(self.custom_dashes.clone())
    }
}

fn resolve<T: NamedConstant>(name: &str) -> CanvasResult<T> {
    T::from_name(name).inspect_err(|err| log::warn!("{}", err))
}

fn validate_dashes(dashes: &[f32]) -> CanvasResult<()> {
    let well_formed = !dashes.is_empty()
        && dashes.len() % 2 == 0
        && dashes.iter().all(|d| d.is_finite() && *d > 0.0);
    if well_formed {
        Ok(())
    } else {
        Err(CanvasError::invalid_parameter(
            "dash pattern",
            format!("{:?}", dashes),
        ))
    }
}

const NAMED_COLORS: &[(&str, Color32)] = &[
    ("white", Color32::WHITE),
    ("black", Color32::BLACK),
    ("red", Color32::RED),
    ("dark_red", Color32::DARK_RED),
    ("green", Color32::GREEN),
    ("dark_green", Color32::DARK_GREEN),
    ("blue", Color32::BLUE),
    ("dark_blue", Color32::DARK_BLUE),
    ("cyan", Color32::from_rgb(0, 255, 255)),
    ("magenta", Color32::from_rgb(255, 0, 255)),
    ("yellow", Color32::YELLOW),
    ("gray", Color32::GRAY),
    ("light_gray", Color32::LIGHT_GRAY),
    ("dark_gray", Color32::DARK_GRAY),
    ("transparent", Color32::TRANSPARENT),
];

/// Parse a palette name or a `#rrggbb` / `#rrggbbaa` hex code
pub fn parse_color(name: &str) -> CanvasResult<Color32> {
    let trimmed = name.trim();
    if let Some(hex) = trimmed.strip_prefix('#') {
        return parse_hex(hex).ok_or_else(|| CanvasError::invalid_parameter("color", name));
    }
    NAMED_COLORS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(trimmed))
        .map(|(_, color)| *color)
        .ok_or_else(|| CanvasError::invalid_parameter("color", name))
}

fn parse_hex(hex: &str) -> Option<Color32> {
    if !hex.is_ascii() || !(hex.len() == 6 || hex.len() == 8) {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let (r, g, b) = (channel(0)?, channel(2)?, channel(4)?);
    let a = if hex.len() == 8 { channel(6)? } else { 255 };
    Some(Color32::from_rgba_unmultiplied(r, g, b, a))
}
