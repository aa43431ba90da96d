use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// RGBA color in normalized 0..=1 channel values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub red: f32,
    pub green: f32,
    pub blue: f32,
    pub alpha: f32,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);

    #[must_use]
    pub const fn rgba(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    #[must_use]
    pub const fn rgb(red: f32, green: f32, blue: f32) -> Self {
        Self::rgba(red, green, blue, 1.0)
    }

    /// Builds an opaque color from a `0xRRGGBB` literal.
    #[must_use]
    pub fn from_hex(rgb: u32) -> Self {
        let channel = |shift: u32| f32::from(((rgb >> shift) & 0xff) as u8) / 255.0;
        Self::rgb(channel(16), channel(8), channel(0))
    }

    pub fn validate(self) -> GraphResult<()> {
        for (channel, value) in [
            ("red", self.red),
            ("green", self.green),
            ("blue", self.blue),
            ("alpha", self.alpha),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(GraphError::InvalidData(format!(
                    "color channel `{channel}` must be finite and in [0, 1]"
                )));
            }
        }
        Ok(())
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub position: f32,
    pub color: Color,
}

/// Linear gradient sampled by the backend into a gradient texture.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LinearGradient {
    pub stops: Vec<GradientStop>,
}

impl LinearGradient {
    #[must_use]
    pub fn two_stop(start: Color, end: Color) -> Self {
        Self {
            stops: vec![
                GradientStop {
                    position: 0.0,
                    color: start,
                },
                GradientStop {
                    position: 1.0,
                    color: end,
                },
            ],
        }
    }

    pub fn validate(&self) -> GraphResult<()> {
        let mut previous = f32::NEG_INFINITY;
        for stop in &self.stops {
            if !stop.position.is_finite() || !(0.0..=1.0).contains(&stop.position) {
                return Err(GraphError::InvalidData(
                    "gradient stop position must be finite and in [0, 1]".to_owned(),
                ));
            }
            if stop.position < previous {
                return Err(GraphError::InvalidData(
                    "gradient stops must be sorted by position".to_owned(),
                ));
            }
            stop.color.validate()?;
            previous = stop.position;
        }
        Ok(())
    }
}

/// How the backend colors items: a uniform color, a per-object gradient or a
/// gradient spanning the whole value range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ColorStyle {
    #[default]
    Uniform,
    ObjectGradient,
    RangeGradient,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AxisOrientation {
    #[default]
    None,
    X,
    Y,
    Z,
}

impl AxisOrientation {
    pub const SLOTS: [Self; 3] = [Self::X, Self::Y, Self::Z];

    /// Index into the fixed X/Y/Z slot arrays.
    #[must_use]
    pub const fn slot(self) -> Option<usize> {
        match self {
            Self::None => None,
            Self::X => Some(0),
            Self::Y => Some(1),
            Self::Z => Some(2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AxisKind {
    #[default]
    None,
    Category,
    Value,
}

/// Symbolic mesh shapes resolved to concrete mesh identifiers by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MeshKind {
    UserDefined,
    Bar,
    Cube,
    Pyramid,
    Cone,
    Cylinder,
    BevelBar,
    BevelCube,
    #[default]
    Sphere,
    Minimal,
    Arrow,
    Point,
}

impl MeshKind {
    /// Base identifier of the built-in mesh, `None` for user-defined meshes.
    #[must_use]
    pub const fn base_identifier(self) -> Option<&'static str> {
        match self {
            Self::UserDefined => None,
            Self::Bar | Self::Cube => Some("cube"),
            Self::Pyramid => Some("pyramid"),
            Self::Cone => Some("cone"),
            Self::Cylinder => Some("cylinder"),
            Self::BevelBar | Self::BevelCube => Some("bevelbar"),
            Self::Sphere => Some("sphere"),
            Self::Minimal => Some("minimal"),
            Self::Arrow => Some("arrow"),
            Self::Point => Some("point"),
        }
    }

    /// Whether the backend may append a smooth-shading variant suffix.
    #[must_use]
    pub const fn supports_smooth(self) -> bool {
        !matches!(self, Self::UserDefined | Self::Minimal | Self::Point)
    }
}

/// Shadow levels in ascending cost order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum ShadowQuality {
    None,
    Low,
    #[default]
    Medium,
    High,
    SoftLow,
    SoftMedium,
    SoftHigh,
}

impl ShadowQuality {
    /// Next cheaper level, or `None` when already disabled.
    #[must_use]
    pub const fn lower(self) -> Option<Self> {
        match self {
            Self::None => None,
            Self::Low => Some(Self::None),
            Self::Medium => Some(Self::Low),
            Self::High => Some(Self::Medium),
            Self::SoftLow => Some(Self::High),
            Self::SoftMedium => Some(Self::SoftLow),
            Self::SoftHigh => Some(Self::SoftMedium),
        }
    }
}

/// Selection behaviour flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionFlag {
    Item,
    Row,
    Column,
    Slice,
    Multi,
}

impl SelectionFlag {
    const fn bit(self) -> u8 {
        match self {
            Self::Item => 1 << 0,
            Self::Row => 1 << 1,
            Self::Column => 1 << 2,
            Self::Slice => 1 << 3,
            Self::Multi => 1 << 4,
        }
    }
}

/// Bitmask of selection flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SelectionFlags {
    bits: u8,
}

impl SelectionFlags {
    pub const NONE: Self = Self { bits: 0 };
    pub const ITEM: Self = Self::from_flag(SelectionFlag::Item);
    pub const ROW: Self = Self::from_flag(SelectionFlag::Row);
    pub const COLUMN: Self = Self::from_flag(SelectionFlag::Column);
    pub const SLICE: Self = Self::from_flag(SelectionFlag::Slice);
    pub const MULTI: Self = Self::from_flag(SelectionFlag::Multi);

    #[must_use]
    pub const fn from_flag(flag: SelectionFlag) -> Self {
        Self { bits: flag.bit() }
    }

    #[must_use]
    pub const fn with_flag(self, flag: SelectionFlag) -> Self {
        Self {
            bits: self.bits | flag.bit(),
        }
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    #[must_use]
    pub const fn intersects(self, other: Self) -> bool {
        (self.bits & other.bits) != 0
    }

    #[must_use]
    pub const fn contains_flag(self, flag: SelectionFlag) -> bool {
        self.intersects(Self::from_flag(flag))
    }

    #[must_use]
    pub const fn is_none(self) -> bool {
        self.bits == 0
    }
}

impl Default for SelectionFlags {
    fn default() -> Self {
        Self::ITEM
    }
}

/// Surface rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SurfaceDrawMode {
    Wireframe,
    Surface,
    #[default]
    SurfaceAndWireframe,
}

#[cfg(test)]
mod tests {
    use super::{Color, SelectionFlag, SelectionFlags, ShadowQuality};

    #[test]
    fn shadow_quality_steps_down_to_none() {
        let mut quality = ShadowQuality::SoftHigh;
        let mut steps = 0;
        while let Some(next) = quality.lower() {
            assert!(next < quality);
            quality = next;
            steps += 1;
        }
        assert_eq!(quality, ShadowQuality::None);
        assert_eq!(steps, 6);
    }

    #[test]
    fn selection_flags_combine() {
        let flags = SelectionFlags::ITEM.with_flag(SelectionFlag::Row);
        assert!(flags.contains_flag(SelectionFlag::Row));
        assert!(!flags.contains_flag(SelectionFlag::Slice));
        assert!(flags.intersects(SelectionFlags::ITEM.union(SelectionFlags::COLUMN)));
    }

    #[test]
    fn hex_color_maps_to_unit_channels() {
        let color = Color::from_hex(0xff_80_00);
        assert_eq!(color.red, 1.0);
        assert!((color.green - 128.0 / 255.0).abs() < f32::EPSILON);
        assert_eq!(color.blue, 0.0);
        assert!(color.validate().is_ok());
    }
}
