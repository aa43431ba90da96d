use serde::{Deserialize, Serialize};

use crate::core::change_flags::{ChangeSet, ThemeChange};
use crate::core::types::{Color, ColorStyle, LinearGradient};

/// Visual theme shared by all series of a graph.
///
/// Series copy theme values unless they override an attribute explicitly;
/// base colors and gradients are picked cyclically by series index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    name: String,
    color_style: ColorStyle,
    base_colors: Vec<Color>,
    base_gradients: Vec<LinearGradient>,
    single_highlight_color: Color,
    single_highlight_gradient: LinearGradient,
    multi_highlight_color: Color,
    multi_highlight_gradient: LinearGradient,
    font_family: String,
    background_enabled: bool,
    grid_enabled: bool,
    #[serde(skip)]
    changes: ChangeSet<ThemeChange>,
}

impl Default for Theme {
    fn default() -> Self {
        Self::qt()
    }
}

impl Theme {
    /// Light default preset.
    #[must_use]
    pub fn qt() -> Self {
        let base_colors = vec![
            Color::from_hex(0x80c342),
            Color::from_hex(0x469835),
            Color::from_hex(0x006325),
            Color::from_hex(0x5caa15),
            Color::from_hex(0x328930),
        ];
        let base_gradients = base_colors
            .iter()
            .map(|color| LinearGradient::two_stop(Color::BLACK, *color))
            .collect();
        Self {
            name: "qt".to_owned(),
            color_style: ColorStyle::Uniform,
            base_colors,
            base_gradients,
            single_highlight_color: Color::from_hex(0x14aaff),
            single_highlight_gradient: LinearGradient::two_stop(
                Color::BLACK,
                Color::from_hex(0x14aaff),
            ),
            multi_highlight_color: Color::from_hex(0x6d5fd5),
            multi_highlight_gradient: LinearGradient::two_stop(
                Color::BLACK,
                Color::from_hex(0x6d5fd5),
            ),
            font_family: "sans-serif".to_owned(),
            background_enabled: true,
            grid_enabled: true,
            changes: ChangeSet::all(),
        }
    }

    /// Dark preset.
    #[must_use]
    pub fn dark() -> Self {
        let base_colors = vec![
            Color::from_hex(0x38ad6b),
            Color::from_hex(0x3c84a7),
            Color::from_hex(0xeb8817),
            Color::from_hex(0x7b7f8c),
            Color::from_hex(0xbfbfbf),
        ];
        let base_gradients = base_colors
            .iter()
            .map(|color| LinearGradient::two_stop(Color::WHITE, *color))
            .collect();
        Self {
            name: "dark".to_owned(),
            color_style: ColorStyle::Uniform,
            base_colors,
            base_gradients,
            single_highlight_color: Color::from_hex(0xf5dc0d),
            single_highlight_gradient: LinearGradient::two_stop(
                Color::WHITE,
                Color::from_hex(0xf5dc0d),
            ),
            multi_highlight_color: Color::from_hex(0xd72222),
            multi_highlight_gradient: LinearGradient::two_stop(
                Color::WHITE,
                Color::from_hex(0xd72222),
            ),
            font_family: "sans-serif".to_owned(),
            background_enabled: true,
            grid_enabled: true,
            changes: ChangeSet::all(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn color_style(&self) -> ColorStyle {
        self.color_style
    }

    pub fn set_color_style(&mut self, style: ColorStyle) {
        if self.color_style != style {
            self.color_style = style;
            self.changes.insert(ThemeChange::ColorStyle);
        }
    }

    #[must_use]
    pub fn base_colors(&self) -> &[Color] {
        &self.base_colors
    }

    pub fn set_base_colors(&mut self, colors: Vec<Color>) {
        if self.base_colors != colors {
            self.base_colors = colors;
            self.changes.insert(ThemeChange::BaseColors);
        }
    }

    /// Base color for the series at `index`, cycling through the list.
    #[must_use]
    pub fn base_color_at(&self, index: usize) -> Color {
        cyclic(&self.base_colors, index).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn base_gradients(&self) -> &[LinearGradient] {
        &self.base_gradients
    }

    pub fn set_base_gradients(&mut self, gradients: Vec<LinearGradient>) {
        if self.base_gradients != gradients {
            self.base_gradients = gradients;
            self.changes.insert(ThemeChange::BaseGradients);
        }
    }

    #[must_use]
    pub fn base_gradient_at(&self, index: usize) -> LinearGradient {
        cyclic(&self.base_gradients, index)
            .cloned()
            .unwrap_or_default()
    }

    #[must_use]
    pub fn single_highlight_color(&self) -> Color {
        self.single_highlight_color
    }

    pub fn set_single_highlight_color(&mut self, color: Color) {
        if self.single_highlight_color != color {
            self.single_highlight_color = color;
            self.changes.insert(ThemeChange::SingleHighlightColor);
        }
    }

    #[must_use]
    pub fn single_highlight_gradient(&self) -> &LinearGradient {
        &self.single_highlight_gradient
    }

    pub fn set_single_highlight_gradient(&mut self, gradient: LinearGradient) {
        if self.single_highlight_gradient != gradient {
            self.single_highlight_gradient = gradient;
            self.changes.insert(ThemeChange::SingleHighlightGradient);
        }
    }

    #[must_use]
    pub fn multi_highlight_color(&self) -> Color {
        self.multi_highlight_color
    }

    pub fn set_multi_highlight_color(&mut self, color: Color) {
        if self.multi_highlight_color != color {
            self.multi_highlight_color = color;
            self.changes.insert(ThemeChange::MultiHighlightColor);
        }
    }

    #[must_use]
    pub fn multi_highlight_gradient(&self) -> &LinearGradient {
        &self.multi_highlight_gradient
    }

    pub fn set_multi_highlight_gradient(&mut self, gradient: LinearGradient) {
        if self.multi_highlight_gradient != gradient {
            self.multi_highlight_gradient = gradient;
            self.changes.insert(ThemeChange::MultiHighlightGradient);
        }
    }

    #[must_use]
    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub fn set_font_family(&mut self, family: impl Into<String>) {
        let family = family.into();
        if self.font_family != family {
            self.font_family = family;
            self.changes.insert(ThemeChange::Font);
        }
    }

    #[must_use]
    pub fn background_enabled(&self) -> bool {
        self.background_enabled
    }

    pub fn set_background_enabled(&mut self, enabled: bool) {
        if self.background_enabled != enabled {
            self.background_enabled = enabled;
            self.changes.insert(ThemeChange::BackgroundEnabled);
        }
    }

    #[must_use]
    pub fn grid_enabled(&self) -> bool {
        self.grid_enabled
    }

    pub fn set_grid_enabled(&mut self, enabled: bool) {
        if self.grid_enabled != enabled {
            self.grid_enabled = enabled;
            self.changes.insert(ThemeChange::GridEnabled);
        }
    }

    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_none()
    }

    pub(crate) fn take_changes(&mut self) -> ChangeSet<ThemeChange> {
        self.changes.take_all()
    }

    /// Flags the whole theme as new, e.g. after it replaced another one.
    pub(crate) fn mark_replaced(&mut self) {
        self.changes = ChangeSet::all();
    }
}

fn cyclic<T>(items: &[T], index: usize) -> Option<&T> {
    if items.is_empty() {
        None
    } else {
        items.get(index % items.len())
    }
}
