use serde::{Deserialize, Serialize};

use crate::core::{
    AxisKind, AxisOrientation, DEFAULT_LABEL_FORMAT, SelectionFlags, SeriesKind, ShadowQuality,
    Theme,
};
use crate::error::{GraphError, GraphResult};

/// Graph type driven by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GraphKind {
    #[default]
    Bars,
    Scatter,
    Surface,
}

impl GraphKind {
    /// Axis kind installed when an orientation has no explicit axis.
    /// Bars use category axes for rows (Z) and columns (X).
    #[must_use]
    pub const fn default_axis_kind(self, orientation: AxisOrientation) -> AxisKind {
        match (self, orientation) {
            (_, AxisOrientation::None) => AxisKind::None,
            (Self::Bars, AxisOrientation::X | AxisOrientation::Z) => AxisKind::Category,
            _ => AxisKind::Value,
        }
    }

    /// Series kind this graph draws.
    #[must_use]
    pub const fn series_kind(self) -> SeriesKind {
        match self {
            Self::Bars => SeriesKind::Bar,
            Self::Scatter => SeriesKind::Scatter,
            Self::Surface => SeriesKind::Surface,
        }
    }
}

/// Initial controller configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    pub kind: GraphKind,
    pub selection_mode: SelectionFlags,
    pub shadow_quality: ShadowQuality,
    pub theme: Option<Theme>,
    pub value_label_format: String,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self::new(GraphKind::default())
    }
}

impl GraphConfig {
    #[must_use]
    pub fn new(kind: GraphKind) -> Self {
        Self {
            kind,
            selection_mode: SelectionFlags::ITEM,
            shadow_quality: ShadowQuality::Medium,
            theme: None,
            value_label_format: DEFAULT_LABEL_FORMAT.to_owned(),
        }
    }

    #[must_use]
    pub fn with_selection_mode(mut self, mode: SelectionFlags) -> Self {
        self.selection_mode = mode;
        self
    }

    #[must_use]
    pub fn with_shadow_quality(mut self, quality: ShadowQuality) -> Self {
        self.shadow_quality = quality;
        self
    }

    #[must_use]
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = Some(theme);
        self
    }

    /// Label format given to default value axes.
    #[must_use]
    pub fn with_value_label_format(mut self, format: impl Into<String>) -> Self {
        self.value_label_format = format.into();
        self
    }

    /// Serializes config as pretty JSON.
    pub fn to_json_pretty(&self) -> GraphResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GraphError::InvalidData(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON.
    pub fn from_json_str(input: &str) -> GraphResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| GraphError::InvalidData(format!("failed to parse config: {e}")))
    }

    pub(super) fn validate(&self) -> GraphResult<()> {
        if let Some(theme) = &self.theme {
            for color in theme.base_colors() {
                color.validate()?;
            }
            for gradient in theme.base_gradients() {
                gradient.validate()?;
            }
            theme.single_highlight_color().validate()?;
            theme.multi_highlight_color().validate()?;
        }
        Ok(())
    }
}
