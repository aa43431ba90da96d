use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{AxisOrientation, CustomItemId, SeriesId, SeriesKind, ShadowQuality};
use crate::render::{AxisRenderCache, CustomItemRenderCache, SeriesRenderCache};

/// Data item addressed by a selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SelectionPosition {
    Bar { row: usize, column: usize },
    Scatter { index: usize },
    Surface { row: usize, column: usize },
}

impl SelectionPosition {
    #[must_use]
    pub fn series_kind(self) -> SeriesKind {
        match self {
            Self::Bar { .. } => SeriesKind::Bar,
            Self::Scatter { .. } => SeriesKind::Scatter,
            Self::Surface { .. } => SeriesKind::Surface,
        }
    }
}

/// Selection state; stale selections collapse to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Selection {
    #[default]
    None,
    Item {
        series: SeriesId,
        position: SelectionPosition,
    },
}

impl Selection {
    #[must_use]
    pub fn is_none(self) -> bool {
        matches!(self, Self::None)
    }

    #[must_use]
    pub fn series(self) -> Option<SeriesId> {
        match self {
            Self::None => None,
            Self::Item { series, .. } => Some(series),
        }
    }
}

/// Everything a backend reads to draw one frame.
///
/// Only the sync pass mutates it; the backend receives it read-only after
/// the pass has completed.
#[derive(Debug)]
pub struct RenderState {
    axes: [AxisRenderCache; 3],
    series: IndexMap<SeriesId, SeriesRenderCache>,
    custom_items: IndexMap<CustomItemId, CustomItemRenderCache>,
    selection: Selection,
    shadow_quality: ShadowQuality,
    background_enabled: bool,
    grid_enabled: bool,
    font_family: String,
}

impl Default for RenderState {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            axes: AxisOrientation::SLOTS.map(AxisRenderCache::new),
            series: IndexMap::new(),
            custom_items: IndexMap::new(),
            selection: Selection::None,
            shadow_quality: ShadowQuality::None,
            background_enabled: true,
            grid_enabled: true,
            font_family: String::new(),
        }
    }

    /// Axis caches in X, Y, Z order.
    #[must_use]
    pub fn axes(&self) -> &[AxisRenderCache; 3] {
        &self.axes
    }

    #[must_use]
    pub fn axis(&self, orientation: AxisOrientation) -> Option<&AxisRenderCache> {
        orientation.slot().map(|slot| &self.axes[slot])
    }

    pub(crate) fn axis_mut(&mut self, orientation: AxisOrientation) -> Option<&mut AxisRenderCache> {
        orientation.slot().map(|slot| &mut self.axes[slot])
    }

    pub(crate) fn axes_mut(&mut self) -> &mut [AxisRenderCache; 3] {
        &mut self.axes
    }

    /// Series caches in series list order.
    #[must_use]
    pub fn series(&self) -> &IndexMap<SeriesId, SeriesRenderCache> {
        &self.series
    }

    pub(crate) fn series_mut(&mut self) -> &mut IndexMap<SeriesId, SeriesRenderCache> {
        &mut self.series
    }

    #[must_use]
    pub fn custom_items(&self) -> &IndexMap<CustomItemId, CustomItemRenderCache> {
        &self.custom_items
    }

    pub(crate) fn custom_items_mut(&mut self) -> &mut IndexMap<CustomItemId, CustomItemRenderCache> {
        &mut self.custom_items
    }

    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub(crate) fn set_selection(&mut self, selection: Selection) {
        self.selection = selection;
    }

    /// Shadow level the backend accepted during the last sync.
    #[must_use]
    pub fn shadow_quality(&self) -> ShadowQuality {
        self.shadow_quality
    }

    pub(crate) fn set_shadow_quality(&mut self, quality: ShadowQuality) {
        self.shadow_quality = quality;
    }

    #[must_use]
    pub fn background_enabled(&self) -> bool {
        self.background_enabled
    }

    #[must_use]
    pub fn grid_enabled(&self) -> bool {
        self.grid_enabled
    }

    #[must_use]
    pub fn font_family(&self) -> &str {
        &self.font_family
    }

    pub(crate) fn set_scene_flags(&mut self, background_enabled: bool, grid_enabled: bool) {
        self.background_enabled = background_enabled;
        self.grid_enabled = grid_enabled;
    }

    pub(crate) fn set_font_family(&mut self, family: &str) {
        family.clone_into(&mut self.font_family);
    }
}
