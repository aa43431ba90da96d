use glam::Vec3;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::core::{AxisKind, AxisOrientation, Color, ColorStyle, MeshKind, SeriesKind, ShadowQuality};
use crate::error::{GraphError, GraphResult};
use crate::render::{
    AxisRenderCache, CustomItemRenderCache, RenderState, RendererBackend, Selection,
    SelectionPosition, SeriesRenderCache,
};

use super::GraphController;

/// Serializable view of the render state, used by regression tests and
/// debugging tooling. Ids are stored as their packed integer form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderStateSnapshot {
    pub shadow_quality: ShadowQuality,
    pub background_enabled: bool,
    pub grid_enabled: bool,
    pub font_family: String,
    pub axes: Vec<AxisCacheSnapshot>,
    pub series: IndexMap<u64, SeriesCacheSnapshot>,
    pub custom_items: IndexMap<u64, CustomItemCacheSnapshot>,
    pub selection: SelectionSnapshot,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisCacheSnapshot {
    pub orientation: AxisOrientation,
    pub kind: AxisKind,
    pub title: String,
    pub labels: Vec<String>,
    pub min: f32,
    pub max: f32,
    pub segment_count: usize,
    pub sub_segment_count: usize,
    pub reversed: bool,
    pub grid_positions: Vec<f32>,
    pub label_positions: Vec<f32>,
    pub label_count: usize,
    pub grid_line_instance_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesCacheSnapshot {
    pub kind: SeriesKind,
    pub name: String,
    pub visible: bool,
    pub visual_index: usize,
    pub mesh: MeshKind,
    pub mesh_identifier: Option<String>,
    pub color_style: ColorStyle,
    pub base_color: Color,
    pub data_dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomItemCacheSnapshot {
    pub index: usize,
    pub mesh_identifier: String,
    pub texture_image: bool,
    pub position: Vec3,
    pub visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SelectionSnapshot {
    pub series: Option<u64>,
    pub position: Option<SelectionPosition>,
}

impl From<&AxisRenderCache> for AxisCacheSnapshot {
    fn from(cache: &AxisRenderCache) -> Self {
        Self {
            orientation: cache.orientation(),
            kind: cache.kind(),
            title: cache.title().to_owned(),
            labels: cache.labels().to_vec(),
            min: cache.min(),
            max: cache.max(),
            segment_count: cache.segment_count(),
            sub_segment_count: cache.sub_segment_count(),
            reversed: cache.reversed(),
            grid_positions: cache.grid_positions().to_vec(),
            label_positions: cache.label_positions().to_vec(),
            label_count: cache.label_count(),
            grid_line_instance_count: cache.grid_line_instance_count(),
        }
    }
}

impl From<&SeriesRenderCache> for SeriesCacheSnapshot {
    fn from(cache: &SeriesRenderCache) -> Self {
        Self {
            kind: cache.kind(),
            name: cache.name().to_owned(),
            visible: cache.is_visible(),
            visual_index: cache.visual_index(),
            mesh: cache.mesh(),
            mesh_identifier: cache.mesh_identifier().map(str::to_owned),
            color_style: cache.color_style(),
            base_color: cache.base_color(),
            data_dirty: cache.data_dirty(),
        }
    }
}

impl From<&CustomItemRenderCache> for CustomItemCacheSnapshot {
    fn from(cache: &CustomItemRenderCache) -> Self {
        Self {
            index: cache.index(),
            mesh_identifier: cache.mesh_identifier().to_owned(),
            texture_image: cache.texture().is_some(),
            position: cache.position(),
            visible: cache.is_visible(),
        }
    }
}

impl From<Selection> for SelectionSnapshot {
    fn from(selection: Selection) -> Self {
        match selection {
            Selection::None => Self::default(),
            Selection::Item { series, position } => Self {
                series: Some(series.to_bits()),
                position: Some(position),
            },
        }
    }
}

impl From<&RenderState> for RenderStateSnapshot {
    fn from(state: &RenderState) -> Self {
        Self {
            shadow_quality: state.shadow_quality(),
            background_enabled: state.background_enabled(),
            grid_enabled: state.grid_enabled(),
            font_family: state.font_family().to_owned(),
            axes: state.axes().iter().map(AxisCacheSnapshot::from).collect(),
            series: state
                .series()
                .iter()
                .map(|(id, cache)| (id.to_bits(), SeriesCacheSnapshot::from(cache)))
                .collect(),
            custom_items: state
                .custom_items()
                .iter()
                .map(|(id, cache)| (id.to_bits(), CustomItemCacheSnapshot::from(cache)))
                .collect(),
            selection: state.selection().into(),
        }
    }
}

impl<B: RendererBackend> GraphController<B> {
    /// Deterministic snapshot of the render state as of the last sync pass.
    #[must_use]
    pub fn render_state_snapshot(&self) -> RenderStateSnapshot {
        RenderStateSnapshot::from(&self.render_state)
    }

    /// Serializes the snapshot as pretty JSON for fixture-based regression
    /// checks.
    pub fn render_state_snapshot_json_pretty(&self) -> GraphResult<String> {
        let snapshot = self.render_state_snapshot();
        serde_json::to_string_pretty(&snapshot)
            .map_err(|e| GraphError::InvalidData(format!("failed to serialize snapshot: {e}")))
    }
}
