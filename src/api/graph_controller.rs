use tracing::debug;

use crate::core::{
    Arena, Axis, AxisId, AxisKind, AxisOrientation, ChangeSet, ControllerChange, CustomItem,
    CustomItemId, SelectionFlags, Series, SeriesId, ShadowQuality, Theme,
};
use crate::error::GraphResult;
use crate::render::{RenderState, RendererBackend, Selection};

use super::{GraphConfig, GraphKind};

/// Axis bound to one orientation slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct AxisSlot {
    pub(super) id: AxisId,
    /// Default axes are owned by the controller and destroyed when replaced.
    pub(super) is_default: bool,
}

/// Main facade consumed by host applications.
///
/// `GraphController` owns the live scene description (axes, series, custom
/// items, theme, selection) and the renderer-facing `RenderState`, and
/// synchronizes the former into the latter once per frame.
pub struct GraphController<B: RendererBackend> {
    pub(super) backend: B,
    pub(super) kind: GraphKind,
    pub(super) value_label_format: String,
    pub(super) axes: Arena<Axis>,
    pub(super) axis_slots: [AxisSlot; 3],
    pub(super) series: Arena<Series>,
    pub(super) series_list: Vec<SeriesId>,
    pub(super) custom_items: Arena<CustomItem>,
    pub(super) custom_item_list: Vec<CustomItemId>,
    pub(super) theme: Theme,
    pub(super) selection_mode: SelectionFlags,
    pub(super) shadow_quality: ShadowQuality,
    pub(super) selection: Selection,
    pub(super) changes: ChangeSet<ControllerChange>,
    pub(super) render_state: RenderState,
}

impl<B: RendererBackend> GraphController<B> {
    /// Creates a controller with default axes for the configured graph kind.
    pub fn new(backend: B, config: GraphConfig) -> GraphResult<Self> {
        config.validate()?;

        let mut axes = Arena::new();
        let axis_slots = AxisOrientation::SLOTS.map(|orientation| AxisSlot {
            id: axes.insert(default_axis(config.kind, orientation, &config.value_label_format)),
            is_default: true,
        });

        let mut theme = config.theme.unwrap_or_default();
        theme.mark_replaced();

        debug!(kind = ?config.kind, "graph controller created");
        Ok(Self {
            backend,
            kind: config.kind,
            value_label_format: config.value_label_format,
            axes,
            axis_slots,
            series: Arena::new(),
            series_list: Vec::new(),
            custom_items: Arena::new(),
            custom_item_list: Vec::new(),
            theme,
            selection_mode: config.selection_mode,
            shadow_quality: config.shadow_quality,
            selection: Selection::None,
            changes: ChangeSet::all(),
            render_state: RenderState::new(),
        })
    }

    #[must_use]
    pub fn kind(&self) -> GraphKind {
        self.kind
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }

    /// Renderer-facing state as of the last sync pass.
    #[must_use]
    pub fn render_state(&self) -> &RenderState {
        &self.render_state
    }

    #[must_use]
    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Mutable theme access; edits are propagated on the next sync pass.
    pub fn theme_mut(&mut self) -> &mut Theme {
        &mut self.theme
    }

    /// Replaces the active theme. Every series attribute without an explicit
    /// override is re-applied from the new theme.
    pub fn set_theme(&mut self, mut theme: Theme) {
        theme.mark_replaced();
        self.theme = theme;
        self.changes.insert(ControllerChange::Theme);
    }

    #[must_use]
    pub fn selection_mode(&self) -> SelectionFlags {
        self.selection_mode
    }

    pub fn set_selection_mode(&mut self, mode: SelectionFlags) {
        if self.selection_mode != mode {
            self.selection_mode = mode;
            self.changes.insert(ControllerChange::SelectionMode);
        }
    }

    /// Requested shadow quality. May be lowered during sync when the
    /// backend refuses it.
    #[must_use]
    pub fn shadow_quality(&self) -> ShadowQuality {
        self.shadow_quality
    }

    pub fn set_shadow_quality(&mut self, quality: ShadowQuality) {
        if self.shadow_quality != quality {
            self.shadow_quality = quality;
            self.changes.insert(ControllerChange::ShadowQuality);
        }
    }

    /// Whether the next sync pass has anything to do.
    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_none()
            || self.theme.has_pending_changes()
            || self.axis_slots.iter().any(|slot| {
                self.axes
                    .get(slot.id)
                    .is_some_and(Axis::has_pending_changes)
            })
            || self.series_list.iter().any(|id| {
                self.series
                    .get(*id)
                    .is_some_and(Series::has_pending_changes)
            })
            || self.custom_item_list.iter().any(|id| {
                self.custom_items
                    .get(*id)
                    .is_some_and(CustomItem::has_pending_changes)
            })
    }
}

pub(super) fn default_axis(
    kind: GraphKind,
    orientation: AxisOrientation,
    value_label_format: &str,
) -> Axis {
    let mut axis = match kind.default_axis_kind(orientation) {
        AxisKind::Category => Axis::category(),
        AxisKind::Value | AxisKind::None => {
            let mut axis = Axis::value();
            axis.set_label_format(value_label_format);
            axis
        }
    };
    axis.assign_orientation(orientation);
    axis
}
