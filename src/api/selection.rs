use tracing::{debug, trace};

use crate::core::{AxisOrientation, ControllerChange, SelectionFlags, Series, SeriesId, SeriesKind};
use crate::error::{GraphError, GraphResult};
use crate::render::{RendererBackend, Selection, SelectionPosition};

use super::GraphController;

impl<B: RendererBackend> GraphController<B> {
    /// Selects one data item of an attached series.
    ///
    /// The request is validated against the current axis windows and data.
    /// An invalid request clears any existing selection and returns `false`.
    pub fn set_selected_item(
        &mut self,
        series: SeriesId,
        position: SelectionPosition,
    ) -> GraphResult<bool> {
        if !self.series_list.contains(&series) {
            return Err(GraphError::UnknownSeries(series));
        }
        let next = if self.selection_is_valid(series, position) {
            Selection::Item { series, position }
        } else {
            debug!(?series, ?position, "selection request rejected");
            Selection::None
        };
        if next != self.selection {
            self.selection = next;
            self.changes.insert(ControllerChange::Selection);
        }
        Ok(!next.is_none())
    }

    pub fn clear_selection(&mut self) {
        if !self.selection.is_none() {
            self.selection = Selection::None;
            self.changes.insert(ControllerChange::Selection);
        }
    }

    /// Selection as requested on the controller; the render state carries
    /// the one validated by the last sync pass.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub(super) fn selection_is_valid(&self, id: SeriesId, position: SelectionPosition) -> bool {
        let Some(series) = self.series.get(id) else {
            return false;
        };
        if !self.series_list.contains(&id) || position.series_kind() != series.kind() {
            return false;
        }
        if !mode_allows(self.selection_mode, series.kind()) {
            trace!(mode = ?self.selection_mode, "selection mode does not allow item selection");
            return false;
        }
        self.position_in_window(series, position)
    }

    fn position_in_window(&self, series: &Series, position: SelectionPosition) -> bool {
        let in_range = |orientation: AxisOrientation, value: f32| {
            self.axis(orientation)
                .is_none_or(|axis| axis.range().contains(value))
        };
        match position {
            SelectionPosition::Bar { row, column } => {
                series
                    .bar_proxy()
                    .and_then(|proxy| proxy.value(row, column))
                    .is_some()
                    && in_range(AxisOrientation::Z, row as f32)
                    && in_range(AxisOrientation::X, column as f32)
            }
            SelectionPosition::Scatter { index } => series
                .scatter_proxy()
                .and_then(|proxy| proxy.items().get(index))
                .is_some_and(|item| {
                    in_range(AxisOrientation::X, item.x)
                        && in_range(AxisOrientation::Y, item.y)
                        && in_range(AxisOrientation::Z, item.z)
                }),
            SelectionPosition::Surface { row, column } => series
                .surface_proxy()
                .and_then(|proxy| proxy.rows().get(row))
                .and_then(|points| points.get(column))
                .is_some_and(|point| {
                    in_range(AxisOrientation::X, point.x) && in_range(AxisOrientation::Z, point.z)
                }),
        }
    }
}

/// Scatter items are only selectable as single items; bars and surfaces
/// also accept row and column modes.
fn mode_allows(mode: SelectionFlags, kind: SeriesKind) -> bool {
    match kind {
        SeriesKind::Scatter => mode.intersects(SelectionFlags::ITEM),
        SeriesKind::Bar | SeriesKind::Surface => mode.intersects(
            SelectionFlags::ITEM
                .union(SelectionFlags::ROW)
                .union(SelectionFlags::COLUMN),
        ),
    }
}
