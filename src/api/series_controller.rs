use tracing::{debug, warn};

use crate::core::{ControllerChange, Series, SeriesId};
use crate::error::{GraphError, GraphResult};
use crate::render::RendererBackend;

use super::GraphController;

impl<B: RendererBackend> GraphController<B> {
    /// Registers a series without attaching it to the graph.
    pub fn create_series(&mut self, series: Series) -> SeriesId {
        self.series.insert(series)
    }

    /// Appends a registered series to the series list.
    pub fn add_series(&mut self, id: SeriesId) -> GraphResult<()> {
        let index = self.series_list.len();
        self.insert_series(index, id)
    }

    /// Inserts a registered series at `index`. A series already in the list
    /// is moved.
    pub fn insert_series(&mut self, index: usize, id: SeriesId) -> GraphResult<()> {
        let expected_kind = self.kind.series_kind();
        let series = self.series.get_mut(id).ok_or(GraphError::UnknownSeries(id))?;
        if series.kind() != expected_kind {
            return Err(GraphError::InvalidData(format!(
                "{:?} series cannot be added to a {:?} graph",
                series.kind(),
                self.kind
            )));
        }

        let existing = self.series_list.iter().position(|entry| *entry == id);
        let len = self.series_list.len() - usize::from(existing.is_some());
        if index > len {
            return Err(GraphError::IndexOutOfRange { index, len });
        }
        if let Some(existing) = existing {
            self.series_list.remove(existing);
        }
        self.series_list.insert(index, id);
        series.reset_to_theme(&self.theme, index, false);
        self.changes.insert(ControllerChange::SeriesList);
        debug!(?id, index, "series attached");
        Ok(())
    }

    /// Detaches a series from the graph. It stays registered and can be
    /// added again.
    pub fn remove_series(&mut self, id: SeriesId) -> bool {
        let Some(index) = self.series_list.iter().position(|entry| *entry == id) else {
            warn!(?id, "series is not attached; nothing to remove");
            return false;
        };
        self.series_list.remove(index);
        self.changes.insert(ControllerChange::SeriesList);
        true
    }

    /// Detaches and unregisters a series, handing it back to the caller.
    pub fn destroy_series(&mut self, id: SeriesId) -> GraphResult<Series> {
        if self.series_list.contains(&id) {
            self.remove_series(id);
        }
        self.series.remove(id).ok_or(GraphError::UnknownSeries(id))
    }

    /// Attached series in list order.
    #[must_use]
    pub fn series_list(&self) -> &[SeriesId] {
        &self.series_list
    }

    #[must_use]
    pub fn series(&self, id: SeriesId) -> Option<&Series> {
        self.series.get(id)
    }

    pub fn series_mut(&mut self, id: SeriesId) -> Option<&mut Series> {
        self.series.get_mut(id)
    }

    #[must_use]
    pub fn is_series_attached(&self, id: SeriesId) -> bool {
        self.series_list.contains(&id)
    }

    /// Drops every explicit color override of an attached series and
    /// re-applies the active theme.
    pub fn reset_series_to_theme(&mut self, id: SeriesId) -> GraphResult<()> {
        let index = self
            .series_list
            .iter()
            .position(|entry| *entry == id)
            .ok_or(GraphError::UnknownSeries(id))?;
        let series = self.series.get_mut(id).ok_or(GraphError::UnknownSeries(id))?;
        series.reset_to_theme(&self.theme, index, true);
        Ok(())
    }
}
