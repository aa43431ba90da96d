use tracing::trace;

use crate::core::{AxisOrientation, PointExtent, Series, ValueExtent};
use crate::render::RendererBackend;

use super::{GraphController, GraphKind};

impl<B: RendererBackend> GraphController<B> {
    /// Fits every axis with `auto_adjust_range` to the attached, visible
    /// series data.
    pub(super) fn fit_axes_to_data(&mut self) {
        match self.kind {
            GraphKind::Bars => self.fit_bar_axes(),
            GraphKind::Scatter | GraphKind::Surface => self.fit_point_axes(),
        }
    }

    fn visible_series(&self) -> impl Iterator<Item = &Series> {
        self.series_list
            .iter()
            .filter_map(|id| self.series.get(*id))
            .filter(|series| series.is_visible())
    }

    fn fit_bar_axes(&mut self) {
        let mut rows = 0usize;
        let mut columns = 0usize;
        let mut values: Option<ValueExtent> = None;
        for proxy in self.visible_series().filter_map(Series::bar_proxy) {
            rows = rows.max(proxy.row_count());
            columns = columns.max(proxy.column_count());
            values = merge_extent(values, proxy.value_extent());
        }

        if rows > 0 {
            self.fit_axis(AxisOrientation::Z, 0.0, (rows - 1) as f32);
        }
        if columns > 0 {
            self.fit_axis(AxisOrientation::X, 0.0, (columns - 1) as f32);
        }
        if let Some(extent) = values {
            // Bars grow from zero, so the value window always includes it.
            self.fit_axis(AxisOrientation::Y, extent.min.min(0.0), extent.max.max(0.0));
        }
        self.apply_bar_data_labels();
    }

    /// Category axes without explicit labels show the row and column labels
    /// of the first bar series, limited to the axis window.
    fn apply_bar_data_labels(&mut self) {
        let Some(proxy) = self
            .series_list
            .iter()
            .filter_map(|id| self.series.get(*id))
            .find_map(Series::bar_proxy)
        else {
            return;
        };
        let row_labels = proxy.row_labels().to_vec();
        let column_labels = proxy.column_labels().to_vec();
        for (orientation, labels) in [
            (AxisOrientation::Z, row_labels),
            (AxisOrientation::X, column_labels),
        ] {
            if let Some(axis) = self.axis_mut(orientation) {
                let windowed = window_labels(&labels, axis.min(), axis.max());
                axis.set_data_labels(windowed);
            }
        }
    }

    fn fit_point_axes(&mut self) {
        let mut extent: Option<PointExtent> = None;
        for series in self.visible_series() {
            let next = series
                .scatter_proxy()
                .and_then(|proxy| proxy.extent())
                .or_else(|| series.surface_proxy().and_then(|proxy| proxy.extent()));
            extent = match (extent, next) {
                (Some(current), Some(next)) => Some(PointExtent {
                    x: union(current.x, next.x),
                    y: union(current.y, next.y),
                    z: union(current.z, next.z),
                }),
                (current, next) => current.or(next),
            };
        }
        let Some(extent) = extent else {
            return;
        };
        self.fit_axis(AxisOrientation::X, extent.x.min, extent.x.max);
        self.fit_axis(AxisOrientation::Y, extent.y.min, extent.y.max);
        self.fit_axis(AxisOrientation::Z, extent.z.min, extent.z.max);
    }

    fn fit_axis(&mut self, orientation: AxisOrientation, min: f32, mut max: f32) {
        let Some(axis) = self.axis_mut(orientation) else {
            return;
        };
        if !axis.auto_adjust_range() {
            return;
        }
        if max <= min && !axis.range().policy().allow_min_max_same {
            max = min + 1.0;
        }
        let outcome = axis.fit_range(min, max);
        trace!(?orientation, min, max, ?outcome, "axis fitted to data");
    }
}

fn union(a: ValueExtent, b: ValueExtent) -> ValueExtent {
    ValueExtent {
        min: a.min.min(b.min),
        max: a.max.max(b.max),
    }
}

fn merge_extent(current: Option<ValueExtent>, next: Option<ValueExtent>) -> Option<ValueExtent> {
    match (current, next) {
        (Some(current), Some(next)) => Some(union(current, next)),
        (current, next) => current.or(next),
    }
}

fn window_labels(labels: &[String], min: f32, max: f32) -> Vec<String> {
    if labels.is_empty() || max < 0.0 {
        return Vec::new();
    }
    let last = labels.len() - 1;
    let start = (min.max(0.0).round() as usize).min(labels.len());
    let end = (max.round() as usize).min(last) + 1;
    labels.get(start..end).map(<[String]>::to_vec).unwrap_or_default()
}
