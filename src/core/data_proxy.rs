use glam::Vec3;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// Inclusive value interval of a data set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValueExtent {
    pub min: f32,
    pub max: f32,
}

impl ValueExtent {
    fn from_values(values: impl Iterator<Item = f32>) -> Option<Self> {
        let mut extent: Option<(OrderedFloat<f32>, OrderedFloat<f32>)> = None;
        for value in values.map(OrderedFloat) {
            extent = Some(match extent {
                None => (value, value),
                Some((min, max)) => (min.min(value), max.max(value)),
            });
        }
        extent.map(|(min, max)| Self {
            min: min.into_inner(),
            max: max.into_inner(),
        })
    }
}

/// Per-dimension extents of a point cloud.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointExtent {
    pub x: ValueExtent,
    pub y: ValueExtent,
    pub z: ValueExtent,
}

impl PointExtent {
    fn from_points<'a>(points: impl Iterator<Item = &'a Vec3> + Clone) -> Option<Self> {
        Some(Self {
            x: ValueExtent::from_values(points.clone().map(|point| point.x))?,
            y: ValueExtent::from_values(points.clone().map(|point| point.y))?,
            z: ValueExtent::from_values(points.map(|point| point.z))?,
        })
    }
}

fn ensure_finite(values: impl IntoIterator<Item = f32>, what: &str) -> GraphResult<()> {
    if values.into_iter().all(f32::is_finite) {
        Ok(())
    } else {
        Err(GraphError::InvalidData(format!("{what} values must be finite")))
    }
}

/// Bar heights arranged in rows and columns, plus optional labels.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarDataProxy {
    rows: Vec<Vec<f32>>,
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    #[serde(skip)]
    structure_reset: bool,
}

impl BarDataProxy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<Vec<f32>>) -> GraphResult<Self> {
        let mut proxy = Self::new();
        proxy.reset_rows(rows)?;
        Ok(proxy)
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        self.rows.get(index).map(Vec::as_slice)
    }

    #[must_use]
    pub fn value(&self, row: usize, column: usize) -> Option<f32> {
        self.rows.get(row)?.get(column).copied()
    }

    /// Widest row; the column count of the data grid.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// Replaces all rows. A selection in this data survives while its row
    /// and column still exist.
    pub fn reset_rows(&mut self, rows: Vec<Vec<f32>>) -> GraphResult<()> {
        ensure_finite(rows.iter().flatten().copied(), "bar")?;
        self.rows = rows;
        Ok(())
    }

    pub fn add_row(&mut self, row: Vec<f32>) -> GraphResult<usize> {
        ensure_finite(row.iter().copied(), "bar")?;
        self.rows.push(row);
        Ok(self.rows.len() - 1)
    }

    pub fn set_value(&mut self, row: usize, column: usize, value: f32) -> GraphResult<()> {
        ensure_finite([value], "bar")?;
        let row_len = self.rows.get(row).map_or(0, Vec::len);
        let slot = self
            .rows
            .get_mut(row)
            .and_then(|values| values.get_mut(column))
            .ok_or(GraphError::IndexOutOfRange {
                index: column,
                len: row_len,
            })?;
        *slot = value;
        Ok(())
    }

    /// Removes `count` rows starting at `start`, clamped to the data.
    pub fn remove_rows(&mut self, start: usize, count: usize) {
        if start >= self.rows.len() || count == 0 {
            return;
        }
        let end = start.saturating_add(count).min(self.rows.len());
        self.rows.drain(start..end);
    }

    #[must_use]
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn set_row_labels(&mut self, labels: Vec<String>) {
        self.row_labels = labels;
    }

    #[must_use]
    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    pub fn set_column_labels(&mut self, labels: Vec<String>) {
        self.column_labels = labels;
    }

    #[must_use]
    pub fn value_extent(&self) -> Option<ValueExtent> {
        ValueExtent::from_values(self.rows.iter().flatten().copied())
    }

    pub(crate) fn mark_structure_reset(&mut self) {
        self.structure_reset = true;
    }

    pub(crate) fn take_structure_reset(&mut self) -> bool {
        std::mem::take(&mut self.structure_reset)
    }
}

/// Free-standing scatter points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScatterDataProxy {
    items: Vec<Vec3>,
}

impl ScatterDataProxy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_items(items: Vec<Vec3>) -> GraphResult<Self> {
        let mut proxy = Self::new();
        proxy.reset_items(items)?;
        Ok(proxy)
    }

    #[must_use]
    pub fn items(&self) -> &[Vec3] {
        &self.items
    }

    #[must_use]
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn reset_items(&mut self, items: Vec<Vec3>) -> GraphResult<()> {
        ensure_finite(items.iter().flat_map(|item| item.to_array()), "scatter")?;
        self.items = items;
        Ok(())
    }

    pub fn add_item(&mut self, item: Vec3) -> GraphResult<usize> {
        ensure_finite(item.to_array(), "scatter")?;
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    pub fn remove_items(&mut self, start: usize, count: usize) {
        if start >= self.items.len() {
            return;
        }
        let end = start.saturating_add(count).min(self.items.len());
        self.items.drain(start..end);
    }

    #[must_use]
    pub fn extent(&self) -> Option<PointExtent> {
        PointExtent::from_points(self.items.iter())
    }
}

/// Row-major height field for surfaces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDataProxy {
    rows: Vec<Vec<Vec3>>,
}

impl SurfaceDataProxy {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a proxy; every row must have the same number of points.
    pub fn from_rows(rows: Vec<Vec<Vec3>>) -> GraphResult<Self> {
        let mut proxy = Self::new();
        proxy.reset_rows(rows)?;
        Ok(proxy)
    }

    #[must_use]
    pub fn rows(&self) -> &[Vec<Vec3>] {
        &self.rows
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn reset_rows(&mut self, rows: Vec<Vec<Vec3>>) -> GraphResult<()> {
        let columns = rows.first().map_or(0, Vec::len);
        if rows.iter().any(|row| row.len() != columns) {
            return Err(GraphError::InvalidData(
                "surface rows must all have the same length".to_owned(),
            ));
        }
        ensure_finite(
            rows.iter().flatten().flat_map(|point| point.to_array()),
            "surface",
        )?;
        self.rows = rows;
        Ok(())
    }

    pub fn remove_rows(&mut self, start: usize, count: usize) {
        if start >= self.rows.len() {
            return;
        }
        let end = start.saturating_add(count).min(self.rows.len());
        self.rows.drain(start..end);
    }

    #[must_use]
    pub fn extent(&self) -> Option<PointExtent> {
        PointExtent::from_points(self.rows.iter().flatten())
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::{BarDataProxy, ScatterDataProxy, SurfaceDataProxy};
    use crate::error::GraphError;

    #[test]
    fn bar_extent_spans_all_rows() {
        let proxy = BarDataProxy::from_rows(vec![vec![1.0, -2.0], vec![7.5]]).expect("rows");
        let extent = proxy.value_extent().expect("extent");
        assert_eq!((extent.min, extent.max), (-2.0, 7.5));
        assert_eq!(proxy.column_count(), 2);
    }

    #[test]
    fn non_finite_values_are_refused() {
        let error = BarDataProxy::from_rows(vec![vec![f32::NAN]]).expect_err("nan");
        assert!(matches!(error, GraphError::InvalidData(_)));
        assert!(ScatterDataProxy::from_items(vec![Vec3::new(0.0, f32::INFINITY, 0.0)]).is_err());
    }

    #[test]
    fn ragged_surface_is_refused() {
        let rows = vec![vec![Vec3::ZERO, Vec3::ONE], vec![Vec3::ZERO]];
        assert!(SurfaceDataProxy::from_rows(rows).is_err());
    }

    #[test]
    fn row_edits_do_not_flag_a_structure_reset() {
        let mut proxy = BarDataProxy::from_rows(vec![vec![1.0]; 4]).expect("rows");
        assert!(!proxy.take_structure_reset());
        proxy.remove_rows(1, 10);
        assert_eq!(proxy.row_count(), 1);
        proxy.reset_rows(vec![vec![2.0, 3.0]]).expect("rows");
        assert!(!proxy.take_structure_reset());

        proxy.mark_structure_reset();
        assert!(proxy.take_structure_reset());
        assert!(!proxy.take_structure_reset());
    }

    #[test]
    fn scatter_extent_is_per_dimension() {
        let proxy = ScatterDataProxy::from_items(vec![
            Vec3::new(-1.0, 2.0, 3.0),
            Vec3::new(4.0, -5.0, 0.5),
        ])
        .expect("items");
        let extent = proxy.extent().expect("extent");
        assert_eq!((extent.x.min, extent.x.max), (-1.0, 4.0));
        assert_eq!((extent.y.min, extent.y.max), (-5.0, 2.0));
        assert_eq!((extent.z.min, extent.z.max), (0.5, 3.0));
    }
}
