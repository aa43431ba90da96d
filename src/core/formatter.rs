use std::any::Any;
use std::fmt;

use smallvec::SmallVec;

use crate::core::label_format::LabelFormatCache;
use crate::error::{GraphError, GraphResult};

/// Sub-grid positions between two neighbouring grid lines.
pub type SubGridGroup = SmallVec<[f32; 8]>;

/// Axis values a formatter lays out its positions from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FormatterInput<'a> {
    pub min: f32,
    pub max: f32,
    pub segment_count: usize,
    pub sub_segment_count: usize,
    pub label_format: &'a str,
}

/// Segment counts a formatter decided for the owning axis during
/// recalculation (e.g. one segment per decade on a log axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentOverride {
    pub segment_count: Option<usize>,
    pub sub_segment_count: Option<usize>,
}

/// Notifications a formatter raised since the owning axis last polled it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FormatterNotice {
    pub formatter_dirty: bool,
    pub labels_changed: bool,
}

/// Position arrays and bookkeeping shared by every formatter.
///
/// Positions are normalized to `[-1, 1]`; the first grid/label entry is the
/// axis minimum and the last one is pinned to exactly `1.0`.
#[derive(Debug, Clone)]
pub struct FormatterState {
    needs_recalculate: bool,
    attached: bool,
    notice: FormatterNotice,
    min: f32,
    max: f32,
    grid_positions: Vec<f32>,
    sub_grid_positions: Vec<SubGridGroup>,
    label_positions: Vec<f32>,
    label_values: Vec<f64>,
    format_cache: LabelFormatCache,
}

impl Default for FormatterState {
    fn default() -> Self {
        Self {
            needs_recalculate: true,
            attached: false,
            notice: FormatterNotice::default(),
            min: 0.0,
            max: 0.0,
            grid_positions: Vec::new(),
            sub_grid_positions: Vec::new(),
            label_positions: Vec::new(),
            label_values: Vec::new(),
            format_cache: LabelFormatCache::default(),
        }
    }
}

impl FormatterState {
    #[must_use]
    pub fn min(&self) -> f32 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f32 {
        self.max
    }

    #[must_use]
    pub fn grid_positions(&self) -> &[f32] {
        &self.grid_positions
    }

    #[must_use]
    pub fn sub_grid_positions(&self) -> &[SubGridGroup] {
        &self.sub_grid_positions
    }

    #[must_use]
    pub fn label_positions(&self) -> &[f32] {
        &self.label_positions
    }

    #[must_use]
    pub fn label_values(&self) -> &[f64] {
        &self.label_values
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    #[must_use]
    pub fn format_cache(&self) -> &LabelFormatCache {
        &self.format_cache
    }

    pub fn grid_positions_mut(&mut self) -> &mut Vec<f32> {
        &mut self.grid_positions
    }

    pub fn sub_grid_positions_mut(&mut self) -> &mut Vec<SubGridGroup> {
        &mut self.sub_grid_positions
    }

    pub fn label_positions_mut(&mut self) -> &mut Vec<f32> {
        &mut self.label_positions
    }

    pub fn label_values_mut(&mut self) -> &mut Vec<f64> {
        &mut self.label_values
    }

    /// Clears every position array ahead of a rebuild.
    pub fn reset_arrays(&mut self) {
        self.grid_positions.clear();
        self.sub_grid_positions.clear();
        self.label_positions.clear();
        self.label_values.clear();
    }

    pub(crate) fn attach(&mut self) {
        self.attached = true;
        self.needs_recalculate = true;
    }

    pub(crate) fn take_notice(&mut self) -> FormatterNotice {
        std::mem::take(&mut self.notice)
    }

    fn detach_as_copy(&mut self) {
        self.attached = false;
        self.needs_recalculate = false;
        self.notice = FormatterNotice::default();
    }

    /// Fills the arrays with the evenly spaced linear layout.
    pub fn layout_linear(&mut self, segment_count: usize, sub_segment_count: usize) {
        let segments = segment_count.max(1);
        let sub_segments = sub_segment_count.max(1);
        let segment_step = 2.0 / segments as f64;
        let sub_segment_step = segment_step / sub_segments as f64;
        let min = f64::from(self.min);
        let range = f64::from(self.max) - min;

        self.reset_arrays();
        for index in 0..segments {
            let grid_value = -1.0 + segment_step * index as f64;
            self.grid_positions.push(grid_value as f32);
            self.label_positions.push(grid_value as f32);
            self.label_values
                .push(min + range * (index as f64 / segments as f64));
            self.sub_grid_positions.push(
                (1..sub_segments)
                    .map(|step| (grid_value + sub_segment_step * step as f64) as f32)
                    .collect(),
            );
        }
        self.grid_positions.push(1.0);
        self.label_positions.push(1.0);
        self.label_values.push(f64::from(self.max));
    }
}

/// Maps axis values to normalized positions and lays out grid lines,
/// sub-grid lines and labels.
///
/// Implementors only provide [`compute`](Self::compute) and optionally a
/// different value/position mapping; the dirty tracking in
/// [`recalculate`](Self::recalculate) is shared.
pub trait AxisFormatter: fmt::Debug {
    fn state(&self) -> &FormatterState;

    fn state_mut(&mut self) -> &mut FormatterState;

    /// Rebuilds the position arrays. `state().min()`/`max()` already hold the
    /// axis range when this runs.
    fn compute(&mut self, input: &FormatterInput<'_>) -> SegmentOverride;

    fn boxed_clone(&self) -> Box<dyn AxisFormatter>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn allow_negatives(&self) -> bool {
        true
    }

    fn allow_zero(&self) -> bool {
        true
    }

    fn position_at(&self, value: f32) -> f32 {
        let state = self.state();
        (value - state.min) / ((state.max - state.min) / 2.0) - 1.0
    }

    fn value_at(&self, position: f32) -> f32 {
        let state = self.state();
        (position + 1.0) * ((state.max - state.min) / 2.0) + state.min
    }

    fn label_for_index(&mut self, index: usize, format: &str) -> GraphResult<String> {
        let values = self.state().label_values();
        let value = values
            .get(index)
            .copied()
            .ok_or(GraphError::IndexOutOfRange {
                index,
                len: values.len(),
            })?;
        Ok(self.string_for_value(value, format))
    }

    fn string_for_value(&mut self, value: f64, format: &str) -> String {
        self.state_mut().format_cache.format(format, value)
    }

    #[must_use]
    fn needs_recalculate(&self) -> bool {
        self.state().needs_recalculate
    }

    /// Flags the arrays stale. The owning axis picks up the notice on its
    /// next poll.
    fn mark_dirty(&mut self, labels_change: bool) {
        let state = self.state_mut();
        state.needs_recalculate = true;
        state.notice.formatter_dirty = true;
        state.notice.labels_changed |= labels_change;
    }

    /// Recomputes only when attached to an axis and flagged dirty.
    fn recalculate(&mut self, input: &FormatterInput<'_>) -> Option<SegmentOverride> {
        let state = self.state();
        if !state.attached || !state.needs_recalculate {
            return None;
        }
        let state = self.state_mut();
        state.min = input.min;
        state.max = input.max;
        let segment_override = self.compute(input);
        self.state_mut().needs_recalculate = false;
        Some(segment_override)
    }

    /// Recalculates if needed and returns a detached snapshot for the
    /// renderer. The copy never recalculates on its own.
    fn populate_copy(&mut self, input: &FormatterInput<'_>) -> Box<dyn AxisFormatter> {
        self.recalculate(input);
        let mut copy = self.boxed_clone();
        copy.state_mut().detach_as_copy();
        copy
    }

    fn grid_position(&self, index: usize) -> GraphResult<f32> {
        let positions = self.state().grid_positions();
        debug_assert!(index < positions.len(), "grid index {index} out of range");
        positions
            .get(index)
            .copied()
            .ok_or(GraphError::IndexOutOfRange {
                index,
                len: positions.len(),
            })
    }

    fn label_position(&self, index: usize) -> GraphResult<f32> {
        let positions = self.state().label_positions();
        debug_assert!(index < positions.len(), "label index {index} out of range");
        positions
            .get(index)
            .copied()
            .ok_or(GraphError::IndexOutOfRange {
                index,
                len: positions.len(),
            })
    }
}

/// Default linear formatter.
#[derive(Debug, Clone, Default)]
pub struct ValueAxisFormatter {
    state: FormatterState,
}

impl ValueAxisFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl AxisFormatter for ValueAxisFormatter {
    fn state(&self) -> &FormatterState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FormatterState {
        &mut self.state
    }

    fn compute(&mut self, input: &FormatterInput<'_>) -> SegmentOverride {
        self.state
            .layout_linear(input.segment_count, input.sub_segment_count);
        SegmentOverride::default()
    }

    fn boxed_clone(&self) -> Box<dyn AxisFormatter> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{AxisFormatter, FormatterInput, ValueAxisFormatter};

    fn input(segment_count: usize, sub_segment_count: usize) -> FormatterInput<'static> {
        FormatterInput {
            min: 0.0,
            max: 10.0,
            segment_count,
            sub_segment_count,
            label_format: "%.1f",
        }
    }

    fn attached() -> ValueAxisFormatter {
        let mut formatter = ValueAxisFormatter::new();
        formatter.state_mut().attach();
        formatter
    }

    #[test]
    fn detached_formatter_never_recalculates() {
        let mut formatter = ValueAxisFormatter::new();
        assert!(formatter.recalculate(&input(5, 1)).is_none());
        assert!(formatter.state().grid_positions().is_empty());
    }

    #[test]
    fn five_segments_without_sub_grid() {
        let mut formatter = attached();
        formatter.recalculate(&input(5, 1));

        let expected = [-1.0, -0.6, -0.2, 0.2, 0.6, 1.0];
        let grid = formatter.state().grid_positions();
        assert_eq!(grid.len(), expected.len());
        for (actual, expected) in grid.iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-6);
        }
        assert_eq!(formatter.state().label_positions(), grid);
        assert_eq!(formatter.state().sub_grid_positions().len(), 5);
        assert!(
            formatter
                .state()
                .sub_grid_positions()
                .iter()
                .all(|group| group.is_empty())
        );
    }

    #[test]
    fn sub_grid_groups_split_each_segment() {
        let mut formatter = attached();
        formatter.recalculate(&input(2, 3));
        let groups = formatter.state().sub_grid_positions();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 2);
        assert!((groups[0][0] - (-1.0 + 1.0 / 3.0)).abs() < 1e-6);
        assert!((groups[1][1] - (2.0 / 3.0)).abs() < 1e-6);
    }

    #[test]
    fn second_recalculate_is_a_no_op() {
        let mut formatter = attached();
        assert!(formatter.recalculate(&input(4, 2)).is_some());
        assert!(!formatter.needs_recalculate());
        assert!(formatter.recalculate(&input(4, 2)).is_none());
    }

    #[test]
    fn labels_use_the_axis_format() {
        let mut formatter = attached();
        formatter.recalculate(&input(2, 1));
        assert_eq!(formatter.label_for_index(1, "%.1f").as_deref(), Ok("5.0"));
        assert_eq!(formatter.label_for_index(2, "%d m").as_deref(), Ok("10 m"));
        assert!(formatter.label_for_index(3, "%d").is_err());
    }

    #[test]
    fn populate_copy_is_detached() {
        let mut formatter = attached();
        let mut copy = formatter.populate_copy(&input(3, 1));
        assert_eq!(copy.state().grid_positions().len(), 4);
        assert!(!copy.state().is_attached());
        copy.mark_dirty(false);
        assert!(copy.recalculate(&input(6, 1)).is_none());
        assert_eq!(copy.state().grid_positions().len(), 4);
    }
}
