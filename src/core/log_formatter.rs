use std::any::Any;

use tracing::warn;

use crate::core::formatter::{
    AxisFormatter, FormatterInput, FormatterState, SegmentOverride, SubGridGroup,
};
use crate::error::{GraphError, GraphResult};

/// Logarithmic value axis formatter.
///
/// With a positive `base` the axis gets one segment per power of the base
/// and the segment counts of the owning axis are rewritten on every
/// recalculation. A base of zero keeps the configured counts and spaces grid
/// lines evenly along the log scale. Value/position mapping always uses the
/// natural log since the base cancels out.
#[derive(Debug, Clone)]
pub struct LogValueAxisFormatter {
    state: FormatterState,
    base: f64,
    auto_sub_grid: bool,
    show_max_label: bool,
    log_min: f64,
    log_max: f64,
    log_range: f64,
    even_segments: bool,
}

impl Default for LogValueAxisFormatter {
    fn default() -> Self {
        Self {
            state: FormatterState::default(),
            base: 10.0,
            auto_sub_grid: true,
            show_max_label: true,
            log_min: 0.0,
            log_max: 0.0,
            log_range: 0.0,
            even_segments: true,
        }
    }
}

fn fuzzy_equal(a: f32, b: f32) -> bool {
    (a - b).abs() * 100_000.0 <= a.abs().min(b.abs())
}

impl LogValueAxisFormatter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn base(&self) -> f64 {
        self.base
    }

    /// Sets the logarithm base. Bases below zero or equal to one are
    /// rejected with a warning; returns whether the value was accepted.
    pub fn set_base(&mut self, base: f64) -> bool {
        if !base.is_finite() || base < 0.0 || base == 1.0 {
            warn!(base, "logarithm base must be greater than 0 and not equal to 1");
            return false;
        }
        if self.base != base {
            self.base = base;
            self.mark_dirty(true);
        }
        true
    }

    #[must_use]
    pub fn auto_sub_grid(&self) -> bool {
        self.auto_sub_grid
    }

    pub fn set_auto_sub_grid(&mut self, enabled: bool) {
        if self.auto_sub_grid != enabled {
            self.auto_sub_grid = enabled;
            self.mark_dirty(false);
        }
    }

    #[must_use]
    pub fn show_max_label(&self) -> bool {
        self.show_max_label
    }

    pub fn set_show_max_label(&mut self, enabled: bool) {
        if self.show_max_label != enabled {
            self.show_max_label = enabled;
            self.mark_dirty(true);
        }
    }

    /// Whether the last segment spans the same log distance as the others.
    #[must_use]
    pub fn even_segments(&self) -> bool {
        self.even_segments
    }

    fn unit_position_at(&self, value: f64) -> f64 {
        (value.ln() - self.log_min) / self.log_range
    }

    fn layout_by_base(&mut self, min: f64, max: f64) -> usize {
        let log_base = self.base.ln();
        let log_range = max.ln() / log_base - min.ln() / log_base;
        let segment_count = (log_range.ceil() as usize).max(1);

        let state = &mut self.state;
        state.reset_arrays();
        for index in 0..segment_count {
            let unit = index as f64 / log_range;
            let position = (2.0 * unit - 1.0) as f32;
            state.grid_positions_mut().push(position);
            state.label_positions_mut().push(position);
        }
        state.grid_positions_mut().push(1.0);
        state.label_positions_mut().push(1.0);

        let labels = state.label_positions();
        let last_diff = 1.0 - labels[segment_count - 1];
        let first_diff = labels[1] - labels[0];
        self.even_segments = fuzzy_equal(last_diff, first_diff);
        segment_count
    }
}

impl AxisFormatter for LogValueAxisFormatter {
    fn state(&self) -> &FormatterState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut FormatterState {
        &mut self.state
    }

    fn allow_negatives(&self) -> bool {
        false
    }

    fn allow_zero(&self) -> bool {
        false
    }

    fn compute(&mut self, input: &FormatterInput<'_>) -> SegmentOverride {
        let min = f64::from(input.min).max(f64::MIN_POSITIVE);
        let max = f64::from(input.max).max(min);
        let mut segment_override = SegmentOverride::default();

        let (segment_count, sub_segment_count) = if self.base > 0.0 {
            let segment_count = self.layout_by_base(min, max);
            segment_override.segment_count = Some(segment_count);
            let sub_segment_count = if self.auto_sub_grid {
                let count = (self.base.ceil() as usize).saturating_sub(1).max(1);
                segment_override.sub_segment_count = Some(count);
                count
            } else {
                input.sub_segment_count.max(1)
            };
            (segment_count, sub_segment_count)
        } else {
            self.state
                .layout_linear(input.segment_count, input.sub_segment_count);
            self.even_segments = true;
            (input.segment_count.max(1), input.sub_segment_count.max(1))
        };

        self.log_min = min.ln();
        self.log_max = max.ln();
        self.log_range = self.log_max - self.log_min;

        let label_values: Vec<f64> = self
            .state
            .label_positions()
            .iter()
            .map(|position| f64::from(self.value_at(*position)))
            .collect();
        let values = self.state.label_values_mut();
        *values = label_values;
        if let Some(last) = values.last_mut() {
            *last = max;
        }

        // Log spacing is identical in every segment, so offsets measured in
        // the first segment are replicated.
        let sub_grid_count = sub_segment_count - 1;
        let mut offsets = SubGridGroup::new();
        if sub_grid_count > 0 {
            let first_grid_value = f64::from(self.value_at(self.state.grid_positions()[1]));
            let sub_segment_step = (first_grid_value - min) / (sub_grid_count + 1) as f64;
            offsets.extend((0..sub_grid_count).map(|step| {
                let unit = self.unit_position_at(min + (step + 1) as f64 * sub_segment_step);
                (2.0 * unit) as f32
            }));
        }

        let grid: Vec<f32> = self.state.grid_positions()[..segment_count].to_vec();
        let groups = self.state.sub_grid_positions_mut();
        groups.clear();
        groups.extend(grid.iter().map(|grid_position| {
            offsets
                .iter()
                .map(|offset| (grid_position + offset).min(1.0))
                .collect()
        }));

        segment_override
    }

    fn position_at(&self, value: f32) -> f32 {
        (2.0 * self.unit_position_at(f64::from(value)) - 1.0) as f32
    }

    fn value_at(&self, position: f32) -> f32 {
        let unit = (f64::from(position) + 1.0) / 2.0;
        (unit * self.log_range + self.log_min).exp() as f32
    }

    fn label_for_index(&mut self, index: usize, format: &str) -> GraphResult<String> {
        let last = self.state.grid_positions().len().saturating_sub(1);
        if index == last && !self.even_segments && !self.show_max_label {
            return Ok(String::new());
        }
        let value = self.state.label_values().get(index).copied();
        match value {
            Some(value) => Ok(self.string_for_value(value, format)),
            None => Err(GraphError::IndexOutOfRange {
                index,
                len: self.state.label_values().len(),
            }),
        }
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
    use approx::assert_relative_eq;

    use super::LogValueAxisFormatter;
    use crate::core::formatter::{AxisFormatter, FormatterInput};

    fn input(min: f32, max: f32) -> FormatterInput<'static> {
        FormatterInput {
            min,
            max,
            segment_count: 5,
            sub_segment_count: 1,
            label_format: "%.0f",
        }
    }

    fn attached() -> LogValueAxisFormatter {
        let mut formatter = LogValueAxisFormatter::new();
        formatter.state_mut().attach();
        formatter
    }

    #[test]
    fn decades_become_segments() {
        let mut formatter = attached();
        let counts = formatter.recalculate(&input(1.0, 1000.0)).unwrap_or_default();
        assert_eq!(counts.segment_count, Some(3));
        assert_eq!(counts.sub_segment_count, Some(9));
        assert!(formatter.even_segments());

        let grid = formatter.state().grid_positions();
        assert_eq!(grid.len(), 4);
        assert_relative_eq!(grid[0], -1.0);
        assert_relative_eq!(grid[1], -1.0 / 3.0, epsilon = 1e-5);
        assert_eq!(grid[3], 1.0);

        let groups = formatter.state().sub_grid_positions();
        assert_eq!(groups.len(), 3);
        assert!(groups.iter().all(|group| group.len() == 8));
        assert!(groups.iter().flatten().all(|position| *position <= 1.0));
    }

    #[test]
    fn mapping_round_trips_on_the_log_scale() {
        let mut formatter = attached();
        formatter.recalculate(&input(1.0, 100.0));
        assert_relative_eq!(formatter.position_at(10.0), 0.0, epsilon = 1e-5);
        assert_relative_eq!(formatter.value_at(0.0), 10.0, epsilon = 1e-3);
        assert_relative_eq!(formatter.position_at(100.0), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn uneven_last_segment_can_hide_max_label() {
        let mut formatter = attached();
        formatter.set_show_max_label(false);
        formatter.recalculate(&input(1.0, 500.0));
        assert!(!formatter.even_segments());
        assert_eq!(formatter.label_for_index(3, "%.0f").as_deref(), Ok(""));
        assert_eq!(formatter.label_for_index(1, "%.0f").as_deref(), Ok("10"));
    }

    #[test]
    fn invalid_bases_are_rejected() {
        let mut formatter = LogValueAxisFormatter::new();
        assert!(!formatter.set_base(1.0));
        assert!(!formatter.set_base(-2.0));
        assert_eq!(formatter.base(), 10.0);
        assert!(formatter.set_base(2.0));
        assert!(formatter.needs_recalculate());
    }

    #[test]
    fn natural_base_keeps_configured_segments() {
        let mut formatter = attached();
        formatter.set_base(0.0);
        formatter.set_auto_sub_grid(false);
        let counts = formatter.recalculate(&input(1.0, 50.0)).unwrap_or_default();
        assert_eq!(counts.segment_count, None);
        assert_eq!(formatter.state().grid_positions().len(), 6);
        assert!(formatter.even_segments());
    }

    #[test]
    fn log_formatter_forbids_non_positive_ranges() {
        let formatter = LogValueAxisFormatter::new();
        assert!(!formatter.allow_negatives());
        assert!(!formatter.allow_zero());
    }
}
