use std::any::Any;

use tracing::{trace, warn};

use crate::core::axis_range::{AxisRange, RangeChange, RangePolicy, RangeUpdate};
use crate::core::change_flags::{AxisChange, ChangeSet};
use crate::core::formatter::{AxisFormatter, FormatterInput, SegmentOverride, ValueAxisFormatter};
use crate::core::label_format::DEFAULT_LABEL_FORMAT;
use crate::core::types::{AxisKind, AxisOrientation};

const DEFAULT_SEGMENT_COUNT: usize = 5;
const DEFAULT_SUB_SEGMENT_COUNT: usize = 1;

#[derive(Debug)]
struct CategoryAxisState {
    labels_explicitly_set: bool,
}

#[derive(Debug)]
struct ValueAxisState {
    segment_count: usize,
    sub_segment_count: usize,
    label_format: String,
    reversed: bool,
    labels_dirty: bool,
    formatter: Box<dyn AxisFormatter>,
}

impl ValueAxisState {
    fn range_policy(&self) -> RangePolicy {
        RangePolicy {
            allow_negatives: self.formatter.allow_negatives(),
            allow_zero: self.formatter.allow_zero(),
            allow_min_max_same: false,
        }
    }
}

#[derive(Debug)]
enum AxisVariant {
    Category(CategoryAxisState),
    Value(ValueAxisState),
}

/// Graph axis: a category axis with string labels or a value axis whose
/// labels and grid layout come from its formatter.
///
/// Every mutation records an [`AxisChange`] that the controller drains once
/// per sync pass.
#[derive(Debug)]
pub struct Axis {
    orientation: AxisOrientation,
    title: String,
    title_visible: bool,
    title_fixed: bool,
    label_auto_rotation: f32,
    range: AxisRange,
    auto_adjust_range: bool,
    labels: Vec<String>,
    changes: ChangeSet<AxisChange>,
    variant: AxisVariant,
}

impl Axis {
    fn with_variant(variant: AxisVariant, policy: RangePolicy) -> Self {
        Self {
            orientation: AxisOrientation::None,
            title: String::new(),
            title_visible: false,
            title_fixed: true,
            label_auto_rotation: 0.0,
            range: AxisRange::new(0.0, 10.0, policy),
            auto_adjust_range: true,
            labels: Vec::new(),
            changes: ChangeSet::all(),
            variant,
        }
    }

    #[must_use]
    pub fn category() -> Self {
        Self::with_variant(
            AxisVariant::Category(CategoryAxisState {
                labels_explicitly_set: false,
            }),
            RangePolicy::CATEGORY,
        )
    }

    #[must_use]
    pub fn category_with_labels(labels: Vec<String>) -> Self {
        let mut axis = Self::category();
        axis.set_labels(labels);
        axis
    }

    #[must_use]
    pub fn value() -> Self {
        let mut formatter: Box<dyn AxisFormatter> = Box::new(ValueAxisFormatter::new());
        formatter.state_mut().attach();
        let state = ValueAxisState {
            segment_count: DEFAULT_SEGMENT_COUNT,
            sub_segment_count: DEFAULT_SUB_SEGMENT_COUNT,
            label_format: DEFAULT_LABEL_FORMAT.to_owned(),
            reversed: false,
            labels_dirty: true,
            formatter,
        };
        let policy = state.range_policy();
        Self::with_variant(AxisVariant::Value(state), policy)
    }

    #[must_use]
    pub fn kind(&self) -> AxisKind {
        match self.variant {
            AxisVariant::Category(_) => AxisKind::Category,
            AxisVariant::Value(_) => AxisKind::Value,
        }
    }

    #[must_use]
    pub fn orientation(&self) -> AxisOrientation {
        self.orientation
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if self.title != title {
            self.title = title;
            self.changes.insert(AxisChange::Title);
        }
    }

    #[must_use]
    pub fn title_visible(&self) -> bool {
        self.title_visible
    }

    pub fn set_title_visible(&mut self, visible: bool) {
        if self.title_visible != visible {
            self.title_visible = visible;
            self.changes.insert(AxisChange::TitleVisibility);
        }
    }

    #[must_use]
    pub fn title_fixed(&self) -> bool {
        self.title_fixed
    }

    pub fn set_title_fixed(&mut self, fixed: bool) {
        if self.title_fixed != fixed {
            self.title_fixed = fixed;
            self.changes.insert(AxisChange::TitleFixed);
        }
    }

    #[must_use]
    pub fn label_auto_rotation(&self) -> f32 {
        self.label_auto_rotation
    }

    /// Maximum label rotation in degrees, clamped to `[0, 90]`.
    pub fn set_label_auto_rotation(&mut self, degrees: f32) {
        let clamped = if degrees.is_nan() {
            0.0
        } else {
            degrees.clamp(0.0, 90.0)
        };
        if clamped != degrees {
            warn!(degrees, clamped, "label auto rotation clamped to [0, 90]");
        }
        if self.label_auto_rotation != clamped {
            self.label_auto_rotation = clamped;
            self.changes.insert(AxisChange::LabelAutoRotation);
        }
    }

    #[must_use]
    pub fn min(&self) -> f32 {
        self.range.min()
    }

    #[must_use]
    pub fn max(&self) -> f32 {
        self.range.max()
    }

    #[must_use]
    pub fn range(&self) -> &AxisRange {
        &self.range
    }

    #[must_use]
    pub fn auto_adjust_range(&self) -> bool {
        self.auto_adjust_range
    }

    /// Toggles data fitting. Enabling it flags the range so the next sync
    /// pass refits the axis.
    pub fn set_auto_adjust_range(&mut self, enabled: bool) {
        if self.auto_adjust_range != enabled {
            self.auto_adjust_range = enabled;
            self.changes.insert(AxisChange::Range);
        }
    }

    /// Sets both bounds. Explicit ranges switch off automatic fitting.
    pub fn set_range(&mut self, min: f32, max: f32) -> RangeUpdate {
        self.auto_adjust_range = false;
        let change = self.range.set_range(min, max);
        self.record_range_change(change)
    }

    pub fn set_min(&mut self, min: f32) -> RangeUpdate {
        self.auto_adjust_range = false;
        let change = self.range.set_min(min);
        self.record_range_change(change)
    }

    pub fn set_max(&mut self, max: f32) -> RangeUpdate {
        self.auto_adjust_range = false;
        let change = self.range.set_max(max);
        self.record_range_change(change)
    }

    /// Range update driven by data fitting; keeps `auto_adjust_range` on.
    pub(crate) fn fit_range(&mut self, min: f32, max: f32) -> RangeUpdate {
        let change = self.range.set_range(min, max);
        self.record_range_change(change)
    }

    fn record_range_change(&mut self, change: RangeChange) -> RangeUpdate {
        if change.range_changed() {
            self.changes.insert(AxisChange::Range);
            if let AxisVariant::Value(state) = &mut self.variant {
                state.labels_dirty = true;
                state.formatter.mark_dirty(false);
                self.changes.insert(AxisChange::Labels);
            }
        }
        change.outcome
    }

    /// Current label strings. Value axis labels are regenerated from the
    /// formatter when stale.
    pub fn labels(&mut self) -> &[String] {
        self.refresh_value_labels();
        &self.labels
    }

    /// Labels as of the last refresh, without regenerating.
    #[must_use]
    pub fn cached_labels(&self) -> &[String] {
        &self.labels
    }

    /// Sets explicit category labels. An empty list falls back to labels
    /// taken from the data, where the graph provides them.
    pub fn set_labels(&mut self, labels: Vec<String>) {
        let AxisVariant::Category(state) = &mut self.variant else {
            warn!("labels of a value axis are generated by its formatter; ignoring");
            return;
        };
        state.labels_explicitly_set = !labels.is_empty();
        if self.labels != labels {
            self.labels = labels;
            self.changes.insert(AxisChange::Labels);
        }
    }

    #[must_use]
    pub fn labels_explicitly_set(&self) -> bool {
        matches!(
            &self.variant,
            AxisVariant::Category(state) if state.labels_explicitly_set
        )
    }

    pub(crate) fn set_data_labels(&mut self, labels: Vec<String>) {
        if let AxisVariant::Category(state) = &self.variant {
            if !state.labels_explicitly_set && self.labels != labels {
                self.labels = labels;
                self.changes.insert(AxisChange::Labels);
            }
        }
    }

    fn value_state(&self) -> Option<&ValueAxisState> {
        match &self.variant {
            AxisVariant::Value(state) => Some(state),
            AxisVariant::Category(_) => None,
        }
    }

    #[must_use]
    pub fn segment_count(&self) -> Option<usize> {
        self.value_state().map(|state| state.segment_count)
    }

    /// Sets the segment count; zero is corrected to one with a warning.
    pub fn set_segment_count(&mut self, count: u32) {
        let count = corrected_count(count, "segment");
        let Some(state) = value_state_mut(&mut self.variant, "set_segment_count") else {
            return;
        };
        if state.segment_count != count {
            state.segment_count = count;
            state.labels_dirty = true;
            state.formatter.mark_dirty(false);
            self.changes.insert(AxisChange::SegmentCount);
            self.changes.insert(AxisChange::Labels);
        }
    }

    #[must_use]
    pub fn sub_segment_count(&self) -> Option<usize> {
        self.value_state().map(|state| state.sub_segment_count)
    }

    pub fn set_sub_segment_count(&mut self, count: u32) {
        let count = corrected_count(count, "sub-segment");
        let Some(state) = value_state_mut(&mut self.variant, "set_sub_segment_count") else {
            return;
        };
        if state.sub_segment_count != count {
            state.sub_segment_count = count;
            state.formatter.mark_dirty(false);
            self.changes.insert(AxisChange::SubSegmentCount);
        }
    }

    #[must_use]
    pub fn label_format(&self) -> Option<&str> {
        self.value_state().map(|state| state.label_format.as_str())
    }

    pub fn set_label_format(&mut self, format: impl Into<String>) {
        let format = format.into();
        let Some(state) = value_state_mut(&mut self.variant, "set_label_format") else {
            return;
        };
        if state.label_format != format {
            state.label_format = format;
            state.labels_dirty = true;
            self.changes.insert(AxisChange::LabelFormat);
            self.changes.insert(AxisChange::Labels);
        }
    }

    #[must_use]
    pub fn reversed(&self) -> bool {
        self.value_state().is_some_and(|state| state.reversed)
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        let Some(state) = value_state_mut(&mut self.variant, "set_reversed") else {
            return;
        };
        if state.reversed != reversed {
            state.reversed = reversed;
            self.changes.insert(AxisChange::Reversed);
        }
    }

    #[must_use]
    pub fn formatter(&self) -> Option<&dyn AxisFormatter> {
        self.value_state().map(|state| state.formatter.as_ref())
    }

    /// Mutable access to the formatter; changes it records are picked up on
    /// the next sync pass.
    pub fn formatter_mut(&mut self) -> Option<&mut dyn AxisFormatter> {
        match &mut self.variant {
            AxisVariant::Value(state) => Some(state.formatter.as_mut()),
            AxisVariant::Category(_) => None,
        }
    }

    /// Typed access to the installed formatter.
    pub fn formatter_as_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.formatter_mut()
            .and_then(|formatter| formatter.as_any_mut().downcast_mut::<T>())
    }

    #[must_use]
    pub fn formatter_as<T: Any>(&self) -> Option<&T> {
        self.formatter()
            .and_then(|formatter| formatter.as_any().downcast_ref::<T>())
    }

    /// Replaces the formatter. The previous one is dropped and the range is
    /// repaired against the new formatter's sign rules.
    pub fn set_formatter(&mut self, mut formatter: Box<dyn AxisFormatter>) {
        let Some(state) = value_state_mut(&mut self.variant, "set_formatter") else {
            return;
        };
        formatter.state_mut().attach();
        state.formatter = formatter;
        state.labels_dirty = true;
        let policy = state.range_policy();
        self.changes.insert(AxisChange::Formatter);
        self.changes.insert(AxisChange::Labels);

        let change = self.range.set_policy(policy);
        self.record_range_change(change);
    }

    fn apply_segment_override(&mut self, segment_override: SegmentOverride) {
        let AxisVariant::Value(state) = &mut self.variant else {
            return;
        };
        if let Some(count) = segment_override.segment_count {
            if state.segment_count != count {
                trace!(count, "formatter adjusted segment count");
                state.segment_count = count;
                self.changes.insert(AxisChange::SegmentCount);
            }
        }
        if let Some(count) = segment_override.sub_segment_count {
            if state.sub_segment_count != count {
                trace!(count, "formatter adjusted sub-segment count");
                state.sub_segment_count = count;
                self.changes.insert(AxisChange::SubSegmentCount);
            }
        }
    }

    /// Runs the formatter's recalculation if it is stale.
    pub fn recalculate_formatter(&mut self) {
        let (min, max) = (self.range.min(), self.range.max());
        let AxisVariant::Value(state) = &mut self.variant else {
            return;
        };
        let input = FormatterInput {
            min,
            max,
            segment_count: state.segment_count,
            sub_segment_count: state.sub_segment_count,
            label_format: &state.label_format,
        };
        if let Some(segment_override) = state.formatter.recalculate(&input) {
            self.apply_segment_override(segment_override);
        }
    }

    /// Detached formatter copy for the renderer, recalculated first.
    pub(crate) fn formatter_snapshot(&mut self) -> Option<Box<dyn AxisFormatter>> {
        self.recalculate_formatter();
        let (min, max) = (self.range.min(), self.range.max());
        let AxisVariant::Value(state) = &mut self.variant else {
            return None;
        };
        let input = FormatterInput {
            min,
            max,
            segment_count: state.segment_count,
            sub_segment_count: state.sub_segment_count,
            label_format: &state.label_format,
        };
        Some(state.formatter.populate_copy(&input))
    }

    fn refresh_value_labels(&mut self) {
        let stale = matches!(
            &self.variant,
            AxisVariant::Value(state) if state.labels_dirty || state.formatter.needs_recalculate()
        );
        if !stale {
            return;
        }
        self.recalculate_formatter();
        let AxisVariant::Value(state) = &mut self.variant else {
            return;
        };
        state.labels_dirty = false;
        let count = state.formatter.state().label_values().len();
        let format = state.label_format.clone();
        self.labels = (0..count)
            .map(|index| {
                state
                    .formatter
                    .label_for_index(index, &format)
                    .unwrap_or_default()
            })
            .collect();
    }

    /// Drains pending changes, folding in notices raised by the formatter.
    pub(crate) fn take_changes(&mut self) -> ChangeSet<AxisChange> {
        if let AxisVariant::Value(state) = &mut self.variant {
            let notice = state.formatter.state_mut().take_notice();
            if notice.formatter_dirty {
                self.changes.insert(AxisChange::Formatter);
            }
            if notice.labels_changed {
                state.labels_dirty = true;
                self.changes.insert(AxisChange::Labels);
            }
        }
        self.changes.take_all()
    }

    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        let formatter_pending = self
            .value_state()
            .is_some_and(|state| state.formatter.needs_recalculate());
        !self.changes.is_none() || formatter_pending
    }

    pub(crate) fn mark_all_changed(&mut self) {
        self.changes = ChangeSet::all();
        if let AxisVariant::Value(state) = &mut self.variant {
            state.labels_dirty = true;
        }
    }

    /// Binds the axis to an orientation. Orientation is assigned once; an
    /// axis already bound elsewhere is refused.
    pub(crate) fn assign_orientation(&mut self, orientation: AxisOrientation) -> bool {
        if self.orientation != AxisOrientation::None && self.orientation != orientation {
            warn!(
                current = ?self.orientation,
                requested = ?orientation,
                "axis already has an orientation; refusing to rebind"
            );
            return false;
        }
        self.orientation = orientation;
        true
    }

    pub(crate) fn detach(&mut self) {
        self.orientation = AxisOrientation::None;
    }
}

fn value_state_mut<'a>(
    variant: &'a mut AxisVariant,
    operation: &'static str,
) -> Option<&'a mut ValueAxisState> {
    match variant {
        AxisVariant::Value(state) => Some(state),
        AxisVariant::Category(_) => {
            warn!(operation, "operation only applies to value axes; ignoring");
            None
        }
    }
}

fn corrected_count(count: u32, what: &'static str) -> usize {
    if count == 0 {
        warn!(what, count, "illegal count automatically adjusted to 1");
        return 1;
    }
    count as usize
}

#[cfg(test)]
mod tests {
    use super::Axis;
    use crate::core::axis_range::RangeUpdate;
    use crate::core::change_flags::AxisChange;
    use crate::core::log_formatter::LogValueAxisFormatter;
    use crate::core::types::{AxisKind, AxisOrientation};

    #[test]
    fn value_axis_defaults() {
        let mut axis = Axis::value();
        assert_eq!(axis.kind(), AxisKind::Value);
        assert_eq!(axis.segment_count(), Some(5));
        assert_eq!(axis.sub_segment_count(), Some(1));
        assert_eq!(axis.label_format(), Some("%.2f"));
        assert_eq!(
            axis.labels(),
            ["0.00", "2.00", "4.00", "6.00", "8.00", "10.00"]
        );
    }

    #[test]
    fn explicit_range_disables_auto_adjust() {
        let mut axis = Axis::value();
        assert!(axis.auto_adjust_range());
        assert_eq!(axis.set_range(5.0, 5.0), RangeUpdate::Adjusted);
        assert!(!axis.auto_adjust_range());
        assert_eq!((axis.min(), axis.max()), (5.0, 6.0));
    }

    #[test]
    fn range_change_marks_labels_and_formatter() {
        let mut axis = Axis::value();
        axis.take_changes();
        axis.set_range(0.0, 20.0);
        let changes = axis.take_changes();
        assert!(changes.contains(AxisChange::Range));
        assert!(changes.contains(AxisChange::Labels));
        assert!(changes.contains(AxisChange::Formatter));
        assert_eq!(axis.labels().last().map(String::as_str), Some("20.00"));
    }

    #[test]
    fn zero_segment_count_is_corrected() {
        let mut axis = Axis::value();
        axis.set_segment_count(0);
        assert_eq!(axis.segment_count(), Some(1));
        axis.set_sub_segment_count(0);
        assert_eq!(axis.sub_segment_count(), Some(1));
    }

    #[test]
    fn category_axis_ignores_value_only_setters() {
        let mut axis = Axis::category_with_labels(vec!["a".into(), "b".into()]);
        axis.set_segment_count(3);
        axis.set_label_format("%d");
        assert_eq!(axis.segment_count(), None);
        assert_eq!(axis.label_format(), None);
        assert_eq!(axis.labels(), ["a", "b"]);
        assert!(axis.labels_explicitly_set());
    }

    #[test]
    fn data_labels_do_not_replace_explicit_labels() {
        let mut axis = Axis::category_with_labels(vec!["q1".into()]);
        axis.set_data_labels(vec!["row".into()]);
        assert_eq!(axis.cached_labels(), ["q1"]);

        axis.set_labels(Vec::new());
        axis.set_data_labels(vec!["row".into()]);
        assert_eq!(axis.cached_labels(), ["row"]);
    }

    #[test]
    fn log_formatter_repairs_range_and_rewrites_segments() {
        let mut axis = Axis::value();
        axis.set_range(-5.0, 1000.0);
        axis.set_formatter(Box::new(LogValueAxisFormatter::new()));
        assert!(axis.min() > 0.0);

        axis.set_range(1.0, 1000.0);
        axis.recalculate_formatter();
        assert_eq!(axis.segment_count(), Some(3));
        assert_eq!(axis.sub_segment_count(), Some(9));
        assert!(axis.formatter_as::<LogValueAxisFormatter>().is_some());
    }

    #[test]
    fn formatter_setter_notice_reaches_axis_changes() {
        let mut axis = Axis::value();
        axis.set_range(1.0, 100.0);
        axis.set_formatter(Box::new(LogValueAxisFormatter::new()));
        axis.take_changes();

        let formatter = axis
            .formatter_as_mut::<LogValueAxisFormatter>()
            .expect("log formatter installed");
        assert!(formatter.set_base(2.0));
        let changes = axis.take_changes();
        assert!(changes.contains(AxisChange::Formatter));
        assert!(changes.contains(AxisChange::Labels));
    }

    #[test]
    fn orientation_is_assigned_once() {
        let mut axis = Axis::value();
        assert!(axis.assign_orientation(AxisOrientation::Y));
        assert!(!axis.assign_orientation(AxisOrientation::X));
        assert_eq!(axis.orientation(), AxisOrientation::Y);
        axis.detach();
        assert_eq!(axis.orientation(), AxisOrientation::None);
    }

    #[test]
    fn label_rotation_is_clamped() {
        let mut axis = Axis::category();
        axis.set_label_auto_rotation(120.0);
        assert_eq!(axis.label_auto_rotation(), 90.0);
        axis.set_label_auto_rotation(-3.0);
        assert_eq!(axis.label_auto_rotation(), 0.0);
    }
}
