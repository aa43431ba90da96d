use approx::assert_relative_eq;
use datavis3d_rs::core::{Axis, AxisFormatter, AxisKind, AxisOrientation, LogValueAxisFormatter};
use datavis3d_rs::render::{AxisRenderCache, NullBackend};
use proptest::prelude::*;

fn recalculated_axis(min: f32, max: f32, segments: u32, sub_segments: u32) -> Axis {
    let mut axis = Axis::value();
    axis.set_range(min, max);
    axis.set_segment_count(segments);
    axis.set_sub_segment_count(sub_segments);
    axis.recalculate_formatter();
    axis
}

fn formatter(axis: &Axis) -> &dyn AxisFormatter {
    axis.formatter().expect("value axes always carry a formatter")
}

proptest! {
    #[test]
    fn grid_endpoints_are_pinned(
        segments in 1u32..64,
        sub_segments in 1u32..8,
        min in -1.0e4f32..1.0e4,
        span in 0.01f32..1.0e4
    ) {
        let axis = recalculated_axis(min, min + span, segments, sub_segments);
        let grid = formatter(&axis).state().grid_positions();
        prop_assert_eq!(grid.len(), segments as usize + 1);
        prop_assert_eq!(grid[0], -1.0);
        prop_assert_eq!(grid[segments as usize], 1.0);
        prop_assert!(grid.iter().all(|position| (-1.0..=1.0).contains(position)));
    }

    #[test]
    fn value_position_mapping_round_trips(
        min in -1.0e3f32..1.0e3,
        span in 0.1f32..1.0e3,
        fraction in 0.0f32..=1.0
    ) {
        let max = min + span;
        let axis = recalculated_axis(min, max, 5, 1);
        let value = min + span * fraction;
        let formatter = formatter(&axis);
        let back = formatter.value_at(formatter.position_at(value));
        let tolerance = 1.0e-4 * (min.abs() + max.abs() + 1.0);
        prop_assert!((back - value).abs() <= tolerance, "{} vs {}", back, value);
    }

    #[test]
    fn second_recalculation_is_a_no_op(
        segments in 1u32..32,
        sub_segments in 1u32..6
    ) {
        let mut axis = recalculated_axis(0.0, 50.0, segments, sub_segments);
        let grid = formatter(&axis).state().grid_positions().to_vec();
        let labels = formatter(&axis).state().label_positions().to_vec();
        prop_assert!(!formatter(&axis).needs_recalculate());

        axis.recalculate_formatter();
        prop_assert!(!formatter(&axis).needs_recalculate());
        prop_assert_eq!(formatter(&axis).state().grid_positions(), grid.as_slice());
        prop_assert_eq!(formatter(&axis).state().label_positions(), labels.as_slice());
    }
}

#[test]
fn five_segments_without_sub_grid() {
    let mut axis = Axis::value();
    axis.recalculate_formatter();
    let state = formatter(&axis).state();

    let expected: [f32; 6] = [-1.0, -0.6, -0.2, 0.2, 0.6, 1.0];
    assert_eq!(state.grid_positions().len(), expected.len());
    for (position, expected) in state.grid_positions().iter().zip(expected) {
        assert_relative_eq!(*position, expected, epsilon = 1e-6);
    }
    assert!(state.sub_grid_positions().iter().all(|group| group.is_empty()));
}

#[test]
fn sub_segments_split_each_segment() {
    let mut backend = NullBackend::new();
    let axis = recalculated_axis(0.0, 10.0, 2, 3);
    let state = formatter(&axis).state();
    let groups = state.sub_grid_positions();
    assert_eq!(groups.len(), 2);
    assert!(groups.iter().all(|group| group.len() == 2));
    assert_relative_eq!(groups[0][0], -2.0 / 3.0, epsilon = 1e-6);
    assert_relative_eq!(groups[1][1], 2.0 / 3.0, epsilon = 1e-6);

    let mut cache = AxisRenderCache::new(AxisOrientation::Y);
    cache.set_kind(AxisKind::Value, &mut backend);
    cache.set_segment_count(2);
    cache.set_sub_segment_count(3);
    cache.set_formatter(axis.formatter().map(|formatter| formatter.boxed_clone()));
    cache.update_all_positions();

    assert_eq!(cache.grid_line_instance_count(), 6);
    assert_eq!(cache.grid_positions().len(), 3 + 2 * 2);
    assert_eq!(cache.label_count(), 3);
}

#[test]
fn value_axis_labels_follow_the_label_format() {
    let mut axis = Axis::value();
    axis.set_range(0.0, 1.0);
    axis.set_segment_count(4);
    axis.set_label_format("%.2f s");
    assert_eq!(axis.labels(), ["0.00 s", "0.25 s", "0.50 s", "0.75 s", "1.00 s"]);

    axis.set_label_format("%d");
    assert_eq!(axis.labels(), ["0", "0", "0", "0", "1"]);
}

#[test]
fn log_axis_uses_one_segment_per_decade() {
    let mut axis = Axis::value();
    axis.set_formatter(Box::new(LogValueAxisFormatter::new()));
    axis.set_range(1.0, 1000.0);
    axis.set_label_format("%.0f");

    assert_eq!(axis.labels(), ["1", "10", "100", "1000"]);
    assert_eq!(axis.segment_count(), Some(3));
    assert_eq!(axis.sub_segment_count(), Some(9));
}

#[test]
fn log_base_changes_reach_the_labels() {
    let mut axis = Axis::value();
    axis.set_formatter(Box::new(LogValueAxisFormatter::new()));
    axis.set_range(1.0, 8.0);
    axis.set_label_format("%.0f");
    let decimal = axis.labels().to_vec();
    assert_eq!(decimal, ["1", "8"]);

    let log = axis
        .formatter_as_mut::<LogValueAxisFormatter>()
        .expect("log formatter installed");
    assert!(log.set_base(2.0));
    let binary = axis.labels().to_vec();
    assert!(binary.len() > decimal.len());
    assert_eq!(binary.first().map(String::as_str), Some("1"));
    assert_eq!(binary.last().map(String::as_str), Some("8"));
    assert_eq!(axis.sub_segment_count(), Some(1));
}
