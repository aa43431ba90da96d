use datavis3d_rs::core::{Axis, AxisRange, LogValueAxisFormatter, RangePolicy, RangeUpdate};
use proptest::prelude::*;

const LOG_POLICY: RangePolicy = RangePolicy {
    allow_negatives: false,
    allow_zero: false,
    allow_min_max_same: false,
};

fn assert_range_valid(range: &AxisRange) -> Result<(), TestCaseError> {
    let policy = range.policy();
    if policy.allow_min_max_same {
        prop_assert!(range.min() <= range.max());
    } else {
        prop_assert!(range.min() < range.max());
    }
    if !policy.allow_negatives {
        prop_assert!(range.min() >= 0.0);
    }
    if !policy.allow_zero {
        prop_assert!(range.min() > 0.0);
    }
    Ok(())
}

fn policy_strategy() -> impl Strategy<Value = RangePolicy> {
    prop_oneof![
        Just(RangePolicy::VALUE),
        Just(RangePolicy::CATEGORY),
        Just(LOG_POLICY),
    ]
}

proptest! {
    #[test]
    fn set_range_always_leaves_a_valid_range(
        policy in policy_strategy(),
        min in -1.0e6f32..1.0e6,
        max in -1.0e6f32..1.0e6
    ) {
        let mut range = AxisRange::new(1.0, 10.0, policy);
        range.set_range(min, max);
        assert_range_valid(&range)?;
    }

    #[test]
    fn single_bound_updates_keep_the_range_valid(
        policy in policy_strategy(),
        bounds in prop::collection::vec((any::<bool>(), -1.0e4f32..1.0e4), 1..16)
    ) {
        let mut range = AxisRange::new(1.0, 10.0, policy);
        for (is_min, value) in bounds {
            if is_min {
                range.set_min(value);
            } else {
                range.set_max(value);
            }
            assert_range_valid(&range)?;
        }
    }
}

#[test]
fn equal_bounds_on_a_value_axis_are_repaired() {
    let mut axis = Axis::value();
    assert_eq!(axis.set_range(5.0, 5.0), RangeUpdate::Adjusted);
    assert_eq!((axis.min(), axis.max()), (5.0, 6.0));
    assert!(!axis.auto_adjust_range());
}

#[test]
fn minimum_past_maximum_pushes_maximum() {
    let mut range = AxisRange::new(0.0, 8.0, RangePolicy::VALUE);
    let change = range.set_min(10.0);
    assert!(change.min_changed);
    assert!(change.max_changed);
    assert_eq!(change.outcome, RangeUpdate::Adjusted);
    assert_eq!((range.min(), range.max()), (10.0, 11.0));
}

#[test]
fn category_axis_clamps_negative_bounds() {
    let mut axis = Axis::category();
    assert_eq!(axis.set_range(-3.0, 4.0), RangeUpdate::Adjusted);
    assert_eq!((axis.min(), axis.max()), (0.0, 4.0));
    assert_eq!(axis.set_range(2.0, 2.0), RangeUpdate::Applied);
}

#[test]
fn maximum_that_cannot_be_repaired_is_rejected() {
    let policy = RangePolicy {
        allow_negatives: false,
        allow_zero: true,
        allow_min_max_same: false,
    };
    let mut range = AxisRange::new(2.0, 5.0, policy);
    let change = range.set_max(0.0);
    assert_eq!(change.outcome, RangeUpdate::Rejected);
    assert!(!change.range_changed());
    assert_eq!((range.min(), range.max()), (2.0, 5.0));
}

#[test]
fn log_formatter_moves_a_value_axis_off_zero() {
    let mut axis = Axis::value();
    axis.set_range(-5.0, 100.0);
    axis.set_formatter(Box::new(LogValueAxisFormatter::new()));
    assert!(axis.min() > 0.0);
    assert_eq!(axis.max(), 100.0);
}
