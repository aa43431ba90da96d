use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which ranges an axis accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangePolicy {
    pub allow_negatives: bool,
    pub allow_zero: bool,
    pub allow_min_max_same: bool,
}

impl RangePolicy {
    /// Category axes: indices only, a single-category window is valid.
    pub const CATEGORY: Self = Self {
        allow_negatives: false,
        allow_zero: true,
        allow_min_max_same: true,
    };

    /// Linear value axes.
    pub const VALUE: Self = Self {
        allow_negatives: true,
        allow_zero: true,
        allow_min_max_same: false,
    };
}

impl Default for RangePolicy {
    fn default() -> Self {
        Self::VALUE
    }
}

/// How a range mutation was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeUpdate {
    /// Nothing changed.
    Unchanged,
    /// The requested values were stored as given.
    Applied,
    /// The range changed, but one or both bounds were repaired.
    Adjusted,
    /// The mutation was dropped and the range left as it was.
    Rejected,
}

/// Result of a range mutation, including per-bound change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeChange {
    pub min_changed: bool,
    pub max_changed: bool,
    pub outcome: RangeUpdate,
}

impl RangeChange {
    const fn unchanged() -> Self {
        Self {
            min_changed: false,
            max_changed: false,
            outcome: RangeUpdate::Unchanged,
        }
    }

    const fn rejected() -> Self {
        Self {
            min_changed: false,
            max_changed: false,
            outcome: RangeUpdate::Rejected,
        }
    }

    /// Whether a combined range-changed notification is due.
    #[must_use]
    pub const fn range_changed(self) -> bool {
        self.min_changed || self.max_changed
    }
}

/// `[min, max]` pair that stays valid under its [`RangePolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxisRange {
    min: f32,
    max: f32,
    policy: RangePolicy,
}

impl AxisRange {
    #[must_use]
    pub fn new(min: f32, max: f32, policy: RangePolicy) -> Self {
        let mut range = Self {
            min: 0.0,
            max: 10.0,
            policy,
        };
        range.set_range(min, max);
        range
    }

    #[must_use]
    pub const fn min(&self) -> f32 {
        self.min
    }

    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    #[must_use]
    pub const fn policy(&self) -> RangePolicy {
        self.policy
    }

    #[must_use]
    pub fn span(&self) -> f32 {
        self.max - self.min
    }

    #[must_use]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }

    /// Installs a new policy and repairs the stored range to satisfy it.
    pub fn set_policy(&mut self, policy: RangePolicy) -> RangeChange {
        if self.policy == policy {
            return RangeChange::unchanged();
        }
        self.policy = policy;
        self.set_range(self.min, self.max)
    }

    fn is_inverted(&self, min: f32, max: f32) -> bool {
        min > max || (!self.policy.allow_min_max_same && min == max)
    }

    /// Applies the sign policy to a requested bound. Returns the corrected
    /// value and whether a correction happened.
    fn clamp_bound(&self, value: f32) -> (f32, bool) {
        if !self.policy.allow_negatives && value < 0.0 {
            let clamped = if self.policy.allow_zero { 0.0 } else { 1.0 };
            return (clamped, true);
        }
        if !self.policy.allow_zero && value <= 0.0 {
            return (1.0, true);
        }
        (value, false)
    }

    /// Stores `[min, max]`, repairing an inverted or empty range to
    /// `max = min + 1`. Where one unit is lost to rounding the next
    /// representable value above `min` is used instead. Only a repair that
    /// would overflow past `f32::MAX` is rejected.
    pub fn set_range(&mut self, min: f32, max: f32) -> RangeChange {
        if !min.is_finite() || !max.is_finite() {
            warn!(min, max, "ignoring non-finite axis range");
            return RangeChange::rejected();
        }

        let (requested_min, requested_max) = (min, max);
        let (min, min_clamped) = self.clamp_bound(min);
        let (max, max_clamped) = self.clamp_bound(max);
        let mut adjusted = min_clamped || max_clamped;

        let new_max = if self.is_inverted(min, max) {
            adjusted = true;
            step_above(min)
        } else {
            max
        };
        if !new_max.is_finite() || self.is_inverted(min, new_max) {
            warn!(
                min = requested_min,
                max = requested_max,
                "axis range cannot be repaired at this magnitude; keeping current range"
            );
            return RangeChange::rejected();
        }

        let min_changed = self.min != min;
        let max_changed = self.max != new_max;
        self.min = min;
        self.max = new_max;

        if !(min_changed || max_changed) {
            return RangeChange::unchanged();
        }
        if adjusted {
            warn!(
                requested_min,
                requested_max,
                min = self.min,
                max = self.max,
                "tried to set invalid range for axis; range automatically adjusted"
            );
        }
        RangeChange {
            min_changed,
            max_changed,
            outcome: if adjusted {
                RangeUpdate::Adjusted
            } else {
                RangeUpdate::Applied
            },
        }
    }

    pub fn set_min(&mut self, min: f32) -> RangeChange {
        if !min.is_finite() {
            warn!(min, "ignoring non-finite axis minimum");
            return RangeChange::rejected();
        }

        let (min, clamped) = self.clamp_bound(min);
        if clamped {
            warn!(min, "tried to set a minimum outside the values this axis supports");
        }
        if self.min == min {
            return RangeChange::unchanged();
        }

        let mut max_changed = false;
        if self.is_inverted(min, self.max) {
            let repaired_max = step_above(min);
            if !repaired_max.is_finite() || self.is_inverted(min, repaired_max) {
                warn!(min, "unable to repair maximum for requested minimum");
                return RangeChange::rejected();
            }
            warn!(
                old_max = self.max,
                max = repaired_max,
                "tried to set minimum to equal or larger than maximum; maximum adjusted"
            );
            self.max = repaired_max;
            max_changed = true;
        }
        self.min = min;

        RangeChange {
            min_changed: true,
            max_changed,
            outcome: if clamped || max_changed {
                RangeUpdate::Adjusted
            } else {
                RangeUpdate::Applied
            },
        }
    }

    pub fn set_max(&mut self, max: f32) -> RangeChange {
        if !max.is_finite() {
            warn!(max, "ignoring non-finite axis maximum");
            return RangeChange::rejected();
        }

        let (max, clamped) = self.clamp_bound(max);
        if clamped {
            warn!(max, "tried to set a maximum outside the values this axis supports");
        }
        if self.max == max {
            return RangeChange::unchanged();
        }

        let mut min_changed = false;
        if self.is_inverted(self.min, max) {
            let mut repaired_min = step_below(max);
            if !self.policy.allow_negatives && repaired_min < 0.0 {
                repaired_min = 0.0;
            }
            if !self.policy.allow_zero && repaired_min <= 0.0 {
                repaired_min = max / 2.0;
            }
            if !repaired_min.is_finite() || self.is_inverted(repaired_min, max) {
                warn!(max, "unable to set axis maximum; minimum cannot be repaired below it");
                return RangeChange::rejected();
            }
            warn!(
                old_min = self.min,
                min = repaired_min,
                "tried to set maximum to equal or smaller than minimum; minimum adjusted"
            );
            self.min = repaired_min;
            min_changed = true;
        }
        self.max = max;

        RangeChange {
            min_changed,
            max_changed: true,
            outcome: if clamped || min_changed {
                RangeUpdate::Adjusted
            } else {
                RangeUpdate::Applied
            },
        }
    }
}

/// `value + 1`, or the next float up when the unit step rounds away.
fn step_above(value: f32) -> f32 {
    let stepped = value + 1.0;
    if stepped > value || !value.is_finite() {
        return stepped;
    }
    let bits = value.to_bits();
    if value > 0.0 {
        f32::from_bits(bits + 1)
    } else {
        f32::from_bits(bits - 1)
    }
}

/// `value - 1`, or the next float down when the unit step rounds away.
fn step_below(value: f32) -> f32 {
    -step_above(-value)
}

impl Default for AxisRange {
    fn default() -> Self {
        Self::new(0.0, 10.0, RangePolicy::VALUE)
    }
}

#[cfg(test)]
mod tests {
    use super::{AxisRange, RangePolicy, RangeUpdate};

    #[test]
    fn equal_bounds_are_repaired_on_value_axes() {
        let mut range = AxisRange::default();
        let change = range.set_range(5.0, 5.0);
        assert_eq!((range.min(), range.max()), (5.0, 6.0));
        assert_eq!(change.outcome, RangeUpdate::Adjusted);
        assert!(change.min_changed && change.max_changed);
    }

    #[test]
    fn category_range_accepts_equal_bounds_and_clamps_negatives() {
        let mut range = AxisRange::new(0.0, 3.0, RangePolicy::CATEGORY);
        assert_eq!(range.set_range(2.0, 2.0).outcome, RangeUpdate::Applied);
        assert_eq!((range.min(), range.max()), (2.0, 2.0));

        let change = range.set_range(-4.0, 1.0);
        assert_eq!(change.outcome, RangeUpdate::Adjusted);
        assert_eq!((range.min(), range.max()), (0.0, 1.0));
    }

    #[test]
    fn set_min_past_max_moves_max() {
        let mut range = AxisRange::new(0.0, 8.0, RangePolicy::VALUE);
        let change = range.set_min(10.0);
        assert_eq!((range.min(), range.max()), (10.0, 11.0));
        assert!(change.min_changed && change.max_changed);
        assert_eq!(change.outcome, RangeUpdate::Adjusted);
    }

    #[test]
    fn set_max_below_min_moves_min() {
        let mut range = AxisRange::new(4.0, 8.0, RangePolicy::VALUE);
        let change = range.set_max(2.0);
        assert_eq!((range.min(), range.max()), (1.0, 2.0));
        assert!(change.min_changed && change.max_changed);
    }

    #[test]
    fn zero_maximum_is_rejected_when_negatives_and_equality_are_forbidden() {
        let policy = RangePolicy {
            allow_negatives: false,
            allow_zero: true,
            allow_min_max_same: false,
        };
        let mut range = AxisRange::new(3.0, 6.0, policy);
        let change = range.set_max(0.0);
        assert_eq!(change.outcome, RangeUpdate::Rejected);
        assert!(!change.range_changed());
        assert_eq!((range.min(), range.max()), (3.0, 6.0));
    }

    #[test]
    fn same_value_is_unchanged() {
        let mut range = AxisRange::default();
        assert_eq!(range.set_min(0.0).outcome, RangeUpdate::Unchanged);
        assert_eq!(range.set_max(10.0).outcome, RangeUpdate::Unchanged);
        assert_eq!(range.set_range(0.0, 10.0).outcome, RangeUpdate::Unchanged);
    }

    #[test]
    fn zero_free_policy_keeps_bounds_positive() {
        let policy = RangePolicy {
            allow_negatives: false,
            allow_zero: false,
            allow_min_max_same: false,
        };
        let mut range = AxisRange::new(-10.0, 100.0, policy);
        assert_eq!((range.min(), range.max()), (1.0, 100.0));

        range.set_max(0.5);
        assert!(range.min() > 0.0);
        assert!(range.min() < range.max());
    }

    #[test]
    fn large_magnitudes_repair_to_the_next_float() {
        let mut range = AxisRange::default();
        let change = range.set_range(1.0e10, 1.0e10);
        assert_eq!(change.outcome, RangeUpdate::Adjusted);
        assert_eq!(range.min(), 1.0e10);
        assert!(range.max() > range.min());

        let change = range.set_min(-3.0e12);
        assert_eq!(change.outcome, RangeUpdate::Applied);
        let change = range.set_max(-4.0e12);
        assert_eq!(change.outcome, RangeUpdate::Adjusted);
        assert!(range.min() < range.max());
        assert_eq!(range.max(), -4.0e12);

        let change = range.set_min(2.0e15);
        assert_eq!(change.outcome, RangeUpdate::Adjusted);
        assert!(range.max() > 2.0e15);
    }

    #[test]
    fn repair_past_the_largest_float_is_rejected() {
        let mut range = AxisRange::default();
        let change = range.set_range(f32::MAX, f32::MAX);
        assert_eq!(change.outcome, RangeUpdate::Rejected);
        assert_eq!((range.min(), range.max()), (0.0, 10.0));
    }

    #[test]
    fn non_finite_input_is_rejected() {
        let mut range = AxisRange::default();
        assert_eq!(range.set_min(f32::NAN).outcome, RangeUpdate::Rejected);
        assert_eq!(
            range.set_range(0.0, f32::INFINITY).outcome,
            RangeUpdate::Rejected
        );
        assert_eq!((range.min(), range.max()), (0.0, 10.0));
    }
}
