use tracing::{debug, warn};

use crate::core::{Axis, AxisId, AxisOrientation, ControllerChange};
use crate::error::{GraphError, GraphResult};
use crate::render::RendererBackend;

use super::GraphController;
use super::graph_controller::{AxisSlot, default_axis};

impl<B: RendererBackend> GraphController<B> {
    /// Registers a detached value axis and returns its key.
    pub fn create_value_axis(&mut self) -> AxisId {
        let mut axis = Axis::value();
        axis.set_label_format(self.value_label_format.as_str());
        self.axes.insert(axis)
    }

    pub fn create_category_axis(&mut self, labels: Vec<String>) -> AxisId {
        self.axes.insert(Axis::category_with_labels(labels))
    }

    /// Binds `axis` to `orientation`, or installs a fresh default axis when
    /// `None`. A replaced default axis is destroyed; a replaced explicit axis
    /// is detached and stays registered.
    pub fn set_axis(&mut self, orientation: AxisOrientation, axis: Option<AxisId>) -> GraphResult<()> {
        let slot = slot_index(orientation)?;
        let current = self.axis_slots[slot];

        let next = match axis {
            Some(id) if id == current.id => return Ok(()),
            Some(id) => {
                let candidate = self.axes.get_mut(id).ok_or(GraphError::UnknownAxis(id))?;
                if !candidate.assign_orientation(orientation) {
                    return Err(GraphError::InvalidData(format!(
                        "axis is already bound to {:?}",
                        candidate.orientation()
                    )));
                }
                candidate.mark_all_changed();
                AxisSlot {
                    id,
                    is_default: false,
                }
            }
            None if current.is_default => return Ok(()),
            None => AxisSlot {
                id: self
                    .axes
                    .insert(default_axis(self.kind, orientation, &self.value_label_format)),
                is_default: true,
            },
        };

        self.retire_slot_axis(current);
        self.axis_slots[slot] = next;
        self.changes.insert(axis_type_change(orientation));
        debug!(?orientation, explicit = !next.is_default, "axis slot replaced");
        Ok(())
    }

    /// Detaches `id` from the controller and hands ownership back to the
    /// caller. A slot that used it falls back to a default axis.
    pub fn release_axis(&mut self, id: AxisId) -> GraphResult<Axis> {
        if !self.axes.contains(id) {
            return Err(GraphError::UnknownAxis(id));
        }
        if let Some(slot) = self.axis_slots.iter().position(|slot| slot.id == id) {
            let orientation = AxisOrientation::SLOTS[slot];
            if self.axis_slots[slot].is_default {
                warn!(?orientation, "releasing a default axis");
            }
            self.axis_slots[slot] = AxisSlot {
                id: self
                    .axes
                    .insert(default_axis(self.kind, orientation, &self.value_label_format)),
                is_default: true,
            };
            self.changes.insert(axis_type_change(orientation));
        }
        let mut axis = self.axes.remove(id).ok_or(GraphError::UnknownAxis(id))?;
        axis.detach();
        Ok(axis)
    }

    /// Key of the axis bound to `orientation`.
    #[must_use]
    pub fn axis_id(&self, orientation: AxisOrientation) -> Option<AxisId> {
        orientation.slot().map(|slot| self.axis_slots[slot].id)
    }

    /// Whether the controller created the axis bound to `orientation`.
    #[must_use]
    pub fn is_default_axis(&self, orientation: AxisOrientation) -> bool {
        orientation
            .slot()
            .is_some_and(|slot| self.axis_slots[slot].is_default)
    }

    #[must_use]
    pub fn axis(&self, orientation: AxisOrientation) -> Option<&Axis> {
        self.axis_id(orientation).and_then(|id| self.axes.get(id))
    }

    pub fn axis_mut(&mut self, orientation: AxisOrientation) -> Option<&mut Axis> {
        self.axis_id(orientation)
            .and_then(|id| self.axes.get_mut(id))
    }

    #[must_use]
    pub fn axis_by_id(&self, id: AxisId) -> Option<&Axis> {
        self.axes.get(id)
    }

    pub fn axis_by_id_mut(&mut self, id: AxisId) -> Option<&mut Axis> {
        self.axes.get_mut(id)
    }

    fn retire_slot_axis(&mut self, slot: AxisSlot) {
        if slot.is_default {
            self.axes.remove(slot.id);
        } else if let Some(axis) = self.axes.get_mut(slot.id) {
            axis.detach();
        }
    }
}

fn slot_index(orientation: AxisOrientation) -> GraphResult<usize> {
    orientation.slot().ok_or_else(|| {
        GraphError::InvalidData("axes can only be bound to the X, Y or Z orientation".to_owned())
    })
}

pub(super) fn axis_type_change(orientation: AxisOrientation) -> ControllerChange {
    match orientation {
        AxisOrientation::Y => ControllerChange::AxisYType,
        AxisOrientation::Z => ControllerChange::AxisZType,
        AxisOrientation::X | AxisOrientation::None => ControllerChange::AxisXType,
    }
}
