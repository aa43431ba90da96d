use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::change_flags::{ChangeSet, CustomItemChange};

/// A free-standing mesh placed in the scene next to the data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomItem {
    mesh_identifier: String,
    texture_image: Option<String>,
    position: Vec3,
    scaling: Vec3,
    rotation: Quat,
    visible: bool,
    shadow_casting: bool,
    #[serde(skip, default = "ChangeSet::all")]
    changes: ChangeSet<CustomItemChange>,
}

impl Default for CustomItem {
    fn default() -> Self {
        Self::new("")
    }
}

impl CustomItem {
    #[must_use]
    pub fn new(mesh_identifier: impl Into<String>) -> Self {
        Self {
            mesh_identifier: mesh_identifier.into(),
            texture_image: None,
            position: Vec3::ZERO,
            scaling: Vec3::splat(0.1),
            rotation: Quat::IDENTITY,
            visible: true,
            shadow_casting: true,
            changes: ChangeSet::all(),
        }
    }

    #[must_use]
    pub fn with_position(mut self, position: Vec3) -> Self {
        self.set_position(position);
        self
    }

    #[must_use]
    pub fn with_texture_image(mut self, image: impl Into<String>) -> Self {
        self.set_texture_image(Some(image.into()));
        self
    }

    #[must_use]
    pub fn mesh_identifier(&self) -> &str {
        &self.mesh_identifier
    }

    pub fn set_mesh_identifier(&mut self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        if self.mesh_identifier != identifier {
            self.mesh_identifier = identifier;
            self.changes.insert(CustomItemChange::Mesh);
        }
    }

    #[must_use]
    pub fn texture_image(&self) -> Option<&str> {
        self.texture_image.as_deref()
    }

    pub fn set_texture_image(&mut self, image: Option<String>) {
        if self.texture_image != image {
            self.texture_image = image;
            self.changes.insert(CustomItemChange::TextureImage);
        }
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec3) {
        if !position.is_finite() {
            warn!(?position, "ignoring non-finite custom item position");
            return;
        }
        if self.position != position {
            self.position = position;
            self.changes.insert(CustomItemChange::Position);
        }
    }

    #[must_use]
    pub fn scaling(&self) -> Vec3 {
        self.scaling
    }

    pub fn set_scaling(&mut self, scaling: Vec3) {
        if !scaling.is_finite() {
            warn!(?scaling, "ignoring non-finite custom item scaling");
            return;
        }
        if self.scaling != scaling {
            self.scaling = scaling;
            self.changes.insert(CustomItemChange::Scaling);
        }
    }

    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        if !rotation.is_finite() {
            warn!("ignoring non-finite custom item rotation");
            return;
        }
        if self.rotation != rotation {
            self.rotation = rotation;
            self.changes.insert(CustomItemChange::Rotation);
        }
    }

    /// Rotation from an axis and an angle in degrees.
    pub fn set_rotation_axis_and_angle(&mut self, axis: Vec3, degrees: f32) {
        let axis = axis.normalize_or_zero();
        if axis == Vec3::ZERO {
            warn!("custom item rotation axis must be non-zero; ignoring");
            return;
        }
        self.set_rotation(Quat::from_axis_angle(axis, degrees.to_radians()));
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.changes.insert(CustomItemChange::Visibility);
        }
    }

    #[must_use]
    pub fn is_shadow_casting(&self) -> bool {
        self.shadow_casting
    }

    pub fn set_shadow_casting(&mut self, enabled: bool) {
        if self.shadow_casting != enabled {
            self.shadow_casting = enabled;
            self.changes.insert(CustomItemChange::ShadowCasting);
        }
    }

    #[must_use]
    pub fn changes(&self) -> ChangeSet<CustomItemChange> {
        self.changes
    }

    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_none()
    }

    pub(crate) fn take_change(&mut self, change: CustomItemChange) -> bool {
        self.changes.take(change)
    }

    /// Flags everything for a fresh render cache, e.g. after re-attaching.
    pub(crate) fn mark_all_changed(&mut self) {
        self.changes = ChangeSet::all();
    }
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::CustomItem;
    use crate::core::change_flags::CustomItemChange;

    #[test]
    fn setters_flag_only_real_changes() {
        let mut item = CustomItem::new("meshes/arrow.obj");
        for change in [CustomItemChange::Mesh, CustomItemChange::Position] {
            assert!(item.take_change(change));
        }
        item.set_position(Vec3::ZERO);
        assert!(!item.changes().contains(CustomItemChange::Position));
        item.set_position(Vec3::new(1.0, 2.0, 3.0));
        assert!(item.changes().contains(CustomItemChange::Position));
    }

    #[test]
    fn non_finite_transforms_are_ignored() {
        let mut item = CustomItem::default();
        item.set_scaling(Vec3::splat(f32::NAN));
        assert_eq!(item.scaling(), Vec3::splat(0.1));
        item.set_rotation_axis_and_angle(Vec3::ZERO, 45.0);
        assert_eq!(item.rotation(), Quat::IDENTITY);
    }

    #[test]
    fn deserialized_items_start_fully_dirty() {
        let item = CustomItem::new("cube").with_texture_image("wood.png");
        let json = serde_json::to_string(&item).expect("serialize item");
        let restored: CustomItem = serde_json::from_str(&json).expect("deserialize item");
        assert_eq!(restored.texture_image(), Some("wood.png"));
        assert!(restored.changes().contains(CustomItemChange::ShadowCasting));
    }
}
