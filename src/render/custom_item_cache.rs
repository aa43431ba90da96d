use glam::{Quat, Vec3};
use tracing::trace;

use crate::core::{ChangeKind, CustomItem, CustomItemChange};
use crate::render::{MeshHandle, RendererBackend, TextureHandle};

/// Renderer-side mirror of one custom item.
#[derive(Debug)]
pub struct CustomItemRenderCache {
    mesh_identifier: String,
    mesh_handle: Option<MeshHandle>,
    texture_image: Option<String>,
    texture: Option<TextureHandle>,
    position: Vec3,
    scaling: Vec3,
    rotation: Quat,
    visible: bool,
    shadow_casting: bool,
    index: usize,
    valid: bool,
}

impl Default for CustomItemRenderCache {
    fn default() -> Self {
        Self::new()
    }
}

impl CustomItemRenderCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            mesh_identifier: String::new(),
            mesh_handle: None,
            texture_image: None,
            texture: None,
            position: Vec3::ZERO,
            scaling: Vec3::ONE,
            rotation: Quat::IDENTITY,
            visible: true,
            shadow_casting: true,
            index: 0,
            valid: true,
        }
    }

    /// Pulls flagged attributes from `item`, clearing their change bits.
    pub fn populate<B: RendererBackend + ?Sized>(
        &mut self,
        item: &mut CustomItem,
        newly_created: bool,
        backend: &mut B,
    ) {
        for change in CustomItemChange::ALL.iter().copied() {
            if !item.take_change(change) && !newly_created {
                continue;
            }
            match change {
                CustomItemChange::Mesh => {
                    item.mesh_identifier().clone_into(&mut self.mesh_identifier);
                    if let Some(handle) = self.mesh_handle.take() {
                        backend.delete_mesh(handle);
                    }
                    if !self.mesh_identifier.is_empty() {
                        self.mesh_handle = Some(backend.load_mesh(&self.mesh_identifier));
                    }
                }
                CustomItemChange::TextureImage => {
                    self.texture_image = item.texture_image().map(str::to_owned);
                    if let Some(texture) = self.texture.take() {
                        backend.delete_texture(texture);
                    }
                    self.texture = self
                        .texture_image
                        .as_deref()
                        .map(|image| backend.load_texture_image(image));
                }
                CustomItemChange::Position => self.position = item.position(),
                CustomItemChange::Scaling => self.scaling = item.scaling(),
                CustomItemChange::Rotation => self.rotation = item.rotation(),
                CustomItemChange::Visibility => self.visible = item.is_visible(),
                CustomItemChange::ShadowCasting => self.shadow_casting = item.is_shadow_casting(),
            }
        }
        trace!(index = self.index, newly_created, "custom item cache populated");
    }

    /// Releases the mesh and texture, if a context is still current.
    pub fn cleanup<B: RendererBackend + ?Sized>(&mut self, backend: &mut B) {
        let mesh = self.mesh_handle.take();
        let texture = self.texture.take();
        if !backend.has_context() {
            return;
        }
        if let Some(mesh) = mesh {
            backend.delete_mesh(mesh);
        }
        if let Some(texture) = texture {
            backend.delete_texture(texture);
        }
    }

    #[must_use]
    pub fn mesh_identifier(&self) -> &str {
        &self.mesh_identifier
    }

    #[must_use]
    pub fn mesh_handle(&self) -> Option<MeshHandle> {
        self.mesh_handle
    }

    #[must_use]
    pub fn texture(&self) -> Option<TextureHandle> {
        self.texture
    }

    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    #[must_use]
    pub fn scaling(&self) -> Vec3 {
        self.scaling
    }

    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn is_shadow_casting(&self) -> bool {
        self.shadow_casting
    }

    /// Position of the item in the controller's item list; used for picking.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn set_index(&mut self, index: usize) {
        self.index = index;
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::CustomItemRenderCache;
    use crate::core::CustomItem;
    use crate::render::NullBackend;

    #[test]
    fn texture_is_loaded_from_the_item_image() {
        let mut backend = NullBackend::new();
        let mut item = CustomItem::new("oilrig").with_texture_image("rust.png");
        let mut cache = CustomItemRenderCache::new();
        cache.populate(&mut item, true, &mut backend);
        assert!(cache.texture().is_some());
        assert!(cache.mesh_handle().is_some());
        assert_eq!(backend.stats().image_textures_loaded, 1);
    }

    #[test]
    fn unflagged_attributes_are_left_alone() {
        let mut backend = NullBackend::new();
        let mut item = CustomItem::new("marker");
        let mut cache = CustomItemRenderCache::new();
        cache.populate(&mut item, true, &mut backend);
        item.set_position(Vec3::new(0.5, 0.5, 0.5));
        cache.populate(&mut item, false, &mut backend);
        assert_eq!(cache.position(), Vec3::new(0.5, 0.5, 0.5));
        assert_eq!(backend.stats().meshes_loaded, 1);
        assert!(!item.has_pending_changes());
    }
}
