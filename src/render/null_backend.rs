use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::core::{Color, LinearGradient, MeshKind, ShadowQuality};
use crate::error::{GraphError, GraphResult};
use crate::render::{MeshHandle, RenderState, RendererBackend, TextureHandle};

/// How [`NullBackend`] rewrites mesh identifiers before loading them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MeshVariants {
    /// Identifiers are loaded as resolved.
    #[default]
    Plain,
    /// Bar graphs use closed ("Full") meshes when the background is hidden.
    Bars { background_enabled: bool },
    /// Scatter graphs use closed meshes for everything but point-like items.
    Scatter,
}

/// Counters exposed by the headless backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NullBackendStats {
    pub label_textures_generated: u64,
    pub gradient_textures_created: u64,
    pub solid_textures_created: u64,
    pub image_textures_loaded: u64,
    pub meshes_loaded: u64,
    pub textures_deleted: u64,
    pub meshes_deleted: u64,
    pub renders: u64,
    pub last_series_count: usize,
    pub last_custom_item_count: usize,
    pub last_grid_position_count: usize,
}

/// No-op backend used by tests and headless controller usage.
///
/// It hands out unique handles, tracks which ones are still alive and can
/// simulate a lost context or limited shadow support.
#[derive(Debug)]
pub struct NullBackend {
    next_handle: u64,
    context_available: bool,
    max_shadow_quality: ShadowQuality,
    applied_shadow_quality: Option<ShadowQuality>,
    mesh_variants: MeshVariants,
    live_textures: HashSet<TextureHandle>,
    live_meshes: HashSet<MeshHandle>,
    loaded_mesh_identifiers: Vec<String>,
    stats: NullBackendStats,
}

impl Default for NullBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NullBackend {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            context_available: true,
            max_shadow_quality: ShadowQuality::SoftHigh,
            applied_shadow_quality: None,
            mesh_variants: MeshVariants::Plain,
            live_textures: HashSet::new(),
            live_meshes: HashSet::new(),
            loaded_mesh_identifiers: Vec::new(),
            stats: NullBackendStats::default(),
        }
    }

    /// Highest shadow level this backend accepts.
    #[must_use]
    pub fn with_max_shadow_quality(mut self, quality: ShadowQuality) -> Self {
        self.max_shadow_quality = quality;
        self
    }

    #[must_use]
    pub fn with_mesh_variants(mut self, variants: MeshVariants) -> Self {
        self.mesh_variants = variants;
        self
    }

    pub fn set_context_available(&mut self, available: bool) {
        self.context_available = available;
    }

    #[must_use]
    pub fn stats(&self) -> NullBackendStats {
        self.stats
    }

    #[must_use]
    pub fn applied_shadow_quality(&self) -> Option<ShadowQuality> {
        self.applied_shadow_quality
    }

    #[must_use]
    pub fn live_texture_count(&self) -> usize {
        self.live_textures.len()
    }

    #[must_use]
    pub fn live_mesh_count(&self) -> usize {
        self.live_meshes.len()
    }

    #[must_use]
    pub fn is_texture_live(&self, handle: TextureHandle) -> bool {
        self.live_textures.contains(&handle)
    }

    #[must_use]
    pub fn loaded_mesh_identifiers(&self) -> &[String] {
        &self.loaded_mesh_identifiers
    }

    fn issue_texture(&mut self) -> TextureHandle {
        let handle = TextureHandle::new(self.next_handle);
        self.next_handle += 1;
        self.live_textures.insert(handle);
        handle
    }
}

impl RendererBackend for NullBackend {
    fn has_context(&self) -> bool {
        self.context_available
    }

    fn generate_label_texture(&mut self, text: &str) -> TextureHandle {
        self.stats.label_textures_generated += 1;
        trace!(text, "label texture generated");
        self.issue_texture()
    }

    fn create_gradient_texture(&mut self, _gradient: &LinearGradient) -> TextureHandle {
        self.stats.gradient_textures_created += 1;
        self.issue_texture()
    }

    fn create_solid_color_texture(&mut self, _color: Color) -> TextureHandle {
        self.stats.solid_textures_created += 1;
        self.issue_texture()
    }

    fn load_texture_image(&mut self, image: &str) -> TextureHandle {
        self.stats.image_textures_loaded += 1;
        trace!(image, "image texture loaded");
        self.issue_texture()
    }

    fn load_mesh(&mut self, identifier: &str) -> MeshHandle {
        self.stats.meshes_loaded += 1;
        self.loaded_mesh_identifiers.push(identifier.to_owned());
        let handle = MeshHandle::new(self.next_handle);
        self.next_handle += 1;
        self.live_meshes.insert(handle);
        handle
    }

    fn fix_mesh_identifier(&self, mut identifier: String, mesh: MeshKind) -> String {
        let closed = match self.mesh_variants {
            MeshVariants::Plain => false,
            MeshVariants::Bars { background_enabled } => {
                !background_enabled && mesh != MeshKind::Sphere
            }
            MeshVariants::Scatter => !matches!(
                mesh,
                MeshKind::Sphere | MeshKind::Arrow | MeshKind::Minimal | MeshKind::Point
            ),
        };
        if closed {
            identifier.push_str("Full");
        }
        identifier
    }

    fn delete_texture(&mut self, handle: TextureHandle) {
        if self.live_textures.remove(&handle) {
            self.stats.textures_deleted += 1;
        }
    }

    fn delete_mesh(&mut self, handle: MeshHandle) {
        if self.live_meshes.remove(&handle) {
            self.stats.meshes_deleted += 1;
        }
    }

    fn apply_shadow_quality(&mut self, quality: ShadowQuality) -> GraphResult<()> {
        if quality > self.max_shadow_quality {
            return Err(GraphError::ShadowQualityUnsupported(quality));
        }
        self.applied_shadow_quality = Some(quality);
        Ok(())
    }

    fn render(&mut self, state: &RenderState) -> GraphResult<()> {
        if !self.context_available {
            return Err(GraphError::ContextUnavailable);
        }
        self.stats.renders += 1;
        self.stats.last_series_count = state.series().len();
        self.stats.last_custom_item_count = state.custom_items().len();
        self.stats.last_grid_position_count = state
            .axes()
            .iter()
            .map(|axis| axis.grid_positions().len())
            .sum();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{MeshVariants, NullBackend};
    use crate::core::{Color, MeshKind, ShadowQuality};
    use crate::error::GraphError;
    use crate::render::RendererBackend;

    #[test]
    fn deleted_handles_are_no_longer_live() {
        let mut backend = NullBackend::new();
        let texture = backend.create_solid_color_texture(Color::WHITE);
        assert!(backend.is_texture_live(texture));
        backend.delete_texture(texture);
        backend.delete_texture(texture);
        assert!(!backend.is_texture_live(texture));
        assert_eq!(backend.stats().textures_deleted, 1);
    }

    #[test]
    fn shadow_levels_above_the_limit_are_refused() {
        let mut backend = NullBackend::new().with_max_shadow_quality(ShadowQuality::Low);
        assert_eq!(
            backend.apply_shadow_quality(ShadowQuality::High),
            Err(GraphError::ShadowQualityUnsupported(ShadowQuality::High))
        );
        assert!(backend.apply_shadow_quality(ShadowQuality::Low).is_ok());
        assert_eq!(backend.applied_shadow_quality(), Some(ShadowQuality::Low));
    }

    #[test]
    fn scatter_variants_close_solid_meshes() {
        let backend = NullBackend::new().with_mesh_variants(MeshVariants::Scatter);
        assert_eq!(
            backend.fix_mesh_identifier("cube".to_owned(), MeshKind::Cube),
            "cubeFull"
        );
        assert_eq!(
            backend.fix_mesh_identifier("sphere".to_owned(), MeshKind::Sphere),
            "sphere"
        );
    }
}
