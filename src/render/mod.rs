mod axis_cache;
mod custom_item_cache;
mod grid_rotations;
mod handles;
mod null_backend;
mod series_cache;
mod state;

pub use axis_cache::AxisRenderCache;
pub use custom_item_cache::CustomItemRenderCache;
pub use grid_rotations::GridLineRotations;
pub use handles::{MeshHandle, TextureHandle};
pub use null_backend::{MeshVariants, NullBackend, NullBackendStats};
pub use series_cache::{SeriesRenderCache, SeriesTextures};
pub use state::{RenderState, Selection, SelectionPosition};

use crate::core::{AxisChange, AxisOrientation, ChangeSet, Color, LinearGradient, MeshKind, ShadowQuality};
use crate::error::GraphResult;

/// Contract implemented by any rendering backend.
///
/// The sync pass hands the backend pre-computed positions and asks it for
/// opaque texture and mesh resources; drawing itself only happens in
/// `render`, which receives the fully synchronized `RenderState`. Resource
/// teardown must be a no-op when no context is current.
pub trait RendererBackend {
    /// Whether a rendering context is current. A sync pass is refused
    /// without one.
    fn has_context(&self) -> bool;

    fn generate_label_texture(&mut self, text: &str) -> TextureHandle;

    fn create_gradient_texture(&mut self, gradient: &LinearGradient) -> TextureHandle;

    fn create_solid_color_texture(&mut self, color: Color) -> TextureHandle;

    /// Loads an image file as a texture, used by custom items.
    fn load_texture_image(&mut self, image: &str) -> TextureHandle;

    fn load_mesh(&mut self, identifier: &str) -> MeshHandle;

    /// Rewrites a resolved mesh identifier before it is loaded. Graph types
    /// that need their own mesh variants override this.
    fn fix_mesh_identifier(&self, identifier: String, _mesh: MeshKind) -> String {
        identifier
    }

    fn delete_texture(&mut self, handle: TextureHandle);

    fn delete_mesh(&mut self, handle: MeshHandle);

    /// Applies a shadow level. Unsupported levels return
    /// `GraphError::ShadowQualityUnsupported` and the controller steps down.
    fn apply_shadow_quality(&mut self, _quality: ShadowQuality) -> GraphResult<()> {
        Ok(())
    }

    /// Axis update hook, called once per sync pass for each axis with changes.
    fn on_axis_changed(&mut self, _orientation: AxisOrientation, _changes: ChangeSet<AxisChange>) {}

    fn render(&mut self, state: &RenderState) -> GraphResult<()>;
}
