use glam::Quat;
use tracing::{debug, trace};

use crate::core::{
    ChangeKind, Color, ColorStyle, LinearGradient, MeshKind, Series, SeriesChange, SeriesKind,
    SurfaceDrawMode,
};
use crate::render::{MeshHandle, RendererBackend, TextureHandle};

/// Textures generated for the colors and gradients of one series.
///
/// Both the solid and the gradient texture of each slot are kept; the
/// backend picks one based on the color style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeriesTextures {
    pub base_color: Option<TextureHandle>,
    pub base_gradient: Option<TextureHandle>,
    pub single_highlight_color: Option<TextureHandle>,
    pub single_highlight_gradient: Option<TextureHandle>,
    pub multi_highlight_color: Option<TextureHandle>,
    pub multi_highlight_gradient: Option<TextureHandle>,
}

impl SeriesTextures {
    fn all(self) -> [Option<TextureHandle>; 6] {
        [
            self.base_color,
            self.base_gradient,
            self.single_highlight_color,
            self.single_highlight_gradient,
            self.multi_highlight_color,
            self.multi_highlight_gradient,
        ]
    }
}

/// Renderer-side snapshot of a series' visual attributes.
///
/// `populate` only copies attributes whose change bit is set on the live
/// series (or everything for a new cache), so derived resources survive
/// syncs that did not touch them.
#[derive(Debug)]
pub struct SeriesRenderCache {
    kind: SeriesKind,
    name: String,
    item_label_format: String,
    visible: bool,
    mesh: MeshKind,
    mesh_smooth: bool,
    user_defined_mesh: String,
    mesh_identifier: Option<String>,
    mesh_handle: Option<MeshHandle>,
    mesh_rotation: Quat,
    color_style: ColorStyle,
    base_color: Color,
    base_gradient: LinearGradient,
    single_highlight_color: Color,
    single_highlight_gradient: LinearGradient,
    multi_highlight_color: Color,
    multi_highlight_gradient: LinearGradient,
    textures: SeriesTextures,
    draw_mode: Option<SurfaceDrawMode>,
    flat_shading: Option<bool>,
    item_size: Option<f32>,
    visual_index: usize,
    valid: bool,
    data_dirty: bool,
}

impl SeriesRenderCache {
    #[must_use]
    pub fn new(kind: SeriesKind) -> Self {
        Self {
            kind,
            name: String::new(),
            item_label_format: String::new(),
            visible: true,
            mesh: MeshKind::default(),
            mesh_smooth: false,
            user_defined_mesh: String::new(),
            mesh_identifier: None,
            mesh_handle: None,
            mesh_rotation: Quat::IDENTITY,
            color_style: ColorStyle::default(),
            base_color: Color::default(),
            base_gradient: LinearGradient::default(),
            single_highlight_color: Color::default(),
            single_highlight_gradient: LinearGradient::default(),
            multi_highlight_color: Color::default(),
            multi_highlight_gradient: LinearGradient::default(),
            textures: SeriesTextures::default(),
            draw_mode: None,
            flat_shading: None,
            item_size: None,
            visual_index: 0,
            valid: true,
            data_dirty: true,
        }
    }

    /// Pulls changed attributes from `series`, clearing their change bits.
    pub fn populate<B: RendererBackend + ?Sized>(
        &mut self,
        series: &mut Series,
        newly_created: bool,
        backend: &mut B,
    ) {
        let mut mesh_changed = false;
        let mut refreshed = 0usize;
        for change in SeriesChange::ALL.iter().copied() {
            let flagged = series.take_change(change);
            if !flagged && !newly_created {
                continue;
            }
            refreshed += 1;
            match change {
                SeriesChange::Name => series.name().clone_into(&mut self.name),
                SeriesChange::ItemLabelFormat => {
                    series.item_label_format().clone_into(&mut self.item_label_format);
                }
                SeriesChange::Visibility => {
                    self.visible = series.is_visible();
                    self.data_dirty = true;
                }
                SeriesChange::Mesh => {
                    self.mesh = series.mesh();
                    mesh_changed = true;
                }
                SeriesChange::MeshSmooth => {
                    self.mesh_smooth = series.mesh_smooth();
                    mesh_changed = true;
                }
                SeriesChange::UserDefinedMesh => {
                    series.user_defined_mesh().clone_into(&mut self.user_defined_mesh);
                    mesh_changed = true;
                }
                SeriesChange::MeshRotation => self.mesh_rotation = series.mesh_rotation(),
                SeriesChange::ColorStyle => self.color_style = series.color_style(),
                SeriesChange::BaseColor => {
                    self.base_color = series.base_color();
                    let texture = backend.create_solid_color_texture(self.base_color);
                    replace_texture(&mut self.textures.base_color, texture, backend);
                }
                SeriesChange::BaseGradient => {
                    series.base_gradient().clone_into(&mut self.base_gradient);
                    let texture = backend.create_gradient_texture(&self.base_gradient);
                    replace_texture(&mut self.textures.base_gradient, texture, backend);
                }
                SeriesChange::SingleHighlightColor => {
                    self.single_highlight_color = series.single_highlight_color();
                    let texture = backend.create_solid_color_texture(self.single_highlight_color);
                    replace_texture(&mut self.textures.single_highlight_color, texture, backend);
                }
                SeriesChange::SingleHighlightGradient => {
                    series
                        .single_highlight_gradient()
                        .clone_into(&mut self.single_highlight_gradient);
                    let texture = backend.create_gradient_texture(&self.single_highlight_gradient);
                    replace_texture(
                        &mut self.textures.single_highlight_gradient,
                        texture,
                        backend,
                    );
                }
                SeriesChange::MultiHighlightColor => {
                    self.multi_highlight_color = series.multi_highlight_color();
                    let texture = backend.create_solid_color_texture(self.multi_highlight_color);
                    replace_texture(&mut self.textures.multi_highlight_color, texture, backend);
                }
                SeriesChange::MultiHighlightGradient => {
                    series
                        .multi_highlight_gradient()
                        .clone_into(&mut self.multi_highlight_gradient);
                    let texture = backend.create_gradient_texture(&self.multi_highlight_gradient);
                    replace_texture(
                        &mut self.textures.multi_highlight_gradient,
                        texture,
                        backend,
                    );
                }
                SeriesChange::Data => self.data_dirty = true,
                SeriesChange::DrawMode => self.draw_mode = series.draw_mode(),
                SeriesChange::FlatShading => self.flat_shading = series.flat_shading(),
                SeriesChange::ItemSize => self.item_size = series.item_size(),
            }
        }

        if mesh_changed {
            self.reload_mesh(backend);
        }
        if refreshed > 0 {
            trace!(
                series = %self.name,
                refreshed,
                newly_created,
                "series render cache populated"
            );
        }
    }

    fn reload_mesh<B: RendererBackend + ?Sized>(&mut self, backend: &mut B) {
        let identifier = resolve_mesh_identifier(self.mesh, self.mesh_smooth, &self.user_defined_mesh)
            .map(|identifier| backend.fix_mesh_identifier(identifier, self.mesh));
        if identifier == self.mesh_identifier && self.mesh_handle.is_some() {
            return;
        }
        if let Some(handle) = self.mesh_handle.take() {
            backend.delete_mesh(handle);
        }
        self.mesh_handle = identifier.as_deref().map(|identifier| backend.load_mesh(identifier));
        self.mesh_identifier = identifier;
    }

    /// Releases every texture and mesh. Handles are simply forgotten when
    /// the context is already gone.
    pub fn cleanup<B: RendererBackend + ?Sized>(&mut self, backend: &mut B) {
        let textures = std::mem::take(&mut self.textures);
        let mesh = self.mesh_handle.take();
        if !backend.has_context() {
            debug!(series = %self.name, "no context; dropping series resources");
            return;
        }
        for texture in textures.all().into_iter().flatten() {
            backend.delete_texture(texture);
        }
        if let Some(mesh) = mesh {
            backend.delete_mesh(mesh);
        }
    }

    #[must_use]
    pub fn kind(&self) -> SeriesKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn item_label_format(&self) -> &str {
        &self.item_label_format
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn mesh(&self) -> MeshKind {
        self.mesh
    }

    #[must_use]
    pub fn mesh_identifier(&self) -> Option<&str> {
        self.mesh_identifier.as_deref()
    }

    #[must_use]
    pub fn mesh_handle(&self) -> Option<MeshHandle> {
        self.mesh_handle
    }

    #[must_use]
    pub fn mesh_rotation(&self) -> Quat {
        self.mesh_rotation
    }

    #[must_use]
    pub fn color_style(&self) -> ColorStyle {
        self.color_style
    }

    #[must_use]
    pub fn base_color(&self) -> Color {
        self.base_color
    }

    #[must_use]
    pub fn base_gradient(&self) -> &LinearGradient {
        &self.base_gradient
    }

    #[must_use]
    pub fn single_highlight_color(&self) -> Color {
        self.single_highlight_color
    }

    #[must_use]
    pub fn multi_highlight_color(&self) -> Color {
        self.multi_highlight_color
    }

    #[must_use]
    pub fn textures(&self) -> SeriesTextures {
        self.textures
    }

    #[must_use]
    pub fn draw_mode(&self) -> Option<SurfaceDrawMode> {
        self.draw_mode
    }

    #[must_use]
    pub fn flat_shading(&self) -> Option<bool> {
        self.flat_shading
    }

    #[must_use]
    pub fn item_size(&self) -> Option<f32> {
        self.item_size
    }

    /// Position of the series in the controller's series list.
    #[must_use]
    pub fn visual_index(&self) -> usize {
        self.visual_index
    }

    pub fn set_visual_index(&mut self, index: usize) {
        self.visual_index = index;
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn set_valid(&mut self, valid: bool) {
        self.valid = valid;
    }

    /// Whether the renderer must rebuild this series' geometry.
    #[must_use]
    pub fn data_dirty(&self) -> bool {
        self.data_dirty
    }

    pub fn set_data_dirty(&mut self, dirty: bool) {
        self.data_dirty = dirty;
    }
}

fn replace_texture<B: RendererBackend + ?Sized>(
    slot: &mut Option<TextureHandle>,
    texture: TextureHandle,
    backend: &mut B,
) {
    if let Some(previous) = slot.replace(texture) {
        backend.delete_texture(previous);
    }
}

/// Maps a mesh kind to the identifier of its mesh resource. Smooth variants
/// get a `Smooth` suffix; user-defined meshes use the series' identifier.
fn resolve_mesh_identifier(mesh: MeshKind, smooth: bool, user_defined: &str) -> Option<String> {
    match mesh.base_identifier() {
        Some(base) if smooth && mesh.supports_smooth() => Some(format!("{base}Smooth")),
        Some(base) => Some(base.to_owned()),
        None if user_defined.is_empty() => None,
        None => Some(user_defined.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::{SeriesRenderCache, resolve_mesh_identifier};
    use crate::core::{
        BarDataProxy, Color, MeshKind, ScatterDataProxy, Series, SeriesChange, SeriesKind,
    };
    use crate::render::{NullBackend, RendererBackend};

    #[test]
    fn mesh_identifiers_resolve_smooth_and_user_meshes() {
        assert_eq!(
            resolve_mesh_identifier(MeshKind::Pyramid, true, "").as_deref(),
            Some("pyramidSmooth")
        );
        assert_eq!(
            resolve_mesh_identifier(MeshKind::Point, true, "").as_deref(),
            Some("point")
        );
        assert_eq!(
            resolve_mesh_identifier(MeshKind::UserDefined, false, "teapot.obj").as_deref(),
            Some("teapot.obj")
        );
        assert_eq!(resolve_mesh_identifier(MeshKind::UserDefined, false, ""), None);
    }

    #[test]
    fn new_cache_pulls_everything_and_clears_bits() {
        let mut backend = NullBackend::new();
        let mut series = Series::bar(BarDataProxy::new());
        series.set_name("sales");
        let mut cache = SeriesRenderCache::new(SeriesKind::Bar);
        cache.populate(&mut series, true, &mut backend);

        assert_eq!(cache.name(), "sales");
        assert_eq!(cache.mesh_identifier(), Some("bevelbar"));
        assert!(cache.textures().all().iter().all(Option::is_some));
        assert!(!series.has_pending_changes());
        assert_eq!(backend.stats().meshes_loaded, 1);
    }

    #[test]
    fn only_flagged_attributes_regenerate_resources() {
        let mut backend = NullBackend::new();
        let mut series = Series::scatter(ScatterDataProxy::new());
        let mut cache = SeriesRenderCache::new(SeriesKind::Scatter);
        cache.populate(&mut series, true, &mut backend);
        let before = backend.stats();
        let gradient_texture = cache.textures().base_gradient;

        series.set_base_color(Color::rgb(0.2, 0.4, 0.6));
        cache.populate(&mut series, false, &mut backend);

        let after = backend.stats();
        assert_eq!(after.solid_textures_created, before.solid_textures_created + 1);
        assert_eq!(after.gradient_textures_created, before.gradient_textures_created);
        assert_eq!(after.meshes_loaded, before.meshes_loaded);
        assert_eq!(cache.textures().base_gradient, gradient_texture);
        assert_eq!(cache.base_color(), Color::rgb(0.2, 0.4, 0.6));
    }

    #[test]
    fn smooth_toggle_reloads_mesh() {
        let mut backend = NullBackend::new();
        let mut series = Series::scatter(ScatterDataProxy::new());
        let mut cache = SeriesRenderCache::new(SeriesKind::Scatter);
        cache.populate(&mut series, true, &mut backend);
        series.set_mesh_smooth(true);
        cache.populate(&mut series, false, &mut backend);
        assert_eq!(cache.mesh_identifier(), Some("sphereSmooth"));
        assert_eq!(backend.live_mesh_count(), 1);
        assert!(!series.changes().contains(SeriesChange::MeshSmooth));
    }

    #[test]
    fn cleanup_with_a_context_releases_every_resource() {
        let mut backend = NullBackend::new();
        let mut series = Series::scatter(ScatterDataProxy::new());
        let mut cache = SeriesRenderCache::new(SeriesKind::Scatter);
        cache.populate(&mut series, true, &mut backend);
        assert_eq!(backend.live_texture_count(), 6);
        assert_eq!(backend.live_mesh_count(), 1);

        cache.cleanup(&mut backend);
        assert_eq!(backend.stats().textures_deleted, 6);
        assert_eq!(backend.stats().meshes_deleted, 1);
        assert_eq!(backend.live_texture_count(), 0);
        assert_eq!(backend.live_mesh_count(), 0);
        assert!(cache.mesh_handle().is_none());

        cache.cleanup(&mut backend);
        assert_eq!(backend.stats().textures_deleted, 6);
    }

    #[test]
    fn cleanup_without_a_context_deletes_nothing() {
        let mut backend = NullBackend::new();
        let mut series = Series::scatter(ScatterDataProxy::new());
        let mut cache = SeriesRenderCache::new(SeriesKind::Scatter);
        cache.populate(&mut series, true, &mut backend);

        backend.set_context_available(false);
        cache.cleanup(&mut backend);
        assert_eq!(backend.stats().textures_deleted, 0);
        assert_eq!(backend.stats().meshes_deleted, 0);
        assert!(cache.mesh_handle().is_none());
    }
}
