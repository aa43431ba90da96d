use glam::Quat;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::change_flags::{ChangeKind, ChangeSet, SeriesChange, ThemeAttribute};
use crate::core::data_proxy::{BarDataProxy, ScatterDataProxy, SurfaceDataProxy};
use crate::core::theme::Theme;
use crate::core::types::{Color, ColorStyle, LinearGradient, MeshKind, SurfaceDrawMode};
use crate::error::{GraphError, GraphResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesKind {
    Bar,
    Scatter,
    Surface,
}

/// Data owned by a series, one proxy type per series kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesData {
    Bar(BarDataProxy),
    Scatter(ScatterDataProxy),
    Surface(SurfaceDataProxy),
}

impl SeriesData {
    #[must_use]
    pub fn kind(&self) -> SeriesKind {
        match self {
            Self::Bar(_) => SeriesKind::Bar,
            Self::Scatter(_) => SeriesKind::Scatter,
            Self::Surface(_) => SeriesKind::Surface,
        }
    }
}

/// A data series with its visual attributes.
///
/// Attributes set explicitly override the theme until the series is reset
/// to the theme with `force`.
#[derive(Debug, Clone)]
pub struct Series {
    name: String,
    item_label_format: String,
    visible: bool,
    mesh: MeshKind,
    mesh_smooth: bool,
    user_defined_mesh: String,
    mesh_rotation: Quat,
    color_style: ColorStyle,
    base_color: Color,
    base_gradient: LinearGradient,
    single_highlight_color: Color,
    single_highlight_gradient: LinearGradient,
    multi_highlight_color: Color,
    multi_highlight_gradient: LinearGradient,
    draw_mode: SurfaceDrawMode,
    flat_shading: bool,
    item_size: f32,
    data: SeriesData,
    changes: ChangeSet<SeriesChange>,
    overrides: ChangeSet<ThemeAttribute>,
}

impl Series {
    fn with_data(data: SeriesData, mesh: MeshKind, item_label_format: &str) -> Self {
        Self {
            name: String::new(),
            item_label_format: item_label_format.to_owned(),
            visible: true,
            mesh,
            mesh_smooth: false,
            user_defined_mesh: String::new(),
            mesh_rotation: Quat::IDENTITY,
            color_style: ColorStyle::Uniform,
            base_color: Color::BLACK,
            base_gradient: LinearGradient::default(),
            single_highlight_color: Color::BLACK,
            single_highlight_gradient: LinearGradient::default(),
            multi_highlight_color: Color::BLACK,
            multi_highlight_gradient: LinearGradient::default(),
            draw_mode: SurfaceDrawMode::default(),
            flat_shading: false,
            item_size: 0.0,
            data,
            changes: ChangeSet::all(),
            overrides: ChangeSet::none(),
        }
    }

    #[must_use]
    pub fn bar(proxy: BarDataProxy) -> Self {
        Self::with_data(SeriesData::Bar(proxy), MeshKind::BevelBar, "@valueLabel")
    }

    #[must_use]
    pub fn scatter(proxy: ScatterDataProxy) -> Self {
        Self::with_data(
            SeriesData::Scatter(proxy),
            MeshKind::Sphere,
            "@xLabel, @yLabel, @zLabel",
        )
    }

    #[must_use]
    pub fn surface(proxy: SurfaceDataProxy) -> Self {
        Self::with_data(
            SeriesData::Surface(proxy),
            MeshKind::Sphere,
            "@xLabel, @yLabel, @zLabel",
        )
    }

    #[must_use]
    pub fn kind(&self) -> SeriesKind {
        self.data.kind()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.name != name {
            self.name = name;
            self.changes.insert(SeriesChange::Name);
        }
    }

    #[must_use]
    pub fn item_label_format(&self) -> &str {
        &self.item_label_format
    }

    pub fn set_item_label_format(&mut self, format: impl Into<String>) {
        let format = format.into();
        if self.item_label_format != format {
            self.item_label_format = format;
            self.changes.insert(SeriesChange::ItemLabelFormat);
        }
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        if self.visible != visible {
            self.visible = visible;
            self.changes.insert(SeriesChange::Visibility);
        }
    }

    #[must_use]
    pub fn mesh(&self) -> MeshKind {
        self.mesh
    }

    pub fn set_mesh(&mut self, mesh: MeshKind) {
        let bar_incompatible = matches!(mesh, MeshKind::Point | MeshKind::Minimal | MeshKind::Arrow);
        if self.kind() == SeriesKind::Bar && bar_incompatible {
            warn!(?mesh, "mesh not supported by bar series; ignoring");
            return;
        }
        if self.mesh != mesh {
            self.mesh = mesh;
            self.changes.insert(SeriesChange::Mesh);
        }
    }

    #[must_use]
    pub fn mesh_smooth(&self) -> bool {
        self.mesh_smooth
    }

    pub fn set_mesh_smooth(&mut self, smooth: bool) {
        if self.mesh_smooth != smooth {
            self.mesh_smooth = smooth;
            self.changes.insert(SeriesChange::MeshSmooth);
        }
    }

    #[must_use]
    pub fn user_defined_mesh(&self) -> &str {
        &self.user_defined_mesh
    }

    pub fn set_user_defined_mesh(&mut self, identifier: impl Into<String>) {
        let identifier = identifier.into();
        if self.user_defined_mesh != identifier {
            self.user_defined_mesh = identifier;
            self.changes.insert(SeriesChange::UserDefinedMesh);
        }
    }

    #[must_use]
    pub fn mesh_rotation(&self) -> Quat {
        self.mesh_rotation
    }

    pub fn set_mesh_rotation(&mut self, rotation: Quat) {
        if !rotation.is_finite() {
            warn!("ignoring non-finite mesh rotation");
            return;
        }
        if self.mesh_rotation != rotation {
            self.mesh_rotation = rotation;
            self.changes.insert(SeriesChange::MeshRotation);
        }
    }

    /// Sets the mesh rotation from an axis and an angle in degrees.
    pub fn set_mesh_axis_and_angle(&mut self, axis: glam::Vec3, degrees: f32) {
        let axis = axis.normalize_or_zero();
        if axis == glam::Vec3::ZERO {
            warn!("mesh rotation axis must be non-zero; ignoring");
            return;
        }
        self.set_mesh_rotation(Quat::from_axis_angle(axis, degrees.to_radians()));
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
    pub fn single_highlight_gradient(&self) -> &LinearGradient {
        &self.single_highlight_gradient
    }

    #[must_use]
    pub fn multi_highlight_color(&self) -> Color {
        self.multi_highlight_color
    }

    #[must_use]
    pub fn multi_highlight_gradient(&self) -> &LinearGradient {
        &self.multi_highlight_gradient
    }

    pub fn set_color_style(&mut self, style: ColorStyle) {
        self.overrides.insert(ThemeAttribute::ColorStyle);
        self.store_color_style(style);
    }

    pub fn set_base_color(&mut self, color: Color) {
        self.overrides.insert(ThemeAttribute::BaseColor);
        self.store_color(ThemeAttribute::BaseColor, color);
    }

    pub fn set_base_gradient(&mut self, gradient: LinearGradient) {
        self.overrides.insert(ThemeAttribute::BaseGradient);
        self.store_gradient(ThemeAttribute::BaseGradient, gradient);
    }

    pub fn set_single_highlight_color(&mut self, color: Color) {
        self.overrides.insert(ThemeAttribute::SingleHighlightColor);
        self.store_color(ThemeAttribute::SingleHighlightColor, color);
    }

    pub fn set_single_highlight_gradient(&mut self, gradient: LinearGradient) {
        self.overrides.insert(ThemeAttribute::SingleHighlightGradient);
        self.store_gradient(ThemeAttribute::SingleHighlightGradient, gradient);
    }

    pub fn set_multi_highlight_color(&mut self, color: Color) {
        self.overrides.insert(ThemeAttribute::MultiHighlightColor);
        self.store_color(ThemeAttribute::MultiHighlightColor, color);
    }

    pub fn set_multi_highlight_gradient(&mut self, gradient: LinearGradient) {
        self.overrides.insert(ThemeAttribute::MultiHighlightGradient);
        self.store_gradient(ThemeAttribute::MultiHighlightGradient, gradient);
    }

    /// Whether `attribute` was set explicitly and is exempt from theme updates.
    #[must_use]
    pub fn overrides_theme(&self, attribute: ThemeAttribute) -> bool {
        self.overrides.contains(attribute)
    }

    fn store_color_style(&mut self, style: ColorStyle) {
        if self.color_style != style {
            self.color_style = style;
            self.changes.insert(SeriesChange::ColorStyle);
        }
    }

    fn store_color(&mut self, attribute: ThemeAttribute, color: Color) {
        let slot = match attribute {
            ThemeAttribute::BaseColor => &mut self.base_color,
            ThemeAttribute::SingleHighlightColor => &mut self.single_highlight_color,
            ThemeAttribute::MultiHighlightColor => &mut self.multi_highlight_color,
            _ => return,
        };
        if *slot != color {
            *slot = color;
            self.changes.insert(attribute.series_change());
        }
    }

    fn store_gradient(&mut self, attribute: ThemeAttribute, gradient: LinearGradient) {
        let slot = match attribute {
            ThemeAttribute::BaseGradient => &mut self.base_gradient,
            ThemeAttribute::SingleHighlightGradient => &mut self.single_highlight_gradient,
            ThemeAttribute::MultiHighlightGradient => &mut self.multi_highlight_gradient,
            _ => return,
        };
        if *slot != gradient {
            *slot = gradient;
            self.changes.insert(attribute.series_change());
        }
    }

    /// Copies one theme-driven attribute from `theme` unless the series
    /// overrides it.
    pub(crate) fn apply_theme_attribute(
        &mut self,
        theme: &Theme,
        series_index: usize,
        attribute: ThemeAttribute,
    ) {
        if self.overrides.contains(attribute) {
            return;
        }
        match attribute {
            ThemeAttribute::ColorStyle => self.store_color_style(theme.color_style()),
            ThemeAttribute::BaseColor => {
                self.store_color(attribute, theme.base_color_at(series_index));
            }
            ThemeAttribute::BaseGradient => {
                self.store_gradient(attribute, theme.base_gradient_at(series_index));
            }
            ThemeAttribute::SingleHighlightColor => {
                self.store_color(attribute, theme.single_highlight_color());
            }
            ThemeAttribute::SingleHighlightGradient => {
                self.store_gradient(attribute, theme.single_highlight_gradient().clone());
            }
            ThemeAttribute::MultiHighlightColor => {
                self.store_color(attribute, theme.multi_highlight_color());
            }
            ThemeAttribute::MultiHighlightGradient => {
                self.store_gradient(attribute, theme.multi_highlight_gradient().clone());
            }
        }
    }

    /// Re-applies theme values. With `force`, explicit overrides are
    /// discarded first.
    pub fn reset_to_theme(&mut self, theme: &Theme, series_index: usize, force: bool) {
        for attribute in ThemeAttribute::ALL.iter().copied() {
            if force {
                self.overrides.remove(attribute);
            }
            self.apply_theme_attribute(theme, series_index, attribute);
        }
    }

    #[must_use]
    pub fn draw_mode(&self) -> Option<SurfaceDrawMode> {
        (self.kind() == SeriesKind::Surface).then_some(self.draw_mode)
    }

    pub fn set_draw_mode(&mut self, mode: SurfaceDrawMode) {
        if self.kind() != SeriesKind::Surface {
            warn!("draw mode only applies to surface series; ignoring");
            return;
        }
        if self.draw_mode != mode {
            self.draw_mode = mode;
            self.changes.insert(SeriesChange::DrawMode);
        }
    }

    #[must_use]
    pub fn flat_shading(&self) -> Option<bool> {
        (self.kind() == SeriesKind::Surface).then_some(self.flat_shading)
    }

    pub fn set_flat_shading(&mut self, enabled: bool) {
        if self.kind() != SeriesKind::Surface {
            warn!("flat shading only applies to surface series; ignoring");
            return;
        }
        if self.flat_shading != enabled {
            self.flat_shading = enabled;
            self.changes.insert(SeriesChange::FlatShading);
        }
    }

    /// Scatter item size; `0.0` lets the renderer pick a size from the item count.
    #[must_use]
    pub fn item_size(&self) -> Option<f32> {
        (self.kind() == SeriesKind::Scatter).then_some(self.item_size)
    }

    pub fn set_item_size(&mut self, size: f32) {
        if self.kind() != SeriesKind::Scatter {
            warn!("item size only applies to scatter series; ignoring");
            return;
        }
        let clamped = if size.is_finite() {
            size.clamp(0.0, 1.0)
        } else {
            0.0
        };
        if clamped != size {
            warn!(size, clamped, "scatter item size clamped to [0, 1]");
        }
        if self.item_size != clamped {
            self.item_size = clamped;
            self.changes.insert(SeriesChange::ItemSize);
        }
    }

    #[must_use]
    pub fn data(&self) -> &SeriesData {
        &self.data
    }

    /// Replaces the data proxy. The proxy must match the series kind.
    pub fn set_data(&mut self, data: SeriesData) -> GraphResult<()> {
        debug_assert_eq!(data.kind(), self.kind(), "data proxy kind mismatch");
        if data.kind() != self.kind() {
            return Err(GraphError::InvalidData(format!(
                "{:?} data cannot be attached to a {:?} series",
                data.kind(),
                self.kind()
            )));
        }
        self.data = data;
        if let SeriesData::Bar(proxy) = &mut self.data {
            proxy.mark_structure_reset();
        }
        self.changes.insert(SeriesChange::Data);
        Ok(())
    }

    #[must_use]
    pub fn bar_proxy(&self) -> Option<&BarDataProxy> {
        match &self.data {
            SeriesData::Bar(proxy) => Some(proxy),
            _ => None,
        }
    }

    /// Mutable bar data; the series is flagged as having changed data.
    pub fn bar_proxy_mut(&mut self) -> Option<&mut BarDataProxy> {
        match &mut self.data {
            SeriesData::Bar(proxy) => {
                self.changes.insert(SeriesChange::Data);
                Some(proxy)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn scatter_proxy(&self) -> Option<&ScatterDataProxy> {
        match &self.data {
            SeriesData::Scatter(proxy) => Some(proxy),
            _ => None,
        }
    }

    pub fn scatter_proxy_mut(&mut self) -> Option<&mut ScatterDataProxy> {
        match &mut self.data {
            SeriesData::Scatter(proxy) => {
                self.changes.insert(SeriesChange::Data);
                Some(proxy)
            }
            _ => None,
        }
    }

    #[must_use]
    pub fn surface_proxy(&self) -> Option<&SurfaceDataProxy> {
        match &self.data {
            SeriesData::Surface(proxy) => Some(proxy),
            _ => None,
        }
    }

    pub fn surface_proxy_mut(&mut self) -> Option<&mut SurfaceDataProxy> {
        match &mut self.data {
            SeriesData::Surface(proxy) => {
                self.changes.insert(SeriesChange::Data);
                Some(proxy)
            }
            _ => None,
        }
    }

    /// Whether the bar proxy was swapped out since the last poll.
    pub(crate) fn take_structure_reset(&mut self) -> bool {
        match &mut self.data {
            SeriesData::Bar(proxy) => proxy.take_structure_reset(),
            _ => false,
        }
    }

    #[must_use]
    pub fn changes(&self) -> ChangeSet<SeriesChange> {
        self.changes
    }

    #[must_use]
    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_none()
    }

    /// Clears one change bit, reporting whether it was set.
    pub(crate) fn take_change(&mut self, change: SeriesChange) -> bool {
        self.changes.take(change)
    }

    pub(crate) fn mark_changed(&mut self, change: SeriesChange) {
        self.changes.insert(change);
    }
}

#[cfg(test)]
mod tests {
    use super::{Series, SeriesData, SeriesKind};
    use crate::core::change_flags::{SeriesChange, ThemeAttribute};
    use crate::core::data_proxy::{BarDataProxy, ScatterDataProxy, SurfaceDataProxy};
    use crate::core::theme::Theme;
    use crate::core::types::{Color, MeshKind, SurfaceDrawMode};

    #[test]
    fn new_series_has_every_change_bit_set() {
        let series = Series::bar(BarDataProxy::new());
        assert_eq!(series.kind(), SeriesKind::Bar);
        assert_eq!(series.mesh(), MeshKind::BevelBar);
        assert_eq!(series.item_label_format(), "@valueLabel");
        assert!(series.changes().contains(SeriesChange::Mesh));
        assert!(series.changes().contains(SeriesChange::ItemSize));
    }

    #[test]
    fn explicit_color_survives_theme_reset_until_forced() {
        let theme = Theme::qt();
        let mut series = Series::scatter(ScatterDataProxy::new());
        let custom = Color::rgb(0.9, 0.1, 0.1);
        series.set_base_color(custom);
        assert!(series.overrides_theme(ThemeAttribute::BaseColor));

        series.reset_to_theme(&theme, 0, false);
        assert_eq!(series.base_color(), custom);
        assert_eq!(series.single_highlight_color(), theme.single_highlight_color());

        series.reset_to_theme(&theme, 0, true);
        assert_eq!(series.base_color(), theme.base_color_at(0));
        assert!(!series.overrides_theme(ThemeAttribute::BaseColor));
    }

    #[test]
    fn kind_specific_setters_are_ignored_elsewhere() {
        let mut scatter = Series::scatter(ScatterDataProxy::new());
        scatter.set_draw_mode(SurfaceDrawMode::Wireframe);
        assert_eq!(scatter.draw_mode(), None);
        scatter.set_item_size(2.0);
        assert_eq!(scatter.item_size(), Some(1.0));

        let mut surface = Series::surface(SurfaceDataProxy::new());
        surface.set_flat_shading(true);
        assert_eq!(surface.flat_shading(), Some(true));
        assert_eq!(surface.item_size(), None);
    }

    #[test]
    fn wrong_proxy_kind_is_an_error() {
        let mut series = Series::scatter(ScatterDataProxy::new());
        let result = std::panic::catch_unwind(move || {
            series.set_data(SeriesData::Bar(BarDataProxy::new()))
        });
        // Debug builds assert, release builds return an error.
        match result {
            Ok(outcome) => assert!(outcome.is_err()),
            Err(_) => assert!(cfg!(debug_assertions)),
        }
    }

    #[test]
    fn proxy_access_flags_data_change() {
        let mut series = Series::bar(BarDataProxy::new());
        assert!(series.take_change(SeriesChange::Data));
        series
            .bar_proxy_mut()
            .expect("bar proxy")
            .add_row(vec![1.0, 2.0])
            .expect("finite row");
        assert!(series.take_change(SeriesChange::Data));
    }
}
