use tracing::trace;

use crate::core::{AxisFormatter, AxisKind, AxisOrientation, DEFAULT_LABEL_FORMAT};
use crate::render::{RendererBackend, TextureHandle};

const DEFAULT_MIN: f32 = 0.0;
const DEFAULT_MAX: f32 = 10.0;
const DEFAULT_SEGMENT_COUNT: usize = 5;
const DEFAULT_SUB_SEGMENT_COUNT: usize = 1;

/// Renderer-side mirror of one axis orientation.
///
/// Setters only copy what the sync pass hands them; positions are rebuilt
/// in `update_all_positions`, which is the only place where `scale` and
/// `translate` are applied to formatter output.
#[derive(Debug)]
pub struct AxisRenderCache {
    orientation: AxisOrientation,
    kind: AxisKind,
    title: String,
    title_texture: Option<TextureHandle>,
    title_visible: bool,
    title_fixed: bool,
    label_auto_rotation: f32,
    labels: Vec<String>,
    label_textures: Vec<Option<TextureHandle>>,
    min: f32,
    max: f32,
    segment_count: usize,
    sub_segment_count: usize,
    label_format: String,
    reversed: bool,
    formatter: Option<Box<dyn AxisFormatter>>,
    scale: f32,
    translate: f32,
    positions_dirty: bool,
    grid_positions: Vec<f32>,
    label_positions: Vec<f32>,
}

impl AxisRenderCache {
    #[must_use]
    pub fn new(orientation: AxisOrientation) -> Self {
        Self {
            orientation,
            kind: AxisKind::None,
            title: String::new(),
            title_texture: None,
            title_visible: false,
            title_fixed: true,
            label_auto_rotation: 0.0,
            labels: Vec::new(),
            label_textures: Vec::new(),
            min: DEFAULT_MIN,
            max: DEFAULT_MAX,
            segment_count: DEFAULT_SEGMENT_COUNT,
            sub_segment_count: DEFAULT_SUB_SEGMENT_COUNT,
            label_format: DEFAULT_LABEL_FORMAT.to_owned(),
            reversed: false,
            formatter: None,
            scale: 1.0,
            translate: 0.0,
            positions_dirty: true,
            grid_positions: Vec::new(),
            label_positions: Vec::new(),
        }
    }

    #[must_use]
    pub fn orientation(&self) -> AxisOrientation {
        self.orientation
    }

    #[must_use]
    pub fn kind(&self) -> AxisKind {
        self.kind
    }

    /// Switches to a new axis instance. Everything mirrored from the
    /// previous axis is dropped and reverts to defaults; scale and
    /// translate belong to the scene and are kept.
    pub fn set_kind<B: RendererBackend + ?Sized>(&mut self, kind: AxisKind, backend: &mut B) {
        self.release_textures(backend);
        self.kind = kind;
        self.title.clear();
        self.title_visible = false;
        self.title_fixed = true;
        self.label_auto_rotation = 0.0;
        self.labels.clear();
        self.min = DEFAULT_MIN;
        self.max = DEFAULT_MAX;
        self.segment_count = DEFAULT_SEGMENT_COUNT;
        self.sub_segment_count = DEFAULT_SUB_SEGMENT_COUNT;
        self.label_format = DEFAULT_LABEL_FORMAT.to_owned();
        self.reversed = false;
        self.formatter = None;
        self.positions_dirty = true;
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn title_texture(&self) -> Option<TextureHandle> {
        self.title_texture
    }

    pub fn set_title<B: RendererBackend + ?Sized>(&mut self, title: &str, backend: &mut B) {
        if self.title == title {
            return;
        }
        title.clone_into(&mut self.title);
        if let Some(texture) = self.title_texture.take() {
            backend.delete_texture(texture);
        }
        if !title.is_empty() {
            self.title_texture = Some(backend.generate_label_texture(title));
        }
    }

    #[must_use]
    pub fn title_visible(&self) -> bool {
        self.title_visible
    }

    pub fn set_title_visible(&mut self, visible: bool) {
        self.title_visible = visible;
    }

    #[must_use]
    pub fn title_fixed(&self) -> bool {
        self.title_fixed
    }

    pub fn set_title_fixed(&mut self, fixed: bool) {
        self.title_fixed = fixed;
    }

    #[must_use]
    pub fn label_auto_rotation(&self) -> f32 {
        self.label_auto_rotation
    }

    pub fn set_label_auto_rotation(&mut self, degrees: f32) {
        self.label_auto_rotation = degrees;
    }

    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Label textures, `None` for empty labels.
    #[must_use]
    pub fn label_textures(&self) -> &[Option<TextureHandle>] {
        &self.label_textures
    }

    /// Mirrors the label list, regenerating textures only for labels that
    /// differ from the previous list or are new. Surplus textures are freed.
    pub fn set_labels<B: RendererBackend + ?Sized>(&mut self, labels: &[String], backend: &mut B) {
        if self.labels == labels {
            return;
        }
        if self.label_textures.len() > labels.len() {
            for texture in self.label_textures.drain(labels.len()..).flatten() {
                backend.delete_texture(texture);
            }
        }

        let old_len = self.labels.len();
        let mut regenerated = 0usize;
        for (index, label) in labels.iter().enumerate() {
            if index >= self.label_textures.len() {
                self.label_textures.push(None);
            }
            let unchanged = index < old_len && self.labels[index] == *label;
            if unchanged {
                continue;
            }
            if let Some(texture) = self.label_textures[index].take() {
                backend.delete_texture(texture);
            }
            if !label.is_empty() {
                self.label_textures[index] = Some(backend.generate_label_texture(label));
                regenerated += 1;
            }
        }
        trace!(
            orientation = ?self.orientation,
            count = labels.len(),
            regenerated,
            "axis labels mirrored"
        );
        self.labels = labels.to_vec();
        if self.kind == AxisKind::Category {
            self.positions_dirty = true;
        }
    }

    /// Regenerates every label and title texture, e.g. after a font change.
    pub fn refresh_textures<B: RendererBackend + ?Sized>(&mut self, backend: &mut B) {
        self.release_textures(backend);
        if !self.title.is_empty() {
            self.title_texture = Some(backend.generate_label_texture(&self.title));
        }
        self.label_textures = self
            .labels
            .iter()
            .map(|label| (!label.is_empty()).then(|| backend.generate_label_texture(label)))
            .collect();
    }

    #[must_use]
    pub fn min(&self) -> f32 {
        self.min
    }

    pub fn set_min(&mut self, min: f32) {
        if self.min != min {
            self.min = min;
            self.positions_dirty = true;
        }
    }

    #[must_use]
    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn set_max(&mut self, max: f32) {
        if self.max != max {
            self.max = max;
            self.positions_dirty = true;
        }
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn set_segment_count(&mut self, count: usize) {
        if self.segment_count != count {
            self.segment_count = count;
            self.positions_dirty = true;
        }
    }

    #[must_use]
    pub fn sub_segment_count(&self) -> usize {
        self.sub_segment_count
    }

    pub fn set_sub_segment_count(&mut self, count: usize) {
        if self.sub_segment_count != count {
            self.sub_segment_count = count;
            self.positions_dirty = true;
        }
    }

    #[must_use]
    pub fn label_format(&self) -> &str {
        &self.label_format
    }

    pub fn set_label_format(&mut self, format: &str) {
        format.clone_into(&mut self.label_format);
    }

    #[must_use]
    pub fn reversed(&self) -> bool {
        self.reversed
    }

    pub fn set_reversed(&mut self, reversed: bool) {
        if self.reversed != reversed {
            self.reversed = reversed;
            self.positions_dirty = true;
        }
    }

    #[must_use]
    pub fn formatter(&self) -> Option<&dyn AxisFormatter> {
        self.formatter.as_deref()
    }

    /// Installs the detached formatter copy positions are read from.
    pub fn set_formatter(&mut self, formatter: Option<Box<dyn AxisFormatter>>) {
        self.formatter = formatter;
        self.positions_dirty = true;
    }

    #[must_use]
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn set_scale(&mut self, scale: f32) {
        if self.scale != scale {
            self.scale = scale;
            self.positions_dirty = true;
        }
    }

    #[must_use]
    pub fn translate(&self) -> f32 {
        self.translate
    }

    pub fn set_translate(&mut self, translate: f32) {
        if self.translate != translate {
            self.translate = translate;
            self.positions_dirty = true;
        }
    }

    #[must_use]
    pub fn positions_dirty(&self) -> bool {
        self.positions_dirty
    }

    /// Rebuilds the scene-space grid and label positions when dirty.
    ///
    /// Grid positions interleave each grid line with the sub-grid lines of
    /// its segment: `grid[0], sub[0][..], grid[1], sub[1][..], .., grid[S]`.
    pub fn update_all_positions(&mut self) {
        if !self.positions_dirty {
            return;
        }
        self.positions_dirty = false;
        self.grid_positions.clear();
        self.label_positions.clear();

        let direction = if self.reversed { -1.0 } else { 1.0 };
        let (scale, translate) = (self.scale, self.translate);
        let adjust = move |position: f32| position * direction * scale + translate;

        match (&self.formatter, self.kind) {
            (Some(formatter), AxisKind::Value) => {
                let state = formatter.state();
                let groups = state.sub_grid_positions();
                for (index, grid) in state.grid_positions().iter().enumerate() {
                    self.grid_positions.push(adjust(*grid));
                    if let Some(group) = groups.get(index) {
                        self.grid_positions
                            .extend(group.iter().map(|position| adjust(*position)));
                    }
                }
                self.label_positions
                    .extend(state.label_positions().iter().map(|position| adjust(*position)));
            }
            (_, AxisKind::Category) => {
                // One segment per label; labels sit in the middle of their segment.
                let count = self.labels.len().max(1);
                let step = 2.0 / count as f32;
                self.grid_positions.extend((0..=count).map(|index| {
                    let position = if index == count {
                        1.0
                    } else {
                        -1.0 + index as f32 * step
                    };
                    adjust(position)
                }));
                self.label_positions.extend(
                    (0..self.labels.len())
                        .map(|index| adjust(-1.0 + (index as f32 + 0.5) * step)),
                );
            }
            _ => {}
        }
        trace!(
            orientation = ?self.orientation,
            grid = self.grid_positions.len(),
            labels = self.label_positions.len(),
            "axis positions rebuilt"
        );
    }

    /// Grid and sub-grid positions in scene space, interleaved.
    #[must_use]
    pub fn grid_positions(&self) -> &[f32] {
        &self.grid_positions
    }

    #[must_use]
    pub fn label_positions(&self) -> &[f32] {
        &self.label_positions
    }

    /// Number of labels to draw. Value axes count adjusted label positions so
    /// formatters that drop labels are respected.
    #[must_use]
    pub fn label_count(&self) -> usize {
        match self.kind {
            AxisKind::Value => self.label_positions.len(),
            AxisKind::Category => self.labels.len(),
            AxisKind::None => 0,
        }
    }

    /// Gridline instances the scene needs: a floor and a wall line per grid
    /// position on value axes, one per label on category axes.
    #[must_use]
    pub fn grid_line_instance_count(&self) -> usize {
        match self.kind {
            AxisKind::Value => 2 * (self.segment_count + 1),
            AxisKind::Category => self.labels.len(),
            AxisKind::None => 0,
        }
    }

    fn release_textures<B: RendererBackend + ?Sized>(&mut self, backend: &mut B) {
        if let Some(texture) = self.title_texture.take() {
            backend.delete_texture(texture);
        }
        for texture in self.label_textures.drain(..).flatten() {
            backend.delete_texture(texture);
        }
    }

    /// Frees every texture owned by this cache.
    pub fn cleanup<B: RendererBackend + ?Sized>(&mut self, backend: &mut B) {
        self.release_textures(backend);
    }
}
