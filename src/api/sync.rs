use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{
    Axis, AxisChange, AxisOrientation, ChangeSet, ControllerChange, SeriesChange, ThemeAttribute,
    ThemeChange,
};
use crate::error::{GraphError, GraphResult};
use crate::render::{
    AxisRenderCache, CustomItemRenderCache, RendererBackend, Selection, SeriesRenderCache,
};

use super::GraphController;
use super::axis_controller::axis_type_change;

/// What one sync pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncReport {
    pub shadow_quality_lowered: bool,
    pub theme_applied: bool,
    pub axes_fitted: bool,
    pub axes_updated: usize,
    pub series_caches_created: usize,
    pub series_caches_populated: usize,
    pub series_caches_removed: usize,
    pub custom_item_caches_populated: usize,
    pub custom_item_caches_removed: usize,
    pub selection_cleared: bool,
}

impl SyncReport {
    /// Whether the pass found nothing to do.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

fn structural_axis_changes() -> ChangeSet<AxisChange> {
    [
        AxisChange::Range,
        AxisChange::SegmentCount,
        AxisChange::SubSegmentCount,
        AxisChange::LabelFormat,
        AxisChange::Reversed,
        AxisChange::Formatter,
    ]
    .into_iter()
    .collect()
}

fn formatter_inputs() -> ChangeSet<AxisChange> {
    structural_axis_changes().with(AxisChange::Labels)
}

fn axis_type_changes() -> ChangeSet<ControllerChange> {
    AxisOrientation::SLOTS
        .into_iter()
        .map(axis_type_change)
        .collect()
}

fn theme_attribute(change: ThemeChange) -> Option<ThemeAttribute> {
    match change {
        ThemeChange::ColorStyle => Some(ThemeAttribute::ColorStyle),
        ThemeChange::BaseColors => Some(ThemeAttribute::BaseColor),
        ThemeChange::BaseGradients => Some(ThemeAttribute::BaseGradient),
        ThemeChange::SingleHighlightColor => Some(ThemeAttribute::SingleHighlightColor),
        ThemeChange::SingleHighlightGradient => Some(ThemeAttribute::SingleHighlightGradient),
        ThemeChange::MultiHighlightColor => Some(ThemeAttribute::MultiHighlightColor),
        ThemeChange::MultiHighlightGradient => Some(ThemeAttribute::MultiHighlightGradient),
        ThemeChange::Replaced
        | ThemeChange::Font
        | ThemeChange::BackgroundEnabled
        | ThemeChange::GridEnabled => None,
    }
}

impl<B: RendererBackend> GraphController<B> {
    /// Runs one sync pass, pushing every pending change into the render
    /// state.
    ///
    /// Each step acts only on its own change bits and clears them as it
    /// goes, so edits made after this call are picked up by the next pass.
    /// Without a rendering context nothing is touched and the pass can be
    /// retried later.
    pub fn synchronize(&mut self) -> GraphResult<SyncReport> {
        if !self.backend.has_context() {
            warn!("rendering context unavailable; sync pass deferred");
            return Err(GraphError::ContextUnavailable);
        }

        let mut report = SyncReport::default();
        let changes = self.changes.take_all();

        self.sync_shadow_quality(changes, &mut report);
        self.sync_theme(changes, &mut report);
        if self.needs_axis_fit(changes) {
            self.fit_axes_to_data();
            report.axes_fitted = true;
        }
        let axes_structural = self.sync_axes(changes, &mut report);
        let data_changed = self.sync_series(changes, &mut report);
        self.sync_custom_items(changes, &mut report);

        let selection_inputs = ChangeSet::none()
            .with(ControllerChange::Selection)
            .with(ControllerChange::SelectionMode)
            .with(ControllerChange::SeriesList);
        if changes.intersects(selection_inputs) || axes_structural || data_changed {
            self.sync_selection(&mut report);
        }

        for cache in self.render_state.axes_mut() {
            cache.update_all_positions();
        }

        if report.is_idle() {
            trace!("sync pass found nothing to do");
        } else {
            debug!(?report, "sync pass completed");
        }
        Ok(report)
    }

    /// Runs a sync pass and hands the resulting state to the backend.
    pub fn render(&mut self) -> GraphResult<SyncReport> {
        let report = self.synchronize()?;
        self.backend.render(&self.render_state)?;
        for cache in self.render_state.series_mut().values_mut() {
            cache.set_data_dirty(false);
        }
        Ok(report)
    }

    fn sync_shadow_quality(&mut self, changes: ChangeSet<ControllerChange>, report: &mut SyncReport) {
        if !changes.contains(ControllerChange::ShadowQuality) {
            return;
        }
        let mut quality = self.shadow_quality;
        while let Err(err) = self.backend.apply_shadow_quality(quality) {
            let Some(lower) = quality.lower() else {
                warn!(error = %err, "backend refused to disable shadows");
                break;
            };
            warn!(error = %err, from = ?quality, to = ?lower, "lowering shadow quality");
            quality = lower;
            report.shadow_quality_lowered = true;
        }
        self.shadow_quality = quality;
        self.render_state.set_shadow_quality(quality);
    }

    fn sync_theme(&mut self, changes: ChangeSet<ControllerChange>, report: &mut SyncReport) {
        let theme_changes = self.theme.take_changes();
        let replaced = changes.contains(ControllerChange::Theme)
            || theme_changes.contains(ThemeChange::Replaced);
        if theme_changes.is_none() && !replaced {
            return;
        }
        report.theme_applied = true;

        let attributes: ChangeSet<ThemeAttribute> = if replaced {
            ChangeSet::all()
        } else {
            theme_changes.iter().filter_map(theme_attribute).collect()
        };
        if !attributes.is_none() {
            for (index, id) in self.series_list.iter().enumerate() {
                if let Some(series) = self.series.get_mut(*id) {
                    for attribute in attributes.iter() {
                        series.apply_theme_attribute(&self.theme, index, attribute);
                    }
                }
            }
        }

        if replaced || theme_changes.contains(ThemeChange::Font) {
            self.render_state.set_font_family(self.theme.font_family());
            for cache in self.render_state.axes_mut() {
                cache.refresh_textures(&mut self.backend);
            }
        }
        let scene_flags = ChangeSet::none()
            .with(ThemeChange::BackgroundEnabled)
            .with(ThemeChange::GridEnabled);
        if replaced || theme_changes.intersects(scene_flags) {
            self.render_state
                .set_scene_flags(self.theme.background_enabled(), self.theme.grid_enabled());
        }
    }

    fn needs_axis_fit(&self, changes: ChangeSet<ControllerChange>) -> bool {
        let data_inputs = ChangeSet::none()
            .with(SeriesChange::Data)
            .with(SeriesChange::Visibility);
        changes.contains(ControllerChange::SeriesList)
            || changes.intersects(axis_type_changes())
            || self.series_list.iter().any(|id| {
                self.series
                    .get(*id)
                    .is_some_and(|series| series.changes().intersects(data_inputs))
            })
            || self.axis_slots.iter().any(|slot| {
                self.axes
                    .get(slot.id)
                    .is_some_and(Axis::has_pending_changes)
            })
    }

    /// Mirrors axis changes into the axis caches. Returns whether any change
    /// affects the data window.
    fn sync_axes(&mut self, changes: ChangeSet<ControllerChange>, report: &mut SyncReport) -> bool {
        let mut structural = false;
        for (slot, orientation) in AxisOrientation::SLOTS.into_iter().enumerate() {
            let type_changed = changes.contains(axis_type_change(orientation));
            let Some(axis) = self.axes.get_mut(self.axis_slots[slot].id) else {
                continue;
            };
            let Some(cache) = self.render_state.axis_mut(orientation) else {
                continue;
            };
            if type_changed {
                cache.set_kind(axis.kind(), &mut self.backend);
                axis.mark_all_changed();
            }
            if !axis.has_pending_changes() {
                continue;
            }
            axis.recalculate_formatter();
            let axis_changes = axis.take_changes();
            mirror_axis(axis, cache, axis_changes, &mut self.backend);
            self.backend.on_axis_changed(orientation, axis_changes);

            structural |= type_changed || axis_changes.intersects(structural_axis_changes());
            report.axes_updated += 1;
            trace!(?orientation, changes = ?axis_changes, "axis cache updated");
        }

        if structural {
            for cache in self.render_state.series_mut().values_mut() {
                cache.set_data_dirty(true);
            }
        }
        structural
    }

    /// Populates series caches. A series list change runs the full validity
    /// sweep. Returns whether any attached series reported new data.
    fn sync_series(&mut self, changes: ChangeSet<ControllerChange>, report: &mut SyncReport) -> bool {
        let list_changed = changes.contains(ControllerChange::SeriesList);
        let caches = self.render_state.series_mut();
        if list_changed {
            for cache in caches.values_mut() {
                cache.set_valid(false);
            }
        }

        let mut data_changed = false;
        for (index, id) in self.series_list.iter().enumerate() {
            let Some(series) = self.series.get_mut(*id) else {
                continue;
            };
            if list_changed {
                // List positions pick the theme's cyclic colors.
                series.reset_to_theme(&self.theme, index, false);
            }
            if !list_changed && !series.has_pending_changes() {
                continue;
            }
            data_changed |= series.changes().contains(SeriesChange::Data);

            let mut newly_created = false;
            let cache = caches.entry(*id).or_insert_with(|| {
                newly_created = true;
                SeriesRenderCache::new(series.kind())
            });
            cache.set_valid(true);
            cache.set_visual_index(index);
            cache.populate(series, newly_created, &mut self.backend);
            report.series_caches_populated += 1;
            if newly_created {
                report.series_caches_created += 1;
            }
        }

        if list_changed {
            let backend = &mut self.backend;
            let before = caches.len();
            caches.retain(|id, cache| {
                if cache.is_valid() {
                    return true;
                }
                trace!(?id, "series cache removed");
                cache.cleanup(backend);
                false
            });
            report.series_caches_removed = before - caches.len();
            caches.sort_by(|_, a, _, b| a.visual_index().cmp(&b.visual_index()));
        }
        data_changed
    }

    fn sync_custom_items(&mut self, changes: ChangeSet<ControllerChange>, report: &mut SyncReport) {
        let list_changed = changes.contains(ControllerChange::CustomItemList);
        let caches = self.render_state.custom_items_mut();
        if list_changed {
            for cache in caches.values_mut() {
                cache.set_valid(false);
            }
        }

        for (index, id) in self.custom_item_list.iter().enumerate() {
            let Some(item) = self.custom_items.get_mut(*id) else {
                continue;
            };
            if !list_changed && !item.has_pending_changes() {
                continue;
            }
            let mut newly_created = false;
            let cache = caches.entry(*id).or_insert_with(|| {
                newly_created = true;
                CustomItemRenderCache::new()
            });
            cache.set_valid(true);
            cache.set_index(index);
            cache.populate(item, newly_created, &mut self.backend);
            report.custom_item_caches_populated += 1;
        }

        if list_changed {
            let backend = &mut self.backend;
            let before = caches.len();
            caches.retain(|_, cache| {
                if cache.is_valid() {
                    return true;
                }
                cache.cleanup(backend);
                false
            });
            report.custom_item_caches_removed = before - caches.len();
            caches.sort_by(|_, a, _, b| a.index().cmp(&b.index()));
        }
    }

    /// Drops selections that no longer point at valid data and publishes
    /// the result to the render state.
    fn sync_selection(&mut self, report: &mut SyncReport) {
        let selected = self.selection.series();
        let mut stale = false;
        for id in &self.series_list {
            if let Some(series) = self.series.get_mut(*id) {
                stale |= series.take_structure_reset() && selected == Some(*id);
            }
        }
        if let Selection::Item { series, position } = self.selection {
            stale |= !self.selection_is_valid(series, position);
        }
        if stale {
            debug!(selection = ?self.selection, "stale selection cleared");
            self.selection = Selection::None;
            report.selection_cleared = true;
        }
        self.render_state.set_selection(self.selection);
    }
}

fn mirror_axis<B: RendererBackend + ?Sized>(
    axis: &mut Axis,
    cache: &mut AxisRenderCache,
    changes: ChangeSet<AxisChange>,
    backend: &mut B,
) {
    for change in changes.iter() {
        match change {
            AxisChange::Title => cache.set_title(axis.title(), backend),
            AxisChange::TitleVisibility => cache.set_title_visible(axis.title_visible()),
            AxisChange::TitleFixed => cache.set_title_fixed(axis.title_fixed()),
            AxisChange::LabelAutoRotation => {
                cache.set_label_auto_rotation(axis.label_auto_rotation());
            }
            AxisChange::Labels => cache.set_labels(axis.labels(), backend),
            AxisChange::Range => {
                cache.set_min(axis.min());
                cache.set_max(axis.max());
            }
            AxisChange::SegmentCount => {
                if let Some(count) = axis.segment_count() {
                    cache.set_segment_count(count);
                }
            }
            AxisChange::SubSegmentCount => {
                if let Some(count) = axis.sub_segment_count() {
                    cache.set_sub_segment_count(count);
                }
            }
            AxisChange::LabelFormat => {
                if let Some(format) = axis.label_format() {
                    cache.set_label_format(format);
                }
            }
            AxisChange::Reversed => cache.set_reversed(axis.reversed()),
            // Refreshed below together with the other formatter inputs.
            AxisChange::Formatter => {}
        }
    }
    if changes.intersects(formatter_inputs()) {
        cache.set_formatter(axis.formatter_snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::{formatter_inputs, structural_axis_changes, theme_attribute};
    use crate::core::{AxisChange, ChangeKind, ThemeAttribute, ThemeChange};

    #[test]
    fn every_theme_attribute_has_a_theme_change() {
        let mapped: Vec<ThemeAttribute> = ThemeChange::ALL
            .iter()
            .copied()
            .filter_map(theme_attribute)
            .collect();
        assert_eq!(mapped.len(), ThemeAttribute::ALL.len());
    }

    #[test]
    fn cosmetic_axis_changes_are_not_structural() {
        let structural = structural_axis_changes();
        assert!(!structural.contains(AxisChange::Title));
        assert!(!structural.contains(AxisChange::Labels));
        assert!(formatter_inputs().contains(AxisChange::Labels));
        assert!(structural.contains(AxisChange::Formatter));
    }
}
