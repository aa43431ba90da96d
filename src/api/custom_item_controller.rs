use glam::Vec3;
use tracing::debug;

use crate::core::{ControllerChange, CustomItem, CustomItemId};
use crate::error::{GraphError, GraphResult};
use crate::render::RendererBackend;

use super::GraphController;

impl<B: RendererBackend> GraphController<B> {
    /// Adds a custom item to the end of the item list.
    pub fn add_custom_item(&mut self, item: CustomItem) -> CustomItemId {
        let id = self.custom_items.insert(item);
        self.custom_item_list.push(id);
        self.changes.insert(ControllerChange::CustomItemList);
        id
    }

    /// Removes and drops a custom item.
    pub fn remove_custom_item(&mut self, id: CustomItemId) -> GraphResult<()> {
        self.release_custom_item(id).map(drop)
    }

    /// Removes every item located exactly at `position`. Returns how many
    /// were removed.
    pub fn remove_custom_item_at(&mut self, position: Vec3) -> usize {
        let matching: Vec<CustomItemId> = self
            .custom_item_list
            .iter()
            .copied()
            .filter(|id| {
                self.custom_items
                    .get(*id)
                    .is_some_and(|item| item.position() == position)
            })
            .collect();
        for id in &matching {
            self.custom_item_list.retain(|entry| entry != id);
            self.custom_items.remove(*id);
        }
        if !matching.is_empty() {
            self.changes.insert(ControllerChange::CustomItemList);
            debug!(removed = matching.len(), "custom items removed by position");
        }
        matching.len()
    }

    /// Detaches a custom item and hands it back to the caller.
    pub fn release_custom_item(&mut self, id: CustomItemId) -> GraphResult<CustomItem> {
        let mut item = self
            .custom_items
            .remove(id)
            .ok_or(GraphError::UnknownCustomItem(id))?;
        self.custom_item_list.retain(|entry| *entry != id);
        self.changes.insert(ControllerChange::CustomItemList);
        item.mark_all_changed();
        Ok(item)
    }

    /// Items in list order; the position in this list is the picking index.
    #[must_use]
    pub fn custom_item_list(&self) -> &[CustomItemId] {
        &self.custom_item_list
    }

    #[must_use]
    pub fn custom_item(&self, id: CustomItemId) -> Option<&CustomItem> {
        self.custom_items.get(id)
    }

    pub fn custom_item_mut(&mut self, id: CustomItemId) -> Option<&mut CustomItem> {
        self.custom_items.get_mut(id)
    }
}
