mod auto_adjust;
mod axis_controller;
mod custom_item_controller;
mod graph_config;
mod graph_controller;
mod selection;
mod series_controller;
mod snapshot;
mod sync;

pub use graph_config::{GraphConfig, GraphKind};
pub use graph_controller::GraphController;
pub use snapshot::{
    AxisCacheSnapshot, CustomItemCacheSnapshot, RenderStateSnapshot, SelectionSnapshot,
    SeriesCacheSnapshot,
};
pub use sync::SyncReport;
