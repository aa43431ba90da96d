pub mod arena;
pub mod axis;
pub mod axis_range;
pub mod change_flags;
pub mod custom_item;
pub mod data_proxy;
pub mod formatter;
pub mod label_format;
pub mod log_formatter;
pub mod series;
pub mod theme;
pub mod types;

pub use arena::{Arena, Id};
pub use axis::Axis;
pub use axis_range::{AxisRange, RangeChange, RangePolicy, RangeUpdate};
pub use change_flags::{
    AxisChange, ChangeKind, ChangeSet, ControllerChange, CustomItemChange, SeriesChange,
    ThemeAttribute, ThemeChange,
};
pub use custom_item::CustomItem;
pub use data_proxy::{BarDataProxy, PointExtent, ScatterDataProxy, SurfaceDataProxy, ValueExtent};
pub use formatter::{AxisFormatter, FormatterInput, FormatterState, SegmentOverride, ValueAxisFormatter};
pub use label_format::{
    DEFAULT_LABEL_FORMAT, FormatParam, LabelFormat, LabelFormatCache, MAX_FIELD_WIDTH,
};
pub use log_formatter::LogValueAxisFormatter;
pub use series::{Series, SeriesData, SeriesKind};
pub use theme::Theme;
pub use types::{
    AxisKind, AxisOrientation, Color, ColorStyle, GradientStop, LinearGradient, MeshKind,
    SelectionFlag, SelectionFlags, ShadowQuality, SurfaceDrawMode,
};

pub type AxisId = Id<Axis>;
pub type SeriesId = Id<Series>;
pub type CustomItemId = Id<CustomItem>;
