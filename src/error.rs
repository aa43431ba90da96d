use thiserror::Error;

use crate::core::{AxisId, CustomItemId, SeriesId, ShadowQuality};

pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unknown axis: {0:?}")]
    UnknownAxis(AxisId),

    #[error("unknown series: {0:?}")]
    UnknownSeries(SeriesId),

    #[error("unknown custom item: {0:?}")]
    UnknownCustomItem(CustomItemId),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("rendering context is not available")]
    ContextUnavailable,

    #[error("shadow quality {0:?} is not supported by the renderer backend")]
    ShadowQualityUnsupported(ShadowQuality),
}
