use thiserror::Error;

use crate::element::ItemId;

/// Errors surfaced by the editing surface.
///
/// Gestures never produce these; touch handling degrades to a no-op instead.
#[derive(Error, Debug)]
pub enum CanvasError {
    #[error("No overlay item with id {0}")]
    UnknownItem(ItemId),
    #[error("Overlay item {0} is not a text item")]
    NotTextItem(ItemId),
    #[error("Raster has no pixels ({width}x{height})")]
    EmptyRaster { width: u32, height: u32 },
    #[error("Overlay item limit reached ({0} items)")]
    ItemLimitReached(usize),
    #[error("Invalid font data for family '{0}'")]
    InvalidFont(String),
    #[error("Failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),
    #[error("Failed to parse configuration: {0}")]
    Config(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
