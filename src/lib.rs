#![warn(clippy::all, rust_2018_idioms)]

pub mod canvas;
pub mod config;
pub mod element;
pub mod error;
pub mod event;
pub mod font;
pub mod geometry;
pub mod gizmo;
pub mod highlight;
pub mod id_generator;
pub mod input;
pub mod overlay;
pub mod raster;
pub mod renderer;
pub mod scene;
pub mod stroke;

pub use canvas::EditorCanvas;
pub use config::{CanvasConfig, CapPolicy};
pub use element::{Element, ItemId, ItemKind, OverlayItem, TextStyle};
pub use error::CanvasError;
pub use event::{CanvasEvent, EventBus, EventHandler, EventKind, EventRecorder, SubscriptionId};
pub use font::{FontBook, FontWeight};
pub use geometry::ItemTransform;
pub use highlight::{BoundaryHighlight, FadeTick};
pub use input::{GestureState, TouchAction, TouchEvent, TouchPointer};
pub use overlay::{ColorMatrix, FrameOverlay};
pub use renderer::Renderer;
pub use scene::{Placement, Scene};
