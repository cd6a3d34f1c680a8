#![warn(clippy::all, rust_2018_idioms)]

pub mod brush;
pub mod buffer;
pub mod canvas;
pub mod config;
pub mod error;
pub mod history;
pub mod input;
pub mod stroke;

pub use brush::{BrushMode, BrushModel, CapStyle, JoinStyle, LinePattern, NamedConstant, PenStyle};
pub use buffer::{PixelBuffer, Size};
pub use canvas::Canvas;
pub use config::{CanvasConfig, PersistenceError, Settings};
pub use error::{CanvasError, CanvasResult};
pub use history::{History, HISTORY_LIMIT};
pub use input::InputEvent;
pub use stroke::StrokeState;
