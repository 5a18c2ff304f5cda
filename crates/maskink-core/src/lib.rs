//! MaskInk Core Library
//!
//! Platform-agnostic stroke history and drawing state for the MaskInk mask editor.

pub mod config;
pub mod editor;
pub mod history;
pub mod session;
pub mod stroke;

pub use config::{ConfigError, DisplayMode, EditorConfig, MaskColor};
pub use editor::{MaskEditor, MaskSnapshot};
pub use history::StrokeHistory;
pub use session::{DrawingSession, SessionError, SessionResult, SessionState};
pub use stroke::{MaskTool, Stroke, segment_distance};
