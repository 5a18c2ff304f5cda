//! Mask editor state: history, drawing session and settings together.

use crate::config::EditorConfig;
use crate::history::StrokeHistory;
use crate::session::{DrawingSession, SessionResult};
use crate::stroke::Stroke;
use kurbo::Point;

/// Strokes and export mode captured at the moment an export is requested.
///
/// Owns its strokes, so drawing that happens while the source image is
/// still decoding cannot change what gets exported.
#[derive(Debug, Clone, PartialEq)]
pub struct MaskSnapshot {
    pub strokes: Vec<Stroke>,
    pub invert: bool,
}

/// The mask editor for one source image.
#[derive(Debug, Clone, Default)]
pub struct MaskEditor {
    history: StrokeHistory,
    session: DrawingSession,
    /// Current settings.
    pub config: EditorConfig,
}

impl MaskEditor {
    /// Create an editor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an editor with the given settings.
    pub fn with_config(config: EditorConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn history(&self) -> &StrokeHistory {
        &self.history
    }

    pub fn session(&self) -> &DrawingSession {
        &self.session
    }

    pub fn pointer_down(&mut self, position: Point) -> SessionResult<()> {
        self.session.pointer_down(&mut self.history, &self.config, position)
    }

    pub fn pointer_move(&mut self, position: Point) -> SessionResult<()> {
        self.session.pointer_move(&mut self.history, position)
    }

    pub fn pointer_up(&mut self) -> SessionResult<()> {
        self.session.pointer_up(&mut self.history)
    }

    pub fn pointer_leave(&mut self) -> SessionResult<()> {
        self.session.pointer_leave(&mut self.history)
    }

    /// Undo the last stroke. Returns true if anything changed.
    pub fn undo(&mut self) -> bool {
        let moved = self.history.undo();
        if moved {
            log::debug!("Undo, cursor now {:?}", self.history.cursor());
        }
        moved
    }

    /// Redo the next undone stroke. Returns true if anything changed.
    pub fn redo(&mut self) -> bool {
        let moved = self.history.redo();
        if moved {
            log::debug!("Redo, cursor now {:?}", self.history.cursor());
        }
        moved
    }

    /// Clear the mask. Also turns off mask inversion.
    pub fn clear(&mut self) {
        self.history.clear();
        self.config.display.invert = false;
        log::debug!("Mask cleared");
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn active_strokes(&self) -> &[Stroke] {
        self.history.active_strokes()
    }

    /// Capture what an export should render right now.
    pub fn snapshot(&self) -> MaskSnapshot {
        MaskSnapshot {
            strokes: self.history.active_strokes().to_vec(),
            invert: self.config.display.invert,
        }
    }

    /// Discard all strokes and pointer state when a different image is loaded.
    /// Settings are kept.
    pub fn reset_for_new_image(&mut self) {
        self.history = StrokeHistory::new();
        self.session.reset();
        log::debug!("Editor reset for new image");
    }
}
