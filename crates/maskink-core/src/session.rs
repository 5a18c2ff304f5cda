//! Drawing session: turns pointer input into strokes in the history.

use crate::config::EditorConfig;
use crate::history::StrokeHistory;
use crate::stroke::Stroke;
use kurbo::Point;
use thiserror::Error;

/// Pointer events that do not fit the current session state.
///
/// These are reported to the caller and otherwise ignored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Pointer pressed while a stroke is already being drawn")]
    AlreadyDrawing,
    #[error("No stroke is being drawn")]
    NotDrawing,
    #[error("Stroke {0} is no longer the active tail of the history")]
    StrokeDetached(usize),
}

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// State of the drawing session.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SessionState {
    /// Waiting for the pointer to go down.
    #[default]
    Idle,
    /// A stroke is being drawn.
    Active {
        /// History index of the stroke being extended.
        stroke: usize,
        /// Whether the pointer moved since it went down.
        moved: bool,
        /// Last pointer position seen during the stroke.
        last: Point,
    },
}

/// Pointer-driven stroke recorder.
///
/// The stroke enters the history on pointer down and grows in place, so the
/// preview updates as it is drawn and a single undo removes it as a whole.
#[derive(Debug, Clone, Default)]
pub struct DrawingSession {
    state: SessionState,
    /// Pointer position for the brush outline, `None` when off the canvas.
    cursor_position: Option<Point>,
}

impl DrawingSession {
    /// Create a new idle session.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, SessionState::Active { .. })
    }

    pub fn cursor_position(&self) -> Option<Point> {
        self.cursor_position
    }

    /// Begin a stroke with the configured tool and width.
    pub fn pointer_down(
        &mut self,
        history: &mut StrokeHistory,
        config: &EditorConfig,
        position: Point,
    ) -> SessionResult<()> {
        if self.is_drawing() {
            log::warn!("Ignoring pointer down: stroke already in progress");
            return Err(SessionError::AlreadyDrawing);
        }

        let stroke = history.append(Stroke::begin(config.tool, config.stroke_width(), position));
        log::debug!("Began {:?} stroke {} at {:?}", config.tool, stroke, position);

        self.cursor_position = Some(position);
        self.state = SessionState::Active {
            stroke,
            moved: false,
            last: position,
        };
        Ok(())
    }

    /// Track the pointer; extends the current stroke when one is active.
    pub fn pointer_move(
        &mut self,
        history: &mut StrokeHistory,
        position: Point,
    ) -> SessionResult<()> {
        self.cursor_position = Some(position);

        let SessionState::Active { stroke, moved, last } = &mut self.state else {
            return Ok(());
        };

        let Some(tail) = history.tail_mut(*stroke) else {
            log::warn!("Ignoring pointer move: stroke {} left the history", stroke);
            return Err(SessionError::StrokeDetached(*stroke));
        };

        tail.add_point(position);
        *moved = true;
        *last = position;
        Ok(())
    }

    /// Finish the current stroke.
    ///
    /// A tap without movement gets its press position appended again, so the
    /// stroke has two identical points and renders as a dot. The session
    /// always returns to idle, even if the stroke could not be finalized.
    pub fn pointer_up(&mut self, history: &mut StrokeHistory) -> SessionResult<()> {
        let SessionState::Active { stroke, moved, last } = self.state else {
            log::warn!("Ignoring pointer up: no stroke in progress");
            return Err(SessionError::NotDrawing);
        };
        self.state = SessionState::Idle;

        if moved {
            log::debug!("Finished stroke {}", stroke);
            return Ok(());
        }

        match history.tail_mut(stroke) {
            Some(tail) => {
                tail.add_point(last);
                log::debug!("Finished tap stroke {} at {:?}", stroke, last);
                Ok(())
            }
            None => {
                log::warn!("Could not finalize stroke {}: it left the history", stroke);
                Err(SessionError::StrokeDetached(stroke))
            }
        }
    }

    /// The pointer left the canvas: finalize any stroke at the last known
    /// position and hide the brush outline.
    pub fn pointer_leave(&mut self, history: &mut StrokeHistory) -> SessionResult<()> {
        self.cursor_position = None;
        match self.state {
            SessionState::Active { .. } => self.pointer_up(history),
            SessionState::Idle => Ok(()),
        }
    }

    /// Drop any in-progress state without touching the history.
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
        self.cursor_position = None;
    }
}
