//! Truncating undo/redo log of mask strokes.

use crate::stroke::Stroke;

/// Ordered stroke log with a cursor marking the last active stroke.
///
/// Strokes past the cursor are kept for redo but never rendered. Appending
/// while strokes are undone drops them: linear undo, not a tree.
#[derive(Debug, Clone, Default)]
pub struct StrokeHistory {
    strokes: Vec<Stroke>,
    /// Number of active strokes (cursor + 1).
    active: usize,
}

impl StrokeHistory {
    /// Create a new empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stroke, discarding any undone strokes first.
    /// Returns the index of the new stroke.
    pub fn append(&mut self, stroke: Stroke) -> usize {
        let discarded = self.strokes.len() - self.active;
        if discarded > 0 {
            log::debug!("Discarding {} undone strokes", discarded);
        }
        self.strokes.truncate(self.active);
        self.strokes.push(stroke);
        self.active = self.strokes.len();
        self.active - 1
    }

    /// Undo the last active stroke.
    /// Returns true if the cursor moved, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        if self.active == 0 {
            return false;
        }
        self.active -= 1;
        true
    }

    /// Redo the next undone stroke.
    /// Returns true if the cursor moved, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        if self.active == self.strokes.len() {
            return false;
        }
        self.active += 1;
        true
    }

    /// Remove every stroke, active or undone.
    pub fn clear(&mut self) {
        self.strokes.clear();
        self.active = 0;
    }

    /// Strokes that contribute to the mask, in drawing order.
    pub fn active_strokes(&self) -> &[Stroke] {
        &self.strokes[..self.active]
    }

    /// All recorded strokes, including undone ones.
    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// Index of the last active stroke, `None` when nothing is active.
    pub fn cursor(&self) -> Option<usize> {
        self.active.checked_sub(1)
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        self.active > 0
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        self.active < self.strokes.len()
    }

    pub fn len(&self) -> usize {
        self.strokes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strokes.is_empty()
    }

    /// Mutable access to the stroke at `index`, only while it is both the
    /// newest stroke and the active tail.
    pub(crate) fn tail_mut(&mut self, index: usize) -> Option<&mut Stroke> {
        if self.cursor() == Some(index) && index + 1 == self.strokes.len() {
            self.strokes.get_mut(index)
        } else {
            None
        }
    }
}
