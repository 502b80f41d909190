//! Mouse drag reordering over the rendered task rows.

use crate::types::TaskId;

/// Vertical extent of one rendered row, captured by the renderer each frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowBounds {
    pub id: TaskId,
    pub top: f64,
    pub height: f64,
}

impl RowBounds {
    pub fn new(id: TaskId, top: u16, height: u16) -> Self {
        Self {
            id,
            top: f64::from(top),
            height: f64::from(height),
        }
    }

    pub fn midpoint(&self) -> f64 {
        self.top + self.height / 2.0
    }
}

/// Row the dragged record should land in front of, or `None` when the
/// pointer is below every candidate.
///
/// Picks the row whose midpoint is below `pointer_y` with the offset closest
/// to zero. Equal offsets keep the earliest row.
pub fn drag_after_id(rows: &[RowBounds], dragged: TaskId, pointer_y: f64) -> Option<TaskId> {
    let mut closest: Option<(f64, TaskId)> = None;
    for row in rows.iter().filter(|row| row.id != dragged) {
        let offset = pointer_y - row.midpoint();
        let improves = match closest {
            None => true,
            Some((best, _)) => offset > best,
        };
        if offset < 0.0 && improves {
            closest = Some((offset, row.id));
        }
    }
    closest.map(|(_, id)| id)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DragGesture {
    dragged: TaskId,
    order: Vec<TaskId>,
    frames_rendered: u8,
}

impl DragGesture {
    pub fn new(dragged: TaskId, visible_order: Vec<TaskId>) -> Self {
        Self {
            dragged,
            order: visible_order,
            frames_rendered: 0,
        }
    }

    pub fn dragged(&self) -> TaskId {
        self.dragged
    }

    pub fn order(&self) -> &[TaskId] {
        &self.order
    }

    /// The dragging marker shows only after the capture frame has been drawn.
    pub fn is_marked(&self) -> bool {
        self.frames_rendered > 0
    }

    pub fn note_frame_rendered(&mut self) {
        self.frames_rendered = self.frames_rendered.saturating_add(1);
    }

    /// Moves the dragged record to where the pointer sits. Returns whether the
    /// visual order changed.
    pub fn reposition(&mut self, rows: &[RowBounds], pointer_y: f64) -> bool {
        let Some(from) = self.order.iter().position(|id| *id == self.dragged) else {
            return false;
        };

        let before = self.order.clone();
        let target = drag_after_id(rows, self.dragged, pointer_y);
        self.order.remove(from);

        let insert_at = match target {
            Some(anchor) => self.order.iter().position(|id| *id == anchor),
            None => rows
                .iter()
                .rev()
                .find(|row| row.id != self.dragged)
                .and_then(|last| self.order.iter().position(|id| *id == last.id))
                .map(|index| index + 1),
        }
        .unwrap_or(self.order.len());

        self.order.insert(insert_at, self.dragged);
        self.order != before
    }

    pub fn finish(self) -> Vec<TaskId> {
        self.order
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Pressed {
        id: TaskId,
    },
    Dragging(DragGesture),
}

impl DragState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn gesture(&self) -> Option<&DragGesture> {
        match self {
            Self::Dragging(gesture) => Some(gesture),
            _ => None,
        }
    }

    pub fn gesture_mut(&mut self) -> Option<&mut DragGesture> {
        match self {
            Self::Dragging(gesture) => Some(gesture),
            _ => None,
        }
    }

    pub fn dragged_id(&self) -> Option<TaskId> {
        self.gesture().map(DragGesture::dragged)
    }

    pub fn marked_id(&self) -> Option<TaskId> {
        self.gesture()
            .filter(|gesture| gesture.is_marked())
            .map(DragGesture::dragged)
    }
}
