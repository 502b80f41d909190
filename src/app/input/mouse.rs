use anyhow::Result;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use tracing::debug;

use crate::app::{App, ElementRole, Focus, InteractionLayer, Message};
use crate::drag::{DragGesture, DragState};

impl App {
    pub(crate) fn handle_mouse(&mut self, mouse: MouseEvent) -> Result<()> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.handle_left_down(mouse)?,
            MouseEventKind::Drag(MouseButton::Left) => self.handle_left_drag(mouse),
            MouseEventKind::Up(MouseButton::Left) => self.handle_left_up(),
            MouseEventKind::ScrollDown if !self.active_dialog.is_open() => {
                self.update(Message::SelectDown)?;
            }
            MouseEventKind::ScrollUp if !self.active_dialog.is_open() => {
                self.update(Message::SelectUp)?;
            }
            _ => {}
        }

        Ok(())
    }

    fn handle_left_down(&mut self, mouse: MouseEvent) -> Result<()> {
        self.drag = DragState::Idle;

        let node = self
            .interaction_map
            .resolve_node(mouse.column, mouse.row)
            .cloned();

        if self.active_dialog.is_open() {
            if let Some(node) = node.filter(|node| node.layer == InteractionLayer::Dialog) {
                self.update(node.message)?;
            }
            return Ok(());
        }

        let Some(node) = node else {
            if self.focus.is_text_input() {
                self.set_focus(Focus::List);
            }
            return Ok(());
        };

        // Clicking anything other than the focused input blurs it first, so a
        // pending edit commits before the click takes effect.
        if self.focus.is_text_input() && node.message != Message::Focus(self.focus) {
            self.set_focus(Focus::List);
            if self.focus == Focus::EditInput || self.active_dialog.is_open() {
                return Ok(());
            }
        }

        match (node.role, node.message) {
            (ElementRole::TaskRow, Message::SelectTask(id)) => {
                self.update(Message::SelectTask(id))?;
                if self.editing.is_none() && !self.active_dialog.is_open() {
                    self.drag = DragState::Pressed { id };
                }
            }
            (_, message) => self.update(message)?,
        }
        Ok(())
    }

    fn handle_left_drag(&mut self, mouse: MouseEvent) {
        let pointer_y = f64::from(mouse.row);
        if let DragState::Pressed { id } = self.drag {
            let order = self.visible_ids();
            if !order.contains(&id) {
                self.drag = DragState::Idle;
                return;
            }
            debug!(id, "drag started");
            let mut gesture = DragGesture::new(id, order);
            gesture.reposition(&self.row_bounds, pointer_y);
            self.drag = DragState::Dragging(gesture);
        } else if let DragState::Dragging(gesture) = &mut self.drag {
            gesture.reposition(&self.row_bounds, pointer_y);
        }
    }

    fn handle_left_up(&mut self) {
        if let DragState::Dragging(gesture) = std::mem::take(&mut self.drag) {
            let dragged = gesture.dragged();
            let order = gesture.finish();
            debug!(dragged, "drag finished");
            self.apply_reorder(&order);
            self.select_id(dragged);
        }
    }
}
