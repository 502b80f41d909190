use anyhow::Result;
use crossterm::event::{MouseEvent, MouseEventKind};
use tracing::debug;

use super::{ActiveDialog, App, Focus, Message};
use crate::drag::DragState;

impl App {
    pub fn update(&mut self, message: Message) -> Result<()> {
        // A notice lasts until the next key press or click.
        if matches!(
            message,
            Message::Key(_)
                | Message::Mouse(MouseEvent {
                    kind: MouseEventKind::Down(_),
                    ..
                })
        ) {
            self.footer_notice = None;
        }

        match message {
            Message::Key(key) => self.handle_key(key)?,
            Message::Mouse(mouse) => self.handle_mouse(mouse)?,
            Message::Paste(text) => {
                let searching = self.focus == Focus::Search;
                if let Some(input) = self.focused_input_mut() {
                    input.insert_str(&text);
                }
                if searching {
                    self.selected_index = 0;
                    self.clamp_selection();
                }
            }
            Message::FocusLost => {
                self.cancel_drag();
                if self.focus == Focus::EditInput {
                    self.commit_edit();
                }
            }
            Message::Tick => {}
            Message::Resize(w, h) => {
                self.viewport = (w, h);
                self.interaction_map.clear();
                self.row_bounds.clear();
            }
            Message::Focus(focus) => self.set_focus(focus),
            Message::SubmitNewTask => self.add_task(),
            Message::SetFilter(filter) => {
                debug!(filter = filter.as_str(), "filter changed");
                self.filter = filter;
                self.clamp_selection();
            }
            Message::CycleFilter => {
                self.filter = self.filter.next();
                self.clamp_selection();
            }
            Message::ClearSearch => {
                self.search.clear();
                self.clamp_selection();
            }
            Message::SelectTask(id) => {
                self.set_focus(Focus::List);
                self.select_id(id);
            }
            Message::SelectUp => {
                self.selected_index = self.selected_index.saturating_sub(1);
            }
            Message::SelectDown => {
                self.selected_index = self.selected_index.saturating_add(1);
                self.clamp_selection();
            }
            Message::ToggleTask(id) => self.toggle_task(id),
            Message::StartEdit(id) => self.start_edit(id),
            Message::CommitEdit => self.commit_edit(),
            Message::CancelEdit => self.end_edit(),
            Message::RequestDelete(id) => self.request_delete(id),
            Message::ConfirmDelete => {
                let dialog = std::mem::take(&mut self.active_dialog);
                if let ActiveDialog::ConfirmDelete(state) = dialog {
                    self.delete_task(state.task_id);
                }
            }
            Message::MoveTaskUp => self.move_selected(-1),
            Message::MoveTaskDown => self.move_selected(1),
            Message::DismissDialog => {
                self.active_dialog = ActiveDialog::None;
            }
            Message::ToggleHelp => {
                self.active_dialog = match self.active_dialog {
                    ActiveDialog::Help => ActiveDialog::None,
                    _ => ActiveDialog::Help,
                };
            }
            Message::Quit => {
                self.commit_edit();
                self.drag = DragState::Idle;
                self.should_quit = true;
            }
        }

        Ok(())
    }
}
