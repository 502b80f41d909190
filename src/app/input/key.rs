use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::dialogs;
use crate::app::{ActiveDialog, App, Focus, Message};
use crate::keybindings::{KeyAction, KeyContext};
use crate::types::StatusFilter;

impl App {
    pub(crate) fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if key.kind == KeyEventKind::Release {
            return Ok(());
        }

        if self.keybindings.action_for_key(KeyContext::Global, key) == Some(KeyAction::ForceQuit) {
            return self.update(Message::Quit);
        }

        if self.active_dialog.is_open() {
            if let ActiveDialog::Help = self.active_dialog
                && self.keybindings.action_for_key(KeyContext::List, key)
                    == Some(KeyAction::ToggleHelp)
            {
                self.active_dialog = ActiveDialog::None;
                return Ok(());
            }
            if let Some(follow_up) = dialogs::handle_dialog_key(&mut self.active_dialog, key) {
                self.update(follow_up)?;
            }
            return Ok(());
        }

        if !self.drag.is_idle() {
            if key.code == KeyCode::Esc {
                self.cancel_drag();
            }
            return Ok(());
        }

        if self.keybindings.action_for_key(KeyContext::Global, key) == Some(KeyAction::CycleFocus) {
            return self.update(Message::Focus(self.focus.next()));
        }

        if self.focus.is_text_input() {
            return self.handle_text_input_key(key);
        }

        let Some(action) = self.keybindings.action_for_key(KeyContext::List, key) else {
            return Ok(());
        };
        let selected = self.selected_task_id();
        let follow_up = match action {
            KeyAction::Quit => Some(Message::Quit),
            KeyAction::ToggleHelp => Some(Message::ToggleHelp),
            KeyAction::FocusNewTask => Some(Message::Focus(Focus::NewTask)),
            KeyAction::FocusSearch => Some(Message::Focus(Focus::Search)),
            KeyAction::SelectUp => Some(Message::SelectUp),
            KeyAction::SelectDown => Some(Message::SelectDown),
            KeyAction::ToggleDone => selected.map(Message::ToggleTask),
            KeyAction::EditTask => selected.map(Message::StartEdit),
            KeyAction::DeleteTask => selected.map(Message::RequestDelete),
            KeyAction::MoveTaskUp => Some(Message::MoveTaskUp),
            KeyAction::MoveTaskDown => Some(Message::MoveTaskDown),
            KeyAction::FilterAll => Some(Message::SetFilter(StatusFilter::All)),
            KeyAction::FilterCompleted => Some(Message::SetFilter(StatusFilter::Completed)),
            KeyAction::FilterUncompleted => Some(Message::SetFilter(StatusFilter::Uncompleted)),
            KeyAction::CycleFilter => Some(Message::CycleFilter),
            KeyAction::ClearSearch => Some(Message::ClearSearch),
            KeyAction::ForceQuit | KeyAction::CycleFocus => None,
        };

        if let Some(follow_up) = follow_up {
            self.update(follow_up)?;
        }
        Ok(())
    }

    fn handle_text_input_key(&mut self, key: KeyEvent) -> Result<()> {
        match (self.focus, key.code) {
            (Focus::NewTask, KeyCode::Enter) => return self.update(Message::SubmitNewTask),
            (Focus::EditInput, KeyCode::Enter) => return self.update(Message::CommitEdit),
            (Focus::EditInput, KeyCode::Esc) => return self.update(Message::CancelEdit),
            (Focus::NewTask | Focus::Search, KeyCode::Enter | KeyCode::Esc) => {
                return self.update(Message::Focus(Focus::List));
            }
            _ => {}
        }

        let searching = self.focus == Focus::Search;
        let changed = self
            .focused_input_mut()
            .is_some_and(|input| input.handle_key(key));
        if changed && searching {
            self.selected_index = 0;
            self.clamp_selection();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyModifiers;

    use crate::app::{ActiveDialog, App, Focus, Message, RowMode};
    use crate::settings::Settings;
    use crate::storage::MemoryStorage;
    use crate::store::TaskStore;
    use crate::theme::Theme;
    use crate::types::StatusFilter;

    use super::*;

    fn test_app() -> App {
        let (store, _) =
            TaskStore::load(Box::new(MemoryStorage::new())).expect("memory store should load");
        App::new(Settings::default(), Theme::default(), store)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.update(Message::Key(KeyEvent::new(code, KeyModifiers::empty())))
            .expect("key should be handled");
    }

    fn type_str(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    #[test]
    fn add_task_from_keyboard() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        assert_eq!(app.focus, Focus::NewTask);

        type_str(&mut app, "Buy milk");
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.store.len(), 1);
        assert!(app.new_task_input.is_empty());
        assert_eq!(app.focus, Focus::NewTask);
    }

    #[test]
    fn list_keys_are_text_inside_inputs() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('/'));
        type_str(&mut app, "q2");
        assert_eq!(app.search.value(), "q2");
        assert!(!app.should_quit);
        assert_eq!(app.filter, StatusFilter::All);
    }

    #[test]
    fn edit_with_enter_and_cancel_with_esc() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "Draft");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.focus, Focus::List);

        press(&mut app, KeyCode::Char('e'));
        let id = app.selected_task_id().expect("task should be selected");
        assert_eq!(app.row_mode(id), RowMode::Editing);
        type_str(&mut app, "!");
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.store.tasks()[0].title, "Draft");

        press(&mut app, KeyCode::Enter);
        type_str(&mut app, " done");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.tasks()[0].title, "Draft done");
        assert_eq!(app.focus, Focus::List);
    }

    #[test]
    fn filter_keys_and_help_toggle() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.filter, StatusFilter::Completed);
        press(&mut app, KeyCode::Char('f'));
        assert_eq!(app.filter, StatusFilter::Uncompleted);

        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.active_dialog, ActiveDialog::Help);
        press(&mut app, KeyCode::Char('2'));
        assert_eq!(app.filter, StatusFilter::Uncompleted);
        press(&mut app, KeyCode::Char('?'));
        assert_eq!(app.active_dialog, ActiveDialog::None);
    }

    #[test]
    fn ctrl_c_quits_even_while_typing() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        app.update(Message::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )))
        .expect("key should be handled");
        assert!(app.should_quit);
    }

    #[test]
    fn tab_from_edit_input_commits() {
        let mut app = test_app();
        press(&mut app, KeyCode::Char('a'));
        type_str(&mut app, "Draft");
        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('e'));
        type_str(&mut app, "2");
        press(&mut app, KeyCode::Tab);

        assert_eq!(app.store.tasks()[0].title, "Draft2");
        assert_eq!(app.focus, Focus::List);
        assert!(app.editing.is_none());
    }
}
