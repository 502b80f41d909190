//! Key handling while a modal dialog is open. Dialogs swallow every key; the
//! returned message, if any, is applied by the controller.

use crossterm::event::{KeyCode, KeyEvent};

use super::messages::Message;
use super::state::{ActiveDialog, ConfirmDeleteDialogState, ConfirmDeleteField};

pub fn handle_dialog_key(dialog: &mut ActiveDialog, key: KeyEvent) -> Option<Message> {
    match dialog {
        ActiveDialog::None => None,
        ActiveDialog::Notice(_) => match key.code {
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') => Some(Message::DismissDialog),
            _ => None,
        },
        ActiveDialog::ConfirmDelete(state) => handle_confirm_delete_key(state, key),
        ActiveDialog::Help => match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => Some(Message::DismissDialog),
            _ => None,
        },
    }
}

fn handle_confirm_delete_key(
    state: &mut ConfirmDeleteDialogState,
    key: KeyEvent,
) -> Option<Message> {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Some(Message::ConfirmDelete),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(Message::DismissDialog),
        KeyCode::Left
        | KeyCode::Right
        | KeyCode::Tab
        | KeyCode::BackTab
        | KeyCode::Char('h')
        | KeyCode::Char('l') => {
            state.focused_field = match state.focused_field {
                ConfirmDeleteField::Delete => ConfirmDeleteField::Cancel,
                ConfirmDeleteField::Cancel => ConfirmDeleteField::Delete,
            };
            None
        }
        KeyCode::Enter => match state.focused_field {
            ConfirmDeleteField::Delete => Some(Message::ConfirmDelete),
            ConfirmDeleteField::Cancel => Some(Message::DismissDialog),
        },
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn confirm_dialog() -> ActiveDialog {
        ActiveDialog::ConfirmDelete(ConfirmDeleteDialogState {
            task_id: 1,
            title: "Buy milk".to_string(),
            focused_field: ConfirmDeleteField::Delete,
        })
    }

    #[test]
    fn notice_closes_on_enter_and_ignores_other_keys() {
        let mut dialog = ActiveDialog::notice("Cannot save task", "Task title cannot be empty.");
        assert_eq!(handle_dialog_key(&mut dialog, key(KeyCode::Char('x'))), None);
        assert_eq!(
            handle_dialog_key(&mut dialog, key(KeyCode::Enter)),
            Some(Message::DismissDialog)
        );
    }

    #[test]
    fn confirm_delete_shortcuts() {
        let mut dialog = confirm_dialog();
        assert_eq!(
            handle_dialog_key(&mut dialog, key(KeyCode::Char('y'))),
            Some(Message::ConfirmDelete)
        );
        assert_eq!(
            handle_dialog_key(&mut dialog, key(KeyCode::Esc)),
            Some(Message::DismissDialog)
        );
    }

    #[test]
    fn enter_follows_focused_button() {
        let mut dialog = confirm_dialog();
        assert_eq!(
            handle_dialog_key(&mut dialog, key(KeyCode::Enter)),
            Some(Message::ConfirmDelete)
        );

        assert_eq!(handle_dialog_key(&mut dialog, key(KeyCode::Tab)), None);
        let ActiveDialog::ConfirmDelete(state) = &dialog else {
            panic!("dialog should stay open");
        };
        assert_eq!(state.focused_field, ConfirmDeleteField::Cancel);
        assert_eq!(
            handle_dialog_key(&mut dialog, key(KeyCode::Enter)),
            Some(Message::DismissDialog)
        );
    }
}
