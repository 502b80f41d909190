//! UI state carried by the controller between frames.

use super::text_input::TextInput;
use crate::types::TaskId;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Default)]
pub enum Focus {
    NewTask,
    Search,
    #[default]
    List,
    EditInput,
}

impl Focus {
    /// Tab order. The edit input is only reachable by starting an edit.
    pub fn next(self) -> Self {
        match self {
            Self::NewTask => Self::Search,
            Self::Search => Self::List,
            Self::List => Self::NewTask,
            Self::EditInput => Self::List,
        }
    }

    pub fn is_text_input(self) -> bool {
        !matches!(self, Self::List)
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum RowMode {
    Viewing,
    Editing,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EditState {
    pub task_id: TaskId,
    pub input: TextInput,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct NoticeDialogState {
    pub title: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum ConfirmDeleteField {
    Delete,
    Cancel,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ConfirmDeleteDialogState {
    pub task_id: TaskId,
    pub title: String,
    pub focused_field: ConfirmDeleteField,
}

#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub enum ActiveDialog {
    #[default]
    None,
    Notice(NoticeDialogState),
    ConfirmDelete(ConfirmDeleteDialogState),
    Help,
}

impl ActiveDialog {
    pub fn notice(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Notice(NoticeDialogState {
            title: title.into(),
            message: message.into(),
        })
    }

    pub fn is_open(&self) -> bool {
        !matches!(self, Self::None)
    }
}
