use crossterm::event::{KeyEvent, MouseEvent};

use super::state::Focus;
use crate::types::{StatusFilter, TaskId};

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Message {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Paste(String),
    FocusLost,
    Tick,
    Resize(u16, u16),
    Focus(Focus),
    SubmitNewTask,
    SetFilter(StatusFilter),
    CycleFilter,
    ClearSearch,
    SelectTask(TaskId),
    SelectUp,
    SelectDown,
    ToggleTask(TaskId),
    StartEdit(TaskId),
    CommitEdit,
    CancelEdit,
    RequestDelete(TaskId),
    ConfirmDelete,
    MoveTaskUp,
    MoveTaskDown,
    DismissDialog,
    ToggleHelp,
    Quit,
}
