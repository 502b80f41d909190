pub mod dialogs;
mod input;
pub mod interaction;
pub mod messages;
pub mod state;
pub mod text_input;
mod update;

use tracing::{debug, error};

use self::interaction::InteractionMap;
pub use self::interaction::{ElementRole, InteractionLayer};
pub use self::messages::Message;
pub use self::state::{
    ActiveDialog, ConfirmDeleteDialogState, ConfirmDeleteField, EditState, Focus,
    NoticeDialogState, RowMode,
};
pub use self::text_input::TextInput;

use crate::drag::{DragState, RowBounds};
use crate::keybindings::Keybindings;
use crate::projection;
use crate::settings::Settings;
use crate::store::{EditOutcome, LoadReport, TaskError, TaskStore};
use crate::theme::Theme;
use crate::types::{StatusFilter, Task, TaskId};

pub struct App {
    pub should_quit: bool,
    pub theme: Theme,
    pub keybindings: Keybindings,
    pub settings: Settings,
    pub store: TaskStore,
    pub filter: StatusFilter,
    pub search: TextInput,
    pub new_task_input: TextInput,
    pub focus: Focus,
    pub selected_index: usize,
    pub scroll_offset: usize,
    pub editing: Option<EditState>,
    pub drag: DragState,
    pub active_dialog: ActiveDialog,
    pub footer_notice: Option<String>,
    pub interaction_map: InteractionMap,
    pub row_bounds: Vec<RowBounds>,
    pub viewport: (u16, u16),
}

impl App {
    pub fn new(settings: Settings, theme: Theme, store: TaskStore) -> Self {
        let keybindings = Keybindings::from_config(&settings.keybindings);
        let filter = settings.initial_filter();
        Self {
            should_quit: false,
            theme,
            keybindings,
            settings,
            store,
            filter,
            search: TextInput::default(),
            new_task_input: TextInput::default(),
            focus: Focus::default(),
            selected_index: 0,
            scroll_offset: 0,
            editing: None,
            drag: DragState::default(),
            active_dialog: ActiveDialog::None,
            footer_notice: None,
            interaction_map: InteractionMap::default(),
            row_bounds: Vec::new(),
            viewport: (0, 0),
        }
    }

    /// Surfaces anything the store had to repair while loading.
    pub fn show_load_report(&mut self, report: &LoadReport) {
        if let Some(message) = report.notice() {
            self.active_dialog = ActiveDialog::notice("Saved tasks", message);
        }
    }

    pub fn visible_tasks(&self) -> Vec<&Task> {
        projection::project(self.store.tasks(), self.filter, self.search.value())
    }

    pub fn visible_ids(&self) -> Vec<TaskId> {
        projection::visible_ids(self.store.tasks(), self.filter, self.search.value())
    }

    /// Rows in the order they are drawn. While a drag is active this is the
    /// gesture's working order rather than the stored one.
    pub fn display_tasks(&self) -> Vec<&Task> {
        match self.drag.gesture() {
            Some(gesture) => gesture
                .order()
                .iter()
                .filter_map(|id| self.store.get(*id))
                .collect(),
            None => self.visible_tasks(),
        }
    }

    pub fn row_mode(&self, id: TaskId) -> RowMode {
        match &self.editing {
            Some(edit) if edit.task_id == id => RowMode::Editing,
            _ => RowMode::Viewing,
        }
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.visible_ids().get(self.selected_index).copied()
    }

    pub fn completed_count(&self) -> usize {
        self.store.tasks().iter().filter(|task| task.done).count()
    }

    /// Called once per drawn frame.
    pub fn note_frame_rendered(&mut self) {
        if let Some(gesture) = self.drag.gesture_mut() {
            gesture.note_frame_rendered();
        }
    }

    pub(crate) fn select_id(&mut self, id: TaskId) {
        if let Some(index) = self.visible_ids().iter().position(|visible| *visible == id) {
            self.selected_index = index;
        }
        self.clamp_selection();
    }

    pub(crate) fn clamp_selection(&mut self) {
        let len = self.visible_ids().len();
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
    }

    /// Moves focus, committing a pending edit when focus leaves its input.
    /// A rejected commit keeps the edit input focused.
    pub(crate) fn set_focus(&mut self, next: Focus) {
        if next == self.focus {
            return;
        }
        if next == Focus::EditInput && self.editing.is_none() {
            return;
        }
        if self.focus == Focus::EditInput {
            self.commit_edit();
            if self.editing.is_some() {
                return;
            }
        }
        self.focus = next;
    }

    pub(crate) fn focused_input_mut(&mut self) -> Option<&mut TextInput> {
        match self.focus {
            Focus::NewTask => Some(&mut self.new_task_input),
            Focus::Search => Some(&mut self.search),
            Focus::EditInput => self.editing.as_mut().map(|edit| &mut edit.input),
            Focus::List => None,
        }
    }

    pub(crate) fn add_task(&mut self) {
        match self.store.add(self.new_task_input.value()) {
            Ok(id) => {
                self.new_task_input.clear();
                self.footer_notice = Some("Task added".to_string());
                self.select_id(id);
            }
            Err(err) => self.report_task_error(&err),
        }
    }

    pub(crate) fn toggle_task(&mut self, id: TaskId) {
        match self.store.toggle(id) {
            Ok(true) => self.clamp_selection(),
            Ok(false) => debug!(id, "toggle ignored, no such task"),
            Err(err) => self.report_task_error(&err),
        }
    }

    pub(crate) fn start_edit(&mut self, id: TaskId) {
        if self.store.get(id).is_none() {
            return;
        }
        if let Some(edit) = &self.editing {
            if edit.task_id == id {
                self.focus = Focus::EditInput;
                return;
            }
            self.commit_edit();
            if self.editing.is_some() {
                return;
            }
        }

        let Some(task) = self.store.get(id) else {
            return;
        };
        self.editing = Some(EditState {
            task_id: id,
            input: TextInput::with_value(task.title.clone()),
        });
        self.focus = Focus::EditInput;
        self.select_id(id);
    }

    /// Applies the pending edit. Safe to call from every blur path; without an
    /// active edit it does nothing.
    pub(crate) fn commit_edit(&mut self) {
        let Some(edit) = &self.editing else {
            return;
        };
        let id = edit.task_id;
        let raw = edit.input.value().to_string();

        match self.store.edit(id, &raw) {
            Ok(outcome) => {
                if outcome == EditOutcome::Renamed {
                    self.footer_notice = Some("Task renamed".to_string());
                }
                self.end_edit();
                self.select_id(id);
            }
            Err(err) => {
                self.focus = Focus::EditInput;
                self.report_task_error(&err);
            }
        }
    }

    pub(crate) fn end_edit(&mut self) {
        self.editing = None;
        if self.focus == Focus::EditInput {
            self.focus = Focus::List;
        }
    }

    pub(crate) fn request_delete(&mut self, id: TaskId) {
        let Some(task) = self.store.get(id) else {
            return;
        };
        if self.settings.confirm_delete {
            self.active_dialog = ActiveDialog::ConfirmDelete(ConfirmDeleteDialogState {
                task_id: id,
                title: task.title.clone(),
                focused_field: ConfirmDeleteField::Delete,
            });
        } else {
            self.delete_task(id);
        }
    }

    pub(crate) fn delete_task(&mut self, id: TaskId) {
        if self.row_mode(id) == RowMode::Editing {
            self.end_edit();
        }
        match self.store.delete(id) {
            Ok(true) => {
                self.footer_notice = Some("Task deleted".to_string());
                self.clamp_selection();
            }
            Ok(false) => debug!(id, "delete ignored, no such task"),
            Err(err) => self.report_task_error(&err),
        }
    }

    /// Swaps the selected row with its visible neighbour.
    pub(crate) fn move_selected(&mut self, delta: isize) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        let mut order = self.visible_ids();
        let from = self.selected_index;
        let Some(to) = from.checked_add_signed(delta).filter(|to| *to < order.len()) else {
            return;
        };
        order.swap(from, to);
        self.apply_reorder(&order);
        self.select_id(id);
    }

    pub(crate) fn apply_reorder(&mut self, order: &[TaskId]) {
        match self.store.reorder(order) {
            Ok(changed) => debug!(changed, "applied reorder"),
            Err(err) => self.report_task_error(&err),
        }
    }

    pub(crate) fn cancel_drag(&mut self) {
        if !self.drag.is_idle() {
            debug!("drag cancelled");
        }
        self.drag = DragState::Idle;
    }

    fn report_task_error(&mut self, err: &TaskError) {
        let title = if err.is_validation() {
            debug!("rejected task change: {err}");
            "Cannot save task"
        } else {
            error!("task storage failed: {err}");
            "Storage error"
        };
        self.active_dialog = ActiveDialog::notice(title, err.to_string());
    }
}
