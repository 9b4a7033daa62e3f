use crate::cache::LoadState;
use crate::classify;
use crate::form::{Submission, TaskForm};
use crate::repository::TaskRepository;
use crate::storage::LocalStorage;
use crate::sync::TaskSync;
use crate::task::Task;
use chrono::Duration;
use tracing::info;

pub const COLUMNS: [&str; 2] = ["Incomplete", "Completed"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    None,
    Detail(u32),
    Form(TaskForm),
}

/// Screen state: the synced task list plus selection and the open dialog.
pub struct TodoBoard<R, S> {
    pub sync: TaskSync<R, S>,
    pub selected_column: usize,
    pub selected_task: usize,
    pub dialog: Dialog,
    pub message: Option<String>,
    pub deadline_window: Duration,
}

impl<R: TaskRepository, S: LocalStorage> TodoBoard<R, S> {
    pub fn new(sync: TaskSync<R, S>, deadline_window: Duration) -> Self {
        Self {
            sync,
            selected_column: 0,
            selected_task: 0,
            dialog: Dialog::None,
            message: None,
            deadline_window,
        }
    }

    pub fn load(&mut self) {
        if let Err(err) = self.sync.load() {
            self.message = Some(err.to_string());
        }
        self.clamp_selection();
    }

    pub fn refresh(&mut self) {
        match self.sync.refresh() {
            Ok(()) => {
                self.message = None;
                self.clamp_selection();
            }
            Err(err) => self.message = Some(err.to_string()),
        }
    }

    pub fn column(&self, index: usize) -> Vec<&Task> {
        let (open, done) = classify::partition(self.sync.tasks());
        if index == 0 {
            open
        } else {
            done
        }
    }

    /// The highlighted task. `None` while the list is hidden behind a load error.
    pub fn selected(&self) -> Option<&Task> {
        if matches!(self.sync.state(), LoadState::Failed(_)) {
            return None;
        }
        self.column(self.selected_column)
            .get(self.selected_task)
            .copied()
    }

    pub fn move_column(&mut self, direction: isize) {
        let next = (self.selected_column as isize + direction).clamp(0, COLUMNS.len() as isize - 1);
        self.selected_column = next as usize;
        self.clamp_selection();
    }

    pub fn move_selection(&mut self, direction: isize) {
        let len = self.column(self.selected_column).len();
        if len == 0 {
            self.selected_task = 0;
            return;
        }
        let next = (self.selected_task as isize + direction).clamp(0, len as isize - 1);
        self.selected_task = next as usize;
    }

    fn clamp_selection(&mut self) {
        let len = self.column(self.selected_column).len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }

    pub fn toggle_selected(&mut self) {
        let Some(id) = self.selected().map(|t| t.id) else {
            return;
        };
        match self.sync.toggle(id) {
            Ok(task) => {
                info!(id, status = %task.status, "toggled task");
                self.message = None;
            }
            Err(err) => self.message = Some(err.to_string()),
        }
        self.clamp_selection();
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected().map(|t| t.id) else {
            return;
        };
        match self.sync.delete(id) {
            Ok(_) => {
                info!(id, "deleted task");
                self.message = None;
            }
            Err(err) => self.message = Some(err.to_string()),
        }
        self.clamp_selection();
    }

    pub fn open_add(&mut self) {
        self.dialog = Dialog::Form(TaskForm::add());
    }

    pub fn open_edit(&mut self) {
        let id = match &self.dialog {
            Dialog::Detail(id) => Some(*id),
            _ => self.selected().map(|t| t.id),
        };
        let form = id
            .and_then(|id| self.sync.cache().get(id))
            .map(TaskForm::edit);
        if let Some(form) = form {
            self.dialog = Dialog::Form(form);
        }
    }

    pub fn open_detail(&mut self) {
        if let Some(id) = self.selected().map(|t| t.id) {
            self.dialog = Dialog::Detail(id);
        }
    }

    pub fn close_dialog(&mut self) {
        self.dialog = Dialog::None;
    }

    pub fn form_mut(&mut self) -> Option<&mut TaskForm> {
        match &mut self.dialog {
            Dialog::Form(form) => Some(form),
            _ => None,
        }
    }

    /// Validates and sends the open form. The form stays open on any error.
    pub fn submit_form(&mut self) -> bool {
        let Dialog::Form(form) = &mut self.dialog else {
            return false;
        };
        let submission = match form.validate() {
            Ok(submission) => submission,
            Err(err) => {
                form.error = Some(err.to_string());
                return false;
            }
        };
        let result = match submission {
            Submission::Create(draft) => self.sync.create(draft),
            Submission::Update(id, patch) => self.sync.update(id, patch),
        };
        match result {
            Ok(task) => {
                info!(id = task.id, "saved task");
                self.dialog = Dialog::None;
                self.message = None;
                self.clamp_selection();
                true
            }
            Err(err) => {
                if let Some(form) = self.form_mut() {
                    form.error = Some(err.to_string());
                }
                false
            }
        }
    }
}
