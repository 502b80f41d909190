//! Ordered task records mirrored to a single storage slot.
//!
//! Every mutation builds the next sequence, writes it in full, and only then
//! swaps it in, so a failed write never leaves a half-applied change behind.

use std::collections::HashSet;

use anyhow::Context;
use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::storage::KeyValueStorage;
use crate::types::{Task, TaskId, title_key};

pub const STORAGE_KEY: &str = "todos";
pub const CORRUPT_BACKUP_KEY: &str = "todos.corrupt";

#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task title cannot be empty.")]
    EmptyTitle,
    #[error("A task titled \"{0}\" already exists.")]
    DuplicateTitle(String),
    #[error("No task id is left to assign.")]
    IdsExhausted,
    #[error("failed to save tasks: {0:#}")]
    Storage(anyhow::Error),
}

impl TaskError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::EmptyTitle | Self::DuplicateTitle(_) | Self::IdsExhausted
        )
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum EditOutcome {
    Renamed,
    Unchanged,
    Missing,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct LoadReport {
    pub recovered_corrupt: bool,
    pub dropped_records: usize,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        !self.recovered_corrupt && self.dropped_records == 0
    }

    pub fn notice(&self) -> Option<String> {
        if self.recovered_corrupt {
            return Some(format!(
                "Saved tasks could not be read and were moved to the '{CORRUPT_BACKUP_KEY}' slot. Starting with an empty list."
            ));
        }
        if self.dropped_records > 0 {
            return Some(format!(
                "{} saved task(s) had an empty or duplicate title or id and were skipped.",
                self.dropped_records
            ));
        }
        None
    }
}

pub struct TaskStore {
    tasks: Vec<Task>,
    storage: Box<dyn KeyValueStorage>,
}

impl TaskStore {
    pub fn load(storage: Box<dyn KeyValueStorage>) -> anyhow::Result<(Self, LoadReport)> {
        let mut storage = storage;
        let mut report = LoadReport::default();

        let raw = storage
            .get_item(STORAGE_KEY)
            .context("failed to read stored tasks")?;

        let tasks = match raw {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<Task>>(&raw) {
                Ok(records) => {
                    let (tasks, dropped) = sanitize(records);
                    report.dropped_records = dropped;
                    tasks
                }
                Err(err) => {
                    warn!("stored tasks are malformed, resetting to empty list: {err}");
                    storage
                        .set_item(CORRUPT_BACKUP_KEY, &raw)
                        .context("failed to back up malformed tasks")?;
                    report.recovered_corrupt = true;
                    Vec::new()
                }
            },
        };

        info!(count = tasks.len(), "loaded tasks");
        Ok((Self { tasks, storage }, report))
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn storage(&self) -> &dyn KeyValueStorage {
        self.storage.as_ref()
    }

    pub fn add(&mut self, raw_title: &str) -> Result<TaskId, TaskError> {
        self.add_at(raw_title, Utc::now().timestamp_millis())
    }

    fn add_at(&mut self, raw_title: &str, now_ms: i64) -> Result<TaskId, TaskError> {
        let title = raw_title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        if self.title_taken(title, None) {
            return Err(TaskError::DuplicateTitle(title.to_string()));
        }

        let id = self.next_id(now_ms).ok_or(TaskError::IdsExhausted)?;
        let mut next = Vec::with_capacity(self.tasks.len() + 1);
        next.push(Task::new(id, title));
        next.extend(self.tasks.iter().cloned());
        self.commit(next)?;

        debug!(id, "added task");
        Ok(id)
    }

    /// Returns `false` when no record has `id`.
    pub fn delete(&mut self, id: TaskId) -> Result<bool, TaskError> {
        if self.get(id).is_none() {
            return Ok(false);
        }
        let next = self
            .tasks
            .iter()
            .filter(|task| task.id != id)
            .cloned()
            .collect();
        self.commit(next)?;
        debug!(id, "deleted task");
        Ok(true)
    }

    pub fn toggle(&mut self, id: TaskId) -> Result<bool, TaskError> {
        let Some(index) = self.index_of(id) else {
            return Ok(false);
        };
        let mut next = self.tasks.clone();
        next[index].done = !next[index].done;
        self.commit(next)?;
        Ok(true)
    }

    pub fn edit(&mut self, id: TaskId, raw_title: &str) -> Result<EditOutcome, TaskError> {
        let Some(index) = self.index_of(id) else {
            return Ok(EditOutcome::Missing);
        };

        let title = raw_title.trim();
        if title.is_empty() || self.tasks[index].has_title(title) {
            return Ok(EditOutcome::Unchanged);
        }
        if self.title_taken(title, Some(id)) {
            return Err(TaskError::DuplicateTitle(title.to_string()));
        }

        let mut next = self.tasks.clone();
        next[index].title = title.to_string();
        self.commit(next)?;
        debug!(id, "renamed task");
        Ok(EditOutcome::Renamed)
    }

    /// Rewrites the slots currently held by the records named in `visible_order`
    /// so they appear in that order. Records not named keep their positions.
    pub fn reorder(&mut self, visible_order: &[TaskId]) -> Result<bool, TaskError> {
        let mut seen = HashSet::new();
        let ordered: Vec<TaskId> = visible_order
            .iter()
            .copied()
            .filter(|id| self.get(*id).is_some() && seen.insert(*id))
            .collect();

        let slots: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| seen.contains(&task.id))
            .map(|(index, _)| index)
            .collect();

        let mut next = self.tasks.clone();
        for (slot, id) in slots.into_iter().zip(ordered) {
            if let Some(task) = self.get(id) {
                next[slot] = task.clone();
            }
        }

        let changed = next != self.tasks;
        self.commit(next)?;
        Ok(changed)
    }

    fn index_of(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn title_taken(&self, title: &str, except: Option<TaskId>) -> bool {
        let key = title_key(title);
        self.tasks
            .iter()
            .any(|task| Some(task.id) != except && task.title_key() == key)
    }

    /// `None` once the largest stored id is `i64::MAX`.
    fn next_id(&self, now_ms: i64) -> Option<TaskId> {
        match self.tasks.iter().map(|task| task.id).max() {
            Some(max) if max >= now_ms => max.checked_add(1),
            _ => Some(now_ms),
        }
    }

    fn commit(&mut self, next: Vec<Task>) -> Result<(), TaskError> {
        let payload = serde_json::to_string(&next)
            .context("failed to serialize tasks")
            .map_err(TaskError::Storage)?;
        self.storage
            .set_item(STORAGE_KEY, &payload)
            .map_err(TaskError::Storage)?;
        self.tasks = next;
        Ok(())
    }
}

fn sanitize(records: Vec<Task>) -> (Vec<Task>, usize) {
    let mut ids = HashSet::new();
    let mut titles = HashSet::new();
    let mut dropped = 0;
    let mut tasks = Vec::with_capacity(records.len());

    for task in records {
        if task.title.trim().is_empty() || !ids.insert(task.id) || !titles.insert(task.title_key())
        {
            warn!(id = task.id, "skipping stored task that breaks store invariants");
            dropped += 1;
            continue;
        }
        tasks.push(task);
    }

    (tasks, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn empty_store() -> TaskStore {
        TaskStore::load(Box::new(MemoryStorage::new()))
            .expect("memory store should load")
            .0
    }

    fn store_with(titles: &[&str]) -> TaskStore {
        let mut store = empty_store();
        for (offset, title) in titles.iter().rev().enumerate() {
            store
                .add_at(title, 1_000 + offset as i64)
                .expect("seed task should be added");
        }
        store
    }

    fn titles(store: &TaskStore) -> Vec<&str> {
        store.tasks().iter().map(|task| task.title.as_str()).collect()
    }

    fn persisted(store: &TaskStore) -> Vec<Task> {
        let raw = store
            .storage()
            .get_item(STORAGE_KEY)
            .expect("read slot")
            .expect("slot should be written");
        serde_json::from_str(&raw).expect("slot should hold tasks")
    }

    fn id_of(store: &TaskStore, title: &str) -> TaskId {
        store
            .tasks()
            .iter()
            .find(|task| task.title == title)
            .map(|task| task.id)
            .expect("task should exist")
    }

    #[test]
    fn test_load_absent_slot_is_empty() {
        let (store, report) =
            TaskStore::load(Box::new(MemoryStorage::new())).expect("load should succeed");
        assert!(store.is_empty());
        assert!(report.is_clean());
        assert_eq!(report.notice(), None);
    }

    #[test]
    fn test_load_malformed_slot_resets_and_backs_up() {
        let storage = MemoryStorage::with_item(STORAGE_KEY, "{not json");
        let (store, report) = TaskStore::load(Box::new(storage)).expect("load should succeed");

        assert!(store.is_empty());
        assert!(report.recovered_corrupt);
        assert!(report.notice().is_some());
        assert_eq!(
            store.storage().get_item(CORRUPT_BACKUP_KEY).expect("read"),
            Some("{not json".to_string())
        );
    }

    #[test]
    fn test_load_drops_records_breaking_invariants() {
        let raw = r#"[
            {"id":1,"todo":"Alpha","completed":false},
            {"id":1,"todo":"Beta","completed":false},
            {"id":2,"todo":"ALPHA","completed":true},
            {"id":3,"todo":"   ","completed":false},
            {"id":4,"todo":"Gamma","completed":true}
        ]"#;
        let storage = MemoryStorage::with_item(STORAGE_KEY, raw);
        let (store, report) = TaskStore::load(Box::new(storage)).expect("load should succeed");

        assert_eq!(titles(&store), vec!["Alpha", "Gamma"]);
        assert_eq!(report.dropped_records, 3);
        assert!(!report.recovered_corrupt);
    }

    #[test]
    fn test_add_inserts_at_front_and_persists() {
        let mut store = empty_store();
        store.add("First").expect("add first");
        store.add("  Second  ").expect("add second");

        assert_eq!(titles(&store), vec!["Second", "First"]);
        assert!(store.tasks().iter().all(|task| !task.done));
        assert_eq!(persisted(&store), store.tasks().to_vec());
    }

    #[test]
    fn test_add_rejects_empty_title() {
        let mut store = empty_store();
        assert!(matches!(store.add("   "), Err(TaskError::EmptyTitle)));
        assert!(store.is_empty());
        assert_eq!(store.storage().get_item(STORAGE_KEY).expect("read"), None);
    }

    #[test]
    fn test_add_rejects_case_insensitive_duplicate() {
        let mut store = empty_store();
        store.add("Buy milk").expect("add");

        let err = store.add("buy milk").expect_err("duplicate should be rejected");
        assert!(matches!(err, TaskError::DuplicateTitle(ref title) if title == "buy milk"));
        assert!(err.is_validation());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_ids_stay_unique_when_clock_stalls() {
        let mut store = empty_store();
        let first = store.add_at("a", 5_000).expect("add a");
        let second = store.add_at("b", 5_000).expect("add b");
        let third = store.add_at("c", 4_000).expect("add c");

        assert_eq!(first, 5_000);
        assert_eq!(second, 5_001);
        assert_eq!(third, 5_002);
    }

    #[test]
    fn test_add_rejected_when_ids_run_out() {
        let raw = r#"[{"id":9223372036854775807,"todo":"Alpha","completed":false}]"#;
        let storage = MemoryStorage::with_item(STORAGE_KEY, raw);
        let (mut store, report) = TaskStore::load(Box::new(storage)).expect("load should succeed");
        assert!(report.is_clean());

        let err = store.add("Beta").expect_err("no id is left");
        assert!(matches!(err, TaskError::IdsExhausted));
        assert!(err.is_validation());
        assert_eq!(titles(&store), vec!["Alpha"]);
        assert_eq!(persisted(&store).len(), 1);
    }

    #[test]
    fn test_toggle_flips_done_and_ignores_missing() {
        let mut store = store_with(&["Task"]);
        let id = id_of(&store, "Task");

        assert!(store.toggle(id).expect("toggle"));
        assert!(store.get(id).expect("task").done);
        assert!(persisted(&store)[0].done);

        let before = store.tasks().to_vec();
        assert!(!store.toggle(id + 999).expect("toggle missing"));
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn test_delete_removes_only_target() {
        let mut store = store_with(&["A", "B", "C"]);
        let b = id_of(&store, "B");

        assert!(store.delete(b).expect("delete"));
        assert_eq!(titles(&store), vec!["A", "C"]);
        assert!(!store.delete(b).expect("second delete"));
    }

    #[test]
    fn test_edit_renames_and_persists() {
        let mut store = store_with(&["Draft"]);
        let id = id_of(&store, "Draft");

        assert_eq!(
            store.edit(id, "  Final  ").expect("edit"),
            EditOutcome::Renamed
        );
        assert_eq!(store.get(id).expect("task").title, "Final");
        assert_eq!(persisted(&store)[0].title, "Final");
    }

    #[test]
    fn test_edit_case_only_change_is_silent_noop() {
        let mut store = store_with(&["Task"]);
        let id = id_of(&store, "Task");

        assert_eq!(store.edit(id, "TASK").expect("edit"), EditOutcome::Unchanged);
        assert_eq!(store.edit(id, "   ").expect("edit"), EditOutcome::Unchanged);
        assert_eq!(store.get(id).expect("task").title, "Task");
    }

    #[test]
    fn test_edit_rejects_collision_with_other_record() {
        let mut store = store_with(&["Alpha", "Beta"]);
        let beta = id_of(&store, "Beta");

        let err = store.edit(beta, "alpha").expect_err("collision");
        assert!(matches!(err, TaskError::DuplicateTitle(_)));
        assert_eq!(titles(&store), vec!["Alpha", "Beta"]);
    }

    #[test]
    fn test_edit_missing_record() {
        let mut store = store_with(&["Alpha"]);
        assert_eq!(store.edit(-1, "Other").expect("edit"), EditOutcome::Missing);
    }

    #[test]
    fn test_reorder_full_permutation() {
        let mut store = store_with(&["A", "B", "C"]);
        let (a, b, c) = (id_of(&store, "A"), id_of(&store, "B"), id_of(&store, "C"));

        assert!(store.reorder(&[c, a, b]).expect("reorder"));
        assert_eq!(titles(&store), vec!["C", "A", "B"]);
        let persisted_titles: Vec<String> =
            persisted(&store).into_iter().map(|task| task.title).collect();
        assert_eq!(persisted_titles, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_reorder_subset_keeps_hidden_slots() {
        let mut store = store_with(&["A", "B", "C", "D", "E"]);
        let (b, d, e) = (id_of(&store, "B"), id_of(&store, "D"), id_of(&store, "E"));

        store.reorder(&[e, b, d]).expect("reorder");

        assert_eq!(titles(&store), vec!["A", "E", "C", "B", "D"]);
    }

    #[test]
    fn test_reorder_ignores_unknown_and_repeated_ids() {
        let mut store = store_with(&["A", "B"]);
        let (a, b) = (id_of(&store, "A"), id_of(&store, "B"));

        let changed = store.reorder(&[b, 12345, b, a]).expect("reorder");

        assert!(changed);
        assert_eq!(titles(&store), vec!["B", "A"]);
    }

    #[test]
    fn test_invariants_hold_across_operation_sequence() {
        let mut store = empty_store();
        let names = ["One", "two", "ONE", "Three", "  ", "TWO", "Four"];
        for (step, name) in names.iter().enumerate() {
            let _ = store.add_at(name, 10);
            if let Some(first) = store.tasks().first().map(|task| task.id) {
                let _ = store.toggle(first);
                if step % 3 == 0 {
                    let _ = store.edit(first, "three");
                }
            }
        }

        let mut ids = HashSet::new();
        let mut keys = HashSet::new();
        for task in store.tasks() {
            assert!(ids.insert(task.id), "duplicate id {}", task.id);
            assert!(keys.insert(task.title_key()), "duplicate title {}", task.title);
        }
    }
}
