use anyhow::Result;
use tempfile::TempDir;

use tasklist::projection::project;
use tasklist::storage::{FileStorage, KeyValueStorage};
use tasklist::store::{CORRUPT_BACKUP_KEY, STORAGE_KEY, TaskError, TaskStore};
use tasklist::types::{StatusFilter, Task, TaskId};

fn open_store(dir: &TempDir) -> Result<TaskStore> {
    let storage = FileStorage::open(dir.path())?;
    let (store, report) = TaskStore::load(Box::new(storage))?;
    assert!(report.is_clean());
    Ok(store)
}

fn titles(store: &TaskStore) -> Vec<&str> {
    store.tasks().iter().map(|task| task.title.as_str()).collect()
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
fn mutations_survive_reload() -> Result<()> {
    let dir = TempDir::new()?;
    {
        let mut store = open_store(&dir)?;
        store.add("Buy milk")?;
        store.add("Walk dog")?;
        let milk = id_of(&store, "Buy milk");
        store.toggle(milk)?;
        let dog = id_of(&store, "Walk dog");
        store.edit(dog, "  Walk the dog  ")?;
    }

    let store = open_store(&dir)?;
    assert_eq!(titles(&store), vec!["Walk the dog", "Buy milk"]);
    assert!(store.tasks()[1].done);
    assert!(!store.tasks()[0].done);
    Ok(())
}

#[test]
fn slot_uses_original_field_names() -> Result<()> {
    let dir = TempDir::new()?;
    let mut store = open_store(&dir)?;
    store.add("Buy milk")?;

    let raw = store
        .storage()
        .get_item(STORAGE_KEY)?
        .expect("slot should be written");
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let record = &value[0];
    assert_eq!(record["todo"], "Buy milk");
    assert_eq!(record["completed"], false);
    assert!(record["id"].is_i64());
    Ok(())
}

#[test]
fn drag_last_before_first_persists() -> Result<()> {
    let dir = TempDir::new()?;
    {
        let mut store = open_store(&dir)?;
        store.add("C")?;
        store.add("B")?;
        store.add("A")?;
        let order = vec![id_of(&store, "C"), id_of(&store, "A"), id_of(&store, "B")];
        assert!(store.reorder(&order)?);
    }

    let store = open_store(&dir)?;
    assert_eq!(titles(&store), vec!["C", "A", "B"]);
    Ok(())
}

#[test]
fn duplicate_titles_rejected_case_insensitively() -> Result<()> {
    let dir = TempDir::new()?;
    let mut store = open_store(&dir)?;
    store.add("Buy milk")?;

    let err = store.add("buy milk").expect_err("duplicate should be rejected");
    assert!(matches!(err, TaskError::DuplicateTitle(_)));
    assert_eq!(store.len(), 1);
    Ok(())
}

#[test]
fn malformed_slot_is_backed_up() -> Result<()> {
    let dir = TempDir::new()?;
    let mut storage = FileStorage::open(dir.path())?;
    storage.set_item(STORAGE_KEY, "[{\"id\": 1, \"todo\": ")?;

    let (store, report) = TaskStore::load(Box::new(storage))?;
    assert!(store.is_empty());
    assert!(report.recovered_corrupt);
    assert!(report.notice().is_some());

    let backup = FileStorage::open(dir.path())?.get_item(CORRUPT_BACKUP_KEY)?;
    assert_eq!(backup.as_deref(), Some("[{\"id\": 1, \"todo\": "));
    Ok(())
}

#[test]
fn projection_partitions_search_results() -> Result<()> {
    let dir = TempDir::new()?;
    let mut store = open_store(&dir)?;
    for title in ["Milk", "Oat milk", "Bread", "MILKSHAKE"] {
        store.add(title)?;
    }
    store.toggle(id_of(&store, "Oat milk"))?;
    store.toggle(id_of(&store, "Bread"))?;

    let titles_of = |tasks: Vec<&Task>| -> Vec<String> {
        tasks.into_iter().map(|task| task.title.clone()).collect()
    };

    let all = titles_of(project(store.tasks(), StatusFilter::All, "milk"));
    let done = titles_of(project(store.tasks(), StatusFilter::Completed, "milk"));
    let open = titles_of(project(store.tasks(), StatusFilter::Uncompleted, "milk"));

    assert_eq!(all, vec!["MILKSHAKE", "Oat milk", "Milk"]);
    assert_eq!(done, vec!["Oat milk"]);
    assert_eq!(open, vec!["MILKSHAKE", "Milk"]);
    Ok(())
}
