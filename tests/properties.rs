mod common;

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use todo_sync::{
    storage::{self, LocalStorage},
    FileStorage, MockGateway, Task, TaskDraft, TaskPatch, TaskRepository, TaskStatus, TaskStore,
};

fn status() -> impl Strategy<Value = TaskStatus> {
    prop_oneof![Just(TaskStatus::Incomplete), Just(TaskStatus::Completed)]
}

fn timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000).prop_map(|secs| Utc.timestamp_opt(secs, 0).unwrap())
}

fn task() -> impl Strategy<Value = Task> {
    (
        1u32..10_000,
        "[a-zA-Z0-9 ]{1,16}",
        ".{0,64}",
        status(),
        proptest::option::of(timestamp()),
        timestamp(),
        0i64..1_000_000,
    )
        .prop_map(|(id, title, description, status, deadline, created_at, later)| Task {
            id,
            title,
            description,
            status,
            deadline,
            created_at,
            updated_at: created_at + Duration::seconds(later),
        })
}

fn seeded(count: usize) -> MockGateway {
    let mut gateway = MockGateway::default();
    for i in 0..count {
        gateway
            .create(TaskDraft::new(format!("Task {i}"), "body"))
            .unwrap();
    }
    gateway
}

proptest! {
    #[test]
    fn ids_increase_from_one(count in 1usize..30) {
        let gateway = seeded(count);
        let ids: Vec<u32> = gateway.store().tasks().iter().map(|t| t.id).collect();
        let expected: Vec<u32> = (1..=count as u32).collect();
        prop_assert_eq!(ids, expected);
    }

    #[test]
    fn update_status_is_visible_on_fetch(count in 1usize..10, pick in 0usize..10, s in status()) {
        let mut gateway = seeded(count);
        let id = (pick % count) as u32 + 1;
        let before = gateway.store().get(id).unwrap().updated_at;

        gateway.update(id, TaskPatch::status(s)).unwrap();
        let fetched = gateway.fetch().unwrap();
        let task = fetched.iter().find(|t| t.id == id).unwrap();
        prop_assert_eq!(task.status, s);
        prop_assert!(task.updated_at >= before);
        prop_assert!(task.updated_at >= task.created_at);
    }

    #[test]
    fn deleted_ids_never_come_back(count in 0usize..10, id in 0u32..15) {
        let mut gateway = seeded(count);
        let before = gateway.fetch().unwrap();
        prop_assert!(gateway.delete(id).unwrap().success);
        let after = gateway.fetch().unwrap();
        prop_assert!(after.iter().all(|t| t.id != id));
        if before.iter().all(|t| t.id != id) {
            prop_assert_eq!(after, before);
        }
    }

    #[test]
    fn mirror_round_trip_is_lossless(tasks in proptest::collection::vec(task(), 0..12)) {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::new(dir.path());
        storage::save_snapshot(&mut storage, common::KEY, &tasks).unwrap();
        let loaded = storage::load_snapshot(&storage, common::KEY).unwrap();
        prop_assert_eq!(loaded, Some(tasks));
    }
}

#[test]
fn file_storage_reads_missing_key_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path().join("not-yet-created"));
    assert_eq!(storage.get_item(common::KEY).unwrap(), None);
}

#[test]
fn file_storage_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let fixture = TaskStore::fixture();
    storage::save_snapshot(&mut FileStorage::new(dir.path()), common::KEY, fixture.tasks()).unwrap();
    assert!(dir.path().join("todo-items.json").exists());

    let reopened = FileStorage::new(dir.path());
    let loaded = storage::load_snapshot(&reopened, common::KEY).unwrap().unwrap();
    assert_eq!(loaded, fixture.tasks());
}

#[test]
fn file_storage_enforces_quota() {
    let dir = tempfile::tempdir().unwrap();
    let mut storage = FileStorage::new(dir.path()).with_quota(4);
    assert!(matches!(
        storage.set_item(common::KEY, "12345"),
        Err(todo_sync::StorageError::QuotaExceeded { needed: 5, quota: 4 })
    ));
    storage.set_item(common::KEY, "[]").unwrap();
    storage.remove_item(common::KEY).unwrap();
    assert_eq!(storage.get_item(common::KEY).unwrap(), None);
}
