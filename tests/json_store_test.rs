//! Tests for the JSON snapshot store

use std::fs;

use tempfile::TempDir;

use deptree::domain::{DepartmentId, DepartmentPatch, NewDepartment};
use deptree::infrastructure::{DepartmentStore, JsonFileStore, StoreError};

const SNAPSHOT: &str = r#"[
  {"id": "1", "name": "Engineering", "isActive": true, "parentId": null, "level": 7, "companyId": "acme"},
  {"id": "2", "name": "Backend", "parentId": "1", "userCount": 4, "companyId": "acme"},
  {"id": "3", "name": "Payments", "parentId": "2", "managerId": "u3", "managerName": "Grace", "companyId": "acme"},
  {"id": "9", "name": "Elsewhere", "companyId": "globex"}
]"#;

fn id(s: &str) -> DepartmentId {
    DepartmentId::from(s)
}

fn store_with_snapshot(dir: &TempDir) -> JsonFileStore {
    let path = dir.path().join("departments.json");
    fs::write(&path, SNAPSHOT).expect("write snapshot");
    JsonFileStore::new(path)
}

#[test]
fn given_camel_case_snapshot_when_fetching_then_fields_and_levels_loaded() {
    let dir = TempDir::new().unwrap();
    let store = store_with_snapshot(&dir);

    let records = store.fetch_all(Some("acme")).unwrap();

    assert_eq!(records.len(), 3);
    let root = records.iter().find(|d| d.id == id("1")).unwrap();
    assert_eq!(root.level, 0, "stored level is only a hint");
    let payments = records.iter().find(|d| d.id == id("3")).unwrap();
    assert_eq!(payments.level, 2);
    assert_eq!(payments.manager_name.as_deref(), Some("Grace"));
    assert!(payments.is_active);
}

#[test]
fn given_missing_file_when_fetching_then_empty() {
    let dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(dir.path().join("nested").join("none.json"));

    assert!(store.fetch_all(None).unwrap().is_empty());
}

#[test]
fn given_missing_file_when_creating_then_file_and_directories_written() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("departments.json");
    let store = JsonFileStore::new(&path);

    let created = store.create(&NewDepartment::new("Research")).unwrap();

    assert!(path.exists());
    let records = store.fetch_all(None).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, created.id);
}

#[test]
fn given_move_when_set_parent_then_persisted_with_levels() {
    let dir = TempDir::new().unwrap();
    let store = store_with_snapshot(&dir);

    store.set_parent(&id("3"), Some(&id("1"))).unwrap();

    let reopened = JsonFileStore::new(store.path());
    let records = reopened.fetch_all(None).unwrap();
    let payments = records.iter().find(|d| d.id == id("3")).unwrap();
    assert_eq!(payments.parent_id, Some(id("1")));
    assert_eq!(payments.level, 1);
}

#[test]
fn given_cycle_when_set_parent_then_rejected_and_file_unchanged() {
    let dir = TempDir::new().unwrap();
    let store = store_with_snapshot(&dir);
    let before = fs::read_to_string(store.path()).unwrap();

    let err = store.set_parent(&id("1"), Some(&id("3"))).unwrap_err();

    assert!(matches!(err, StoreError::Rejected(_)));
    assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
}

#[test]
fn given_update_and_delete_when_applied_then_children_promoted() {
    let dir = TempDir::new().unwrap();
    let store = store_with_snapshot(&dir);
    let patch = DepartmentPatch {
        description: Some("Core services".to_string()),
        ..DepartmentPatch::default()
    };

    store.update(&id("2"), &patch).unwrap();
    store.delete(&id("2")).unwrap();

    let records = store.fetch_all(None).unwrap();
    assert_eq!(records.len(), 3);
    let payments = records.iter().find(|d| d.id == id("3")).unwrap();
    assert_eq!(payments.parent_id, Some(id("1")));
    assert_eq!(payments.level, 1);
}

#[test]
fn given_unknown_id_when_deleting_then_not_found() {
    let dir = TempDir::new().unwrap();
    let store = store_with_snapshot(&dir);

    let err = store.delete(&id("404")).unwrap_err();

    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn given_corrupt_file_when_fetching_then_json_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("departments.json");
    fs::write(&path, "{ not json").unwrap();

    let err = JsonFileStore::new(path).fetch_all(None).unwrap_err();

    assert!(matches!(err, StoreError::Json { .. }));
}
