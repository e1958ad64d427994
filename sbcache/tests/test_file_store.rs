use sbcache::{CacheStore, FileStore, WriteOptions};
use serde_json::json;

#[test]
fn test_parent_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("cache.store");

    let store = FileStore::new(&path).unwrap();
    assert!(path.parent().unwrap().is_dir());
    assert_eq!(store.path(), path);
}

#[test]
fn test_read_write_through_the_trait() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("cache.store")).unwrap();
    let opts = WriteOptions::default();

    let value = json!({"title": "Ticket Monster", "level": "Beginner"});
    store.write("quickstarts:tm", &value, &opts).unwrap();

    let found: Option<serde_json::Value> = store.read("quickstarts:tm").unwrap();
    assert_eq!(found, Some(value));

    let missing: Option<serde_json::Value> = store.read("quickstarts:none").unwrap();
    assert_eq!(missing, None);
}

#[test]
fn test_writes_accumulate_in_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.store");
    let store = FileStore::new(&path).unwrap();
    let opts = WriteOptions::default();

    store.write("a", &json!(1), &opts).unwrap();
    store.write("b", &json!(2), &opts).unwrap();

    // Les deux entrées cohabitent dans le même fichier YAML
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.contains("a:"));
    assert!(contents.contains("b:"));

    let a: Option<serde_json::Value> = store.read("a").unwrap();
    let b: Option<serde_json::Value> = store.read("b").unwrap();
    assert_eq!(a, Some(json!(1)));
    assert_eq!(b, Some(json!(2)));
}

#[test]
fn test_empty_file_is_an_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.store");
    std::fs::write(&path, "").unwrap();

    let store = FileStore::new(&path).unwrap();
    let found: Option<serde_json::Value> = store.read("anything").unwrap();
    assert_eq!(found, None);
}

#[test]
fn test_corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.store");
    std::fs::write(&path, "{unbalanced: [").unwrap();

    let store = FileStore::new(&path).unwrap();
    let result: anyhow::Result<Option<serde_json::Value>> = store.read("anything");
    assert!(result.is_err());
}
