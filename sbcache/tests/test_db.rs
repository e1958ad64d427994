use sbcache::{Cache, CacheStore, DbStore, WriteOptions};
use tempfile::TempDir;

fn open_store(dir: &TempDir) -> DbStore {
    DbStore::open(&dir.path().join("cache.db"), "test_cache").unwrap()
}

#[test]
fn test_put_get_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    assert_eq!(store.get("pi").unwrap(), None);

    store.put("pi", "3.14").unwrap();
    assert_eq!(store.get("pi").unwrap().as_deref(), Some("3.14"));
}

#[test]
fn test_put_overwrites_existing_value() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    store.put("key", "\"before\"").unwrap();
    store.put("key", "\"after\"").unwrap();

    assert_eq!(store.get("key").unwrap().as_deref(), Some("\"after\""));
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_delete_and_count() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    store.put("a", "1").unwrap();
    store.put("b", "2").unwrap();
    assert_eq!(store.count().unwrap(), 2);

    store.delete("a").unwrap();
    assert_eq!(store.count().unwrap(), 1);
    assert_eq!(store.get("a").unwrap(), None);
}

#[test]
fn test_purge_empties_the_table() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    store.put("a", "1").unwrap();
    store.put("b", "2").unwrap();

    store.purge().unwrap();
    assert_eq!(store.count().unwrap(), 0);
}

#[test]
fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let store = open_store(&dir);
        store.put("persisted", "\"value\"").unwrap();
    }

    let store = open_store(&dir);
    assert_eq!(store.get("persisted").unwrap().as_deref(), Some("\"value\""));
}

#[test]
fn test_tables_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.db");

    let videos = DbStore::open(&path, "videos").unwrap();
    let books = DbStore::open(&path, "books").unwrap();

    videos.put("id", "\"a video\"").unwrap();

    assert_eq!(books.get("id").unwrap(), None);
    assert_eq!(videos.get("id").unwrap().as_deref(), Some("\"a video\""));
}

#[test]
fn test_facade_over_database_store() {
    let dir = tempfile::tempdir().unwrap();
    let cache: Cache<f64> = Cache::database(dir.path().join("cache.db"), "facade").unwrap();

    cache.write("pi", 3.14).unwrap();
    assert_eq!(cache.read("pi").unwrap(), Some(3.14));
    assert_eq!(cache.fetch("pi", || Ok(2.71)).unwrap(), 3.14);
}

#[test]
fn test_corrupt_entry_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    // Une valeur qui n'est pas du JSON valide pour le type attendu
    store.put("bad", "not json at all").unwrap();

    let result = <DbStore as CacheStore<f64>>::read(&store, "bad");
    assert!(result.is_err());
}

#[test]
fn test_missing_key_is_not_an_error_through_the_trait() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let value = <DbStore as CacheStore<f64>>::read(&store, "missing").unwrap();
    assert_eq!(value, None);

    <DbStore as CacheStore<f64>>::write(&store, "pi", &3.14, &WriteOptions::default()).unwrap();
    let value = <DbStore as CacheStore<f64>>::read(&store, "pi").unwrap();
    assert_eq!(value, Some(3.14));
}
