use sbcdn::Cdn;
use std::path::PathBuf;
use tempfile::TempDir;

fn create_cdn(dir: &TempDir) -> Cdn {
    Cdn::with_paths(dir.path().join("cdn.yml"), dir.path().join("out")).unwrap()
}

fn output_files(dir: &TempDir) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir.path().join("out"))
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    files.sort();
    files
}

#[test]
fn test_first_version_starts_at_one() {
    let dir = tempfile::tempdir().unwrap();
    let cdn = create_cdn(&dir);

    let name = cdn.version("app", ".js", b"console.log(1)").unwrap();
    assert_eq!(name, "app-1.js");

    // Le fichier versionné contient le contenu fourni
    let written = std::fs::read(dir.path().join("out").join("app-1.js")).unwrap();
    assert_eq!(written, b"console.log(1)");
}

#[test]
fn test_unchanged_content_keeps_its_name() {
    let dir = tempfile::tempdir().unwrap();
    let cdn = create_cdn(&dir);

    let first = cdn.version("logo", ".png", b"fake png bytes").unwrap();
    let second = cdn.version("logo", ".png", b"fake png bytes").unwrap();

    assert_eq!(first, second);
    assert_eq!(first, "logo-1.png");

    // Un seul fichier physique a été écrit
    assert_eq!(output_files(&dir).len(), 1);
}

#[test]
fn test_changed_content_bumps_the_counter_by_one() {
    let dir = tempfile::tempdir().unwrap();
    let cdn = create_cdn(&dir);

    let v1 = cdn.version("app", ".js", b"console.log(1)").unwrap();
    let v2 = cdn.version("app", ".js", b"console.log(2)").unwrap();

    assert_eq!(v1, "app-1.js");
    assert_eq!(v2, "app-2.js");

    // Les deux versions physiques coexistent
    let files = output_files(&dir);
    assert_eq!(files.len(), 2);
    assert!(files.iter().any(|f| f.ends_with("app-1.js")));
    assert!(files.iter().any(|f| f.ends_with("app-2.js")));
}

#[test]
fn test_full_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let cdn = create_cdn(&dir);

    assert_eq!(cdn.version("app", ".js", b"console.log(1)").unwrap(), "app-1.js");
    assert_eq!(cdn.version("app", ".js", b"console.log(1)").unwrap(), "app-1.js");
    assert_eq!(cdn.version("app", ".js", b"console.log(2)").unwrap(), "app-2.js");
}

#[test]
fn test_assets_are_versioned_independently() {
    let dir = tempfile::tempdir().unwrap();
    let cdn = create_cdn(&dir);

    assert_eq!(cdn.version("app", ".js", b"js content").unwrap(), "app-1.js");
    assert_eq!(cdn.version("site", ".css", b"css content").unwrap(), "site-1.css");

    // Changer le JS ne touche pas au compteur du CSS
    assert_eq!(cdn.version("app", ".js", b"new js content").unwrap(), "app-2.js");
    assert_eq!(cdn.version("site", ".css", b"css content").unwrap(), "site-1.css");
}

#[test]
fn test_same_name_different_extension_are_distinct_assets() {
    let dir = tempfile::tempdir().unwrap();
    let cdn = create_cdn(&dir);

    assert_eq!(cdn.version("app", ".js", b"content").unwrap(), "app-1.js");
    assert_eq!(cdn.version("app", ".css", b"content").unwrap(), "app-1.css");
}

#[test]
fn test_counters_survive_across_instances() {
    let dir = tempfile::tempdir().unwrap();

    {
        let cdn = create_cdn(&dir);
        assert_eq!(cdn.version("app", ".js", b"v1").unwrap(), "app-1.js");
        assert_eq!(cdn.version("app", ".js", b"v2").unwrap(), "app-2.js");
    }

    // Une nouvelle instance sur les mêmes chemins reprend où on en était
    let cdn = create_cdn(&dir);
    assert_eq!(cdn.version("app", ".js", b"v2").unwrap(), "app-2.js");
    assert_eq!(cdn.version("app", ".js", b"v3").unwrap(), "app-3.js");
}

#[test]
fn test_reverting_content_still_bumps_the_counter() {
    let dir = tempfile::tempdir().unwrap();
    let cdn = create_cdn(&dir);

    assert_eq!(cdn.version("app", ".js", b"v1").unwrap(), "app-1.js");
    assert_eq!(cdn.version("app", ".js", b"v2").unwrap(), "app-2.js");

    // Revenir à l'ancien contenu est un changement comme un autre :
    // seul le dernier condensat est conservé
    assert_eq!(cdn.version("app", ".js", b"v1").unwrap(), "app-3.js");
}

#[test]
fn test_control_file_records_the_state() {
    let dir = tempfile::tempdir().unwrap();
    let cdn = create_cdn(&dir);

    cdn.version("app", ".js", b"console.log(1)").unwrap();

    let contents = std::fs::read_to_string(dir.path().join("cdn.yml")).unwrap();
    assert!(contents.contains("app.js"));
    assert!(contents.contains("build_no: 1"));
    // Condensat MD5 hexadécimal de "console.log(1)"
    assert!(contents.contains("6114f5adc373accd7b2051bd87078f62"));
}

#[test]
fn test_output_directory_is_namespaced_by_context() {
    let dir = tempfile::tempdir().unwrap();
    let cdn = Cdn::with_paths(
        dir.path().join("cdn.yml"),
        dir.path().join("out").join("staging"),
    )
    .unwrap();

    cdn.version("app", ".js", b"content").unwrap();
    assert!(dir.path().join("out").join("staging").join("app-1.js").exists());
}
