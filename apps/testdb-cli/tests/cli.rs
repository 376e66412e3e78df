use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn testdb(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_testdb"))
        .current_dir(dir)
        .env_remove("TESTDB_STORAGE")
        .arg("--storage")
        .arg(dir.join("index.json"))
        .args(args)
        .output()
        .expect("run testdb")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn ingest_search_delete_flow() {
    let tmp = TempDir::new().unwrap();
    let data = tmp.path().join("data");
    fs::create_dir_all(data.join("nested")).unwrap();
    fs::write(
        data.join("a.json"),
        r#"[{"id": 101, "title": "Awesome Title", "searchable": ["title"]},
            {"id": 201, "title": "Awesome Title Works", "searchable": ["title"]}]"#,
    )
    .unwrap();
    fs::write(
        data.join("nested/b.json"),
        r#"{"id": 301, "title": "Random Non Sense", "searchable": ["title"]}"#,
    )
    .unwrap();
    fs::write(data.join("notes.txt"), "ignored").unwrap();

    let out = testdb(tmp.path(), &["ingest", data.to_str().unwrap()]);
    assert!(out.status.success(), "ingest failed: {out:?}");
    assert!(stdout(&out).contains("Indexed 3 records"));

    let out = testdb(tmp.path(), &["search", "--json", "Awesome Title"]);
    assert!(out.status.success());
    let body: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    let hits = body["hits"].as_array().unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0]["id"], 101);
    assert_eq!(hits[1]["lev"], 6);

    let out = testdb(tmp.path(), &["delete", "101"]);
    assert!(out.status.success());
    let out = testdb(tmp.path(), &["search", "Awesome Title"]);
    assert!(stdout(&out).contains("Found 1 hits"));
}

#[test]
fn search_without_storage_file_fails() {
    let tmp = TempDir::new().unwrap();
    let out = testdb(tmp.path(), &["search", "anything"]);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("does not exist"));
}

#[test]
fn init_then_dump_prints_empty_table() {
    let tmp = TempDir::new().unwrap();
    let out = testdb(tmp.path(), &["init"]);
    assert!(out.status.success());
    let out = testdb(tmp.path(), &["dump"]);
    assert!(out.status.success());
    assert_eq!(stdout(&out).trim(), "{}");
}
