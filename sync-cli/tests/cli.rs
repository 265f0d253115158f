use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::path::Path;
use std::process::Command;

fn write_pattern(path: &Path, bytes: usize) {
    let data: Vec<u8> = (0..bytes).map(|i| (i % 251) as u8).collect();
    std::fs::write(path, data).unwrap();
}

fn bucket_sync(work: &Path, store: &Path) -> Command {
    let mut cmd = Command::cargo_bin("bucket-sync").unwrap();
    cmd.current_dir(work)
        .args(["--store-root", store.to_str().unwrap()]);
    cmd
}

#[test]
fn full_round_trip_between_directories() {
    let src = tempfile::tempdir().unwrap();
    let dst = tempfile::tempdir().unwrap();
    let store = tempfile::tempdir().unwrap();
    write_pattern(&src.path().join("data.bin"), 10_000);

    bucket_sync(src.path(), store.path())
        .args([
            "push",
            "data.bin",
            "backups",
            "--chunk-size",
            "1000",
            "--no-auto-size",
            "--cleanup",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Push complete"))
        .stdout(predicate::str::contains("Uploaded: 10"));
    assert!(!src.path().join("data.bin_chunks").exists());

    bucket_sync(dst.path(), store.path())
        .args(["pull", "data.bin", "backups", "--cleanup"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Pull complete"));
    assert!(!dst.path().join("data.bin_chunks").exists());

    let restored = std::fs::read(dst.path().join("data.bin")).unwrap();
    let original = std::fs::read(src.path().join("data.bin")).unwrap();
    assert_eq!(restored, original);
}

#[test]
fn chunk_status_verify_cleanup_flow() {
    let work = tempfile::tempdir().unwrap();
    let store = tempfile::tempdir().unwrap();
    write_pattern(&work.path().join("data.bin"), 10_000);

    bucket_sync(work.path(), store.path())
        .args(["status", "data.bin"])
        .assert()
        .success()
        .stdout(predicate::str::contains(": unchunked"));

    bucket_sync(work.path(), store.path())
        .args(["chunk", "data.bin", "--chunk-size", "1000", "--no-auto-size"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Chunked data.bin"));

    bucket_sync(work.path(), store.path())
        .args(["status", "data.bin"])
        .assert()
        .success()
        .stdout(predicate::str::contains(": chunked"))
        .stdout(predicate::str::contains("Chunks:     10"));

    bucket_sync(work.path(), store.path())
        .args(["verify", "data.bin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("All 10 chunks intact"));

    bucket_sync(work.path(), store.path())
        .args(["cleanup", "data.bin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed chunk state"));

    bucket_sync(work.path(), store.path())
        .args(["status", "data.bin"])
        .assert()
        .success()
        .stdout(predicate::str::contains(": unchunked"));
}

#[test]
fn verify_detects_corruption() {
    let work = tempfile::tempdir().unwrap();
    let store = tempfile::tempdir().unwrap();
    write_pattern(&work.path().join("data.bin"), 10_000);

    bucket_sync(work.path(), store.path())
        .args(["chunk", "data.bin", "--chunk-size", "1000", "--no-auto-size"])
        .assert()
        .success();

    let artifact = work.path().join("data.bin_chunks").join("data.bin.000002");
    std::fs::write(&artifact, b"garbage").unwrap();

    bucket_sync(work.path(), store.path())
        .args(["verify", "data.bin"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("hash mismatch"));
}

#[test]
fn pull_missing_manifest_fails() {
    let work = tempfile::tempdir().unwrap();
    let store = tempfile::tempdir().unwrap();

    bucket_sync(work.path(), store.path())
        .args(["pull", "data.bin", "backups"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no manifest"));
}

#[test]
fn push_twice_uploads_nothing_new() {
    let work = tempfile::tempdir().unwrap();
    let store = tempfile::tempdir().unwrap();
    write_pattern(&work.path().join("data.bin"), 5_000);

    bucket_sync(work.path(), store.path())
        .args(["push", "data.bin", "backups", "--chunk-size", "1000", "--no-auto-size"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Uploaded: 5"));

    bucket_sync(work.path(), store.path())
        .args(["push", "data.bin", "backups", "--chunk-size", "1000", "--no-auto-size"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Uploaded: 0"))
        .stdout(predicate::str::contains("Skipped:  5"));
}
