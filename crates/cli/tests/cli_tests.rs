use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;

fn coursesync() -> Command {
    let mut cmd = Command::cargo_bin("coursesync").unwrap();
    for var in ["STORE_URL", "SUPABASE_URL", "STORE_KEY", "SUPABASE_KEY", "COURSESYNC_REGISTRY"] {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn test_cli_help() {
    coursesync()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Sync motorcycle safety course availability"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_missing_store_url_exits_with_config_status() {
    coursesync()
        .assert()
        .code(2)
        .stderr(predicate::str::contains("STORE_URL"))
        .stdout(predicate::str::contains("Colleges attempted").not());
}

#[test]
fn test_http_store_without_key_exits_with_config_status() {
    coursesync()
        .env("STORE_URL", "https://project.supabase.co")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("STORE_KEY"));
}

#[test]
fn test_dry_run_with_missing_registry_fails() {
    coursesync()
        .args(["--dry-run", "--registry", "/nonexistent/registry.json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Colleges attempted").not());
}

#[test]
fn test_dry_run_with_invalid_registry_fails() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"institutions": [{{"name": "", "subdomain": "x"}}]}}"#).unwrap();

    coursesync()
        .arg("--dry-run")
        .arg("--registry")
        .arg(file.path())
        .assert()
        .failure();
}

#[test]
fn test_dry_run_with_empty_registry_prints_summary() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"institutions": []}}"#).unwrap();

    coursesync()
        .arg("--dry-run")
        .arg("--registry")
        .arg(file.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Colleges attempted: 0"))
        .stdout(predicate::str::contains("Total courses saved: 0"));
}

fn unreachable_registry() -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"provider": {{"origin_template": "http://127.0.0.1:9"}},
            "institutions": [{{"name": "Test College", "subdomain": "test", "filter": "moto",
            "city": "Town", "zipcode": "00000", "latitude": 1.5, "longitude": -2.5}}]}}"#
    )
    .unwrap();
    file
}

#[test]
fn test_rust_log_debug_enables_debug_output() {
    let registry = unreachable_registry();

    coursesync()
        .env("RUST_LOG", "debug")
        .arg("--dry-run")
        .arg("--registry")
        .arg(registry.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("fetching course listing"))
        .stdout(predicate::str::contains("Failed: 1"));
}

#[test]
fn test_default_log_filter_is_info() {
    let registry = unreachable_registry();

    coursesync()
        .env_remove("RUST_LOG")
        .arg("--dry-run")
        .arg("--registry")
        .arg(registry.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("course store ready"))
        .stdout(predicate::str::contains("fetching course listing").not());
}
