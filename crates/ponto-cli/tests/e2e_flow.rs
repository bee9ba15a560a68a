//! End-to-end tests that drive the `ponto` binary.
//!
//! Each test gets its own HOME and record store so the user's real
//! configuration and data are never touched.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const HEADER_LINE: &str =
    "USER_NAME,RECORD_DATE,SHIFT_START_TIME,SHIFT_END_TIME,TOTAL_WORKED_DURATION";

fn ponto_binary() -> String {
    env!("CARGO_BIN_EXE_ponto").to_string()
}

fn ponto(home: &Path, store: &Path) -> Command {
    let mut command = Command::new(ponto_binary());
    command
        .env("HOME", home)
        .env_remove("XDG_CONFIG_HOME")
        .env_remove("XDG_DATA_HOME")
        .env_remove("PONTO_STALE_STORE")
        .env("PONTO_STORE_PATH", store);
    command
}

fn run_with_stdin(mut command: Command, stdin: &str) -> Output {
    let mut child = command
        .arg("run")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn ponto run");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    child.wait_with_output().unwrap()
}

fn store_path(temp: &TempDir) -> PathBuf {
    temp.path().join("data/records.csv")
}

#[test]
fn test_init_creates_store_with_header() {
    let temp = TempDir::new().unwrap();
    let store = store_path(&temp);

    let output = ponto(temp.path(), &store).arg("init").output().unwrap();

    assert!(
        output.status.success(),
        "ponto init should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Records:      0"), "{stdout}");
    let content = std::fs::read_to_string(&store).unwrap();
    assert_eq!(content.lines().collect::<Vec<_>>(), vec![HEADER_LINE]);
}

#[test]
fn test_run_records_finished_session() {
    let temp = TempDir::new().unwrap();
    let store = store_path(&temp);
    let config = temp.path().join("ponto.toml");
    std::fs::write(&config, "[nicknames]\nana = \"Ana Souza\"\n").unwrap();

    let mut command = ponto(temp.path(), &store);
    command.arg("--config").arg(&config);
    let output = run_with_stdin(
        command,
        "ana: /ponto\nana: pause\nana: resume\nana: finish\n",
    );

    assert!(
        output.status.success(),
        "ponto run should succeed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("[msg-1] Timeclock"), "{stdout}");
    assert!(stdout.contains("Total worked:"), "{stdout}");

    let content = std::fs::read_to_string(&store).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 2, "header plus one record: {content}");
    assert_eq!(lines[0], HEADER_LINE);
    assert!(lines[1].starts_with("Ana Souza,"), "{}", lines[1]);
}

#[test]
fn test_run_appends_across_processes() {
    let temp = TempDir::new().unwrap();
    let store = store_path(&temp);

    for _ in 0..2 {
        let output = run_with_stdin(ponto(temp.path(), &store), "42: /clt\n42: finish\n");
        assert!(output.status.success());
    }

    let content = std::fs::read_to_string(&store).unwrap();
    let lines: Vec<_> = content.lines().collect();
    assert_eq!(lines.len(), 3, "{content}");
    assert!(lines[1].starts_with("User ID: 42,"), "{}", lines[1]);
    assert!(lines[2].starts_with("User ID: 42,"), "{}", lines[2]);
}

#[test]
fn test_open_sessions_are_reported_at_exit() {
    let temp = TempDir::new().unwrap();
    let store = store_path(&temp);

    let output = run_with_stdin(ponto(temp.path(), &store), "ana: /ponto\n");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 session(s) were still open"), "{stderr}");
    let content = std::fs::read_to_string(&store).unwrap();
    assert_eq!(content.lines().count(), 1);
}

#[test]
fn test_stale_store_is_backed_up_by_default() {
    let temp = TempDir::new().unwrap();
    let store = store_path(&temp);
    std::fs::create_dir_all(store.parent().unwrap()).unwrap();
    std::fs::write(&store, "A,B,C\n1,2,3\n").unwrap();

    let output = ponto(temp.path(), &store).arg("init").output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Warning: unexpected header"), "{stdout}");
    assert!(stdout.contains("Old store kept at:"), "{stdout}");

    let backups: Vec<_> = std::fs::read_dir(store.parent().unwrap())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_name().to_string_lossy().contains(".stale-"))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(
        std::fs::read_to_string(backups[0].path()).unwrap(),
        "A,B,C\n1,2,3\n"
    );
}

#[test]
fn test_stale_store_fail_policy_aborts() {
    let temp = TempDir::new().unwrap();
    let store = store_path(&temp);
    std::fs::create_dir_all(store.parent().unwrap()).unwrap();
    std::fs::write(&store, "A,B,C\n").unwrap();

    let output = ponto(temp.path(), &store)
        .env("PONTO_STALE_STORE", "fail")
        .arg("init")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unexpected header"), "{stderr}");
    assert_eq!(std::fs::read_to_string(&store).unwrap(), "A,B,C\n");
}
