use assert_cmd::cargo;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::tempdir;

/// Run the binary with a config path that does not exist (defaults apply).
fn run(cfg_dir: &Path, args: &[&str]) -> Output {
    let me = cargo::cargo_bin!("verify_move");
    Command::new(me)
        .env("VERIFY_MOVE_CONFIG", cfg_dir.join("absent.xml"))
        .args(args)
        .output()
        .expect("spawn binary")
}

fn s(p: &Path) -> &str {
    p.to_str().unwrap()
}

#[test]
fn no_arguments_is_a_usage_error() {
    let td = tempdir().unwrap();
    let out = run(td.path(), &[]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("Usage"), "stderr: {stderr}");
}

#[test]
fn extra_arguments_are_a_usage_error() {
    let td = tempdir().unwrap();
    let out = run(td.path(), &["a", "b", "c"]);
    assert_eq!(out.status.code(), Some(1));
}

#[test]
fn help_exits_zero() {
    let td = tempdir().unwrap();
    let out = run(td.path(), &["--help"]);
    assert_eq!(out.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&out.stdout).contains("DESTINATION"));
}

#[test]
fn moves_tree_and_reports_completion() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    fs::create_dir_all(src.join("b")).unwrap();
    fs::create_dir_all(&dst).unwrap();
    fs::write(src.join("a.txt"), "hello").unwrap();
    fs::write(src.join("b/c.txt"), "").unwrap();

    let out = run(td.path(), &["--plain", "--backoff-secs", "0", s(&src), s(&dst)]);

    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(out.status.success(), "stdout: {stdout}\nstderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(stdout.contains("Transfer complete."));
    assert!(stdout.contains("100.00% (2/2 files"), "final snapshot missing: {stdout}");
    assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "hello");
    assert_eq!(fs::read_to_string(dst.join("b/c.txt")).unwrap(), "");
    assert!(!src.join("a.txt").exists());
    assert!(!src.join("b/c.txt").exists());
}

#[test]
fn dry_run_leaves_everything_in_place() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dst).unwrap();
    fs::write(src.join("a.txt"), "hello").unwrap();

    let out = run(td.path(), &["--plain", "--dry-run", s(&src), s(&dst)]);

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("1 file(s) would move"), "stdout: {stdout}");
    assert!(src.join("a.txt").exists());
    assert!(!dst.join("a.txt").exists());
}

#[test]
fn destination_inside_source_is_rejected() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    fs::create_dir_all(&src).unwrap();
    fs::write(src.join("a.txt"), "hello").unwrap();

    let out = run(td.path(), &["--plain", s(&src), s(&src.join("copy"))]);

    assert_eq!(out.status.code(), Some(1));
    assert!(src.join("a.txt").exists());
}

#[test]
fn unknown_config_element_is_fatal() {
    let td = tempdir().unwrap();
    let cfg = td.path().join("config.xml");
    fs::write(&cfg, "<config><download_base>/x</download_base></config>").unwrap();
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dst).unwrap();
    fs::write(src.join("a.txt"), "hello").unwrap();

    let me = cargo::cargo_bin!("verify_move");
    let out = Command::new(me)
        .env("VERIFY_MOVE_CONFIG", &cfg)
        .args(["--plain", s(&src), s(&dst)])
        .output()
        .expect("spawn binary");

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Invalid config"));
    assert!(src.join("a.txt").exists());
}

#[test]
fn log_file_receives_records() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    let log = td.path().join("logs/run.log");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dst).unwrap();
    fs::write(src.join("a.txt"), "hello").unwrap();

    let out = run(
        td.path(),
        &["--plain", "--log-file", s(&log), s(&src), s(&dst)],
    );

    assert!(out.status.success());
    let contents = fs::read_to_string(&log).unwrap();
    assert!(contents.contains("Run summary"), "log: {contents}");
}

#[test]
fn file_named_like_a_copy_temp_survives_reruns() {
    let td = tempdir().unwrap();
    let src = td.path().join("src");
    let dst = td.path().join("dst");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&dst).unwrap();
    let name = ".verify_move.1.2.tmp";
    fs::write(src.join(name), "precious").unwrap();

    let first = run(td.path(), &["--plain", "--backoff-secs", "0", s(&src), s(&dst)]);
    assert!(first.status.success());
    assert!(!src.join(name).exists());
    assert_eq!(fs::read_to_string(dst.join(name)).unwrap(), "precious");

    fs::write(src.join("later.txt"), "more").unwrap();
    let second = run(td.path(), &["--plain", "--backoff-secs", "0", s(&src), s(&dst)]);
    assert!(second.status.success());
    assert_eq!(fs::read_to_string(dst.join(name)).unwrap(), "precious");
    assert_eq!(fs::read_to_string(dst.join("later.txt")).unwrap(), "more");
}
