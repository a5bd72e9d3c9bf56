use std::env;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn bin_path() -> PathBuf {
    if let Some(path) = env::var_os("CARGO_BIN_EXE_richpost") {
        return PathBuf::from(path);
    }
    let exe = env::current_exe().expect("current exe");
    let mut debug_dir = exe.as_path();
    while let Some(parent) = debug_dir.parent() {
        if parent.file_name().and_then(|name| name.to_str()) == Some("debug") {
            let candidate = parent.join("richpost");
            if candidate.exists() {
                return candidate;
            }
        }
        debug_dir = parent;
    }
    panic!("binary path missing");
}

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let mut path = env::temp_dir();
    let now = SystemTime::now().duration_since(UNIX_EPOCH).expect("time");
    let file_name = format!(
        "richpost_cli_{}_{}_{}.post",
        name,
        now.as_secs(),
        now.subsec_nanos()
    );
    path.push(file_name);
    fs::write(&path, contents).expect("write temp file");
    path
}

#[test]
fn renders_fragment_to_stdout() {
    let input = temp_file("render", "<b>hi</b> @bob");
    let output = Command::new(bin_path())
        .args([input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout, "<b>hi</b> @bob");
}

#[test]
fn json_output_carries_collections() {
    let input = temp_file(
        "json",
        "@bob look http://a.com/x.png <img src=\"http://a.com/y.gif\">",
    );
    let output = Command::new(bin_path())
        .args(["--json", input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(value["mentions"], serde_json::json!(["@bob"]));
    assert_eq!(value["urls"], serde_json::json!(["http://a.com/x.png"]));
    assert_eq!(value["images"], serde_json::json!(["http://a.com/y.gif"]));
}

#[test]
fn strict_mode_fails_on_neutralized_markup() {
    let input = temp_file("strict", "<a href=\"javascript:alert(1)\">x</a>");
    let output = Command::new(bin_path())
        .args([
            "--strict",
            "--diagnostics",
            "pretty",
            input.to_str().expect("path"),
        ])
        .output()
        .expect("run");

    assert!(!output.status.success(), "expected error exit code");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("W_URL_REJECTED"),
        "expected W_URL_REJECTED in stderr"
    );
}

#[test]
fn diagnostics_json_lists_repairs() {
    let input = temp_file("repairs", "<b>open");
    let output = Command::new(bin_path())
        .args(["--diagnostics", "json", input.to_str().expect("path")])
        .output()
        .expect("run");

    assert!(output.status.success(), "repairs alone do not fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("\"code\": \"I_TAG_UNCLOSED\""));
}

#[test]
fn bad_flag_value_is_a_usage_error() {
    let output = Command::new(bin_path())
        .args(["--media-width", "wide"])
        .output()
        .expect("run");

    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn player_size_flags_reach_the_iframe() {
    let input = temp_file("player", "https://youtu.be/abc");
    let output = Command::new(bin_path())
        .args([
            "--media-width",
            "640",
            "--youtube-height",
            "360",
            input.to_str().expect("path"),
        ])
        .output()
        .expect("run");

    assert!(output.status.success(), "expected success exit code");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.starts_with("<iframe width=\"640\" height=\"360\" "),
        "unexpected player markup: {}",
        stdout
    );
}
