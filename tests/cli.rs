//! Runs the built binary against temp directories.
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_config-gui-gen"))
}

fn sample(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("samples").join(name)
}

fn run(args: &[&str]) -> Output {
    bin().args(args).output().unwrap()
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn generate_writes_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("config.py");
    let result = run(&["generate", "-i", arg(&sample("basic.html")), "-o", arg(&out)]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let text = std::fs::read_to_string(&out).unwrap();
    assert!(text.contains("class ConfigData:"));
    assert!(text.contains("class ConfigWindow(QWidget):"));
}

#[test]
fn generate_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("config.py");
    std::fs::write(&out, "keep me").unwrap();

    let result = run(&["generate", "-i", arg(&sample("basic.html")), "-o", arg(&out)]);
    assert!(!result.status.success());
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "keep me");

    let result = run(&["generate", "-i", arg(&sample("basic.html")), "-o", arg(&out), "--force"]);
    assert!(result.status.success());
    assert_ne!(std::fs::read_to_string(&out).unwrap(), "keep me");
}

#[test]
fn generate_splits_data_class() {
    let dir = tempfile::tempdir().unwrap();
    let window = dir.path().join("window.py");
    let data = dir.path().join("settings_data.py");
    let result = run(&[
        "generate", "-i", arg(&sample("account_zh.html")), "-o", arg(&window), "--data-out", arg(&data), "-m", "PySide6",
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let window = std::fs::read_to_string(&window).unwrap();
    let data = std::fs::read_to_string(&data).unwrap();
    assert!(window.contains("from settings_data import ConfigData"));
    assert!(window.contains("from PySide6.QtWidgets import *"));
    assert!(data.contains("class ConfigData:"));
    assert!(!data.contains("class ConfigWindow"));
}

#[test]
fn unsupported_binding_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("config.py");
    let result = run(&["generate", "-i", arg(&sample("basic.html")), "-o", arg(&out), "-m", "Tkinter"]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("not supported"));
    assert!(!out.exists());
}

#[test]
fn invalid_form_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad.html");
    let out = dir.path().join("config.py");
    std::fs::write(&input, r#"<html><body><div><label>A</label><input id="1a"></div></body></html>"#).unwrap();

    let result = run(&["generate", "-i", arg(&input), "-o", arg(&out)]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("1a"));
    assert!(!out.exists());
}

#[test]
fn defaults_prints_payload() {
    let result = run(&["defaults", "-i", arg(&sample("basic.html"))]);
    assert!(result.status.success());
    let payload: serde_json::Value = serde_json::from_slice(&result.stdout).unwrap();
    assert_eq!(payload, serde_json::json!({ "user_name": "", "age": 18 }));
}

#[test]
fn model_writes_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("model").join("basic.json");
    let result = run(&["model", "-i", arg(&sample("basic.html")), "-o", arg(&out)]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));

    let model: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(model["title"], "Settings");
    assert_eq!(model["content"][1]["node"], "group");
    assert_eq!(model["content"][1]["items"][0]["type"], "number");
}

#[test]
fn check_reports_every_file() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.html");
    std::fs::write(&bad, "<html><body><fieldset id=\"g\"></fieldset></body></html>").unwrap();

    let pattern = sample("*.html").display().to_string();
    let result = run(&["check", &pattern]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stdout));

    let result = run(&["check", arg(&sample("basic.html")), arg(&bad)]);
    assert!(!result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("basic.html"));
    assert!(stdout.contains("contains no fields"));
}

#[test]
fn check_rejects_reserved_ids() {
    let dir = tempfile::tempdir().unwrap();
    let form = dir.path().join("reserved.html");
    std::fs::write(&form, r#"<html><body><div><label>A</label><input id="save"></div></body></html>"#).unwrap();

    let result = run(&["check", arg(&form)]);
    assert!(!result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    assert!(stdout.contains("error"), "{stdout}");
    assert!(stdout.contains("save"), "{stdout}");
}

#[test]
fn generate_rejects_one_path_for_both_outputs() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("config.py");
    let result = run(&["generate", "-i", arg(&sample("basic.html")), "-o", arg(&out), "--data-out", arg(&out)]);
    assert!(!result.status.success());
    assert!(String::from_utf8_lossy(&result.stderr).contains("both point to"));
    assert!(!out.exists());
}

#[test]
fn failed_window_write_removes_the_data_file() {
    let dir = tempfile::tempdir().unwrap();
    let data = dir.path().join("settings_data.py");
    // a directory in the way makes the final rename fail
    let window = dir.path().join("window.py");
    std::fs::create_dir(&window).unwrap();
    std::fs::write(window.join("keep"), "").unwrap();

    let result = run(&[
        "generate", "-i", arg(&sample("basic.html")), "-o", arg(&window), "--data-out", arg(&data), "--force",
    ]);
    assert!(!result.status.success());
    assert!(!data.exists());
}

#[test]
fn bindings_lists_builtin_modules() {
    let result = run(&["bindings"]);
    assert!(result.status.success());
    let stdout = String::from_utf8_lossy(&result.stdout);
    for module in ["PYQT5", "PYQT6", "PYSIDE2", "PYSIDE6"] {
        assert!(stdout.contains(module), "{module} missing");
    }
}

#[test]
fn bindings_file_adds_a_module() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("bindings.json");
    std::fs::write(&file, r#"[{ "language": "Python3", "module": "QtPy", "module_name": "qtpy" }]"#).unwrap();

    let result = run(&["bindings", "--bindings", arg(&file)]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert!(String::from_utf8_lossy(&result.stdout).contains("QTPY"));

    let out = dir.path().join("config.py");
    let result = run(&[
        "generate", "-i", arg(&sample("basic.html")), "-o", arg(&out), "-m", "qtpy", "--bindings", arg(&file),
    ]);
    assert!(result.status.success(), "{}", String::from_utf8_lossy(&result.stderr));
    assert!(std::fs::read_to_string(&out).unwrap().contains("from qtpy.QtWidgets import *"));
}
