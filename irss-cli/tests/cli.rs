use std::process::Command;

use irss_core::persistence::write_macro;
use irss_types::{Command as MacroCommand, CommandKind, Macro};

/// Runs the binary with config and data directories inside `home`, so a
/// developer's own config cannot leak in.
fn irss(home: &std::path::Path, args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_irss"))
        .args(args)
        .env("IRSS_MACRO_DIR", home)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"))
        .env("XDG_DATA_HOME", home.join("data"))
        .output()
        .expect("failed to run irss")
}

fn sample() -> Macro {
    Macro::with_commands(
        "Greeting",
        vec![
            MacroCommand::with_parameters(CommandKind::SetVariable, ["who", "world"]).unwrap(),
            MacroCommand::with_parameters(CommandKind::Popup, ["Hi", "Hello %who%", "1"]).unwrap(),
        ],
    )
}

#[test]
fn test_list_and_dry_run() {
    let dir = tempfile::tempdir().unwrap();
    write_macro(&dir.path().join("Greeting.Macro"), &sample()).unwrap();

    let out = irss(dir.path(), &["list"]);
    assert!(out.status.success());
    assert_eq!(String::from_utf8_lossy(&out.stdout).trim(), "Greeting");

    let out = irss(dir.path(), &["run", "Greeting", "--dry-run"]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("Hello world"));
    assert!(stdout.contains("Greeting: 2 steps, 1 effects, 0 skipped"));
    assert!(stdout.contains("who = world"));
}

#[test]
fn test_show_json() {
    let dir = tempfile::tempdir().unwrap();
    write_macro(&dir.path().join("Greeting.Macro"), &sample()).unwrap();

    let out = irss(dir.path(), &["show", "Greeting", "--json"]);
    assert!(out.status.success());
    let parsed: Macro = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(parsed, sample());
}

#[test]
fn test_missing_macro_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = irss(dir.path(), &["run", "Nope"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("not found"));

    let out = irss(dir.path(), &["bogus"]);
    assert_eq!(out.status.code(), Some(2));
}

#[cfg(target_os = "linux")]
#[test]
fn test_reads_config_from_isolated_home() {
    let dir = tempfile::tempdir().unwrap();
    write_macro(&dir.path().join("Greeting.Macro"), &sample()).unwrap();
    let config_dir = dir.path().join("config").join("irss");
    std::fs::create_dir_all(&config_dir).unwrap();
    std::fs::write(config_dir.join("config.toml"), "[processor]\nmax_steps = 1\n").unwrap();

    let out = irss(dir.path(), &["run", "Greeting", "--dry-run"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("exceeded 1 steps"));
}
