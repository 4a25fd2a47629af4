//! Config file handling for the demo binary.
//!
//! Run:
//!   cargo test -p navdrop-demo --test config_file

use std::fs;

use clap::Parser;
use navdrop_demo::{Cli, DemoError, run};
use tempfile::tempdir;

fn run_with(args: &[&str]) -> Result<String, DemoError> {
    let cli = Cli::try_parse_from(std::iter::once("navdrop-demo").chain(args.iter().copied()))
        .expect("arguments parse");
    let mut out = Vec::new();
    run(cli, &mut out)?;
    Ok(String::from_utf8(out).expect("utf-8 transcript"))
}

#[test]
fn toml_config_changes_durations() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("navdrop.toml");
    fs::write(
        &path,
        "[transition]\nduration_ms = 300\nfade_delay_ms = 0\n",
    )
    .unwrap();

    let text = run_with(&["--config", path.to_str().unwrap()]).unwrap();
    assert!(text.contains("panel.opacity -> 1 (300ms)"), "{text}");
}

#[test]
fn json_config_moves_touch_threshold() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("navdrop.json");
    fs::write(
        &path,
        r#"{ "interaction": { "touch_mode_max_viewport_height": 1000.0 } }"#,
    )
    .unwrap();

    // 800px is hover mode by default; with the raised threshold hover is ignored.
    let text = run_with(&["--config", path.to_str().unwrap(), "--viewport-height", "800"]).unwrap();
    assert!(text.contains("hover-start Products\n"), "{text}");
    assert!(!text.contains("hover-start Products (open"), "{text}");
}

#[test]
fn invalid_config_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[transition]\nduration_ms = 0\n").unwrap();

    let err = run_with(&["--config", path.to_str().unwrap()]).unwrap_err();
    assert!(matches!(err, DemoError::Config(_)));
    assert_eq!(err.exit_code(), 3);
    assert!(err.to_string().contains("duration_ms must be > 0"));
}

#[test]
fn missing_config_is_an_io_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = run_with(&["--config", path.to_str().unwrap()]).unwrap_err();
    assert!(err.to_string().starts_with("failed to load config: I/O error"));
}
