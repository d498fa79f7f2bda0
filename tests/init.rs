use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_cadence"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "cadence init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".cadence.toml");
    assert!(config_path.exists(), ".cadence.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[analysis]"));
    assert!(content.contains("[scoring.weights]"));

    // Verify it's valid TOML that cadence-core can parse and validate.
    let config = cadence_core::CadenceConfig::from_toml(&content).unwrap();
    assert_eq!(config.analysis.min_anomaly_window, 7);
}

#[test]
fn init_refuses_to_overwrite_without_force() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".cadence.toml"), "[analysis]\n").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_cadence"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success(), "init should refuse to overwrite");

    let forced = Command::new(env!("CARGO_BIN_EXE_cadence"))
        .args(["init", "--force"])
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        forced.status.success(),
        "init --force failed: {}",
        String::from_utf8_lossy(&forced.stderr)
    );
}
