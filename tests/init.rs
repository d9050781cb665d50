use std::process::Command;

fn mcp_outline(dir: &std::path::Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_mcp-outline"));
    cmd.current_dir(dir)
        .env_remove("OUTLINE_API_KEY")
        .env_remove("OUTLINE_API_URL")
        .env_remove("MCP_TRANSPORT")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = mcp_outline(dir.path()).arg("init").output().unwrap();

    assert!(
        output.status.success(),
        "mcp-outline init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".mcp-outline.toml");
    assert!(config_path.exists(), ".mcp-outline.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[api]"));
    assert!(content.contains("[cache]"));
    assert!(content.contains("[analysis]"));

    let config: outline_core::OutlineConfig = toml::from_str(&content).unwrap();
    assert_eq!(config.cache.ttl_secs, 300);
    assert!(config.api.key.is_none());
    assert_eq!(config.analysis, outline_core::AnalysisConfig::default());
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".mcp-outline.toml"), "# existing").unwrap();

    let output = mcp_outline(dir.path()).arg("init").output().unwrap();

    assert!(!output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".mcp-outline.toml")).unwrap();
    assert_eq!(content, "# existing");
}

#[test]
fn serve_without_api_key_fails_fast() {
    let dir = tempfile::tempdir().unwrap();

    let output = mcp_outline(dir.path()).arg("serve").output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("OUTLINE_API_KEY"), "stderr was: {stderr}");
}

#[test]
fn doctor_reports_missing_key_as_json() {
    let dir = tempfile::tempdir().unwrap();

    let output = mcp_outline(dir.path())
        .args(["doctor", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let checks = report["checks"].as_array().unwrap();
    let api_key = checks.iter().find(|c| c["name"] == "api_key").unwrap();
    assert_eq!(api_key["status"], "fail");
    assert!(checks.iter().any(|c| c["name"] == "transport" && c["detail"] == "stdio"));
}

#[test]
fn invalid_transport_env_falls_back_to_stdio() {
    let dir = tempfile::tempdir().unwrap();

    let output = mcp_outline(dir.path())
        .env("MCP_TRANSPORT", "carrier-pigeon")
        .args(["doctor", "--json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid transport mode: carrier-pigeon"));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let checks = report["checks"].as_array().unwrap();
    assert!(checks.iter().any(|c| c["name"] == "transport" && c["detail"] == "stdio"));
}
