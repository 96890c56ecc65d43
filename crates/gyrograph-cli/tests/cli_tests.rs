//! End-to-end tests of the `gyrograph` binary: stdout JSON and exit codes.

use std::fs;
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::tempdir;

fn gyrograph(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_gyrograph"))
        .args(args)
        .env_remove("GYROGRAPH_CONFIG")
        .env_remove("WOLFRAM_APP_ID")
        .env_remove("RUST_LOG")
        .output()
        .expect("run gyrograph")
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}\nstderr: {}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

fn scalar(value: &Value) -> f64 {
    assert_eq!(value["result"]["type"], "scalar", "{value}");
    value["result"]["value"].as_f64().expect("scalar result")
}

#[test]
fn test_compute_distance() {
    let output = gyrograph(&["compute", "distance", "p:0,0,0", "p:0.5,0,0"]);
    assert_eq!(output.status.code(), Some(0));

    let json = stdout_json(&output);
    assert_eq!(json["operation"], "distance");
    assert_eq!(json["model"], "poincare");
    assert!((scalar(&json) - 0.5f64.atanh()).abs() < 1e-15);
    assert!(json["validation"].is_null());
}

#[test]
fn test_curvature_flag_rescales_distance() {
    let output = gyrograph(&[
        "--curvature",
        "-4",
        "compute",
        "distance",
        "p:0,0,0",
        "p:0.25,0,0",
    ]);
    assert_eq!(output.status.code(), Some(0));

    // c = 4: atanh(sqrt(c) * 0.25) / sqrt(c)
    let expected = 0.5f64.atanh() / 2.0;
    assert!((scalar(&stdout_json(&output)) - expected).abs() < 1e-15);
}

#[test]
fn test_config_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("space.toml");
    fs::write(&config_path, "curvature = -4.0\ndimension = 2\n").unwrap();

    let output = gyrograph(&[
        "--config",
        config_path.to_str().unwrap(),
        "compute",
        "identity",
        "--model",
        "hyperboloid",
    ]);
    assert_eq!(output.status.code(), Some(0));

    // Hyperboloid origin (1/sqrt(c), 0, 0)
    let json = stdout_json(&output);
    let coords: Vec<f64> = json["result"]["value"]["coords"]
        .as_array()
        .expect("point coordinates")
        .iter()
        .map(|v| v.as_f64().unwrap())
        .collect();
    assert_eq!(coords, vec![0.5, 0.0, 0.0]);
}

#[test]
fn test_verify_with_reference_oracle() {
    let output = gyrograph(&["verify", "add", "p:0.3,0.4,0", "p:0.1,0.2,0.5"]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));

    let json = stdout_json(&output);
    assert_eq!(json["result"]["type"], "point");
    assert_eq!(json["validation"]["status"], "CONFIRMED");
    assert_eq!(json["validation"]["checks"].as_array().unwrap().len(), 3);
}

#[test]
fn test_verify_parallel_transport() {
    let output = gyrograph(&["verify", "parallel_transport", "v:1,0,0", "p:0.3,0.4,0", "p:-0.1,0.2,0.5"]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout_json(&output)["validation"]["status"], "CONFIRMED");
}

#[test]
fn test_required_validation_without_description_exits_1() {
    // ball operations on Klein coordinates have no symbolic description
    let args = ["midpoint", "p:0.1,0,0", "p:0,0.1,0", "--model", "klein"];

    let optional = gyrograph(&[&["compute"], &args[..], &["--validate", "reference"]].concat());
    assert_eq!(optional.status.code(), Some(0));
    assert_eq!(stdout_json(&optional)["validation"]["status"], "UNAVAILABLE");

    let required = gyrograph(&[&["verify"], &args[..]].concat());
    assert_eq!(required.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&required.stderr).contains("validation unavailable"));
}

#[test]
fn test_invalid_input_exits_1() {
    for args in [
        &["compute", "add", "p:1.5,0,0", "p:0,0,0"][..],
        &["compute", "frobnicate", "p:0,0,0"][..],
        &["compute", "add", "p:0.1,0.2", "0.3"][..],
        &["--curvature", "1", "compute", "identity"][..],
        &["compute", "distance", "p:0,0,0", "p:0.1,0,0", "--validate", "wolfram"][..],
    ] {
        let output = gyrograph(args);
        assert_eq!(output.status.code(), Some(1), "{args:?}");
        assert!(output.stdout.is_empty(), "{args:?}");
        assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"), "{args:?}");
    }
}

#[test]
fn test_batch_from_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("requests.json");
    fs::write(
        &input,
        r#"[
            {"operation": "to_klein", "model": "poincare", "args": [{"type": "point", "value": [0.5, 0]}]},
            {"operation": "scale", "model": "poincare",
             "args": [{"type": "scalar", "value": 2.0}, {"type": "point", "value": [0.5, 0]}]}
        ]"#,
    )
    .unwrap();

    let output = gyrograph(&[
        "--dimension",
        "2",
        "batch",
        "--input",
        input.to_str().unwrap(),
        "--cache",
        "8",
        "--format",
        "compact",
    ]);
    assert_eq!(output.status.code(), Some(0), "{}", String::from_utf8_lossy(&output.stderr));

    let entries = stdout_json(&output);
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert!(entries.iter().all(|e| e["status"] == "ok"));

    // 2 * 0.5 / (1 + 0.25) = 0.8
    let klein = entries[0]["result"]["value"]["coords"][0].as_f64().unwrap();
    assert!((klein - 0.8).abs() < 1e-15);
    // tanh(2 atanh 0.5) = 0.8
    let scaled = entries[1]["result"]["value"]["coords"][0].as_f64().unwrap();
    assert!((scaled - 0.8).abs() < 1e-15);
}

#[test]
fn test_operations_listing() {
    let output = gyrograph(&["operations", "--format", "json"]);
    assert_eq!(output.status.code(), Some(0));

    let table = stdout_json(&output);
    let names: Vec<&str> = table
        .as_array()
        .unwrap()
        .iter()
        .map(|op| op["name"].as_str().unwrap())
        .collect();
    assert_eq!(names.len(), 13);
    assert!(names.contains(&"mobius_transform"));
}
