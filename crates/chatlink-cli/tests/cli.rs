use assert_cmd::cargo::cargo_bin_cmd;
use httpmock::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_config(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join("config.toml");
    fs::write(&path, contents).expect("write config");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o600);
        fs::set_permissions(&path, perms).expect("chmod");
    }
    path
}

fn run_json(args: &[&str]) -> Value {
    let output = cargo_bin_cmd!("chatlink")
        .arg("--json")
        .args(args)
        .output()
        .expect("run command");
    assert!(output.status.success(), "command failed: {:?}", output);
    serde_json::from_slice(&output.stdout).expect("parse json")
}

#[test]
fn variations_lists_formats_per_phone() {
    let value = run_json(&["variations", "14155552671", "+abc"]);
    let us = value["14155552671"].as_array().expect("array");
    assert!(us.iter().any(|item| item == "+14155552671"));
    assert!(us.iter().any(|item| item == "(415) 555-2671"));
    let fallback = value["+abc"].as_array().expect("array");
    assert_eq!(fallback.len(), 2);
}

#[test]
fn variations_rejects_blank_phone() {
    let output = cargo_bin_cmd!("chatlink")
        .args(["variations", "  "])
        .output()
        .expect("run command");
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn resolve_unconfigured_platform_is_invalid_input() {
    let temp = TempDir::new().expect("temp dir");
    let config = write_config(temp.path(), "");
    let output = cargo_bin_cmd!("chatlink")
        .args(["--config", config.to_str().expect("path")])
        .args(["resolve", "--platform", "zoho", "14155552671"])
        .output()
        .expect("run command");
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn resolve_matches_hubspot_contact() {
    let server = MockServer::start();
    let search = server.mock(|when, then| {
        when.method(POST)
            .path("/crm/v3/objects/contacts/search")
            .header("authorization", "Bearer secret");
        then.status(200).json_body(json!({
            "results": [
                {"id": "501", "properties": {"phone": null, "mobilephone": "(415) 555-2671"}}
            ]
        }));
    });

    let temp = TempDir::new().expect("temp dir");
    let config = write_config(
        temp.path(),
        &format!(
            "[resolution]\nchunk_delay_ms = 0\n\n[hubspot]\nbase_url = \"{}\"\naccess_token = \"secret\"\n",
            server.base_url()
        ),
    );
    let phones = temp.path().join("phones.json");
    fs::write(&phones, r#"["14155552671", 42, null]"#).expect("write phones");

    let value = run_json(&[
        "--config",
        config.to_str().expect("path"),
        "resolve",
        "--platform",
        "hubspot",
        "--file",
        phones.to_str().expect("path"),
    ]);

    search.assert();
    let reports = value.as_array().expect("array");
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["platform"], "hubspot");
    assert_eq!(reports[0]["status"], "ok");
    assert_eq!(reports[0]["matches"]["14155552671"]["contact_id"], "501");
}

#[test]
fn resolve_reports_failed_platform_without_hiding_the_other() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path("/crm/v3/objects/contacts/search");
        then.status(401).body("expired");
    });
    server.mock(|when, then| {
        when.method(POST).path("/crm/v6/__composite_requests");
        then.status(200).json_body(json!({
            "__composite_requests": [
                {"details": {"response": {"status_code": 200, "body": {
                    "data": [{"id": "z-1", "Phone": "+1 415 555 2671"}]
                }}}}
            ]
        }));
    });

    let temp = TempDir::new().expect("temp dir");
    let config = write_config(
        temp.path(),
        &format!(
            "[resolution]\nchunk_delay_ms = 0\n\n[hubspot]\nbase_url = \"{url}\"\naccess_token = \"stale\"\n\n[zoho]\nbase_url = \"{url}\"\naccess_token = \"token\"\n",
            url = server.base_url()
        ),
    );

    let value = run_json(&[
        "--config",
        config.to_str().expect("path"),
        "resolve",
        "--platform",
        "all",
        "14155552671",
    ]);

    let reports = value.as_array().expect("array");
    assert_eq!(reports.len(), 2);
    assert_eq!(reports[0]["platform"], "hubspot");
    assert_eq!(reports[0]["status"], "failed");
    assert_eq!(reports[1]["platform"], "zoho");
    assert_eq!(reports[1]["matches"]["14155552671"]["contact_id"], "z-1");
}
