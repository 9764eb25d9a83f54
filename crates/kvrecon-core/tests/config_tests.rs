#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::RecordingKv;
use kvrecon_core::{Change, Format, ReconcileError, Reconciler, StoreConfig, DEFAULT_IGNORE_VALUE};
use serde_json::json;

#[test]
fn test_toml_sentinel_drives_filtering() {
    // GIVEN a TOML storage section with a custom sentinel
    let config = StoreConfig::from_toml_str(
        r#"
addr = "http://127.0.0.1:8500"
ignore = "<unchanged>"
"#,
    )
    .expect("config should parse");
    let endpoint = config.endpoint().expect("endpoint should be set");
    assert_eq!(endpoint.scheme, "http");
    assert_eq!(endpoint.host, "127.0.0.1:8500");

    // WHEN a document uses that sentinel
    let kv = RecordingKv::new(&[("db/password", "s3cret")]);
    let reconciler = Reconciler::new(&kv, config);
    let changes = reconciler
        .changes(b"db:\n  password: <unchanged>\n  user: app\n", Format::Yaml, "")
        .unwrap();

    // THEN the sentinel key is left alone
    assert_eq!(changes.as_slice(), &[Change::add("db/user", "app")]);
}

#[test]
fn test_map_without_ignore_uses_default() {
    let map = json!({"addr": "https://kv.example.com"});
    let config = StoreConfig::from_map(map.as_object().unwrap()).unwrap();

    assert_eq!(config.ignore_value(), DEFAULT_IGNORE_VALUE);
    assert_eq!(config.endpoint().unwrap().host, "kv.example.com");
}

#[test]
fn test_empty_addr_means_client_default() {
    let map = json!({"addr": ""});
    let config = StoreConfig::from_map(map.as_object().unwrap()).unwrap();

    assert!(config.endpoint().is_none());
}

#[test]
fn test_invalid_addr_is_config_error() {
    for addr in ["not a url", "mailto:ops@example.com"] {
        let map = json!({ "addr": addr });
        let err = StoreConfig::from_map(map.as_object().unwrap()).unwrap_err();
        assert!(
            matches!(err, ReconcileError::Config { .. }),
            "{} should be rejected, got {:?}",
            addr,
            err
        );
    }
}

#[test]
fn test_toml_missing_addr_is_config_error() {
    let err = StoreConfig::from_toml_str("ignore = \"x\"\n").unwrap_err();

    assert_eq!(
        err,
        ReconcileError::Config {
            reason: "addr is missing".to_string()
        }
    );
}
