mod support;

use arbwatch::domain::SortKey;
use arbwatch::error::{ConfigError, Error};
use arbwatch::infrastructure::config::settings::Config;
use rust_decimal_macros::dec;

use support::config::write_temp_config;

#[test]
fn full_file_loads_and_derives_endpoints() {
    let file = write_temp_config(
        r#"
[authority]
base_url = "https://scanner.example.com"
api_prefix = "/v1"
ws_path = "/stream"

[http]
timeout_ms = 3000
retry_max_attempts = 3

[reconnection]
initial_delay_ms = 1000
max_delay_ms = 30000
backoff_multiplier = 2.0

[sync]
limit = 250
min_profit_threshold = 1.5
sort = "liquidity"
resync_on_reconnect = false

[logging]
level = "debug"
format = "json"
"#,
    );

    let config = Config::load(file.path()).unwrap();

    assert_eq!(
        config.api_url().unwrap().as_str(),
        "https://scanner.example.com/v1/"
    );
    assert_eq!(
        config.ws_url().unwrap().as_str(),
        "wss://scanner.example.com/stream"
    );
    assert_eq!(config.http.retry_max_attempts, 3);
    assert_eq!(config.reconnection.backoff_multiplier, 2.0);
    assert!(!config.sync.resync_on_reconnect);
    assert!(config.logging.is_json());

    let params = config.view_params().unwrap();
    assert_eq!(params.min_profit_threshold(), dec!(1.5));
    assert_eq!(params.sort_key(), SortKey::Liquidity);
}

#[test]
fn empty_file_uses_defaults() {
    let file = write_temp_config("");
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.ws_url().unwrap().as_str(), "ws://127.0.0.1:5000/ws");
}

#[test]
fn missing_file_fails_load_but_not_load_or_default() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(matches!(
        Config::load(&path),
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
    assert_eq!(Config::load_or_default(&path).unwrap(), Config::default());
}

#[test]
fn rejects_shrinking_backoff() {
    let file = write_temp_config(
        r#"
[reconnection]
backoff_multiplier = 0.5
"#,
    );

    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "backoff_multiplier",
            ..
        })) => {}
        other => panic!("expected backoff_multiplier error, got {other:?}"),
    }
}

#[test]
fn rejects_limit_above_authority_maximum() {
    let file = write_temp_config("[sync]\nlimit = 501\n");
    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue { field: "limit", .. }))
    ));
}

#[test]
fn rejects_unknown_sort_key() {
    let file = write_temp_config("[sync]\nsort = \"volume\"\n");
    let err = Config::load(file.path()).unwrap_err();
    assert!(err.to_string().contains("volume"), "{err}");
}

#[test]
fn rejects_websocket_base_url() {
    let file = write_temp_config("[authority]\nbase_url = \"ws://127.0.0.1:5000\"\n");
    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "base_url",
            ..
        }))
    ));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let file = write_temp_config("[sync\nlimit = ");
    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::Parse(_)))
    ));
}

#[test]
fn view_overrides_are_validated() {
    let config = Config::default()
        .with_view(Some(dec!(3)), Some(SortKey::Recent))
        .unwrap();
    assert_eq!(config.sync.sort, "recent");
    assert_eq!(config.view_params().unwrap().min_profit_threshold(), dec!(3));

    assert!(Config::default().with_view(Some(dec!(-0.1)), None).is_err());
}

#[test]
fn example_config_matches_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/config.toml.example");
    assert_eq!(Config::load(path).unwrap(), Config::default());
}
