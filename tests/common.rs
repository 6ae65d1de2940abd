use std::sync::Arc;
use std::time::Duration;

use figment::{
    providers::{Format, Yaml},
    Figment,
};
use sessiontron::config::{load_config_from, ConfigV1};
use sessiontron::signal::SignalBus;
use sessiontron::startup::App;

const TEST_CONFIG: &str = r#"
version: "1.0.0"
api:
  base_url: "{base_url}"
  timeout_in_ms: 3000
session:
  refresh_on_startup: {refresh_on_startup}
  refresh_timeout_in_ms: 2000
  signal_key: "logout"
logging:
  level: "debug"
  format: "json"
"#;

pub fn test_config(base_url: &str, refresh_on_startup: bool) -> Arc<ConfigV1> {
    let yaml = TEST_CONFIG
        .replace("{base_url}", base_url)
        .replace("{refresh_on_startup}", &refresh_on_startup.to_string());

    let config = load_config_from(Figment::new().merge(Yaml::string(&yaml)))
        .expect("test config should parse");
    Arc::new(config)
}

/// One context talking to `base_url`, attached to `bus`.
pub fn build_app(base_url: &str, bus: &SignalBus) -> App {
    App::build(test_config(base_url, false), bus).expect("app should build")
}

/// Polls `condition` until it holds, failing the test after two seconds.
#[allow(dead_code)]
pub async fn wait_until(what: &str, condition: impl Fn() -> bool) {
    let waited = tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await;
    assert!(waited.is_ok(), "timed out waiting for {}", what);
}
