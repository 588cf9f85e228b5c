use std::io::Write;

use crate::config::{ConfigError, MeterConfig};
use crate::monitor::{EvaluationSource, MonitorRegistry};

#[test]
fn load_from_file_overrides_defaults() {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(
        file,
        r#"
[window]
max_samples = 50
retention_secs = 7200

[estimator]
lookback = 8

[display]
utc_offset_minutes = 330

[monitor]
source = "live"
default_threshold = 42.5
"#
    )
    .unwrap();

    let cfg = MeterConfig::load(Some(file.path())).unwrap();
    assert_eq!(cfg.window.max_samples, 50);
    assert_eq!(cfg.window.retention_secs, Some(7200.0));
    assert_eq!(cfg.estimator.lookback, 8);
    assert_eq!(cfg.display.utc_offset_minutes, 330);
    assert_eq!(cfg.monitor.source, EvaluationSource::Live);
    assert_eq!(cfg.monitor.default_threshold, 42.5);
    // untouched sections keep their defaults
    assert_eq!(cfg.gauge.min, -500.0);
    assert_eq!(cfg.monitor.max_topics, 64);
}

#[test]
fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(matches!(
        MeterConfig::load(Some(path.as_path())),
        Err(ConfigError::Load(_))
    ));
}

#[test]
fn invalid_file_values_fail_validation() {
    let err = MeterConfig::from_toml_str("[gauge]\nmin = 10\nmax = 5\n").unwrap_err();
    assert!(matches!(err, ConfigError::Gauge(_)));
    let err = MeterConfig::from_toml_str("[window]\nmax_samples = 1\n").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { field: "window.max_samples", .. }));
}

#[test]
fn extreme_utc_offset_is_rejected() {
    for offset in [i32::MIN, i32::MAX, 1440, -1440] {
        let text = format!("[display]\nutc_offset_minutes = {offset}\n");
        let err = MeterConfig::from_toml_str(&text).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { field: "display.utc_offset_minutes", .. }
        ));
    }
    let cfg = MeterConfig::from_toml_str("[display]\nutc_offset_minutes = -1439\n").unwrap();
    assert_eq!(cfg.display.utc_offset_minutes, -1439);
}

#[test]
fn rendered_toml_loads_back() {
    let mut cfg = MeterConfig::default();
    cfg.window.retention_secs = Some(600.0);
    cfg.monitor.source = EvaluationSource::Forecast;
    let text = cfg.to_toml().unwrap();
    assert!(text.contains("[monitor]"));
    assert_eq!(MeterConfig::from_toml_str(&text).unwrap(), cfg);
}

#[test]
fn registry_uses_configured_threshold() {
    let cfg = MeterConfig::from_toml_str("[monitor]\ndefault_threshold = 7\n").unwrap();
    let mut reg = MonitorRegistry::from_config(&cfg).unwrap();
    assert_eq!(reg.monitor("site/pump").threshold(), 7.0);
}
