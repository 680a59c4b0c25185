mod common;

use acdp_builder::config::PipelineConfig;
use common::fixtures;

#[test]
fn default_lower_limit_derives_from_percent_range() {
    let config = fixtures::config(5.0, 1000, 10.0);
    let band = config.validate().expect("valid config");
    assert_eq!(band.upper_limit, 1100);
    assert_eq!(band.lower_limit, 100);
}

#[test]
fn explicit_lower_limit_overrides_the_derived_value() {
    let mut config = fixtures::config(5.0, 1000, 10.0);
    config.lower_limit = Some(900);
    let band = config.validate().expect("valid config");
    assert_eq!(band.lower_limit, 900);
}

#[test]
fn zero_buffer_step_is_rejected() {
    let mut config = fixtures::config(0.0, 1000, 10.0);
    config.buffer_step = 0.0;
    assert!(config.validate().is_err());
}

#[test]
fn percent_range_outside_0_to_100_is_rejected() {
    let mut config = fixtures::config(5.0, 1000, 150.0);
    config.percent_range = 150.0;
    assert!(config.validate().is_err());
}

#[test]
fn a_lower_limit_at_or_above_the_upper_limit_is_rejected() {
    let mut config = fixtures::config(5.0, 1000, 10.0);
    config.lower_limit = Some(5000);
    assert!(config.validate().is_err());
}

#[test]
fn unknown_config_file_extension_is_rejected() {
    let dir = std::env::temp_dir().join(format!("acdp-config-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.yaml");
    std::fs::write(&path, "input_seeds: x").unwrap();

    let result = PipelineConfig::from_file(&path);
    assert!(result.is_err());

    std::fs::remove_dir_all(&dir).unwrap();
}
