use farmdash::config::{AppConfig, ConfigManager};
use std::fs;
use tempfile::TempDir;

// Helper to create a temporary config directory for testing
fn setup_test_config_dir() -> (TempDir, ConfigManager) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config_manager = ConfigManager::with_dir(temp_dir.path().to_path_buf());
    (temp_dir, config_manager)
}

#[test]
fn test_default_config() {
    let config = AppConfig::default();

    assert_eq!(config.version, "0.1");
    assert_eq!(config.columns.farmer_name, "Name of the  Farmer");
    assert_eq!(config.columns.area, "Total Area Holding (Ha)");
    assert_eq!(config.dashboard.title, "Farmer Information Dashboard");
    assert_eq!(config.dashboard.metrics.len(), 2);
    assert_eq!(config.display.event_poll_interval_ms, 25);
    assert_eq!(config.display.max_bars, 12);
    assert_eq!(config.chart_export.width, 800);
    assert_eq!(config.chart_export.height, 600);
    assert!(config.chart_export.directory.is_none());
    assert_eq!(config.theme.colors.table_selected, "reversed");
    assert!(!config.debug.enabled);
    assert!(config.validate().is_ok());
}

#[test]
fn test_generated_template_is_commented_and_loads_as_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();

    let config_path = config_manager
        .write_default_config(false)
        .expect("Failed to write config");
    let content = fs::read_to_string(&config_path).expect("Failed to read config");

    assert!(content.contains("# [columns]"));
    assert!(content.contains("# [display]"));
    assert!(content.contains("# [chart_export]"));
    assert!(content.contains("# [theme.colors]"));
    assert!(content.contains("# [[dashboard.metrics]]"));
    assert!(content.contains("# version = \"0.1\""));
    // Every setting is commented out
    for line in content.lines() {
        let trimmed = line.trim();
        assert!(
            trimmed.is_empty() || trimmed.starts_with('#'),
            "uncommented line: {}",
            line
        );
    }

    let loaded = AppConfig::load_from(&config_manager).expect("Failed to load config");
    assert_eq!(loaded.columns, AppConfig::default().columns);
    assert_eq!(loaded.dashboard, AppConfig::default().dashboard);
}

#[test]
fn test_write_refuses_overwrite_without_force() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    config_manager.write_default_config(false).unwrap();

    let err = config_manager.write_default_config(false).unwrap_err();
    assert!(err.to_string().contains("--force"));
    assert!(config_manager.write_default_config(true).is_ok());
}

#[test]
fn test_partial_user_config_merges_over_defaults() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    fs::write(
        config_manager.config_path("config.toml"),
        r##"
[columns]
village = "Gram Panchayat"

[dashboard]
title = "Kadapa Farmers"

[[dashboard.metrics]]
label = "Rainfall"
value = "700 mm"

[chart_export]
width = 1024
directory = "charts"

[theme.colors]
focus_border = "#ff8800"
"##,
    )
    .unwrap();

    let config = AppConfig::load_from(&config_manager).expect("Failed to load config");
    assert_eq!(config.columns.village, "Gram Panchayat");
    assert_eq!(config.columns.crop, "Production area for crop");
    assert_eq!(config.dashboard.title, "Kadapa Farmers");
    assert_eq!(config.dashboard.metrics.len(), 1);
    assert_eq!(config.dashboard.metrics[0].label, "Rainfall");
    assert_eq!(config.chart_export.width, 1024);
    assert_eq!(config.chart_export.height, 600);
    assert_eq!(config.chart_export.directory.as_deref(), Some("charts"));
    assert_eq!(config.theme.colors.focus_border, "#ff8800");
    assert_eq!(config.theme.colors.error_border, "red");
}

#[test]
fn test_invalid_config_rejected() {
    let (_temp_dir, config_manager) = setup_test_config_dir();
    let path = config_manager.config_path("config.toml");

    fs::write(&path, "[display]\nmax_bars = 0\n").unwrap();
    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("max_bars"), "{}", err);

    fs::write(&path, "[columns]\nvillage = \"Village\"\ncrop = \"Village\"\n").unwrap();
    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("more than once"), "{}", err);

    fs::write(&path, "[chart_export]\nwidth = 100000\n").unwrap();
    assert!(AppConfig::load_from(&config_manager).is_err());

    fs::write(&path, "[theme.colors]\nwarning = \"not-a-color\"\n").unwrap();
    assert!(AppConfig::load_from(&config_manager).is_err());

    fs::write(&path, "version = \"9.0\"\n").unwrap();
    let err = AppConfig::load_from(&config_manager).unwrap_err();
    assert!(err.to_string().contains("version"), "{}", err);
}
