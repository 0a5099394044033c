use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn test_defaults_load() {
    let config = TidyConfig::defaults().unwrap();
    assert_eq!(config.report.line_range, 10);
    assert_eq!(config.report.sections.style, "Style");
    assert_eq!(config.report.sections.dependencies, "Dependencies");
    assert_eq!(config.paths.project_config, PathBuf::from("setup.cfg"));
    assert_eq!(config.tools.timeout_secs, 0);
    assert!(config.tools.style.enabled);
    assert!(config.validate().is_ok());
}

#[test]
fn test_default_thresholds() {
    let config = TidyConfig::defaults().unwrap();
    assert_eq!(config.badges.test_coverage.color_gte(95.0), "yellow");
    assert_eq!(config.badges.security_issues.color_lte(0.0), "brightgreen");
    assert_eq!(config.badges.security_issues.color_lte(3.0), "red");
}

#[test]
fn test_custom_config_overrides_defaults() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("custom.toml");
    fs::write(
        &path,
        r#"
[report]
line_range = 3

[tools.style]
enabled = false
"#,
    )
    .unwrap();

    let config = TidyConfig::load_with_custom_config(path.to_str()).unwrap();
    assert_eq!(config.report.line_range, 3);
    assert!(!config.tools.style.enabled);
    // Untouched keys keep their defaults
    assert_eq!(config.report.sections.test, "Test");
    assert!(config.tools.types.enabled);
}

#[test]
fn test_custom_yaml_config() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("custom.yaml");
    fs::write(&path, "paths:\n  readme: docs/README.md\n").unwrap();

    let config = TidyConfig::load_with_custom_config(path.to_str()).unwrap();
    assert_eq!(config.paths.readme, PathBuf::from("docs/README.md"));
}

#[test]
fn test_missing_custom_config_uses_defaults() {
    let config = TidyConfig::load_with_custom_config(Some("non_existent.toml"));
    assert!(config.is_ok());
}

#[test]
fn test_validate_rejects_bad_values() {
    let mut config = TidyConfig::defaults().unwrap();
    config.report.line_range = 0;
    assert!(config.validate().is_err());

    let mut config = TidyConfig::defaults().unwrap();
    config.report.sections.types = "Style".to_string();
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("Duplicate"));

    let mut config = TidyConfig::defaults().unwrap();
    config.report.sections.test = "  ".to_string();
    assert!(config.validate().is_err());

    let mut config = TidyConfig::defaults().unwrap();
    config.badges.doc_coverage = Thresholds::default();
    assert!(config.validate().is_err());
}

#[test]
fn test_validate_rejects_bad_requirements_glob() {
    let mut config = TidyConfig::defaults().unwrap();
    config.tools.security.requirements_glob = "requirements[*.txt".to_string();
    let err = config.validate().unwrap_err().to_string();
    assert!(err.contains("requirements_glob"));
}

#[test]
fn test_paths_resolve_against_base() {
    let mut config = TidyConfig::defaults().unwrap();
    config.paths.base = PathBuf::from("/project");
    assert_eq!(config.paths.report_html(), PathBuf::from("/project/report/report.html"));
    assert_eq!(config.paths.tmp_file("style.json"), PathBuf::from("/project/tmp/style.json"));
}

#[test]
fn test_export_formats() {
    let config = TidyConfig::defaults().unwrap();

    let json = config.export_config(ConfigFormat::Json).unwrap();
    assert!(json.contains("\"line_range\": 10"));

    let toml = config.export_config(ConfigFormat::Toml).unwrap();
    assert!(toml.contains("line_range = 10"));

    let yaml = config.export_config(ConfigFormat::Yaml).unwrap();
    assert!(yaml.contains("line_range: 10"));

    // Falls back to plain text outside a terminal
    assert!(config.export_config_highlighted(ConfigFormat::Json).is_ok());
}

#[test]
fn test_format_parsing() {
    assert_eq!("YML".parse::<ConfigFormat>().unwrap(), ConfigFormat::Yaml);
    assert!("ini".parse::<ConfigFormat>().is_err());
}
