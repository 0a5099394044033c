//! Adapter lifecycle tests

use super::*;
use crate::cli::Output;
use crate::report::{Element, ReportSettings};
use tempfile::TempDir;

fn disabled_config(temp: &TempDir) -> TidyConfig {
    let mut config = TidyConfig::defaults().unwrap();
    config.paths.base = temp.path().to_path_buf();
    config.tools.style.enabled = false;
    config.tools.types.enabled = false;
    config.tools.security.enabled = false;
    config.tools.test.enabled = false;
    config.tools.versions.enabled = false;
    config.tools.docs.enabled = false;
    config.tools.build.enabled = false;
    config
}

#[test]
fn test_base_vars() {
    let temp = TempDir::new().unwrap();
    let config = disabled_config(&temp);
    let vars = base_vars(&config.paths);

    let expanded = vars.expand("run {src} {tmp}");
    assert!(expanded.contains(&format!("{}", config.paths.src_dir().display())));
    assert!(expanded.ends_with("tmp") || expanded.ends_with("tmp'"));
    assert_eq!(vars.expand("{unknown}"), "{unknown}");
}

#[test]
fn test_skipped_list_counts_nothing() {
    let list = skipped_list();
    assert_eq!(list.entries()[0].summary, "Skipped.");
    assert_eq!(list.summary, Some(Summary::new("Skipped", 0, "")));
}

#[tokio::test]
async fn test_disabled_checks_pass_and_report_skipped() {
    let temp = TempDir::new().unwrap();
    let config = disabled_config(&temp);
    let output = Output::silent();
    let runner = Runner::new(&output, temp.path(), 0);
    let mut report = Report::new(ReportSettings::from_config(&config), "demo", "1.0");

    let mut checks = Checks::new(&config);
    assert!(checks.security.run(&runner).await.unwrap());
    assert!(checks.style.run(&runner).await.unwrap());
    assert!(checks.types.run(&runner).await.unwrap());
    assert!(checks.test.run(&runner).await.unwrap());
    assert!(checks.versions.run(&runner).await.unwrap());
    assert!(checks.docs.run(&runner).await.unwrap());

    checks.versions.report(&mut report).unwrap();
    checks.test.report(&mut report).unwrap();
    checks.docs.report(&mut report).unwrap();
    checks.security.report(&mut report).unwrap();
    checks.style.report(&mut report).unwrap();
    checks.types.report(&mut report).unwrap();

    for section in ["Versions", "Test", "Documentation", "Dependencies", "Security", "Style", "Types"] {
        let elements = report.section(section).unwrap();
        let Element::List(list) = &elements[0] else {
            panic!("expected a list in {section}");
        };
        assert_eq!(list.entries()[0].summary, "Skipped.");
        assert_eq!(report.total(section).unwrap(), 0);
    }

    let mut build = Build::new(&config);
    assert!(build.run(&runner).await.unwrap());
    assert!(build.is_passed());
}
