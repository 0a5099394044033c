use super::*;
use crate::report::{Element, ReportSettings};
use std::fs;
use tempfile::TempDir;

fn report(root: &Path) -> Report {
    Report::new(
        ReportSettings {
            report_html: root.join("report/report.html"),
            files_dir: root.join("report/files"),
            tmp_dir: root.join("tmp"),
            line_range: 10,
        },
        "demo",
        "1.0",
    )
}

fn source(root: &Path, name: &str, lines: usize) -> PathBuf {
    let path = root.join(name);
    let content: Vec<String> = (1..=lines).map(|n| format!("value_{n} = {n}")).collect();
    fs::write(&path, content.join("\n")).unwrap();
    path
}

fn lists(report: &Report, section: &str) -> Vec<ReportList> {
    report
        .section(section)
        .unwrap()
        .iter()
        .map(|element| match element {
            Element::List(list) => list.clone(),
            Element::Table(_) => panic!("unexpected table"),
        })
        .collect()
}

#[test]
fn test_issue_spanning_lines_is_focused_and_linked() {
    let temp = TempDir::new().unwrap();
    let file = source(temp.path(), "a.py", 40);
    let mut report = report(temp.path());

    let issue = Issue::new("line too long")
        .in_file(&file)
        .at_lines([10, 11, 12])
        .with_code("E501");
    Issue::report(&[issue], "Style", &mut report).unwrap();

    let snippet = &report.snippets()[0];
    assert_eq!(report.snippets().len(), 1);
    assert_eq!(snippet.range(), (0, 22));
    assert_eq!(snippet.lines()[9].color, Color::Bad);
    assert_eq!(snippet.lines()[11].color, Color::Bad);
    assert_eq!(snippet.lines()[12].color, Color::None);
    assert_eq!(snippet.labels().get(&Color::Bad).map(String::as_str), Some("Finding"));

    let lists = lists(&report, "Style");
    assert_eq!(lists.len(), 1);
    let entry = &lists[0].entries()[0];
    assert_eq!(entry.summary, "line too long");
    assert!(entry.detail.contains("<b>Code</b>: E501"));
    assert!(entry.detail.contains("<b>Lines</b>: 10 - 12"));
    assert!(entry.detail.contains("href=\"files/0.html#10\""));
    assert_eq!(report.total("Style").unwrap(), 1);
}

#[test]
fn test_no_issues_adds_empty_list() {
    let temp = TempDir::new().unwrap();
    let mut report = report(temp.path());

    Issue::report(&[], "Security", &mut report).unwrap();

    let lists = lists(&report, "Security");
    assert_eq!(lists.len(), 1);
    assert_eq!(lists[0].count(), 0);
    assert_eq!(report.total("Security").unwrap(), 0);
}

#[test]
fn test_issues_grouped_by_file_in_first_seen_order() {
    let temp = TempDir::new().unwrap();
    let a = source(temp.path(), "a.py", 20);
    let b = source(temp.path(), "b.py", 20);
    let mut report = report(temp.path());

    let issues = vec![
        Issue::new("first in b").in_file(&b).at_lines([3]),
        Issue::new("first in a").in_file(&a).at_lines([1]),
        Issue::new("second in b").in_file(&b).at_lines([7]),
    ];
    Issue::report(&issues, "Types", &mut report).unwrap();

    let lists = lists(&report, "Types");
    assert_eq!(lists.len(), 2);
    assert!(lists[0].heading.ends_with("b.py"));
    assert_eq!(lists[0].count(), 2);
    assert_eq!(lists[0].entries()[1].summary, "second in b");
    assert!(lists[1].heading.ends_with("a.py"));
    assert_eq!(report.total("Types").unwrap(), 3);
    assert_eq!(report.snippets().len(), 3);
}

#[test]
fn test_identical_findings_share_a_snippet() {
    let temp = TempDir::new().unwrap();
    let a = source(temp.path(), "a.py", 20);
    let mut report = report(temp.path());

    let issues = vec![
        Issue::new("E1").in_file(&a).at_lines([4]),
        Issue::new("E2").in_file(&a).at_lines([4]),
    ];
    Issue::report(&issues, "Style", &mut report).unwrap();

    assert_eq!(report.snippets().len(), 1);
}

#[test]
fn test_issue_without_file() {
    let temp = TempDir::new().unwrap();
    let mut report = report(temp.path());

    Issue::report(&[Issue::new("Something <odd>")], "Style", &mut report).unwrap();

    let lists = lists(&report, "Style");
    assert_eq!(lists[0].heading, "");
    assert_eq!(lists[0].entries()[0].summary, "Something &lt;odd&gt;");
    assert!(report.snippets().is_empty());
}

#[test]
fn test_unreadable_file_is_listed_without_link() {
    let temp = TempDir::new().unwrap();
    let mut report = report(temp.path());
    let missing = temp.path().join("gone.py");

    let issue = Issue::new("vanished").in_file(&missing).at_lines([2]);
    Issue::report(&[issue], "Style", &mut report).unwrap();

    let lists = lists(&report, "Style");
    assert!(!lists[0].entries()[0].detail.contains("href"));
    assert!(report.snippets().is_empty());
}

#[test]
fn test_detail_skips_absent_fields() {
    let issue = Issue::new("x")
        .with_severity("None")
        .with_confidence("")
        .with_url("https://example.org/b101")
        .with_description("Use of assert detected.");
    let detail = issue.detail(None);

    assert!(!detail.contains("None"));
    assert!(!detail.contains("Confidence"));
    assert_eq!(
        detail,
        "<b>More Information</b>: <a href=\"https://example.org/b101\">https://example.org/b101</a><br />Use of assert detected."
    );
}
