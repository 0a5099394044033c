use std::path::Path;

use super::elements::{Element, ReportList, ReportTable, Summary};
use super::snippet::{CodeSnippet, Color};
use crate::utils::html_escape;

const STYLE: &str = r#"
        body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }
        .container { max-width: 1200px; margin: 0 auto; background: white; padding: 30px; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); }
        .header { border-bottom: 3px solid #34495e; padding-bottom: 20px; margin-bottom: 30px; }
        .header p { color: #7f8c8d; margin: 4px 0; }
        .overview { display: grid; grid-template-columns: repeat(auto-fit, minmax(160px, 1fr)); gap: 15px; margin: 20px 0; }
        .stat-card { background: #f8f9fa; padding: 15px; border-radius: 6px; text-align: center; text-decoration: none; color: inherit; }
        .stat-number { font-size: 2em; font-weight: bold; color: #2c3e50; }
        .section { margin: 30px 0; }
        .section-header { background: #34495e; color: white; padding: 15px; border-radius: 4px 4px 0 0; display: flex; justify-content: space-between; }
        .section-content { border: 1px solid #34495e; border-top: none; border-radius: 0 0 4px 4px; padding: 10px 15px; }
        h3 { font-family: monospace; color: #2980b9; word-break: break-all; }
        details { border-bottom: 1px solid #eee; padding: 8px 0; }
        details summary { cursor: pointer; }
        details div { padding: 8px 20px; color: #444; }
        .empty { color: #27ae60; padding: 8px 0; }
        table { width: 100%; border-collapse: collapse; margin: 0; }
        th, td { padding: 10px; text-align: left; border-bottom: 1px solid #ddd; }
        th { background: #ecf0f1; font-weight: 600; }
        tr:hover { background: #f8f9fa; }
        pre { margin: 0; font-size: 0.9em; }
        .code td { padding: 0 8px; border: none; font-family: monospace; white-space: pre; }
        .code td.lineno { color: #95a5a6; text-align: right; user-select: none; }
        .good { background: #d4efdf; }
        .bad { background: #f5b7b1; }
        .neutral { background: #fcf3cf; }
        .legend span { display: inline-block; padding: 2px 10px; margin-right: 8px; border-radius: 3px; }
"#;

fn page(title: &str, header: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>{STYLE}    </style>
</head>
<body>
    <div class="container">
        <div class="header">
{header}
        </div>
{body}
    </div>
</body>
</html>
"#
    )
}

fn anchor(section: &str) -> String {
    let slug: String = section
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '-' })
        .collect();
    format!("section-{slug}")
}

/// The main report document
pub(super) struct MainPage<'a> {
    pub app_name: &'a str,
    pub version: &'a str,
    pub timestamp: &'a str,
    pub sections: &'a [(String, Vec<Element>)],
    pub summaries: &'a [Summary],
}

impl MainPage<'_> {
    pub fn render(&self) -> String {
        let title = format!("{} {} Report", self.app_name, self.version);
        let header = format!(
            "            <h1>{}</h1>\n            <p>Version {}</p>\n            <p>Generated on {}</p>",
            html_escape(self.app_name),
            html_escape(self.version),
            html_escape(self.timestamp)
        );

        let mut body = String::from("        <div class=\"overview\">\n");
        for ((name, _), summary) in self.sections.iter().zip(self.summaries) {
            body.push_str(&format!(
                r##"            <a class="stat-card" href="#{}">
                <div class="stat-number">{}{}</div>
                <div>{} {}</div>
            </a>
"##,
                anchor(name),
                summary.value,
                html_escape(&summary.unit),
                html_escape(name),
                html_escape(&summary.name),
            ));
        }
        body.push_str("        </div>\n");

        for ((name, elements), summary) in self.sections.iter().zip(self.summaries) {
            body.push_str(&format!(
                r#"
        <div class="section" id="{}">
            <div class="section-header">
                <span>{}</span>
                <span>{}: {} {}</span>
            </div>
            <div class="section-content">
"#,
                anchor(name),
                html_escape(name),
                html_escape(&summary.name),
                summary.value,
                html_escape(&summary.unit),
            ));

            for element in elements {
                match element {
                    Element::List(list) => body.push_str(&render_list(list)),
                    Element::Table(table) => body.push_str(&render_table(table)),
                }
            }

            body.push_str("            </div>\n        </div>\n");
        }

        page(&html_escape(&title), &header, &body)
    }
}

fn render_heading(heading: &str) -> String {
    if heading.is_empty() {
        String::new()
    } else {
        format!("                <h3>{}</h3>\n", html_escape(heading))
    }
}

// Entry summaries and details are HTML fragments composed by the adapters.
fn render_list(list: &ReportList) -> String {
    let mut out = render_heading(&list.heading);

    if list.entries().is_empty() {
        out.push_str("                <div class=\"empty\">No issues found.</div>\n");
        return out;
    }

    for entry in list.entries() {
        if entry.detail.is_empty() {
            out.push_str(&format!(
                "                <details><summary>{}</summary></details>\n",
                entry.summary
            ));
        } else {
            out.push_str(&format!(
                "                <details><summary>{}</summary><div>{}</div></details>\n",
                entry.summary, entry.detail
            ));
        }
    }
    out
}

fn render_table(table: &ReportTable) -> String {
    let mut out = render_heading(&table.heading);
    out.push_str("                <table>\n                    <thead><tr>");
    for column in table.columns() {
        out.push_str(&format!("<th>{}</th>", html_escape(column)));
    }
    out.push_str("</tr></thead>\n                    <tbody>\n");
    for row in table.rows() {
        out.push_str("                        <tr>");
        for value in row {
            out.push_str(&format!("<td>{value}</td>"));
        }
        out.push_str("</tr>\n");
    }
    out.push_str("                    </tbody>\n                </table>\n");
    out
}

/// A page showing one highlighted code snippet
pub(super) struct SnippetPage<'a> {
    pub app_name: &'a str,
    pub version: &'a str,
    pub timestamp: &'a str,
    pub snippet: &'a CodeSnippet,
    pub main_link: &'a Path,
}

impl SnippetPage<'_> {
    pub fn render(&self) -> String {
        let heading = html_escape(&self.snippet.heading());
        let header = format!(
            r#"            <h1>{heading}</h1>
            <p>{} {}, generated on {}</p>
            <p><a href="{}">Back to report</a></p>"#,
            html_escape(self.app_name),
            html_escape(self.version),
            html_escape(self.timestamp),
            html_escape(&self.main_link.to_string_lossy().replace('\\', "/")),
        );

        let mut body = String::new();
        let labels = self.snippet.labels();
        if labels.iter().any(|(color, _)| *color != Color::None) {
            body.push_str("        <p class=\"legend\">");
            for (color, label) in labels.iter().filter(|(color, _)| **color != Color::None) {
                body.push_str(&format!(
                    "<span class=\"{}\">{}</span>",
                    color.css_class(),
                    html_escape(label)
                ));
            }
            body.push_str("</p>\n");
        }

        body.push_str("        <table class=\"code\">\n");
        let (start, end) = self.snippet.range();
        for (index, line) in self.snippet.lines().iter().enumerate().take(end).skip(start) {
            let number = index + 1;
            body.push_str(&format!(
                "            <tr id=\"{number}\" class=\"{}\"><td class=\"lineno\">{number}</td><td>{}</td></tr>\n",
                line.color.css_class(),
                html_escape(&line.content)
            ));
        }
        body.push_str("        </table>\n");

        page(&heading, &header, &body)
    }
}
