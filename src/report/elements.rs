//! Presentation containers placed into report sections

use serde::Serialize;

use super::error::ReportError;

/// Metric shown next to a section heading, e.g. `Coverage 93 %`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub name: String,
    /// Whole number; percentages are floored
    pub value: u64,
    pub unit: String,
}

impl Summary {
    pub fn new(name: impl Into<String>, value: u64, unit: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value,
            unit: unit.into(),
        }
    }
}

/// One expandable row of a [`ReportList`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListEntry {
    /// One-line summary, may contain inline HTML
    pub summary: String,
    /// Detail shown when the row is expanded, may contain inline HTML
    pub detail: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportList {
    pub heading: String,
    entries: Vec<ListEntry>,
    pub summary: Option<Summary>,
}

impl ReportList {
    pub fn new(heading: impl Into<String>) -> Self {
        Self {
            heading: heading.into(),
            ..Self::default()
        }
    }

    /// A headless list holding a single message, used when a tool did not deliver results
    pub fn placeholder(message: impl Into<String>) -> Self {
        let mut list = Self::default();
        list.add(message, "");
        list
    }

    pub fn add(&mut self, summary: impl Into<String>, detail: impl Into<String>) {
        self.entries.push(ListEntry {
            summary: summary.into(),
            detail: detail.into(),
        });
    }

    pub fn entries(&self) -> &[ListEntry] {
        &self.entries
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportTable {
    pub heading: String,
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    pub summary: Option<Summary>,
}

impl ReportTable {
    pub fn new<I, S>(heading: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            heading: heading.into(),
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
            summary: None,
        }
    }

    /// Append a row; exactly one value per column is required
    pub fn add<I, S>(&mut self, values: I) -> Result<(), ReportError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let row: Vec<String> = values.into_iter().map(Into::into).collect();
        if row.len() != self.columns.len() {
            return Err(ReportError::ColumnCount {
                given: row.len(),
                expected: self.columns.len(),
            });
        }
        self.rows.push(row);
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Value of `column` in row `index`
    pub fn cell(&self, index: usize, column: &str) -> Option<&str> {
        let col = self.columns.iter().position(|c| c == column)?;
        self.rows.get(index).map(|row| row[col].as_str())
    }

    pub fn count(&self) -> usize {
        self.rows.len()
    }
}

/// Anything that can be placed into a report section
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    List(ReportList),
    Table(ReportTable),
}

impl Element {
    pub fn heading(&self) -> &str {
        match self {
            Element::List(list) => &list.heading,
            Element::Table(table) => &table.heading,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            Element::List(list) => list.count(),
            Element::Table(table) => table.count(),
        }
    }

    pub fn summary(&self) -> Option<&Summary> {
        match self {
            Element::List(list) => list.summary.as_ref(),
            Element::Table(table) => table.summary.as_ref(),
        }
    }
}

impl From<ReportList> for Element {
    fn from(list: ReportList) -> Self {
        Element::List(list)
    }
}

impl From<ReportTable> for Element {
    fn from(table: ReportTable) -> Self {
        Element::Table(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_preserves_order() {
        let mut list = ReportList::new("src/a.py");
        list.add("first", "");
        list.add("second", "<b>x</b>");
        assert_eq!(list.count(), 2);
        assert_eq!(list.entries()[0].summary, "first");
        assert_eq!(list.entries()[1].detail, "<b>x</b>");
    }

    #[test]
    fn test_table_arity() {
        let mut table = ReportTable::new("", ["Module", "Coverage"]);
        assert_eq!(
            table.add(["only one"]),
            Err(ReportError::ColumnCount { given: 1, expected: 2 })
        );
        assert_eq!(table.count(), 0);

        table.add(["a.py", "93 %"]).unwrap();
        assert_eq!(table.count(), 1);
        assert_eq!(table.cell(0, "Coverage"), Some("93 %"));
        assert_eq!(table.cell(0, "Missing"), None);
    }

    #[test]
    fn test_placeholder() {
        let list = ReportList::placeholder("Analysis failed.");
        assert_eq!(list.heading, "");
        assert_eq!(list.count(), 1);
    }
}
