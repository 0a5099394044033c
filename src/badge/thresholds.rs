use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Color used when no threshold applies or a metric is unknown
pub const ALERT_COLOR: &str = "red";

/// Threshold table mapping numeric keys to badge colors.
///
/// Config files can only use string keys, so the table is read from a
/// string map whose keys must parse as numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct Thresholds(Vec<(f64, String)>);

impl Thresholds {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (f64, S)>,
        S: Into<String>,
    {
        let mut entries: Vec<(f64, String)> =
            entries.into_iter().map(|(k, v)| (k, v.into())).collect();
        entries.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self(entries)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Higher is better: color of the largest key not above `value`
    pub fn color_gte(&self, value: f64) -> &str {
        self.0
            .iter()
            .rev()
            .find(|(key, _)| value >= *key)
            .map_or(ALERT_COLOR, |(_, color)| color.as_str())
    }

    /// Lower is better: color of the smallest key not below `value`
    pub fn color_lte(&self, value: f64) -> &str {
        self.0
            .iter()
            .find(|(key, _)| value <= *key)
            .map_or(ALERT_COLOR, |(_, color)| color.as_str())
    }
}

impl TryFrom<BTreeMap<String, String>> for Thresholds {
    type Error = String;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut entries = Vec::with_capacity(map.len());
        for (key, color) in map {
            let threshold: f64 = key
                .trim()
                .parse()
                .map_err(|_| format!("threshold key '{key}' is not a number"))?;
            entries.push((threshold, color));
        }
        Ok(Self::new(entries))
    }
}

impl From<Thresholds> for BTreeMap<String, String> {
    fn from(thresholds: Thresholds) -> Self {
        thresholds
            .0
            .into_iter()
            .map(|(key, color)| (key.to_string(), color))
            .collect()
    }
}
