//! Temporal normalization
//!
//! Upstream exports encode the year 2040 as "0040": the leading "20" became
//! "00". A value starting with "00" has its first character replaced by "2"
//! and its second dropped ("0040-03-02" → "2040-03-02"). Values starting with
//! "20" after the fix are parsed into structured dates; anything else is kept
//! as text and reported.

use crate::check::ElementKind;
use crate::graph::{AttributeValue, Attributes, CanonicalGraph};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;
use thiserror::Error;

/// Prefix produced by the encoding defect
pub const DEFECT_PREFIX: &str = "00";
/// Prefix of a value that can be parsed
pub const PARSEABLE_PREFIX: &str = "20";

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

#[derive(Debug, Error)]
pub enum TemporalError {
    #[error("Unparseable temporal value on {kind} {identity}, field '{field}': {value:?} ({reason})")]
    Unparseable {
        kind: ElementKind,
        identity: String,
        field: String,
        value: String,
        reason: String,
    },
}

/// A temporal string left untouched because its prefix is not recognized
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassThrough {
    pub kind: ElementKind,
    pub identity: String,
    pub field: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemporalReport {
    pub prefix_fixes: usize,
    pub parsed_dates: usize,
    pub parsed_datetimes: usize,
    pub passed_through: Vec<PassThrough>,
}

/// Replace a leading "00" with "2" (dropping the first character).
pub fn fix_century_prefix(value: &str) -> Option<String> {
    value
        .starts_with(DEFECT_PREFIX)
        .then(|| format!("2{}", &value[1..]))
}

pub fn parse_date(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
}

/// Parse an ISO-8601 date-time. Offsets are converted to UTC and a bare date
/// means midnight.
pub fn parse_datetime(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(dt);
        }
    }
    if let Some(midnight) = parse_date(value).ok().and_then(|d| d.and_hms_opt(0, 0, 0)) {
        return Ok(midnight);
    }
    DateTime::parse_from_rfc3339(value).map(|dt| dt.naive_utc())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Date,
    DateTime,
}

enum Outcome {
    Parsed { fixed: bool },
    PassedThrough(String),
    NotText,
}

/// Rewrites configured date and date-time fields of a canonical graph.
#[derive(Debug, Clone)]
pub struct TemporalNormalizer {
    date_fields: Vec<String>,
    datetime_fields: Vec<String>,
}

impl Default for TemporalNormalizer {
    fn default() -> Self {
        Self::new(vec!["date".to_string()], vec!["time".to_string()])
    }
}

impl TemporalNormalizer {
    pub fn new(date_fields: Vec<String>, datetime_fields: Vec<String>) -> Self {
        Self {
            date_fields,
            datetime_fields,
        }
    }

    pub fn normalize(&self, graph: &mut CanonicalGraph) -> Result<TemporalReport, TemporalError> {
        let mut report = TemporalReport::default();

        for node in graph.nodes.values_mut() {
            let identity = node.id.to_string();
            self.normalize_attributes(ElementKind::Node, &identity, &mut node.attributes, &mut report)?;
        }
        for edge in graph.edges.values_mut() {
            let identity = edge.id.to_string();
            self.normalize_attributes(ElementKind::Edge, &identity, &mut edge.attributes, &mut report)?;
        }

        tracing::info!(
            fixed = report.prefix_fixes,
            dates = report.parsed_dates,
            datetimes = report.parsed_datetimes,
            passed_through = report.passed_through.len(),
            "normalized temporal fields"
        );
        Ok(report)
    }

    fn normalize_attributes(
        &self,
        kind: ElementKind,
        identity: &str,
        attributes: &mut Attributes,
        report: &mut TemporalReport,
    ) -> Result<(), TemporalError> {
        let fields = self
            .date_fields
            .iter()
            .map(|f| (f, FieldKind::Date))
            .chain(self.datetime_fields.iter().map(|f| (f, FieldKind::DateTime)));

        for (field, field_kind) in fields {
            let Some(value) = attributes.get_mut(field) else { continue };

            let outcome = normalize_value(value, field_kind).map_err(|(text, reason)| {
                TemporalError::Unparseable {
                    kind,
                    identity: identity.to_string(),
                    field: field.clone(),
                    value: text,
                    reason,
                }
            })?;

            match outcome {
                Outcome::Parsed { fixed } => {
                    if fixed {
                        report.prefix_fixes += 1;
                    }
                    match field_kind {
                        FieldKind::Date => report.parsed_dates += 1,
                        FieldKind::DateTime => report.parsed_datetimes += 1,
                    }
                }
                Outcome::PassedThrough(text) => {
                    tracing::warn!(%kind, identity, field = %field, value = %text, "unrecognized temporal prefix, kept as text");
                    report.passed_through.push(PassThrough {
                        kind,
                        identity: identity.to_string(),
                        field: field.clone(),
                        value: text,
                    });
                }
                Outcome::NotText => {}
            }
        }
        Ok(())
    }
}

/// Fix and parse a single value in place.
///
/// On failure returns the offending text and the parser's reason.
fn normalize_value(value: &mut AttributeValue, kind: FieldKind) -> Result<Outcome, (String, String)> {
    let Some(text) = value.as_str() else {
        return Ok(Outcome::NotText);
    };

    let fixed = fix_century_prefix(text);
    let text = fixed.as_deref().unwrap_or(text);

    if !text.starts_with(PARSEABLE_PREFIX) {
        return Ok(Outcome::PassedThrough(text.to_string()));
    }

    let parsed = match kind {
        FieldKind::Date => parse_date(text).map(AttributeValue::Date),
        FieldKind::DateTime => parse_datetime(text).map(AttributeValue::DateTime),
    };
    let parsed = parsed.map_err(|e| (text.to_string(), e.to_string()))?;

    *value = parsed;
    Ok(Outcome::Parsed {
        fixed: fixed.is_some(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{CanonicalEdge, CanonicalNode, EdgeId, ElementId};

    fn graph_with_date(date: &str) -> CanonicalGraph {
        let mut graph = CanonicalGraph::new();
        let mut node = CanonicalNode::new(ElementId::from("meeting_1"));
        node.attributes.insert("date".to_string(), AttributeValue::from(date));
        graph.nodes.insert(node.id.clone(), node);
        graph
    }

    #[test]
    fn defect_prefix_is_rewritten() {
        assert_eq!(fix_century_prefix("0001-03-02").as_deref(), Some("2001-03-02"));
        assert_eq!(fix_century_prefix("0040-10-01").as_deref(), Some("2040-10-01"));
        assert_eq!(fix_century_prefix("2040-10-01"), None);
    }

    #[test]
    fn fixed_date_is_parsed() {
        let mut graph = graph_with_date("0001-03-02");
        let report = TemporalNormalizer::default().normalize(&mut graph).unwrap();

        let node = graph.get_node(&ElementId::from("meeting_1")).unwrap();
        assert_eq!(
            node.attributes["date"],
            AttributeValue::Date(NaiveDate::from_ymd_opt(2001, 3, 2).unwrap())
        );
        assert_eq!(report.prefix_fixes, 1);
        assert_eq!(report.parsed_dates, 1);
    }

    #[test]
    fn unrecognized_prefix_passes_through_with_warning() {
        let mut graph = graph_with_date("1999-01-01");
        let report = TemporalNormalizer::default().normalize(&mut graph).unwrap();

        let node = graph.get_node(&ElementId::from("meeting_1")).unwrap();
        assert_eq!(node.attributes["date"], AttributeValue::from("1999-01-01"));
        assert_eq!(report.passed_through.len(), 1);
        assert_eq!(report.passed_through[0].field, "date");
    }

    #[test]
    fn edge_time_is_parsed_as_datetime() {
        let mut graph = CanonicalGraph::new();
        let mut edge = CanonicalEdge::new(EdgeId::new("trip_1", "harbor", 0));
        edge.attributes.insert("time".to_string(), AttributeValue::from("0040-10-01T08:15:00"));
        graph.edges.insert(edge.id.clone(), edge);

        TemporalNormalizer::default().normalize(&mut graph).unwrap();

        let edge = graph.get_edge(&EdgeId::new("trip_1", "harbor", 0)).unwrap();
        let expected = NaiveDate::from_ymd_opt(2040, 10, 1)
            .unwrap()
            .and_hms_opt(8, 15, 0)
            .unwrap();
        assert_eq!(edge.attributes["time"], AttributeValue::DateTime(expected));
    }

    #[test]
    fn datetime_accepts_fractions_and_offsets() {
        assert!(parse_datetime("2040-10-01T08:15:00.250").is_ok());
        assert!(parse_datetime("2040-10-01 08:15:00").is_ok());
        let utc = parse_datetime("2040-10-01T10:15:00+02:00").unwrap();
        assert_eq!(utc.format("%H:%M").to_string(), "08:15");
    }

    #[test]
    fn date_only_time_means_midnight() {
        let mut graph = CanonicalGraph::new();
        let mut edge = CanonicalEdge::new(EdgeId::new("trip_1", "harbor", 0));
        edge.attributes.insert("time".to_string(), AttributeValue::from("0040-10-01"));
        graph.edges.insert(edge.id.clone(), edge);

        let report = TemporalNormalizer::default().normalize(&mut graph).unwrap();
        assert_eq!(report.prefix_fixes, 1);
        assert_eq!(report.parsed_datetimes, 1);

        let edge = graph.get_edge(&EdgeId::new("trip_1", "harbor", 0)).unwrap();
        let midnight = NaiveDate::from_ymd_opt(2040, 10, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        assert_eq!(edge.attributes["time"], AttributeValue::DateTime(midnight));
    }

    #[test]
    fn malformed_value_with_parseable_prefix_is_fatal() {
        let mut graph = graph_with_date("2040-13-45");
        let err = TemporalNormalizer::default().normalize(&mut graph).unwrap_err();
        let TemporalError::Unparseable { identity, field, .. } = err;
        assert_eq!(identity, "meeting_1");
        assert_eq!(field, "date");
    }

    #[test]
    fn already_structured_values_are_left_alone() {
        let mut graph = CanonicalGraph::new();
        let mut node = CanonicalNode::new(ElementId::from("m"));
        let date = NaiveDate::from_ymd_opt(2040, 1, 1).unwrap();
        node.attributes.insert("date".to_string(), AttributeValue::Date(date));
        graph.nodes.insert(node.id.clone(), node);

        let report = TemporalNormalizer::default().normalize(&mut graph).unwrap();
        assert_eq!(report, TemporalReport::default());
    }
}
