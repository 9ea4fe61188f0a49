//! Response assembly: chart series, metrics panel, and detail table.
//!
//! Each view may use a different grouping than the narrative. The chart is a
//! bar series (one point per location, capped at 5) for comparisons and a
//! year-ascending line series otherwise.

use crate::aggregate::{filter_by_locations, mean_field, sum_field};
use crate::dataset::{ColumnPresence, PropertyRecord};
use crate::format::{format_currency, format_int};
use crate::intent::Intent;
use serde::Serialize;
use std::collections::BTreeMap;

pub const MAX_COMPARE_LOCATIONS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    Bar,
    Line,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ChartPoint {
    Location {
        label: String,
        value: f64,
    },
    Yearly {
        year: i64,
        #[serde(rename = "totalSales")]
        total_sales: f64,
        #[serde(rename = "flatRate")]
        flat_rate: f64,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyzeResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub summary: String,
    #[serde(rename = "chartData")]
    pub chart_data: Vec<ChartPoint>,
    #[serde(rename = "chartType", skip_serializing_if = "Option::is_none")]
    pub chart_type: Option<ChartType>,
    #[serde(rename = "tableData")]
    pub table_data: Vec<BTreeMap<String, serde_json::Value>>,
    pub metrics: BTreeMap<String, String>,
}

impl AnalyzeResponse {
    /// Degenerate outcome: placeholder narrative, everything else empty.
    pub fn placeholder(summary: impl Into<String>) -> Self {
        Self {
            error: None,
            summary: summary.into(),
            chart_data: Vec::new(),
            chart_type: None,
            table_data: Vec::new(),
            metrics: BTreeMap::new(),
        }
    }

    /// Invalid-input outcome (empty query).
    pub fn invalid(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Self::placeholder("")
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
    pub data_loaded: bool,
    pub total_records: usize,
    pub sample_locations: Vec<String>,
}

/// Chart series over the filtered rows (compare reuses per-location filters
/// over the full record set, capped at `MAX_COMPARE_LOCATIONS`).
pub fn build_chart(
    records: &[PropertyRecord],
    filtered: &[&PropertyRecord],
    locations: &[String],
    intent: Intent,
) -> (ChartType, Vec<ChartPoint>) {
    if intent == Intent::Compare && locations.len() >= 2 {
        let points = locations
            .iter()
            .take(MAX_COMPARE_LOCATIONS)
            .map(|loc| {
                let rows = filter_by_locations(records, std::slice::from_ref(loc));
                ChartPoint::Location {
                    label: loc.clone(),
                    value: sum_field(&rows, |r| r.total_sales),
                }
            })
            .collect();
        (ChartType::Bar, points)
    } else {
        let mut years: Vec<i64> = filtered.iter().filter_map(|r| r.year).collect();
        years.sort_unstable();
        years.dedup();
        let points = years
            .into_iter()
            .map(|year| {
                let rows: Vec<&PropertyRecord> = filtered
                    .iter()
                    .filter(|r| r.year == Some(year))
                    .copied()
                    .collect();
                ChartPoint::Yearly {
                    year,
                    total_sales: sum_field(&rows, |r| r.total_sales),
                    flat_rate: mean_field(&rows, |r| r.flat_rate).unwrap_or(0.0),
                }
            })
            .collect();
        (ChartType::Line, points)
    }
}

/// Four fixed human-labeled metrics, each independently "N/A" when its
/// source column is missing.
pub fn build_metrics(
    filtered: &[&PropertyRecord],
    presence: ColumnPresence,
) -> BTreeMap<String, String> {
    let mut metrics = BTreeMap::new();
    let total_sales = presence
        .total_sales
        .then(|| sum_field(filtered, |r| r.total_sales));
    metrics.insert("Total Sales".to_string(), format_currency(total_sales));
    metrics.insert(
        "Total Units".to_string(),
        if presence.total_units {
            format_int(sum_field(filtered, |r| r.total_units))
        } else {
            "N/A".to_string()
        },
    );
    metrics.insert(
        "Avg Flat Rate".to_string(),
        format_currency(mean_field(filtered, |r| r.flat_rate)),
    );
    metrics.insert(
        "Carpet Area".to_string(),
        if presence.carpet_area {
            format!("{} sqft", format_int(sum_field(filtered, |r| r.carpet_area)))
        } else {
            "N/A".to_string()
        },
    );
    metrics
}

/// Detail-table projection, restricted to the columns that existed in the
/// source and renamed to the output vocabulary, one row per source row in
/// source order.
pub fn build_table(
    filtered: &[&PropertyRecord],
    presence: ColumnPresence,
) -> Vec<BTreeMap<String, serde_json::Value>> {
    filtered
        .iter()
        .map(|record| {
            let mut row = BTreeMap::new();
            if presence.year {
                row.insert("year".to_string(), json_int(record.year));
            }
            if presence.location {
                row.insert(
                    "final_location".to_string(),
                    record
                        .location
                        .as_ref()
                        .map(|l| serde_json::Value::String(l.clone()))
                        .unwrap_or(serde_json::Value::Null),
                );
            }
            if presence.total_sales {
                row.insert("total_sales_igr".to_string(), json_float(record.total_sales));
            }
            if presence.flat_sold {
                row.insert("flat_sold_igr".to_string(), json_float(record.flat_sold));
            }
            if presence.flat_rate {
                row.insert(
                    "flat_weighted_avg_rate".to_string(),
                    json_float(record.flat_rate),
                );
            }
            if presence.total_units {
                row.insert("total_units".to_string(), json_float(record.total_units));
            }
            if presence.carpet_area {
                row.insert("total_carpet_area".to_string(), json_float(record.carpet_area));
            }
            row
        })
        .collect()
}

fn json_float(value: Option<f64>) -> serde_json::Value {
    value
        .and_then(serde_json::Number::from_f64)
        .map(serde_json::Value::Number)
        .unwrap_or(serde_json::Value::Null)
}

fn json_int(value: Option<i64>) -> serde_json::Value {
    value
        .map(|v| serde_json::Value::Number(v.into()))
        .unwrap_or(serde_json::Value::Null)
}
