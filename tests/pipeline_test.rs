use estate_analyst::analyst::Analyst;
use estate_analyst::llm::LlmClient;
use estate_analyst::response::{ChartPoint, ChartType};
use polars::prelude::*;
use std::fs;
use std::path::PathBuf;

/// Write a small two-location, two-year transaction export as CSV.
fn create_test_data_file(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("estate_analyst_test");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);

    let mut df = df![
        "Year" => [2020i64, 2021, 2020, 2021],
        "Final Location" => ["Wakad", "Wakad", "Hinjewadi", "Hinjewadi"],
        "City" => ["Pune", "Pune", "Pune", "Pune"],
        "Total Sales - IGR" => [1_000_000.0, 1_500_000.0, 800_000.0, 900_000.0],
        "Flat Sold - IGR" => [10.0, 12.0, 8.0, 9.0],
        "Flat - Weighted Average Rate" => [5500.0, 6000.0, 5000.0, 5200.0],
        "Total Units" => [20.0, 25.0, 15.0, 18.0],
        "Total Carpet Area Supplied (sqft)" => [30000.0, 35000.0, 25000.0, 27000.0]
    ]
    .unwrap();

    let mut file = fs::File::create(&path).unwrap();
    CsvWriter::new(&mut file).finish(&mut df).unwrap();
    path
}

/// No API key: the LLM strategy always fails and the deterministic
/// renderer is exercised, keeping output reproducible.
fn analyst_for(path: PathBuf) -> Analyst {
    Analyst::new(LlmClient::new(String::new()), path)
}

#[tokio::test]
async fn test_trend_query_end_to_end() {
    let path = create_test_data_file("trend.csv");
    let analyst = analyst_for(path);

    let response = analyst.analyze("show sales trend in Wakad").await;

    assert!(response.summary.contains("grew by 50.0% from 2020 to 2021"));
    assert!(response.summary.contains("Peak sales occurred in 2021"));
    assert_eq!(response.chart_type, Some(ChartType::Line));
    assert_eq!(
        response.chart_data,
        vec![
            ChartPoint::Yearly { year: 2020, total_sales: 1_000_000.0, flat_rate: 5500.0 },
            ChartPoint::Yearly { year: 2021, total_sales: 1_500_000.0, flat_rate: 6000.0 },
        ]
    );
    assert_eq!(response.table_data.len(), 2);
    assert_eq!(response.metrics["Total Sales"], "₹25.00 L");
    assert_eq!(response.metrics["Total Units"], "45");
}

#[tokio::test]
async fn test_compare_query_end_to_end() {
    let path = create_test_data_file("compare.csv");
    let analyst = analyst_for(path);

    let response = analyst.analyze("compare Wakad vs Hinjewadi").await;

    assert_eq!(response.chart_type, Some(ChartType::Bar));
    assert!(response.chart_data.len() <= 5);
    assert_eq!(
        response.chart_data,
        vec![
            ChartPoint::Location { label: "Wakad".to_string(), value: 2_500_000.0 },
            ChartPoint::Location { label: "Hinjewadi".to_string(), value: 1_700_000.0 },
        ]
    );
    // Wakad has the higher total sales and must be named stronger.
    assert!(response.summary.contains("Wakad shows higher sales volume."));
    assert_eq!(response.table_data.len(), 4);
}

#[tokio::test]
async fn test_empty_query_is_rejected_with_placeholder() {
    let path = create_test_data_file("empty_query.csv");
    let analyst = analyst_for(path);

    let response = analyst.analyze("   ").await;

    assert_eq!(response.error.as_deref(), Some("Query is required"));
    assert!(response.summary.is_empty());
    assert!(response.chart_data.is_empty());
    assert!(response.table_data.is_empty());
    assert!(response.metrics.is_empty());
}

#[tokio::test]
async fn test_unknown_location_yields_placeholder() {
    let path = create_test_data_file("unknown_location.csv");
    let analyst = analyst_for(path);

    let response = analyst.analyze("what are the rates in Aundh").await;

    assert!(response.summary.starts_with("No recognized location found"));
    assert!(response.chart_data.is_empty());
    assert!(response.table_data.is_empty());
    assert!(response.metrics.is_empty());
}

#[tokio::test]
async fn test_missing_data_file_yields_placeholder() {
    let analyst = analyst_for(PathBuf::from("/nonexistent/Sample_data.csv"));

    let response = analyst.analyze("sales in Wakad").await;

    assert!(response.summary.starts_with("Data file not found"));
    assert!(response.chart_data.is_empty());
    assert!(response.metrics.is_empty());
}

#[tokio::test]
async fn test_analyze_is_idempotent() {
    let path = create_test_data_file("idempotent.csv");
    let analyst = analyst_for(path);

    let first = analyst.analyze("overview of Hinjewadi").await;
    let second = analyst.analyze("overview of Hinjewadi").await;

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[tokio::test]
async fn test_health_reports_records_and_sample_locations() {
    let path = create_test_data_file("health.csv");
    let analyst = analyst_for(path);

    let health = analyst.health();

    assert_eq!(health.status, "ok");
    assert!(health.data_loaded);
    assert_eq!(health.total_records, 4);
    assert_eq!(
        health.sample_locations,
        vec!["Wakad".to_string(), "Hinjewadi".to_string()]
    );
}

#[tokio::test]
async fn test_rate_query_reports_positive_rates_only() {
    let path = create_test_data_file("rates.csv");
    let analyst = analyst_for(path);

    let response = analyst.analyze("average rate in Hinjewadi").await;

    assert!(response.summary.starts_with("Average property rates in Hinjewadi"));
    assert!(response.summary.contains("Flat: ₹5,100/sqft"));
    // Office and shop rate columns are absent from the source entirely.
    assert!(!response.summary.contains("Office"));
    assert!(!response.summary.contains("Shop"));
    assert!(response.summary.contains("Based on 2 transactions."));
}
