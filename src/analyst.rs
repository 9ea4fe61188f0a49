//! Request orchestrator: query text in, assembled response out.
//!
//! Each request reloads the source file; there is no caching and no shared
//! mutable state, so two requests against an unchanged file yield identical
//! deterministic output.

use crate::aggregate::{build_stats, filter_by_locations};
use crate::dataset::Dataset;
use crate::intent::Intent;
use crate::llm::LlmClient;
use crate::locations::extract_locations;
use crate::response::{
    build_chart, build_metrics, build_table, AnalyzeResponse, HealthResponse,
};
use crate::summary::render_narrative;
use std::path::PathBuf;
use tracing::info;

pub struct Analyst {
    llm: LlmClient,
    data_file: PathBuf,
}

impl Analyst {
    pub fn new(llm: LlmClient, data_file: PathBuf) -> Self {
        Self { llm, data_file }
    }

    /// Analyze a free-text query. Every input, including malformed or empty,
    /// produces a structured response; there is no fatal path.
    pub async fn analyze(&self, query: &str) -> AnalyzeResponse {
        if query.trim().is_empty() {
            return AnalyzeResponse::invalid("Query is required");
        }

        let dataset = Dataset::load(&self.data_file);
        if dataset.is_empty() {
            return AnalyzeResponse::placeholder(format!(
                "Data file not found. Please ensure {} exists.",
                self.data_file.display()
            ));
        }

        let locations = extract_locations(query, &dataset);
        if locations.is_empty() {
            return AnalyzeResponse::placeholder(
                "No recognized location found. Please specify a location from your dataset.",
            );
        }

        let intent = Intent::classify(query);
        info!(
            "Analyzing query: intent={}, locations={}",
            intent.as_str(),
            locations.join(", ")
        );

        let filtered = filter_by_locations(dataset.records(), &locations);
        if filtered.is_empty() {
            return AnalyzeResponse::placeholder(format!(
                "No data found for {}.",
                locations.join(", ")
            ));
        }

        let stats = build_stats(&filtered, &locations, intent);
        let summary = render_narrative(&self.llm, &stats, query).await;
        let (chart_type, chart_data) =
            build_chart(dataset.records(), &filtered, &locations, intent);
        let metrics = build_metrics(&filtered, dataset.presence());
        let table_data = build_table(&filtered, dataset.presence());

        AnalyzeResponse {
            error: None,
            summary,
            chart_data,
            chart_type: Some(chart_type),
            table_data,
            metrics,
        }
    }

    /// Diagnostic snapshot: availability, record count, sample locations.
    pub fn health(&self) -> HealthResponse {
        let dataset = Dataset::load(&self.data_file);
        HealthResponse {
            status: "ok".to_string(),
            message: "API is running".to_string(),
            data_loaded: !dataset.is_empty(),
            total_records: dataset.len(),
            sample_locations: dataset.locations().iter().take(10).cloned().collect(),
        }
    }
}
