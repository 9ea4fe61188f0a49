//! Narrative rendering.
//!
//! Two interchangeable strategies over the same `DetailedStats`: an LLM
//! strategy that renders a market-analyst prompt and delegates to Groq, and
//! a deterministic template strategy keyed by intent. The LLM path is
//! fallible; the call site substitutes the deterministic output on any
//! failure so every response carries a narrative.

use crate::aggregate::DetailedStats;
use crate::error::{AnalystError, Result};
use crate::format::{format_currency, format_int};
use crate::intent::Intent;
use crate::llm::LlmClient;
use tracing::warn;

/// Preferred-then-fallback narrative rendering. Never fails.
pub async fn render_narrative(llm: &LlmClient, stats: &DetailedStats, query: &str) -> String {
    match render_with_llm(llm, stats, query).await {
        Ok(summary) => summary,
        Err(e) => {
            warn!("LLM summary failed, using deterministic renderer: {}", e);
            render_deterministic(stats)
                .unwrap_or_else(|_| fallback_summary(&stats.locations, stats.total_records))
        }
    }
}

/// Generic last-resort line for an unexpected rendering fault.
pub fn fallback_summary(locations: &[String], record_count: usize) -> String {
    format!(
        "Analysis complete for {}. {} records found.",
        locations.join(", "),
        record_count
    )
}

/// Template-based narrative, one fixed shape per intent.
pub fn render_deterministic(stats: &DetailedStats) -> Result<String> {
    let locations = stats.locations.join(", ");

    match stats.intent {
        Intent::Compare if stats.locations.len() >= 2 => {
            let comparison = stats.location_comparison.as_ref().ok_or_else(|| {
                AnalystError::Aggregation("comparison stats missing for compare intent".to_string())
            })?;
            let (a, b) = (&comparison[0], &comparison[1]);
            let stronger = if a.total_sales > b.total_sales {
                &a.location
            } else {
                &b.location
            };
            Ok(format!(
                "Comparison: {} has total IGR sales of {} with avg flat rate {}/sqft, \
                 while {} has {} with avg rate {}/sqft. {} shows higher sales volume.",
                a.location,
                format_currency(Some(a.total_sales)),
                format_currency(a.avg_flat_rate),
                b.location,
                format_currency(Some(b.total_sales)),
                format_currency(b.avg_flat_rate),
                stronger
            ))
        }
        Intent::Trend => match (&stats.yearly_trends, stats.growth_rate) {
            (Some(trends), Some(growth)) if trends.len() > 1 => {
                let first = trends.first().map(|t| t.year).unwrap_or_default();
                let last = trends.last().map(|t| t.year).unwrap_or_default();
                let series: Vec<(i64, f64)> =
                    trends.iter().map(|t| (t.year, t.total_sales)).collect();
                let (peak, peak_sales) =
                    crate::aggregate::peak_year(&series).unwrap_or((last, 0.0));
                Ok(format!(
                    "Sales trend for {}: Total IGR sales grew by {:.1}% from {} to {}. \
                     Peak sales occurred in {} with {}.",
                    locations,
                    growth,
                    first,
                    last,
                    peak,
                    format_currency(Some(peak_sales))
                ))
            }
            _ => Ok(format!("Limited trend data available for {}.", locations)),
        },
        Intent::Rate => {
            // Only rates that are present and strictly positive are reported.
            let mut rates = Vec::new();
            if let Some(rate) = stats.average_rates.flat.filter(|r| *r > 0.0) {
                rates.push(format!("Flat: {}/sqft", format_currency(Some(rate))));
            }
            if let Some(rate) = stats.average_rates.office.filter(|r| *r > 0.0) {
                rates.push(format!("Office: {}/sqft", format_currency(Some(rate))));
            }
            if let Some(rate) = stats.average_rates.shop.filter(|r| *r > 0.0) {
                rates.push(format!("Shop: {}/sqft", format_currency(Some(rate))));
            }
            Ok(format!(
                "Average property rates in {}: {}. Based on {} transactions.",
                locations,
                rates.join(", "),
                stats.total_records
            ))
        }
        Intent::Sales => Ok(format!(
            "Sales data for {}: Total IGR sales amount to {} across {} units. \
             Flats sold: {}. This represents significant market activity.",
            locations,
            format_currency(Some(stats.overall.total_sales)),
            stats.overall.total_units,
            stats.property_breakdown.flats_sold
        )),
        // Overview is also the shape for a compare intent that matched
        // fewer than two locations.
        _ => Ok(format!(
            "Market overview for {}: Total IGR sales of {} across {} units. \
             Average flat rate: {}/sqft. Total carpet area: {} sqft.",
            locations,
            format_currency(Some(stats.overall.total_sales)),
            stats.overall.total_units,
            format_currency(stats.average_rates.flat),
            format_int(stats.overall.total_carpet_area)
        )),
    }
}

/// LLM strategy: structured prompt over every `DetailedStats` field.
pub async fn render_with_llm(
    llm: &LlmClient,
    stats: &DetailedStats,
    query: &str,
) -> Result<String> {
    let prompt = build_analyst_prompt(stats, query);
    llm.call_llm(&prompt).await
}

pub fn build_analyst_prompt(stats: &DetailedStats, query: &str) -> String {
    let years: Vec<String> = stats.years_covered.iter().map(|y| y.to_string()).collect();

    let mut trend_section = String::new();
    if let Some(trends) = &stats.yearly_trends {
        if trends.len() > 1 {
            trend_section.push_str("YEAR-WISE TRENDS:\n");
            for trend in trends {
                trend_section.push_str(&format!(
                    "- {}: Sales ₹{}, Units {}, Avg Rate ₹{}/sqft\n",
                    trend.year,
                    format_int(trend.total_sales),
                    trend.total_units,
                    format_int(trend.avg_flat_rate.unwrap_or(0.0))
                ));
            }
            if let Some(growth) = stats.growth_rate {
                trend_section.push_str(&format!("Overall Growth Rate: {:.1}%\n", growth));
            }
        }
    }

    let mut comparison_section = String::new();
    if let Some(comparison) = &stats.location_comparison {
        comparison_section.push_str("LOCATION COMPARISON:\n");
        for comp in comparison {
            comparison_section.push_str(&format!(
                "- {}: Sales ₹{}, Units {}, Avg Rate ₹{}/sqft\n",
                comp.location,
                format_int(comp.total_sales),
                comp.total_units,
                format_int(comp.avg_flat_rate.unwrap_or(0.0))
            ));
        }
    }

    format!(
        r#"You are a professional real estate market analyst. Analyze the following ACTUAL data from the dataset and provide insights.

User Query: {query}

ACTUAL DATA:
=======================
Locations Analyzed: {locations}
Total Records: {total_records}
Years Covered: {years}

OVERALL METRICS:
- Total IGR Sales: ₹{total_sales}
- Total Units Sold: {total_units}
- Total Carpet Area: {carpet_area} sqft

PROPERTY TYPE BREAKDOWN:
- Flats Sold: {flats_sold}
- Offices Sold: {offices_sold}
- Shops Sold: {shops_sold}
- Commercial Properties: {commercial_sold}
- Residential Properties: {residential_sold}

AVERAGE RATES (per sqft):
- Flat Rate: ₹{flat_rate}
- Office Rate: ₹{office_rate}
- Shop Rate: ₹{shop_rate}

{trend_section}

{comparison_section}

Based on this ACTUAL data, provide a concise, professional analysis covering:
1. Market strength and performance
2. Key trends or patterns
3. Investment outlook

Keep the response under 150 words. Use specific numbers from the data above."#,
        query = query,
        locations = stats.locations.join(", "),
        total_records = stats.total_records,
        years = years.join(", "),
        total_sales = format_int(stats.overall.total_sales),
        total_units = stats.overall.total_units,
        carpet_area = format_int(stats.overall.total_carpet_area),
        flats_sold = stats.property_breakdown.flats_sold,
        offices_sold = stats.property_breakdown.offices_sold,
        shops_sold = stats.property_breakdown.shops_sold,
        commercial_sold = stats.property_breakdown.commercial_sold,
        residential_sold = stats.property_breakdown.residential_sold,
        flat_rate = format_int(stats.average_rates.flat.unwrap_or(0.0)),
        office_rate = format_int(stats.average_rates.office.unwrap_or(0.0)),
        shop_rate = format_int(stats.average_rates.shop.unwrap_or(0.0)),
        trend_section = trend_section,
        comparison_section = comparison_section,
    )
}
