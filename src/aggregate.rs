//! Aggregation engine.
//!
//! Computes the grouped rollups behind every response: overall totals,
//! per-property-type breakdowns, average rates, year-wise trends with growth
//! rate, and per-location comparisons. Operates only on records whose
//! location is in the extracted location set.

use crate::dataset::PropertyRecord;
use crate::intent::Intent;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct OverallTotals {
    pub total_sales: f64,
    pub total_units: i64,
    pub total_carpet_area: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PropertyBreakdown {
    pub flats_sold: i64,
    pub offices_sold: i64,
    pub shops_sold: i64,
    pub commercial_sold: i64,
    pub residential_sold: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AverageRates {
    pub flat: Option<f64>,
    pub office: Option<f64>,
    pub shop: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearlyTrend {
    pub year: i64,
    pub total_sales: f64,
    pub total_units: i64,
    pub avg_flat_rate: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationComparison {
    pub location: String,
    pub total_sales: f64,
    pub total_units: i64,
    pub avg_flat_rate: Option<f64>,
}

/// Per-request statistics consumed by both summary strategies and discarded
/// after response assembly.
#[derive(Debug, Clone, Serialize)]
pub struct DetailedStats {
    pub locations: Vec<String>,
    pub intent: Intent,
    pub total_records: usize,
    /// Sorted ascending.
    pub years_covered: Vec<i64>,
    pub overall: OverallTotals,
    pub property_breakdown: PropertyBreakdown,
    pub average_rates: AverageRates,
    /// Present only when more than one year is covered.
    pub yearly_trends: Option<Vec<YearlyTrend>>,
    /// First-to-last percentage growth over the yearly sales series.
    pub growth_rate: Option<f64>,
    /// Present whenever more than one location matched, regardless of intent.
    pub location_comparison: Option<Vec<LocationComparison>>,
}

/// Rows whose `final_location` is in the given set, order preserved.
pub fn filter_by_locations<'a>(
    records: &'a [PropertyRecord],
    locations: &[String],
) -> Vec<&'a PropertyRecord> {
    records
        .iter()
        .filter(|r| {
            r.location
                .as_ref()
                .map(|loc| locations.iter().any(|l| l == loc))
                .unwrap_or(false)
        })
        .collect()
}

pub fn sum_field(records: &[&PropertyRecord], field: impl Fn(&PropertyRecord) -> Option<f64>) -> f64 {
    records.iter().filter_map(|r| field(r)).sum()
}

/// Mean over non-null values; `None` when every value is absent.
pub fn mean_field(
    records: &[&PropertyRecord],
    field: impl Fn(&PropertyRecord) -> Option<f64>,
) -> Option<f64> {
    let values: Vec<f64> = records.iter().filter_map(|r| field(r)).collect();
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Year-ascending sales sums. Rows without a year are dropped from the
/// grouping, matching the source's NaN-key behavior.
pub fn yearly_sales(records: &[&PropertyRecord]) -> Vec<(i64, f64)> {
    let mut by_year: BTreeMap<i64, f64> = BTreeMap::new();
    for record in records {
        if let Some(year) = record.year {
            *by_year.entry(year).or_insert(0.0) += record.total_sales.unwrap_or(0.0);
        }
    }
    by_year.into_iter().collect()
}

/// `(last - first) / first * 100` over a year-ordered series; exactly 0 when
/// the first value is zero or negative. The zero is a guard, not a signal.
pub fn growth_rate(series: &[(i64, f64)]) -> f64 {
    match (series.first(), series.last()) {
        (Some(&(_, first)), Some(&(_, last))) if first > 0.0 => (last - first) / first * 100.0,
        _ => 0.0,
    }
}

/// Year attaining the maximum summed sales; first such year on ties.
pub fn peak_year(series: &[(i64, f64)]) -> Option<(i64, f64)> {
    let mut peak: Option<(i64, f64)> = None;
    for &(year, sales) in series {
        match peak {
            Some((_, best)) if sales <= best => {}
            _ => peak = Some((year, sales)),
        }
    }
    peak
}

/// Build the full per-request statistics from the location-filtered rows.
pub fn build_stats(
    filtered: &[&PropertyRecord],
    locations: &[String],
    intent: Intent,
) -> DetailedStats {
    let mut years: Vec<i64> = filtered.iter().filter_map(|r| r.year).collect();
    years.sort_unstable();
    years.dedup();

    let overall = OverallTotals {
        total_sales: sum_field(filtered, |r| r.total_sales),
        total_units: sum_field(filtered, |r| r.total_units) as i64,
        total_carpet_area: sum_field(filtered, |r| r.carpet_area),
    };

    let property_breakdown = PropertyBreakdown {
        flats_sold: sum_field(filtered, |r| r.flat_sold) as i64,
        offices_sold: sum_field(filtered, |r| r.office_sold) as i64,
        shops_sold: sum_field(filtered, |r| r.shop_sold) as i64,
        commercial_sold: sum_field(filtered, |r| r.commercial_sold) as i64,
        residential_sold: sum_field(filtered, |r| r.residential_sold) as i64,
    };

    let average_rates = AverageRates {
        flat: mean_field(filtered, |r| r.flat_rate),
        office: mean_field(filtered, |r| r.office_rate),
        shop: mean_field(filtered, |r| r.shop_rate),
    };

    let (yearly_trends, growth) = if years.len() > 1 {
        let mut trends = Vec::with_capacity(years.len());
        for &year in &years {
            let rows: Vec<&PropertyRecord> = filtered
                .iter()
                .filter(|r| r.year == Some(year))
                .copied()
                .collect();
            trends.push(YearlyTrend {
                year,
                total_sales: sum_field(&rows, |r| r.total_sales),
                total_units: sum_field(&rows, |r| r.total_units) as i64,
                avg_flat_rate: mean_field(&rows, |r| r.flat_rate),
            });
        }
        let series: Vec<(i64, f64)> = trends.iter().map(|t| (t.year, t.total_sales)).collect();
        (Some(trends), Some(growth_rate(&series)))
    } else {
        (None, None)
    };

    let location_comparison = if locations.len() > 1 {
        Some(
            locations
                .iter()
                .map(|loc| {
                    let rows: Vec<&PropertyRecord> = filtered
                        .iter()
                        .filter(|r| r.location.as_deref() == Some(loc.as_str()))
                        .copied()
                        .collect();
                    LocationComparison {
                        location: loc.clone(),
                        total_sales: sum_field(&rows, |r| r.total_sales),
                        total_units: sum_field(&rows, |r| r.total_units) as i64,
                        avg_flat_rate: mean_field(&rows, |r| r.flat_rate),
                    }
                })
                .collect(),
        )
    } else {
        None
    };

    DetailedStats {
        locations: locations.to_vec(),
        intent,
        total_records: filtered.len(),
        years_covered: years,
        overall,
        property_breakdown,
        average_rates,
        yearly_trends,
        growth_rate: growth,
        location_comparison,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(year: i64, location: &str, sales: f64, flat_rate: Option<f64>) -> PropertyRecord {
        PropertyRecord {
            year: Some(year),
            location: Some(location.to_string()),
            total_sales: Some(sales),
            flat_rate,
            total_units: Some(10.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_filter_count_matches_location_membership() {
        let records = vec![
            record(2020, "Wakad", 100.0, None),
            record(2020, "Baner", 200.0, None),
            record(2021, "Wakad", 300.0, None),
        ];
        let filtered = filter_by_locations(&records, &["Wakad".to_string()]);
        let expected = records
            .iter()
            .filter(|r| r.location.as_deref() == Some("Wakad"))
            .count();
        assert_eq!(filtered.len(), expected);
    }

    #[test]
    fn test_growth_rate_zero_guard() {
        assert_eq!(growth_rate(&[(2020, 0.0), (2021, 500.0)]), 0.0);
        assert_eq!(growth_rate(&[(2020, -10.0), (2021, 500.0)]), 0.0);
        assert_eq!(growth_rate(&[]), 0.0);
    }

    #[test]
    fn test_growth_rate_first_to_last() {
        let g = growth_rate(&[(2020, 1_000_000.0), (2021, 1_500_000.0)]);
        assert!((g - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_peak_year_first_on_tie() {
        assert_eq!(peak_year(&[(2019, 5.0), (2020, 9.0), (2021, 9.0)]), Some((2020, 9.0)));
    }

    #[test]
    fn test_yearly_sales_ascending() {
        let records = vec![
            record(2021, "Wakad", 300.0, None),
            record(2019, "Wakad", 100.0, None),
            record(2021, "Wakad", 50.0, None),
        ];
        let refs: Vec<&PropertyRecord> = records.iter().collect();
        assert_eq!(yearly_sales(&refs), vec![(2019, 100.0), (2021, 350.0)]);
    }

    #[test]
    fn test_mean_field_none_when_all_absent() {
        let records = vec![record(2020, "Wakad", 1.0, None)];
        let refs: Vec<&PropertyRecord> = records.iter().collect();
        assert_eq!(mean_field(&refs, |r| r.flat_rate), None);
        assert_eq!(mean_field(&refs, |r| r.total_sales), Some(1.0));
    }

    #[test]
    fn test_build_stats_trend_fields() {
        let records = vec![
            record(2020, "Wakad", 1_000_000.0, Some(5000.0)),
            record(2021, "Wakad", 1_500_000.0, Some(6000.0)),
        ];
        let refs: Vec<&PropertyRecord> = records.iter().collect();
        let stats = build_stats(&refs, &["Wakad".to_string()], Intent::Trend);
        assert_eq!(stats.years_covered, vec![2020, 2021]);
        assert_eq!(stats.total_records, 2);
        let growth = stats.growth_rate.unwrap();
        assert!((growth - 50.0).abs() < 1e-9);
        let trends = stats.yearly_trends.unwrap();
        assert_eq!(trends.len(), 2);
        assert_eq!(trends[0].year, 2020);
        assert_eq!(trends[1].total_sales, 1_500_000.0);
        assert!(stats.location_comparison.is_none());
    }

    #[test]
    fn test_build_stats_comparison_per_location() {
        let records = vec![
            record(2020, "Wakad", 100.0, Some(5000.0)),
            record(2020, "Baner", 900.0, None),
        ];
        let refs: Vec<&PropertyRecord> = records.iter().collect();
        let locations = vec!["Wakad".to_string(), "Baner".to_string()];
        let stats = build_stats(&refs, &locations, Intent::Compare);
        let comparison = stats.location_comparison.unwrap();
        assert_eq!(comparison[0].total_sales, 100.0);
        assert_eq!(comparison[1].total_sales, 900.0);
        assert_eq!(comparison[1].avg_flat_rate, None);
    }
}
