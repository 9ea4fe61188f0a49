//! Dataset accessor for the transaction source file.
//!
//! Loads the CSV export fully into memory, canonicalizes the human-authored
//! headers (trim, lowercase, spaces to underscores) and projects the frame
//! once into typed records so downstream aggregation never re-checks column
//! presence.

use crate::error::Result;
use polars::prelude::*;
use std::path::Path;
use tracing::warn;

/// Canonical column names after header normalization.
pub mod columns {
    pub const YEAR: &str = "year";
    pub const LOCATION: &str = "final_location";
    pub const CITY: &str = "city";
    pub const TOTAL_SALES: &str = "total_sales_-_igr";
    pub const TOTAL_SOLD: &str = "total_sold_-_igr";
    pub const FLAT_SOLD: &str = "flat_sold_-_igr";
    pub const OFFICE_SOLD: &str = "office_sold_-_igr";
    pub const SHOP_SOLD: &str = "shop_sold_-_igr";
    pub const COMMERCIAL_SOLD: &str = "commercial_sold_-_igr";
    pub const RESIDENTIAL_SOLD: &str = "residential_sold_-_igr";
    pub const FLAT_RATE: &str = "flat_-_weighted_average_rate";
    pub const OFFICE_RATE: &str = "office_-_weighted_average_rate";
    pub const SHOP_RATE: &str = "shop_-_weighted_average_rate";
    pub const TOTAL_UNITS: &str = "total_units";
    pub const CARPET_AREA: &str = "total_carpet_area_supplied_(sqft)";
    pub const FLAT_TOTAL: &str = "flat_total";
    pub const SHOP_TOTAL: &str = "shop_total";
    pub const OFFICE_TOTAL: &str = "office_total";
}

/// One source row, projected to explicit optional measures.
#[derive(Debug, Clone, Default)]
pub struct PropertyRecord {
    pub year: Option<i64>,
    pub location: Option<String>,
    pub city: Option<String>,
    pub total_sales: Option<f64>,
    pub total_sold: Option<f64>,
    pub flat_sold: Option<f64>,
    pub office_sold: Option<f64>,
    pub shop_sold: Option<f64>,
    pub commercial_sold: Option<f64>,
    pub residential_sold: Option<f64>,
    pub flat_rate: Option<f64>,
    pub office_rate: Option<f64>,
    pub shop_rate: Option<f64>,
    pub total_units: Option<f64>,
    pub carpet_area: Option<f64>,
    pub flat_total: Option<f64>,
    pub shop_total: Option<f64>,
    pub office_total: Option<f64>,
}

/// Which of the table-view columns existed in the source file.
/// The detail table only emits keys for columns that were actually present.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColumnPresence {
    pub year: bool,
    pub location: bool,
    pub total_sales: bool,
    pub flat_sold: bool,
    pub flat_rate: bool,
    pub total_units: bool,
    pub carpet_area: bool,
}

/// The in-memory dataset for one request. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<PropertyRecord>,
    presence: ColumnPresence,
    locations: Vec<String>,
}

impl Dataset {
    /// Load the source CSV. Any read failure yields an empty dataset;
    /// callers must treat "empty" as unavailable, not as zero matching rows.
    pub fn load(path: &Path) -> Dataset {
        match Self::try_load(path) {
            Ok(ds) => ds,
            Err(e) => {
                warn!("Failed to load dataset from {}: {}", path.display(), e);
                Dataset::default()
            }
        }
    }

    fn try_load(path: &Path) -> Result<Dataset> {
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_infer_schema_length(Some(1000))
            .finish()?
            .collect()?;
        Self::from_frame(df)
    }

    /// Build a dataset from an already-loaded frame. Used by `load` and by
    /// tests that construct frames with the `df!` macro.
    pub fn from_frame(mut df: DataFrame) -> Result<Dataset> {
        let canonical: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| canonicalize_header(name))
            .collect();
        df.set_column_names(&canonical)?;

        let height = df.height();
        let years = int_column(&df, columns::YEAR);
        let locations_col = string_column(&df, columns::LOCATION);
        let cities = string_column(&df, columns::CITY);
        let total_sales = float_column(&df, columns::TOTAL_SALES);
        let total_sold = float_column(&df, columns::TOTAL_SOLD);
        let flat_sold = float_column(&df, columns::FLAT_SOLD);
        let office_sold = float_column(&df, columns::OFFICE_SOLD);
        let shop_sold = float_column(&df, columns::SHOP_SOLD);
        let commercial_sold = float_column(&df, columns::COMMERCIAL_SOLD);
        let residential_sold = float_column(&df, columns::RESIDENTIAL_SOLD);
        let flat_rate = float_column(&df, columns::FLAT_RATE);
        let office_rate = float_column(&df, columns::OFFICE_RATE);
        let shop_rate = float_column(&df, columns::SHOP_RATE);
        let total_units = float_column(&df, columns::TOTAL_UNITS);
        let carpet_area = float_column(&df, columns::CARPET_AREA);
        let flat_total = float_column(&df, columns::FLAT_TOTAL);
        let shop_total = float_column(&df, columns::SHOP_TOTAL);
        let office_total = float_column(&df, columns::OFFICE_TOTAL);

        let presence = ColumnPresence {
            year: years.is_some(),
            location: locations_col.is_some(),
            total_sales: total_sales.is_some(),
            flat_sold: flat_sold.is_some(),
            flat_rate: flat_rate.is_some(),
            total_units: total_units.is_some(),
            carpet_area: carpet_area.is_some(),
        };

        let mut records = Vec::with_capacity(height);
        for i in 0..height {
            records.push(PropertyRecord {
                year: value_at(&years, i),
                location: value_at(&locations_col, i),
                city: value_at(&cities, i),
                total_sales: value_at(&total_sales, i),
                total_sold: value_at(&total_sold, i),
                flat_sold: value_at(&flat_sold, i),
                office_sold: value_at(&office_sold, i),
                shop_sold: value_at(&shop_sold, i),
                commercial_sold: value_at(&commercial_sold, i),
                residential_sold: value_at(&residential_sold, i),
                flat_rate: value_at(&flat_rate, i),
                office_rate: value_at(&office_rate, i),
                shop_rate: value_at(&shop_rate, i),
                total_units: value_at(&total_units, i),
                carpet_area: value_at(&carpet_area, i),
                flat_total: value_at(&flat_total, i),
                shop_total: value_at(&shop_total, i),
                office_total: value_at(&office_total, i),
            });
        }

        // Distinct locations in first-seen order.
        let mut locations = Vec::new();
        for record in &records {
            if let Some(loc) = &record.location {
                if !locations.iter().any(|l| l == loc) {
                    locations.push(loc.clone());
                }
            }
        }

        Ok(Dataset {
            records,
            presence,
            locations,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn records(&self) -> &[PropertyRecord] {
        &self.records
    }

    /// Distinct non-null `final_location` values in first-seen order.
    pub fn locations(&self) -> &[String] {
        &self.locations
    }

    pub fn presence(&self) -> ColumnPresence {
        self.presence
    }
}

/// Trim, lowercase, spaces to underscores. The only schema-matching
/// mechanism in the system; a header that does not canonicalize to a known
/// name is invisible downstream.
pub fn canonicalize_header(name: &str) -> String {
    name.trim().to_lowercase().replace(' ', "_")
}

fn float_column(df: &DataFrame, name: &str) -> Option<Vec<Option<f64>>> {
    let series = df.column(name).ok()?;
    let casted = series.cast(&DataType::Float64).ok()?;
    Some(casted.f64().ok()?.into_iter().collect())
}

fn int_column(df: &DataFrame, name: &str) -> Option<Vec<Option<i64>>> {
    let series = df.column(name).ok()?;
    let casted = series.cast(&DataType::Int64).ok()?;
    Some(casted.i64().ok()?.into_iter().collect())
}

fn string_column(df: &DataFrame, name: &str) -> Option<Vec<Option<String>>> {
    let series = df.column(name).ok()?;
    let casted = series.cast(&DataType::String).ok()?;
    Some(
        casted
            .str()
            .ok()?
            .into_iter()
            .map(|v| v.map(|s| s.to_string()))
            .collect(),
    )
}

fn value_at<T: Clone>(column: &Option<Vec<Option<T>>>, idx: usize) -> Option<T> {
    column
        .as_ref()
        .and_then(|values| values.get(idx).cloned().flatten())
}
