//! Location extraction from free-text queries.
//!
//! Case-insensitive substring containment against the distinct location
//! values present in the dataset, in the dataset's first-seen order. A
//! location whose name is a substring of another location's name will match
//! alongside it; no fuzzy matching or overlap handling.

use crate::dataset::Dataset;

pub fn extract_locations(query: &str, dataset: &Dataset) -> Vec<String> {
    let query_lower = query.to_lowercase();
    dataset
        .locations()
        .iter()
        .filter(|loc| query_lower.contains(&loc.to_lowercase()))
        .cloned()
        .collect()
}
