//! Autocomplete over the locality catalog.

use crate::types::LocalityRecord;

/// Suggestions for `query`: every record whose locality name contains the
/// query, ignoring case, in catalog order. An empty query suggests nothing.
pub fn filter<'a>(query: &str, catalog: &'a [LocalityRecord]) -> Vec<&'a LocalityRecord> {
    if query.is_empty() {
        return Vec::new();
    }

    let needle = query.to_lowercase();
    catalog
        .iter()
        .filter(|record| record.locality_name.to_lowercase().contains(&needle))
        .collect()
}
