//! Case-insensitive substring search over the catalog.

use crate::{catalog::InstrumentRecord, locale::Locale};

/// Returns the records whose name or `locale` description contains `query`.
///
/// A blank query returns every record. Matches keep catalog order.
pub fn filter<'a>(
    catalog: &'a [InstrumentRecord],
    query: &str,
    locale: Locale,
) -> Vec<&'a InstrumentRecord> {
    if query.trim().is_empty() {
        return catalog.iter().collect();
    }
    let needle = query.to_lowercase();
    catalog
        .iter()
        .filter(|record| matches(record, &needle, locale))
        .collect()
}

fn matches(record: &InstrumentRecord, needle: &str, locale: Locale) -> bool {
    record.name.to_lowercase().contains(needle)
        || record.description(locale).to_lowercase().contains(needle)
}
