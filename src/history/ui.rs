//! Formatting utilities for history display.

use super::models::HistoryEntry;

/// Formats a single entry as one listing line.
///
/// Format: index padded to 6 columns, method padded to 10, then the resource.
/// Entries that were not read from a log show an empty index column.
///
/// # Example
///
/// ```
/// use restcli::history::{format_history_entry, HistoryEntry};
///
/// let mut entry = HistoryEntry::new("GET", "servers", None);
/// entry.index = Some(1);
/// assert_eq!(format_history_entry(&entry), "1     GET       servers");
/// ```
pub fn format_history_entry(entry: &HistoryEntry) -> String {
    let index = entry.index.map(|i| i.to_string()).unwrap_or_default();
    format!("{:<6}{:<10}{}", index, entry.method, entry.resource)
}

/// Formats a sequence of entries, one line each.
pub fn format_history_list<I>(entries: I) -> Vec<String>
where
    I: IntoIterator<Item = HistoryEntry>,
{
    entries
        .into_iter()
        .map(|entry| format_history_entry(&entry))
        .collect()
}
