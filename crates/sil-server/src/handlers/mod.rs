pub mod certificates;
pub mod stats;
pub mod transactions;
pub mod verification;

/// Query parameters arrive as strings; the UI sends empty strings for
/// unset filters. Fold those into `None` before parsing.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}
