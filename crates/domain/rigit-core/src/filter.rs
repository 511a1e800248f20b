/// A row a view can list, identify and search.
pub trait Record: Clone + Send + Sync + 'static {
    /// Business identifier used in URLs (`LEAD-001`, `RC-2025-001`, ...).
    fn record_id(&self) -> &str;

    /// Display fields the search box matches against.
    fn search_fields(&self) -> Vec<&str>;
}

pub fn matches_query<R: Record>(record: &R, query: &str) -> bool {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    record
        .search_fields()
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Case-insensitive substring filter. An empty query keeps every item.
pub fn apply_filter<R: Record>(items: &[R], query: &str) -> Vec<R> {
    items
        .iter()
        .filter(|item| matches_query(*item, query))
        .cloned()
        .collect()
}
