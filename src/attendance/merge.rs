/// Freshly ingested rows first, then what the backend already holds.
/// Nothing is deduplicated: the same person and day may appear twice.
pub fn merge<T: Clone>(ingested: &[T], persisted: &[T]) -> Vec<T> {
    let mut merged = Vec::with_capacity(ingested.len() + persisted.len());
    merged.extend_from_slice(ingested);
    merged.extend_from_slice(persisted);
    merged
}
