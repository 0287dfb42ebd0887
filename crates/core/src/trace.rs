use uuid::Uuid;

/// Correlation id for one logical request: `{prefix}-{uuid v4}`, or a bare
/// uuid when `prefix` is empty.
pub fn create_trace_id(prefix: &str) -> String {
    let id = Uuid::new_v4();
    if prefix.is_empty() {
        id.to_string()
    } else {
        format!("{}-{}", prefix, id)
    }
}
