use crate::SyncError;

pub(crate) fn is_missing_relation_error(err: &SyncError) -> bool {
    let lower = err.description.to_lowercase();
    lower.contains("no such table")
        || lower.contains("no such view")
        || (lower.contains("relation") || lower.contains("view") || lower.contains("table"))
            && (lower.contains("does not exist")
                || lower.contains("undefined table")
                || lower.contains("unknown"))
}
