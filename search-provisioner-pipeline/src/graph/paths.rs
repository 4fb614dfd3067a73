//! Enrichment tree path helpers.

/// Root of every enrichment path.
pub const DOCUMENT: &str = "/document";

/// Segment that fans a context out over the items of an array.
pub const WILDCARD: &str = "*";

/// `/document/{name}`
pub fn document(name: &str) -> String {
    join(DOCUMENT, name)
}

pub fn join(context: &str, name: &str) -> String {
    format!("{}/{}", context, name)
}

/// `{path}/*`
pub fn each(path: &str) -> String {
    join(path, WILDCARD)
}

/// True when `path` equals `context` or lies below it.
pub fn is_within(path: &str, context: &str) -> bool {
    path == context
        || path
            .strip_prefix(context)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// The fan-out a path is read under: its prefix up to the last wildcard
/// segment, or the document root when it has none.
pub fn scope(path: &str) -> &str {
    let mut end = None;
    let mut offset = 0;
    for segment in path.split('/') {
        offset += segment.len();
        if segment == WILDCARD {
            end = Some(offset);
        }
        offset += 1;
    }
    end.map_or(DOCUMENT, |end| &path[..end])
}

/// A skill in `context` can read `path` when the path's fan-out encloses the
/// context, or when the path lies below the context (an aggregation over a
/// nested array).
pub fn is_readable_from(path: &str, context: &str) -> bool {
    is_within(context, scope(path)) || is_within(path, context)
}

pub fn has_wildcard(path: &str) -> bool {
    path.split('/').any(|segment| segment == WILDCARD)
}

/// Rebase `path` from a wildcard context onto one concrete instance of it.
/// Paths outside the context are returned unchanged.
pub fn bind(path: &str, context: &str, instance: &str) -> String {
    if is_within(path, context) {
        format!("{}{}", instance, &path[context.len()..])
    } else {
        path.to_string()
    }
}
