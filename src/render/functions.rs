//! Pure helper functions exposed to the configuration template.
//!
//! Every helper here is a plain Rust function with no knowledge of the
//! template engine; `template.rs` adapts them to engine values. Keeping them
//! engine-free lets each contract be tested in isolation.

use crate::render::size::size_suffix_to_int64;

/// Conditional selection.
pub fn iif<T>(condition: bool, when_true: T, when_false: T) -> T {
    if condition {
        when_true
    } else {
        when_false
    }
}

/// The servers a backend actually renders.
///
/// A forced single server replaces the whole list, which is how a backend is
/// pinned to one server without touching its slot table.
pub fn effective_servers<'a, T>(servers: &'a [T], single: Option<&'a T>) -> Vec<&'a T> {
    match single {
        Some(server) => vec![server],
        None => servers.iter().collect(),
    }
}

/// Anchored pattern for a host, rewriting a leading `*` label into a
/// non-dot character class.
pub fn hostname_regex(hostname: &str) -> String {
    let escaped = hostname.replace('.', "\\.").replace('*', "([^\\.]+)");
    anchor(&escaped)
}

/// Anchored pattern for an exact alias host. Wildcards are kept literally.
pub fn alias_regex(hostname: &str) -> String {
    anchor(&hostname.replace('.', "\\."))
}

fn anchor(pattern: &str) -> String {
    format!("^{pattern}(:[0-9]+)?$")
}

/// A host is a wildcard iff it starts with `*.`.
pub fn is_wildcard_hostname(identifier: &str) -> bool {
    identifier.starts_with("*.")
}

/// A host needs regex matching iff it is not made only of `[A-Za-z0-9.-]`.
pub fn is_regex_hostname(identifier: &str) -> bool {
    identifier.is_empty()
        || !identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

/// Byte count of a human readable size, or the input unchanged when it
/// cannot be converted. A wrong literal still renders; aborting would not.
pub fn size_suffix(size: &str) -> String {
    match size_suffix_to_int64(size) {
        Ok(value) => value.to_string(),
        Err(e) => {
            tracing::error!(size = %size, error = %e, "Error converting size");
            size.to_string()
        }
    }
}

pub fn has_suffix(s: &str, suffix: &str) -> bool {
    s.ends_with(suffix)
}
