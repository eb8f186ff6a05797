// Import path helpers shared by the resolver, the namer and the driver

/// Bare patterns that name a whole tree rather than a package
pub const RESERVED_PATTERNS: &[&str] = &["std", "cmd"];

/// Check whether `prefix` is a path prefix of `path`, compared by `/`-component
///
/// `"a/b"` is a prefix of `"a/b"` and `"a/b/c"`, but not of `"a/bc"`.
pub fn has_path_prefix(path: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some("") => true,
        Some(rest) => prefix.ends_with('/') || rest.starts_with('/'),
        None => false,
    }
}

/// Local imports are relative to the current directory
pub fn is_local_import(path: &str) -> bool {
    path == "."
        || path == ".."
        || path.starts_with("./")
        || path.starts_with("../")
}

/// Pattern contains a `...` wildcard
pub fn is_wildcard(pattern: &str) -> bool {
    pattern.contains("...")
}

pub fn is_reserved(pattern: &str) -> bool {
    RESERVED_PATTERNS.contains(&pattern)
}

/// Longest run of leading `/`-separated components shared by every path
///
/// Returns an empty string when `paths` is empty or the first components differ.
pub fn common_path_prefix<S: AsRef<str>>(paths: &[S]) -> String {
    let mut iter = paths.iter();
    let Some(first) = iter.next() else {
        return String::new();
    };

    let mut common: Vec<&str> = first.as_ref().split('/').collect();
    for path in iter {
        let shared = common
            .iter()
            .zip(path.as_ref().split('/'))
            .take_while(|(a, b)| **a == *b)
            .count();
        common.truncate(shared);
        if common.is_empty() {
            break;
        }
    }

    common.join("/")
}
