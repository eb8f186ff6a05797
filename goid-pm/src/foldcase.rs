// Case-insensitive import path collision detection
//
// Two import paths that differ only by case name the same directory on a
// case-insensitive filesystem, so a build must refuse them.

use std::collections::HashMap;
use thiserror::Error;

/// Case-folded form of an import path, used only for comparison
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FoldKey(String);

impl FoldKey {
    pub fn new(s: &str) -> Self {
        Self(s.chars().map(fold_char).collect())
    }
}

/// LATIN SMALL LETTER DOTLESS I; only Turkic folding relates it to `I`
const DOTLESS_I: char = '\u{131}';

/// Simple case folding of one character.
///
/// Maps through upper case and back to lower case so that every member of a
/// case orbit (`K`, `k`, KELVIN SIGN) lands on the same character. Mappings
/// that expand to several characters (`ß` -> `SS`) are not applied, and
/// neither are locale-specific ones.
fn fold_char(c: char) -> char {
    if c == DOTLESS_I {
        return c;
    }
    let upper = single(c.to_uppercase()).unwrap_or(c);
    single(upper.to_lowercase()).unwrap_or(upper)
}

fn single(mut chars: impl Iterator<Item = char>) -> Option<char> {
    let first = chars.next()?;
    match chars.next() {
        None => Some(first),
        Some(_) => None,
    }
}

/// Two entries of a path list that fold to the same key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FoldCollision<'a> {
    /// Earlier entry in the list
    pub first: &'a str,
    /// Later entry that collides with `first`
    pub second: &'a str,
}

/// Find the first pair of entries whose case-folded forms are equal
///
/// Scans left to right and stops at the first entry whose key has been seen;
/// `first` is the earlier entry with that key. Exact repeats count as
/// collisions. Returns `None` when every key is distinct.
pub fn fold_dup<S: AsRef<str>>(paths: &[S]) -> Option<FoldCollision<'_>> {
    let mut seen: HashMap<FoldKey, &str> = HashMap::with_capacity(paths.len());

    for path in paths {
        let path = path.as_ref();
        let key = FoldKey::new(path);
        if let Some(&first) = seen.get(&key) {
            return Some(FoldCollision {
                first,
                second: path,
            });
        }
        seen.insert(key, path);
    }

    None
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("case-insensitive import collision: {first:?} and {second:?}")]
pub struct CollisionError {
    pub first: String,
    pub second: String,
}

/// Driver-facing form of [`fold_dup`]
pub fn check_case_collisions<S: AsRef<str>>(paths: &[S]) -> Result<(), CollisionError> {
    match fold_dup(paths) {
        Some(collision) => Err(CollisionError {
            first: collision.first.to_string(),
            second: collision.second.to_string(),
        }),
        None => Ok(()),
    }
}
