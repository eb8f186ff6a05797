// Vanity import path discovery
//
// A vanity import path is served by a host that does not hold the sources
// itself. The HTML it returns carries the real location in a meta tag:
//
//     <meta name="go-import" content="example.org/pkg git https://github.com/user/pkg">
//
// Documents are first read as well-formed markup (`StrictScanner`). Real pages
// are often not, so a lexical failure hands the whole document to a forgiving
// tag scanner (`TolerantScanner`) instead.

mod strict;
mod tolerant;

pub use strict::StrictScanner;
pub use tolerant::TolerantScanner;

use crate::importpath::has_path_prefix;
use serde::Serialize;
use std::io::Read;
use thiserror::Error;

/// One `go-import` record, in document order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportMeta {
    /// Import path prefix served by the repository
    pub prefix: String,
    /// Version control system, e.g. `git`
    pub vcs: String,
    pub repo_root: String,
}

impl ImportMeta {
    pub fn new(prefix: &str, vcs: &str, repo_root: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            vcs: vcs.to_string(),
            repo_root: repo_root.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("invalid UTF-8 in document at byte {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("unsupported document charset {0:?}")]
    UnsupportedCharset(String),

    #[error("malformed markup at byte {offset}: {message}")]
    Markup { offset: usize, message: String },

    #[error("no markup scanner configured")]
    NoScanner,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Records read by one scanner, and where it stopped reading
#[derive(Debug, Default, PartialEq, Eq)]
pub struct HeadScan {
    pub imports: Vec<ImportMeta>,
    /// Byte offset just past the `<body>` or `</head>` tag that ended the
    /// scan; `None` when the scan ran to the end of the input
    pub boundary: Option<usize>,
}

/// One way of reading `go-import` records out of a document
pub trait MetaScanner {
    fn name(&self) -> &'static str;

    /// Scan `doc` up to the start of the body
    fn scan(&self, doc: &str) -> Result<HeadScan, ParseError>;
}

/// Parse `go-import` records out of an HTML document
pub fn parse_meta_go_imports(bytes: &[u8]) -> Result<Vec<ImportMeta>, ParseError> {
    parse_with(bytes, &[&StrictScanner, &TolerantScanner])
}

/// Read the whole stream, then parse it like [`parse_meta_go_imports`]
pub fn parse_meta_go_imports_from<R: Read>(mut reader: R) -> Result<Vec<ImportMeta>, ParseError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    parse_meta_go_imports(&bytes)
}

/// Try each scanner in turn; the first one that succeeds decides the result
pub fn parse_with(
    bytes: &[u8],
    scanners: &[&dyn MetaScanner],
) -> Result<Vec<ImportMeta>, ParseError> {
    let (doc, bad_utf8) = decode_document(bytes)?;

    let mut last_error = None;
    for scanner in scanners {
        match scanner.scan(doc) {
            Ok(scan) => {
                log::debug!(
                    "{} scanner found {} go-import tag(s)",
                    scanner.name(),
                    scan.imports.len()
                );
                return match (bad_utf8, scan.boundary) {
                    // Ran into the bad bytes before the body started
                    (Some(offset), None) => Err(ParseError::InvalidUtf8 { offset }),
                    _ => Ok(scan.imports),
                };
            }
            Err(err) => {
                log::debug!("{} scanner gave up: {err}", scanner.name());
                last_error = Some(err);
            }
        }
    }

    Err(last_error.unwrap_or(ParseError::NoScanner))
}

/// Pick the single record whose prefix covers `import_path`
pub fn match_go_import<'a>(
    imports: &'a [ImportMeta],
    import_path: &str,
) -> Result<&'a ImportMeta, ImportMatchError> {
    let mut matches = imports
        .iter()
        .filter(|meta| has_path_prefix(import_path, &meta.prefix));

    let Some(first) = matches.next() else {
        return Err(ImportMatchError::NoMatch {
            import_path: import_path.to_string(),
        });
    };
    if let Some(second) = matches.next() {
        return Err(ImportMatchError::Multiple {
            import_path: import_path.to_string(),
            first: first.prefix.clone(),
            second: second.prefix.clone(),
        });
    }
    Ok(first)
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImportMatchError {
    #[error("no go-import meta tag matches import path {import_path:?}")]
    NoMatch { import_path: String },

    #[error("multiple go-import meta tags match import path {import_path:?}: {first:?} and {second:?}")]
    Multiple {
        import_path: String,
        first: String,
        second: String,
    },
}

/// Validate the bytes as UTF-8 text.
///
/// Invalid bytes truncate the document to the well-formed prefix. Their
/// offset is returned so the caller can tell whether the scan reached them.
fn decode_document(bytes: &[u8]) -> Result<(&str, Option<usize>), ParseError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);

    let (doc, bad_utf8) = match std::str::from_utf8(bytes) {
        Ok(doc) => (doc, None),
        Err(err) => {
            let offset = err.valid_up_to();
            let valid = bytes.get(..offset).unwrap_or_default();
            // valid_up_to marks the end of a well-formed prefix
            let doc = std::str::from_utf8(valid).map_err(|_| ParseError::InvalidUtf8 { offset })?;
            (doc, Some(offset))
        }
    };

    if let Some(charset) = declared_encoding(doc) {
        if !is_utf8_label(charset) {
            return Err(ParseError::UnsupportedCharset(charset.to_string()));
        }
    }

    Ok((doc, bad_utf8))
}

/// Encoding named by a leading `<?xml ... encoding="..."?>` declaration
fn declared_encoding(doc: &str) -> Option<&str> {
    let decl = doc.trim_start().strip_prefix("<?xml")?;
    let decl = decl.get(..decl.find("?>")?)?;
    let rest = decl.get(decl.find("encoding")? + "encoding".len()..)?;
    let rest = rest.trim_start().strip_prefix('=')?.trim_start();

    let quote = rest.chars().next().filter(|c| *c == '"' || *c == '\'')?;
    let value = rest.get(1..)?;
    value.get(..value.find(quote)?)
}

fn is_utf8_label(label: &str) -> bool {
    ["utf-8", "utf8", "us-ascii", "ascii"]
        .iter()
        .any(|known| label.eq_ignore_ascii_case(known))
}

/// Attributes of one `<meta>` tag that matter for `go-import`
#[derive(Debug, Default)]
pub(crate) struct MetaTag {
    name: Option<String>,
    content: Option<String>,
}

impl MetaTag {
    /// Record an attribute; the first occurrence of a name wins
    pub(crate) fn set(&mut self, key: &str, value: String) {
        if key.eq_ignore_ascii_case("name") {
            self.name.get_or_insert(value);
        } else if key.eq_ignore_ascii_case("content") {
            self.content.get_or_insert(value);
        }
    }

    pub(crate) fn into_import(self) -> Option<ImportMeta> {
        let name = self.name?;
        if !name.eq_ignore_ascii_case("go-import") {
            return None;
        }

        let Some(content) = self.content else {
            log::warn!("ignoring go-import meta tag without content attribute");
            return None;
        };

        let fields: Vec<&str> = content.split_whitespace().collect();
        match fields.as_slice() {
            [prefix, vcs, repo_root] => Some(ImportMeta::new(prefix, vcs, repo_root)),
            _ => {
                log::warn!(
                    "ignoring go-import meta tag: content {content:?} has {} fields, expected 3",
                    fields.len()
                );
                None
            }
        }
    }
}
