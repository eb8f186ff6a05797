// Forgiving tag scanner for HTML that is not well-formed markup

use super::{HeadScan, MetaScanner, MetaTag, ParseError};
use logos::{Lexer, Logos};
use std::borrow::Cow;

/// Walks tag-like substrings without building a tree.
///
/// Tag and attribute names match in any case, attribute values may be double
/// quoted, single quoted, unquoted or missing, and attributes that cannot be
/// read are dropped without affecting the rest of the document.
#[derive(Debug, Clone, Copy, Default)]
pub struct TolerantScanner;

impl MetaScanner for TolerantScanner {
    fn name(&self) -> &'static str {
        "tolerant"
    }

    fn scan(&self, doc: &str) -> Result<HeadScan, ParseError> {
        let mut scan = HeadScan::default();

        for (token, span) in Markup::lexer(doc).spanned() {
            let (Ok(token), Some(raw)) = (token, doc.get(span.clone())) else {
                continue;
            };

            match token {
                Markup::StartTag => {
                    let tag = RawTag::parse(raw);
                    if tag.name.eq_ignore_ascii_case("body") {
                        scan.boundary = Some(span.end);
                        break;
                    }
                    if tag.name.eq_ignore_ascii_case("meta") {
                        scan.imports.extend(tag.meta().into_import());
                    }
                }
                Markup::EndTag => {
                    if end_tag_name(raw).eq_ignore_ascii_case("head") {
                        scan.boundary = Some(span.end);
                        break;
                    }
                }
                Markup::Comment | Markup::Declaration | Markup::Text | Markup::StrayLt => {}
            }
        }

        Ok(scan)
    }
}

/// Top-level document tokens
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
enum Markup {
    #[token("<!--", comment_end)]
    Comment,

    #[regex(r"<![^-][^>]*>?")]
    #[regex(r"<\?[^>]*>?")]
    Declaration,

    #[regex(r"</[A-Za-z][^>]*>?")]
    EndTag,

    #[regex(r"<[A-Za-z][^\s/>]*", start_tag_end)]
    StartTag,

    #[regex(r"[^<]+")]
    Text,

    #[token("<")]
    StrayLt,
}

/// Extend the comment token through the closing `-->`, or to end of input
fn comment_end(lex: &mut Lexer<Markup>) -> bool {
    let rest = lex.remainder();
    let len = rest.find("-->").map_or(rest.len(), |end| end + "-->".len());
    lex.bump(len);
    true
}

/// Extend the start tag through its closing `>`.
///
/// A quote opens a value only right after `=`, so a stray quote elsewhere
/// cannot swallow the rest of the document. An unterminated value ends at
/// the next `>`.
fn start_tag_end(lex: &mut Lexer<Markup>) -> bool {
    let rest = lex.remainder();
    let bytes = rest.as_bytes();

    let mut pos = 0;
    let mut after_eq = false;
    let end = loop {
        let Some(&b) = bytes.get(pos) else {
            break rest.len();
        };
        match b {
            b'>' => break pos + 1,
            b'"' | b'\'' if after_eq => {
                let close = bytes
                    .get(pos + 1..)
                    .and_then(|tail| tail.iter().position(|&c| c == b));
                match close {
                    Some(offset) => pos += offset + 2,
                    None => {
                        break bytes
                            .get(pos..)
                            .and_then(|tail| tail.iter().position(|&c| c == b'>'))
                            .map_or(rest.len(), |gt| pos + gt + 1)
                    }
                }
                after_eq = false;
                continue;
            }
            b'=' => after_eq = true,
            b if b.is_ascii_whitespace() => {}
            _ => after_eq = false,
        }
        pos += 1;
    };

    lex.bump(end);
    true
}

fn end_tag_name(raw: &str) -> &str {
    let inner = raw.trim_start_matches("</");
    let len = inner
        .find(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .unwrap_or(inner.len());
    inner.get(..len).unwrap_or_default()
}

/// A start tag split into its name and unparsed attribute text
struct RawTag<'a> {
    name: &'a str,
    attrs: &'a str,
}

impl<'a> RawTag<'a> {
    fn parse(raw: &'a str) -> Self {
        let inner = raw.strip_prefix('<').unwrap_or(raw);
        let inner = inner.strip_suffix('>').unwrap_or(inner);

        let name_len = inner
            .find(|c: char| c.is_whitespace() || c == '/')
            .unwrap_or(inner.len());
        let (name, attrs) = inner.split_at(name_len);

        // Self-closing slash, unless it ends an unquoted value like `a/b/`
        let attrs = match attrs.strip_suffix('/') {
            Some(open) if open.is_empty() || open.ends_with(char::is_whitespace) => open,
            Some(open) if open.ends_with('"') || open.ends_with('\'') => open,
            _ => attrs,
        };

        Self { name, attrs }
    }

    fn meta(&self) -> MetaTag {
        let mut meta = MetaTag::default();
        for (key, value) in attributes(self.attrs) {
            meta.set(key, decode_entities(value).into_owned());
        }
        meta
    }
}

/// Tokens inside a start tag
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\x0C]+")]
enum Attr {
    #[regex(r#"[^\s"'=/>]+"#)]
    Name,

    #[token("=")]
    Eq,

    #[regex(r#""[^"]*""#)]
    DoubleQuoted,

    #[regex(r"'[^']*'")]
    SingleQuoted,

    #[token("/")]
    Slash,
}

/// Read `name`, `name=value`, `name="value"` and `name='value'` pairs.
///
/// Attributes without a value are reported with an empty value. Stray tokens
/// are skipped; an unterminated quoted value ends the tag.
fn attributes(src: &str) -> Vec<(&str, &str)> {
    let mut lex = Attr::lexer(src);
    let mut attrs = Vec::new();
    let mut pending: Option<&str> = None;

    while let Some(token) = lex.next() {
        match token {
            Ok(Attr::Name) => {
                if let Some(flag) = pending.replace(lex.slice()) {
                    attrs.push((flag, ""));
                }
            }
            Ok(Attr::Eq) => {
                let Some(name) = pending.take() else {
                    continue;
                };
                match attribute_value(&mut lex) {
                    Some(value) => attrs.push((name, value)),
                    // An unterminated quote runs to the end of the tag
                    None => return attrs,
                }
            }
            Ok(Attr::Slash) => {}
            // A quoted string without `=` before it
            Ok(Attr::DoubleQuoted | Attr::SingleQuoted) | Err(()) => {
                if let Some(flag) = pending.take() {
                    attrs.push((flag, ""));
                }
            }
        }
    }

    if let Some(flag) = pending {
        attrs.push((flag, ""));
    }
    attrs
}

/// Value following an `=`; `None` if it is an unterminated quoted string
fn attribute_value<'s>(lex: &mut Lexer<'s, Attr>) -> Option<&'s str> {
    let rest = lex.remainder();
    let trimmed = rest.trim_start_matches(is_tag_space);

    if trimmed.starts_with('"') || trimmed.starts_with('\'') {
        return match lex.next() {
            Some(Ok(Attr::DoubleQuoted | Attr::SingleQuoted)) => {
                let quoted = lex.slice();
                quoted.get(1..quoted.len() - 1)
            }
            _ => None,
        };
    }

    // Unquoted: everything up to the next whitespace, colons and slashes included
    let len = trimmed.find(is_tag_space).unwrap_or(trimmed.len());
    let skipped = rest.len() - trimmed.len();
    lex.bump(skipped + len);
    trimmed.get(..len)
}

/// Whitespace the attribute lexer skips
fn is_tag_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n' | '\x0C')
}

/// Replace character and predefined entity references; unknown ones are kept
fn decode_entities(value: &str) -> Cow<'_, str> {
    if !value.contains('&') {
        return Cow::Borrowed(value);
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(amp) = rest.find('&') {
        out.push_str(rest.get(..amp).unwrap_or_default());
        rest = rest.get(amp..).unwrap_or_default();

        let decoded = rest
            .find(';')
            .and_then(|semi| Some((entity(rest.get(1..semi)?)?, semi + 1)));
        match decoded {
            Some((c, len)) => {
                out.push(c);
                rest = rest.get(len..).unwrap_or_default();
            }
            None => {
                out.push('&');
                rest = rest.get(1..).unwrap_or_default();
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        _ => {
            let code = name.strip_prefix('#')?;
            let code = match code.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vanity::ImportMeta;

    fn scan(doc: &str) -> Vec<ImportMeta> {
        TolerantScanner.scan(doc).unwrap().imports
    }

    #[test]
    fn test_unquoted_attributes_and_trailing_style() {
        let doc = r#"<!doctype html><title>Page Not Found</title><meta name=go-import content="chitin.io/chitin git https://github.com/chitin-io/chitin"><div style=position:relative>DRAFT</div>"#;
        assert_eq!(
            scan(doc),
            vec![ImportMeta::new(
                "chitin.io/chitin",
                "git",
                "https://github.com/chitin-io/chitin"
            )]
        );
    }

    #[test]
    fn test_quoting_styles() {
        let doc = "<META NAME='go-import' CONTENT='a/b git https://h/a/b'>\
                   <meta name=go-import content=\"c/d hg https://h/c/d\"/>";
        assert_eq!(
            scan(doc),
            vec![
                ImportMeta::new("a/b", "git", "https://h/a/b"),
                ImportMeta::new("c/d", "hg", "https://h/c/d"),
            ]
        );
    }

    #[test]
    fn test_body_on_same_line() {
        let doc = r#"<meta name="go-import" content="a/b git https://h/a/b"><body><meta name="go-import" content="c/d git https://h/c/d">"#;
        assert_eq!(scan(doc), vec![ImportMeta::new("a/b", "git", "https://h/a/b")]);
    }

    #[test]
    fn test_head_end_stops_scan() {
        let doc = r#"<head></HEAD><meta name="go-import" content="a/b git https://h/a/b">"#;
        assert!(scan(doc).is_empty());
        assert_eq!(TolerantScanner.scan(doc).unwrap().boundary, Some(13));
    }

    #[test]
    fn test_scan_without_boundary() {
        let doc = r#"<title>x</title><meta name="go-import" content="a/b git https://h/a/b">"#;
        let scan = TolerantScanner.scan(doc).unwrap();
        assert_eq!(scan.imports.len(), 1);
        assert_eq!(scan.boundary, None);
    }

    #[test]
    fn test_comment_hides_tags() {
        let doc = r#"<!-- <meta name="go-import" content="x/y git https://h/x/y"> -->
<meta name="go-import" content="a/b git https://h/a/b">"#;
        assert_eq!(scan(doc), vec![ImportMeta::new("a/b", "git", "https://h/a/b")]);
    }

    #[test]
    fn test_unterminated_quote_drops_attribute_only() {
        let doc = r#"<meta name="go-import" content="c/d git https://h/c/d">
<meta name="go-import" content="a/b git https://h/a/b" title="oops>"#;
        assert_eq!(
            scan(doc),
            vec![
                ImportMeta::new("c/d", "git", "https://h/c/d"),
                ImportMeta::new("a/b", "git", "https://h/a/b"),
            ]
        );
    }

    #[test]
    fn test_greater_than_inside_quoted_value() {
        let doc = r#"<meta content="a/b git https://h/a?q=>" name="go-import">"#;
        assert_eq!(scan(doc), vec![ImportMeta::new("a/b", "git", "https://h/a?q=>")]);
    }

    #[test]
    fn test_attributes() {
        assert_eq!(
            attributes(r#" async name = "x" content=a/b:c data-x='1' "#),
            vec![("async", ""), ("name", "x"), ("content", "a/b:c"), ("data-x", "1")]
        );
        assert_eq!(attributes(r#"a="unterminated"#), vec![]);
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("plain"), "plain");
        assert_eq!(decode_entities("a&amp;b&lt;&#65;&#x42;"), "a&b<AB");
        assert_eq!(decode_entities("x?a=1&b=2"), "x?a=1&b=2");
        assert_eq!(decode_entities("&nbsp;"), "&nbsp;");
    }

    #[test]
    fn test_end_tag_name() {
        assert_eq!(end_tag_name("</head>"), "head");
        assert_eq!(end_tag_name("</HEAD >"), "HEAD");
        assert_eq!(end_tag_name("</div"), "div");
    }
}
