// Well-formed markup reading via quick-xml

use super::{HeadScan, MetaScanner, MetaTag, ParseError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// Reads the document as XML.
///
/// Unmatched and unclosed elements are allowed since HTML leaves `<meta>`
/// open, but any lexical error (unquoted attribute value, unknown entity,
/// broken tag) fails the whole scan.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictScanner;

impl MetaScanner for StrictScanner {
    fn name(&self) -> &'static str {
        "strict"
    }

    fn scan(&self, doc: &str) -> Result<HeadScan, ParseError> {
        let mut reader = Reader::from_str(doc);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        let mut scan = HeadScan::default();
        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    return Err(ParseError::Markup {
                        offset: reader.buffer_position() as usize,
                        message: err.to_string(),
                    })
                }
            };

            match event {
                Event::Start(tag) | Event::Empty(tag) => {
                    let name = tag.local_name();
                    if name.as_ref().eq_ignore_ascii_case(b"body") {
                        scan.boundary = Some(reader.buffer_position() as usize);
                        break;
                    }
                    if name.as_ref().eq_ignore_ascii_case(b"meta") {
                        let meta = read_meta(&tag, reader.buffer_position() as usize)?;
                        scan.imports.extend(meta.into_import());
                    }
                }
                Event::End(tag) if tag.local_name().as_ref().eq_ignore_ascii_case(b"head") => {
                    scan.boundary = Some(reader.buffer_position() as usize);
                    break;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(scan)
    }
}

fn read_meta(tag: &BytesStart<'_>, offset: usize) -> Result<MetaTag, ParseError> {
    let markup_error = |message: String| ParseError::Markup { offset, message };

    let mut meta = MetaTag::default();
    for attr in tag.attributes() {
        let attr = attr.map_err(|err| markup_error(err.to_string()))?;
        let local = attr.key.local_name();
        let key = std::str::from_utf8(local.as_ref()).map_err(|err| markup_error(err.to_string()))?;
        let value = attr
            .unescape_value()
            .map_err(|err| markup_error(err.to_string()))?;
        meta.set(key, value.into_owned());
    }
    Ok(meta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vanity::ImportMeta;

    #[test]
    fn test_well_formed_document() {
        let doc = r#"<?xml version="1.0"?>
<html><head>
<meta name="go-import" content="foo/bar git https://github.com/rsc/foo/bar"/>
</head><body></body></html>"#;
        assert_eq!(
            StrictScanner.scan(doc).unwrap().imports,
            vec![ImportMeta::new("foo/bar", "git", "https://github.com/rsc/foo/bar")]
        );
    }

    #[test]
    fn test_unclosed_meta_is_accepted() {
        let doc = r#"<head>
<meta name="go-import" content="foo/bar git https://github.com/rsc/foo/bar">
</head>"#;
        assert_eq!(StrictScanner.scan(doc).unwrap().imports.len(), 1);
    }

    #[test]
    fn test_escaped_attribute_value() {
        let doc = r#"<meta name="go-import" content="a/b git https://h/x?a=1&amp;b=2">"#;
        assert_eq!(
            StrictScanner.scan(doc).unwrap().imports,
            vec![ImportMeta::new("a/b", "git", "https://h/x?a=1&b=2")]
        );
    }

    #[test]
    fn test_unquoted_attribute_fails() {
        let doc = r#"<meta name=go-import content="chitin.io/chitin git https://github.com/chitin-io/chitin">"#;
        assert!(matches!(
            StrictScanner.scan(doc),
            Err(ParseError::Markup { .. })
        ));
    }

    #[test]
    fn test_tags_after_body_ignored() {
        let doc = r#"<body><meta name="go-import" content="a/b git https://h/a/b"></body>"#;
        let scan = StrictScanner.scan(doc).unwrap();
        assert!(scan.imports.is_empty());
        assert_eq!(scan.boundary, Some("<body>".len()));
    }

    #[test]
    fn test_boundary_offset() {
        let doc = "<head><title>x</title></head><body>";
        assert_eq!(StrictScanner.scan(doc).unwrap().boundary, Some(29));

        let doc = "<title>x</title>";
        assert_eq!(StrictScanner.scan(doc).unwrap().boundary, None);
    }
}
