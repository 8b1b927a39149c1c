//! Output escaping shared by the streaming renderers.

use std::io::{self, Write};

use comark_event::entity::{decode_entity, DecodedEntity, EntityResolver};

/// Escape `&`, `<`, `>`, and `"` for HTML text and attribute values.
/// `'` is intentionally left alone.
pub fn write_html_escaped<W: Write>(out: &mut W, text: &str) -> io::Result<()> {
    let bytes = text.as_bytes();
    let mut beg = 0;
    for (i, &b) in bytes.iter().enumerate() {
        let replacement: &[u8] = match b {
            b'&' => b"&amp;",
            b'<' => b"&lt;",
            b'>' => b"&gt;",
            b'"' => b"&quot;",
            _ => continue,
        };
        if i > beg {
            out.write_all(&bytes[beg..i])?;
        }
        out.write_all(replacement)?;
        beg = i + 1;
    }
    out.write_all(&bytes[beg..])
}

/// Bytes that survive URL attribute escaping besides alphanumerics.
const URL_SAFE: &[u8] = b"~-_.+!*(),%#@?=;:/,+$";

/// Percent-encode a URL for use inside an HTML attribute value.
///
/// A literal `&` becomes `&amp;` rather than `%26` because the URL is
/// embedded in HTML.
pub fn write_url_escaped<W: Write>(out: &mut W, url: &str) -> io::Result<()> {
    const HEX: &[u8; 16] = b"0123456789ABCDEF";
    let bytes = url.as_bytes();
    let mut beg = 0;
    for (i, &b) in bytes.iter().enumerate() {
        if b.is_ascii_alphanumeric() || URL_SAFE.contains(&b) {
            continue;
        }
        if i > beg {
            out.write_all(&bytes[beg..i])?;
        }
        if b == b'&' {
            out.write_all(b"&amp;")?;
        } else {
            out.write_all(&[b'%', HEX[usize::from(b >> 4)], HEX[usize::from(b & 0xf)]])?;
        }
        beg = i + 1;
    }
    out.write_all(&bytes[beg..])
}

/// Decode an entity reference and HTML-escape the result.
pub fn write_entity_html_escaped<W: Write>(
    out: &mut W,
    text: &str,
    resolver: &dyn EntityResolver,
) -> io::Result<()> {
    match decode_entity(text, resolver) {
        DecodedEntity::Chars(first, second) => {
            let mut buf = [0u8; 8];
            write_html_escaped(out, first.encode_utf8(&mut buf))?;
            if let Some(second) = second {
                write_html_escaped(out, second.encode_utf8(&mut buf))?;
            }
            Ok(())
        }
        DecodedEntity::Verbatim(raw) => write_html_escaped(out, raw),
    }
}

/// Decode an entity reference and write the result unescaped.
pub fn write_entity_raw<W: Write>(
    out: &mut W,
    text: &str,
    resolver: &dyn EntityResolver,
) -> io::Result<()> {
    match decode_entity(text, resolver) {
        DecodedEntity::Chars(first, second) => {
            let mut buf = [0u8; 8];
            out.write_all(first.encode_utf8(&mut buf).as_bytes())?;
            if let Some(second) = second {
                out.write_all(second.encode_utf8(&mut buf).as_bytes())?;
            }
            Ok(())
        }
        DecodedEntity::Verbatim(raw) => out.write_all(raw.as_bytes()),
    }
}

/// Decode an entity reference into a `String` buffer.
pub fn push_entity(buf: &mut String, text: &str, resolver: &dyn EntityResolver) {
    match decode_entity(text, resolver) {
        DecodedEntity::Chars(first, second) => {
            buf.push(first);
            if let Some(second) = second {
                buf.push(second);
            }
        }
        DecodedEntity::Verbatim(raw) => buf.push_str(raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use comark_event::entity::BuiltinEntities;

    fn html(text: &str) -> String {
        let mut out = Vec::new();
        write_html_escaped(&mut out, text).unwrap();
        String::from_utf8(out).unwrap()
    }

    fn url(text: &str) -> String {
        let mut out = Vec::new();
        write_url_escaped(&mut out, text).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(html(r#"a & <b> "c""#), "a &amp; &lt;b&gt; &quot;c&quot;");
        // Single quotes pass through.
        assert_eq!(html("it's"), "it's");
    }

    #[test]
    fn test_url_escape_safe_set() {
        assert_eq!(
            url("https://example.com/a-b_c.d?x=1;y:2#frag"),
            "https://example.com/a-b_c.d?x=1;y:2#frag"
        );
    }

    #[test]
    fn test_url_escape_percent_encodes() {
        assert_eq!(url("a b"), "a%20b");
        assert_eq!(url("a\"b"), "a%22b");
        // Non-ASCII bytes are escaped per byte.
        assert_eq!(url("é"), "%C3%A9");
    }

    #[test]
    fn test_url_escape_ampersand_is_entity() {
        assert_eq!(url("a?x=1&y=2"), "a?x=1&amp;y=2");
    }

    #[test]
    fn test_entity_escaped() {
        let mut out = Vec::new();
        write_entity_html_escaped(&mut out, "&lt;", &BuiltinEntities).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "&lt;");

        let mut out = Vec::new();
        write_entity_html_escaped(&mut out, "&#38;", &BuiltinEntities).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "&amp;");
    }

    #[test]
    fn test_unknown_entity_verbatim() {
        let mut out = Vec::new();
        write_entity_raw(&mut out, "&bogus;", &BuiltinEntities).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "&bogus;");
    }
}
