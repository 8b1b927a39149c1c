//! Character reference decoding.
//!
//! Numeric references (`&#68;`, `&#x44;`) are decoded directly from the
//! slice. Named references are resolved through an [`EntityResolver`] so
//! the full HTML5 entity table can live outside this crate;
//! [`BuiltinEntities`] covers the names that show up in ordinary prose.

/// Maps an entity name (without `&` and `;`) to one or two codepoints.
pub trait EntityResolver {
    fn resolve(&self, name: &str) -> Option<(char, Option<char>)>;
}

/// Resolver for common named references.
///
/// Intentionally small; inject a table-backed resolver for full HTML5
/// coverage.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinEntities;

impl EntityResolver for BuiltinEntities {
    fn resolve(&self, name: &str) -> Option<(char, Option<char>)> {
        let ch = match name {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => '\u{a0}',
            "copy" => '\u{a9}',
            "reg" => '\u{ae}',
            "deg" => '\u{b0}',
            "plusmn" => '\u{b1}',
            "middot" => '\u{b7}',
            "laquo" => '\u{ab}',
            "raquo" => '\u{bb}',
            "times" => '\u{d7}',
            "divide" => '\u{f7}',
            "ndash" => '\u{2013}',
            "mdash" => '\u{2014}',
            "lsquo" => '\u{2018}',
            "rsquo" => '\u{2019}',
            "ldquo" => '\u{201c}',
            "rdquo" => '\u{201d}',
            "dagger" => '\u{2020}',
            "Dagger" => '\u{2021}',
            "bull" => '\u{2022}',
            "hellip" => '\u{2026}',
            "permil" => '\u{2030}',
            "prime" => '\u{2032}',
            "Prime" => '\u{2033}',
            "larr" => '\u{2190}',
            "uarr" => '\u{2191}',
            "rarr" => '\u{2192}',
            "darr" => '\u{2193}',
            "trade" => '\u{2122}',
            "infin" => '\u{221e}',
            "ne" => '\u{2260}',
            "le" => '\u{2264}',
            "ge" => '\u{2265}',
            _ => return None,
        };
        Some((ch, None))
    }
}

/// Result of decoding one entity reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodedEntity<'a> {
    /// Decoded to one or two characters.
    Chars(char, Option<char>),
    /// Unknown or malformed reference; emit the slice as written.
    Verbatim(&'a str),
}

/// Convert a codepoint to a `char`, substituting U+FFFD for zero,
/// surrogates, and out-of-range values.
#[must_use]
pub fn checked_char(codepoint: u32) -> char {
    if codepoint == 0 {
        return char::REPLACEMENT_CHARACTER;
    }
    char::from_u32(codepoint).unwrap_or(char::REPLACEMENT_CHARACTER)
}

/// Decode an entity reference slice (including the `&` and `;`).
///
/// Hex and decimal numeric forms are parsed directly; named forms go
/// through `resolver`. Anything unrecognized comes back [`DecodedEntity::Verbatim`].
#[must_use]
pub fn decode_entity<'a>(text: &'a str, resolver: &dyn EntityResolver) -> DecodedEntity<'a> {
    let bytes = text.as_bytes();
    if bytes.len() < 3 || bytes[0] != b'&' || bytes[bytes.len() - 1] != b';' {
        return DecodedEntity::Verbatim(text);
    }

    if bytes[1] == b'#' {
        let digits = &text[2..text.len() - 1];
        let parsed = if let Some(hex) = digits.strip_prefix(['x', 'X']) {
            u32::from_str_radix(hex, 16)
        } else {
            digits.parse::<u32>()
        };
        return match parsed {
            Ok(cp) => DecodedEntity::Chars(checked_char(cp), None),
            // Overflow past u32 still means "out of range".
            Err(e) if matches!(e.kind(), std::num::IntErrorKind::PosOverflow) => {
                DecodedEntity::Chars(char::REPLACEMENT_CHARACTER, None)
            }
            Err(_) => DecodedEntity::Verbatim(text),
        };
    }

    match resolver.resolve(&text[1..text.len() - 1]) {
        Some((first, second)) => DecodedEntity::Chars(first, second),
        None => DecodedEntity::Verbatim(text),
    }
}
