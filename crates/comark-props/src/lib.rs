//! Component attribute mini-language parser.
//!
//! Parses the raw content between `{` and `}` on components and attributed
//! inline spans:
//!
//! ```text
//! {#my-id .card .wide title="Hello" draggable :config='{"a":1}'}
//! ```
//!
//! into an id, a merged class string, and an ordered prop list. Every
//! consumer that materializes attributes (JSON serialization, HTML
//! rendering) goes through this parser.
//!
//! All returned key/value spans borrow from the input — copy them before
//! the source buffer goes away. The parser is a single left-to-right pass
//! with no backtracking and never fails; output beyond the fixed capacities
//! ([`MAX_PROPS`], [`CLASS_BUF_SIZE`]) is dropped silently, with the number
//! of discarded tokens reported in [`ParsedProps::dropped`].

/// Maximum number of props retained per attribute string.
pub const MAX_PROPS: usize = 32;

/// Maximum byte length of the merged class string.
pub const CLASS_BUF_SIZE: usize = 512;

/// Value of one parsed prop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PropValue<'a> {
    /// `key="value"`, `key='value'`, or bare `key=value`. Consumers escape
    /// the value for their output format.
    Str(&'a str),
    /// Bare word with no `=`; serializes as a valueless/true attribute.
    Boolean,
    /// `:key='value'`; the value is a pre-formed expression passed through
    /// unescaped.
    Bind(&'a str),
}

/// One parsed prop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prop<'a> {
    pub key: &'a str,
    pub value: PropValue<'a>,
}

/// Structured result of parsing one attribute string.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ParsedProps<'a> {
    /// `#id` shorthand; the last one wins.
    pub id: Option<&'a str>,
    /// All `.class` tokens joined by single spaces, capped at
    /// [`CLASS_BUF_SIZE`] bytes.
    pub class: String,
    /// Ordered props, at most [`MAX_PROPS`].
    pub props: Vec<Prop<'a>>,
    /// Number of prop/class tokens discarded at the capacity limits.
    pub dropped: usize,
}

impl ParsedProps<'_> {
    /// True if nothing usable was parsed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.class.is_empty() && self.props.is_empty()
    }
}

fn is_token_end(b: u8) -> bool {
    b == b' ' || b == b'\t' || b == b'}'
}

/// Parse a raw props string (the content strictly between `{` and `}`).
#[must_use]
pub fn parse_props(raw: &str) -> ParsedProps<'_> {
    let bytes = raw.as_bytes();
    let mut out = ParsedProps::default();
    let mut i = 0;

    while i < bytes.len() {
        while i < bytes.len() && (bytes[i] == b' ' || bytes[i] == b'\t') {
            i += 1;
        }
        if i >= bytes.len() {
            break;
        }

        match bytes[i] {
            b'#' => {
                i += 1;
                let start = i;
                while i < bytes.len() && !is_token_end(bytes[i]) {
                    i += 1;
                }
                if i > start {
                    out.id = Some(&raw[start..i]);
                }
            }
            b'.' => {
                i += 1;
                let start = i;
                while i < bytes.len() && !is_token_end(bytes[i]) && bytes[i] != b'.' {
                    i += 1;
                }
                if i > start {
                    push_class(&mut out, &raw[start..i]);
                }
            }
            _ => i = parse_prop(raw, i, &mut out),
        }
    }

    out
}

/// Append one class token to the merged class string, dropping it if the
/// buffer cap would be exceeded.
fn push_class(out: &mut ParsedProps<'_>, token: &str) {
    if !out.class.is_empty() && out.class.len() + 1 < CLASS_BUF_SIZE {
        out.class.push(' ');
    }
    if out.class.len() + token.len() < CLASS_BUF_SIZE {
        out.class.push_str(token);
    } else {
        out.dropped += 1;
    }
}

/// Parse one `key=value`, `:key='bind'`, or bare-boolean token starting at
/// byte `i`. Returns the position after the token; always advances.
fn parse_prop<'a>(raw: &'a str, mut i: usize, out: &mut ParsedProps<'a>) -> usize {
    let bytes = raw.as_bytes();
    let bind = bytes[i] == b':';
    if bind {
        i += 1;
    }
    let key_start = i;

    while i < bytes.len() && bytes[i] != b'=' && !is_token_end(bytes[i]) {
        i += 1;
    }

    if i > key_start && i < bytes.len() && bytes[i] == b'=' {
        let key = &raw[key_start..i];
        i += 1;

        let value;
        if i < bytes.len() && (bytes[i] == b'"' || bytes[i] == b'\'') {
            // Quoted value; an unterminated quote consumes to end of input.
            let quote = bytes[i];
            i += 1;
            let val_start = i;
            while i < bytes.len() && bytes[i] != quote {
                i += 1;
            }
            value = &raw[val_start..i];
            if i < bytes.len() {
                i += 1;
            }
        } else {
            let val_start = i;
            while i < bytes.len() && !is_token_end(bytes[i]) {
                i += 1;
            }
            value = &raw[val_start..i];
        }

        let prop_value = if bind {
            PropValue::Bind(value)
        } else {
            PropValue::Str(value)
        };
        push_prop(out, key, prop_value);
    } else if i > key_start {
        push_prop(out, &raw[key_start..i], PropValue::Boolean);
    } else {
        // Unrecognized byte (stray `=`, `}`, lone `:`); skip it.
        i += 1;
    }

    i
}

fn push_prop<'a>(out: &mut ParsedProps<'a>, key: &'a str, value: PropValue<'a>) {
    if out.props.len() < MAX_PROPS {
        out.props.push(Prop { key, value });
    } else {
        out.dropped += 1;
    }
}
