//! Compact ("comark") JSON schema.
//!
//! The document serializes as `{"type":"comark","value":[...]}` where every
//! element is a `[tag, props, ...children]` array and text nodes are bare
//! JSON strings. Code blocks emit a synthetic inner
//! `["code",{class},literal]` entry; images are void elements with the alt
//! text folded into their props.

use std::io::{self, Write};

use comark_event::Alignment;
use comark_props::{parse_props, PropValue};

use crate::node::{Detail, Element, Node};

/// Serialize a finished tree to the compact schema, newline-terminated.
pub fn write<W: Write>(out: &mut W, root: &Node) -> io::Result<()> {
    write_node(out, root)?;
    out.write_all(b"\n")
}

/// Serialize to a `String` (convenience for callers and tests).
pub fn to_string(root: &Node) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    write(&mut buf, root).unwrap_or_default();
    String::from_utf8(buf).unwrap_or_default()
}

/// Write a JSON string with the shared escaping rules (`"`/`\`/controls;
/// everything else verbatim). serde_json's writer implements exactly that
/// table.
fn write_str<W: Write>(out: &mut W, s: &str) -> io::Result<()> {
    serde_json::to_writer(&mut *out, s).map_err(io::Error::from)
}

fn write_node<W: Write>(out: &mut W, node: &Node) -> io::Result<()> {
    match node {
        Node::Document(children) => {
            out.write_all(b"{\"type\":\"comark\",\"value\":[")?;
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    out.write_all(b",")?;
                }
                write_node(out, child)?;
            }
            out.write_all(b"]}")
        }
        Node::Text { content, .. } => write_str(out, content),
        Node::Element(el) => write_element(out, el),
    }
}

fn write_element<W: Write>(out: &mut W, el: &Element) -> io::Result<()> {
    out.write_all(b"[")?;
    write_str(out, el.tag.as_str())?;
    out.write_all(b",")?;
    write_props(out, el)?;

    match el.tag.as_str() {
        // Code block: synthetic inner ["code",{class},literal].
        "pre" => {
            out.write_all(b",[\"code\",{")?;
            if let Detail::CodeBlock {
                lang: Some(lang), ..
            } = &el.detail
            {
                if !lang.is_empty() {
                    out.write_all(b"\"class\":")?;
                    write_str(out, &format!("language-{lang}"))?;
                }
            }
            out.write_all(b"},")?;
            write_str(out, el.literal.as_deref().unwrap_or(""))?;
            out.write_all(b"]")?;
        }
        // Void element; alt lives in the props object.
        "img" => {}
        _ => {
            if let Some(literal) = &el.literal {
                out.write_all(b",")?;
                write_str(out, literal)?;
            } else {
                for child in &el.children {
                    out.write_all(b",")?;
                    write_node(out, child)?;
                }
            }
        }
    }

    out.write_all(b"]")
}

/// Comma bookkeeping for a props object under construction.
struct PropsWriter<'w, W> {
    out: &'w mut W,
    any: bool,
}

impl<W: Write> PropsWriter<'_, W> {
    /// Write the separator and an escaped `"key":` prefix.
    fn key(&mut self, key: &str) -> io::Result<()> {
        if self.any {
            self.out.write_all(b",")?;
        }
        self.any = true;
        write_str(self.out, key)?;
        self.out.write_all(b":")
    }

    fn str_prop(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.key(key)?;
        write_str(self.out, value)
    }

    fn raw_prop(&mut self, key: &str, value: &str) -> io::Result<()> {
        self.key(key)?;
        self.out.write_all(value.as_bytes())
    }
}

fn align_str(align: Alignment) -> Option<&'static str> {
    match align {
        Alignment::None => None,
        Alignment::Left => Some("left"),
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
    }
}

#[allow(clippy::too_many_lines)]
fn write_props<W: Write>(out: &mut W, el: &Element) -> io::Result<()> {
    out.write_all(b"{")?;
    let mut w = PropsWriter { out, any: false };

    // Structural props come first.
    match &el.detail {
        Detail::OrderedList { start, .. } if *start != 1 => {
            w.raw_prop("start", &start.to_string())?;
        }
        Detail::ListItem { task: Some(mark) } => {
            w.raw_prop("task", "true")?;
            let checked = matches!(mark, 'x' | 'X');
            w.raw_prop("checked", if checked { "true" } else { "false" })?;
        }
        Detail::CodeBlock {
            lang,
            filename,
            meta,
            highlights,
            ..
        } => {
            if let Some(lang) = lang.as_deref().filter(|s| !s.is_empty()) {
                w.str_prop("language", lang)?;
            }
            if let Some(filename) = filename.as_deref().filter(|s| !s.is_empty()) {
                w.str_prop("filename", filename)?;
            }
            if !highlights.is_empty() {
                w.key("highlights")?;
                w.out.write_all(b"[")?;
                for (i, line) in highlights.iter().enumerate() {
                    if i > 0 {
                        w.out.write_all(b",")?;
                    }
                    write!(w.out, "{line}")?;
                }
                w.out.write_all(b"]")?;
            }
            if let Some(meta) = meta.as_deref().filter(|s| !s.is_empty()) {
                w.str_prop("meta", meta)?;
            }
        }
        Detail::TableCell { align, .. } => {
            if let Some(align) = align_str(*align) {
                w.str_prop("align", align)?;
            }
        }
        Detail::Link { href, title, .. } => {
            w.str_prop("href", href)?;
            if let Some(title) = title.as_deref().filter(|s| !s.is_empty()) {
                w.str_prop("title", title)?;
            }
        }
        Detail::Image { src, title } => {
            w.str_prop("src", src)?;
            if let Some(alt) = &el.literal {
                w.str_prop("alt", alt)?;
            }
            if let Some(title) = title.as_deref().filter(|s| !s.is_empty()) {
                w.str_prop("title", title)?;
            }
        }
        Detail::Wikilink { target } => {
            w.str_prop("target", target)?;
        }
        Detail::Template { name } => {
            w.str_prop("name", name)?;
        }
        Detail::Alert { kind } => {
            w.str_prop("class", &format!("alert alert-{}", kind.to_lowercase()))?;
        }
        Detail::Component {
            raw_props: Some(raw),
        } => {
            write_parsed_props(&mut w, raw)?;
        }
        _ => {}
    }

    // Then attribute-string-derived props from trailing {attrs}.
    if let Some(raw) = &el.raw_attrs {
        write_parsed_props(&mut w, raw)?;
    }

    w.out.write_all(b"}")
}

/// Write id, props (in order), and merged class from a raw attribute string.
fn write_parsed_props<W: Write>(w: &mut PropsWriter<'_, W>, raw: &str) -> io::Result<()> {
    let parsed = parse_props(raw);
    if let Some(id) = parsed.id {
        w.str_prop("id", id)?;
    }
    for prop in &parsed.props {
        match prop.value {
            PropValue::Str(value) => w.str_prop(prop.key, value)?,
            PropValue::Boolean => w.raw_prop(prop.key, "true")?,
            // Bind values are pre-formed JSON fragments, passed through
            // unescaped.
            PropValue::Bind(value) => w.raw_prop(prop.key, value)?,
        }
    }
    if !parsed.class.is_empty() {
        w.str_prop("class", &parsed.class)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_tree;
    use comark_event::{Block, ComponentDetail, Event, ImageDetail, Span, TextKind};
    use pretty_assertions::assert_eq;

    fn render(events: Vec<Event<'_>>) -> String {
        let mut all = vec![Event::EnterBlock(Block::Document)];
        all.extend(events);
        all.push(Event::LeaveBlock(Block::Document));
        let tree = build_tree(all).expect("tree should build");
        to_string(&tree)
    }

    #[test]
    fn test_heading_and_task_list() {
        let json = render(vec![
            Event::EnterBlock(Block::Heading { level: 1 }),
            Event::Text(TextKind::Normal, "Hi"),
            Event::LeaveBlock(Block::Heading { level: 1 }),
            Event::EnterBlock(Block::UnorderedList { tight: true }),
            Event::EnterBlock(Block::ListItem { task: Some('x') }),
            Event::Text(TextKind::Normal, "done"),
            Event::LeaveBlock(Block::ListItem { task: Some('x') }),
            Event::EnterBlock(Block::ListItem { task: Some(' ') }),
            Event::Text(TextKind::Normal, "todo"),
            Event::LeaveBlock(Block::ListItem { task: Some(' ') }),
            Event::LeaveBlock(Block::UnorderedList { tight: true }),
        ]);
        assert_eq!(
            json,
            "{\"type\":\"comark\",\"value\":[[\"h1\",{},\"Hi\"],[\"ul\",{},\
             [\"li\",{\"task\":true,\"checked\":true},\"done\"],\
             [\"li\",{\"task\":true,\"checked\":false},\"todo\"]]]}\n"
        );
    }

    #[test]
    fn test_code_block_synthetic_code_child() {
        let json = render(vec![
            Event::EnterBlock(Block::CodeBlock(comark_event::CodeBlockDetail {
                lang: Some("rust"),
                fence: '`',
                ..Default::default()
            })),
            Event::Text(TextKind::Code, "fn main() {}\n"),
            Event::LeaveBlock(Block::CodeBlock(comark_event::CodeBlockDetail::default())),
        ]);
        assert_eq!(
            json,
            "{\"type\":\"comark\",\"value\":[[\"pre\",{\"language\":\"rust\"},\
             [\"code\",{\"class\":\"language-rust\"},\"fn main() {}\\n\"]]]}\n"
        );
    }

    #[test]
    fn test_image_is_void_with_alt_prop() {
        let img = Span::Image(ImageDetail {
            src: "u.png",
            title: Some("T"),
            attrs: None,
        });
        let json = render(vec![
            Event::EnterBlock(Block::Paragraph),
            Event::EnterSpan(img),
            Event::Text(TextKind::Normal, "alt text"),
            Event::LeaveSpan(img),
            Event::LeaveBlock(Block::Paragraph),
        ]);
        assert_eq!(
            json,
            "{\"type\":\"comark\",\"value\":[[\"p\",{},\
             [\"img\",{\"src\":\"u.png\",\"alt\":\"alt text\",\"title\":\"T\"}]]]}\n"
        );
    }

    #[test]
    fn test_ordered_list_start() {
        let ol = Block::OrderedList {
            tight: true,
            start: 3,
            delimiter: '.',
        };
        let json = render(vec![
            Event::EnterBlock(ol),
            Event::EnterBlock(Block::ListItem { task: None }),
            Event::Text(TextKind::Normal, "third"),
            Event::LeaveBlock(Block::ListItem { task: None }),
            Event::LeaveBlock(ol),
        ]);
        assert_eq!(
            json,
            "{\"type\":\"comark\",\"value\":[[\"ol\",{\"start\":3},[\"li\",{},\"third\"]]]}\n"
        );
    }

    #[test]
    fn test_component_props_and_bind() {
        let comp = ComponentDetail {
            name: "card",
            props: Some(r#"#main .wide title="Hi" open :data='{"n":1}'"#),
        };
        let json = render(vec![
            Event::EnterBlock(Block::Component(comp)),
            Event::LeaveBlock(Block::Component(comp)),
        ]);
        assert_eq!(
            json,
            "{\"type\":\"comark\",\"value\":[[\"card\",\
             {\"id\":\"main\",\"title\":\"Hi\",\"open\":true,\"data\":{\"n\":1},\
             \"class\":\"wide\"}]]}\n"
        );
    }

    #[test]
    fn test_inline_attrs_merge_after_structural() {
        let link = Span::Link(comark_event::LinkDetail {
            href: "https://example.com",
            title: None,
            autolink: false,
            attrs: Some(".ext"),
        });
        let json = render(vec![
            Event::EnterBlock(Block::Paragraph),
            Event::EnterSpan(link),
            Event::Text(TextKind::Normal, "x"),
            Event::LeaveSpan(link),
            Event::LeaveBlock(Block::Paragraph),
        ]);
        assert_eq!(
            json,
            "{\"type\":\"comark\",\"value\":[[\"p\",{},\
             [\"a\",{\"href\":\"https://example.com\",\"class\":\"ext\"},\"x\"]]]}\n"
        );
    }

    #[test]
    fn test_alert_maps_to_blockquote_with_class() {
        let json = render(vec![
            Event::EnterBlock(Block::Alert { kind: "WARNING" }),
            Event::EnterBlock(Block::Paragraph),
            Event::Text(TextKind::Normal, "careful"),
            Event::LeaveBlock(Block::Paragraph),
            Event::LeaveBlock(Block::Alert { kind: "WARNING" }),
        ]);
        assert_eq!(
            json,
            "{\"type\":\"comark\",\"value\":[[\"blockquote\",\
             {\"class\":\"alert alert-warning\"},[\"p\",{},\"careful\"]]]}\n"
        );
    }

    #[test]
    fn test_escaping_round_trips() {
        let wild = "quote \" backslash \\ tab \t newline \n control \u{1} emoji \u{1f600}";
        let json = render(vec![
            Event::EnterBlock(Block::Paragraph),
            Event::Text(TextKind::Normal, wild),
            Event::LeaveBlock(Block::Paragraph),
        ]);
        let value: serde_json::Value = serde_json::from_str(json.trim_end()).unwrap();
        assert_eq!(value["value"][0][2], serde_json::Value::from(wild));
    }

    #[test]
    fn test_frontmatter_literal_child() {
        let json = render(vec![
            Event::EnterBlock(Block::Frontmatter),
            Event::Text(TextKind::Normal, "title: Hi\n"),
            Event::LeaveBlock(Block::Frontmatter),
        ]);
        assert_eq!(
            json,
            "{\"type\":\"comark\",\"value\":[[\"frontmatter\",{},\"title: Hi\\n\"]]}\n"
        );
    }
}
