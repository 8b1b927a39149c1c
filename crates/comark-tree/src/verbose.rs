//! Verbose (legacy) JSON schema.
//!
//! Every node serializes as a pretty-printed object:
//!
//! ```json
//! {
//!   "type": "heading",
//!   "level": 1,
//!   "children": [...]
//! }
//! ```
//!
//! with `children` omitted exactly when a `literal` is present. Tag names
//! differ from the compact schema (`"heading"` + `level` instead of
//! `"h1"`, `"list"` + `listType` instead of `"ul"`/`"ol"`, and so on).
//! Kept alongside the compact form; neither is authoritative.

use std::io::{self, Write};

use comark_event::Alignment;

use crate::node::{Detail, Element, Node, TextCategory};

/// Serialize a finished tree to the verbose schema, newline-terminated.
pub fn write<W: Write>(out: &mut W, root: &Node) -> io::Result<()> {
    write_node(out, root, 0)?;
    out.write_all(b"\n")
}

/// Serialize to a `String` (convenience for callers and tests).
pub fn to_string(root: &Node) -> String {
    let mut buf = Vec::new();
    write(&mut buf, root).unwrap_or_default();
    String::from_utf8(buf).unwrap_or_default()
}

fn write_str<W: Write>(out: &mut W, s: &str) -> io::Result<()> {
    serde_json::to_writer(&mut *out, s).map_err(io::Error::from)
}

fn indent<W: Write>(out: &mut W, depth: usize) -> io::Result<()> {
    for _ in 0..depth {
        out.write_all(b"  ")?;
    }
    Ok(())
}

fn field<W: Write>(out: &mut W, depth: usize, name: &str) -> io::Result<()> {
    out.write_all(b",\n")?;
    indent(out, depth + 1)?;
    write!(out, "\"{name}\": ")
}

fn align_str(align: Alignment) -> &'static str {
    match align {
        Alignment::None => "default",
        Alignment::Left => "left",
        Alignment::Center => "center",
        Alignment::Right => "right",
    }
}

/// The verbose type name for an element.
fn type_name(el: &Element) -> &str {
    if el.tag.is_dynamic() {
        return "component";
    }
    match el.tag.as_str() {
        "blockquote" => "block_quote",
        "ul" | "ol" => "list",
        "li" => "item",
        "hr" => "thematic_break",
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => "heading",
        "pre" => "code_block",
        "p" => "paragraph",
        "thead" => "table_head",
        "tbody" => "table_body",
        "tr" => "table_row",
        "th" => "table_header_cell",
        "td" => "table_cell",
        "em" => "emph",
        "a" => "link",
        "img" => "image",
        "del" => "delete",
        "math" => "latex_math",
        "math-display" => "latex_math_display",
        "u" => "underline",
        "br" => "linebreak",
        // table, html_block, frontmatter, strong, code, wikilink, span,
        // template keep their tag as the type name.
        other => other,
    }
}

#[allow(clippy::too_many_lines)]
fn write_node<W: Write>(out: &mut W, node: &Node, depth: usize) -> io::Result<()> {
    indent(out, depth)?;
    out.write_all(b"{\n")?;
    indent(out, depth + 1)?;
    out.write_all(b"\"type\": ")?;

    match node {
        Node::Document(children) => {
            out.write_all(b"\"document\"")?;
            write_children(out, depth, children)?;
        }
        Node::Text { category, content } => {
            let name = match category {
                TextCategory::Plain => "text",
                TextCategory::HtmlInline => "html_inline",
            };
            write!(out, "\"{name}\"")?;
            field(out, depth, "literal")?;
            write_str(out, content)?;
        }
        Node::Element(el) => {
            write_str(out, type_name(el))?;
            write_element_fields(out, depth, el)?;

            if let Some(literal) = &el.literal {
                field(out, depth, "literal")?;
                write_str(out, literal)?;
            } else if el.tag.as_str() != "br" {
                write_children(out, depth, &el.children)?;
            }
        }
    }

    out.write_all(b"\n")?;
    indent(out, depth)?;
    out.write_all(b"}")
}

fn write_children<W: Write>(out: &mut W, depth: usize, children: &[Node]) -> io::Result<()> {
    field(out, depth, "children")?;
    out.write_all(b"[")?;
    if !children.is_empty() {
        out.write_all(b"\n")?;
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                out.write_all(b",\n")?;
            }
            write_node(out, child, depth + 2)?;
        }
        out.write_all(b"\n")?;
        indent(out, depth + 1)?;
    }
    out.write_all(b"]")
}

#[allow(clippy::too_many_lines)]
fn write_element_fields<W: Write>(out: &mut W, depth: usize, el: &Element) -> io::Result<()> {
    match &el.detail {
        Detail::Heading { level } => {
            field(out, depth, "level")?;
            write!(out, "{level}")?;
        }
        Detail::UnorderedList { tight } => {
            field(out, depth, "listType")?;
            out.write_all(b"\"bullet\"")?;
            field(out, depth, "listTight")?;
            write!(out, "{tight}")?;
        }
        Detail::OrderedList {
            tight,
            start,
            delimiter,
        } => {
            field(out, depth, "listType")?;
            out.write_all(b"\"ordered\"")?;
            field(out, depth, "listTight")?;
            write!(out, "{tight}")?;
            field(out, depth, "listStart")?;
            write!(out, "{start}")?;
            field(out, depth, "listDelimiter")?;
            out.write_all(if *delimiter == ')' {
                b"\"paren\""
            } else {
                b"\"period\""
            })?;
        }
        Detail::ListItem { task: Some(mark) } => {
            field(out, depth, "task")?;
            out.write_all(b"true")?;
            field(out, depth, "checked")?;
            write!(out, "{}", matches!(mark, 'x' | 'X'))?;
        }
        Detail::CodeBlock { info, fence, .. } => {
            if let Some(info) = info {
                field(out, depth, "info")?;
                write_str(out, info)?;
            }
            if *fence != '\0' {
                field(out, depth, "fence")?;
                write_str(out, &fence.to_string())?;
            }
        }
        Detail::Table { columns } => {
            field(out, depth, "columns")?;
            write!(out, "{columns}")?;
        }
        Detail::TableCell { align, .. } => {
            field(out, depth, "align")?;
            write!(out, "\"{}\"", align_str(*align))?;
        }
        Detail::Link {
            href,
            title,
            autolink,
        } => {
            field(out, depth, "destination")?;
            write_str(out, href)?;
            if let Some(title) = title {
                field(out, depth, "title")?;
                write_str(out, title)?;
            }
            if *autolink {
                field(out, depth, "autolink")?;
                out.write_all(b"true")?;
            }
        }
        Detail::Image { src, title } => {
            field(out, depth, "destination")?;
            write_str(out, src)?;
            if let Some(title) = title {
                field(out, depth, "title")?;
                write_str(out, title)?;
            }
        }
        Detail::Wikilink { target } => {
            field(out, depth, "target")?;
            write_str(out, target)?;
        }
        Detail::Template { name } => {
            field(out, depth, "name")?;
            write_str(out, name)?;
        }
        Detail::Alert { kind } => {
            field(out, depth, "alertType")?;
            write_str(out, &kind.to_lowercase())?;
        }
        Detail::Component { .. } => {
            field(out, depth, "name")?;
            write_str(out, el.tag.as_str())?;
        }
        _ => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build_tree;
    use comark_event::{Block, Event, Span, TextKind};
    use pretty_assertions::assert_eq;

    fn render(events: Vec<Event<'_>>) -> String {
        let mut all = vec![Event::EnterBlock(Block::Document)];
        all.extend(events);
        all.push(Event::LeaveBlock(Block::Document));
        let tree = build_tree(all).expect("tree should build");
        to_string(&tree)
    }

    #[test]
    fn test_heading_object() {
        let json = render(vec![
            Event::EnterBlock(Block::Heading { level: 2 }),
            Event::Text(TextKind::Normal, "Hi"),
            Event::LeaveBlock(Block::Heading { level: 2 }),
        ]);
        assert_eq!(
            json,
            r#"{
  "type": "document",
  "children": [
    {
      "type": "heading",
      "level": 2,
      "children": [
        {
          "type": "text",
          "literal": "Hi"
        }
      ]
    }
  ]
}
"#
        );
    }

    #[test]
    fn test_list_fields() {
        let ol = Block::OrderedList {
            tight: true,
            start: 2,
            delimiter: ')',
        };
        let json = render(vec![
            Event::EnterBlock(ol),
            Event::EnterBlock(Block::ListItem { task: None }),
            Event::LeaveBlock(Block::ListItem { task: None }),
            Event::LeaveBlock(ol),
        ]);
        assert!(json.contains("\"type\": \"list\""));
        assert!(json.contains("\"listType\": \"ordered\""));
        assert!(json.contains("\"listTight\": true"));
        assert!(json.contains("\"listStart\": 2"));
        assert!(json.contains("\"listDelimiter\": \"paren\""));
        assert!(json.contains("\"type\": \"item\""));
    }

    #[test]
    fn test_literal_and_children_are_exclusive() {
        let json = render(vec![
            Event::EnterBlock(Block::CodeBlock(comark_event::CodeBlockDetail {
                info: Some("rust"),
                lang: Some("rust"),
                fence: '`',
                ..Default::default()
            })),
            Event::Text(TextKind::Code, "let x = 1;\n"),
            Event::LeaveBlock(Block::CodeBlock(comark_event::CodeBlockDetail::default())),
            Event::EnterBlock(Block::Paragraph),
            Event::Text(TextKind::Normal, "text"),
            Event::LeaveBlock(Block::Paragraph),
        ]);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        fn check(node: &serde_json::Value) {
            let has_literal = node.get("literal").is_some();
            let has_children = node.get("children").is_some();
            assert!(
                !(has_literal && has_children),
                "node has both literal and children: {node}"
            );
            if let Some(children) = node.get("children").and_then(|c| c.as_array()) {
                children.iter().for_each(check);
            }
        }
        check(&value);
        assert!(json.contains("\"type\": \"code_block\""));
        assert!(json.contains("\"info\": \"rust\""));
        assert!(json.contains("\"fence\": \"`\""));
    }

    #[test]
    fn test_linebreak_has_no_children() {
        let json = render(vec![
            Event::EnterBlock(Block::Paragraph),
            Event::Text(TextKind::Normal, "a"),
            Event::Text(TextKind::HardBreak, "\n"),
            Event::Text(TextKind::Normal, "b"),
            Event::LeaveBlock(Block::Paragraph),
        ]);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let br = &value["children"][0]["children"][1];
        assert_eq!(br["type"], "linebreak");
        assert!(br.get("children").is_none());
        assert!(br.get("literal").is_none());
    }

    #[test]
    fn test_span_type_names() {
        let json = render(vec![
            Event::EnterBlock(Block::Paragraph),
            Event::EnterSpan(Span::Emphasis { attrs: None }),
            Event::Text(TextKind::Normal, "em"),
            Event::LeaveSpan(Span::Emphasis { attrs: None }),
            Event::EnterSpan(Span::Strikethrough { attrs: None }),
            Event::Text(TextKind::Normal, "gone"),
            Event::LeaveSpan(Span::Strikethrough { attrs: None }),
            Event::LeaveBlock(Block::Paragraph),
        ]);
        assert!(json.contains("\"type\": \"emph\""));
        assert!(json.contains("\"type\": \"delete\""));
    }

    #[test]
    fn test_link_destination() {
        let link = Span::Link(comark_event::LinkDetail {
            href: "https://example.com",
            title: Some("T"),
            autolink: true,
            attrs: None,
        });
        let json = render(vec![
            Event::EnterBlock(Block::Paragraph),
            Event::EnterSpan(link),
            Event::Text(TextKind::Normal, "x"),
            Event::LeaveSpan(link),
            Event::LeaveBlock(Block::Paragraph),
        ]);
        assert!(json.contains("\"type\": \"link\""));
        assert!(json.contains("\"destination\": \"https://example.com\""));
        assert!(json.contains("\"title\": \"T\""));
        assert!(json.contains("\"autolink\": true"));
    }
}
