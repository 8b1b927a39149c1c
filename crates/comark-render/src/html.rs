//! Streaming HTML renderer.

use std::io::{self, Write};

use comark_event::entity::{BuiltinEntities, EntityResolver};
use comark_event::{Block, Event, EventConsumer, Span, TextKind};
use comark_props::{parse_props, PropValue};

use crate::escape::{write_entity_html_escaped, write_html_escaped, write_url_escaped};
use crate::{yaml, RenderError};

/// HTML rendering options.
#[derive(Clone, Debug, Default)]
pub struct HtmlOptions {
    /// Emit a complete `<!DOCTYPE html>` document instead of a fragment.
    pub full_document: bool,
    /// Document title override; wins over the frontmatter title.
    pub title: Option<String>,
    /// Stylesheet URL for the `<head>`, if any.
    pub css_url: Option<String>,
    /// Pass entity references through without decoding them.
    pub verbatim_entities: bool,
}

/// Deferred opening tag for a block component.
///
/// A component's opening tag may pick up extra attributes from a
/// frontmatter block that immediately follows it, so the tag text is
/// buffered rather than written:
///
/// - `Idle`: nothing buffered, output streams normally.
/// - `Pending`: the tag prefix (`<name` plus resolved `{props}` attrs) is
///   buffered, waiting to see the next block.
/// - `Capturing`: the next block was frontmatter; its text is captured as
///   YAML to be emitted as attributes when the frontmatter closes.
#[derive(Debug, Default)]
enum DeferredTag {
    #[default]
    Idle,
    Pending {
        tag: Vec<u8>,
    },
    Capturing {
        tag: Vec<u8>,
        yaml: String,
    },
}

/// Streaming HTML renderer.
///
/// Consumes events directly and writes HTML to the sink. Frontmatter is
/// suppressed from normal output; in full-document mode the document-level
/// frontmatter feeds the `<head>` metadata instead.
pub struct HtmlRenderer<'r, W> {
    out: W,
    entities: &'r dyn EntityResolver,
    opts: HtmlOptions,
    image_nesting: usize,
    in_frontmatter: bool,
    component_depth: usize,
    deferred: DeferredTag,
    head_emitted: bool,
    /// Captured document-level frontmatter text (full-document mode).
    frontmatter: String,
}

impl<W: Write> HtmlRenderer<'_, W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            entities: &BuiltinEntities,
            opts: HtmlOptions::default(),
            image_nesting: 0,
            in_frontmatter: false,
            component_depth: 0,
            deferred: DeferredTag::Idle,
            head_emitted: false,
            frontmatter: String::new(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, opts: HtmlOptions) -> Self {
        self.opts = opts;
        self
    }

    /// Render a complete event stream.
    pub fn render<'a, I>(&mut self, events: I) -> Result<(), RenderError>
    where
        I: IntoIterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event)?;
        }
        self.finish()
    }

    /// Flush any still-buffered state after the last event.
    pub fn finish(&mut self) -> Result<(), RenderError> {
        self.flush_pending()?;
        Ok(())
    }

    /// Recover the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Write a buffered Pending tag unmodified. No-op in other states.
    fn flush_pending(&mut self) -> io::Result<()> {
        if matches!(self.deferred, DeferredTag::Pending { .. }) {
            if let DeferredTag::Pending { tag } = std::mem::take(&mut self.deferred) {
                self.out.write_all(&tag)?;
                self.out.write_all(b">\n")?;
            }
        }
        Ok(())
    }

    /// Complete a captured tag: emit the buffered prefix, then the
    /// frontmatter's top-level scalars as HTML attributes.
    fn flush_captured(&mut self, tag: &[u8], yaml: &str) -> io::Result<()> {
        self.out.write_all(tag)?;
        for (key, value) in yaml::frontmatter_attrs(yaml) {
            self.out.write_all(b" ")?;
            write_html_escaped(&mut self.out, &key)?;
            self.out.write_all(b"=\"")?;
            write_html_escaped(&mut self.out, &value)?;
            self.out.write_all(b"\"")?;
        }
        self.out.write_all(b">\n")
    }

    /// Emit the document preamble once, before the first body content.
    /// Title and description come from captured frontmatter unless
    /// overridden by options.
    fn ensure_head(&mut self) -> io::Result<()> {
        if self.head_emitted {
            return Ok(());
        }
        self.head_emitted = true;

        let (yaml_title, yaml_description) = yaml::frontmatter_meta(&self.frontmatter);
        let title = self.opts.title.clone().or(yaml_title);

        self.out
            .write_all(b"<!DOCTYPE html>\n<html>\n<head>\n<title>")?;
        if let Some(title) = title {
            write_html_escaped(&mut self.out, &title)?;
        }
        self.out.write_all(b"</title>\n")?;
        self.out
            .write_all(b"<meta name=\"generator\" content=\"comark\">\n")?;
        self.out.write_all(b"<meta charset=\"UTF-8\">\n")?;
        if let Some(description) = yaml_description {
            self.out.write_all(b"<meta name=\"description\" content=\"")?;
            write_html_escaped(&mut self.out, &description)?;
            self.out.write_all(b"\">\n")?;
        }
        if let Some(css_url) = self.opts.css_url.clone() {
            self.out.write_all(b"<link rel=\"stylesheet\" href=\"")?;
            write_html_escaped(&mut self.out, &css_url)?;
            self.out.write_all(b"\">\n")?;
        }
        self.out.write_all(b"</head>\n<body>\n")
    }

    fn open_cell(&mut self, tag: &str, align: comark_event::Alignment) -> io::Result<()> {
        use comark_event::Alignment;
        write!(self.out, "<{tag}")?;
        match align {
            Alignment::None => {}
            Alignment::Left => self.out.write_all(b" align=\"left\"")?,
            Alignment::Center => self.out.write_all(b" align=\"center\"")?,
            Alignment::Right => self.out.write_all(b" align=\"right\"")?,
        }
        self.out.write_all(b">")
    }

    /// Open a simple span tag with optional trailing `{attrs}` props.
    fn open_attr_span(&mut self, tag: &str, attrs: Option<&str>) -> io::Result<()> {
        write!(self.out, "<{tag}")?;
        if let Some(attrs) = attrs {
            write_props_attrs(&mut self.out, attrs)?;
        }
        self.out.write_all(b">")
    }

    #[allow(clippy::too_many_lines)]
    fn enter_block(&mut self, block: Block<'_>) -> io::Result<()> {
        if matches!(block, Block::Frontmatter) {
            self.in_frontmatter = true;
            // A pending component tag gets to incorporate this
            // frontmatter's keys; switch to capturing.
            if matches!(self.deferred, DeferredTag::Pending { .. }) {
                if let DeferredTag::Pending { tag } = std::mem::take(&mut self.deferred) {
                    self.deferred = DeferredTag::Capturing {
                        tag,
                        yaml: String::new(),
                    };
                }
            }
            return Ok(());
        }

        // Any other block ends the lookahead; the buffered tag goes out
        // bare.
        self.flush_pending()?;

        if self.opts.full_document && !matches!(block, Block::Document) {
            self.ensure_head()?;
        }

        match block {
            Block::Document | Block::HtmlBlock | Block::Frontmatter => {}
            Block::Quote => self.out.write_all(b"<blockquote>\n")?,
            Block::UnorderedList { .. } => self.out.write_all(b"<ul>\n")?,
            Block::OrderedList { start, .. } => {
                if start == 1 {
                    self.out.write_all(b"<ol>\n")?;
                } else {
                    writeln!(self.out, "<ol start=\"{start}\">")?;
                }
            }
            Block::ListItem { task: None } => self.out.write_all(b"<li>")?,
            Block::ListItem { task: Some(mark) } => {
                self.out.write_all(
                    b"<li class=\"task-list-item\">\
                      <input type=\"checkbox\" class=\"task-list-item-checkbox\" disabled",
                )?;
                if matches!(mark, 'x' | 'X') {
                    self.out.write_all(b" checked")?;
                }
                self.out.write_all(b">")?;
            }
            Block::ThematicBreak => self.out.write_all(b"<hr>\n")?,
            Block::Heading { level } => write!(self.out, "<h{}>", level.clamp(1, 6))?,
            Block::CodeBlock(detail) => {
                self.out.write_all(b"<pre><code")?;
                if let Some(lang) = detail.lang.filter(|l| !l.is_empty()) {
                    self.out.write_all(b" class=\"language-")?;
                    write_html_escaped(&mut self.out, lang)?;
                    self.out.write_all(b"\"")?;
                }
                self.out.write_all(b">")?;
            }
            Block::Paragraph => self.out.write_all(b"<p>")?,
            Block::Table { .. } => self.out.write_all(b"<table>\n")?,
            Block::TableHead => self.out.write_all(b"<thead>\n")?,
            Block::TableBody => self.out.write_all(b"<tbody>\n")?,
            Block::TableRow => self.out.write_all(b"<tr>\n")?,
            Block::TableHeaderCell { align } => self.open_cell("th", align)?,
            Block::TableCell { align } => self.open_cell("td", align)?,
            Block::Component(detail) => {
                self.component_depth += 1;
                let mut tag = Vec::with_capacity(64);
                tag.push(b'<');
                write_html_escaped(&mut tag, detail.name)?;
                if let Some(props) = detail.props.filter(|p| !p.is_empty()) {
                    write_props_attrs(&mut tag, props)?;
                }
                self.deferred = DeferredTag::Pending { tag };
            }
            Block::Alert { kind } => {
                self.out.write_all(b"<blockquote class=\"alert alert-")?;
                write_html_escaped(&mut self.out, &kind.to_lowercase())?;
                self.out.write_all(b"\">\n")?;
            }
            Block::Template { name } => {
                self.out.write_all(b"<template name=\"")?;
                write_html_escaped(&mut self.out, name)?;
                self.out.write_all(b"\">\n")?;
            }
        }
        Ok(())
    }

    fn leave_block(&mut self, block: Block<'_>) -> io::Result<()> {
        match block {
            Block::Frontmatter => {
                self.in_frontmatter = false;
                if matches!(self.deferred, DeferredTag::Capturing { .. }) {
                    if let DeferredTag::Capturing { tag, yaml } = std::mem::take(&mut self.deferred)
                    {
                        self.flush_captured(&tag, &yaml)?;
                    }
                }
            }
            Block::Document => {
                if self.opts.full_document {
                    self.ensure_head()?;
                    self.out.write_all(b"</body>\n</html>\n")?;
                }
            }
            Block::Quote | Block::Alert { .. } => self.out.write_all(b"</blockquote>\n")?,
            Block::UnorderedList { .. } => self.out.write_all(b"</ul>\n")?,
            Block::OrderedList { .. } => self.out.write_all(b"</ol>\n")?,
            Block::ListItem { .. } => self.out.write_all(b"</li>\n")?,
            Block::ThematicBreak | Block::HtmlBlock => {}
            Block::Heading { level } => writeln!(self.out, "</h{}>", level.clamp(1, 6))?,
            Block::CodeBlock(_) => self.out.write_all(b"</code></pre>\n")?,
            Block::Paragraph => self.out.write_all(b"</p>\n")?,
            Block::Table { .. } => self.out.write_all(b"</table>\n")?,
            Block::TableHead => self.out.write_all(b"</thead>\n")?,
            Block::TableBody => self.out.write_all(b"</tbody>\n")?,
            Block::TableRow => self.out.write_all(b"</tr>\n")?,
            Block::TableHeaderCell { .. } => self.out.write_all(b"</th>\n")?,
            Block::TableCell { .. } => self.out.write_all(b"</td>\n")?,
            Block::Component(detail) => {
                self.component_depth = self.component_depth.saturating_sub(1);
                // Empty component: the tag never met another block.
                self.flush_pending()?;
                self.out.write_all(b"</")?;
                write_html_escaped(&mut self.out, detail.name)?;
                self.out.write_all(b">\n")?;
            }
            Block::Template { .. } => self.out.write_all(b"</template>\n")?,
        }
        Ok(())
    }

    fn enter_span(&mut self, span: Span<'_>) -> io::Result<()> {
        // Inside an image label only the alt text survives; nested tags
        // are suppressed.
        let inside_image = self.image_nesting > 0;
        if matches!(span, Span::Image(_)) {
            self.image_nesting += 1;
        }
        if inside_image {
            return Ok(());
        }

        match span {
            Span::Emphasis { attrs } => self.open_attr_span("em", attrs)?,
            Span::Strong { attrs } => self.open_attr_span("strong", attrs)?,
            Span::Underline { attrs } => self.open_attr_span("u", attrs)?,
            Span::Strikethrough { attrs } => self.open_attr_span("del", attrs)?,
            Span::Code { attrs } => self.open_attr_span("code", attrs)?,
            Span::Link(link) => {
                self.out.write_all(b"<a href=\"")?;
                write_url_escaped(&mut self.out, link.href)?;
                if let Some(title) = link.title {
                    self.out.write_all(b"\" title=\"")?;
                    write_html_escaped(&mut self.out, title)?;
                }
                self.out.write_all(b"\"")?;
                if let Some(attrs) = link.attrs {
                    write_props_attrs(&mut self.out, attrs)?;
                }
                self.out.write_all(b">")?;
            }
            Span::Image(image) => {
                self.out.write_all(b"<img src=\"")?;
                write_url_escaped(&mut self.out, image.src)?;
                self.out.write_all(b"\" alt=\"")?;
            }
            Span::Math { display: false } => self.out.write_all(b"<x-equation>")?,
            Span::Math { display: true } => {
                self.out.write_all(b"<x-equation type=\"display\">")?;
            }
            Span::Wikilink { target } => {
                self.out.write_all(b"<x-wikilink data-target=\"")?;
                write_html_escaped(&mut self.out, target)?;
                self.out.write_all(b"\">")?;
            }
            Span::Bracketed { attrs } => self.open_attr_span("span", attrs)?,
            Span::Component(detail) => {
                self.out.write_all(b"<")?;
                write_html_escaped(&mut self.out, detail.name)?;
                if let Some(props) = detail.props.filter(|p| !p.is_empty()) {
                    write_props_attrs(&mut self.out, props)?;
                }
                self.out.write_all(b">")?;
            }
        }
        Ok(())
    }

    fn leave_span(&mut self, span: Span<'_>) -> io::Result<()> {
        if let Span::Image(image) = span {
            self.image_nesting = self.image_nesting.saturating_sub(1);
            if self.image_nesting > 0 {
                return Ok(());
            }
            // Close the alt attribute opened on enter.
            if let Some(title) = image.title {
                self.out.write_all(b"\" title=\"")?;
                write_html_escaped(&mut self.out, title)?;
            }
            self.out.write_all(b"\"")?;
            if let Some(attrs) = image.attrs {
                write_props_attrs(&mut self.out, attrs)?;
            }
            return self.out.write_all(b">");
        }
        if self.image_nesting > 0 {
            return Ok(());
        }

        match span {
            Span::Emphasis { .. } => self.out.write_all(b"</em>")?,
            Span::Strong { .. } => self.out.write_all(b"</strong>")?,
            Span::Underline { .. } => self.out.write_all(b"</u>")?,
            Span::Strikethrough { .. } => self.out.write_all(b"</del>")?,
            Span::Code { .. } => self.out.write_all(b"</code>")?,
            Span::Link(_) => self.out.write_all(b"</a>")?,
            Span::Image(_) => unreachable!("handled above"),
            Span::Math { .. } => self.out.write_all(b"</x-equation>")?,
            Span::Wikilink { .. } => self.out.write_all(b"</x-wikilink>")?,
            Span::Bracketed { .. } => self.out.write_all(b"</span>")?,
            Span::Component(detail) => {
                self.out.write_all(b"</")?;
                write_html_escaped(&mut self.out, detail.name)?;
                self.out.write_all(b">")?;
            }
        }
        Ok(())
    }

    fn text(&mut self, kind: TextKind, text: &str) -> io::Result<()> {
        if self.in_frontmatter {
            // Frontmatter never renders; it feeds the deferred component
            // tag or, at document level in full mode, the <head> metadata.
            match &mut self.deferred {
                DeferredTag::Capturing { yaml, .. } => yaml.push_str(text),
                _ => {
                    if self.opts.full_document && self.component_depth == 0 {
                        self.frontmatter.push_str(text);
                    }
                }
            }
            return Ok(());
        }

        match kind {
            TextKind::NullChar => self.out.write_all("\u{fffd}".as_bytes()),
            TextKind::HardBreak => {
                if self.image_nesting == 0 {
                    self.out.write_all(b"<br>\n")
                } else {
                    self.out.write_all(b" ")
                }
            }
            TextKind::SoftBreak => {
                if self.image_nesting == 0 {
                    self.out.write_all(b"\n")
                } else {
                    self.out.write_all(b" ")
                }
            }
            TextKind::Html => self.out.write_all(text.as_bytes()),
            TextKind::Entity => {
                if self.opts.verbatim_entities {
                    self.out.write_all(text.as_bytes())
                } else {
                    write_entity_html_escaped(&mut self.out, text, self.entities)
                }
            }
            _ => write_html_escaped(&mut self.out, text),
        }
    }
}

impl<'r, W: Write> HtmlRenderer<'r, W> {
    #[must_use]
    pub fn with_entities(mut self, entities: &'r dyn EntityResolver) -> Self {
        self.entities = entities;
        self
    }
}

impl<W: Write> EventConsumer for HtmlRenderer<'_, W> {
    type Error = RenderError;

    fn process_event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        match event {
            Event::EnterBlock(block) => self.enter_block(block)?,
            Event::LeaveBlock(block) => self.leave_block(block)?,
            Event::EnterSpan(span) => self.enter_span(span)?,
            Event::LeaveSpan(span) => self.leave_span(span)?,
            Event::Text(kind, text) => self.text(kind, text)?,
        }
        Ok(())
    }
}

/// Render parsed `{attrs}` props as HTML attributes: id, props in order,
/// then the merged class.
fn write_props_attrs<W: Write>(out: &mut W, raw: &str) -> io::Result<()> {
    let parsed = parse_props(raw);
    if let Some(id) = parsed.id {
        out.write_all(b" id=\"")?;
        write_html_escaped(out, id)?;
        out.write_all(b"\"")?;
    }
    for prop in &parsed.props {
        out.write_all(b" ")?;
        write_html_escaped(out, prop.key)?;
        match prop.value {
            PropValue::Str(value) | PropValue::Bind(value) => {
                out.write_all(b"=\"")?;
                write_html_escaped(out, value)?;
                out.write_all(b"\"")?;
            }
            PropValue::Boolean => {}
        }
    }
    if !parsed.class.is_empty() {
        out.write_all(b" class=\"")?;
        write_html_escaped(out, &parsed.class)?;
        out.write_all(b"\"")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use comark_event::{CodeBlockDetail, ComponentDetail, ImageDetail, LinkDetail};
    use pretty_assertions::assert_eq;

    fn render(events: Vec<Event<'_>>) -> String {
        render_with(events, HtmlOptions::default())
    }

    fn render_with(events: Vec<Event<'_>>, opts: HtmlOptions) -> String {
        let mut renderer = HtmlRenderer::new(Vec::new()).with_options(opts);
        renderer.render(events).expect("render should succeed");
        String::from_utf8(renderer.into_inner()).expect("output should be UTF-8")
    }

    fn in_doc(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
        let mut all = vec![Event::EnterBlock(Block::Document)];
        all.extend(events);
        all.push(Event::LeaveBlock(Block::Document));
        all
    }

    #[test]
    fn test_paragraph() {
        let html = render(in_doc(vec![
            Event::EnterBlock(Block::Paragraph),
            Event::Text(TextKind::Normal, "Hello, world!"),
            Event::LeaveBlock(Block::Paragraph),
        ]));
        assert_eq!(html, "<p>Hello, world!</p>\n");
    }

    #[test]
    fn test_text_escaping() {
        let html = render(in_doc(vec![
            Event::EnterBlock(Block::Paragraph),
            Event::Text(TextKind::Normal, "a < b & \"c\""),
            Event::LeaveBlock(Block::Paragraph),
        ]));
        assert_eq!(html, "<p>a &lt; b &amp; &quot;c&quot;</p>\n");
    }

    #[test]
    fn test_task_list() {
        let html = render(in_doc(vec![
            Event::EnterBlock(Block::UnorderedList { tight: true }),
            Event::EnterBlock(Block::ListItem { task: Some('x') }),
            Event::Text(TextKind::Normal, "done"),
            Event::LeaveBlock(Block::ListItem { task: Some('x') }),
            Event::EnterBlock(Block::ListItem { task: Some(' ') }),
            Event::Text(TextKind::Normal, "todo"),
            Event::LeaveBlock(Block::ListItem { task: Some(' ') }),
            Event::LeaveBlock(Block::UnorderedList { tight: true }),
        ]));
        assert!(html.contains("<input type=\"checkbox\" class=\"task-list-item-checkbox\" disabled checked>done"));
        assert!(html.contains("disabled>todo"));
    }

    #[test]
    fn test_code_block_language() {
        let html = render(in_doc(vec![
            Event::EnterBlock(Block::CodeBlock(CodeBlockDetail {
                lang: Some("rust"),
                fence: '`',
                ..Default::default()
            })),
            Event::Text(TextKind::Code, "let x = 1;\n"),
            Event::LeaveBlock(Block::CodeBlock(CodeBlockDetail::default())),
        ]));
        assert_eq!(
            html,
            "<pre><code class=\"language-rust\">let x = 1;\n</code></pre>\n"
        );
    }

    #[test]
    fn test_link_url_escaping() {
        let link = Span::Link(LinkDetail {
            href: "https://example.com/a b?x=1&y=2",
            title: None,
            autolink: false,
            attrs: None,
        });
        let html = render(in_doc(vec![
            Event::EnterBlock(Block::Paragraph),
            Event::EnterSpan(link),
            Event::Text(TextKind::Normal, "go"),
            Event::LeaveSpan(link),
            Event::LeaveBlock(Block::Paragraph),
        ]));
        assert_eq!(
            html,
            "<p><a href=\"https://example.com/a%20b?x=1&amp;y=2\">go</a></p>\n"
        );
    }

    #[test]
    fn test_image_alt_flattening() {
        let img = Span::Image(ImageDetail {
            src: "pic.png",
            title: Some("T"),
            attrs: None,
        });
        let html = render(in_doc(vec![
            Event::EnterBlock(Block::Paragraph),
            Event::EnterSpan(img),
            Event::Text(TextKind::Normal, "a "),
            Event::EnterSpan(Span::Emphasis { attrs: None }),
            Event::Text(TextKind::Normal, "b"),
            Event::LeaveSpan(Span::Emphasis { attrs: None }),
            Event::Text(TextKind::Normal, " c"),
            Event::LeaveSpan(img),
            Event::LeaveBlock(Block::Paragraph),
        ]));
        assert_eq!(
            html,
            "<p><img src=\"pic.png\" alt=\"a b c\" title=\"T\"></p>\n"
        );
    }

    #[test]
    fn test_entity_decoding() {
        let html = render(in_doc(vec![
            Event::EnterBlock(Block::Paragraph),
            Event::Text(TextKind::Entity, "&amp;"),
            Event::Text(TextKind::Entity, "&#x2014;"),
            Event::Text(TextKind::Entity, "&unknown;"),
            Event::LeaveBlock(Block::Paragraph),
        ]));
        assert_eq!(html, "<p>&amp;\u{2014}&amp;unknown;</p>\n");
    }

    #[test]
    fn test_verbatim_entities_option() {
        let html = render_with(
            in_doc(vec![
                Event::EnterBlock(Block::Paragraph),
                Event::Text(TextKind::Entity, "&amp;"),
                Event::LeaveBlock(Block::Paragraph),
            ]),
            HtmlOptions {
                verbatim_entities: true,
                ..Default::default()
            },
        );
        assert_eq!(html, "<p>&amp;</p>\n");
    }

    #[test]
    fn test_alert_block() {
        let html = render(in_doc(vec![
            Event::EnterBlock(Block::Alert { kind: "WARNING" }),
            Event::EnterBlock(Block::Paragraph),
            Event::Text(TextKind::Normal, "careful"),
            Event::LeaveBlock(Block::Paragraph),
            Event::LeaveBlock(Block::Alert { kind: "WARNING" }),
        ]));
        assert_eq!(
            html,
            "<blockquote class=\"alert alert-warning\">\n<p>careful</p>\n</blockquote>\n"
        );
    }

    #[test]
    fn test_component_with_frontmatter_attrs() {
        let comp = ComponentDetail {
            name: "card",
            props: None,
        };
        let html = render(in_doc(vec![
            Event::EnterBlock(Block::Component(comp)),
            Event::EnterBlock(Block::Frontmatter),
            Event::Text(TextKind::Normal, "color: red\n"),
            Event::LeaveBlock(Block::Frontmatter),
            Event::EnterBlock(Block::Paragraph),
            Event::Text(TextKind::Normal, "body"),
            Event::LeaveBlock(Block::Paragraph),
            Event::LeaveBlock(Block::Component(comp)),
        ]));
        assert_eq!(
            html,
            "<card color=\"red\">\n<p>body</p>\n</card>\n"
        );
    }

    #[test]
    fn test_component_without_frontmatter_flushes_bare() {
        let comp = ComponentDetail {
            name: "card",
            props: Some(".wide"),
        };
        let html = render(in_doc(vec![
            Event::EnterBlock(Block::Component(comp)),
            Event::EnterBlock(Block::Paragraph),
            Event::Text(TextKind::Normal, "body"),
            Event::LeaveBlock(Block::Paragraph),
            Event::LeaveBlock(Block::Component(comp)),
        ]));
        assert_eq!(html, "<card class=\"wide\">\n<p>body</p>\n</card>\n");
    }

    #[test]
    fn test_empty_component_still_emits_both_tags() {
        let comp = ComponentDetail {
            name: "card",
            props: None,
        };
        let html = render(in_doc(vec![
            Event::EnterBlock(Block::Component(comp)),
            Event::LeaveBlock(Block::Component(comp)),
        ]));
        assert_eq!(html, "<card>\n</card>\n");
    }

    #[test]
    fn test_component_props_and_frontmatter_combine() {
        let comp = ComponentDetail {
            name: "card",
            props: Some(r#"#main .wide"#),
        };
        let html = render(in_doc(vec![
            Event::EnterBlock(Block::Component(comp)),
            Event::EnterBlock(Block::Frontmatter),
            Event::Text(TextKind::Normal, "color: red\ncount: 2\nnested:\n  a: 1\n"),
            Event::LeaveBlock(Block::Frontmatter),
            Event::LeaveBlock(Block::Component(comp)),
        ]));
        assert_eq!(
            html,
            "<card id=\"main\" class=\"wide\" color=\"red\" count=\"2\">\n</card>\n"
        );
    }

    #[test]
    fn test_full_document_head_from_frontmatter() {
        let html = render_with(
            in_doc(vec![
                Event::EnterBlock(Block::Frontmatter),
                Event::Text(TextKind::Normal, "title: My Page\ndescription: About things\n"),
                Event::LeaveBlock(Block::Frontmatter),
                Event::EnterBlock(Block::Paragraph),
                Event::Text(TextKind::Normal, "body"),
                Event::LeaveBlock(Block::Paragraph),
            ]),
            HtmlOptions {
                full_document: true,
                ..Default::default()
            },
        );
        assert!(html.starts_with("<!DOCTYPE html>\n<html>\n<head>\n<title>My Page</title>\n"));
        assert!(html.contains("<meta name=\"description\" content=\"About things\">\n"));
        assert!(html.contains("</head>\n<body>\n<p>body</p>\n</body>\n</html>\n"));
    }

    #[test]
    fn test_full_document_title_option_wins() {
        let html = render_with(
            in_doc(vec![
                Event::EnterBlock(Block::Frontmatter),
                Event::Text(TextKind::Normal, "title: From YAML\n"),
                Event::LeaveBlock(Block::Frontmatter),
                Event::EnterBlock(Block::Paragraph),
                Event::Text(TextKind::Normal, "body"),
                Event::LeaveBlock(Block::Paragraph),
            ]),
            HtmlOptions {
                full_document: true,
                title: Some("Override".to_owned()),
                ..Default::default()
            },
        );
        assert!(html.contains("<title>Override</title>"));
        assert!(!html.contains("From YAML"));
    }

    #[test]
    fn test_full_document_empty_still_has_head() {
        let html = render_with(
            in_doc(vec![]),
            HtmlOptions {
                full_document: true,
                ..Default::default()
            },
        );
        assert_eq!(
            html,
            "<!DOCTYPE html>\n<html>\n<head>\n<title></title>\n\
             <meta name=\"generator\" content=\"comark\">\n<meta charset=\"UTF-8\">\n\
             </head>\n<body>\n</body>\n</html>\n"
        );
    }

    #[test]
    fn test_fragment_frontmatter_suppressed() {
        let html = render(in_doc(vec![
            Event::EnterBlock(Block::Frontmatter),
            Event::Text(TextKind::Normal, "title: hidden\n"),
            Event::LeaveBlock(Block::Frontmatter),
            Event::EnterBlock(Block::Paragraph),
            Event::Text(TextKind::Normal, "visible"),
            Event::LeaveBlock(Block::Paragraph),
        ]));
        assert_eq!(html, "<p>visible</p>\n");
    }

    #[test]
    fn test_inline_component_and_span_attrs() {
        let comp = ComponentDetail {
            name: "badge",
            props: Some("kind=info"),
        };
        let html = render(in_doc(vec![
            Event::EnterBlock(Block::Paragraph),
            Event::EnterSpan(Span::Component(comp)),
            Event::Text(TextKind::Normal, "New"),
            Event::LeaveSpan(Span::Component(comp)),
            Event::EnterSpan(Span::Bracketed {
                attrs: Some(".hl"),
            }),
            Event::Text(TextKind::Normal, "mark"),
            Event::LeaveSpan(Span::Bracketed {
                attrs: Some(".hl"),
            }),
            Event::LeaveBlock(Block::Paragraph),
        ]));
        assert_eq!(
            html,
            "<p><badge kind=\"info\">New</badge><span class=\"hl\">mark</span></p>\n"
        );
    }

    #[test]
    fn test_wikilink_and_math() {
        let html = render(in_doc(vec![
            Event::EnterBlock(Block::Paragraph),
            Event::EnterSpan(Span::Wikilink { target: "Home" }),
            Event::Text(TextKind::Normal, "Home"),
            Event::LeaveSpan(Span::Wikilink { target: "Home" }),
            Event::EnterSpan(Span::Math { display: false }),
            Event::Text(TextKind::Math, "x^2"),
            Event::LeaveSpan(Span::Math { display: false }),
            Event::LeaveBlock(Block::Paragraph),
        ]));
        assert_eq!(
            html,
            "<p><x-wikilink data-target=\"Home\">Home</x-wikilink>\
             <x-equation>x^2</x-equation></p>\n"
        );
    }
}
