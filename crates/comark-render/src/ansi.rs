//! Streaming ANSI terminal renderer.

use std::io::{self, Write};

use comark_event::entity::{BuiltinEntities, EntityResolver};
use comark_event::{Block, Event, EventConsumer, Span, TextKind};

use crate::escape::write_entity_raw;
use crate::RenderError;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const BOLD_OFF: &str = "\x1b[22m";
const DIM: &str = "\x1b[2m";
const DIM_OFF: &str = "\x1b[22m";
const ITALIC: &str = "\x1b[3m";
const ITALIC_OFF: &str = "\x1b[23m";
const UNDERLINE: &str = "\x1b[4m";
const UNDERLINE_OFF: &str = "\x1b[24m";
const STRIKETHROUGH: &str = "\x1b[9m";
const STRIKETHROUGH_OFF: &str = "\x1b[29m";

const CYAN: &str = "\x1b[36m";
const YELLOW: &str = "\x1b[33m";
const GREEN: &str = "\x1b[32m";
const COLOR_DEFAULT: &str = "\x1b[39m";

// Compound styles.
const HEADING: &str = "\x1b[1;35m";
const LINK: &str = "\x1b[4;34m";
const LINK_URL: &str = "\x1b[2;34m";

// OSC 8 hyperlinks: open with `ESC ] 8 ; ; URL ESC \`, close with an empty
// URL.
const HYPERLINK_OPEN: &str = "\x1b]8;;";
const HYPERLINK_SEP: &str = "\x1b\\";
const HYPERLINK_CLOSE: &str = "\x1b]8;;\x1b\\";

/// 20 box-drawing dashes.
const HORIZONTAL_RULE: &str = "────────────────────";
/// Blockquote bar (U+2502).
const QUOTE_BAR: &str = "│";

/// ANSI rendering options.
#[derive(Clone, Copy, Debug)]
pub struct AnsiOptions {
    /// Emit styling and OSC-8 escapes. When false the output is pure text
    /// with the same layout.
    pub color: bool,
}

impl Default for AnsiOptions {
    fn default() -> Self {
        Self { color: true }
    }
}

/// Streaming ANSI renderer.
///
/// Indentation (quote bars, list indents) is replayed at the start of each
/// visible line rather than once per block, because block content may span
/// many lines under nested quotes and lists.
pub struct AnsiRenderer<'r, W> {
    out: W,
    entities: &'r dyn EntityResolver,
    opts: AnsiOptions,
    image_nesting: usize,
    quote_depth: usize,
    list_depth: usize,
    /// Next ordered-list marker number; 0 means unordered context.
    ol_counter: u32,
    in_code_block: bool,
    /// A blank separator line is owed before the next block.
    need_newline: bool,
    /// An indent is owed at the start of the next code line.
    need_indent: bool,
    /// A list-item marker was just printed; suppresses the indent/blank
    /// line before the item's first paragraph.
    li_opened: bool,
}

impl<W: Write> AnsiRenderer<'_, W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            entities: &BuiltinEntities,
            opts: AnsiOptions::default(),
            image_nesting: 0,
            quote_depth: 0,
            list_depth: 0,
            ol_counter: 0,
            in_code_block: false,
            need_newline: false,
            need_indent: false,
            li_opened: false,
        }
    }

    #[must_use]
    pub fn with_options(mut self, opts: AnsiOptions) -> Self {
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
        Ok(())
    }

    /// Recover the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn style(&mut self, code: &str) -> io::Result<()> {
        if self.opts.color {
            self.out.write_all(code.as_bytes())?;
        }
        Ok(())
    }

    fn newline(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")
    }

    /// Replay quote markers and list indentation for one line.
    fn indent(&mut self) -> io::Result<()> {
        for _ in 0..self.quote_depth {
            self.style(DIM)?;
            self.out.write_all(b"  ")?;
            self.out.write_all(QUOTE_BAR.as_bytes())?;
            self.out.write_all(b" ")?;
            self.style(DIM_OFF)?;
        }
        for _ in 0..self.list_depth {
            self.out.write_all(b"  ")?;
        }
        Ok(())
    }

    /// Pay the owed blank separator line, if any.
    fn separate(&mut self) -> io::Result<()> {
        if self.need_newline {
            self.newline()?;
            self.need_newline = false;
        }
        Ok(())
    }

    #[allow(clippy::too_many_lines)]
    fn enter_block(&mut self, block: Block<'_>) -> io::Result<()> {
        match block {
            Block::Document | Block::HtmlBlock | Block::TableHead | Block::TableBody
            | Block::TableCell { .. } | Block::Template { .. } => {}
            Block::Quote => {
                self.separate()?;
                self.quote_depth += 1;
            }
            Block::UnorderedList { .. } => {
                if self.list_depth == 0 {
                    self.separate()?;
                }
            }
            Block::OrderedList { start, .. } => {
                if self.list_depth == 0 {
                    self.separate()?;
                }
                self.ol_counter = start;
            }
            Block::ListItem { task } => {
                self.indent()?;
                match task {
                    Some(mark) if matches!(mark, 'x' | 'X') => {
                        self.style(GREEN)?;
                        self.out.write_all(b"[x] ")?;
                        self.style(COLOR_DEFAULT)?;
                    }
                    Some(_) => self.out.write_all(b"[ ] ")?,
                    None => {
                        if self.ol_counter > 0 {
                            self.style(DIM)?;
                            write!(self.out, "{}. ", self.ol_counter)?;
                            self.style(DIM_OFF)?;
                            self.ol_counter += 1;
                        } else {
                            self.style(DIM)?;
                            self.out.write_all(b"* ")?;
                            self.style(DIM_OFF)?;
                        }
                    }
                }
                self.list_depth += 1;
                self.li_opened = true;
            }
            Block::ThematicBreak => {
                self.separate()?;
                self.indent()?;
                self.style(DIM)?;
                self.out.write_all(HORIZONTAL_RULE.as_bytes())?;
                self.style(DIM_OFF)?;
                self.newline()?;
                self.need_newline = true;
            }
            Block::Heading { .. } => {
                self.separate()?;
                self.indent()?;
                self.style(HEADING)?;
            }
            Block::CodeBlock(_) => {
                self.separate()?;
                self.in_code_block = true;
                self.need_indent = true;
                self.style(DIM)?;
            }
            Block::Paragraph => {
                if !self.li_opened {
                    self.separate()?;
                    self.indent()?;
                } else {
                    self.need_newline = false;
                }
                self.li_opened = false;
            }
            Block::Table { .. } => self.separate()?,
            Block::TableRow => self.indent()?,
            Block::TableHeaderCell { .. } => self.style(BOLD)?,
            Block::Frontmatter => self.style(DIM)?,
            Block::Component(_) => {
                self.separate()?;
                self.style(CYAN)?;
            }
            Block::Alert { kind } => {
                self.separate()?;
                self.quote_depth += 1;
                self.indent()?;
                self.style(YELLOW)?;
                self.out.write_all(kind.as_bytes())?;
                self.style(COLOR_DEFAULT)?;
                self.newline()?;
            }
        }
        Ok(())
    }

    fn leave_block(&mut self, block: Block<'_>) -> io::Result<()> {
        match block {
            Block::Document | Block::HtmlBlock | Block::ThematicBreak | Block::TableBody
            | Block::Template { .. } => {}
            Block::Quote => self.quote_depth = self.quote_depth.saturating_sub(1),
            Block::UnorderedList { .. } | Block::OrderedList { .. } => {
                self.ol_counter = 0;
                self.need_newline = true;
            }
            Block::ListItem { .. } => {
                self.list_depth = self.list_depth.saturating_sub(1);
                self.newline()?;
            }
            Block::Heading { .. } => {
                self.style(RESET)?;
                self.newline()?;
                self.need_newline = true;
            }
            Block::CodeBlock(_) => {
                self.style(DIM_OFF)?;
                self.in_code_block = false;
                self.need_newline = true;
            }
            Block::Paragraph => {
                self.newline()?;
                self.need_newline = true;
            }
            Block::Table { .. } => self.need_newline = true,
            Block::TableHead => {
                self.indent()?;
                self.style(DIM)?;
                self.out.write_all(HORIZONTAL_RULE.as_bytes())?;
                self.style(DIM_OFF)?;
                self.newline()?;
            }
            Block::TableRow => self.newline()?,
            Block::TableHeaderCell { .. } => {
                self.style(BOLD_OFF)?;
                self.out.write_all(b"\t")?;
            }
            Block::TableCell { .. } => self.out.write_all(b"\t")?,
            Block::Frontmatter => {
                self.style(DIM_OFF)?;
                self.need_newline = true;
            }
            Block::Component(_) => {
                self.style(COLOR_DEFAULT)?;
                self.need_newline = true;
            }
            Block::Alert { .. } => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.need_newline = true;
            }
        }
        Ok(())
    }

    fn enter_span(&mut self, span: Span<'_>) -> io::Result<()> {
        if matches!(span, Span::Image(_)) {
            self.image_nesting += 1;
        }
        if self.image_nesting > 0 && !matches!(span, Span::Image(_)) {
            return Ok(());
        }

        match span {
            Span::Emphasis { .. } => self.style(ITALIC)?,
            Span::Strong { .. } => self.style(BOLD)?,
            Span::Underline { .. } => self.style(UNDERLINE)?,
            Span::Strikethrough { .. } => self.style(STRIKETHROUGH)?,
            Span::Code { .. } => self.style(CYAN)?,
            Span::Link(link) => {
                // OSC 8 makes the text clickable in supporting terminals.
                if self.opts.color && !link.href.is_empty() {
                    self.out.write_all(HYPERLINK_OPEN.as_bytes())?;
                    self.out.write_all(link.href.as_bytes())?;
                    self.out.write_all(HYPERLINK_SEP.as_bytes())?;
                }
                self.style(LINK)?;
            }
            Span::Image(_) => {
                self.style(DIM)?;
                self.out.write_all(b"[image: ")?;
            }
            Span::Math { .. } => self.style(YELLOW)?,
            Span::Wikilink { .. } => self.style(LINK)?,
            Span::Component(_) => self.style(CYAN)?,
            Span::Bracketed { .. } => {}
        }
        Ok(())
    }

    fn leave_span(&mut self, span: Span<'_>) -> io::Result<()> {
        if matches!(span, Span::Image(_)) {
            self.image_nesting = self.image_nesting.saturating_sub(1);
        }
        if self.image_nesting > 0 {
            return Ok(());
        }

        match span {
            Span::Emphasis { .. } => self.style(ITALIC_OFF)?,
            Span::Strong { .. } => self.style(BOLD_OFF)?,
            Span::Underline { .. } => self.style(UNDERLINE_OFF)?,
            Span::Strikethrough { .. } => self.style(STRIKETHROUGH_OFF)?,
            Span::Code { .. } => self.style(COLOR_DEFAULT)?,
            Span::Link(link) => {
                self.style(RESET)?;
                if self.opts.color && !link.href.is_empty() {
                    self.out.write_all(HYPERLINK_CLOSE.as_bytes())?;
                }
                // Dim URL fallback keeps the destination visible on
                // terminals without OSC 8 support.
                if !link.href.is_empty() && !link.autolink {
                    self.style(LINK_URL)?;
                    self.out.write_all(b" (")?;
                    self.out.write_all(link.href.as_bytes())?;
                    self.out.write_all(b")")?;
                    self.style(RESET)?;
                }
            }
            Span::Image(_) => {
                self.out.write_all(b"]")?;
                self.style(DIM_OFF)?;
            }
            Span::Math { .. } => self.style(COLOR_DEFAULT)?,
            Span::Wikilink { .. } => self.style(RESET)?,
            Span::Component(_) => self.style(COLOR_DEFAULT)?,
            Span::Bracketed { .. } => {}
        }
        Ok(())
    }

    fn text(&mut self, kind: TextKind, text: &str) -> io::Result<()> {
        match kind {
            TextKind::NullChar => self.out.write_all("\u{fffd}".as_bytes()),
            TextKind::HardBreak => {
                self.newline()?;
                self.indent()
            }
            TextKind::SoftBreak => {
                if self.image_nesting == 0 {
                    self.newline()?;
                    self.indent()
                } else {
                    self.out.write_all(b" ")
                }
            }
            TextKind::Html => self.out.write_all(text.as_bytes()),
            TextKind::Entity => write_entity_raw(&mut self.out, text, self.entities),
            TextKind::Code if self.in_code_block => {
                // The parser sends each code line and its newline as
                // separate events; need_indent marks line starts.
                if text == "\n" {
                    self.newline()?;
                    self.need_indent = true;
                    Ok(())
                } else {
                    if self.need_indent {
                        self.indent()?;
                        self.out.write_all(b"  ")?;
                        self.need_indent = false;
                    }
                    self.out.write_all(text.as_bytes())
                }
            }
            _ => self.out.write_all(text.as_bytes()),
        }
    }
}

impl<'r, W: Write> AnsiRenderer<'r, W> {
    #[must_use]
    pub fn with_entities(mut self, entities: &'r dyn EntityResolver) -> Self {
        self.entities = entities;
        self
    }
}

impl<W: Write> EventConsumer for AnsiRenderer<'_, W> {
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
