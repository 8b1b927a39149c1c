//! Streaming plain-text renderer.

use std::io::{self, Write};

use comark_event::entity::{BuiltinEntities, EntityResolver};
use comark_event::{Block, Event, EventConsumer, Span, TextKind};

use crate::escape::write_entity_raw;
use crate::RenderError;

/// Streaming plain-text renderer.
///
/// Quote markers and list indentation are replayed at the start of each
/// visible line. Frontmatter and raw HTML are suppressed; entities decode
/// to UTF-8.
pub struct TextRenderer<'r, W> {
    out: W,
    entities: &'r dyn EntityResolver,
    image_nesting: usize,
    quote_depth: usize,
    list_depth: usize,
    /// Next ordered-list marker number; 0 means unordered context.
    ol_counter: u32,
    in_code_block: bool,
    need_newline: bool,
    need_indent: bool,
    li_opened: bool,
    in_frontmatter: bool,
}

impl<W: Write> TextRenderer<'_, W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            entities: &BuiltinEntities,
            image_nesting: 0,
            quote_depth: 0,
            list_depth: 0,
            ol_counter: 0,
            in_code_block: false,
            need_newline: false,
            need_indent: false,
            li_opened: false,
            in_frontmatter: false,
        }
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

    fn newline(&mut self) -> io::Result<()> {
        self.out.write_all(b"\n")
    }

    fn indent(&mut self) -> io::Result<()> {
        for _ in 0..self.quote_depth {
            self.out.write_all(b"> ")?;
        }
        for _ in 0..self.list_depth {
            self.out.write_all(b"  ")?;
        }
        Ok(())
    }

    fn separate(&mut self) -> io::Result<()> {
        if self.need_newline {
            self.newline()?;
            self.need_newline = false;
        }
        Ok(())
    }

    fn enter_block(&mut self, block: Block<'_>) -> io::Result<()> {
        match block {
            Block::Document
            | Block::HtmlBlock
            | Block::TableHead
            | Block::TableBody
            | Block::TableHeaderCell { .. }
            | Block::TableCell { .. }
            | Block::Template { .. } => {}
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
                    Some(mark) if matches!(mark, 'x' | 'X') => self.out.write_all(b"[x] ")?,
                    Some(_) => self.out.write_all(b"[ ] ")?,
                    None => {
                        if self.ol_counter > 0 {
                            write!(self.out, "{}. ", self.ol_counter)?;
                            self.ol_counter += 1;
                        } else {
                            self.out.write_all(b"- ")?;
                        }
                    }
                }
                self.list_depth += 1;
                self.li_opened = true;
            }
            Block::ThematicBreak => {
                self.separate()?;
                self.indent()?;
                self.out.write_all(b"---")?;
                self.newline()?;
                self.need_newline = true;
            }
            Block::Heading { .. } => {
                self.separate()?;
                self.indent()?;
            }
            Block::CodeBlock(_) => {
                self.separate()?;
                self.in_code_block = true;
                self.need_indent = true;
            }
            Block::Paragraph => {
                if !self.li_opened {
                    self.separate()?;
                    self.indent()?;
                }
                self.li_opened = false;
            }
            Block::Table { .. } | Block::Component(_) => self.separate()?,
            Block::TableRow => self.indent()?,
            Block::Frontmatter => self.in_frontmatter = true,
            Block::Alert { kind } => {
                self.separate()?;
                self.quote_depth += 1;
                self.indent()?;
                self.out.write_all(kind.as_bytes())?;
                self.newline()?;
            }
        }
        Ok(())
    }

    fn leave_block(&mut self, block: Block<'_>) -> io::Result<()> {
        match block {
            Block::Document
            | Block::HtmlBlock
            | Block::ThematicBreak
            | Block::TableHead
            | Block::TableBody
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
            Block::Heading { .. } | Block::Paragraph => {
                self.newline()?;
                self.need_newline = true;
            }
            Block::CodeBlock(_) => {
                self.in_code_block = false;
                self.need_newline = true;
            }
            Block::Table { .. } | Block::Component(_) => self.need_newline = true,
            Block::TableRow => self.newline()?,
            Block::TableHeaderCell { .. } | Block::TableCell { .. } => {
                self.out.write_all(b"\t")?;
            }
            Block::Frontmatter => self.in_frontmatter = false,
            Block::Alert { .. } => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.need_newline = true;
            }
        }
        Ok(())
    }

    fn text(&mut self, kind: TextKind, text: &str) -> io::Result<()> {
        if self.in_frontmatter {
            return Ok(());
        }
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
            TextKind::Html => Ok(()),
            TextKind::Entity => write_entity_raw(&mut self.out, text, self.entities),
            TextKind::Code if self.in_code_block => {
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

impl<'r, W: Write> TextRenderer<'r, W> {
    #[must_use]
    pub fn with_entities(mut self, entities: &'r dyn EntityResolver) -> Self {
        self.entities = entities;
        self
    }
}

impl<W: Write> EventConsumer for TextRenderer<'_, W> {
    type Error = RenderError;

    fn process_event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        match event {
            Event::EnterBlock(block) => self.enter_block(block)?,
            Event::LeaveBlock(block) => self.leave_block(block)?,
            Event::EnterSpan(span) => {
                if matches!(span, Span::Image(_)) {
                    self.image_nesting += 1;
                }
            }
            Event::LeaveSpan(span) => {
                if matches!(span, Span::Image(_)) {
                    self.image_nesting = self.image_nesting.saturating_sub(1);
                }
            }
            Event::Text(kind, text) => self.text(kind, text)?,
        }
        Ok(())
    }
}
