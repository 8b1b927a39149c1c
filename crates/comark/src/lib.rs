//! Extended-Markdown event consumers.
//!
//! This crate ties the workspace together: an external parser produces
//! [`Event`]s, and the functions here drive one consumer per render call to
//! turn the stream into a target representation.
//!
//! - [`render_json`] / [`render_json_verbose`]: build the owned document
//!   tree and serialize it (compact "comark" schema, or the legacy verbose
//!   object-tree schema).
//! - [`render_html`]: streaming HTML fragment or full document.
//! - [`render_ansi`]: ANSI-styled terminal output.
//! - [`render_text`]: plain text.
//! - [`render_meta`]: JSON metadata digest (frontmatter + heading outline).
//!
//! # Example
//!
//! ```
//! use comark::{render_html, Block, Event, HtmlOptions, TextKind};
//!
//! let events = vec![
//!     Event::EnterBlock(Block::Document),
//!     Event::EnterBlock(Block::Paragraph),
//!     Event::Text(TextKind::Normal, "Hello"),
//!     Event::LeaveBlock(Block::Paragraph),
//!     Event::LeaveBlock(Block::Document),
//! ];
//! let mut out = Vec::new();
//! render_html(events, &mut out, HtmlOptions::default()).unwrap();
//! assert_eq!(out, b"<p>Hello</p>\n");
//! ```

use std::io::Write;

pub use comark_event::{
    entity, Alignment, Block, CodeBlockDetail, ComponentDetail, Event, EventConsumer, ImageDetail,
    LinkDetail, Span, TextKind,
};
pub use comark_props::{parse_props, ParsedProps, Prop, PropValue};
pub use comark_render::{
    AnsiOptions, AnsiRenderer, HtmlOptions, HtmlRenderer, MetaRenderer, RenderError, TextRenderer,
};
pub use comark_tree::{compact, verbose, Node, TreeBuilder, TreeError};

/// Unified render failure.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Build the document tree and write the compact JSON schema.
pub fn render_json<'a, I, W>(events: I, out: &mut W) -> Result<(), Error>
where
    I: IntoIterator<Item = Event<'a>>,
    W: Write,
{
    let tree = comark_tree::builder::build_tree(events)?;
    compact::write(out, &tree)?;
    Ok(())
}

/// Build the document tree and write the legacy verbose JSON schema.
pub fn render_json_verbose<'a, I, W>(events: I, out: &mut W) -> Result<(), Error>
where
    I: IntoIterator<Item = Event<'a>>,
    W: Write,
{
    let tree = comark_tree::builder::build_tree(events)?;
    verbose::write(out, &tree)?;
    Ok(())
}

/// Stream events to HTML.
pub fn render_html<'a, I, W>(events: I, out: &mut W, opts: HtmlOptions) -> Result<(), Error>
where
    I: IntoIterator<Item = Event<'a>>,
    W: Write,
{
    HtmlRenderer::new(out).with_options(opts).render(events)?;
    Ok(())
}

/// Stream events to ANSI-styled terminal text.
pub fn render_ansi<'a, I, W>(events: I, out: &mut W, opts: AnsiOptions) -> Result<(), Error>
where
    I: IntoIterator<Item = Event<'a>>,
    W: Write,
{
    AnsiRenderer::new(out).with_options(opts).render(events)?;
    Ok(())
}

/// Stream events to plain text.
pub fn render_text<'a, I, W>(events: I, out: &mut W) -> Result<(), Error>
where
    I: IntoIterator<Item = Event<'a>>,
    W: Write,
{
    TextRenderer::new(out).render(events)?;
    Ok(())
}

/// Collect frontmatter and headings into a JSON metadata digest.
pub fn render_meta<'a, I, W>(events: I, out: &mut W) -> Result<(), Error>
where
    I: IntoIterator<Item = Event<'a>>,
    W: Write,
{
    MetaRenderer::new(out).render(events)?;
    Ok(())
}
