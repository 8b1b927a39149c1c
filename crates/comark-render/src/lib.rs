//! Streaming renderers.
//!
//! Each renderer consumes parse events directly — no intermediate tree —
//! and writes UTF-8 byte chunks to an injected [`std::io::Write`] sink:
//!
//! - [`HtmlRenderer`]: HTML fragment or full document, including the
//!   deferred-tag protocol that lets a block component's opening tag pick
//!   up attributes from a frontmatter block that follows it.
//! - [`AnsiRenderer`]: ANSI-styled terminal output with OSC-8 hyperlinks.
//! - [`TextRenderer`]: plain text.
//! - [`MetaRenderer`]: JSON metadata digest (frontmatter + heading outline).
//!
//! A render either runs to completion or stops at the first error; partial
//! buffers are reclaimed by drop on every exit path.

mod ansi;
mod escape;
mod html;
mod meta;
mod text;
pub(crate) mod yaml;

use std::io;

pub use ansi::{AnsiOptions, AnsiRenderer};
pub use html::{HtmlOptions, HtmlRenderer};
pub use meta::MetaRenderer;
pub use text::TextRenderer;

/// Streaming render failure.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to write render output")]
    Io(#[from] io::Error),
}
