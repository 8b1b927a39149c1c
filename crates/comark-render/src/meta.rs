//! Metadata digest renderer.
//!
//! Accumulates the raw frontmatter text and the plain-text content of every
//! heading, then writes a single JSON object: the frontmatter's top-level
//! keys (converted recursively from YAML) followed by a `headings` array of
//! `{level, text}` entries.

use std::io::{self, Write};

use comark_event::entity::{BuiltinEntities, EntityResolver};
use comark_event::{Block, Event, EventConsumer, TextKind};
use serde::Serialize;

use crate::escape::push_entity;
use crate::{yaml, RenderError};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
struct Heading {
    level: u8,
    text: String,
}

/// Streaming metadata collector.
///
/// Drive it with events, then call [`finish`](Self::finish) to write the
/// digest.
pub struct MetaRenderer<'r, W> {
    out: W,
    entities: &'r dyn EntityResolver,
    frontmatter: String,
    in_frontmatter: bool,
    headings: Vec<Heading>,
    /// Level and text accumulator of the heading being read.
    current: Option<(u8, String)>,
}

impl<W: Write> MetaRenderer<'_, W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            entities: &BuiltinEntities,
            frontmatter: String::new(),
            in_frontmatter: false,
            headings: Vec::new(),
            current: None,
        }
    }

    /// Render a complete event stream and write the digest.
    pub fn render<'a, I>(&mut self, events: I) -> Result<(), RenderError>
    where
        I: IntoIterator<Item = Event<'a>>,
    {
        for event in events {
            self.process_event(event)?;
        }
        self.finish()
    }

    /// Write the collected digest as one JSON object, newline-terminated.
    pub fn finish(&mut self) -> Result<(), RenderError> {
        self.out.write_all(b"{")?;
        let mut any = false;

        if !self.frontmatter.is_empty() {
            if let Some(mapping) = yaml::parse_mapping(&self.frontmatter) {
                for (key, value) in &mapping {
                    let Some(key) = value_key(key) else {
                        continue;
                    };
                    if any {
                        self.out.write_all(b",")?;
                    }
                    any = true;
                    serde_json::to_writer(&mut self.out, &key).map_err(io::Error::from)?;
                    self.out.write_all(b":")?;
                    serde_json::to_writer(&mut self.out, &yaml::to_json(value))
                        .map_err(io::Error::from)?;
                }
            }
        }

        if any {
            self.out.write_all(b",")?;
        }
        self.out.write_all(b"\"headings\":")?;
        serde_json::to_writer(&mut self.out, &self.headings).map_err(io::Error::from)?;
        self.out.write_all(b"}\n")?;
        Ok(())
    }

    /// Recover the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn text(&mut self, kind: TextKind, text: &str) {
        if self.in_frontmatter {
            self.frontmatter.push_str(text);
            return;
        }
        let Some((_, buf)) = &mut self.current else {
            return;
        };
        match kind {
            TextKind::SoftBreak | TextKind::HardBreak => buf.push(' '),
            TextKind::NullChar => buf.push('\u{fffd}'),
            TextKind::Entity => push_entity(buf, text, self.entities),
            _ => buf.push_str(text),
        }
    }
}

impl<'r, W: Write> MetaRenderer<'r, W> {
    #[must_use]
    pub fn with_entities(mut self, entities: &'r dyn EntityResolver) -> Self {
        self.entities = entities;
        self
    }
}

impl<W: Write> EventConsumer for MetaRenderer<'_, W> {
    type Error = RenderError;

    fn process_event(&mut self, event: Event<'_>) -> Result<(), RenderError> {
        match event {
            Event::EnterBlock(Block::Frontmatter) => self.in_frontmatter = true,
            Event::LeaveBlock(Block::Frontmatter) => self.in_frontmatter = false,
            Event::EnterBlock(Block::Heading { level }) => {
                self.current = Some((level, String::new()));
            }
            Event::LeaveBlock(Block::Heading { .. }) => {
                if let Some((level, text)) = self.current.take() {
                    self.headings.push(Heading { level, text });
                }
            }
            Event::Text(kind, text) => self.text(kind, text),
            _ => {}
        }
        Ok(())
    }
}

/// Mapping keys must serialize as JSON strings; non-scalar keys are
/// skipped.
fn value_key(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
