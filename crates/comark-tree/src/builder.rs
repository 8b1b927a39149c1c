//! Event-driven tree construction.

use comark_event::{Block, Event, EventConsumer, Span, TextKind};

use crate::node::{Detail, Element, Node, Tag, TextCategory, MAX_DEPTH};

/// Tree construction failure. Fatal to the render call; no partial tree
/// survives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("document nesting exceeds the maximum depth of {MAX_DEPTH}")]
    TooDeep,
    #[error("event stream is not properly nested")]
    Unbalanced,
}

/// Builds an owned [`Node`] tree from parse events.
///
/// Nodes are created on enter/text events, mutated only while on the open
/// stack, and become immutable once their leave event pops them into the
/// parent. Errors are sticky: after the first failure every further event
/// is rejected, the partial tree is dropped, and [`finish`](Self::finish)
/// fails.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    stack: Vec<Node>,
    root: Option<Node>,
    image_nesting: usize,
    error: Option<TreeError>,
}

impl TreeBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume the builder and return the finished document tree.
    pub fn finish(self) -> Result<Node, TreeError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        if !self.stack.is_empty() {
            return Err(TreeError::Unbalanced);
        }
        self.root.ok_or(TreeError::Unbalanced)
    }

    fn fail(&mut self, error: TreeError) -> Result<(), TreeError> {
        tracing::debug!(%error, "tree build failed, discarding partial tree");
        self.error = Some(error);
        self.stack.clear();
        self.root = None;
        Err(error)
    }

    fn push(&mut self, node: Node) -> Result<(), TreeError> {
        if self.stack.len() >= MAX_DEPTH {
            return self.fail(TreeError::TooDeep);
        }
        self.stack.push(node);
        Ok(())
    }

    /// Pop the current node and attach it to its parent (or store it as the
    /// root when the stack empties).
    fn pop(&mut self) -> Result<(), TreeError> {
        let Some(node) = self.stack.pop() else {
            return self.fail(TreeError::Unbalanced);
        };
        match self.stack.last_mut() {
            Some(parent) => {
                if let Some(children) = parent.children_mut() {
                    children.push(node);
                }
            }
            None => self.root = Some(node),
        }
        Ok(())
    }

    fn current_element(&mut self) -> Option<&mut Element> {
        match self.stack.last_mut() {
            Some(Node::Element(el)) => Some(el),
            _ => None,
        }
    }

    /// Append text to the current node's children, merging with a trailing
    /// text node of the same category.
    fn append_text(&mut self, category: TextCategory, text: &str) -> Result<(), TreeError> {
        if self.stack.last_mut().and_then(Node::children_mut).is_none() {
            return self.fail(TreeError::Unbalanced);
        }
        if let Some(children) = self.stack.last_mut().and_then(Node::children_mut) {
            if let Some(Node::Text {
                category: last,
                content,
            }) = children.last_mut()
            {
                if *last == category {
                    content.push_str(text);
                    return Ok(());
                }
            }
            children.push(Node::Text {
                category,
                content: text.to_owned(),
            });
        }
        Ok(())
    }

    fn append_element(&mut self, element: Element) -> Result<(), TreeError> {
        if self.stack.last_mut().and_then(Node::children_mut).is_none() {
            return self.fail(TreeError::Unbalanced);
        }
        if let Some(children) = self.stack.last_mut().and_then(Node::children_mut) {
            children.push(Node::Element(element));
        }
        Ok(())
    }

    fn enter_block(&mut self, block: Block<'_>) -> Result<(), TreeError> {
        let node = match block {
            Block::Document => Node::Document(Vec::new()),
            _ => Node::Element(element_for_block(block)),
        };
        self.push(node)
    }

    fn enter_span(&mut self, span: Span<'_>) -> Result<(), TreeError> {
        if self.image_nesting > 0 {
            // Inside an image everything flattens into the alt text; only
            // further images adjust the nesting counter.
            if matches!(span, Span::Image(_)) {
                self.image_nesting += 1;
            }
            return Ok(());
        }
        if matches!(span, Span::Image(_)) {
            self.image_nesting = 1;
        }
        self.push(Node::Element(element_for_span(span)))
    }

    fn leave_span(&mut self, span: Span<'_>) -> Result<(), TreeError> {
        if self.image_nesting > 0 {
            if matches!(span, Span::Image(_)) {
                self.image_nesting -= 1;
                if self.image_nesting == 0 {
                    // The accumulated literal is the image's alt text.
                    return self.pop();
                }
            }
            return Ok(());
        }
        self.pop()
    }

    fn text(&mut self, kind: TextKind, text: &str) -> Result<(), TreeError> {
        if self.image_nesting > 0 {
            if !matches!(self.stack.last(), Some(Node::Element(_))) {
                return self.fail(TreeError::Unbalanced);
            }
            if let Some(el) = self.current_element() {
                match kind {
                    TextKind::SoftBreak | TextKind::HardBreak => el.push_literal(" "),
                    TextKind::NullChar => el.push_literal("\u{fffd}"),
                    _ => el.push_literal(text),
                }
            }
            return Ok(());
        }

        if let Some(el) = self.current_element() {
            if el.is_leaf_container() {
                if kind == TextKind::NullChar {
                    el.push_literal("\u{fffd}");
                } else {
                    el.push_literal(text);
                }
                return Ok(());
            }
        }

        match kind {
            TextKind::HardBreak => {
                self.append_element(Element::new(Tag::Static("br"), Detail::None))
            }
            TextKind::SoftBreak => self.append_text(TextCategory::Plain, "\n"),
            TextKind::NullChar => self.append_text(TextCategory::Plain, "\u{fffd}"),
            TextKind::Html => self.append_text(TextCategory::HtmlInline, text),
            // Plain text, entities (kept verbatim in the tree), code, math.
            _ => self.append_text(TextCategory::Plain, text),
        }
    }
}

impl EventConsumer for TreeBuilder {
    type Error = TreeError;

    fn process_event(&mut self, event: Event<'_>) -> Result<(), TreeError> {
        if let Some(error) = self.error {
            return Err(error);
        }
        match event {
            Event::EnterBlock(block) => self.enter_block(block),
            Event::LeaveBlock(_) => self.pop(),
            Event::EnterSpan(span) => self.enter_span(span),
            Event::LeaveSpan(span) => self.leave_span(span),
            Event::Text(kind, text) => self.text(kind, text),
        }
    }
}

/// Build a tree from a complete event stream.
pub fn build_tree<'a, I>(events: I) -> Result<Node, TreeError>
where
    I: IntoIterator<Item = Event<'a>>,
{
    let mut builder = TreeBuilder::new();
    for event in events {
        builder.process_event(event)?;
    }
    builder.finish()
}

static HEADING_TAGS: [&str; 6] = ["h1", "h2", "h3", "h4", "h5", "h6"];

fn owned(s: Option<&str>) -> Option<String> {
    s.map(str::to_owned)
}

fn element_for_block(block: Block<'_>) -> Element {
    match block {
        Block::Document => unreachable!("document handled by the caller"),
        Block::Quote => Element::new(Tag::Static("blockquote"), Detail::None),
        Block::UnorderedList { tight } => {
            Element::new(Tag::Static("ul"), Detail::UnorderedList { tight })
        }
        Block::OrderedList {
            tight,
            start,
            delimiter,
        } => Element::new(
            Tag::Static("ol"),
            Detail::OrderedList {
                tight,
                start,
                delimiter,
            },
        ),
        Block::ListItem { task } => Element::new(Tag::Static("li"), Detail::ListItem { task }),
        Block::ThematicBreak => Element::new(Tag::Static("hr"), Detail::None),
        Block::Heading { level } => {
            let level = level.clamp(1, 6);
            Element::new(
                Tag::Static(HEADING_TAGS[usize::from(level) - 1]),
                Detail::Heading { level },
            )
        }
        Block::CodeBlock(detail) => Element::new(
            Tag::Static("pre"),
            Detail::CodeBlock {
                info: owned(detail.info),
                lang: owned(detail.lang),
                fence: detail.fence,
                filename: owned(detail.filename),
                meta: owned(detail.meta),
                highlights: detail.highlights.to_vec(),
            },
        ),
        Block::HtmlBlock => Element::new(Tag::Static("html_block"), Detail::None),
        Block::Paragraph => Element::new(Tag::Static("p"), Detail::None),
        Block::Table { columns } => Element::new(Tag::Static("table"), Detail::Table { columns }),
        Block::TableHead => Element::new(Tag::Static("thead"), Detail::None),
        Block::TableBody => Element::new(Tag::Static("tbody"), Detail::None),
        Block::TableRow => Element::new(Tag::Static("tr"), Detail::None),
        Block::TableHeaderCell { align } => Element::new(
            Tag::Static("th"),
            Detail::TableCell {
                align,
                header: true,
            },
        ),
        Block::TableCell { align } => Element::new(
            Tag::Static("td"),
            Detail::TableCell {
                align,
                header: false,
            },
        ),
        Block::Frontmatter => Element::new(Tag::Static("frontmatter"), Detail::None),
        Block::Component(detail) => Element::new(
            // The tag name comes from document content and is only valid
            // for this call; the tree owns a copy.
            Tag::Owned(detail.name.to_owned()),
            Detail::Component {
                raw_props: owned(detail.props),
            },
        ),
        Block::Alert { kind } => Element::new(
            Tag::Static("blockquote"),
            Detail::Alert {
                kind: kind.to_owned(),
            },
        ),
        Block::Template { name } => Element::new(
            Tag::Static("template"),
            Detail::Template {
                name: name.to_owned(),
            },
        ),
    }
}

fn element_for_span(span: Span<'_>) -> Element {
    let (tag, detail, attrs) = match span {
        Span::Emphasis { attrs } => ("em", Detail::None, attrs),
        Span::Strong { attrs } => ("strong", Detail::None, attrs),
        Span::Underline { attrs } => ("u", Detail::None, attrs),
        Span::Strikethrough { attrs } => ("del", Detail::None, attrs),
        Span::Code { attrs } => ("code", Detail::None, attrs),
        Span::Link(link) => (
            "a",
            Detail::Link {
                href: link.href.to_owned(),
                title: owned(link.title),
                autolink: link.autolink,
            },
            link.attrs,
        ),
        Span::Image(image) => (
            "img",
            Detail::Image {
                src: image.src.to_owned(),
                title: owned(image.title),
            },
            image.attrs,
        ),
        Span::Math { display: false } => ("math", Detail::None, None),
        Span::Math { display: true } => ("math-display", Detail::None, None),
        Span::Wikilink { target } => (
            "wikilink",
            Detail::Wikilink {
                target: target.to_owned(),
            },
            None,
        ),
        Span::Bracketed { attrs } => ("span", Detail::None, attrs),
        Span::Component(detail) => {
            return Element::new(
                Tag::Owned(detail.name.to_owned()),
                Detail::Component {
                    raw_props: owned(detail.props),
                },
            );
        }
    };
    let mut el = Element::new(Tag::Static(tag), detail);
    el.raw_attrs = owned(attrs);
    el
}
