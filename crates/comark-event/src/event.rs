//! Event and detail types shared by every consumer.

/// Column alignment for table cells.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    /// No explicit alignment.
    #[default]
    None,
    Left,
    Center,
    Right,
}

/// Classification of a text run.
///
/// The parser reports every text payload with one of these kinds so that
/// consumers can decide how to re-emit it (escape it, decode it, replace it
/// with a break, and so on).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextKind {
    /// Ordinary document text.
    Normal,
    /// A NUL byte in the source; consumers substitute U+FFFD.
    NullChar,
    /// Hard line break (trailing backslash or two spaces).
    HardBreak,
    /// Soft line break (newline inside a paragraph).
    SoftBreak,
    /// A character reference such as `&amp;` or `&#x2014;`, passed verbatim
    /// including the `&` and `;`.
    Entity,
    /// Literal code text (code block lines or inline code content).
    Code,
    /// Raw HTML, inline or block-level.
    Html,
    /// Literal math text inside a math span.
    Math,
}

/// Detail data for a fenced or indented code block.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CodeBlockDetail<'a> {
    /// Full info string after the opening fence.
    pub info: Option<&'a str>,
    /// First word of the info string (the language).
    pub lang: Option<&'a str>,
    /// Fence character (`` ` `` or `~`), `\0` for indented blocks.
    pub fence: char,
    /// Filename from `[name]` in the info string, if present.
    pub filename: Option<&'a str>,
    /// Trailing metadata from the info string, if present.
    pub meta: Option<&'a str>,
    /// One-based line numbers to highlight.
    pub highlights: &'a [u32],
}

/// Detail data for a block or inline component.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ComponentDetail<'a> {
    /// Component tag name, taken from the document.
    pub name: &'a str,
    /// Raw `{...}` props content (without the braces).
    pub props: Option<&'a str>,
}

/// Detail data for a link span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkDetail<'a> {
    pub href: &'a str,
    pub title: Option<&'a str>,
    /// True for `<https://...>` autolinks, where the text is the URL itself.
    pub autolink: bool,
    /// Raw trailing `{attrs}` content, if present.
    pub attrs: Option<&'a str>,
}

/// Detail data for an image span.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImageDetail<'a> {
    pub src: &'a str,
    pub title: Option<&'a str>,
    /// Raw trailing `{attrs}` content, if present.
    pub attrs: Option<&'a str>,
}

/// A block-level construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Block<'a> {
    /// The document root; always the outermost enter/leave pair.
    Document,
    Quote,
    UnorderedList {
        tight: bool,
    },
    OrderedList {
        tight: bool,
        start: u32,
        /// List marker delimiter, `.` or `)`.
        delimiter: char,
    },
    ListItem {
        /// `Some(mark)` for task list items, where `mark` is the character
        /// between the brackets (`x`, `X`, or a space).
        task: Option<char>,
    },
    ThematicBreak,
    Heading {
        /// 1-6.
        level: u8,
    },
    CodeBlock(CodeBlockDetail<'a>),
    HtmlBlock,
    Paragraph,
    Table {
        columns: u32,
    },
    TableHead,
    TableBody,
    TableRow,
    TableHeaderCell {
        align: Alignment,
    },
    TableCell {
        align: Alignment,
    },
    /// YAML frontmatter at the start of the document or of a component body.
    Frontmatter,
    /// Block component: `::name{props}` ... `::`.
    Component(ComponentDetail<'a>),
    /// Alert blockquote: `> [!NOTE]` and friends. `kind` is the type name
    /// as written in the source.
    Alert {
        kind: &'a str,
    },
    /// Template block: `::template{name}`.
    Template {
        name: &'a str,
    },
}

/// An inline construct.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Span<'a> {
    Emphasis { attrs: Option<&'a str> },
    Strong { attrs: Option<&'a str> },
    Underline { attrs: Option<&'a str> },
    Strikethrough { attrs: Option<&'a str> },
    Code { attrs: Option<&'a str> },
    Link(LinkDetail<'a>),
    Image(ImageDetail<'a>),
    Math { display: bool },
    Wikilink { target: &'a str },
    /// Bare `[text]{attrs}` span.
    Bracketed { attrs: Option<&'a str> },
    /// Inline component: `:name{props}`.
    Component(ComponentDetail<'a>),
}

/// One structural parse event.
///
/// Events arrive strictly in document order and perfectly nested: every
/// `EnterBlock`/`EnterSpan` is matched by a `LeaveBlock`/`LeaveSpan`
/// carrying the same detail data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event<'a> {
    EnterBlock(Block<'a>),
    LeaveBlock(Block<'a>),
    EnterSpan(Span<'a>),
    LeaveSpan(Span<'a>),
    Text(TextKind, &'a str),
}

/// A push-based event consumer.
///
/// Exactly one consumer is driven per render invocation. Borrowed data
/// inside the event must not be retained past the call.
pub trait EventConsumer {
    type Error;

    /// Process a single event.
    ///
    /// A consumer that returns an error is in a failed state; the caller
    /// must stop the walk and discard any partial output.
    fn process_event(&mut self, event: Event<'_>) -> Result<(), Self::Error>;
}
