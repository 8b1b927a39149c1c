//! Structural Markdown parse event model.
//!
//! An external parser walks an extended-Markdown document and reports it as
//! an ordered stream of [`Event`]s: enter/leave pairs for blocks and spans,
//! plus text runs. Consumers (the tree builder and the streaming renderers)
//! implement [`EventConsumer`] and receive events one at a time.
//!
//! All detail data inside an event borrows from the parsed source and is
//! only valid for the duration of a single `process_event` call — a consumer
//! that needs to keep any of it must copy it into owned storage. The tree
//! builder does exactly that for dynamic component tags and raw props.
//!
//! The [`entity`] module holds the character-reference boundary: numeric
//! references are decoded in place, named references go through an injected
//! [`EntityResolver`](entity::EntityResolver).

pub mod entity;
mod event;

pub use event::{
    Alignment, Block, CodeBlockDetail, ComponentDetail, Event, EventConsumer, ImageDetail,
    LinkDetail, Span, TextKind,
};
