//! Markdown-to-PDF rendering engine.
//!
//! Converts a markdown text stream into a paginated PDF document in two
//! stages:
//!
//! 1. [`parse`] segments the input into typed [`Block`]s (line-oriented,
//!    single forward pass) and extracts the document title.
//! 2. [`render`] streams the blocks into the [`pager`](crate::pager)
//!    pagination primitive, which owns line wrapping, page breaks, and
//!    final byte assembly.
//!
//! The renderer is a pure function of its input: identical markdown yields
//! identical bytes (no timestamps or random identifiers are written).
//!
//! # Markdown dialect
//!
//! Deliberately line-based rather than CommonMark: every source line maps to
//! exactly one block, blank lines are preserved as vertical spacers, and
//! only `## `/`### ` heading markers and `**`/`*` emphasis delimiters are
//! recognized. See [`parse`] for the exact rules.

mod blocks;
mod metrics;
mod pager;
mod renderer;

pub use blocks::{Block, ParsedDocument, parse};
pub use pager::PagerError;
pub use renderer::{DEFAULT_TITLE, RenderError, RenderedDocument, render};
