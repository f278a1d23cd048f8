//! Layout emission: block sequence to finalized PDF bytes.

use tracing::debug;

use crate::blocks::{self, Block};
use crate::metrics::Font;
use crate::pager::{Align, Pager, PagerError};

/// Title used when the input carries no level-1 heading.
pub const DEFAULT_TITLE: &str = "Converted Document";

/// Title font size in points.
const TITLE_SIZE: f32 = 24.0;
/// Level-2 heading font size in points.
const H2_SIZE: f32 = 18.0;
/// Level-3 heading font size in points.
const H3_SIZE: f32 = 16.0;
/// Body font size in points.
const BODY_SIZE: f32 = 12.0;
/// One vertical spacing unit: the body line height.
const SPACE_UNIT: f32 = BODY_SIZE * 1.2;

/// Rendering failure. Fatal; indicates a fault in the composition layer
/// rather than a transient condition, so it is never retried.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The pagination primitive reported a write fault.
    #[error("document composition failed")]
    Compose(#[from] PagerError),
}

/// A finalized document: opaque byte buffer plus the resolved title.
///
/// Produced once per conversion, consumed once by delivery, then immutable.
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    /// Resolved document title (extracted or [`DEFAULT_TITLE`]).
    pub title: String,
    /// Finalized PDF bytes.
    pub bytes: Vec<u8>,
    /// Number of pages in the document.
    pub page_count: usize,
}

/// Render markdown text into a paginated PDF document.
///
/// Pure and synchronous: identical input yields identical bytes.
///
/// # Errors
///
/// Returns [`RenderError`] if the pagination primitive reports a write
/// fault.
pub fn render(markdown: &str) -> Result<RenderedDocument, RenderError> {
    let doc = blocks::parse(markdown);
    let title = doc.title.unwrap_or_else(|| DEFAULT_TITLE.to_owned());

    let mut pager = Pager::new();

    pager.write_line(&title, Font::Bold, TITLE_SIZE, Align::Center)?;
    pager.advance(SPACE_UNIT);

    for block in &doc.blocks {
        match block {
            Block::Heading { level, text } => {
                let size = if *level == 2 { H2_SIZE } else { H3_SIZE };
                pager.advance(SPACE_UNIT / 2.0);
                pager.write_line(text, Font::Bold, size, Align::Left)?;
                pager.advance(SPACE_UNIT / 2.0);
            }
            Block::Paragraph(text) => {
                pager.write_line(text, Font::Regular, BODY_SIZE, Align::Left)?;
            }
            Block::BlankLine => pager.advance(SPACE_UNIT / 2.0),
        }
    }

    let page_count = pager.page_count();
    debug!(blocks = doc.blocks.len(), pages = page_count, "rendered document");

    Ok(RenderedDocument {
        title,
        bytes: pager.finish(),
        page_count,
    })
}
