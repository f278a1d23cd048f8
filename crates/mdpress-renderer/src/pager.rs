//! Pagination primitive.
//!
//! A streaming page composer over `pdf-writer`: callers emit styled text
//! and vertical spacing from top to bottom and the pager owns everything
//! spatial. It wraps words greedily against the measured line width,
//! starts a new page when the next line would cross the bottom margin,
//! and assembles the catalog, page tree, font resources, and content
//! streams at finish time.
//!
//! Output is deterministic: no timestamps or random identifiers are
//! written, so identical input produces identical bytes.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};

use crate::metrics::{self, Font};

/// US Letter page width in points.
const PAGE_WIDTH: f32 = 612.0;
/// US Letter page height in points.
const PAGE_HEIGHT: f32 = 792.0;
/// Page margin on all sides in points.
const MARGIN: f32 = 50.0;
/// Line height as a multiple of font size.
const LEADING: f32 = 1.2;
/// Runaway-document guard; rendering past this is treated as a write fault.
const MAX_PAGES: usize = 100_000;

/// Horizontal alignment for emitted text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Align {
    Left,
    Center,
}

/// Pagination failure. Fatal to the render; never retried.
#[derive(Debug, thiserror::Error)]
pub enum PagerError {
    /// The composed document crossed the page sanity cap, which indicates
    /// malformed internal state rather than a large input.
    #[error("document exceeded the {MAX_PAGES}-page limit")]
    PageLimit,
}

/// Streaming page composer.
pub(crate) struct Pager {
    /// Finished content streams, one per completed page.
    finished: Vec<Vec<u8>>,
    /// Content stream of the page being written.
    current: Content,
    /// Top of the next line box, in points from the page bottom.
    cursor: f32,
}

impl Pager {
    /// Create a pager with the first page open.
    pub(crate) fn new() -> Self {
        Self {
            finished: Vec::new(),
            current: Content::new(),
            cursor: PAGE_HEIGHT - MARGIN,
        }
    }

    /// Pages composed so far, including the open one.
    pub(crate) fn page_count(&self) -> usize {
        self.finished.len() + 1
    }

    /// Move the cursor down without emitting text.
    ///
    /// Spacing never forces a page break on its own; the overflow check
    /// happens when the next line is written.
    pub(crate) fn advance(&mut self, points: f32) {
        self.cursor -= points;
    }

    /// Emit one logical line of text, wrapping and paginating as needed.
    pub(crate) fn write_line(
        &mut self,
        text: &str,
        font: Font,
        size: f32,
        align: Align,
    ) -> Result<(), PagerError> {
        let max_width = PAGE_WIDTH - 2.0 * MARGIN;
        let line_height = size * LEADING;
        for line in wrap(text, font, size, max_width) {
            self.ensure_space(line_height)?;
            let x = match align {
                Align::Left => MARGIN,
                Align::Center => {
                    MARGIN + ((max_width - metrics::text_width(&line, font, size)) / 2.0).max(0.0)
                }
            };
            let baseline = self.cursor - size;
            let font_name = match font {
                Font::Regular => Name(b"F1"),
                Font::Bold => Name(b"F2"),
            };
            self.current.begin_text();
            self.current.set_font(font_name, size);
            self.current.next_line(x, baseline);
            self.current.show(Str(&metrics::encode_winansi(&line)));
            self.current.end_text();
            self.cursor -= line_height;
        }
        Ok(())
    }

    /// Start a new page if `line_height` does not fit above the bottom margin.
    fn ensure_space(&mut self, line_height: f32) -> Result<(), PagerError> {
        if self.cursor - line_height >= MARGIN {
            return Ok(());
        }
        if self.page_count() >= MAX_PAGES {
            return Err(PagerError::PageLimit);
        }
        let done = std::mem::replace(&mut self.current, Content::new());
        self.finished.push(done.finish());
        self.cursor = PAGE_HEIGHT - MARGIN;
        Ok(())
    }

    /// Assemble the final PDF byte buffer.
    pub(crate) fn finish(self) -> Vec<u8> {
        let mut streams = self.finished;
        streams.push(self.current.finish());

        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let regular_id = Ref::new(3);
        let bold_id = Ref::new(4);
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        let page_ids: Vec<Ref> = (0..streams.len())
            .map(|i| Ref::new(5 + 2 * i as i32))
            .collect();

        let mut pdf = Pdf::new();
        pdf.catalog(catalog_id).pages(page_tree_id);
        #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().copied())
            .count(streams.len() as i32);
        pdf.type1_font(regular_id)
            .base_font(Name(b"Helvetica"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));
        pdf.type1_font(bold_id)
            .base_font(Name(b"Helvetica-Bold"))
            .encoding_predefined(Name(b"WinAnsiEncoding"));

        for (i, stream) in streams.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let content_id = Ref::new(6 + 2 * i as i32);
            let mut page = pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
            page.parent(page_tree_id);
            page.contents(content_id);
            page.resources()
                .fonts()
                .pair(Name(b"F1"), regular_id)
                .pair(Name(b"F2"), bold_id);
            page.finish();
            pdf.stream(content_id, stream);
        }

        pdf.finish()
    }
}

/// Greedy word wrap against the measured line width.
///
/// Whitespace runs collapse to single spaces; a word wider than the line is
/// hard-split so it cannot wedge the composer.
fn wrap(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in text.split_whitespace() {
        for piece in split_oversized(word, font, size, max_width) {
            let candidate = if line.is_empty() {
                piece.clone()
            } else {
                format!("{line} {piece}")
            };
            if metrics::text_width(&candidate, font, size) <= max_width || line.is_empty() {
                line = candidate;
            } else {
                lines.push(std::mem::replace(&mut line, piece));
            }
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines
}

/// Split a single word into pieces that each fit on a line.
fn split_oversized(word: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    if metrics::text_width(word, font, size) <= max_width {
        return vec![word.to_owned()];
    }
    let mut pieces = Vec::new();
    let mut piece = String::new();
    for ch in word.chars() {
        piece.push(ch);
        if metrics::text_width(&piece, font, size) > max_width && piece.chars().count() > 1 {
            piece.pop();
            pieces.push(std::mem::replace(&mut piece, ch.to_string()));
        }
    }
    if !piece.is_empty() {
        pieces.push(piece);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_has_one_page() {
        let pager = Pager::new();

        assert_eq!(pager.page_count(), 1);

        let bytes = pager.finish();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_write_line_emits_no_page_break_for_short_text() {
        let mut pager = Pager::new();
        pager
            .write_line("hello world", Font::Regular, 12.0, Align::Left)
            .unwrap();

        assert_eq!(pager.page_count(), 1);
    }

    #[test]
    fn test_overflow_starts_new_page() {
        let mut pager = Pager::new();
        // Content area is 692pt tall; 14.4pt lines overflow before 60 writes.
        for _ in 0..60 {
            pager
                .write_line("line", Font::Regular, 12.0, Align::Left)
                .unwrap();
        }

        assert!(pager.page_count() > 1);
    }

    #[test]
    fn test_spacing_alone_never_adds_pages() {
        let mut pager = Pager::new();
        for _ in 0..1000 {
            pager.advance(14.4);
        }

        assert_eq!(pager.page_count(), 1);
    }

    #[test]
    fn test_deterministic_output() {
        let build = || {
            let mut pager = Pager::new();
            pager
                .write_line("Title", Font::Bold, 24.0, Align::Center)
                .unwrap();
            pager
                .write_line("body text", Font::Regular, 12.0, Align::Left)
                .unwrap();
            pager.finish()
        };

        assert_eq!(build(), build());
    }

    #[test]
    fn test_wrap_long_text() {
        let text = "word ".repeat(200);
        let lines = wrap(&text, Font::Regular, 12.0, 512.0);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(metrics::text_width(line, Font::Regular, 12.0) <= 512.0);
        }
    }

    #[test]
    fn test_wrap_collapses_whitespace() {
        let lines = wrap("a  \t b", Font::Regular, 12.0, 512.0);

        assert_eq!(lines, vec!["a b".to_owned()]);
    }

    #[test]
    fn test_wrap_empty_text() {
        let lines = wrap("   ", Font::Regular, 12.0, 512.0);

        assert!(lines.is_empty());
    }

    #[test]
    fn test_oversized_word_is_hard_split() {
        let word = "x".repeat(400);
        let lines = wrap(&word, Font::Regular, 12.0, 512.0);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(metrics::text_width(line, Font::Regular, 12.0) <= 512.0);
        }
    }
}
