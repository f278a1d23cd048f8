//! Line-oriented markdown block parsing.
//!
//! Segments input text into typed blocks in a single forward pass with no
//! backtracking. The dialect is intentionally small:
//!
//! - The first non-empty line, when it starts with `"# "`, becomes the
//!   document title and is excluded from the block sequence.
//! - `"## "` and `"### "` prefixes produce headings (remainder trimmed).
//! - Empty or all-whitespace lines produce [`Block::BlankLine`] spacers.
//! - Every other line becomes a paragraph after emphasis stripping.
//!
//! A `"# "` line that is not the first non-empty line has no special
//! meaning and falls through to the paragraph rule.

/// A typed unit of parsed document structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Section heading. Level is 2 or 3 by construction; the single
    /// permissible level-1 heading is extracted as the document title and
    /// never enters the block sequence.
    Heading {
        /// Heading level (2 or 3).
        level: u8,
        /// Heading text (marker stripped, trimmed, kept verbatim otherwise).
        text: String,
    },
    /// Body text line with emphasis delimiters removed.
    Paragraph(String),
    /// Vertical-spacing marker for an empty source line.
    BlankLine,
}

/// Parsed document: extracted title plus ordered block sequence.
///
/// Owned by the rendering call that created it and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDocument {
    /// Title from the first non-empty `"# "` line, if present.
    pub title: Option<String>,
    /// Ordered blocks, excluding the title line.
    pub blocks: Vec<Block>,
}

/// Parse markdown text into a title and block sequence.
#[must_use]
pub fn parse(markdown: &str) -> ParsedDocument {
    // Title comes from the first non-empty line only; blank lines before it
    // are kept as spacers.
    let mut title = None;
    let mut title_line = None;
    for (idx, line) in markdown.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(rest) = line.strip_prefix("# ") {
            title = Some(rest.trim().to_owned());
            title_line = Some(idx);
        }
        break;
    }

    let blocks = markdown
        .lines()
        .enumerate()
        .filter(|(idx, _)| Some(*idx) != title_line)
        .map(|(_, line)| parse_line(line))
        .collect();

    ParsedDocument { title, blocks }
}

/// Classify a single source line.
fn parse_line(line: &str) -> Block {
    if let Some(rest) = line.strip_prefix("## ") {
        Block::Heading {
            level: 2,
            text: rest.trim().to_owned(),
        }
    } else if let Some(rest) = line.strip_prefix("### ") {
        Block::Heading {
            level: 3,
            text: rest.trim().to_owned(),
        }
    } else if line.trim().is_empty() {
        Block::BlankLine
    } else {
        Block::Paragraph(strip_emphasis(line))
    }
}

/// Remove `**bold**` and `*italic*` delimiters, keeping inner text verbatim.
///
/// Two tokenizer passes: bold spans first, then italic spans on the result.
/// Each pass scans left-to-right; the first closing delimiter wins
/// (non-greedy) and an opener without a closer is emitted literally. Inner
/// text is never rescanned within a pass, so nested emphasis is not
/// recognized.
pub(crate) fn strip_emphasis(text: &str) -> String {
    strip_spans(&strip_spans(text, "**"), "*")
}

/// Strip one delimiter kind in a single left-to-right pass.
fn strip_spans(text: &str, delim: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        let Some(open) = rest.find(delim) else {
            out.push_str(rest);
            return out;
        };
        out.push_str(&rest[..open]);
        let after = &rest[open + delim.len()..];
        if let Some(close) = after.find(delim) {
            out.push_str(&after[..close]);
            rest = &after[close + delim.len()..];
        } else {
            // Unmatched opener stays literal.
            out.push_str(delim);
            rest = after;
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_title_extracted_from_first_line() {
        let doc = parse("# Hello\n\nWorld");

        assert_eq!(doc.title.as_deref(), Some("Hello"));
        assert_eq!(
            doc.blocks,
            vec![Block::BlankLine, Block::Paragraph("World".to_owned())]
        );
    }

    #[test]
    fn test_title_trimmed() {
        let doc = parse("#    Spaced Out   \n");

        assert_eq!(doc.title.as_deref(), Some("Spaced Out"));
    }

    #[test]
    fn test_title_from_first_non_empty_line() {
        let doc = parse("\n\n# Late Title\nbody");

        assert_eq!(doc.title.as_deref(), Some("Late Title"));
        // Leading blank lines are preserved as spacers.
        assert_eq!(
            doc.blocks,
            vec![
                Block::BlankLine,
                Block::BlankLine,
                Block::Paragraph("body".to_owned())
            ]
        );
    }

    #[test]
    fn test_no_title_keeps_every_line() {
        let doc = parse("plain\n# not first\nmore");

        assert_eq!(doc.title, None);
        assert_eq!(
            doc.blocks,
            vec![
                Block::Paragraph("plain".to_owned()),
                Block::Paragraph("# not first".to_owned()),
                Block::Paragraph("more".to_owned()),
            ]
        );
    }

    #[test]
    fn test_hash_without_space_is_paragraph() {
        let doc = parse("#NoSpace");

        assert_eq!(doc.title, None);
        assert_eq!(doc.blocks, vec![Block::Paragraph("#NoSpace".to_owned())]);
    }

    #[test]
    fn test_heading_levels() {
        let doc = parse("## Two\n### Three");

        assert_eq!(
            doc.blocks,
            vec![
                Block::Heading {
                    level: 2,
                    text: "Two".to_owned()
                },
                Block::Heading {
                    level: 3,
                    text: "Three".to_owned()
                },
            ]
        );
    }

    #[test]
    fn test_whitespace_line_is_blank() {
        let doc = parse("a\n   \t \nb");

        assert_eq!(
            doc.blocks,
            vec![
                Block::Paragraph("a".to_owned()),
                Block::BlankLine,
                Block::Paragraph("b".to_owned()),
            ]
        );
    }

    #[test]
    fn test_parse_is_idempotent() {
        let input = "# T\n\n## H\nsome **bold** text\n\n### S\n*i*";
        let first = parse(input);
        let second = parse(input);

        assert_eq!(first, second);
    }

    #[test]
    fn test_strip_bold() {
        assert_eq!(strip_emphasis("This is **bold**."), "This is bold.");
    }

    #[test]
    fn test_strip_italic() {
        assert_eq!(strip_emphasis("an *italic* word"), "an italic word");
    }

    #[test]
    fn test_strip_mixed() {
        assert_eq!(strip_emphasis("**a** and *b*"), "a and b");
    }

    #[test]
    fn test_no_delimiters_left_in_simple_spans() {
        let out = strip_emphasis("x **bold** y *italic* z");

        assert!(!out.contains('*'));
        assert_eq!(out, "x bold y italic z");
    }

    #[test]
    fn test_unmatched_single_star_is_literal() {
        assert_eq!(strip_emphasis("a*b"), "a*b");
    }

    #[test]
    fn test_unmatched_double_star_is_literal() {
        assert_eq!(strip_emphasis("**a*"), "a*");
    }

    #[test]
    fn test_triple_star_span() {
        assert_eq!(strip_emphasis("***bold***"), "bold");
    }

    #[test]
    fn test_inner_star_does_not_nest() {
        assert_eq!(strip_emphasis("**a*b**"), "a*b");
    }

    #[test]
    fn test_ambiguous_overlap_is_deterministic() {
        // Decided behavior for the ambiguous case: bold pass consumes
        // "**b*c**" first, italic pass then closes around the leftover star.
        assert_eq!(strip_emphasis("*a**b*c**"), "abc");
    }

    #[test]
    fn test_adjacent_empty_spans() {
        assert_eq!(strip_emphasis("****"), "");
        assert_eq!(strip_emphasis("**"), "**");
    }
}
