//! Width-aware word wrapping for entry text.
//!
//! Widths are measured in terminal cells over grapheme clusters, so wide
//! characters count as two columns and combining sequences are never split.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Word-wrap `text` to at most `width` cells per line.
///
/// Embedded newlines always start a new line, and each of them yields at
/// least one (possibly empty) output line. Runs of whitespace collapse to a
/// single space. A word wider than `width` is broken at grapheme boundaries.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, width, &mut lines);
    }
    lines
}

fn wrap_paragraph(text: &str, width: usize, lines: &mut Vec<String>) {
    let first = lines.len();
    let mut current = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();
        let gap = usize::from(!current.is_empty());

        if current_width + gap + word_width <= width {
            if gap == 1 {
                current.push(' ');
            }
            current.push_str(word);
            current_width += gap + word_width;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }

        if word_width <= width {
            current.push_str(word);
            current_width = word_width;
        } else {
            wrap_long_word(word, width, lines, &mut current, &mut current_width);
        }
    }

    if !current.is_empty() || lines.len() == first {
        lines.push(current);
    }
}

fn wrap_long_word(
    word: &str,
    width: usize,
    lines: &mut Vec<String>,
    current: &mut String,
    current_width: &mut usize,
) {
    for grapheme in word.graphemes(true) {
        let grapheme_width = grapheme.width();
        if *current_width + grapheme_width > width && !current.is_empty() {
            lines.push(std::mem::take(current));
            *current_width = 0;
        }
        current.push_str(grapheme);
        *current_width += grapheme_width;
    }
}

/// Display width of `text` in terminal cells.
pub fn display_width(text: &str) -> usize {
    text.width()
}

/// Truncate `text` to `max_width` cells, ending with `…` when shortened.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let grapheme_width = grapheme.width();
        if used + grapheme_width > max_width - 1 {
            break;
        }
        out.push_str(grapheme);
        used += grapheme_width;
    }
    out.push('…');
    out
}
