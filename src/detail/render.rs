//! Turns items and section headers into styled terminal lines.

use super::wrap::{display_width, truncate_to_width, wrap_text};
use super::{Category, Item, Section};
use ratatui::prelude::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

/// Narrowest column budget handed to the wrapper, however deep the item.
pub const MIN_MESSAGE_WIDTH: usize = 10;

const INDENT: &str = "  ";

#[derive(Debug, Clone)]
pub struct Glyphs {
    pub caret: String,
    pub completed: String,
    pub struck: String,
    pub locked: String,
    pub folded: String,
    pub locked_suffix: String,
}

impl Default for Glyphs {
    fn default() -> Self {
        Glyphs {
            caret: "›".into(),
            completed: "✓".into(),
            struck: "✗".into(),
            locked: "◆".into(),
            folded: "▸".into(),
            locked_suffix: " [locked]".into(),
        }
    }
}

/// Everything the renderer needs to know about presentation. Each viewport
/// owns its own copy.
#[derive(Debug, Clone)]
pub struct DetailStyle {
    pub glyphs: Glyphs,
    pub header: Style,
    pub header_count: Style,
    pub text: Style,
    pub active: Style,
    pub caret: Style,
    pub completed: Style,
    pub struck: Style,
    pub locked: Style,
    pub bullet: Style,
}

impl Default for DetailStyle {
    fn default() -> Self {
        DetailStyle {
            glyphs: Glyphs::default(),
            header: Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
            header_count: Style::default().fg(Color::DarkGray),
            text: Style::default().fg(Color::White),
            active: Style::default()
                .fg(Color::LightYellow)
                .add_modifier(Modifier::BOLD),
            caret: Style::default().fg(Color::LightYellow),
            completed: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
            struck: Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::CROSSED_OUT),
            locked: Style::default().fg(Color::LightRed),
            bullet: Style::default().fg(Color::LightMagenta),
        }
    }
}

impl DetailStyle {
    fn status_glyph(&self, category: Category) -> &str {
        match category {
            Category::Normal => "",
            Category::Completed => self.glyphs.completed.as_str(),
            Category::Struck => self.glyphs.struck.as_str(),
            Category::Locked => self.glyphs.locked.as_str(),
        }
    }

    fn status_width(&self) -> usize {
        [
            &self.glyphs.completed,
            &self.glyphs.struck,
            &self.glyphs.locked,
        ]
        .iter()
        .map(|g| display_width(g))
        .max()
        .unwrap_or(0)
    }

    fn message_style(&self, category: Category, active: bool) -> Style {
        let base = match category {
            Category::Normal => self.text,
            Category::Completed => self.completed,
            Category::Struck => self.struck,
            Category::Locked => self.locked,
        };
        if active {
            base.patch(self.active)
        } else {
            base
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FoldMark {
    Leaf,
    Expanded,
    Collapsed,
}

/// Per-row placement decided by the viewport.
#[derive(Debug, Clone, Copy)]
pub struct RowContext {
    pub depth: usize,
    pub active: bool,
    pub fold: FoldMark,
}

/// Renders one item into one or more lines no wider than `wrap_width`,
/// unless the item is nested so deep that the message floor kicks in.
pub fn render_item(
    item: &Item,
    ctx: &RowContext,
    wrap_width: usize,
    style: &DetailStyle,
) -> Vec<Line<'static>> {
    let prefix = item_prefix(item, ctx, style);
    let prefix_width: usize = prefix.iter().map(Span::width).sum();
    let suffix = match item.category {
        Category::Locked => style.glyphs.locked_suffix.as_str(),
        _ => "",
    };
    let available = wrap_width
        .saturating_sub(prefix_width + display_width(suffix))
        .max(MIN_MESSAGE_WIDTH);
    let text_style = style.message_style(item.category, ctx.active);

    wrap_text(&item.text, available)
        .into_iter()
        .enumerate()
        .map(|(idx, chunk)| {
            let mut spans = if idx == 0 {
                prefix.clone()
            } else {
                vec![Span::raw(" ".repeat(prefix_width))]
            };
            spans.push(Span::styled(chunk, text_style));
            if idx == 0 && !suffix.is_empty() {
                spans.push(Span::styled(suffix.to_string(), style.locked));
            }
            Line::from(spans)
        })
        .collect()
}

fn item_prefix(item: &Item, ctx: &RowContext, style: &DetailStyle) -> Vec<Span<'static>> {
    let caret_width = display_width(&style.glyphs.caret);
    let caret = if ctx.active {
        Span::styled(format!("{} ", style.glyphs.caret), style.caret)
    } else {
        Span::raw(" ".repeat(caret_width + 1))
    };

    let glyph = style.status_glyph(item.category);
    let pad = style.status_width().saturating_sub(display_width(glyph));
    let status = Span::styled(
        format!("{}{} ", glyph, " ".repeat(pad)),
        style.message_style(item.category, false),
    );

    let indent = Span::raw(INDENT.repeat(ctx.depth));

    let bullet = match ctx.fold {
        FoldMark::Collapsed => style.glyphs.folded.as_str(),
        FoldMark::Leaf | FoldMark::Expanded => item.bullet.as_str(),
    };
    let bullet = Span::styled(format!("{} ", bullet), style.bullet);

    vec![caret, status, indent, bullet]
}

/// Title line for a section, truncated to the wrap width.
pub fn header_line(section: &Section, wrap_width: usize, style: &DetailStyle) -> Line<'static> {
    let count = format!(" ({})", section.items.len());
    let title_width = wrap_width.saturating_sub(display_width(&count)).max(1);
    Line::from(vec![
        Span::styled(truncate_to_width(&section.title, title_width), style.header),
        Span::styled(count, style.header_count),
    ])
}

/// Joins the raw content of rendered lines, dropping all styling.
pub fn plain_text(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ctx(depth: usize) -> RowContext {
        RowContext {
            depth,
            active: false,
            fold: FoldMark::Leaf,
        }
    }

    fn text_of(line: &Line<'_>) -> String {
        plain_text(std::slice::from_ref(line))
    }

    #[test]
    fn prefix_has_caret_status_indent_and_bullet() {
        let style = DetailStyle::default();
        let item = Item::new("1", "water the plants");
        let lines = render_item(&item, &ctx(1), 80, &style);
        assert_eq!(lines.len(), 1);
        assert_eq!(text_of(&lines[0]), "      • water the plants");

        let active = RowContext {
            active: true,
            ..ctx(0)
        };
        let lines = render_item(&item, &active, 80, &style);
        assert_eq!(text_of(&lines[0]), "›   • water the plants");
    }

    #[test]
    fn continuation_lines_align_with_message_start() {
        let style = DetailStyle::default();
        let item = Item::new("1", "alpha beta gamma delta epsilon zeta eta theta");
        let lines = render_item(&item, &ctx(2), 26, &style);
        assert!(lines.len() > 1);
        let first = text_of(&lines[0]);
        let start = first.find("alpha").map(|b| first[..b].chars().count());
        for line in &lines[1..] {
            let text = text_of(line);
            let indent = text.chars().take_while(|c| *c == ' ').count();
            assert_eq!(Some(indent), start);
        }
        assert!(lines.iter().all(|l| l.width() <= 26));
    }

    #[test]
    fn embedded_newlines_continue_under_padding() {
        let style = DetailStyle::default();
        let item = Item::new("1", "one\ntwo");
        let lines = render_item(&item, &ctx(0), 40, &style);
        assert_eq!(lines.len(), 2);
        assert_eq!(text_of(&lines[1]), "      two");
    }

    #[test]
    fn category_glyphs_and_locked_suffix() {
        let style = DetailStyle::default();
        let done = Item::new("1", "file taxes").with_category(Category::Completed);
        let lines = render_item(&done, &ctx(0), 40, &style);
        assert_eq!(text_of(&lines[0]), "  ✓ • file taxes");

        let locked = Item::new("2", "signed lease").with_category(Category::Locked);
        let lines = render_item(&locked, &ctx(0), 40, &style);
        assert_eq!(text_of(&lines[0]), "  ◆ • signed lease [locked]");

        let struck = Item::new("3", "old plan").with_category(Category::Struck);
        let lines = render_item(&struck, &ctx(0), 40, &style);
        let message = lines[0].spans.last().map(|s| s.style);
        assert_eq!(
            message.map(|s| s.add_modifier.contains(Modifier::CROSSED_OUT)),
            Some(true)
        );
    }

    #[test]
    fn collapsed_parent_shows_fold_glyph() {
        let style = DetailStyle::default();
        let item = Item::new("1", "project");
        let folded = RowContext {
            fold: FoldMark::Collapsed,
            ..ctx(0)
        };
        let lines = render_item(&item, &folded, 40, &style);
        assert_eq!(text_of(&lines[0]), "    ▸ project");
    }

    #[test]
    fn narrow_width_floors_message_budget() {
        let style = DetailStyle::default();
        let item = Item::new("1", "abcdefghijklmnopqrst");
        let lines = render_item(&item, &ctx(0), 4, &style);
        assert_eq!(lines.len(), 2);
    }

    proptest! {
        #[test]
        fn unbroken_text_wraps_into_ceil_lines(
            len in 1usize..400,
            depth in 0usize..6,
            wrap_width in 30usize..120,
        ) {
            let style = DetailStyle::default();
            let item = Item::new("1", "x".repeat(len));
            let lines = render_item(&item, &ctx(depth), wrap_width, &style);
            let prefix_width = 6 + 2 * depth;
            let available = wrap_width.saturating_sub(prefix_width).max(MIN_MESSAGE_WIDTH);
            prop_assert_eq!(lines.len(), len.div_ceil(available));
            for line in &lines {
                prop_assert!(line.width() <= wrap_width.max(prefix_width + MIN_MESSAGE_WIDTH));
            }
            for line in &lines[1..] {
                let text = text_of(line);
                let indent = text.chars().take_while(|c| *c == ' ').count();
                prop_assert_eq!(indent, prefix_width);
            }
        }
    }

    #[test]
    fn header_truncates_title() {
        let style = DetailStyle::default();
        let section = Section::new("s", "A very long collection title", vec![]);
        let line = header_line(&section, 12, &style);
        assert_eq!(text_of(&line), "A very … (0)");
        assert!(line.width() <= 12);
    }
}
