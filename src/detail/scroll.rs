use super::render::{self, plain_text};
use super::{Cursor, DetailView, MIN_VIEWPORT_HEIGHT};
use ratatui::text::Line;
use tracing::debug;

/// The visible slice of the rendered list.
#[derive(Debug, Clone, Default)]
pub struct ViewportFrame {
    pub lines: Vec<Line<'static>>,
    pub total_lines: usize,
}

impl ViewportFrame {
    pub fn text(&self) -> String {
        plain_text(&self.lines)
    }
}

impl DetailView {
    /// Header, visible items and a trailing spacer for one section.
    pub fn render_section(&self, idx: usize) -> Vec<Line<'static>> {
        let Some(section) = self.sections.get(idx) else {
            return Vec::new();
        };
        let mut lines = vec![render::header_line(section, self.wrap_width, &self.style)];
        for pos in 0..section.items.len() {
            if self.is_visible(idx, pos) {
                lines.extend(self.render_row(idx, pos));
            }
        }
        lines.push(Line::default());
        lines
    }

    pub fn section_height(&mut self, idx: usize) -> usize {
        if let Some(Some(height)) = self.heights.get(idx) {
            return *height;
        }
        let height = self.render_section(idx).len();
        if let Some(slot) = self.heights.get_mut(idx) {
            *slot = Some(height);
        }
        height
    }

    pub fn total_lines(&mut self) -> usize {
        (0..self.sections.len())
            .map(|idx| self.section_height(idx))
            .sum()
    }

    fn section_top(&mut self, idx: usize) -> usize {
        (0..idx).map(|i| self.section_height(i)).sum()
    }

    /// First rendered row of the active entry and how many rows it spans.
    /// With no active entry the section header stands in for it.
    pub(super) fn cursor_row(&mut self) -> (usize, usize) {
        if self.sections.is_empty() {
            return (0, 1);
        }
        let Cursor { section, item } = self.cursor;
        let header = self.section_top(section);
        let Some(target) = item else {
            return (header, 1);
        };
        let above: usize = (0..target)
            .filter(|pos| self.is_visible(section, *pos))
            .map(|pos| self.render_row(section, pos).len())
            .sum();
        let rows = self.render_row(section, target).len().max(1);
        (header + 1 + above, rows)
    }

    /// Scrolls the least amount needed to bring the active entry into the
    /// window, keeping all of it in view when it fits.
    pub fn ensure_visible(&mut self) {
        let height = self.viewport_height;
        let (row, rows) = self.cursor_row();
        let span = rows.min(height);
        if row < self.scroll_offset {
            self.scroll_offset = row;
        } else if row + span > self.scroll_offset + height {
            self.scroll_offset = row + span - height;
        }
        self.clamp_scroll();
    }

    pub(super) fn clamp_scroll(&mut self) {
        let max = self.total_lines().saturating_sub(self.viewport_height);
        self.scroll_offset = self.scroll_offset.min(max);
    }

    /// Renders the window of `height` rows at the current scroll offset.
    /// Only the sections that overlap the window are rendered.
    pub fn viewport(&mut self, height: usize) -> ViewportFrame {
        let height = height.max(MIN_VIEWPORT_HEIGHT);
        if height != self.viewport_height {
            self.viewport_height = height;
            self.ensure_visible();
        }
        let total = self.total_lines();
        self.scroll_offset = self.scroll_offset.min(total.saturating_sub(height));
        let start = self.scroll_offset;
        let end = (start + height).min(total);

        let mut lines = Vec::with_capacity(end - start);
        let mut top = 0;
        for idx in 0..self.sections.len() {
            if top >= end {
                break;
            }
            let bottom = top + self.section_height(idx);
            if bottom > start {
                let rendered = self.render_section(idx);
                let skip = start.saturating_sub(top);
                let take = end.min(bottom) - top.max(start);
                lines.extend(rendered.into_iter().skip(skip).take(take));
            }
            top = bottom;
        }

        ViewportFrame {
            lines,
            total_lines: total,
        }
    }

    /// Scrolls so the section `section_id` shows. With `prefer_full` and
    /// enough room the whole section is shown with its last row at the
    /// bottom; otherwise its header goes to the top.
    pub fn reveal_collection(&mut self, section_id: &str, prefer_full: bool, height: usize) {
        let Some(idx) = self.section_position(section_id) else {
            return;
        };
        self.viewport_height = height.max(MIN_VIEWPORT_HEIGHT);
        let height = self.viewport_height;
        let top = self.section_top(idx);
        let section_height = self.section_height(idx);

        self.scroll_offset = if prefer_full && section_height <= height {
            (top + section_height).saturating_sub(height)
        } else {
            top
        };
        self.clamp_scroll();

        let (row, _) = self.cursor_row();
        if row < self.scroll_offset || row >= self.scroll_offset + height {
            self.cursor = Cursor {
                section: idx,
                item: self.first_visible(idx),
            };
            self.ensure_visible();
        }
        debug!(
            section = section_id,
            prefer_full,
            offset = self.scroll_offset,
            "collection revealed"
        );
    }
}
