use super::DetailView;
use tracing::debug;

/// Position of the highlighted entry. `item` is `None` when the section is
/// empty or has nothing visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub section: usize,
    pub item: Option<usize>,
}

impl DetailView {
    /// Moves `delta` visible items up or down, crossing section boundaries.
    /// Stops at the first and last visible item. Returns whether it moved.
    pub fn move_item(&mut self, delta: isize) -> bool {
        if delta == 0 || self.sections.is_empty() {
            return false;
        }
        let step = delta.signum();
        let start = self.cursor;
        for _ in 0..delta.unsigned_abs() {
            match self.next_visible(self.cursor, step) {
                Some(next) => self.cursor = next,
                None => break,
            }
        }
        let moved = self.cursor != start;
        if moved {
            self.ensure_visible();
        }
        moved
    }

    /// Jumps to the first visible item of the section `delta` away.
    pub fn move_section(&mut self, delta: isize) -> bool {
        if self.sections.is_empty() {
            return false;
        }
        let last = self.sections.len() as isize - 1;
        let section = (self.cursor.section as isize + delta).clamp(0, last) as usize;
        let start = self.cursor;
        self.cursor = Cursor {
            section,
            item: self.first_visible(section),
        };
        self.ensure_visible();
        self.cursor != start
    }

    /// Positions the cursor explicitly. Out-of-range indices are clamped and
    /// hidden targets resolve to the nearest visible item.
    pub fn set_cursor(&mut self, section: usize, item: usize) {
        self.place_cursor(section, item);
        self.ensure_visible();
    }

    /// Makes the given entry active, unfolding whatever hides it. Unknown ids
    /// leave the view untouched.
    pub fn set_active(&mut self, section_id: &str, item_id: &str) {
        let Some(section) = self.section_position(section_id) else {
            return;
        };
        let Some(item) = self.indexes[section].position(item_id) else {
            return;
        };
        let unfolded = self
            .folds
            .unfold_ancestors(&self.indexes[section], item_id);
        for id in &unfolded {
            self.invalidate_item(id);
        }
        if !unfolded.is_empty() {
            debug!(item_id, unfolded = unfolded.len(), "unfolded ancestors");
        }
        self.place_cursor(section, item);
        self.ensure_visible();
    }

    /// Back to the first entry of the first section, scrolled to the top.
    pub fn scroll_to_top(&mut self) {
        self.cursor = Cursor {
            section: 0,
            item: self.first_visible(0),
        };
        self.scroll_offset = 0;
    }

    pub(super) fn place_cursor(&mut self, section: usize, item: usize) {
        if self.sections.is_empty() {
            self.cursor = Cursor::default();
            return;
        }
        let section = section.min(self.sections.len() - 1);
        let len = self.sections[section].items.len();
        if len == 0 {
            self.cursor = Cursor {
                section,
                item: None,
            };
            return;
        }
        let start = item.min(len - 1);
        let item = (start..len)
            .find(|pos| self.is_visible(section, *pos))
            .or_else(|| (0..start).rev().find(|pos| self.is_visible(section, *pos)));
        self.cursor = Cursor { section, item };
    }

    pub(super) fn first_visible(&self, section: usize) -> Option<usize> {
        let len = self.sections.get(section)?.items.len();
        (0..len).find(|pos| self.is_visible(section, *pos))
    }

    fn next_visible(&self, from: Cursor, step: isize) -> Option<Cursor> {
        let total: usize = self.sections.iter().map(|s| s.items.len()).sum();
        let budget = 4 * self.sections.len() + total;
        let mut pos = from;
        for _ in 0..budget {
            pos = self.step_slot(pos, step)?;
            if let Some(item) = pos.item {
                if self.is_visible(pos.section, item) {
                    return Some(pos);
                }
            }
        }
        None
    }

    /// The adjacent item slot in render order, skipping empty sections.
    /// `None` once the edge of the whole list is reached.
    fn step_slot(&self, pos: Cursor, step: isize) -> Option<Cursor> {
        let len = self.sections.get(pos.section)?.items.len();
        if step > 0 {
            let next = pos.item.map_or(0, |i| i + 1);
            if next < len {
                return Some(Cursor {
                    section: pos.section,
                    item: Some(next),
                });
            }
            let section = (pos.section + 1..self.sections.len())
                .find(|s| !self.sections[*s].items.is_empty())?;
            Some(Cursor {
                section,
                item: Some(0),
            })
        } else {
            let prev = match pos.item {
                Some(i) => i.checked_sub(1),
                None => len.checked_sub(1),
            };
            if let Some(prev) = prev {
                return Some(Cursor {
                    section: pos.section,
                    item: Some(prev),
                });
            }
            let section = (0..pos.section)
                .rev()
                .find(|s| !self.sections[*s].items.is_empty())?;
            Some(Cursor {
                section,
                item: Some(self.sections[section].items.len() - 1),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::detail::{DetailView, Item, Section};

    fn sections() -> Vec<Section> {
        vec![
            Section::new(
                "one",
                "One",
                vec![Item::new("a", "a"), Item::new("b", "b")],
            ),
            Section::new("empty", "Empty", vec![]),
            Section::new(
                "two",
                "Two",
                vec![
                    Item::new("c", "c"),
                    Item::new("c1", "c1").with_parent("c"),
                    Item::new("d", "d"),
                ],
            ),
        ]
    }

    #[test]
    fn moves_across_sections_and_skips_empty_ones() {
        let mut view = DetailView::default();
        view.set_sections(sections());
        assert!(view.move_item(1));
        assert_eq!(view.active_entry_id(), Some("b"));
        assert!(view.move_item(1));
        assert_eq!(view.active_entry_id(), Some("c"));
        assert_eq!(view.active_collection_id(), Some("two"));
        assert!(view.move_item(-1));
        assert_eq!(view.active_entry_id(), Some("b"));
    }

    #[test]
    fn clamps_at_both_ends() {
        let mut view = DetailView::default();
        view.set_sections(sections());
        assert!(!view.move_item(-1));
        assert_eq!(view.active_entry_id(), Some("a"));
        assert!(view.move_item(50));
        assert_eq!(view.active_entry_id(), Some("d"));
        assert!(!view.move_item(1));
    }

    #[test]
    fn skips_folded_children() {
        let mut view = DetailView::default();
        view.set_sections(sections());
        view.toggle_fold("c", Some(true));
        view.set_active("two", "c");
        assert!(view.move_item(1));
        assert_eq!(view.active_entry_id(), Some("d"));
        assert!(view.move_item(-1));
        assert_eq!(view.active_entry_id(), Some("c"));
    }

    #[test]
    fn move_section_lands_on_first_visible_or_nothing() {
        let mut view = DetailView::default();
        view.set_sections(sections());
        assert!(view.move_section(1));
        assert_eq!(view.active_collection_id(), Some("empty"));
        assert_eq!(view.active_entry_id(), None);
        assert!(view.move_section(5));
        assert_eq!(view.active_entry_id(), Some("c"));
        view.move_section(-9);
        assert_eq!(view.active_entry_id(), Some("a"));
    }

    #[test]
    fn moving_out_of_an_empty_section() {
        let mut view = DetailView::default();
        view.set_sections(sections());
        view.move_section(1);
        assert!(view.move_item(1));
        assert_eq!(view.active_entry_id(), Some("c"));
        view.move_section(-1);
        assert!(view.move_item(-1));
        assert_eq!(view.active_entry_id(), Some("b"));
    }

    #[test]
    fn set_cursor_clamps_and_avoids_hidden_items() {
        let mut view = DetailView::default();
        view.set_sections(sections());
        view.set_cursor(99, 99);
        assert_eq!(view.active_entry_id(), Some("d"));
        view.toggle_fold("c", Some(true));
        view.set_cursor(2, 1);
        assert_eq!(view.active_entry_id(), Some("d"));
        view.set_cursor(1, 0);
        assert_eq!(view.active_collection_id(), Some("empty"));
        assert_eq!(view.active_entry_id(), None);
    }

    #[test]
    fn unknown_ids_are_ignored_by_set_active() {
        let mut view = DetailView::default();
        view.set_sections(sections());
        view.set_active("two", "d");
        view.set_active("nowhere", "a");
        view.set_active("one", "d");
        assert_eq!(view.active_entry_id(), Some("d"));
    }

    #[test]
    fn scroll_to_top_resets_position() {
        let mut view = DetailView::default();
        view.set_sections(sections());
        view.viewport(3);
        view.move_item(4);
        assert!(view.scroll_offset() > 0);
        view.scroll_to_top();
        assert_eq!(view.scroll_offset(), 0);
        assert_eq!(view.active_entry_id(), Some("a"));
    }
}
