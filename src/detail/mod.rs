//! Foldable, scrollable list of entries grouped into sections.
//!
//! The host pushes the whole section list in via [`DetailView::set_sections`]
//! every time its data changes. Fold state, the cursor and the scroll offset
//! belong to the view and are carried across reloads by id.

mod cursor;
mod fold;
pub mod render;
mod scroll;
mod tree;
pub mod wrap;

pub use cursor::Cursor;
pub use render::DetailStyle;
pub use scroll::ViewportFrame;

use fold::FoldStore;
use render::{FoldMark, RowContext};
use ratatui::text::Line;
use std::collections::HashSet;
use tracing::debug;
use tree::TreeIndex;

pub const DEFAULT_WRAP_WIDTH: usize = 80;
pub const MIN_WRAP_WIDTH: usize = 20;
pub const MIN_VIEWPORT_HEIGHT: usize = 1;
const DEFAULT_VIEWPORT_HEIGHT: usize = 24;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Category {
    #[default]
    Normal,
    Completed,
    Struck,
    Locked,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub parent_id: Option<String>,
    pub text: String,
    pub category: Category,
    pub bullet: String,
}

impl Item {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Item {
            id: id.into(),
            parent_id: None,
            text: text.into(),
            category: Category::Normal,
            bullet: "•".into(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_bullet(mut self, bullet: impl Into<String>) -> Self {
        self.bullet = bullet.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub items: Vec<Item>,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl Into<String>, items: Vec<Item>) -> Self {
        Section {
            id: id.into(),
            title: title.into(),
            items,
        }
    }
}

pub struct DetailView {
    sections: Vec<Section>,
    indexes: Vec<TreeIndex>,
    folds: FoldStore,
    cursor: Cursor,
    scroll_offset: usize,
    wrap_width: usize,
    viewport_height: usize,
    heights: Vec<Option<usize>>,
    focused: bool,
    style: DetailStyle,
}

impl Default for DetailView {
    fn default() -> Self {
        DetailView::new(DetailStyle::default())
    }
}

impl DetailView {
    pub fn new(style: DetailStyle) -> Self {
        DetailView {
            sections: Vec::new(),
            indexes: Vec::new(),
            folds: FoldStore::default(),
            cursor: Cursor::default(),
            scroll_offset: 0,
            wrap_width: DEFAULT_WRAP_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            heights: Vec::new(),
            focused: true,
            style,
        }
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll_offset
    }

    pub fn wrap_width(&self) -> usize {
        self.wrap_width
    }

    /// An unfocused view draws no caret. Row widths stay the same.
    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    /// Replaces every section. The active entry, fold flags and scroll
    /// offset survive when their ids are still present.
    pub fn set_sections(&mut self, sections: Vec<Section>) {
        let previous = self.cursor;
        let active = self.active_ids();

        let old_sections = std::mem::replace(&mut self.sections, sections);
        let old_heights = std::mem::take(&mut self.heights);
        self.indexes = self
            .sections
            .iter()
            .map(|section| TreeIndex::build(&section.items))
            .collect();
        self.heights = self
            .sections
            .iter()
            .enumerate()
            .map(|(idx, section)| match (old_sections.get(idx), old_heights.get(idx)) {
                (Some(old), Some(height)) if old == section => *height,
                _ => None,
            })
            .collect();

        let live: HashSet<&str> = self
            .sections
            .iter()
            .flat_map(|section| section.items.iter().map(|item| item.id.as_str()))
            .collect();
        self.folds.retain(|id| live.contains(id));

        if self.sections.is_empty() {
            self.cursor = Cursor::default();
            self.scroll_offset = 0;
            debug!("detail view cleared");
            return;
        }

        let restored = active
            .and_then(|(section_id, item_id)| self.locate(&section_id, item_id.as_deref(), previous))
            .unwrap_or(previous);
        self.place_cursor(restored.section, restored.item.unwrap_or(0));
        self.clamp_scroll();
        self.ensure_visible();
        debug!(
            sections = self.sections.len(),
            folded = self.folds.len(),
            section = self.cursor.section,
            item = ?self.cursor.item,
            "detail sections replaced"
        );
    }

    /// Changes the column budget. Every cached height depends on it.
    pub fn set_wrap_width(&mut self, width: usize) {
        let width = if width == 0 {
            DEFAULT_WRAP_WIDTH
        } else {
            width.max(MIN_WRAP_WIDTH)
        };
        if width == self.wrap_width {
            return;
        }
        self.wrap_width = width;
        self.heights.iter_mut().for_each(|h| *h = None);
        self.clamp_scroll();
        self.ensure_visible();
    }

    /// Collapses or expands `id`; `None` flips the current state. Unknown ids
    /// are ignored.
    pub fn toggle_fold(&mut self, id: &str, collapsed: Option<bool>) {
        if !self.indexes.iter().any(|index| index.contains(id)) {
            return;
        }
        if !self.folds.toggle(id, collapsed) {
            return;
        }
        self.invalidate_item(id);
        debug!(id, folded = self.folds.is_folded(id), "fold toggled");
        self.repair_cursor();
        self.clamp_scroll();
        self.ensure_visible();
    }

    pub fn is_folded(&self, id: &str) -> bool {
        self.folds.is_folded(id)
    }

    pub fn is_visible(&self, section: usize, item: usize) -> bool {
        match (self.sections.get(section), self.indexes.get(section)) {
            (Some(s), Some(index)) => s
                .items
                .get(item)
                .map(|it| self.folds.is_visible(index, &it.id))
                .unwrap_or(false),
            _ => false,
        }
    }

    pub fn has_children(&self, section: usize, id: &str) -> bool {
        self.indexes
            .get(section)
            .map(|index| index.has_children(id))
            .unwrap_or(false)
    }

    pub fn active_entry_id(&self) -> Option<&str> {
        let item = self.cursor.item?;
        self.sections
            .get(self.cursor.section)?
            .items
            .get(item)
            .map(|it| it.id.as_str())
    }

    pub fn active_collection_id(&self) -> Option<&str> {
        self.sections
            .get(self.cursor.section)
            .map(|section| section.id.as_str())
    }

    fn active_ids(&self) -> Option<(String, Option<String>)> {
        let section = self.active_collection_id()?.to_string();
        Some((section, self.active_entry_id().map(str::to_string)))
    }

    fn section_position(&self, id: &str) -> Option<usize> {
        self.sections.iter().position(|section| section.id == id)
    }

    /// Resolves a previously active pair of ids against the current
    /// sections. An item that vanished keeps its old index in that section.
    fn locate(&self, section_id: &str, item_id: Option<&str>, previous: Cursor) -> Option<Cursor> {
        let section = self.section_position(section_id)?;
        let item = item_id
            .and_then(|id| self.indexes[section].position(id))
            .or(previous.item);
        Some(Cursor { section, item })
    }

    /// Drops the cached height of every section holding `id`.
    fn invalidate_item(&mut self, id: &str) {
        for (idx, index) in self.indexes.iter().enumerate() {
            if index.contains(id) {
                if let Some(height) = self.heights.get_mut(idx) {
                    *height = None;
                }
            }
        }
    }

    /// Moves a cursor stranded under a folded ancestor up to the nearest
    /// ancestor that is still visible.
    fn repair_cursor(&mut self) {
        let Cursor { section, item } = self.cursor;
        let Some(item) = item else {
            return;
        };
        if self.is_visible(section, item) {
            return;
        }
        let index = &self.indexes[section];
        let id = self.sections[section].items[item].id.as_str();
        let target = index
            .ancestors(id)
            .filter_map(|ancestor| index.position(ancestor))
            .find(|pos| self.is_visible(section, *pos));
        match target {
            Some(pos) => self.cursor.item = Some(pos),
            None => self.place_cursor(section, item),
        }
    }

    fn render_row(&self, section: usize, pos: usize) -> Vec<Line<'static>> {
        let (Some(s), Some(index)) = (self.sections.get(section), self.indexes.get(section)) else {
            return Vec::new();
        };
        let Some(item) = s.items.get(pos) else {
            return Vec::new();
        };
        let fold = if !index.has_children(&item.id) {
            FoldMark::Leaf
        } else if self.folds.is_folded(&item.id) {
            FoldMark::Collapsed
        } else {
            FoldMark::Expanded
        };
        let ctx = RowContext {
            depth: index.depth(&item.id),
            active: self.focused
                && self.cursor.section == section
                && self.cursor.item == Some(pos),
            fold,
        };
        render::render_item(item, &ctx, self.wrap_width, &self.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn flat(id: &str, count: usize) -> Section {
        let items = (0..count)
            .map(|n| Item::new(format!("{id}-{n}"), format!("entry {n}")))
            .collect();
        Section::new(id, id, items)
    }

    fn nested() -> Vec<Section> {
        vec![
            Section::new(
                "today",
                "Today",
                vec![
                    Item::new("a", "groceries"),
                    Item::new("a1", "milk").with_parent("a"),
                    Item::new("a2", "eggs").with_parent("a"),
                    Item::new("a2x", "free range").with_parent("a2"),
                    Item::new("b", "call mom"),
                ],
            ),
            Section::new("inbox", "Inbox", vec![Item::new("c", "read book")]),
        ]
    }

    fn row_in_window(view: &mut DetailView) -> bool {
        let (row, _) = view.cursor_row();
        let height = view.viewport_height;
        row >= view.scroll_offset && row < view.scroll_offset + height
    }

    #[test]
    fn empty_sections_reset_everything() {
        let mut view = DetailView::default();
        view.set_sections(nested());
        view.move_item(3);
        view.set_sections(Vec::new());
        assert_eq!(view.cursor(), Cursor::default());
        assert_eq!(view.active_entry_id(), None);
        let frame = view.viewport(10);
        assert_eq!(frame.total_lines, 0);
        assert!(frame.text().is_empty());
    }

    #[test]
    fn folding_hides_subtree_and_moves_cursor_to_ancestor() {
        let mut view = DetailView::default();
        view.set_sections(nested());
        view.set_active("today", "a2x");
        assert_eq!(view.active_entry_id(), Some("a2x"));

        view.toggle_fold("a", Some(true));
        assert!(!view.is_visible(0, 1));
        assert!(!view.is_visible(0, 3));
        assert_eq!(view.active_entry_id(), Some("a"));

        view.move_item(1);
        assert_eq!(view.active_entry_id(), Some("b"));
    }

    #[test]
    fn unknown_fold_target_is_ignored() {
        let mut view = DetailView::default();
        view.set_sections(nested());
        view.toggle_fold("nope", Some(true));
        assert!(!view.is_folded("nope"));
    }

    #[test]
    fn set_active_unfolds_ancestors() {
        let mut view = DetailView::default();
        view.set_sections(nested());
        view.toggle_fold("a", Some(true));
        view.toggle_fold("a2", Some(true));
        view.set_active("today", "a2x");
        assert!(!view.is_folded("a"));
        assert!(!view.is_folded("a2"));
        assert_eq!(view.active_entry_id(), Some("a2x"));
    }

    #[test]
    fn fold_state_survives_reload_and_prunes_missing_ids() {
        let mut view = DetailView::default();
        view.set_sections(nested());
        view.toggle_fold("a", Some(true));
        view.toggle_fold("c", Some(true));
        let mut sections = nested();
        sections.truncate(1);
        view.set_sections(sections);
        assert!(view.is_folded("a"));
        assert!(!view.is_folded("c"));
        assert!(!view.is_visible(0, 2));
    }

    #[test]
    fn reload_follows_active_entry_by_id() {
        let mut view = DetailView::default();
        view.set_sections(nested());
        view.set_active("today", "b");
        let mut sections = nested();
        sections[0].items.insert(0, Item::new("z", "new first entry"));
        view.set_sections(sections);
        assert_eq!(view.active_entry_id(), Some("b"));
        assert_eq!(view.cursor().item, Some(5));
    }

    #[test]
    fn reload_after_delete_clamps_to_neighbour() {
        let mut view = DetailView::default();
        view.set_sections(nested());
        view.set_active("today", "b");
        let mut sections = nested();
        sections[0].items.pop();
        view.set_sections(sections);
        assert_eq!(view.active_collection_id(), Some("today"));
        assert_eq!(view.active_entry_id(), Some("a2x"));
    }

    #[test]
    fn wrap_width_change_invalidates_heights() {
        let mut view = DetailView::default();
        view.set_sections(vec![Section::new(
            "s",
            "S",
            vec![Item::new("x", "one two three four five six seven eight nine ten")],
        )]);
        let wide = view.viewport(20).total_lines;
        view.set_wrap_width(24);
        let narrow = view.viewport(20).total_lines;
        assert_eq!(wide, 3);
        assert!(narrow > wide);
    }

    #[test]
    fn non_positive_dimensions_fall_back_to_defaults() {
        let mut view = DetailView::default();
        view.set_wrap_width(0);
        assert_eq!(view.wrap_width(), DEFAULT_WRAP_WIDTH);
        view.set_wrap_width(3);
        assert_eq!(view.wrap_width(), MIN_WRAP_WIDTH);
        view.set_sections(vec![flat("s", 3)]);
        let frame = view.viewport(0);
        assert_eq!(frame.lines.len(), 1);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Move(isize),
        Section(isize),
        Fold(usize, Option<bool>),
        Reload,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            (-3isize..=3).prop_map(Op::Move),
            (-1isize..=1).prop_map(Op::Section),
            (0usize..12, prop::option::of(any::<bool>())).prop_map(|(i, c)| Op::Fold(i, c)),
            Just(Op::Reload),
        ]
    }

    /// Random forest: each item may point at any earlier item of its section.
    fn forest_strategy() -> impl Strategy<Value = Vec<Section>> {
        prop::collection::vec(
            prop::collection::vec((prop::option::of(0usize..12), 1usize..60), 0..12),
            1..4,
        )
        .prop_map(|sections| {
            sections
                .into_iter()
                .enumerate()
                .map(|(s, items)| {
                    let items = items
                        .into_iter()
                        .enumerate()
                        .map(|(i, (parent, len))| {
                            let item = Item::new(format!("{s}-{i}"), "x".repeat(len));
                            match parent {
                                Some(p) if p < i => item.with_parent(format!("{s}-{p}")),
                                _ => item,
                            }
                        })
                        .collect();
                    Section::new(format!("s{s}"), format!("Section {s}"), items)
                })
                .collect()
        })
    }

    fn all_ids(sections: &[Section]) -> Vec<String> {
        sections
            .iter()
            .flat_map(|s| s.items.iter().map(|i| i.id.clone()))
            .collect()
    }

    proptest! {
        #[test]
        fn cursor_stays_visible_and_in_window(
            sections in forest_strategy(),
            ops in prop::collection::vec(op_strategy(), 1..40),
            height in 1usize..12,
        ) {
            let mut view = DetailView::default();
            view.set_sections(sections.clone());
            view.viewport(height);
            let ids = all_ids(&sections);
            for op in ops {
                match op {
                    Op::Move(delta) => { view.move_item(delta); }
                    Op::Section(delta) => { view.move_section(delta); }
                    Op::Fold(i, collapsed) => {
                        if let Some(id) = ids.get(i % ids.len().max(1)) {
                            view.toggle_fold(id, collapsed);
                        }
                    }
                    Op::Reload => view.set_sections(sections.clone()),
                }
                let cursor = view.cursor();
                if let Some(item) = cursor.item {
                    prop_assert!(view.is_visible(cursor.section, item));
                }
                prop_assert!(row_in_window(&mut view));
                let total = view.total_lines();
                prop_assert!(view.scroll_offset() <= total.saturating_sub(height));
            }
        }

        #[test]
        fn folding_hides_every_descendant(sections in forest_strategy(), pick in 0usize..12) {
            let mut view = DetailView::default();
            view.set_sections(sections.clone());
            let section = &sections[0];
            prop_assume!(!section.items.is_empty());
            let target = section.items[pick % section.items.len()].id.clone();
            view.toggle_fold(&target, Some(true));

            let index = TreeIndex::build(&section.items);
            for (pos, item) in section.items.iter().enumerate() {
                let below = index.ancestors(&item.id).any(|a| a == target);
                if below {
                    prop_assert!(!view.is_visible(0, pos));
                }
            }

            view.toggle_fold(&target, Some(false));
            for pos in 0..section.items.len() {
                prop_assert!(view.is_visible(0, pos));
            }
        }
    }
}
