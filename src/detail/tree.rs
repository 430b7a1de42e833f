use super::Item;
use std::collections::{HashMap, HashSet};

/// Parent/child lookup tables for the items of one section.
///
/// Parent links that point outside the section, or at the item itself, are
/// dropped so the item is treated as a root. Cycles are not rejected here;
/// [`Ancestors`] stops as soon as it revisits a node.
#[derive(Debug, Default, Clone)]
pub struct TreeIndex {
    positions: HashMap<String, usize>,
    parent_of: HashMap<String, String>,
    children_of: HashMap<String, Vec<usize>>,
}

impl TreeIndex {
    pub fn build(items: &[Item]) -> Self {
        let mut positions = HashMap::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            positions.entry(item.id.clone()).or_insert(idx);
        }

        let mut parent_of = HashMap::new();
        let mut children_of: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, item) in items.iter().enumerate() {
            let Some(parent) = item.parent_id.as_deref() else {
                continue;
            };
            if parent == item.id || !positions.contains_key(parent) {
                continue;
            }
            parent_of.insert(item.id.clone(), parent.to_string());
            children_of.entry(parent.to_string()).or_default().push(idx);
        }

        TreeIndex {
            positions,
            parent_of,
            children_of,
        }
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.parent_of.get(id).map(String::as_str)
    }

    /// Indices of the direct children of `id`, in section order.
    pub fn children_of(&self, id: &str) -> &[usize] {
        self.children_of.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_children(&self, id: &str) -> bool {
        !self.children_of(id).is_empty()
    }

    pub fn ancestors<'a>(&'a self, id: &'a str) -> Ancestors<'a> {
        let mut seen = HashSet::new();
        seen.insert(id);
        Ancestors {
            index: self,
            next: Some(id),
            seen,
        }
    }

    pub fn depth(&self, id: &str) -> usize {
        self.ancestors(id).count()
    }
}

/// Walks parent links upward, nearest ancestor first.
pub struct Ancestors<'a> {
    index: &'a TreeIndex,
    next: Option<&'a str>,
    seen: HashSet<&'a str>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        let parent = self.index.parent_of(current)?;
        if !self.seen.insert(parent) {
            return None;
        }
        self.next = Some(parent);
        Some(parent)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str, parent: Option<&str>) -> Item {
        let item = Item::new(id, id);
        match parent {
            Some(p) => item.with_parent(p),
            None => item,
        }
    }

    #[test]
    fn builds_parent_and_children_tables() {
        let items = vec![
            item("a", None),
            item("b", Some("a")),
            item("c", Some("b")),
            item("d", Some("a")),
        ];
        let index = TreeIndex::build(&items);
        assert_eq!(index.parent_of("c"), Some("b"));
        assert_eq!(index.children_of("a"), &[1, 3]);
        assert!(index.children_of("c").is_empty());
        assert_eq!(index.depth("a"), 0);
        assert_eq!(index.depth("c"), 2);
        assert_eq!(index.ancestors("c").collect::<Vec<_>>(), vec!["b", "a"]);
    }

    #[test]
    fn dangling_and_self_parents_are_roots() {
        let items = vec![item("a", Some("missing")), item("b", Some("b"))];
        let index = TreeIndex::build(&items);
        assert_eq!(index.parent_of("a"), None);
        assert_eq!(index.parent_of("b"), None);
        assert_eq!(index.depth("a"), 0);
        assert_eq!(index.depth("b"), 0);
    }

    #[test]
    fn ancestor_walk_stops_on_cycles() {
        let items = vec![
            item("a", Some("c")),
            item("b", Some("a")),
            item("c", Some("b")),
        ];
        let index = TreeIndex::build(&items);
        assert_eq!(index.ancestors("a").collect::<Vec<_>>(), vec!["c", "b"]);
        assert_eq!(index.depth("b"), 2);
    }

    #[test]
    fn duplicate_ids_resolve_to_first_position() {
        let items = vec![item("a", None), item("a", None)];
        let index = TreeIndex::build(&items);
        assert_eq!(index.position("a"), Some(0));
    }
}
