use super::tree::TreeIndex;
use std::collections::HashSet;

/// Collapsed flags keyed by item id. Absent ids are expanded.
#[derive(Debug, Default, Clone)]
pub struct FoldStore {
    collapsed: HashSet<String>,
}

impl FoldStore {
    pub fn is_folded(&self, id: &str) -> bool {
        self.collapsed.contains(id)
    }

    /// Sets the flag explicitly, or flips it when `collapsed` is `None`.
    /// Returns whether the stored state changed.
    pub fn toggle(&mut self, id: &str, collapsed: Option<bool>) -> bool {
        let target = collapsed.unwrap_or_else(|| !self.is_folded(id));
        if target {
            self.collapsed.insert(id.to_string())
        } else {
            self.collapsed.remove(id)
        }
    }

    /// Clears the flag on every ancestor of `id` and returns the ids that
    /// were actually unfolded.
    pub fn unfold_ancestors(&mut self, index: &TreeIndex, id: &str) -> Vec<String> {
        let folded: Vec<String> = index
            .ancestors(id)
            .filter(|ancestor| self.is_folded(ancestor))
            .map(str::to_string)
            .collect();
        for ancestor in &folded {
            self.collapsed.remove(ancestor);
        }
        folded
    }

    /// An item is visible when no ancestor is folded. A cyclic parent chain
    /// ends the walk early, so such items fail open to visible.
    pub fn is_visible(&self, index: &TreeIndex, id: &str) -> bool {
        !index.ancestors(id).any(|ancestor| self.is_folded(ancestor))
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str) -> bool,
    {
        self.collapsed.retain(|id| keep(id));
    }

    pub fn len(&self) -> usize {
        self.collapsed.len()
    }
}
