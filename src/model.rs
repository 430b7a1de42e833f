use crate::detail::{Category, Item, Section};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

pub type EntryId = String;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Journal {
    pub name: String,
    pub collections: Vec<Collection>,
    pub entries: HashMap<EntryId, Entry>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Collection {
    pub id: String,
    pub name: String,
    pub entry_ids: Vec<EntryId>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Bullet {
    #[default]
    Task,
    Note,
    Event,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Entry {
    pub id: EntryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<EntryId>,
    pub message: String,
    #[serde(default)]
    pub bullet: Bullet,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub struck: bool,
    #[serde(default)]
    pub locked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Daily(NaiveDate),
    Monthly(NaiveDate),
    Future,
    Custom,
}

#[derive(thiserror::Error, Debug)]
pub enum JournalError {
    #[error("collection not found: {0}")]
    CollectionNotFound(String),
    #[error("entry not found: {0}")]
    EntryNotFound(String),
    #[error("entry {0} not present in any collection")]
    EntryLocationMissing(String),
    #[error("parent {parent} is not in collection {collection}")]
    ParentElsewhere { parent: String, collection: String },
    #[error("entry {0} is locked")]
    EntryLocked(String),
}

impl CollectionKind {
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if name.eq_ignore_ascii_case("future") {
            return CollectionKind::Future;
        }
        if let Ok(date) = NaiveDate::parse_from_str(name, "%Y-%m-%d") {
            return CollectionKind::Daily(date);
        }
        if let Ok(date) = NaiveDate::parse_from_str(&format!("{}-01", name), "%Y-%m-%d") {
            return CollectionKind::Monthly(date);
        }
        CollectionKind::Custom
    }
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Collection {
            id: collection_id(&name),
            name,
            entry_ids: Vec::new(),
        }
    }

    pub fn kind(&self) -> CollectionKind {
        CollectionKind::parse(&self.name)
    }

    pub fn title(&self) -> String {
        match self.kind() {
            CollectionKind::Daily(date) => date.format("%A, %B %-d %Y").to_string(),
            CollectionKind::Monthly(date) => date.format("%B %Y").to_string(),
            CollectionKind::Future => "Future Log".to_string(),
            CollectionKind::Custom => self.name.clone(),
        }
    }
}

/// Lowercased, dash-separated form of a collection name.
pub fn collection_id(name: &str) -> String {
    let mut id = String::new();
    for word in name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        if !id.is_empty() {
            id.push('-');
        }
        id.push_str(&word.to_lowercase());
    }
    if id.is_empty() {
        "collection".to_string()
    } else {
        id
    }
}

impl Bullet {
    pub fn glyph(&self) -> &'static str {
        match self {
            Bullet::Task => "•",
            Bullet::Note => "–",
            Bullet::Event => "○",
        }
    }
}

impl Entry {
    pub fn new(id: EntryId, message: String, bullet: Bullet, parent_id: Option<EntryId>) -> Self {
        let now = Utc::now();
        Entry {
            id,
            parent_id,
            message,
            bullet,
            completed: false,
            struck: false,
            locked: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn category(&self) -> Category {
        if self.locked {
            Category::Locked
        } else if self.struck {
            Category::Struck
        } else if self.completed {
            Category::Completed
        } else {
            Category::Normal
        }
    }
}

impl Journal {
    pub fn default_named(name: impl Into<String>) -> Self {
        Journal {
            name: name.into(),
            collections: vec![Collection::new("Inbox"), Collection::new("Future")],
            entries: HashMap::new(),
        }
    }

    pub fn find_collection_index(&self, id: &str) -> Option<usize> {
        self.collections.iter().position(|c| c.id == id)
    }

    pub fn find_entry_collection_index(&self, entry_id: &str) -> Option<usize> {
        self.collections
            .iter()
            .position(|c| c.entry_ids.iter().any(|id| id == entry_id))
    }

    /// Returns the id of the collection called `name`, creating it at the end
    /// when it does not exist yet.
    pub fn ensure_collection(&mut self, name: &str) -> String {
        let id = collection_id(name);
        if self.find_collection_index(&id).is_none() {
            let mut collection = Collection::new(name.trim());
            collection.id = id.clone();
            self.collections.push(collection);
        }
        id
    }

    /// Adds `entry` to a collection. A child goes right after its parent's
    /// last descendant so the collection reads top to bottom.
    pub fn add_entry(&mut self, entry: Entry, collection_id: &str) -> Result<(), JournalError> {
        let target_idx = self
            .find_collection_index(collection_id)
            .ok_or_else(|| JournalError::CollectionNotFound(collection_id.to_string()))?;
        let position = match entry.parent_id.as_deref() {
            Some(parent) => {
                if !self.collections[target_idx]
                    .entry_ids
                    .iter()
                    .any(|id| id == parent)
                {
                    return Err(JournalError::ParentElsewhere {
                        parent: parent.to_string(),
                        collection: collection_id.to_string(),
                    });
                }
                self.subtree_end(target_idx, parent)
            }
            None => self.collections[target_idx].entry_ids.len(),
        };
        self.collections[target_idx]
            .entry_ids
            .insert(position, entry.id.clone());
        self.entries.insert(entry.id.clone(), entry);
        Ok(())
    }

    pub fn update_entry<F>(&mut self, entry_id: &str, mut f: F) -> Result<(), JournalError>
    where
        F: FnMut(&mut Entry),
    {
        let entry = self
            .entries
            .get_mut(entry_id)
            .ok_or_else(|| JournalError::EntryNotFound(entry_id.to_string()))?;
        if entry.locked {
            return Err(JournalError::EntryLocked(entry_id.to_string()));
        }
        f(entry);
        entry.updated_at = Utc::now();
        Ok(())
    }

    pub fn complete_entry(&mut self, entry_id: &str) -> Result<bool, JournalError> {
        let mut completed = false;
        self.update_entry(entry_id, |entry| {
            entry.completed = !entry.completed;
            completed = entry.completed;
        })?;
        Ok(completed)
    }

    pub fn strike_entry(&mut self, entry_id: &str) -> Result<bool, JournalError> {
        let mut struck = false;
        self.update_entry(entry_id, |entry| {
            entry.struck = !entry.struck;
            struck = entry.struck;
        })?;
        Ok(struck)
    }

    /// Locking bypasses the locked check so an entry can be unlocked again.
    pub fn toggle_lock(&mut self, entry_id: &str) -> Result<bool, JournalError> {
        let entry = self
            .entries
            .get_mut(entry_id)
            .ok_or_else(|| JournalError::EntryNotFound(entry_id.to_string()))?;
        entry.locked = !entry.locked;
        entry.updated_at = Utc::now();
        Ok(entry.locked)
    }

    /// Moves an entry and all of its descendants to the end of another
    /// collection. The moved entry becomes a root there.
    pub fn move_entry(&mut self, entry_id: &str, dest_collection_id: &str) -> Result<(), JournalError> {
        if !self.entries.contains_key(entry_id) {
            return Err(JournalError::EntryNotFound(entry_id.to_string()));
        }
        let dest_idx = self
            .find_collection_index(dest_collection_id)
            .ok_or_else(|| JournalError::CollectionNotFound(dest_collection_id.to_string()))?;
        let src_idx = self
            .find_entry_collection_index(entry_id)
            .ok_or_else(|| JournalError::EntryLocationMissing(entry_id.to_string()))?;
        if src_idx == dest_idx {
            return Ok(());
        }
        let subtree = self.subtree(src_idx, entry_id);
        self.collections[src_idx]
            .entry_ids
            .retain(|id| !subtree.contains(id));
        self.collections[dest_idx].entry_ids.extend(subtree);
        if let Some(entry) = self.entries.get_mut(entry_id) {
            entry.parent_id = None;
            entry.updated_at = Utc::now();
        }
        Ok(())
    }

    /// Removes an entry together with its descendants. Returns how many
    /// entries were removed.
    pub fn delete_entry(&mut self, entry_id: &str) -> Result<usize, JournalError> {
        let col_idx = self
            .find_entry_collection_index(entry_id)
            .ok_or_else(|| JournalError::EntryNotFound(entry_id.to_string()))?;
        let subtree = self.subtree(col_idx, entry_id);
        self.collections[col_idx]
            .entry_ids
            .retain(|id| !subtree.contains(id));
        for id in &subtree {
            self.entries.remove(id);
        }
        Ok(subtree.len())
    }

    /// Sections for the detail view, one per collection in journal order.
    pub fn sections(&self) -> Vec<Section> {
        self.build_sections(false)
    }

    /// Like [`Journal::sections`] but each text starts with the entry id, for
    /// output the user copies ids from.
    pub fn labeled_sections(&self) -> Vec<Section> {
        self.build_sections(true)
    }

    fn build_sections(&self, with_ids: bool) -> Vec<Section> {
        self.collections
            .iter()
            .map(|collection| {
                let items = collection
                    .entry_ids
                    .iter()
                    .filter_map(|id| self.entries.get(id))
                    .map(|entry| {
                        let text = if with_ids {
                            format!("[{}] {}", entry.id, entry.message)
                        } else {
                            entry.message.clone()
                        };
                        let item = Item::new(entry.id.clone(), text)
                            .with_category(entry.category())
                            .with_bullet(entry.bullet.glyph());
                        match &entry.parent_id {
                            Some(parent) => item.with_parent(parent.clone()),
                            None => item,
                        }
                    })
                    .collect();
                Section::new(collection.id.clone(), collection.title(), items)
            })
            .collect()
    }

    /// Ids of `root` and everything below it within one collection, in
    /// collection order.
    fn subtree(&self, col_idx: usize, root: &str) -> Vec<EntryId> {
        let mut members: HashSet<&str> = HashSet::new();
        members.insert(root);
        let mut ordered = Vec::new();
        for id in &self.collections[col_idx].entry_ids {
            let under = id == root || self.has_ancestor(id, &members);
            if under {
                members.insert(id.as_str());
                ordered.push(id.clone());
            }
        }
        // A child listed before its parent is still part of the subtree.
        for id in &self.collections[col_idx].entry_ids {
            if !members.contains(id.as_str()) && self.has_ancestor(id, &members) {
                ordered.push(id.clone());
            }
        }
        ordered
    }

    fn has_ancestor(&self, id: &str, members: &HashSet<&str>) -> bool {
        let mut seen = HashSet::new();
        let mut current = self.entries.get(id).and_then(|e| e.parent_id.as_deref());
        while let Some(parent) = current {
            if members.contains(parent) {
                return true;
            }
            if !seen.insert(parent) {
                return false;
            }
            current = self.entries.get(parent).and_then(|e| e.parent_id.as_deref());
        }
        false
    }

    fn subtree_end(&self, col_idx: usize, parent: &str) -> usize {
        let subtree = self.subtree(col_idx, parent);
        self.collections[col_idx]
            .entry_ids
            .iter()
            .rposition(|id| subtree.contains(id))
            .map(|pos| pos + 1)
            .unwrap_or(self.collections[col_idx].entry_ids.len())
    }
}
