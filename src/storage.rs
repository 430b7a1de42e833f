use crate::model::Journal;
use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const PROJECT_DIR: &str = ".daybook";
const JOURNAL_FILE: &str = "journal.yml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalScope {
    Project,
    Global,
}

impl JournalScope {
    pub fn label(&self) -> &'static str {
        match self {
            JournalScope::Project => "project",
            JournalScope::Global => "global",
        }
    }
}

#[derive(Debug, Clone)]
pub struct JournalLocation {
    pub path: PathBuf,
    pub scope: JournalScope,
}

pub fn init_project_journal(name: Option<String>) -> Result<JournalLocation> {
    let cwd = env::current_dir()?;
    init_journal_in(&cwd, name)
}

fn init_journal_in(root: &Path, name: Option<String>) -> Result<JournalLocation> {
    let dir = root.join(PROJECT_DIR);
    fs::create_dir_all(&dir).context("failed to create .daybook directory")?;
    let location = JournalLocation {
        path: dir.join(JOURNAL_FILE),
        scope: JournalScope::Project,
    };
    if !location.path.exists() {
        let journal_name = name.unwrap_or_else(|| {
            root.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("project")
                .to_string()
        });
        save_journal(&location, &Journal::default_named(journal_name))?;
        info!(path = %location.path.display(), "initialized project journal");
    }
    Ok(location)
}

pub fn locate_journal(start: &Path) -> Result<JournalLocation> {
    if let Some(project_path) = find_project_journal(start) {
        return Ok(JournalLocation {
            path: project_path,
            scope: JournalScope::Project,
        });
    }
    Ok(JournalLocation {
        path: global_journal_path()?,
        scope: JournalScope::Global,
    })
}

pub fn load_journal(location: &JournalLocation) -> Result<Journal> {
    if location.path.exists() {
        let data = fs::read_to_string(&location.path)
            .with_context(|| format!("reading {:?}", location.path))?;
        let journal: Journal = serde_yaml::from_str(&data).context("parsing journal file")?;
        debug!(
            path = %location.path.display(),
            collections = journal.collections.len(),
            entries = journal.entries.len(),
            "journal loaded"
        );
        Ok(journal)
    } else {
        let fallback_name = match location.scope {
            JournalScope::Project => location
                .path
                .parent()
                .and_then(|p| p.parent())
                .and_then(|p| p.file_name())
                .and_then(|n| n.to_str())
                .unwrap_or("project")
                .to_string(),
            JournalScope::Global => "default".to_string(),
        };
        let journal = Journal::default_named(fallback_name);
        save_journal(location, &journal)?;
        Ok(journal)
    }
}

pub fn save_journal(location: &JournalLocation, journal: &Journal) -> Result<()> {
    if let Some(parent) = location.path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("creating {:?}", parent))?;
    }
    let serialized = serde_yaml::to_string(journal).context("serializing journal")?;
    fs::write(&location.path, serialized)
        .with_context(|| format!("writing {:?}", location.path))?;
    debug!(path = %location.path.display(), "journal saved");
    Ok(())
}

fn find_project_journal(start: &Path) -> Option<PathBuf> {
    let mut dir = Some(start);
    while let Some(current) = dir {
        let candidate = current.join(PROJECT_DIR).join(JOURNAL_FILE);
        if candidate.exists() {
            return Some(candidate);
        }
        dir = current.parent();
    }
    None
}

pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("", "", "daybook").context("locating data directory")
}

fn global_journal_path() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().join(JOURNAL_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Bullet, Entry};

    #[test]
    fn init_creates_default_journal_once() {
        let dir = tempfile::tempdir().unwrap();
        let location = init_journal_in(dir.path(), Some("notes".into())).unwrap();
        assert_eq!(location.scope, JournalScope::Project);
        let journal = load_journal(&location).unwrap();
        assert_eq!(journal.name, "notes");
        assert_eq!(journal.collections.len(), 2);

        let again = init_journal_in(dir.path(), Some("other".into())).unwrap();
        assert_eq!(load_journal(&again).unwrap().name, "notes");
    }

    #[test]
    fn project_journal_is_found_from_subdirectories() {
        let dir = tempfile::tempdir().unwrap();
        init_journal_in(dir.path(), None).unwrap();
        let nested = dir.path().join("a").join("b");
        fs::create_dir_all(&nested).unwrap();
        let found = locate_journal(&nested).unwrap();
        assert_eq!(found.scope, JournalScope::Project);
        assert!(found.path.starts_with(dir.path()));
    }

    #[test]
    fn save_and_load_keep_tree_and_flags() {
        let dir = tempfile::tempdir().unwrap();
        let location = init_journal_in(dir.path(), None).unwrap();
        let mut journal = load_journal(&location).unwrap();
        journal
            .add_entry(Entry::new("p".into(), "plan trip".into(), Bullet::Task, None), "inbox")
            .unwrap();
        journal
            .add_entry(
                Entry::new("c".into(), "book hotel".into(), Bullet::Note, Some("p".into())),
                "inbox",
            )
            .unwrap();
        journal.toggle_lock("c").unwrap();
        save_journal(&location, &journal).unwrap();

        let loaded = load_journal(&location).unwrap();
        let child = &loaded.entries["c"];
        assert_eq!(child.parent_id.as_deref(), Some("p"));
        assert_eq!(child.bullet, Bullet::Note);
        assert!(child.locked);
        assert_eq!(loaded.collections[0].entry_ids, vec!["p", "c"]);
    }
}
