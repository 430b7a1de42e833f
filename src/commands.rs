use crate::cli::Kind;
use crate::config::Config;
use crate::detail::{DetailView, DEFAULT_WRAP_WIDTH};
use crate::model::{Bullet, Entry, Journal};
use crate::storage::{init_project_journal, load_journal, locate_journal, save_journal, JournalLocation};
use crate::ui;
use anyhow::{bail, Context, Result};
use chrono::Local;
use rand::{distributions::Alphanumeric, Rng};
use std::env;
use tracing::info;

pub fn init(name: Option<String>) -> Result<()> {
    let location = init_project_journal(name)?;
    println!("Initialized journal at {}", location.path.display());
    Ok(())
}

pub fn list(config: &Config, collection: Option<String>, width: Option<usize>) -> Result<()> {
    let (journal, location) = load_current_journal()?;
    println!("Journal: {} ({})", journal.name, location.scope.label());

    let mut sections = journal.labeled_sections();
    if let Some(ref filter) = collection {
        sections.retain(|section| &section.id == filter);
        if sections.is_empty() {
            bail!("collection {} not found", filter);
        }
    }

    let mut view = DetailView::new(config.detail_style());
    view.set_focused(false);
    view.set_wrap_width(width.unwrap_or(match config.wrap_width {
        0 => DEFAULT_WRAP_WIDTH,
        configured => configured,
    }));
    view.set_sections(sections);
    let total = view.total_lines();
    let frame = view.viewport(total);
    println!("{}", frame.text());
    Ok(())
}

pub fn add(message: String, collection: Option<String>, parent: Option<String>, kind: Kind) -> Result<()> {
    let (mut journal, location) = load_current_journal()?;
    let collection_id = match (&parent, collection) {
        (_, Some(name)) => journal.ensure_collection(&name),
        (Some(parent_id), None) => {
            let idx = journal
                .find_entry_collection_index(parent_id)
                .with_context(|| format!("parent entry {} not found", parent_id))?;
            journal.collections[idx].id.clone()
        }
        (None, None) => journal.ensure_collection(&today()),
    };
    let id = generate_id(&journal);
    let entry = Entry::new(id.clone(), message, bullet_for(kind), parent);
    journal
        .add_entry(entry, &collection_id)
        .with_context(|| format!("adding entry to {}", collection_id))?;
    save_journal(&location, &journal)?;
    info!(id = %id, collection = %collection_id, "entry added");
    println!("Added entry {} to {}", id, collection_id);
    Ok(())
}

pub fn complete(entry_id: String) -> Result<()> {
    let (mut journal, location) = load_current_journal()?;
    let done = journal
        .complete_entry(&entry_id)
        .with_context(|| format!("completing entry {}", entry_id))?;
    save_journal(&location, &journal)?;
    println!(
        "Entry {} {}",
        entry_id,
        if done { "completed" } else { "reopened" }
    );
    Ok(())
}

pub fn strike(entry_id: String) -> Result<()> {
    let (mut journal, location) = load_current_journal()?;
    let struck = journal
        .strike_entry(&entry_id)
        .with_context(|| format!("striking entry {}", entry_id))?;
    save_journal(&location, &journal)?;
    println!(
        "Entry {} {}",
        entry_id,
        if struck { "struck" } else { "restored" }
    );
    Ok(())
}

pub fn lock(entry_id: String) -> Result<()> {
    let (mut journal, location) = load_current_journal()?;
    let locked = journal
        .toggle_lock(&entry_id)
        .with_context(|| format!("locking entry {}", entry_id))?;
    save_journal(&location, &journal)?;
    println!(
        "Entry {} {}",
        entry_id,
        if locked { "locked" } else { "unlocked" }
    );
    Ok(())
}

pub fn edit(entry_id: String, message: String) -> Result<()> {
    if message.trim().is_empty() {
        bail!("message must not be empty");
    }
    let (mut journal, location) = load_current_journal()?;
    journal
        .update_entry(&entry_id, |entry| entry.message = message.clone())
        .with_context(|| format!("editing entry {}", entry_id))?;
    save_journal(&location, &journal)?;
    println!("Updated entry {}", entry_id);
    Ok(())
}

pub fn move_entry(entry_id: String, collection: String) -> Result<()> {
    let (mut journal, location) = load_current_journal()?;
    let collection_id = journal.ensure_collection(&collection);
    journal
        .move_entry(&entry_id, &collection_id)
        .with_context(|| format!("moving entry {} to {}", entry_id, collection_id))?;
    save_journal(&location, &journal)?;
    info!(id = %entry_id, collection = %collection_id, "entry moved");
    println!("Moved entry {} to {}", entry_id, collection_id);
    Ok(())
}

pub fn delete(entry_id: String) -> Result<()> {
    let (mut journal, location) = load_current_journal()?;
    let removed = journal
        .delete_entry(&entry_id)
        .with_context(|| format!("deleting entry {}", entry_id))?;
    save_journal(&location, &journal)?;
    info!(id = %entry_id, removed, "entry deleted");
    println!("Deleted entry {} ({} removed)", entry_id, removed);
    Ok(())
}

pub fn tui(config: Config) -> Result<()> {
    let (journal, location) = load_current_journal()?;
    ui::run(journal, location, config)
}

fn load_current_journal() -> Result<(Journal, JournalLocation)> {
    let cwd = env::current_dir()?;
    let location = locate_journal(&cwd)?;
    let journal = load_journal(&location)?;
    Ok((journal, location))
}

/// Name of today's daily collection.
pub fn today() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

pub fn bullet_for(kind: Kind) -> Bullet {
    match kind {
        Kind::Task => Bullet::Task,
        Kind::Note => Bullet::Note,
        Kind::Event => Bullet::Event,
    }
}

/// Six random alphanumerics not already used by an entry.
pub fn generate_id(journal: &Journal) -> String {
    loop {
        let id: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(6)
            .map(char::from)
            .collect();
        if !journal.entries.contains_key(&id) {
            return id;
        }
    }
}
