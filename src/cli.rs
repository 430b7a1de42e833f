use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "daybook", version, about = "Terminal journal of nested tasks, notes and events")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Task,
    Note,
    Event,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a project journal in the current directory
    Init {
        /// Optional journal name
        #[arg(long)]
        name: Option<String>,
    },
    /// Print collections and their entries
    List {
        /// Only this collection id
        #[arg(long)]
        collection: Option<String>,
        /// Wrap entry text to this many columns
        #[arg(long)]
        width: Option<usize>,
    },
    /// Add a new entry
    Add {
        /// Entry text
        message: String,
        /// Collection name (defaults to today's daily log)
        #[arg(long, short = 'c')]
        collection: Option<String>,
        /// Parent entry id; the entry is nested beneath it
        #[arg(long, short = 'p')]
        parent: Option<String>,
        /// Kind of entry
        #[arg(long, value_enum, default_value_t = Kind::Task)]
        kind: Kind,
    },
    /// Toggle the completed flag of an entry
    Complete {
        entry_id: String,
    },
    /// Toggle the struck-through flag of an entry
    Strike {
        entry_id: String,
    },
    /// Toggle the lock on an entry; locked entries cannot be changed
    Lock {
        entry_id: String,
    },
    /// Edit the text of an entry
    Edit {
        entry_id: String,
        /// New text
        #[arg(long)]
        message: String,
    },
    /// Move an entry and its children to another collection
    Move {
        entry_id: String,
        /// Destination collection name, created if missing
        collection: String,
    },
    /// Delete an entry and its children
    Delete {
        entry_id: String,
    },
    /// Launch the interactive TUI
    Tui,
}
