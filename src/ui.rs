use crate::commands::{generate_id, today};
use crate::config::Config;
use crate::detail::DetailView;
use crate::model::{Bullet, Entry, Journal};
use crate::storage::{save_journal, JournalLocation};
use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use unicode_segmentation::UnicodeSegmentation;

pub fn run(journal: Journal, location: JournalLocation, config: Config) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(journal, location, config);
    info!(path = %app.location.path.display(), "tui started");
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    journal: Journal,
    location: JournalLocation,
    config: Config,
    view: DetailView,
    pane_height: usize,
    last_save: Instant,
    status: String,
    mode: Mode,
}

enum Mode {
    Normal,
    Adding {
        collection_id: String,
        parent_id: Option<String>,
        form: EntryForm,
    },
    Editing {
        entry_id: String,
        form: EntryForm,
    },
    ConfirmDelete {
        entry_id: String,
    },
}

struct EntryForm {
    message: FieldValue,
    bullet: Bullet,
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        self.cursor = prev_grapheme(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        self.cursor = next_grapheme(self.cursor, &self.value);
    }

    fn home(&mut self) {
        self.cursor = 0;
    }

    fn end(&mut self) {
        self.cursor = self.value.len();
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_grapheme(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

impl EntryForm {
    fn new(bullet: Bullet) -> Self {
        EntryForm {
            message: FieldValue::new(""),
            bullet,
        }
    }

    fn from_entry(entry: &Entry) -> Self {
        EntryForm {
            message: FieldValue::new(&entry.message),
            bullet: entry.bullet,
        }
    }

    fn next_bullet(&mut self) {
        self.bullet = match self.bullet {
            Bullet::Task => Bullet::Note,
            Bullet::Note => Bullet::Event,
            Bullet::Event => Bullet::Task,
        };
    }
}

impl App {
    fn new(journal: Journal, location: JournalLocation, config: Config) -> Self {
        let status = format!("Loaded journal from {}", location.path.display());
        let mut view = DetailView::new(config.detail_style());
        view.set_sections(journal.sections());
        App {
            journal,
            location,
            config,
            view,
            pane_height: 0,
            last_save: Instant::now(),
            status,
            mode: Mode::Normal,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Adding { .. } | Mode::Editing { .. } => self.handle_form_key(key),
            Mode::ConfirmDelete { .. } => self.handle_confirm_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('j') | KeyCode::Down => {
                self.view.move_item(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.view.move_item(-1);
            }
            KeyCode::Char('J') | KeyCode::Tab => {
                self.view.move_section(1);
            }
            KeyCode::Char('K') | KeyCode::BackTab => {
                self.view.move_section(-1);
            }
            KeyCode::Char('g') => self.view.scroll_to_top(),
            KeyCode::Char('r') => {
                if let Some(id) = self.view.active_collection_id().map(str::to_string) {
                    let height = self.pane_height;
                    self.view
                        .reveal_collection(&id, self.config.reveal_full, height);
                }
            }
            KeyCode::Char(' ') => self.fold_active(None),
            KeyCode::Char('Z') => self.fold_active(Some(true)),
            KeyCode::Char('U') => self.fold_active(Some(false)),
            KeyCode::Char('x') => {
                if let Some(id) = self.active_entry() {
                    match self.journal.complete_entry(&id) {
                        Ok(done) => {
                            let verb = if done { "Completed" } else { "Reopened" };
                            self.persist(format!("{} {}", verb, id), Some(id.as_str()))?;
                        }
                        Err(err) => self.status = format!("Could not complete: {}", err),
                    }
                }
            }
            KeyCode::Char('s') => {
                if let Some(id) = self.active_entry() {
                    match self.journal.strike_entry(&id) {
                        Ok(struck) => {
                            let verb = if struck { "Struck" } else { "Restored" };
                            self.persist(format!("{} {}", verb, id), Some(id.as_str()))?;
                        }
                        Err(err) => self.status = format!("Could not strike: {}", err),
                    }
                }
            }
            KeyCode::Char('L') => {
                if let Some(id) = self.active_entry() {
                    match self.journal.toggle_lock(&id) {
                        Ok(locked) => {
                            let verb = if locked { "Locked" } else { "Unlocked" };
                            self.persist(format!("{} {}", verb, id), Some(id.as_str()))?;
                        }
                        Err(err) => self.status = format!("Could not lock: {}", err),
                    }
                }
            }
            KeyCode::Char('n') => {
                let parent_id = self
                    .active_entry()
                    .and_then(|id| self.journal.entries.get(&id))
                    .and_then(|entry| entry.parent_id.clone());
                let collection_id = match self.view.active_collection_id() {
                    Some(id) => id.to_string(),
                    None => self.journal.ensure_collection(&today()),
                };
                self.mode = Mode::Adding {
                    collection_id,
                    parent_id,
                    form: EntryForm::new(Bullet::Task),
                };
            }
            KeyCode::Char('a') => {
                let parent = self.active_entry();
                if let (Some(parent_id), Some(collection_id)) =
                    (parent, self.view.active_collection_id())
                {
                    self.mode = Mode::Adding {
                        collection_id: collection_id.to_string(),
                        parent_id: Some(parent_id),
                        form: EntryForm::new(Bullet::Task),
                    };
                } else {
                    self.status = "Select an entry to nest under".into();
                }
            }
            KeyCode::Char('e') => {
                if let Some(id) = self.active_entry() {
                    match self.journal.entries.get(&id) {
                        Some(entry) if entry.locked => {
                            self.status = format!("Entry {} is locked", id);
                        }
                        Some(entry) => {
                            self.mode = Mode::Editing {
                                form: EntryForm::from_entry(entry),
                                entry_id: id,
                            };
                        }
                        None => {}
                    }
                }
            }
            KeyCode::Char('d') => {
                if let Some(entry_id) = self.active_entry() {
                    self.mode = Mode::ConfirmDelete { entry_id };
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let close_form = match key.code {
            KeyCode::Esc => {
                self.status = "Canceled".into();
                true
            }
            KeyCode::Enter => self.try_submit(&mode)?,
            _ => {
                if let Mode::Adding { form, .. } | Mode::Editing { form, .. } = &mut mode {
                    edit_form(form, key);
                }
                false
            }
        };
        self.mode = if close_form { Mode::Normal } else { mode };
        Ok(false)
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<bool> {
        let entry_id = match &self.mode {
            Mode::ConfirmDelete { entry_id } => entry_id.clone(),
            _ => return Ok(false),
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                match self.journal.delete_entry(&entry_id) {
                    Ok(removed) => {
                        self.persist(format!("Deleted {} ({} removed)", entry_id, removed), None)?
                    }
                    Err(err) => self.status = format!("Delete failed: {}", err),
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Delete canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
        Ok(false)
    }

    /// Returns whether the form should close.
    fn try_submit(&mut self, mode: &Mode) -> Result<bool> {
        match mode {
            Mode::Adding {
                collection_id,
                parent_id,
                form,
            } => {
                let message = form.message.value.trim().to_string();
                if message.is_empty() {
                    self.status = "Message must not be empty".into();
                    return Ok(false);
                }
                let id = generate_id(&self.journal);
                let entry = Entry::new(id.clone(), message, form.bullet, parent_id.clone());
                match self.journal.add_entry(entry, collection_id) {
                    Ok(()) => {
                        self.persist(format!("Added {}", id), Some(id.as_str()))?;
                        Ok(true)
                    }
                    Err(err) => {
                        self.status = format!("Could not add: {}", err);
                        Ok(false)
                    }
                }
            }
            Mode::Editing { entry_id, form } => {
                let message = form.message.value.trim().to_string();
                if message.is_empty() {
                    self.status = "Message must not be empty".into();
                    return Ok(false);
                }
                let bullet = form.bullet;
                let result = self.journal.update_entry(entry_id, |entry| {
                    entry.message = message.clone();
                    entry.bullet = bullet;
                });
                match result {
                    Ok(()) => {
                        self.persist(format!("Updated {}", entry_id), Some(entry_id.as_str()))?;
                        Ok(true)
                    }
                    Err(err) => {
                        self.status = format!("Could not edit: {}", err);
                        Ok(false)
                    }
                }
            }
            Mode::ConfirmDelete { .. } | Mode::Normal => Ok(true),
        }
    }

    fn fold_active(&mut self, collapsed: Option<bool>) {
        let Some(id) = self.active_entry() else {
            return;
        };
        let section = self.view.cursor().section;
        if !self.view.has_children(section, &id) {
            self.status = format!("{} has no children", id);
            return;
        }
        self.view.toggle_fold(&id, collapsed);
        self.status = if self.view.is_folded(&id) {
            format!("Folded {}", id)
        } else {
            format!("Unfolded {}", id)
        };
    }

    fn active_entry(&self) -> Option<String> {
        self.view.active_entry_id().map(str::to_string)
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(5),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);
        self.draw_detail(f, layout[1]);
        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::Adding {
                parent_id, form, ..
            } => {
                let title = if parent_id.is_some() {
                    "New Child Entry"
                } else {
                    "New Entry"
                };
                self.draw_form(f, title, form)
            }
            Mode::Editing { form, .. } => self.draw_form(f, "Edit Entry", form),
            Mode::ConfirmDelete { entry_id } => self.draw_confirm(f, entry_id),
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let title = Line::from(vec![
            Span::styled(
                "daybook ",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                self.journal.name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  •  "),
            Span::styled(
                self.location.scope.label(),
                Style::default().fg(Color::Green),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("{}", self.location.path.display()),
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  •  "),
            Span::styled(
                format!("saved {}", format_elapsed(self.last_save)),
                Style::default().fg(Color::Gray),
            ),
        ]);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_detail(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(Span::styled(
                "Collections",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
        let inner = block.inner(area);
        f.render_widget(block, area);

        let width = match self.config.wrap_width {
            0 => inner.width as usize,
            configured => configured,
        };
        self.view.set_wrap_width(width);
        self.pane_height = inner.height as usize;

        if self.view.sections().is_empty() {
            let empty = Paragraph::new("No collections yet. Press n to add an entry.")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center);
            f.render_widget(empty, inner);
            return;
        }
        let frame = self.view.viewport(self.pane_height);
        f.render_widget(Paragraph::new(frame.lines), inner);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help_bar = Paragraph::new(footer_help_line())
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(help_bar, rows[0]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, rows[1]);
    }

    fn draw_form(&self, f: &mut ratatui::Frame<'_>, title: &str, form: &EntryForm) {
        let area = centered_rect(70, 30, f.size());
        let label_style = Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::BOLD | Modifier::DIM);
        let body = vec![
            Line::from(vec![
                Span::styled("Kind: ", label_style),
                Span::styled(
                    format!("{} {:?}", form.bullet.glyph(), form.bullet),
                    Style::default().fg(Color::LightMagenta),
                ),
            ]),
            Line::from(vec![
                Span::styled("Message: ", label_style),
                Span::styled(form.message.with_caret(), Style::default().fg(Color::Cyan)),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to save • Esc to cancel • Tab to change kind",
                Style::default().fg(Color::Gray),
            )),
        ];
        let dialog = Paragraph::new(body)
            .block(
                Block::default()
                    .title(Span::styled(
                        title.to_string(),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .wrap(Wrap { trim: true });

        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, entry_id: &str) {
        let area = centered_rect(50, 30, f.size());
        let message = self
            .journal
            .entries
            .get(entry_id)
            .map(|e| e.message.clone())
            .unwrap_or_else(|| entry_id.to_string());
        let body = vec![
            Line::from(Span::styled(
                format!("Delete \"{}\" and its children?", message),
                Style::default()
                    .fg(Color::LightRed)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press y to confirm, n or Esc to cancel"),
        ];
        let dialog = Paragraph::new(body)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .title(Span::styled(
                        "Confirm Delete",
                        Style::default()
                            .fg(Color::LightRed)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::LightRed)),
            );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    /// Saves, rebuilds every section and puts the cursor on `select` when
    /// it still exists.
    fn persist(&mut self, message: impl Into<String>, select: Option<&str>) -> Result<()> {
        save_journal(&self.location, &self.journal)?;
        self.last_save = Instant::now();
        self.status = message.into();
        self.view.set_sections(self.journal.sections());
        if let Some(entry_id) = select {
            match self.journal.find_entry_collection_index(entry_id) {
                Some(idx) => {
                    let collection_id = self.journal.collections[idx].id.clone();
                    self.view.set_active(&collection_id, entry_id);
                }
                None => warn!(id = entry_id, "saved entry has no collection"),
            }
        }
        debug!(status = %self.status, "journal persisted");
        Ok(())
    }
}

fn edit_form(form: &mut EntryForm, key: KeyEvent) {
    let field = &mut form.message;
    match key.code {
        KeyCode::Tab => form.next_bullet(),
        KeyCode::Left => field.move_left(),
        KeyCode::Right => field.move_right(),
        KeyCode::Home => field.home(),
        KeyCode::End => field.end(),
        KeyCode::Backspace => field.backspace(),
        KeyCode::Char(c) => {
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
            {
                field.insert_char(c);
            }
        }
        _ => {}
    }
}

fn footer_help_line() -> Line<'static> {
    let key = |k: &'static str, color: Color| Span::styled(k, Style::default().fg(color));
    Line::from(vec![
        key("j/k", Color::LightCyan),
        Span::raw(" move  "),
        key("J/K", Color::LightCyan),
        Span::raw(" collection  "),
        key("space", Color::LightGreen),
        Span::raw(" fold  "),
        key("Z/U", Color::LightGreen),
        Span::raw(" collapse/expand  "),
        key("x", Color::LightYellow),
        Span::raw(" done  "),
        key("s", Color::LightYellow),
        Span::raw(" strike  "),
        key("L", Color::LightYellow),
        Span::raw(" lock  "),
        key("n/a", Color::LightMagenta),
        Span::raw(" new/child  "),
        key("e", Color::LightYellow),
        Span::raw(" edit  "),
        key("d", Color::LightRed),
        Span::raw(" delete  "),
        key("g/r", Color::LightCyan),
        Span::raw(" top/reveal  "),
        key("q", Color::LightRed),
        Span::raw(" quit"),
    ])
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

fn prev_grapheme(cursor: usize, text: &str) -> usize {
    text.grapheme_indices(true)
        .map(|(idx, _)| idx)
        .take_while(|idx| *idx < cursor)
        .last()
        .unwrap_or(0)
}

fn next_grapheme(cursor: usize, text: &str) -> usize {
    text.grapheme_indices(true)
        .map(|(idx, _)| idx)
        .find(|idx| *idx > cursor)
        .unwrap_or(text.len())
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::JournalScope;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE)).unwrap();
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    fn app_in(dir: &tempfile::TempDir) -> App {
        let location = JournalLocation {
            path: dir.path().join("journal.yml"),
            scope: JournalScope::Project,
        };
        let mut journal = Journal::default_named("test");
        journal
            .add_entry(Entry::new("p1".into(), "plan trip".into(), Bullet::Task, None), "inbox")
            .unwrap();
        App::new(journal, location, Config::default())
    }

    #[test]
    fn adding_a_child_selects_it_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        assert_eq!(app.view.active_entry_id(), Some("p1"));

        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "book hotel");
        press(&mut app, KeyCode::Enter);

        assert!(matches!(app.mode, Mode::Normal));
        let child = app.view.active_entry_id().unwrap().to_string();
        assert_ne!(child, "p1");
        assert_eq!(
            app.journal.entries[&child].parent_id.as_deref(),
            Some("p1")
        );
        assert!(app.location.path.exists());
    }

    #[test]
    fn folding_the_parent_hides_the_child() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        press(&mut app, KeyCode::Char('a'));
        type_text(&mut app, "book hotel");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Char('Z'));
        assert!(app.status.ends_with("has no children"));

        press(&mut app, KeyCode::Char('k'));
        assert_eq!(app.view.active_entry_id(), Some("p1"));
        press(&mut app, KeyCode::Char(' '));
        assert!(app.view.is_folded("p1"));
        press(&mut app, KeyCode::Char('j'));
        assert_eq!(app.view.active_entry_id(), Some("p1"));
    }

    #[test]
    fn locked_entries_cannot_be_edited() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        press(&mut app, KeyCode::Char('L'));
        assert!(app.journal.entries["p1"].locked);
        press(&mut app, KeyCode::Char('e'));
        assert!(matches!(app.mode, Mode::Normal));
        press(&mut app, KeyCode::Char('x'));
        assert!(!app.journal.entries["p1"].completed);
        assert!(app.status.starts_with("Could not complete"));
    }

    #[test]
    fn delete_asks_first() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_in(&dir);
        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Esc);
        assert!(app.journal.entries.contains_key("p1"));

        press(&mut app, KeyCode::Char('d'));
        press(&mut app, KeyCode::Char('y'));
        assert!(app.journal.entries.is_empty());
        assert_eq!(app.view.active_entry_id(), None);
    }

    #[test]
    fn grapheme_steps_skip_combining_marks() {
        let text = "e\u{301}x";
        assert_eq!(next_grapheme(0, text), 3);
        assert_eq!(prev_grapheme(3, text), 0);
        assert_eq!(next_grapheme(3, text), 4);
        assert_eq!(prev_grapheme(0, text), 0);
    }
}
