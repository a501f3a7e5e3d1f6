//! Main application logic for the terminal user interface.
//!
//! This module contains the `App` struct which manages the TUI state,
//! handles user input, renders the interface, and coordinates between
//! the two screens (task list and field settings) and their dialogs.

use std::io;
use std::time::Duration;

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Clear, List, ListItem, ListState, Paragraph, Row, Table, TableState, Wrap},
    Frame, Terminal,
};

use crate::{
    api::TaskBackend,
    fields::FieldConfig,
    form::{ControlKind, TaskForm},
    shell::{Route, Shell},
    table::{Column, RowAction, TaskTable},
    task::Task,
    tui::{
        colors::{DARK_PURPLE, DARK_RED, GOLD, SETTINGS_GREEN, TASKS_BLUE},
        enums::{AppState, InputMode, PendingAction},
        input::InputField,
        settings::SettingsScreen,
        task_form::FormDialog,
        utils::centered_rect,
    },
};

/// Main application state for the terminal user interface.
///
/// Owns the shell (task list, route, edit dialog), the shared field
/// configuration, the table view state and the settings editor.
pub struct App<'a> {
    backend: &'a dyn TaskBackend,
    state: AppState,
    shell: Shell,
    fields: FieldConfig,
    table: TaskTable,
    task_list_state: TableState,
    selected_column: usize,
    search: InputField,
    input_mode: InputMode,
    form: Option<FormDialog>,
    settings: SettingsScreen,
    confirm_action: Option<PendingAction>,
    ack_message: Option<String>,
    status_message: String,
}

impl<'a> App<'a> {
    pub fn new(backend: &'a dyn TaskBackend, organization_id: &str) -> Self {
        App {
            backend,
            state: AppState::Main,
            shell: Shell::new(organization_id),
            fields: FieldConfig::default(),
            table: TaskTable::default(),
            task_list_state: TableState::default(),
            selected_column: 0,
            search: InputField::new(),
            input_mode: InputMode::None,
            form: None,
            settings: SettingsScreen::new(),
            confirm_action: None,
            ack_message: None,
            status_message: String::new(),
        }
    }

    /// Fetch the field configuration and the task list.
    pub fn load(&mut self) {
        self.reload_fields();
        self.refresh_tasks();
    }

    /// Refetch the shared field configuration. The table starts over with the
    /// configured column order and an empty query.
    fn reload_fields(&mut self) {
        if let Err(e) = self.fields.load(self.backend) {
            self.set_status_message(format!("Failed to load form settings: {}", e));
        }
        self.table = TaskTable::new(self.fields.fields());
        self.search.clear();
        self.selected_column = 0;
        self.sync_selection();
    }

    fn refresh_tasks(&mut self) {
        match self.shell.refresh(self.backend) {
            Ok(()) => self.set_status_message(format!("Loaded {} task(s)", self.shell.tasks().len())),
            Err(e) => self.set_status_message(format!("Failed to fetch tasks: {}", e)),
        }
        self.sync_selection();
    }

    /// Set a status message to display in the status bar.
    fn set_status_message(&mut self, msg: String) {
        self.status_message = msg;
    }

    fn clear_status_message(&mut self) {
        self.status_message.clear();
    }

    /// Keep the row and column cursors inside the current page.
    fn sync_selection(&mut self) {
        let (rows, columns) = {
            let view = self.table.view(self.shell.tasks());
            (view.rows.len(), view.columns.len())
        };
        if rows == 0 {
            self.task_list_state.select(None);
        } else {
            let row = self.task_list_state.selected().unwrap_or(0).min(rows - 1);
            self.task_list_state.select(Some(row));
        }
        self.selected_column = self.selected_column.min(columns.saturating_sub(1));
    }

    /// The task on the highlighted row of the current page.
    fn selected_task(&self) -> Option<Task> {
        let view = self.table.view(self.shell.tasks());
        self.task_list_state
            .selected()
            .and_then(|i| view.rows.get(i))
            .map(|task| (*task).clone())
    }

    fn route_color(&self) -> Color {
        match self.shell.route() {
            Route::Tasks => TASKS_BLUE,
            Route::FieldSettings => SETTINGS_GREEN,
        }
    }

    fn navigate(&mut self, route: Route) {
        if route == self.shell.route() {
            return;
        }
        self.shell.navigate(route);
        match route {
            Route::Tasks => self.reload_fields(),
            Route::FieldSettings => {
                if let Err(e) = self.settings.load(self.backend) {
                    self.set_status_message(format!("Failed to load form settings: {}", e));
                }
            }
        }
    }

    fn open_add_form(&mut self) {
        self.shell.open_add();
        self.form = Some(FormDialog::new(TaskForm::new(self.fields.fields())));
        self.state = AppState::TaskForm;
    }

    fn open_edit_form(&mut self, task: &Task) {
        self.shell.begin_edit(task);
        self.form = Some(FormDialog::new(TaskForm::for_task(self.fields.fields(), task)));
        self.state = AppState::TaskForm;
    }

    fn close_form(&mut self) {
        self.shell.cancel_edit();
        self.form = None;
        self.state = AppState::Main;
    }

    fn submit_form(&mut self) {
        let today = Local::now().date_naive();
        let Some(dialog) = self.form.as_mut() else {
            return;
        };
        let edit = dialog.form.is_edit();
        if let Err(e) = dialog.commit(today) {
            self.set_status_message(format!("{}", e));
            return;
        }
        match self.shell.submit_form(self.backend, &mut dialog.form) {
            Ok(()) => {
                self.form = None;
                self.state = AppState::Main;
                self.set_status_message(if edit { "Task updated".into() } else { "Task added".into() });
                self.sync_selection();
            }
            Err(e) => self.set_status_message(format!("Failed to save task: {}", e)),
        }
    }

    fn run_row_action(&mut self, action: RowAction) {
        let Some(task) = self.selected_task() else {
            self.set_status_message("No task selected".to_string());
            return;
        };
        match action {
            RowAction::Edit => self.open_edit_form(&task),
            RowAction::Delete => {
                self.confirm_action = Some(PendingAction::DeleteTask(task));
                self.state = AppState::Confirm;
            }
        }
    }

    fn execute_pending(&mut self, action: PendingAction) {
        match action {
            PendingAction::DeleteTask(task) => {
                match self.shell.delete_task(self.backend, &task, &mut true) {
                    Ok(true) => self.set_status_message(format!("Deleted task \"{}\"", task.display_name())),
                    Ok(false) => self.set_status_message("Task has no id; nothing deleted".to_string()),
                    Err(e) => self.set_status_message(format!("Failed to delete task: {}", e)),
                }
                self.sync_selection();
            }
            PendingAction::DeleteField { id, label } => {
                if self.settings.remove_field(&id).is_some() {
                    self.set_status_message(format!("Removed field \"{}\" (press 'w' to save)", label));
                }
            }
        }
    }

    fn save_settings(&mut self) {
        let message = match self.settings.save(self.backend) {
            Ok(()) => "Settings saved!",
            Err(_) => "Failed to save.",
        };
        self.ack_message = Some(message.to_string());
        self.state = AppState::Ack;
    }

    /// Sort by the highlighted column, or run its row action.
    fn activate_column(&mut self) {
        match self.table.columns().get(self.selected_column) {
            Some(Column::Field { name, .. }) => {
                let name = name.clone();
                self.table.sort_by(&name);
            }
            Some(Column::Action(action)) => self.run_row_action(*action),
            None => {}
        }
    }

    /// Swap the highlighted field column with its neighbour.
    fn move_column(&mut self, right: bool) {
        let columns = self.table.columns();
        let target = if right {
            Some(self.selected_column + 1)
        } else {
            self.selected_column.checked_sub(1)
        };
        let from = columns.get(self.selected_column).and_then(Column::field_name);
        let to = target.and_then(|i| columns.get(i)).and_then(Column::field_name);
        if let (Some(from), Some(to), Some(target)) = (from, to, target) {
            self.table.reorder_columns(from, to);
            self.selected_column = target;
        }
    }

    fn change_page(&mut self, next: bool) {
        let total = self.table.view(self.shell.tasks()).total_pages;
        if next {
            self.table.next_page(total);
        } else {
            self.table.previous_page(total);
        }
        self.task_list_state.select(Some(0));
    }

    /// Handle keyboard input in the task list.
    ///
    /// Returns true if the application should quit.
    fn handle_task_list_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        if self.input_mode == InputMode::Text {
            self.handle_search_input(key);
            return Ok(false);
        }

        match key {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Char('2') => self.navigate(Route::FieldSettings),
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            KeyCode::Char('/') => {
                self.input_mode = InputMode::Text;
                self.search.active = true;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                let row = self.task_list_state.selected().unwrap_or(0);
                self.task_list_state.select(Some(row.saturating_sub(1)));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let row = self.task_list_state.selected().map_or(0, |r| r + 1);
                self.task_list_state.select(Some(row));
            }
            KeyCode::Left => self.selected_column = self.selected_column.saturating_sub(1),
            KeyCode::Right => self.selected_column += 1,
            KeyCode::Char('s') | KeyCode::Enter => self.activate_column(),
            KeyCode::Char('<') => self.move_column(false),
            KeyCode::Char('>') => self.move_column(true),
            KeyCode::Char('n') | KeyCode::PageDown => self.change_page(true),
            KeyCode::Char('p') | KeyCode::PageUp => self.change_page(false),
            KeyCode::Char('a') => self.open_add_form(),
            KeyCode::Char('e') => self.run_row_action(RowAction::Edit),
            KeyCode::Char('d') => self.run_row_action(RowAction::Delete),
            KeyCode::Char('r') => self.refresh_tasks(),
            _ => {}
        }
        Ok(false)
    }

    /// Typing into the search box filters as you type.
    fn handle_search_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.search.clear();
                self.input_mode = InputMode::None;
                self.search.active = false;
            }
            KeyCode::Enter => {
                self.input_mode = InputMode::None;
                self.search.active = false;
            }
            KeyCode::Backspace => self.search.handle_backspace(),
            KeyCode::Delete => self.search.handle_delete(),
            KeyCode::Left => self.search.move_cursor_left(),
            KeyCode::Right => self.search.move_cursor_right(),
            KeyCode::Home => self.search.move_cursor_home(),
            KeyCode::End => self.search.move_cursor_end(),
            KeyCode::Char(c) => self.search.handle_char(c),
            _ => return,
        }
        self.table.search(&self.search.value);
    }

    /// Handle keyboard input on the field settings screen.
    ///
    /// Returns true if the application should quit.
    fn handle_settings_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        if self.settings.is_adding() {
            self.handle_settings_add_input(key);
            return Ok(false);
        }

        match key {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Char('1') | KeyCode::Esc => self.navigate(Route::Tasks),
            KeyCode::Char('h') | KeyCode::F(1) => self.state = AppState::Help,
            KeyCode::Up | KeyCode::Char('k') => self.settings.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.settings.select_next(),
            KeyCode::Char('K') => {
                self.settings.move_selected(true);
            }
            KeyCode::Char('J') => {
                self.settings.move_selected(false);
            }
            KeyCode::Char('a') => self.settings.start_adding(),
            KeyCode::Tab => self.settings.cycle_type(),
            KeyCode::Char('d') => {
                let selected = self.settings.selected_field().map(|f| (f.id.clone(), f.label.clone()));
                match selected {
                    Some((Some(id), label)) => {
                        self.confirm_action = Some(PendingAction::DeleteField { id, label });
                        self.state = AppState::Confirm;
                    }
                    Some((None, _)) => self.set_status_message("Field has no id; cannot delete".to_string()),
                    None => {}
                }
            }
            KeyCode::Char('w') => self.save_settings(),
            KeyCode::Char('r') => {
                if let Err(e) = self.settings.load(self.backend) {
                    self.set_status_message(format!("Failed to load form settings: {}", e));
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_settings_add_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.settings.stop_adding(),
            KeyCode::Enter => match self.settings.add_field() {
                Ok(label) => {
                    self.settings.stop_adding();
                    self.set_status_message(format!("Added field \"{}\" (press 'w' to save)", label));
                }
                Err(e) => self.set_status_message(format!("{}", e)),
            },
            KeyCode::Tab => self.settings.cycle_type(),
            KeyCode::Backspace => self.settings.label.handle_backspace(),
            KeyCode::Delete => self.settings.label.handle_delete(),
            KeyCode::Left => self.settings.label.move_cursor_left(),
            KeyCode::Right => self.settings.label.move_cursor_right(),
            KeyCode::Home => self.settings.label.move_cursor_home(),
            KeyCode::End => self.settings.label.move_cursor_end(),
            KeyCode::Char(c) => self.settings.label.handle_char(c),
            _ => {}
        }
    }

    /// Handle keyboard input in the add/edit dialog.
    ///
    /// Returns true if the application should quit.
    fn handle_form_input(&mut self, key: KeyCode, modifiers: KeyModifiers) -> io::Result<bool> {
        let today = Local::now().date_naive();
        let Some(dialog) = self.form.as_mut() else {
            self.state = AppState::Main;
            return Ok(false);
        };

        match key {
            KeyCode::Esc => self.close_form(),
            KeyCode::Char('s') if modifiers.contains(KeyModifiers::CONTROL) => self.submit_form(),
            KeyCode::Tab | KeyCode::Down => dialog.next_field(),
            KeyCode::BackTab | KeyCode::Up => dialog.prev_field(),
            KeyCode::Enter => {
                if dialog.current().map(|i| i.kind) == Some(ControlKind::DatePicker) {
                    if let Err(e) = dialog.resolve_current_date(today) {
                        self.set_status_message(format!("{}", e));
                    }
                } else {
                    dialog.next_field();
                }
            }
            KeyCode::Left => dialog.handle_left_right(false),
            KeyCode::Right => dialog.handle_left_right(true),
            KeyCode::Home => dialog.handle_home_end(false),
            KeyCode::End => dialog.handle_home_end(true),
            KeyCode::Backspace => dialog.handle_backspace(),
            KeyCode::Delete => dialog.handle_delete(),
            KeyCode::Char(c) if !modifiers.contains(KeyModifiers::CONTROL) => dialog.handle_char(c),
            _ => {}
        }
        Ok(false)
    }

    /// Handle keyboard input in the confirmation dialog.
    fn handle_confirm_input(&mut self, key: KeyCode, _modifiers: KeyModifiers) -> io::Result<bool> {
        match key {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                self.state = AppState::Main;
                if let Some(action) = self.confirm_action.take() {
                    self.execute_pending(action);
                }
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.state = AppState::Main;
                self.confirm_action = None;
            }
            _ => {}
        }
        Ok(false)
    }

    /// Dispatch one key press. Returns true if the application should quit.
    fn handle_key(&mut self, key: KeyEvent) -> io::Result<bool> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(true);
        }
        self.clear_status_message();

        let should_quit = match self.state {
            AppState::Main => match self.shell.route() {
                Route::Tasks => self.handle_task_list_input(key.code, key.modifiers)?,
                Route::FieldSettings => self.handle_settings_input(key.code, key.modifiers)?,
            },
            AppState::TaskForm => self.handle_form_input(key.code, key.modifiers)?,
            AppState::Confirm => self.handle_confirm_input(key.code, key.modifiers)?,
            AppState::Help => {
                self.state = AppState::Main;
                false
            }
            AppState::Ack => {
                self.ack_message = None;
                self.state = AppState::Main;
                false
            }
        };
        self.sync_selection();
        Ok(should_quit)
    }

    /// Poll for a key press and handle it.
    ///
    /// Returns true if the application should quit.
    fn handle_input(&mut self) -> io::Result<bool> {
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    return self.handle_key(key);
                }
            }
        }
        Ok(false)
    }

    /// Render the title bar with the route tabs.
    fn render_header(&mut self, f: &mut Frame, area: Rect) {
        let tab = |label: &'static str, route: Route| {
            if self.shell.route() == route {
                Span::styled(label, Style::default().fg(Color::Black).bg(GOLD).add_modifier(Modifier::BOLD))
            } else {
                Span::raw(label)
            }
        };
        let header = Paragraph::new(Line::from(vec![
            Span::styled("TASKBOARD", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("   "),
            tab(" [1] Tasks ", Route::Tasks),
            Span::raw(" "),
            tab(" [2] Field Settings ", Route::FieldSettings),
            Span::raw("   "),
            Span::styled(
                format!("Organization: {}", self.shell.organization_id()),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ),
        ]))
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    /// Render the search box, the task table and the pager.
    fn render_task_list(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(area);

        let search_style = if self.search.active {
            Style::default().fg(GOLD)
        } else {
            Style::default()
        };
        let search = Paragraph::new(self.search.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Search (/)")
                .border_style(search_style),
        );
        f.render_widget(search, chunks[0]);
        if self.search.active && self.state == AppState::Main {
            f.set_cursor_position((chunks[0].x + self.search.cursor as u16 + 1, chunks[0].y + 1));
        }

        let placeholder = if self.shell.is_loading() {
            Some("Loading...")
        } else if self.shell.tasks().is_empty() {
            Some("No tasks found.")
        } else {
            None
        };
        if let Some(text) = placeholder {
            let paragraph = Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Task List"));
            f.render_widget(paragraph, chunks[1]);
            return;
        }

        let route_color = self.route_color();
        let view = self.table.view(self.shell.tasks());

        let header_cells: Vec<Cell> = view
            .columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                let text = match column {
                    Column::Field { label, sorted: Some(false), .. } => format!("{} ▲", label),
                    Column::Field { label, sorted: Some(true), .. } => format!("{} ▼", label),
                    other => other.header().to_string(),
                };
                let style = if i == self.selected_column {
                    Style::default().fg(Color::Black).bg(GOLD).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().add_modifier(Modifier::BOLD)
                };
                Cell::from(text).style(style)
            })
            .collect();
        let header = Row::new(header_cells)
            .style(Style::default().bg(route_color).fg(Color::White))
            .height(1);

        let rows: Vec<Row> = view
            .rows
            .iter()
            .map(|task| {
                let cells: Vec<Cell> = view
                    .columns
                    .iter()
                    .map(|column| match column {
                        Column::Field { name, .. } => Cell::from(task.text(name)),
                        Column::Action(action) => {
                            Cell::from(format!("[{}]", action.label())).style(Style::default().fg(Color::Cyan))
                        }
                    })
                    .collect();
                Row::new(cells)
            })
            .collect();

        let widths: Vec<Constraint> = view
            .columns
            .iter()
            .map(|column| match column {
                Column::Field { .. } => Constraint::Min(12),
                Column::Action(_) => Constraint::Length(9),
            })
            .collect();

        let title = format!("Task List ({}/{})", view.matched, self.shell.tasks().len());
        let (page, total_pages) = (view.page, view.total_pages);
        let (has_previous, has_next) = (view.has_previous(), view.has_next());

        let table = Table::new(rows, widths)
            .header(header)
            .block(Block::default().borders(Borders::ALL).title(title))
            .row_highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");
        f.render_stateful_widget(table, chunks[1], &mut self.task_list_state);

        let enabled = |on: bool| {
            if on {
                Style::default().add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };
        let pager = Paragraph::new(Line::from(vec![
            Span::styled("[p] Previous", enabled(has_previous)),
            Span::raw(format!("   Page {} of {}   ", page, total_pages)),
            Span::styled("Next [n]", enabled(has_next)),
        ]))
        .alignment(Alignment::Center);
        f.render_widget(pager, chunks[2]);
    }

    /// Render the field settings editor.
    fn render_settings(&mut self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0)])
            .split(area);
        let add_row = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
            .split(chunks[0]);

        let adding = self.settings.is_adding();
        let focus = |on: bool| if on { Style::default().fg(GOLD) } else { Style::default() };
        let label = Paragraph::new(self.settings.label.value.as_str()).block(
            Block::default()
                .borders(Borders::ALL)
                .title("Label (a)")
                .border_style(focus(adding)),
        );
        f.render_widget(label, add_row[0]);
        if adding && self.state == AppState::Main {
            f.set_cursor_position((add_row[0].x + self.settings.label.cursor as u16 + 1, add_row[0].y + 1));
        }

        let field_type = Paragraph::new(format!("< {} >", self.settings.new_type))
            .block(Block::default().borders(Borders::ALL).title("Type (Tab)"));
        f.render_widget(field_type, add_row[1]);

        let block = Block::default().borders(Borders::ALL).title("Form Settings");
        if !self.settings.config.is_loaded() {
            f.render_widget(Paragraph::new("Loading form settings...").block(block), chunks[1]);
            return;
        }

        let items: Vec<ListItem> = self
            .settings
            .fields()
            .iter()
            .map(|field| {
                ListItem::new(Line::from(vec![
                    Span::styled("Label: ", Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(field.label.clone()),
                    Span::raw(" | "),
                    Span::styled("Type: ", Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(field.field_type.to_string()),
                ]))
            })
            .collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::Gray).fg(Color::Black))
            .highlight_symbol(">> ");

        let mut list_state = ListState::default();
        if !self.settings.fields().is_empty() {
            list_state.select(Some(self.settings.selected));
        }
        f.render_stateful_widget(list, chunks[1], &mut list_state);
    }

    /// Render the add/edit dialog over the task list.
    fn render_task_form(&mut self, f: &mut Frame, area: Rect) {
        let Some(dialog) = self.form.as_ref() else {
            return;
        };
        let area = centered_rect(70, 80, area);
        f.render_widget(Clear, area);

        let block = Block::default()
            .borders(Borders::ALL)
            .title(dialog.title())
            .border_style(Style::default().fg(GOLD));
        let inner = block.inner(area);
        f.render_widget(block, area);

        if dialog.field_count() == 0 {
            let text = Paragraph::new("No fields configured. Add fields on the settings screen (2).")
                .wrap(Wrap { trim: true });
            f.render_widget(text, inner);
            return;
        }

        let mut constraints = vec![Constraint::Length(3); dialog.field_count()];
        constraints.push(Constraint::Min(0));
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints(constraints)
            .split(inner);

        for (i, input) in dialog.inputs.iter().enumerate() {
            let focused = i == dialog.current_field;
            let title = match input.kind {
                ControlKind::TextLine => input.label.clone(),
                ControlKind::DatePicker => format!("{} (date: today, next fri, in 3d, YYYY-MM-DD)", input.label),
            };
            let style = if focused { Style::default().fg(GOLD) } else { Style::default() };
            let widget = Paragraph::new(input.input.value.as_str())
                .block(Block::default().borders(Borders::ALL).title(title).border_style(style));
            f.render_widget(widget, chunks[i]);
            if focused {
                f.set_cursor_position((chunks[i].x + input.input.cursor as u16 + 1, chunks[i].y + 1));
            }
        }

        let hint = Paragraph::new("Tab/↑↓ move  Enter resolve date  Ctrl+S save  Esc cancel")
            .style(Style::default().fg(Color::DarkGray));
        if let Some(last) = chunks.last() {
            f.render_widget(hint, *last);
        }
    }

    /// Render a confirmation dialog for destructive actions.
    fn render_confirm(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Confirm Action")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_RED));

        let area = centered_rect(50, 30, area);
        f.render_widget(Clear, area);

        let action = self.confirm_action.as_ref().map(PendingAction::describe).unwrap_or_default();
        let text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Are you sure you want to:",
                Style::default().add_modifier(Modifier::BOLD),
            )]),
            Line::from(action),
            Line::from(""),
            Line::from("Press 'y' to confirm, 'n' to cancel"),
        ];

        let paragraph = Paragraph::new(text)
            .block(block)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    /// Render a message that stays up until a key is pressed.
    fn render_ack(&mut self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Field Settings")
            .borders(Borders::ALL)
            .style(Style::default().bg(DARK_PURPLE));

        let area = centered_rect(40, 25, area);
        f.render_widget(Clear, area);

        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.ack_message.clone().unwrap_or_default(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Press any key to continue"),
        ];
        let paragraph = Paragraph::new(text).block(block).alignment(Alignment::Center);
        f.render_widget(paragraph, area);
    }

    fn render_help(&mut self, f: &mut Frame, area: Rect) {
        let heading = |text: &'static str| {
            Line::from(vec![Span::styled(text, Style::default().add_modifier(Modifier::BOLD))])
        };
        let help_text = vec![
            heading("Taskboard Help"),
            Line::from(""),
            heading("Global:"),
            Line::from("  1 / 2        Task list / field settings"),
            Line::from("  h/F1         Show this help"),
            Line::from("  Ctrl+C       Quit"),
            Line::from(""),
            heading("Task List:"),
            Line::from("  ↑↓/k,j       Select row"),
            Line::from("  ←→           Select column"),
            Line::from("  s/Enter      Sort by column (again to reverse), or run Edit/Delete"),
            Line::from("  < / >        Move column left/right"),
            Line::from("  n / p        Next / previous page"),
            Line::from("  /            Search (Esc clears, Enter keeps)"),
            Line::from("  a            Add task"),
            Line::from("  e            Edit selected task"),
            Line::from("  d            Delete selected task"),
            Line::from("  r            Refresh tasks"),
            Line::from("  q/Esc        Quit"),
            Line::from(""),
            heading("Field Settings:"),
            Line::from("  a            Type a new label (Enter adds, Esc cancels)"),
            Line::from("  Tab          Cycle the new field's type"),
            Line::from("  K / J        Move selected field up/down"),
            Line::from("  d            Delete selected field"),
            Line::from("  w            Save settings"),
            Line::from("  r            Discard edits and reload"),
            Line::from(""),
            heading("Task Form:"),
            Line::from("  Tab/↑↓       Move between fields"),
            Line::from("  Enter        Resolve a date phrase (today, eow, next fri, in 2w)"),
            Line::from("  Ctrl+S       Save"),
            Line::from("  Esc          Cancel"),
            Line::from(""),
            Line::from("Press any key to return"),
        ];

        let paragraph = Paragraph::new(help_text)
            .block(Block::default().borders(Borders::ALL).title("Help"))
            .wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
    }

    /// Render the status bar at the bottom of the screen.
    fn render_status_bar(&mut self, f: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if self.input_mode == InputMode::Text {
            format!("Search: {} (Esc to clear, Enter to confirm)", self.search.value)
        } else {
            match (self.state, self.shell.route()) {
                (AppState::TaskForm, _) => "Task form | Ctrl+S save, Esc cancel".to_string(),
                (AppState::Confirm, _) => "Confirm Action".to_string(),
                (AppState::Help, _) => "Help".to_string(),
                (AppState::Ack, _) => "Press any key".to_string(),
                (AppState::Main, Route::Tasks) => {
                    format!("Tasks: {} | Press 'h' for help", self.shell.tasks().len())
                }
                (AppState::Main, Route::FieldSettings) => {
                    format!("Fields: {} | a add, d delete, K/J move, w save", self.settings.fields().len())
                }
            }
        };

        let status = Paragraph::new(status_text)
            .style(Style::default().bg(self.route_color()).fg(Color::White))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    /// Main render function that dispatches to appropriate view renderers.
    fn render(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(f.area());

        self.render_header(f, chunks[0]);
        if self.state == AppState::Help {
            self.render_help(f, chunks[1]);
        } else {
            match self.shell.route() {
                Route::Tasks => self.render_task_list(f, chunks[1]),
                Route::FieldSettings => self.render_settings(f, chunks[1]),
            }
        }

        match self.state {
            AppState::TaskForm => self.render_task_form(f, chunks[1]),
            AppState::Confirm => self.render_confirm(f, chunks[1]),
            AppState::Ack => self.render_ack(f, chunks[1]),
            AppState::Main | AppState::Help => {}
        }

        self.render_status_bar(f, chunks[2]);
    }

    /// Main event loop for the TUI application.
    ///
    /// Handles rendering and input processing until the user exits.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if self.handle_input()? {
                break;
            }
        }
        Ok(())
    }
}
