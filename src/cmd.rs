//! Command implementations for the CLI interface.
//!
//! Each subcommand loads what it needs from the backend, drives the same
//! controllers the TUI uses, and prints a plain-text result.

use std::io;

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::{CommandFactory, Subcommand};
use clap_complete::{generate, Shell as CompletionShell};

use crate::api::{HttpBackend, TaskBackend};
use crate::cli::Cli;
use crate::config::Settings;
use crate::confirm::{Confirm, StdinConfirm};
use crate::fields::{parse_field_type, FieldConfig, FieldDescriptor, FieldType};
use crate::form::{ControlKind, TaskForm};
use crate::shell::Shell;
use crate::table::{Column, TableView, TaskTable};
use crate::task::Task;

#[derive(Subcommand)]
pub enum Commands {
    /// Launch the interactive UI (default).
    Ui,

    /// List tasks as a table.
    List {
        /// Case-insensitive text to search for.
        #[arg(long)]
        search: Option<String>,
        /// Field name to sort by.
        #[arg(long)]
        sort: Option<String>,
        /// Sort descending.
        #[arg(long, requires = "sort")]
        desc: bool,
        /// Page to show (5 tasks per page).
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Show every page.
        #[arg(long, conflicts_with = "page")]
        all: bool,
    },

    /// Add a task.
    Add {
        /// Field value as name=value. May be repeated.
        #[arg(long = "set", value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },

    /// Update a task by id.
    Update {
        /// Task id (`_id`).
        id: String,
        /// Field value as name=value. May be repeated.
        #[arg(long = "set", value_parser = parse_assignment)]
        values: Vec<(String, String)>,
    },

    /// Delete a task by id.
    Delete {
        /// Task id (`_id`).
        id: String,
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },

    /// Manage the configured form fields.
    Fields {
        #[command(subcommand)]
        action: FieldsAction,
    },

    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: CompletionShell,
    },
}

#[derive(Subcommand)]
pub enum FieldsAction {
    /// List fields in their configured order.
    List,
    /// Append a field and save.
    Add {
        /// Display label; the data key is derived from it.
        label: String,
        /// Field type: text | email | date.
        #[arg(long = "type", default_value = "text", value_parser = parse_field_type)]
        field_type: FieldType,
    },
    /// Remove a field by id and save.
    Remove {
        id: String,
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
    /// Move a field to another field's position and save.
    Move { from: String, to: String },
}

/// Parse a `name=value` pair.
pub fn parse_assignment(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing field name in '{}'", s));
    }
    Ok((name.to_string(), value.to_string()))
}

fn connect(settings: &Settings) -> Result<HttpBackend> {
    HttpBackend::new(&settings.base_url).with_context(|| format!("connecting to {}", settings.base_url))
}

fn load_fields(backend: &dyn TaskBackend) -> Result<FieldConfig> {
    let mut config = FieldConfig::default();
    config.load(backend).context("loading form settings")?;
    Ok(config)
}

fn load_shell(backend: &dyn TaskBackend, settings: &Settings) -> Result<Shell> {
    let mut shell = Shell::new(&settings.organization_id);
    shell.refresh(backend).context("loading tasks")?;
    Ok(shell)
}

fn find_task<'a>(shell: &'a Shell, id: &str) -> Result<&'a Task> {
    shell
        .tasks()
        .iter()
        .find(|t| t.id.as_deref() == Some(id))
        .with_context(|| format!("no task with id '{}'", id))
}

/// Apply `name=value` assignments to a form. Date fields accept the same
/// phrases as the UI ("tomorrow", "in 3d", ...).
fn apply_values(form: &mut TaskForm, values: &[(String, String)]) -> Result<()> {
    let today = Local::now().date_naive();
    for (name, value) in values {
        let kind = form
            .controls()
            .iter()
            .find(|c| &c.field.name == name)
            .map(|c| c.kind);
        match kind {
            Some(ControlKind::DatePicker) => form.set_date_input(name, value, today)?,
            Some(ControlKind::TextLine) => {
                form.set_value(name, value);
            }
            None => bail!("'{}' is not a configured field", name),
        }
    }
    Ok(())
}

pub fn cmd_list(settings: &Settings, search: Option<String>, sort: Option<String>, desc: bool, page: usize, all: bool) -> Result<()> {
    let backend = connect(settings)?;
    let fields = load_fields(&backend)?;
    let shell = load_shell(&backend, settings)?;

    let mut table = build_table(fields.fields(), search.as_deref(), sort.as_deref(), desc);
    let views = select_pages(&mut table, shell.tasks(), page, all);
    let last = views.len().saturating_sub(1);
    for (i, view) in views.iter().enumerate() {
        print_view(view);
        if i < last {
            println!();
        }
    }
    Ok(())
}

/// Print one page with an ID column in front of the field columns.
/// Table state for a `list` invocation. `desc` sorts the column a second
/// time, which flips it to descending.
fn build_table(fields: &[FieldDescriptor], search: Option<&str>, sort: Option<&str>, desc: bool) -> TaskTable {
    let mut table = TaskTable::new(fields);
    if let Some(term) = search {
        table.search(term);
    }
    if let Some(column) = sort {
        table.sort_by(column);
        if desc {
            table.sort_by(column);
        }
    }
    table
}

/// The pages to print: every page with `all`, otherwise `page` clamped to
/// the last one.
fn select_pages<'a>(table: &mut TaskTable, tasks: &'a [Task], page: usize, all: bool) -> Vec<TableView<'a>> {
    let total = table.view(tasks).total_pages;
    let pages = if all { 1..=total } else { page..=page };
    let mut views = Vec::new();
    for p in pages {
        while table.query().page < p.min(total) {
            table.next_page(total);
        }
        views.push(table.view(tasks));
    }
    views
}

pub fn print_view(view: &TableView<'_>) {
    let fields: Vec<&Column> = view.columns.iter().filter(|c| c.field_name().is_some()).collect();

    let id_width = view
        .rows
        .iter()
        .map(|t| t.id.as_deref().unwrap_or("-").chars().count())
        .max()
        .unwrap_or(0)
        .max(2);
    let widths: Vec<usize> = fields
        .iter()
        .map(|c| {
            let name = c.field_name().unwrap_or_default();
            view.rows
                .iter()
                .map(|t| t.text(name).chars().count())
                .chain(std::iter::once(header_text(c).chars().count()))
                .max()
                .unwrap_or(0)
                .min(30)
        })
        .collect();

    let mut line = format!("{:<w$}", "ID", w = id_width);
    for (c, w) in fields.iter().zip(&widths) {
        line.push_str(&format!("  {:<w$}", truncate(&header_text(c), *w), w = *w));
    }
    println!("{}", line.trim_end());

    for task in &view.rows {
        let mut line = format!("{:<w$}", task.id.as_deref().unwrap_or("-"), w = id_width);
        for (c, w) in fields.iter().zip(&widths) {
            let value = task.text(c.field_name().unwrap_or_default());
            line.push_str(&format!("  {:<w$}", truncate(&value, *w), w = *w));
        }
        println!("{}", line.trim_end());
    }
    if view.rows.is_empty() {
        println!("No tasks found.");
    }
    println!("Page {} of {} ({} tasks)", view.page, view.total_pages, view.matched);
}

fn header_text(column: &Column) -> String {
    match column {
        Column::Field { label, sorted: Some(true), .. } => format!("{} v", label),
        Column::Field { label, sorted: Some(false), .. } => format!("{} ^", label),
        other => other.header().to_string(),
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

pub fn cmd_add(settings: &Settings, values: Vec<(String, String)>) -> Result<()> {
    let backend = connect(settings)?;
    let fields = load_fields(&backend)?;
    let mut form = TaskForm::new(fields.fields());
    apply_values(&mut form, &values)?;
    form.submit(&backend, &settings.organization_id)?;
    println!("Added task");
    Ok(())
}

pub fn cmd_update(settings: &Settings, id: String, values: Vec<(String, String)>) -> Result<()> {
    let backend = connect(settings)?;
    let fields = load_fields(&backend)?;
    let mut shell = load_shell(&backend, settings)?;
    let task = find_task(&shell, &id)?.clone();

    shell.begin_edit(&task);
    let mut form = TaskForm::for_task(fields.fields(), &task);
    apply_values(&mut form, &values)?;
    shell.submit_form(&backend, &mut form)?;
    println!("Updated task {}", id);
    Ok(())
}

pub fn cmd_delete(settings: &Settings, id: String, yes: bool) -> Result<()> {
    let backend = connect(settings)?;
    let mut shell = load_shell(&backend, settings)?;
    let task = find_task(&shell, &id)?.clone();

    let mut assumed = true;
    let mut prompt = StdinConfirm;
    let confirm: &mut dyn Confirm = if yes { &mut assumed } else { &mut prompt };
    if shell.delete_task(&backend, &task, confirm)? {
        println!("Deleted task {}", id);
    } else {
        println!("Cancelled");
    }
    Ok(())
}

pub fn cmd_fields(settings: &Settings, action: FieldsAction) -> Result<()> {
    let backend = connect(settings)?;
    let mut config = load_fields(&backend)?;

    match action {
        FieldsAction::List => {
            print_fields(&config);
            return Ok(());
        }
        FieldsAction::Add { label, field_type } => {
            let added = config.add(&label, field_type)?;
            println!("Added field '{}' ({})", added.name, added.field_type);
        }
        FieldsAction::Remove { id, yes } => {
            if config.get(&id).is_none() {
                bail!("no field with id '{}'", id);
            }
            let mut assumed = true;
            let mut prompt = StdinConfirm;
            let confirm: &mut dyn Confirm = if yes { &mut assumed } else { &mut prompt };
            match config.remove(&id, confirm) {
                Some(removed) => println!("Removed field '{}'", removed.name),
                None => {
                    println!("Cancelled");
                    return Ok(());
                }
            }
        }
        FieldsAction::Move { from, to } => {
            for id in [&from, &to] {
                if config.get(id).is_none() {
                    bail!("no field with id '{}'", id);
                }
            }
            config.reorder(&from, &to);
        }
    }

    config.save(&backend).context("saving form settings")?;
    println!("Settings saved!");
    print_fields(&config);
    Ok(())
}

fn print_fields(config: &FieldConfig) {
    println!("{:<15} {:<15} {:<20} {}", "ID", "Name", "Label", "Type");
    for f in config.fields() {
        println!(
            "{:<15} {:<15} {:<20} {}",
            f.id.as_deref().unwrap_or("-"),
            truncate(&f.name, 15),
            truncate(&f.label, 20),
            f.field_type
        );
    }
}

pub fn cmd_completions(shell: CompletionShell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
