//! Task table derivation.
//!
//! The table view is computed by a pure function from the task list, the
//! field configuration, the column order and a `TableQuery` (sort, search,
//! page). `TaskTable` keeps that view state between user interactions.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::fields::{move_item, FieldDescriptor};
use crate::task::Task;

/// Rows per page.
pub const PAGE_SIZE: usize = 5;

/// Sort state: one column, ascending or descending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortSpec {
    pub column: String,
    pub descending: bool,
}

/// Transient view state of the task table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableQuery {
    pub sort: Option<SortSpec>,
    pub search: String,
    /// 1-based page number.
    pub page: usize,
}

impl Default for TableQuery {
    fn default() -> Self {
        TableQuery { sort: None, search: String::new(), page: 1 }
    }
}

/// Display order of field columns, by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOrder(Vec<String>);

impl ColumnOrder {
    pub fn new(names: Vec<String>) -> Self {
        ColumnOrder(names)
    }

    /// Order matching the configuration's own order.
    pub fn from_fields(fields: &[FieldDescriptor]) -> Self {
        ColumnOrder(fields.iter().map(|f| f.name.clone()).collect())
    }

    pub fn names(&self) -> &[String] {
        &self.0
    }

    /// Move `from` to the position currently held by `to`.
    pub fn move_column(&mut self, from: &str, to: &str) {
        if from == to {
            return;
        }
        let from_idx = self.0.iter().position(|n| n == from);
        let to_idx = self.0.iter().position(|n| n == to);
        if let (Some(f), Some(t)) = (from_idx, to_idx) {
            move_item(&mut self.0, f, t);
        }
    }
}

/// Per-row actions shown after the field columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowAction {
    Edit,
    Delete,
}

impl RowAction {
    pub fn label(self) -> &'static str {
        match self {
            RowAction::Edit => "Edit",
            RowAction::Delete => "Delete",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Field {
        name: String,
        label: String,
        /// `Some(descending)` when this is the sorted column.
        sorted: Option<bool>,
    },
    Action(RowAction),
}

impl Column {
    pub fn header(&self) -> &str {
        match self {
            Column::Field { label, .. } => label,
            Column::Action(action) => action.label(),
        }
    }

    pub fn field_name(&self) -> Option<&str> {
        match self {
            Column::Field { name, .. } => Some(name),
            Column::Action(_) => None,
        }
    }
}

/// Field columns in `order`, skipping names that are not configured, then
/// the Edit and Delete action columns.
pub fn derive_columns(fields: &[FieldDescriptor], order: &ColumnOrder, sort: Option<&SortSpec>) -> Vec<Column> {
    let mut columns: Vec<Column> = order
        .names()
        .iter()
        .filter_map(|name| fields.iter().find(|f| &f.name == name))
        .map(|field| Column::Field {
            name: field.name.clone(),
            label: field.label.clone(),
            sorted: sort.filter(|s| s.column == field.name).map(|s| s.descending),
        })
        .collect();
    columns.push(Column::Action(RowAction::Edit));
    columns.push(Column::Action(RowAction::Delete));
    columns
}

/// Tasks whose joined property values contain `search`, ignoring case.
pub fn filter_tasks<'a>(tasks: &'a [Task], search: &str) -> Vec<&'a Task> {
    let needle = search.to_lowercase();
    tasks
        .iter()
        .filter(|t| needle.is_empty() || t.search_text().to_lowercase().contains(&needle))
        .collect()
}

/// Locale-style string ordering: case-insensitive first, lowercase before
/// uppercase on ties.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| b.cmp(a))
}

fn type_rank(value: Option<&Value>) -> u8 {
    match value {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Array(_)) => 4,
        Some(Value::Object(_)) => 5,
    }
}

/// Total order over optional JSON values used for sorting.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::String(x)), Some(Value::String(y))) => locale_cmp(x, y),
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(x @ (Value::Array(_) | Value::Object(_))), Some(y @ (Value::Array(_) | Value::Object(_))))
            if type_rank(a) == type_rank(b) =>
        {
            x.to_string().cmp(&y.to_string())
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

pub fn sort_tasks(rows: &mut [&Task], sort: &SortSpec) {
    rows.sort_by(|a, b| {
        let ord = compare_values(a.get(&sort.column), b.get(&sort.column));
        if sort.descending {
            ord.reverse()
        } else {
            ord
        }
    });
}

/// Number of pages for `rows` rows; never less than one.
pub fn total_pages(rows: usize) -> usize {
    rows.div_ceil(PAGE_SIZE).max(1)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// One rendered page of the table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView<'a> {
    pub columns: Vec<Column>,
    pub rows: Vec<&'a Task>,
    pub page: usize,
    pub total_pages: usize,
    /// Tasks matching the search, across all pages.
    pub matched: usize,
}

impl TableView<'_> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Filter, sort and paginate `tasks` for display.
pub fn derive_view<'a>(
    tasks: &'a [Task],
    fields: &[FieldDescriptor],
    order: &ColumnOrder,
    query: &TableQuery,
) -> TableView<'a> {
    let mut rows = filter_tasks(tasks, &query.search);
    if let Some(sort) = &query.sort {
        sort_tasks(&mut rows, sort);
    }

    let matched = rows.len();
    let total_pages = total_pages(matched);
    let page = clamp_page(query.page, total_pages);
    let rows = rows.into_iter().skip((page - 1) * PAGE_SIZE).take(PAGE_SIZE).collect();

    TableView {
        columns: derive_columns(fields, order, query.sort.as_ref()),
        rows,
        page,
        total_pages,
        matched,
    }
}

/// Table view state for one screen: field configuration, column order and
/// query.
#[derive(Debug, Clone, Default)]
pub struct TaskTable {
    fields: Vec<FieldDescriptor>,
    order: ColumnOrder,
    query: TableQuery,
}

impl TaskTable {
    pub fn new(fields: &[FieldDescriptor]) -> Self {
        let mut table = TaskTable::default();
        table.set_fields(fields);
        table
    }

    /// Replace the field configuration. The column order resets to the
    /// configuration's order.
    pub fn set_fields(&mut self, fields: &[FieldDescriptor]) {
        self.fields = fields.to_vec();
        self.order = ColumnOrder::from_fields(fields);
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn column_order(&self) -> &ColumnOrder {
        &self.order
    }

    pub fn query(&self) -> &TableQuery {
        &self.query
    }

    pub fn columns(&self) -> Vec<Column> {
        derive_columns(&self.fields, &self.order, self.query.sort.as_ref())
    }

    pub fn view<'a>(&self, tasks: &'a [Task]) -> TableView<'a> {
        derive_view(tasks, &self.fields, &self.order, &self.query)
    }

    /// Set the search term. The current page is left as it is.
    pub fn search(&mut self, term: &str) {
        self.query.search = term.to_string();
    }

    /// Sort by `column`; the sorted column toggles direction.
    pub fn sort_by(&mut self, column: &str) {
        let descending = match &self.query.sort {
            Some(s) if s.column == column => !s.descending,
            _ => false,
        };
        self.query.sort = Some(SortSpec { column: column.to_string(), descending });
    }

    pub fn next_page(&mut self, total_pages: usize) {
        let current = clamp_page(self.query.page, total_pages);
        self.query.page = (current + 1).min(total_pages.max(1));
    }

    pub fn previous_page(&mut self, total_pages: usize) {
        let current = clamp_page(self.query.page, total_pages);
        self.query.page = current.saturating_sub(1).max(1);
    }

    pub fn reorder_columns(&mut self, from: &str, to: &str) {
        self.order.move_column(from, to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::FieldType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn field(name: &str) -> FieldDescriptor {
        FieldDescriptor::new(name, &name.to_uppercase(), FieldType::Text)
    }

    fn titled(titles: &[&str]) -> Vec<Task> {
        titles.iter().map(|t| Task::with_values([("title", *t)])).collect()
    }

    fn titles(rows: &[&Task]) -> Vec<String> {
        rows.iter().map(|t| t.text("title")).collect()
    }

    fn order(names: &[&str]) -> ColumnOrder {
        ColumnOrder::new(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_columns_follow_order_and_skip_unknown_names() {
        let fields = vec![field("a"), field("b"), field("c")];
        let columns = derive_columns(&fields, &order(&["c", "x", "a"]), None);
        let headers: Vec<&str> = columns.iter().map(|c| c.header()).collect();
        assert_eq!(headers, vec!["C", "A", "Edit", "Delete"]);
    }

    #[test]
    fn test_columns_do_not_depend_on_tasks() {
        let fields = vec![field("a"), field("b")];
        let ord = order(&["b", "a"]);
        let query = TableQuery::default();
        let empty = derive_view(&[], &fields, &ord, &query).columns;
        let tasks = titled(&["x", "y"]);
        let full = derive_view(&tasks, &fields, &ord, &query).columns;
        assert_eq!(empty, full);
    }

    #[test]
    fn test_sorted_column_is_marked() {
        let fields = vec![field("a"), field("b")];
        let sort = SortSpec { column: "b".into(), descending: true };
        let columns = derive_columns(&fields, &ColumnOrder::from_fields(&fields), Some(&sort));
        assert_eq!(
            columns[1],
            Column::Field { name: "b".into(), label: "B".into(), sorted: Some(true) }
        );
        assert!(matches!(columns[0], Column::Field { sorted: None, .. }));
    }

    #[test]
    fn test_move_column_examples() {
        let mut ord = order(&["a", "b", "c"]);
        ord.move_column("c", "a");
        assert_eq!(ord, order(&["c", "a", "b"]));
        ord.move_column("c", "b");
        assert_eq!(ord, order(&["a", "b", "c"]));
        ord.move_column("a", "missing");
        ord.move_column("b", "b");
        assert_eq!(ord, order(&["a", "b", "c"]));
    }

    #[test]
    fn test_search_example() {
        let tasks = titled(&["Buy milk", "Clean house"]);
        let rows = filter_tasks(&tasks, "MILK");
        assert_eq!(titles(&rows), vec!["Buy milk"]);
    }

    #[test]
    fn test_search_spans_all_values() {
        let mut tasks = titled(&["One", "Two"]);
        tasks[1].values.insert("owner".into(), json!("zed@example.com"));
        tasks[0].organization_id = Some("acme".into());
        assert_eq!(titles(&filter_tasks(&tasks, "zed@")), vec!["Two"]);
        assert_eq!(titles(&filter_tasks(&tasks, "acme")), vec!["One"]);
        assert_eq!(filter_tasks(&tasks, "").len(), 2);
    }

    #[test]
    fn test_search_without_match_yields_single_empty_page() {
        let tasks = titled(&["a", "b", "c"]);
        let query = TableQuery { search: "nothing".into(), ..TableQuery::default() };
        let view = derive_view(&tasks, &[field("title")], &order(&["title"]), &query);
        assert!(view.rows.is_empty());
        assert_eq!(view.total_pages, 1);
        assert_eq!(view.matched, 0);
        assert!(!view.has_previous());
        assert!(!view.has_next());
    }

    #[test]
    fn test_locale_cmp() {
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_cmp("a", "A"), Ordering::Less);
        assert_eq!(locale_cmp("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_compare_values_mixed_types() {
        let one = json!(1);
        let ten = json!(10);
        let s = json!("x");
        assert_eq!(compare_values(Some(&one), Some(&ten)), Ordering::Less);
        assert_eq!(compare_values(None, Some(&one)), Ordering::Less);
        assert_eq!(compare_values(Some(&s), Some(&one)), Ordering::Greater);
        assert_eq!(compare_values(Some(&Value::Null), None), Ordering::Equal);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let tasks = titled(&["pear", "Apple", "fig", "apple", "Banana"]);
        let spec = SortSpec { column: "title".into(), descending: false };
        let mut once = filter_tasks(&tasks, "");
        sort_tasks(&mut once, &spec);
        let mut twice = once.clone();
        sort_tasks(&mut twice, &spec);
        assert_eq!(titles(&once), vec!["apple", "Apple", "Banana", "fig", "pear"]);
        assert_eq!(titles(&once), titles(&twice));
    }

    #[test]
    fn test_sort_toggle_twice_restores_ascending() {
        let tasks = titled(&["b", "c", "a"]);
        let fields = vec![field("title")];
        let mut table = TaskTable::new(&fields);

        table.sort_by("title");
        let ascending: Vec<String> = titles(&table.view(&tasks).rows);
        assert_eq!(ascending, vec!["a", "b", "c"]);

        table.sort_by("title");
        assert_eq!(table.query().sort, Some(SortSpec { column: "title".into(), descending: true }));
        assert_eq!(titles(&table.view(&tasks).rows), vec!["c", "b", "a"]);

        table.sort_by("title");
        assert_eq!(titles(&table.view(&tasks).rows), ascending);
    }

    #[test]
    fn test_sort_other_column_starts_ascending() {
        let mut table = TaskTable::new(&[field("a"), field("b")]);
        table.sort_by("a");
        table.sort_by("a");
        table.sort_by("b");
        assert_eq!(table.query().sort, Some(SortSpec { column: "b".into(), descending: false }));
    }

    #[test]
    fn test_pages_cover_every_row_once() {
        for n in [0usize, 1, 4, 5, 6, 10, 12] {
            let names: Vec<String> = (0..n).map(|i| format!("task {:02}", i)).collect();
            let tasks: Vec<Task> = names.iter().map(|t| Task::with_values([("title", t.as_str())])).collect();
            let fields = vec![field("title")];
            let ord = ColumnOrder::from_fields(&fields);

            let first = derive_view(&tasks, &fields, &ord, &TableQuery::default());
            assert_eq!(first.total_pages, std::cmp::max(1, n.div_ceil(5)));

            let mut seen = Vec::new();
            for page in 1..=first.total_pages {
                let query = TableQuery { page, ..TableQuery::default() };
                let view = derive_view(&tasks, &fields, &ord, &query);
                assert!(view.rows.len() <= PAGE_SIZE);
                seen.extend(titles(&view.rows));
            }
            assert_eq!(seen, names);
        }
    }

    #[test]
    fn test_page_navigation_stops_at_bounds() {
        let tasks = titled(&["1", "2", "3", "4", "5", "6", "7", "8", "9", "10", "11"]);
        let mut table = TaskTable::new(&[field("title")]);
        let total = table.view(&tasks).total_pages;
        assert_eq!(total, 3);

        table.previous_page(total);
        assert_eq!(table.query().page, 1);
        table.next_page(total);
        table.next_page(total);
        table.next_page(total);
        assert_eq!(table.query().page, 3);
        let view = table.view(&tasks);
        assert_eq!(titles(&view.rows), vec!["11"]);
        assert!(view.has_previous());
        assert!(!view.has_next());
    }

    #[test]
    fn test_search_keeps_page_but_view_is_clamped() {
        let tasks = titled(&["a1", "a2", "a3", "a4", "a5", "a6", "b1"]);
        let mut table = TaskTable::new(&[field("title")]);
        table.next_page(table.view(&tasks).total_pages);
        assert_eq!(table.query().page, 2);

        table.search("b");
        assert_eq!(table.query().page, 2);
        let view = table.view(&tasks);
        assert_eq!(view.page, 1);
        assert_eq!(titles(&view.rows), vec!["b1"]);
    }

    #[test]
    fn test_set_fields_resets_column_order() {
        let fields = vec![field("a"), field("b"), field("c")];
        let mut table = TaskTable::new(&fields);
        table.reorder_columns("c", "a");
        assert_eq!(table.column_order(), &order(&["c", "a", "b"]));
        table.set_fields(&fields);
        assert_eq!(table.column_order(), &order(&["a", "b", "c"]));
    }
}
