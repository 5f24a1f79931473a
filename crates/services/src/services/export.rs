//! Tabular export of console listings as aligned text, JSON or CSV.

use models::{
    collection::{Collection, format_amount},
    entity::Entity,
    field_descriptor::FieldDescriptor,
    member::Member,
    user::User,
};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Cells wider than this are truncated in table output
const MAX_COLUMN_WIDTH: usize = 32;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, EnumString, Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Table,
    Json,
    Csv,
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    /// Machine key, used for JSON output
    pub key: String,
    /// Header shown in table and CSV output
    pub title: String,
}

impl Column {
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
        }
    }
}

/// Anything that can be laid out as a grid of strings
pub trait Tabular {
    fn columns(&self) -> Vec<Column>;
    fn rows(&self) -> Vec<Vec<String>>;
}

pub fn render(table: &dyn Tabular, format: ExportFormat) -> Result<String, ExportError> {
    match format {
        ExportFormat::Table => Ok(render_table(table)),
        ExportFormat::Json => render_json(table),
        ExportFormat::Csv => Ok(render_csv(table)),
    }
}

fn render_table(table: &dyn Tabular) -> String {
    let columns = table.columns();
    let rows: Vec<Vec<String>> = table
        .rows()
        .into_iter()
        .map(|row| row.iter().map(|cell| truncate(cell, MAX_COLUMN_WIDTH)).collect())
        .collect();

    if rows.is_empty() {
        return "(no rows)\n".to_string();
    }

    let mut widths: Vec<usize> = columns.iter().map(|c| c.title.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let format_line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join(" | ")
            .trim_end()
            .to_string()
    };

    let mut output = format_line(columns.iter().map(|c| c.title.as_str()).collect());
    output.push('\n');
    output.push_str(
        &widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("-+-"),
    );
    output.push('\n');
    for row in &rows {
        output.push_str(&format_line(row.iter().map(String::as_str).collect()));
        output.push('\n');
    }
    output.push_str(&format!(
        "({} row{})\n",
        rows.len(),
        if rows.len() == 1 { "" } else { "s" }
    ));
    output
}

fn render_json(table: &dyn Tabular) -> Result<String, ExportError> {
    let columns = table.columns();
    let objects: Vec<serde_json::Map<String, serde_json::Value>> = table
        .rows()
        .into_iter()
        .map(|row| {
            columns
                .iter()
                .zip(row)
                .map(|(column, cell)| (column.key.clone(), serde_json::Value::String(cell)))
                .collect()
        })
        .collect();
    Ok(serde_json::to_string_pretty(&objects)?)
}

fn render_csv(table: &dyn Tabular) -> String {
    let mut output = table
        .columns()
        .iter()
        .map(|c| csv_escape(&c.title))
        .collect::<Vec<_>>()
        .join(",");
    output.push('\n');
    for row in table.rows() {
        output.push_str(&row.iter().map(|c| csv_escape(c)).collect::<Vec<_>>().join(","));
        output.push('\n');
    }
    output
}

fn csv_escape(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn truncate(value: &str, max_width: usize) -> String {
    if value.chars().count() <= max_width {
        value.to_string()
    } else {
        let kept: String = value.chars().take(max_width.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

fn opt(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// Members with one extra column per custom field
pub struct MemberTable<'a> {
    pub members: &'a [Member],
    pub descriptors: &'a [FieldDescriptor],
}

impl Tabular for MemberTable<'_> {
    fn columns(&self) -> Vec<Column> {
        let mut columns = vec![
            Column::new("id", "ID"),
            Column::new("first_name", "First name"),
            Column::new("last_name", "Last name"),
            Column::new("email", "Email"),
            Column::new("phone", "Phone"),
            Column::new("status", "Status"),
        ];
        columns.extend(
            self.descriptors
                .iter()
                .map(|d| Column::new(d.name(), d.label())),
        );
        columns
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.members
            .iter()
            .map(|member| {
                let mut row = vec![
                    member.id.to_string(),
                    member.first_name.clone(),
                    member.last_name.clone(),
                    opt(&member.email),
                    opt(&member.phone),
                    member.status.to_string(),
                ];
                row.extend(self.descriptors.iter().map(|d| {
                    member
                        .custom_value(d.name())
                        .map(|v| v.to_string())
                        .unwrap_or_default()
                }));
                row
            })
            .collect()
    }
}

pub struct CollectionTable<'a>(pub &'a [Collection]);

impl Tabular for CollectionTable<'_> {
    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("id", "ID"),
            Column::new("collected_on", "Date"),
            Column::new("kind", "Kind"),
            Column::new("amount", "Amount"),
            Column::new("currency", "Currency"),
            Column::new("member_id", "Member"),
            Column::new("notes", "Notes"),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|c| {
                vec![
                    c.id.to_string(),
                    c.collected_on.to_string(),
                    c.kind.to_string(),
                    format_amount(c.amount_cents),
                    c.currency.clone(),
                    c.member_id.map(|id| id.to_string()).unwrap_or_default(),
                    opt(&c.notes),
                ]
            })
            .collect()
    }
}

pub struct EntityTable<'a>(pub &'a [Entity]);

impl Tabular for EntityTable<'_> {
    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("id", "ID"),
            Column::new("name", "Name"),
            Column::new("kind", "Kind"),
            Column::new("parent_id", "Parent"),
            Column::new("email", "Email"),
            Column::new("phone", "Phone"),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|e| {
                vec![
                    e.id.to_string(),
                    e.name.clone(),
                    e.kind.to_string(),
                    e.parent_id.map(|id| id.to_string()).unwrap_or_default(),
                    opt(&e.email),
                    opt(&e.phone),
                ]
            })
            .collect()
    }
}

pub struct UserTable<'a>(pub &'a [User]);

impl Tabular for UserTable<'_> {
    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("id", "ID"),
            Column::new("name", "Name"),
            Column::new("email", "Email"),
            Column::new("role", "Role"),
            Column::new("active", "Active"),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|u| {
                vec![
                    u.id.to_string(),
                    u.name.clone(),
                    u.email.clone(),
                    u.role.to_string(),
                    if u.active { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect()
    }
}

/// Custom field definitions
pub struct FieldTable<'a>(pub &'a [FieldDescriptor]);

impl Tabular for FieldTable<'_> {
    fn columns(&self) -> Vec<Column> {
        vec![
            Column::new("id", "ID"),
            Column::new("name", "Name"),
            Column::new("label", "Label"),
            Column::new("kind", "Kind"),
            Column::new("required", "Required"),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|d| {
                vec![
                    d.id().map(|id| id.to_string()).unwrap_or_default(),
                    d.name().to_string(),
                    d.label().to_string(),
                    d.kind().to_string(),
                    if d.is_required() { "yes" } else { "no" }.to_string(),
                ]
            })
            .collect()
    }
}
